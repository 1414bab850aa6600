//! Keyboard Layout Editor (KLE) transcoder.
//!
//! KLE documents are JSON arrays: an optional metadata object followed by
//! one array per row. Row arrays hold property objects, which update the
//! decoder state, and strings, which emit a key.
//!
//! The two coordinate systems differ:
//!
//! | | keyboard model | KLE |
//! |---|---|---|
//! | units | millimetres | pitches |
//! | +y | up | down |
//! | +r | counter-clockwise | clockwise |
//! | key origin | centre | top-left corner |
//! | rotation origin | key centre | `(rx, ry)` |
//!
//! Positions in KLE are relative: `x` restarts at 0 on each row, `y`
//! advances by one per row, and pending `x`/`y`/`w`/`h` properties apply
//! to the next key only. `r`, `rx` and `ry` persist; setting `rx` restarts
//! both `x` and `y` at 0, setting `ry` restarts `y`.

use serde_json::{Map, Value};
use tracing::debug;

use crate::constants::{KLE_EPSILON, KLE_OUTLINE_KEY, KLE_OUTLINE_LEGACY_KEY};
use crate::error::{KbError, Result};
use crate::models::{Bounds, Key, OutlineKind, Pose, Position};
use crate::services::layout::row_ranges;

/// A decoded KLE document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KleLayout {
    /// Keyboard name from the metadata object
    pub name: Option<String>,
    /// Outline strategy hint from the metadata object
    pub outline: Option<OutlineKind>,
    /// Keys in document order
    pub keys: Vec<Key>,
}

/// Options for [`encode`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EncodeOptions {
    /// Name written to the metadata object
    pub name: Option<String>,
    /// Outline hint written to the metadata object
    pub outline: Option<OutlineKind>,
    /// Shift the layout so its placeholders start at the KLE origin
    pub normalize: bool,
}

fn transcode(message: impl Into<String>) -> KbError {
    KbError::Transcode(message.into())
}

/// Parses KLE text.
///
/// Accepts strict JSON as well as the relaxed JSON5 syntax that the KLE web
/// editor produces for its raw data view (unquoted keys, trailing commas).
pub fn parse(text: &str) -> Result<Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => Ok(value),
        Err(json_err) => json5::from_str::<Value>(text)
            .map_err(|_| transcode(format!("not a valid KLE document: {json_err}"))),
    }
}

/// Decoder state between tokens.
#[derive(Debug, Default)]
struct DecodeState {
    x: f64,
    y: f64,
    r: f64,
    rx: f64,
    ry: f64,
    // Pending properties for the next key
    dx: f64,
    dy: f64,
    w: f64,
    h: f64,
}

impl DecodeState {
    fn reset_pending(&mut self) {
        self.dx = 0.0;
        self.dy = 0.0;
        self.w = 1.0;
        self.h = 1.0;
    }

    fn apply(&mut self, props: &Map<String, Value>, row: usize) -> Result<()> {
        let number = |key: &str| -> Result<Option<f64>> {
            match props.get(key) {
                None => Ok(None),
                Some(v) => v
                    .as_f64()
                    .map(Some)
                    .ok_or_else(|| transcode(format!("row {row}: property '{key}' must be a number"))),
            }
        };

        if let Some(r) = number("r")? {
            self.r = r;
        }
        if let Some(rx) = number("rx")? {
            self.rx = rx;
            self.x = 0.0;
            self.y = 0.0;
        }
        if let Some(ry) = number("ry")? {
            self.ry = ry;
            self.y = 0.0;
        }
        if let Some(dx) = number("x")? {
            self.dx = dx;
        }
        if let Some(dy) = number("y")? {
            self.dy = dy;
        }
        if let Some(w) = number("w")? {
            self.w = w;
        }
        if let Some(h) = number("h")? {
            self.h = h;
        }
        Ok(())
    }

    fn emit(&mut self, pitch: f64) -> Key {
        self.x += self.dx;
        self.y += self.dy;
        let key = key_from_kle(self.x, self.y, self.r, self.rx, self.ry, self.w, self.h, pitch);
        self.x += self.w;
        self.reset_pending();
        key
    }
}

/// Key whose KLE top-left corner is `(x, y)` in the frame rotated by `r`
/// about `(rx, ry)`.
fn key_from_kle(x: f64, y: f64, r: f64, rx: f64, ry: f64, w: f64, h: f64, pitch: f64) -> Key {
    let origin = Pose::new(rx * pitch, -ry * pitch, -r);
    let centre = origin.transform(Position::new(
        x * pitch + w * pitch / 2.0,
        -(y * pitch + h * pitch / 2.0),
    ));
    Key::new(centre.x, centre.y, -r).with_size(w, h)
}

fn apply_metadata(layout: &mut KleLayout, meta: &Map<String, Value>) -> Result<()> {
    if let Some(name) = meta.get("name") {
        let name = name
            .as_str()
            .ok_or_else(|| transcode("metadata 'name' must be a string"))?;
        layout.name = Some(name.to_string());
    }
    let outline = [KLE_OUTLINE_KEY, KLE_OUTLINE_LEGACY_KEY]
        .into_iter()
        .find_map(|key| meta.get(key).map(|value| (key, value)));
    if let Some((key, outline)) = outline {
        let hint = outline
            .as_str()
            .ok_or_else(|| transcode(format!("metadata '{key}' must be a string")))?;
        layout.outline = Some(hint.parse()?);
    }
    Ok(())
}

/// Decodes a parsed KLE document into keys.
pub fn decode(doc: &Value, pitch: f64) -> Result<KleLayout> {
    let items = doc
        .as_array()
        .ok_or_else(|| transcode("a KLE document must be a JSON array"))?;

    let mut layout = KleLayout::default();
    let mut state = DecodeState::default();
    let mut row = 0;

    for (index, item) in items.iter().enumerate() {
        match item {
            Value::Object(meta) if index == 0 => apply_metadata(&mut layout, meta)?,
            Value::Array(tokens) => {
                state.x = 0.0;
                state.reset_pending();
                for token in tokens {
                    match token {
                        Value::Object(props) => state.apply(props, row)?,
                        Value::String(_) => layout.keys.push(state.emit(pitch)),
                        other => {
                            return Err(transcode(format!("row {row}: unexpected token {other}")));
                        }
                    }
                }
                state.y += 1.0;
                row += 1;
            }
            other => {
                return Err(transcode(format!(
                    "element {index}: expected a row array, found {other}"
                )));
            }
        }
    }

    debug!(keys = layout.keys.len(), rows = row, "decoded KLE document");
    Ok(layout)
}

/// Parses and decodes KLE text.
pub fn decode_str(text: &str, pitch: f64) -> Result<KleLayout> {
    decode(&parse(text)?, pitch)
}

/// Rounds to a micro-unit so emitted numbers stay readable.
fn tidy(value: f64) -> f64 {
    let rounded = (value * 1e6).round() / 1e6;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= KLE_EPSILON
}

/// Rotation group: KLE rotation and rotation origin, in pitches.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Group {
    r: f64,
    rx: f64,
    ry: f64,
}

/// Encoder that mirrors the decoder's state so every emitted delta lands
/// exactly where the decoder will read it.
struct Encoder {
    pitch: f64,
    origin: Position,
    doc: Vec<Value>,
    row: Vec<Value>,
    group: Group,
    x: f64,
    y: f64,
}

impl Encoder {
    /// Key centre relative to the output origin.
    fn centre(&self, key: &Key) -> Position {
        Position::new(key.pose.x - self.origin.x, key.pose.y - self.origin.y)
    }

    fn close_row(&mut self) {
        if !self.row.is_empty() {
            self.doc.push(Value::Array(std::mem::take(&mut self.row)));
            self.y += 1.0;
        }
        self.x = 0.0;
    }

    /// Starts a new rotation group anchored at the key's top-left corner.
    fn start_group(&mut self, key: &Key, r: f64, props: &mut Map<String, Value>) {
        let (rx, ry) = if r == 0.0 {
            (0.0, 0.0)
        } else {
            let (w, h) = key.size_mm(self.pitch);
            let local = Pose::new(self.centre(key).x, self.centre(key).y, key.pose.r);
            let corner = local.transform(Position::new(-w / 2.0, h / 2.0));
            (tidy(corner.x / self.pitch), tidy(-corner.y / self.pitch))
        };

        self.close_row();
        self.group = Group { r, rx, ry };
        self.x = 0.0;
        self.y = 0.0;
        props.insert("r".into(), r.into());
        props.insert("rx".into(), rx.into());
        props.insert("ry".into(), ry.into());
    }

    fn push_key(&mut self, key: &Key) {
        let mut props = Map::new();
        let r = tidy(-key.pose.r);
        if !close(r, self.group.r) {
            self.start_group(key, r, &mut props);
        }

        let Group { r, rx, ry } = self.group;
        let (w, h) = (key.unit_width, key.unit_height);

        // Undo the group rotation to get the key's top-left corner in the
        // rotated KLE frame.
        let centre = self.centre(key);
        let rel = Pose::new(0.0, 0.0, r).transform(Position::new(
            centre.x - rx * self.pitch,
            centre.y + ry * self.pitch,
        ));
        let x = tidy(rel.x / self.pitch - w / 2.0);
        let y = tidy(-rel.y / self.pitch - h / 2.0);

        if !close(x, self.x) {
            props.insert("x".into(), tidy(x - self.x).into());
            self.x = x;
        }
        if !close(y, self.y) {
            props.insert("y".into(), tidy(y - self.y).into());
            self.y = y;
        }
        if w != 1.0 {
            props.insert("w".into(), w.into());
        }
        if h != 1.0 {
            props.insert("h".into(), h.into());
        }

        if !props.is_empty() {
            self.row.push(Value::Object(props));
        }
        self.row.push(Value::String(String::new()));
        self.x += w;
    }
}

/// Encodes keys as a KLE document.
///
/// Keys are emitted in order. A new row starts wherever the row detector
/// splits the sequence and wherever the key rotation changes; a rotation
/// change also restates `r`, `rx` and `ry`, anchoring the new group at the
/// top-left corner of its first key.
pub fn encode(keys: &[Key], options: &EncodeOptions, pitch: f64) -> Value {
    let origin = match Bounds::of_placeholders(keys, pitch) {
        Some(bounds) if options.normalize => Position::new(bounds.min_x, bounds.max_y),
        _ => Position::default(),
    };

    let mut encoder = Encoder {
        pitch,
        origin,
        doc: Vec::new(),
        row: Vec::new(),
        group: Group {
            r: 0.0,
            rx: 0.0,
            ry: 0.0,
        },
        x: 0.0,
        y: 0.0,
    };

    let mut meta = Map::new();
    if let Some(name) = &options.name {
        meta.insert("name".into(), name.clone().into());
    }
    if let Some(outline) = options.outline {
        meta.insert(KLE_OUTLINE_KEY.into(), outline.as_str().into());
    }
    if !meta.is_empty() {
        encoder.doc.push(Value::Object(meta));
    }

    for range in row_ranges(keys) {
        for key in &keys[range] {
            encoder.push_key(key);
        }
        encoder.close_row();
    }

    Value::Array(encoder.doc)
}
