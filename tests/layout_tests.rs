//! Library-level tests of the geometry pipeline: generators, outline,
//! matrix and the compact layout format working together.

mod fixtures;
use fixtures::PITCH;

use std::collections::HashSet;

use kbforge::config::{Config, GeometryConfig};
use kbforge::firmware::qmk_info;
use kbforge::models::{Controller, Key, Keyboard, OutlineKind, OutlineSpec, Position};
use kbforge::parser::kle;
use kbforge::services::{
    fill_matrix_rows, generate_outline, generate_outline_convex_hull, generate_outline_tight,
    holes_between_keys, mirror_keys, rotate_keys, rows, Grid, Outline,
};
use kbforge::KbError;

fn half(rows: i32, cols: i32) -> Vec<Key> {
    let grid = Grid::new(PITCH).with_arc(120.0, 2, 0);
    (0..rows).flat_map(|row| grid.row(0..cols, -row)).collect()
}

fn hull() -> OutlineSpec {
    OutlineSpec {
        kind: OutlineKind::ConvexHull,
        concave: 1.5,
        convex: 1.5,
        corner_radius: 1.5,
    }
}

#[test]
fn test_split_keyboard_pipeline() {
    let config = Config::default();
    let mut keys = mirror_keys(&half(3, 4), 10.0, false, &config.geometry);
    assert_eq!(keys.len(), 24);

    // Mirroring keeps one row per physical row.
    let detected = rows(&keys);
    assert_eq!(detected.len(), 3);
    assert!(detected.iter().all(|row| row.len() == 8));

    let shape = fill_matrix_rows(&mut keys, Controller::ProMicro.io_lines()).unwrap();
    assert_eq!((shape.rows, shape.cols), (3, 8));
    let pairs: HashSet<_> = keys.iter().filter_map(Key::pins).collect();
    assert_eq!(pairs.len(), 24);

    let outline = generate_outline(&keys, &hull(), &config.geometry).unwrap();
    assert!(keys.iter().all(|k| outline.contains(k.pose.position())));

    let keyboard = Keyboard::new("split", Controller::ProMicro).with_keys(keys);
    let info = qmk_info(&keyboard, config.geometry.pitch).unwrap();
    assert_eq!((info.height, info.width), (3, 8));
    assert_eq!(info.key_count, 24);
}

/// Asserts that every key centre and a point near each placeholder corner
/// lie inside `outline`.
fn assert_covers_keys(outline: &Outline, keys: &[Key]) {
    for (i, key) in keys.iter().enumerate() {
        let centre = key.pose.position();
        assert!(outline.contains(centre), "key {i} centre outside: {key:?}");
        for corner in key.placeholder_corners(PITCH) {
            let near = Position::new(
                corner.x + (centre.x - corner.x) * 0.25,
                corner.y + (centre.y - corner.y) * 0.25,
            );
            assert!(outline.contains(near), "key {i} corner outside: {key:?}");
        }
    }
}

#[test]
fn test_full_grid_outlines_cover_every_key() {
    let config = GeometryConfig::default();
    let grid = Grid::new(PITCH);
    let keys: Vec<Key> = (0..4).flat_map(|row| grid.row(0..12, -row)).collect();
    let placeholders = 48.0 * PITCH * PITCH;

    let tight = generate_outline_tight(&keys, 2.0, 1.0, &config).unwrap();
    assert_covers_keys(&tight, &keys);
    assert!((tight.area() - placeholders).abs() < 5.0, "tight {}", tight.area());

    let hull = generate_outline_convex_hull(&keys, 1.5, &config).unwrap();
    assert_covers_keys(&hull, &keys);
    assert!((hull.area() - placeholders).abs() < 5.0, "hull {}", hull.area());
}

#[test]
fn test_rotated_split_outlines_cover_both_halves() {
    let config = GeometryConfig::default();
    let grid = Grid::new(PITCH);
    let half: Vec<Key> = (0..3).flat_map(|row| grid.row(0..4, -row)).collect();
    // Halves overlap by a millimetre at the innermost corner.
    let keys = mirror_keys(&rotate_keys(&half, 20.0), -2.0, false, &config);
    assert_eq!(keys.len(), 24);
    let placeholders = 24.0 * PITCH * PITCH;

    let tight = generate_outline_tight(&keys, 3.0, 1.0, &config).unwrap();
    assert_covers_keys(&tight, &keys);

    let hull = generate_outline_convex_hull(&keys, 1.5, &config).unwrap();
    assert_covers_keys(&hull, &keys);

    assert!(tight.area() > 0.99 * placeholders, "tight {}", tight.area());
    assert!(tight.area() < hull.area(), "tight {} hull {}", tight.area(), hull.area());
    assert!(hull.area() > placeholders);
}

#[test]
fn test_mirror_pairs_and_gap() {
    let config = GeometryConfig::default();
    let row = Grid::new(PITCH).row(0..3, 0);
    let mirrored = mirror_keys(&row, 10.0, false, &config);

    assert_eq!(mirrored.len(), 6);
    for i in 0..6 {
        let (a, b) = (&mirrored[i], &mirrored[5 - i]);
        assert!((a.pose.x + b.pose.x).abs() < 1e-9, "key {i} mirrors key {}", 5 - i);
        assert!((a.pose.y - b.pose.y).abs() < 1e-9);
    }
    // The gap between the halves is the requested middle space.
    let inner = mirrored[3].pose.x - PITCH / 2.0;
    assert!((inner - 5.0).abs() < 1e-9);
    // The lowest placeholder edge lands on y = 0.
    assert!((mirrored[0].pose.y - PITCH / 2.0).abs() < 1e-9);

    let flipped_only = mirror_keys(&row, 10.0, true, &config);
    assert_eq!(flipped_only.len(), 3);
    assert!(flipped_only.iter().all(|k| k.pose.x < 0.0));
}

#[test]
fn test_rotate_keys_uses_half_angle() {
    let keys = vec![Key::new(PITCH, 0.0, 0.0)];
    let rotated = rotate_keys(&keys, 180.0);
    assert!((rotated[0].pose.r - 90.0).abs() < 1e-9);
    assert!(rotated[0].pose.x.abs() < 1e-9);
    assert!((rotated[0].pose.y - PITCH).abs() < 1e-9);
}

#[test]
fn test_holes_between_keys() {
    let keys = Grid::new(PITCH).row(0..3, 0);
    let holes = holes_between_keys(&keys, &[(0, 1), (1, 2)]).unwrap();
    assert!((holes[0].x - PITCH / 2.0).abs() < 1e-9);
    assert!((holes[1].x - 1.5 * PITCH).abs() < 1e-9);

    let err = holes_between_keys(&keys, &[(0, 3)]).unwrap_err();
    assert!(matches!(err, KbError::KeyIndex { index: 3, len: 3 }));
}

#[test]
fn test_arc_layout_round_trips_through_kle() {
    let mut keys = half(2, 5);
    keys[3] = keys[3].clone().with_size(1.5, 1.0);
    let doc = kle::encode(&keys, &kle::EncodeOptions::default(), PITCH);
    let decoded = kle::decode(&doc, PITCH).unwrap();

    assert_eq!(decoded.keys.len(), keys.len());
    for (i, (a, b)) in keys.iter().zip(&decoded.keys).enumerate() {
        assert!((a.pose.x - b.pose.x).abs() < 1e-4, "key {i}: {a:?} vs {b:?}");
        assert!((a.pose.y - b.pose.y).abs() < 1e-4, "key {i}: {a:?} vs {b:?}");
        assert!((a.pose.r - b.pose.r).abs() < 1e-4, "key {i}: {a:?} vs {b:?}");
        assert!((a.unit_width - b.unit_width).abs() < 1e-9);
    }
}

#[test]
fn test_kle_metadata_round_trip() {
    let keys = Grid::new(PITCH).row(0..2, 0);
    let options = kle::EncodeOptions {
        name: Some("pad".to_string()),
        outline: Some(OutlineKind::Tight),
        normalize: true,
    };
    let text = serde_json::to_string(&kle::encode(&keys, &options, PITCH)).unwrap();
    let layout = kle::decode_str(&text, PITCH).unwrap();

    assert_eq!(layout.name.as_deref(), Some("pad"));
    assert_eq!(layout.outline, Some(OutlineKind::Tight));
    // Normalised: the first key's top-left corner sits at the origin.
    assert!((layout.keys[0].pose.x - PITCH / 2.0).abs() < 1e-9);
    assert!((layout.keys[0].pose.y + PITCH / 2.0).abs() < 1e-9);
}

#[test]
fn test_kle_rejects_bad_outline_hint() {
    let err = kle::decode_str(r#"[{"kbforge-outline": "blob"}, [""]]"#, PITCH).unwrap_err();
    assert!(matches!(err, KbError::UnknownOutline(_) | KbError::Transcode(_)));
}
