//! Board outline synthesis.
//!
//! Every key contributes a placeholder rectangle (`pitch·w × pitch·h`,
//! rotated and centred at its pose). The union of placeholders is then
//! shaped by one of three strategies and rounded by sequential offsetting:
//! grow by the concave radius, shrink by concave + convex, grow by the
//! convex radius. Offsetting works on exact arc polylines; arcs are only
//! flattened into points when the final ring is produced.

use std::f64::consts::FRAC_PI_2;

use cavalier_contours::polyline::{
    seg_arc_radius_and_center, BooleanOp, PlineSource, PlineSourceMut, Polyline,
};
use cavalier_contours::shape_algorithms::{Shape, ShapeOffsetOptions};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::union::union_rings;
use crate::config::GeometryConfig;
use crate::error::{KbError, Result};
use crate::models::{Bounds, Key, OutlineKind, OutlineSpec, Position};

/// A closed polygon: one exterior ring plus optional interior rings.
///
/// Rings are stored without repeating the first point. The exterior runs
/// counter-clockwise.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Outline {
    /// Exterior ring
    pub exterior: Vec<Position>,
    /// Interior rings (cutouts)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub holes: Vec<Vec<Position>>,
}

impl Outline {
    /// Creates an outline without holes.
    #[must_use]
    pub fn new(exterior: Vec<Position>) -> Self {
        Self {
            exterior,
            holes: Vec::new(),
        }
    }

    /// Enclosed area, holes subtracted.
    #[must_use]
    pub fn area(&self) -> f64 {
        ring_area(&self.exterior).abs() - self.holes.iter().map(|h| ring_area(h).abs()).sum::<f64>()
    }

    /// Bounding box of the exterior ring.
    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(&self.exterior)
    }

    /// Whether `point` lies inside the exterior and outside every hole.
    #[must_use]
    pub fn contains(&self, point: Position) -> bool {
        ring_contains(&self.exterior, point) && !self.holes.iter().any(|h| ring_contains(h, point))
    }
}

/// Signed shoelace area, positive for counter-clockwise rings.
pub(crate) fn ring_area(ring: &[Position]) -> f64 {
    let n = ring.len();
    (0..n)
        .map(|i| {
            let (a, b) = (ring[i], ring[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum::<f64>()
        / 2.0
}

pub(crate) fn ring_contains(ring: &[Position], point: Position) -> bool {
    let n = ring.len();
    let mut inside = false;
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > point.y) != (b.y > point.y)
            && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Polygonal region made of counter-clockwise islands and holes.
///
/// Holes are kept counter-clockwise too so boolean operations treat them
/// like ordinary areas; they are reversed only when handed to the offsetter.
#[derive(Debug, Clone, Default)]
pub(crate) struct Region {
    pub pos: Vec<Polyline<f64>>,
    pub neg: Vec<Polyline<f64>>,
}

impl Region {
    /// Region covered by the union of `plines`.
    pub fn union_all(plines: impl IntoIterator<Item = Polyline<f64>>) -> Self {
        let mut region = Self::default();
        for pline in plines {
            region.add(pline);
        }
        region
    }

    /// Region covered by the union of straight-edged `rings`. Rings that
    /// share an edge exactly merge into one island.
    pub fn from_polygons(rings: &[Vec<Position>]) -> Self {
        let mut region = Self::default();
        for ring in union_rings(rings) {
            if ring_area(&ring) > 0.0 {
                region.pos.push(polygon(&ring));
            } else {
                region.neg.push(polygon(&ring));
            }
        }
        region
    }

    /// Adds the area of `pline` to the region.
    fn add(&mut self, pline: Polyline<f64>) {
        let mut merged = ccw(pline);

        let mut i = 0;
        let mut new_holes = Vec::new();
        while i < self.pos.len() {
            let result = self.pos[i].boolean(&merged, BooleanOp::Or);
            if result.pos_plines.len() == 1 {
                self.pos.swap_remove(i);
                new_holes.extend(result.neg_plines.into_iter().map(|r| ccw(r.pline)));
                if let Some(outer) = result.pos_plines.into_iter().next() {
                    merged = ccw(outer.pline);
                }
                i = 0;
            } else {
                i += 1;
            }
        }

        // Existing holes lose whatever the new area covers.
        let mut holes = Vec::with_capacity(self.neg.len());
        for hole in self.neg.drain(..) {
            let result = hole.boolean(&merged, BooleanOp::Not);
            holes.extend(result.pos_plines.into_iter().map(|r| ccw(r.pline)));
            // An island completely inside a hole survives as its own island.
            self.pos.extend(result.neg_plines.into_iter().map(|r| ccw(r.pline)));
        }
        holes.extend(new_holes);

        self.neg = holes;
        self.pos.push(merged);
    }

    /// Grows the region by `distance` (shrinks when negative).
    pub fn offset(&self, distance: f64) -> Self {
        if distance == 0.0 || self.pos.is_empty() {
            return self.clone();
        }

        let plines = self
            .pos
            .iter()
            .cloned()
            .chain(self.neg.iter().cloned().map(|mut hole| {
                hole.invert_direction_mut();
                hole
            }));
        let shape = Shape::from_plines(plines);

        // Positive offsets move to the left of the direction of travel,
        // i.e. inwards for counter-clockwise islands.
        let result = shape.parallel_offset(-distance, ShapeOffsetOptions::default());

        Self {
            pos: result.ccw_plines.into_iter().map(|p| p.polyline).collect(),
            neg: result
                .cw_plines
                .into_iter()
                .map(|p| ccw(p.polyline))
                .collect(),
        }
    }

    /// Rounds convex corners by `convex` and concave corners by `concave`.
    pub fn round(&self, convex: f64, concave: f64) -> Self {
        self.offset(concave)
            .offset(-(concave + convex))
            .offset(convex)
    }
}

/// Orients a closed polyline counter-clockwise.
fn ccw(mut pline: Polyline<f64>) -> Polyline<f64> {
    if pline.area() < 0.0 {
        pline.invert_direction_mut();
    }
    pline
}

/// Closed straight-edged polyline through `points`, counter-clockwise.
pub(crate) fn polygon(points: &[Position]) -> Polyline<f64> {
    let mut pline = Polyline::new_closed();
    for p in points {
        pline.add(p.x, p.y, 0.0);
    }
    ccw(pline)
}

/// Closed polyline describing a full circle.
pub(crate) fn circle(center: Position, radius: f64) -> Polyline<f64> {
    let mut pline = Polyline::new_closed();
    pline.add(center.x - radius, center.y, 1.0);
    pline.add(center.x + radius, center.y, 1.0);
    pline
}

/// Flattens a closed polyline into points, approximating each arc with
/// `resolution` segments per quarter turn.
pub(crate) fn flatten(pline: &Polyline<f64>, resolution: u32) -> Vec<Position> {
    let n = pline.vertex_count();
    let mut points = Vec::with_capacity(n);

    for i in 0..n {
        let v1 = pline.at(i);
        points.push(Position::new(v1.x, v1.y));
        if v1.bulge_is_zero() {
            continue;
        }

        let v2 = pline.at((i + 1) % n);
        let (_, center) = seg_arc_radius_and_center(v1, v2);
        let radius = (v1.x - center.x).hypot(v1.y - center.y);
        let sweep = 4.0 * v1.bulge.atan();
        let start = (v1.y - center.y).atan2(v1.x - center.x);
        let segments = ((sweep.abs() / FRAC_PI_2) * f64::from(resolution))
            .ceil()
            .max(1.0) as usize;

        for s in 1..segments {
            let angle = start + sweep * s as f64 / segments as f64;
            points.push(Position::new(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
            ));
        }
    }

    points
}

/// Placeholder rectangle of every key.
pub(crate) fn placeholders(keys: &[Key], pitch: f64) -> Vec<Vec<Position>> {
    keys.iter()
        .map(|key| key.placeholder_corners(pitch).to_vec())
        .collect()
}

/// Convex hull by Andrew's monotone chain, counter-clockwise, collinear
/// points removed.
pub(crate) fn convex_hull(points: &[Position]) -> Vec<Position> {
    let mut pts: Vec<Position> = points.to_vec();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let cross = |o: Position, a: Position, b: Position| {
        (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
    };

    let mut hull: Vec<Position> = Vec::with_capacity(pts.len() * 2);
    for pass in [pts.clone(), pts.into_iter().rev().collect()] {
        let floor = hull.len();
        for p in pass {
            while hull.len() >= floor + 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0
            {
                hull.pop();
            }
            hull.push(p);
        }
        hull.pop();
    }
    hull
}

fn exterior_of(region: &Region, resolution: u32) -> Result<Outline> {
    match region.pos.as_slice() {
        [] => Err(KbError::EmptyLayout),
        [island] => Ok(Outline::new(flatten(island, resolution))),
        islands => Err(KbError::DisconnectedOutline {
            islands: islands.len(),
        }),
    }
}

/// Union of all key placeholders.
fn placeholder_region(keys: &[Key], config: &GeometryConfig) -> Result<Region> {
    if keys.is_empty() {
        return Err(KbError::EmptyLayout);
    }
    Ok(Region::from_polygons(&placeholders(keys, config.pitch)))
}

/// Outline that follows the placeholders, rounding convex corners by
/// `convex` and filling concave corners with radius `concave`.
pub fn generate_outline_tight(
    keys: &[Key],
    concave: f64,
    convex: f64,
    config: &GeometryConfig,
) -> Result<Outline> {
    let region = placeholder_region(keys, config)?;
    exterior_of(&region.round(convex, concave), config.resolution)
}

/// Rounded convex hull of the placeholders.
pub fn generate_outline_convex_hull(
    keys: &[Key],
    corner_radius: f64,
    config: &GeometryConfig,
) -> Result<Outline> {
    if keys.is_empty() {
        return Err(KbError::EmptyLayout);
    }
    let corners: Vec<Position> = keys
        .iter()
        .flat_map(|k| k.placeholder_corners(config.pitch))
        .collect();
    let hull = Region::from_polygons(&[convex_hull(&corners)]);
    exterior_of(&hull.round(corner_radius, corner_radius), config.resolution)
}

/// Rounded bounding rectangle of the placeholders. A zero radius leaves
/// the corners sharp.
pub fn generate_outline_rectangle(
    keys: &[Key],
    corner_radius: f64,
    config: &GeometryConfig,
) -> Result<Outline> {
    let bounds = Bounds::of_placeholders(keys, config.pitch).ok_or(KbError::EmptyLayout)?;
    let region = Region::from_polygons(&[vec![
        Position::new(bounds.min_x, bounds.min_y),
        Position::new(bounds.max_x, bounds.min_y),
        Position::new(bounds.max_x, bounds.max_y),
        Position::new(bounds.min_x, bounds.max_y),
    ]]);
    exterior_of(&region.round(corner_radius, corner_radius), config.resolution)
}

/// Dispatches to the strategy named in `spec`.
pub fn generate_outline(keys: &[Key], spec: &OutlineSpec, config: &GeometryConfig) -> Result<Outline> {
    debug!(kind = %spec.kind, keys = keys.len(), "generating outline");
    match spec.kind {
        OutlineKind::Tight => generate_outline_tight(keys, spec.concave, spec.convex, config),
        OutlineKind::ConvexHull => generate_outline_convex_hull(keys, spec.corner_radius, config),
        OutlineKind::Rectangle => generate_outline_rectangle(keys, spec.corner_radius, config),
    }
}
