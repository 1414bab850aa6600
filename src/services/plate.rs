//! Switch mounting plate.
//!
//! The plate keeps the board outline as its exterior and cuts one opening
//! per key (switch square plus Cherry stabilizer housings) and, optionally,
//! one per mounting hole.

use cavalier_contours::polyline::Polyline;
use tracing::{debug, warn};

use super::outline::{circle, flatten, Outline, Region};
use crate::config::{GeometryConfig, PlateConfig};
use crate::error::{KbError, Result};
use crate::models::{Key, Keyboard, Position};

/// Which features the plate cuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlateOptions {
    /// Cut a switch opening for every key
    pub cutouts: bool,
    /// Cut the keyboard's mounting holes
    pub mounting_holes: bool,
}

impl Default for PlateOptions {
    fn default() -> Self {
        Self {
            cutouts: true,
            mounting_holes: false,
        }
    }
}

/// Distance between the switch centre and each stabilizer housing, indexed
/// by the smallest stabilizer size it serves.
const STABILIZER_OFFSETS: [(f64, f64); 2] = [(2.0, 11.9), (6.0, 47.0)];

fn stabilizer_offset(size: f64) -> Option<f64> {
    STABILIZER_OFFSETS
        .iter()
        .filter(|(min_size, _)| *min_size <= size)
        .map(|&(_, offset)| offset)
        .last()
}

/// Outline of a Cherry stabilizer pair, centred on the switch, wire along x.
fn cherry_stabilizer(size: f64) -> Option<Vec<Position>> {
    let s = stabilizer_offset(size)?;
    let housing = [
        (s - 3.375, 2.3),
        (s - 3.375, 5.53),
        (s + 3.375, 5.53),
        (s + 3.375, 2.3),
        (s + 4.2, 2.3),
        (s + 4.2, -0.5),
        (s + 3.375, -0.5),
        (s + 3.375, -6.77),
        (s + 1.65, -6.77),
        (s + 1.65, -7.97),
        (s - 1.65, -7.97),
        (s - 1.65, -6.77),
        (s - 3.375, -6.77),
        (s - 3.375, -2.3),
    ];

    // The left housing is the right one mirrored; walking it backwards keeps
    // the ring simple.
    let right = housing.iter().map(|&(x, y)| Position::new(x, y));
    let left = housing.iter().rev().map(|&(x, y)| Position::new(-x, y));
    Some(right.chain(left).collect())
}

fn rotate(points: &[Position], angle: f64) -> Vec<Position> {
    let (sin, cos) = angle.to_radians().sin_cos();
    points
        .iter()
        .map(|p| Position::new(p.x * cos - p.y * sin, p.x * sin + p.y * cos))
        .collect()
}

/// Opening for one key, still in sharp-cornered form.
fn key_cutout(key: &Key, config: &PlateConfig) -> Region {
    let half = config.cutout_size / 2.0;
    let square = [
        Position::new(-half, -half),
        Position::new(half, -half),
        Position::new(half, half),
        Position::new(-half, half),
    ];

    let mut shapes = vec![square.to_vec()];
    if let Some(stab) = key.stabilizer {
        if let Some(ring) = cherry_stabilizer(stab.size) {
            shapes.push(rotate(&ring, stab.r));
        }
    }

    let placed: Vec<Vec<Position>> = shapes
        .into_iter()
        .map(|shape| shape.into_iter().map(|p| key.pose.transform(p)).collect())
        .collect();
    Region::from_polygons(&placed)
}

/// Rounded and padded feature polylines of the plate.
fn features(
    keyboard: &Keyboard,
    options: PlateOptions,
    config: &PlateConfig,
) -> Vec<Polyline<f64>> {
    let mut out = Vec::new();

    if options.cutouts {
        for key in &keyboard.keys {
            let cutout = key_cutout(key, config)
                .round(config.cutout_corner_radius, config.cutout_corner_radius)
                .offset(config.cutout_padding);
            out.extend(cutout.pos);
        }
    }

    if options.mounting_holes {
        let radius = keyboard.hole_diameter / 2.0;
        out.extend(keyboard.hole_positions.iter().map(|&p| circle(p, radius)));
    }

    out
}

/// Builds the plate for `keyboard` inside `outline`.
///
/// Overlapping openings merge into one. Openings are expected to stay
/// inside the outline; any that cross it are reported and kept as-is.
pub fn generate_plate(
    keyboard: &Keyboard,
    outline: &Outline,
    options: PlateOptions,
    plate: &PlateConfig,
    geometry: &GeometryConfig,
) -> Result<Outline> {
    if outline.exterior.len() < 3 {
        return Err(KbError::EmptyLayout);
    }

    let region = Region::union_all(features(keyboard, options, plate));
    let holes: Vec<Vec<Position>> = region
        .pos
        .iter()
        .map(|pline| flatten(pline, geometry.resolution))
        .collect();

    let crossing = holes
        .iter()
        .filter(|ring| ring.iter().any(|&p| !outline.contains(p)))
        .count();
    if crossing > 0 {
        warn!(crossing, "plate openings extend past the outline");
    }
    debug!(openings = holes.len(), "generated plate");

    Ok(Outline {
        exterior: outline.exterior.clone(),
        holes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Bounds, Controller, Stabilizer};
    use crate::services::layout::Grid;
    use crate::services::outline::generate_outline_rectangle;

    const PITCH: f64 = 19.05;

    fn keyboard(keys: Vec<Key>) -> Keyboard {
        Keyboard::new("plate", Controller::Stm32f072).with_keys(keys)
    }

    fn build(kb: &Keyboard, options: PlateOptions) -> Outline {
        let geometry = GeometryConfig::default();
        let outline = generate_outline_rectangle(&kb.keys, 1.0, &geometry).unwrap();
        generate_plate(kb, &outline, options, &PlateConfig::default(), &geometry).unwrap()
    }

    #[test]
    fn test_one_opening_per_key() {
        let kb = keyboard(Grid::new(PITCH).row(0..3, 0));
        let plate = build(&kb, PlateOptions::default());
        assert_eq!(plate.holes.len(), 3);

        for key in &kb.keys {
            assert!(!plate.contains(key.pose.position()));
        }
        // Web between neighbouring switches stays.
        assert!(plate.contains(Position::new(PITCH / 2.0, 0.0)));
    }

    #[test]
    fn test_cutout_size_includes_padding() {
        let kb = keyboard(vec![Key::new(0.0, 0.0, 0.0)]);
        let plate = build(&kb, PlateOptions::default());
        let bounds = Bounds::from_points(&plate.holes[0]).unwrap();
        assert!((bounds.width() - 14.1).abs() < 1e-3, "{bounds:?}");
    }

    #[test]
    fn test_stabilizer_widens_opening() {
        let mut key = Key::new(0.0, 0.0, 0.0).with_size(2.0, 1.0);
        key.stabilizer = Some(Stabilizer { size: 2.0, r: 0.0 });
        let kb = keyboard(vec![key]);
        let plate = build(&kb, PlateOptions::default());

        assert_eq!(plate.holes.len(), 1);
        let bounds = Bounds::from_points(&plate.holes[0]).unwrap();
        assert!((bounds.max_x - (11.9 + 4.2 + 0.05)).abs() < 1e-3, "{bounds:?}");
        assert!((bounds.min_x + (11.9 + 4.2 + 0.05)).abs() < 1e-3, "{bounds:?}");
    }

    #[test]
    fn test_mounting_holes_optional() {
        let mut kb = keyboard(Grid::new(PITCH).row(0..2, 0));
        kb.hole_positions = vec![Position::new(PITCH / 2.0, PITCH / 2.0 - 2.0)];

        let without = build(&kb, PlateOptions::default());
        let with = build(
            &kb,
            PlateOptions {
                cutouts: true,
                mounting_holes: true,
            },
        );
        assert_eq!(without.holes.len(), 2);
        assert_eq!(with.holes.len(), 3);
        assert!(!with.contains(kb.hole_positions[0]));
    }

    #[test]
    fn test_stabilizer_offsets() {
        assert_eq!(stabilizer_offset(1.0), None);
        assert_eq!(stabilizer_offset(2.75), Some(11.9));
        assert_eq!(stabilizer_offset(6.25), Some(47.0));
    }
}
