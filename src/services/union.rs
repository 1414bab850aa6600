//! Union of straight-edged polygons.
//!
//! Every edge is cut wherever another polygon touches it. A piece survives
//! when the area just outside it is not covered by any other polygon, so
//! edges shared by neighbouring keys cancel and coincident edges facing the
//! same way are kept once. The surviving pieces are then chained back into
//! rings: counter-clockwise islands and clockwise holes.

use tracing::debug;

use super::outline::{ring_area, ring_contains};
use crate::models::Position;

/// Points closer than this are the same vertex.
const SNAP: f64 = 1e-6;

/// Distance of the side samples taken next to an edge piece.
const PROBE: f64 = 1e-5;

fn sub(a: Position, b: Position) -> Position {
    Position::new(a.x - b.x, a.y - b.y)
}

fn dot(a: Position, b: Position) -> f64 {
    a.x * b.x + a.y * b.y
}

fn cross(a: Position, b: Position) -> f64 {
    a.x * b.y - a.y * b.x
}

fn norm(a: Position) -> f64 {
    a.x.hypot(a.y)
}

fn lerp(a: Position, d: Position, t: f64) -> Position {
    Position::new(a.x + d.x * t, a.y + d.y * t)
}

fn edges(ring: &[Position]) -> impl Iterator<Item = (Position, Position)> + '_ {
    let n = ring.len();
    (0..n).map(move |k| (ring[k], ring[(k + 1) % n]))
}

/// Union of `rings` as separate rings, islands counter-clockwise and holes
/// clockwise. Input rings may have either orientation.
pub(crate) fn union_rings(rings: &[Vec<Position>]) -> Vec<Vec<Position>> {
    let rings: Vec<Vec<Position>> = rings
        .iter()
        .filter(|ring| ring.len() >= 3 && ring_area(ring).abs() > SNAP)
        .map(|ring| {
            let mut ring = ring.clone();
            if ring_area(&ring) < 0.0 {
                ring.reverse();
            }
            ring
        })
        .collect();

    let mut pieces = Vec::new();
    for (owner, ring) in rings.iter().enumerate() {
        for (a, b) in edges(ring) {
            pieces.extend(
                split_edge(a, b, owner, &rings)
                    .into_iter()
                    .filter(|&(p, q)| on_union_boundary(p, q, owner, &rings)),
            );
        }
    }

    let merged: Vec<Vec<Position>> = stitch(&pieces)
        .into_iter()
        .map(simplify)
        .filter(|ring| ring.len() >= 3 && ring_area(ring).abs() > SNAP)
        .collect();
    debug!(polygons = rings.len(), rings = merged.len(), "merged polygons");
    merged
}

/// Cuts `a → b` at every vertex of another ring lying on it and at every
/// crossing with another ring's edges.
fn split_edge(
    a: Position,
    b: Position,
    owner: usize,
    rings: &[Vec<Position>],
) -> Vec<(Position, Position)> {
    let d = sub(b, a);
    let len = norm(d);
    if len <= SNAP {
        return Vec::new();
    }

    let mut cuts = Vec::new();
    for (j, other) in rings.iter().enumerate() {
        if j == owner {
            continue;
        }
        for (c, e) in edges(other) {
            let offset = sub(c, a);
            if (cross(d, offset) / len).abs() < SNAP {
                cuts.push(dot(offset, d) / (len * len));
            }

            let f = sub(e, c);
            let denom = cross(d, f);
            if denom.abs() > 1e-12 * len * norm(f) {
                let t = cross(offset, f) / denom;
                let u = cross(offset, d) / denom;
                if (0.0..=1.0).contains(&u) {
                    cuts.push(t);
                }
            }
        }
    }

    cuts.retain(|&t| t * len > SNAP && (1.0 - t) * len > SNAP);
    cuts.sort_by(f64::total_cmp);
    cuts.dedup_by(|later, earlier| (*later - *earlier) * len < SNAP);

    let mut stops = Vec::with_capacity(cuts.len() + 2);
    stops.push(a);
    stops.extend(cuts.into_iter().map(|t| lerp(a, d, t)));
    stops.push(b);
    stops.windows(2).map(|w| (w[0], w[1])).collect()
}

fn on_ring_boundary(ring: &[Position], point: Position) -> bool {
    edges(ring).any(|(a, b)| {
        let d = sub(b, a);
        let len2 = dot(d, d);
        if len2 == 0.0 {
            return norm(sub(point, a)) < SNAP;
        }
        let t = (dot(sub(point, a), d) / len2).clamp(0.0, 1.0);
        norm(sub(point, lerp(a, d, t))) < SNAP
    })
}

/// Whether the piece `p → q` of ring `owner` borders the union.
fn on_union_boundary(p: Position, q: Position, owner: usize, rings: &[Vec<Position>]) -> bool {
    let d = sub(q, p);
    let len = norm(d);
    if len <= SNAP {
        return false;
    }

    // Counter-clockwise rings have their outside on the right.
    let step = PROBE.min(len / 4.0);
    let normal = Position::new(d.y / len, -d.x / len);
    let mid = lerp(p, d, 0.5);
    let outside = lerp(mid, normal, step);
    let inside = lerp(mid, normal, -step);

    rings
        .iter()
        .enumerate()
        .filter(|&(j, _)| j != owner)
        .all(|(j, other)| {
            if ring_contains(other, outside) {
                return false;
            }
            // The same edge on a lower ring facing the same way is kept there.
            !(j < owner && ring_contains(other, inside) && on_ring_boundary(other, mid))
        })
}

fn vertex_id(vertices: &mut Vec<Position>, point: Position) -> usize {
    if let Some(id) = vertices.iter().position(|&v| norm(sub(v, point)) < SNAP) {
        return id;
    }
    vertices.push(point);
    vertices.len() - 1
}

/// Counter-clockwise turn from `incoming` to `outgoing`; a full reversal
/// ranks last.
fn turn(incoming: Position, outgoing: Position) -> f64 {
    let angle = cross(incoming, outgoing).atan2(dot(incoming, outgoing));
    if angle > std::f64::consts::PI - 1e-9 {
        f64::NEG_INFINITY
    } else {
        angle
    }
}

/// Chains pieces into closed rings. Where several pieces leave the same
/// vertex the sharpest left turn wins, which keeps rings touching at a
/// single point apart.
fn stitch(pieces: &[(Position, Position)]) -> Vec<Vec<Position>> {
    let mut vertices = Vec::new();
    let segments: Vec<(usize, usize)> = pieces
        .iter()
        .map(|&(p, q)| (vertex_id(&mut vertices, p), vertex_id(&mut vertices, q)))
        .filter(|(from, to)| from != to)
        .collect();

    let mut outgoing = vec![Vec::new(); vertices.len()];
    for (k, &(from, _)) in segments.iter().enumerate() {
        outgoing[from].push(k);
    }
    let direction = |k: usize| sub(vertices[segments[k].1], vertices[segments[k].0]);

    let mut used = vec![false; segments.len()];
    let mut rings = Vec::new();
    for start in 0..segments.len() {
        if used[start] {
            continue;
        }
        used[start] = true;

        let origin = segments[start].0;
        let mut ring = vec![vertices[origin]];
        let mut current = start;
        let closed = loop {
            let to = segments[current].1;
            if to == origin {
                break true;
            }
            ring.push(vertices[to]);

            let incoming = direction(current);
            let next = outgoing[to]
                .iter()
                .copied()
                .filter(|&k| !used[k])
                .max_by(|&x, &y| turn(incoming, direction(x)).total_cmp(&turn(incoming, direction(y))));
            match next {
                Some(k) => {
                    used[k] = true;
                    current = k;
                }
                None => break false,
            }
        };

        if closed {
            rings.push(ring);
        } else {
            debug!(vertices = ring.len(), "dropped open boundary chain");
        }
    }
    rings
}

/// Removes vertices that sit on a straight line between their neighbours.
fn simplify(mut ring: Vec<Position>) -> Vec<Position> {
    loop {
        let n = ring.len();
        if n < 3 {
            return ring;
        }
        let redundant = (0..n).find(|&k| {
            let u = sub(ring[k], ring[(k + n - 1) % n]);
            let v = sub(ring[(k + 1) % n], ring[k]);
            cross(u, v).abs() <= SNAP * (norm(u) + norm(v))
        });
        match redundant {
            Some(k) => {
                ring.remove(k);
            }
            None => return ring,
        }
    }
}
