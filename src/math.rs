//! Geometric helpers for stroking wide lines.

use crate::basics::PointD;

/// Epsilon for intersection calculations.
pub const INTERSECTION_EPSILON: f64 = 1.0e-30;

/// Cross product of vectors (x2-x1, y2-y1) and (x-x2, y-y2).
/// The sign indicates which side of the line (x1,y1)→(x2,y2) the point (x,y) is on.
#[inline]
pub fn cross_product(x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64) -> f64 {
    (x - x2) * (y2 - y1) - (y - y2) * (x2 - x1)
}

/// Euclidean distance between two points.
#[inline]
pub fn calc_distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let dx = x2 - x1;
    let dy = y2 - y1;
    (dx * dx + dy * dy).sqrt()
}

/// Intersection of the lines through (a, b) and (c, d).
/// Returns `None` if they are parallel.
#[inline]
#[allow(clippy::too_many_arguments)]
pub fn calc_intersection(
    ax: f64,
    ay: f64,
    bx: f64,
    by: f64,
    cx: f64,
    cy: f64,
    dx: f64,
    dy: f64,
) -> Option<(f64, f64)> {
    let num = (ay - cy) * (dx - cx) - (ax - cx) * (dy - cy);
    let den = (bx - ax) * (dy - cy) - (by - ay) * (dx - cx);
    if den.abs() < INTERSECTION_EPSILON {
        return None;
    }
    let r = num / den;
    Some((ax + r * (bx - ax), ay + r * (by - ay)))
}

/// Displacement of magnitude `thickness` perpendicular to (x1,y1)→(x2,y2).
#[inline]
pub fn calc_orthogonal(thickness: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> (f64, f64) {
    let dx = x2 - x1;
    let dy = y2 - y1;
    let d = (dx * dx + dy * dy).sqrt();
    (thickness * dy / d, -thickness * dx / d)
}

/// Whether (x, y) lies inside or on the boundary of a convex polygon of
/// either winding.
pub fn point_in_convex_polygon(vertices: &[PointD], x: f64, y: f64) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    let mut pos = false;
    let mut neg = false;
    for (i, a) in vertices.iter().enumerate() {
        let b = &vertices[(i + 1) % vertices.len()];
        let cp = cross_product(a.x, a.y, b.x, b.y, x, y);
        if cp > 0.0 {
            pos = true;
        } else if cp < 0.0 {
            neg = true;
        }
        if pos && neg {
            return false;
        }
    }
    true
}
