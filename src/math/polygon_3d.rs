//! Straight-segment and polygon helpers in 3D.

use super::{Point3, Vector3, TOLERANCE};

/// Locates `point` on the segment `start -> end`.
///
/// Returns the segment parameter `t` in `[0, 1]` when the point lies on the
/// segment within `tolerance` (measured as a distance), `None` otherwise.
#[must_use]
pub fn locate_on_segment(point: &Point3, start: &Point3, end: &Point3, tolerance: f64) -> Option<f64> {
    let dir = end - start;
    let len_sq = dir.norm_squared();
    if len_sq < TOLERANCE * TOLERANCE {
        return None;
    }
    let t = (point - start).dot(&dir) / len_sq;
    let len = len_sq.sqrt();
    if t * len < -tolerance || (t - 1.0) * len > tolerance {
        return None;
    }
    let foot = start + dir * t;
    ((point - foot).norm() <= tolerance).then_some(t.clamp(0.0, 1.0))
}

/// Computes the unit normal of a polygon using Newell's method.
///
/// Returns `None` for degenerate (zero-area) polygons.
#[must_use]
pub fn newell_normal(points: &[Point3]) -> Option<Vector3> {
    let n = points.len();
    let mut normal = Vector3::new(0.0, 0.0, 0.0);
    for i in 0..n {
        let curr = &points[i];
        let next = &points[(i + 1) % n];
        normal.x += (curr.y - next.y) * (curr.z + next.z);
        normal.y += (curr.z - next.z) * (curr.x + next.x);
        normal.z += (curr.x - next.x) * (curr.y + next.y);
    }
    super::try_normalize(&normal)
}
