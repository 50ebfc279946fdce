pub mod point_index;
pub mod polygon_3d;

pub use point_index::PointIndex;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Distance below which two lengths (or radii) are considered equal.
pub const CONFUSION: f64 = 1e-7;

/// Returns `v` normalized, or `None` when it is shorter than [`TOLERANCE`].
#[must_use]
pub fn try_normalize(v: &Vector3) -> Option<Vector3> {
    let len = v.norm();
    (len >= TOLERANCE).then(|| v / len)
}

/// Angle in `[0, pi]` between two vectors, or `None` if either is degenerate.
#[must_use]
pub fn angle_between(a: &Vector3, b: &Vector3) -> Option<f64> {
    let a = try_normalize(a)?;
    let b = try_normalize(b)?;
    Some(a.dot(&b).clamp(-1.0, 1.0).acos())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn normalize_rejects_zero_vector() {
        assert!(try_normalize(&Vector3::zeros()).is_none());
        let n = try_normalize(&Vector3::new(0.0, 3.0, 4.0)).unwrap();
        assert!((n.norm() - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn angle_between_axes() {
        let a = angle_between(&Vector3::x(), &Vector3::y()).unwrap();
        assert!((a - FRAC_PI_2).abs() < TOLERANCE);
        assert!(angle_between(&Vector3::x(), &Vector3::zeros()).is_none());
    }
}
