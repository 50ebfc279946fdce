use crate::error::{GeometryError, Result};
use crate::math::{try_normalize, Point3, Vector3};

use super::{Surface, SurfaceDomain};

/// An unbounded plane with an orthonormal frame.
///
/// `P(u, v) = origin + u * u_dir + v * v_dir`, normal `u_dir x v_dir`.
/// Planar faces of the input and chamfer patches both use it.
#[derive(Debug, Clone)]
pub struct Plane {
    origin: Point3,
    u_dir: Vector3,
    v_dir: Vector3,
    normal: Vector3,
}

impl Plane {
    /// Plane through `origin` spanned by `u_dir` and `v_dir`; `v_dir` is
    /// re-orthogonalised against `u_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if either direction vanishes or they are parallel.
    pub fn new(origin: Point3, u_dir: Vector3, v_dir: Vector3) -> Result<Self> {
        let u_dir = try_normalize(&u_dir).ok_or(GeometryError::ZeroVector)?;
        let normal = try_normalize(&u_dir.cross(&v_dir))
            .ok_or_else(|| GeometryError::Degenerate("plane directions are parallel".into()))?;
        Ok(Self {
            origin,
            u_dir,
            v_dir: normal.cross(&u_dir),
            normal,
        })
    }

    /// Plane through `origin` with the given normal and an arbitrary frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal vanishes.
    pub fn from_normal(origin: Point3, normal: Vector3) -> Result<Self> {
        let normal = try_normalize(&normal).ok_or(GeometryError::ZeroVector)?;
        let helper = if normal.x.abs() < 0.9 { Vector3::x() } else { Vector3::y() };
        let u_dir = normal.cross(&helper).normalize();
        Ok(Self {
            origin,
            u_dir,
            v_dir: normal.cross(&u_dir),
            normal,
        })
    }

    #[must_use]
    pub fn plane_normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Signed distance from `point`, positive on the normal side.
    #[must_use]
    pub fn signed_distance(&self, point: &Point3) -> f64 {
        (point - self.origin).dot(&self.normal)
    }
}

impl Surface for Plane {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        Ok(self.origin + self.u_dir * u + self.v_dir * v)
    }

    fn normal(&self, _u: f64, _v: f64) -> Result<Vector3> {
        Ok(self.normal)
    }

    fn domain(&self) -> SurfaceDomain {
        SurfaceDomain::UNBOUNDED
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::TOLERANCE;

    #[test]
    fn skewed_frame_is_orthogonalised() {
        let plane = Plane::new(Point3::origin(), Vector3::x(), Vector3::new(1.0, 1.0, 0.0)).unwrap();
        assert!((plane.plane_normal() - Vector3::z()).norm() < TOLERANCE);
        let q = plane.evaluate(0.0, 2.0).unwrap();
        assert!((q - Point3::new(0.0, 2.0, 0.0)).norm() < TOLERANCE);
        assert!(Plane::new(Point3::origin(), Vector3::x(), Vector3::x() * 3.0).is_err());
    }

    #[test]
    fn frame_from_normal_stays_in_the_plane() {
        let n = Vector3::new(0.0, -1.0, 1.0);
        let plane = Plane::from_normal(Point3::new(0.0, 0.0, 8.0), n).unwrap();
        for (u, v) in [(1.0, 0.0), (0.0, 1.0), (-3.0, 2.5)] {
            let q = plane.evaluate(u, v).unwrap();
            assert!(plane.signed_distance(&q).abs() < TOLERANCE);
        }
        assert!(Plane::from_normal(Point3::origin(), Vector3::zeros()).is_err());
    }

    #[test]
    fn signed_distance_sign_follows_normal() {
        let plane = Plane::from_normal(Point3::new(0.0, 0.0, 1.0), Vector3::z()).unwrap();
        assert!((plane.signed_distance(&Point3::new(5.0, 5.0, 3.0)) - 2.0).abs() < TOLERANCE);
        assert!((plane.signed_distance(&Point3::origin()) + 1.0).abs() < TOLERANCE);
    }
}
