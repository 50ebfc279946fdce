use crate::error::{GeometryError, Result};
use crate::math::{try_normalize, Point3, Vector3, TOLERANCE};

use super::{Surface, SurfaceDomain};

/// A sphere, used for the corner patch where three equal rounded blends
/// meet.
///
/// `P(u, v) = center + radius * (cos(v) * (cos(u) * ref_dir + sin(u) * binormal) + sin(v) * pole)`
/// with `binormal = pole x ref_dir`; `u` is the longitude and `v` the
/// latitude. The normal points away from the center.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: Point3,
    radius: f64,
    pole: Vector3,
    ref_dir: Vector3,
}

impl Sphere {
    /// Sphere around `center` whose north pole points along `pole`.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is not positive or the pole vanishes.
    pub fn new(center: Point3, radius: f64, pole: Vector3) -> Result<Self> {
        if radius < TOLERANCE {
            return Err(GeometryError::Degenerate("sphere radius must be positive".into()).into());
        }
        let pole = try_normalize(&pole).ok_or(GeometryError::ZeroVector)?;
        let helper = if pole.x.abs() < 0.9 { Vector3::x() } else { Vector3::y() };
        let ref_dir = pole.cross(&helper).normalize();
        Ok(Self {
            center,
            radius,
            pole,
            ref_dir,
        })
    }

    #[must_use]
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Longitude and latitude of a point on the sphere.
    #[must_use]
    pub fn inverse(&self, point: &Point3) -> (f64, f64) {
        let d = (point - self.center) / self.radius;
        let v = d.dot(&self.pole).clamp(-1.0, 1.0).asin();
        let u = d.dot(&self.pole.cross(&self.ref_dir)).atan2(d.dot(&self.ref_dir));
        (u, v)
    }

    fn direction(&self, u: f64, v: f64) -> Vector3 {
        let binormal = self.pole.cross(&self.ref_dir);
        (self.ref_dir * u.cos() + binormal * u.sin()) * v.cos() + self.pole * v.sin()
    }
}

impl Surface for Sphere {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        Ok(self.center + self.direction(u, v) * self.radius)
    }

    fn normal(&self, u: f64, v: f64) -> Result<Vector3> {
        Ok(self.direction(u, v))
    }

    fn domain(&self) -> SurfaceDomain {
        use std::f64::consts::{FRAC_PI_2, TAU};
        SurfaceDomain::new(0.0, TAU, -FRAC_PI_2, FRAC_PI_2)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn pole_is_at_the_top_latitude() {
        let s = Sphere::new(Point3::new(1.0, 1.0, 9.0), 1.0, Vector3::new(-1.0, -1.0, 1.0)).unwrap();
        let top = s.evaluate(0.3, FRAC_PI_2).unwrap();
        let expected = Point3::new(1.0, 1.0, 9.0) + Vector3::new(-1.0, -1.0, 1.0).normalize();
        assert!((top - expected).norm() < 1e-12);
    }

    #[test]
    fn inverse_recovers_the_parameters() {
        let s = Sphere::new(Point3::origin(), 2.0, Vector3::z()).unwrap();
        let q = s.evaluate(1.2, -0.4).unwrap();
        let (u, v) = s.inverse(&q);
        assert!((u - 1.2).abs() < 1e-12 && (v + 0.4).abs() < 1e-12);
        assert!((s.normal(u, v).unwrap() * 2.0 - (q - Point3::origin())).norm() < 1e-12);
        assert!(Sphere::new(Point3::origin(), 0.0, Vector3::z()).is_err());
    }
}
