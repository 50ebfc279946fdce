use crate::error::{GeometryError, Result};
use crate::math::{try_normalize, Point3, Vector3, TOLERANCE};

use super::{Surface, SurfaceDomain};

/// A constant-radius blend: the part of a circular cylinder swept between
/// two contact lines.
///
/// `u` in `[0, 1]` runs along the axis segment `center -> center + spine`,
/// `v` in `[0, 1]` turns from the first contact line to the second:
///
/// `P(u, v) = center + u * spine + radius * (cos(v * sweep) * ref_dir + sin(v * sweep) * binormal)`
///
/// The surface normal points away from the axis.
#[derive(Debug, Clone)]
pub struct Cylinder {
    center: Point3,
    spine: Vector3,
    radius: f64,
    ref_dir: Vector3,
    binormal: Vector3,
    sweep: f64,
}

impl Cylinder {
    /// Creates the blend cylinder around the axis through `center` along
    /// `spine`, from the contact point `first` to the contact point `second`.
    ///
    /// Both contacts must lie in the plane normal to the axis through
    /// `center`, at the same distance from it.
    ///
    /// # Errors
    ///
    /// Returns an error if the spine is degenerate, a contact lies on the
    /// axis or off the section plane, the contacts are at different radii,
    /// or they are diametrically opposite (the turning side is ambiguous).
    pub fn through_contacts(center: Point3, spine: Vector3, first: &Point3, second: &Point3) -> Result<Self> {
        let axis = try_normalize(&spine).ok_or(GeometryError::ZeroVector)?;
        let (a, b) = (first - center, second - center);
        let tolerance = 1e-9 * (1.0 + a.norm());
        if a.dot(&axis).abs() > tolerance || b.dot(&axis).abs() > tolerance {
            return Err(GeometryError::Degenerate("contacts must lie in the section plane".into()).into());
        }
        let radius = a.norm();
        if radius < TOLERANCE {
            return Err(GeometryError::Degenerate("cylinder radius must be positive".into()).into());
        }
        if (b.norm() - radius).abs() > tolerance {
            return Err(GeometryError::Degenerate("contacts are at different radii".into()).into());
        }
        let ref_dir = a / radius;
        let binormal = try_normalize(&(b - ref_dir * b.dot(&ref_dir))).ok_or_else(|| {
            GeometryError::Degenerate("contacts are collinear with the axis".into())
        })?;
        let sweep = b.dot(&binormal).atan2(b.dot(&ref_dir));
        Ok(Self {
            center,
            spine,
            radius,
            ref_dir,
            binormal,
            sweep,
        })
    }

    /// Axis point of the start section.
    #[must_use]
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Axis segment from the start section to the end section.
    #[must_use]
    pub fn spine(&self) -> &Vector3 {
        &self.spine
    }

    /// Angle (radians, in `(0, pi)`) between the two contact lines.
    #[must_use]
    pub fn sweep(&self) -> f64 {
        self.sweep
    }

    fn radial(&self, v: f64) -> Vector3 {
        let angle = v * self.sweep;
        self.ref_dir * angle.cos() + self.binormal * angle.sin()
    }
}

impl Surface for Cylinder {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        Ok(self.center + self.spine * u + self.radial(v) * self.radius)
    }

    fn normal(&self, _u: f64, v: f64) -> Result<Vector3> {
        Ok(self.radial(v))
    }

    fn domain(&self) -> SurfaceDomain {
        SurfaceDomain::UNIT
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    /// Quarter blend of radius 2 around the x axis line through (0, 2, 8).
    fn quarter() -> Cylinder {
        Cylinder::through_contacts(p(0.0, 2.0, 8.0), Vector3::new(10.0, 0.0, 0.0), &p(0.0, 2.0, 10.0), &p(0.0, 0.0, 8.0))
            .unwrap()
    }

    #[test]
    fn contacts_are_the_boundary_lines() {
        let c = quarter();
        assert_abs_diff_eq!(c.radius(), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(c.sweep(), FRAC_PI_2, epsilon = 1e-12);
        assert!((c.evaluate(0.0, 0.0).unwrap() - p(0.0, 2.0, 10.0)).norm() < 1e-12);
        assert!((c.evaluate(1.0, 1.0).unwrap() - p(10.0, 0.0, 8.0)).norm() < 1e-12);
    }

    #[test]
    fn midpoint_bulges_towards_the_edge() {
        let c = quarter();
        let mid = c.evaluate(0.5, 0.5).unwrap();
        let h = 0.5_f64.sqrt();
        assert!((mid - p(5.0, 2.0 - 2.0 * h, 8.0 + 2.0 * h)).norm() < 1e-12);
        let n = c.normal(0.5, 0.5).unwrap();
        assert!((n - Vector3::new(0.0, -h, h)).norm() < 1e-12);
    }

    #[test]
    fn mismatched_contacts_are_rejected() {
        let center = p(0.0, 0.0, 0.0);
        let spine = Vector3::x();
        assert!(Cylinder::through_contacts(center, spine, &p(0.0, 1.0, 0.0), &p(0.0, 0.0, 2.0)).is_err());
        assert!(Cylinder::through_contacts(center, spine, &p(0.5, 1.0, 0.0), &p(0.0, 0.0, 1.0)).is_err());
        assert!(Cylinder::through_contacts(center, spine, &p(0.0, 1.0, 0.0), &p(0.0, -1.0, 0.0)).is_err());
        assert!(Cylinder::through_contacts(center, Vector3::zeros(), &p(0.0, 1.0, 0.0), &p(0.0, 0.0, 1.0)).is_err());
    }
}
