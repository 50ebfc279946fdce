use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::{Curve, CurveDomain};

/// A circular arc in 3D space.
///
/// Defined by a center, radius, normal axis, and a reference direction
/// for the zero-angle. The parametric form sweeps from `start_angle`
/// to `end_angle` (in radians) around the normal axis.
#[derive(Debug, Clone)]
pub struct Arc {
    center: Point3,
    radius: f64,
    normal: Vector3,
    ref_dir: Vector3,
    start_angle: f64,
    end_angle: f64,
}

impl Arc {
    /// Creates a new arc.
    ///
    /// # Arguments
    ///
    /// * `center` - Center of the arc circle
    /// * `radius` - Radius (must be positive)
    /// * `normal` - Normal vector defining the arc plane
    /// * `ref_dir` - Reference direction for angle = 0 (must be perpendicular to normal)
    /// * `start_angle` - Start angle in radians
    /// * `end_angle` - End angle in radians
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is non-positive, the normal is zero-length,
    /// or the reference direction is not perpendicular to the normal.
    pub fn new(
        center: Point3,
        radius: f64,
        normal: Vector3,
        ref_dir: Vector3,
        start_angle: f64,
        end_angle: f64,
    ) -> Result<Self> {
        if radius < TOLERANCE {
            return Err(GeometryError::Degenerate("arc radius must be positive".into()).into());
        }

        let normal_len = normal.norm();
        if normal_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let normal = normal / normal_len;

        let ref_len = ref_dir.norm();
        if ref_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let ref_dir = ref_dir / ref_len;

        if normal.dot(&ref_dir).abs() > TOLERANCE {
            return Err(GeometryError::Degenerate(
                "reference direction must be perpendicular to normal".into(),
            )
            .into());
        }

        Ok(Self {
            center,
            radius,
            normal,
            ref_dir,
            start_angle,
            end_angle,
        })
    }

    /// Creates the arc around `normal` that starts at `start` and ends at `end`.
    ///
    /// The reference direction points at `start`, so the arc runs from
    /// angle 0 to a signed sweep in `(-pi, pi]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the end points are not equidistant from the
    /// center, or do not lie in the plane normal to `normal`.
    pub fn from_center_and_ends(
        center: Point3,
        normal: Vector3,
        start: &Point3,
        end: &Point3,
    ) -> Result<Self> {
        let to_start = start - center;
        let to_end = end - center;
        let radius = to_start.norm();
        if (to_end.norm() - radius).abs() > 1e-9 * radius.max(1.0) {
            return Err(GeometryError::Degenerate(
                "arc end points are not equidistant from the center".into(),
            )
            .into());
        }
        let normal_len = normal.norm();
        if normal_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let unit_normal = normal / normal_len;
        let ref_dir = to_start - unit_normal * to_start.dot(&unit_normal);
        let binormal = unit_normal.cross(&ref_dir);
        let sweep = to_end.dot(&binormal).atan2(to_end.dot(&ref_dir));
        Self::new(center, radius, unit_normal, ref_dir, 0.0, sweep)
    }

    /// Returns the center of the arc.
    #[must_use]
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    /// Returns the radius of the arc.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns the normal vector of the arc plane.
    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Returns the reference direction (angle = 0).
    #[must_use]
    pub fn ref_dir(&self) -> &Vector3 {
        &self.ref_dir
    }

    /// Signed angular extent `end_angle - start_angle`.
    #[must_use]
    pub fn sweep(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    /// Computes the second axis direction (perpendicular to both normal and `ref_dir`).
    fn binormal(&self) -> Vector3 {
        self.normal.cross(&self.ref_dir)
    }
}

impl Curve for Arc {
    fn evaluate(&self, t: f64) -> Result<Point3> {
        let binormal = self.binormal();
        let x = self.radius * t.cos();
        let y = self.radius * t.sin();
        Ok(self.center + self.ref_dir * x + binormal * y)
    }

    fn tangent(&self, t: f64) -> Result<Vector3> {
        let binormal = self.binormal();
        let dx = -self.radius * t.sin();
        let dy = self.radius * t.cos();
        let tangent = self.ref_dir * dx + binormal * dy;
        let len = tangent.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(tangent / len)
    }

    fn domain(&self) -> CurveDomain {
        CurveDomain::new(self.start_angle, self.end_angle)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn quarter_arc_from_ends() {
        let arc = Arc::from_center_and_ends(
            Point3::origin(),
            Vector3::z(),
            &Point3::new(2.0, 0.0, 0.0),
            &Point3::new(0.0, 2.0, 0.0),
        )
        .unwrap();
        assert!((arc.radius() - 2.0).abs() < TOLERANCE);
        assert!((arc.sweep() - FRAC_PI_2).abs() < 1e-12);
        let end = arc.evaluate(arc.sweep()).unwrap();
        assert!((end - Point3::new(0.0, 2.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn clockwise_ends_give_negative_sweep() {
        let arc = Arc::from_center_and_ends(
            Point3::origin(),
            Vector3::z(),
            &Point3::new(0.0, 2.0, 0.0),
            &Point3::new(2.0, 0.0, 0.0),
        )
        .unwrap();
        assert!((arc.sweep() + FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn unequal_radii_are_rejected() {
        let result = Arc::from_center_and_ends(
            Point3::origin(),
            Vector3::z(),
            &Point3::new(2.0, 0.0, 0.0),
            &Point3::new(0.0, 3.0, 0.0),
        );
        assert!(result.is_err());
    }

    #[test]
    fn tangent_is_perpendicular_to_radius() {
        let arc = Arc::new(Point3::origin(), 1.0, Vector3::z(), Vector3::x(), 0.0, 1.0).unwrap();
        let t = arc.tangent(0.3).unwrap();
        let p = arc.evaluate(0.3).unwrap();
        assert!(t.dot(&(p - Point3::origin())).abs() < 1e-12);
    }
}
