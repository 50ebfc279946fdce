use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::{Curve, CurveDomain};

/// An elliptical arc in 3D space.
///
/// `P(t) = center + cos(t) * major + sin(t) * minor`, with `major` and
/// `minor` the orthogonal semi-axis vectors. Mitred blend joints, where two
/// equal cylinders meet in a plane, follow one of these.
#[derive(Debug, Clone)]
pub struct Ellipse {
    center: Point3,
    major: Vector3,
    minor: Vector3,
    start_angle: f64,
    end_angle: f64,
}

impl Ellipse {
    /// Creates an elliptical arc from its semi-axis vectors.
    ///
    /// # Errors
    ///
    /// Returns an error if either semi-axis vanishes or they are not
    /// orthogonal.
    pub fn new(center: Point3, major: Vector3, minor: Vector3, start_angle: f64, end_angle: f64) -> Result<Self> {
        let (a, b) = (major.norm(), minor.norm());
        if a < TOLERANCE || b < TOLERANCE {
            return Err(GeometryError::Degenerate("ellipse semi-axes must be positive".into()).into());
        }
        if major.dot(&minor).abs() > 1e-9 * a * b {
            return Err(GeometryError::Degenerate("ellipse semi-axes must be orthogonal".into()).into());
        }
        Ok(Self {
            center,
            major,
            minor,
            start_angle,
            end_angle,
        })
    }

    /// Creates the shorter arc of the ellipse `(center, major, minor)` from
    /// `start` to `end`.
    ///
    /// # Errors
    ///
    /// Returns an error if the axes are invalid or an end point is off the
    /// ellipse.
    pub fn from_axes_and_ends(
        center: Point3,
        major: Vector3,
        minor: Vector3,
        start: &Point3,
        end: &Point3,
    ) -> Result<Self> {
        let mut ellipse = Self::new(center, major, minor, 0.0, 0.0)?;
        let t0 = ellipse.angle_of(start)?;
        let t1 = ellipse.angle_of(end)?;
        let mut sweep = t1 - t0;
        if sweep > std::f64::consts::PI {
            sweep -= std::f64::consts::TAU;
        } else if sweep <= -std::f64::consts::PI {
            sweep += std::f64::consts::TAU;
        }
        ellipse.start_angle = t0;
        ellipse.end_angle = t0 + sweep;
        Ok(ellipse)
    }

    /// Parameter of a point on the ellipse.
    fn angle_of(&self, point: &Point3) -> Result<f64> {
        let d = point - self.center;
        let (a2, b2) = (self.major.norm_squared(), self.minor.norm_squared());
        let (c, s) = (d.dot(&self.major) / a2, d.dot(&self.minor) / b2);
        let scale = a2.sqrt();
        if ((c * c + s * s).sqrt() - 1.0).abs() > 1e-9 || (self.major * c + self.minor * s - d).norm() > 1e-9 * scale {
            return Err(GeometryError::Degenerate("point is not on the ellipse".into()).into());
        }
        Ok(s.atan2(c))
    }

    #[must_use]
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    #[must_use]
    pub fn semi_major(&self) -> f64 {
        self.major.norm()
    }

    #[must_use]
    pub fn semi_minor(&self) -> f64 {
        self.minor.norm()
    }

    /// Signed angular extent.
    #[must_use]
    pub fn sweep(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    fn derivative(&self, t: f64) -> Vector3 {
        self.minor * t.cos() - self.major * t.sin()
    }

    /// Length of the arc between parameters `t0` and `t1`, by composite
    /// Simpson's rule.
    #[must_use]
    pub fn arc_length(&self, t0: f64, t1: f64) -> f64 {
        const STEPS: usize = 64;
        let h = (t1 - t0) / STEPS as f64;
        let speed = |t: f64| self.derivative(t).norm();
        let mut sum = speed(t0) + speed(t1);
        for k in 1..STEPS {
            let weight = if k % 2 == 1 { 4.0 } else { 2.0 };
            sum += weight * speed(t0 + h * k as f64);
        }
        (sum * h / 3.0).abs()
    }
}

impl Curve for Ellipse {
    fn evaluate(&self, t: f64) -> Result<Point3> {
        Ok(self.center + self.major * t.cos() + self.minor * t.sin())
    }

    fn tangent(&self, t: f64) -> Result<Vector3> {
        let d = self.derivative(t);
        let len = d.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(d / len)
    }

    fn domain(&self) -> CurveDomain {
        CurveDomain::new(self.start_angle, self.end_angle)
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

    #[test]
    fn quarter_from_ends() {
        let e = Ellipse::from_axes_and_ends(
            Point3::origin(),
            Vector3::new(3.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            &p(3.0, 0.0, 0.0),
            &p(0.0, -1.0, 0.0),
        )
        .unwrap();
        assert_abs_diff_eq!(e.sweep(), -FRAC_PI_2, epsilon = 1e-12);
        let end = e.evaluate(e.domain().t_max).unwrap();
        assert!((end - p(0.0, -1.0, 0.0)).norm() < 1e-12);
        assert_abs_diff_eq!(e.semi_major(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn circle_length_matches_closed_form() {
        let e = Ellipse::new(Point3::origin(), Vector3::x() * 2.0, Vector3::y() * 2.0, 0.0, FRAC_PI_2).unwrap();
        assert_abs_diff_eq!(e.arc_length(0.0, FRAC_PI_2), std::f64::consts::PI, epsilon = 1e-9);
    }

    #[test]
    fn off_curve_end_is_rejected() {
        let result = Ellipse::from_axes_and_ends(
            Point3::origin(),
            Vector3::x() * 2.0,
            Vector3::y(),
            &p(2.0, 0.0, 0.0),
            &p(0.0, 2.0, 0.0),
        );
        assert!(result.is_err());
        assert!(Ellipse::new(Point3::origin(), Vector3::x(), Vector3::new(1.0, 1.0, 0.0), 0.0, 1.0).is_err());
    }
}
