//! Edge curves: straight lines, circular arcs and elliptical arcs.

mod arc;
mod ellipse;
mod line;

pub use arc::Arc;
pub use ellipse::Ellipse;
pub use line::Line;

use crate::error::Result;
use crate::math::{Point3, Vector3};

/// Parameter interval `[t_min, t_max]` of a curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveDomain {
    pub t_min: f64,
    pub t_max: f64,
}

impl CurveDomain {
    #[must_use]
    pub fn new(t_min: f64, t_max: f64) -> Self {
        Self { t_min, t_max }
    }

    /// Curve parameter at fraction `s` of the interval; `s` may run either
    /// way when `t_max < t_min`.
    #[must_use]
    pub fn lerp(&self, s: f64) -> f64 {
        self.t_min + (self.t_max - self.t_min) * s
    }
}

/// A parametric curve carrying an edge.
pub trait Curve {
    /// Point at parameter `t`.
    ///
    /// # Errors
    ///
    /// Returns an error if `t` lies outside a bounded domain.
    fn evaluate(&self, t: f64) -> Result<Point3>;

    /// Unit tangent at parameter `t`, in the direction of increasing `t`.
    ///
    /// # Errors
    ///
    /// Returns an error if `t` lies outside a bounded domain.
    fn tangent(&self, t: f64) -> Result<Vector3>;

    /// Natural parameter interval; unbounded for lines.
    fn domain(&self) -> CurveDomain;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_runs_both_ways() {
        assert!((CurveDomain::new(2.0, 6.0).lerp(0.25) - 3.0).abs() < 1e-12);
        assert!((CurveDomain::new(6.0, 2.0).lerp(0.25) - 5.0).abs() < 1e-12);
    }
}
