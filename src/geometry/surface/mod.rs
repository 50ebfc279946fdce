//! Face surfaces: the planes of the input solid and the blend surfaces
//! built between them.

mod cylinder;
mod plane;
mod sphere;
mod swept;

pub use cylinder::Cylinder;
pub use plane::Plane;
pub use sphere::Sphere;
pub use swept::{SectionKind, SweptBlend};

use crate::error::Result;
use crate::math::{Point3, Vector3};

/// Parameter rectangle `[u_min, u_max] x [v_min, v_max]` of a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceDomain {
    pub u_min: f64,
    pub u_max: f64,
    pub v_min: f64,
    pub v_max: f64,
}

impl SurfaceDomain {
    /// The unit square blend patches are parameterised over: `u` along the
    /// spine, `v` across the section.
    pub const UNIT: Self = Self::new(0.0, 1.0, 0.0, 1.0);

    /// The whole parameter plane.
    pub const UNBOUNDED: Self = Self::new(f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY);

    #[must_use]
    pub const fn new(u_min: f64, u_max: f64, v_min: f64, v_max: f64) -> Self {
        Self {
            u_min,
            u_max,
            v_min,
            v_max,
        }
    }
}

/// A parametric surface carrying a face.
pub trait Surface {
    /// Point at `(u, v)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot be evaluated there.
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3>;

    /// Unit normal at `(u, v)`, before any face orientation is applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal is degenerate there.
    fn normal(&self, u: f64, v: f64) -> Result<Vector3>;

    fn domain(&self) -> SurfaceDomain;
}
