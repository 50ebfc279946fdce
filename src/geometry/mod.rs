pub mod curve;
pub mod law;
pub mod surface;

pub use curve::{Arc, Curve, CurveDomain, Ellipse, Line};
pub use law::{ConstantLaw, FnLaw, InterpolatedLaw, LawFunction, ReparameterizedLaw};
pub use surface::{Cylinder, Plane, SectionKind, Sphere, Surface, SurfaceDomain, SweptBlend};
