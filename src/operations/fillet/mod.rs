//! Fillets and chamfers along edges of a solid.
//!
//! [`MakeFillet`] is the entry point. Selected edges are grouped into
//! contours ([`contour`]), each carrying radius laws ([`radius`]). A
//! [`BlendSolver`] turns a contour into blend patches ([`stripe`]), blends
//! meeting at a vertex are mitred or closed by a corner patch ([`corner`]),
//! the faces around them are trimmed ([`rebuild`]), and the correspondence
//! between input and result is kept in a [`History`].

mod builder;
pub mod contour;
pub mod corner;
pub mod history;
pub mod params;
pub mod radius;
pub mod rebuild;
pub mod solver;
pub mod stripe;

pub use builder::{BuildState, FaultRecord, MakeFillet};
pub use history::{History, SplitKind};
pub use params::{Continuity, FilletParams, FilletShape};
pub use radius::RadiusSpec;
pub use solver::{BlendFailure, BlendRequest, BlendSolver, RollingBallSolver};
pub use stripe::{BlendPatch, BlendSection, BlendStatus, Stripe};
