//! Blend geometry computed for one contour.

use crate::error::Result;
use crate::geometry::curve::{Arc, Ellipse, Line};
use crate::math::{Point3, Vector3};
use crate::topology::{EdgeCurve, EdgeId, FaceId, FaceSurface, VertexId};

/// Outcome of blending one contour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendStatus {
    #[default]
    Ok,
    /// Unclassified failure: bad radius law, unsupported geometry or a
    /// vertex the blend cannot pass.
    Error,
    /// The blend could not be carried along the adjoining faces (it runs
    /// off a face or cannot be trimmed against it).
    WalkingFailure,
    /// No starting section exists (support faces tangent or not planar).
    StartSolutionFailure,
    /// The blend surface folds over itself.
    TwistedSurface,
}

/// Where a section touches one support face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub face: FaceId,
    pub point: Point3,
}

/// The plane cut of a blend mitred against another at a sharp vertex.
///
/// For rounded sections the cut follows the ellipse
/// `center + cos(t) * major + sin(t) * minor`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mitre {
    pub center: Point3,
    pub major: Vector3,
    pub minor: Vector3,
}

/// A cross-section of a blend.
#[derive(Debug, Clone)]
pub struct BlendSection {
    /// Contour parameter of the section.
    pub parameter: f64,
    /// Contour vertex at the section, if it lies at an edge end.
    pub vertex: Option<VertexId>,
    pub spine_point: Point3,
    /// Unit spine direction; the section plane is normal to it.
    pub tangent: Vector3,
    pub center: Point3,
    pub radius: f64,
    pub first: Contact,
    pub second: Contact,
    /// `false` for straight (chamfer) sections.
    pub rounded: bool,
    /// Set when the section was replaced by a mitre cut; the contacts are
    /// then the ends of the cut.
    pub mitre: Option<Mitre>,
}

impl BlendSection {
    /// Contact point on `face`, if the section touches it.
    #[must_use]
    pub fn contact_on(&self, face: FaceId) -> Option<Point3> {
        [self.first, self.second]
            .into_iter()
            .find_map(|c| (c.face == face).then_some(c.point))
    }

    /// The section curve, from the first contact to the second.
    ///
    /// # Errors
    ///
    /// Returns an error if the section is degenerate.
    pub fn curve(&self) -> Result<EdgeCurve> {
        let (from, to) = (self.first.point, self.second.point);
        if let (true, Some(m)) = (self.rounded, self.mitre) {
            let ellipse = Ellipse::from_axes_and_ends(m.center, m.major, m.minor, &from, &to)?;
            return Ok(EdgeCurve::Ellipse(ellipse));
        }
        if self.rounded {
            let arc = Arc::from_center_and_ends(self.center, self.tangent, &from, &to)?;
            Ok(EdgeCurve::Arc(arc))
        } else {
            Ok(EdgeCurve::Line(Line::through(from, to)?.0))
        }
    }
}

/// One blend surface piece, spanning part of a single spine edge.
#[derive(Debug, Clone)]
pub struct BlendPatch {
    pub edge: EdgeId,
    /// Contour parameters at the start and end sections.
    pub range: (f64, f64),
    pub surface: FaceSurface,
    /// Sections at `range.0` and `range.1`.
    pub sections: [BlendSection; 2],
    /// Whether the blend removes material (an outside corner).
    pub convex: bool,
}

impl BlendPatch {
    /// The two support faces, the first being the one that runs along the
    /// spine edge in the edge's own direction.
    #[must_use]
    pub fn supports(&self) -> (FaceId, FaceId) {
        (self.sections[0].first.face, self.sections[0].second.face)
    }
}

/// All blend patches of one contour, in contour order.
#[derive(Debug, Clone)]
pub struct Stripe {
    /// 1-based contour index.
    pub contour: usize,
    pub patches: Vec<BlendPatch>,
}

impl Stripe {
    /// Patches built along `edge`.
    pub fn patches_on(&self, edge: EdgeId) -> impl Iterator<Item = &BlendPatch> + '_ {
        self.patches.iter().filter(move |p| p.edge == edge)
    }
}
