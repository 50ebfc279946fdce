//! Blend solvers.
//!
//! The engine hands a solver one contour at a time together with its
//! resolved radius law and receives the blend patches of that contour.
//! [`RollingBallSolver`] is the built-in solver: it rolls a ball (or, for
//! chamfers, a straight section) along straight spine edges between two
//! planar faces.

use std::fmt;

use tracing::debug;

use crate::error::KernelError;
use crate::geometry::surface::{Cylinder, Plane, SweptBlend};
use crate::math::{angle_between, try_normalize, Point3, Vector3};
use crate::topology::{
    EdgeCurve, FaceId, FaceSurface, ShapeRef, TopologyIndex, TopologyStore, VertexId,
};

use super::contour::{Contour, EdgeSpan, SpineEdge};
use super::params::{FilletParams, FilletShape};
use super::radius::ResolvedLaw;
use super::stripe::{BlendPatch, BlendSection, BlendStatus, Contact, Stripe};

/// Everything a solver needs to blend one contour.
#[derive(Debug, Clone, Copy)]
pub struct BlendRequest<'a> {
    /// 1-based contour index.
    pub contour: usize,
    pub spine: &'a Contour,
    pub law: &'a ResolvedLaw,
    pub shape: FilletShape,
    pub params: &'a FilletParams,
    pub index: &'a TopologyIndex,
}

/// Why a contour could not be blended.
#[derive(Debug, Clone, PartialEq)]
pub struct BlendFailure {
    pub status: BlendStatus,
    /// The element the failure was detected on.
    pub bad_shape: Option<ShapeRef>,
    /// Set when the failure is local to one contour vertex.
    pub vertex: Option<VertexId>,
    pub message: String,
}

impl BlendFailure {
    #[must_use]
    pub fn new(status: BlendStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            bad_shape: None,
            vertex: None,
            message: message.into(),
        }
    }

    /// Attaches the offending element.
    #[must_use]
    pub fn on(mut self, shape: impl Into<ShapeRef>) -> Self {
        self.bad_shape = Some(shape.into());
        self
    }

    /// Marks the failure as local to `vertex`.
    #[must_use]
    pub fn at_vertex(mut self, vertex: VertexId) -> Self {
        self.vertex = Some(vertex);
        self.bad_shape = Some(ShapeRef::Vertex(vertex));
        self
    }
}

impl fmt::Display for BlendFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.status, self.message)
    }
}

impl From<KernelError> for BlendFailure {
    fn from(err: KernelError) -> Self {
        Self::new(BlendStatus::Error, err.to_string())
    }
}

/// Computes the blend patches of one contour.
pub trait BlendSolver: fmt::Debug + Send + Sync {
    /// Blends the contour described by `request`.
    ///
    /// # Errors
    ///
    /// Returns a [`BlendFailure`] describing why the contour cannot be
    /// blended; the engine records it as a fault and moves on.
    fn solve(&self, store: &TopologyStore, request: &BlendRequest<'_>) -> Result<Stripe, BlendFailure>;
}

/// Rolling-ball solver for straight spines between planar faces.
///
/// Sections lie in planes normal to the spine. A rounded section is the
/// arc of the circle of the local radius tangent to both faces; a chamfer
/// section is the chord between the same two contact points. Every knot
/// interval of the resolved law becomes one patch: a cylinder where the
/// radius is constant and the section exact, a plane for chamfers, and a
/// [`SweptBlend`] otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct RollingBallSolver;

/// The wedge formed by the two support faces of a spine edge.
#[derive(Debug, Clone, Copy)]
struct Dihedral {
    /// Support faces; the first runs along the edge in the edge's direction.
    faces: (FaceId, FaceId),
    /// Unit directions leaving the edge into each face, normal to the edge.
    dirs: (Vector3, Vector3),
    half_angle: f64,
    bisector: Vector3,
    convex: bool,
}

impl Dihedral {
    fn section(&self, parameter: f64, spine_point: Point3, tangent: Vector3, radius: f64) -> BlendSection {
        let setback = radius / self.half_angle.tan();
        BlendSection {
            parameter,
            vertex: None,
            spine_point,
            tangent,
            center: spine_point + self.bisector * (radius / self.half_angle.sin()),
            radius,
            first: Contact {
                face: self.faces.0,
                point: spine_point + self.dirs.0 * setback,
            },
            second: Contact {
                face: self.faces.1,
                point: spine_point + self.dirs.1 * setback,
            },
            rounded: true,
            mitre: None,
        }
    }
}

/// Outward unit normal of a planar face.
fn planar_normal(store: &TopologyStore, face: FaceId) -> Result<Vector3, BlendFailure> {
    let data = store.face(face).map_err(KernelError::from)?;
    let plane = data.surface.as_plane().ok_or_else(|| {
        BlendFailure::new(BlendStatus::StartSolutionFailure, "support face is not planar").on(face)
    })?;
    let normal = *plane.plane_normal();
    Ok(if data.same_sense { normal } else { -normal })
}

fn dihedral(
    store: &TopologyStore,
    index: &TopologyIndex,
    spine: &SpineEdge,
    params: &FilletParams,
) -> Result<Dihedral, BlendFailure> {
    let edge = spine.edge;
    let uses = index.faces_of_edge(edge);
    let forward = uses.iter().find(|(_, fwd)| *fwd);
    let backward = uses.iter().find(|(_, fwd)| !*fwd);
    let (Some(&(f1, _)), Some(&(f2, _)), 2) = (forward, backward, uses.len()) else {
        return Err(
            BlendFailure::new(BlendStatus::Error, "spine edge is not shared by two opposed faces")
                .on(edge),
        );
    };
    let (n1, n2) = (planar_normal(store, f1)?, planar_normal(store, f2)?);
    let d = spine.info.start_tangent;
    let m1 = n1.cross(&d);
    let m2 = n2.cross(&-d);
    let alpha = angle_between(&m1, &m2).unwrap_or(0.0);
    let tol = params.angular_tolerance;
    if alpha < tol || std::f64::consts::PI - alpha < tol {
        return Err(BlendFailure::new(
            BlendStatus::StartSolutionFailure,
            "support faces are tangent along the spine",
        )
        .on(edge));
    }
    let (m1, m2) = (m1.normalize(), m2.normalize());
    let bisector = try_normalize(&(m1 + m2)).ok_or_else(|| {
        BlendFailure::new(BlendStatus::StartSolutionFailure, "support faces are folded").on(edge)
    })?;
    Ok(Dihedral {
        faces: (f1, f2),
        dirs: (m1, m2),
        half_angle: 0.5 * alpha,
        bisector,
        convex: m1.dot(&n2) < 0.0,
    })
}

/// Surface of the patch between two sections. Radii closer than
/// `approx_tolerance_3d` make a cylinder.
fn patch_surface(
    shape: FilletShape,
    params: &FilletParams,
    wedge: &Dihedral,
    from: &BlendSection,
    to: &BlendSection,
) -> crate::error::Result<FaceSurface> {
    let run = to.spine_point - from.spine_point;
    if !shape.is_rounded() {
        let mid = |s: &BlendSection| Point3::from(0.5 * (s.first.point.coords + s.second.point.coords));
        let mut normal = (wedge.dirs.1 - wedge.dirs.0).cross(&(mid(to) - mid(from)));
        if (normal.dot(&wedge.bisector) < 0.0) != wedge.convex {
            normal = -normal;
        }
        return Ok(FaceSurface::Plane(Plane::from_normal(from.first.point, normal)?));
    }
    let exact = matches!(shape, FilletShape::Rational | FilletShape::QuasiAngular);
    if exact && (from.radius - to.radius).abs() < params.approx_tolerance_3d {
        let cylinder = Cylinder::through_contacts(from.center, run, &from.first.point, &from.second.point)?;
        return Ok(FaceSurface::Cylinder(cylinder));
    }
    let swept = SweptBlend::new(
        from.spine_point,
        run,
        wedge.dirs.0,
        wedge.dirs.1,
        (from.radius, to.radius),
        shape.section_kind(),
    )?;
    Ok(FaceSurface::Blend(swept))
}

impl RollingBallSolver {
    fn solve_edge(
        store: &TopologyStore,
        request: &BlendRequest<'_>,
        spine: &SpineEdge,
        span: &EdgeSpan,
        knots: &[(f64, f64)],
        ends: (VertexId, VertexId),
    ) -> Result<Vec<BlendPatch>, BlendFailure> {
        let data = store.edge(spine.edge).map_err(KernelError::from)?;
        if !matches!(data.curve, EdgeCurve::Line(_)) {
            return Err(
                BlendFailure::new(BlendStatus::Error, "only straight spine edges can be blended")
                    .on(spine.edge),
            );
        }
        let wedge = dihedral(store, request.index, spine, request.params)?;
        let tangent = spine.info.traversal_tangents(spine.forward).0;
        let rounded = request.shape.is_rounded();

        let mut sections = Vec::with_capacity(knots.len());
        for (k, &(w, r)) in knots.iter().enumerate() {
            let point = data.point_at(span.edge_parameter(w))?;
            let mut section = wedge.section(w, point, tangent, r);
            section.rounded = rounded;
            if k == 0 {
                section.vertex = Some(ends.0);
            } else if k + 1 == knots.len() {
                section.vertex = Some(ends.1);
            }
            sections.push(section);
        }

        sections
            .windows(2)
            .map(|pair| -> Result<BlendPatch, BlendFailure> {
                let (from, to) = (&pair[0], &pair[1]);
                let surface = patch_surface(request.shape, request.params, &wedge, from, to)?;
                Ok(BlendPatch {
                    edge: spine.edge,
                    range: (from.parameter, to.parameter),
                    surface,
                    sections: [from.clone(), to.clone()],
                    convex: wedge.convex,
                })
            })
            .collect()
    }
}

impl BlendSolver for RollingBallSolver {
    fn solve(&self, store: &TopologyStore, request: &BlendRequest<'_>) -> Result<Stripe, BlendFailure> {
        let spans = request.spine.spans();
        let vertices = request.spine.vertices();
        if request.law.edges.len() != spans.len() {
            return Err(BlendFailure::new(
                BlendStatus::Error,
                "radius law does not cover every spine edge",
            ));
        }

        let mut patches = Vec::new();
        for (j, (spine, span)) in request.spine.edges().iter().zip(&spans).enumerate() {
            let knots = &request.law.edges[j];
            if knots.len() < 2 {
                return Err(BlendFailure::new(BlendStatus::Error, "radius law has no span").on(spine.edge));
            }
            let ends = (vertices[j], vertices[j + 1]);
            patches.extend(Self::solve_edge(store, request, spine, span, knots, ends)?);
        }
        debug!(contour = request.contour, patches = patches.len(), "solved contour");
        Ok(Stripe {
            contour: request.contour,
            patches,
        })
    }
}
