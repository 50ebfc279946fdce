use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{FilletError, Result};
use crate::geometry::law::LawFunction;
use crate::topology::{
    EdgeId, FaceId, FaceSurface, ShapeRef, SolidId, TopologyIndex, TopologyStore, VertexId,
};

use super::contour::{Contour, ContourSet};
use super::corner::{plan_corners, Corner};
use super::history::History;
use super::params::{Continuity, FilletParams, FilletShape};
use super::radius::{normalize, resolve, LawFault, RadiusLaw, RadiusSpec};
use super::rebuild::WorkingShape;
use super::solver::{BlendFailure, BlendRequest, BlendSolver, RollingBallSolver};
use super::stripe::{BlendSection, BlendStatus, Stripe};

/// Progress of a fillet build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildState {
    /// No result: never built, reset, reconfigured, or the last build failed.
    #[default]
    NotDone,
    /// Inside [`MakeFillet::build`].
    Computing,
    /// Every contour was blended.
    Done,
    /// A result exists but some contours could not be blended.
    PartiallyFailed,
}

/// A contour that could not be blended.
#[derive(Debug, Clone, PartialEq)]
pub struct FaultRecord {
    /// 1-based contour index.
    pub contour: usize,
    pub status: BlendStatus,
    pub bad_shape: Option<ShapeRef>,
    /// The contour vertex the failure is local to, if any.
    pub vertex: Option<VertexId>,
    pub message: String,
}

#[derive(Debug)]
struct BuildResult {
    solid: SolidId,
    /// Stripe of each contour, `None` where the contour failed.
    stripes: Vec<Option<Stripe>>,
    new_faces: Vec<Vec<FaceId>>,
    history: History,
}

/// Builds fillets (or chamfers) along edges of a solid.
///
/// Edges are added into contours, radius laws are attached to contours,
/// edges or vertices, then [`build`](Self::build) blends every contour and
/// assembles a new solid in the same store. Contours that cannot be
/// blended are recorded as faults and skipped; the result is kept as long
/// as at least one contour succeeded.
///
/// Any change of configuration discards the result. [`reset`](Self::reset)
/// discards it explicitly and keeps the configuration.
#[derive(Debug)]
pub struct MakeFillet {
    index: TopologyIndex,
    shape: FilletShape,
    params: FilletParams,
    contours: ContourSet,
    solver: Box<dyn BlendSolver>,
    state: BuildState,
    /// Set by [`build`](Self::build) until the next invalidation; faults
    /// are only meaningful while it holds.
    attempted: bool,
    faults: Vec<FaultRecord>,
    faulty_vertices: Vec<VertexId>,
    result: Option<BuildResult>,
    simulations: HashMap<usize, Stripe>,
}

fn check_radius(radius: f64) -> std::result::Result<(), FilletError> {
    if radius.is_finite() && radius > 0.0 {
        Ok(())
    } else {
        Err(FilletError::InvalidRadius(radius))
    }
}

fn pick<'a, T>(items: &'a [T], i: usize, what: &'static str) -> std::result::Result<&'a T, FilletError> {
    i.checked_sub(1)
        .and_then(|k| items.get(k))
        .ok_or(FilletError::IndexOutOfRange {
            what,
            index: i,
            count: items.len(),
        })
}

impl MakeFillet {
    /// Prepares a fillet on `solid` with rational rounded sections.
    ///
    /// # Errors
    ///
    /// Returns an error if the solid cannot be indexed.
    pub fn new(store: &TopologyStore, solid: SolidId) -> Result<Self> {
        Ok(Self {
            index: TopologyIndex::build(store, solid)?,
            shape: FilletShape::default(),
            params: FilletParams::default(),
            contours: ContourSet::default(),
            solver: Box::new(RollingBallSolver),
            state: BuildState::NotDone,
            attempted: false,
            faults: Vec::new(),
            faulty_vertices: Vec::new(),
            result: None,
            simulations: HashMap::new(),
        })
    }

    /// Sets the cross-section shape.
    #[must_use]
    pub fn with_shape(mut self, shape: FilletShape) -> Self {
        self.shape = shape;
        self
    }

    /// Replaces the blend solver.
    #[must_use]
    pub fn with_solver(mut self, solver: Box<dyn BlendSolver>) -> Self {
        self.solver = solver;
        self
    }

    /// Discards the result and any simulation.
    fn invalidate(&mut self) {
        if self.result.is_some() {
            debug!("configuration changed, discarding fillet result");
        }
        self.result = None;
        self.simulations.clear();
        self.faults.clear();
        self.faulty_vertices.clear();
        self.attempted = false;
        self.state = BuildState::NotDone;
    }

    // ── Configuration ──

    /// The indexed input solid.
    #[must_use]
    pub fn index(&self) -> &TopologyIndex {
        &self.index
    }

    #[must_use]
    pub fn params(&self) -> &FilletParams {
        &self.params
    }

    /// Replaces the tolerance bundle.
    pub fn set_params(&mut self, params: FilletParams) {
        self.params = params;
        self.invalidate();
    }

    /// Sets the continuity required inside contours.
    pub fn set_continuity(&mut self, continuity: Continuity, angular_tolerance: f64) {
        self.params = self.params.clone().with_continuity(continuity, angular_tolerance);
        self.invalidate();
    }

    #[must_use]
    pub fn fillet_shape(&self) -> FilletShape {
        self.shape
    }

    pub fn set_fillet_shape(&mut self, shape: FilletShape) {
        self.shape = shape;
        self.invalidate();
    }

    /// The contours being configured.
    #[must_use]
    pub fn contours(&self) -> &ContourSet {
        &self.contours
    }

    fn contour_at(&self, ic: usize) -> std::result::Result<&Contour, FilletError> {
        self.contours.get(ic)
    }

    /// Adds `edge`, chaining it onto a contour it touches. Returns the
    /// 1-based index of its contour.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is not a manifold edge of the solid.
    pub fn add(&mut self, edge: EdgeId) -> Result<usize> {
        let ic = self.contours.add(&self.index, edge)?;
        self.invalidate();
        Ok(ic)
    }

    /// Adds `edge` and gives it the radius `spec`.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge cannot be added or the radius is
    /// invalid; an invalid radius leaves the contours unchanged.
    pub fn add_with_radius(&mut self, spec: RadiusSpec, edge: EdgeId) -> Result<usize> {
        let law = normalize(spec)?;
        let ic = self.add(edge)?;
        self.contours.get_mut(ic)?.laws_mut().set_edge_law(edge, law);
        Ok(ic)
    }

    /// Detaches `edge` from its contour; unmanaged edges are ignored.
    pub fn remove(&mut self, edge: EdgeId) {
        self.contours.remove(edge);
        self.invalidate();
    }

    /// Clears every radius law of contour `ic`.
    ///
    /// # Errors
    ///
    /// Returns [`FilletError::ContourOutOfRange`] for an unknown contour.
    pub fn reset_contour(&mut self, ic: usize) -> Result<()> {
        self.contours.get_mut(ic)?.laws_mut().clear();
        self.invalidate();
        Ok(())
    }

    /// Sets the radius of contour `ic`: on the whole contour when `iinc`
    /// is 0, otherwise on its `iinc`-th edge.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid radius or an unknown contour or edge.
    pub fn set_radius(&mut self, spec: RadiusSpec, ic: usize, iinc: usize) -> Result<()> {
        let law = normalize(spec)?;
        let contour = self.contours.get_mut(ic)?;
        if iinc == 0 {
            contour.laws_mut().set_contour_law(law);
        } else {
            let edge = pick(contour.edges(), iinc, "edge")?.edge;
            contour.laws_mut().set_edge_law(edge, law);
        }
        self.invalidate();
        Ok(())
    }

    /// Sets a constant radius on one edge of contour `ic`.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid radius or if the edge is not in the
    /// contour.
    pub fn set_edge_radius(&mut self, radius: f64, ic: usize, edge: EdgeId) -> Result<()> {
        check_radius(radius)?;
        let contour = self.contours.get_mut(ic)?;
        if contour.position(edge).is_none() {
            return Err(FilletError::EdgeNotInContour { contour: ic }.into());
        }
        contour.laws_mut().set_edge_law(edge, normalize(RadiusSpec::Constant(radius))?);
        self.invalidate();
        Ok(())
    }

    /// Pins the radius at a vertex of contour `ic`.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid radius or if the vertex is not on
    /// the contour.
    pub fn set_vertex_radius(&mut self, radius: f64, ic: usize, vertex: VertexId) -> Result<()> {
        check_radius(radius)?;
        let contour = self.contours.get_mut(ic)?;
        if !contour.vertices().contains(&vertex) {
            return Err(FilletError::VertexNotInContour { contour: ic }.into());
        }
        contour.laws_mut().set_vertex_radius(vertex, radius);
        self.invalidate();
        Ok(())
    }

    /// Sets an arbitrary law on one edge of contour `ic`, in the edge's own
    /// parameter.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is not in the contour.
    pub fn set_law(&mut self, ic: usize, edge: EdgeId, law: Arc<dyn LawFunction>) -> Result<()> {
        let contour = self.contours.get_mut(ic)?;
        if contour.position(edge).is_none() {
            return Err(FilletError::EdgeNotInContour { contour: ic }.into());
        }
        contour.laws_mut().set_edge_law(edge, RadiusLaw::Function(law));
        self.invalidate();
        Ok(())
    }

    // ── Contour queries ──

    #[must_use]
    pub fn nb_contours(&self) -> usize {
        self.contours.len()
    }

    /// 1-based contour index and position of `edge`.
    #[must_use]
    pub fn contains(&self, edge: EdgeId) -> Option<(usize, usize)> {
        self.contours.contains(edge)
    }

    /// 1-based index of the contour holding `edge`, 0 if none does.
    #[must_use]
    pub fn contour(&self, edge: EdgeId) -> usize {
        self.contours.contour_of(edge)
    }

    /// # Errors
    ///
    /// Returns [`FilletError::ContourOutOfRange`] for an unknown contour.
    pub fn nb_edges(&self, ic: usize) -> Result<usize> {
        Ok(self.contour_at(ic)?.edges().len())
    }

    /// The `j`-th edge (1-based) of contour `ic`.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown contour or position.
    pub fn edge(&self, ic: usize, j: usize) -> Result<EdgeId> {
        Ok(pick(self.contour_at(ic)?.edges(), j, "edge")?.edge)
    }

    /// # Errors
    ///
    /// Returns [`FilletError::ContourOutOfRange`] for an unknown contour.
    pub fn length(&self, ic: usize) -> Result<f64> {
        Ok(self.contour_at(ic)?.length())
    }

    /// # Errors
    ///
    /// Returns [`FilletError::ContourOutOfRange`] for an unknown contour.
    pub fn first_vertex(&self, ic: usize) -> Result<VertexId> {
        let count = self.contours.len();
        Ok(self
            .contour_at(ic)?
            .first_vertex()
            .ok_or(FilletError::ContourOutOfRange { index: ic, count })?)
    }

    /// # Errors
    ///
    /// Returns [`FilletError::ContourOutOfRange`] for an unknown contour.
    pub fn last_vertex(&self, ic: usize) -> Result<VertexId> {
        let count = self.contours.len();
        Ok(self
            .contour_at(ic)?
            .last_vertex()
            .ok_or(FilletError::ContourOutOfRange { index: ic, count })?)
    }

    /// Arc length from the start of contour `ic` to `vertex`.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is not on the contour.
    pub fn abscissa(&self, ic: usize, vertex: VertexId) -> Result<f64> {
        Ok(self
            .contour_at(ic)?
            .abscissa(vertex)
            .ok_or(FilletError::VertexNotInContour { contour: ic })?)
    }

    /// [`abscissa`](Self::abscissa) divided by the contour length.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is not on the contour.
    pub fn relative_abscissa(&self, ic: usize, vertex: VertexId) -> Result<f64> {
        Ok(self.abscissa(ic, vertex)? / self.length(ic)?)
    }

    /// # Errors
    ///
    /// Returns [`FilletError::ContourOutOfRange`] for an unknown contour.
    pub fn closed(&self, ic: usize) -> Result<bool> {
        Ok(self.contour_at(ic)?.is_closed())
    }

    /// # Errors
    ///
    /// Returns [`FilletError::ContourOutOfRange`] for an unknown contour.
    pub fn closed_and_tangent(&self, ic: usize) -> Result<bool> {
        Ok(self
            .contour_at(ic)?
            .is_closed_and_tangent(self.params.angular_tolerance))
    }

    /// Normalized parameter range of `edge` within contour `ic`.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is not in the contour.
    pub fn bounds(&self, ic: usize, edge: EdgeId) -> Result<(f64, f64)> {
        let span = self
            .contour_at(ic)?
            .spans()
            .into_iter()
            .find(|s| s.edge == edge)
            .ok_or(FilletError::EdgeNotInContour { contour: ic })?;
        Ok((span.first, span.last))
    }

    // ── Radius queries ──

    /// The radius law on `edge`, in the edge's own parameter.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is not in the contour or has no law.
    pub fn law(&self, ic: usize, edge: EdgeId) -> Result<Arc<dyn LawFunction>> {
        let contour = self.contour_at(ic)?;
        let span = contour
            .spans()
            .into_iter()
            .find(|s| s.edge == edge)
            .ok_or(FilletError::EdgeNotInContour { contour: ic })?;
        Ok(contour
            .laws()
            .effective_edge_law(&span)
            .ok_or(FilletError::MissingLaw { contour: ic })?)
    }

    /// Whether contour `ic` has one radius everywhere.
    ///
    /// # Errors
    ///
    /// Returns [`FilletError::ContourOutOfRange`] for an unknown contour.
    pub fn is_constant(&self, ic: usize) -> Result<bool> {
        let contour = self.contour_at(ic)?;
        Ok(contour.laws().constant_on_contour(&contour.spans()).is_some())
    }

    /// The radius of contour `ic`.
    ///
    /// # Errors
    ///
    /// Returns [`FilletError::NonConstantLaw`] if the radius varies and
    /// [`FilletError::MissingLaw`] if part of the contour has no law.
    pub fn radius(&self, ic: usize) -> Result<f64> {
        let contour = self.contour_at(ic)?;
        let spans = contour.spans();
        if let Some(r) = contour.laws().constant_on_contour(&spans) {
            return Ok(r);
        }
        if spans.iter().any(|s| contour.laws().effective_edge_law(s).is_none()) {
            return Err(FilletError::MissingLaw { contour: ic }.into());
        }
        Err(FilletError::NonConstantLaw { contour: ic }.into())
    }

    /// Whether the radius is constant along `edge`.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is not in the contour.
    pub fn is_constant_on_edge(&self, ic: usize, edge: EdgeId) -> Result<bool> {
        let contour = self.contour_at(ic)?;
        let span = contour
            .spans()
            .into_iter()
            .find(|s| s.edge == edge)
            .ok_or(FilletError::EdgeNotInContour { contour: ic })?;
        Ok(contour.laws().constant_on_edge(&span).is_some())
    }

    /// The radius along `edge`.
    ///
    /// # Errors
    ///
    /// Returns [`FilletError::NonConstantLaw`] if it varies along the edge.
    pub fn radius_on_edge(&self, ic: usize, edge: EdgeId) -> Result<f64> {
        let contour = self.contour_at(ic)?;
        let span = contour
            .spans()
            .into_iter()
            .find(|s| s.edge == edge)
            .ok_or(FilletError::EdgeNotInContour { contour: ic })?;
        Ok(contour
            .laws()
            .constant_on_edge(&span)
            .ok_or(FilletError::NonConstantLaw { contour: ic })?)
    }

    // ── Computation ──

    /// Resolves the law of contour `ic` and runs the solver on it.
    fn compute_contour(
        &self,
        store: &TopologyStore,
        ic: usize,
    ) -> std::result::Result<Stripe, BlendFailure> {
        let contour = self
            .contour_at(ic)
            .map_err(|e| BlendFailure::new(BlendStatus::Error, e.to_string()))?;
        let spans = contour.spans();
        let law = resolve(
            contour.laws(),
            &spans,
            &contour.vertices(),
            contour.is_closed(),
            &self.params,
        )
        .map_err(|fault| match fault {
            LawFault::Missing { edge } => {
                BlendFailure::new(BlendStatus::Error, "no radius law on a contour edge").on(edge)
            }
            LawFault::InvalidRadius { radius } => {
                BlendFailure::new(BlendStatus::Error, format!("radius law reaches {radius}"))
            }
            LawFault::Discontinuous { vertex } => {
                BlendFailure::new(BlendStatus::Error, "radius jumps at a contour vertex")
                    .at_vertex(vertex)
            }
            LawFault::Kink { vertex } => {
                let failure = BlendFailure::new(BlendStatus::Error, "radius slope is not continuous");
                match vertex {
                    Some(v) => failure.at_vertex(v),
                    None => failure,
                }
            }
        })?;
        let request = BlendRequest {
            contour: ic,
            spine: contour,
            law: &law,
            shape: self.shape,
            params: &self.params,
            index: &self.index,
        };
        self.solver.solve(store, &request)
    }

    fn record_fault(&mut self, ic: usize, failure: BlendFailure) {
        warn!(contour = ic, status = ?failure.status, "{}", failure.message);
        if let Some(v) = failure.vertex {
            if !self.faulty_vertices.contains(&v) {
                self.faulty_vertices.push(v);
            }
        }
        self.faults.push(FaultRecord {
            contour: ic,
            status: failure.status,
            bad_shape: failure.bad_shape,
            vertex: failure.vertex,
            message: failure.message,
        });
    }

    /// Blends every contour and builds the result solid in `store`.
    ///
    /// Every contour is solved first. Blends meeting at a vertex are then
    /// joined and the solid is trimmed; a contour that cannot be joined or
    /// fitted is recorded as a fault and left out, and the rest are tried
    /// again without it. Original entities are never modified.
    ///
    /// # Errors
    ///
    /// Returns [`FilletError::BuildFailed`] if no contour could be blended,
    /// in which case the faults stay queryable, or an error if the result
    /// cannot be assembled.
    pub fn build(&mut self, store: &mut TopologyStore) -> Result<SolidId> {
        self.invalidate();
        self.attempted = true;
        self.state = BuildState::Computing;
        info!(contours = self.contours.len(), shape = ?self.shape, "building fillet");

        let outcome = self.compute_all(store);
        match outcome {
            Ok(result) => {
                let solid = result.solid;
                self.state = if self.faults.is_empty() {
                    BuildState::Done
                } else {
                    BuildState::PartiallyFailed
                };
                info!(
                    blend_faces = result.new_faces.iter().map(Vec::len).sum::<usize>(),
                    faults = self.faults.len(),
                    "fillet built"
                );
                self.result = Some(result);
                Ok(solid)
            }
            Err(err) => {
                self.state = BuildState::NotDone;
                Err(err)
            }
        }
    }

    fn compute_all(&mut self, store: &mut TopologyStore) -> Result<BuildResult> {
        if self.contours.is_empty() {
            return Err(FilletError::BuildFailed("no contour to blend".into()).into());
        }
        let view: &TopologyStore = store;
        let base = WorkingShape::new(view, &self.index, self.params.spatial_tolerance)?;
        let mut solved = Vec::with_capacity(self.contours.len());
        for ic in 1..=self.contours.len() {
            match self.compute_contour(view, ic) {
                Ok(stripe) => {
                    debug!(contour = ic, patches = stripe.patches.len(), "contour solved");
                    solved.push(Some(stripe));
                }
                Err(failure) => {
                    self.record_fault(ic, failure);
                    solved.push(None);
                }
            }
        }

        // Every failed attempt leaves one more contour out.
        let (working, stripes, corners) = loop {
            if solved.iter().all(Option::is_none) {
                return Err(FilletError::BuildFailed(format!(
                    "none of the {} contours could be blended",
                    solved.len()
                ))
                .into());
            }
            match self.trim(view, &base, &solved) {
                Ok(trimmed) => break trimmed,
                Err((slot, failure)) => {
                    self.record_fault(slot + 1, failure);
                    solved[slot] = None;
                }
            }
        };

        let (solid, mut history) = working.assemble(store)?;
        history.index_result(&TopologyIndex::build(store, solid)?);
        let mut new_faces: Vec<Vec<FaceId>> = stripes
            .iter()
            .map(|stripe| {
                stripe
                    .iter()
                    .flat_map(|s| &s.patches)
                    .flat_map(|patch| history.generated(ShapeRef::Edge(patch.edge)))
                    .copied()
                    .collect::<Vec<ShapeRef>>()
            })
            .map(faces_of)
            .collect();
        // Corner patches go to the first contour meeting at their vertex.
        for corner in &corners {
            let Some(slot) = slots_at(&stripes, corner.vertex).min() else {
                continue;
            };
            let generated = history.generated(ShapeRef::Vertex(corner.vertex)).to_vec();
            for face in faces_of(generated) {
                if !new_faces[slot].contains(&face) {
                    new_faces[slot].push(face);
                }
            }
        }
        Ok(BuildResult {
            solid,
            stripes,
            new_faces,
            history,
        })
    }

    /// Joins the solved blends at shared vertices and trims the solid
    /// around them. On failure returns the slot of the contour to leave
    /// out.
    fn trim(
        &self,
        store: &TopologyStore,
        base: &WorkingShape,
        solved: &[Option<Stripe>],
    ) -> std::result::Result<(WorkingShape, Vec<Option<Stripe>>, Vec<Corner>), (usize, BlendFailure)> {
        let mut stripes = solved.to_vec();
        let corners = plan_corners(&self.index, &mut stripes, &self.params)?;
        let at_corners: HashSet<VertexId> = corners.iter().map(|c| c.vertex).collect();
        let mut working = base.clone();
        for (slot, stripe) in stripes.iter().enumerate() {
            let Some(stripe) = stripe else {
                continue;
            };
            let contour = self
                .contour_at(slot + 1)
                .map_err(|e| (slot, BlendFailure::new(BlendStatus::Error, e.to_string())))?;
            working
                .apply(store, &self.index, contour, stripe, &at_corners)
                .map_err(|failure| (slot, failure))?;
            debug!(contour = slot + 1, patches = stripe.patches.len(), "contour blended");
        }
        for corner in &corners {
            working.apply_corner(store, &self.index, corner).map_err(|failure| {
                let blame = slots_at(&stripes, corner.vertex).max().unwrap_or_default();
                (blame, failure)
            })?;
        }
        Ok((working, stripes, corners))
    }

    /// Computes contour `ic` alone, without touching the build result.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown contour, or
    /// [`FilletError::BuildFailed`] if the contour cannot be blended.
    pub fn simulate(&mut self, store: &TopologyStore, ic: usize) -> Result<()> {
        self.contour_at(ic)?;
        self.simulations.remove(&ic);
        let stripe = self
            .compute_contour(store, ic)
            .map_err(|failure| FilletError::BuildFailed(failure.to_string()))?;
        debug!(contour = ic, patches = stripe.patches.len(), "simulated contour");
        self.simulations.insert(ic, stripe);
        Ok(())
    }

    /// The simulated stripe of `ic`, or else its committed one; `None`
    /// when the contour was left out of the build.
    fn preview(&self, ic: usize) -> Result<Option<&Stripe>> {
        self.contour_at(ic)?;
        if let Some(stripe) = self.simulations.get(&ic) {
            return Ok(Some(stripe));
        }
        Ok(pick(&self.built()?.stripes, ic, "contour")?.as_ref())
    }

    /// Number of patches of contour `ic` in its simulation or build; 0 if
    /// the contour failed.
    ///
    /// # Errors
    ///
    /// Returns [`FilletError::NotDone`] if the contour was neither
    /// simulated nor built.
    pub fn nb_surf(&self, ic: usize) -> Result<usize> {
        Ok(self.preview(ic)?.map_or(0, |stripe| stripe.patches.len()))
    }

    /// End sections of patch `is` of contour `ic`.
    ///
    /// # Errors
    ///
    /// Returns [`FilletError::NotDone`] if the contour was neither
    /// simulated nor built, or an error for an unknown patch (any patch of
    /// a failed contour).
    pub fn sect(&self, ic: usize, is: usize) -> Result<&[BlendSection]> {
        let patches = self.preview(ic)?.map_or(&[][..], |stripe| stripe.patches.as_slice());
        Ok(&pick(patches, is, "surface")?.sections[..])
    }

    // ── Result ──

    fn built(&self) -> std::result::Result<&BuildResult, FilletError> {
        self.result.as_ref().ok_or(FilletError::NotDone)
    }

    #[must_use]
    pub fn state(&self) -> BuildState {
        self.state
    }

    /// Whether a result solid exists.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.result.is_some()
    }

    /// The result solid.
    ///
    /// # Errors
    ///
    /// Returns [`FilletError::NotDone`] without a result.
    pub fn shape(&self) -> Result<SolidId> {
        Ok(self.built()?.solid)
    }

    /// Discards the result; contours and laws are kept. Entities already
    /// added to the store stay there.
    pub fn reset(&mut self) {
        self.invalidate();
        info!("fillet reset");
    }

    /// # Errors
    ///
    /// Returns [`FilletError::NotDone`] without a result.
    pub fn history(&self) -> Result<&History> {
        Ok(&self.built()?.history)
    }

    /// Elements generated from an edge or vertex of the input.
    ///
    /// # Errors
    ///
    /// Returns [`FilletError::NotDone`] without a result.
    pub fn generated(&self, shape: ShapeRef) -> Result<&[ShapeRef]> {
        Ok(self.history()?.generated(shape))
    }

    /// Fragments of an input face (OUT, then IN, then ON) or shortened
    /// replacements of an input edge.
    ///
    /// # Errors
    ///
    /// Returns [`FilletError::NotDone`] without a result.
    pub fn modified(&self, shape: ShapeRef) -> Result<Vec<ShapeRef>> {
        Ok(self.history()?.modified(shape))
    }

    /// # Errors
    ///
    /// Returns [`FilletError::NotDone`] without a result.
    pub fn is_deleted(&self, shape: ShapeRef) -> Result<bool> {
        Ok(self.history()?.is_deleted(shape))
    }

    /// Number of blend and corner faces of the result.
    ///
    /// # Errors
    ///
    /// Returns [`FilletError::NotDone`] without a result.
    pub fn nb_surfaces(&self) -> Result<usize> {
        Ok(self.built()?.new_faces.iter().map(Vec::len).sum())
    }

    /// Blend faces built for contour `ic`, with the corner patches where it
    /// is the first contour to meet others.
    ///
    /// # Errors
    ///
    /// Returns [`FilletError::NotDone`] without a result, or an error for
    /// an unknown contour.
    pub fn new_faces(&self, ic: usize) -> Result<&[FaceId]> {
        Ok(pick(&self.built()?.new_faces, ic, "contour")?.as_slice())
    }

    /// Number of surface patches computed for contour `ic`; 0 if it failed.
    ///
    /// # Errors
    ///
    /// Returns [`FilletError::NotDone`] without a result.
    pub fn nb_computed_surfaces(&self, ic: usize) -> Result<usize> {
        let stripe = pick(&self.built()?.stripes, ic, "contour")?;
        Ok(stripe.as_ref().map_or(0, |s| s.patches.len()))
    }

    /// Surface of patch `is` of contour `ic`.
    ///
    /// # Errors
    ///
    /// Returns [`FilletError::NotDone`] without a result, or an error for
    /// an unknown contour or patch.
    pub fn computed_surface(&self, ic: usize, is: usize) -> Result<&FaceSurface> {
        let stripe = pick(&self.built()?.stripes, ic, "contour")?;
        let patches = stripe.as_ref().map_or(&[][..], |s| s.patches.as_slice());
        Ok(&pick(patches, is, "surface")?.surface)
    }

    // ── Faults ──

    fn faults_ready(&self) -> std::result::Result<(), FilletError> {
        if self.attempted {
            Ok(())
        } else {
            Err(FilletError::NotDone)
        }
    }

    /// Number of contours that failed in the last build.
    ///
    /// # Errors
    ///
    /// Returns [`FilletError::NotDone`] if nothing was built since the last
    /// change or reset.
    pub fn nb_faulty_contours(&self) -> Result<usize> {
        self.faults_ready()?;
        Ok(self.faults.len())
    }

    /// Contour index of the `i`-th fault.
    ///
    /// # Errors
    ///
    /// Returns [`FilletError::NotDone`] before a build and
    /// [`FilletError::IndexOutOfRange`] for an unknown fault.
    pub fn faulty_contour(&self, i: usize) -> Result<usize> {
        Ok(self.fault(i)?.contour)
    }

    /// The `i`-th fault record.
    ///
    /// # Errors
    ///
    /// Returns [`FilletError::NotDone`] before a build and
    /// [`FilletError::IndexOutOfRange`] for an unknown fault.
    pub fn fault(&self, i: usize) -> Result<&FaultRecord> {
        self.faults_ready()?;
        Ok(pick(&self.faults, i, "faulty contour")?)
    }

    /// # Errors
    ///
    /// Returns [`FilletError::NotDone`] before a build.
    pub fn nb_faulty_vertices(&self) -> Result<usize> {
        self.faults_ready()?;
        Ok(self.faulty_vertices.len())
    }

    /// # Errors
    ///
    /// Returns [`FilletError::NotDone`] before a build and
    /// [`FilletError::IndexOutOfRange`] for an unknown vertex.
    pub fn faulty_vertex(&self, i: usize) -> Result<VertexId> {
        self.faults_ready()?;
        Ok(*pick(&self.faulty_vertices, i, "faulty vertex")?)
    }

    /// Whether the last build left a result, possibly with faults.
    #[must_use]
    pub fn has_result(&self) -> bool {
        self.result.is_some()
    }

    /// The element the first fault was detected on.
    ///
    /// # Errors
    ///
    /// Returns [`FilletError::NotDone`] before a build.
    pub fn bad_shape(&self) -> Result<Option<ShapeRef>> {
        self.faults_ready()?;
        Ok(self.faults.iter().find_map(|f| f.bad_shape))
    }

    /// Outcome of contour `ic` in the last build.
    ///
    /// # Errors
    ///
    /// Returns [`FilletError::ContourOutOfRange`] for an unknown contour
    /// and [`FilletError::NotDone`] before a build.
    pub fn stripe_status(&self, ic: usize) -> Result<BlendStatus> {
        self.contour_at(ic)?;
        self.faults_ready()?;
        Ok(self
            .faults
            .iter()
            .find(|f| f.contour == ic)
            .map_or(BlendStatus::Ok, |f| f.status))
    }
}

/// Faces among generated shapes, without repeats.
fn faces_of(shapes: Vec<ShapeRef>) -> Vec<FaceId> {
    let mut faces = Vec::new();
    for shape in shapes {
        if let ShapeRef::Face(f) = shape {
            if !faces.contains(&f) {
                faces.push(f);
            }
        }
    }
    faces
}

/// Slots of the stripes with a section at `vertex`.
fn slots_at(stripes: &[Option<Stripe>], vertex: VertexId) -> impl Iterator<Item = usize> + '_ {
    stripes.iter().enumerate().filter_map(move |(slot, stripe)| {
        stripe
            .iter()
            .flat_map(|s| &s.patches)
            .flat_map(|patch| &patch.sections)
            .any(|s| s.vertex == Some(vertex))
            .then_some(slot)
    })
}
