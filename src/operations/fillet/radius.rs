//! Radius laws of fillet contours.
//!
//! Every way of specifying a radius goes through [`normalize`], which turns
//! a [`RadiusSpec`] into a [`RadiusLaw`] over a normalized parameter. Laws
//! are stored per contour in a [`ContourLaw`] at three scopes: the whole
//! contour (contour parameter), single edges (edge parameter, measured along
//! the edge's own direction so the law survives re-orientation of the
//! contour) and single vertices (a fixed radius).
//!
//! Before solving, [`resolve`] flattens the scopes into one piecewise-linear
//! radius per spine edge.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::FilletError;
use crate::geometry::law::{interpolate, InterpolatedLaw, LawFunction, ReparameterizedLaw};
use crate::math::{CONFUSION, TOLERANCE};
use crate::topology::{EdgeId, VertexId};

use super::contour::EdgeSpan;
use super::params::{Continuity, FilletParams};

/// A radius as given by the caller.
#[derive(Debug, Clone)]
pub enum RadiusSpec {
    Constant(f64),
    /// Radii at the start and the end, varying linearly in between.
    LinearPair(f64, f64),
    /// Arbitrary law of the normalized parameter, evaluated lazily.
    Function(Arc<dyn LawFunction>),
    /// `(parameter, radius)` samples in arbitrary parameter units.
    Table(Vec<(f64, f64)>),
}

/// A normalized radius law over `[0, 1]`.
#[derive(Debug, Clone)]
pub enum RadiusLaw {
    /// `(t, radius)` samples, interpolated linearly.
    Points(InterpolatedLaw),
    Function(Arc<dyn LawFunction>),
}

impl RadiusLaw {
    fn constant(r: f64) -> Self {
        Self::Points(InterpolatedLaw::linear(r, r))
    }

    /// Evaluates the law at `t`.
    #[must_use]
    pub fn value(&self, t: f64) -> f64 {
        match self {
            Self::Points(points) => points.value(t),
            Self::Function(law) => law.value(t),
        }
    }

    /// The radius, if the law is constant over its whole range.
    #[must_use]
    pub fn constant_value(&self) -> Option<f64> {
        match self {
            Self::Points(points) => {
                let first = points.points().first()?.1;
                points
                    .points()
                    .iter()
                    .all(|(_, r)| (r - first).abs() < CONFUSION)
                    .then_some(first)
            }
            Self::Function(law) => law.constant_value(),
        }
    }

    /// The radius, if the law is constant on `[from, to]`.
    fn constant_on(&self, from: f64, to: f64) -> Option<f64> {
        match self {
            Self::Points(points) => {
                let first = self.value(from);
                let inner = points.points().iter().filter(|(t, _)| *t > from && *t < to);
                std::iter::once(self.value(to))
                    .chain(inner.map(|(_, r)| *r))
                    .all(|r| (r - first).abs() < CONFUSION)
                    .then_some(first)
            }
            Self::Function(law) => law.constant_value(),
        }
    }

    /// The law as a shareable function object.
    #[must_use]
    pub fn as_function(&self) -> Arc<dyn LawFunction> {
        match self {
            Self::Points(points) => Arc::new(points.clone()),
            Self::Function(law) => Arc::clone(law),
        }
    }
}

fn check_radius(r: f64) -> Result<f64, FilletError> {
    if r.is_finite() && r > TOLERANCE {
        Ok(r)
    } else {
        Err(FilletError::InvalidRadius(r))
    }
}

/// Normalizes a radius specification.
///
/// * A constant becomes the two end samples `(0, r)` and `(1, r)`.
/// * A pair whose radii differ by less than [`CONFUSION`] collapses to its
///   average.
/// * Functions are kept by reference.
/// * Tables of one or two samples are read as a constant or a pair (their
///   parameters are ignored). Longer tables are reparameterized linearly so
///   the first sample maps to 0 and the last to 1; a sample that then falls
///   outside `[0, 1]` is rejected.
///
/// # Errors
///
/// Returns [`FilletError::InvalidRadius`] for non-finite or non-positive
/// radii and [`FilletError::InvalidLawTable`] for unusable tables.
pub fn normalize(spec: RadiusSpec) -> Result<RadiusLaw, FilletError> {
    match spec {
        RadiusSpec::Constant(r) => Ok(RadiusLaw::constant(check_radius(r)?)),
        RadiusSpec::LinearPair(r1, r2) => {
            let (r1, r2) = (check_radius(r1)?, check_radius(r2)?);
            if (r1 - r2).abs() < CONFUSION {
                Ok(RadiusLaw::constant(0.5 * (r1 + r2)))
            } else {
                Ok(RadiusLaw::Points(InterpolatedLaw::linear(r1, r2)))
            }
        }
        RadiusSpec::Function(law) => Ok(RadiusLaw::Function(law)),
        RadiusSpec::Table(points) => match points.as_slice() {
            [] => Err(FilletError::InvalidLawTable("no samples".into())),
            [(_, r)] => normalize(RadiusSpec::Constant(*r)),
            [(_, r1), (_, r2)] => normalize(RadiusSpec::LinearPair(*r1, *r2)),
            [(uf, _), .., (ul, _)] => {
                let span = ul - uf;
                if !span.is_finite() || span.abs() < TOLERANCE {
                    return Err(FilletError::InvalidLawTable(
                        "first and last parameters coincide".into(),
                    ));
                }
                let mut normalized = Vec::with_capacity(points.len());
                for &(u, r) in &points {
                    let t = (u - uf) / span;
                    if !(-TOLERANCE..=1.0 + TOLERANCE).contains(&t) {
                        return Err(FilletError::InvalidLawTable(format!(
                            "parameter {u} lies outside [{uf}, {ul}]"
                        )));
                    }
                    normalized.push((t.clamp(0.0, 1.0), check_radius(r)?));
                }
                InterpolatedLaw::new(normalized)
                    .map(RadiusLaw::Points)
                    .ok_or_else(|| FilletError::InvalidLawTable("no samples".into()))
            }
        },
    }
}

/// Correspondence between a stretch of a new contour parameterization and
/// the old one, used when a contour is extended, split, merged or reopened.
///
/// `old.1 < old.0` means the stretch is traversed backwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemapPiece {
    pub new: (f64, f64),
    pub old: (f64, f64),
}

impl RemapPiece {
    fn to_new(&self, t: f64) -> f64 {
        let (oa, ob) = self.old;
        let (na, nb) = self.new;
        na + (t - oa) / (ob - oa) * (nb - na)
    }

    fn to_old(&self, w: f64) -> f64 {
        let (oa, ob) = self.old;
        let (na, nb) = self.new;
        oa + (w - na) / (nb - na) * (ob - oa)
    }
}

/// A law seen through a set of [`RemapPiece`]s.
///
/// Outside every piece the law takes the value at the nearest piece end.
struct RemappedLaw {
    inner: Arc<dyn LawFunction>,
    pieces: Vec<RemapPiece>,
}

impl fmt::Debug for RemappedLaw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemappedLaw")
            .field("inner", &self.inner)
            .field("pieces", &self.pieces.len())
            .finish()
    }
}

impl LawFunction for RemappedLaw {
    fn value(&self, w: f64) -> f64 {
        let distance = |p: &RemapPiece| {
            if w < p.new.0 {
                p.new.0 - w
            } else if w > p.new.1 {
                w - p.new.1
            } else {
                0.0
            }
        };
        let Some(piece) = self
            .pieces
            .iter()
            .min_by(|a, b| distance(a).total_cmp(&distance(b)))
        else {
            return self.inner.value(w);
        };
        self.inner.value(piece.to_old(w.clamp(piece.new.0, piece.new.1)))
    }

    fn constant_value(&self) -> Option<f64> {
        self.inner.constant_value()
    }
}

/// The radius configuration of one contour.
#[derive(Debug, Clone, Default)]
pub struct ContourLaw {
    contour: Option<RadiusLaw>,
    edges: HashMap<EdgeId, RadiusLaw>,
    vertices: Vec<(VertexId, f64)>,
}

impl ContourLaw {
    /// Replaces the whole-contour law.
    pub fn set_contour_law(&mut self, law: RadiusLaw) {
        self.contour = Some(law);
    }

    /// Replaces the law of one edge.
    pub fn set_edge_law(&mut self, edge: EdgeId, law: RadiusLaw) {
        self.edges.insert(edge, law);
    }

    /// Pins the radius at a vertex, replacing an earlier constraint there.
    pub fn set_vertex_radius(&mut self, vertex: VertexId, radius: f64) {
        match self.vertices.iter_mut().find(|(v, _)| *v == vertex) {
            Some(entry) => entry.1 = radius,
            None => self.vertices.push((vertex, radius)),
        }
    }

    /// Forgets every law and constraint.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn contour_law(&self) -> Option<&RadiusLaw> {
        self.contour.as_ref()
    }

    #[must_use]
    pub fn edge_law(&self, edge: EdgeId) -> Option<&RadiusLaw> {
        self.edges.get(&edge)
    }

    #[must_use]
    pub fn vertex_radius(&self, vertex: VertexId) -> Option<f64> {
        self.vertices
            .iter()
            .find_map(|&(v, r)| (v == vertex).then_some(r))
    }

    /// Radius on `span` at contour parameter `w`, ignoring vertex constraints.
    fn base_value(&self, span: &EdgeSpan, w: f64) -> Option<f64> {
        if let Some(law) = self.edges.get(&span.edge) {
            return Some(law.value(span.edge_parameter(w)));
        }
        self.contour.as_ref().map(|law| law.value(w))
    }

    /// The law on one edge as a function of the edge's own parameter.
    #[must_use]
    pub fn effective_edge_law(&self, span: &EdgeSpan) -> Option<Arc<dyn LawFunction>> {
        if let Some(law) = self.edges.get(&span.edge) {
            return Some(law.as_function());
        }
        let law = self.contour.as_ref()?;
        let (from, to) = if span.forward {
            (span.first, span.last)
        } else {
            (span.last, span.first)
        };
        Some(Arc::new(ReparameterizedLaw::new(law.as_function(), from, to)))
    }

    /// The radius on one edge, if constant there.
    #[must_use]
    pub fn constant_on_edge(&self, span: &EdgeSpan) -> Option<f64> {
        if let Some(law) = self.edges.get(&span.edge) {
            return law.constant_value();
        }
        self.contour
            .as_ref()?
            .constant_on(span.first, span.last)
    }

    /// The radius on the whole contour, if constant everywhere including
    /// at constrained vertices.
    #[must_use]
    pub fn constant_on_contour(&self, spans: &[EdgeSpan]) -> Option<f64> {
        let mut values = spans
            .iter()
            .map(|span| self.constant_on_edge(span))
            .chain(self.vertices.iter().map(|&(_, r)| Some(r)));
        let first = values.next()??;
        values
            .all(|r| r.is_some_and(|r| (r - first).abs() < CONFUSION))
            .then_some(first)
    }

    /// Carries the configuration over to a restructured contour.
    ///
    /// The contour law follows `pieces`; edge laws and vertex constraints
    /// are kept for the elements still in the contour.
    #[must_use]
    pub fn remapped(&self, pieces: &[RemapPiece], edges: &[EdgeId], vertices: &[VertexId]) -> Self {
        let contour = match (&self.contour, pieces.is_empty()) {
            (None, _) | (_, true) => None,
            (Some(RadiusLaw::Function(law)), false) => {
                Some(RadiusLaw::Function(Arc::new(RemappedLaw {
                    inner: Arc::clone(law),
                    pieces: pieces.to_vec(),
                })))
            }
            (Some(law @ RadiusLaw::Points(points)), false) => {
                let mut mapped = Vec::new();
                for piece in pieces {
                    let (lo, hi) = if piece.old.0 <= piece.old.1 {
                        piece.old
                    } else {
                        (piece.old.1, piece.old.0)
                    };
                    let inner = points.points().iter().map(|(t, _)| *t).filter(|t| *t > lo && *t < hi);
                    for t in [piece.old.0, piece.old.1].into_iter().chain(inner) {
                        mapped.push((piece.to_new(t), law.value(t)));
                    }
                }
                mapped.sort_by(|a, b| a.0.total_cmp(&b.0));
                mapped.dedup_by(|b, a| (b.0 - a.0).abs() < TOLERANCE);
                InterpolatedLaw::new(mapped).map(RadiusLaw::Points)
            }
        };
        Self {
            contour,
            edges: self
                .edges
                .iter()
                .filter(|(e, _)| edges.contains(e))
                .map(|(e, law)| (*e, law.clone()))
                .collect(),
            vertices: self
                .vertices
                .iter()
                .filter(|(v, _)| vertices.contains(v))
                .copied()
                .collect(),
        }
    }

    /// Absorbs the edge laws and vertex constraints of another contour.
    pub fn absorb_local_laws(&mut self, other: &Self) {
        for (edge, law) in &other.edges {
            self.edges.entry(*edge).or_insert_with(|| law.clone());
        }
        for &(vertex, radius) in &other.vertices {
            if self.vertex_radius(vertex).is_none() {
                self.vertices.push((vertex, radius));
            }
        }
    }
}

/// Why a contour's radius could not be resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum LawFault {
    /// Some edge has neither an edge law nor a contour law.
    Missing { edge: EdgeId },
    /// The law evaluates to a non-finite or non-positive radius.
    InvalidRadius { radius: f64 },
    /// The radius jumps at an interior vertex.
    Discontinuous { vertex: VertexId },
    /// The radius slope turns at a contour vertex, or inside an edge when
    /// `vertex` is `None`, where curvature continuity is required.
    Kink { vertex: Option<VertexId> },
}

/// A contour's radius flattened to piecewise-linear knots per spine edge.
///
/// `edges[j]` holds `(w, r)` knots from the first to the last contour
/// parameter of spine edge `j`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLaw {
    pub edges: Vec<Vec<(f64, f64)>>,
}

impl ResolvedLaw {
    /// Radius at contour parameter `w`.
    #[must_use]
    pub fn value(&self, w: f64) -> f64 {
        let knots = self
            .edges
            .iter()
            .find(|k| k.last().is_some_and(|(last, _)| w <= *last))
            .or_else(|| self.edges.last());
        knots.map_or(0.0, |k| interpolate(k, w))
    }

    /// Whether every knot carries the same radius.
    #[must_use]
    pub fn is_constant(&self) -> bool {
        let mut radii = self.edges.iter().flatten().map(|(_, r)| *r);
        let Some(first) = radii.next() else {
            return true;
        };
        radii.all(|r| (r - first).abs() < CONFUSION)
    }
}

const MAX_SUBDIVISION: u32 = 12;

fn subdivide(
    f: &dyn Fn(f64) -> f64,
    (w0, r0): (f64, f64),
    (w1, r1): (f64, f64),
    sag: f64,
    depth: u32,
    out: &mut Vec<(f64, f64)>,
) {
    let wm = 0.5 * (w0 + w1);
    let rm = f(wm);
    if depth < MAX_SUBDIVISION && (rm - 0.5 * (r0 + r1)).abs() > sag {
        subdivide(f, (w0, r0), (wm, rm), sag, depth + 1, out);
        out.push((wm, rm));
        subdivide(f, (wm, rm), (w1, r1), sag, depth + 1, out);
    }
}

/// Drops interior knots lying within `tolerance` of the chord of their
/// neighbours.
fn simplify(knots: &mut Vec<(f64, f64)>, tolerance: f64) {
    let mut i = 1;
    while i + 1 < knots.len() {
        let (w0, r0) = knots[i - 1];
        let (w1, r1) = knots[i];
        let (w2, r2) = knots[i + 1];
        let chord = r0 + (r2 - r0) * (w1 - w0) / (w2 - w0);
        if (r1 - chord).abs() < tolerance {
            knots.remove(i);
        } else {
            i += 1;
        }
    }
}

/// Knots of the uncorrected law on one spine edge.
fn edge_knots(laws: &ContourLaw, span: &EdgeSpan, params: &FilletParams) -> Option<Vec<(f64, f64)>> {
    let (first, last) = (span.first, span.last);
    let mut inner: Vec<f64> = Vec::new();
    let sampled: Option<Arc<dyn LawFunction>> = match laws.edges.get(&span.edge) {
        Some(RadiusLaw::Points(points)) => {
            inner.extend(
                points
                    .points()
                    .iter()
                    .map(|(s, _)| span.contour_parameter(*s))
                    .filter(|w| *w > first && *w < last),
            );
            None
        }
        Some(RadiusLaw::Function(law)) => Some(Arc::clone(law)),
        None => match laws.contour.as_ref()? {
            RadiusLaw::Points(points) => {
                inner.extend(points.points().iter().map(|(t, _)| *t).filter(|t| *t > first && *t < last));
                None
            }
            RadiusLaw::Function(law) => Some(Arc::clone(law)),
        },
    };

    let value = |w: f64| laws.base_value(span, w).unwrap_or(f64::NAN);
    let mut knots = vec![(first, value(first))];
    match sampled {
        Some(law) if law.constant_value().is_none() => {
            const SEED_INTERVALS: u32 = 4;
            let mut prev = knots[0];
            for k in 1..=SEED_INTERVALS {
                let w = first + (last - first) * f64::from(k) / f64::from(SEED_INTERVALS);
                let next = (w, value(w));
                subdivide(&value, prev, next, params.max_sag, 0, &mut knots);
                knots.push(next);
                prev = next;
            }
        }
        _ => {
            inner.sort_by(f64::total_cmp);
            knots.extend(inner.into_iter().map(|w| (w, value(w))));
            knots.push((last, value(last)));
        }
    }
    Some(knots)
}

/// Flattens the radius configuration of a contour onto its spine.
///
/// `vertices` lists the contour vertices in order, one more than `spans`
/// (the last equals the first on a closed contour). A vertex constraint
/// adds a correction that is exact at the vertex and fades linearly to
/// zero at the neighbouring contour vertices.
///
/// # Errors
///
/// Returns the [`LawFault`] that prevents solving the contour.
pub fn resolve(
    laws: &ContourLaw,
    spans: &[EdgeSpan],
    vertices: &[VertexId],
    closed: bool,
    params: &FilletParams,
) -> Result<ResolvedLaw, LawFault> {
    let mut edges = Vec::with_capacity(spans.len());
    for (j, span) in spans.iter().enumerate() {
        let mut knots = edge_knots(laws, span, params).ok_or(LawFault::Missing { edge: span.edge })?;
        let (r_first, r_last) = (knots[0].1, knots[knots.len() - 1].1);
        let correction = |vertex: Option<&VertexId>, base: f64| {
            vertex
                .and_then(|v| laws.vertex_radius(*v))
                .map_or(0.0, |r| r - base)
        };
        let c_first = correction(vertices.get(j), r_first);
        let c_last = correction(vertices.get(j + 1), r_last);
        if c_first != 0.0 || c_last != 0.0 {
            let width = span.last - span.first;
            for (w, r) in &mut knots {
                *r += c_first + (c_last - c_first) * (*w - span.first) / width;
            }
        }
        simplify(&mut knots, params.approx_tolerance_2d);
        if let Some(&(_, radius)) = knots.iter().find(|(_, r)| !(r.is_finite() && *r > TOLERANCE)) {
            return Err(LawFault::InvalidRadius { radius });
        }
        edges.push(knots);
    }

    let jump = |a: &[(f64, f64)], b: &[(f64, f64)]| match (a.last(), b.first()) {
        (Some(x), Some(y)) => (x.1 - y.1).abs() > CONFUSION,
        _ => false,
    };
    for j in 1..edges.len() {
        if jump(&edges[j - 1], &edges[j]) {
            return Err(LawFault::Discontinuous { vertex: vertices[j] });
        }
    }
    if closed && edges.len() > 1 && jump(&edges[edges.len() - 1], &edges[0]) {
        return Err(LawFault::Discontinuous { vertex: vertices[0] });
    }
    if params.continuity == Continuity::Curvature {
        check_slopes(laws, spans, vertices, closed, &edges, params)?;
    }
    Ok(ResolvedLaw { edges })
}

/// The radius on `spans[j]` at `w`, vertex constraints included.
fn corrected_value(laws: &ContourLaw, spans: &[EdgeSpan], vertices: &[VertexId], j: usize, w: f64) -> f64 {
    let span = &spans[j];
    let base = |at: f64| laws.base_value(span, at).unwrap_or(f64::NAN);
    let correction = |vertex: Option<&VertexId>, at: f64| {
        vertex
            .and_then(|v| laws.vertex_radius(*v))
            .map_or(0.0, |r| r - base(at))
    };
    let c_first = correction(vertices.get(j), span.first);
    let c_last = correction(vertices.get(j + 1), span.last);
    base(w) + c_first + (c_last - c_first) * (w - span.first) / (span.last - span.first)
}

/// Compares one-sided radius slopes, in the contour parameter, at the
/// interior knots of every edge and at the contour vertices.
fn check_slopes(
    laws: &ContourLaw,
    spans: &[EdgeSpan],
    vertices: &[VertexId],
    closed: bool,
    edges: &[Vec<(f64, f64)>],
    params: &FilletParams,
) -> Result<(), LawFault> {
    let h = params.parametric_tolerance;
    let value = |j: usize, w: f64| corrected_value(laws, spans, vertices, j, w);
    let kinked = |(jl, wl): (usize, f64), (jr, wr): (usize, f64)| {
        let left = (value(jl, wl) - value(jl, wl - h)) / h;
        let right = (value(jr, wr + h) - value(jr, wr)) / h;
        (right.atan() - left.atan()).abs() > params.continuity_angle
    };
    for (j, knots) in edges.iter().enumerate() {
        let mut inner = knots.iter().skip(1).take(knots.len().saturating_sub(2));
        if inner.any(|&(w, _)| kinked((j, w), (j, w))) {
            return Err(LawFault::Kink { vertex: None });
        }
    }
    for j in 1..spans.len() {
        if kinked((j - 1, spans[j - 1].last), (j, spans[j].first)) {
            return Err(LawFault::Kink { vertex: Some(vertices[j]) });
        }
    }
    if let (true, Some(first), Some(last)) = (closed, spans.first(), spans.last()) {
        if kinked((spans.len() - 1, last.last), (0, first.first)) {
            return Err(LawFault::Kink { vertex: vertices.first().copied() });
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::law::FnLaw;
    use approx::assert_abs_diff_eq;
    use slotmap::SlotMap;

    fn points(law: &RadiusLaw) -> &[(f64, f64)] {
        match law {
            RadiusLaw::Points(p) => p.points(),
            RadiusLaw::Function(_) => panic!("expected sampled law"),
        }
    }

    /// Two spans of equal length on edges `e0` (forward) and `e1` (reversed).
    fn two_spans() -> (Vec<EdgeSpan>, Vec<VertexId>) {
        let mut edges: SlotMap<EdgeId, ()> = SlotMap::with_key();
        let mut verts: SlotMap<VertexId, ()> = SlotMap::with_key();
        let e0 = edges.insert(());
        let e1 = edges.insert(());
        let spans = vec![
            EdgeSpan { edge: e0, forward: true, first: 0.0, last: 0.5 },
            EdgeSpan { edge: e1, forward: false, first: 0.5, last: 1.0 },
        ];
        let vertices = vec![verts.insert(()), verts.insert(()), verts.insert(())];
        (spans, vertices)
    }

    // ── Normalization ──

    #[test]
    fn constant_becomes_two_endpoints() {
        let law = normalize(RadiusSpec::Constant(2.0)).unwrap();
        assert_eq!(points(&law), &[(0.0, 2.0), (1.0, 2.0)]);
        assert_eq!(law.constant_value(), Some(2.0));
    }

    #[test]
    fn nearly_equal_pair_collapses_to_average() {
        let law = normalize(RadiusSpec::LinearPair(5.0, 5.0 + 1e-9)).unwrap();
        let p = points(&law);
        assert_abs_diff_eq!(p[0].1, 5.0 + 5e-10, epsilon = 1e-15);
        assert_abs_diff_eq!(p[1].1, 5.0 + 5e-10, epsilon = 1e-15);
    }

    #[test]
    fn distinct_pair_is_kept() {
        let law = normalize(RadiusSpec::LinearPair(1.0, 3.0)).unwrap();
        assert_eq!(points(&law), &[(0.0, 1.0), (1.0, 3.0)]);
        assert!(law.constant_value().is_none());
    }

    #[test]
    fn long_table_is_reparameterized() {
        let law = normalize(RadiusSpec::Table(vec![(2.0, 1.0), (3.0, 2.0), (4.0, 3.0)])).unwrap();
        assert_eq!(points(&law), &[(0.0, 1.0), (0.5, 2.0), (1.0, 3.0)]);
        let same = normalize(RadiusSpec::Table(vec![(0.0, 1.0), (0.5, 2.0), (1.0, 3.0)])).unwrap();
        assert_eq!(points(&law), points(&same));
    }

    #[test]
    fn short_tables_read_as_constant_or_pair() {
        let one = normalize(RadiusSpec::Table(vec![(0.3, 4.0)])).unwrap();
        assert_eq!(one.constant_value(), Some(4.0));
        let two = normalize(RadiusSpec::Table(vec![(0.3, 4.0), (0.7, 6.0)])).unwrap();
        assert_eq!(points(&two), &[(0.0, 4.0), (1.0, 6.0)]);
    }

    #[test]
    fn bad_tables_and_radii_are_rejected() {
        assert!(matches!(
            normalize(RadiusSpec::Table(vec![])),
            Err(FilletError::InvalidLawTable(_))
        ));
        assert!(matches!(
            normalize(RadiusSpec::Table(vec![(1.0, 1.0), (3.0, 2.0), (1.0, 3.0)])),
            Err(FilletError::InvalidLawTable(_))
        ));
        assert!(matches!(
            normalize(RadiusSpec::Table(vec![(0.0, 1.0), (2.0, 2.0), (1.0, 3.0)])),
            Err(FilletError::InvalidLawTable(_))
        ));
        assert!(matches!(
            normalize(RadiusSpec::Constant(-1.0)),
            Err(FilletError::InvalidRadius(_))
        ));
        assert!(normalize(RadiusSpec::LinearPair(1.0, f64::NAN)).is_err());
    }

    // ── Scopes ──

    #[test]
    fn edge_law_follows_edge_direction() {
        let (spans, _) = two_spans();
        let mut laws = ContourLaw::default();
        laws.set_edge_law(spans[1].edge, normalize(RadiusSpec::LinearPair(1.0, 3.0)).unwrap());
        let law = laws.effective_edge_law(&spans[1]).unwrap();
        assert_abs_diff_eq!(law.value(0.0), 1.0);
        // The reversed span starts at the edge's end.
        assert_abs_diff_eq!(laws.base_value(&spans[1], 0.5).unwrap(), 3.0);
        assert!(laws.effective_edge_law(&spans[0]).is_none());
    }

    #[test]
    fn contour_law_restricted_to_an_edge() {
        let (spans, _) = two_spans();
        let mut laws = ContourLaw::default();
        laws.set_contour_law(normalize(RadiusSpec::LinearPair(1.0, 3.0)).unwrap());
        let law = laws.effective_edge_law(&spans[1]).unwrap();
        assert_abs_diff_eq!(law.value(0.0), 3.0);
        assert_abs_diff_eq!(law.value(1.0), 2.0);
        assert!(laws.constant_on_contour(&spans).is_none());
    }

    #[test]
    fn constant_contour_with_matching_vertex() {
        let (spans, vertices) = two_spans();
        let mut laws = ContourLaw::default();
        laws.set_contour_law(normalize(RadiusSpec::Constant(2.0)).unwrap());
        assert_eq!(laws.constant_on_contour(&spans), Some(2.0));
        laws.set_vertex_radius(vertices[1], 2.5);
        assert!(laws.constant_on_contour(&spans).is_none());
        laws.set_vertex_radius(vertices[1], 2.0);
        assert_eq!(laws.constant_on_contour(&spans), Some(2.0));
    }

    // ── Resolution ──

    #[test]
    fn vertex_constraint_is_a_hat() {
        let (spans, vertices) = two_spans();
        let mut laws = ContourLaw::default();
        laws.set_contour_law(normalize(RadiusSpec::Constant(2.0)).unwrap());
        laws.set_vertex_radius(vertices[1], 3.0);
        let resolved = resolve(&laws, &spans, &vertices, false, &FilletParams::default()).unwrap();
        assert_abs_diff_eq!(resolved.value(0.0), 2.0);
        assert_abs_diff_eq!(resolved.value(0.25), 2.5);
        assert_abs_diff_eq!(resolved.value(0.5), 3.0);
        assert_abs_diff_eq!(resolved.value(1.0), 2.0);
    }

    #[test]
    fn missing_law_is_reported() {
        let (spans, vertices) = two_spans();
        let mut laws = ContourLaw::default();
        laws.set_edge_law(spans[0].edge, normalize(RadiusSpec::Constant(1.0)).unwrap());
        let fault = resolve(&laws, &spans, &vertices, false, &FilletParams::default()).unwrap_err();
        assert_eq!(fault, LawFault::Missing { edge: spans[1].edge });
    }

    #[test]
    fn radius_jump_at_vertex_is_reported() {
        let (spans, vertices) = two_spans();
        let mut laws = ContourLaw::default();
        laws.set_contour_law(normalize(RadiusSpec::Constant(1.0)).unwrap());
        laws.set_edge_law(spans[1].edge, normalize(RadiusSpec::Constant(2.0)).unwrap());
        let fault = resolve(&laws, &spans, &vertices, false, &FilletParams::default()).unwrap_err();
        assert_eq!(fault, LawFault::Discontinuous { vertex: vertices[1] });
    }

    #[test]
    fn function_law_is_sampled_within_sag() {
        let (spans, vertices) = two_spans();
        let mut laws = ContourLaw::default();
        let parabola: Arc<dyn LawFunction> = Arc::new(FnLaw::new("parabola", |t| 1.0 + t * t));
        laws.set_contour_law(normalize(RadiusSpec::Function(Arc::clone(&parabola))).unwrap());
        let params = FilletParams::default();
        let resolved = resolve(&laws, &spans, &vertices, false, &params).unwrap();
        assert!(resolved.edges[0].len() > 2);
        for i in 0..=20 {
            let w = f64::from(i) / 20.0;
            assert!((resolved.value(w) - parabola.value(w)).abs() <= 2.0 * params.max_sag);
        }
    }

    #[test]
    fn linear_knots_are_simplified() {
        let (spans, vertices) = two_spans();
        let mut laws = ContourLaw::default();
        laws.set_contour_law(
            normalize(RadiusSpec::Table(vec![(0.0, 1.0), (0.25, 1.5), (1.0, 3.0)])).unwrap(),
        );
        let resolved = resolve(&laws, &spans, &vertices, false, &FilletParams::default()).unwrap();
        assert_eq!(resolved.edges[0].len(), 2);
        assert!(!resolved.is_constant());
    }

    #[test]
    fn curvature_continuity_rejects_a_radius_kink() {
        let (spans, vertices) = two_spans();
        let mut laws = ContourLaw::default();
        laws.set_contour_law(
            normalize(RadiusSpec::Table(vec![(0.0, 1.0), (0.5, 2.0), (1.0, 1.0)])).unwrap(),
        );
        assert!(resolve(&laws, &spans, &vertices, false, &FilletParams::default()).is_ok());
        let curvature = FilletParams::default().with_continuity(Continuity::Curvature, 1e-2);
        let fault = resolve(&laws, &spans, &vertices, false, &curvature).unwrap_err();
        assert_eq!(fault, LawFault::Kink { vertex: Some(vertices[1]) });
    }

    #[test]
    fn kink_inside_an_edge_has_no_vertex() {
        let (spans, vertices) = two_spans();
        let mut laws = ContourLaw::default();
        laws.set_contour_law(
            normalize(RadiusSpec::Table(vec![(0.0, 1.0), (0.25, 2.0), (1.0, 1.0)])).unwrap(),
        );
        let curvature = FilletParams::default().with_continuity(Continuity::Curvature, 1e-2);
        let fault = resolve(&laws, &spans, &vertices, false, &curvature).unwrap_err();
        assert_eq!(fault, LawFault::Kink { vertex: None });
    }

    #[test]
    fn sampled_smooth_law_is_curvature_continuous() {
        let (spans, vertices) = two_spans();
        let mut laws = ContourLaw::default();
        let parabola: Arc<dyn LawFunction> = Arc::new(FnLaw::new("parabola", |t| 1.0 + t * t));
        laws.set_contour_law(normalize(RadiusSpec::Function(parabola)).unwrap());
        let curvature = FilletParams::default().with_continuity(Continuity::Curvature, 1e-2);
        let resolved = resolve(&laws, &spans, &vertices, false, &curvature).unwrap();
        assert!(resolved.edges[0].len() > 2);
    }

    // ── Remapping ──

    #[test]
    fn extension_keeps_old_range_and_extends_flat() {
        let (spans, vertices) = two_spans();
        let mut laws = ContourLaw::default();
        laws.set_contour_law(normalize(RadiusSpec::LinearPair(1.0, 2.0)).unwrap());
        let pieces = [RemapPiece { new: (0.0, 0.5), old: (0.0, 1.0) }];
        let remapped = laws.remapped(&pieces, &[spans[0].edge], &vertices);
        let law = remapped.contour_law().unwrap();
        assert_abs_diff_eq!(law.value(0.25), 1.5);
        assert_abs_diff_eq!(law.value(0.75), 2.0);
    }

    #[test]
    fn reversed_piece_reverses_function_law() {
        let mut laws = ContourLaw::default();
        let ramp: Arc<dyn LawFunction> = Arc::new(FnLaw::new("ramp", |t| 1.0 + t));
        laws.set_contour_law(RadiusLaw::Function(ramp));
        let pieces = [RemapPiece { new: (0.0, 1.0), old: (1.0, 0.0) }];
        let remapped = laws.remapped(&pieces, &[], &[]);
        let law = remapped.contour_law().unwrap();
        assert_abs_diff_eq!(law.value(0.0), 2.0);
        assert_abs_diff_eq!(law.value(0.25), 1.75);
    }

    #[test]
    fn remap_drops_elements_that_left_the_contour() {
        let (spans, vertices) = two_spans();
        let mut laws = ContourLaw::default();
        laws.set_edge_law(spans[0].edge, normalize(RadiusSpec::Constant(1.0)).unwrap());
        laws.set_vertex_radius(vertices[2], 4.0);
        let remapped = laws.remapped(&[], &[spans[1].edge], &vertices[..2]);
        assert!(remapped.edge_law(spans[0].edge).is_none());
        assert!(remapped.vertex_radius(vertices[2]).is_none());
        assert!(remapped.contour_law().is_none());
    }
}
