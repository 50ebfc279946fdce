//! Grouping of selected edges into contours.
//!
//! A contour (spine) is a chain of edges connected end to end, each
//! traversed in a fixed direction. Contours are numbered from 1 in the
//! order their earliest-added edge was added, so the numbering is the same
//! whichever way edges were attached, split off or merged.

use tracing::debug;

use crate::error::FilletError;
use crate::math::angle_between;
use crate::topology::{EdgeId, EdgeInfo, TopologyIndex, VertexId};

use super::radius::{ContourLaw, RemapPiece};

/// Where one spine edge sits in the normalized contour parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeSpan {
    pub edge: EdgeId,
    /// Whether the contour runs along the edge's own direction.
    pub forward: bool,
    pub first: f64,
    pub last: f64,
}

impl EdgeSpan {
    /// Edge parameter in `[0, 1]`, along the edge's own direction, at
    /// contour parameter `w`.
    #[must_use]
    pub fn edge_parameter(&self, w: f64) -> f64 {
        let local = ((w - self.first) / (self.last - self.first)).clamp(0.0, 1.0);
        if self.forward {
            local
        } else {
            1.0 - local
        }
    }

    /// Contour parameter at edge parameter `s`.
    #[must_use]
    pub fn contour_parameter(&self, s: f64) -> f64 {
        let local = if self.forward { s } else { 1.0 - s };
        self.first + local * (self.last - self.first)
    }
}

/// One edge of a spine.
#[derive(Debug, Clone, Copy)]
pub struct SpineEdge {
    pub edge: EdgeId,
    pub forward: bool,
    pub info: EdgeInfo,
    seq: u64,
}

impl SpineEdge {
    /// First and last vertex in traversal order.
    #[must_use]
    pub fn ends(&self) -> (VertexId, VertexId) {
        self.info.ends(self.forward)
    }

    fn flipped(self) -> Self {
        Self {
            forward: !self.forward,
            ..self
        }
    }
}

/// A contour: its spine and its radius configuration.
#[derive(Debug, Clone)]
pub struct Contour {
    edges: Vec<SpineEdge>,
    closed: bool,
    laws: ContourLaw,
}

impl Contour {
    #[must_use]
    pub fn edges(&self) -> &[SpineEdge] {
        &self.edges
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    #[must_use]
    pub fn laws(&self) -> &ContourLaw {
        &self.laws
    }

    pub fn laws_mut(&mut self) -> &mut ContourLaw {
        &mut self.laws
    }

    fn first_seq(&self) -> u64 {
        self.edges.iter().map(|e| e.seq).min().unwrap_or(u64::MAX)
    }

    /// 0-based position of `edge` in the spine.
    #[must_use]
    pub fn position(&self, edge: EdgeId) -> Option<usize> {
        self.edges.iter().position(|e| e.edge == edge)
    }

    /// Contour vertices in order; the last equals the first when closed.
    #[must_use]
    pub fn vertices(&self) -> Vec<VertexId> {
        let mut vertices: Vec<VertexId> = self.edges.iter().map(|e| e.ends().0).collect();
        if let Some(last) = self.edges.last() {
            vertices.push(last.ends().1);
        }
        vertices
    }

    #[must_use]
    pub fn first_vertex(&self) -> Option<VertexId> {
        self.edges.first().map(|e| e.ends().0)
    }

    #[must_use]
    pub fn last_vertex(&self) -> Option<VertexId> {
        self.edges.last().map(|e| e.ends().1)
    }

    /// Total arc length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.edges.iter().map(|e| e.info.length).sum()
    }

    /// Normalized parameter range of every spine edge.
    #[must_use]
    pub fn spans(&self) -> Vec<EdgeSpan> {
        let total = self.length();
        let mut start = 0.0;
        self.edges
            .iter()
            .map(|e| {
                let end = start + e.info.length;
                let span = EdgeSpan {
                    edge: e.edge,
                    forward: e.forward,
                    first: start / total,
                    last: end / total,
                };
                start = end;
                span
            })
            .collect()
    }

    /// Arc length from the first vertex to `vertex`.
    #[must_use]
    pub fn abscissa(&self, vertex: VertexId) -> Option<f64> {
        let mut length = 0.0;
        for e in &self.edges {
            if e.ends().0 == vertex {
                return Some(length);
            }
            length += e.info.length;
        }
        (self.last_vertex() == Some(vertex)).then_some(length)
    }

    /// Whether the contour is closed and its ends meet tangentially.
    #[must_use]
    pub fn is_closed_and_tangent(&self, angular_tolerance: f64) -> bool {
        let (Some(first), Some(last)) = (self.edges.first(), self.edges.last()) else {
            return false;
        };
        let start = first.info.traversal_tangents(first.forward).0;
        let end = last.info.traversal_tangents(last.forward).1;
        self.closed && angle_between(&end, &start).is_some_and(|a| a <= angular_tolerance)
    }

    /// A contour made of `edges`, carrying over this contour's laws.
    fn rebuilt(&self, edges: Vec<SpineEdge>) -> Self {
        let closed = match (edges.first(), edges.last()) {
            (Some(f), Some(l)) => f.ends().0 == l.ends().1,
            _ => false,
        };
        let mut next = Self {
            edges,
            closed,
            laws: ContourLaw::default(),
        };
        let old_spans = self.spans();
        let pieces: Vec<RemapPiece> = next
            .spans()
            .iter()
            .filter_map(|ns| {
                let os = old_spans.iter().find(|os| os.edge == ns.edge)?;
                let old = if os.forward == ns.forward {
                    (os.first, os.last)
                } else {
                    (os.last, os.first)
                };
                Some(RemapPiece {
                    new: (ns.first, ns.last),
                    old,
                })
            })
            .collect();
        let edge_ids: Vec<EdgeId> = next.edges.iter().map(|e| e.edge).collect();
        next.laws = self.laws.remapped(&pieces, &edge_ids, &next.vertices());
        next
    }
}

/// The ordered set of contours of one fillet.
#[derive(Debug, Clone, Default)]
pub struct ContourSet {
    contours: Vec<Contour>,
    next_seq: u64,
}

impl ContourSet {
    #[must_use]
    pub fn len(&self) -> usize {
        self.contours.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Contour> {
        self.contours.iter()
    }

    /// The contour with 1-based index `ic`.
    ///
    /// # Errors
    ///
    /// Returns [`FilletError::ContourOutOfRange`] for an unknown index.
    pub fn get(&self, ic: usize) -> Result<&Contour, FilletError> {
        let count = self.contours.len();
        ic.checked_sub(1)
            .and_then(|i| self.contours.get(i))
            .ok_or(FilletError::ContourOutOfRange { index: ic, count })
    }

    /// Mutable access to the contour with 1-based index `ic`.
    ///
    /// # Errors
    ///
    /// Returns [`FilletError::ContourOutOfRange`] for an unknown index.
    pub fn get_mut(&mut self, ic: usize) -> Result<&mut Contour, FilletError> {
        let count = self.contours.len();
        ic.checked_sub(1)
            .and_then(|i| self.contours.get_mut(i))
            .ok_or(FilletError::ContourOutOfRange { index: ic, count })
    }

    /// 1-based contour index and 1-based position of `edge`.
    #[must_use]
    pub fn contains(&self, edge: EdgeId) -> Option<(usize, usize)> {
        self.contours
            .iter()
            .enumerate()
            .find_map(|(i, c)| c.position(edge).map(|p| (i + 1, p + 1)))
    }

    /// 1-based index of the contour holding `edge`, or 0.
    #[must_use]
    pub fn contour_of(&self, edge: EdgeId) -> usize {
        self.contains(edge).map_or(0, |(ic, _)| ic)
    }

    /// Lowest-numbered open contour with a free end at `vertex`.
    fn open_end_at(&self, vertex: VertexId) -> Option<usize> {
        self.contours.iter().position(|c| {
            !c.closed && (c.first_vertex() == Some(vertex) || c.last_vertex() == Some(vertex))
        })
    }

    fn sort(&mut self) {
        self.contours.sort_by_key(Contour::first_seq);
    }

    /// Adds `edge`, attaching it to a contour it touches at a free end.
    ///
    /// An edge joining the two ends of one contour closes it; an edge
    /// joining two contours merges them into the lower-numbered one, which
    /// keeps its contour-wide law. Adding a managed edge does nothing.
    /// Returns the 1-based index of the contour now holding the edge.
    ///
    /// # Errors
    ///
    /// Returns [`FilletError::EdgeNotInShape`] or
    /// [`FilletError::NonManifoldEdge`] for unusable edges.
    pub fn add(&mut self, index: &TopologyIndex, edge: EdgeId) -> Result<usize, FilletError> {
        let info = *index.edge_info(edge).ok_or(FilletError::EdgeNotInShape)?;
        let faces = index.faces_of_edge(edge).len();
        if faces != 2 {
            return Err(FilletError::NonManifoldEdge { faces });
        }
        if let Some((ic, _)) = self.contains(edge) {
            return Ok(ic);
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        let new_edge = SpineEdge {
            edge,
            forward: true,
            info,
            seq,
        };
        let (a, b) = (info.start, info.end);
        let attach = if a == b {
            (None, None)
        } else {
            (self.open_end_at(a), self.open_end_at(b))
        };

        match attach {
            (Some(i), Some(j)) if i != j => {
                let (low, high) = (i.min(j), i.max(j));
                let absorbed = self.contours.remove(high);
                let base = &self.contours[low];
                let mut chain = base.edges.clone();
                let joint = extend_chain(&mut chain, new_edge);
                let tail = orient_towards(&absorbed.edges, joint);
                match joint {
                    Joint::Back(_) => chain.extend(tail),
                    Joint::Front(_) => {
                        chain.splice(0..0, tail);
                    }
                }
                let mut merged = base.rebuilt(chain);
                merged.laws.absorb_local_laws(&absorbed.laws);
                debug!(contours = ?(low + 1, high + 1), "merged contours");
                self.contours[low] = merged;
            }
            (Some(i), _) | (None, Some(i)) => {
                let base = &self.contours[i];
                let mut chain = base.edges.clone();
                extend_chain(&mut chain, new_edge);
                self.contours[i] = base.rebuilt(chain);
            }
            (None, None) => {
                self.contours.push(Contour {
                    edges: vec![new_edge],
                    closed: a == b,
                    laws: ContourLaw::default(),
                });
            }
        }
        self.sort();
        Ok(self.contour_of(edge))
    }

    /// Detaches `edge` from its contour.
    ///
    /// An open contour splits around the edge, a closed one reopens, and a
    /// contour left without edges disappears. Unmanaged edges are ignored.
    pub fn remove(&mut self, edge: EdgeId) {
        let Some((ic, pos)) = self.contains(edge) else {
            return;
        };
        let contour = self.contours.remove(ic - 1);
        let p = pos - 1;
        let pieces: Vec<Vec<SpineEdge>> = if contour.closed {
            let mut reopened = contour.edges[p + 1..].to_vec();
            reopened.extend_from_slice(&contour.edges[..p]);
            vec![reopened]
        } else {
            vec![contour.edges[..p].to_vec(), contour.edges[p + 1..].to_vec()]
        };
        for piece in pieces.into_iter().filter(|p| !p.is_empty()) {
            self.contours.push(contour.rebuilt(piece));
        }
        self.sort();
    }
}

/// Where an edge was attached to a chain, with the chain's new free end there.
#[derive(Debug, Clone, Copy)]
enum Joint {
    Back(VertexId),
    Front(VertexId),
}

/// Attaches `edge` at whichever end of `chain` it touches.
fn extend_chain(chain: &mut Vec<SpineEdge>, edge: SpineEdge) -> Joint {
    let (a, b) = edge.ends();
    let first = chain.first().map(|e| e.ends().0);
    let last = chain.last().map(|e| e.ends().1);
    if last == Some(a) {
        chain.push(edge);
        Joint::Back(b)
    } else if last == Some(b) {
        chain.push(edge.flipped());
        Joint::Back(a)
    } else if first == Some(b) {
        chain.insert(0, edge);
        Joint::Front(a)
    } else {
        chain.insert(0, edge.flipped());
        Joint::Front(b)
    }
}

/// `edges` oriented to continue a chain at `joint`.
fn orient_towards(edges: &[SpineEdge], joint: Joint) -> Vec<SpineEdge> {
    let starts_at = edges.first().map(|e| e.ends().0);
    let ends_at = edges.last().map(|e| e.ends().1);
    let keep = match joint {
        Joint::Back(v) => starts_at == Some(v),
        Joint::Front(v) => ends_at == Some(v),
    };
    if keep {
        edges.to_vec()
    } else {
        edges.iter().rev().map(|e| e.flipped()).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::operations::creation::{MakeBox, MakeFace, MakeWire};
    use crate::operations::fillet::radius::{normalize, RadiusSpec};
    use crate::math::Vector3;
    use crate::operations::shaping::Extrude;
    use crate::topology::{SolidId, TopologyStore};

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn prism(store: &mut TopologyStore, pts: Vec<Point3>, height: f64) -> SolidId {
        let wire = MakeWire::new(pts, true).execute(store).unwrap();
        let face = MakeFace::new(wire, vec![]).execute(store).unwrap();
        Extrude::new(face, Vector3::new(0.0, 0.0, height)).execute(store).unwrap()
    }

    /// Edges whose two end points satisfy `keep`, in index order.
    fn edges_where(
        store: &TopologyStore,
        index: &TopologyIndex,
        keep: impl Fn(&Point3) -> bool,
    ) -> Vec<EdgeId> {
        index
            .edges()
            .iter()
            .copied()
            .filter(|&e| {
                let data = store.edge(e).unwrap();
                [data.start, data.end]
                    .iter()
                    .all(|&v| keep(&store.vertex(v).unwrap().point))
            })
            .collect()
    }

    /// Edges of the base square, consecutive ones adjacent.
    fn base_edges(store: &TopologyStore, index: &TopologyIndex) -> Vec<EdgeId> {
        edges_where(store, index, |q| q.z.abs() < 1e-12)
    }

    fn cube(store: &mut TopologyStore) -> TopologyIndex {
        let solid = MakeBox::new(Point3::origin(), p(10.0, 10.0, 10.0)).execute(store).unwrap();
        TopologyIndex::build(store, solid).unwrap()
    }

    // ── Adding ──

    #[test]
    fn adjacent_edges_chain_into_one_contour() {
        let mut store = TopologyStore::new();
        let index = cube(&mut store);
        let base = base_edges(&store, &index);
        let mut set = ContourSet::default();
        assert_eq!(set.add(&index, base[0]).unwrap(), 1);
        assert_eq!(set.add(&index, base[2]).unwrap(), 2);
        assert_eq!(set.add(&index, base[1]).unwrap(), 1);
        assert_eq!(set.len(), 1);
        let contour = set.get(1).unwrap();
        assert_eq!(contour.edges().len(), 3);
        assert!(!contour.is_closed());
        assert!((contour.length() - 30.0).abs() < 1e-9);

        set.add(&index, base[3]).unwrap();
        let contour = set.get(1).unwrap();
        assert!(contour.is_closed());
        assert!(!contour.is_closed_and_tangent(1e-2));
        assert_eq!(contour.vertices().first(), contour.vertices().last());
    }

    #[test]
    fn adding_twice_is_a_no_op() {
        let mut store = TopologyStore::new();
        let index = cube(&mut store);
        let e = index.edges()[0];
        let mut set = ContourSet::default();
        set.add(&index, e).unwrap();
        set.add(&index, e).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(1).unwrap().edges().len(), 1);
    }

    #[test]
    fn unmanaged_edge_maps_to_zero() {
        let mut store = TopologyStore::new();
        let index = cube(&mut store);
        let set = ContourSet::default();
        assert_eq!(set.contour_of(index.edges()[0]), 0);
        assert!(set.contains(index.edges()[0]).is_none());
        assert!(matches!(set.get(1), Err(FilletError::ContourOutOfRange { index: 1, count: 0 })));
    }

    #[test]
    fn edge_outside_the_solid_is_rejected() {
        let mut store = TopologyStore::new();
        let index = cube(&mut store);
        let wire = MakeWire::new(vec![p(0.0, 0.0, 20.0), p(1.0, 0.0, 20.0)], false)
            .execute(&mut store)
            .unwrap();
        let loose = store.wire(wire).unwrap().edges[0].edge;
        let mut set = ContourSet::default();
        assert!(matches!(set.add(&index, loose), Err(FilletError::EdgeNotInShape)));
        assert!(set.is_empty());
    }

    #[test]
    fn bridging_edge_merges_into_lower_contour() {
        let mut store = TopologyStore::new();
        let index = cube(&mut store);
        let base = base_edges(&store, &index);
        let mut set = ContourSet::default();
        set.add(&index, base[0]).unwrap();
        set.add(&index, base[2]).unwrap();
        set.get_mut(1)
            .unwrap()
            .laws_mut()
            .set_contour_law(normalize(RadiusSpec::Constant(1.0)).unwrap());
        set.get_mut(2)
            .unwrap()
            .laws_mut()
            .set_contour_law(normalize(RadiusSpec::Constant(2.0)).unwrap());
        set.add(&index, base[1]).unwrap();
        let merged = set.get(1).unwrap();
        let law = merged.laws().contour_law().unwrap();
        assert_eq!(law.constant_value(), Some(1.0));
    }

    // ── Removing ──

    #[test]
    fn removal_splits_and_reindexes_by_first_added_edge() {
        let mut store = TopologyStore::new();
        let index = cube(&mut store);
        let base = base_edges(&store, &index);
        let mut set = ContourSet::default();
        // The first-added edge sits mid-chain; the lone top edge is added
        // between base[0] and base[2].
        let lone = edges_where(&store, &index, |q| (q.z - 10.0).abs() < 1e-12)[0];
        set.add(&index, base[1]).unwrap();
        set.add(&index, base[0]).unwrap();
        set.add(&index, lone).unwrap();
        set.add(&index, base[2]).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.contour_of(lone), 2);

        set.remove(base[1]);
        assert_eq!(set.len(), 3);
        assert_eq!(set.contour_of(base[0]), 1);
        assert_eq!(set.contour_of(lone), 2);
        assert_eq!(set.contour_of(base[2]), 3);
        assert_eq!(set.contour_of(base[1]), 0);
    }

    #[test]
    fn removal_reopens_closed_contour() {
        let mut store = TopologyStore::new();
        let index = cube(&mut store);
        let base = base_edges(&store, &index);
        let mut set = ContourSet::default();
        for &e in &base {
            set.add(&index, e).unwrap();
        }
        assert!(set.get(1).unwrap().is_closed());
        set.remove(base[0]);
        let contour = set.get(1).unwrap();
        assert!(!contour.is_closed());
        assert_eq!(contour.edges().len(), 3);
        set.remove(base[0]);
        assert_eq!(set.len(), 1);
    }

    // ── Geometry queries ──

    #[test]
    fn abscissa_and_spans_along_collinear_edges() {
        let mut store = TopologyStore::new();
        let solid = prism(
            &mut store,
            vec![p(0.0, 0.0, 0.0), p(5.0, 0.0, 0.0), p(10.0, 0.0, 0.0), p(10.0, 10.0, 0.0), p(0.0, 10.0, 0.0)],
            4.0,
        );
        let index = TopologyIndex::build(&store, solid).unwrap();
        let front = edges_where(&store, &index, |q| q.y.abs() < 1e-12 && q.z.abs() < 1e-12);
        assert_eq!(front.len(), 2);
        let mut set = ContourSet::default();
        set.add(&index, front[0]).unwrap();
        set.add(&index, front[1]).unwrap();
        assert_eq!(set.len(), 1);
        let contour = set.get(1).unwrap();
        assert!(!contour.is_closed());
        let spans = contour.spans();
        assert!((spans[0].last - 0.5).abs() < 1e-12);
        let middle = contour.vertices()[1];
        assert!((contour.abscissa(middle).unwrap() - 5.0).abs() < 1e-9);
        assert!(contour.abscissa(contour.last_vertex().unwrap()).is_some());
        let far = index.vertices().iter().copied().find(|v| !contour.vertices().contains(v)).unwrap();
        assert!(contour.abscissa(far).is_none());
    }

    #[test]
    fn span_parameters_follow_edge_direction() {
        let span = EdgeSpan {
            edge: EdgeId::default(),
            forward: false,
            first: 0.2,
            last: 0.6,
        };
        assert!((span.edge_parameter(0.3) - 0.75).abs() < 1e-12);
        assert!((span.contour_parameter(0.75) - 0.3).abs() < 1e-12);
    }
}
