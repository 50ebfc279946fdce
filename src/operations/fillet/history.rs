//! Correspondence between the filleted solid and the solid it came from.

use std::collections::{HashMap, HashSet};

use crate::topology::{EdgeId, FaceId, ShapeRef, TopologyIndex};

/// How a face fragment sits relative to the blend that trimmed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SplitKind {
    /// Support face cut back along the blend's contact line.
    Out,
    /// End face of a concave blend, extended by the blend section.
    In,
    /// End face of a convex blend, cut by the blend section.
    On,
}

impl SplitKind {
    const ALL: [Self; 3] = [Self::Out, Self::In, Self::On];

    fn slot(self) -> usize {
        match self {
            Self::Out => 0,
            Self::In => 1,
            Self::On => 2,
        }
    }
}

/// Generated, modified and deleted elements of one build.
///
/// Result membership is indexed once from the result solid, so
/// [`is_deleted`](Self::is_deleted) is a set lookup.
#[derive(Debug, Clone, Default)]
pub struct History {
    generated: HashMap<ShapeRef, Vec<ShapeRef>>,
    splits: HashMap<FaceId, [Vec<FaceId>; 3]>,
    modified_edges: HashMap<EdgeId, Vec<EdgeId>>,
    result: HashSet<ShapeRef>,
}

fn push_unique<T: PartialEq>(list: &mut Vec<T>, item: T) {
    if !list.contains(&item) {
        list.push(item);
    }
}

impl History {
    pub(crate) fn record_generated(&mut self, from: impl Into<ShapeRef>, to: impl Into<ShapeRef>) {
        push_unique(self.generated.entry(from.into()).or_default(), to.into());
    }

    pub(crate) fn record_split(&mut self, face: FaceId, kind: SplitKind, fragment: FaceId) {
        push_unique(&mut self.splits.entry(face).or_default()[kind.slot()], fragment);
    }

    pub(crate) fn record_modified_edge(&mut self, edge: EdgeId, replacement: EdgeId) {
        push_unique(self.modified_edges.entry(edge).or_default(), replacement);
    }

    /// Indexes every face, edge and vertex of the result solid.
    pub(crate) fn index_result(&mut self, index: &TopologyIndex) {
        self.result = index
            .faces()
            .iter()
            .map(|&f| ShapeRef::Face(f))
            .chain(index.edges().iter().map(|&e| ShapeRef::Edge(e)))
            .chain(index.vertices().iter().map(|&v| ShapeRef::Vertex(v)))
            .collect();
    }

    /// Elements created from `shape`: the blend faces of a spine edge, the
    /// section edges of a contour vertex.
    #[must_use]
    pub fn generated(&self, shape: ShapeRef) -> &[ShapeRef] {
        self.generated.get(&shape).map_or(&[], Vec::as_slice)
    }

    /// Elements `shape` was turned into: face fragments listed OUT, then
    /// IN, then ON; the shortened replacements of an edge.
    #[must_use]
    pub fn modified(&self, shape: ShapeRef) -> Vec<ShapeRef> {
        match shape {
            ShapeRef::Face(face) => self.splits.get(&face).map_or_else(Vec::new, |slots| {
                SplitKind::ALL
                    .iter()
                    .flat_map(|k| slots[k.slot()].iter().map(|&f| ShapeRef::Face(f)))
                    .collect()
            }),
            ShapeRef::Edge(edge) => self
                .modified_edges
                .get(&edge)
                .map_or_else(Vec::new, |edges| edges.iter().map(|&e| ShapeRef::Edge(e)).collect()),
            ShapeRef::Vertex(_) => Vec::new(),
        }
    }

    /// Fragments of `face` filed under one split kind.
    #[must_use]
    pub fn split(&self, face: FaceId, kind: SplitKind) -> &[FaceId] {
        self.splits.get(&face).map_or(&[], |slots| slots[kind.slot()].as_slice())
    }

    /// Whether `shape` belongs to the result solid.
    #[must_use]
    pub fn in_result(&self, shape: ShapeRef) -> bool {
        self.result.contains(&shape)
    }

    /// Whether `shape` left no trace: it is not in the result and was not
    /// split or modified.
    #[must_use]
    pub fn is_deleted(&self, shape: ShapeRef) -> bool {
        !self.in_result(shape) && self.modified(shape).is_empty()
    }
}
