use std::collections::{HashMap, HashSet};

use crate::error::Result;
use crate::math::Vector3;
use crate::operations::query::Length;

use super::{EdgeId, FaceId, SolidId, TopologyStore, VertexId};

/// End vertices and end geometry of an edge, in the edge's own direction.
#[derive(Debug, Clone, Copy)]
pub struct EdgeInfo {
    pub start: VertexId,
    pub end: VertexId,
    pub length: f64,
    /// Unit tangent at `start`, pointing along the edge.
    pub start_tangent: Vector3,
    /// Unit tangent at `end`, pointing along the edge.
    pub end_tangent: Vector3,
}

impl EdgeInfo {
    /// End vertices in traversal order.
    #[must_use]
    pub fn ends(&self, forward: bool) -> (VertexId, VertexId) {
        if forward {
            (self.start, self.end)
        } else {
            (self.end, self.start)
        }
    }

    /// Tangents at the first and last traversed point, along the traversal.
    #[must_use]
    pub fn traversal_tangents(&self, forward: bool) -> (Vector3, Vector3) {
        if forward {
            (self.start_tangent, self.end_tangent)
        } else {
            (-self.end_tangent, -self.start_tangent)
        }
    }
}

/// Adjacency tables of one solid, enumerated once in a stable order.
///
/// Faces are listed shell by shell, edges and vertices in the order they are
/// first met while walking the face wires. Every edge records the faces
/// using it together with the direction in which each face traverses it.
#[derive(Debug, Clone)]
pub struct TopologyIndex {
    solid: SolidId,
    faces: Vec<FaceId>,
    edges: Vec<EdgeId>,
    vertices: Vec<VertexId>,
    edge_faces: HashMap<EdgeId, Vec<(FaceId, bool)>>,
    edge_info: HashMap<EdgeId, EdgeInfo>,
    vertex_edges: HashMap<VertexId, Vec<EdgeId>>,
    vertex_faces: HashMap<VertexId, Vec<FaceId>>,
}

impl TopologyIndex {
    /// Walks `solid` and builds its adjacency tables.
    ///
    /// # Errors
    ///
    /// Returns an error if any referenced entity is missing from the store.
    pub fn build(store: &TopologyStore, solid: SolidId) -> Result<Self> {
        let mut index = Self {
            solid,
            faces: Vec::new(),
            edges: Vec::new(),
            vertices: Vec::new(),
            edge_faces: HashMap::new(),
            edge_info: HashMap::new(),
            vertex_edges: HashMap::new(),
            vertex_faces: HashMap::new(),
        };
        let mut seen_vertices = HashSet::new();

        for shell in store.solid(solid)?.shells() {
            for &face in &store.shell(shell)?.faces {
                index.faces.push(face);
                let face_data = store.face(face)?;
                let wires = std::iter::once(face_data.outer_wire)
                    .chain(face_data.inner_wires.iter().copied());
                for wire in wires {
                    for oe in &store.wire(wire)?.edges {
                        let edge = store.edge(oe.edge)?;
                        let users = index.edge_faces.entry(oe.edge).or_default();
                        if users.is_empty() {
                            index.edges.push(oe.edge);
                            index.edge_info.insert(
                                oe.edge,
                                EdgeInfo {
                                    start: edge.start,
                                    end: edge.end,
                                    length: Length::new(oe.edge).execute(store)?,
                                    start_tangent: edge.tangent_at(0.0)?,
                                    end_tangent: edge.tangent_at(1.0)?,
                                },
                            );
                            for v in [edge.start, edge.end] {
                                index.vertex_edges.entry(v).or_default().push(oe.edge);
                            }
                        }
                        users.push((face, oe.forward));
                        for v in [edge.start, edge.end] {
                            if seen_vertices.insert(v) {
                                index.vertices.push(v);
                            }
                            let faces = index.vertex_faces.entry(v).or_default();
                            if !faces.contains(&face) {
                                faces.push(face);
                            }
                        }
                    }
                }
            }
        }
        Ok(index)
    }

    /// The indexed solid.
    #[must_use]
    pub fn solid(&self) -> SolidId {
        self.solid
    }

    #[must_use]
    pub fn faces(&self) -> &[FaceId] {
        &self.faces
    }

    #[must_use]
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    #[must_use]
    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    #[must_use]
    pub fn contains_edge(&self, edge: EdgeId) -> bool {
        self.edge_faces.contains_key(&edge)
    }

    #[must_use]
    pub fn contains_vertex(&self, vertex: VertexId) -> bool {
        self.vertex_edges.contains_key(&vertex)
    }

    /// Faces using `edge`, each with the direction it traverses the edge.
    #[must_use]
    pub fn faces_of_edge(&self, edge: EdgeId) -> &[(FaceId, bool)] {
        self.edge_faces.get(&edge).map_or(&[], Vec::as_slice)
    }

    /// End vertices and end geometry of `edge`.
    #[must_use]
    pub fn edge_info(&self, edge: EdgeId) -> Option<&EdgeInfo> {
        self.edge_info.get(&edge)
    }

    /// Edges bounded by `vertex`.
    #[must_use]
    pub fn edges_at_vertex(&self, vertex: VertexId) -> &[EdgeId] {
        self.vertex_edges.get(&vertex).map_or(&[], Vec::as_slice)
    }

    /// Faces whose boundary passes through `vertex`.
    #[must_use]
    pub fn faces_at_vertex(&self, vertex: VertexId) -> &[FaceId] {
        self.vertex_faces.get(&vertex).map_or(&[], Vec::as_slice)
    }

    /// Whether `edge` is shared by exactly two faces.
    #[must_use]
    pub fn is_manifold_edge(&self, edge: EdgeId) -> bool {
        self.faces_of_edge(edge).len() == 2
    }
}
