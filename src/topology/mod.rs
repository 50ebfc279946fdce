pub mod edge;
pub mod face;
pub mod index;
pub mod shell;
pub mod solid;
pub mod vertex;
pub mod wire;

pub use edge::{CurveKind, EdgeCurve, EdgeData, EdgeId};
pub use face::{FaceData, FaceId, FaceSurface};
pub use index::{EdgeInfo, TopologyIndex};
pub use shell::{ShellData, ShellId};
pub use solid::{SolidData, SolidId};
pub use vertex::{VertexData, VertexId};
pub use wire::{OrientedEdge, WireData, WireId};

use crate::error::TopologyError;
use slotmap::SlotMap;

/// A reference to a vertex, edge or face, used where an operation accepts
/// or returns more than one kind of sub-shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeRef {
    Vertex(VertexId),
    Edge(EdgeId),
    Face(FaceId),
}

impl From<VertexId> for ShapeRef {
    fn from(id: VertexId) -> Self {
        Self::Vertex(id)
    }
}

impl From<EdgeId> for ShapeRef {
    fn from(id: EdgeId) -> Self {
        Self::Edge(id)
    }
}

impl From<FaceId> for ShapeRef {
    fn from(id: FaceId) -> Self {
        Self::Face(id)
    }
}

/// Central arena that owns all topological entities.
///
/// Entities reference each other via typed IDs (generational indices),
/// so identity never depends on where an entity lives in memory.
#[derive(Debug, Default)]
pub struct TopologyStore {
    vertices: SlotMap<VertexId, VertexData>,
    edges: SlotMap<EdgeId, EdgeData>,
    wires: SlotMap<WireId, WireData>,
    faces: SlotMap<FaceId, FaceData>,
    shells: SlotMap<ShellId, ShellData>,
    solids: SlotMap<SolidId, SolidData>,
}

/// Generates the insert / get / get-mut triple for one entity arena.
macro_rules! arena_accessors {
    ($field:ident, $id:ty, $data:ty, $add:ident, $get:ident, $get_mut:ident, $name:literal) => {
        #[doc = concat!("Inserts a ", $name, " and returns its ID.")]
        pub fn $add(&mut self, data: $data) -> $id {
            self.$field.insert(data)
        }

        #[doc = concat!("Returns a reference to the ", $name, " data.")]
        ///
        /// # Errors
        ///
        /// Returns an error if the entity is not found in the store.
        pub fn $get(&self, id: $id) -> Result<&$data, TopologyError> {
            self.$field
                .get(id)
                .ok_or_else(|| TopologyError::EntityNotFound($name.into()))
        }

        #[doc = concat!("Returns a mutable reference to the ", $name, " data.")]
        ///
        /// # Errors
        ///
        /// Returns an error if the entity is not found in the store.
        pub fn $get_mut(&mut self, id: $id) -> Result<&mut $data, TopologyError> {
            self.$field
                .get_mut(id)
                .ok_or_else(|| TopologyError::EntityNotFound($name.into()))
        }
    };
}

impl TopologyStore {
    /// Creates a new, empty topology store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    arena_accessors!(vertices, VertexId, VertexData, add_vertex, vertex, vertex_mut, "vertex");
    arena_accessors!(edges, EdgeId, EdgeData, add_edge, edge, edge_mut, "edge");
    arena_accessors!(wires, WireId, WireData, add_wire, wire, wire_mut, "wire");
    arena_accessors!(faces, FaceId, FaceData, add_face, face, face_mut, "face");
    arena_accessors!(shells, ShellId, ShellData, add_shell, shell, shell_mut, "shell");
    arena_accessors!(solids, SolidId, SolidData, add_solid, solid, solid_mut, "solid");

    /// Returns the vertices of a face's outer wire in traversal order.
    ///
    /// # Errors
    ///
    /// Returns an error if the face, its wire or one of its edges is missing.
    pub fn face_loop(&self, face: FaceId) -> Result<Vec<VertexId>, TopologyError> {
        let wire = self.wire(self.face(face)?.outer_wire)?;
        wire.edges
            .iter()
            .map(|oe| self.edge(oe.edge).map(|e| if oe.forward { e.start } else { e.end }))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;

    #[test]
    fn missing_entity_is_reported_by_kind() {
        let mut store = TopologyStore::new();
        let v = store.add_vertex(VertexData::new(Point3::origin()));
        let other = TopologyStore::new();
        let err = other.vertex(v).unwrap_err();
        assert!(err.to_string().contains("vertex"));
        assert!(store.vertex_mut(v).is_ok());
    }

    #[test]
    fn shape_ref_conversions() {
        let mut store = TopologyStore::new();
        let v = store.add_vertex(VertexData::new(Point3::origin()));
        assert_eq!(ShapeRef::from(v), ShapeRef::Vertex(v));
    }
}
