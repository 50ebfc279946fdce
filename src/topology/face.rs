use crate::geometry::surface::{Cylinder, Plane, Sphere, SweptBlend};

use super::wire::WireId;

slotmap::new_key_type! {
    /// Unique identifier for a face in the topology store.
    pub struct FaceId;
}

/// The geometric surface associated with a face.
#[derive(Debug, Clone)]
pub enum FaceSurface {
    /// A planar surface.
    Plane(Plane),
    /// A cylindrical surface (constant-radius blend).
    Cylinder(Cylinder),
    /// A swept blend with a variable radius or a non-circular section.
    Blend(SweptBlend),
    /// The corner patch where three rounded blends meet.
    Sphere(Sphere),
}

impl FaceSurface {
    /// Returns the plane if the surface is planar.
    #[must_use]
    pub fn as_plane(&self) -> Option<&Plane> {
        match self {
            Self::Plane(plane) => Some(plane),
            _ => None,
        }
    }
}

/// Data associated with a topological face.
///
/// A face is a bounded region on a surface, defined by an outer wire
/// and optionally inner wires (holes).
#[derive(Debug, Clone)]
pub struct FaceData {
    pub surface: FaceSurface,
    /// The outer boundary wire.
    pub outer_wire: WireId,
    /// Inner boundary wires (holes).
    pub inner_wires: Vec<WireId>,
    /// If `true`, the face normal agrees with the surface normal.
    pub same_sense: bool,
}

impl FaceData {
    /// Creates a face without holes.
    #[must_use]
    pub fn new(surface: FaceSurface, outer_wire: WireId, same_sense: bool) -> Self {
        Self {
            surface,
            outer_wire,
            inner_wires: Vec::new(),
            same_sense,
        }
    }
}
