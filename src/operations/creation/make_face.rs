use crate::error::{OperationError, Result, TopologyError};
use crate::geometry::surface::Plane;
use crate::math::polygon_3d::newell_normal;
use crate::math::Point3;
use crate::topology::{FaceData, FaceId, FaceSurface, TopologyStore, WireId};

/// Creates a planar face bounded by a closed wire.
///
/// The plane is oriented by the traversal of the outer wire (Newell
/// normal), so a counter-clockwise loop seen from outside gives an
/// outward-facing face.
pub struct MakeFace {
    outer_wire: WireId,
    inner_wires: Vec<WireId>,
}

impl MakeFace {
    /// Creates a new `MakeFace` operation.
    #[must_use]
    pub fn new(outer_wire: WireId, inner_wires: Vec<WireId>) -> Self {
        Self {
            outer_wire,
            inner_wires,
        }
    }

    /// Executes the operation, creating the face in the topology store.
    ///
    /// # Errors
    ///
    /// Returns an error if a wire is open, degenerate or not coplanar with
    /// the outer wire.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<FaceId> {
        let points = wire_points(store, self.outer_wire)?;
        let normal = newell_normal(&points).ok_or_else(|| {
            OperationError::InvalidInput("face boundary encloses no area".into())
        })?;
        let u_dir = points[1] - points[0];
        let plane = Plane::new(points[0], u_dir, normal.cross(&u_dir))?;

        let scale = points
            .iter()
            .map(|q| (q - points[0]).norm())
            .fold(1.0_f64, f64::max);
        for &wire in std::iter::once(&self.outer_wire).chain(&self.inner_wires) {
            for q in wire_points(store, wire)? {
                if plane.signed_distance(&q).abs() > 1e-9 * scale {
                    return Err(
                        OperationError::InvalidInput("face boundary is not planar".into()).into(),
                    );
                }
            }
        }

        let mut face = FaceData::new(FaceSurface::Plane(plane), self.outer_wire, true);
        face.inner_wires.clone_from(&self.inner_wires);
        Ok(store.add_face(face))
    }
}

/// Start points of the edges of a closed wire, in traversal order.
fn wire_points(store: &TopologyStore, wire: WireId) -> Result<Vec<Point3>> {
    let data = store.wire(wire)?;
    if !data.is_closed {
        return Err(TopologyError::WireNotClosed.into());
    }
    if data.edges.len() < 3 {
        return Err(OperationError::InvalidInput("face boundary needs three edges".into()).into());
    }
    data.edges
        .iter()
        .map(|oe| {
            let (start, _) = store.edge(oe.edge)?.oriented_ends(oe.forward);
            Ok(store.vertex(start)?.point)
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Vector3;
    use crate::operations::creation::MakeWire;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn counter_clockwise_square_faces_up() {
        let mut store = TopologyStore::new();
        let pts = vec![p(0.0, 0.0, 2.0), p(1.0, 0.0, 2.0), p(1.0, 1.0, 2.0), p(0.0, 1.0, 2.0)];
        let wire = MakeWire::new(pts, true).execute(&mut store).unwrap();
        let face = MakeFace::new(wire, vec![]).execute(&mut store).unwrap();
        let plane = store.face(face).unwrap().surface.as_plane().unwrap().clone();
        assert!((plane.plane_normal() - Vector3::z()).norm() < 1e-12);
    }

    #[test]
    fn open_wire_is_rejected() {
        let mut store = TopologyStore::new();
        let wire = MakeWire::new(vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0)], false)
            .execute(&mut store)
            .unwrap();
        assert!(MakeFace::new(wire, vec![]).execute(&mut store).is_err());
    }

    #[test]
    fn warped_quad_is_rejected() {
        let mut store = TopologyStore::new();
        let pts = vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.5), p(0.0, 1.0, 0.0)];
        let wire = MakeWire::new(pts, true).execute(&mut store).unwrap();
        assert!(MakeFace::new(wire, vec![]).execute(&mut store).is_err());
    }
}
