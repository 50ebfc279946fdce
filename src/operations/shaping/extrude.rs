use crate::error::{OperationError, Result};
use crate::math::polygon_3d::newell_normal;
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::operations::creation::{MakeFace, MakeSolid};
use crate::topology::{
    EdgeCurve, EdgeData, FaceId, OrientedEdge, ShellData, SolidId, TopologyStore, VertexData,
    VertexId, WireData, WireId,
};

/// Extrudes a planar face along a direction vector to create a prism.
///
/// The prism reuses the vertices and edges of the profile for its bottom
/// face, and every edge of the result is shared by exactly two faces that
/// traverse it in opposite directions.
pub struct Extrude {
    face: FaceId,
    direction: Vector3,
}

/// One corner of the profile loop: the vertex and the edge leaving it.
#[derive(Clone, Copy)]
struct Corner {
    vertex: VertexId,
    point: Point3,
    outgoing: OrientedEdge,
}

impl Extrude {
    /// Creates a new `Extrude` operation.
    #[must_use]
    pub fn new(face: FaceId, direction: Vector3) -> Self {
        Self { face, direction }
    }

    /// Executes the extrusion, creating the solid in the topology store.
    ///
    /// Holes of the profile become inner walls of the prism.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if the direction is zero-length,
    /// the profile has curved edges, or the direction lies in the profile
    /// plane.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<SolidId> {
        if self.direction.norm() < TOLERANCE {
            return Err(
                OperationError::InvalidInput("extrude direction must be non-zero".into()).into(),
            );
        }
        let face = store.face(self.face)?;
        let (outer_wire, inner_wires) = (face.outer_wire, face.inner_wires.clone());

        // The outer loop runs counter-clockwise about the direction, holes
        // clockwise, so every wall faces away from the material.
        let outer = self.oriented(loop_corners(store, outer_wire)?, true)?;
        let mut loops = vec![outer];
        for wire in inner_wires {
            loops.push(self.oriented(loop_corners(store, wire)?, false)?);
        }

        let mut walls = Vec::new();
        let mut caps = Vec::with_capacity(loops.len());
        for corners in &loops {
            let (cap, sides) = self.walls(store, corners)?;
            caps.push(cap);
            walls.extend(sides);
        }
        let bottoms = loops
            .iter()
            .map(|corners| corners.iter().rev().map(|c| c.outgoing.reversed()).collect())
            .collect();

        let mut faces = Vec::with_capacity(walls.len() + 2);
        faces.push(planar_face(store, bottoms)?);
        faces.push(planar_face(store, caps)?);
        faces.extend(walls);
        let shell = store.add_shell(ShellData::closed(faces));
        MakeSolid::new(shell, vec![]).execute(store)
    }

    /// Orients a profile loop about the direction.
    fn oriented(&self, corners: Vec<Corner>, counter_clockwise: bool) -> Result<Vec<Corner>> {
        let points: Vec<Point3> = corners.iter().map(|c| c.point).collect();
        let normal = newell_normal(&points)
            .ok_or_else(|| OperationError::InvalidInput("profile encloses no area".into()))?;
        let alignment = normal.dot(&self.direction);
        if alignment.abs() < TOLERANCE {
            return Err(OperationError::InvalidInput(
                "extrude direction lies in the profile plane".into(),
            )
            .into());
        }
        Ok(if (alignment > 0.0) == counter_clockwise {
            corners
        } else {
            reverse_loop(&corners)
        })
    }

    /// Builds the side faces over one loop; returns the loop of its top
    /// edges with them.
    fn walls(&self, store: &mut TopologyStore, corners: &[Corner]) -> Result<(Vec<OrientedEdge>, Vec<FaceId>)> {
        let n = corners.len();
        let top: Vec<(VertexId, Point3)> = corners
            .iter()
            .map(|c| {
                let p = c.point + self.direction;
                (store.add_vertex(VertexData::new(p)), p)
            })
            .collect();
        let mut top_edges = Vec::with_capacity(n);
        let mut rails = Vec::with_capacity(n);
        for i in 0..n {
            top_edges.push(store.add_edge(EdgeData::line(top[i], top[(i + 1) % n])?));
            rails.push(store.add_edge(EdgeData::line(
                (corners[i].vertex, corners[i].point),
                top[i],
            )?));
        }

        let mut faces = Vec::with_capacity(n);
        for i in 0..n {
            let j = (i + 1) % n;
            let side = vec![
                corners[i].outgoing,
                OrientedEdge::new(rails[j], true),
                OrientedEdge::new(top_edges[i], false),
                OrientedEdge::new(rails[i], false),
            ];
            faces.push(planar_face(store, vec![side])?);
        }
        let cap = top_edges.iter().map(|&e| OrientedEdge::new(e, true)).collect();
        Ok((cap, faces))
    }
}

/// Corners of a straight-edged profile loop.
fn loop_corners(store: &TopologyStore, wire: WireId) -> Result<Vec<Corner>> {
    let mut corners = Vec::new();
    for &oe in &store.wire(wire)?.edges {
        let edge = store.edge(oe.edge)?;
        if !matches!(edge.curve, EdgeCurve::Line(_)) {
            return Err(OperationError::InvalidInput(
                "only straight-edged profiles can be extruded".into(),
            )
            .into());
        }
        let (vertex, _) = edge.oriented_ends(oe.forward);
        corners.push(Corner {
            vertex,
            point: store.vertex(vertex)?.point,
            outgoing: oe,
        });
    }
    Ok(corners)
}

/// Traverses the loop the other way, keeping the first corner first.
fn reverse_loop(corners: &[Corner]) -> Vec<Corner> {
    let n = corners.len();
    (0..n)
        .map(|k| {
            let incoming = corners[(2 * n - k - 1) % n].outgoing;
            Corner {
                outgoing: incoming.reversed(),
                ..corners[(n - k) % n]
            }
        })
        .collect()
}

/// Planar face bounded by the first loop, with the others as holes.
fn planar_face(store: &mut TopologyStore, loops: Vec<Vec<OrientedEdge>>) -> Result<FaceId> {
    let mut wires = loops.into_iter().map(|edges| store.add_wire(WireData::closed(edges)));
    let outer = wires
        .next()
        .ok_or_else(|| OperationError::InvalidInput("face needs a boundary".into()))?;
    MakeFace::new(outer, wires.collect()).execute(store)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::creation::MakeWire;
    use crate::topology::TopologyIndex;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn profile(store: &mut TopologyStore, pts: Vec<Point3>) -> FaceId {
        let wire = MakeWire::new(pts, true).execute(store).unwrap();
        MakeFace::new(wire, vec![]).execute(store).unwrap()
    }

    /// Outward normal of a face: its plane normal must point away from `inside`.
    fn faces_outward(store: &TopologyStore, face: FaceId, inside: &Point3) -> bool {
        let plane = store.face(face).unwrap().surface.as_plane().unwrap().clone();
        plane.signed_distance(inside) < 0.0
    }

    // ── Orientation ──

    #[test]
    fn all_faces_point_outward() {
        let mut store = TopologyStore::new();
        let face = profile(&mut store, vec![p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0), p(2.0, 2.0, 0.0), p(0.0, 2.0, 0.0)]);
        let solid = Extrude::new(face, Vector3::new(0.0, 0.0, 3.0)).execute(&mut store).unwrap();
        let index = TopologyIndex::build(&store, solid).unwrap();
        let centre = p(1.0, 1.0, 1.5);
        for &f in index.faces() {
            assert!(faces_outward(&store, f, &centre));
        }
    }

    #[test]
    fn clockwise_profile_is_reoriented() {
        let mut store = TopologyStore::new();
        let face = profile(&mut store, vec![p(0.0, 0.0, 0.0), p(0.0, 2.0, 0.0), p(2.0, 2.0, 0.0), p(2.0, 0.0, 0.0)]);
        let solid = Extrude::new(face, Vector3::new(0.0, 0.0, 1.0)).execute(&mut store).unwrap();
        let index = TopologyIndex::build(&store, solid).unwrap();
        let centre = p(1.0, 1.0, 0.5);
        for &f in index.faces() {
            assert!(faces_outward(&store, f, &centre));
        }
        for &e in index.edges() {
            let uses = index.faces_of_edge(e);
            assert_eq!(uses.len(), 2);
            assert_ne!(uses[0].1, uses[1].1);
        }
    }

    // ── Topology ──

    #[test]
    fn l_profile_counts() {
        let mut store = TopologyStore::new();
        let face = profile(
            &mut store,
            vec![p(0.0, 0.0, 0.0), p(4.0, 0.0, 0.0), p(4.0, 1.0, 0.0), p(1.0, 1.0, 0.0), p(1.0, 4.0, 0.0), p(0.0, 4.0, 0.0)],
        );
        let solid = Extrude::new(face, Vector3::new(0.0, 0.0, 2.0)).execute(&mut store).unwrap();
        let index = TopologyIndex::build(&store, solid).unwrap();
        assert_eq!(index.faces().len(), 8);
        assert_eq!(index.edges().len(), 18);
        assert_eq!(index.vertices().len(), 12);
    }

    #[test]
    fn square_hole_becomes_an_inner_wall() {
        let mut store = TopologyStore::new();
        let outer = MakeWire::new(vec![p(0.0, 0.0, 0.0), p(10.0, 0.0, 0.0), p(10.0, 10.0, 0.0), p(0.0, 10.0, 0.0)], true)
            .execute(&mut store)
            .unwrap();
        let hole = MakeWire::new(vec![p(3.0, 3.0, 0.0), p(7.0, 3.0, 0.0), p(7.0, 7.0, 0.0), p(3.0, 7.0, 0.0)], true)
            .execute(&mut store)
            .unwrap();
        let face = MakeFace::new(outer, vec![hole]).execute(&mut store).unwrap();
        let solid = Extrude::new(face, Vector3::new(0.0, 0.0, 4.0)).execute(&mut store).unwrap();
        let index = TopologyIndex::build(&store, solid).unwrap();
        assert_eq!(index.faces().len(), 10);
        assert_eq!(index.edges().len(), 24);
        assert_eq!(index.vertices().len(), 16);
        for &e in index.edges() {
            let uses = index.faces_of_edge(e);
            assert_eq!(uses.len(), 2);
            assert_ne!(uses[0].1, uses[1].1);
        }
        // Inner walls face into the hole.
        let in_hole = p(5.0, 5.0, 2.0);
        let walls_out = index
            .faces()
            .iter()
            .filter(|&&f| {
                let plane = store.face(f).unwrap().surface.as_plane().unwrap().clone();
                plane.plane_normal().z.abs() < 1e-9 && plane.signed_distance(&in_hole) > 0.0
            })
            .count();
        assert_eq!(walls_out, 4);
        let capped = index
            .faces()
            .iter()
            .filter(|&&f| store.face(f).unwrap().inner_wires.len() == 1)
            .count();
        assert_eq!(capped, 2);
    }

    #[test]
    fn direction_in_profile_plane_is_rejected() {
        let mut store = TopologyStore::new();
        let face = profile(&mut store, vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)]);
        assert!(Extrude::new(face, Vector3::x()).execute(&mut store).is_err());
        assert!(Extrude::new(face, Vector3::zeros()).execute(&mut store).is_err());
    }
}
