//! Trimming of the solid around computed blends.
//!
//! Faces are held as loops of points while blends are applied, each point
//! remembering the input vertex it still stands for and each segment the
//! input edge it still follows. Applying a contour moves the contour
//! vertices of the support faces onto the contact lines, cuts the end faces
//! back to the blend sections and adds the blend faces. Vertices where
//! blends of several contours meet are left to [`WorkingShape::apply_corner`],
//! which cuts every face there to its corner point and adds the corner
//! patch. Once everything has been applied the loops are turned into
//! topology: unchanged faces
//! and edges keep their IDs, new points are merged within the spatial
//! tolerance and new edges are shared between the faces that meet there.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::{OperationError, Result};
use crate::geometry::curve::{Arc, Ellipse};
use crate::math::point_index::PointIndex;
use crate::math::polygon_3d::locate_on_segment;
use crate::math::{Point3, Vector3};
use crate::operations::creation::MakeSolid;
use crate::topology::{
    CurveKind, EdgeCurve, EdgeData, EdgeId, FaceData, FaceId, FaceSurface, OrientedEdge,
    ShapeRef, ShellData, SolidId, TopologyIndex, TopologyStore, VertexData, VertexId, WireData,
    WireId,
};

use super::contour::Contour;
use super::corner::Corner;
use super::history::{History, SplitKind};
use super::solver::BlendFailure;
use super::stripe::{BlendSection, BlendStatus, Stripe};

/// What a loop segment runs along.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Segment {
    /// An edge of the input solid, possibly shortened.
    Original(EdgeId),
    /// A contact line of the blend along a spine edge.
    Contact(EdgeId),
    /// A blend section at a contour vertex, or at an interior knot.
    Section {
        vertex: Option<VertexId>,
        center: Point3,
        axis: Vector3,
        rounded: bool,
    },
    /// A section mitred against another blend at a contour vertex.
    Mitre {
        vertex: Option<VertexId>,
        center: Point3,
        major: Vector3,
        minor: Vector3,
        rounded: bool,
    },
}

impl Segment {
    fn section(section: &BlendSection) -> Self {
        match section.mitre {
            Some(cut) => Self::Mitre {
                vertex: section.vertex,
                center: cut.center,
                major: cut.major,
                minor: cut.minor,
                rounded: section.rounded,
            },
            None => Self::Section {
                vertex: section.vertex,
                center: section.center,
                axis: section.tangent,
                rounded: section.rounded,
            },
        }
    }

    fn vertex(self) -> Option<VertexId> {
        match self {
            Self::Section { vertex, .. } | Self::Mitre { vertex, .. } => vertex,
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    point: Point3,
    /// The input vertex this point still is.
    vertex: Option<VertexId>,
    /// Segment from this node to the next one.
    next: Segment,
}

#[derive(Debug, Clone)]
struct WorkFace {
    /// Input face this loop comes from; `None` for blend faces.
    origin: Option<FaceId>,
    /// Spine edge of a blend face, or vertex of a corner patch.
    generator: Option<ShapeRef>,
    surface: FaceSurface,
    same_sense: bool,
    holes: Vec<WireId>,
    nodes: Vec<Node>,
    /// Highest-priority way the face was trimmed.
    relation: Option<SplitKind>,
}

impl WorkFace {
    fn mark(&mut self, kind: SplitKind) {
        self.relation = Some(self.relation.map_or(kind, |k| k.min(kind)));
    }

    fn node_at(&self, vertex: VertexId) -> Option<usize> {
        self.nodes.iter().position(|n| n.vertex == Some(vertex))
    }

    fn prev(&self, k: usize) -> usize {
        (k + self.nodes.len() - 1) % self.nodes.len()
    }

    fn succ(&self, k: usize) -> usize {
        (k + 1) % self.nodes.len()
    }
}

/// The solid being filleted, as editable face loops.
#[derive(Debug, Clone)]
pub struct WorkingShape {
    faces: Vec<WorkFace>,
    shortened: HashSet<EdgeId>,
    /// Edges bounding a hole of some face.
    hole_edges: HashSet<EdgeId>,
    tolerance: f64,
}

/// Sections of one contour meeting at a contour vertex.
struct VertexSections<'a> {
    sections: Vec<&'a BlendSection>,
    convex: bool,
}

impl VertexSections<'_> {
    fn contact_on(&self, face: FaceId) -> Option<Point3> {
        self.sections.iter().find_map(|s| s.contact_on(face))
    }

    fn contacts(&self) -> impl Iterator<Item = Point3> + '_ {
        self.sections
            .iter()
            .flat_map(|s| [s.first.point, s.second.point])
    }
}

fn walking_failure(face: Option<FaceId>, message: &str) -> BlendFailure {
    let failure = BlendFailure::new(BlendStatus::WalkingFailure, message);
    match face {
        Some(f) => failure.on(f),
        None => failure,
    }
}

impl WorkingShape {
    /// Loads every face of the indexed solid.
    ///
    /// # Errors
    ///
    /// Returns an error if an entity of the solid is missing from the store.
    pub fn new(store: &TopologyStore, index: &TopologyIndex, tolerance: f64) -> Result<Self> {
        let mut faces = Vec::with_capacity(index.faces().len());
        let mut hole_edges = HashSet::new();
        for &face in index.faces() {
            let data = store.face(face)?;
            for &wire in &data.inner_wires {
                hole_edges.extend(store.wire(wire)?.edges.iter().map(|oe| oe.edge));
            }
            let mut nodes = Vec::new();
            for oe in &store.wire(data.outer_wire)?.edges {
                let edge = store.edge(oe.edge)?;
                let start = edge.oriented_ends(oe.forward).0;
                nodes.push(Node {
                    point: store.vertex(start)?.point,
                    vertex: Some(start),
                    next: Segment::Original(oe.edge),
                });
            }
            faces.push(WorkFace {
                origin: Some(face),
                generator: None,
                surface: data.surface.clone(),
                same_sense: data.same_sense,
                holes: data.inner_wires.clone(),
                nodes,
                relation: None,
            });
        }
        Ok(Self {
            faces,
            shortened: HashSet::new(),
            hole_edges,
            tolerance,
        })
    }

    /// Number of face loops, blend faces included.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Whether `point` lies on the straight segment `from -> to`, clear of
    /// its far end `to`.
    fn strictly_inside(&self, point: &Point3, from: &Point3, to: &Point3) -> bool {
        let length = (to - from).norm();
        locate_on_segment(point, from, to, self.tolerance)
            .is_some_and(|t| t * length > self.tolerance && (1.0 - t) * length > self.tolerance)
    }

    /// The input line edge under `segment`, if it still is one.
    fn original_line(store: &TopologyStore, segment: Segment) -> Option<EdgeId> {
        match segment {
            Segment::Original(e) => store
                .edge(e)
                .ok()
                .filter(|data| data.curve.kind() == CurveKind::Line)
                .map(|_| e),
            _ => None,
        }
    }

    /// Trims the faces around one contour's blend and adds its blend faces.
    ///
    /// Vertices in `corners` are skipped; they are cut by
    /// [`apply_corner`](Self::apply_corner) once every contour is in.
    ///
    /// On error the shape may be partly modified; callers apply contours to
    /// a copy and keep it only on success.
    ///
    /// # Errors
    ///
    /// Returns a [`BlendFailure`] when the blend cannot be fitted into the
    /// faces around it.
    pub fn apply(
        &mut self,
        store: &TopologyStore,
        index: &TopologyIndex,
        contour: &Contour,
        stripe: &Stripe,
        corners: &HashSet<VertexId>,
    ) -> std::result::Result<(), BlendFailure> {
        let spine: HashSet<EdgeId> = contour.edges().iter().map(|e| e.edge).collect();
        if let Some(&edge) = spine.iter().find(|e| self.hole_edges.contains(e)) {
            return Err(BlendFailure::new(BlendStatus::Error, "spine edge lies on an inner wire").on(edge));
        }
        let mut at_vertex: HashMap<VertexId, VertexSections<'_>> = HashMap::new();
        for patch in &stripe.patches {
            for section in &patch.sections {
                if let Some(v) = section.vertex {
                    at_vertex
                        .entry(v)
                        .or_insert_with(|| VertexSections {
                            sections: Vec::new(),
                            convex: patch.convex,
                        })
                        .sections
                        .push(section);
                }
            }
        }

        let mut vertices = contour.vertices();
        vertices.dedup();
        if contour.is_closed() && vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        let ends = if contour.is_closed() {
            (None, None)
        } else {
            (contour.first_vertex(), contour.last_vertex())
        };

        for &v in vertices.iter().filter(|v| !corners.contains(v)) {
            let sections = at_vertex.get(&v).ok_or_else(|| {
                BlendFailure::new(BlendStatus::Error, "no blend section at contour vertex").at_vertex(v)
            })?;
            let is_end = ends.0 == Some(v) || ends.1 == Some(v);
            self.trim_at_vertex(store, index, v, sections, &spine, is_end)?;
        }

        self.insert_knots(index, stripe);
        for face in &mut self.faces {
            for node in &mut face.nodes {
                if let Segment::Original(e) = node.next {
                    if spine.contains(&e) {
                        node.next = Segment::Contact(e);
                    }
                }
            }
        }
        self.add_blend_faces(contour, stripe);
        debug!(contour = stripe.contour, faces = self.faces.len(), "applied blend");
        Ok(())
    }

    fn trim_at_vertex(
        &mut self,
        store: &TopologyStore,
        index: &TopologyIndex,
        v: VertexId,
        sections: &VertexSections<'_>,
        spine: &HashSet<EdgeId>,
        is_end: bool,
    ) -> std::result::Result<(), BlendFailure> {
        let expected = index.faces_at_vertex(v).len();
        let mut found = 0;
        for fi in 0..self.faces.len() {
            let Some(k) = self.faces[fi].node_at(v) else {
                continue;
            };
            found += 1;
            let face = &self.faces[fi];
            let origin = face.origin;
            let (kp, kn) = (face.prev(k), face.succ(k));
            let on_spine = |seg: Segment| matches!(seg, Segment::Original(e) if spine.contains(&e));
            let prev_spine = on_spine(face.nodes[kp].next);
            let next_spine = on_spine(face.nodes[k].next);
            let contact = origin.and_then(|f| sections.contact_on(f));

            match (prev_spine, next_spine) {
                (true, true) => {
                    let q = contact.ok_or_else(|| {
                        BlendFailure::new(BlendStatus::Error, "support face has no contact").at_vertex(v)
                    })?;
                    let face = &mut self.faces[fi];
                    face.nodes[k] = Node { point: q, vertex: None, ..face.nodes[k].clone() };
                    face.mark(SplitKind::Out);
                }
                (true, false) | (false, true) => {
                    let q = contact.ok_or_else(|| {
                        BlendFailure::new(BlendStatus::Error, "support face has no contact").at_vertex(v)
                    })?;
                    // The other segment at `v` is cut back to the contact point.
                    let (segment, far) = if next_spine {
                        (face.nodes[kp].next, face.nodes[kp].point)
                    } else {
                        (face.nodes[k].next, face.nodes[kn].point)
                    };
                    let here = face.nodes[k].point;
                    let edge = Self::original_line(store, segment)
                        .filter(|_| self.strictly_inside(&q, &here, &far))
                        .ok_or_else(|| walking_failure(origin, "blend runs off a support face"))?;
                    self.shortened.insert(edge);
                    let face = &mut self.faces[fi];
                    face.nodes[k] = Node { point: q, vertex: None, ..face.nodes[k].clone() };
                    face.mark(SplitKind::Out);
                }
                (false, false) if is_end => {
                    let (prev_seg, next_seg) = (face.nodes[kp].next, face.nodes[k].next);
                    let (p, here, n) = (face.nodes[kp].point, face.nodes[k].point, face.nodes[kn].point);
                    let prev_edge = Self::original_line(store, prev_seg);
                    let next_edge = Self::original_line(store, next_seg);
                    let on_prev = sections.contacts().find(|q| self.strictly_inside(q, &here, &p));
                    let on_next = sections.contacts().find(|q| self.strictly_inside(q, &here, &n));
                    let (Some(pe), Some(ne), Some(qa), Some(qb)) = (prev_edge, next_edge, on_prev, on_next)
                    else {
                        return Err(walking_failure(origin, "blend section does not fit the end face"));
                    };
                    self.shortened.insert(pe);
                    self.shortened.insert(ne);
                    let section = sections.sections[0];
                    let face = &mut self.faces[fi];
                    let cut = [
                        Node {
                            point: qa,
                            vertex: None,
                            next: Segment::section(section),
                        },
                        Node {
                            point: qb,
                            vertex: None,
                            next: next_seg,
                        },
                    ];
                    face.nodes.splice(k..=k, cut);
                    face.mark(if sections.convex { SplitKind::On } else { SplitKind::In });
                }
                (false, false) => {
                    return Err(BlendFailure::new(
                        BlendStatus::Error,
                        "a face meets the contour only at an interior vertex",
                    )
                    .at_vertex(v));
                }
            }
        }
        if found < expected {
            return Err(BlendFailure::new(
                BlendStatus::WalkingFailure,
                "vertex is not on the outer boundary of every face around it",
            )
            .at_vertex(v));
        }
        Ok(())
    }

    /// Cuts every face around a blend corner to its corner point and adds
    /// the corner patch, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`BlendFailure`] when a corner point falls outside the
    /// face edge it should shorten.
    pub fn apply_corner(
        &mut self,
        store: &TopologyStore,
        index: &TopologyIndex,
        corner: &Corner,
    ) -> std::result::Result<(), BlendFailure> {
        let v = corner.vertex;
        let corner_failure = |message: &str| BlendFailure::new(BlendStatus::Error, message).at_vertex(v);
        let expected = index.faces_at_vertex(v).len();
        let mut found = 0;
        for fi in 0..self.faces.len() {
            let Some(k) = self.faces[fi].node_at(v) else {
                continue;
            };
            found += 1;
            let face = &self.faces[fi];
            let origin = face.origin;
            let q = origin
                .and_then(|f| corner.point_on(f))
                .ok_or_else(|| corner_failure("face at a blend corner has no corner point"))?;
            let (kp, kn) = (face.prev(k), face.succ(k));
            let here = face.nodes[k].point;
            let mut cut = Vec::with_capacity(2);
            for (segment, far) in [(face.nodes[kp].next, face.nodes[kp].point), (face.nodes[k].next, face.nodes[kn].point)] {
                match segment {
                    Segment::Contact(_) => {}
                    Segment::Original(_) => {
                        let edge = Self::original_line(store, segment)
                            .filter(|_| self.strictly_inside(&q, &here, &far))
                            .ok_or_else(|| walking_failure(origin, "blend corner runs off a face"))?;
                        cut.push(edge);
                    }
                    _ => return Err(corner_failure("face was already cut at the corner")),
                }
            }
            if cut.len() == 2 {
                return Err(corner_failure("a face meets the blends only at their corner"));
            }
            self.shortened.extend(cut);
            let face = &mut self.faces[fi];
            face.nodes[k] = Node { point: q, vertex: None, ..face.nodes[k].clone() };
            face.mark(SplitKind::Out);
        }
        if found < expected {
            return Err(corner_failure("vertex is not on the outer boundary of every face around it"));
        }

        if let Some(patch) = &corner.patch {
            let nodes = patch
                .points
                .iter()
                .zip(&patch.sides)
                .map(|(&point, side)| Node {
                    point,
                    vertex: None,
                    next: Segment::Section {
                        vertex: Some(v),
                        center: side.center,
                        axis: side.axis,
                        rounded: patch.rounded,
                    },
                })
                .collect();
            self.faces.push(WorkFace {
                origin: None,
                generator: Some(ShapeRef::Vertex(v)),
                surface: patch.surface.clone(),
                same_sense: true,
                holes: Vec::new(),
                nodes,
                relation: None,
            });
        }
        debug!(vertex = ?v, faces = self.faces.len(), "applied blend corner");
        Ok(())
    }

    /// Splits the contact lines of the support faces at interior knots.
    fn insert_knots(&mut self, index: &TopologyIndex, stripe: &Stripe) {
        for face in &mut self.faces {
            let Some(origin) = face.origin else {
                continue;
            };
            let mut k = 0;
            while k < face.nodes.len() {
                let Segment::Original(e) = face.nodes[k].next else {
                    k += 1;
                    continue;
                };
                let start = face.nodes[k].point;
                let mut knots: Vec<Point3> = stripe
                    .patches_on(e)
                    .flat_map(|p| p.sections.iter())
                    .filter(|s| s.vertex.is_none())
                    .filter_map(|s| s.contact_on(origin))
                    .collect();
                if knots.is_empty() || !index.faces_of_edge(e).iter().any(|(f, _)| *f == origin) {
                    k += 1;
                    continue;
                }
                knots.sort_by(|a, b| (a - start).norm().total_cmp(&(b - start).norm()));
                knots.dedup_by(|a, b| (*a - *b).norm() <= self.tolerance);
                let count = knots.len();
                let inserted = knots.into_iter().map(|point| Node {
                    point,
                    vertex: None,
                    next: Segment::Original(e),
                });
                face.nodes.splice(k + 1..k + 1, inserted);
                face.mark(SplitKind::Out);
                k += count + 1;
            }
        }
    }

    fn add_blend_faces(&mut self, contour: &Contour, stripe: &Stripe) {
        for patch in &stripe.patches {
            let forward = contour
                .edges()
                .iter()
                .find(|se| se.edge == patch.edge)
                .is_none_or(|se| se.forward);
            let [a, b] = &patch.sections;
            let (start, end) = if forward { (a, b) } else { (b, a) };
            let nodes = vec![
                Node {
                    point: end.first.point,
                    vertex: None,
                    next: Segment::Contact(patch.edge),
                },
                Node {
                    point: start.first.point,
                    vertex: None,
                    next: Segment::section(start),
                },
                Node {
                    point: start.second.point,
                    vertex: None,
                    next: Segment::Contact(patch.edge),
                },
                Node {
                    point: end.second.point,
                    vertex: None,
                    next: Segment::section(end),
                },
            ];
            let same_sense = matches!(patch.surface, FaceSurface::Plane(_)) || patch.convex;
            self.faces.push(WorkFace {
                origin: None,
                generator: Some(ShapeRef::Edge(patch.edge)),
                surface: patch.surface.clone(),
                same_sense,
                holes: Vec::new(),
                nodes,
                relation: None,
            });
        }
    }

    /// Builds the trimmed solid in `store` and records where its faces and
    /// edges came from. Result membership is left for the caller to index.
    ///
    /// # Errors
    ///
    /// Returns an error if a loop collapses or an entity cannot be built.
    pub fn assemble(self, store: &mut TopologyStore) -> Result<(SolidId, History)> {
        let mut history = History::default();
        let mut points: PointIndex<VertexId> = PointIndex::new(self.tolerance);
        for node in self.faces.iter().flat_map(|f| &f.nodes) {
            if let Some(v) = node.vertex {
                points.find_or_insert_with(node.point, || v);
            }
        }

        let mut new_edges: HashMap<(VertexId, VertexId, CurveKind), EdgeId> = HashMap::new();
        let mut faces = Vec::with_capacity(self.faces.len());
        for face in &self.faces {
            if let (Some(origin), None) = (face.origin, face.relation) {
                faces.push(origin);
                continue;
            }
            let ids: Vec<VertexId> = face
                .nodes
                .iter()
                .map(|n| {
                    n.vertex.unwrap_or_else(|| {
                        points.find_or_insert_with(n.point, || store.add_vertex(VertexData::new(n.point)))
                    })
                })
                .collect();

            let mut wire = Vec::with_capacity(ids.len());
            for (k, node) in face.nodes.iter().enumerate() {
                let kn = (k + 1) % ids.len();
                let (va, vb) = (ids[k], ids[kn]);
                let (pa, pb) = (node.point, face.nodes[kn].point);
                if va == vb {
                    return Err(OperationError::Failed("trimmed face has a collapsed edge".into()).into());
                }
                if let Segment::Original(e) = node.next {
                    if !self.shortened.contains(&e) {
                        wire.push(OrientedEdge::new(e, store.edge(e)?.start == va));
                        continue;
                    }
                }
                let curve = match node.next {
                    Segment::Section { center, axis, rounded: true, .. } => {
                        Some(EdgeCurve::Arc(Arc::from_center_and_ends(center, axis, &pa, &pb)?))
                    }
                    Segment::Mitre { center, major, minor, rounded: true, .. } => Some(EdgeCurve::Ellipse(
                        Ellipse::from_axes_and_ends(center, major, minor, &pa, &pb)?,
                    )),
                    _ => None,
                };
                let kind = curve.as_ref().map_or(CurveKind::Line, EdgeCurve::kind);
                let key = (va.min(vb), va.max(vb), kind);
                let edge = if let Some(&edge) = new_edges.get(&key) {
                    edge
                } else {
                    let data = match curve {
                        Some(EdgeCurve::Arc(arc)) => EdgeData::arc(va, vb, arc),
                        Some(EdgeCurve::Ellipse(ellipse)) => EdgeData::ellipse(va, vb, ellipse),
                        _ => EdgeData::line((va, pa), (vb, pb))?,
                    };
                    let edge = store.add_edge(data);
                    new_edges.insert(key, edge);
                    edge
                };
                match (node.next, node.next.vertex()) {
                    (Segment::Original(e), _) => history.record_modified_edge(e, edge),
                    (_, Some(v)) => history.record_generated(v, edge),
                    _ => {}
                }
                wire.push(OrientedEdge::new(edge, store.edge(edge)?.start == va));
            }

            let outer_wire = store.add_wire(WireData::closed(wire));
            let new_face = store.add_face(FaceData {
                surface: face.surface.clone(),
                outer_wire,
                inner_wires: face.holes.clone(),
                same_sense: face.same_sense,
            });
            match (face.origin, face.relation, face.generator) {
                (Some(origin), Some(kind), _) => history.record_split(origin, kind, new_face),
                (None, _, Some(shape)) => history.record_generated(shape, new_face),
                _ => {}
            }
            faces.push(new_face);
        }

        let shell = store.add_shell(ShellData::closed(faces));
        let solid = MakeSolid::new(shell, Vec::new()).execute(store)?;
        Ok((solid, history))
    }
}
