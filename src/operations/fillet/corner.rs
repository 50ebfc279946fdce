//! Blends meeting at a shared vertex.
//!
//! Two blends ending at the same sharp vertex are mitred: both are cut by
//! the plane through the crossing of their surfaces. Three blends meeting
//! at a vertex are set back to the point where their axes meet and a
//! corner patch closes the gap between them, a sphere for rounded blends
//! and a flat triangle for chamfers. The faces around such a vertex are cut
//! to the corner points rather than to the contacts of a single blend.

use tracing::debug;

use crate::geometry::surface::{Cylinder, Plane, Sphere};
use crate::math::{angle_between, try_normalize, Point3, Vector3};
use crate::topology::{FaceId, FaceSurface, TopologyIndex, VertexId};

use super::params::FilletParams;
use super::solver::BlendFailure;
use super::stripe::{BlendSection, BlendStatus, Mitre, Stripe};

/// One blend end at a vertex.
#[derive(Debug, Clone)]
struct End {
    /// Position of the contour in the stripe list.
    slot: usize,
    patch: usize,
    side: usize,
    /// Unit spine direction leaving the vertex.
    away: Vector3,
    section: BlendSection,
    /// Section at the other end of the patch.
    far: BlendSection,
    surface: FaceSurface,
    convex: bool,
}

impl End {
    fn faces(&self) -> [FaceId; 2] {
        [self.section.first.face, self.section.second.face]
    }

    fn side_of(&self, center: Point3) -> CornerSide {
        CornerSide {
            center,
            axis: self.away,
        }
    }
}

/// A replacement end section.
struct Update {
    slot: usize,
    patch: usize,
    side: usize,
    section: BlendSection,
}

/// One side of a corner patch, shared with the end section of the blend
/// along one edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerSide {
    pub center: Point3,
    pub axis: Vector3,
}

/// The patch closing a vertex where three blends meet.
#[derive(Debug, Clone)]
pub struct CornerPatch {
    pub surface: FaceSurface,
    /// Corner points, counter-clockwise seen from outside the solid.
    pub points: [Point3; 3],
    /// `sides[k]` runs from `points[k]` to the next point.
    pub sides: [CornerSide; 3],
    pub rounded: bool,
}

/// How the faces around a shared vertex are cut.
#[derive(Debug, Clone)]
pub struct Corner {
    pub vertex: VertexId,
    /// New corner point of every face around the vertex.
    pub face_points: Vec<(FaceId, Point3)>,
    pub patch: Option<CornerPatch>,
}

impl Corner {
    /// Where `face` now ends at the vertex.
    #[must_use]
    pub fn point_on(&self, face: FaceId) -> Option<Point3> {
        self.face_points.iter().find_map(|&(f, q)| (f == face).then_some(q))
    }
}

fn failure(vertex: VertexId, message: &str) -> BlendFailure {
    BlendFailure::new(BlendStatus::Error, message).at_vertex(vertex)
}

fn contact(end: &End, face: FaceId, vertex: VertexId) -> Result<Point3, BlendFailure> {
    end.section
        .contact_on(face)
        .ok_or_else(|| failure(vertex, "blend end does not touch the face"))
}

/// Midpoint of the closest approach of two axes, if they meet within `tol`.
fn axes_meet(pa: &Point3, da: &Vector3, pb: &Point3, db: &Vector3, tol: f64) -> Option<Point3> {
    let w = pa - pb;
    let b = da.dot(db);
    let denom = 1.0 - b * b;
    if denom < 1e-12 {
        return None;
    }
    let (d, e) = (da.dot(&w), db.dot(&w));
    let qa = pa + da * ((b * e - d) / denom);
    let qb = pb + db * ((e - b * d) / denom);
    ((qa - qb).norm() <= tol).then(|| Point3::from(0.5 * (qa.coords + qb.coords)))
}

fn corner_tolerance(params: &FilletParams) -> f64 {
    params.spatial_tolerance.max(params.approx_tolerance_3d)
}

/// Rejects ends that cannot share a corner: concave, of varying radius,
/// or of different radii.
fn check_joinable(vertex: VertexId, ends: &[&End], params: &FilletParams) -> Result<(), BlendFailure> {
    if ends.iter().any(|e| !e.convex) {
        return Err(failure(vertex, "blends meeting at a concave vertex cannot be joined"));
    }
    let rounded = ends.iter().all(|e| e.section.rounded);
    if !rounded && ends.iter().any(|e| e.section.rounded) {
        return Err(failure(vertex, "rounded and straight blends meet at a vertex"));
    }
    let constant = |e: &&End| match e.surface {
        FaceSurface::Cylinder(_) => rounded,
        FaceSurface::Plane(_) => !rounded,
        _ => false,
    };
    if !ends.iter().all(constant) {
        return Err(failure(vertex, "only constant-radius blends can be joined at a vertex"));
    }
    let (lo, hi) = ends
        .iter()
        .map(|e| e.section.radius)
        .fold((f64::INFINITY, 0.0_f64), |(lo, hi), r| (lo.min(r), hi.max(r)));
    if hi - lo > params.approx_tolerance_3d {
        return Err(failure(vertex, "blends meeting at a vertex have different radii"));
    }
    Ok(())
}

/// Whether two ends of one contour continue each other through the vertex.
fn continues(a: &End, b: &End, params: &FilletParams) -> bool {
    a.slot == b.slot && angle_between(&a.away, &-b.away).is_some_and(|turn| turn <= params.continuity_angle)
}

fn mitre(
    index: &TopologyIndex,
    vertex: VertexId,
    a: &End,
    b: &End,
    params: &FilletParams,
) -> Result<(Corner, Vec<Update>), BlendFailure> {
    check_joinable(vertex, &[a, b], params)?;
    let tol = corner_tolerance(params);
    let (fa, fb) = (a.faces(), b.faces());
    let common: Vec<FaceId> = fa.iter().copied().filter(|f| fb.contains(f)).collect();
    let &[shared] = common.as_slice() else {
        let message = if common.len() == 2 {
            "blends of two contours meet tangentially at a vertex"
        } else {
            "mitred blends share no face"
        };
        return Err(failure(vertex, message));
    };
    let other = |pair: [FaceId; 2]| if pair[0] == shared { pair[1] } else { pair[0] };
    let (ga, gb) = (other(fa), other(fb));
    let faces = index.faces_at_vertex(vertex);
    if faces.len() != 3 || ![shared, ga, gb].iter().all(|f| faces.contains(f)) {
        return Err(failure(vertex, "mitred blends must cover the faces at the vertex"));
    }

    let o = axes_meet(&a.section.center, &a.away, &b.section.center, &b.away, tol)
        .ok_or_else(|| failure(vertex, "blend axes do not meet"))?;
    let on_shared = o + (contact(a, shared, vertex)? - a.section.center);
    if (o + (contact(b, shared, vertex)? - b.section.center) - on_shared).norm() > tol {
        return Err(failure(vertex, "mitred blends do not meet on their shared face"));
    }
    // The cut plane bisects the two spine directions.
    let n = try_normalize(&(a.away - b.away)).ok_or_else(|| failure(vertex, "blends are parallel"))?;
    let on_side = |e: &End, g: FaceId| -> Result<Point3, BlendFailure> {
        let t = o + (contact(e, g, vertex)? - e.section.center);
        Ok(t - e.away * ((t - o).dot(&n) / e.away.dot(&n)))
    };
    let apex = on_side(a, ga)?;
    if (on_side(b, gb)? - apex).norm() > tol {
        return Err(failure(vertex, "mitred blends do not meet on the side faces"));
    }
    for e in [a, b] {
        for (face, q) in [(shared, on_shared), (other(e.faces()), apex)] {
            if (q - contact(e, face, vertex)?).dot(&e.away) < -tol {
                return Err(failure(vertex, "blends overlap at a reflex vertex"));
            }
        }
    }

    let radius = a.section.radius;
    let normal_part = n - a.away * n.dot(&a.away);
    let e1 = try_normalize(&normal_part).ok_or_else(|| failure(vertex, "mitre plane is a section plane"))?;
    let cut = Mitre {
        center: o,
        major: (e1 - a.away * (normal_part.norm() / n.dot(&a.away))) * radius,
        minor: a.away.cross(&e1) * radius,
    };
    let face_points = vec![(shared, on_shared), (ga, apex), (gb, apex)];
    let updates = [a, b]
        .into_iter()
        .map(|e| {
            let mut section = e.section.clone();
            for c in [&mut section.first, &mut section.second] {
                c.point = if c.face == shared { on_shared } else { apex };
            }
            section.mitre = Some(cut);
            Update {
                slot: e.slot,
                patch: e.patch,
                side: e.side,
                section,
            }
        })
        .collect();
    debug!(?vertex, "mitred two blends");
    Ok((
        Corner {
            vertex,
            face_points,
            patch: None,
        },
        updates,
    ))
}

fn ball(
    index: &TopologyIndex,
    vertex: VertexId,
    ends: [&End; 3],
    params: &FilletParams,
) -> Result<(Corner, Vec<Update>), BlendFailure> {
    check_joinable(vertex, &ends, params)?;
    let tol = corner_tolerance(params);
    let [a, b, c] = ends;
    let faces = index.faces_at_vertex(vertex);
    let covered = faces.len() == 3
        && faces
            .iter()
            .all(|f| ends.iter().filter(|e| e.faces().contains(f)).count() == 2);
    if !covered {
        return Err(failure(vertex, "three blends must cover the three faces at the vertex"));
    }

    let o = axes_meet(&a.section.center, &a.away, &b.section.center, &b.away, tol)
        .ok_or_else(|| failure(vertex, "blend axes do not meet"))?;
    let mut face_points: Vec<(FaceId, Point3)> = Vec::with_capacity(3);
    for e in ends {
        let setback = (o - e.section.center).dot(&e.away);
        if setback <= tol {
            return Err(failure(vertex, "blends overlap at a reflex vertex"));
        }
        for f in e.faces() {
            let t = o + (contact(e, f, vertex)? - e.section.center);
            match face_points.iter().find(|(g, _)| *g == f) {
                Some((_, q)) if (q - t).norm() > tol => {
                    return Err(failure(vertex, "blend axes do not meet at one point"));
                }
                Some(_) => {}
                None => face_points.push((f, t)),
            }
        }
    }
    let corner = Corner {
        vertex,
        face_points,
        patch: None,
    };
    let point = |f: FaceId| corner.point_on(f).ok_or_else(|| failure(vertex, "face has no corner point"));

    // Walk the triangle: a, then the end sharing a's second face.
    let [f0, f1] = a.faces();
    let (next, last) = if b.faces().contains(&f1) { (b, c) } else { (c, b) };
    let f2 = if next.faces()[0] == f1 { next.faces()[1] } else { next.faces()[0] };
    let mut points = [point(f0)?, point(f1)?, point(f2)?];
    let mut sides = [a.side_of(o), next.side_of(o), last.side_of(o)];
    let centroid = Point3::from((points[0].coords + points[1].coords + points[2].coords) / 3.0);
    if (points[1] - points[0]).cross(&(points[2] - points[0])).dot(&(centroid - o)) < 0.0 {
        points = [points[0], points[2], points[1]];
        sides = [sides[2], sides[1], sides[0]];
    }
    let rounded = a.section.rounded;
    let surface = if rounded {
        FaceSurface::Sphere(Sphere::new(o, a.section.radius, centroid - o)?)
    } else {
        FaceSurface::Plane(Plane::new(points[0], points[1] - points[0], points[2] - points[0])?)
    };

    let mut updates = Vec::with_capacity(3);
    for e in ends {
        let setback = (o - e.section.center).dot(&e.away);
        let run = (e.far.spine_point - e.section.spine_point).dot(&e.away);
        let mut section = e.section.clone();
        section.spine_point += e.away * setback;
        section.center = o;
        section.parameter += (e.far.parameter - e.section.parameter) * (setback / run);
        section.first.point = point(section.first.face)?;
        section.second.point = point(section.second.face)?;
        updates.push(Update {
            slot: e.slot,
            patch: e.patch,
            side: e.side,
            section,
        });
    }
    debug!(?vertex, "closed a three-blend corner");
    Ok((
        Corner {
            patch: Some(CornerPatch {
                surface,
                points,
                sides,
                rounded,
            }),
            ..corner
        },
        updates,
    ))
}

/// Writes a replaced end section back into its patch and refits the
/// patch surface.
fn apply_update(stripes: &mut [Option<Stripe>], update: Update, tol: f64) -> Result<(), BlendFailure> {
    let vertex = update.section.vertex;
    let Some(patch) = stripes
        .get_mut(update.slot)
        .and_then(Option::as_mut)
        .and_then(|s| s.patches.get_mut(update.patch))
    else {
        return Err(BlendFailure::new(BlendStatus::Error, "blend end is missing"));
    };
    if update.side == 0 {
        patch.range.0 = update.section.parameter;
    } else {
        patch.range.1 = update.section.parameter;
    }
    patch.sections[update.side] = update.section;

    let [s0, s1] = &patch.sections;
    let overlap = || {
        let message = "corners at both ends of a blend overlap";
        match vertex {
            Some(v) => failure(v, message),
            None => BlendFailure::new(BlendStatus::Error, message),
        }
    };
    for face in [s0.first.face, s0.second.face] {
        let (Some(p0), Some(p1)) = (s0.contact_on(face), s1.contact_on(face)) else {
            return Err(overlap());
        };
        if (p1 - p0).dot(&s0.tangent) <= tol {
            return Err(overlap());
        }
    }
    if let (FaceSurface::Cylinder(_), None) = (&patch.surface, s0.mitre) {
        let run = s1.spine_point - s0.spine_point;
        let cylinder = Cylinder::through_contacts(s0.center, run, &s0.first.point, &s0.second.point)?;
        patch.surface = FaceSurface::Cylinder(cylinder);
    }
    Ok(())
}

/// Finds the vertices where several blend ends meet, mitres or sets back
/// the ends there and returns how to cut the faces around them.
///
/// `stripes` holds one entry per contour, `None` for contours left out.
/// End sections are rewritten in place.
///
/// # Errors
///
/// When the blends at a vertex cannot be joined, returns the position of
/// the contour to leave out (the highest one meeting there) and why.
pub fn plan_corners(
    index: &TopologyIndex,
    stripes: &mut [Option<Stripe>],
    params: &FilletParams,
) -> Result<Vec<Corner>, (usize, BlendFailure)> {
    let mut groups: Vec<(VertexId, Vec<End>)> = Vec::new();
    for (slot, stripe) in stripes.iter().enumerate() {
        let Some(stripe) = stripe else {
            continue;
        };
        for (ip, patch) in stripe.patches.iter().enumerate() {
            for (side, section) in patch.sections.iter().enumerate() {
                let Some(v) = section.vertex else {
                    continue;
                };
                let end = End {
                    slot,
                    patch: ip,
                    side,
                    away: if side == 0 { section.tangent } else { -section.tangent },
                    section: section.clone(),
                    far: patch.sections[1 - side].clone(),
                    surface: patch.surface.clone(),
                    convex: patch.convex,
                };
                match groups.iter_mut().find(|(w, _)| *w == v) {
                    Some((_, ends)) => ends.push(end),
                    None => groups.push((v, vec![end])),
                }
            }
        }
    }

    let tol = corner_tolerance(params);
    let mut corners = Vec::new();
    for (vertex, ends) in groups {
        let blame = ends.iter().map(|e| e.slot).max().unwrap_or_default();
        let joined = match ends.as_slice() {
            [_] => continue,
            [a, b] if continues(a, b, params) => continue,
            [a, b] => mitre(index, vertex, a, b, params),
            [a, b, c] => ball(index, vertex, [a, b, c], params),
            _ => Err(failure(vertex, "more than three blends meet at a vertex")),
        };
        let (corner, updates) = joined.map_err(|f| (blame, f))?;
        for update in updates {
            apply_update(stripes, update, tol).map_err(|f| (blame, f))?;
        }
        corners.push(corner);
    }
    debug!(corners = corners.len(), "planned blend corners");
    Ok(corners)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::creation::MakeBox;
    use crate::operations::fillet::contour::ContourSet;
    use crate::operations::fillet::params::FilletShape;
    use crate::operations::fillet::radius::ResolvedLaw;
    use crate::operations::fillet::solver::{BlendRequest, BlendSolver, RollingBallSolver};
    use crate::topology::{EdgeId, ShapeRef, TopologyStore};

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    struct Fixture {
        store: TopologyStore,
        index: TopologyIndex,
    }

    fn cube() -> Fixture {
        let mut store = TopologyStore::new();
        let solid = MakeBox::new(Point3::origin(), p(10.0, 10.0, 10.0))
            .execute(&mut store)
            .unwrap();
        let index = TopologyIndex::build(&store, solid).unwrap();
        Fixture { store, index }
    }

    fn edge_where(fx: &Fixture, keep: impl Fn(&Point3) -> bool) -> EdgeId {
        fx.index
            .edges()
            .iter()
            .copied()
            .find(|&e| {
                let data = fx.store.edge(e).unwrap();
                [data.start, data.end]
                    .iter()
                    .all(|&v| keep(&fx.store.vertex(v).unwrap().point))
            })
            .unwrap()
    }

    fn vertex_at(fx: &Fixture, at: Point3) -> VertexId {
        fx.index
            .vertices()
            .iter()
            .copied()
            .find(|&v| (fx.store.vertex(v).unwrap().point - at).norm() < 1e-12)
            .unwrap()
    }

    /// Edges at the corner (0, 0, 10): along x, along y and down z.
    fn corner_edges(fx: &Fixture) -> [EdgeId; 3] {
        [
            edge_where(fx, |q| q.y.abs() < 1e-12 && (q.z - 10.0).abs() < 1e-12),
            edge_where(fx, |q| q.x.abs() < 1e-12 && (q.z - 10.0).abs() < 1e-12),
            edge_where(fx, |q| q.x.abs() < 1e-12 && q.y.abs() < 1e-12),
        ]
    }

    fn solve_all(fx: &Fixture, set: &ContourSet, radii: &[f64], shape: FilletShape) -> Vec<Option<Stripe>> {
        let params = FilletParams::default();
        (1..=set.len())
            .map(|ic| {
                let contour = set.get(ic).unwrap();
                let r = radii[ic - 1];
                let law = ResolvedLaw {
                    edges: contour.spans().iter().map(|s| vec![(s.first, r), (s.last, r)]).collect(),
                };
                let request = BlendRequest {
                    contour: ic,
                    spine: contour,
                    law: &law,
                    shape,
                    params: &params,
                    index: &fx.index,
                };
                Some(RollingBallSolver.solve(&fx.store, &request).unwrap())
            })
            .collect()
    }

    fn face_with(fx: &Fixture, corner: &Corner, at: Point3) -> bool {
        corner.face_points.iter().any(|(_, q)| (q - at).norm() < 1e-9)
            && corner.face_points.len() == fx.index.faces_at_vertex(corner.vertex).len()
    }

    // ── Mitre ──

    #[test]
    fn sharp_joint_is_mitred() {
        let fx = cube();
        let [front, left, _] = corner_edges(&fx);
        let mut set = ContourSet::default();
        set.add(&fx.index, front).unwrap();
        set.add(&fx.index, left).unwrap();
        let mut stripes = solve_all(&fx, &set, &[1.0], FilletShape::Rational);

        let corners = plan_corners(&fx.index, &mut stripes, &FilletParams::default()).unwrap();
        assert_eq!(corners.len(), 1);
        let corner = &corners[0];
        assert_eq!(corner.vertex, vertex_at(&fx, p(0.0, 0.0, 10.0)));
        assert!(corner.patch.is_none());
        assert!(face_with(&fx, corner, p(1.0, 1.0, 10.0)));
        assert!(face_with(&fx, corner, p(0.0, 0.0, 9.0)));

        let mitred: Vec<&BlendSection> = stripes[0]
            .as_ref()
            .unwrap()
            .patches
            .iter()
            .flat_map(|patch| &patch.sections)
            .filter(|s| s.mitre.is_some())
            .collect();
        assert_eq!(mitred.len(), 2);
        for s in mitred {
            assert!(matches!(s.curve().unwrap(), crate::topology::EdgeCurve::Ellipse(_)));
            assert_eq!(corner.point_on(s.first.face), Some(s.first.point));
            assert_eq!(corner.point_on(s.second.face), Some(s.second.point));
        }
    }

    #[test]
    fn lone_blend_end_is_not_a_corner() {
        let fx = cube();
        let mut set = ContourSet::default();
        set.add(&fx.index, corner_edges(&fx)[0]).unwrap();
        let mut stripes = solve_all(&fx, &set, &[2.0], FilletShape::Rational);
        assert!(plan_corners(&fx.index, &mut stripes, &FilletParams::default())
            .unwrap()
            .is_empty());
    }

    // ── Ball ──

    #[test]
    fn three_blends_close_with_a_sphere() {
        let fx = cube();
        let [front, left, down] = corner_edges(&fx);
        let mut set = ContourSet::default();
        set.add(&fx.index, front).unwrap();
        set.add(&fx.index, left).unwrap();
        assert_eq!(set.add(&fx.index, down).unwrap(), 2);
        let mut stripes = solve_all(&fx, &set, &[1.0, 1.0], FilletShape::Rational);

        let corners = plan_corners(&fx.index, &mut stripes, &FilletParams::default()).unwrap();
        assert_eq!(corners.len(), 1);
        let corner = &corners[0];
        let patch = corner.patch.as_ref().unwrap();
        let FaceSurface::Sphere(sphere) = &patch.surface else {
            panic!("expected a spherical corner");
        };
        assert!((sphere.center() - p(1.0, 1.0, 9.0)).norm() < 1e-9);
        for at in [p(1.0, 1.0, 10.0), p(1.0, 0.0, 9.0), p(0.0, 1.0, 9.0)] {
            assert!(face_with(&fx, corner, at));
            assert!(patch.points.iter().any(|q| (q - at).norm() < 1e-9));
        }

        // Every end at the corner now stops at the ball center.
        let v = corner.vertex;
        let ends: Vec<&BlendSection> = stripes
            .iter()
            .flatten()
            .flat_map(|s| &s.patches)
            .flat_map(|patch| &patch.sections)
            .filter(|s| s.vertex == Some(v))
            .collect();
        assert_eq!(ends.len(), 3);
        for s in ends {
            assert!((s.center - p(1.0, 1.0, 9.0)).norm() < 1e-9);
            assert!(s.mitre.is_none());
        }
    }

    #[test]
    fn chamfer_corner_is_a_flat_triangle() {
        let fx = cube();
        let [front, left, down] = corner_edges(&fx);
        let mut set = ContourSet::default();
        for e in [front, left, down] {
            set.add(&fx.index, e).unwrap();
        }
        let mut stripes = solve_all(&fx, &set, &[2.0, 2.0], FilletShape::Chamfer);
        let corners = plan_corners(&fx.index, &mut stripes, &FilletParams::default()).unwrap();
        let patch = corners[0].patch.as_ref().unwrap();
        let FaceSurface::Plane(plane) = &patch.surface else {
            panic!("expected a flat corner");
        };
        // The outward normal points away from the solid, towards the corner.
        let n = plane.plane_normal();
        assert!(n.x < 0.0 && n.y < 0.0 && n.z > 0.0);
    }

    // ── Failures ──

    #[test]
    fn unequal_radii_blame_the_later_contour() {
        let fx = cube();
        let [front, left, down] = corner_edges(&fx);
        let mut set = ContourSet::default();
        for e in [front, left, down] {
            set.add(&fx.index, e).unwrap();
        }
        let mut stripes = solve_all(&fx, &set, &[1.0, 2.0], FilletShape::Rational);
        let (slot, failure) = plan_corners(&fx.index, &mut stripes, &FilletParams::default()).unwrap_err();
        assert_eq!(slot, 1);
        let v = vertex_at(&fx, p(0.0, 0.0, 10.0));
        assert_eq!(failure.vertex, Some(v));
        assert_eq!(failure.bad_shape, Some(ShapeRef::Vertex(v)));

        // Without the later contour the remaining two edges are mitred.
        stripes[1] = None;
        let corners = plan_corners(&fx.index, &mut stripes, &FilletParams::default()).unwrap();
        assert_eq!(corners.len(), 1);
        assert!(corners[0].patch.is_none());
    }

    #[test]
    fn corner_longer_than_the_blend_is_rejected() {
        let fx = cube();
        let [front, left, _] = corner_edges(&fx);
        let mut set = ContourSet::default();
        set.add(&fx.index, front).unwrap();
        set.add(&fx.index, left).unwrap();
        let mut stripes = solve_all(&fx, &set, &[1.0], FilletShape::Rational);
        // Shorten the patch along x to less than the mitre reach.
        let patch = stripes[0]
            .as_mut()
            .unwrap()
            .patches
            .iter_mut()
            .find(|patch| patch.edge == front)
            .unwrap();
        let v = vertex_at(&fx, p(0.0, 0.0, 10.0));
        let far = usize::from(patch.sections[0].vertex == Some(v));
        let near = 1 - far;
        let shift = patch.sections[far].tangent * (if far == 1 { -9.5 } else { 9.5 });
        let moved = &mut patch.sections[far];
        moved.spine_point += shift;
        moved.center += shift;
        moved.first.point += shift;
        moved.second.point += shift;
        assert_eq!(patch.sections[near].vertex, Some(v));

        let (_, failure) = plan_corners(&fx.index, &mut stripes, &FilletParams::default()).unwrap_err();
        assert_eq!(failure.vertex, Some(v));
    }
}
