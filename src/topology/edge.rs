use crate::error::Result;
use crate::geometry::curve::{Arc, Curve, CurveDomain, Ellipse, Line};
use crate::math::{Point3, Vector3};

use super::vertex::VertexId;

slotmap::new_key_type! {
    /// Unique identifier for an edge in the topology store.
    pub struct EdgeId;
}

/// The geometric curve associated with an edge.
#[derive(Debug, Clone)]
pub enum EdgeCurve {
    /// A line segment.
    Line(Line),
    /// A circular arc.
    Arc(Arc),
    /// An elliptical arc, where two blends are mitred.
    Ellipse(Ellipse),
}

/// Discriminant of [`EdgeCurve`], used to tell apart edges that share
/// both end vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CurveKind {
    Line,
    Arc,
    Ellipse,
}

impl EdgeCurve {
    /// Returns the kind of curve.
    #[must_use]
    pub fn kind(&self) -> CurveKind {
        match self {
            Self::Line(_) => CurveKind::Line,
            Self::Arc(_) => CurveKind::Arc,
            Self::Ellipse(_) => CurveKind::Ellipse,
        }
    }

    fn as_curve(&self) -> &dyn Curve {
        match self {
            Self::Line(line) => line,
            Self::Arc(arc) => arc,
            Self::Ellipse(ellipse) => ellipse,
        }
    }
}

/// Data associated with a topological edge.
///
/// An edge connects two vertices and carries the curve between them,
/// restricted to `[t_start, t_end]`.
#[derive(Debug, Clone)]
pub struct EdgeData {
    pub start: VertexId,
    pub end: VertexId,
    pub curve: EdgeCurve,
    /// Curve parameter at `start`.
    pub t_start: f64,
    /// Curve parameter at `end`.
    pub t_end: f64,
}

impl EdgeData {
    /// Creates a straight edge from `start` to `end`.
    ///
    /// # Errors
    ///
    /// Returns an error if the two positions coincide.
    pub fn line(start: (VertexId, Point3), end: (VertexId, Point3)) -> Result<Self> {
        let (line, length) = Line::through(start.1, end.1)?;
        Ok(Self {
            start: start.0,
            end: end.0,
            curve: EdgeCurve::Line(line),
            t_start: 0.0,
            t_end: length,
        })
    }

    /// Creates an edge along the whole of `arc`.
    #[must_use]
    pub fn arc(start: VertexId, end: VertexId, arc: Arc) -> Self {
        let domain = arc.domain();
        Self {
            start,
            end,
            curve: EdgeCurve::Arc(arc),
            t_start: domain.t_min,
            t_end: domain.t_max,
        }
    }

    /// Creates an edge along the whole of `ellipse`.
    #[must_use]
    pub fn ellipse(start: VertexId, end: VertexId, ellipse: Ellipse) -> Self {
        let domain = ellipse.domain();
        Self {
            start,
            end,
            curve: EdgeCurve::Ellipse(ellipse),
            t_start: domain.t_min,
            t_end: domain.t_max,
        }
    }

    /// Returns the end vertices as `(first, second)` for a traversal in the
    /// given direction.
    #[must_use]
    pub fn oriented_ends(&self, forward: bool) -> (VertexId, VertexId) {
        if forward {
            (self.start, self.end)
        } else {
            (self.end, self.start)
        }
    }

    /// Returns the vertex at the other end from `v`, if `v` bounds this edge.
    #[must_use]
    pub fn opposite(&self, v: VertexId) -> Option<VertexId> {
        if v == self.start {
            Some(self.end)
        } else if v == self.end {
            Some(self.start)
        } else {
            None
        }
    }

    fn span(&self) -> CurveDomain {
        CurveDomain::new(self.t_start, self.t_end)
    }

    /// Evaluates the curve at `s` in `[0, 1]` along the edge.
    ///
    /// # Errors
    ///
    /// Returns an error if curve evaluation fails.
    pub fn point_at(&self, s: f64) -> Result<Point3> {
        self.curve.as_curve().evaluate(self.span().lerp(s))
    }

    /// Unit tangent at `s` in `[0, 1]`, pointing from `start` to `end`.
    ///
    /// # Errors
    ///
    /// Returns an error if the curve tangent is degenerate.
    pub fn tangent_at(&self, s: f64) -> Result<Vector3> {
        let tangent = self.curve.as_curve().tangent(self.span().lerp(s))?;
        Ok(if self.t_end < self.t_start { -tangent } else { tangent })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::topology::{TopologyStore, VertexData};

    #[test]
    fn straight_edge_runs_from_start_to_end() {
        let mut store = TopologyStore::new();
        let (a, b) = (Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 4.0, 0.0));
        let va = store.add_vertex(VertexData::new(a));
        let vb = store.add_vertex(VertexData::new(b));
        let edge = EdgeData::line((va, a), (vb, b)).unwrap();
        assert!((edge.t_end - 4.0).abs() < 1e-12);
        assert!((edge.point_at(0.25).unwrap() - Point3::new(1.0, 1.0, 0.0)).norm() < 1e-12);
        assert!((edge.tangent_at(0.0).unwrap() - Vector3::y()).norm() < 1e-12);
        assert_eq!(edge.opposite(va), Some(vb));
        assert_eq!(edge.oriented_ends(false), (vb, va));
        assert_eq!(edge.curve.kind(), CurveKind::Line);
    }

    #[test]
    fn arc_edge_spans_the_arc() {
        let mut store = TopologyStore::new();
        let va = store.add_vertex(VertexData::new(Point3::new(1.0, 0.0, 0.0)));
        let vb = store.add_vertex(VertexData::new(Point3::new(0.0, 1.0, 0.0)));
        let arc = Arc::from_center_and_ends(
            Point3::origin(),
            Vector3::z(),
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(0.0, 1.0, 0.0),
        )
        .unwrap();
        let edge = EdgeData::arc(va, vb, arc);
        assert!((edge.point_at(1.0).unwrap() - Point3::new(0.0, 1.0, 0.0)).norm() < 1e-9);
        assert_eq!(edge.curve.kind(), CurveKind::Arc);
    }
}
