use crate::error::Result;
use crate::topology::{EdgeCurve, EdgeId, TopologyStore};

/// Computes the arc length of an edge.
pub struct Length {
    edge: EdgeId,
}

impl Length {
    /// Creates a new `Length` query.
    #[must_use]
    pub fn new(edge: EdgeId) -> Self {
        Self { edge }
    }

    /// Executes the query, returning the edge length.
    ///
    /// Lines are parameterised by arc length; arcs by angle, so their
    /// length is `radius * |t_end - t_start|`. Elliptical arcs are
    /// integrated numerically.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is not found.
    pub fn execute(&self, store: &TopologyStore) -> Result<f64> {
        let edge = store.edge(self.edge)?;
        let span = (edge.t_end - edge.t_start).abs();
        Ok(match &edge.curve {
            EdgeCurve::Line(_) => span,
            EdgeCurve::Arc(arc) => arc.radius() * span,
            EdgeCurve::Ellipse(ellipse) => ellipse.arc_length(edge.t_start, edge.t_end),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::curve::{Arc, Ellipse};
    use crate::math::{Point3, Vector3};
    use crate::operations::creation::MakeWire;
    use crate::topology::{EdgeData, VertexData};

    #[test]
    fn line_length_3_4_5() {
        let mut store = TopologyStore::new();
        let wire = MakeWire::new(vec![Point3::new(0.0, 0.0, 0.0), Point3::new(3.0, 4.0, 0.0)], false)
            .execute(&mut store)
            .unwrap();
        let edge_id = store.wire(wire).unwrap().edges[0].edge;
        let len = Length::new(edge_id).execute(&store).unwrap();
        assert!((len - 5.0).abs() < 1e-10);
    }

    #[test]
    fn quarter_arc_length() {
        let mut store = TopologyStore::new();
        let (a, b) = (Point3::new(0.0, -2.0, 0.0), Point3::new(2.0, 0.0, 0.0));
        let arc = Arc::from_center_and_ends(Point3::origin(), -Vector3::z(), &a, &b).unwrap();
        let va = store.add_vertex(VertexData::new(a));
        let vb = store.add_vertex(VertexData::new(b));
        let edge = store.add_edge(EdgeData::arc(va, vb, arc));
        let len = Length::new(edge).execute(&store).unwrap();
        assert!((len - std::f64::consts::PI).abs() < 1e-9);
    }

    #[test]
    fn elliptical_arc_length_is_between_its_axes() {
        let mut store = TopologyStore::new();
        let (a, b) = (Point3::new(3.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0));
        let ellipse =
            Ellipse::from_axes_and_ends(Point3::origin(), Vector3::x() * 3.0, Vector3::y(), &a, &b).unwrap();
        let va = store.add_vertex(VertexData::new(a));
        let vb = store.add_vertex(VertexData::new(b));
        let edge = store.add_edge(EdgeData::ellipse(va, vb, ellipse));
        let len = Length::new(edge).execute(&store).unwrap();
        // Quarter of Ramanujan's perimeter approximation for a = 3, b = 1.
        let h: f64 = (2.0_f64 / 4.0).powi(2);
        let ramanujan = std::f64::consts::PI * 4.0 * (1.0 + 3.0 * h / (10.0 + (4.0 - 3.0 * h).sqrt()));
        assert!((len - ramanujan / 4.0).abs() < 1e-4);
    }
}
