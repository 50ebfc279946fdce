use crate::error::{OperationError, Result};
use crate::math::{Point3, TOLERANCE};
use crate::topology::{EdgeData, OrientedEdge, TopologyStore, VertexData, WireData, WireId};

/// Creates a polyline wire through a sequence of 3D points.
///
/// Each point becomes a vertex and each consecutive pair a straight edge.
/// A closed wire gets a final edge back to the first point.
pub struct MakeWire {
    points: Vec<Point3>,
    close: bool,
}

impl MakeWire {
    /// Creates a new `MakeWire` operation.
    #[must_use]
    pub fn new(points: Vec<Point3>, close: bool) -> Self {
        Self { points, close }
    }

    /// Executes the operation, creating the wire in the topology store.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if there are too few points
    /// or two consecutive points coincide.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<WireId> {
        let min_points = if self.close { 3 } else { 2 };
        if self.points.len() < min_points {
            return Err(OperationError::InvalidInput(format!(
                "a wire needs at least {min_points} points, got {}",
                self.points.len()
            ))
            .into());
        }

        let n = self.points.len();
        let segments = if self.close { n } else { n - 1 };
        for i in 0..segments {
            let (a, b) = (self.points[i], self.points[(i + 1) % n]);
            if (b - a).norm() < TOLERANCE {
                return Err(OperationError::InvalidInput(format!(
                    "wire points {i} and {} coincide",
                    (i + 1) % n
                ))
                .into());
            }
        }

        let vertices: Vec<_> = self
            .points
            .iter()
            .map(|&p| store.add_vertex(VertexData::new(p)))
            .collect();

        let mut edges = Vec::with_capacity(segments);
        for i in 0..segments {
            let j = (i + 1) % n;
            let data = EdgeData::line(
                (vertices[i], self.points[i]),
                (vertices[j], self.points[j]),
            )?;
            edges.push(OrientedEdge::new(store.add_edge(data), true));
        }

        Ok(store.add_wire(WireData {
            edges,
            is_closed: self.close,
        }))
    }
}
