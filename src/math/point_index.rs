use std::collections::HashMap;

use super::Point3;

/// Spatial hash that assigns one identity to all points within a tolerance.
///
/// Coordinates are quantised onto a grid of cell size `tolerance`; lookups
/// search the 27 neighbouring cells so two points closer than the tolerance
/// always resolve to the same entry, whichever side of a cell boundary they
/// fall on.
#[derive(Debug)]
pub struct PointIndex<T> {
    tolerance: f64,
    cells: HashMap<(i64, i64, i64), Vec<(Point3, T)>>,
}

impl<T: Copy> PointIndex<T> {
    /// Creates an empty index with the given merge tolerance.
    #[must_use]
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            cells: HashMap::new(),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn key(&self, point: &Point3) -> (i64, i64, i64) {
        (
            (point.x / self.tolerance).floor() as i64,
            (point.y / self.tolerance).floor() as i64,
            (point.z / self.tolerance).floor() as i64,
        )
    }

    /// Returns the value stored for a point within tolerance of `point`.
    #[must_use]
    pub fn find(&self, point: &Point3) -> Option<T> {
        let (kx, ky, kz) = self.key(point);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(bucket) = self.cells.get(&(kx + dx, ky + dy, kz + dz)) else {
                        continue;
                    };
                    if let Some((_, value)) = bucket
                        .iter()
                        .find(|(p, _)| (p - point).norm() <= self.tolerance)
                    {
                        return Some(*value);
                    }
                }
            }
        }
        None
    }

    /// Returns the existing value for `point`, or inserts one built by `make`.
    pub fn find_or_insert_with(&mut self, point: Point3, make: impl FnOnce() -> T) -> T {
        if let Some(value) = self.find(&point) {
            return value;
        }
        let value = make();
        let key = self.key(&point);
        self.cells.entry(key).or_default().push((point, value));
        value
    }
}
