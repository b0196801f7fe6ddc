//! Grid-based spatial hash for O(1) expected-time coincident-vertex lookup.
//!
//! Divides 3D space into a grid of cells. To find the vertex a point
//! coincides with:
//! 1. Compute which cell the point falls into
//! 2. Check that cell + 26 neighbors (3x3x3 cube)
//! 3. Compare distances only to vertices in those cells
//!
//! This avoids O(n) comparisons against all existing vertices. Unlike a
//! plain duplicate test, each stored point carries the index of the vertex
//! it represents, so merging can remap onto the surviving representative.

use glam::DVec3;
use hashbrown::HashMap;

/// Spatial hash mapping points to the index of their representative vertex.
pub(crate) struct SpatialHash {
    cells: HashMap<(i64, i64, i64), Vec<(DVec3, usize)>>,
    cell_size: f64,
    tolerance: f64,
}

impl SpatialHash {
    /// Create a new spatial hash with the given tolerance.
    ///
    /// Points within `tolerance` distance of each other are coincident.
    pub(crate) fn new(tolerance: f64) -> Self {
        // Cell size = 2x tolerance ensures coincident points are in adjacent cells
        Self {
            cells: HashMap::new(),
            cell_size: tolerance * 2.0,
            tolerance,
        }
    }

    /// Map a point to its grid cell indices.
    #[inline]
    fn cell_coords(&self, p: DVec3) -> (i64, i64, i64) {
        #[allow(clippy::cast_possible_truncation)]
        let discretize = |v: f64| (v / self.cell_size).floor() as i64;
        (discretize(p.x), discretize(p.y), discretize(p.z))
    }

    /// Index of the stored vertex within tolerance of `point`, if any.
    pub(crate) fn find(&self, point: DVec3) -> Option<usize> {
        let (cx, cy, cz) = self.cell_coords(point);

        // Check 3x3x3 neighborhood
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    if let Some(pts) = self.cells.get(&(cx + dx, cy + dy, cz + dz))
                        && let Some(&(_, id)) = pts
                            .iter()
                            .find(|&&(p, _)| (p - point).length() < self.tolerance)
                    {
                        return Some(id);
                    }
                }
            }
        }

        None
    }

    /// Insert a point as representative `id` (does not check coincidence).
    pub(crate) fn insert(&mut self, point: DVec3, id: usize) {
        self.cells
            .entry(self.cell_coords(point))
            .or_default()
            .push((point, id));
    }

    /// Representative of `point` if one exists, otherwise store `point`
    /// under `id` and return `None`.
    pub(crate) fn find_or_insert(&mut self, point: DVec3, id: usize) -> Option<usize> {
        let found = self.find(point);
        if found.is_none() {
            self.insert(point, id);
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spatial_hash_basic() {
        let mut hash = SpatialHash::new(1e-6);

        let p1 = DVec3::new(1.0, 2.0, 3.0);
        let p2 = DVec3::new(1.0 + 1e-7, 2.0, 3.0); // Within tolerance
        let p3 = DVec3::new(2.0, 2.0, 3.0); // Outside tolerance

        assert_eq!(hash.find_or_insert(p1, 0), None);
        assert_eq!(hash.find_or_insert(p2, 1), Some(0)); // Coincident with p1
        assert_eq!(hash.find_or_insert(p3, 2), None);
    }

    #[test]
    fn test_spatial_hash_cell_boundary() {
        let mut hash = SpatialHash::new(0.1);

        // Points on opposite sides of a cell boundary but within tolerance
        let p1 = DVec3::new(0.199, 0.0, 0.0);
        let p2 = DVec3::new(0.201, 0.0, 0.0);

        assert_eq!(hash.find_or_insert(p1, 7), None);
        assert_eq!(hash.find(p2), Some(7)); // Still detected across the boundary
    }
}
