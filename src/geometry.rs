//! Indexed polyhedron geometry.
//!
//! A [`Geometry`] is a vertex table, a list of oriented faces (cyclic vertex
//! index lists) and a list of explicit edge elements, each with optional
//! index colors. Faces imply an undirected edge set; explicit edge elements
//! exist separately because some constructions emit degenerate `{2/d}`
//! polygons as edges rather than faces.
//!
//! Inputs are never mutated by the construction cores: builders copy what
//! they need and emit fresh geometries.

use glam::{DMat3, DVec3};
use itertools::Itertools;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::spatial_hash::SpatialHash;

/// Default tolerance for coincident-element merging.
pub const MERGE_EPSILON: f64 = 1e-8;

/// An index color attached to a vertex, edge or face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

/// An indexed polyhedron: vertices, oriented faces, explicit edges,
/// optional per-element colors.
#[derive(Clone, Debug, Default)]
pub struct Geometry {
    verts: Vec<DVec3>,
    faces: Vec<Vec<usize>>,
    edges: Vec<[usize; 2]>,
    vert_cols: FxHashMap<usize, Color>,
    face_cols: FxHashMap<usize, Color>,
    edge_cols: FxHashMap<usize, Color>,
}

impl Geometry {
    /// An empty geometry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // Element addition

    /// Append a vertex, returning its index.
    pub fn add_vert(&mut self, pos: DVec3) -> usize {
        self.verts.push(pos);
        self.verts.len() - 1
    }

    /// Append a colored vertex, returning its index.
    pub fn add_vert_colored(&mut self, pos: DVec3, col: Color) -> usize {
        let idx = self.add_vert(pos);
        self.vert_cols.insert(idx, col);
        idx
    }

    /// Append a face, returning its index.
    pub fn add_face(&mut self, face: Vec<usize>) -> usize {
        self.faces.push(face);
        self.faces.len() - 1
    }

    /// Append a colored face, returning its index.
    pub fn add_face_colored(&mut self, face: Vec<usize>, col: Color) -> usize {
        let idx = self.add_face(face);
        self.face_cols.insert(idx, col);
        idx
    }

    /// Append an explicit edge element, returning its index.
    pub fn add_edge(&mut self, edge: [usize; 2]) -> usize {
        self.edges.push(edge);
        self.edges.len() - 1
    }

    /// Append a colored explicit edge element, returning its index.
    pub fn add_edge_colored(&mut self, edge: [usize; 2], col: Color) -> usize {
        let idx = self.add_edge(edge);
        self.edge_cols.insert(idx, col);
        idx
    }

    // Accessors

    /// Vertex coordinates.
    #[must_use]
    pub fn verts(&self) -> &[DVec3] {
        &self.verts
    }

    /// Oriented faces as cyclic vertex index lists.
    #[must_use]
    pub fn faces(&self) -> &[Vec<usize>] {
        &self.faces
    }

    /// Explicit edge elements.
    #[must_use]
    pub fn edges(&self) -> &[[usize; 2]] {
        &self.edges
    }

    /// Mutable face list, for in-place normalization.
    pub(crate) const fn faces_mut(&mut self) -> &mut Vec<Vec<usize>> {
        &mut self.faces
    }

    /// Drop all element colors.
    pub(crate) fn clear_cols(&mut self) {
        self.vert_cols.clear();
        self.face_cols.clear();
        self.edge_cols.clear();
    }

    /// Number of vertices.
    #[must_use]
    pub fn vert_count(&self) -> usize {
        self.verts.len()
    }

    /// Number of faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Number of explicit edge elements.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Color of a vertex, if set.
    #[must_use]
    pub fn vert_color(&self, idx: usize) -> Option<Color> {
        self.vert_cols.get(&idx).copied()
    }

    /// Color of a face, if set.
    #[must_use]
    pub fn face_color(&self, idx: usize) -> Option<Color> {
        self.face_cols.get(&idx).copied()
    }

    /// Color of an explicit edge element, if set.
    #[must_use]
    pub fn edge_color(&self, idx: usize) -> Option<Color> {
        self.edge_cols.get(&idx).copied()
    }

    /// Set the color of a face.
    pub fn set_face_color(&mut self, idx: usize, col: Color) {
        self.face_cols.insert(idx, col);
    }

    /// Set the color of a vertex.
    pub fn set_vert_color(&mut self, idx: usize, col: Color) {
        self.vert_cols.insert(idx, col);
    }

    /// Set the color of an explicit edge element.
    pub fn set_edge_color(&mut self, idx: usize, col: Color) {
        self.edge_cols.insert(idx, col);
    }

    // Derived geometry

    /// Centroid of a face's vertices.
    #[must_use]
    pub fn face_cent(&self, f_idx: usize) -> DVec3 {
        let face = &self.faces[f_idx];
        #[allow(clippy::cast_precision_loss)]
        let inv = 1.0 / face.len() as f64;
        face.iter().map(|&v| self.verts[v]).sum::<DVec3>() * inv
    }

    /// Unit normal of a face (Newell's method, robust for non-planar faces).
    #[must_use]
    pub fn face_norm(&self, f_idx: usize) -> DVec3 {
        let mut norm = DVec3::ZERO;
        for (&a, &b) in self.faces[f_idx].iter().circular_tuple_windows() {
            let (va, vb) = (self.verts[a], self.verts[b]);
            norm += DVec3::new(
                (va.y - vb.y) * (va.z + vb.z),
                (va.z - vb.z) * (va.x + vb.x),
                (va.x - vb.x) * (va.y + vb.y),
            );
        }
        norm.normalize_or_zero()
    }

    /// Midpoint of an undirected edge given as a vertex pair.
    #[must_use]
    pub fn edge_cent(&self, edge: [usize; 2]) -> DVec3 {
        (self.verts[edge[0]] + self.verts[edge[1]]) * 0.5
    }

    /// Undirected edges implied by the face set, each as a sorted pair, in
    /// sorted order.
    #[must_use]
    pub fn impl_edges(&self) -> Vec<[usize; 2]> {
        self.faces
            .iter()
            .flat_map(|face| {
                face.iter()
                    .circular_tuple_windows()
                    .map(|(&a, &b)| if a < b { [a, b] } else { [b, a] })
            })
            .sorted()
            .dedup()
            .collect()
    }

    /// Vertices referenced by no face and no explicit edge element.
    #[must_use]
    pub fn free_verts(&self) -> Vec<usize> {
        let mut used = vec![false; self.verts.len()];
        for face in &self.faces {
            for &v in face {
                used[v] = true;
            }
        }
        for edge in &self.edges {
            used[edge[0]] = true;
            used[edge[1]] = true;
        }
        used.iter()
            .enumerate()
            .filter_map(|(i, &u)| (!u).then_some(i))
            .collect()
    }

    /// Delete the given vertices, remapping faces and edges. Faces left with
    /// fewer than two vertices and edges left degenerate are dropped.
    pub fn delete_verts(&mut self, v_nos: &[usize]) {
        if v_nos.is_empty() {
            return;
        }
        let mut dels = v_nos.to_vec();
        dels.sort_unstable();
        dels.dedup();

        let mut v_map = vec![usize::MAX; self.verts.len()];
        let mut del_cursor = 0;
        let mut kept = 0;
        for i in 0..self.verts.len() {
            if del_cursor < dels.len() && i == dels[del_cursor] {
                del_cursor += 1;
            } else {
                self.verts[kept] = self.verts[i];
                v_map[i] = kept;
                kept += 1;
            }
        }
        self.verts.truncate(kept);

        self.vert_cols = remap_cols(&self.vert_cols, |i| {
            (v_map[i] != usize::MAX).then_some(v_map[i])
        });

        let mut del_faces = Vec::new();
        for (f_idx, face) in self.faces.iter_mut().enumerate() {
            face.retain(|&v| v_map[v] != usize::MAX);
            for v in face.iter_mut() {
                *v = v_map[*v];
            }
            if face.len() < 2 {
                del_faces.push(f_idx);
            }
        }
        self.remove_faces(&del_faces);

        let mut del_edges = Vec::new();
        for (e_idx, edge) in self.edges.iter_mut().enumerate() {
            if v_map[edge[0]] == usize::MAX || v_map[edge[1]] == usize::MAX {
                del_edges.push(e_idx);
            } else {
                *edge = [v_map[edge[0]], v_map[edge[1]]];
            }
        }
        self.remove_edges(&del_edges);
    }

    /// Append all elements of another geometry, offsetting indices.
    pub fn append(&mut self, other: &Self) {
        let v_off = self.verts.len();
        let f_off = self.faces.len();
        let e_off = self.edges.len();
        self.verts.extend_from_slice(&other.verts);
        self.faces
            .extend(other.faces.iter().map(|f| f.iter().map(|&v| v + v_off).collect()));
        self.edges
            .extend(other.edges.iter().map(|e| [e[0] + v_off, e[1] + v_off]));
        for (&i, &c) in &other.vert_cols {
            self.vert_cols.insert(i + v_off, c);
        }
        for (&i, &c) in &other.face_cols {
            self.face_cols.insert(i + f_off, c);
        }
        for (&i, &c) in &other.edge_cols {
            self.edge_cols.insert(i + e_off, c);
        }
    }

    /// Apply a linear transformation to every vertex.
    pub fn transform(&mut self, mat: DMat3) {
        for v in &mut self.verts {
            *v = mat * *v;
        }
    }

    /// Merge coincident elements of the kinds named in `kinds` (any subset
    /// of the letters `v`, `e`, `f`), with vertex coincidence measured by
    /// `eps`. Merging vertices remaps faces and edges onto surviving
    /// representatives; merging faces or edges drops later duplicates (same
    /// vertex set). The first element of a coincident run keeps its color.
    pub fn merge_coincident_elements(&mut self, kinds: &str, eps: f64) {
        if kinds.contains('v') {
            self.merge_verts(eps);
        }
        if kinds.contains('e') {
            let keys: Vec<Vec<usize>> = self
                .edges
                .iter()
                .map(|e| {
                    let mut k = e.to_vec();
                    k.sort_unstable();
                    k
                })
                .collect();
            let dels = duplicate_positions(&keys);
            self.remove_edges(&dels);
        }
        if kinds.contains('f') {
            let keys: Vec<Vec<usize>> = self
                .faces
                .iter()
                .map(|f| {
                    let mut k = f.clone();
                    k.sort_unstable();
                    k
                })
                .collect();
            let dels = duplicate_positions(&keys);
            self.remove_faces(&dels);
        }
    }

    fn merge_verts(&mut self, eps: f64) {
        let mut hash = SpatialHash::new(eps);
        let mut v_map = vec![0usize; self.verts.len()];
        let mut new_verts = Vec::with_capacity(self.verts.len());
        let mut new_cols = FxHashMap::default();
        for (i, &pos) in self.verts.iter().enumerate() {
            if let Some(rep) = hash.find_or_insert(pos, new_verts.len()) {
                v_map[i] = rep;
            } else {
                v_map[i] = new_verts.len();
                new_verts.push(pos);
            }
            if let Some(&c) = self.vert_cols.get(&i) {
                new_cols.entry(v_map[i]).or_insert(c);
            }
        }
        self.verts = new_verts;
        self.vert_cols = new_cols;

        let mut del_faces = Vec::new();
        for (f_idx, face) in self.faces.iter_mut().enumerate() {
            for v in face.iter_mut() {
                *v = v_map[*v];
            }
            collapse_repeats(face);
            if face.len() < 2 {
                del_faces.push(f_idx);
            }
        }
        self.remove_faces(&del_faces);

        let mut del_edges = Vec::new();
        for (e_idx, edge) in self.edges.iter_mut().enumerate() {
            *edge = [v_map[edge[0]], v_map[edge[1]]];
            if edge[0] == edge[1] {
                del_edges.push(e_idx);
            }
        }
        self.remove_edges(&del_edges);
    }

    /// Remove faces by sorted position list, compacting colors.
    fn remove_faces(&mut self, dels: &[usize]) {
        if dels.is_empty() {
            return;
        }
        let map = removal_map(self.faces.len(), dels);
        let mut kept = Vec::with_capacity(self.faces.len() - dels.len());
        for (i, face) in self.faces.drain(..).enumerate() {
            if map[i] != usize::MAX {
                kept.push(face);
            }
        }
        self.faces = kept;
        self.face_cols = remap_cols(&self.face_cols, |i| {
            (map[i] != usize::MAX).then_some(map[i])
        });
    }

    /// Remove explicit edges by sorted position list, compacting colors.
    fn remove_edges(&mut self, dels: &[usize]) {
        if dels.is_empty() {
            return;
        }
        let map = removal_map(self.edges.len(), dels);
        let mut kept = Vec::with_capacity(self.edges.len() - dels.len());
        for (i, edge) in self.edges.drain(..).enumerate() {
            if map[i] != usize::MAX {
                kept.push(edge);
            }
        }
        self.edges = kept;
        self.edge_cols = remap_cols(&self.edge_cols, |i| {
            (map[i] != usize::MAX).then_some(map[i])
        });
    }
}

/// Old-index → new-index table for a sorted deletion list (`usize::MAX`
/// marks deleted slots).
fn removal_map(len: usize, dels: &[usize]) -> Vec<usize> {
    let mut map = vec![usize::MAX; len];
    let mut del_cursor = 0;
    let mut kept = 0;
    for (i, entry) in map.iter_mut().enumerate() {
        if del_cursor < dels.len() && i == dels[del_cursor] {
            del_cursor += 1;
        } else {
            *entry = kept;
            kept += 1;
        }
    }
    map
}

fn remap_cols(
    cols: &FxHashMap<usize, Color>,
    map: impl Fn(usize) -> Option<usize>,
) -> FxHashMap<usize, Color> {
    cols.iter()
        .filter_map(|(&i, &c)| map(i).map(|j| (j, c)))
        .collect()
}

/// Positions of every element whose key already appeared earlier.
fn duplicate_positions(keys: &[Vec<usize>]) -> Vec<usize> {
    let mut seen: FxHashSet<&[usize]> = FxHashSet::default();
    let mut dels = Vec::new();
    for (i, key) in keys.iter().enumerate() {
        if !seen.insert(key.as_slice()) {
            dels.push(i);
        }
    }
    dels
}

/// Collapse cyclically adjacent repeated indices in a face.
fn collapse_repeats(face: &mut Vec<usize>) {
    face.dedup();
    while face.len() > 1 && face.first() == face.last() {
        face.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube() -> Geometry {
        let mut g = Geometry::new();
        for z in [-0.5, 0.5] {
            for y in [-0.5, 0.5] {
                for x in [-0.5, 0.5] {
                    g.add_vert(DVec3::new(x, y, z));
                }
            }
        }
        g.add_face(vec![0, 2, 3, 1]); // -Z
        g.add_face(vec![4, 5, 7, 6]); // +Z
        g.add_face(vec![0, 1, 5, 4]); // -Y
        g.add_face(vec![2, 6, 7, 3]); // +Y
        g.add_face(vec![0, 4, 6, 2]); // -X
        g.add_face(vec![1, 3, 7, 5]); // +X
        g
    }

    #[test]
    fn test_cube_implicit_edges() {
        let g = cube();
        let edges = g.impl_edges();
        assert_eq!(edges.len(), 12);
        // Sorted pairs in sorted order, no duplicates
        for w in edges.windows(2) {
            assert!(w[0] < w[1]);
        }
    }

    #[test]
    fn test_face_centroid_and_normal() {
        let g = cube();
        let cent = g.face_cent(1); // +Z face
        assert!((cent - DVec3::new(0.0, 0.0, 0.5)).length() < 1e-12);
        let norm = g.face_norm(1);
        assert!((norm - DVec3::Z).length() < 1e-12);
    }

    #[test]
    fn test_free_vert_deletion() {
        let mut g = cube();
        let stray = g.add_vert(DVec3::new(9.0, 9.0, 9.0));
        assert_eq!(g.free_verts(), vec![stray]);
        g.delete_verts(&[stray]);
        assert_eq!(g.vert_count(), 8);
        assert_eq!(g.face_count(), 6);
        assert!(g.free_verts().is_empty());
    }

    #[test]
    fn test_delete_verts_remaps_faces() {
        let mut g = cube();
        g.delete_verts(&[0]);
        assert_eq!(g.vert_count(), 7);
        // Three faces lost a corner, three are untouched
        let mut sizes: Vec<usize> = g.faces().iter().map(Vec::len).collect();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![3, 3, 3, 4, 4, 4]);
    }

    #[test]
    fn test_merge_coincident_verts_and_faces() {
        let mut g = cube();
        let other = cube();
        g.append(&other);
        assert_eq!(g.vert_count(), 16);
        assert_eq!(g.face_count(), 12);
        g.merge_coincident_elements("vf", MERGE_EPSILON);
        assert_eq!(g.vert_count(), 8);
        assert_eq!(g.face_count(), 6);
    }

    #[test]
    fn test_merge_keeps_first_color() {
        let mut g = Geometry::new();
        g.add_vert_colored(DVec3::ZERO, Color(5));
        g.add_vert(DVec3::ZERO);
        g.add_vert_colored(DVec3::X, Color(9));
        g.merge_coincident_elements("v", MERGE_EPSILON);
        assert_eq!(g.vert_count(), 2);
        assert_eq!(g.vert_color(0), Some(Color(5)));
        assert_eq!(g.vert_color(1), Some(Color(9)));
    }

    #[test]
    fn test_transform_and_append_offsets() {
        let mut g = cube();
        let mut shifted = cube();
        shifted.transform(DMat3::from_diagonal(DVec3::splat(2.0)));
        g.append(&shifted);
        assert_eq!(g.vert_count(), 16);
        assert_eq!(g.face_count(), 12);
        // Appended faces reference the second vertex block
        assert!(g.faces()[6].iter().all(|&v| v >= 8));
    }
}
