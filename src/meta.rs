//! The meta triangulation: an oriented barycentric subdivision.
//!
//! Every triangle carries a V corner (a base vertex), an E corner (a base
//! edge center) and an F corner (a base face center), stored in that order.
//! Triangles come in parity pairs encoded by face index (positive parity at
//! odd indices), and neighbors across any meta edge always have opposite
//! parity. A geometry may also be adopted directly as a meta
//! tiling, in which case it is normalized first (2-coloring of faces,
//! corner-role propagation, V-first rotation, parity reordering).

use std::collections::VecDeque;

use glam::DVec3;
use rustc_hash::FxHashMap;

use crate::geometry::Geometry;
use crate::tile::Corner;
use crate::tiling::TilingError;

/// An oriented, parity-alternating barycentric triangulation with its
/// triangle adjacency table.
#[derive(Clone, Debug)]
pub struct MetaTiling {
    geom: Geometry,
    nbrs: Vec<[Option<usize>; 3]>,
}

impl MetaTiling {
    /// Build the barycentric subdivision of a base polyhedron. Face-center
    /// vertices are lifted by `face_ht` along the face normal when nonzero.
    #[must_use]
    pub fn from_base(base: &Geometry, face_ht: f64) -> Self {
        let mut meta = Geometry::new();
        for &v in base.verts() {
            meta.add_vert(v);
        }
        let f_start = meta.vert_count();
        for f in 0..base.face_count() {
            let mut face_pt = base.face_cent(f);
            if face_ht != 0.0 {
                face_pt += base.face_norm(f) * face_ht;
            }
            meta.add_vert(face_pt);
        }

        let mut e2v: FxHashMap<[usize; 2], usize> = FxHashMap::default();
        for e in base.impl_edges() {
            e2v.insert(e, meta.add_vert(base.edge_cent(e)));
        }
        for (f_idx, face) in base.faces().iter().enumerate() {
            let f_cent_idx = f_start + f_idx;
            for v in 0..face.len() {
                let v0 = face[v];
                let v1 = face[(v + 1) % face.len()];
                let e_cent_idx = e2v[&if v0 < v1 { [v0, v1] } else { [v1, v0] }];
                meta.add_face(vec![v0, e_cent_idx, f_cent_idx]);
                meta.add_face(vec![v1, e_cent_idx, f_cent_idx]);
            }
        }

        let nbrs = find_nbrs(&meta);
        Self { geom: meta, nbrs }
    }

    /// Adopt an existing triangulation as the meta, normalizing it.
    ///
    /// # Errors
    /// `OddFaceCount`, `NotTriangle` for malformed input; `OpenEdge` when an
    /// edge has more than its two required faces; `NotTwoColorable` /
    /// `NotThreeColorable` when parity or corner roles cannot be assigned
    /// consistently.
    pub fn from_meta(mut geom: Geometry) -> Result<Self, TilingError> {
        normalize(&mut geom)?;
        let nbrs = find_nbrs(&geom);
        // Neighbouring faces must have index numbers of opposite parity
        for (i, row) in nbrs.iter().enumerate() {
            for nbr in row.iter().flatten() {
                if i % 2 == nbr % 2 {
                    return Err(TilingError::NotTwoColorable);
                }
            }
        }
        Ok(Self { geom, nbrs })
    }

    /// The triangulation itself.
    #[must_use]
    pub fn geom(&self) -> &Geometry {
        &self.geom
    }

    /// Number of meta triangles.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.geom.face_count()
    }

    /// Vertex index at a triangle corner.
    #[must_use]
    pub fn corner(&self, f_idx: usize, corner: Corner) -> usize {
        self.geom.faces()[f_idx][corner.index()]
    }

    /// Position of a triangle corner.
    #[must_use]
    pub fn corner_pos(&self, f_idx: usize, corner: Corner) -> DVec3 {
        self.geom.verts()[self.corner(f_idx, corner)]
    }

    /// Neighbor across the meta edge opposite the given corner, or `None`
    /// at an open boundary.
    #[must_use]
    pub fn neighbor(&self, f_idx: usize, corner: Corner) -> Option<usize> {
        self.nbrs[f_idx][corner.index()]
    }
}

/// Faces sharing each undirected edge.
fn edge_face_pairs(geom: &Geometry) -> FxHashMap<(usize, usize), Vec<usize>> {
    let mut pairs: FxHashMap<(usize, usize), Vec<usize>> = FxHashMap::default();
    for (f_idx, face) in geom.faces().iter().enumerate() {
        for i in 0..face.len() {
            let a = face[i];
            let b = face[(i + 1) % face.len()];
            let key = if a < b { (a, b) } else { (b, a) };
            pairs.entry(key).or_default().push(f_idx);
        }
    }
    pairs
}

/// Neighbor table: for each face, the face across the edge opposite each
/// corner. Edges without exactly two incident faces give no connection.
fn find_nbrs(geom: &Geometry) -> Vec<[Option<usize>; 3]> {
    let ef_pairs = edge_face_pairs(geom);
    let mut nbrs = vec![[None; 3]; geom.face_count()];
    for (f, face) in geom.faces().iter().enumerate() {
        for i in 0..3 {
            let a = face[(i + 1) % 3];
            let b = face[(i + 2) % 3];
            let key = if a < b { (a, b) } else { (b, a) };
            let shared = &ef_pairs[&key];
            nbrs[f][i] = if shared.len() == 2 {
                Some(if shared[0] == f { shared[1] } else { shared[0] })
            } else {
                None
            };
        }
    }
    nbrs
}

/// Normalize a claimed meta triangulation in place: 2-color faces by BFS,
/// propagate corner roles, rotate each face V-first and reorder so face
/// parities alternate with index.
#[allow(clippy::cast_possible_truncation)]
fn normalize(geom: &mut Geometry) -> Result<(), TilingError> {
    geom.clear_cols();
    let nf = geom.face_count();
    if nf == 0 || nf % 2 == 1 {
        return Err(TilingError::OddFaceCount);
    }
    for (i, face) in geom.faces().iter().enumerate() {
        if face.len() != 3 {
            return Err(TilingError::NotTriangle { face: i });
        }
    }
    let ef_pairs = edge_face_pairs(geom);
    if ef_pairs.values().any(|faces| faces.len() > 2) {
        return Err(TilingError::OpenEdge);
    }

    let mut parity: Vec<Option<u8>> = vec![None; nf];
    let mut role: Vec<Option<u8>> = vec![None; geom.vert_count()];
    let mut queue = VecDeque::new();

    for seed in 0..nf {
        if parity[seed].is_some() {
            continue;
        }
        // the seed keeps its orientation and reads roles off in cycle order
        parity[seed] = Some(0);
        for (k, &v) in geom.faces()[seed].iter().enumerate() {
            match role[v] {
                None => role[v] = Some(k as u8),
                Some(r) if r == k as u8 => {}
                Some(_) => return Err(TilingError::NotThreeColorable),
            }
        }
        queue.push_back(seed);

        while let Some(f) = queue.pop_front() {
            let face = geom.faces()[f].clone();
            let f_parity = parity[f].unwrap_or(0);
            for i in 0..3 {
                let a = face[i];
                let b = face[(i + 1) % 3];
                let third = face[(i + 2) % 3];
                let key = if a < b { (a, b) } else { (b, a) };
                let Some(&g) = ef_pairs[&key].iter().find(|&&g| g != f) else {
                    continue; // open boundary
                };
                if let Some(g_parity) = parity[g] {
                    if g_parity == f_parity {
                        return Err(TilingError::NotTwoColorable);
                    }
                    continue;
                }
                parity[g] = Some(1 - f_parity);

                // orient g to traverse the shared edge the same way as f
                let g_face = &mut geom.faces_mut()[g];
                let aligned = (0..3).any(|j| g_face[j] == a && g_face[(j + 1) % 3] == b);
                if !aligned {
                    g_face.reverse();
                }
                // the corners opposite the shared edge carry the same role
                let other = *g_face
                    .iter()
                    .find(|&&v| v != a && v != b)
                    .ok_or(TilingError::NotThreeColorable)?;
                let want = role[third].ok_or(TilingError::NotThreeColorable)?;
                match role[other] {
                    None => role[other] = Some(want),
                    Some(r) if r == want => {}
                    Some(_) => return Err(TilingError::NotThreeColorable),
                }
                queue.push_back(g);
            }
        }
    }

    // Every face needs one corner of each role; rotate the V corner first.
    for f in 0..nf {
        let face = &mut geom.faces_mut()[f];
        let mut have = [false; 3];
        for &v in face.iter() {
            let r = role[v].ok_or(TilingError::NotThreeColorable)?;
            have[r as usize] = true;
        }
        if have != [true; 3] {
            return Err(TilingError::NotThreeColorable);
        }
        if let Some(v_pos) = face.iter().position(|&v| role[v] == Some(0)) {
            face.rotate_left(v_pos);
        }
    }

    // Reorder faces to alternate parity 0,1,0,1,...
    let mut bad = [Vec::new(), Vec::new()];
    for i in 0..nf {
        let p = usize::from(parity[i].unwrap_or(0));
        if p != i % 2 {
            bad[i % 2].push(i);
        }
    }
    let (bad0, bad1) = (bad[0].clone(), bad[1].clone());
    for (&x, &y) in bad0.iter().zip(&bad1) {
        geom.faces_mut().swap(x, y);
    }

    Ok(())
}
