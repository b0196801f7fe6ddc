//! Pattern-driven tiling of a base polyhedron.
//!
//! A [`Tiling`] holds a meta triangulation of a base polyhedron plus a
//! parsed pattern (points and paths). Building walks the triangle adjacency
//! graph from seed triangles of the requested parity, emitting one face per
//! closed circuit; circuits that cross an open boundary are abandoned,
//! which is the defined behavior for tilings of open meshes.

use std::collections::BTreeMap;
use std::fmt;

use rustc_hash::FxHashMap;

use crate::conway::conway_pattern;
use crate::geometry::{Color, Geometry, MERGE_EPSILON};
use crate::meta::MetaTiling;
use crate::tile::{
    Corner, Inclusion, PatternPoint, SeedFaces, Tile, TileOp, TileReport, coord_string, read_point,
};

/// Errors from the tiling subsystem: pattern parsing, meta normalization
/// and circuit emission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TilingError {
    /// A character outside the pattern alphabet.
    BadChar { pos: usize, ch: char },
    /// Pattern is not of the form `[Point0,Point1,...]Path0,Path1,...`.
    PatternForm,
    /// A path's first character (after any flag) and last character are
    /// both non-digits.
    UnframedPath,
    /// A point whose coordinates are all zero.
    ZeroPoint,
    /// A coordinate letter given more than once in a point.
    DuplicateAxis { axis: char },
    /// A malformed coordinate coefficient.
    BadCoefficient,
    /// Error inside point `index` of a pattern.
    Point { index: usize, error: Box<TilingError> },
    /// Error inside path `index` of a pattern.
    Path { index: usize, error: Box<TilingError> },
    /// A claimed meta face that is not a triangle.
    NotTriangle { face: usize },
    /// A claimed meta with no faces or an odd number of them.
    OddFaceCount,
    /// A meta edge with more than the two incident faces required.
    OpenEdge,
    /// Meta faces cannot be 2-colored.
    NotTwoColorable,
    /// Meta corners cannot carry consistent V/E/F roles.
    NotThreeColorable,
    /// A path references pattern points that do not exist.
    IndexOutOfRange { path: usize, indices: Vec<usize> },
    /// Not a named Conway operator or a parametric form.
    UnknownOperator { name: String },
    /// A parametric Conway operator with an invalid number.
    BadOperatorParameter { name: String },
    /// Relabel string is not a permutation of `VEF`.
    BadRelabel,
}

impl fmt::Display for TilingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadChar { pos, ch } => {
                write!(f, "invalid character '{ch}' in position {}", pos + 1)
            }
            Self::PatternForm => {
                write!(f, "pattern not in form [Point0,Point1,...]Path0,Path1...")
            }
            Self::UnframedPath => write!(
                f,
                "path: first character (or first character after +-*), or last \
                 character must be a digit"
            ),
            Self::ZeroPoint => write!(f, "point coordinates cannot all be zero"),
            Self::DuplicateAxis { axis } => {
                write!(f, "point coordinate {axis} given more than once")
            }
            Self::BadCoefficient => write!(f, "invalid coordinate coefficient"),
            Self::Point { index, error } => write!(f, "Point{index}: {error}"),
            Self::Path { index, error } => write!(f, "Path{index}: {error}"),
            Self::NotTriangle { face } => write!(f, "face {face} is not a triangle"),
            Self::OddFaceCount => {
                write!(f, "geometry does not have an even number of faces")
            }
            Self::OpenEdge => write!(f, "edge has more than two incident faces"),
            Self::NotTwoColorable => write!(f, "faces cannot be 2-coloured"),
            Self::NotThreeColorable => write!(f, "vertices cannot be 3-coloured"),
            Self::IndexOutOfRange { path, indices } => {
                write!(f, "Path{path}: index numbers out of range:")?;
                for (i, idx) in indices.iter().enumerate() {
                    write!(f, "{}{idx}", if i > 0 { ", " } else { " " })?;
                }
                Ok(())
            }
            Self::UnknownOperator { name } => {
                write!(f, "Conway operator '{name}' not known")
            }
            Self::BadOperatorParameter { name } => {
                write!(f, "Conway operator '{name}': invalid number")
            }
            Self::BadRelabel => write!(
                f,
                "relabel string does not contain exactly three letters V, E and F"
            ),
        }
    }
}

impl std::error::Error for TilingError {}

/// How emitted elements are colored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ColoringType {
    /// No colors.
    #[default]
    None,
    /// Faces by source-path index, vertices by point inclusion.
    PathIndex,
    /// Elements inherit the color of the base element their path
    /// associates to.
    AssociatedElement,
}

type IndexOrder = [BTreeMap<(usize, usize), (usize, usize)>; 7];

/// A tiling under construction: base meta plus pattern points and paths.
#[derive(Clone, Debug, Default)]
pub struct Tiling {
    meta: Option<MetaTiling>,
    points: Vec<PatternPoint>,
    pat_paths: Vec<Tile>,
    orig_colors: FxHashMap<usize, Color>,
    /// Emit only the first circuit of each path (pattern inspection).
    pub one_of_each_tile: bool,
}

impl Tiling {
    /// An empty tiling: no base, no pattern.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base polyhedron. With `is_meta` the geometry is adopted as
    /// an existing meta triangulation (and normalized); otherwise its
    /// barycentric subdivision is built, with face centers lifted by
    /// `face_ht`.
    ///
    /// # Errors
    /// Meta normalization errors for `is_meta` inputs.
    pub fn set_geom(
        &mut self,
        geom: &Geometry,
        is_meta: bool,
        face_ht: f64,
    ) -> Result<(), TilingError> {
        self.orig_colors = original_colors(geom, is_meta);
        self.meta = Some(if is_meta {
            MetaTiling::from_meta(geom.clone())?
        } else {
            MetaTiling::from_base(geom, face_ht)
        });
        Ok(())
    }

    /// The meta triangulation, once a base is set.
    #[must_use]
    pub fn meta(&self) -> Option<&MetaTiling> {
        self.meta.as_ref()
    }

    /// The pattern points.
    #[must_use]
    pub fn points(&self) -> &[PatternPoint] {
        &self.points
    }

    /// The pattern paths.
    #[must_use]
    pub fn paths(&self) -> &[Tile] {
        &self.pat_paths
    }

    /// Append one path to the pattern.
    ///
    /// # Errors
    /// Path parse errors.
    pub fn add_tile(&mut self, pat: &str) -> Result<(), TilingError> {
        self.pat_paths.push(Tile::read(pat)?);
        Ok(())
    }

    /// Replace the pattern with a parsed `[points]paths` string. Empty
    /// comma fields are skipped.
    ///
    /// # Errors
    /// `PatternForm` for a missing bracket frame, and point/path parse
    /// errors tagged with their index.
    pub fn read_pattern(&mut self, pat: &str) -> Result<(), TilingError> {
        let rest = pat.strip_prefix('[').ok_or(TilingError::PatternForm)?;
        let close = rest.rfind(']').ok_or(TilingError::PatternForm)?;
        let points_str = &rest[..close];
        let paths_str = &rest[close + 1..];

        let mut points = Vec::new();
        for (i, part) in points_str.split(',').filter(|p| !p.is_empty()).enumerate() {
            points.push(read_point(part).map_err(|error| TilingError::Point {
                index: i,
                error: Box::new(error),
            })?);
        }
        let mut paths = Vec::new();
        for (i, part) in paths_str.split(',').filter(|p| !p.is_empty()).enumerate() {
            paths.push(Tile::read(part).map_err(|error| TilingError::Path {
                index: i,
                error: Box::new(error),
            })?);
        }
        self.points = points;
        self.pat_paths = paths;
        Ok(())
    }

    /// Replace the pattern with a Conway operator's pattern, named
    /// (`d`, `a`, `k`, ...) or parametric (`m3`, `g2`, ...).
    ///
    /// # Errors
    /// `UnknownOperator` / `BadOperatorParameter`.
    pub fn read_conway(&mut self, op: &str) -> Result<(), TilingError> {
        let pat = conway_pattern(op)?;
        self.read_pattern(&pat)
    }

    /// Permute the V/E/F roles of every point and path by a relabel string
    /// such as `"EFV"` or `"VFE"`.
    ///
    /// # Errors
    /// `BadRelabel` when the string is not a permutation of `VEF`.
    pub fn relabel_pattern(&mut self, relabel: &str) -> Result<(), TilingError> {
        let chars: Vec<char> = relabel.chars().collect();
        if chars.len() != 3 || !['V', 'E', 'F'].iter().all(|c| chars.contains(c)) {
            return Err(TilingError::BadRelabel);
        }
        let mut relab = [Corner::V; 3];
        for (i, &ch) in chars.iter().enumerate() {
            relab[i] = match ch {
                'V' => Corner::V,
                'E' => Corner::E,
                _ => Corner::F,
            };
        }

        for pt in &mut self.points {
            let old = pt.coords;
            let mut coords = pt.coords;
            for i in 0..3 {
                coords[relab[i].index()] = old[i];
            }
            *pt = PatternPoint::new(coords).ok_or(TilingError::BadRelabel)?;
        }
        for path in &mut self.pat_paths {
            path.relabel(relab);
        }
        Ok(())
    }

    /// Flip `+`/`-` seed flags on every path (reverses tiling orientation).
    pub fn reverse_pattern(&mut self) {
        for path in &mut self.pat_paths {
            path.flip_start_faces();
        }
    }

    /// Seed every path from both triangle parities.
    pub fn start_everywhere(&mut self) {
        for path in &mut self.pat_paths {
            path.set_start_faces(SeedFaces::Both);
        }
    }

    /// Canonical string form of the current pattern.
    #[must_use]
    pub fn pattern_string(&self) -> String {
        let points = self
            .points
            .iter()
            .map(|p| coord_string(p.coords))
            .collect::<Vec<_>>()
            .join(",");
        let paths = self
            .pat_paths
            .iter()
            .map(Tile::tile_string)
            .collect::<Vec<_>>()
            .join(",");
        format!("[{points}]{paths}")
    }

    /// Build the tiling: place one output vertex per pattern point and
    /// element equivalence class, then emit one face (or edge, for
    /// two-vertex circuits) per closed circuit. Vertices referenced by
    /// nothing are deleted. Returns the geometry and one report per path.
    ///
    /// # Errors
    /// `IndexOutOfRange` when a path references a missing point.
    pub fn make_tiling(
        &self,
        col_type: ColoringType,
    ) -> Result<(Geometry, Vec<TileReport>), TilingError> {
        let mut geom = Geometry::new();
        let Some(meta) = &self.meta else {
            return Ok((
                geom,
                self.pat_paths.iter().map(Tile::element_association).collect(),
            ));
        };

        // Each element inclusion position V..VEF maps its equivalence
        // classes to an order (the vertex offset within the point's block)
        // and an example triangle (to place the vertex).
        let mut index_order = IndexOrder::default();
        for i in 0..meta.face_count() {
            let v = meta.corner(i, Corner::V);
            let e = meta.corner(i, Corner::E);
            let f = meta.corner(i, Corner::F);
            index_order[Inclusion::VEF.index()].insert((i, i), (0, i));
            index_order[Inclusion::V.index()].insert((v, v), (0, i));
            index_order[Inclusion::E.index()].insert((e, e), (0, i));
            index_order[Inclusion::F.index()].insert((f, f), (0, i));
            store_tri(&mut index_order[Inclusion::VE.index()], sorted_pair(v, e), i);
            index_order[Inclusion::EF.index()].insert(sorted_pair(e, f), (0, i));
            index_order[Inclusion::FV.index()].insert(sorted_pair(f, v), (0, i));
        }
        for map in &mut index_order {
            for (pos, entry) in map.values_mut().enumerate() {
                entry.0 = pos;
            }
        }

        // Starting offset of the vertices for each pattern point
        let mut point_vertex_offsets = Vec::with_capacity(self.points.len());
        for pt in &self.points {
            point_vertex_offsets.push(geom.vert_count());
            let crds = pt.coords / (pt.coords.x + pt.coords.y + pt.coords.z);
            for &(_, f_idx) in index_order[pt.inclusion.index()].values() {
                let pos = crds.x * meta.corner_pos(f_idx, Corner::V)
                    + crds.y * meta.corner_pos(f_idx, Corner::E)
                    + crds.z * meta.corner_pos(f_idx, Corner::F);
                let col = match col_type {
                    ColoringType::None => None,
                    #[allow(clippy::cast_possible_truncation)]
                    ColoringType::PathIndex => Some(Color(pt.inclusion.index() as u32)),
                    ColoringType::AssociatedElement => {
                        self.associated_point_color(meta, f_idx, pt.inclusion)
                    }
                };
                match col {
                    Some(c) => geom.add_vert_colored(pos, c),
                    None => geom.add_vert(pos),
                };
            }
        }

        let mut reports = Vec::with_capacity(self.pat_paths.len());
        for (p_idx, pat) in self.pat_paths.iter().enumerate() {
            let out_of_range = pat.check_index_range(self.points.len());
            if !out_of_range.is_empty() {
                return Err(TilingError::IndexOutOfRange {
                    path: p_idx,
                    indices: out_of_range,
                });
            }

            let mut report = pat.element_association();
            let elems_before = geom.face_count() + geom.edge_count();
            let mut seen = vec![false; meta.face_count()];
            for i in 0..meta.face_count() {
                if seen[i] || !valid_start_face(i, pat.start_faces()) {
                    continue;
                }
                let col = match col_type {
                    ColoringType::None => None,
                    #[allow(clippy::cast_possible_truncation)]
                    ColoringType::PathIndex => Some(Color(p_idx as u32)),
                    ColoringType::AssociatedElement => self
                        .associated_element(meta, i, &report.step, report.assoc_type)
                        .and_then(|elem| self.orig_colors.get(&elem).copied()),
                };
                add_circuit(
                    &mut geom,
                    meta,
                    i,
                    pat,
                    &mut seen,
                    col,
                    &index_order,
                    &point_vertex_offsets,
                    &self.points,
                );
                if self.one_of_each_tile {
                    break;
                }
            }
            report.count = geom.face_count() + geom.edge_count() - elems_before;
            reports.push(report);
        }

        let free = geom.free_verts();
        geom.delete_verts(&free);
        Ok((geom, reports))
    }

    /// Color for a pattern-point vertex: the base element under the
    /// relevant corner of its example triangle.
    fn associated_point_color(
        &self,
        meta: &MetaTiling,
        f_idx: usize,
        incl: Inclusion,
    ) -> Option<Color> {
        let corner = match incl {
            Inclusion::V => Corner::V,
            Inclusion::E => Corner::E,
            _ => Corner::F,
        };
        self.orig_colors.get(&meta.corner(f_idx, corner)).copied()
    }

    /// Walk a path's association step from a seed triangle and read off the
    /// base element it lands on (as a meta vertex index).
    fn associated_element(
        &self,
        meta: &MetaTiling,
        start_idx: usize,
        step: &str,
        assoc_type: Inclusion,
    ) -> Option<usize> {
        let corner = match assoc_type {
            Inclusion::V => Corner::V,
            Inclusion::E => Corner::E,
            Inclusion::F => Corner::F,
            _ => return None,
        };
        let mut idx = start_idx;
        for ch in step.chars() {
            let c = match ch {
                'v' => Corner::V,
                'e' => Corner::E,
                _ => Corner::F,
            };
            idx = meta.neighbor(idx, c)?;
        }
        Some(meta.corner(idx, corner))
    }
}

/// One-call tiling: apply a pattern or Conway operator string to a base
/// polyhedron. Unoriented tilings seed everywhere and merge doubled tiles.
///
/// # Errors
/// Pattern/operator parse errors and tiling errors.
pub fn wythoff_make_tiling(
    base: &Geometry,
    pat: &str,
    oriented: bool,
    reverse: bool,
    col_type: ColoringType,
) -> Result<Geometry, TilingError> {
    let mut tiling = Tiling::new();
    if pat.starts_with('[') {
        tiling.read_pattern(pat)?;
    } else {
        tiling.read_conway(pat)?;
    }
    tiling.set_geom(base, false, 0.0)?; // not meta, so will not fail
    if !oriented {
        tiling.start_everywhere();
    }
    if reverse {
        tiling.reverse_pattern();
    }
    let (mut geom, _) = tiling.make_tiling(col_type)?;
    if !oriented {
        // some tiles may be doubled
        geom.merge_coincident_elements("ef", MERGE_EPSILON);
    }
    Ok(geom)
}

/// Combined base-element colors keyed by meta vertex index: base vertices
/// first, then faces, then implicit edges.
fn original_colors(geom: &Geometry, is_meta: bool) -> FxHashMap<usize, Color> {
    let mut cols = FxHashMap::default();
    for i in 0..geom.vert_count() {
        if let Some(c) = geom.vert_color(i) {
            cols.insert(i, c);
        }
    }
    // for a meta base this is all the colours; for a polyhedron base add
    // the face colours and then the edge colours
    if !is_meta {
        let f_start = geom.vert_count();
        for i in 0..geom.face_count() {
            if let Some(c) = geom.face_color(i) {
                cols.insert(i + f_start, c);
            }
        }
        let mut e2col: FxHashMap<[usize; 2], Color> = FxHashMap::default();
        for (i, e) in geom.edges().iter().enumerate() {
            if let Some(c) = geom.edge_color(i) {
                e2col.insert(if e[0] < e[1] { *e } else { [e[1], e[0]] }, c);
            }
        }
        let e_start = geom.vert_count() + geom.face_count();
        for (e_idx, e) in geom.impl_edges().iter().enumerate() {
            if let Some(&c) = e2col.get(e) {
                cols.insert(e_idx + e_start, c);
            }
        }
    }
    cols
}

const fn sorted_pair(a: usize, b: usize) -> (usize, usize) {
    if a < b { (a, b) } else { (b, a) }
}

/// Record an example triangle for a V-E edge class, preferring a
/// positive-parity (odd-index) triangle once one is seen.
fn store_tri(
    map: &mut BTreeMap<(usize, usize), (usize, usize)>,
    key: (usize, usize),
    tri_idx: usize,
) {
    let entry = map.entry(key).or_insert((0, tri_idx));
    if entry.1 % 2 == 0 && tri_idx % 2 == 1 {
        entry.1 = tri_idx;
    }
}

/// Positive-parity triangles sit at odd indices.
const fn valid_start_face(f_idx: usize, start: SeedFaces) -> bool {
    match start {
        SeedFaces::Plus => f_idx % 2 == 1,
        SeedFaces::Minus => f_idx % 2 == 0,
        SeedFaces::Both => true,
    }
}

/// Apply the pattern from a seed triangle until the circuit returns to it,
/// then emit the collected vertices (faces with three or more, edge
/// elements with two). A circuit that crosses an open boundary is
/// abandoned.
#[allow(clippy::too_many_arguments)]
fn add_circuit(
    geom: &mut Geometry,
    meta: &MetaTiling,
    start_idx: usize,
    pat: &Tile,
    seen: &mut [bool],
    col: Option<Color>,
    index_order: &IndexOrder,
    point_vertex_offsets: &[usize],
    points: &[PatternPoint],
) {
    let mut face = Vec::new();
    let mut idx = start_idx;
    loop {
        seen[idx] = true;
        for op in pat.ops() {
            match *op {
                TileOp::Point(p) => {
                    let incl = points[p].inclusion;
                    let order = class_order(meta, index_order, idx, incl);
                    face.push(point_vertex_offsets[p] + order);
                }
                TileOp::Reflect(c) => match meta.neighbor(idx, c) {
                    Some(next) => idx = next,
                    None => return, // abandon: circuit crossed an open edge
                },
            }
        }
        if idx == start_idx {
            break; // circuit complete
        }
    }

    match (face.len(), col) {
        (0 | 1, _) => {}
        (2, Some(c)) => {
            geom.add_edge_colored([face[0], face[1]], c);
        }
        (2, None) => {
            geom.add_edge([face[0], face[1]]);
        }
        (_, Some(c)) => {
            geom.add_face_colored(face, c);
        }
        (_, None) => {
            geom.add_face(face);
        }
    }
}

/// Order of the element class a pattern point selects on a triangle.
fn class_order(
    meta: &MetaTiling,
    index_order: &IndexOrder,
    f_idx: usize,
    incl: Inclusion,
) -> usize {
    let v = meta.corner(f_idx, Corner::V);
    let e = meta.corner(f_idx, Corner::E);
    let f = meta.corner(f_idx, Corner::F);
    let key = match incl {
        Inclusion::V => (v, v),
        Inclusion::E => (e, e),
        Inclusion::F => (f, f),
        Inclusion::VE => sorted_pair(v, e),
        Inclusion::EF => sorted_pair(e, f),
        Inclusion::FV => sorted_pair(f, v),
        Inclusion::VEF => (f_idx, f_idx),
    };
    index_order[incl.index()][&key].0
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    fn cube() -> Geometry {
        let mut g = Geometry::new();
        for z in [-0.5, 0.5] {
            for y in [-0.5, 0.5] {
                for x in [-0.5, 0.5] {
                    g.add_vert(DVec3::new(x, y, z));
                }
            }
        }
        g.add_face(vec![0, 2, 3, 1]);
        g.add_face(vec![4, 5, 7, 6]);
        g.add_face(vec![0, 1, 5, 4]);
        g.add_face(vec![2, 6, 7, 3]);
        g.add_face(vec![0, 4, 6, 2]);
        g.add_face(vec![1, 3, 7, 5]);
        g
    }

    fn tetrahedron() -> Geometry {
        let mut g = Geometry::new();
        g.add_vert(DVec3::new(1.0, 1.0, 1.0));
        g.add_vert(DVec3::new(1.0, -1.0, -1.0));
        g.add_vert(DVec3::new(-1.0, 1.0, -1.0));
        g.add_vert(DVec3::new(-1.0, -1.0, 1.0));
        g.add_face(vec![0, 1, 2]);
        g.add_face(vec![0, 2, 3]);
        g.add_face(vec![0, 3, 1]);
        g.add_face(vec![1, 3, 2]);
        g
    }

    fn apply(base: &Geometry, op: &str) -> Geometry {
        let mut tiling = Tiling::new();
        tiling.read_conway(op).unwrap();
        tiling.set_geom(base, false, 0.0).unwrap();
        tiling.make_tiling(ColoringType::None).unwrap().0
    }

    fn face_size_histogram(geom: &Geometry) -> Vec<(usize, usize)> {
        let mut sizes: Vec<usize> = geom.faces().iter().map(Vec::len).collect();
        sizes.sort_unstable();
        let mut hist = Vec::new();
        for s in sizes {
            match hist.last_mut() {
                Some((size, count)) if *size == s => *count += 1,
                _ => hist.push((s, 1)),
            }
        }
        hist
    }

    #[test]
    fn test_seed_reproduces_cube() {
        let geom = apply(&cube(), "S");
        assert_eq!(geom.vert_count(), 8);
        assert_eq!(face_size_histogram(&geom), vec![(4, 6)]);
        assert_eq!(geom.edge_count(), 12); // base edges come back as digons
        assert_eq!(geom.impl_edges().len(), 12);
    }

    #[test]
    fn test_dual_cube_is_octahedron() {
        let geom = apply(&cube(), "d");
        assert_eq!(geom.vert_count(), 6);
        assert_eq!(face_size_histogram(&geom), vec![(3, 8)]);
        assert_eq!(geom.impl_edges().len(), 12);
    }

    #[test]
    fn test_dual_is_involutive_on_combinatorics() {
        let once = apply(&cube(), "d");
        let twice = apply(&once, "d");
        assert_eq!(twice.vert_count(), 8);
        assert_eq!(face_size_histogram(&twice), vec![(4, 6)]);
    }

    #[test]
    fn test_ambo_commutes_with_dual() {
        let on_base = apply(&cube(), "a");
        let on_dual = apply(&apply(&cube(), "d"), "a");
        assert_eq!(on_base.vert_count(), 12);
        assert_eq!(on_dual.vert_count(), 12);
        assert_eq!(face_size_histogram(&on_base), vec![(3, 8), (4, 6)]);
        assert_eq!(face_size_histogram(&on_dual), face_size_histogram(&on_base));
    }

    #[test]
    fn test_kis_tetrahedron() {
        let geom = apply(&tetrahedron(), "k");
        assert_eq!(geom.vert_count(), 8);
        assert_eq!(face_size_histogram(&geom), vec![(3, 12)]);
        assert_eq!(geom.impl_edges().len(), 18);
        assert_eq!(geom.edge_count(), 6); // base edges come back as digons
    }

    #[test]
    fn test_meta_cube() {
        let geom = apply(&cube(), "m");
        assert_eq!(geom.vert_count(), 26); // 8 V + 12 E + 6 F
        assert_eq!(face_size_histogram(&geom), vec![(3, 48)]);
    }

    #[test]
    fn test_truncate_cube() {
        let geom = apply(&cube(), "t");
        assert_eq!(geom.vert_count(), 24);
        assert_eq!(face_size_histogram(&geom), vec![(3, 8), (8, 6)]);
    }

    #[test]
    fn test_snub_cube_combinatorics() {
        let geom = apply(&cube(), "s");
        assert_eq!(geom.vert_count(), 24);
        assert_eq!(face_size_histogram(&geom), vec![(3, 32), (4, 6)]);
    }

    #[test]
    fn test_path_index_coloring() {
        let mut tiling = Tiling::new();
        tiling.read_conway("d").unwrap();
        tiling.set_geom(&cube(), false, 0.0).unwrap();
        let (geom, reports) = tiling.make_tiling(ColoringType::PathIndex).unwrap();
        for f in 0..geom.face_count() {
            assert_eq!(geom.face_color(f), Some(Color(0))); // path 0: 0V
        }
        for e in 0..geom.edge_count() {
            assert_eq!(geom.edge_color(e), Some(Color(1))); // path 1: 0E
        }
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].count, 8);
        assert_eq!(reports[1].count, 12);
    }

    #[test]
    fn test_associated_element_coloring() {
        let mut base = cube();
        for v in 0..8 {
            #[allow(clippy::cast_possible_truncation)]
            base.set_vert_color(v, Color(10 + v as u32));
        }
        for f in 0..6 {
            #[allow(clippy::cast_possible_truncation)]
            base.set_face_color(f, Color(f as u32));
        }
        base.add_edge_colored([0, 1], Color(77));
        let mut tiling = Tiling::new();
        tiling.read_conway("d").unwrap();
        tiling.set_geom(&base, false, 0.0).unwrap();
        let (geom, reports) = tiling.make_tiling(ColoringType::AssociatedElement).unwrap();

        // dual vertices sit on base faces and take their colors
        let mut vert_cols: Vec<u32> = (0..geom.vert_count())
            .filter_map(|v| geom.vert_color(v).map(|c| c.0))
            .collect();
        vert_cols.sort_unstable();
        assert_eq!(vert_cols, vec![0, 1, 2, 3, 4, 5]);

        // dual faces surround base vertices and take their colors
        assert_eq!(reports[0].assoc_type, Inclusion::V);
        let mut face_cols: Vec<u32> = (0..geom.face_count())
            .filter_map(|f| geom.face_color(f).map(|c| c.0))
            .collect();
        face_cols.sort_unstable();
        assert_eq!(face_cols, (10..18).collect::<Vec<u32>>());

        // the digon over the one colored base edge inherits its color
        assert_eq!(reports[1].assoc_type, Inclusion::E);
        let edge_cols: Vec<u32> = (0..geom.edge_count())
            .filter_map(|e| geom.edge_color(e).map(|c| c.0))
            .collect();
        assert_eq!(edge_cols, vec![77]);
    }

    #[test]
    fn test_index_out_of_range() {
        let mut tiling = Tiling::new();
        tiling.read_pattern("[V]0_1E").unwrap();
        tiling.set_geom(&cube(), false, 0.0).unwrap();
        assert_eq!(
            tiling.make_tiling(ColoringType::None).unwrap_err(),
            TilingError::IndexOutOfRange {
                path: 0,
                indices: vec![1]
            }
        );
    }

    #[test]
    fn test_pattern_string_round_trip() {
        for pat in [
            "[F]0V,0E",
            "[F,V]0_1v1v,1E",
            "[V,E,F]*0_1_2",
            "[VEF]0V,0E,0F,0V0E0F",
            "[V,E2F]1F,1e1_0e,1_0E",
            "[0.5V1.5E]0F",
        ] {
            let mut tiling = Tiling::new();
            tiling.read_pattern(pat).unwrap();
            let formatted = tiling.pattern_string();
            let mut reparsed = Tiling::new();
            reparsed.read_pattern(&formatted).unwrap();
            assert_eq!(tiling.points(), reparsed.points(), "{pat}");
            assert_eq!(tiling.paths(), reparsed.paths(), "{pat}");
            assert_eq!(formatted, reparsed.pattern_string(), "{pat}");
        }
    }

    #[test]
    fn test_reverse_is_involutive() {
        let mut tiling = Tiling::new();
        tiling.read_conway("k").unwrap();
        let before = tiling.pattern_string();
        tiling.reverse_pattern();
        assert_ne!(tiling.pattern_string(), before);
        tiling.reverse_pattern();
        assert_eq!(tiling.pattern_string(), before);
    }

    #[test]
    fn test_relabel_identity_and_transposition() {
        let mut tiling = Tiling::new();
        tiling.read_conway("g").unwrap();
        let before = tiling.pattern_string();

        tiling.relabel_pattern("VEF").unwrap();
        assert_eq!(tiling.pattern_string(), before);

        // a transposition is involutive
        tiling.relabel_pattern("VFE").unwrap();
        assert_ne!(tiling.pattern_string(), before);
        tiling.relabel_pattern("VFE").unwrap();
        assert_eq!(tiling.pattern_string(), before);

        assert_eq!(
            tiling.relabel_pattern("VVF").unwrap_err(),
            TilingError::BadRelabel
        );
    }

    #[test]
    fn test_relabel_dual_gives_seed() {
        // d = [F]0V,0E relabelled F->V becomes the seed pattern family
        let mut tiling = Tiling::new();
        tiling.read_conway("d").unwrap();
        tiling.relabel_pattern("FEV").unwrap();
        tiling.set_geom(&cube(), false, 0.0).unwrap();
        let (geom, _) = tiling.make_tiling(ColoringType::None).unwrap();
        assert_eq!(geom.vert_count(), 8);
        assert_eq!(face_size_histogram(&geom), vec![(4, 6)]);
    }

    #[test]
    fn test_one_of_each_tile() {
        let mut tiling = Tiling::new();
        tiling.read_conway("d").unwrap();
        tiling.set_geom(&cube(), false, 0.0).unwrap();
        tiling.one_of_each_tile = true;
        let (geom, _) = tiling.make_tiling(ColoringType::None).unwrap();
        assert_eq!(geom.face_count() + geom.edge_count(), 2);
    }

    #[test]
    fn test_adopted_meta_base() {
        // Feed the cube's own meta in as a meta: the seed operator then
        // reconstructs the underlying cube.
        let meta_geom = crate::meta::MetaTiling::from_base(&cube(), 0.0)
            .geom()
            .clone();
        let mut tiling = Tiling::new();
        tiling.read_conway("S").unwrap();
        tiling.set_geom(&meta_geom, true, 0.0).unwrap();
        let (geom, _) = tiling.make_tiling(ColoringType::None).unwrap();
        assert_eq!(geom.vert_count(), 8);
        assert_eq!(face_size_histogram(&geom), vec![(4, 6)]);
    }

    #[test]
    fn test_open_mesh_drops_boundary_circuits() {
        // a single square face: vertex-figure and edge circuits cross the
        // open rim and are silently dropped, the face circuit survives
        let mut g = Geometry::new();
        g.add_vert(DVec3::new(0.0, 0.0, 0.0));
        g.add_vert(DVec3::new(1.0, 0.0, 0.0));
        g.add_vert(DVec3::new(1.0, 1.0, 0.0));
        g.add_vert(DVec3::new(0.0, 1.0, 0.0));
        g.add_face(vec![0, 1, 2, 3]);

        let seeded = wythoff_make_tiling(&g, "S", true, false, ColoringType::None).unwrap();
        assert_eq!(seeded.vert_count(), 4);
        assert_eq!(face_size_histogram(&seeded), vec![(4, 1)]);
        assert_eq!(seeded.edge_count(), 0);

        // kis spikes survive (their circuits stay interior)
        let kissed = wythoff_make_tiling(&g, "k", true, false, ColoringType::None).unwrap();
        assert_eq!(kissed.vert_count(), 5);
        assert_eq!(face_size_histogram(&kissed), vec![(3, 4)]);
    }

    #[test]
    fn test_add_tile_appends_paths() {
        let mut tiling = Tiling::new();
        tiling.read_pattern("[V]0F").unwrap();
        tiling.add_tile("0E").unwrap();
        assert_eq!(tiling.paths().len(), 2);
        tiling.set_geom(&cube(), false, 0.0).unwrap();
        let (geom, _) = tiling.make_tiling(ColoringType::None).unwrap();
        // now equivalent to the seed operator
        assert_eq!(geom.vert_count(), 8);
        assert_eq!(face_size_histogram(&geom), vec![(4, 6)]);
        assert_eq!(geom.edge_count(), 12);
    }

    #[test]
    fn test_wythoff_make_tiling_convenience() {
        let geom = wythoff_make_tiling(&cube(), "d", true, false, ColoringType::None).unwrap();
        assert_eq!(geom.vert_count(), 6);

        let geom = wythoff_make_tiling(&cube(), "[F]0V,0E", true, false, ColoringType::None)
            .unwrap();
        assert_eq!(geom.vert_count(), 6);

        // unoriented: seed everywhere, merge doubled tiles
        let geom = wythoff_make_tiling(&cube(), "S", false, false, ColoringType::None).unwrap();
        assert_eq!(geom.vert_count(), 8);
        assert_eq!(face_size_histogram(&geom), vec![(4, 6)]);
    }

    #[test]
    fn test_face_elevation_moves_kis_spikes() {
        let mut tiling = Tiling::new();
        tiling.read_conway("k").unwrap();
        tiling.set_geom(&cube(), false, 0.5).unwrap();
        let (geom, _) = tiling.make_tiling(ColoringType::None).unwrap();
        // spike vertices (F-class) sit above the faces
        let max_len = geom
            .verts()
            .iter()
            .map(|v| v.length())
            .fold(0.0_f64, f64::max);
        assert!(max_len > 0.9); // 0.5 face center + 0.5 lift
    }
}
