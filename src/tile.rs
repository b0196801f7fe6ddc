//! The tile-pattern mini-language.
//!
//! A pattern `[P0,P1,...]T0,T1,...` names points in V/E/F barycentric
//! coordinates over a meta triangle, then paths that walk the triangle
//! adjacency graph emitting those points. Path letters `v e f` reflect
//! across the meta edge opposite that corner; uppercase `V E F` are the
//! rotations `ef`, `fv`, `ve` and are lowered to their reflection pairs on
//! parse. Digits select pattern points; `_` only separates adjacent
//! indices.

use glam::DVec3;

use crate::tiling::TilingError;

/// A corner role of a meta triangle (also names the reflection across the
/// meta edge opposite that corner).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Corner {
    /// Base vertex corner / mirror `v`.
    V,
    /// Base edge-center corner / mirror `e`.
    E,
    /// Base face-center corner / mirror `f`.
    F,
}

impl Corner {
    /// Corner position 0, 1 or 2.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::V => 0,
            Self::E => 1,
            Self::F => 2,
        }
    }

    pub(crate) const fn letter(self) -> char {
        match self {
            Self::V => 'v',
            Self::E => 'e',
            Self::F => 'f',
        }
    }
}

/// Which meta-triangle feature a pattern point lies on, deduced from its
/// nonzero barycentric components.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(clippy::upper_case_acronyms)]
pub enum Inclusion {
    /// On the V corner.
    V,
    /// On the E corner.
    E,
    /// On the F corner.
    F,
    /// On the V-E meta edge.
    VE,
    /// On the E-F meta edge.
    EF,
    /// On the F-V meta edge.
    FV,
    /// Strictly interior.
    VEF,
}

impl Inclusion {
    /// Position of this inclusion in the fixed V,E,F,VE,EF,FV,VEF order.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::V => 0,
            Self::E => 1,
            Self::F => 2,
            Self::VE => 3,
            Self::EF => 4,
            Self::FV => 5,
            Self::VEF => 6,
        }
    }

    /// Classify barycentric coordinates; `None` when all are zero.
    #[must_use]
    pub fn from_coords(coords: DVec3) -> Option<Self> {
        let v = coords.x != 0.0;
        let e = coords.y != 0.0;
        let f = coords.z != 0.0;
        match (v, e, f) {
            (true, false, false) => Some(Self::V),
            (false, true, false) => Some(Self::E),
            (false, false, true) => Some(Self::F),
            (true, true, false) => Some(Self::VE),
            (false, true, true) => Some(Self::EF),
            (true, false, true) => Some(Self::FV),
            (true, true, true) => Some(Self::VEF),
            (false, false, false) => None,
        }
    }
}

/// A pattern point: barycentric coordinates plus the feature they select.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PatternPoint {
    /// Unnormalized V/E/F barycentric coordinates.
    pub coords: DVec3,
    /// Feature class the nonzero coordinates select.
    pub inclusion: Inclusion,
}

impl PatternPoint {
    /// Build a point from coordinates; `None` when all are zero.
    #[must_use]
    pub fn new(coords: DVec3) -> Option<Self> {
        Inclusion::from_coords(coords).map(|inclusion| Self { coords, inclusion })
    }
}

/// Parse one point of a pattern: coefficient-letter groups such as `V2E`
/// or `0.5V1.5F`, each letter at most once, implicit coefficient 1.
pub(crate) fn read_point(s: &str) -> Result<PatternPoint, TilingError> {
    let bytes = s.as_bytes();
    let mut coords = DVec3::ZERO;
    let mut seen = [false; 3];
    let mut pos = 0;
    while pos < bytes.len() {
        let start = pos;
        if matches!(bytes[pos], b'+' | b'-') {
            pos += 1;
        }
        let mut has_digits = false;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
            has_digits = true;
        }
        if pos < bytes.len() && bytes[pos] == b'.' {
            pos += 1;
            let mut has_frac = false;
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                pos += 1;
                has_frac = true;
            }
            if !has_frac {
                return Err(TilingError::BadCoefficient);
            }
            has_digits = true;
        }
        if pos > start && !has_digits {
            // a bare sign is not a coefficient
            return Err(TilingError::BadCoefficient);
        }
        let Some(&letter) = bytes.get(pos) else {
            return Err(TilingError::BadCoefficient);
        };
        let axis = match letter {
            b'V' => 0,
            b'E' => 1,
            b'F' => 2,
            _ => {
                return Err(TilingError::BadChar {
                    pos,
                    ch: letter as char,
                });
            }
        };
        if seen[axis] {
            return Err(TilingError::DuplicateAxis {
                axis: letter as char,
            });
        }
        seen[axis] = true;
        coords[axis] = if pos == start {
            1.0
        } else {
            s[start..pos]
                .parse()
                .map_err(|_| TilingError::BadCoefficient)?
        };
        pos += 1;
    }

    PatternPoint::new(coords).ok_or(TilingError::ZeroPoint)
}

/// Coefficient-letter serialization of barycentric coordinates (zero
/// components omitted, unit coefficients implicit).
pub(crate) fn coord_string(v: DVec3) -> String {
    let mut out = String::new();
    for (i, letter) in ['V', 'E', 'F'].into_iter().enumerate() {
        let c = v[i];
        if c != 0.0 {
            if c != 1.0 {
                out.push_str(&fmt_coefficient(c));
            }
            out.push(letter);
        }
    }
    out
}

#[allow(clippy::cast_possible_truncation)]
fn fmt_coefficient(v: f64) -> String {
    if v == v.trunc() && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

/// Which parity of meta triangle a path starts circuits from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeedFaces {
    /// Positive-parity triangles only (`+`).
    Plus,
    /// Negative-parity triangles only (`-`).
    Minus,
    /// Both parities (`*`).
    Both,
}

impl SeedFaces {
    const fn to_char(self) -> char {
        match self {
            Self::Plus => '+',
            Self::Minus => '-',
            Self::Both => '*',
        }
    }
}

/// One operation of a tile path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TileOp {
    /// Reflect across the meta edge opposite the corner.
    Reflect(Corner),
    /// Emit the output vertex of pattern point `i` on the current triangle.
    Point(usize),
}

/// Element association of a path, derived from its reduced mirror word.
#[derive(Clone, Debug)]
pub struct TileReport {
    /// Prefix walking from the seed triangle to the associated element.
    pub step: String,
    /// Central factor whose letters decide the association class.
    pub assoc: String,
    /// Mirror image of `step`.
    pub step_back: String,
    /// Association class (V, E, F or VEF).
    pub assoc_type: Inclusion,
    /// Faces the path emitted (filled in by the tiling engine).
    pub count: usize,
}

/// A tile path: a seed-parity flag plus a word of reflections and point
/// emissions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    start_faces: SeedFaces,
    ops: Vec<TileOp>,
}

impl Tile {
    /// Parse a path such as `*0_1v1v` or `0V0E`.
    ///
    /// # Errors
    /// `UnframedPath` when neither the first character (after any flag) nor
    /// the last is a digit; `BadChar` for anything outside the alphabet.
    pub fn read(pat: &str) -> Result<Self, TilingError> {
        let bytes = pat.as_bytes();
        let (start_faces, mut pos) = match bytes.first() {
            Some(b'+') => (SeedFaces::Plus, 1),
            Some(b'-') => (SeedFaces::Minus, 1),
            Some(b'*') => (SeedFaces::Both, 1),
            _ => (SeedFaces::Plus, 0),
        };
        let first_is_digit = bytes.get(pos).is_some_and(u8::is_ascii_digit);
        let last_is_digit = bytes.last().is_some_and(u8::is_ascii_digit);
        if !first_is_digit && !last_is_digit {
            return Err(TilingError::UnframedPath);
        }

        let mut ops = Vec::new();
        while pos < bytes.len() {
            if bytes[pos].is_ascii_digit() {
                let mut idx = 0usize;
                while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                    idx = idx
                        .saturating_mul(10)
                        .saturating_add(usize::from(bytes[pos] - b'0'));
                    pos += 1;
                }
                ops.push(TileOp::Point(idx));
                continue;
            }
            match bytes[pos] {
                // mirrors
                b'v' => ops.push(TileOp::Reflect(Corner::V)),
                b'e' => ops.push(TileOp::Reflect(Corner::E)),
                b'f' => ops.push(TileOp::Reflect(Corner::F)),
                // rotations, lowered to reflection pairs
                b'V' => {
                    ops.push(TileOp::Reflect(Corner::E));
                    ops.push(TileOp::Reflect(Corner::F));
                }
                b'E' => {
                    ops.push(TileOp::Reflect(Corner::F));
                    ops.push(TileOp::Reflect(Corner::V));
                }
                b'F' => {
                    ops.push(TileOp::Reflect(Corner::V));
                    ops.push(TileOp::Reflect(Corner::E));
                }
                // no op - stay on same triangle
                b'_' => {}
                other => {
                    return Err(TilingError::BadChar {
                        pos,
                        ch: other as char,
                    });
                }
            }
            pos += 1;
        }

        Ok(Self { start_faces, ops })
    }

    /// The operation word.
    #[must_use]
    pub fn ops(&self) -> &[TileOp] {
        &self.ops
    }

    /// The seed-parity flag.
    #[must_use]
    pub const fn start_faces(&self) -> SeedFaces {
        self.start_faces
    }

    pub(crate) const fn set_start_faces(&mut self, start: SeedFaces) {
        self.start_faces = start;
    }

    /// Flip `+`/`-`; `*` is left unchanged.
    pub(crate) const fn flip_start_faces(&mut self) {
        self.start_faces = match self.start_faces {
            SeedFaces::Plus => SeedFaces::Minus,
            SeedFaces::Minus => SeedFaces::Plus,
            SeedFaces::Both => SeedFaces::Both,
        };
    }

    /// Apply a V/E/F role permutation to the reflection ops.
    pub(crate) fn relabel(&mut self, relab: [Corner; 3]) {
        for op in &mut self.ops {
            if let TileOp::Reflect(c) = op {
                *op = TileOp::Reflect(relab[c.index()]);
            }
        }
    }

    /// Pattern-point indices outside `0..num_points`.
    #[must_use]
    pub fn check_index_range(&self, num_points: usize) -> Vec<usize> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                TileOp::Point(idx) if *idx >= num_points => Some(*idx),
                _ => None,
            })
            .collect()
    }

    /// Canonical string form, preferring uppercase rotations where two
    /// adjacent reflections form one.
    #[must_use]
    pub fn tile_string(&self) -> String {
        let mut tile = String::new();
        if self.start_faces != SeedFaces::Plus {
            tile.push(self.start_faces.to_char());
        }
        let mut last_was_point = false;
        for op in &self.ops {
            match op {
                TileOp::Point(idx) => {
                    if last_was_point {
                        tile.push('_');
                    }
                    tile.push_str(&idx.to_string());
                    last_was_point = true;
                }
                TileOp::Reflect(c) => {
                    tile.push(c.letter());
                    last_was_point = false;
                }
            }
        }

        // convert pairs of consecutive letters from vef to VEF
        let chars: Vec<char> = tile.chars().collect();
        let mut out = String::new();
        let mut i = 0;
        while i < chars.len() {
            if i + 1 < chars.len()
                && let (Some(a), Some(b)) = (mirror_index(chars[i]), mirror_index(chars[i + 1]))
                && (a + 1) % 3 == b
            {
                out.push(['V', 'E', 'F'][(a + 2) % 3]);
                i += 2; // skip second letter of pair
            } else {
                out.push(chars[i]);
                i += 1;
            }
        }
        out
    }

    /// Factor the reduced mirror word as `step · assoc · step⁻¹` and derive
    /// the association class from the letters of `assoc`.
    #[must_use]
    pub fn element_association(&self) -> TileReport {
        let word: String = self
            .ops
            .iter()
            .filter_map(|op| match op {
                TileOp::Reflect(c) => Some(c.letter()),
                TileOp::Point(_) => None,
            })
            .collect();
        let reduced = reduce_mirror_word(&word);
        let bytes = reduced.as_bytes();
        let sz = bytes.len();
        let mut mismatch = 0;
        while mismatch < sz && bytes[mismatch] == bytes[sz - 1 - mismatch] {
            mismatch += 1;
        }

        let step = reduced[..mismatch.min(sz)].to_string();
        let assoc = if sz >= 2 * mismatch {
            reduced[mismatch..sz - mismatch].to_string()
        } else {
            String::new()
        };
        let step_back = reduced[sz - mismatch.min(sz)..].to_string();

        let has = |letter: char| assoc.contains(letter);
        let assoc_type = match (has('v'), has('e'), has('f')) {
            (true, true, true) => Inclusion::VEF,
            (true, true, false) => Inclusion::F,
            (false, true, true) => Inclusion::V,
            (true, false, true) => Inclusion::E,
            // single letter or empty: face-like
            _ => Inclusion::F,
        };

        TileReport {
            step,
            assoc,
            step_back,
            assoc_type,
            count: 0,
        }
    }
}

/// Repeatedly cancel adjacent duplicate letters (a reflection undoes
/// itself).
fn reduce_mirror_word(word: &str) -> String {
    let mut out = String::new();
    for ch in word.chars() {
        if out.ends_with(ch) {
            out.pop();
        } else {
            out.push(ch);
        }
    }
    out
}

fn mirror_index(ch: char) -> Option<usize> {
    match ch {
        'v' => Some(0),
        'e' => Some(1),
        'f' => Some(2),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_point_coefficients() {
        let pt = read_point("V2E").unwrap();
        assert_eq!(pt.coords, DVec3::new(1.0, 2.0, 0.0));
        assert_eq!(pt.inclusion, Inclusion::VE);

        let pt = read_point("0.5F").unwrap();
        assert_eq!(pt.coords, DVec3::new(0.0, 0.0, 0.5));
        assert_eq!(pt.inclusion, Inclusion::F);

        let pt = read_point("-2V3F").unwrap();
        assert_eq!(pt.coords, DVec3::new(-2.0, 0.0, 3.0));
        assert_eq!(pt.inclusion, Inclusion::FV);

        let pt = read_point("V1.5E2F").unwrap();
        assert_eq!(pt.inclusion, Inclusion::VEF);
    }

    #[test]
    fn test_read_point_errors() {
        assert!(matches!(
            read_point("G"),
            Err(TilingError::BadChar { ch: 'G', .. })
        ));
        assert_eq!(
            read_point("V2V"),
            Err(TilingError::DuplicateAxis { axis: 'V' })
        );
        assert_eq!(read_point("0V"), Err(TilingError::ZeroPoint));
        assert_eq!(read_point("2"), Err(TilingError::BadCoefficient));
        assert_eq!(read_point("-V"), Err(TilingError::BadCoefficient));
        assert_eq!(read_point("2.V"), Err(TilingError::BadCoefficient));
    }

    #[test]
    fn test_tile_parse_lowers_rotations() {
        let tile = Tile::read("0V").unwrap();
        assert_eq!(
            tile.ops(),
            &[
                TileOp::Point(0),
                TileOp::Reflect(Corner::E),
                TileOp::Reflect(Corner::F)
            ]
        );
        let tile = Tile::read("0E").unwrap();
        assert_eq!(
            tile.ops(),
            &[
                TileOp::Point(0),
                TileOp::Reflect(Corner::F),
                TileOp::Reflect(Corner::V)
            ]
        );
    }

    #[test]
    fn test_tile_parse_flags_and_indices() {
        let tile = Tile::read("*10_2v").unwrap();
        assert_eq!(tile.start_faces(), SeedFaces::Both);
        assert_eq!(
            tile.ops(),
            &[
                TileOp::Point(10),
                TileOp::Point(2),
                TileOp::Reflect(Corner::V)
            ]
        );
        assert_eq!(Tile::read("-1E").unwrap().start_faces(), SeedFaces::Minus);
    }

    #[test]
    fn test_tile_parse_errors() {
        assert_eq!(Tile::read("vv"), Err(TilingError::UnframedPath));
        assert_eq!(Tile::read(""), Err(TilingError::UnframedPath));
        assert!(matches!(
            Tile::read("0x1"),
            Err(TilingError::BadChar { ch: 'x', .. })
        ));
    }

    #[test]
    fn test_tile_string_round_trip() {
        for pat in ["0V0E", "*0_1_2", "-1F", "0e0f", "1_0v12v"] {
            let tile = Tile::read(pat).unwrap();
            let formatted = tile.tile_string();
            let reparsed = Tile::read(&formatted).unwrap();
            assert_eq!(tile, reparsed, "pattern {pat} vs {formatted}");
        }
    }

    #[test]
    fn test_tile_string_prefers_rotations() {
        assert_eq!(Tile::read("0ef").unwrap().tile_string(), "0V");
        assert_eq!(Tile::read("0fv").unwrap().tile_string(), "0E");
        assert_eq!(Tile::read("0ve").unwrap().tile_string(), "0F");
        // mixed pairs that are not rotations stay lowercase
        assert_eq!(Tile::read("0fe").unwrap().tile_string(), "0fe");
    }

    #[test]
    fn test_index_range_check() {
        let tile = Tile::read("0_5v7").unwrap();
        assert_eq!(tile.check_index_range(6), vec![7]);
        assert_eq!(tile.check_index_range(8), Vec::<usize>::new());
    }

    #[test]
    fn test_flip_start_faces() {
        let mut tile = Tile::read("0E").unwrap();
        tile.flip_start_faces();
        assert_eq!(tile.start_faces(), SeedFaces::Minus);
        tile.flip_start_faces();
        assert_eq!(tile.start_faces(), SeedFaces::Plus);
        let mut both = Tile::read("*0E").unwrap();
        both.flip_start_faces();
        assert_eq!(both.start_faces(), SeedFaces::Both);
    }

    #[test]
    fn test_element_association_classes() {
        // rotation about E: assoc letters {f,v} -> edge
        let rep = Tile::read("1E").unwrap().element_association();
        assert_eq!(rep.assoc_type, Inclusion::E);
        assert_eq!(rep.step, "");

        // rotation about V: assoc letters {e,f} -> vertex
        let rep = Tile::read("0V").unwrap().element_association();
        assert_eq!(rep.assoc_type, Inclusion::V);

        // kis spike path: word vv reduces to nothing -> face-like
        let rep = Tile::read("0_1v1v").unwrap().element_association();
        assert_eq!(rep.assoc, "");
        assert_eq!(rep.assoc_type, Inclusion::F);

        // all three letters -> interior
        let rep = Tile::read("0V0E0F").unwrap().element_association();
        assert_eq!(rep.assoc_type, Inclusion::VEF);
    }

    #[test]
    fn test_element_association_step_factorisation() {
        // word: f (step) ve (assoc) f (step back)
        let rep = Tile::read("0f0v0e0f").unwrap().element_association();
        assert_eq!(rep.step, "f");
        assert_eq!(rep.assoc, "ve");
        assert_eq!(rep.step_back, "f");
        assert_eq!(rep.assoc_type, Inclusion::F);
    }

    #[test]
    fn test_palindrome_words_bucket_to_face() {
        // vev is a palindrome: the scan consumes it whole, assoc is empty
        let rep = Tile::read("0v0e0v").unwrap().element_association();
        assert_eq!(rep.assoc, "");
        assert_eq!(rep.step, "vev");
        assert_eq!(rep.assoc_type, Inclusion::F);
    }

    #[test]
    fn test_coord_string_forms() {
        assert_eq!(coord_string(DVec3::new(1.0, 2.0, 0.0)), "V2E");
        assert_eq!(coord_string(DVec3::new(0.0, 0.0, 1.0)), "F");
        assert_eq!(coord_string(DVec3::new(3.0, 1.0, 0.5)), "3VE0.5F");
    }
}
