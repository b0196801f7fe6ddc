//! Wythoff symbols and the classical triangle-group constructions.
//!
//! A symbol `p q r` with a bar selects an orbit of a generator point on the
//! fundamental Schwarz triangle: `p | q r` places it on a vertex,
//! `p q | r` on the side opposite the bar, `p q r |` at the incenter, and
//! `| p q r` (snub) at the equal-angle Fermat point. Faces are emitted as
//! star polygons around the triangle's corners and replicated under the
//! triangle's rotation group.

use std::fmt;
use std::str::FromStr;

use glam::DVec3;

use crate::fraction::{Fraction, tri_symmetry};
use crate::geometry::{Color, Geometry, MERGE_EPSILON};
use crate::schwarz::assign_vertices;
use crate::symmetry::{PointGroup, angle_around_axis, reflection, rotation_about, sym_repeat};

const TAU: f64 = std::f64::consts::TAU;
const PI: f64 = std::f64::consts::PI;

/// Iteration budget for the Fermat fixed point.
const FERMAT_ITERS: u32 = 1_000;
const FERMAT_STEP: f64 = 0.1;
/// Degenerate triangles (one 3/2 vertex) are sensitive and need a smaller
/// step over many more iterations.
const FERMAT_ITERS_DEGENERATE: u32 = 50_000;
const FERMAT_STEP_DEGENERATE: f64 = 0.01;
/// Apex angles further than this from 2π/3 are reported as inaccurate.
const FERMAT_EPSILON: f64 = 1e-10;

/// Why a fraction token failed to parse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FractionErrorKind {
    /// Not a readable integer.
    Unparsable,
    /// Numerator below 2.
    OutOfRange,
    /// Denominator is a multiple of the numerator.
    Divisible,
}

/// Errors from reading a Wythoff symbol string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SymbolError {
    /// A character outside `[0-9/| ]`.
    BadChar { pos: usize, ch: char },
    /// No bar in the symbol.
    MissingBar,
    /// More than one bar in the symbol.
    MultipleBars,
    /// Not exactly three fractions.
    WrongArity { got: usize },
    /// Numerator of fraction `index` is invalid.
    BadNumerator {
        index: usize,
        kind: FractionErrorKind,
    },
    /// Denominator of fraction `index` is invalid.
    BadDenominator {
        index: usize,
        kind: FractionErrorKind,
    },
}

impl fmt::Display for SymbolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadChar { pos, ch } => {
                write!(f, "unrecognised character '{ch}' at position {pos}")
            }
            Self::MissingBar => write!(f, "no bar in symbol"),
            Self::MultipleBars => write!(f, "more than one bar in symbol"),
            Self::WrongArity { got } => {
                write!(f, "symbol has {got} fractions (expected 3)")
            }
            Self::BadNumerator { index, kind } => {
                write!(f, "numerator of fraction {}: {}", index + 1, match kind {
                    FractionErrorKind::Unparsable => "not an integer",
                    FractionErrorKind::OutOfRange => "must be an integer 2 or greater",
                    FractionErrorKind::Divisible => "invalid",
                })
            }
            Self::BadDenominator { index, kind } => {
                write!(f, "denominator of fraction {}: {}", index + 1, match kind {
                    FractionErrorKind::Unparsable => "not an integer",
                    FractionErrorKind::OutOfRange => "invalid",
                    FractionErrorKind::Divisible => "cannot be a multiple of the numerator",
                })
            }
        }
    }
}

impl std::error::Error for SymbolError {}

/// Errors from building a polyhedron out of a valid symbol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WythoffError {
    /// The fraction triple is not a spherical Schwarz triangle.
    UnsupportedTriangle,
    /// The symbol describes a nonconstructible antiprism.
    NotConstructible,
}

impl fmt::Display for WythoffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedTriangle => {
                write!(f, "symbol for non-finite construction (unsupported)")
            }
            Self::NotConstructible => {
                write!(f, "symbol leads to nonconstructible antiprism")
            }
        }
    }
}

impl std::error::Error for WythoffError {}

/// Result of a Wythoff construction.
#[derive(Clone, Debug)]
pub struct Construction {
    /// The constructed polyhedron.
    pub geom: Geometry,
    /// Maximum apex-angle deviation of the Fermat point when it exceeded
    /// the accuracy threshold (snub constructions only).
    pub fermat_delta: Option<f64>,
}

/// A parsed Wythoff symbol: three fractions and a bar position.
///
/// Bar positions: 0 for `|p q r`, 1 for `p|q r`, 2 for `p q|r`,
/// 3 for `p q r|`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WythoffSymbol {
    fracs: [Fraction; 3],
    bar_pos: u8,
}

impl WythoffSymbol {
    /// Assemble a symbol from parts.
    ///
    /// # Panics
    /// Panics if `bar_pos > 3`.
    #[must_use]
    pub fn new(fracs: [Fraction; 3], bar_pos: u8) -> Self {
        assert!(bar_pos <= 3, "bar position must be 0..=3");
        Self { fracs, bar_pos }
    }

    /// The three fractions in symbol order.
    #[must_use]
    pub const fn fracs(&self) -> [Fraction; 3] {
        self.fracs
    }

    /// Bar position (0..=3).
    #[must_use]
    pub const fn bar_pos(&self) -> u8 {
        self.bar_pos
    }

    /// Point group of the fundamental triangle.
    #[must_use]
    pub fn tri_symmetry(&self) -> Option<PointGroup> {
        tri_symmetry(self.fracs)
    }

    /// Fundamental triangle vertices, in symbol fraction order.
    fn vertices(&self) -> Result<[DVec3; 3], WythoffError> {
        assign_vertices(self.fracs).ok_or(WythoffError::UnsupportedTriangle)
    }

    /// Build the uniform polyhedron the symbol describes.
    ///
    /// # Errors
    /// `UnsupportedTriangle` when the fractions are not a Schwarz triangle,
    /// `NotConstructible` for invalid snub antiprisms.
    #[allow(clippy::too_many_lines, clippy::missing_panics_doc)]
    pub fn make_poly(&self) -> Result<Construction, WythoffError> {
        let verts = self.vertices()?;
        let sym = self.tri_symmetry().ok_or(WythoffError::UnsupportedTriangle)?;
        let fracs = self.fracs;
        let mut geom = Geometry::new();
        let mut fermat_delta = None;

        match self.bar_pos {
            0 => {
                // find smallest fraction (largest angle)
                let mut max_fract = 0;
                for i in 0..3 {
                    if fracs[i].value() <= fracs[max_fract].value() {
                        max_fract = i;
                    }
                }
                // Check for invalid antiprism
                if 2 * fracs[max_fract].num < 3 * fracs[max_fract].den
                    && fracs[(max_fract + 1) % 3].num == 2
                    && fracs[(max_fract + 2) % 3].num == 2
                {
                    return Err(WythoffError::NotConstructible);
                }

                // Triangles with a single 3/2 vertex are degenerate: the
                // solution generally lies at that vertex.
                let mut cnt_3_2 = 0;
                let mut pos_3_2 = 0;
                for i in 0..3 {
                    if fracs[i].is(3, 2) {
                        cnt_3_2 += 1;
                        pos_3_2 = i;
                    }
                }
                let degenerate = cnt_3_2 == 1;

                let next = fracs[(pos_3_2 + 1) % 3];
                let next2 = fracs[(pos_3_2 + 2) % 3];
                // Non-dihedral isosceles triangle with 3/2 apex
                let pt = if cnt_3_2 == 1 && next == next2 && next.num != 2 {
                    if next.num == 5 && (next.den == 3 || next.den == 4) {
                        // |3/2 5/3 5/3 and |3/2 5/4 5/4 have a different
                        // construction point
                        reflection(verts[(pos_3_2 + 2) % 3].cross(verts[pos_3_2]))
                            * verts[(pos_3_2 + 1) % 3]
                    } else {
                        // take apex as Fermat point and use smallest
                        // circumcentre
                        verts[(pos_3_2 + 1) % 3] + verts[(pos_3_2 + 2) % 3]
                    }
                } else {
                    let (f_pt, delta) = fermat_point(verts, degenerate);
                    if delta > FERMAT_EPSILON {
                        fermat_delta = Some(delta);
                    }
                    // Reflect in sides of triangle; construction point is
                    // the circumcentre of the three images
                    let u0 = reflection(verts[1].cross(verts[2])) * f_pt;
                    let u1 = reflection(verts[2].cross(verts[0])) * f_pt;
                    let u2 = reflection(verts[0].cross(verts[1])) * f_pt;
                    (u0 - u1).cross(u1 - u2)
                };
                let pt = pt.normalize();

                for i in 0..3 {
                    #[allow(clippy::cast_possible_truncation)]
                    add_faces(&mut geom, pt, fracs[i].num, fracs[i].den, verts[i], Color(i as u32), sym);
                }

                // Snub triangle faces
                let dir = if verts[0].dot(verts[1].cross(verts[2])) > 0.0 {
                    -1.0
                } else {
                    1.0
                };
                let mut tri_cent = pt;
                tri_cent += rotation_about(
                    verts[0],
                    dir * TAU * f64::from(fracs[0].den) / f64::from(fracs[0].num),
                ) * pt;
                tri_cent += rotation_about(
                    verts[1],
                    -dir * TAU * f64::from(fracs[1].den) / f64::from(fracs[1].num),
                ) * pt;
                add_faces(&mut geom, pt, 3, 2, tri_cent, Color(3), sym);
            }
            1 => {
                let pt = verts[0];
                if fracs[1].num == 2 && fracs[2].num == 2 {
                    // p|2 2 is degenerate: a pair of antipodal vertices
                    geom.add_vert(pt);
                    geom.add_vert(-pt);
                    geom.add_face(vec![0, 1]); // sized by edge length downstream
                } else {
                    add_faces(&mut geom, pt, fracs[1].num, fracs[1].den, verts[1], Color(1), sym);
                    add_faces(&mut geom, pt, fracs[2].num, fracs[2].den, verts[2], Color(2), sym);
                }
            }
            2 => {
                let n0 = angle_bisector_norm(verts[2], verts[0], verts[1]);
                let n1 = verts[0].cross(verts[1]);
                let pt = n0.cross(n1).normalize();

                add_faces(&mut geom, pt, fracs[0].num, fracs[0].den, verts[0], Color(0), sym);
                add_faces(&mut geom, pt, fracs[1].num, fracs[1].den, verts[1], Color(1), sym);
                // All hemis apart from 3/2 3 | 3 have duplicated faces
                geom.merge_coincident_elements("vf", MERGE_EPSILON);
                add_faces(&mut geom, pt, 2 * fracs[2].num, fracs[2].den, verts[2], Color(2), sym);
            }
            _ => {
                let n0 = angle_bisector_norm(verts[1], verts[2], verts[0]);
                let n1 = angle_bisector_norm(verts[2], verts[0], verts[1]);
                let pt = n0.cross(n1).normalize();

                for i in 0..3 {
                    #[allow(clippy::cast_possible_truncation)]
                    add_faces(&mut geom, pt, 2 * fracs[i].num, fracs[i].den, verts[i], Color(i as u32), sym);
                }
            }
        }

        geom.merge_coincident_elements("v", MERGE_EPSILON);
        Ok(Construction { geom, fermat_delta })
    }

    /// The fundamental triangle as a one-face geometry.
    ///
    /// # Errors
    /// `UnsupportedTriangle` when the fractions are not a Schwarz triangle.
    pub fn make_tri(&self) -> Result<Geometry, WythoffError> {
        let verts = self.vertices()?;
        let mut geom = Geometry::new();
        for v in verts {
            geom.add_vert(v);
        }
        geom.add_face(vec![0, 1, 2]);
        Ok(geom)
    }

    /// Tile the sphere with images of the fundamental triangle, colored 0/1
    /// by handedness.
    ///
    /// # Errors
    /// `UnsupportedTriangle` when the fractions are not a Schwarz triangle.
    pub fn make_tri_poly(&self) -> Result<Geometry, WythoffError> {
        let sym = self.tri_symmetry().ok_or(WythoffError::UnsupportedTriangle)?;
        let mut geom = Geometry::new();
        if matches!(sym, PointGroup::Dihedral(_)) {
            // N/D with D even is a double-wrapped surface and cannot be
            // merged; use the explicit bipyramid construction instead.
            let (mut n, mut d) = (2, 1);
            for f in self.fracs {
                n = f.num;
                d = f.den;
                if !f.is(2, 1) {
                    break;
                }
            }
            geom.add_vert(DVec3::Z);
            geom.add_vert(-DVec3::Z);
            let wrap = 2 * n as usize;
            for i in 0..wrap {
                #[allow(clippy::cast_precision_loss)]
                let ang = i as f64 * PI * f64::from(d) / f64::from(n);
                geom.add_vert(DVec3::new(ang.cos(), ang.sin(), 0.0));
                #[allow(clippy::cast_possible_truncation)]
                let parity = (i % 2) as u32;
                geom.add_face_colored(vec![2 + i, 2 + (i + 1) % wrap, 0], Color(parity));
                geom.add_face_colored(vec![1, 2 + (i + 1) % wrap, 2 + i], Color(1 - parity));
            }
        } else {
            let tri = self.make_tri()?;
            let mut rep = sym_repeat(&tri, sym);
            for f in 0..rep.face_count() {
                rep.set_face_color(f, Color(0));
            }
            geom.append(&rep);
            let norm = if sym == PointGroup::Tetrahedral {
                DVec3::new(1.0, 1.0, 0.0)
            } else {
                DVec3::Z
            };
            rep.transform(reflection(norm));
            for f in 0..rep.face_count() {
                rep.set_face_color(f, Color(1));
            }
            geom.append(&rep);
            geom.merge_coincident_elements("v", MERGE_EPSILON);
        }
        Ok(geom)
    }
}

impl FromStr for WythoffSymbol {
    type Err = SymbolError;

    fn from_str(sym: &str) -> Result<Self, SymbolError> {
        // remove double spaces and spaces at beginning and end
        let mut sym_norm = String::new();
        let mut ignore_if_space = true;
        for ch in sym.chars() {
            if ch == ' ' {
                if ignore_if_space {
                    continue;
                }
                ignore_if_space = true;
            } else {
                ignore_if_space = false;
            }
            sym_norm.push(ch);
        }
        if sym_norm.ends_with(' ') {
            sym_norm.pop();
        }

        // remove spaces either side of a punctuation mark, record space
        // counts and the bar position
        let chars: Vec<char> = sym_norm.chars().collect();
        let mut bar_cnt = 0usize;
        let mut bar_off = 0usize;
        let mut space_before_bar = 0usize;
        let mut space_after_bar = 0usize;
        let mut last_char_was_bar = false;
        let mut sym_norm2: Vec<char> = Vec::new();
        for (i, &ch) in chars.iter().enumerate() {
            if ch == ' '
                && ((i > 0 && chars[i - 1].is_ascii_punctuation())
                    || (i + 1 < chars.len() && chars[i + 1].is_ascii_punctuation()))
            {
                continue;
            }

            if ch == ' ' {
                if bar_cnt > 0 {
                    space_after_bar += 1;
                } else {
                    space_before_bar += 1;
                }
            }

            if ch == '|' {
                last_char_was_bar = true;
                bar_cnt += 1;
                bar_off = sym_norm2.len();
                if bar_off > 0 {
                    sym_norm2.push(' ');
                }
            } else {
                last_char_was_bar = false;
                sym_norm2.push(ch);
            }
        }
        if last_char_was_bar {
            sym_norm2.pop();
        }

        if let Some(pos) = sym_norm2
            .iter()
            .position(|&ch| !matches!(ch, '0'..='9' | '/' | '|' | ' '))
        {
            return Err(SymbolError::BadChar {
                pos,
                ch: sym_norm2[pos],
            });
        }

        if bar_cnt == 0 {
            return Err(SymbolError::MissingBar);
        } else if bar_cnt > 1 {
            return Err(SymbolError::MultipleBars);
        }

        let bar_pos = if bar_off == 0 {
            0
        } else if bar_off == sym_norm2.len() {
            3
        } else if space_after_bar > 0 {
            1
        } else {
            2
        };

        let mut total_spaces = space_before_bar + space_after_bar;
        // was | converted to space between two fractions
        if bar_pos == 1 || bar_pos == 2 {
            total_spaces += 1;
        }
        if total_spaces != 2 {
            return Err(SymbolError::WrongArity {
                got: total_spaces + 1,
            });
        }

        let joined: String = sym_norm2.iter().collect();
        let mut fracs = [Fraction { num: 2, den: 1 }; 3];
        for (f, token) in joined.split(' ').enumerate().take(3) {
            let (num_str, den_str) = match token.split_once('/') {
                Some((n, d)) => (n, Some(d)),
                None => (token, None),
            };

            let numerator: u32 =
                num_str
                    .parse()
                    .map_err(|_| SymbolError::BadNumerator {
                        index: f,
                        kind: FractionErrorKind::Unparsable,
                    })?;
            if numerator < 2 {
                return Err(SymbolError::BadNumerator {
                    index: f,
                    kind: FractionErrorKind::OutOfRange,
                });
            }

            let denominator: u32 = match den_str {
                Some(d) => d.parse().map_err(|_| SymbolError::BadDenominator {
                    index: f,
                    kind: FractionErrorKind::Unparsable,
                })?,
                None => 1,
            };
            if denominator % numerator == 0 {
                return Err(SymbolError::BadDenominator {
                    index: f,
                    kind: FractionErrorKind::Divisible,
                });
            }

            fracs[f] = Fraction {
                num: numerator,
                den: denominator % numerator,
            };
        }

        Ok(Self { fracs, bar_pos })
    }
}

impl fmt::Display for WythoffSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..3 {
            if self.bar_pos == i {
                write!(f, "|")?;
            } else if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", self.fracs[i as usize])?;
        }
        if self.bar_pos == 3 {
            write!(f, "|")?;
        }
        Ok(())
    }
}

/// Normal of the plane bisecting the triangle angle at `v0`.
fn angle_bisector_norm(v0: DVec3, v1: DVec3, v2: DVec3) -> DVec3 {
    let ang = angle_around_axis(v1, v2, v0);
    rotation_about(v0, ang / 2.0) * v0.cross(v1)
}

/// Fermat (equal-angle) point of a spherical triangle by fixed-point
/// iteration, plus the largest apex-angle deviation from 2π/3.
fn fermat_point(v: [DVec3; 3], degenerate: bool) -> (DVec3, f64) {
    let mut pt = (v[0] + v[1] + v[2]).normalize(); // approx centroid
    // Fixed large iteration count with a small step; degenerates are
    // sensitive and may produce different results with different params.
    let (iters, step) = if degenerate {
        (FERMAT_ITERS_DEGENERATE, FERMAT_STEP_DEGENERATE)
    } else {
        (FERMAT_ITERS, FERMAT_STEP)
    };
    for _ in 0..iters {
        let mut offset = DVec3::ZERO;
        for vi in v {
            offset += (pt * vi.dot(pt) - vi).normalize_or_zero();
        }
        pt = (pt + step * offset).normalize();
    }

    let mut max_delta = 0.0_f64;
    for i in 0..3 {
        let mut ang = angle_around_axis(v[i], v[(i + 1) % 3], pt);
        if ang > PI {
            ang = TAU - ang;
        }
        max_delta = max_delta.max((TAU / 3.0 - ang).abs());
    }
    (pt, max_delta)
}

/// Emit the star polygon `{num/den}` traced by `pt` around `axis`,
/// replicated under the group. A `{2/d}` digon is added as an edge element.
fn add_faces(
    geom: &mut Geometry,
    pt: DVec3,
    num: u32,
    den: u32,
    axis: DVec3,
    col: Color,
    sym: PointGroup,
) {
    // avoid extra windings
    let g = gcd(num, den);
    let (num, den) = (num / g, den / g);

    let ang = TAU * f64::from(den) / f64::from(num);
    let sides = num as usize;
    let mut face_geom = Geometry::new();
    for i in 0..sides {
        #[allow(clippy::cast_precision_loss)]
        face_geom.add_vert(rotation_about(axis, ang * i as f64) * pt);
    }
    if sides > 2 {
        face_geom.add_face_colored((0..sides).collect(), col);
    } else {
        face_geom.add_edge_colored([0, 1], col);
    }
    let mut sym_face_geom = sym_repeat(&face_geom, sym);
    sym_face_geom.merge_coincident_elements("vf", MERGE_EPSILON);
    geom.append(&sym_face_geom);
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}
