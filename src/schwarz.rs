//! The 44 spherical Schwarz triangles.
//!
//! Each entry pairs a sorted fraction triple with the three unit vectors of
//! the triangle's vertices, in closed form over the golden ratio and the
//! square roots of 2, 3 and phi+2. Dihedral triangles (middle numerator 2)
//! are not tabulated; their vertices follow from a rotation about Z.

use std::sync::LazyLock;

use glam::DVec3;

use crate::fraction::{Fraction, normalize_triple, tri_symmetry};
use crate::symmetry::{PointGroup, rotation_about};

/// Number of spherical Schwarz triangles.
pub const NUM_SCHWARZ_TRIS: usize = 44;

pub(crate) struct SchwarzTriangle {
    pub fracs: [Fraction; 3],
    pub verts: [DVec3; 3],
}

static SCHWARZ_TRIANGLES: LazyLock<Vec<SchwarzTriangle>> = LazyLock::new(build_table);

#[allow(clippy::too_many_lines)]
fn build_table() -> Vec<SchwarzTriangle> {
    let phi = f64::midpoint(1.0, 5.0_f64.sqrt());
    let s2 = 1.0 / 2.0_f64.sqrt();
    let s3 = 1.0 / 3.0_f64.sqrt();
    let p3 = phi / 3.0_f64.sqrt();
    let q3 = (phi - 1.0) / 3.0_f64.sqrt();
    let ip = 1.0 / (phi + 2.0).sqrt();
    let pp = phi / (phi + 2.0).sqrt();
    let hp = 0.5 / phi;
    let ph = phi / 2.0;

    let entry = |fr: [(u32, u32); 3], v: [[f64; 3]; 3]| SchwarzTriangle {
        fracs: fr.map(|(n, d)| Fraction::new(n, d)),
        verts: v.map(|c| DVec3::new(c[0], c[1], c[2])),
    };

    vec![
        // 0
        entry(
            [(2, 1), (3, 1), (3, 1)],
            [[0.0, 1.0, 0.0], [s3, s3, -s3], [s3, s3, s3]],
        ),
        // 1
        entry(
            [(2, 1), (3, 1), (3, 2)],
            [[0.0, 1.0, 0.0], [s3, -s3, s3], [s3, s3, -s3]],
        ),
        // 2
        entry(
            [(2, 1), (3, 1), (4, 1)],
            [[s2, s2, 0.0], [s3, s3, s3], [1.0, 0.0, 0.0]],
        ),
        // 3
        entry(
            [(2, 1), (3, 1), (4, 3)],
            [[s2, s2, 0.0], [-s3, -s3, -s3], [1.0, 0.0, 0.0]],
        ),
        // 4
        entry(
            [(2, 1), (3, 1), (5, 1)],
            [[hp, ph, 0.5], [s3, s3, s3], [0.0, ip, pp]],
        ),
        // 5
        entry(
            [(2, 1), (3, 1), (5, 2)],
            [[0.5, -hp, ph], [p3, q3, 0.0], [0.0, ip, pp]],
        ),
        // 6
        entry(
            [(2, 1), (3, 1), (5, 3)],
            [[0.0, 1.0, 0.0], [p3, -q3, 0.0], [0.0, ip, pp]],
        ),
        // 7
        entry(
            [(2, 1), (3, 1), (5, 4)],
            [[hp, ph, 0.5], [0.0, -p3, -q3], [0.0, ip, pp]],
        ),
        // 8
        entry(
            [(2, 1), (3, 2), (3, 2)],
            [[0.0, -1.0, 0.0], [s3, s3, -s3], [s3, s3, s3]],
        ),
        // 9
        entry(
            [(2, 1), (3, 2), (4, 1)],
            [[-s2, s2, 0.0], [-s3, s3, -s3], [1.0, 0.0, 0.0]],
        ),
        // 10
        entry(
            [(2, 1), (3, 2), (4, 3)],
            [[-s2, 0.0, -s2], [s3, s3, s3], [1.0, 0.0, 0.0]],
        ),
        // 11
        entry(
            [(2, 1), (3, 2), (5, 1)],
            [[hp, -ph, -0.5], [s3, -s3, -s3], [0.0, ip, pp]],
        ),
        // 12
        entry(
            [(2, 1), (3, 2), (5, 2)],
            [[0.5, hp, -ph], [p3, -q3, 0.0], [0.0, ip, pp]],
        ),
        // 13
        entry(
            [(2, 1), (3, 2), (5, 3)],
            [[0.0, -1.0, 0.0], [p3, q3, 0.0], [0.0, ip, pp]],
        ),
        // 14
        entry(
            [(2, 1), (3, 2), (5, 4)],
            [[-0.5, -hp, -ph], [s3, s3, s3], [0.0, ip, pp]],
        ),
        // 15
        entry(
            [(2, 1), (5, 1), (5, 2)],
            [[hp, ph, 0.5], [-ip, pp, 0.0], [0.0, ip, pp]],
        ),
        // 16
        entry(
            [(2, 1), (5, 1), (5, 3)],
            [[hp, ph, 0.5], [ip, -pp, 0.0], [0.0, ip, pp]],
        ),
        // 17
        entry(
            [(2, 1), (5, 2), (5, 4)],
            [[hp, -ph, -0.5], [0.0, ip, pp], [-ip, -pp, 0.0]],
        ),
        // 18
        entry(
            [(2, 1), (5, 3), (5, 4)],
            [[hp, -ph, -0.5], [0.0, ip, pp], [ip, pp, 0.0]],
        ),
        // 19
        entry(
            [(3, 1), (3, 1), (3, 2)],
            [[s3, s3, -s3], [s3, -s3, s3], [s3, s3, s3]],
        ),
        // 20
        entry(
            [(3, 1), (3, 1), (5, 2)],
            [[s3, s3, s3], [q3, 0.0, p3], [0.0, ip, pp]],
        ),
        // 21
        entry(
            [(3, 1), (3, 1), (5, 4)],
            [[p3, q3, 0.0], [-s3, -s3, s3], [0.0, ip, pp]],
        ),
        // 22
        entry(
            [(3, 1), (3, 2), (5, 1)],
            [[p3, -q3, 0.0], [p3, q3, 0.0], [0.0, ip, pp]],
        ),
        // 23
        entry(
            [(3, 1), (3, 2), (5, 3)],
            [[0.0, -p3, -q3], [s3, s3, s3], [0.0, ip, pp]],
        ),
        // 24
        entry(
            [(3, 1), (4, 1), (4, 3)],
            [[s3, s3, -s3], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]],
        ),
        // 25
        entry(
            [(3, 1), (5, 1), (5, 3)],
            [[s3, s3, s3], [0.0, -ip, pp], [0.0, ip, pp]],
        ),
        // 26
        entry(
            [(3, 1), (5, 1), (5, 4)],
            [[s3, s3, s3], [-ip, -pp, 0.0], [0.0, ip, pp]],
        ),
        // 27
        entry(
            [(3, 1), (5, 2), (5, 3)],
            [[p3, -q3, 0.0], [0.0, ip, pp], [ip, pp, 0.0]],
        ),
        // 28
        entry(
            [(3, 1), (5, 2), (5, 4)],
            [[s3, -s3, -s3], [0.0, ip, pp], [ip, pp, 0.0]],
        ),
        // 29
        entry(
            [(3, 2), (3, 2), (3, 2)],
            [[s3, s3, -s3], [s3, -s3, s3], [-s3, s3, s3]],
        ),
        // 30
        entry(
            [(3, 2), (3, 2), (5, 2)],
            [[s3, -s3, -s3], [q3, 0.0, -p3], [0.0, ip, pp]],
        ),
        // 31
        entry(
            [(3, 2), (3, 2), (5, 4)],
            [[p3, -q3, 0.0], [-s3, s3, -s3], [0.0, ip, pp]],
        ),
        // 32
        entry(
            [(3, 2), (4, 1), (4, 1)],
            [[s3, s3, -s3], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]],
        ),
        // 33
        entry(
            [(3, 2), (4, 3), (4, 3)],
            [[s3, s3, -s3], [0.0, -1.0, 0.0], [0.0, 0.0, 1.0]],
        ),
        // 34
        entry(
            [(3, 2), (5, 1), (5, 1)],
            [[s3, s3, s3], [0.0, ip, pp], [ip, pp, 0.0]],
        ),
        // 35
        entry(
            [(3, 2), (5, 1), (5, 2)],
            [[s3, s3, s3], [ip, -pp, 0.0], [0.0, ip, pp]],
        ),
        // 36
        entry(
            [(3, 2), (5, 2), (5, 2)],
            [[p3, q3, 0.0], [0.0, ip, pp], [ip, -pp, 0.0]],
        ),
        // 37
        entry(
            [(3, 2), (5, 3), (5, 3)],
            [[s3, s3, -s3], [0.0, ip, pp], [ip, -pp, 0.0]],
        ),
        // 38
        entry(
            [(3, 2), (5, 3), (5, 4)],
            [[s3, -s3, -s3], [0.0, ip, pp], [0.0, ip, -pp]],
        ),
        // 39
        entry(
            [(3, 2), (5, 4), (5, 4)],
            [[s3, -s3, -s3], [0.0, ip, pp], [-ip, pp, 0.0]],
        ),
        // 40
        entry(
            [(5, 1), (5, 1), (5, 4)],
            [[0.0, ip, pp], [ip, -pp, 0.0], [0.0, -ip, pp]],
        ),
        // 41
        entry(
            [(5, 2), (5, 2), (5, 2)],
            [[0.0, ip, pp], [ip, pp, 0.0], [-ip, pp, 0.0]],
        ),
        // 42
        entry(
            [(5, 2), (5, 3), (5, 3)],
            [[ip, -pp, 0.0], [0.0, ip, pp], [ip, pp, 0.0]],
        ),
        // 43
        entry(
            [(5, 4), (5, 4), (5, 4)],
            [[0.0, ip, pp], [ip, -pp, 0.0], [0.0, ip, -pp]],
        ),
    ]
}

/// Vertex vectors for a lexicographically sorted fraction triple, or `None`
/// when the triple is not a spherical Schwarz triangle.
pub(crate) fn normalized_tri_verts(norm_fracs: &[Fraction; 3]) -> Option<[DVec3; 3]> {
    if norm_fracs[1].num == 2 {
        // Dihedral: fundamental triangle sits on the equator and pole
        let f = norm_fracs[2];
        let rot = rotation_about(
            DVec3::Z,
            std::f64::consts::PI * f64::from(f.den) / f64::from(f.num),
        );
        Some([DVec3::X, rot * DVec3::X, DVec3::Z])
    } else {
        SCHWARZ_TRIANGLES
            .iter()
            .find(|tri| tri.fracs == *norm_fracs)
            .map(|tri| tri.verts)
    }
}

/// Vertex vectors matching the given (unsorted) fraction order.
pub(crate) fn assign_vertices(fracs: [Fraction; 3]) -> Option<[DVec3; 3]> {
    let mut norm = fracs;
    let mut positions = [0usize, 1, 2];
    normalize_triple(&mut norm, &mut positions);
    let norm_verts = normalized_tri_verts(&norm)?;
    let mut verts = [DVec3::ZERO; 3];
    for i in 0..3 {
        verts[positions[i]] = norm_verts[i];
    }
    Some(verts)
}

/// Vertex points of a Schwarz triangle and its symmetry group, with vertices
/// following the order of the given fractions.
#[must_use]
pub fn schwarz_tri_verts(fracs: [Fraction; 3]) -> Option<([DVec3; 3], PointGroup)> {
    let verts = assign_vertices(fracs)?;
    let sym = tri_symmetry(fracs)?;
    Some((verts, sym))
}

/// Fraction triple of Schwarz triangle `idx` (0..44).
#[must_use]
pub fn schwarz_tri_fracs(idx: usize) -> Option<[Fraction; 3]> {
    SCHWARZ_TRIANGLES.get(idx).map(|tri| tri.fracs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fr(n: u32, d: u32) -> Fraction {
        Fraction::new(n, d)
    }

    #[test]
    fn test_table_size_and_order() {
        assert_eq!(SCHWARZ_TRIANGLES.len(), NUM_SCHWARZ_TRIS);
        // Keys strictly increasing: sorted and duplicate-free
        for pair in SCHWARZ_TRIANGLES.windows(2) {
            assert!(pair[0].fracs < pair[1].fracs);
        }
    }

    #[test]
    fn test_all_verts_are_unit() {
        for tri in SCHWARZ_TRIANGLES.iter() {
            for v in tri.verts {
                assert!((v.length() - 1.0).abs() < 1e-12, "{:?}", tri.fracs);
            }
        }
    }

    #[test]
    fn test_vertex_angles_match_fractions() {
        // The spherical angle at vertex i must be pi * d_i / n_i.
        for tri in SCHWARZ_TRIANGLES.iter() {
            for i in 0..3 {
                let v0 = tri.verts[i];
                let v1 = tri.verts[(i + 1) % 3];
                let v2 = tri.verts[(i + 2) % 3];
                let t1 = (v1 - v0 * v0.dot(v1)).normalize();
                let t2 = (v2 - v0 * v0.dot(v2)).normalize();
                let ang = t1.dot(t2).clamp(-1.0, 1.0).acos();
                let expect = std::f64::consts::PI * f64::from(tri.fracs[i].den)
                    / f64::from(tri.fracs[i].num);
                assert!(
                    (ang - expect).abs() < 1e-9,
                    "{:?} corner {i}: angle {ang} expected {expect}",
                    tri.fracs
                );
            }
        }
    }

    #[test]
    fn test_lookup_not_in_table() {
        assert!(normalized_tri_verts(&[fr(3, 1), fr(3, 1), fr(3, 1)]).is_none());
        assert!(normalized_tri_verts(&[fr(2, 1), fr(3, 1), fr(7, 1)]).is_none());
    }

    #[test]
    fn test_dihedral_analytic() {
        let verts = normalized_tri_verts(&[fr(2, 1), fr(2, 1), fr(7, 2)]).unwrap();
        assert_eq!(verts[0], DVec3::X);
        assert_eq!(verts[2], DVec3::Z);
        let expected = std::f64::consts::PI * 2.0 / 7.0;
        let ang = verts[0].dot(verts[1]).clamp(-1.0, 1.0).acos();
        assert!((ang - expected).abs() < 1e-12);
    }

    #[test]
    fn test_assignment_follows_fraction_order() {
        // (5 3 2) is a permutation of table entry (2 3 5); each vertex must
        // follow its own fraction through the permutation.
        let permuted = assign_vertices([fr(5, 1), fr(3, 1), fr(2, 1)]).unwrap();
        let sorted = assign_vertices([fr(2, 1), fr(3, 1), fr(5, 1)]).unwrap();
        assert_eq!(permuted[0], sorted[2]);
        assert_eq!(permuted[1], sorted[1]);
        assert_eq!(permuted[2], sorted[0]);
    }

    #[test]
    fn test_verts_with_symmetry() {
        let (verts, sym) = schwarz_tri_verts([fr(2, 1), fr(3, 1), fr(5, 1)]).unwrap();
        assert_eq!(sym, PointGroup::Icosahedral);
        assert!(verts.iter().all(|v| (v.length() - 1.0).abs() < 1e-12));

        let (_, sym) = schwarz_tri_verts([fr(2, 1), fr(2, 1), fr(9, 2)]).unwrap();
        assert_eq!(sym, PointGroup::Dihedral(9));

        assert!(schwarz_tri_verts([fr(3, 1), fr(3, 1), fr(3, 1)]).is_none());
    }

    #[test]
    fn test_tri_fracs_accessor() {
        assert_eq!(
            schwarz_tri_fracs(0),
            Some([fr(2, 1), fr(3, 1), fr(3, 1)])
        );
        assert!(schwarz_tri_fracs(NUM_SCHWARZ_TRIS).is_none());
    }
}
