//! Rotation point groups and symmetry replication.
//!
//! The Wythoff constructions emit one face per triangle corner and replicate
//! it under the rotation group of the fundamental triangle. Groups are
//! produced as explicit rotation matrices by closing a pair of generators;
//! the generator axes match the coordinate frames of the Schwarz vertex
//! table, so replicated orbits land exactly on the tiling.

use std::fmt;

use glam::{DMat3, DVec3};

use crate::geometry::Geometry;

/// Matrix entries closer than this are treated as the same group element.
const MAT_EPSILON: f64 = 1e-6;

/// A finite rotation group of the sphere.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointGroup {
    /// Rotations of the tetrahedron (order 12).
    Tetrahedral,
    /// Rotations of the octahedron/cube (order 24).
    Octahedral,
    /// Rotations of the icosahedron/dodecahedron (order 60).
    Icosahedral,
    /// `D_n`: n-fold axis on Z plus n perpendicular 2-fold axes (order 2n).
    Dihedral(u32),
}

impl PointGroup {
    /// Number of rotations in the group.
    #[must_use]
    pub const fn order(self) -> usize {
        match self {
            Self::Tetrahedral => 12,
            Self::Octahedral => 24,
            Self::Icosahedral => 60,
            Self::Dihedral(n) => 2 * n as usize,
        }
    }

    /// All rotations of the group, identity first.
    #[must_use]
    pub fn rotations(self) -> Vec<DMat3> {
        let phi = f64::midpoint(1.0, 5.0_f64.sqrt());
        let third = std::f64::consts::TAU / 3.0;
        let gens = match self {
            Self::Tetrahedral => [
                rotation_about(DVec3::Y, std::f64::consts::PI),
                rotation_about(DVec3::new(1.0, 1.0, -1.0), third),
            ],
            Self::Octahedral => [
                rotation_about(DVec3::X, std::f64::consts::FRAC_PI_2),
                rotation_about(DVec3::new(1.0, 1.0, 1.0), third),
            ],
            Self::Icosahedral => [
                rotation_about(DVec3::new(0.0, 1.0, phi), std::f64::consts::TAU / 5.0),
                rotation_about(DVec3::new(1.0, 1.0, 1.0), third),
            ],
            Self::Dihedral(n) => [
                rotation_about(DVec3::Z, std::f64::consts::TAU / f64::from(n.max(1))),
                rotation_about(DVec3::X, std::f64::consts::PI),
            ],
        };
        let elems = closure(&gens);
        debug_assert_eq!(elems.len(), self.order());
        elems
    }
}

impl fmt::Display for PointGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tetrahedral => write!(f, "T"),
            Self::Octahedral => write!(f, "O"),
            Self::Icosahedral => write!(f, "I"),
            Self::Dihedral(n) => write!(f, "D{n}"),
        }
    }
}

/// Close a generator set under multiplication.
fn closure(gens: &[DMat3; 2]) -> Vec<DMat3> {
    let mut elems = vec![DMat3::IDENTITY];
    let mut cursor = 0;
    while cursor < elems.len() {
        let m = elems[cursor];
        cursor += 1;
        for g in gens {
            let p = *g * m;
            if !elems.iter().any(|e| mats_close(*e, p)) {
                elems.push(p);
            }
        }
    }
    elems
}

fn mats_close(a: DMat3, b: DMat3) -> bool {
    (a.x_axis - b.x_axis).abs().max_element() < MAT_EPSILON
        && (a.y_axis - b.y_axis).abs().max_element() < MAT_EPSILON
        && (a.z_axis - b.z_axis).abs().max_element() < MAT_EPSILON
}

/// Rotation by `angle` about `axis` (normalized internally).
#[must_use]
pub fn rotation_about(axis: DVec3, angle: f64) -> DMat3 {
    DMat3::from_axis_angle(axis.normalize(), angle)
}

/// Reflection through the plane through the origin with the given normal.
#[must_use]
pub fn reflection(normal: DVec3) -> DMat3 {
    let n = normal.normalize();
    DMat3::from_cols(
        DVec3::X - 2.0 * n.x * n,
        DVec3::Y - 2.0 * n.y * n,
        DVec3::Z - 2.0 * n.z * n,
    )
}

/// Oriented angle in `[0, 2π)` around `axis` from `v0` to `v1`, measured on
/// the plane perpendicular to the axis.
#[must_use]
pub fn angle_around_axis(v0: DVec3, v1: DVec3, axis: DVec3) -> f64 {
    let a = axis.normalize();
    let u0 = v0 - a * v0.dot(a);
    let u1 = v1 - a * v1.dot(a);
    let ang = f64::atan2(u0.cross(u1).dot(a), u0.dot(u1));
    if ang < 0.0 {
        ang + std::f64::consts::TAU
    } else {
        ang
    }
}

/// Replicate a geometry under every rotation of a point group.
///
/// Coincident elements produced by axis stabilizers are kept; callers merge
/// them with [`Geometry::merge_coincident_elements`].
#[must_use]
pub fn sym_repeat(geom: &Geometry, group: PointGroup) -> Geometry {
    let mut out = Geometry::new();
    for rot in group.rotations() {
        let mut copy = geom.clone();
        copy.transform(rot);
        out.append(&copy);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_orders() {
        assert_eq!(PointGroup::Tetrahedral.rotations().len(), 12);
        assert_eq!(PointGroup::Octahedral.rotations().len(), 24);
        assert_eq!(PointGroup::Icosahedral.rotations().len(), 60);
        assert_eq!(PointGroup::Dihedral(5).rotations().len(), 10);
    }

    #[test]
    fn test_rotations_are_orthonormal() {
        for rot in PointGroup::Icosahedral.rotations() {
            assert!((rot.determinant() - 1.0).abs() < 1e-9);
            let should_be_identity = rot * rot.transpose();
            assert!(mats_close(should_be_identity, DMat3::IDENTITY));
        }
    }

    #[test]
    fn test_closure_is_a_group() {
        // Products of elements stay inside the element set.
        let elems = PointGroup::Tetrahedral.rotations();
        for a in &elems {
            for b in &elems {
                let p = *a * *b;
                assert!(elems.iter().any(|e| mats_close(*e, p)));
            }
        }
    }

    #[test]
    fn test_reflection_is_involutive() {
        let m = reflection(DVec3::new(1.0, 2.0, -0.5));
        assert!(mats_close(m * m, DMat3::IDENTITY));
        assert!((m.determinant() + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_angle_around_axis_quarter_turn() {
        let ang = angle_around_axis(DVec3::X, DVec3::Y, DVec3::Z);
        assert!((ang - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        // Opposite orientation comes out as 3π/2, not -π/2.
        let ang = angle_around_axis(DVec3::Y, DVec3::X, DVec3::Z);
        assert!((ang - 3.0 * std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }
}
