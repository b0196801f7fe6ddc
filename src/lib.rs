//! # `poly_weave`
//!
//! Wythoff constructions and **symbolic pattern-driven tilings** on
//! polyhedra: build uniform polyhedra from classical Wythoff symbols, or
//! rewrite any polyhedron with Conway operators expressed as tile
//! patterns.
//!
//! ## What is this?
//!
//! Every polyhedron has a **meta triangulation**: its barycentric
//! subdivision, where each triangle touches one vertex (V), one edge
//! center (E) and one face center (F) of the base. A *tile pattern* such
//! as `[F,V]0_1v1v,1E` names points in V/E/F barycentric coordinates and
//! walks the triangle adjacency graph with mirror words, emitting a face
//! whenever a circuit closes. All the classical Conway operators (dual,
//! ambo, kis, truncate, snub, ...) are such patterns, and arbitrary new
//! operators can be written inline.
//!
//! Independently, the classical **Wythoff symbol** interpreter builds
//! uniform polyhedra from triangle-group symbols like `2 | 3 5` or
//! `| 2 3 5`, using the tabulated 44 spherical Schwarz triangles.
//!
//! ## Quick Start
//!
//! ```rust
//! use poly_weave::{ColoringType, WythoffSymbol, wythoff_make_tiling};
//!
//! // Classical Wythoff construction: 2 | 3 5 is the icosidodecahedron
//! let sym: WythoffSymbol = "2 | 3 5".parse()?;
//! let built = sym.make_poly()?;
//! assert_eq!(built.geom.vert_count(), 30);
//! assert_eq!(built.geom.face_count(), 32);
//!
//! // Conway operators are tile patterns applied to any base polyhedron;
//! // the dual of the icosidodecahedron is the rhombic triacontahedron
//! let dual = wythoff_make_tiling(&built.geom, "d", true, false, ColoringType::None)?;
//! assert_eq!(dual.vert_count(), 32);
//! assert_eq!(dual.face_count(), 30);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Key Features
//!
//! - **Wythoff symbols**: all four bar positions, star fractions, the
//!   snub (Fermat point) construction with its degenerate special cases
//! - **Tile patterns**: parse, serialize, relabel and reverse the
//!   `[points]paths` mini-language
//! - **Conway operators**: 26 named operators plus the parametric
//!   families `mN MN oN eN bN gN sN`
//! - **Coloring**: by source path or by inherited base element
//! - **Open meshes**: circuits crossing an open boundary are dropped,
//!   everything else tiles normally
//!
//! ## When NOT to Use
//!
//! - Geometric post-processing (convex hulls, planarization, canonical
//!   forms) is out of scope; pair with a mesh-processing crate
//! - Patterns address topology only: face shapes follow the base metric
//!   and are not optimized afterwards

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod conway;
mod fraction;
mod geometry;
mod meta;
mod schwarz;
mod spatial_hash;
mod symmetry;
mod tile;
mod tiling;
mod wythoff;

pub use conway::{CONWAY_OPERATORS, ConwayOperator, conway_operators, conway_pattern};
pub use fraction::{Fraction, normalize_triple, tri_symmetry};
pub use geometry::{Color, Geometry, MERGE_EPSILON};
pub use meta::MetaTiling;
pub use schwarz::{NUM_SCHWARZ_TRIS, schwarz_tri_fracs, schwarz_tri_verts};
pub use symmetry::{PointGroup, sym_repeat};
pub use tile::{Corner, Inclusion, PatternPoint, SeedFaces, Tile, TileOp, TileReport};
pub use tiling::{ColoringType, Tiling, TilingError, wythoff_make_tiling};
pub use wythoff::{Construction, FractionErrorKind, SymbolError, WythoffError, WythoffSymbol};

/// Re-export glam types used in the public API
pub mod math {
    pub use glam::{DMat3, DVec3};
}
