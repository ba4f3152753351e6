//! `polydual` computes the dual of an unstructured tetrahedral volume mesh:
//! the polyhedral complex whose cells surround the primal mesh's nodes,
//! whose faces surround the primal mesh's edges,
//! and whose vertices sit at primal cell circumcenters,
//! tagged boundary face centers, tagged edge midpoints,
//! and tagged vertex locations.
//!
//! The caller describes the geometric model with named tags on the primal mesh
//! (external boundary faces, internal interface faces, sharp edges, corners)
//! and gets back a [`PolyMesh`] whose cells are closed polyhedra,
//! one per primal node:
//!
//! ```
//! # use polydual::{build_dual_mesh, DualConfig};
//! # let mesh = polydual::mesh::construction::tiny_tagged_box();
//! let config = DualConfig {
//!     external_face_tags: vec!["boundary".into()],
//!     internal_face_tags: vec![],
//!     edge_tags: vec!["sharp".into()],
//!     vertex_tags: vec!["corners".into()],
//! };
//! let dual = build_dual_mesh(&mesh, &config)?;
//! assert_eq!(dual.cell_count(), mesh.node_count());
//! # Ok::<(), polydual::DualMeshError>(())
//! ```

#![warn(missing_docs)]

pub mod mesh;
#[doc(inline)]
pub use mesh::{PolyMesh, TetMesh};

pub mod geometry;

pub mod dual;
#[doc(inline)]
pub use dual::{build_dual_mesh, DualConfig, DualMeshError};

// nalgebra re-exports of common types for convenience

pub use nalgebra as na;
/// Type alias for a 3D `nalgebra` vector.
pub type Vec3 = na::Vector3<f64>;
