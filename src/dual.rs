//! Construction of the dual polyhedral mesh of a tetrahedral mesh.
//!
//! The dual mesh has one cell per primal node,
//! one or two faces per primal edge plus cap faces closing the cells
//! along the tagged model boundary,
//! and vertices at primal cell circumcenters,
//! tagged face centers, tagged edge midpoints and tagged node positions.
//!
//! The pipeline runs in stages over a transient [`DualizationContext`]:
//! feature classification, adjacency derivation, population sizing,
//! vertex generation, face construction, and cell assembly.

mod adjacency;
mod assembly;
mod faces;
mod features;
mod sizing;
mod vertices;

use thiserror::Error;

use crate::mesh::{PolyMesh, TetMesh};

/// The tag names describing the geometric model of the primal mesh.
///
/// Each name must have been registered on the mesh
/// with the tag methods of [`TetMesh`].
/// External face, edge and vertex tag lists must be non-empty;
/// internal face tags may be empty for a mesh without material interfaces.
#[derive(Clone, Debug)]
pub struct DualConfig {
    /// Tags of faces on the external domain boundary.
    pub external_face_tags: Vec<String>,
    /// Tags of faces on internal material interfaces.
    pub internal_face_tags: Vec<String>,
    /// Tags of feature edges (sharp creases of the model).
    pub edge_tags: Vec<String>,
    /// Tags of feature vertices (corners of the model).
    pub vertex_tags: Vec<String>,
}

/// An error in the feature-tag configuration given to [`build_dual_mesh`].
///
/// All of these are detected before any dual entity is allocated.
/// Internal consistency violations, by contrast, are bugs and panic.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DualMeshError {
    /// A required tag list was left empty.
    #[error("no {kind} tags were given")]
    MissingTagList {
        /// The entity kind of the missing list.
        kind: &'static str,
    },
    /// A tag name is not registered on the mesh.
    #[error("unknown {kind} tag '{name}'")]
    UnknownTag {
        /// The entity kind the tag was given for.
        kind: &'static str,
        /// The unresolved tag name.
        name: String,
    },
    /// A tag resolved to zero entities.
    #[error("{kind} tag '{name}' does not resolve to any entities")]
    EmptyTag {
        /// The entity kind the tag was given for.
        kind: &'static str,
        /// The offending tag name.
        name: String,
    },
}

/// Scratch state shared by the pipeline stages,
/// owned by a single [`build_dual_mesh`] invocation.
pub(crate) struct DualizationContext<'m> {
    pub(crate) mesh: &'m TetMesh,
    pub(crate) features: features::FeatureSets,
    pub(crate) adjacency: adjacency::Adjacency,
    pub(crate) plan: sizing::SizingPlan,
    pub(crate) vertices: vertices::DualVertices,
}

impl<'m> DualizationContext<'m> {
    /// Run the classification, adjacency, sizing and vertex stages.
    pub(crate) fn prepare(
        mesh: &'m TetMesh,
        config: &DualConfig,
    ) -> Result<Self, DualMeshError> {
        let features = features::classify(mesh, config)?;
        log::debug!(
            "classified features: {} external faces, {} internal faces, {} edges, {} vertices",
            features.external_faces.count_ones(..),
            features.internal_faces.count_ones(..),
            features.feature_edges.count_ones(..),
            features.feature_vertices.count_ones(..),
        );
        let adjacency = adjacency::build(mesh, &features);
        let plan = sizing::predict(mesh, &features, &adjacency);
        log::debug!(
            "predicted dual populations: {} vertices, {} faces, {} cells",
            plan.counts.vertices,
            plan.counts.faces,
            plan.counts.cells,
        );
        let vertices = vertices::generate(mesh, &features, &plan.counts);
        Ok(Self {
            mesh,
            features,
            adjacency,
            plan,
            vertices,
        })
    }
}

/// Compute the dual polyhedral mesh of a tetrahedral mesh.
///
/// Returns an error if the tag configuration is malformed
/// (a required tag list empty, a tag unknown or resolving to no entities);
/// nothing is allocated in that case.
///
/// # Panics
///
/// Panics if the mesh geometry or tagging breaks a dualization invariant,
/// most commonly a dual face with fewer than 3 vertices
/// caused by an incompletely tagged model
/// (e.g. a sharp boundary edge missing from the edge tags).
pub fn build_dual_mesh(mesh: &TetMesh, config: &DualConfig) -> Result<PolyMesh, DualMeshError> {
    let ctx = DualizationContext::prepare(mesh, config)?;
    let faces = faces::build(&ctx);
    Ok(assembly::assemble(&ctx, &faces))
}
