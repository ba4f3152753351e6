//! Resolution of the tag configuration into feature index sets.

use fixedbitset as fb;

use super::{DualConfig, DualMeshError};
use crate::mesh::TetMesh;

/// Index sets of the tagged model features and their derived corollaries.
///
/// Node classification follows a strict precedence:
/// a feature vertex is removed from the face-node and edge-node sets,
/// and a face tagged both external and internal counts as external only.
pub(crate) struct FeatureSets {
    /// Faces on the external domain boundary.
    pub external_faces: fb::FixedBitSet,
    /// Faces on internal material interfaces.
    pub internal_faces: fb::FixedBitSet,
    /// Tagged feature edges.
    pub feature_edges: fb::FixedBitSet,
    /// Tagged feature vertices.
    pub feature_vertices: fb::FixedBitSet,
    /// Cells adjacent to an external face.
    pub boundary_tets: fb::FixedBitSet,
    /// Cells adjacent to an internal face.
    pub interior_boundary_tets: fb::FixedBitSet,
    /// Edges bounding an external face.
    pub external_face_edges: fb::FixedBitSet,
    /// Edges bounding an internal face.
    pub internal_face_edges: fb::FixedBitSet,
    /// Nodes on a tagged face, feature vertices excluded.
    pub boundary_face_nodes: fb::FixedBitSet,
    /// Nodes on a feature edge, feature vertices excluded.
    pub feature_edge_nodes: fb::FixedBitSet,
}

/// Resolve the configured tag names against the mesh
/// and fold them into feature sets.
pub(crate) fn classify(
    mesh: &TetMesh,
    config: &DualConfig,
) -> Result<FeatureSets, DualMeshError> {
    let external = resolve_tags("external face", &config.external_face_tags, |name| {
        mesh.face_tag(name)
    })?;
    let internal = resolve_optional_tags("internal face", &config.internal_face_tags, |name| {
        mesh.face_tag(name)
    })?;
    let edges = resolve_tags("edge", &config.edge_tags, |name| mesh.edge_tag(name))?;
    let vertices = resolve_tags("vertex", &config.vertex_tags, |name| mesh.node_tag(name))?;

    let mut sets = FeatureSets {
        external_faces: fb::FixedBitSet::with_capacity(mesh.face_count()),
        internal_faces: fb::FixedBitSet::with_capacity(mesh.face_count()),
        feature_edges: fb::FixedBitSet::with_capacity(mesh.edge_count()),
        feature_vertices: fb::FixedBitSet::with_capacity(mesh.node_count()),
        boundary_tets: fb::FixedBitSet::with_capacity(mesh.cell_count()),
        interior_boundary_tets: fb::FixedBitSet::with_capacity(mesh.cell_count()),
        external_face_edges: fb::FixedBitSet::with_capacity(mesh.edge_count()),
        internal_face_edges: fb::FixedBitSet::with_capacity(mesh.edge_count()),
        boundary_face_nodes: fb::FixedBitSet::with_capacity(mesh.node_count()),
        feature_edge_nodes: fb::FixedBitSet::with_capacity(mesh.node_count()),
    };

    for &face in &external {
        sets.external_faces.insert(face);
        for cell in mesh.face_cells(face).into_iter().flatten() {
            sets.boundary_tets.insert(cell);
        }
        for edge in mesh.face_edges(face) {
            sets.external_face_edges.insert(edge);
        }
        for node in mesh.face_nodes(face) {
            sets.boundary_face_nodes.insert(node);
        }
    }

    for &face in &internal {
        // a face tagged both ways is treated as an external boundary face
        if sets.external_faces.contains(face) {
            continue;
        }
        sets.internal_faces.insert(face);
        for cell in mesh.face_cells(face).into_iter().flatten() {
            sets.interior_boundary_tets.insert(cell);
        }
        for edge in mesh.face_edges(face) {
            sets.internal_face_edges.insert(edge);
        }
        for node in mesh.face_nodes(face) {
            sets.boundary_face_nodes.insert(node);
        }
    }

    for &edge in &edges {
        sets.feature_edges.insert(edge);
        for node in mesh.edge_nodes(edge) {
            sets.feature_edge_nodes.insert(node);
        }
    }

    // feature vertices last: vertex status dominates
    // edge and face membership for node classification
    for &node in &vertices {
        sets.feature_vertices.insert(node);
        sets.boundary_face_nodes.set(node, false);
        sets.feature_edge_nodes.set(node, false);
    }

    Ok(sets)
}

fn resolve_tags<'m>(
    kind: &'static str,
    names: &[String],
    lookup: impl Fn(&str) -> Option<&'m [usize]>,
) -> Result<Vec<usize>, DualMeshError> {
    if names.is_empty() {
        return Err(DualMeshError::MissingTagList { kind });
    }
    resolve_optional_tags(kind, names, lookup)
}

fn resolve_optional_tags<'m>(
    kind: &'static str,
    names: &[String],
    lookup: impl Fn(&str) -> Option<&'m [usize]>,
) -> Result<Vec<usize>, DualMeshError> {
    let mut indices = Vec::new();
    for name in names {
        let resolved = lookup(name).ok_or_else(|| DualMeshError::UnknownTag {
            kind,
            name: name.clone(),
        })?;
        if resolved.is_empty() {
            return Err(DualMeshError::EmptyTag {
                kind,
                name: name.clone(),
            });
        }
        indices.extend_from_slice(resolved);
    }
    Ok(indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::construction::{tiny_tagged_box, tiny_tagged_box_with_interface};

    fn box_config() -> DualConfig {
        DualConfig {
            external_face_tags: vec!["boundary".into()],
            internal_face_tags: vec![],
            edge_tags: vec!["sharp".into()],
            vertex_tags: vec!["corners".into()],
        }
    }

    /// Feature vertices are removed from the node sets,
    /// so the 8 box corners leave 18 of the 26 boundary nodes classified.
    #[test]
    fn feature_vertices_dominate_node_classification() {
        let mesh = tiny_tagged_box();
        let sets = classify(&mesh, &box_config()).unwrap();

        assert_eq!(sets.feature_vertices.count_ones(..), 8);
        assert_eq!(sets.boundary_face_nodes.count_ones(..), 18);
        assert_eq!(sets.feature_edge_nodes.count_ones(..), 18);
        for node in sets.feature_vertices.ones() {
            assert!(!sets.boundary_face_nodes.contains(node));
            assert!(!sets.feature_edge_nodes.contains(node));
        }

        // every cell of the 2x2x2 box touches the boundary
        assert_eq!(sets.boundary_tets.count_ones(..), mesh.cell_count());
        assert_eq!(sets.interior_boundary_tets.count_ones(..), 0);
    }

    /// The interface plane classifies its 16 adjacent cells
    /// and its edges without disturbing the external sets.
    #[test]
    fn interface_faces_classify_interior_cells() {
        let mesh = tiny_tagged_box_with_interface();
        let config = DualConfig {
            internal_face_tags: vec!["interface".into()],
            ..box_config()
        };
        let sets = classify(&mesh, &config).unwrap();

        assert_eq!(sets.internal_faces.count_ones(..), 8);
        assert_eq!(sets.interior_boundary_tets.count_ones(..), 16);
        assert_eq!(sets.external_faces.count_ones(..), 48);
        // 16 edges in the interface plane, 8 of them on the box walls
        assert_eq!(sets.internal_face_edges.count_ones(..), 16);
        let overlap = (0..mesh.edge_count())
            .filter(|&e| {
                sets.internal_face_edges.contains(e) && sets.external_face_edges.contains(e)
            })
            .count();
        assert_eq!(overlap, 8);
    }

    /// A face listed under both external and internal tags
    /// counts as external only.
    #[test]
    fn external_classification_wins_for_doubly_tagged_faces() {
        let mut mesh = tiny_tagged_box();
        let boundary = mesh.face_tag("boundary").unwrap().to_vec();
        mesh.tag_faces("walls_again", boundary.clone());
        let config = DualConfig {
            internal_face_tags: vec!["walls_again".into()],
            ..box_config()
        };
        let sets = classify(&mesh, &config).unwrap();

        assert_eq!(sets.external_faces.count_ones(..), boundary.len());
        assert_eq!(sets.internal_faces.count_ones(..), 0);
        assert_eq!(sets.interior_boundary_tets.count_ones(..), 0);
    }
}
