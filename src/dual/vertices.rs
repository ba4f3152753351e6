//! Generation of the dual vertices and the lookup tables
//! mapping primal entities to them.

use super::{features::FeatureSets, sizing::DualCounts};
use crate::{geometry, mesh::TetMesh, Vec3};

/// The dual vertex positions and the primal-to-dual lookup tables.
///
/// Vertices are emitted in a fixed category order,
/// ascending primal index within each category:
/// cells, external faces, internal faces, feature edges, feature vertices.
pub(crate) struct DualVertices {
    pub positions: Vec<Vec3>,
    /// Dual vertex of each tagged face, `None` for untagged faces.
    pub for_face: Vec<Option<usize>>,
    /// Dual vertex of each feature edge, `None` otherwise.
    pub for_edge: Vec<Option<usize>>,
    /// Dual vertex of each feature vertex node, `None` otherwise.
    pub for_node: Vec<Option<usize>>,
}

impl DualVertices {
    /// Dual vertex of a primal cell.
    /// Cells generate the first vertices in index order,
    /// so no lookup table is needed.
    #[inline]
    pub(crate) fn for_cell(&self, cell: usize) -> usize {
        cell
    }
}

pub(crate) fn generate(mesh: &TetMesh, features: &FeatureSets, counts: &DualCounts) -> DualVertices {
    let mut positions = Vec::with_capacity(counts.vertices);

    // cell vertices sit at the circumcenter,
    // pulled to the nearest point of the cell if it falls outside
    // (sliver tets put their circumcenter far away otherwise)
    for cell in 0..mesh.cell_count() {
        let points = mesh.cell_points(cell);
        let center = geometry::tet_circumcenter(&points)
            .unwrap_or_else(|| panic!("cell {cell} is degenerate and has no circumcenter"));
        positions.push(geometry::tet_closest_point(&points, center));
    }

    let mut for_face = vec![None; mesh.face_count()];
    for face in features.external_faces.ones() {
        for_face[face] = Some(positions.len());
        positions.push(mesh.face_center(face));
    }
    for face in features.internal_faces.ones() {
        for_face[face] = Some(positions.len());
        positions.push(mesh.face_center(face));
    }

    let mut for_edge = vec![None; mesh.edge_count()];
    for edge in features.feature_edges.ones() {
        for_edge[edge] = Some(positions.len());
        positions.push(mesh.edge_midpoint(edge));
    }

    let mut for_node = vec![None; mesh.node_count()];
    for node in features.feature_vertices.ones() {
        for_node[node] = Some(positions.len());
        positions.push(mesh.node_position(node));
    }

    assert!(
        positions.len() == counts.vertices,
        "emitted {} dual vertices, predicted {}. This is a bug in polydual",
        positions.len(),
        counts.vertices,
    );

    DualVertices {
        positions,
        for_face,
        for_edge,
        for_node,
    }
}
