//! Derivation of the adjacency relations the primal mesh does not store:
//! edge to incident cells, edge to incident faces,
//! and node to incident tagged faces.

use super::features::FeatureSets;
use crate::mesh::TetMesh;

/// Per-edge and per-node incidence lists.
///
/// The lists carry no ordering guarantee;
/// consumers needing a geometric order must sort at the point of use.
pub(crate) struct Adjacency {
    /// Cells incident to each edge.
    pub cells_for_edge: Vec<Vec<usize>>,
    /// Faces incident to each edge.
    pub faces_for_edge: Vec<Vec<usize>>,
    /// Tagged (external or internal) faces incident to each node;
    /// empty away from the model boundary.
    pub boundary_faces_for_node: Vec<Vec<usize>>,
}

/// Traverse every cell once and register it, its faces
/// and its tagged faces against the edges and nodes they touch.
pub(crate) fn build(mesh: &TetMesh, features: &FeatureSets) -> Adjacency {
    let mut adj = Adjacency {
        cells_for_edge: vec![Vec::new(); mesh.edge_count()],
        faces_for_edge: vec![Vec::new(); mesh.edge_count()],
        boundary_faces_for_node: vec![Vec::new(); mesh.node_count()],
    };

    for cell in 0..mesh.cell_count() {
        for face in mesh.cell_faces(cell) {
            for edge in mesh.face_edges(face) {
                push_unique(&mut adj.cells_for_edge[edge], cell);
                push_unique(&mut adj.faces_for_edge[edge], face);
            }
            if features.external_faces.contains(face) || features.internal_faces.contains(face) {
                for node in mesh.face_nodes(face) {
                    push_unique(&mut adj.boundary_faces_for_node[node], face);
                }
            }
        }
    }

    adj
}

fn push_unique(list: &mut Vec<usize>, item: usize) {
    if !list.contains(&item) {
        list.push(item);
    }
}
