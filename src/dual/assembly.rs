//! Assembly of the finished dual faces into a [`PolyMesh`]:
//! cell membership, offset-array connectivity and derived geometry.

use super::{
    faces::{DualFace, FaceOwner},
    DualizationContext,
};
use crate::mesh::PolyMesh;

/// Register every face with the dual cells it bounds
/// and pack the connectivity into the polyhedral mesh layout.
///
/// A face generated from a primal edge bounds the dual cells
/// of the edge's two nodes; a cap face bounds only its own node's cell.
pub(crate) fn assemble(ctx: &DualizationContext, faces: &[DualFace]) -> PolyMesh {
    let cell_count = ctx.plan.counts.cells;
    let mut faces_for_cell: Vec<Vec<usize>> = vec![Vec::new(); cell_count];
    let mut face_cells: Vec<[Option<usize>; 2]> = vec![[None, None]; faces.len()];

    for (face, dual_face) in faces.iter().enumerate() {
        let edge_nodes;
        let owners: &[usize] = match &dual_face.owner {
            FaceOwner::Edge(edge) => {
                edge_nodes = ctx.mesh.edge_nodes(*edge);
                &edge_nodes
            }
            FaceOwner::Cap(node) => std::slice::from_ref(node),
        };
        for (side, &node) in owners.iter().enumerate() {
            face_cells[face][side] = Some(node);
            faces_for_cell[node].push(face);
        }
    }

    let mut cell_face_offsets = Vec::with_capacity(cell_count + 1);
    let mut cell_faces = Vec::new();
    cell_face_offsets.push(0);
    for list in &faces_for_cell {
        cell_faces.extend_from_slice(list);
        cell_face_offsets.push(cell_faces.len());
    }

    let mut face_vertex_offsets = Vec::with_capacity(faces.len() + 1);
    let mut face_vertices = Vec::new();
    face_vertex_offsets.push(0);
    for dual_face in faces {
        face_vertices.extend_from_slice(&dual_face.vertices);
        face_vertex_offsets.push(face_vertices.len());
    }

    let mut dual = PolyMesh {
        vertices: ctx.vertices.positions.clone(),
        cell_face_offsets,
        cell_faces,
        face_vertex_offsets,
        face_vertices,
        face_cells,
        face_centers: Vec::new(),
        face_areas: Vec::new(),
        face_normals: Vec::new(),
        cell_centers: Vec::new(),
        cell_volumes: Vec::new(),
    };
    dual.finalize_geometry();
    dual
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dual::{faces, DualConfig};
    use crate::mesh::construction::tiny_tagged_box;

    /// Edge faces register with both endpoint cells, caps with one,
    /// and the offset arrays reproduce the per-cell lists exactly.
    #[test]
    fn face_registration_matches_owners() {
        let mesh = tiny_tagged_box();
        let config = DualConfig {
            external_face_tags: vec!["boundary".into()],
            internal_face_tags: vec![],
            edge_tags: vec!["sharp".into()],
            vertex_tags: vec!["corners".into()],
        };
        let ctx = DualizationContext::prepare(&mesh, &config).unwrap();
        let built = faces::build(&ctx);
        let dual = assemble(&ctx, &built);

        assert_eq!(dual.face_count(), built.len());
        for (face, dual_face) in built.iter().enumerate() {
            assert_eq!(dual.face_vertices(face), dual_face.vertices.as_slice());
            let sides = dual.face_cells(face);
            match dual_face.owner {
                faces::FaceOwner::Edge(edge) => {
                    let [a, b] = mesh.edge_nodes(edge);
                    assert_eq!(sides, [Some(a), Some(b)]);
                }
                faces::FaceOwner::Cap(node) => {
                    assert_eq!(sides, [Some(node), None]);
                }
            }
            for cell in sides.into_iter().flatten() {
                assert!(dual.cell_faces(cell).contains(&face));
            }
        }
    }
}
