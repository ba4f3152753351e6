//! Exact prediction of the dual populations before allocation.
//!
//! Every primal cell, tagged face, feature edge and feature vertex
//! generates one dual vertex; every primal edge generates one dual face,
//! or two if it lies inside an internal interface;
//! and every connected patch of tagged faces around a boundary node
//! generates one cap face.
//! The cap faces are planned here in full so that the predicted face count
//! is exact by construction; the face builder later consumes the same plan.

use super::{adjacency::Adjacency, features::FeatureSets};
use crate::mesh::TetMesh;

/// Predicted sizes of the dual populations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct DualCounts {
    pub vertices: usize,
    pub faces: usize,
    pub cells: usize,
}

/// One planned cap face closing the dual cell of `node`
/// against a connected patch of tagged faces.
#[derive(Clone, Debug)]
pub(crate) struct CapFacePlan {
    /// The primal node whose dual cell the cap belongs to.
    pub node: usize,
    /// The tagged faces of the patch, ascending.
    pub faces: Vec<usize>,
    /// The feature edges bounding the patch at the node, ascending.
    pub edges: Vec<usize>,
    /// Whether the node's own feature-vertex dual vertex joins the cap.
    pub include_node_vertex: bool,
}

/// The sizing result: exact counts plus the cap faces they account for.
pub(crate) struct SizingPlan {
    pub counts: DualCounts,
    pub cap_faces: Vec<CapFacePlan>,
}

pub(crate) fn predict(mesh: &TetMesh, features: &FeatureSets, adjacency: &Adjacency) -> SizingPlan {
    let vertices = mesh.cell_count()
        + features.external_faces.count_ones(..)
        + features.internal_faces.count_ones(..)
        + features.feature_edges.count_ones(..)
        + features.feature_vertices.count_ones(..);

    // edges inside an interface (not also on the external boundary)
    // get one face per side of the interface
    let mut edge_faces = 0;
    for edge in 0..mesh.edge_count() {
        let splits = features.internal_face_edges.contains(edge)
            && !features.external_face_edges.contains(edge);
        edge_faces += if splits { 2 } else { 1 };
    }

    let mut cap_faces = Vec::new();
    for node in 0..mesh.node_count() {
        plan_caps_for_node(
            mesh,
            features,
            node,
            &adjacency.boundary_faces_for_node[node],
            &mut cap_faces,
        );
    }

    let counts = DualCounts {
        vertices,
        faces: edge_faces + cap_faces.len(),
        cells: mesh.node_count(),
    };
    SizingPlan { counts, cap_faces }
}

/// Partition the tagged faces around a node into connected patches,
/// one planned cap face each.
///
/// Two faces continue the same patch through a shared edge at the node
/// only if the edge is a manifold continuation of the tagged surface:
/// not a feature edge, and contained in exactly two of the tagged faces.
/// Feature edges and branch edges close a patch off,
/// and the feature edges bounding a patch contribute their dual vertices
/// to its cap.
fn plan_caps_for_node(
    mesh: &TetMesh,
    features: &FeatureSets,
    node: usize,
    incident: &[usize],
    out: &mut Vec<CapFacePlan>,
) {
    if incident.is_empty() {
        return;
    }
    let mut incident = incident.to_vec();
    incident.sort_unstable();

    let connects = |edge: usize| {
        if features.feature_edges.contains(edge) {
            return false;
        }
        let tagged = incident
            .iter()
            .filter(|&&f| mesh.face_edges(f).contains(&edge))
            .count();
        tagged == 2
    };

    let mut visited = vec![false; incident.len()];
    for seed in 0..incident.len() {
        if visited[seed] {
            continue;
        }
        visited[seed] = true;
        let mut patch = vec![incident[seed]];
        let mut queue = vec![incident[seed]];
        while let Some(face) = queue.pop() {
            for edge in mesh.face_edges(face) {
                if !mesh.edge_nodes(edge).contains(&node) || !connects(edge) {
                    continue;
                }
                for (i, &other) in incident.iter().enumerate() {
                    if !visited[i] && mesh.face_edges(other).contains(&edge) {
                        visited[i] = true;
                        patch.push(other);
                        queue.push(other);
                    }
                }
            }
        }
        patch.sort_unstable();

        let mut bounding_edges = Vec::new();
        for &face in &patch {
            for edge in mesh.face_edges(face) {
                if mesh.edge_nodes(edge).contains(&node)
                    && features.feature_edges.contains(edge)
                    && !bounding_edges.contains(&edge)
                {
                    bounding_edges.push(edge);
                }
            }
        }
        bounding_edges.sort_unstable();

        out.push(CapFacePlan {
            node,
            faces: patch,
            edges: bounding_edges,
            include_node_vertex: features.feature_vertices.contains(node),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dual::{adjacency, features, DualConfig};
    use crate::mesh::construction::{box_lattice_position, tiny_tagged_box, wide_tagged_box};

    fn prepare(mesh: &TetMesh) -> SizingPlan {
        let config = DualConfig {
            external_face_tags: vec!["boundary".into()],
            internal_face_tags: vec![],
            edge_tags: vec!["sharp".into()],
            vertex_tags: vec!["corners".into()],
        };
        let sets = features::classify(mesh, &config).unwrap();
        let adj = adjacency::build(mesh, &sets);
        predict(mesh, &sets, &adj)
    }

    fn node_at(mesh: &TetMesh, position: crate::Vec3) -> usize {
        (0..mesh.node_count())
            .find(|&n| mesh.node_position(n) == position)
            .unwrap()
    }

    /// Predicted populations for the tagged 2x2x2 box,
    /// checked against hand counts.
    /// Vertices: 48 cells + 48 boundary faces + 72 sharp edges + 8 corners.
    /// Every boundary edge of this coarse box is sharp,
    /// so every boundary face is a patch of its own at each of its nodes:
    /// 6 caps per corner, 4 per frame midpoint, 8 per wall center,
    /// 144 in total on top of the 98 edge faces.
    #[test]
    fn box_populations_match_hand_counts() {
        let mesh = tiny_tagged_box();
        let plan = prepare(&mesh);

        assert_eq!(
            plan.counts,
            DualCounts {
                vertices: 176,
                faces: 98 + 144,
                cells: 27,
            }
        );
        assert_eq!(plan.cap_faces.len(), 144);
    }

    /// Sharp edges close cap patches off: a wall-center node of the coarse box
    /// has sharp edges on all sides, leaving each of its 8 incident wall faces
    /// a singleton patch bounded by two of them.
    #[test]
    fn feature_edges_split_cap_patches() {
        let mesh = tiny_tagged_box();
        let plan = prepare(&mesh);

        let wall_center = node_at(&mesh, box_lattice_position(1, 1, 0));
        let caps: Vec<&CapFacePlan> = plan
            .cap_faces
            .iter()
            .filter(|cap| cap.node == wall_center)
            .collect();

        assert_eq!(caps.len(), 8);
        for cap in caps {
            assert_eq!(cap.faces.len(), 1);
            assert_eq!(cap.edges.len(), 2);
            assert!(!cap.include_node_vertex);
        }
    }

    /// Unsharp wall edges merge neighboring tagged faces into one patch.
    /// On the wider box, the wall node between two four-cell wall edges
    /// has its four incident wall faces joined pairwise across them.
    #[test]
    fn manifold_edges_merge_cap_patches() {
        let mesh = wide_tagged_box();
        let plan = prepare(&mesh);

        let wall_node = node_at(&mesh, box_lattice_position(2, 1, 0));
        let caps: Vec<&CapFacePlan> = plan
            .cap_faces
            .iter()
            .filter(|cap| cap.node == wall_node)
            .collect();

        assert_eq!(caps.len(), 2);
        for cap in caps {
            assert_eq!(cap.faces.len(), 2);
            assert_eq!(cap.edges.len(), 2);
            assert!(!cap.include_node_vertex);
        }
    }

    /// Corner nodes carry their own dual vertex into every incident cap.
    #[test]
    fn corner_caps_include_the_corner_vertex() {
        let mesh = tiny_tagged_box();
        let plan = prepare(&mesh);

        let origin = node_at(&mesh, box_lattice_position(0, 0, 0));
        let caps: Vec<&CapFacePlan> = plan
            .cap_faces
            .iter()
            .filter(|cap| cap.node == origin)
            .collect();

        // every edge at this corner is sharp, so every face is its own patch
        assert_eq!(caps.len(), 6);
        for cap in caps {
            assert_eq!(cap.faces.len(), 1);
            assert_eq!(cap.edges.len(), 2);
            assert!(cap.include_node_vertex);
        }
    }
}