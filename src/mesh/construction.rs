//! Derivation of faces, edges and bidirectional connectivity
//! from raw tetrahedron indices, and the shared test fixture meshes.

use std::collections::HashMap;

use super::{TagCollections, TetMesh};
use crate::Vec3;

/// Construct a tetrahedral mesh from raw vertices and indices.
///
/// The indices are given as a flat array
/// where every 4 indices correspond to one tetrahedron.
pub(crate) fn build_tet_mesh(vertices: Vec<Vec3>, indices: Vec<usize>) -> TetMesh {
    assert!(
        indices.len() % 4 == 0,
        "tetrahedron index count must be a multiple of 4"
    );
    let cell_count = indices.len() / 4;

    // by convention, sort cell indices to have their nodes in ascending order.
    // this identifies every sub-simplex with its sorted vertex set
    let cell_nodes: Vec<[usize; 4]> = indices
        .chunks_exact(4)
        .map(|chunk| {
            let mut nodes = [chunk[0], chunk[1], chunk[2], chunk[3]];
            for &node in &nodes {
                assert!(node < vertices.len(), "node index {node} out of range");
            }
            nodes.sort_unstable();
            assert!(
                nodes[0] != nodes[1] && nodes[1] != nodes[2] && nodes[2] != nodes[3],
                "degenerate tetrahedron with repeated nodes"
            );
            nodes
        })
        .collect();

    //
    // derive faces by sorting and deduplicating cell boundaries
    //

    let mut face_entries: Vec<([usize; 3], usize)> = Vec::with_capacity(cell_count * 4);
    for (cell, nodes) in cell_nodes.iter().enumerate() {
        // every triple of a cell's nodes is one of its faces
        for exclude in 0..4 {
            let mut tri = [0; 3];
            let mut slot = 0;
            for (i, &node) in nodes.iter().enumerate() {
                if i != exclude {
                    tri[slot] = node;
                    slot += 1;
                }
            }
            face_entries.push((tri, cell));
        }
    }
    face_entries.sort_unstable();

    let mut face_nodes: Vec<[usize; 3]> = Vec::new();
    let mut face_cells: Vec<[Option<usize>; 2]> = Vec::new();
    let mut cell_faces = vec![[usize::MAX; 4]; cell_count];
    let mut cell_face_slots = vec![0_usize; cell_count];

    let mut i = 0;
    while i < face_entries.len() {
        let (tri, _) = face_entries[i];
        let face = face_nodes.len();
        face_nodes.push(tri);
        let mut sides = [None, None];
        let mut side = 0;
        while i < face_entries.len() && face_entries[i].0 == tri {
            let cell = face_entries[i].1;
            assert!(
                side < 2,
                "face {tri:?} is shared by more than two tetrahedra; input mesh is not manifold"
            );
            sides[side] = Some(cell);
            side += 1;
            cell_faces[cell][cell_face_slots[cell]] = face;
            cell_face_slots[cell] += 1;
            i += 1;
        }
        face_cells.push(sides);
    }

    //
    // derive edges from face boundaries the same way
    //

    let mut edge_entries: Vec<([usize; 2], usize)> = Vec::with_capacity(face_nodes.len() * 3);
    for (face, &[a, b, c]) in face_nodes.iter().enumerate() {
        edge_entries.push(([a, b], face));
        edge_entries.push(([a, c], face));
        edge_entries.push(([b, c], face));
    }
    edge_entries.sort_unstable();

    let mut edge_nodes: Vec<[usize; 2]> = Vec::new();
    let mut face_edges = vec![[usize::MAX; 3]; face_nodes.len()];
    let mut face_edge_slots = vec![0_usize; face_nodes.len()];

    let mut i = 0;
    while i < edge_entries.len() {
        let (pair, _) = edge_entries[i];
        let edge = edge_nodes.len();
        edge_nodes.push(pair);
        while i < edge_entries.len() && edge_entries[i].0 == pair {
            let face = edge_entries[i].1;
            face_edges[face][face_edge_slots[face]] = edge;
            face_edge_slots[face] += 1;
            i += 1;
        }
    }

    TetMesh {
        vertices,
        cell_nodes,
        cell_faces,
        face_nodes,
        face_edges,
        face_cells,
        edge_nodes,
        tags: TagCollections::default(),
    }
}

//
// test fixtures
//

/// Four tetrahedra around a shared horizontal edge:
/// two triangles in the z = 0 plane, an apex above and an apex below.
/// The smallest mesh with a complete interior fan,
/// used for the connectivity and adjacency unit tests.
///
/// Public for use in doctests and hidden from docs.
#[doc(hidden)]
pub fn tiny_tet_mesh() -> TetMesh {
    let vertices = vec![
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(-0.5, 0.0, 0.0),
        Vec3::new(0.5, 0.0, 0.0),
        Vec3::new(0.0, -1.0, 0.0),
        Vec3::new(0.0, 0.0, -1.0),
        Vec3::new(0.0, 0.0, 1.0),
    ];
    #[rustfmt::skip]
    let indices = vec![
        0, 1, 2, 4,
        0, 1, 2, 5,
        1, 2, 3, 4,
        1, 2, 3, 5,
    ];
    TetMesh::new(vertices, indices)
}

/// The position of the box lattice point `(i, j, k)`.
///
/// The lattice is warped by a smooth sinusoidal displacement.
/// On a regular grid, every tetrahedron of the Kuhn subdivision
/// has its circumcenter exactly at the center of its cube,
/// collapsing all six dual vertices of a cube onto one point;
/// the warp breaks that symmetry and keeps them pairwise distinct.
///
/// Public for use in doctests and hidden from docs.
#[doc(hidden)]
pub fn box_lattice_position(i: usize, j: usize, k: usize) -> Vec3 {
    const W: f64 = 0.15;
    let (x, y, z) = (i as f64, j as f64, k as f64);
    Vec3::new(
        x + W * (1.3 * y + 2.1 * z).sin(),
        y + W * (1.7 * z + 2.3 * x).sin(),
        z + W * (1.9 * x + 2.9 * y).sin(),
    )
}

fn lattice_coords(node: usize, extents: [usize; 3]) -> [usize; 3] {
    let [_, ny, nz] = extents;
    let k = node % (nz + 1);
    let rest = node / (nz + 1);
    [rest / (ny + 1), rest % (ny + 1), k]
}

/// A warped box of `nx * ny * nz` unit-lattice cubes,
/// each subdivided into 6 tetrahedra along a main diagonal
/// (the Kuhn subdivision, mirrored per cube parity:
/// neighboring cubes reflect each other across their shared face,
/// which keeps the square-face diagonals conforming).
///
/// With even extents the mirroring puts a cube diagonal endpoint
/// at every lattice point of even coordinates,
/// so each boundary edge of the box has at least two incident tetrahedra —
/// a uniformly oriented subdivision leaves boundary edges
/// whose entire cell fan is a single tetrahedron,
/// which no dual face can be built around.
/// Node positions come from [`box_lattice_position`].
///
/// Public for use in doctests and hidden from docs, like [`tiny_tet_mesh`].
#[doc(hidden)]
pub fn box_tet_mesh(nx: usize, ny: usize, nz: usize) -> TetMesh {
    let node_id = |i: usize, j: usize, k: usize| (i * (ny + 1) + j) * (nz + 1) + k;

    let mut vertices = Vec::with_capacity((nx + 1) * (ny + 1) * (nz + 1));
    for i in 0..=nx {
        for j in 0..=ny {
            for k in 0..=nz {
                vertices.push(box_lattice_position(i, j, k));
            }
        }
    }

    // each tetrahedron is a monotone path of axis steps
    // from one diagonal corner of a cube to the opposite one
    const AXIS_ORDERS: [[usize; 3]; 6] = [
        [0, 1, 2],
        [0, 2, 1],
        [1, 0, 2],
        [1, 2, 0],
        [2, 0, 1],
        [2, 1, 0],
    ];

    let mut indices = Vec::with_capacity(nx * ny * nz * 6 * 4);
    for i in 0..nx {
        for j in 0..ny {
            for k in 0..nz {
                let base = [i, j, k];
                let flip = [i % 2 == 1, j % 2 == 1, k % 2 == 1];
                let corner_id = |local: [usize; 3]| {
                    let mut global = [0; 3];
                    for axis in 0..3 {
                        global[axis] = if flip[axis] {
                            base[axis] + 1 - local[axis]
                        } else {
                            base[axis] + local[axis]
                        };
                    }
                    node_id(global[0], global[1], global[2])
                };
                for order in AXIS_ORDERS {
                    let mut local = [0; 3];
                    indices.push(corner_id(local));
                    for axis in order {
                        local[axis] += 1;
                        indices.push(corner_id(local));
                    }
                }
            }
        }
    }

    TetMesh::new(vertices, indices)
}

/// The number of cells containing both nodes of each edge,
/// used by the fixture tagging helpers below.
fn edge_cell_counts(mesh: &TetMesh) -> Vec<usize> {
    let edge_ids: HashMap<[usize; 2], usize> = (0..mesh.edge_count())
        .map(|edge| (mesh.edge_nodes(edge), edge))
        .collect();

    let mut counts = vec![0_usize; mesh.edge_count()];
    for cell in 0..mesh.cell_count() {
        // cell nodes are sorted, so every pair is already in edge key order
        let nodes = mesh.cell_nodes(cell);
        for i in 0..4 {
            for j in i + 1..4 {
                counts[edge_ids[&[nodes[i], nodes[j]]]] += 1;
            }
        }
    }
    counts
}

/// Tag `"boundary"` over all one-sided faces of the mesh
/// and `"sharp"` over the boundary edges with exactly two incident cells.
/// A two-cell boundary edge contributes only two cell vertices to its
/// dual face, so it needs the midpoint vertex a feature edge gets.
fn tag_boundary_surface(mesh: &mut TetMesh) {
    let boundary_faces: Vec<usize> = (0..mesh.face_count())
        .filter(|&f| mesh.face_cells(f)[1].is_none())
        .collect();

    let on_boundary_face = {
        let mut on = vec![false; mesh.edge_count()];
        for &face in &boundary_faces {
            for edge in mesh.face_edges(face) {
                on[edge] = true;
            }
        }
        on
    };
    let cell_counts = edge_cell_counts(mesh);
    let sharp_edges: Vec<usize> = (0..mesh.edge_count())
        .filter(|&e| on_boundary_face[e] && cell_counts[e] == 2)
        .collect();

    mesh.tag_faces("boundary", boundary_faces);
    mesh.tag_edges("sharp", sharp_edges);
}

/// Tag the geometric model of a [`box_tet_mesh`]:
/// `"boundary"` and `"sharp"` per [`tag_boundary_surface`]
/// and `"corners"` for the eight box corners.
/// On the coarse 2x2x2 box every boundary edge has exactly
/// two incident cells, so the whole boundary edge set is sharp;
/// larger even extents leave wall-interior edges with four-cell fans
/// out of the sharp set.
///
/// Public for use in doctests and hidden from docs.
#[doc(hidden)]
pub fn tag_box_model(mesh: &mut TetMesh, extents: [usize; 3]) {
    tag_boundary_surface(mesh);

    let corners: Vec<usize> = (0..mesh.node_count())
        .filter(|&n| {
            lattice_coords(n, extents)
                .iter()
                .zip(extents)
                .all(|(&coord, extent)| coord == 0 || coord == extent)
        })
        .collect();
    mesh.tag_nodes("corners", corners);
}

/// A fully tagged 2x2x2 [`box_tet_mesh`],
/// the smallest box fixture accepted by the whole dualization pipeline.
///
/// Public for use in doctests and hidden from docs.
#[doc(hidden)]
pub fn tiny_tagged_box() -> TetMesh {
    let mut mesh = box_tet_mesh(2, 2, 2);
    tag_box_model(&mut mesh, [2, 2, 2]);
    mesh
}

/// A tagged 4x2x2 [`box_tet_mesh`].
/// Unlike the coarse [`tiny_tagged_box`], its walls have lattice edges
/// with four incident cells (not sharp, general boundary path)
/// and boundary nodes whose cap patches span more than one face.
///
/// Public for use in doctests and hidden from docs.
#[doc(hidden)]
pub fn wide_tagged_box() -> TetMesh {
    let mut mesh = box_tet_mesh(4, 2, 2);
    tag_box_model(&mut mesh, [4, 2, 2]);
    mesh
}

/// A tagged 2x2x2 box with an internal material interface
/// on the lattice plane `k = 1`.
/// The interface's diagonal edges join the `"sharp"` tag:
/// they have only two incident cells per side,
/// so their split dual faces need the midpoint vertex to reach three.
///
/// Public for use in doctests and hidden from docs.
#[doc(hidden)]
pub fn tiny_tagged_box_with_interface() -> TetMesh {
    let extents = [2, 2, 2];
    let mut mesh = box_tet_mesh(2, 2, 2);
    tag_box_model(&mut mesh, extents);

    let on_interface = |node: usize| lattice_coords(node, extents)[2] == 1;
    let interface_faces: Vec<usize> = (0..mesh.face_count())
        .filter(|&f| mesh.face_nodes(f).iter().all(|&n| on_interface(n)))
        .collect();

    let mut sharp: Vec<usize> = mesh.edge_tag("sharp").unwrap().to_vec();
    for edge in 0..mesh.edge_count() {
        let [a, b] = mesh.edge_nodes(edge);
        if !on_interface(a) || !on_interface(b) {
            continue;
        }
        let [ia, ja, _] = lattice_coords(a, extents);
        let [ib, jb, _] = lattice_coords(b, extents);
        let diagonal = ia != ib && ja != jb;
        if diagonal && !sharp.contains(&edge) {
            sharp.push(edge);
        }
    }

    mesh.tag_faces("interface", interface_faces);
    mesh.tag_edges("sharp", sharp);
    mesh
}

/// An irregular octahedron of 8 tetrahedra sharing a center node,
/// fully tagged (`"boundary"`, `"sharp"`, `"corners"` on the six apexes).
///
/// Every boundary edge has exactly two incident cells
/// and every interior edge a closed four-cell fan,
/// and the eight clamped circumcenters are pairwise distinct,
/// so the dual is free of the collapsed vertices and zero-area faces
/// the box fixtures produce; use this fixture to test dual geometry.
///
/// Public for use in doctests and hidden from docs.
#[doc(hidden)]
pub fn tagged_octahedron() -> TetMesh {
    let vertices = vec![
        Vec3::new(0.05, -0.02, 0.04),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(-0.8, 0.1, 0.0),
        Vec3::new(0.0, 1.2, -0.1),
        Vec3::new(0.1, -0.7, 0.0),
        Vec3::new(0.0, 0.1, 0.9),
        Vec3::new(-0.1, 0.0, -1.1),
    ];
    // one tetrahedron per octant: the center node with one apex per axis
    let mut indices = Vec::with_capacity(8 * 4);
    for x_apex in [1, 2] {
        for y_apex in [3, 4] {
            for z_apex in [5, 6] {
                indices.extend_from_slice(&[0, x_apex, y_apex, z_apex]);
            }
        }
    }
    let mut mesh = TetMesh::new(vertices, indices);
    tag_boundary_surface(&mut mesh);
    mesh.tag_nodes("corners", 1..=6);
    mesh
}

/// Three tetrahedra filling a triangular prism,
/// all of them sharing the prism's interior diagonal edge.
/// That edge is a boundary edge with a three-cell fan,
/// the smallest case where a boundary dual face has a middle cell.
///
/// Other boundary edges of this mesh have single-cell fans,
/// so only the face-builder stage can be driven on it, not the full build.
/// Public for use in doctests and hidden from docs.
#[doc(hidden)]
pub fn tet_fan_prism() -> TetMesh {
    let vertices = vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(0.0, 0.0, 1.0),
        Vec3::new(1.0, 0.0, 1.0),
        Vec3::new(0.0, 1.0, 1.0),
    ];
    #[rustfmt::skip]
    let indices = vec![
        3, 4, 5, 0,
        4, 5, 0, 1,
        5, 0, 1, 2,
    ];
    let mut mesh = TetMesh::new(vertices, indices);
    tag_boundary_surface(&mut mesh);
    mesh.tag_nodes("corners", [0]);
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Entity counts of the mirrored Kuhn box subdivision:
    /// verified against hand counts of grid edges, diagonals,
    /// and boundary triangles for the 2x2x2 case.
    #[test]
    fn box_mesh_has_expected_populations() {
        let mesh = box_tet_mesh(2, 2, 2);

        assert_eq!(mesh.node_count(), 27);
        assert_eq!(mesh.cell_count(), 48);
        // 54 grid edges + 36 square diagonals + 8 cube diagonals
        assert_eq!(mesh.edge_count(), 98);
        // (48 * 4 + 48 boundary triangles) / 2
        assert_eq!(mesh.face_count(), 120);

        let boundary_count = (0..mesh.face_count())
            .filter(|&f| mesh.face_cells(f)[1].is_none())
            .count();
        assert_eq!(boundary_count, 48);
    }

    /// Every cell of a box mesh has positive volume
    /// and each face is properly registered with its cells.
    #[test]
    fn box_mesh_cells_are_proper_tets() {
        let mesh = box_tet_mesh(1, 2, 3);
        for cell in 0..mesh.cell_count() {
            let [a, b, c, d] = mesh.cell_points(cell);
            let vol = (b - a).cross(&(c - a)).dot(&(d - a)).abs() / 6.0;
            assert!(vol > 0.0, "cell {cell} is degenerate");
            for face in mesh.cell_faces(cell) {
                assert!(mesh.face_cells(face).contains(&Some(cell)));
            }
        }
        // 6 tets per unit cube
        assert_eq!(mesh.cell_count(), 6 * 6);
    }

    /// With even extents, every boundary edge of the mirrored subdivision
    /// has at least two incident cells, and its two boundary faces
    /// belong to different cells; a dual face can be built around each.
    #[test]
    fn even_boxes_have_no_degenerate_boundary_edges() {
        for mesh in [box_tet_mesh(2, 2, 2), box_tet_mesh(4, 2, 2)] {
            let cell_counts = edge_cell_counts(&mesh);
            for face in 0..mesh.face_count() {
                if mesh.face_cells(face)[1].is_some() {
                    continue;
                }
                for edge in mesh.face_edges(face) {
                    assert!(
                        cell_counts[edge] >= 2,
                        "boundary edge {edge} has a single-cell fan"
                    );
                    let surface_cells: Vec<usize> = (0..mesh.face_count())
                        .filter(|&f| {
                            mesh.face_cells(f)[1].is_none() && mesh.face_edges(f).contains(&edge)
                        })
                        .map(|f| mesh.face_cells(f)[0].unwrap())
                        .collect();
                    assert_eq!(surface_cells.len(), 2);
                    assert_ne!(surface_cells[0], surface_cells[1]);
                }
            }
        }
    }

    /// Per-edge cell counts on the diamond mesh:
    /// the central edge sees all four cells, outer edges one or two,
    /// and each cell contributes to exactly its six edges.
    #[test]
    fn edge_cell_counts_match_fan_sizes() {
        let mesh = tiny_tet_mesh();
        let counts = edge_cell_counts(&mesh);
        let edge = |a: usize, b: usize| {
            (0..mesh.edge_count())
                .find(|&e| mesh.edge_nodes(e) == [a, b])
                .unwrap()
        };

        assert_eq!(counts[edge(1, 2)], 4);
        assert_eq!(counts[edge(0, 1)], 2);
        assert_eq!(counts[edge(0, 4)], 1);
        assert_eq!(counts.iter().sum::<usize>(), 6 * mesh.cell_count());
    }

    /// The box model tagging marks the expected populations on a 2x2x2 box:
    /// the box is so coarse that all 72 boundary edges
    /// (24 frame + 24 wall diagonals + 24 wall grid edges) are two-cell.
    #[test]
    fn box_model_tags_have_expected_sizes() {
        let mesh = tiny_tagged_box();

        assert_eq!(mesh.face_tag("boundary").unwrap().len(), 48);
        assert_eq!(mesh.edge_tag("sharp").unwrap().len(), 72);
        assert_eq!(mesh.node_tag("corners").unwrap().len(), 8);
    }

    /// The wide box leaves its four-cell wall edges out of the sharp set.
    #[test]
    fn wide_box_has_unsharp_wall_edges() {
        let mesh = wide_tagged_box();

        assert_eq!(mesh.face_tag("boundary").unwrap().len(), 80);
        // 120 boundary edges, 8 of them with four-cell fans
        assert_eq!(mesh.edge_tag("sharp").unwrap().len(), 112);
    }

    /// The interface fixture tags the 8 triangles of the `k = 1` plane
    /// and extends the sharp set with the plane's four diagonals.
    #[test]
    fn interface_tags_have_expected_sizes() {
        let mesh = tiny_tagged_box_with_interface();

        assert_eq!(mesh.face_tag("interface").unwrap().len(), 8);
        assert_eq!(mesh.edge_tag("sharp").unwrap().len(), 76);
    }

    /// Octahedron connectivity: one tet per octant around the center node,
    /// a closed four-cell fan on each center-apex edge.
    #[test]
    fn octahedron_has_expected_populations() {
        let mesh = tagged_octahedron();

        assert_eq!(mesh.node_count(), 7);
        assert_eq!(mesh.cell_count(), 8);
        // 6 center-apex edges + 12 apex-apex edges
        assert_eq!(mesh.edge_count(), 18);
        // 8 boundary triangles + 12 interior ones
        assert_eq!(mesh.face_count(), 20);
        assert_eq!(mesh.face_tag("boundary").unwrap().len(), 8);
        assert_eq!(mesh.edge_tag("sharp").unwrap().len(), 12);
    }
}
