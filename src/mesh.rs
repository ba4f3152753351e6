//! Mesh containers: the tetrahedral primal mesh ([`TetMesh`])
//! and the polyhedral dual mesh ([`PolyMesh`]).

/// Low-level mesh construction and the shared test fixtures.
pub mod construction;

use std::collections::HashMap;

use crate::Vec3;

/// An unstructured tetrahedral volume mesh
/// with fully derived bidirectional connectivity
/// and named tag collections describing the geometric model.
///
/// Every cell is a tetrahedron and every face a triangle;
/// preconditions that depend on that are enforced by construction.
#[derive(Clone, Debug)]
pub struct TetMesh {
    /// Node positions.
    pub(crate) vertices: Vec<Vec3>,
    /// Node indices of each cell, sorted ascending.
    pub(crate) cell_nodes: Vec<[usize; 4]>,
    /// The four faces bounding each cell.
    pub(crate) cell_faces: Vec<[usize; 4]>,
    /// Node indices of each face, sorted ascending.
    pub(crate) face_nodes: Vec<[usize; 3]>,
    /// The three edges bounding each face.
    pub(crate) face_edges: Vec<[usize; 3]>,
    /// The cells on either side of each face;
    /// boundary faces have one side empty.
    pub(crate) face_cells: Vec<[Option<usize>; 2]>,
    /// Node indices of each edge, sorted ascending.
    pub(crate) edge_nodes: Vec<[usize; 2]>,
    /// Named entity-index collections per entity kind.
    pub(crate) tags: TagCollections,
}

/// Named tag collections mapping a feature name
/// to a list of entity indices per entity kind.
#[derive(Clone, Debug, Default)]
pub(crate) struct TagCollections {
    pub(crate) nodes: HashMap<String, Vec<usize>>,
    pub(crate) edges: HashMap<String, Vec<usize>>,
    pub(crate) faces: HashMap<String, Vec<usize>>,
}

impl TetMesh {
    /// Construct a tetrahedral mesh from raw vertices and indices.
    ///
    /// The indices are given as a flat array
    /// where every 4 indices correspond to one tetrahedron.
    /// Faces, edges and their bidirectional connectivity are derived here.
    ///
    /// # Panics
    ///
    /// Panics if an index is out of range
    /// or a face is claimed by more than two tetrahedra (non-manifold input).
    #[inline]
    pub fn new(vertices: Vec<Vec3>, indices: Vec<usize>) -> Self {
        construction::build_tet_mesh(vertices, indices)
    }

    /// Get the number of nodes in the mesh.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of edges in the mesh.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edge_nodes.len()
    }

    /// Get the number of triangular faces in the mesh.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.face_nodes.len()
    }

    /// Get the number of tetrahedral cells in the mesh.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cell_nodes.len()
    }

    /// Get the position of a node.
    #[inline]
    pub fn node_position(&self, node: usize) -> Vec3 {
        self.vertices[node]
    }

    /// Get the two node indices bounding an edge.
    #[inline]
    pub fn edge_nodes(&self, edge: usize) -> [usize; 2] {
        self.edge_nodes[edge]
    }

    /// Get the midpoint of an edge.
    #[inline]
    pub fn edge_midpoint(&self, edge: usize) -> Vec3 {
        let [a, b] = self.edge_nodes[edge];
        0.5 * (self.vertices[a] + self.vertices[b])
    }

    /// Get the three node indices of a face.
    #[inline]
    pub fn face_nodes(&self, face: usize) -> [usize; 3] {
        self.face_nodes[face]
    }

    /// Get the three edges bounding a face.
    #[inline]
    pub fn face_edges(&self, face: usize) -> [usize; 3] {
        self.face_edges[face]
    }

    /// Get the cells on either side of a face;
    /// the second (or both) entry is None for boundary faces.
    #[inline]
    pub fn face_cells(&self, face: usize) -> [Option<usize>; 2] {
        self.face_cells[face]
    }

    /// Get the centroid of a face.
    #[inline]
    pub fn face_center(&self, face: usize) -> Vec3 {
        let [a, b, c] = self.face_nodes[face];
        (self.vertices[a] + self.vertices[b] + self.vertices[c]) / 3.0
    }

    /// Get the four node indices of a cell.
    #[inline]
    pub fn cell_nodes(&self, cell: usize) -> [usize; 4] {
        self.cell_nodes[cell]
    }

    /// Get the four faces bounding a cell.
    #[inline]
    pub fn cell_faces(&self, cell: usize) -> [usize; 4] {
        self.cell_faces[cell]
    }

    /// Get the corner positions of a cell.
    #[inline]
    pub fn cell_points(&self, cell: usize) -> [Vec3; 4] {
        self.cell_nodes[cell].map(|n| self.vertices[n])
    }

    /// Find the face shared by two cells, if they are neighbors.
    pub fn cell_face_for_neighbor(&self, cell: usize, neighbor: usize) -> Option<usize> {
        self.cell_faces[cell].into_iter().find(|&face| {
            self.face_cells[face]
                .into_iter()
                .any(|c| c == Some(neighbor))
        })
    }

    /// Register a named tag over node indices.
    ///
    /// The tag can be referenced by name in [`DualConfig`][crate::DualConfig].
    pub fn tag_nodes(
        &mut self,
        name: impl Into<String>,
        indices: impl IntoIterator<Item = usize>,
    ) {
        self.tags.nodes.insert(name.into(), indices.into_iter().collect());
    }

    /// Register a named tag over edge indices.
    pub fn tag_edges(
        &mut self,
        name: impl Into<String>,
        indices: impl IntoIterator<Item = usize>,
    ) {
        self.tags.edges.insert(name.into(), indices.into_iter().collect());
    }

    /// Register a named tag over face indices.
    pub fn tag_faces(
        &mut self,
        name: impl Into<String>,
        indices: impl IntoIterator<Item = usize>,
    ) {
        self.tags.faces.insert(name.into(), indices.into_iter().collect());
    }

    /// Look up a node tag by name.
    pub fn node_tag(&self, name: &str) -> Option<&[usize]> {
        self.tags.nodes.get(name).map(Vec::as_slice)
    }

    /// Look up an edge tag by name.
    pub fn edge_tag(&self, name: &str) -> Option<&[usize]> {
        self.tags.edges.get(name).map(Vec::as_slice)
    }

    /// Look up a face tag by name.
    pub fn face_tag(&self, name: &str) -> Option<&[usize]> {
        self.tags.faces.get(name).map(Vec::as_slice)
    }
}

/// A polyhedral mesh with arbitrary polygonal faces,
/// produced by [`build_dual_mesh`][crate::build_dual_mesh].
///
/// Connectivity is stored as offset/index arrays:
/// each cell knows its bounding faces,
/// each face its bounding vertices and its (one or two) cells.
#[derive(Clone, Debug)]
pub struct PolyMesh {
    /// Vertex positions.
    pub(crate) vertices: Vec<Vec3>,
    /// Offsets into `cell_faces`; cell `c` owns `cell_faces[o[c]..o[c + 1]]`.
    pub(crate) cell_face_offsets: Vec<usize>,
    /// Face indices of all cells, back to back.
    pub(crate) cell_faces: Vec<usize>,
    /// Offsets into `face_vertices`; face `f` owns `face_vertices[o[f]..o[f + 1]]`.
    pub(crate) face_vertex_offsets: Vec<usize>,
    /// Vertex indices of all faces, back to back,
    /// in polygon boundary order per face.
    pub(crate) face_vertices: Vec<usize>,
    /// The cells on either side of each face;
    /// single-cell faces have the second slot empty.
    pub(crate) face_cells: Vec<[Option<usize>; 2]>,

    // derived geometry, computed by `finalize_geometry`
    pub(crate) face_centers: Vec<Vec3>,
    pub(crate) face_areas: Vec<f64>,
    pub(crate) face_normals: Vec<Vec3>,
    pub(crate) cell_centers: Vec<Vec3>,
    pub(crate) cell_volumes: Vec<f64>,
}

impl PolyMesh {
    /// Get the number of vertices in the mesh.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces in the mesh.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.face_cells.len()
    }

    /// Get the number of cells in the mesh.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cell_face_offsets.len() - 1
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn vertex_position(&self, vertex: usize) -> Vec3 {
        self.vertices[vertex]
    }

    /// Get the faces bounding a cell.
    #[inline]
    pub fn cell_faces(&self, cell: usize) -> &[usize] {
        &self.cell_faces[self.cell_face_offsets[cell]..self.cell_face_offsets[cell + 1]]
    }

    /// Get the vertex indices of a face in polygon boundary order.
    #[inline]
    pub fn face_vertices(&self, face: usize) -> &[usize] {
        &self.face_vertices[self.face_vertex_offsets[face]..self.face_vertex_offsets[face + 1]]
    }

    /// Get the cells on either side of a face.
    #[inline]
    pub fn face_cells(&self, face: usize) -> [Option<usize>; 2] {
        self.face_cells[face]
    }

    /// Get the centroid of a face.
    #[inline]
    pub fn face_center(&self, face: usize) -> Vec3 {
        self.face_centers[face]
    }

    /// Get the area of a face.
    #[inline]
    pub fn face_area(&self, face: usize) -> f64 {
        self.face_areas[face]
    }

    /// Get the unit normal of a face.
    ///
    /// The orientation is deterministic but otherwise arbitrary;
    /// face boundary orientations are not globally consistent.
    #[inline]
    pub fn face_normal(&self, face: usize) -> Vec3 {
        self.face_normals[face]
    }

    /// Get the centroid of a cell.
    #[inline]
    pub fn cell_center(&self, cell: usize) -> Vec3 {
        self.cell_centers[cell]
    }

    /// Get the volume of a cell.
    #[inline]
    pub fn cell_volume(&self, cell: usize) -> f64 {
        self.cell_volumes[cell]
    }

    /// Compute face centroids and areas, cell centroids and volumes.
    ///
    /// Faces are fan-triangulated about the vertex mean;
    /// cells are decomposed into pyramids from a cell reference point
    /// to each face, which is exact for cells star-shaped about that point.
    pub(crate) fn finalize_geometry(&mut self) {
        self.face_centers.clear();
        self.face_areas.clear();
        self.face_normals.clear();
        for face in 0..self.face_count() {
            let verts = self.face_vertices(face);
            let vertex_mean = verts
                .iter()
                .fold(Vec3::zeros(), |acc, &v| acc + self.vertices[v])
                / verts.len() as f64;

            // area-weighted centroid and area-vector sum over the triangle fan
            let mut area_weighted = Vec3::zeros();
            let mut area = 0.0;
            let mut area_vector = Vec3::zeros();
            for i in 0..verts.len() {
                let a = self.vertices[verts[i]];
                let b = self.vertices[verts[(i + 1) % verts.len()]];
                let cross = (a - vertex_mean).cross(&(b - vertex_mean));
                let tri_area = 0.5 * cross.norm();
                let tri_center = (vertex_mean + a + b) / 3.0;
                area_weighted += tri_area * tri_center;
                area += tri_area;
                area_vector += 0.5 * cross;
            }
            let center = if area > 0.0 {
                area_weighted / area
            } else {
                vertex_mean
            };
            let normal = if area_vector.norm() > 0.0 {
                area_vector.normalize()
            } else {
                Vec3::zeros()
            };
            self.face_centers.push(center);
            self.face_areas.push(area);
            self.face_normals.push(normal);
        }

        self.cell_centers.clear();
        self.cell_volumes.clear();
        for cell in 0..self.cell_count() {
            let faces = self.cell_faces(cell);
            let reference = faces
                .iter()
                .fold(Vec3::zeros(), |acc, &f| acc + self.face_centers[f])
                / faces.len() as f64;

            let mut volume = 0.0;
            let mut volume_weighted = Vec3::zeros();
            for &face in faces {
                let verts = self.face_vertices(face);
                for i in 0..verts.len() {
                    let a = self.vertices[verts[i]];
                    let b = self.vertices[verts[(i + 1) % verts.len()]];
                    let c = self.face_centers[face];
                    // unsigned volume of the tet (reference, a, b, c);
                    // unsigned because face boundary orientations are arbitrary
                    let tet_vol = ((a - reference)
                        .cross(&(b - reference))
                        .dot(&(c - reference))
                        / 6.0)
                        .abs();
                    let tet_center = (reference + a + b + c) / 4.0;
                    volume += tet_vol;
                    volume_weighted += tet_vol * tet_center;
                }
            }
            let center = if volume > 0.0 {
                volume_weighted / volume
            } else {
                reference
            };
            self.cell_centers.push(center);
            self.cell_volumes.push(volume);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use construction::tiny_tet_mesh;

    /// Derived connectivity of the 4-tet diamond mesh:
    /// entity counts, face sharing, and bidirectional consistency.
    #[test]
    fn tiny_mesh_connectivity_is_consistent() {
        let mesh = tiny_tet_mesh();

        assert_eq!(mesh.node_count(), 6);
        assert_eq!(mesh.cell_count(), 4);
        // 8 boundary triangles + 4 interior ones
        assert_eq!(mesh.face_count(), 12);
        // every vertex pair except (0, 3) and (4, 5) is an edge
        assert_eq!(mesh.edge_count(), 13);

        // exactly the 4 faces containing the shared edge (1, 2) are interior
        let interior_faces: Vec<usize> = (0..mesh.face_count())
            .filter(|&f| mesh.face_cells(f)[1].is_some())
            .collect();
        assert_eq!(interior_faces.len(), 4);
        for &f in &interior_faces {
            let nodes = mesh.face_nodes(f);
            assert!(nodes.contains(&1) && nodes.contains(&2));
        }

        // cell -> face -> cell round trips
        for cell in 0..mesh.cell_count() {
            for face in mesh.cell_faces(cell) {
                assert!(
                    mesh.face_cells(face).contains(&Some(cell)),
                    "face {face} does not know about cell {cell}"
                );
            }
        }

        // face -> edge -> node containment
        for face in 0..mesh.face_count() {
            let face_nodes = mesh.face_nodes(face);
            for edge in mesh.face_edges(face) {
                for node in mesh.edge_nodes(edge) {
                    assert!(face_nodes.contains(&node));
                }
            }
        }
    }

    /// Neighboring cells find their shared face; non-neighbors find none.
    #[test]
    fn neighbor_faces_are_found() {
        let mesh = tiny_tet_mesh();

        // cells 0 and 1 share the face (0, 1, 2)
        let shared = mesh.cell_face_for_neighbor(0, 1).unwrap();
        assert_eq!(mesh.face_nodes(shared), [0, 1, 2]);
        assert_eq!(mesh.cell_face_for_neighbor(1, 0), Some(shared));

        // cells 0 (top front) and 3 (bottom back) only share an edge
        assert_eq!(mesh.cell_face_for_neighbor(0, 3), None);
    }

    /// Tags round-trip through registration and lookup.
    #[test]
    fn tags_round_trip() {
        let mut mesh = tiny_tet_mesh();
        mesh.tag_faces("walls", [0, 3, 5]);
        mesh.tag_edges("sharp", [2]);
        mesh.tag_nodes("corners", [1, 4]);

        assert_eq!(mesh.face_tag("walls"), Some([0, 3, 5].as_slice()));
        assert_eq!(mesh.edge_tag("sharp"), Some([2].as_slice()));
        assert_eq!(mesh.node_tag("corners"), Some([1, 4].as_slice()));
        assert_eq!(mesh.face_tag("missing"), None);
    }
}
