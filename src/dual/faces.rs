//! Construction of the dual face boundaries.
//!
//! Every primal edge generates one dual face
//! bounded by the dual vertices of its incident cells
//! (plus its own midpoint vertex if it is a feature edge):
//! a closed polygon around an interior edge,
//! an open path between the two boundary cells for a boundary edge,
//! and two faces, one per side, for an edge inside an internal interface.
//! The ordering comes from walking the cell fan around the edge,
//! stepping cell to cell through their shared faces.
//! The cap faces planned by the sizing stage close the dual cells
//! along the tagged surfaces.

use super::{sizing::CapFacePlan, DualizationContext};
use crate::{geometry, Vec3};

/// The primal entity a dual face is generated from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FaceOwner {
    /// A primal edge; carried by up to two faces for interface edges.
    Edge(usize),
    /// A cap face closing the dual cell of a primal node.
    Cap(usize),
}

/// A dual face boundary before cell assembly.
pub(crate) struct DualFace {
    /// Dual vertex indices in polygon boundary order.
    pub vertices: Vec<usize>,
    pub owner: FaceOwner,
}

/// Build every dual face boundary in deterministic order:
/// one or two faces per primal edge ascending, then the planned caps.
pub(crate) fn build(ctx: &DualizationContext) -> Vec<DualFace> {
    let mut faces = Vec::with_capacity(ctx.plan.counts.faces);

    for edge in 0..ctx.mesh.edge_count() {
        if ctx.features.external_face_edges.contains(edge) {
            faces.push(boundary_edge_face(ctx, edge));
        } else if ctx.features.internal_face_edges.contains(edge) {
            let [near, far] = interface_edge_faces(ctx, edge);
            faces.push(near);
            faces.push(far);
        } else {
            faces.push(interior_edge_face(ctx, edge));
        }
    }
    for plan in &ctx.plan.cap_faces {
        faces.push(cap_face(ctx, plan));
    }

    assert!(
        faces.len() == ctx.plan.counts.faces,
        "emitted {} dual faces, predicted {}. This is a bug in polydual",
        faces.len(),
        ctx.plan.counts.faces,
    );
    for face in &faces {
        assert!(
            face.vertices.len() >= 3,
            "dual face for {:?} has fewer than 3 vertices; the model tagging may be incomplete",
            face.owner,
        );
    }

    faces
}

/// The two faces of a tetrahedron that contain the given edge.
/// Both of the cell's nodes off the edge span one such face with it.
fn cell_edge_faces(ctx: &DualizationContext, cell: usize, edge: usize) -> [usize; 2] {
    let mesh = ctx.mesh;
    let mut found = [usize::MAX; 2];
    let mut count = 0;
    for face in mesh.cell_faces(cell) {
        if mesh.face_edges(face).contains(&edge) {
            assert!(
                count < 2,
                "cell {cell} has more than two faces at edge {edge}. This is a bug in polydual"
            );
            found[count] = face;
            count += 1;
        }
    }
    assert!(
        count == 2,
        "cell {cell} does not contain edge {edge}. This is a bug in polydual"
    );
    found
}

/// The cell across a face from the given cell, if the face is interior.
fn cell_across(ctx: &DualizationContext, cell: usize, face: usize) -> Option<usize> {
    ctx.mesh
        .face_cells(face)
        .into_iter()
        .flatten()
        .find(|&c| c != cell)
}

/// The open path of cell vertices around a boundary edge,
/// walked face to face from the cell of one external surface face
/// to the cell of the other.
fn boundary_edge_face(ctx: &DualizationContext, edge: usize) -> DualFace {
    let mesh = ctx.mesh;
    let verts = &ctx.vertices;

    let mut surface_faces: Vec<usize> = ctx.adjacency.faces_for_edge[edge]
        .iter()
        .copied()
        .filter(|&f| ctx.features.external_faces.contains(f))
        .collect();
    surface_faces.sort_unstable();
    assert!(
        surface_faces.len() == 2,
        "boundary edge {edge} bounds {} external faces; \
         the tagged boundary is not a manifold surface",
        surface_faces.len(),
    );
    let endpoint_cell = |face: usize| {
        let [cell, other] = mesh.face_cells(face);
        assert!(
            other.is_none(),
            "face {face} tagged as an external boundary face is interior to the mesh"
        );
        cell.expect("every face has at least one cell. This is a bug in polydual")
    };
    let start = endpoint_cell(surface_faces[0]);
    let finish = endpoint_cell(surface_faces[1]);
    assert!(
        start != finish,
        "boundary edge {edge} touches the surface through a single cell; \
         its dual face would be degenerate"
    );

    let fan_size = ctx.adjacency.cells_for_edge[edge].len();
    let mut vertices = Vec::with_capacity(fan_size + 1);
    let mut cell = start;
    let mut behind = surface_faces[0];
    vertices.push(verts.for_cell(cell));
    loop {
        let ahead = cell_edge_faces(ctx, cell, edge)
            .into_iter()
            .find(|&f| f != behind)
            .expect("a tet has two faces at each of its edges. This is a bug in polydual");
        if ahead == surface_faces[1] {
            break;
        }
        cell = cell_across(ctx, cell, ahead).unwrap_or_else(|| {
            panic!(
                "the cell fan around boundary edge {edge} reaches an untagged boundary face; \
                 the external surface tags do not cover the mesh boundary"
            )
        });
        vertices.push(verts.for_cell(cell));
        behind = ahead;
    }
    assert!(
        vertices.len() == fan_size,
        "the walk around boundary edge {edge} visited {} of its {fan_size} cells. \
         This is a bug in polydual",
        vertices.len(),
    );

    if let Some(midpoint) = verts.for_edge[edge] {
        vertices.push(midpoint);
    }

    DualFace {
        vertices,
        owner: FaceOwner::Edge(edge),
    }
}

/// The closed cell cycle around an interior edge,
/// as `(cell, face crossed to the next cell)` pairs.
/// Starts at the lowest cell index and crosses its lower face first.
fn fan_cycle(ctx: &DualizationContext, edge: usize) -> Vec<(usize, usize)> {
    let fan = &ctx.adjacency.cells_for_edge[edge];
    let start = fan
        .iter()
        .copied()
        .min()
        .expect("every edge bounds at least one cell. This is a bug in polydual");

    let mut cycle = Vec::with_capacity(fan.len());
    let mut cell = start;
    let mut ahead = cell_edge_faces(ctx, cell, edge)
        .into_iter()
        .min()
        .expect("a tet has two faces at each of its edges. This is a bug in polydual");
    loop {
        cycle.push((cell, ahead));
        let next = cell_across(ctx, cell, ahead).unwrap_or_else(|| {
            panic!(
                "the cell fan around edge {edge} is open but its boundary faces are untagged; \
                 the external surface tags do not cover the mesh boundary"
            )
        });
        if next == start {
            break;
        }
        let behind = ahead;
        cell = next;
        ahead = cell_edge_faces(ctx, cell, edge)
            .into_iter()
            .find(|&f| f != behind)
            .expect("a tet has two faces at each of its edges. This is a bug in polydual");
    }
    assert!(
        cycle.len() == fan.len(),
        "the walk around edge {edge} visited {} of its {} cells. This is a bug in polydual",
        cycle.len(),
        fan.len(),
    );
    cycle
}

/// The closed polygon of cell vertices around an interior edge,
/// in cell fan order.
fn interior_edge_face(ctx: &DualizationContext, edge: usize) -> DualFace {
    let verts = &ctx.vertices;
    let vertices = fan_cycle(ctx, edge)
        .into_iter()
        .map(|(cell, _)| verts.for_cell(cell))
        .collect();

    DualFace {
        vertices,
        owner: FaceOwner::Edge(edge),
    }
}

/// The two dual faces of an edge inside an internal interface,
/// one per side.
///
/// The cell cycle around the edge is cut at the two steps
/// that cross an interface face,
/// and each of the resulting arcs becomes its own face.
/// The arcs are disjoint: the cells of one side never join
/// the face of the other.
fn interface_edge_faces(ctx: &DualizationContext, edge: usize) -> [DualFace; 2] {
    let verts = &ctx.vertices;
    let cycle = fan_cycle(ctx, edge);

    let splits: Vec<usize> = cycle
        .iter()
        .enumerate()
        .filter_map(|(i, &(_, ahead))| ctx.features.internal_faces.contains(ahead).then_some(i))
        .collect();
    assert!(
        splits.len() == 2,
        "the cell cycle around interface edge {edge} crosses the interface {} times, \
         expected exactly 2",
        splits.len(),
    );

    let n = cycle.len();
    let (s0, s1) = (splits[0], splits[1]);
    let near: Vec<usize> = (s0 + 1..=s1).map(|i| cycle[i].0).collect();
    let far: Vec<usize> = (s1 + 1..s1 + 1 + n - near.len())
        .map(|i| cycle[i % n].0)
        .collect();

    [near, far].map(|arc| {
        let mut vertices: Vec<usize> = arc.into_iter().map(|c| verts.for_cell(c)).collect();
        if let Some(midpoint) = verts.for_edge[edge] {
            vertices.push(midpoint);
        }
        DualFace {
            vertices,
            owner: FaceOwner::Edge(edge),
        }
    })
}

/// A planned cap face: the patch's face vertices,
/// its bounding feature-edge vertices
/// and the node's own vertex if it is a feature vertex,
/// wrapped into polygon order.
///
/// Caps have no cell fan to walk,
/// so their vertices are ordered by angle about the patch normal.
fn cap_face(ctx: &DualizationContext, plan: &CapFacePlan) -> DualFace {
    let verts = &ctx.vertices;

    let mut members: Vec<usize> = plan
        .faces
        .iter()
        .map(|&f| {
            verts.for_face[f].expect("tagged faces generate a dual vertex. This is a bug in polydual")
        })
        .collect();
    members.extend(plan.edges.iter().map(|&e| {
        verts.for_edge[e].expect("feature edges generate a dual vertex. This is a bug in polydual")
    }));
    if plan.include_node_vertex {
        members.push(
            verts.for_node[plan.node]
                .expect("feature vertices generate a dual vertex. This is a bug in polydual"),
        );
    }

    let points: Vec<Vec3> = members.iter().map(|&v| verts.positions[v]).collect();
    let vertices = geometry::wrap_ordering(&points)
        .into_iter()
        .map(|i| members[i])
        .collect();

    DualFace {
        vertices,
        owner: FaceOwner::Cap(plan.node),
    }
}
