//! Low-level geometric primitives consumed by the dualization pipeline:
//! tetrahedron circumcenters, closest-point queries,
//! and planar orderings of near-planar point sets.

use nalgebra as na;

use crate::Vec3;

/// Compute the circumcenter of a tetrahedron,
/// i.e. the center of the sphere passing through all four corners.
///
/// Returns None for a degenerate (zero-volume) tetrahedron.
pub fn tet_circumcenter(points: &[Vec3; 4]) -> Option<Vec3> {
    // the circumcenter x satisfies 2 (p_i - p_0) . x = |p_i|^2 - |p_0|^2
    // for i = 1..3, a 3x3 linear system
    let rows: Vec<Vec3> = (1..4).map(|i| 2.0 * (points[i] - points[0])).collect();
    let coef = na::Matrix3::from_rows(&[
        rows[0].transpose(),
        rows[1].transpose(),
        rows[2].transpose(),
    ]);
    let rhs = na::Vector3::from_fn(|i, _| {
        points[i + 1].dot(&points[i + 1]) - points[0].dot(&points[0])
    });
    coef.lu().solve(&rhs)
}

/// Compute the point of a (closed) tetrahedron nearest to a query point:
/// the query itself if it lies inside,
/// otherwise the nearest point on the tetrahedron's surface.
pub fn tet_closest_point(points: &[Vec3; 4], query: Vec3) -> Vec3 {
    // faces with the index of the opposite corner
    const FACES: [[usize; 4]; 4] = [
        [1, 2, 3, 0],
        [0, 2, 3, 1],
        [0, 1, 3, 2],
        [0, 1, 2, 3],
    ];

    let mut inside = true;
    let mut best = query;
    let mut best_dist_sq = f64::MAX;
    for [a, b, c, opp] in FACES {
        let (pa, pb, pc) = (points[a], points[b], points[c]);
        let normal = (pb - pa).cross(&(pc - pa));
        let query_side = normal.dot(&(query - pa));
        let opp_side = normal.dot(&(points[opp] - pa));
        // the query is outside this face if it is on the other side
        // of the face plane from the opposite corner
        if query_side * opp_side < 0.0 {
            inside = false;
            let candidate = closest_point_on_triangle(pa, pb, pc, query);
            let dist_sq = (candidate - query).norm_squared();
            if dist_sq < best_dist_sq {
                best_dist_sq = dist_sq;
                best = candidate;
            }
        }
    }

    if inside {
        query
    } else {
        best
    }
}

/// Compute the point of a triangle nearest to a query point
/// by classifying the query into the triangle's Voronoi regions
/// (see Ericson, Real-Time Collision Detection, section 5.1.5).
pub fn closest_point_on_triangle(a: Vec3, b: Vec3, c: Vec3, p: Vec3) -> Vec3 {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;
    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return a;
    }

    let bp = p - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return a + v * ab;
    }

    let cp = p - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return a + w * ac;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return b + w * (c - b);
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    a + v * ab + w * ac
}

/// Construct an orthonormal basis `(u, v)` of the plane orthogonal to `axis`
/// such that `(u, v, axis)` is right-handed.
pub fn tangent_basis(axis: Vec3) -> (Vec3, Vec3) {
    let n = axis.normalize();
    // any direction not parallel to the axis works as a seed
    let seed = if n.x.abs() < 0.9 {
        Vec3::x()
    } else {
        Vec3::y()
    };
    let u = seed.cross(&n).normalize();
    let v = n.cross(&u);
    (u, v)
}

/// The polar angle of a point projected into the plane
/// spanned by the tangent basis `(u, v)` at `origin`, in `(-pi, pi]`.
pub fn polar_angle(origin: Vec3, u: Vec3, v: Vec3, point: Vec3) -> f64 {
    let d = point - origin;
    d.dot(&v).atan2(d.dot(&u))
}

/// Order a near-planar point set into a cyclic polygon boundary,
/// returning the permutation of input indices that traces the polygon.
///
/// The points are projected onto their best-fit plane
/// (the plane orthogonal to the smallest-eigenvalue direction
/// of the point set's covariance matrix)
/// and sorted by polar angle about the projected centroid.
/// Every input index appears exactly once in the result;
/// for a convex coplanar point set this is the convex hull ordering.
pub fn wrap_ordering(points: &[Vec3]) -> Vec<usize> {
    if points.len() < 3 {
        return (0..points.len()).collect();
    }

    let centroid = points.iter().fold(Vec3::zeros(), |acc, p| acc + p) / points.len() as f64;
    let mut covariance = na::Matrix3::zeros();
    for p in points {
        let d = p - centroid;
        covariance += d * d.transpose();
    }
    let eigen = na::SymmetricEigen::new(covariance);
    let (normal_idx, _) = eigen
        .eigenvalues
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .expect("covariance eigendecomposition is never empty");
    let normal = eigen.eigenvectors.column(normal_idx).into_owned();

    let (u, v) = tangent_basis(normal);
    let mut ordering: Vec<usize> = (0..points.len()).collect();
    ordering.sort_by(|&i, &j| {
        let angle_i = polar_angle(centroid, u, v, points[i]);
        let angle_j = polar_angle(centroid, u, v, points[j]);
        angle_i.total_cmp(&angle_j)
    });
    ordering
}
