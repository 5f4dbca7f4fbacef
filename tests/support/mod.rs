//! Test support library
//! Mesh fixtures shared by the smoothing-group tests.

use polyview::float_types::Real;
use polyview::mesh::{EdgeId, reversed};

/// Strip of `quads` quads glued side by side along shared vertical edges,
/// wound counterclockwise: bottom, right, top reversed, left reversed.
/// Edge ids start at `edge_offset` so several strips can share one mesh
/// without touching.
pub fn quad_strip(quads: usize, edge_offset: i32) -> Vec<Vec<EdgeId>> {
    let n = quads as i32;
    let bottoms = edge_offset;
    let tops = edge_offset + n;
    let verticals = edge_offset + 2 * n;

    (0..n)
        .map(|i| {
            vec![
                bottoms + i,
                verticals + i + 1,
                reversed(tops + i),
                reversed(verticals + i),
            ]
        })
        .collect()
}

/// One xyz triplet per corner, all identical.
pub fn uniform_normals(corners: usize, normal: [Real; 3]) -> Vec<Real> {
    let mut flat = Vec::with_capacity(corners * 3);
    for _ in 0..corners {
        flat.extend_from_slice(&normal);
    }
    flat
}

/// Normals tilted `degrees` away from +Z, around the x axis.
pub fn tilted_normals(corners: usize, degrees: Real) -> Vec<Real> {
    let theta = degrees.to_radians();
    uniform_normals(corners, [0.0, theta.sin(), theta.cos()])
}

/// Total corner count of a face list.
pub fn corner_count(faces: &[Vec<EdgeId>]) -> usize {
    faces.iter().map(Vec::len).sum()
}

/// The six quads of a closed unit cube. Vertices 0..=3 circle the bottom,
/// 4..=7 the top; edges 0..=3 bottom ring, 4..=7 top ring, 8..=11 the
/// verticals. Every edge is traversed once forward and once reversed.
pub fn cube_faces() -> Vec<Vec<EdgeId>> {
    vec![
        // bottom, seen from below
        vec![reversed(3), reversed(2), reversed(1), reversed(0)],
        // top
        vec![4, 5, 6, 7],
        // front (y = 0)
        vec![0, 9, reversed(4), reversed(8)],
        // right (x = 1)
        vec![1, 10, reversed(5), reversed(9)],
        // back (y = 1)
        vec![2, 11, reversed(6), reversed(10)],
        // left (x = 0)
        vec![3, 8, reversed(7), reversed(11)],
    ]
}

/// Face normals of [`cube_faces`], repeated for each of the four corners.
pub fn cube_corner_normals() -> Vec<Real> {
    let face_normals: [[Real; 3]; 6] = [
        [0.0, 0.0, -1.0],
        [0.0, 0.0, 1.0],
        [0.0, -1.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [-1.0, 0.0, 0.0],
    ];

    let mut flat = Vec::with_capacity(6 * 4 * 3);
    for normal in &face_normals {
        for _ in 0..4 {
            flat.extend_from_slice(normal);
        }
    }
    flat
}

/// Every mask must be zero or a single set bit.
pub fn assert_valid_masks(groups: &[u32]) {
    for (face, &mask) in groups.iter().enumerate() {
        assert!(
            mask == 0 || mask.is_power_of_two(),
            "face {} has mask {:#x}, expected zero or a power of two",
            face,
            mask
        );
    }
}
