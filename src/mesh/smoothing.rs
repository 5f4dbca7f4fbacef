//! Smoothing-group reconstruction from per-corner normals

use crate::errors::SmoothingDataError;
use crate::float_types::{COS_SMOOTH_ANGLE, Real, UNLOCKED_NORMAL};
use crate::mesh::adjacency::EdgeFaceMap;
use crate::mesh::{EdgeId, edge_subindex, undirected};
use hashbrown::HashMap;
use nalgebra::Vector3;
use std::collections::VecDeque;

/// Per-call configuration for smoothing-group reconstruction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingOptions {
    /// Minimum dot product between unit corner normals for the shared
    /// edge to count as smooth. The default corresponds to a 2° crease
    /// angle.
    pub min_normal_dot: Real,
}

impl Default for SmoothingOptions {
    fn default() -> Self {
        SmoothingOptions {
            min_normal_dot: COS_SMOOTH_ANGLE,
        }
    }
}

/// Whether `faces` and `normals` are consistent enough to reconstruct
/// smoothing groups: one xyz triplet per face corner, nothing more.
pub fn can_calc_smooth_groups(faces: &[Vec<EdgeId>], normals: &[Real]) -> bool {
    let corners: usize = faces.iter().map(Vec::len).sum();
    normals.len() == 3 * corners
}

/// Like [`can_calc_smooth_groups`] but reports *how* the inputs disagree.
pub fn validate_smoothing_data(
    faces: &[Vec<EdgeId>],
    normals: &[Real],
) -> Result<(), SmoothingDataError> {
    if normals.len() % 3 != 0 {
        return Err(SmoothingDataError::TruncatedNormalArray { len: normals.len() });
    }
    let expected: usize = faces.iter().map(Vec::len).sum();
    let actual = normals.len() / 3;
    if expected != actual {
        return Err(SmoothingDataError::NormalCountMismatch { expected, actual });
    }
    Ok(())
}

/// **Mathematical Foundation: Smoothing Groups from Corner Normals**
///
/// Importers hand over faces as signed edge-id lists plus one normal per
/// face corner, flattened face by face. Downstream consumers want the
/// classic smoothing-group encoding instead: faces sharing a set mask bit
/// get their vertex normals averaged, faces with mask 0 stay faceted.
/// This routine recovers those masks from the normals alone.
///
/// ## **Algorithm**
/// 1. **Adjacency**: map every undirected edge to its faces, keeping only
///    edges shared by exactly two (boundary and non-manifold edges are
///    excluded, never fatal).
/// 2. **Crease test**: an edge is smooth when, at both of its endpoints,
///    the two faces' corner normals are within the crease angle
///    (unit-normal dot at or above `min_normal_dot`). A normal with any
///    component equal to the unlocked sentinel compares equal to nothing,
///    forcing a hard edge.
/// 3. **Components**: breadth-first search over faces connected by smooth
///    edges, seeded each round from the highest-index unvisited face.
/// 4. **Masks**: a component of a single face gets mask 0; every larger
///    component gets `1 << b` for the next bit `b`, cycling through bits
///    0..=31 so a 33rd multi-face component reuses bit 0.
///
/// ## **Failure Semantics**
/// Never panics and never errors on malformed input. If the corner count
/// and normal count disagree the whole mesh is returned as one smoothing
/// group (`vec![1; faces.len()]`).
pub fn calc_smooth_groups(faces: &[Vec<EdgeId>], normals: &[Real]) -> Vec<u32> {
    calc_smooth_groups_with(faces, normals, &SmoothingOptions::default())
}

/// [`calc_smooth_groups`] with an explicit crease threshold.
pub fn calc_smooth_groups_with(
    faces: &[Vec<EdgeId>],
    normals: &[Real],
    options: &SmoothingOptions,
) -> Vec<u32> {
    if !can_calc_smooth_groups(faces, normals) {
        tracing::warn!(
            faces = faces.len(),
            normal_floats = normals.len(),
            "corner and normal counts disagree, falling back to a single smoothing group"
        );
        return vec![1; faces.len()];
    }

    GroupBuilder::new(faces, normals, options).calc()
}

/// Working state for one reconstruction pass.
struct GroupBuilder<'a> {
    faces: &'a [Vec<EdgeId>],
    normals: &'a [Real],
    /// Triplet offset of each face's first corner normal (running sum of
    /// preceding faces' corner counts).
    corner_offsets: Vec<usize>,
    min_normal_dot: Real,
}

impl<'a> GroupBuilder<'a> {
    fn new(faces: &'a [Vec<EdgeId>], normals: &'a [Real], options: &SmoothingOptions) -> Self {
        let mut corner_offsets = Vec::with_capacity(faces.len());
        let mut offset = 0;
        for face in faces {
            corner_offsets.push(offset);
            offset += face.len();
        }

        GroupBuilder {
            faces,
            normals,
            corner_offsets,
            min_normal_dot: options.min_normal_dot,
        }
    }

    fn calc(&self) -> Vec<u32> {
        let mut adjacency = EdgeFaceMap::build(self.faces);
        adjacency.retain_manifold();

        // Face adjacency restricted to smooth edges
        let mut face_adjacency: HashMap<usize, Vec<usize>> = HashMap::new();
        for (edge, adjacent) in adjacency.iter() {
            let face_a = adjacent[0];
            let face_b = adjacent[1];
            if self.is_smooth_edge(edge, face_a, face_b) {
                face_adjacency.entry(face_a).or_default().push(face_b);
                face_adjacency.entry(face_b).or_default().push(face_a);
            }
        }

        self.assign_groups(&face_adjacency)
    }

    /// BFS over the smooth-edge graph, handing out one mask bit per
    /// multi-face component.
    fn assign_groups(&self, face_adjacency: &HashMap<usize, Vec<usize>>) -> Vec<u32> {
        let mut groups = vec![0u32; self.faces.len()];
        let mut visited = vec![false; self.faces.len()];
        let mut queue = VecDeque::new();
        let mut component = Vec::new();
        let mut next_bit = 0u32;
        let mut smooth_components = 0usize;

        for seed in (0..self.faces.len()).rev() {
            if visited[seed] {
                continue;
            }

            component.clear();
            visited[seed] = true;
            queue.push_back(seed);

            while let Some(face) = queue.pop_front() {
                component.push(face);
                if let Some(neighbors) = face_adjacency.get(&face) {
                    for &neighbor in neighbors {
                        if !visited[neighbor] {
                            visited[neighbor] = true;
                            queue.push_back(neighbor);
                        }
                    }
                }
            }

            // Lone faces keep mask 0 and no group bit is consumed
            if component.len() > 1 {
                let mask = 1u32 << next_bit;
                next_bit = if next_bit == 31 { 0 } else { next_bit + 1 };
                smooth_components += 1;
                for &face in &component {
                    groups[face] = mask;
                }
            }
        }

        tracing::debug!(
            faces = self.faces.len(),
            smooth_components,
            "assigned smoothing groups"
        );
        groups
    }

    /// Smooth iff the corner normals agree at both endpoints of the edge,
    /// seen from both adjacent faces.
    fn is_smooth_edge(&self, edge: EdgeId, face_a: usize, face_b: usize) -> bool {
        let Some(pos_a) = self.edge_position(face_a, edge) else {
            return false;
        };
        let Some(pos_b) = self.edge_position(face_b, edge) else {
            return false;
        };
        let id_a = self.faces[face_a][pos_a];
        let id_b = self.faces[face_b][pos_b];
        let len_a = self.faces[face_a].len();
        let len_b = self.faces[face_b].len();

        for endpoint in 0..2 {
            let corner_a = (pos_a + edge_subindex(id_a, endpoint)) % len_a;
            let corner_b = (pos_b + edge_subindex(id_b, endpoint)) % len_b;
            let normal_a = self.corner_normal(face_a, corner_a);
            let normal_b = self.corner_normal(face_b, corner_b);
            if !normals_equal(&normal_a, &normal_b, self.min_normal_dot) {
                return false;
            }
        }
        true
    }

    /// Slot of the undirected edge `edge` within the face's edge list.
    fn edge_position(&self, face: usize, edge: EdgeId) -> Option<usize> {
        self.faces[face].iter().position(|&e| undirected(e) == edge)
    }

    #[inline]
    fn corner_normal(&self, face: usize, corner: usize) -> Vector3<Real> {
        let i = 3 * (self.corner_offsets[face] + corner);
        Vector3::new(self.normals[i], self.normals[i + 1], self.normals[i + 2])
    }
}

/// Corner-normal agreement: unlocked sentinels never agree, degenerate
/// normals never agree, otherwise compare unit vectors against the
/// crease threshold.
fn normals_equal(a: &Vector3<Real>, b: &Vector3<Real>, min_normal_dot: Real) -> bool {
    if is_unlocked(a) || is_unlocked(b) {
        return false;
    }
    let (Some(a), Some(b)) = (a.try_normalize(0.0), b.try_normalize(0.0)) else {
        return false;
    };
    a.dot(&b) >= min_normal_dot
}

#[inline]
fn is_unlocked(n: &Vector3<Real>) -> bool {
    n.x == UNLOCKED_NORMAL || n.y == UNLOCKED_NORMAL || n.z == UNLOCKED_NORMAL
}
