//! Edge-to-face adjacency built from signed edge ids

use crate::mesh::{EdgeId, undirected};
use hashbrown::HashMap;
use smallvec::SmallVec;

/// Map from undirected edge id to the faces that traverse it.
///
/// Built in one pass over every directed edge of every face. Interior
/// edges of a well-formed mesh collect exactly two faces; an edge with
/// one face lies on the boundary and an edge with more than two is
/// non-manifold. Both kinds are excluded by [`retain_manifold`](Self::retain_manifold)
/// rather than reported as errors; smoothing cannot cross them.
#[derive(Debug, Clone, Default)]
pub struct EdgeFaceMap {
    faces_by_edge: HashMap<EdgeId, SmallVec<[usize; 2]>>,
    boundary_edges: usize,
    non_manifold_edges: usize,
}

impl EdgeFaceMap {
    /// Build the adjacency map for `faces`, keyed by undirected edge id.
    pub fn build(faces: &[Vec<EdgeId>]) -> Self {
        let mut faces_by_edge: HashMap<EdgeId, SmallVec<[usize; 2]>> = HashMap::new();

        for (face_index, face) in faces.iter().enumerate() {
            for &edge in face {
                faces_by_edge.entry(undirected(edge)).or_default().push(face_index);
            }
        }

        EdgeFaceMap {
            faces_by_edge,
            boundary_edges: 0,
            non_manifold_edges: 0,
        }
    }

    /// Drop every edge not shared by exactly two faces, recording how many
    /// boundary (one face) and non-manifold (more than two faces) entries
    /// were removed.
    pub fn retain_manifold(&mut self) {
        let mut boundary = 0;
        let mut non_manifold = 0;

        self.faces_by_edge.retain(|_, faces| match faces.len() {
            2 => true,
            1 => {
                boundary += 1;
                false
            },
            _ => {
                non_manifold += 1;
                false
            },
        });

        self.boundary_edges = boundary;
        self.non_manifold_edges = non_manifold;

        if boundary > 0 || non_manifold > 0 {
            tracing::debug!(
                boundary_edges = boundary,
                non_manifold_edges = non_manifold,
                "excluded edges without exactly two adjacent faces"
            );
        }
    }

    /// Faces adjacent to the undirected edge of `edge`, if it survived.
    #[inline]
    pub fn faces(&self, edge: EdgeId) -> Option<&[usize]> {
        self.faces_by_edge.get(&undirected(edge)).map(|v| v.as_slice())
    }

    /// Number of edges currently in the map.
    #[inline]
    pub fn len(&self) -> usize {
        self.faces_by_edge.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.faces_by_edge.is_empty()
    }

    /// Boundary edges dropped by the last [`retain_manifold`](Self::retain_manifold) call.
    #[inline]
    pub const fn boundary_edges(&self) -> usize {
        self.boundary_edges
    }

    /// Non-manifold edges dropped by the last [`retain_manifold`](Self::retain_manifold) call.
    #[inline]
    pub const fn non_manifold_edges(&self) -> usize {
        self.non_manifold_edges
    }

    /// Iterate over `(undirected edge id, adjacent faces)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (EdgeId, &[usize])> {
        self.faces_by_edge.iter().map(|(&edge, faces)| (edge, faces.as_slice()))
    }
}
