//! Polygonal face topology as imported: signed directed edge ids per face

pub mod adjacency;
pub mod smoothing;

/// Signed directed edge id as emitted by the importer.
///
/// A non-negative id `e` traverses undirected edge `e` in its stored
/// direction; `-e - 1` traverses the same undirected edge in reverse.
/// Faces are counterclockwise lists of these ids, so a well-formed
/// interior edge appears once forward and once reversed.
pub type EdgeId = i32;

/// Strip the direction bit: map either traversal back to the undirected edge id.
#[inline]
pub const fn undirected(edge: EdgeId) -> EdgeId {
    if edge < 0 { -edge - 1 } else { edge }
}

/// Whether this id traverses its edge against the stored direction.
#[inline]
pub const fn is_reversed(edge: EdgeId) -> bool {
    edge < 0
}

/// Re-encode the same undirected edge with the opposite traversal direction.
#[inline]
pub const fn reversed(edge: EdgeId) -> EdgeId {
    -edge - 1
}

/// Corner offset contributed by `endpoint` (0 = start, 1 = end) of an edge.
///
/// Within a face of `k` edges, edge position `j` runs from corner `j` to
/// corner `(j + 1) % k`. A reversed id swaps start and end, so its
/// endpoints map to the opposite corners.
#[inline]
pub const fn edge_subindex(edge: EdgeId, endpoint: usize) -> usize {
    if is_reversed(edge) { 1 - endpoint } else { endpoint }
}
