//! Observable sequences and the live transformation views over them

pub mod change;
pub mod filtered;
pub mod observable;
pub mod sort;
pub mod sorted;

pub use change::ListChange;
pub use filtered::FilteredList;
pub use observable::{ObservableVec, SubscriptionId};
pub use sort::{is_identity, sort_by_with_permutation, sort_with_permutation};
pub use sorted::SortedList;

/// Read-only contract shared by every live view over an observable source.
///
/// A transformation list owns no elements. It projects its source through
/// some lens (a predicate, an ordering) and keeps the projection current
/// as the source changes, translating indices both ways.
pub trait TransformationList<E> {
    /// Number of elements visible through the view.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clone of the element at view position `index`. Panics when out of
    /// range.
    fn get(&self, index: usize) -> E;

    /// Source index of the element at view position `index`. Panics when
    /// out of range.
    fn source_index(&self, index: usize) -> usize;

    /// Where the source element at `source_index` appears in the view.
    ///
    /// `Ok(view_index)` when visible; `Err(insertion_point)` when the
    /// view hides it, following the `binary_search` convention.
    fn view_index(&self, source_index: usize) -> Result<usize, usize>;

    /// Snapshot of the view contents in view order.
    fn to_vec(&self) -> Vec<E> {
        (0..self.len()).map(|i| self.get(i)).collect()
    }
}
