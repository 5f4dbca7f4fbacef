//! Live sorted view over an observable source list

use crate::collections::TransformationList;
use crate::collections::change::{ChangeBuilder, ListChange};
use crate::collections::observable::{ObservableVec, SubscriptionId};
use crate::collections::sort::{is_identity, sort_by_with_permutation};
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::rc::{Rc, Weak};

/// Shared ownership of the ordering.
pub type Comparator<E> = Rc<dyn Fn(&E, &E) -> Ordering>;

/// Comparator result with the source-index tie-break applied.
///
/// Ties broken by ascending source index make the view order a total
/// order: every element has exactly one correct position, and equal
/// keys keep their source order.
fn compare_sources<E>(
    comparator: &Comparator<E>,
    contents: &[E],
    a: usize,
    b: usize,
) -> Ordering {
    comparator(&contents[a], &contents[b]).then(a.cmp(&b))
}

type ViewObserverFn<E> = Box<dyn FnMut(&ListChange<E>)>;

struct ViewObserver<E> {
    id: SubscriptionId,
    callback: ViewObserverFn<E>,
}

struct SortedCore<E: Clone> {
    /// View position to source index; sorted by `(key, source index)`
    /// when a comparator is set, identity otherwise.
    view_to_source: Vec<usize>,
    /// Inverse of `view_to_source`, always the same length as the source.
    source_to_view: Vec<usize>,
    comparator: Option<Comparator<E>>,
}

struct SortedShared<E: Clone + 'static> {
    core: RefCell<SortedCore<E>>,
    observers: RefCell<SmallVec<[ViewObserver<E>; 2]>>,
    next_id: Cell<u64>,
}

/// A live sorted projection of an [`ObservableVec`].
///
/// With a comparator the view shows the source in sorted order, equal
/// keys in source order; without one it mirrors the source as is and
/// forwards its changes verbatim. Both index translations are O(1).
/// Dropping the view unsubscribes it from its source.
pub struct SortedList<E: Clone + 'static> {
    source: Rc<ObservableVec<E>>,
    shared: Rc<SortedShared<E>>,
    subscription: SubscriptionId,
}

impl<E: Clone + 'static> SortedList<E> {
    /// Build a view of `source` ordered by `comparator`, or mirroring
    /// source order when `None`.
    pub fn new(source: &Rc<ObservableVec<E>>, comparator: Option<Comparator<E>>) -> Self {
        let shared = Rc::new(SortedShared {
            core: RefCell::new(SortedCore {
                view_to_source: Vec::new(),
                source_to_view: Vec::new(),
                comparator,
            }),
            observers: RefCell::new(SmallVec::new()),
            next_id: Cell::new(0),
        });

        source.with(|contents| shared.core.borrow_mut().rebuild(contents));

        let weak = Rc::downgrade(&shared);
        let subscription = source.subscribe(move |contents, change| {
            if let Some(shared) = Weak::upgrade(&weak) {
                shared.source_changed(contents, change);
            }
        });

        SortedList {
            source: Rc::clone(source),
            shared,
            subscription,
        }
    }

    /// The list this view projects.
    pub fn source(&self) -> &Rc<ObservableVec<E>> {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.shared.core.borrow().view_to_source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clone of the element at view position `index`. Panics when out of
    /// range.
    pub fn get(&self, index: usize) -> E {
        let source_index = self.shared.core.borrow().view_to_source[index];
        self.source.get(source_index)
    }

    /// Source index of the element at view position `index`. Panics when
    /// out of range.
    pub fn source_index(&self, index: usize) -> usize {
        self.shared.core.borrow().view_to_source[index]
    }

    /// View position of the source element at `source_index`. A sorted
    /// view hides nothing, so this is always `Ok`. Panics when out of
    /// range.
    pub fn view_index(&self, source_index: usize) -> Result<usize, usize> {
        Ok(self.shared.core.borrow().source_to_view[source_index])
    }

    pub fn to_vec(&self) -> Vec<E> {
        let core = self.shared.core.borrow();
        self.source.with(|contents| {
            core.view_to_source.iter().map(|&i| contents[i].clone()).collect()
        })
    }

    /// Current comparator, if any.
    pub fn comparator(&self) -> Option<Comparator<E>> {
        self.shared.core.borrow().comparator.clone()
    }

    /// Swap the ordering and re-sort, reporting the whole rearrangement
    /// as one permutation. Nothing is delivered when no element moves.
    pub fn set_comparator(&self, comparator: Option<Comparator<E>>) {
        let delta = self.source.with(|contents| {
            self.shared.core.borrow_mut().replace_comparator(comparator, contents)
        });
        if let Some(delta) = delta {
            self.shared.fire(std::slice::from_ref(&delta));
        }
    }

    /// Register `callback` for every future view change.
    pub fn subscribe(&self, callback: impl FnMut(&ListChange<E>) + 'static) -> SubscriptionId {
        let id = SubscriptionId::next(&self.shared.next_id);
        self.shared.observers.borrow_mut().push(ViewObserver {
            id,
            callback: Box::new(callback),
        });
        id
    }

    /// Remove a view subscription. Returns whether it was still registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.shared.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|observer| observer.id != id);
        observers.len() != before
    }
}

impl<E: Clone + 'static> TransformationList<E> for SortedList<E> {
    fn len(&self) -> usize {
        SortedList::len(self)
    }

    fn get(&self, index: usize) -> E {
        SortedList::get(self, index)
    }

    fn source_index(&self, index: usize) -> usize {
        SortedList::source_index(self, index)
    }

    fn view_index(&self, source_index: usize) -> Result<usize, usize> {
        SortedList::view_index(self, source_index)
    }

    fn to_vec(&self) -> Vec<E> {
        SortedList::to_vec(self)
    }
}

impl<E: Clone + 'static> Drop for SortedList<E> {
    fn drop(&mut self) {
        self.source.unsubscribe(self.subscription);
    }
}

impl<E: Clone + 'static> SortedShared<E> {
    fn source_changed(&self, contents: &[E], change: &ListChange<E>) {
        let deltas = {
            let mut core = self.core.borrow_mut();
            match change {
                ListChange::Permuted { from, to, mapping } => {
                    core.permutate(contents, *from, *to, mapping)
                },
                ListChange::Updated { from, to } => core.update(contents, *from, *to),
                ListChange::Spliced { from, removed, added } => {
                    core.add_remove(contents, *from, removed, *added)
                },
            }
        };
        self.fire(&deltas);
    }

    fn fire(&self, deltas: &[ListChange<E>]) {
        if deltas.is_empty() {
            return;
        }
        let mut observers = self.observers.borrow_mut();
        for delta in deltas {
            for observer in observers.iter_mut() {
                (observer.callback)(delta);
            }
        }
    }
}

impl<E: Clone> SortedCore<E> {
    /// Recompute both index maps from scratch.
    fn rebuild(&mut self, contents: &[E]) {
        match &self.comparator {
            None => {
                self.view_to_source = (0..contents.len()).collect();
            },
            Some(comparator) => {
                let comparator = Rc::clone(comparator);
                let mut order: Vec<usize> = (0..contents.len()).collect();
                order.sort_by(|&a, &b| compare_sources(&comparator, contents, a, b));
                self.view_to_source = order;
            },
        }
        self.rebuild_inverse();
    }

    fn rebuild_inverse(&mut self) {
        self.source_to_view = vec![0; self.view_to_source.len()];
        for (view, &source) in self.view_to_source.iter().enumerate() {
            self.source_to_view[source] = view;
        }
    }

    fn replace_comparator(
        &mut self,
        comparator: Option<Comparator<E>>,
        contents: &[E],
    ) -> Option<ListChange<E>> {
        let old_order = std::mem::take(&mut self.view_to_source);
        self.comparator = comparator;
        self.rebuild(contents);
        tracing::debug!(len = self.view_to_source.len(), "re-sorted view after comparator change");

        let mapping: Vec<usize> = old_order
            .iter()
            .map(|&source| self.source_to_view[source])
            .collect();
        if is_identity(&mapping) {
            return None;
        }
        Some(ListChange::Permuted {
            from: 0,
            to: mapping.len(),
            mapping,
        })
    }

    /// Where `source_index` belongs in the current view order.
    fn insertion_point(
        &self,
        contents: &[E],
        comparator: &Comparator<E>,
        source_index: usize,
    ) -> usize {
        self.view_to_source
            .binary_search_by(|&existing| {
                compare_sources(comparator, contents, existing, source_index)
            })
            .unwrap_or_else(|position| position)
    }

    fn add_remove(
        &mut self,
        contents: &[E],
        from: usize,
        removed: &[E],
        added: usize,
    ) -> Vec<ListChange<E>> {
        let Some(comparator) = self.comparator.clone() else {
            // Mirror mode: the view is the source
            self.view_to_source = (0..contents.len()).collect();
            self.rebuild_inverse();
            return vec![ListChange::Spliced {
                from,
                removed: removed.to_vec(),
                added,
            }];
        };

        let removed_len = removed.len();
        let mut builder = ChangeBuilder::new();

        if removed_len > 0 {
            // Pair each vanished view slot with its payload, ascending
            let mut vanished: Vec<(usize, usize)> = (from..from + removed_len)
                .map(|source| (self.source_to_view[source], source))
                .collect();
            vanished.sort_unstable();
            for (already_gone, &(view_position, source)) in vanished.iter().enumerate() {
                builder.next_remove(view_position - already_gone, removed[source - from].clone());
            }
            for &(view_position, _) in vanished.iter().rev() {
                self.view_to_source.remove(view_position);
            }
        }

        // Renumber the survivors past the replaced source range
        if added != removed_len {
            for slot in &mut self.view_to_source {
                if *slot >= from + removed_len {
                    *slot = *slot - removed_len + added;
                }
            }
        }

        // Binary-insert each new element at its ordered position, then
        // report the settled positions in ascending order so observers
        // can replay the adds left to right
        for source_index in from..from + added {
            let position = self.insertion_point(contents, &comparator, source_index);
            self.view_to_source.insert(position, source_index);
        }
        self.rebuild_inverse();
        if added > 0 {
            let mut positions: Vec<usize> =
                (from..from + added).map(|source| self.source_to_view[source]).collect();
            positions.sort_unstable();
            for position in positions {
                builder.next_add(position);
            }
        }

        builder.into_deltas()
    }

    /// Whether the element at `view_position` still sits between its
    /// view neighbours under the current keys.
    fn ordered_at(
        &self,
        contents: &[E],
        comparator: &Comparator<E>,
        view_position: usize,
    ) -> bool {
        let source_index = self.view_to_source[view_position];
        let ordered_left = view_position == 0
            || compare_sources(
                comparator,
                contents,
                self.view_to_source[view_position - 1],
                source_index,
            ) != Ordering::Greater;
        let ordered_right = view_position + 1 == self.view_to_source.len()
            || compare_sources(
                comparator,
                contents,
                source_index,
                self.view_to_source[view_position + 1],
            ) != Ordering::Greater;
        ordered_left && ordered_right
    }

    /// Source elements in `[from, to)` were replaced in place. The keys
    /// of everything else are untouched, so the view is still sorted
    /// exactly when every replaced element sits between its neighbours;
    /// then the range walks out as in-place updates. Otherwise every
    /// replaced element is taken out, leaving a sorted remainder, and
    /// re-inserted by binary search, with the removals reported at their
    /// vacated slots and the adds at their settled positions, ascending.
    /// A removal here carries the replacement value; the one it displaced
    /// is no longer observable.
    fn update(&mut self, contents: &[E], from: usize, to: usize) -> Vec<ListChange<E>> {
        let Some(comparator) = self.comparator.clone() else {
            return vec![ListChange::Updated { from, to }];
        };

        let mut positions: Vec<usize> =
            (from..to).map(|source| self.source_to_view[source]).collect();
        positions.sort_unstable();

        let mut builder = ChangeBuilder::new();
        if positions.iter().all(|&position| self.ordered_at(contents, &comparator, position)) {
            for &position in &positions {
                builder.next_update(position);
            }
            return builder.into_deltas();
        }

        for (already_gone, &view_position) in positions.iter().enumerate() {
            let slot = view_position - already_gone;
            let source_index = self.view_to_source[slot];
            builder.next_remove(slot, contents[source_index].clone());
            self.view_to_source.remove(slot);
        }
        for source_index in from..to {
            let position = self.insertion_point(contents, &comparator, source_index);
            self.view_to_source.insert(position, source_index);
        }
        self.rebuild_inverse();

        let mut settled: Vec<usize> =
            (from..to).map(|source| self.source_to_view[source]).collect();
        settled.sort_unstable();
        for position in settled {
            builder.next_add(position);
        }
        builder.into_deltas()
    }

    fn permutate(
        &mut self,
        contents: &[E],
        from: usize,
        to: usize,
        mapping: &[usize],
    ) -> Vec<ListChange<E>> {
        let Some(comparator) = self.comparator.clone() else {
            return vec![ListChange::Permuted {
                from,
                to,
                mapping: mapping.to_vec(),
            }];
        };

        // Renumber stored source indices through the source mapping
        for slot in &mut self.view_to_source {
            if *slot >= from && *slot < to {
                *slot = mapping[*slot - from];
            }
        }
        // Keys did not change, but the source-index tie-break may have:
        // restore the total order and report any movement
        let relative = sort_by_with_permutation(&mut self.view_to_source, |&a, &b| {
            compare_sources(&comparator, contents, a, b)
        });
        self.rebuild_inverse();

        if is_identity(&relative) {
            return Vec::new();
        }
        vec![ListChange::Permuted {
            from: 0,
            to: relative.len(),
            mapping: relative,
        }]
    }
}
