//! Live filtered view over an observable source list

use crate::collections::change::{ChangeBuilder, ListChange};
use crate::collections::observable::{ObservableVec, SubscriptionId};
use crate::collections::sort::{is_identity, sort_with_permutation};
use crate::collections::TransformationList;
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// Shared ownership of the membership test.
pub type Predicate<E> = Rc<dyn Fn(&E) -> bool>;

/// Growable index array holding the source indices visible in a view,
/// always in ascending order.
///
/// The backing storage is a plain flat buffer: shifts are explicit
/// `copy_within` calls and growth allocates half again the requested
/// length plus one.
#[derive(Debug, Clone, Default)]
pub(crate) struct IndexBuffer {
    data: Vec<usize>,
    len: usize,
}

impl IndexBuffer {
    pub const fn new() -> Self {
        IndexBuffer {
            data: Vec::new(),
            len: 0,
        }
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.data[..self.len]
    }

    #[inline]
    pub fn get(&self, index: usize) -> usize {
        self.as_slice()[index]
    }

    #[inline]
    pub fn set(&mut self, index: usize, value: usize) {
        self.data[..self.len][index] = value;
    }

    pub fn slice_mut(&mut self, range: std::ops::Range<usize>) -> &mut [usize] {
        &mut self.data[..self.len][range]
    }

    pub fn push(&mut self, value: usize) {
        self.ensure_capacity(self.len + 1);
        self.data[self.len] = value;
        self.len += 1;
    }

    /// Insert `value` at `position`, shifting the tail right.
    pub fn insert(&mut self, position: usize, value: usize) {
        debug_assert!(position <= self.len);
        self.ensure_capacity(self.len + 1);
        self.data.copy_within(position..self.len, position + 1);
        self.data[position] = value;
        self.len += 1;
    }

    /// Remove and return the value at `position`, shifting the tail left.
    pub fn remove(&mut self, position: usize) -> usize {
        let value = self.as_slice()[position];
        self.data.copy_within(position + 1..self.len, position);
        self.len -= 1;
        value
    }

    /// Remove the slots in `[from, to)`.
    pub fn remove_range(&mut self, from: usize, to: usize) {
        debug_assert!(from <= to && to <= self.len);
        if from == to {
            return;
        }
        self.data.copy_within(to..self.len, from);
        self.len -= to - from;
    }

    /// Add `delta` to every stored value from slot `position` on.
    pub fn shift_values_from(&mut self, position: usize, delta: isize) {
        for slot in &mut self.data[position..self.len] {
            *slot = (*slot as isize + delta) as usize;
        }
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    fn ensure_capacity(&mut self, requested: usize) {
        if self.data.len() < requested {
            // Half again the requested length, plus one
            self.data.resize(requested * 3 / 2 + 1, 0);
        }
    }
}

type ViewObserverFn<E> = Box<dyn FnMut(&ListChange<E>)>;

struct ViewObserver<E> {
    id: SubscriptionId,
    callback: ViewObserverFn<E>,
}

struct FilteredCore<E: Clone> {
    indices: IndexBuffer,
    predicate: Option<Predicate<E>>,
}

struct FilteredShared<E: Clone + 'static> {
    core: RefCell<FilteredCore<E>>,
    observers: RefCell<SmallVec<[ViewObserver<E>; 2]>>,
    next_id: Cell<u64>,
}

/// A live filtered projection of an [`ObservableVec`].
///
/// The view holds no elements of its own, only the ascending source
/// indices that currently pass the predicate. Source changes are folded
/// into that index array incrementally and re-described in view
/// coordinates for this view's own observers. Dropping the view
/// unsubscribes it from its source.
///
/// Like its source, the view is single-threaded and non-reentrant: a
/// view observer must not mutate the source or this view's subscriptions
/// while a change is being delivered.
pub struct FilteredList<E: Clone + 'static> {
    source: Rc<ObservableVec<E>>,
    shared: Rc<FilteredShared<E>>,
    subscription: SubscriptionId,
}

impl<E: Clone + 'static> FilteredList<E> {
    /// Build a view of `source` through `predicate`. `None` lets every
    /// element through.
    pub fn new(source: &Rc<ObservableVec<E>>, predicate: Option<Predicate<E>>) -> Self {
        let shared = Rc::new(FilteredShared {
            core: RefCell::new(FilteredCore {
                indices: IndexBuffer::new(),
                predicate,
            }),
            observers: RefCell::new(SmallVec::new()),
            next_id: Cell::new(0),
        });

        source.with(|contents| shared.core.borrow_mut().refill(contents));

        let weak = Rc::downgrade(&shared);
        let subscription = source.subscribe(move |contents, change| {
            if let Some(shared) = Weak::upgrade(&weak) {
                shared.source_changed(contents, change);
            }
        });

        FilteredList {
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
        self.shared.core.borrow().indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clone of the element at view position `index`. Panics when out of
    /// range.
    pub fn get(&self, index: usize) -> E {
        let source_index = self.shared.core.borrow().indices.get(index);
        self.source.get(source_index)
    }

    /// Source index of the element at view position `index`. Panics when
    /// out of range.
    pub fn source_index(&self, index: usize) -> usize {
        self.shared.core.borrow().indices.get(index)
    }

    /// Position of source element `source_index` in the view, or the
    /// insertion point where it would appear if it passed the predicate.
    pub fn view_index(&self, source_index: usize) -> Result<usize, usize> {
        self.shared.core.borrow().indices.as_slice().binary_search(&source_index)
    }

    pub fn to_vec(&self) -> Vec<E> {
        let core = self.shared.core.borrow();
        self.source
            .with(|contents| core.indices.as_slice().iter().map(|&i| contents[i].clone()).collect())
    }

    /// Current predicate, if any.
    pub fn predicate(&self) -> Option<Predicate<E>> {
        self.shared.core.borrow().predicate.clone()
    }

    /// Swap the predicate and refilter from scratch.
    ///
    /// Observers get a single whole-view splice describing the old and
    /// new contents, even when most elements survive the swap.
    pub fn set_predicate(&self, predicate: Option<Predicate<E>>) {
        let delta = self.source.with(|contents| {
            self.shared.core.borrow_mut().replace_predicate(predicate, contents)
        });
        if let Some(delta) = delta {
            self.shared.fire(std::slice::from_ref(&delta));
        }
    }

    /// Register `callback` for every future view change.
    pub fn subscribe(&self, callback: impl FnMut(&ListChange<E>) + 'static) -> SubscriptionId {
        self.shared.subscribe(callback)
    }

    /// Remove a view subscription. Returns whether it was still registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.unsubscribe(id)
    }
}

impl<E: Clone + 'static> TransformationList<E> for FilteredList<E> {
    fn len(&self) -> usize {
        FilteredList::len(self)
    }

    fn get(&self, index: usize) -> E {
        FilteredList::get(self, index)
    }

    fn source_index(&self, index: usize) -> usize {
        FilteredList::source_index(self, index)
    }

    fn view_index(&self, source_index: usize) -> Result<usize, usize> {
        FilteredList::view_index(self, source_index)
    }

    fn to_vec(&self) -> Vec<E> {
        FilteredList::to_vec(self)
    }
}

impl<E: Clone + 'static> Drop for FilteredList<E> {
    fn drop(&mut self) {
        self.source.unsubscribe(self.subscription);
    }
}

impl<E: Clone + 'static> FilteredShared<E> {
    fn source_changed(&self, contents: &[E], change: &ListChange<E>) {
        let deltas = {
            let mut core = self.core.borrow_mut();
            match change {
                ListChange::Permuted { from, to, mapping } => core.permutate(*from, *to, mapping),
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

    fn subscribe(&self, callback: impl FnMut(&ListChange<E>) + 'static) -> SubscriptionId {
        let id = SubscriptionId::next(&self.next_id);
        self.observers.borrow_mut().push(ViewObserver {
            id,
            callback: Box::new(callback),
        });
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|observer| observer.id != id);
        observers.len() != before
    }
}

impl<E: Clone> FilteredCore<E> {
    fn matches(&self, element: &E) -> bool {
        match &self.predicate {
            Some(predicate) => predicate(element),
            None => true,
        }
    }

    /// Lower-bound position of `source_index` in the index array.
    fn find_position(&self, source_index: usize) -> usize {
        self.indices
            .as_slice()
            .binary_search(&source_index)
            .unwrap_or_else(|insertion| insertion)
    }

    /// Rebuild the index array with a single linear scan.
    fn refill(&mut self, contents: &[E]) {
        self.indices.clear();
        for (index, element) in contents.iter().enumerate() {
            if self.matches(element) {
                self.indices.push(index);
            }
        }
    }

    fn replace_predicate(
        &mut self,
        predicate: Option<Predicate<E>>,
        contents: &[E],
    ) -> Option<ListChange<E>> {
        let removed: Vec<E> = self
            .indices
            .as_slice()
            .iter()
            .map(|&index| contents[index].clone())
            .collect();
        self.predicate = predicate;
        self.refill(contents);
        let added = self.indices.len();
        tracing::debug!(removed = removed.len(), added, "refiltered view after predicate change");
        if removed.is_empty() && added == 0 {
            return None;
        }
        Some(ListChange::Spliced { from: 0, removed, added })
    }

    /// Source elements in `[from, to)` were rearranged by `mapping`.
    /// Membership cannot change, so remap the affected indices and
    /// restore their ascending order, reporting how the view positions
    /// moved.
    fn permutate(&mut self, from: usize, to: usize, mapping: &[usize]) -> Vec<ListChange<E>> {
        let view_from = self.find_position(from);
        let view_to = self.find_position(to);
        if view_to <= view_from {
            return Vec::new();
        }

        for slot in view_from..view_to {
            let old_source = self.indices.get(slot);
            self.indices.set(slot, mapping[old_source - from]);
        }
        let relative = sort_with_permutation(self.indices.slice_mut(view_from..view_to));
        if is_identity(&relative) {
            return Vec::new();
        }

        let mapping: Vec<usize> = relative.iter().map(|&new| view_from + new).collect();
        vec![ListChange::Permuted {
            from: view_from,
            to: view_to,
            mapping,
        }]
    }

    /// Source elements in `[from, to)` were replaced in place. Walk the
    /// range against the index array in lockstep, dropping slots whose
    /// element stopped passing, inserting slots for elements that now
    /// pass, and reporting in-place updates for the rest. A dropped slot
    /// reports the replacement element as its payload; the value it
    /// displaced is no longer observable.
    fn update(&mut self, contents: &[E], from: usize, to: usize) -> Vec<ListChange<E>> {
        let mut builder = ChangeBuilder::new();
        let mut position = self.find_position(from);

        for source_index in from..to {
            let present =
                position < self.indices.len() && self.indices.get(position) == source_index;
            let passes = self.matches(&contents[source_index]);
            match (present, passes) {
                (true, true) => {
                    builder.next_update(position);
                    position += 1;
                },
                (true, false) => {
                    builder.next_remove(position, contents[source_index].clone());
                    self.indices.remove(position);
                },
                (false, true) => {
                    self.indices.insert(position, source_index);
                    builder.next_add(position);
                    position += 1;
                },
                (false, false) => {},
            }
        }

        builder.into_deltas()
    }

    /// At source position `from`, `removed` elements made way for
    /// `added` new ones. Everything the view loses and gains lands in
    /// one splice: stale slots are renumbered away, vacated slots are
    /// reused for new passing elements, and any surplus is inserted or
    /// trimmed.
    fn add_remove(
        &mut self,
        contents: &[E],
        from: usize,
        removed: &[E],
        added: usize,
    ) -> Vec<ListChange<E>> {
        let removed_len = removed.len();
        let view_from = self.find_position(from);
        let view_to = self.find_position(from + removed_len);

        // View elements that vanish with the removed source range
        let mut view_removed = Vec::with_capacity(view_to - view_from);
        for slot in view_from..view_to {
            view_removed.push(removed[self.indices.get(slot) - from].clone());
        }

        // Renumber every index past the replaced range
        if added != removed_len {
            self.indices
                .shift_values_from(view_to, added as isize - removed_len as isize);
        }

        // Refill: reuse the vacated slots first, then insert any surplus
        let mut fill = view_from;
        for source_index in from..from + added {
            if self.matches(&contents[source_index]) {
                if fill < view_to {
                    self.indices.set(fill, source_index);
                } else {
                    self.indices.insert(fill, source_index);
                }
                fill += 1;
            }
        }
        if fill < view_to {
            self.indices.remove_range(fill, view_to);
        }

        let view_added = fill - view_from;
        if view_removed.is_empty() && view_added == 0 {
            return Vec::new();
        }
        vec![ListChange::Spliced {
            from: view_from,
            removed: view_removed,
            added: view_added,
        }]
    }
}
