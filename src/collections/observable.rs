//! Observable mutable sequence, the source every transformation view watches

use crate::collections::change::{ChangeBuilder, ListChange};
use crate::collections::sort::{is_identity, sort_by_with_permutation};
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::ops::Range;

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Mint the next id from a per-registry counter.
    pub(crate) fn next(counter: &Cell<u64>) -> Self {
        let id = SubscriptionId(counter.get());
        counter.set(id.0 + 1);
        id
    }
}

type ObserverFn<E> = Box<dyn FnMut(&[E], &ListChange<E>)>;

struct Observer<E> {
    id: SubscriptionId,
    callback: ObserverFn<E>,
}

/// An ordered sequence that tells its observers exactly what changed.
///
/// Every mutation settles the contents first and then delivers one
/// [`ListChange`] per elementary delta to each observer, in subscription
/// order, together with the settled contents. The whole type is
/// single-threaded and non-reentrant: a callback may read the list but
/// must not mutate it or alter subscriptions, or delivery panics on the
/// inner borrow.
pub struct ObservableVec<E: Clone + 'static> {
    items: RefCell<Vec<E>>,
    observers: RefCell<SmallVec<[Observer<E>; 2]>>,
    next_id: Cell<u64>,
}

impl<E: Clone + 'static> Default for ObservableVec<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Clone + 'static> ObservableVec<E> {
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_vec(Vec::with_capacity(capacity))
    }

    pub fn from_vec(items: Vec<E>) -> Self {
        ObservableVec {
            items: RefCell::new(items),
            observers: RefCell::new(SmallVec::new()),
            next_id: Cell::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Clone of the element at `index`. Panics when out of range.
    pub fn get(&self, index: usize) -> E {
        self.items.borrow()[index].clone()
    }

    pub fn try_get(&self, index: usize) -> Option<E> {
        self.items.borrow().get(index).cloned()
    }

    /// Run `f` over the contents without cloning them.
    pub fn with<R>(&self, f: impl FnOnce(&[E]) -> R) -> R {
        f(&self.items.borrow())
    }

    pub fn to_vec(&self) -> Vec<E> {
        self.items.borrow().clone()
    }

    /// Append one element.
    pub fn push(&self, element: E) {
        let from = {
            let mut items = self.items.borrow_mut();
            items.push(element);
            items.len() - 1
        };
        self.notify(&ListChange::Spliced {
            from,
            removed: Vec::new(),
            added: 1,
        });
    }

    /// Insert at `index`, shifting the tail. Panics when `index > len`.
    pub fn insert(&self, index: usize, element: E) {
        self.items.borrow_mut().insert(index, element);
        self.notify(&ListChange::Spliced {
            from: index,
            removed: Vec::new(),
            added: 1,
        });
    }

    /// Remove and return the element at `index`. Panics when out of range.
    pub fn remove(&self, index: usize) -> E {
        let removed = self.items.borrow_mut().remove(index);
        self.notify(&ListChange::Spliced {
            from: index,
            removed: vec![removed.clone()],
            added: 0,
        });
        removed
    }

    /// Replace the element at `index` in place, returning the old one.
    /// Observers see an [`Updated`](ListChange::Updated) change.
    pub fn set(&self, index: usize, element: E) -> E {
        let old = std::mem::replace(&mut self.items.borrow_mut()[index], element);
        self.notify(&ListChange::Updated {
            from: index,
            to: index + 1,
        });
        old
    }

    /// Replace `range` with `replacement`, returning what was removed.
    pub fn splice(&self, range: Range<usize>, replacement: Vec<E>) -> Vec<E> {
        let from = range.start;
        let added = replacement.len();
        let removed: Vec<E> = self.items.borrow_mut().splice(range, replacement).collect();
        if removed.is_empty() && added == 0 {
            return removed;
        }
        self.notify(&ListChange::Spliced {
            from,
            removed: removed.clone(),
            added,
        });
        removed
    }

    /// Swap in entirely new contents as a single whole-list splice.
    pub fn set_all(&self, replacement: Vec<E>) {
        let added = replacement.len();
        let removed = std::mem::replace(&mut *self.items.borrow_mut(), replacement);
        if removed.is_empty() && added == 0 {
            return;
        }
        self.notify(&ListChange::Spliced {
            from: 0,
            removed,
            added,
        });
    }

    pub fn clear(&self) {
        self.set_all(Vec::new());
    }

    /// Append every element of `tail`.
    pub fn extend_from_vec(&self, tail: Vec<E>) {
        if tail.is_empty() {
            return;
        }
        let (from, added) = {
            let mut items = self.items.borrow_mut();
            let from = items.len();
            let added = tail.len();
            items.extend(tail);
            (from, added)
        };
        self.notify(&ListChange::Spliced {
            from,
            removed: Vec::new(),
            added,
        });
    }

    /// Drop every element the predicate rejects. Observers receive one
    /// splice per contiguous run of removals, in list order.
    pub fn retain_filter(&self, mut keep: impl FnMut(&E) -> bool) {
        let mut builder = ChangeBuilder::new();
        {
            let mut items = self.items.borrow_mut();
            let mut kept = 0usize;
            for i in 0..items.len() {
                if keep(&items[i]) {
                    items.swap(kept, i);
                    kept += 1;
                } else {
                    builder.next_remove(kept, items[i].clone());
                }
            }
            items.truncate(kept);
        }
        for delta in builder.into_deltas() {
            self.notify(&delta);
        }
    }

    /// Sort in place, telling observers where every element went.
    /// Nothing is delivered when the order does not change.
    pub fn sort_by(&self, compare: impl FnMut(&E, &E) -> Ordering) {
        let (len, mapping) = {
            let mut items = self.items.borrow_mut();
            let mapping = sort_by_with_permutation(&mut items, compare);
            (items.len(), mapping)
        };
        if is_identity(&mapping) {
            return;
        }
        self.notify(&ListChange::Permuted {
            from: 0,
            to: len,
            mapping,
        });
    }

    /// Register `callback` for every future change. The callback gets the
    /// settled contents and one delta at a time; when a mutation produces
    /// several deltas they arrive back to back, already sequential.
    pub fn subscribe(&self, callback: impl FnMut(&[E], &ListChange<E>) + 'static) -> SubscriptionId {
        let id = SubscriptionId::next(&self.next_id);
        self.observers.borrow_mut().push(Observer {
            id,
            callback: Box::new(callback),
        });
        id
    }

    /// Remove a subscription. Returns whether it was still registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|observer| observer.id != id);
        observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }

    fn notify(&self, change: &ListChange<E>) {
        let items = self.items.borrow();
        let mut observers = self.observers.borrow_mut();
        for observer in observers.iter_mut() {
            (observer.callback)(&items, change);
        }
    }
}
