//! Change descriptors delivered to list observers

/// One delta in the life of an observed list.
///
/// A single mutation can produce several deltas. They describe the
/// transition sequentially: each delta's indices refer to the list as
/// the preceding deltas left it, and the final delta leaves the list in
/// its settled state.
#[derive(Debug, Clone, PartialEq)]
pub enum ListChange<E> {
    /// Elements in `[from, to)` changed position without being added or
    /// removed. `mapping[i - from]` is the new index of the element
    /// previously at index `i`.
    Permuted {
        from: usize,
        to: usize,
        mapping: Vec<usize>,
    },
    /// Elements in `[from, to)` were replaced in place; no index moved.
    Updated { from: usize, to: usize },
    /// At `from`, the elements of `removed` made way for `added` new
    /// ones. Pure insertions and pure removals are the degenerate cases.
    ///
    /// When an in-place update pushes an element out of a view, `removed`
    /// carries its replacement value: update notifications name no prior
    /// elements, so the value the view last showed is already gone when
    /// the view reconciles.
    Spliced {
        from: usize,
        removed: Vec<E>,
        added: usize,
    },
}

impl<E> ListChange<E> {
    /// New position of the element previously at `index`.
    ///
    /// Panics when `self` is not [`Permuted`](ListChange::Permuted) or
    /// `index` lies outside its range.
    pub fn new_index(&self, index: usize) -> usize {
        match self {
            ListChange::Permuted { from, mapping, .. } => mapping[index - from],
            _ => panic!("new_index is only defined for permutation changes"),
        }
    }

    /// Number of elements this delta removed.
    pub fn removed_len(&self) -> usize {
        match self {
            ListChange::Spliced { removed, .. } => removed.len(),
            _ => 0,
        }
    }

    /// Indices the added elements occupy afterwards (empty unless spliced).
    pub fn added_range(&self) -> std::ops::Range<usize> {
        match self {
            ListChange::Spliced { from, added, .. } => *from..*from + *added,
            _ => 0..0,
        }
    }

    /// Splice that only added elements.
    pub fn is_insert(&self) -> bool {
        matches!(
            self,
            ListChange::Spliced { removed, added, .. } if removed.is_empty() && *added > 0
        )
    }

    /// Splice that only removed elements.
    pub fn is_removal(&self) -> bool {
        matches!(
            self,
            ListChange::Spliced { removed, added, .. } if !removed.is_empty() && *added == 0
        )
    }
}

/// Accumulates elementary deltas while a view reconciles one upstream
/// change, merging each new mark into the previous delta when the two
/// describe adjacent work: a removal right behind a splice's added block
/// joins that splice, an insertion directly after one extends it, and
/// consecutive in-place updates fuse into one range.
#[derive(Debug)]
pub(crate) struct ChangeBuilder<E> {
    deltas: Vec<ListChange<E>>,
}

impl<E> ChangeBuilder<E> {
    pub fn new() -> Self {
        ChangeBuilder { deltas: Vec::new() }
    }

    /// The element `removed` vanished from position `index`.
    pub fn next_remove(&mut self, index: usize, removed: E) {
        match self.deltas.last_mut() {
            Some(ListChange::Spliced { from, removed: r, added }) if *from + *added == index => {
                r.push(removed);
            },
            _ => self.deltas.push(ListChange::Spliced {
                from: index,
                removed: vec![removed],
                added: 0,
            }),
        }
    }

    /// A new element appeared at position `index`.
    pub fn next_add(&mut self, index: usize) {
        match self.deltas.last_mut() {
            Some(ListChange::Spliced { from, added, .. }) if *from + *added == index => {
                *added += 1;
            },
            _ => self.deltas.push(ListChange::Spliced {
                from: index,
                removed: Vec::new(),
                added: 1,
            }),
        }
    }

    /// The element at position `index` was replaced in place.
    pub fn next_update(&mut self, index: usize) {
        match self.deltas.last_mut() {
            Some(ListChange::Updated { to, .. }) if *to == index => {
                *to += 1;
            },
            _ => self.deltas.push(ListChange::Updated {
                from: index,
                to: index + 1,
            }),
        }
    }

    pub fn into_deltas(self) -> Vec<ListChange<E>> {
        self.deltas
    }
}
