//! Stable sorting that reports where every element went

use std::cmp::Ordering;

/// Stable-sort `items` and return, for each original position, the
/// position its element occupies afterwards. The returned mapping is
/// exactly what a [`Permuted`](crate::collections::ListChange::Permuted)
/// change carries, relative to the slice.
pub fn sort_with_permutation<T: Ord>(items: &mut [T]) -> Vec<usize> {
    sort_by_with_permutation(items, T::cmp)
}

/// [`sort_with_permutation`] with an explicit comparator.
pub fn sort_by_with_permutation<T, F>(items: &mut [T], mut compare: F) -> Vec<usize>
where
    F: FnMut(&T, &T) -> Ordering,
{
    // Argsort: order[new] = old position of the element that belongs at new
    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by(|&a, &b| compare(&items[a], &items[b]));

    let mut mapping = vec![0usize; items.len()];
    for (new_pos, &old_pos) in order.iter().enumerate() {
        mapping[old_pos] = new_pos;
    }

    // Rearrange in place, chasing elements already swapped ahead
    for i in 0..order.len() {
        let mut src = order[i];
        while src < i {
            src = order[src];
        }
        items.swap(i, src);
    }

    mapping
}

/// Whether a permutation mapping moves nothing.
pub fn is_identity(mapping: &[usize]) -> bool {
    mapping.iter().enumerate().all(|(i, &m)| i == m)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_and_reports_destinations() {
        let mut items = vec![30, 10, 20];
        let mapping = sort_with_permutation(&mut items);
        assert_eq!(items, vec![10, 20, 30]);
        // 30 went to 2, 10 to 0, 20 to 1
        assert_eq!(mapping, vec![2, 0, 1]);
    }

    #[test]
    fn equal_elements_keep_their_relative_order() {
        let mut items = vec![(2, 'a'), (1, 'x'), (2, 'b'), (1, 'y')];
        let mapping = sort_by_with_permutation(&mut items, |a, b| a.0.cmp(&b.0));
        assert_eq!(items, vec![(1, 'x'), (1, 'y'), (2, 'a'), (2, 'b')]);
        assert_eq!(mapping, vec![2, 0, 3, 1]);
    }

    #[test]
    fn sorted_input_yields_identity() {
        let mut items = vec![1, 2, 3, 4];
        let mapping = sort_with_permutation(&mut items);
        assert!(is_identity(&mapping));
        assert_eq!(items, vec![1, 2, 3, 4]);
    }

    #[test]
    fn empty_and_singleton_are_trivial() {
        let mut empty: Vec<i32> = vec![];
        assert!(is_identity(&sort_with_permutation(&mut empty)));
        let mut one = vec![7];
        assert!(is_identity(&sort_with_permutation(&mut one)));
    }

    #[test]
    fn reverse_order_maps_end_to_end() {
        let mut items = vec![5, 4, 3, 2, 1];
        let mapping = sort_with_permutation(&mut items);
        assert_eq!(items, vec![1, 2, 3, 4, 5]);
        assert_eq!(mapping, vec![4, 3, 2, 1, 0]);
    }
}
