//! Divide and conquer k-way merge.
//!
//! The list of sequences is split in two halves at `k / 2`, each half is merged recursively and the two results
//! are combined by a two-way merge. That forms a balanced merge tree of depth ⌈log2 k⌉ where every tree level
//! touches each of the *N* items once, so the total work is *N* \* log(*k*), the same bound a binary heap merger
//! gives, without the heap.

use std::cmp::Ordering;

use crate::error::ComparisonError;
use crate::merge::{into_ok, partial_compare, try_merge_sorted_by};

/// Merges multiple sorted sequences into a single sorted one.
/// Sequences should be sorted in ascending order otherwise the result is undefined.
///
/// The merge is stable: equal items of an earlier sequence precede those of a later one
/// and items of the same sequence keep their relative order.
///
/// # Example
///
/// ```
/// use kway_merge::merge_k_sorted;
///
/// let merged = merge_k_sorted(vec![vec![1, 4, 5], vec![1, 3, 4], vec![2, 6]]);
/// assert_eq!(merged, vec![1, 1, 2, 3, 4, 4, 5, 6]);
/// ```
pub fn merge_k_sorted<T: Ord>(lists: Vec<Vec<T>>) -> Vec<T> {
    merge_k_sorted_by(lists, T::cmp)
}

/// Merges multiple sorted sequences into a single sorted one using a custom compare function.
///
/// # Arguments
/// * `lists` - Sequences to be merged. Their order defines ties priority
/// * `compare` - Function to be used to compare items
pub fn merge_k_sorted_by<T, F>(lists: Vec<Vec<T>>, mut compare: F) -> Vec<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    into_ok(try_merge_k_sorted_by(lists, |l: &T, r: &T| Ok(compare(l, r))))
}

/// Merges multiple sorted sequences of partially ordered items.
/// Fails with [`ComparisonError`] if any two compared items have no ordering between them.
pub fn try_merge_k_sorted<T: PartialOrd>(lists: Vec<Vec<T>>) -> Result<Vec<T>, ComparisonError> {
    try_merge_k_sorted_by(lists, partial_compare)
}

/// Merges multiple sorted sequences using a fallible compare function.
/// The first error returned by `compare` is propagated unchanged, no partial result is produced.
///
/// # Arguments
/// * `lists` - Sequences to be merged. Their order defines ties priority
/// * `compare` - Function to be used to compare items
pub fn try_merge_k_sorted_by<T, E, F>(lists: Vec<Vec<T>>, mut compare: F) -> Result<Vec<T>, E>
where
    F: FnMut(&T, &T) -> Result<Ordering, E>,
{
    divide_and_conquer(lists, &mut compare)
}

fn divide_and_conquer<T, E, F>(mut lists: Vec<Vec<T>>, compare: &mut F) -> Result<Vec<T>, E>
where
    F: FnMut(&T, &T) -> Result<Ordering, E>,
{
    if lists.len() <= 1 {
        return Ok(lists.pop().unwrap_or_default());
    }

    let right = lists.split_off(lists.len() / 2);
    let left = divide_and_conquer(lists, compare)?;
    let right = divide_and_conquer(right, compare)?;

    return try_merge_sorted_by(left, right, &mut *compare);
}

/// Parallel version of [`try_merge_k_sorted_by`].
/// Both halves of a merge tree node are processed concurrently using `rayon::join` unless the node
/// holds less than `threshold` items. Must be run inside a rayon thread pool to use it.
pub(crate) fn try_par_merge_k_sorted_by<T, E, F>(
    mut lists: Vec<Vec<T>>,
    compare: &F,
    threshold: usize,
) -> Result<Vec<T>, E>
where
    T: Send,
    E: Send,
    F: Fn(&T, &T) -> Result<Ordering, E> + Sync,
{
    if lists.len() <= 1 {
        return Ok(lists.pop().unwrap_or_default());
    }

    let items: usize = lists.iter().map(Vec::len).sum();
    if items < threshold {
        let mut sequential = |l: &T, r: &T| compare(l, r);
        return divide_and_conquer(lists, &mut sequential);
    }

    let right = lists.split_off(lists.len() / 2);
    let (left, right) = rayon::join(
        || try_par_merge_k_sorted_by(lists, compare, threshold),
        || try_par_merge_k_sorted_by(right, compare, threshold),
    );

    // left error takes priority as it would have been raised first by the sequential merge
    return try_merge_sorted_by(left?, right?, compare);
}
