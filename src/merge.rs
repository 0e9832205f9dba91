//! Two-way merge.

use std::cmp::Ordering;
use std::convert::Infallible;

use crate::error::ComparisonError;

/// Merges two sorted sequences into a single sorted one.
/// Both sequences should be sorted in ascending order otherwise the result is undefined.
///
/// On ties the element of `left` is emitted first, so the merge is stable with respect to the operands order.
///
/// # Example
///
/// ```
/// use kway_merge::merge_sorted;
///
/// assert_eq!(merge_sorted(vec![1, 3, 5], vec![2, 3, 4]), vec![1, 2, 3, 3, 4, 5]);
/// ```
pub fn merge_sorted<T: Ord>(left: Vec<T>, right: Vec<T>) -> Vec<T> {
    merge_sorted_by(left, right, T::cmp)
}

/// Merges two sorted sequences into a single sorted one using a custom compare function.
///
/// # Arguments
/// * `left` - First sequence, sorted according to `compare`. Takes priority on ties
/// * `right` - Second sequence, sorted according to `compare`
/// * `compare` - Function to be used to compare items
pub fn merge_sorted_by<T, F>(left: Vec<T>, right: Vec<T>, mut compare: F) -> Vec<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    into_ok(try_merge_sorted_by(left, right, |l: &T, r: &T| Ok(compare(l, r))))
}

/// Merges two sorted sequences of partially ordered items.
/// Fails with [`ComparisonError`] on the first pair of items that have no ordering between them.
pub fn try_merge_sorted<T: PartialOrd>(left: Vec<T>, right: Vec<T>) -> Result<Vec<T>, ComparisonError> {
    try_merge_sorted_by(left, right, partial_compare)
}

/// Merges two sorted sequences using a fallible compare function.
/// The first error returned by `compare` aborts the merge and is returned unchanged.
///
/// # Arguments
/// * `left` - First sequence, sorted according to `compare`. Takes priority on ties
/// * `right` - Second sequence, sorted according to `compare`
/// * `compare` - Function to be used to compare items
pub fn try_merge_sorted_by<T, E, F>(left: Vec<T>, right: Vec<T>, mut compare: F) -> Result<Vec<T>, E>
where
    F: FnMut(&T, &T) -> Result<Ordering, E>,
{
    if left.is_empty() {
        return Ok(right);
    }
    if right.is_empty() {
        return Ok(left);
    }

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();

    loop {
        let take_left = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => compare(l, r)? != Ordering::Greater,
            _ => break,
        };

        let item = if take_left { left.next() } else { right.next() };
        merged.extend(item);
    }

    // at most one of the inputs is not exhausted at this point
    merged.extend(left);
    merged.extend(right);

    return Ok(merged);
}

/// Compares partially ordered items.
/// Returns [`ComparisonError`] if the items are not comparable (e.g. one of them is `NaN`).
pub fn partial_compare<T: PartialOrd>(a: &T, b: &T) -> Result<Ordering, ComparisonError> {
    a.partial_cmp(b).ok_or_else(ComparisonError::unordered)
}

pub(crate) fn into_ok<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}
