//! Tournament (pairwise reduction) k-way merge.
//!
//! Iterative alternative to the divide and conquer merger: every round merges adjacent sequence pairs until a single
//! sequence remains. It takes ⌈log2 k⌉ rounds and never recurses, so it is suitable for any number of sequences.

use std::cmp::Ordering;

use rayon::prelude::*;

use crate::merge::{into_ok, try_merge_sorted_by};

/// Merges multiple sorted sequences into a single sorted one round by round.
/// For sorted inputs the result is identical to [`merge_k_sorted`](crate::merge_k_sorted).
pub fn tournament_merge<T: Ord>(lists: Vec<Vec<T>>) -> Vec<T> {
    tournament_merge_by(lists, T::cmp)
}

/// Merges multiple sorted sequences round by round using a custom compare function.
pub fn tournament_merge_by<T, F>(lists: Vec<Vec<T>>, mut compare: F) -> Vec<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    into_ok(try_tournament_merge_by(lists, |l: &T, r: &T| Ok(compare(l, r))))
}

/// Merges multiple sorted sequences round by round using a fallible compare function.
/// The first error returned by `compare` aborts the merge and is returned unchanged.
///
/// # Arguments
/// * `lists` - Sequences to be merged. Their order defines ties priority
/// * `compare` - Function to be used to compare items
pub fn try_tournament_merge_by<T, E, F>(lists: Vec<Vec<T>>, mut compare: F) -> Result<Vec<T>, E>
where
    F: FnMut(&T, &T) -> Result<Ordering, E>,
{
    let mut runs = lists;

    while runs.len() > 1 {
        log::trace!("tournament round (runs: {})", runs.len());

        let mut winners = Vec::with_capacity((runs.len() + 1) / 2);
        let mut pending = runs.into_iter();
        while let Some(left) = pending.next() {
            let merged = match pending.next() {
                Some(right) => try_merge_sorted_by(left, right, &mut compare)?,
                // odd run out advances to the next round as is
                None => left,
            };
            winners.push(merged);
        }
        runs = winners;
    }

    return Ok(runs.pop().unwrap_or_default());
}

/// Parallel version of [`try_tournament_merge_by`].
/// Pairs of a round are merged concurrently. If several pairs fail the error of the leftmost one is returned.
pub(crate) fn try_par_tournament_merge_by<T, E, F>(lists: Vec<Vec<T>>, compare: &F) -> Result<Vec<T>, E>
where
    T: Send,
    E: Send,
    F: Fn(&T, &T) -> Result<Ordering, E> + Sync,
{
    let mut runs = lists;

    while runs.len() > 1 {
        log::trace!("tournament round (runs: {})", runs.len());

        let mut pairs = Vec::with_capacity((runs.len() + 1) / 2);
        let mut pending = runs.into_iter();
        while let Some(left) = pending.next() {
            pairs.push((left, pending.next()));
        }

        let winners: Vec<Result<Vec<T>, E>> = pairs
            .into_par_iter()
            .map(|(left, right)| match right {
                Some(right) => try_merge_sorted_by(left, right, compare),
                None => Ok(left),
            })
            .collect();

        runs = winners.into_iter().collect::<Result<Vec<_>, _>>()?;
    }

    return Ok(runs.pop().unwrap_or_default());
}
