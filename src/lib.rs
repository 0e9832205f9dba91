//! `kway-merge` is a rust k-way sorted sequence merge implementation.
//!
//! K-way merging combines *k* already sorted sequences into a single sorted sequence. This crate does it by
//! pairwise divide and conquer reduction: the list of sequences is split in two halves, every half is merged
//! recursively and the results are combined by a linear two-way merge. The resulting balanced merge tree gives
//! *N* \* log(*k*) time complexity, where *N* is the total number of items, without any auxiliary heap.
//!
//! # Overview
//!
//! `kway-merge` supports the following features:
//!
//! * **Stability:**
//!   equal items of an earlier sequence always precede equal items of a later sequence and items of the same
//!   sequence keep their relative order.
//! * **Custom ordering:**
//!   items can be merged by their [`Ord`] implementation, by a custom compare function or by a fallible compare
//!   function, for instance for partially ordered types like `f64`.
//! * **Tournament strategy:**
//!   an iterative pairwise reduction merge producing the same result without recursion.
//! * **Multithreading support:**
//!   independent parts of the merge tree can be merged in multiple threads.
//! * **Sorted runs persistence:**
//!   sorted runs can be loaded from and saved to files using text or `MessagePack` formats.
//!
//! Sequences are expected to be sorted according to the compare function in use. This is not checked:
//! merging unsorted sequences produces an unspecified order.
//!
//! # Example
//!
//! ```
//! use kway_merge::{KWayMergerBuilder, MergeStrategy};
//!
//! let merger = KWayMergerBuilder::new()
//!     .with_strategy(MergeStrategy::DivideAndConquer)
//!     .with_threads_number(2)
//!     .build()
//!     .unwrap();
//!
//! let merged = merger.merge(vec![vec![1, 4, 5], vec![1, 3, 4], vec![2, 6]]);
//! assert_eq!(merged, vec![1, 1, 2, 3, 4, 4, 5, 6]);
//!
//! let merged = merger.try_merge(vec![vec![0.5, 2.5], vec![f64::NAN]]);
//! assert!(merged.is_err());
//! ```

pub mod error;
pub mod kway;
pub mod merge;
pub mod merger;
pub mod run;
pub mod tournament;

pub use error::{ComparisonError, MergeError};
pub use kway::{merge_k_sorted, merge_k_sorted_by, try_merge_k_sorted, try_merge_k_sorted_by};
pub use merge::{merge_sorted, merge_sorted_by, partial_compare, try_merge_sorted, try_merge_sorted_by};
pub use merger::{KWayMerger, KWayMergerBuilder, MergeStrategy};
pub use run::{LineCodec, RmpCodec, RunCodec, RunError};
pub use tournament::{tournament_merge, tournament_merge_by, try_tournament_merge_by};
