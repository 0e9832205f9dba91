//! Configurable k-way merger.

use std::cmp::Ordering;
use std::convert::Infallible;

use log;

use crate::error::{ComparisonError, MergeError};
use crate::kway::{try_merge_k_sorted_by, try_par_merge_k_sorted_by};
use crate::merge::{into_ok, partial_compare};
use crate::tournament::{try_par_tournament_merge_by, try_tournament_merge_by};

/// Default number of items below which a merge tree node is merged sequentially in parallel mode.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 16 * 1024;

/// K-way merge strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Recursive halving of the sequences list. Recursion depth is log2(*k*).
    DivideAndConquer,
    /// Iterative merging of adjacent sequence pairs.
    Tournament,
}

impl Default for MergeStrategy {
    fn default() -> Self {
        MergeStrategy::DivideAndConquer
    }
}

/// K-way merger builder. Provides methods for [`KWayMerger`] initialization.
#[derive(Debug, Clone)]
pub struct KWayMergerBuilder {
    /// Merge strategy.
    strategy: MergeStrategy,
    /// Merge independent sub-sequences in parallel.
    parallel: bool,
    /// Number of threads to be used to merge data in parallel.
    threads_number: Option<usize>,
    /// Number of items below which merging is done sequentially.
    parallel_threshold: usize,
}

impl KWayMergerBuilder {
    /// Creates an instance of a builder with default parameters.
    pub fn new() -> Self {
        KWayMergerBuilder::default()
    }

    /// Builds a [`KWayMerger`] instance using provided configuration.
    pub fn build(self) -> Result<KWayMerger, MergeError> {
        KWayMerger::new(
            self.strategy,
            self.parallel,
            self.threads_number,
            self.parallel_threshold,
        )
    }

    /// Sets merge strategy.
    pub fn with_strategy(mut self, strategy: MergeStrategy) -> KWayMergerBuilder {
        self.strategy = strategy;
        return self;
    }

    /// Enables or disables parallel merging.
    pub fn with_parallel(mut self, parallel: bool) -> KWayMergerBuilder {
        self.parallel = parallel;
        return self;
    }

    /// Sets number of threads to be used to merge data in parallel. Enables parallel merging.
    pub fn with_threads_number(mut self, threads_number: usize) -> KWayMergerBuilder {
        self.parallel = true;
        self.threads_number = Some(threads_number);
        return self;
    }

    /// Sets number of items below which a merge tree node is merged sequentially.
    /// Used only by the divide and conquer strategy in parallel mode.
    pub fn with_parallel_threshold(mut self, parallel_threshold: usize) -> KWayMergerBuilder {
        self.parallel_threshold = parallel_threshold;
        return self;
    }
}

impl Default for KWayMergerBuilder {
    fn default() -> Self {
        KWayMergerBuilder {
            strategy: MergeStrategy::default(),
            parallel: false,
            threads_number: None,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

/// K-way merger.
/// Merges multiple sorted sequences into a single sorted one using the configured strategy.
/// Every strategy, sequential or parallel, produces the same stable result.
pub struct KWayMerger {
    /// Merge strategy.
    strategy: MergeStrategy,
    /// Merging thread pool. Present only in parallel mode.
    thread_pool: Option<rayon::ThreadPool>,
    /// Number of items below which merging is done sequentially.
    parallel_threshold: usize,
}

impl KWayMerger {
    /// Creates a new k-way merger instance.
    ///
    /// # Arguments
    /// * `strategy` - Merge strategy
    /// * `parallel` - Merge independent sub-sequences in parallel
    /// * `threads_number` - Number of threads to be used to merge data in parallel. If the parameter is [`None`]
    ///   threads number will be selected based on available CPU core number.
    /// * `parallel_threshold` - Number of items below which merging is done sequentially.
    pub fn new(
        strategy: MergeStrategy,
        parallel: bool,
        threads_number: Option<usize>,
        parallel_threshold: usize,
    ) -> Result<Self, MergeError> {
        let thread_pool = if parallel {
            Some(Self::init_thread_pool(threads_number)?)
        } else {
            None
        };

        return Ok(KWayMerger {
            strategy,
            thread_pool,
            parallel_threshold,
        });
    }

    fn init_thread_pool(threads_number: Option<usize>) -> Result<rayon::ThreadPool, MergeError> {
        let mut thread_pool_builder = rayon::ThreadPoolBuilder::new();

        if let Some(threads_number) = threads_number {
            log::info!("initializing thread-pool (threads: {})", threads_number);
            thread_pool_builder = thread_pool_builder.num_threads(threads_number);
        } else {
            log::info!("initializing thread-pool (threads: default)");
        }
        let thread_pool = thread_pool_builder
            .build()
            .map_err(|err| MergeError::ThreadPoolBuildError(err))?;

        return Ok(thread_pool);
    }

    /// Returns merge strategy.
    pub fn strategy(&self) -> MergeStrategy {
        self.strategy
    }

    /// Checks if the merger runs in parallel mode.
    pub fn is_parallel(&self) -> bool {
        self.thread_pool.is_some()
    }

    /// Merges sorted sequences.
    ///
    /// # Arguments
    /// * `lists` - Sequences sorted in ascending order. Their order defines ties priority
    pub fn merge<T>(&self, lists: Vec<Vec<T>>) -> Vec<T>
    where
        T: Ord + Send,
    {
        self.merge_by(lists, T::cmp)
    }

    /// Merges sorted sequences using a custom compare function.
    ///
    /// # Arguments
    /// * `lists` - Sequences sorted according to `compare`. Their order defines ties priority
    /// * `compare` - Function to be used to compare items
    pub fn merge_by<T, F>(&self, lists: Vec<Vec<T>>, compare: F) -> Vec<T>
    where
        T: Send,
        F: Fn(&T, &T) -> Ordering + Sync + Send,
    {
        into_ok(self.run(lists, |l: &T, r: &T| Ok::<_, Infallible>(compare(l, r))))
    }

    /// Merges sorted sequences of partially ordered items.
    /// Fails if any two compared items have no ordering between them.
    pub fn try_merge<T>(&self, lists: Vec<Vec<T>>) -> Result<Vec<T>, MergeError<ComparisonError>>
    where
        T: PartialOrd + Send,
    {
        self.try_merge_by(lists, partial_compare)
    }

    /// Merges sorted sequences using a fallible compare function.
    /// The error returned by `compare` is wrapped into [`MergeError::ComparisonError`].
    ///
    /// # Arguments
    /// * `lists` - Sequences sorted according to `compare`. Their order defines ties priority
    /// * `compare` - Function to be used to compare items
    pub fn try_merge_by<T, E, F>(&self, lists: Vec<Vec<T>>, compare: F) -> Result<Vec<T>, MergeError<E>>
    where
        T: Send,
        E: Send,
        F: Fn(&T, &T) -> Result<Ordering, E> + Sync + Send,
    {
        self.run(lists, compare).map_err(MergeError::ComparisonError)
    }

    fn run<T, E, F>(&self, lists: Vec<Vec<T>>, compare: F) -> Result<Vec<T>, E>
    where
        T: Send,
        E: Send,
        F: Fn(&T, &T) -> Result<Ordering, E> + Sync + Send,
    {
        let strategy = self.strategy;
        let parallel_threshold = self.parallel_threshold;

        log::debug!(
            "merging {} sequences (items: {}, strategy: {:?}, parallel: {})",
            lists.len(),
            lists.iter().map(Vec::len).sum::<usize>(),
            strategy,
            self.is_parallel(),
        );

        let merged = match &self.thread_pool {
            Some(thread_pool) => thread_pool.install(|| match strategy {
                MergeStrategy::DivideAndConquer => try_par_merge_k_sorted_by(lists, &compare, parallel_threshold),
                MergeStrategy::Tournament => try_par_tournament_merge_by(lists, &compare),
            }),
            None => match strategy {
                MergeStrategy::DivideAndConquer => try_merge_k_sorted_by(lists, compare),
                MergeStrategy::Tournament => try_tournament_merge_by(lists, compare),
            },
        };

        match &merged {
            Ok(merged) => log::debug!("merge done (items: {})", merged.len()),
            Err(_) => log::debug!("merge aborted on comparison error"),
        }

        return merged;
    }
}

#[cfg(test)]
mod test {
    use std::cmp::Ordering;

    use rand::Rng;
    use rstest::*;

    use super::{KWayMerger, KWayMergerBuilder, MergeStrategy};
    use crate::error::{ComparisonError, MergeError};

    fn build_merger(strategy: MergeStrategy, parallel: bool) -> KWayMerger {
        let mut builder = KWayMergerBuilder::new()
            .with_strategy(strategy)
            .with_parallel_threshold(8);
        if parallel {
            builder = builder.with_threads_number(2);
        }

        builder.build().unwrap()
    }

    #[test]
    fn test_merger_builder_defaults() {
        let merger = KWayMergerBuilder::new().build().unwrap();

        assert_eq!(merger.strategy(), MergeStrategy::DivideAndConquer);
        assert_eq!(merger.is_parallel(), false);
    }

    #[rstest]
    #[case(MergeStrategy::DivideAndConquer, false)]
    #[case(MergeStrategy::DivideAndConquer, true)]
    #[case(MergeStrategy::Tournament, false)]
    #[case(MergeStrategy::Tournament, true)]
    fn test_merger(#[case] strategy: MergeStrategy, #[case] parallel: bool) {
        let merger = build_merger(strategy, parallel);
        assert_eq!(merger.is_parallel(), parallel);

        let actual_result = merger.merge(vec![vec![1, 4, 5], vec![1, 3, 4], vec![2, 6]]);
        assert_eq!(actual_result, vec![1, 1, 2, 3, 4, 4, 5, 6]);

        let actual_result = merger.merge(Vec::<Vec<i32>>::new());
        assert_eq!(actual_result, Vec::<i32>::new());
    }

    #[rstest]
    #[case(MergeStrategy::DivideAndConquer, false)]
    #[case(MergeStrategy::DivideAndConquer, true)]
    #[case(MergeStrategy::Tournament, false)]
    #[case(MergeStrategy::Tournament, true)]
    fn test_merger_stability(#[case] strategy: MergeStrategy, #[case] parallel: bool) {
        let mut rng = rand::thread_rng();
        let lists: Vec<Vec<(i32, usize, usize)>> = (0..40)
            .map(|list_idx| {
                let mut values: Vec<i32> = (0..rng.gen_range(0..30)).map(|_| rng.gen_range(0..10)).collect();
                values.sort();
                values
                    .into_iter()
                    .enumerate()
                    .map(|(pos, value)| (value, list_idx, pos))
                    .collect()
            })
            .collect();

        let mut expected_result: Vec<_> = lists.iter().flatten().copied().collect();
        expected_result.sort_by_key(|item| item.0);

        let merger = build_merger(strategy, parallel);
        let actual_result = merger.merge_by(lists, |a, b| a.0.cmp(&b.0));

        assert_eq!(actual_result, expected_result);
    }

    #[rstest]
    #[case(false)]
    #[case(true)]
    fn test_merger_descending(#[case] parallel: bool) {
        let merger = build_merger(MergeStrategy::DivideAndConquer, parallel);

        let lists = vec![vec![9, 5, 1], vec![8, 5, 2], vec![7], vec![10, 0]];
        let actual_result = merger.merge_by(lists, |a: &i32, b: &i32| a.cmp(b).reverse());

        assert_eq!(actual_result, vec![10, 9, 8, 7, 5, 5, 2, 1, 0]);
    }

    #[rstest]
    #[case(MergeStrategy::DivideAndConquer, false)]
    #[case(MergeStrategy::DivideAndConquer, true)]
    #[case(MergeStrategy::Tournament, false)]
    #[case(MergeStrategy::Tournament, true)]
    fn test_merger_comparison_error(#[case] strategy: MergeStrategy, #[case] parallel: bool) {
        let merger = build_merger(strategy, parallel);

        let actual_result = merger.try_merge(vec![vec![0.5, 1.5], vec![1.0, f64::NAN], vec![2.0]]);
        match actual_result {
            Err(MergeError::ComparisonError(err)) => assert_eq!(err, ComparisonError::unordered()),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_merger_custom_error() {
        let merger = build_merger(MergeStrategy::Tournament, false);

        let actual_result = merger.try_merge_by(vec![vec!["a", "c"], vec!["B", "d"]], |a: &&str, b: &&str| {
            if a.chars().chain(b.chars()).all(|c| c.is_lowercase()) {
                Ok(a.cmp(b))
            } else {
                Err(format!("mixed case: {} {}", a, b))
            }
        });

        match actual_result {
            Err(MergeError::ComparisonError(err)) => assert_eq!(err, "mixed case: a B"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_merger_try_merge_ordered() {
        let merger = build_merger(MergeStrategy::DivideAndConquer, true);

        let actual_result = merger.try_merge(vec![vec![0.5, 1.5], vec![1.0, 2.5]]).unwrap();
        assert_eq!(actual_result, vec![0.5, 1.0, 1.5, 2.5]);

        let compare = |a: &f64, b: &f64| a.partial_cmp(b).map(Ordering::reverse).ok_or_else(ComparisonError::unordered);
        let actual_result = merger.try_merge_by(vec![vec![1.5, 0.5], vec![2.5, 1.0]], compare).unwrap();
        assert_eq!(actual_result, vec![2.5, 1.5, 1.0, 0.5]);
    }
}
