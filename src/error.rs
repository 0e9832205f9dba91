//! Merge errors.

use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::fmt::Display;

/// Element comparison error.
/// Raised when two elements being compared are not mutually orderable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonError {
    reason: Cow<'static, str>,
}

impl ComparisonError {
    /// Creates a comparison error with a custom reason.
    pub fn new(reason: impl Into<Cow<'static, str>>) -> Self {
        ComparisonError { reason: reason.into() }
    }

    /// Creates a comparison error for a pair of elements that have no ordering between them.
    pub fn unordered() -> Self {
        ComparisonError::new("elements are not mutually comparable")
    }

    /// Returns the error reason.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl Display for ComparisonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "comparison failed: {}", self.reason)
    }
}

impl Error for ComparisonError {}

/// Merging error.
#[derive(Debug)]
pub enum MergeError<E = ComparisonError> {
    /// Workers thread pool initialization error.
    ThreadPoolBuildError(rayon::ThreadPoolBuildError),
    /// Elements comparison error.
    ComparisonError(E),
}

impl<E> Error for MergeError<E>
where
    E: Error + 'static,
{
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(match &self {
            MergeError::ThreadPoolBuildError(err) => err,
            MergeError::ComparisonError(err) => err,
        })
    }
}

impl<E: Display> Display for MergeError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self {
            MergeError::ThreadPoolBuildError(err) => write!(f, "thread pool initialization failed: {}", err),
            MergeError::ComparisonError(err) => write!(f, "elements comparison error: {}", err),
        }
    }
}
