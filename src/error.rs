//! Error types for the aggregation engine

use thiserror::Error;

/// Main error type for the aggregation engine
#[derive(Error, Debug)]
pub enum Error {
    /// Validation error
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A view name is already bound to an incompatible definition
    #[error("Naming conflict: a different view is already registered under {0:?}")]
    NamingConflict(String),

    /// A sample value the engine refuses to accumulate
    #[error("Invalid sample value {value}: must be finite")]
    InvalidSample {
        /// The rejected value (NaN or infinite)
        value: f64,
    },
}

/// Validation errors for aggregation definitions and accumulator combination
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Bucket boundaries were empty
    #[error("bucket boundaries must not be empty")]
    EmptyBoundaries,

    /// Bucket boundary is NaN or infinite
    #[error("bucket boundary at index {index} is not finite")]
    NonFiniteBoundary {
        /// Index of the offending boundary
        index: usize,
    },

    /// Bucket boundaries were not strictly increasing
    #[error("bucket boundaries must be strictly increasing: {prev} >= {next} at index {index}")]
    NonIncreasingBoundaries {
        /// Index of the boundary that broke the ordering
        index: usize,
        /// The preceding boundary value
        prev: f64,
        /// The offending boundary value
        next: f64,
    },

    /// View name empty after canonicalization (unnamed view over an
    /// unnamed measure)
    #[error("view name must not be empty")]
    EmptyViewName,

    /// Attempted to merge accumulators of different kinds
    #[error("cannot merge aggregation data of kind {actual} into kind {expected}")]
    MismatchedKinds {
        /// Kind of the accumulator being merged into
        expected: &'static str,
        /// Kind of the accumulator being merged from
        actual: &'static str,
    },

    /// Attempted to merge distributions with different bucket boundaries
    #[error("cannot merge distributions with different bucket boundaries")]
    MismatchedBoundaries,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
