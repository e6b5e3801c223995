//! Statistical Aggregation Definitions and Accumulators
//!
//! This module describes *how* a view aggregates samples and holds the
//! per-group mutable accumulators that do the work:
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │       Aggregation (definition)      │
//! │  Count | Sum | Mean | Distribution  │
//! └─────────────────────────────────────┘
//!                  ↓ new_data()
//! ┌─────────────────────────────────────┐
//! │    AggregationData (accumulator)    │
//! │  one instance per live tag group    │
//! └─────────────────────────────────────┘
//!                  ↓ snapshot()
//! ┌─────────────────────────────────────┐
//! │     Immutable per-row snapshot      │
//! └─────────────────────────────────────┘
//! ```
//!
//! # Key Components
//!
//! - **`Aggregation`**: Immutable description of the aggregation kind; for
//!   distributions it carries the validated bucket boundaries
//! - **`BucketBoundaries`**: Strictly increasing finite boundaries defining
//!   `len + 1` histogram buckets, closed on the right
//! - **`AggregationData`**: The streaming accumulators (count, sum, running
//!   mean, Welford sum-of-squared-deviations, per-bucket counts)
//!
//! # Example
//!
//! ```rust
//! use statsview::aggregation::{Aggregation, BucketBoundaries};
//!
//! let bounds = BucketBoundaries::new(vec![10.0, 100.0, 1000.0])?;
//! let agg = Aggregation::Distribution(bounds);
//!
//! let mut data = agg.new_data();
//! data.add_sample(42.0, 1_700_000_000_000);
//! assert_eq!(data.count(), 1);
//! # Ok::<(), statsview::Error>(())
//! ```

pub mod data;

pub use data::{AggregationData, CountData, DistributionData, MeanData, SumData};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

// ============================================================================
// Bucket Boundaries
// ============================================================================

/// Validated histogram bucket boundaries
///
/// A sequence `b0 < b1 < ... < bn-1` of finite numbers defines `n + 1`
/// buckets: `(-inf, b0], (b0, b1], ..., (bn-1, +inf)`. Buckets are closed on
/// the right: a value exactly equal to a boundary counts toward the lower
/// bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketBoundaries {
    bounds: Vec<f64>,
}

impl BucketBoundaries {
    /// Create boundaries with validation
    ///
    /// Fails if the sequence is empty, contains a non-finite value, or is
    /// not strictly increasing. On failure nothing is constructed.
    ///
    /// # Example
    ///
    /// ```rust
    /// use statsview::aggregation::BucketBoundaries;
    ///
    /// assert!(BucketBoundaries::new(vec![1.0, 2.0, 3.0]).is_ok());
    /// assert!(BucketBoundaries::new(vec![]).is_err());
    /// assert!(BucketBoundaries::new(vec![2.0, 2.0]).is_err());
    /// assert!(BucketBoundaries::new(vec![1.0, f64::NAN]).is_err());
    /// ```
    pub fn new(bounds: Vec<f64>) -> Result<Self, ValidationError> {
        if bounds.is_empty() {
            return Err(ValidationError::EmptyBoundaries);
        }
        for (index, b) in bounds.iter().enumerate() {
            if !b.is_finite() {
                return Err(ValidationError::NonFiniteBoundary { index });
            }
        }
        for (index, pair) in bounds.windows(2).enumerate() {
            if pair[0] >= pair[1] {
                return Err(ValidationError::NonIncreasingBoundaries {
                    index: index + 1,
                    prev: pair[0],
                    next: pair[1],
                });
            }
        }
        Ok(Self { bounds })
    }

    /// The boundary values
    pub fn as_slice(&self) -> &[f64] {
        &self.bounds
    }

    /// Number of buckets these boundaries define (`len + 1`)
    pub fn bucket_count(&self) -> usize {
        self.bounds.len() + 1
    }

    /// Index of the bucket a value falls into
    ///
    /// Binary search over the boundaries; a value equal to a boundary lands
    /// in the lower bucket (closed-right convention).
    pub fn bucket_index(&self, value: f64) -> usize {
        self.bounds.partition_point(|&b| value > b)
    }
}

// ============================================================================
// Aggregation Definition
// ============================================================================

/// Describes how a view aggregates the samples routed to each tag group
///
/// Immutable after creation. Distribution boundaries are validated when the
/// [`BucketBoundaries`] value is constructed, so every `Aggregation` in
/// existence is well-formed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Aggregation {
    /// Number of samples only
    Count,

    /// Running total of sample values
    Sum,

    /// Running arithmetic mean plus sample count
    Mean,

    /// Histogram: count, min, max, running mean, sum of squared deviations
    /// from the mean, and per-bucket counts
    Distribution(BucketBoundaries),
}

impl Aggregation {
    /// Convenience constructor for a distribution aggregation
    ///
    /// Validates the boundaries; equivalent to
    /// `BucketBoundaries::new(bounds).map(Aggregation::Distribution)`.
    pub fn distribution(bounds: Vec<f64>) -> Result<Self, ValidationError> {
        Ok(Self::Distribution(BucketBoundaries::new(bounds)?))
    }

    /// Create a zero-valued accumulator for this definition
    ///
    /// Used by views to initialize the accumulator for a tag group on first
    /// use.
    pub fn new_data(&self) -> AggregationData {
        match self {
            Self::Count => AggregationData::Count(CountData::new()),
            Self::Sum => AggregationData::Sum(SumData::new()),
            Self::Mean => AggregationData::Mean(MeanData::new()),
            Self::Distribution(bounds) => {
                AggregationData::Distribution(DistributionData::new(bounds.clone()))
            }
        }
    }

    /// Short kind name, used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Sum => "sum",
            Self::Mean => "mean",
            Self::Distribution(_) => "distribution",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries_reject_empty() {
        assert!(matches!(
            BucketBoundaries::new(vec![]),
            Err(ValidationError::EmptyBoundaries)
        ));
    }

    #[test]
    fn test_boundaries_reject_non_increasing() {
        assert!(matches!(
            BucketBoundaries::new(vec![1.0, 1.0]),
            Err(ValidationError::NonIncreasingBoundaries { index: 1, .. })
        ));
        assert!(matches!(
            BucketBoundaries::new(vec![1.0, 5.0, 3.0]),
            Err(ValidationError::NonIncreasingBoundaries { index: 2, .. })
        ));
    }

    #[test]
    fn test_boundaries_reject_non_finite() {
        assert!(matches!(
            BucketBoundaries::new(vec![f64::INFINITY]),
            Err(ValidationError::NonFiniteBoundary { index: 0 })
        ));
        assert!(matches!(
            BucketBoundaries::new(vec![1.0, f64::NAN]),
            Err(ValidationError::NonFiniteBoundary { index: 1 })
        ));
    }

    #[test]
    fn test_bucket_index_closed_right() {
        let bounds = BucketBoundaries::new(vec![2.0, 4.0]).unwrap();
        assert_eq!(bounds.bucket_count(), 3);

        assert_eq!(bounds.bucket_index(1.0), 0);
        // A value on a boundary falls into the lower bucket.
        assert_eq!(bounds.bucket_index(2.0), 0);
        assert_eq!(bounds.bucket_index(3.0), 1);
        assert_eq!(bounds.bucket_index(4.0), 1);
        assert_eq!(bounds.bucket_index(5.0), 2);
    }

    #[test]
    fn test_new_data_matches_definition() {
        assert!(matches!(
            Aggregation::Count.new_data(),
            AggregationData::Count(_)
        ));
        assert!(matches!(
            Aggregation::Sum.new_data(),
            AggregationData::Sum(_)
        ));
        assert!(matches!(
            Aggregation::Mean.new_data(),
            AggregationData::Mean(_)
        ));

        let agg = Aggregation::distribution(vec![1.0, 2.0]).unwrap();
        match agg.new_data() {
            AggregationData::Distribution(d) => {
                assert_eq!(d.bucket_counts().len(), 3);
            }
            other => panic!("expected distribution data, got {:?}", other),
        }
    }
}
