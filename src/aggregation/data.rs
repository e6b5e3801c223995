//! Streaming accumulators backing each live tag group
//!
//! One `AggregationData` instance exists per (view, group signature) pair and
//! is mutated in place as samples arrive. All kinds keep O(1) state per
//! group regardless of sample volume: the distribution kind tracks variance
//! through Welford's online update instead of retaining samples.
//!
//! Accumulators of the same kind combine deterministically: merging two
//! instances yields the same result as having recorded the union of their
//! inputs in any interleaved order. Distribution merging uses the parallel
//! variance combination formula (Chan et al.), not naive averaging.

use serde::{Deserialize, Serialize};

use super::BucketBoundaries;
use crate::error::ValidationError;

// ============================================================================
// Per-Kind Accumulators
// ============================================================================

/// Counts samples, nothing else
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountData {
    count: u64,
}

impl CountData {
    /// Create a zero-valued count accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one sample
    pub fn add(&mut self) {
        self.count += 1;
    }

    /// Number of samples recorded
    pub fn count(&self) -> u64 {
        self.count
    }
}

/// Running total of sample values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SumData {
    sum: f64,
}

impl SumData {
    /// Create a zero-valued sum accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one sample
    pub fn add(&mut self, value: f64) {
        self.sum += value;
    }

    /// Accumulated total
    pub fn sum(&self) -> f64 {
        self.sum
    }
}

/// Running arithmetic mean plus sample count
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeanData {
    mean: f64,
    count: u64,
}

impl MeanData {
    /// Create a zero-valued mean accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one sample with an incremental mean update
    pub fn add(&mut self, value: f64) {
        self.count += 1;
        self.mean += (value - self.mean) / self.count as f64;
    }

    /// Running mean; 0 before the first sample
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Number of samples recorded
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Total of recorded values, recovered as `mean * count`
    pub fn sum(&self) -> f64 {
        self.mean * self.count as f64
    }

    fn merge(&mut self, other: &MeanData) {
        if other.count == 0 {
            return;
        }
        let n_b = other.count as f64;
        let n = (self.count + other.count) as f64;
        self.mean += (other.mean - self.mean) * n_b / n;
        self.count += other.count;
    }
}

/// Histogram accumulator
///
/// Tracks count, min, max, running mean, the sum of squared deviations from
/// the mean, and one counter per bucket. `sum_of_squared_deviation / count`
/// is the population variance of the recorded values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionData {
    count: u64,
    min: f64,
    max: f64,
    mean: f64,
    sum_of_squared_deviation: f64,
    count_per_bucket: Vec<u64>,
    bounds: BucketBoundaries,
}

impl DistributionData {
    /// Create a zero-valued distribution accumulator for the given boundaries
    pub fn new(bounds: BucketBoundaries) -> Self {
        Self {
            count: 0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            mean: 0.0,
            sum_of_squared_deviation: 0.0,
            count_per_bucket: vec![0; bounds.bucket_count()],
            bounds,
        }
    }

    /// Record one sample
    ///
    /// Mean and sum-of-squared-deviations follow Welford's online update, so
    /// no samples are retained.
    pub fn add(&mut self, value: f64) {
        self.count += 1;
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }

        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.sum_of_squared_deviation += delta * (value - self.mean);

        let bucket = self.bounds.bucket_index(value);
        self.count_per_bucket[bucket] += 1;
    }

    /// Number of samples recorded
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Smallest recorded value; meaningless until `count() >= 1`
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Largest recorded value; meaningless until `count() >= 1`
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Running arithmetic mean of all recorded values
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Sum of squared deviations from the mean
    pub fn sum_of_squared_deviation(&self) -> f64 {
        self.sum_of_squared_deviation
    }

    /// Population variance, `sum_of_squared_deviation / count`
    pub fn variance(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum_of_squared_deviation / self.count as f64
        }
    }

    /// Per-bucket sample counts; always sums to `count()`
    pub fn bucket_counts(&self) -> &[u64] {
        &self.count_per_bucket
    }

    /// The boundaries this histogram was built with
    pub fn boundaries(&self) -> &BucketBoundaries {
        &self.bounds
    }

    fn merge(&mut self, other: &DistributionData) -> Result<(), ValidationError> {
        if self.bounds != other.bounds {
            return Err(ValidationError::MismatchedBoundaries);
        }
        if other.count == 0 {
            return Ok(());
        }

        if other.min < self.min {
            self.min = other.min;
        }
        if other.max > self.max {
            self.max = other.max;
        }

        // Parallel combination (Chan et al.): exact even when one side is
        // empty, since the cross term vanishes with n_a == 0.
        let n_a = self.count as f64;
        let n_b = other.count as f64;
        let n = n_a + n_b;
        let delta = other.mean - self.mean;
        self.sum_of_squared_deviation +=
            other.sum_of_squared_deviation + delta * delta * n_a * n_b / n;
        self.mean += delta * n_b / n;
        self.count += other.count;

        for (mine, theirs) in self
            .count_per_bucket
            .iter_mut()
            .zip(other.count_per_bucket.iter())
        {
            *mine += theirs;
        }
        Ok(())
    }
}

// ============================================================================
// Unified Accumulator
// ============================================================================

/// Per-group mutable accumulator, one of the four aggregation kinds
///
/// Created zero-valued by [`Aggregation::new_data`](super::Aggregation::new_data)
/// when a view sees a group signature for the first time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AggregationData {
    /// Sample count only
    Count(CountData),
    /// Running value total
    Sum(SumData),
    /// Running mean plus count
    Mean(MeanData),
    /// Histogram with streaming variance
    Distribution(DistributionData),
}

impl AggregationData {
    /// Record one sample into the accumulator
    ///
    /// Never fails for finite input; callers (the view boundary) reject
    /// non-finite values before they reach this layer. The timestamp is the
    /// sample's arrival time in epoch milliseconds; none of the current
    /// kinds retains it.
    pub fn add_sample(&mut self, value: f64, _timestamp_ms: i64) {
        match self {
            Self::Count(d) => d.add(),
            Self::Sum(d) => d.add(value),
            Self::Mean(d) => d.add(value),
            Self::Distribution(d) => d.add(value),
        }
    }

    /// Produce an immutable copy safe to hand to a reader while the live
    /// accumulator keeps mutating
    pub fn snapshot(&self) -> AggregationData {
        self.clone()
    }

    /// Combine another accumulator of the same kind into this one
    ///
    /// The result is identical to having recorded both input streams into a
    /// single accumulator, in any order. Mismatched kinds (or mismatched
    /// distribution boundaries) are a validation error and leave `self`
    /// untouched.
    pub fn merge(&mut self, other: &AggregationData) -> Result<(), ValidationError> {
        match (self, other) {
            (Self::Count(a), Self::Count(b)) => {
                a.count += b.count;
                Ok(())
            }
            (Self::Sum(a), Self::Sum(b)) => {
                a.sum += b.sum;
                Ok(())
            }
            (Self::Mean(a), Self::Mean(b)) => {
                a.merge(b);
                Ok(())
            }
            (Self::Distribution(a), Self::Distribution(b)) => a.merge(b),
            (me, other) => Err(ValidationError::MismatchedKinds {
                expected: me.kind_name(),
                actual: other.kind_name(),
            }),
        }
    }

    /// Number of samples this accumulator has seen
    pub fn count(&self) -> u64 {
        match self {
            Self::Count(d) => d.count(),
            Self::Sum(_) => 0,
            Self::Mean(d) => d.count(),
            Self::Distribution(d) => d.count(),
        }
    }

    /// Short kind name, used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Count(_) => "count",
            Self::Sum(_) => "sum",
            Self::Mean(_) => "mean",
            Self::Distribution(_) => "distribution",
        }
    }
}
