//! Statsview - In-process metrics aggregation engine
//!
//! This library turns a stream of tagged numeric samples into grouped
//! statistical summaries:
//! - Views bind a measure, a subset of tag keys, and an aggregation kind
//! - Samples are grouped by a canonical, order-insensitive tag signature
//! - Per-group accumulators maintain count, sum, mean, and distribution
//!   histograms with O(1) streaming updates (Welford variance tracking)
//! - Snapshots are available at any time as immutable rows, concurrently
//!   with recording
//!
//! # Example
//!
//! ```rust
//! use statsview::aggregation::Aggregation;
//! use statsview::types::{Measure, TagKey, TagSet};
//! use statsview::view::{View, ViewRegistry};
//!
//! let registry = ViewRegistry::new();
//! let measure = Measure::new("request_latency_ms", "request latency", "ms");
//! registry.subscribe(View::new(
//!     measure,
//!     vec![TagKey::new("method")],
//!     Aggregation::distribution(vec![10.0, 100.0, 1000.0])?,
//! ))?;
//!
//! registry.record(
//!     "request_latency_ms",
//!     &TagSet::from_pairs([("method", "GET")]),
//!     42.0,
//! );
//!
//! let rows = registry.find("request_latency_ms").unwrap().collected_rows();
//! assert_eq!(rows.len(), 1);
//! # Ok::<(), statsview::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod aggregation;
pub mod error;
pub mod types;
pub mod view;

// Re-export main types
pub use aggregation::{Aggregation, AggregationData, BucketBoundaries};
pub use error::{Error, Result};
pub use types::{Measure, Tag, TagKey, TagSet};
pub use view::{default_registry, Row, View, ViewRegistry};

#[cfg(test)]
mod tests {
    #[test]
    fn test_basic_sanity() {
        assert_eq!(2 + 2, 4);
    }
}
