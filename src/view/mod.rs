//! Views: tag-grouped statistical summaries over one measure
//!
//! A view binds a [`Measure`], a subset of tag keys to group by, and an
//! [`Aggregation`]. Incoming samples are projected onto the view's keys,
//! routed to a per-group accumulator created on first use, and can be read
//! back at any time as a snapshot of [`Row`]s:
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   Sample (measure, tags, value)     │
//! └─────────────────────────────────────┘
//!                  ↓ project onto tag keys
//! ┌─────────────────────────────────────┐
//! │        Group signature              │
//! │  canonical (key, value) encoding    │
//! └─────────────────────────────────────┘
//!                  ↓ lookup-or-create
//! ┌─────────────────────────────────────┐
//! │   AggregationData per group         │
//! └─────────────────────────────────────┘
//!                  ↓ collected_rows()
//! ┌─────────────────────────────────────┐
//! │   Vec<Row> (point-in-time copy)     │
//! └─────────────────────────────────────┘
//! ```
//!
//! # Lifecycle
//!
//! A freshly constructed view is unregistered and dormant. Registration
//! through a [`ViewRegistry`](crate::view::registry::ViewRegistry)
//! canonicalizes it (tag keys sorted and de-duplicated, name/description
//! defaulted from the measure) and subscribes it. `subscribe` and
//! `unsubscribe` toggle accumulation; collection and clearing work in both
//! states, and there is no way back to unregistered.
//!
//! # Example
//!
//! ```rust
//! use statsview::aggregation::Aggregation;
//! use statsview::types::{Measure, TagKey, TagSet};
//! use statsview::view::View;
//!
//! let measure = Measure::new("request_latency_ms", "request latency", "ms");
//! let mut view = View::new(measure, vec![TagKey::new("method")], Aggregation::Sum);
//! view.canonicalize()?;
//! view.subscribe();
//!
//! view.add_sample(&TagSet::from_pairs([("method", "GET")]), 12.0)?;
//! view.add_sample(&TagSet::from_pairs([("method", "GET")]), 30.0)?;
//!
//! let rows = view.collected_rows();
//! assert_eq!(rows.len(), 1);
//! # Ok::<(), statsview::Error>(())
//! ```

mod collector;
pub mod registry;
mod row;

pub use registry::{default_registry, RegistryStatsSnapshot, ViewRegistry};
pub use row::Row;

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::RwLock;

use crate::aggregation::Aggregation;
use crate::error::{Error, Result, ValidationError};
use crate::types::{Measure, TagKey, TagSet};
use collector::Collector;

/// Current time in epoch milliseconds
fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// A tag-grouped statistical summary over one measure
///
/// The view exclusively owns its group table and every accumulator within
/// it. All sample-path and collection methods take `&self`: the group table
/// lives behind a read-write lock so producers and collectors can run
/// concurrently from different threads.
#[derive(Debug)]
pub struct View {
    name: String,
    description: String,
    measure: Measure,
    tag_keys: Vec<TagKey>,
    aggregation: Aggregation,
    subscribed: AtomicBool,
    collector: RwLock<Collector>,
}

impl View {
    /// Create a new view definition
    ///
    /// Name and description start empty and default from the measure during
    /// [`canonicalize`](Self::canonicalize). An empty `tag_keys` list is
    /// valid and yields a single group aggregating every sample.
    pub fn new(measure: Measure, tag_keys: Vec<TagKey>, aggregation: Aggregation) -> Self {
        let collector = Collector::new(aggregation.clone());
        Self {
            name: String::new(),
            description: String::new(),
            measure,
            tag_keys,
            aggregation,
            subscribed: AtomicBool::new(false),
            collector: RwLock::new(collector),
        }
    }

    /// Set an explicit name, overriding the measure-name default
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set an explicit description, overriding the measure default
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Canonical view name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// View description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The measure this view aggregates
    pub fn measure(&self) -> &Measure {
        &self.measure
    }

    /// Tag keys the view groups by, in canonical sorted order once
    /// canonicalized
    pub fn tag_keys(&self) -> &[TagKey] {
        &self.tag_keys
    }

    /// The aggregation definition
    pub fn aggregation(&self) -> &Aggregation {
        &self.aggregation
    }

    /// Normalize the definition; idempotent
    ///
    /// Sorts tag keys by name, removes duplicates, and fills an unset name
    /// or description from the measure. Name-collision validation against
    /// other registered views happens at registry subscribe time, which is
    /// where this is normally invoked.
    pub fn canonicalize(&mut self) -> Result<()> {
        if self.name.is_empty() {
            self.name = self.measure.name().to_string();
        }
        if self.description.is_empty() {
            self.description = self.measure.description().to_string();
        }
        if self.name.is_empty() {
            return Err(ValidationError::EmptyViewName.into());
        }
        self.tag_keys.sort();
        self.tag_keys.dedup();
        Ok(())
    }

    /// Start accumulating incoming samples
    pub fn subscribe(&self) {
        self.subscribed.store(true, Ordering::Relaxed);
    }

    /// Stop accumulating; already-collected groups remain queryable
    pub fn unsubscribe(&self) {
        self.subscribed.store(false, Ordering::Relaxed);
    }

    /// Whether the view is currently accumulating
    pub fn is_subscribed(&self) -> bool {
        self.subscribed.load(Ordering::Relaxed)
    }

    /// Record one sample into the view
    ///
    /// Non-finite values are rejected with [`Error::InvalidSample`] before
    /// touching any accumulator. When the view is not subscribed this is a
    /// no-op. Group lookup-or-create and the accumulator update happen under
    /// the group-table write lock as one unit, so concurrent producers can
    /// never double-create a group or lose a sample. The group table is
    /// unbounded; callers control cardinality by restricting tag keys.
    pub fn add_sample(&self, tags: &TagSet, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(Error::InvalidSample { value });
        }
        if !self.is_subscribed() {
            return Ok(());
        }

        let timestamp_ms = now_ms();
        self.collector
            .write()
            .add_sample(&self.tag_keys, tags, value, timestamp_ms);
        Ok(())
    }

    /// Snapshot the current groups as rows
    ///
    /// One row per live group, in unspecified order. Safe to call while
    /// producers keep recording: each row reflects a consistent
    /// point-in-time state of its group.
    pub fn collected_rows(&self) -> Vec<Row> {
        self.collector.read().rows()
    }

    /// Discard all groups, resetting the view to empty
    ///
    /// Definition metadata (name, tag keys, aggregation) is untouched; used
    /// when restarting collection between reporting windows.
    pub fn clear_rows(&self) {
        self.collector.write().clear();
    }

    /// Number of live groups
    pub fn group_count(&self) -> usize {
        self.collector.read().group_count()
    }

    /// Whether two canonicalized definitions are interchangeable
    ///
    /// Used by the registry to distinguish an idempotent re-subscribe from a
    /// naming conflict.
    pub(crate) fn definition_matches(&self, other: &View) -> bool {
        self.name == other.name
            && self.description == other.description
            && self.measure == other.measure
            && self.tag_keys == other.tag_keys
            && self.aggregation == other.aggregation
    }
}
