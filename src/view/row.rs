//! Row snapshots returned by a collection call

use serde::{Deserialize, Serialize};

use crate::aggregation::AggregationData;
use crate::types::Tag;

/// One group's snapshot at collection time
///
/// An immutable pair of the tags actually matched for the group and a copy
/// of the group's accumulator. Rows are created fresh on every
/// [`collected_rows`](crate::view::View::collected_rows) call and are never
/// retained or mutated by the view afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Row {
    /// Tags present on the group, ordered by the view's canonical key order
    pub tags: Vec<Tag>,

    /// Copy of the group's aggregation data at snapshot time
    pub data: AggregationData,
}

impl Row {
    /// Create a new row
    pub fn new(tags: Vec<Tag>, data: AggregationData) -> Self {
        Self { tags, data }
    }
}

/// Rows are equal iff their tag lists are equal as sets and their
/// aggregation data are deeply equal. Collection order is unspecified, so
/// comparisons must not depend on it.
impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        if self.tags.len() != other.tags.len() {
            return false;
        }
        self.tags.iter().all(|t| other.tags.contains(t)) && self.data == other.data
    }
}
