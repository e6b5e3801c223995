//! Group signature encoding and the per-view group table
//!
//! A view projects each sample's tag set onto its configured tag keys and
//! needs a map key that identifies the resulting group. Map iteration order
//! and hashing are both unsuitable as identity (nondeterministic, collision
//! prone), so the signature is an explicit byte encoding: the view's keys are
//! walked in their canonical sorted order and each present (key, value) pair
//! is appended with length prefixes. Two samples produce the same signature
//! iff they agree on every configured key's value; a configured key absent
//! from the sample is omitted entirely, which keeps "absent" distinct from
//! "present with empty value".

use std::collections::HashMap;

use crate::aggregation::{Aggregation, AggregationData};
use crate::types::{Tag, TagKey, TagSet};
use crate::view::row::Row;

/// Canonical group identity within one view
pub(crate) type GroupSignature = Vec<u8>;

/// Encode the group signature and the projected tags for one sample
///
/// `tag_keys` must already be in the view's canonical sorted order; the
/// signature inherits its determinism from that order.
pub(crate) fn group_signature(tag_keys: &[TagKey], tags: &TagSet) -> (GroupSignature, Vec<Tag>) {
    let mut signature = Vec::new();
    let mut matched = Vec::new();

    for key in tag_keys {
        if let Some(value) = tags.value_of(key) {
            encode_component(&mut signature, key.name().as_bytes());
            encode_component(&mut signature, value.as_bytes());
            matched.push(Tag::new(key.clone(), value));
        }
    }

    (signature, matched)
}

fn encode_component(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    buf.extend_from_slice(bytes);
}

/// One live group: the tags that matched plus its mutable accumulator
#[derive(Debug, Clone)]
struct Group {
    tags: Vec<Tag>,
    data: AggregationData,
}

/// The signature → accumulator table owned by one view
///
/// Not synchronized itself; the owning [`View`](crate::view::View) guards it
/// with a lock so that lookup-or-create and the following accumulator
/// mutation happen as one unit.
#[derive(Debug)]
pub(crate) struct Collector {
    aggregation: Aggregation,
    groups: HashMap<GroupSignature, Group>,
}

impl Collector {
    pub(crate) fn new(aggregation: Aggregation) -> Self {
        Self {
            aggregation,
            groups: HashMap::new(),
        }
    }

    /// Route one sample to its group, creating the group on first use
    pub(crate) fn add_sample(
        &mut self,
        tag_keys: &[TagKey],
        tags: &TagSet,
        value: f64,
        timestamp_ms: i64,
    ) {
        let (signature, matched) = group_signature(tag_keys, tags);
        let group = self.groups.entry(signature).or_insert_with(|| Group {
            tags: matched,
            data: self.aggregation.new_data(),
        });
        group.data.add_sample(value, timestamp_ms);
    }

    /// Snapshot every live group into a fresh row
    pub(crate) fn rows(&self) -> Vec<Row> {
        self.groups
            .values()
            .map(|g| Row::new(g.tags.clone(), g.data.snapshot()))
            .collect()
    }

    /// Drop all groups
    pub(crate) fn clear(&mut self) {
        self.groups.clear();
    }

    /// Number of live groups
    pub(crate) fn group_count(&self) -> usize {
        self.groups.len()
    }
}
