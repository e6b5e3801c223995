//! Core data types used throughout the aggregation engine
//!
//! This module defines the fundamental data structures shared across the system:
//!
//! # Key Types
//!
//! - **`Measure`**: Identity of an instrument producing samples (name, description, unit)
//! - **`TagKey`**: Opaque handle for one tag dimension, compared by name
//! - **`Tag`**: A single (key, value) pair attached to a sample
//! - **`TagSet`**: The ordered tag context carried by one sample
//!
//! # Example
//!
//! ```rust
//! use statsview::types::{Measure, Tag, TagKey, TagSet};
//!
//! let measure = Measure::new("request_latency_ms", "request latency", "ms");
//!
//! let method = TagKey::new("method");
//! let mut tags = TagSet::new();
//! tags.insert(Tag::new(method.clone(), "GET"));
//! assert_eq!(tags.value_of(&method), Some("GET"));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a measurement instrument
///
/// The engine consumes this as read-only metadata: the name routes samples to
/// views, and name/description seed view defaults during canonicalization.
/// Units are carried verbatim and never validated or converted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measure {
    name: String,
    description: String,
    unit: String,
}

impl Measure {
    /// Create a new measure
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            unit: unit.into(),
        }
    }

    /// Measure name, e.g. `"request_latency_ms"`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Unit string, e.g. `"ms"` or `"By"`
    pub fn unit(&self) -> &str {
        &self.unit
    }
}

/// Opaque handle for one tag dimension
///
/// Equality, ordering, and hashing are all by name, so two independently
/// created keys with the same name identify the same dimension.
///
/// # Example
///
/// ```rust
/// use statsview::types::TagKey;
///
/// let a = TagKey::new("host");
/// let b = TagKey::new("host");
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TagKey {
    name: String,
}

impl TagKey {
    /// Create a new tag key
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The key's name
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for TagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A single (key, value) pair attached to a sample
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// The tag dimension
    pub key: TagKey,
    /// The value for this sample; arbitrary string, no charset or length
    /// restriction is enforced by the engine
    pub value: String,
}

impl Tag {
    /// Create a new tag
    pub fn new(key: TagKey, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

/// The ordered tag context carried by one sample
///
/// Tags are kept in insertion order; inserting a key that is already present
/// replaces its value. The engine never mutates or retains a `TagSet` beyond
/// the call that processes the sample — views copy out only the numeric value
/// and the tag values they group by.
///
/// # Example
///
/// ```rust
/// use statsview::types::{Tag, TagKey, TagSet};
///
/// let host = TagKey::new("host");
/// let dc = TagKey::new("dc");
///
/// let mut tags = TagSet::new();
/// tags.insert(Tag::new(host.clone(), "web-01"));
/// tags.insert(Tag::new(dc, "us-east"));
/// tags.insert(Tag::new(host.clone(), "web-02")); // replaces web-01
///
/// assert_eq!(tags.len(), 2);
/// assert_eq!(tags.value_of(&host), Some("web-02"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSet {
    tags: Vec<Tag>,
}

impl TagSet {
    /// Create a new empty tag set
    pub fn new() -> Self {
        Self { tags: Vec::new() }
    }

    /// Create from (key name, value) pairs
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut set = Self::new();
        for (k, v) in pairs {
            set.insert(Tag::new(TagKey::new(k), v));
        }
        set
    }

    /// Insert a tag, replacing any existing tag with the same key
    pub fn insert(&mut self, tag: Tag) {
        match self.tags.iter_mut().find(|t| t.key == tag.key) {
            Some(existing) => existing.value = tag.value,
            None => self.tags.push(tag),
        }
    }

    /// Get the value for a key, if present
    pub fn value_of(&self, key: &TagKey) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| &t.key == key)
            .map(|t| t.value.as_str())
    }

    /// Check whether a key is present
    pub fn contains_key(&self, key: &TagKey) -> bool {
        self.tags.iter().any(|t| &t.key == key)
    }

    /// Number of tags in the set
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Iterate over tags in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter()
    }
}
