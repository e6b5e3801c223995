//! Process-wide table of active views
//!
//! The registry owns the set of registered views by canonical name and
//! routes each incoming sample to every subscribed view bound to the
//! sample's measure. Subscriptions are rare relative to sample recording,
//! so the tables sit behind read-preferring locks and the dispatch path
//! only ever takes them for reading.
//!
//! A lazily-initialized process-wide instance is available through
//! [`default_registry`]; tests construct their own [`ViewRegistry`] instead
//! to avoid cross-test leakage.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use lazy_static::lazy_static;
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::types::TagSet;
use crate::view::View;

lazy_static! {
    static ref DEFAULT_REGISTRY: ViewRegistry = ViewRegistry::new();
}

/// The process-wide default registry
///
/// Views registered here live for the life of the process; the registry is
/// never implicitly cleared.
pub fn default_registry() -> &'static ViewRegistry {
    &DEFAULT_REGISTRY
}

// ============================================================================
// Registry Statistics
// ============================================================================

/// Internal counters for registry activity
///
/// Relaxed atomics: the counts feed monitoring, not control flow.
#[derive(Debug, Default)]
struct RegistryStats {
    samples_recorded: AtomicU64,
    samples_dropped: AtomicU64,
}

impl RegistryStats {
    fn record_sample(&self) {
        self.samples_recorded.fetch_add(1, Ordering::Relaxed);
    }

    fn record_dropped(&self) {
        self.samples_dropped.fetch_add(1, Ordering::Relaxed);
    }
}

/// Point-in-time copy of registry counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryStatsSnapshot {
    /// Samples handed to `record`, whether or not any view matched
    pub samples_recorded: u64,

    /// Per-view updates that failed and were isolated (e.g. non-finite
    /// values rejected at the view boundary)
    pub samples_dropped: u64,

    /// Number of registered views, subscribed or dormant
    pub view_count: usize,
}

// ============================================================================
// View Registry
// ============================================================================

/// Table of active views keyed by canonical name
///
/// Also maintains a measure-name index so `record` finds interested views
/// without scanning the full table.
#[derive(Debug, Default)]
pub struct ViewRegistry {
    views: RwLock<HashMap<String, Arc<View>>>,
    by_measure: RwLock<HashMap<String, Vec<Arc<View>>>>,
    stats: RegistryStats,
}

impl ViewRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonicalize, validate, and activate a view
    ///
    /// Subscribing the identical definition twice is idempotent and returns
    /// the already-registered view (re-activating it if it was dormant).
    /// A different definition under an existing name is rejected with
    /// [`Error::NamingConflict`] and leaves the registered view untouched.
    pub fn subscribe(&self, mut view: View) -> Result<Arc<View>> {
        view.canonicalize()?;

        // Fast path: already registered.
        {
            let views = self.views.read();
            if let Some(existing) = views.get(view.name()) {
                return Self::resubscribe(existing, &view);
            }
        }

        let mut views = self.views.write();
        // Double-check after acquiring the write lock.
        if let Some(existing) = views.get(view.name()) {
            return Self::resubscribe(existing, &view);
        }

        view.subscribe();
        let view = Arc::new(view);
        views.insert(view.name().to_string(), Arc::clone(&view));
        self.by_measure
            .write()
            .entry(view.measure().name().to_string())
            .or_default()
            .push(Arc::clone(&view));

        debug!(
            view = view.name(),
            measure = view.measure().name(),
            aggregation = view.aggregation().kind_name(),
            "view subscribed"
        );
        Ok(view)
    }

    fn resubscribe(existing: &Arc<View>, candidate: &View) -> Result<Arc<View>> {
        if existing.definition_matches(candidate) {
            existing.subscribe();
            Ok(Arc::clone(existing))
        } else {
            Err(Error::NamingConflict(candidate.name().to_string()))
        }
    }

    /// Stop a named view from accumulating; returns false if unknown
    ///
    /// The view stays registered and queryable — there is no transition
    /// back to unregistered.
    pub fn unsubscribe(&self, name: &str) -> bool {
        match self.views.read().get(name) {
            Some(view) => {
                view.unsubscribe();
                debug!(view = name, "view unsubscribed");
                true
            }
            None => false,
        }
    }

    /// Look up a registered view by canonical name
    pub fn find(&self, name: &str) -> Option<Arc<View>> {
        self.views.read().get(name).cloned()
    }

    /// Dispatch one sample to every subscribed view of a measure
    ///
    /// A failure in one view's update is isolated — logged, counted, and
    /// never allowed to prevent dispatch to the remaining views. Nothing is
    /// raised to the producer.
    pub fn record(&self, measure_name: &str, tags: &TagSet, value: f64) {
        self.stats.record_sample();

        // Clone the interested views out of the read lock so view updates
        // never run while holding a registry lock.
        let views: Vec<Arc<View>> = match self.by_measure.read().get(measure_name) {
            Some(views) => views.clone(),
            None => return,
        };

        for view in views {
            if !view.is_subscribed() {
                continue;
            }
            if let Err(error) = view.add_sample(tags, value) {
                self.stats.record_dropped();
                warn!(view = view.name(), %error, "sample dropped by view");
            }
        }
    }

    /// Number of registered views, subscribed or dormant
    pub fn view_count(&self) -> usize {
        self.views.read().len()
    }

    /// Snapshot the registry counters
    pub fn stats(&self) -> RegistryStatsSnapshot {
        RegistryStatsSnapshot {
            samples_recorded: self.stats.samples_recorded.load(Ordering::Relaxed),
            samples_dropped: self.stats.samples_dropped.load(Ordering::Relaxed),
            view_count: self.view_count(),
        }
    }
}
