//! Metrics registry: race-tolerant lookup of metric records
//!
//! [`MetricsRegistry::query`] runs in two unsynchronized steps:
//!
//! 1. Snapshot all keys whose declared type is a metric record. This is a
//!    structural check on the type tag only.
//! 2. Resolve each candidate and apply the model/frame filters.
//!
//! Other actors keep writing between the two steps. A candidate that has
//! vanished, or that now holds a different kind of object, is dropped from
//! the result. That is expected behaviour, not a failure.

use crate::frame::Frame;
use crate::metrics::{MetricRecord, MetricsQuery};
use crate::model::Model;
use crate::store::{ObjectKey, ObjectKind, Store, StoredObject};
use crate::{Error, Result};
use std::sync::Arc;
use tracing::debug;

/// Read-only view of the metric records in a store.
#[derive(Clone)]
pub struct MetricsRegistry {
    store: Arc<dyn Store>,
}

impl std::fmt::Debug for MetricsRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsRegistry").finish_non_exhaustive()
    }
}

impl MetricsRegistry {
    /// Create a registry over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// All records matching the model/frame filters of `filter`.
    ///
    /// Destination key and mode flags are ignored. An unresolvable model or
    /// frame filter matches nothing. Ordering is store enumeration order.
    #[must_use]
    pub fn query(&self, filter: &MetricsQuery) -> Vec<Arc<MetricRecord>> {
        self.matching(filter)
            .into_iter()
            .map(|(_, record)| record)
            .collect()
    }

    /// Like [`query`](Self::query), keeping the key each record was found at.
    #[must_use]
    pub fn matching(&self, filter: &MetricsQuery) -> Vec<(ObjectKey, Arc<MetricRecord>)> {
        let model: Option<Arc<dyn Model>> = match &filter.model {
            Some(key) => match self.store.get_model(key) {
                Some(model) => Some(model),
                None => {
                    debug!(model = %key, "model filter did not resolve; no records match");
                    return Vec::new();
                }
            },
            None => None,
        };
        let frame: Option<Arc<Frame>> = match &filter.frame {
            Some(key) => match self.store.get_frame(key) {
                Some(frame) => Some(frame),
                None => {
                    debug!(frame = %key, "frame filter did not resolve; no records match");
                    return Vec::new();
                }
            },
            None => None,
        };

        let candidates = self.store.snapshot_keys_of_kind(ObjectKind::Metrics);
        let total = candidates.len();
        let mut vanished = 0_usize;

        let matched: Vec<_> = candidates
            .into_iter()
            .filter_map(|key| {
                let Some(record) = self.store.resolve(&key).and_then(StoredObject::into_metrics)
                else {
                    vanished += 1;
                    return None;
                };
                if let Some(model) = &model {
                    if !record.is_for_model(model.as_ref()) {
                        return None;
                    }
                }
                if let Some(frame) = &frame {
                    if !record.is_for_frame(frame) {
                        return None;
                    }
                }
                Some((key, record))
            })
            .collect();

        debug!(
            candidates = total,
            vanished,
            matched = matched.len(),
            "metrics query"
        );
        matched
    }

    /// Strict lookup of a record at a known key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if nothing is stored at `key`, or
    /// [`Error::TypeMismatch`] if the object there is not a metric record
    pub fn get_by_key(&self, key: &ObjectKey) -> Result<Arc<MetricRecord>> {
        match self.store.resolve(key) {
            None => Err(Error::NotFound(key.to_string())),
            Some(StoredObject::Metrics(record)) => Ok(record),
            Some(other) => Err(Error::TypeMismatch {
                key: key.to_string(),
                expected: "ModelMetrics".to_string(),
                found: other.type_tag().to_string(),
            }),
        }
    }
}
