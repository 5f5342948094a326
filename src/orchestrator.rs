//! Scoring orchestrator: fetch, score and predict
//!
//! Each operation is a short blocking workflow over the registry and the
//! model's scoring capability. The model call is the only potentially
//! long-running step; there are no timeouts or cancellation here.
//!
//! ## Predict state machine
//!
//! ```text
//! ValidateParams ──> ResolveDestination ──> Dispatch ──> Fetch ──> Attach
//!      │                                       │
//!      └─ InvalidArgument                      └─ InvalidArgument (no capability)
//! ```
//!
//! Neither `score` nor `predict` is idempotency-guarded. Two concurrent
//! `predict` calls for the same model and frame without a destination key
//! generate the same key and race to persist their artifacts there; the
//! last writer wins.

use crate::config::OrchestratorConfig;
use crate::frame::Frame;
use crate::metrics::{MetricRecord, MetricsList, MetricsQuery};
use crate::model::{Model, DEEP_FEATURES_CAPABILITY};
use crate::registry::MetricsRegistry;
use crate::schema::SchemaTranslator;
use crate::store::{ObjectKey, Store, StoredObject};
use crate::{Error, Result};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Externally visible operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// List existing records
    Fetch,
    /// Score and return the resulting records
    Score,
    /// Score, persist the artifact and return records with a preview
    Predict,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fetch => "fetch",
            Self::Score => "score",
            Self::Predict => "predict",
        })
    }
}

impl FromStr for Endpoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "fetch" => Ok(Self::Fetch),
            "score" => Ok(Self::Score),
            "predict" => Ok(Self::Predict),
            other => Err(Error::invalid(format!("unknown endpoint: {other}"))),
        }
    }
}

/// Entry point for fetch, score and predict.
pub struct ScoringOrchestrator {
    store: Arc<dyn Store>,
    registry: MetricsRegistry,
    translator: SchemaTranslator,
    config: OrchestratorConfig,
}

impl fmt::Debug for ScoringOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScoringOrchestrator")
            .field("translator", &self.translator)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ScoringOrchestrator {
    /// Create an orchestrator over `store`.
    ///
    /// # Errors
    ///
    /// Returns a fatal error if the configuration is invalid, including any
    /// schema version missing from the dispatch table
    pub fn new(store: Arc<dyn Store>, config: OrchestratorConfig) -> Result<Self> {
        config.validate()?;
        let translator = SchemaTranslator::new(Arc::clone(&store), &config.schema_versions)?;
        Ok(Self {
            registry: MetricsRegistry::new(Arc::clone(&store)),
            store,
            translator,
            config,
        })
    }

    /// The registry used for lookups.
    #[must_use]
    pub const fn registry(&self) -> &MetricsRegistry {
        &self.registry
    }

    /// The wire translator.
    #[must_use]
    pub const fn translator(&self) -> &SchemaTranslator {
        &self.translator
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Records matching the model/frame filters. No side effects.
    #[must_use]
    pub fn fetch(&self, query: &MetricsQuery) -> Vec<Arc<MetricRecord>> {
        self.registry.query(query)
    }

    /// Score the model on the frame and return the resulting records.
    ///
    /// An empty result is a success; it is logged as a warning.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the model or frame is missing,
    /// or the model's scoring error unchanged
    #[instrument(skip(self), fields(model = tracing::field::Empty, frame = tracing::field::Empty))]
    pub fn score(&self, query: &MetricsQuery) -> Result<Vec<Arc<MetricRecord>>> {
        let (model, frame) = self.resolve_pair(query)?;
        model.score(&frame, query.destination_key.as_ref())?;
        Ok(self.refetch(model.key(), frame.key()))
    }

    /// Score and persist a derived artifact, returning records with a
    /// bounded preview of the artifact on the first one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if both derived modes are set, the
    /// model or frame is missing, or a derived mode is requested from a
    /// model without the deep-features capability. Scoring errors propagate
    /// unchanged.
    #[instrument(skip(self), fields(model = tracing::field::Empty, frame = tracing::field::Empty))]
    pub fn predict(&self, query: &MetricsQuery) -> Result<Vec<Arc<MetricRecord>>> {
        let mode = query.predict_mode()?;
        let (model, frame) = self.resolve_pair(query)?;

        let destination = match &query.destination_key {
            Some(key) => key.clone(),
            None => {
                let key = self.destination_for(model.key(), frame.key());
                debug!(destination = %key, "generated destination key");
                key
            }
        };

        let artifact = if mode.is_standard() {
            model.score(&frame, Some(&destination))?
        } else {
            let capability = model.deep_features().ok_or_else(|| {
                Error::invalid(format!(
                    "Require a model with the {DEEP_FEATURES_CAPABILITY} capability for {mode}; \
                     model {} does not provide it",
                    model.key()
                ))
            })?;
            let artifact = mode
                .run_capability(capability, &frame)?
                .with_key(destination.clone());
            let stored = Arc::new(artifact.clone());
            self.store.put(destination, StoredObject::Frame(stored));
            artifact
        };

        let mut records = self.refetch(model.key(), frame.key());
        if let Some(first) = records.first_mut() {
            *first = Arc::new(first.with_predictions(artifact.preview(self.config.preview_rows)));
        }
        Ok(records)
    }

    /// Destination key generated for a (model, frame) pair.
    ///
    /// The key depends only on the two keys and the configured prefix, so
    /// repeated calls collide on the same key.
    #[must_use]
    pub fn destination_for(&self, model: &ObjectKey, frame: &ObjectKey) -> ObjectKey {
        ObjectKey::new(format!(
            "{}{model}_on_{frame}",
            self.config.destination_prefix
        ))
    }

    /// Decode a wire request, run `endpoint`, and encode the response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedVersion`] (fatal) for a version not being
    /// served, [`Error::Serialization`] for a malformed body, or any error of
    /// the operation itself
    pub fn handle(&self, endpoint: Endpoint, version: u32, request: &Value) -> Result<Value> {
        let query = self.translator.decode(version, request)?;
        let records = match endpoint {
            Endpoint::Fetch => self.fetch(&query),
            Endpoint::Score => self.score(&query)?,
            Endpoint::Predict => self.predict(&query)?,
        };
        self.translator
            .encode(version, &MetricsList::new(query, records))
    }

    fn resolve_pair(&self, query: &MetricsQuery) -> Result<(Arc<dyn Model>, Arc<Frame>)> {
        let model_key = query
            .model
            .as_ref()
            .ok_or_else(|| Error::invalid("model is required"))?;
        let frame_key = query
            .frame
            .as_ref()
            .ok_or_else(|| Error::invalid("frame is required"))?;

        let model = self
            .store
            .get_model(model_key)
            .ok_or_else(|| Error::invalid(format!("model not found: {model_key}")))?;
        let frame = self
            .store
            .get_frame(frame_key)
            .ok_or_else(|| Error::invalid(format!("frame not found: {frame_key}")))?;

        let span = tracing::Span::current();
        span.record("model", tracing::field::display(model_key));
        span.record("frame", tracing::field::display(frame_key));
        Ok((model, frame))
    }

    fn refetch(&self, model: &ObjectKey, frame: &ObjectKey) -> Vec<Arc<MetricRecord>> {
        let records = self.fetch(&MetricsQuery::for_pair(model.clone(), frame.clone()));
        if records.is_empty() {
            warn!(
                model = %model,
                frame = %frame,
                "scoring did not produce a metric record"
            );
        }
        records
    }
}
