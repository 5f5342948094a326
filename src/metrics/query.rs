//! Filter criteria and the translated request/response unit

use super::MetricRecord;
use crate::model::PredictMode;
use crate::store::ObjectKey;
use crate::Result;
use std::sync::Arc;

/// Filter and mode flags for one request.
///
/// `model` and `frame` are unset when the caller gave no reference or when
/// the reference did not resolve at decode time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsQuery {
    /// Model filter
    pub model: Option<ObjectKey>,
    /// Frame filter
    pub frame: Option<ObjectKey>,
    /// Where `predict` stores its artifact
    pub destination_key: Option<ObjectKey>,
    /// Compute autoencoder reconstruction error
    pub reconstruction_error: bool,
    /// Extract activations of this hidden layer
    pub deep_features_layer: Option<usize>,
}

impl MetricsQuery {
    /// Query matching every record.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Query for one (model, frame) pair.
    #[must_use]
    pub fn for_pair(model: impl Into<ObjectKey>, frame: impl Into<ObjectKey>) -> Self {
        Self {
            model: Some(model.into()),
            frame: Some(frame.into()),
            ..Self::default()
        }
    }

    /// Query filtered by model only.
    #[must_use]
    pub fn for_model(model: impl Into<ObjectKey>) -> Self {
        Self {
            model: Some(model.into()),
            ..Self::default()
        }
    }

    /// Query filtered by frame only.
    #[must_use]
    pub fn for_frame(frame: impl Into<ObjectKey>) -> Self {
        Self {
            frame: Some(frame.into()),
            ..Self::default()
        }
    }

    /// Set the destination key.
    #[must_use]
    pub fn destination(mut self, key: impl Into<ObjectKey>) -> Self {
        self.destination_key = Some(key.into());
        self
    }

    /// Request reconstruction error.
    #[must_use]
    pub const fn reconstruction_error(mut self, enabled: bool) -> Self {
        self.reconstruction_error = enabled;
        self
    }

    /// Request deep features for a hidden layer.
    #[must_use]
    pub const fn deep_features(mut self, layer: usize) -> Self {
        self.deep_features_layer = Some(layer);
        self
    }

    /// The same model/frame filter without destination or mode flags.
    #[must_use]
    pub fn filter_only(&self) -> Self {
        Self {
            model: self.model.clone(),
            frame: self.frame.clone(),
            ..Self::default()
        }
    }

    /// Validated predict mode.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidArgument`] if both modes are requested
    pub fn predict_mode(&self) -> Result<PredictMode> {
        PredictMode::from_flags(self.reconstruction_error, self.deep_features_layer)
    }
}

/// A query together with the records it produced.
///
/// This is the internal side of the versioned wire schema: requests decode
/// into the `query`, responses encode the `query` echo plus `records`.
#[derive(Debug, Clone, Default)]
pub struct MetricsList {
    /// The request's filter and flags
    pub query: MetricsQuery,
    /// Matching records
    pub records: Vec<Arc<MetricRecord>>,
}

impl MetricsList {
    /// Pair a query with its results.
    #[must_use]
    pub const fn new(query: MetricsQuery, records: Vec<Arc<MetricRecord>>) -> Self {
        Self { query, records }
    }
}
