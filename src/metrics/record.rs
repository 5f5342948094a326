//! Metric Record - result of evaluating one model against one frame

use super::{MetricStats, MetricsKind};
use crate::frame::{Frame, FramePreview};
use crate::model::Model;
use crate::store::ObjectKey;
use chrono::{DateTime, Utc};

/// Persisted result of scoring a model on a frame.
///
/// Records are immutable. Attaching a predictions preview produces a new
/// value through [`MetricRecord::with_predictions`]; the stored record is
/// never touched.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRecord {
    model: ObjectKey,
    model_checksum: u64,
    frame: ObjectKey,
    frame_checksum: u64,
    stats: MetricStats,
    scored_at: DateTime<Utc>,
    duration_ms: u64,
    description: Option<String>,
    predictions: Option<FramePreview>,
}

impl MetricRecord {
    /// Create a record for `model` scored on `frame`, timestamped now.
    #[must_use]
    pub fn new(model: &dyn Model, frame: &Frame, stats: MetricStats) -> Self {
        Self::builder(
            model.key().clone(),
            model.checksum(),
            frame.key().clone(),
            frame.checksum(),
            stats,
        )
        .build()
    }

    /// Create a builder for constructing a record with optional fields.
    #[must_use]
    pub fn builder(
        model: ObjectKey,
        model_checksum: u64,
        frame: ObjectKey,
        frame_checksum: u64,
        stats: MetricStats,
    ) -> MetricRecordBuilder {
        MetricRecordBuilder::new(model, model_checksum, frame, frame_checksum, stats)
    }

    /// Store key for a record of this (model, frame) pair.
    ///
    /// Rescoring the same model on the same frame content lands on the same
    /// key and replaces the previous record.
    #[must_use]
    pub fn build_key(
        model: &ObjectKey,
        model_checksum: u64,
        frame: &ObjectKey,
        frame_checksum: u64,
    ) -> ObjectKey {
        ObjectKey::new(format!(
            "modelmetrics_{model}@{model_checksum}_on_{frame}@{frame_checksum}"
        ))
    }

    /// Store key of this record.
    #[must_use]
    pub fn key(&self) -> ObjectKey {
        Self::build_key(
            &self.model,
            self.model_checksum,
            &self.frame,
            self.frame_checksum,
        )
    }

    /// Whether this record was computed by exactly this model.
    #[must_use]
    pub fn is_for_model(&self, model: &dyn Model) -> bool {
        &self.model == model.key() && self.model_checksum == model.checksum()
    }

    /// Whether this record was computed on exactly this frame.
    #[must_use]
    pub fn is_for_frame(&self, frame: &Frame) -> bool {
        &self.frame == frame.key() && self.frame_checksum == frame.checksum()
    }

    /// A copy of this record carrying a predictions preview.
    #[must_use]
    pub fn with_predictions(&self, preview: FramePreview) -> Self {
        Self {
            predictions: Some(preview),
            ..self.clone()
        }
    }

    /// Key of the model.
    #[must_use]
    pub const fn model(&self) -> &ObjectKey {
        &self.model
    }

    /// Checksum of the model at scoring time.
    #[must_use]
    pub const fn model_checksum(&self) -> u64 {
        self.model_checksum
    }

    /// Key of the frame.
    #[must_use]
    pub const fn frame(&self) -> &ObjectKey {
        &self.frame
    }

    /// Checksum of the frame at scoring time.
    #[must_use]
    pub const fn frame_checksum(&self) -> u64 {
        self.frame_checksum
    }

    /// Concrete kind of this record.
    #[must_use]
    pub const fn kind(&self) -> MetricsKind {
        self.stats.kind()
    }

    /// Kind-specific statistics.
    #[must_use]
    pub const fn stats(&self) -> &MetricStats {
        &self.stats
    }

    /// When the scoring finished.
    #[must_use]
    pub const fn scored_at(&self) -> DateTime<Utc> {
        self.scored_at
    }

    /// How long scoring took.
    #[must_use]
    pub const fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Free-form description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Attached predictions preview, if any.
    #[must_use]
    pub const fn predictions(&self) -> Option<&FramePreview> {
        self.predictions.as_ref()
    }
}

/// Builder for `MetricRecord`.
#[derive(Debug)]
pub struct MetricRecordBuilder {
    model: ObjectKey,
    model_checksum: u64,
    frame: ObjectKey,
    frame_checksum: u64,
    stats: MetricStats,
    scored_at: DateTime<Utc>,
    duration_ms: u64,
    description: Option<String>,
}

impl MetricRecordBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(
        model: ObjectKey,
        model_checksum: u64,
        frame: ObjectKey,
        frame_checksum: u64,
        stats: MetricStats,
    ) -> Self {
        Self {
            model,
            model_checksum,
            frame,
            frame_checksum,
            stats,
            scored_at: Utc::now(),
            duration_ms: 0,
            description: None,
        }
    }

    /// Set a custom scoring timestamp.
    #[must_use]
    pub const fn scored_at(mut self, scored_at: DateTime<Utc>) -> Self {
        self.scored_at = scored_at;
        self
    }

    /// Set the scoring duration.
    #[must_use]
    pub const fn duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Set a description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Build the `MetricRecord`.
    #[must_use]
    pub fn build(self) -> MetricRecord {
        MetricRecord {
            model: self.model,
            model_checksum: self.model_checksum,
            frame: self.frame,
            frame_checksum: self.frame_checksum,
            stats: self.stats,
            scored_at: self.scored_at,
            duration_ms: self.duration_ms,
            description: self.description,
            predictions: None,
        }
    }
}
