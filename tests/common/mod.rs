//! Shared fixtures: in-process models, frames and a warning counter

#![allow(dead_code)]

use arrow::array::{Array, ArrayRef, Float64Array};
use model_metrics::frame::Frame;
use model_metrics::metrics::{AutoEncoderStats, MetricRecord, MetricStats, RegressionStats};
use model_metrics::model::{DeepFeatures, Model};
use model_metrics::store::{MemoryStore, ObjectKey, Store, StoredObject};
use model_metrics::{Error, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

/// Build a single-column float frame.
pub fn float_frame(key: &str, values: Vec<f64>) -> Frame {
    let column: ArrayRef = Arc::new(Float64Array::from(values));
    Frame::from_columns(key, vec![("x", column)]).unwrap()
}

/// Store a frame under its own key.
pub fn put_frame(store: &dyn Store, frame: Frame) -> Arc<Frame> {
    let frame = Arc::new(frame);
    store.put(frame.key().clone(), StoredObject::Frame(Arc::clone(&frame)));
    frame
}

/// Store a model under its own key.
pub fn put_model(store: &dyn Store, model: Arc<dyn Model>) {
    store.put(model.key().clone(), StoredObject::Model(model));
}

/// Key a model writes its predictions to when the caller names none.
pub fn own_destination(model: &ObjectKey, frame: &Frame) -> ObjectKey {
    ObjectKey::new(format!("{model}.scored.{}", frame.key()))
}

fn first_column(frame: &Frame) -> Vec<f64> {
    frame
        .batch()
        .column(0)
        .as_any()
        .downcast_ref::<Float64Array>()
        .map(|a| (0..a.len()).map(|i| a.value(i)).collect())
        .unwrap_or_else(|| vec![0.0; frame.num_rows()])
}

/// Linear regression `y = 2x` that writes predictions and a record.
#[derive(Debug)]
pub struct LinearModel {
    key: ObjectKey,
    checksum: u64,
    store: Arc<MemoryStore>,
    emits_metrics: bool,
    fail_with: Option<String>,
    calls: AtomicUsize,
}

impl LinearModel {
    pub fn new(key: &str, store: &Arc<MemoryStore>) -> Self {
        Self {
            key: key.into(),
            checksum: 17,
            store: Arc::clone(store),
            emits_metrics: true,
            fail_with: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// A model whose scoring persists predictions but no metric record.
    pub fn without_metrics(mut self) -> Self {
        self.emits_metrics = false;
        self
    }

    /// A model whose scoring always fails.
    pub fn failing(mut self, message: &str) -> Self {
        self.fail_with = Some(message.to_string());
        self
    }

    pub fn with_checksum(mut self, checksum: u64) -> Self {
        self.checksum = checksum;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Model for LinearModel {
    fn key(&self) -> &ObjectKey {
        &self.key
    }

    fn checksum(&self) -> u64 {
        self.checksum
    }

    fn score(&self, frame: &Frame, destination: Option<&ObjectKey>) -> Result<Frame> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.fail_with {
            return Err(Error::Scoring(message.clone()));
        }
        let destination = destination
            .cloned()
            .unwrap_or_else(|| own_destination(&self.key, frame));
        let x = first_column(frame);
        let predictions: Vec<f64> = x.iter().map(|v| v * 2.0).collect();
        let column: ArrayRef = Arc::new(Float64Array::from(predictions));
        let out = Frame::from_columns(destination.clone(), vec![("predict", column)])?;
        self.store
            .put(destination, StoredObject::Frame(Arc::new(out.clone())));

        if self.emits_metrics {
            let record = MetricRecord::builder(
                self.key.clone(),
                self.checksum,
                frame.key().clone(),
                frame.checksum(),
                MetricStats::Regression(RegressionStats {
                    mse: 1.0,
                    r2: 0.5,
                    mean_residual_deviance: 1.0,
                    mae: 0.5,
                }),
            )
            .duration_ms(3)
            .build();
            self.store
                .put(record.key(), StoredObject::Metrics(Arc::new(record)));
        }
        Ok(out)
    }
}

/// Autoencoder with the deep-features capability.
#[derive(Debug)]
pub struct AutoEncoderModel {
    key: ObjectKey,
    store: Arc<MemoryStore>,
    hidden_layers: usize,
}

impl AutoEncoderModel {
    pub fn new(key: &str, store: &Arc<MemoryStore>) -> Self {
        Self {
            key: key.into(),
            store: Arc::clone(store),
            hidden_layers: 2,
        }
    }

    fn output(&self, name: &str, values: Vec<f64>) -> Result<Frame> {
        let column: ArrayRef = Arc::new(Float64Array::from(values));
        Frame::from_columns(format!("{}_{name}", self.key), vec![(name, column)])
    }
}

impl Model for AutoEncoderModel {
    fn key(&self) -> &ObjectKey {
        &self.key
    }

    fn checksum(&self) -> u64 {
        99
    }

    fn score(&self, frame: &Frame, destination: Option<&ObjectKey>) -> Result<Frame> {
        let destination = destination
            .cloned()
            .unwrap_or_else(|| own_destination(&self.key, frame));
        let out = float_frame(destination.as_str(), first_column(frame));
        self.store
            .put(destination, StoredObject::Frame(Arc::new(out.clone())));
        let record = MetricRecord::new(
            self,
            frame,
            MetricStats::AutoEncoder(AutoEncoderStats { mse: 0.01 }),
        );
        self.store
            .put(record.key(), StoredObject::Metrics(Arc::new(record)));
        Ok(out)
    }

    fn deep_features(&self) -> Option<&dyn DeepFeatures> {
        Some(self)
    }
}

impl DeepFeatures for AutoEncoderModel {
    fn score_reconstruction_error(&self, frame: &Frame) -> Result<Frame> {
        let errors = first_column(frame).iter().map(|v| v * v / 100.0).collect();
        self.output("Reconstruction.MSE", errors)
    }

    fn score_deep_features(&self, frame: &Frame, layer: usize) -> Result<Frame> {
        if layer >= self.hidden_layers {
            return Err(Error::invalid(format!("no hidden layer {layer}")));
        }
        let features = first_column(frame).iter().map(|v| v + 1.0).collect();
        self.output(&format!("DF.L{}.C1", layer + 1), features)
    }
}

/// Counts WARN events seen while installed.
#[derive(Clone, Default)]
pub struct WarningCounter(Arc<AtomicUsize>);

impl WarningCounter {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl<S: Subscriber> Layer<S> for WarningCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Run `f` with a thread-local subscriber and return the number of warnings.
pub fn count_warnings<T>(f: impl FnOnce() -> T) -> (T, usize) {
    let counter = WarningCounter::default();
    let subscriber = tracing_subscriber::registry().with(counter.clone());
    let out = tracing::subscriber::with_default(subscriber, f);
    (out, counter.count())
}
