//! # model-metrics: registry and orchestration for model evaluation records
//!
//! Given a trained model and a dataset ("frame") held in a shared,
//! concurrently mutated object store, this crate can:
//!
//! - find existing metric records for the pair ([`registry::MetricsRegistry`]),
//! - force (re-)scoring and return the fresh records,
//! - materialize derived artifacts (predictions, reconstruction error, deep
//!   features) and expose a bounded preview of them
//!   ([`orchestrator::ScoringOrchestrator`]).
//!
//! Requests and responses cross a versioned wire boundary
//! ([`schema::SchemaTranslator`]) so internal types can evolve independently.
//!
//! ## Pipeline
//!
//! ```text
//! wire request ─> SchemaTranslator::decode ─> fetch / score / predict
//!                                                  │
//!                              MetricsRegistry::query + Model::score
//!                                                  │
//! wire response <─ SchemaTranslator::encode <──────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use model_metrics::config::OrchestratorConfig;
//! use model_metrics::metrics::MetricsQuery;
//! use model_metrics::orchestrator::ScoringOrchestrator;
//! use model_metrics::store::MemoryStore;
//!
//! # fn main() -> model_metrics::Result<()> {
//! let store = Arc::new(MemoryStore::new());
//! let orchestrator = ScoringOrchestrator::new(store, OrchestratorConfig::default())?;
//!
//! // Nothing scored yet
//! assert!(orchestrator.fetch(&MetricsQuery::all()).is_empty());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod config;
pub mod error;
pub mod frame;
pub mod metrics;
pub mod model;
pub mod orchestrator;
pub mod registry;
pub mod schema;
pub mod store;

pub use error::{Error, Result};
