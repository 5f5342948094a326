//! Versioned schema translation
//!
//! External callers speak a versioned JSON contract. Each logical shape has a
//! compile-time dispatch table mapping a version number to a decoder/encoder
//! pair, so internal types can change without breaking published versions.
//!
//! Adding a version is a deployment decision: [`SchemaTranslator::new`]
//! rejects any configured version that is not in the table, and a request for
//! a version outside the enabled set yields the fatal
//! [`Error::UnsupportedVersion`].
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use model_metrics::metrics::MetricsList;
//! use model_metrics::schema::SchemaTranslator;
//! use model_metrics::store::MemoryStore;
//!
//! # fn main() -> model_metrics::Result<()> {
//! let translator = SchemaTranslator::new(Arc::new(MemoryStore::new()), &[3])?;
//! let query = translator.decode(3, &serde_json::json!({ "model": "missing" }))?;
//! assert!(query.model.is_none());
//!
//! let wire = translator.encode(3, &MetricsList::new(query, vec![]))?;
//! assert_eq!(wire["model_metrics"], serde_json::json!([]));
//! # Ok(())
//! # }
//! ```

pub mod v3;

use crate::metrics::{MetricsList, MetricsQuery};
use crate::store::Store;
use crate::{Error, Result};
use serde_json::Value;
use std::sync::Arc;

/// Name of the metrics list shape, used in version errors.
pub const METRICS_LIST_SCHEMA: &str = "ModelMetrics";

type DecodeFn = fn(&Value, &dyn Store) -> Result<MetricsQuery>;
type EncodeFn = fn(&MetricsList) -> Result<Value>;

/// One row of the version dispatch table.
#[derive(Debug, Clone, Copy)]
pub struct SchemaVersion {
    /// Wire version number
    pub version: u32,
    decode: DecodeFn,
    encode: EncodeFn,
}

/// Every published version of the metrics list shape.
pub const METRICS_LIST_VERSIONS: &[SchemaVersion] = &[SchemaVersion {
    version: v3::VERSION,
    decode: v3::decode,
    encode: v3::encode,
}];

/// Look up a version in the dispatch table.
///
/// # Errors
///
/// Returns [`Error::UnsupportedVersion`] if the table has no such version
pub fn lookup(version: u32) -> Result<&'static SchemaVersion> {
    METRICS_LIST_VERSIONS
        .iter()
        .find(|entry| entry.version == version)
        .ok_or(Error::UnsupportedVersion {
            schema: METRICS_LIST_SCHEMA,
            version,
        })
}

/// Translator between wire payloads and internal query/record types.
#[derive(Clone)]
pub struct SchemaTranslator {
    store: Arc<dyn Store>,
    enabled: Vec<u32>,
}

impl std::fmt::Debug for SchemaTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaTranslator")
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl SchemaTranslator {
    /// Create a translator serving `versions`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedVersion`] for the first version missing
    /// from the dispatch table
    pub fn new(store: Arc<dyn Store>, versions: &[u32]) -> Result<Self> {
        for &version in versions {
            lookup(version)?;
        }
        Ok(Self {
            store,
            enabled: versions.to_vec(),
        })
    }

    /// Versions this translator serves.
    #[must_use]
    pub fn versions(&self) -> &[u32] {
        &self.enabled
    }

    fn entry(&self, version: u32) -> Result<&'static SchemaVersion> {
        if !self.enabled.contains(&version) {
            return Err(Error::UnsupportedVersion {
                schema: METRICS_LIST_SCHEMA,
                version,
            });
        }
        lookup(version)
    }

    /// Decode a wire request into a query.
    ///
    /// Model and frame references that do not resolve in the store decode to
    /// unset filters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedVersion`] for a disabled version, or
    /// [`Error::Serialization`] if the payload does not fit the schema
    pub fn decode(&self, version: u32, wire: &Value) -> Result<MetricsQuery> {
        (self.entry(version)?.decode)(wire, self.store.as_ref())
    }

    /// Encode a query echo and its records into a wire response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedVersion`] for a disabled version, or
    /// [`Error::InvalidArgument`] if the query echo does not fit the wire
    pub fn encode(&self, version: u32, list: &MetricsList) -> Result<Value> {
        (self.entry(version)?.encode)(list)
    }
}
