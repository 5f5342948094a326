//! Shared object store contract
//!
//! The store is globally visible and mutated concurrently by actors outside
//! this crate (training jobs, deletions, other scoring calls). Its contract is
//! deliberately weak:
//!
//! - [`Store::snapshot`] enumerates keys together with their *declared*
//!   [`TypeTag`] at one point in time. No object is touched.
//! - [`Store::resolve`] looks up the live object. It may return `None`, or an
//!   object of a different kind, for a key that was present in an earlier
//!   snapshot.
//!
//! Nothing holds a lock across the two steps. Callers must treat a failed
//! resolution as "no match", never as an error.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use model_metrics::frame::Frame;
//! use model_metrics::store::{MemoryStore, ObjectKind, Store, StoredObject};
//! use arrow::array::{ArrayRef, Float64Array};
//!
//! # fn main() -> model_metrics::Result<()> {
//! let store = MemoryStore::new();
//! let column: ArrayRef = Arc::new(Float64Array::from(vec![1.0, 2.0]));
//! let frame = Frame::from_columns("f1", vec![("x", column)])?;
//! store.put(frame.key().clone(), StoredObject::Frame(Arc::new(frame)));
//!
//! assert_eq!(store.snapshot_keys_of_kind(ObjectKind::Frame).len(), 1);
//! assert!(store.get_frame(&"f1".into()).is_some());
//! # Ok(())
//! # }
//! ```

mod memory;
mod snapshot;

pub use memory::MemoryStore;
pub use snapshot::{KeyInfo, KeySnapshot};

use crate::frame::Frame;
use crate::metrics::{MetricRecord, MetricsKind};
use crate::model::Model;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Opaque identifier of any object in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Create a key from its textual form.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Textual form of the key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ObjectKey {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Top-level kinds an object can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// A trained model
    Model,
    /// A dataset or derived artifact
    Frame,
    /// Any metric record, regardless of its concrete kind
    Metrics,
}

/// Declared type of a stored value, recorded at `put` time.
///
/// Snapshots carry this tag so kind filtering never needs to touch the
/// object itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// A model
    Model,
    /// A frame
    Frame,
    /// A metric record of the given concrete kind
    Metrics(MetricsKind),
}

impl TypeTag {
    /// The top-level kind this tag belongs to.
    #[must_use]
    pub const fn kind(self) -> ObjectKind {
        match self {
            Self::Model => ObjectKind::Model,
            Self::Frame => ObjectKind::Frame,
            Self::Metrics(_) => ObjectKind::Metrics,
        }
    }

    /// Structural subtype check against a top-level kind.
    #[must_use]
    pub fn is_subtype_of(self, kind: ObjectKind) -> bool {
        self.kind() == kind
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Model => f.write_str("Model"),
            Self::Frame => f.write_str("Frame"),
            Self::Metrics(kind) => write!(f, "ModelMetrics{kind}"),
        }
    }
}

/// A live object held by the store.
#[derive(Debug, Clone)]
pub enum StoredObject {
    /// A trained model
    Model(Arc<dyn Model>),
    /// A dataset or derived artifact
    Frame(Arc<Frame>),
    /// A metric record
    Metrics(Arc<MetricRecord>),
}

impl StoredObject {
    /// Declared type of this object.
    #[must_use]
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Self::Model(_) => TypeTag::Model,
            Self::Frame(_) => TypeTag::Frame,
            Self::Metrics(record) => TypeTag::Metrics(record.kind()),
        }
    }

    /// The model, if this object is one.
    #[must_use]
    pub fn into_model(self) -> Option<Arc<dyn Model>> {
        match self {
            Self::Model(model) => Some(model),
            _ => None,
        }
    }

    /// The frame, if this object is one.
    #[must_use]
    pub fn into_frame(self) -> Option<Arc<Frame>> {
        match self {
            Self::Frame(frame) => Some(frame),
            _ => None,
        }
    }

    /// The metric record, if this object is one.
    #[must_use]
    pub fn into_metrics(self) -> Option<Arc<MetricRecord>> {
        match self {
            Self::Metrics(record) => Some(record),
            _ => None,
        }
    }
}

/// Shared object store collaborator.
///
/// Implementations must be safe to call from many threads at once and must
/// never block one caller on another caller's in-flight resolution.
pub trait Store: Send + Sync {
    /// Resolve the live object at `key`.
    ///
    /// Returns `None` if the key is absent (possibly removed after a snapshot).
    fn resolve(&self, key: &ObjectKey) -> Option<StoredObject>;

    /// Point-in-time enumeration of all keys with their declared types.
    fn snapshot(&self) -> KeySnapshot;

    /// Store `object` under `key`, returning the previous value.
    fn put(&self, key: ObjectKey, object: StoredObject) -> Option<StoredObject>;

    /// Remove the object at `key`, returning it.
    fn remove(&self, key: &ObjectKey) -> Option<StoredObject>;

    /// Keys whose declared type is a subtype of `kind`.
    fn snapshot_keys_of_kind(&self, kind: ObjectKind) -> Vec<ObjectKey> {
        self.snapshot()
            .filter(|info| info.type_tag().is_subtype_of(kind))
            .keys()
    }

    /// Resolve `key` as a model.
    fn get_model(&self, key: &ObjectKey) -> Option<Arc<dyn Model>> {
        self.resolve(key).and_then(StoredObject::into_model)
    }

    /// Resolve `key` as a frame.
    fn get_frame(&self, key: &ObjectKey) -> Option<Arc<Frame>> {
        self.resolve(key).and_then(StoredObject::into_frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_display_and_from() {
        let key = ObjectKey::from("model-1");
        assert_eq!(key.as_str(), "model-1");
        assert_eq!(key.to_string(), "model-1");
        assert_eq!(key, ObjectKey::from(String::from("model-1")));
    }

    #[test]
    fn test_object_key_serializes_transparently() {
        let key = ObjectKey::new("frame-7");
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"frame-7\"");
    }

    #[test]
    fn test_type_tag_subtyping() {
        let tag = TypeTag::Metrics(MetricsKind::Binomial);
        assert!(tag.is_subtype_of(ObjectKind::Metrics));
        assert!(!tag.is_subtype_of(ObjectKind::Frame));
        assert!(TypeTag::Model.is_subtype_of(ObjectKind::Model));
        assert!(!TypeTag::Frame.is_subtype_of(ObjectKind::Metrics));
    }

    #[test]
    fn test_type_tag_display() {
        assert_eq!(TypeTag::Frame.to_string(), "Frame");
        assert_eq!(
            TypeTag::Metrics(MetricsKind::Regression).to_string(),
            "ModelMetricsRegression"
        );
    }
}
