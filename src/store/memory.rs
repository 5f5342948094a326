//! In-memory object store using `DashMap`.
//!
//! Data is lost on process restart. Suitable for embedding the registry in a
//! single process and for tests.

use super::{KeyInfo, KeySnapshot, ObjectKey, Store, StoredObject, TypeTag};
use dashmap::DashMap;

#[derive(Debug, Clone)]
struct Slot {
    type_tag: TypeTag,
    object: StoredObject,
}

/// In-memory object store using a lock-free concurrent hashmap.
///
/// Snapshots iterate shard by shard, so concurrent writers may or may not be
/// observed by a snapshot in progress. No shard guard is held after a call
/// returns.
///
/// # Example
///
/// ```rust
/// use model_metrics::store::{MemoryStore, Store};
///
/// let store = MemoryStore::new();
/// assert!(store.is_empty());
/// assert!(store.resolve(&"missing".into()).is_none());
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: DashMap<ObjectKey, Slot>,
}

impl MemoryStore {
    /// Create a new in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            objects: DashMap::new(),
        }
    }

    /// Create with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            objects: DashMap::with_capacity(capacity),
        }
    }

    /// Number of stored objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Remove every object.
    pub fn clear(&self) {
        self.objects.clear();
    }
}

impl Store for MemoryStore {
    fn resolve(&self, key: &ObjectKey) -> Option<StoredObject> {
        self.objects.get(key).map(|slot| slot.object.clone())
    }

    fn snapshot(&self) -> KeySnapshot {
        self.objects
            .iter()
            .map(|entry| KeyInfo::new(entry.key().clone(), entry.value().type_tag))
            .collect()
    }

    fn put(&self, key: ObjectKey, object: StoredObject) -> Option<StoredObject> {
        let type_tag = object.type_tag();
        self.objects
            .insert(key, Slot { type_tag, object })
            .map(|previous| previous.object)
    }

    fn remove(&self, key: &ObjectKey) -> Option<StoredObject> {
        self.objects.remove(key).map(|(_, slot)| slot.object)
    }
}
