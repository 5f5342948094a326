//! Point-in-time key enumeration

use super::{ObjectKey, TypeTag};

/// One snapshot entry: a key and the type declared when it was stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInfo {
    key: ObjectKey,
    type_tag: TypeTag,
}

impl KeyInfo {
    /// Create a snapshot entry.
    #[must_use]
    pub const fn new(key: ObjectKey, type_tag: TypeTag) -> Self {
        Self { key, type_tag }
    }

    /// The key.
    #[must_use]
    pub const fn key(&self) -> &ObjectKey {
        &self.key
    }

    /// The declared type at snapshot time.
    #[must_use]
    pub const fn type_tag(&self) -> TypeTag {
        self.type_tag
    }
}

/// Keys present in a store at one point in time.
///
/// A snapshot is never kept consistent with the store: by the time a key is
/// resolved it may be gone or hold a different kind of object.
#[derive(Debug, Clone, Default)]
pub struct KeySnapshot {
    infos: Vec<KeyInfo>,
}

impl KeySnapshot {
    /// Build a snapshot from collected entries.
    #[must_use]
    pub const fn new(infos: Vec<KeyInfo>) -> Self {
        Self { infos }
    }

    /// Keep only the entries accepted by `predicate`.
    #[must_use]
    pub fn filter(self, predicate: impl Fn(&KeyInfo) -> bool) -> Self {
        Self {
            infos: self.infos.into_iter().filter(|info| predicate(info)).collect(),
        }
    }

    /// The keys of all entries.
    #[must_use]
    pub fn keys(self) -> Vec<ObjectKey> {
        self.infos.into_iter().map(|info| info.key).collect()
    }

    /// Iterate over entries.
    pub fn iter(&self) -> impl Iterator<Item = &KeyInfo> {
        self.infos.iter()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    /// Whether the snapshot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }
}

impl FromIterator<KeyInfo> for KeySnapshot {
    fn from_iter<I: IntoIterator<Item = KeyInfo>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
