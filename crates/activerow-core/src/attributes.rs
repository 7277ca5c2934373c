//! Raw attribute storage with dirty tracking.
//!
//! The store owns three maps: current attribute values, the `original`
//! snapshot of last-persisted values, and a cache of resolved relationships.
//! The dirty set is the per-field difference between current and original;
//! it is what an update statement sends, never the full attribute map.

use std::collections::BTreeMap;

use crate::value::Value;

/// Field name to value mapping.
pub type AttrMap = BTreeMap<String, Value>;

/// Owns a record's raw values, its last-persisted snapshot, and the
/// relationship cache.
#[derive(Debug, Clone, Default)]
pub struct AttributeStore {
    attributes: AttrMap,
    original: AttrMap,
    relationships: AttrMap,
}

impl AttributeStore {
    /// Empty store for a freshly constructed record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store for a record hydrated from storage: `original` starts as a
    /// copy of the loaded attributes, so the record begins clean.
    pub fn hydrated(attributes: AttrMap) -> Self {
        Self {
            original: attributes.clone(),
            attributes,
            relationships: AttrMap::new(),
        }
    }

    /// Current value for a field, if stored.
    pub fn raw(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Whether a field is present in the attribute map.
    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Write a field, short-circuiting when the value is unchanged so that
    /// repeated assignment of the same value never perturbs the dirty set.
    pub fn set(&mut self, name: &str, value: Value) {
        if self.attributes.get(name) != Some(&value) {
            self.attributes.insert(name.to_string(), value);
        }
    }

    /// Write a field unconditionally.
    pub fn set_raw(&mut self, name: &str, value: Value) {
        self.attributes.insert(name.to_string(), value);
    }

    /// Cached relationship value, if resolved.
    pub fn relationship(&self, name: &str) -> Option<&Value> {
        self.relationships.get(name)
    }

    /// Cache a resolved relationship. Relationships never write back into
    /// the attribute map.
    pub fn cache_relationship(&mut self, name: &str, value: Value) {
        self.relationships.insert(name.to_string(), value);
    }

    /// The full current attribute map.
    pub fn attributes(&self) -> &AttrMap {
        &self.attributes
    }

    /// The last-persisted snapshot.
    pub fn original(&self) -> &AttrMap {
        &self.original
    }

    /// Fields whose current value differs from the last-persisted snapshot.
    pub fn dirty(&self) -> AttrMap {
        self.attributes
            .iter()
            .filter(|(name, value)| self.original.get(*name) != Some(value))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    /// Whether any field is dirty.
    pub fn is_dirty(&self) -> bool {
        self.attributes
            .iter()
            .any(|(name, value)| self.original.get(name) != Some(value))
    }

    /// Replace the snapshot with a copy of the current attributes.
    ///
    /// Called exactly once, at the end of a successful save; afterwards the
    /// record reads as clean.
    pub fn snapshot(&mut self) {
        self.original = self.attributes.clone();
    }
}
