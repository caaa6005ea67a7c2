//! Node records and views.

use chronograph_common::types::{NodeId, PropertyKey, Value};
use chronograph_common::utils::hash::FxHashMap;
use smallvec::SmallVec;
use std::sync::Arc;

/// The stored record of a node.
///
/// Labels are a 64-bit set over the store's label dictionary.
#[derive(Debug, Clone, Copy)]
pub struct NodeRecord {
    /// Node id.
    pub id: NodeId,
    label_bits: u64,
    deleted: bool,
}

impl NodeRecord {
    /// Creates a record with no labels.
    #[must_use]
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            label_bits: 0,
            deleted: false,
        }
    }

    /// Sets the bit for a label id.
    pub fn set_label_bit(&mut self, label_id: u8) {
        self.label_bits |= 1 << label_id;
    }

    /// Returns true if the label id is set.
    #[must_use]
    pub fn has_label_bit(&self, label_id: u8) -> bool {
        self.label_bits & (1 << label_id) != 0
    }

    /// Iterates over the set label ids.
    pub fn label_bits_iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..64u8).filter(|bit| self.has_label_bit(*bit))
    }

    /// Returns true if the node has been deleted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Marks the record deleted or live.
    pub fn set_deleted(&mut self, deleted: bool) {
        self.deleted = deleted;
    }
}

/// A materialized node: labels plus a copy of its properties.
#[derive(Debug, Clone)]
pub struct Node {
    /// Node id.
    pub id: NodeId,
    /// Labels.
    pub labels: SmallVec<[Arc<str>; 2]>,
    /// Properties at the time of the lookup.
    pub properties: FxHashMap<PropertyKey, Value>,
}

impl Node {
    /// Creates an empty node view.
    #[must_use]
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            labels: SmallVec::new(),
            properties: FxHashMap::default(),
        }
    }

    /// Returns true if the node carries the label.
    #[must_use]
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l.as_ref() == label)
    }

    /// Returns a property value.
    #[must_use]
    pub fn get_property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}
