//! Edge records and views.

use chronograph_common::types::{EdgeId, NodeId, PropertyKey, Value};
use chronograph_common::utils::hash::FxHashMap;
use std::sync::Arc;

/// The stored record of an edge.
#[derive(Debug, Clone, Copy)]
pub struct EdgeRecord {
    /// Edge id.
    pub id: EdgeId,
    /// Source node.
    pub src: NodeId,
    /// Destination node.
    pub dst: NodeId,
    /// Edge type id in the store's type dictionary.
    pub type_id: u32,
    deleted: bool,
}

impl EdgeRecord {
    /// Creates a live record.
    #[must_use]
    pub fn new(id: EdgeId, src: NodeId, dst: NodeId, type_id: u32) -> Self {
        Self {
            id,
            src,
            dst,
            type_id,
            deleted: false,
        }
    }

    /// Returns true if the edge has been deleted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Marks the record deleted or live.
    pub fn set_deleted(&mut self, deleted: bool) {
        self.deleted = deleted;
    }
}

/// A materialized edge.
#[derive(Debug, Clone)]
pub struct Edge {
    /// Edge id.
    pub id: EdgeId,
    /// Source node.
    pub src: NodeId,
    /// Destination node.
    pub dst: NodeId,
    /// Edge type name.
    pub edge_type: Arc<str>,
    /// Properties at the time of the lookup.
    pub properties: FxHashMap<PropertyKey, Value>,
}

impl Edge {
    /// Creates an edge view without properties.
    #[must_use]
    pub fn new(id: EdgeId, src: NodeId, dst: NodeId, edge_type: Arc<str>) -> Self {
        Self {
            id,
            src,
            dst,
            edge_type,
            properties: FxHashMap::default(),
        }
    }

    /// Returns the endpoint opposite to `node`, or `None` if `node` is not
    /// an endpoint.
    #[must_use]
    pub fn other_endpoint(&self, node: NodeId) -> Option<NodeId> {
        if node == self.src {
            Some(self.dst)
        } else if node == self.dst {
            Some(self.src)
        } else {
            None
        }
    }

    /// Returns a property value.
    #[must_use]
    pub fn get_property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}
