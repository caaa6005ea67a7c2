//! Change sets handed to transaction event handlers.

use chronograph_common::types::{EdgeId, NodeId, PropertyKey, Value};
use chronograph_core::graph::lpg::{Edge, Node};

/// One property that changed during a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyEntry<Id> {
    /// The entity carrying the property.
    pub entity: Id,
    /// The property key.
    pub key: PropertyKey,
    /// The value before the transaction's first write (`None` = absent).
    pub previously_committed: Option<Value>,
    /// The value now (`None` = removed).
    pub value: Option<Value>,
}

impl<Id> PropertyEntry<Id> {
    /// Creates an entry.
    pub fn new(
        entity: Id,
        key: PropertyKey,
        previously_committed: Option<Value>,
        value: Option<Value>,
    ) -> Self {
        Self {
            entity,
            key,
            previously_committed,
            value,
        }
    }
}

/// Everything a transaction changed, as seen just before it commits.
///
/// Lists are in the order the changes were first made.
#[derive(Debug, Clone, Default)]
pub struct TransactionData {
    pub(crate) created_nodes: Vec<NodeId>,
    pub(crate) created_edges: Vec<EdgeId>,
    pub(crate) deleted_nodes: Vec<Node>,
    pub(crate) deleted_edges: Vec<Edge>,
    pub(crate) assigned_node_properties: Vec<PropertyEntry<NodeId>>,
    pub(crate) removed_node_properties: Vec<PropertyEntry<NodeId>>,
    pub(crate) assigned_edge_properties: Vec<PropertyEntry<EdgeId>>,
    pub(crate) removed_edge_properties: Vec<PropertyEntry<EdgeId>>,
}

impl TransactionData {
    /// Nodes created by the transaction.
    #[must_use]
    pub fn created_nodes(&self) -> &[NodeId] {
        &self.created_nodes
    }

    /// Edges created by the transaction.
    #[must_use]
    pub fn created_edges(&self) -> &[EdgeId] {
        &self.created_edges
    }

    /// Pre-existing nodes deleted by the transaction, as they were.
    #[must_use]
    pub fn deleted_nodes(&self) -> &[Node] {
        &self.deleted_nodes
    }

    /// Pre-existing edges deleted by the transaction.
    #[must_use]
    pub fn deleted_edges(&self) -> &[Edge] {
        &self.deleted_edges
    }

    /// Node properties that hold a value after the transaction.
    #[must_use]
    pub fn assigned_node_properties(&self) -> &[PropertyEntry<NodeId>] {
        &self.assigned_node_properties
    }

    /// Node properties that held a value before and none after.
    #[must_use]
    pub fn removed_node_properties(&self) -> &[PropertyEntry<NodeId>] {
        &self.removed_node_properties
    }

    /// Edge properties that hold a value after the transaction.
    #[must_use]
    pub fn assigned_edge_properties(&self) -> &[PropertyEntry<EdgeId>] {
        &self.assigned_edge_properties
    }

    /// Edge properties that held a value before and none after.
    #[must_use]
    pub fn removed_edge_properties(&self) -> &[PropertyEntry<EdgeId>] {
        &self.removed_edge_properties
    }

    /// Returns true if the node was created by the transaction.
    #[must_use]
    pub fn is_created_node(&self, id: NodeId) -> bool {
        self.created_nodes.contains(&id)
    }

    /// Returns true if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.created_nodes.is_empty()
            && self.created_edges.is_empty()
            && self.deleted_nodes.is_empty()
            && self.deleted_edges.is_empty()
            && self.assigned_node_properties.is_empty()
            && self.removed_node_properties.is_empty()
            && self.assigned_edge_properties.is_empty()
            && self.removed_edge_properties.is_empty()
    }

    /// Total number of reported changes.
    #[must_use]
    pub fn change_count(&self) -> usize {
        self.created_nodes.len()
            + self.created_edges.len()
            + self.deleted_nodes.len()
            + self.deleted_edges.len()
            + self.assigned_node_properties.len()
            + self.removed_node_properties.len()
            + self.assigned_edge_properties.len()
            + self.removed_edge_properties.len()
    }
}
