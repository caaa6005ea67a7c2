//! The graph capabilities handlers and layered crates are written against.

use chronograph_common::types::{EdgeId, NodeId, PropertyKey, Value};
use chronograph_common::utils::error::{Error, Result};
use chronograph_common::utils::hash::FxHashMap;
use chronograph_core::graph::Direction;
use chronograph_core::graph::lpg::{Edge, LpgStore};

/// Read and write access to a property graph.
///
/// This trait is object safe; handlers receive it as `&dyn GraphAccess`.
/// [`Session`](crate::Session) implements it on top of its current
/// transaction. [`LpgStore`] implements it directly, without journaling or
/// conflict detection, which is mostly useful in tests.
pub trait GraphAccess {
    // === Reads ===

    /// Returns true if the node exists.
    fn contains_node(&self, id: NodeId) -> bool;

    /// Returns one property of a node.
    fn node_property(&self, id: NodeId, key: &str) -> Option<Value>;

    /// Returns every property of a node (empty if the node is missing).
    fn node_properties(&self, id: NodeId) -> FxHashMap<PropertyKey, Value>;

    /// Returns the nodes carrying a label, in id order.
    fn nodes_by_label(&self, label: &str) -> Vec<NodeId>;

    /// Returns an edge with its endpoints, type and properties.
    fn edge(&self, id: EdgeId) -> Option<Edge>;

    /// Returns one property of an edge.
    fn edge_property(&self, id: EdgeId, key: &str) -> Option<Value>;

    /// Returns every property of an edge (empty if the edge is missing).
    fn edge_properties(&self, id: EdgeId) -> FxHashMap<PropertyKey, Value>;

    /// Returns `(neighbor, edge)` pairs incident to `node`.
    ///
    /// `types == None` means every type except the hidden ones.
    fn edges(
        &self,
        node: NodeId,
        direction: Direction,
        types: Option<&[&str]>,
    ) -> Vec<(NodeId, EdgeId)>;

    /// Returns true if writes land in a transaction that commits later,
    /// rather than each committing on its own.
    fn in_transaction(&self) -> bool;

    // === Writes ===

    /// Creates a node.
    ///
    /// # Errors
    ///
    /// Returns an error if the write is rejected.
    fn create_node(&self, labels: &[&str]) -> Result<NodeId>;

    /// Sets a node property, returning the replaced value.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is missing or the write is rejected.
    fn set_node_property(&self, id: NodeId, key: &str, value: Value) -> Result<Option<Value>>;

    /// Removes a node property, returning the removed value.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is missing or the write is rejected.
    fn remove_node_property(&self, id: NodeId, key: &str) -> Result<Option<Value>>;

    /// Creates a directed edge.
    ///
    /// # Errors
    ///
    /// Returns an error if an endpoint is missing or the write is rejected.
    fn create_edge(&self, src: NodeId, dst: NodeId, edge_type: &str) -> Result<EdgeId>;

    /// Deletes a node with its properties. Returns false if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the write is rejected.
    fn delete_node(&self, id: NodeId) -> Result<bool>;

    /// Deletes an edge. Returns false if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the write is rejected.
    fn delete_edge(&self, id: EdgeId) -> Result<bool>;

    /// Sets an edge property, returning the replaced value.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is missing or the write is rejected.
    fn set_edge_property(&self, id: EdgeId, key: &str, value: Value) -> Result<Option<Value>>;

    /// Removes an edge property, returning the removed value.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is missing or the write is rejected.
    fn remove_edge_property(&self, id: EdgeId, key: &str) -> Result<Option<Value>>;
}

impl GraphAccess for LpgStore {
    fn contains_node(&self, id: NodeId) -> bool {
        LpgStore::contains_node(self, id)
    }

    fn node_property(&self, id: NodeId, key: &str) -> Option<Value> {
        self.get_node_property(id, key)
    }

    fn node_properties(&self, id: NodeId) -> FxHashMap<PropertyKey, Value> {
        LpgStore::node_properties(self, id)
    }

    fn nodes_by_label(&self, label: &str) -> Vec<NodeId> {
        LpgStore::nodes_by_label(self, label)
    }

    fn edge(&self, id: EdgeId) -> Option<Edge> {
        self.get_edge(id)
    }

    fn edge_property(&self, id: EdgeId, key: &str) -> Option<Value> {
        self.get_edge_property(id, key)
    }

    fn edge_properties(&self, id: EdgeId) -> FxHashMap<PropertyKey, Value> {
        LpgStore::edge_properties(self, id)
    }

    fn edges(
        &self,
        node: NodeId,
        direction: Direction,
        types: Option<&[&str]>,
    ) -> Vec<(NodeId, EdgeId)> {
        LpgStore::edges(self, node, direction, types)
    }

    fn in_transaction(&self) -> bool {
        true
    }

    fn create_node(&self, labels: &[&str]) -> Result<NodeId> {
        LpgStore::create_node(self, labels)
    }

    fn set_node_property(&self, id: NodeId, key: &str, value: Value) -> Result<Option<Value>> {
        LpgStore::set_node_property(self, id, key, value)
    }

    fn remove_node_property(&self, id: NodeId, key: &str) -> Result<Option<Value>> {
        LpgStore::remove_node_property(self, id, key)
    }

    fn create_edge(&self, src: NodeId, dst: NodeId, edge_type: &str) -> Result<EdgeId> {
        LpgStore::create_edge(self, src, dst, edge_type)
    }

    fn delete_node(&self, id: NodeId) -> Result<bool> {
        Ok(LpgStore::delete_node(self, id))
    }

    fn delete_edge(&self, id: EdgeId) -> Result<bool> {
        Ok(LpgStore::delete_edge(self, id).is_some())
    }

    fn set_edge_property(&self, id: EdgeId, key: &str, value: Value) -> Result<Option<Value>> {
        LpgStore::set_edge_property(self, id, key, value)
    }

    fn remove_edge_property(&self, id: EdgeId, key: &str) -> Result<Option<Value>> {
        LpgStore::remove_edge_property(self, id, key)
    }
}

/// Reads an edge or fails with [`Error::EdgeNotFound`].
///
/// # Errors
///
/// Returns [`Error::EdgeNotFound`] if the edge does not exist.
pub fn require_edge<G: GraphAccess + ?Sized>(graph: &G, id: EdgeId) -> Result<Edge> {
    graph.edge(id).ok_or(Error::EdgeNotFound(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_as_graph_access() {
        let store = LpgStore::new();
        let graph: &dyn GraphAccess = &store;

        let a = graph.create_node(&["Person"]).unwrap();
        let b = graph.create_node(&[]).unwrap();
        graph.set_node_property(a, "name", "Alix".into()).unwrap();
        let e = graph.create_edge(a, b, "KNOWS").unwrap();

        assert_eq!(graph.nodes_by_label("Person"), vec![a]);
        assert_eq!(graph.edges(a, Direction::Outgoing, None), vec![(b, e)]);
        assert_eq!(require_edge(graph, e).unwrap().dst, b);

        assert!(graph.delete_edge(e).unwrap());
        assert!(!graph.delete_edge(e).unwrap());
        assert!(matches!(require_edge(graph, e), Err(Error::EdgeNotFound(_))));
        // Raw store writes have no auto-commit to escape.
        assert!(graph.in_transaction());
    }
}
