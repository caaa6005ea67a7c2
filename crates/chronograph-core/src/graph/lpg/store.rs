//! LPG graph store implementation.
//!
//! The store holds the *current* state of every entity and nothing else.
//! Ids are never reused, deletes are tombstones, and every mutator returns
//! the pre-image it destroyed so callers can journal and undo it.

use super::{Edge, EdgeRecord, Node, NodeRecord, PropertyStorage};
use crate::graph::Direction;
use crate::index::adjacency::ChunkedAdjacency;
use chronograph_common::types::{EdgeId, NodeId, PropertyKey, Value};
use chronograph_common::utils::error::{Error, Result};
use chronograph_common::utils::hash::{FxHashMap, FxHashSet};
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Maximum number of distinct labels (one bit each in [`NodeRecord`]).
const MAX_LABELS: usize = 64;

/// Configuration for the LPG store.
#[derive(Debug, Clone)]
pub struct LpgStoreConfig {
    /// Whether to maintain backward adjacency lists.
    ///
    /// Without them, incoming-edge queries fall back to a full edge scan.
    pub backward_edges: bool,
    /// Initial capacity for nodes.
    pub initial_node_capacity: usize,
    /// Initial capacity for edges.
    pub initial_edge_capacity: usize,
}

impl Default for LpgStoreConfig {
    fn default() -> Self {
        Self {
            backward_edges: true,
            initial_node_capacity: 1024,
            initial_edge_capacity: 4096,
        }
    }
}

/// The main LPG graph store.
pub struct LpgStore {
    /// Node records indexed by NodeId.
    nodes: RwLock<FxHashMap<NodeId, NodeRecord>>,

    /// Edge records indexed by EdgeId.
    edges: RwLock<FxHashMap<EdgeId, EdgeRecord>>,

    /// Property storage for nodes.
    node_properties: PropertyStorage<NodeId>,

    /// Property storage for edges.
    edge_properties: PropertyStorage<EdgeId>,

    /// Label name to ID mapping.
    label_to_id: RwLock<FxHashMap<Arc<str>, u8>>,

    /// Label ID to name mapping.
    id_to_label: RwLock<Vec<Arc<str>>>,

    /// Edge type name to ID mapping.
    edge_type_to_id: RwLock<FxHashMap<Arc<str>, u32>>,

    /// Edge type ID to name mapping.
    id_to_edge_type: RwLock<Vec<Arc<str>>>,

    /// Edge types skipped by unfiltered enumeration.
    hidden_edge_types: RwLock<FxHashSet<u32>>,

    /// Forward adjacency lists (outgoing edges).
    forward_adj: ChunkedAdjacency,

    /// Backward adjacency lists (incoming edges).
    /// Only populated if config.backward_edges is true.
    backward_adj: Option<ChunkedAdjacency>,

    /// Label index: label_id -> set of node IDs.
    label_index: RwLock<Vec<FxHashSet<NodeId>>>,

    /// Next node ID.
    next_node_id: AtomicU64,

    /// Next edge ID.
    next_edge_id: AtomicU64,
}

impl LpgStore {
    /// Creates a new LPG store with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LpgStoreConfig::default())
    }

    /// Creates a new LPG store with custom configuration.
    #[must_use]
    pub fn with_config(config: LpgStoreConfig) -> Self {
        let backward_adj = if config.backward_edges {
            Some(ChunkedAdjacency::new())
        } else {
            None
        };

        let mut nodes = FxHashMap::default();
        nodes.reserve(config.initial_node_capacity);
        let mut edges = FxHashMap::default();
        edges.reserve(config.initial_edge_capacity);

        Self {
            nodes: RwLock::new(nodes),
            edges: RwLock::new(edges),
            node_properties: PropertyStorage::new(),
            edge_properties: PropertyStorage::new(),
            label_to_id: RwLock::new(FxHashMap::default()),
            id_to_label: RwLock::new(Vec::new()),
            edge_type_to_id: RwLock::new(FxHashMap::default()),
            id_to_edge_type: RwLock::new(Vec::new()),
            hidden_edge_types: RwLock::new(FxHashSet::default()),
            forward_adj: ChunkedAdjacency::new(),
            backward_adj,
            label_index: RwLock::new(Vec::new()),
            next_node_id: AtomicU64::new(0),
            next_edge_id: AtomicU64::new(0),
        }
    }

    // === Node Operations ===

    /// Creates a new node with the given labels.
    ///
    /// # Errors
    ///
    /// Returns an error if the label dictionary is full.
    pub fn create_node(&self, labels: &[&str]) -> Result<NodeId> {
        let label_ids = labels
            .iter()
            .map(|label| self.get_or_create_label_id(label))
            .collect::<Result<Vec<_>>>()?;

        let id = NodeId::new(self.next_node_id.fetch_add(1, Ordering::Relaxed));
        let mut record = NodeRecord::new(id);

        if !label_ids.is_empty() {
            let mut index = self.label_index.write();
            for label_id in label_ids {
                record.set_label_bit(label_id);
                while index.len() <= label_id as usize {
                    index.push(FxHashSet::default());
                }
                index[label_id as usize].insert(id);
            }
        }

        self.nodes.write().insert(id, record);
        Ok(id)
    }

    /// Creates a new node with labels and properties.
    ///
    /// # Errors
    ///
    /// Returns an error if the label dictionary is full.
    pub fn create_node_with_props(
        &self,
        labels: &[&str],
        properties: impl IntoIterator<Item = (impl Into<PropertyKey>, impl Into<Value>)>,
    ) -> Result<NodeId> {
        let id = self.create_node(labels)?;
        for (key, value) in properties {
            self.node_properties.set(id, key.into(), value.into());
        }
        Ok(id)
    }

    /// Returns true if the node exists and is not deleted.
    #[must_use]
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.read().get(&id).is_some_and(|r| !r.is_deleted())
    }

    /// Gets a node by ID.
    #[must_use]
    pub fn get_node(&self, id: NodeId) -> Option<Node> {
        let record = *self.nodes.read().get(&id)?;
        if record.is_deleted() {
            return None;
        }

        let mut node = Node::new(id);
        let id_to_label = self.id_to_label.read();
        for bit in record.label_bits_iter() {
            if let Some(label) = id_to_label.get(bit as usize) {
                node.labels.push(label.clone());
            }
        }
        node.properties = self.node_properties.get_all(id);
        Some(node)
    }

    /// Deletes a node and its properties. Incident edges are left alone.
    ///
    /// Returns false if the node did not exist or was already deleted.
    pub fn delete_node(&self, id: NodeId) -> bool {
        let mut nodes = self.nodes.write();
        let Some(record) = nodes.get_mut(&id) else {
            return false;
        };
        if record.is_deleted() {
            return false;
        }
        record.set_deleted(true);
        let record = *record;
        drop(nodes);

        let mut index = self.label_index.write();
        for bit in record.label_bits_iter() {
            if let Some(set) = index.get_mut(bit as usize) {
                set.remove(&id);
            }
        }
        drop(index);

        self.node_properties.remove_all(id);
        true
    }

    /// Revives a node removed by [`Self::delete_node`], with the labels and
    /// properties of `node`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] if the node was never created.
    pub fn restore_node(&self, node: &Node) -> Result<()> {
        let record = {
            let mut nodes = self.nodes.write();
            let record = nodes.get_mut(&node.id).ok_or(Error::NodeNotFound(node.id))?;
            record.set_deleted(false);
            *record
        };

        let mut index = self.label_index.write();
        for bit in record.label_bits_iter() {
            if let Some(set) = index.get_mut(bit as usize) {
                set.insert(node.id);
            }
        }
        drop(index);

        for (key, value) in &node.properties {
            self.node_properties.set(node.id, key.clone(), value.clone());
        }
        Ok(())
    }

    /// Returns the number of live nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes
            .read()
            .values()
            .filter(|r| !r.is_deleted())
            .count()
    }

    /// Returns the ids of all live nodes, in ascending order.
    #[must_use]
    pub fn node_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self
            .nodes
            .read()
            .values()
            .filter(|r| !r.is_deleted())
            .map(|r| r.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Sets a node property, returning the value it replaced.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] if the node does not exist.
    pub fn set_node_property(&self, id: NodeId, key: &str, value: Value) -> Result<Option<Value>> {
        if !self.contains_node(id) {
            return Err(Error::NodeNotFound(id));
        }
        Ok(self.node_properties.set(id, key.into(), value))
    }

    /// Removes a node property, returning it if it existed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] if the node does not exist.
    pub fn remove_node_property(&self, id: NodeId, key: &str) -> Result<Option<Value>> {
        if !self.contains_node(id) {
            return Err(Error::NodeNotFound(id));
        }
        Ok(self.node_properties.remove(id, key))
    }

    /// Gets a single node property.
    #[must_use]
    pub fn get_node_property(&self, id: NodeId, key: &str) -> Option<Value> {
        self.node_properties.get(id, key)
    }

    /// Gets all properties of a node.
    #[must_use]
    pub fn node_properties(&self, id: NodeId) -> FxHashMap<PropertyKey, Value> {
        self.node_properties.get_all(id)
    }

    /// Returns nodes with a specific label, in ascending id order.
    #[must_use]
    pub fn nodes_by_label(&self, label: &str) -> Vec<NodeId> {
        let label_to_id = self.label_to_id.read();
        let Some(&label_id) = label_to_id.get(label) else {
            return Vec::new();
        };
        let index = self.label_index.read();
        let mut ids: Vec<NodeId> = index
            .get(label_id as usize)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        ids.sort_unstable();
        ids
    }

    // === Edge Operations ===

    /// Creates a new edge.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] if either endpoint does not exist.
    pub fn create_edge(&self, src: NodeId, dst: NodeId, edge_type: &str) -> Result<EdgeId> {
        for endpoint in [src, dst] {
            if !self.contains_node(endpoint) {
                return Err(Error::NodeNotFound(endpoint));
            }
        }

        let id = EdgeId::new(self.next_edge_id.fetch_add(1, Ordering::Relaxed));
        let type_id = self.get_or_create_edge_type_id(edge_type);

        self.edges
            .write()
            .insert(id, EdgeRecord::new(id, src, dst, type_id));

        self.forward_adj.add_edge(src, dst, id);
        if let Some(ref backward) = self.backward_adj {
            backward.add_edge(dst, src, id);
        }
        Ok(id)
    }

    /// Creates a new edge with properties.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] if either endpoint does not exist.
    pub fn create_edge_with_props(
        &self,
        src: NodeId,
        dst: NodeId,
        edge_type: &str,
        properties: impl IntoIterator<Item = (impl Into<PropertyKey>, impl Into<Value>)>,
    ) -> Result<EdgeId> {
        let id = self.create_edge(src, dst, edge_type)?;
        for (key, value) in properties {
            self.edge_properties.set(id, key.into(), value.into());
        }
        Ok(id)
    }

    /// Returns true if the edge exists and is not deleted.
    #[must_use]
    pub fn contains_edge(&self, id: EdgeId) -> bool {
        self.edges.read().get(&id).is_some_and(|r| !r.is_deleted())
    }

    /// Gets an edge by ID.
    #[must_use]
    pub fn get_edge(&self, id: EdgeId) -> Option<Edge> {
        let record = *self.edges.read().get(&id)?;
        if record.is_deleted() {
            return None;
        }

        let edge_type = self.edge_type_name(record.type_id)?;
        let mut edge = Edge::new(id, record.src, record.dst, edge_type);
        edge.properties = self.edge_properties.get_all(id);
        Some(edge)
    }

    /// Deletes an edge, returning what it looked like.
    ///
    /// The returned view can be handed to [`Self::restore_edge`] to undo the
    /// deletion.
    pub fn delete_edge(&self, id: EdgeId) -> Option<Edge> {
        let edge = self.get_edge(id)?;

        if let Some(record) = self.edges.write().get_mut(&id) {
            record.set_deleted(true);
        }

        self.forward_adj.mark_deleted(edge.src, id);
        if let Some(ref backward) = self.backward_adj {
            backward.mark_deleted(edge.dst, id);
        }
        self.edge_properties.remove_all(id);
        Some(edge)
    }

    /// Revives an edge removed by [`Self::delete_edge`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::EdgeNotFound`] if the edge was never created.
    pub fn restore_edge(&self, edge: &Edge) -> Result<()> {
        {
            let mut edges = self.edges.write();
            let record = edges.get_mut(&edge.id).ok_or(Error::EdgeNotFound(edge.id))?;
            record.set_deleted(false);
        }

        self.forward_adj.unmark_deleted(edge.src, edge.id);
        if let Some(ref backward) = self.backward_adj {
            backward.unmark_deleted(edge.dst, edge.id);
        }
        for (key, value) in &edge.properties {
            self.edge_properties.set(edge.id, key.clone(), value.clone());
        }
        Ok(())
    }

    /// Removes every trace of an edge, as if it had never been created.
    pub fn purge_edge(&self, id: EdgeId) -> bool {
        let Some(record) = self.edges.write().remove(&id) else {
            return false;
        };

        self.forward_adj.purge_edge(record.src, id);
        if let Some(ref backward) = self.backward_adj {
            backward.purge_edge(record.dst, id);
        }
        self.edge_properties.remove_all(id);
        true
    }

    /// Returns the number of live edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges
            .read()
            .values()
            .filter(|r| !r.is_deleted())
            .count()
    }

    /// Sets an edge property, returning the value it replaced.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EdgeNotFound`] if the edge does not exist.
    pub fn set_edge_property(&self, id: EdgeId, key: &str, value: Value) -> Result<Option<Value>> {
        if !self.contains_edge(id) {
            return Err(Error::EdgeNotFound(id));
        }
        Ok(self.edge_properties.set(id, key.into(), value))
    }

    /// Removes an edge property, returning it if it existed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EdgeNotFound`] if the edge does not exist.
    pub fn remove_edge_property(&self, id: EdgeId, key: &str) -> Result<Option<Value>> {
        if !self.contains_edge(id) {
            return Err(Error::EdgeNotFound(id));
        }
        Ok(self.edge_properties.remove(id, key))
    }

    /// Gets a single edge property.
    #[must_use]
    pub fn get_edge_property(&self, id: EdgeId, key: &str) -> Option<Value> {
        self.edge_properties.get(id, key)
    }

    /// Gets all properties of an edge.
    #[must_use]
    pub fn edge_properties(&self, id: EdgeId) -> FxHashMap<PropertyKey, Value> {
        self.edge_properties.get_all(id)
    }

    // === Edge Types ===

    /// Marks an edge type as hidden.
    ///
    /// Hidden edges are skipped by [`Self::edges`] unless the caller names
    /// the type explicitly.
    pub fn hide_edge_type(&self, edge_type: &str) {
        let type_id = self.get_or_create_edge_type_id(edge_type);
        self.hidden_edge_types.write().insert(type_id);
    }

    /// Returns true if the edge type has been hidden.
    #[must_use]
    pub fn is_hidden_edge_type(&self, edge_type: &str) -> bool {
        self.edge_type_to_id
            .read()
            .get(edge_type)
            .is_some_and(|id| self.hidden_edge_types.read().contains(id))
    }

    /// Returns the number of distinct labels.
    #[must_use]
    pub fn label_count(&self) -> usize {
        self.id_to_label.read().len()
    }

    /// Returns the number of distinct edge types.
    #[must_use]
    pub fn edge_type_count(&self) -> usize {
        self.id_to_edge_type.read().len()
    }

    // === Traversal ===

    /// Returns `(neighbor, edge)` pairs incident to `node`.
    ///
    /// With `types == None` every visible type is returned and hidden types
    /// are skipped; with `Some(types)` only the named types are returned,
    /// hidden or not. A self-loop is reported once for [`Direction::Both`].
    #[must_use]
    pub fn edges(
        &self,
        node: NodeId,
        direction: Direction,
        types: Option<&[&str]>,
    ) -> Vec<(NodeId, EdgeId)> {
        let mut candidates = match direction {
            Direction::Outgoing => self.forward_adj.edges_from(node),
            Direction::Incoming => self.incoming(node),
            Direction::Both => {
                let mut out = self.forward_adj.edges_from(node);
                let incoming = self.incoming(node);
                out.extend(
                    incoming
                        .into_iter()
                        .filter(|(neighbor, _)| *neighbor != node),
                );
                out
            }
        };

        let allowed = self.edge_type_filter(types);
        let edges = self.edges.read();
        candidates.retain(|(_, edge_id)| {
            edges
                .get(edge_id)
                .is_some_and(|record| allowed(record.type_id))
        });
        candidates
    }

    /// Returns the number of visible edges incident to `node`.
    #[must_use]
    pub fn degree(&self, node: NodeId, direction: Direction) -> usize {
        self.edges(node, direction, None).len()
    }

    // === Internal Helpers ===

    fn incoming(&self, node: NodeId) -> Vec<(NodeId, EdgeId)> {
        if let Some(ref backward) = self.backward_adj {
            return backward.edges_from(node);
        }
        // Fallback: scan all edges
        let mut found: Vec<(NodeId, EdgeId)> = self
            .edges
            .read()
            .values()
            .filter(|r| !r.is_deleted() && r.dst == node)
            .map(|r| (r.src, r.id))
            .collect();
        found.sort_unstable_by_key(|(_, id)| *id);
        found
    }

    fn edge_type_filter(&self, types: Option<&[&str]>) -> Box<dyn Fn(u32) -> bool> {
        match types {
            None => {
                let hidden = self.hidden_edge_types.read().clone();
                Box::new(move |type_id: u32| !hidden.contains(&type_id))
            }
            Some(names) => {
                let type_to_id = self.edge_type_to_id.read();
                let wanted: FxHashSet<u32> = names
                    .iter()
                    .filter_map(|name| type_to_id.get(*name).copied())
                    .collect();
                Box::new(move |type_id: u32| wanted.contains(&type_id))
            }
        }
    }

    fn edge_type_name(&self, type_id: u32) -> Option<Arc<str>> {
        self.id_to_edge_type.read().get(type_id as usize).cloned()
    }

    fn get_or_create_label_id(&self, label: &str) -> Result<u8> {
        {
            let label_to_id = self.label_to_id.read();
            if let Some(&id) = label_to_id.get(label) {
                return Ok(id);
            }
        }

        let mut label_to_id = self.label_to_id.write();
        let mut id_to_label = self.id_to_label.write();

        // Double-check after acquiring write lock
        if let Some(&id) = label_to_id.get(label) {
            return Ok(id);
        }

        if id_to_label.len() >= MAX_LABELS {
            return Err(Error::InvalidValue(format!(
                "cannot create label {label:?}: maximum of {MAX_LABELS} labels reached"
            )));
        }

        let id = id_to_label.len() as u8;
        let label: Arc<str> = label.into();
        label_to_id.insert(label.clone(), id);
        id_to_label.push(label);
        Ok(id)
    }

    fn get_or_create_edge_type_id(&self, edge_type: &str) -> u32 {
        {
            let type_to_id = self.edge_type_to_id.read();
            if let Some(&id) = type_to_id.get(edge_type) {
                return id;
            }
        }

        let mut type_to_id = self.edge_type_to_id.write();
        let mut id_to_type = self.id_to_edge_type.write();

        // Double-check
        if let Some(&id) = type_to_id.get(edge_type) {
            return id;
        }

        let id = id_to_type.len() as u32;
        let edge_type: Arc<str> = edge_type.into();
        type_to_id.insert(edge_type.clone(), id);
        id_to_type.push(edge_type);
        id
    }
}

impl Default for LpgStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_node_with_props() {
        let store = LpgStore::new();

        let id = store
            .create_node_with_props(
                &["Person"],
                [("name", Value::from("Alice")), ("age", Value::from(30i64))],
            )
            .unwrap();

        let node = store.get_node(id).unwrap();
        assert!(node.has_label("Person"));
        assert!(!node.has_label("Animal"));
        assert_eq!(node.get_property("name").and_then(|v| v.as_str()), Some("Alice"));
        assert_eq!(node.get_property("age").and_then(|v| v.as_int64()), Some(30));
    }

    #[test]
    fn test_property_writes_return_pre_image() {
        let store = LpgStore::new();
        let id = store.create_node(&[]).unwrap();

        assert!(store.set_node_property(id, "name", "x".into()).unwrap().is_none());
        let previous = store.set_node_property(id, "name", "y".into()).unwrap();
        assert_eq!(previous.as_ref().and_then(Value::as_str), Some("x"));

        let removed = store.remove_node_property(id, "name").unwrap();
        assert_eq!(removed.as_ref().and_then(Value::as_str), Some("y"));
        assert!(store.get_node_property(id, "name").is_none());

        assert!(matches!(
            store.set_node_property(NodeId::new(99), "k", Value::Null),
            Err(Error::NodeNotFound(_))
        ));
    }

    #[test]
    fn test_delete_node() {
        let store = LpgStore::new();

        let id = store.create_node(&["Person"]).unwrap();
        assert_eq!(store.node_count(), 1);

        assert!(store.delete_node(id));
        assert_eq!(store.node_count(), 0);
        assert!(store.get_node(id).is_none());
        assert!(store.nodes_by_label("Person").is_empty());

        // Double delete should return false
        assert!(!store.delete_node(id));
    }

    #[test]
    fn test_restore_node() {
        let store = LpgStore::new();
        let id = store
            .create_node_with_props(&["Person"], [("name", "Alix")])
            .unwrap();
        let before = store.get_node(id).unwrap();

        assert!(store.delete_node(id));
        store.restore_node(&before).unwrap();

        let after = store.get_node(id).unwrap();
        assert!(after.has_label("Person"));
        assert_eq!(store.nodes_by_label("Person"), vec![id]);
        assert_eq!(
            store.get_node_property(id, "name"),
            Some(Value::from("Alix"))
        );

        let mut ghost = before.clone();
        ghost.id = NodeId::new(99);
        assert!(store.restore_node(&ghost).is_err());
    }

    #[test]
    fn test_create_edge_requires_endpoints() {
        let store = LpgStore::new();
        let alice = store.create_node(&["Person"]).unwrap();

        assert!(matches!(
            store.create_edge(alice, NodeId::new(42), "KNOWS"),
            Err(Error::NodeNotFound(id)) if id == NodeId::new(42)
        ));

        let bob = store.create_node(&["Person"]).unwrap();
        let edge_id = store.create_edge(alice, bob, "KNOWS").unwrap();
        let edge = store.get_edge(edge_id).unwrap();
        assert_eq!(edge.src, alice);
        assert_eq!(edge.dst, bob);
        assert_eq!(edge.edge_type.as_ref(), "KNOWS");
        assert_eq!(edge.other_endpoint(alice), Some(bob));
    }

    #[test]
    fn test_edges_by_direction() {
        let store = LpgStore::new();

        let a = store.create_node(&[]).unwrap();
        let b = store.create_node(&[]).unwrap();
        let c = store.create_node(&[]).unwrap();

        let ab = store.create_edge(a, b, "KNOWS").unwrap();
        let ca = store.create_edge(c, a, "LIKES").unwrap();
        let aa = store.create_edge(a, a, "SELF").unwrap();

        assert_eq!(store.edges(a, Direction::Outgoing, None), vec![(b, ab), (a, aa)]);
        assert_eq!(store.edges(a, Direction::Incoming, None), vec![(c, ca), (a, aa)]);
        assert_eq!(
            store.edges(a, Direction::Both, None),
            vec![(b, ab), (a, aa), (c, ca)]
        );
        assert_eq!(
            store.edges(a, Direction::Both, Some(&["LIKES"][..])),
            vec![(c, ca)]
        );
        assert!(store.edges(a, Direction::Both, Some(&["UNKNOWN"][..])).is_empty());
    }

    #[test]
    fn test_hidden_edge_types() {
        let store = LpgStore::new();
        store.hide_edge_type("__INTERNAL__");

        let a = store.create_node(&[]).unwrap();
        let b = store.create_node(&[]).unwrap();
        let visible = store.create_edge(a, b, "KNOWS").unwrap();
        let hidden = store.create_edge(a, b, "__INTERNAL__").unwrap();

        assert!(store.is_hidden_edge_type("__INTERNAL__"));
        assert_eq!(store.edges(a, Direction::Outgoing, None), vec![(b, visible)]);
        assert_eq!(
            store.edges(a, Direction::Outgoing, Some(&["__INTERNAL__"][..])),
            vec![(b, hidden)]
        );
        assert_eq!(store.degree(a, Direction::Outgoing), 1);
    }

    #[test]
    fn test_delete_and_restore_edge() {
        let store = LpgStore::new();

        let a = store.create_node(&[]).unwrap();
        let b = store.create_node(&[]).unwrap();
        let id = store
            .create_edge_with_props(a, b, "KNOWS", [("since", 2020i64)])
            .unwrap();

        let removed = store.delete_edge(id).unwrap();
        assert_eq!(store.edge_count(), 0);
        assert!(store.get_edge(id).is_none());
        assert!(store.edges(a, Direction::Outgoing, None).is_empty());
        assert!(store.delete_edge(id).is_none());

        store.restore_edge(&removed).unwrap();
        assert_eq!(store.edge_count(), 1);
        assert_eq!(
            store.get_edge_property(id, "since").and_then(|v| v.as_int64()),
            Some(2020)
        );
        assert_eq!(store.edges(b, Direction::Incoming, None), vec![(a, id)]);
    }

    #[test]
    fn test_purge_edge() {
        let store = LpgStore::new();

        let a = store.create_node(&[]).unwrap();
        let b = store.create_node(&[]).unwrap();
        let id = store.create_edge(a, b, "KNOWS").unwrap();

        assert!(store.purge_edge(id));
        assert!(!store.purge_edge(id));
        assert!(store.edges(a, Direction::Both, None).is_empty());
        assert!(store.edges(b, Direction::Both, None).is_empty());
    }

    #[test]
    fn test_incoming_without_backward_adjacency() {
        let store = LpgStore::with_config(LpgStoreConfig {
            backward_edges: false,
            ..LpgStoreConfig::default()
        });

        let a = store.create_node(&[]).unwrap();
        let b = store.create_node(&[]).unwrap();
        let id = store.create_edge(a, b, "KNOWS").unwrap();

        assert_eq!(store.edges(b, Direction::Incoming, None), vec![(a, id)]);
    }

    #[test]
    fn test_nodes_by_label_sorted() {
        let store = LpgStore::new();

        let p1 = store.create_node(&["Person"]).unwrap();
        let _a = store.create_node(&["Animal"]).unwrap();
        let p2 = store.create_node(&["Person", "Admin"]).unwrap();

        assert_eq!(store.nodes_by_label("Person"), vec![p1, p2]);
        assert_eq!(store.nodes_by_label("Admin"), vec![p2]);
        assert!(store.nodes_by_label("Missing").is_empty());
        assert_eq!(store.label_count(), 3);
    }
}
