//! Undo journal for an open transaction.
//!
//! Every store mutation made on behalf of a transaction appends the
//! pre-image it destroyed. Rollback replays the journal backwards; change
//! reporting folds it forwards into a [`TransactionData`].

use super::data::{PropertyEntry, TransactionData};
use chronograph_common::types::{EdgeId, NodeId, PropertyKey, Value};
use chronograph_common::utils::error::Result;
use chronograph_common::utils::hash::FxHashSet;
use chronograph_core::graph::lpg::{Edge, LpgStore, Node};
use indexmap::IndexMap;

/// A single undoable mutation.
#[derive(Debug, Clone)]
pub(crate) enum UndoEntry {
    /// A node was created.
    CreateNode(NodeId),
    /// An edge was created.
    CreateEdge(EdgeId),
    /// A node was deleted; holds the node as it was.
    DeleteNode(Node),
    /// An edge was deleted; holds the edge as it was.
    DeleteEdge(Edge),
    /// A node property was set or removed; holds the replaced value.
    NodeProperty {
        id: NodeId,
        key: PropertyKey,
        previous: Option<Value>,
    },
    /// An edge property was set or removed; holds the replaced value.
    EdgeProperty {
        id: EdgeId,
        key: PropertyKey,
        previous: Option<Value>,
    },
}

/// The ordered list of mutations made by one transaction.
#[derive(Debug, Default)]
pub(crate) struct Journal {
    entries: Vec<UndoEntry>,
}

impl Journal {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, entry: UndoEntry) {
        self.entries.push(entry);
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reverts every journaled mutation, newest first.
    ///
    /// Keeps going past individual failures so one missing entity cannot
    /// leave the rest of the transaction applied; the first error is
    /// returned.
    pub(crate) fn undo(self, store: &LpgStore) -> Result<()> {
        let mut first_error = None;
        for entry in self.entries.into_iter().rev() {
            let outcome = match entry {
                UndoEntry::CreateNode(id) => {
                    store.delete_node(id);
                    Ok(())
                }
                UndoEntry::CreateEdge(id) => {
                    store.purge_edge(id);
                    Ok(())
                }
                UndoEntry::DeleteNode(node) => store.restore_node(&node),
                UndoEntry::DeleteEdge(edge) => store.restore_edge(&edge),
                UndoEntry::NodeProperty { id, key, previous } => match previous {
                    Some(value) => store.set_node_property(id, key.as_str(), value).map(drop),
                    None => store.remove_node_property(id, key.as_str()).map(drop),
                },
                UndoEntry::EdgeProperty { id, key, previous } => match previous {
                    Some(value) => store.set_edge_property(id, key.as_str(), value).map(drop),
                    None => store.remove_edge_property(id, key.as_str()).map(drop),
                },
            };
            if let Err(e) = outcome {
                tracing::error!(error = %e, "failed to undo journal entry");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Summarizes the journal against the store's current state.
    ///
    /// Entities created and removed within the transaction are not
    /// reported, and a property's `previously_committed` value is the one
    /// it had before the transaction's first write to it.
    pub(crate) fn collect(&self, store: &LpgStore) -> TransactionData {
        let mut created_nodes = Vec::new();
        let mut created_node_set: FxHashSet<NodeId> = FxHashSet::default();
        let mut deleted_nodes = Vec::new();
        let mut created_edges: FxHashSet<EdgeId> = FxHashSet::default();
        let mut created_edge_order = Vec::new();
        let mut deleted_edges = Vec::new();
        let mut node_props: IndexMap<(NodeId, PropertyKey), Option<Value>> = IndexMap::new();
        let mut edge_props: IndexMap<(EdgeId, PropertyKey), Option<Value>> = IndexMap::new();

        for entry in &self.entries {
            match entry {
                UndoEntry::CreateNode(id) => {
                    created_node_set.insert(*id);
                    created_nodes.push(*id);
                }
                UndoEntry::DeleteNode(node) => {
                    if !created_node_set.contains(&node.id) {
                        deleted_nodes.push(node.clone());
                    }
                }
                UndoEntry::CreateEdge(id) => {
                    created_edges.insert(*id);
                    created_edge_order.push(*id);
                }
                UndoEntry::DeleteEdge(edge) => {
                    if !created_edges.contains(&edge.id) {
                        deleted_edges.push(edge.clone());
                    }
                }
                UndoEntry::NodeProperty { id, key, previous } => {
                    node_props
                        .entry((*id, key.clone()))
                        .or_insert_with(|| previous.clone());
                }
                UndoEntry::EdgeProperty { id, key, previous } => {
                    edge_props
                        .entry((*id, key.clone()))
                        .or_insert_with(|| previous.clone());
                }
            }
        }

        let mut data = TransactionData {
            created_nodes: created_nodes
                .into_iter()
                .filter(|id| store.contains_node(*id))
                .collect(),
            created_edges: created_edge_order
                .into_iter()
                .filter(|id| store.contains_edge(*id))
                .collect(),
            deleted_nodes,
            deleted_edges,
            ..TransactionData::default()
        };

        for ((id, key), previous) in node_props {
            if !store.contains_node(id) {
                continue;
            }
            let current = store.get_node_property(id, key.as_str());
            let entry = PropertyEntry::new(id, key, previous, current);
            if entry.value.is_some() {
                data.assigned_node_properties.push(entry);
            } else if entry.previously_committed.is_some() {
                data.removed_node_properties.push(entry);
            }
        }

        for ((id, key), previous) in edge_props {
            if !store.contains_edge(id) {
                continue;
            }
            let current = store.get_edge_property(id, key.as_str());
            let entry = PropertyEntry::new(id, key, previous, current);
            if entry.value.is_some() {
                data.assigned_edge_properties.push(entry);
            } else if entry.previously_committed.is_some() {
                data.removed_edge_properties.push(entry);
            }
        }

        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_node(store: &LpgStore, journal: &mut Journal, id: NodeId, key: &str, value: Value) {
        let previous = store.set_node_property(id, key, value).unwrap();
        journal.push(UndoEntry::NodeProperty {
            id,
            key: key.into(),
            previous,
        });
    }

    #[test]
    fn test_collect_keeps_first_pre_image() {
        let store = LpgStore::new();
        let id = store.create_node_with_props(&[], [("name", "x")]).unwrap();

        let mut journal = Journal::new();
        set_node(&store, &mut journal, id, "name", "y".into());
        set_node(&store, &mut journal, id, "name", "z".into());

        let data = journal.collect(&store);
        assert_eq!(data.assigned_node_properties.len(), 1);
        let entry = &data.assigned_node_properties[0];
        assert_eq!(entry.previously_committed.as_ref().and_then(Value::as_str), Some("x"));
        assert_eq!(entry.value.as_ref().and_then(Value::as_str), Some("z"));
    }

    #[test]
    fn test_collect_reports_removals_but_not_transient_keys() {
        let store = LpgStore::new();
        let id = store.create_node_with_props(&[], [("name", "x")]).unwrap();

        let mut journal = Journal::new();
        let previous = store.remove_node_property(id, "name").unwrap();
        journal.push(UndoEntry::NodeProperty {
            id,
            key: "name".into(),
            previous,
        });
        set_node(&store, &mut journal, id, "tmp", 1i64.into());
        let previous = store.remove_node_property(id, "tmp").unwrap();
        journal.push(UndoEntry::NodeProperty {
            id,
            key: "tmp".into(),
            previous,
        });

        let data = journal.collect(&store);
        assert!(data.assigned_node_properties.is_empty());
        assert_eq!(data.removed_node_properties.len(), 1);
        assert_eq!(data.removed_node_properties[0].key.as_str(), "name");
    }

    #[test]
    fn test_undo_restores_everything() {
        let store = LpgStore::new();
        let a = store.create_node_with_props(&[], [("name", "x")]).unwrap();
        let b = store.create_node(&[]).unwrap();
        let old_edge = store.create_edge(a, b, "KNOWS").unwrap();

        let mut journal = Journal::new();
        set_node(&store, &mut journal, a, "name", "y".into());
        let c = store.create_node(&[]).unwrap();
        journal.push(UndoEntry::CreateNode(c));
        let new_edge = store.create_edge(a, c, "KNOWS").unwrap();
        journal.push(UndoEntry::CreateEdge(new_edge));
        let removed = store.delete_edge(old_edge).unwrap();
        journal.push(UndoEntry::DeleteEdge(removed));

        let data = journal.collect(&store);
        assert_eq!(data.created_nodes, vec![c]);
        assert_eq!(data.created_edges, vec![new_edge]);
        assert_eq!(data.deleted_edges.len(), 1);

        journal.undo(&store).unwrap();
        assert_eq!(
            store.get_node_property(a, "name").as_ref().and_then(Value::as_str),
            Some("x")
        );
        assert!(!store.contains_node(c));
        assert!(!store.contains_edge(new_edge));
        assert!(store.contains_edge(old_edge));
    }

    #[test]
    fn test_deleted_node_is_reported_and_restored() {
        let store = LpgStore::new();
        let a = store.create_node_with_props(&["Person"], [("name", "x")]).unwrap();

        let mut journal = Journal::new();
        let b = store.create_node(&[]).unwrap();
        journal.push(UndoEntry::CreateNode(b));
        for id in [a, b] {
            let node = store.get_node(id).unwrap();
            store.delete_node(id);
            journal.push(UndoEntry::DeleteNode(node));
        }

        let data = journal.collect(&store);
        assert!(data.created_nodes.is_empty());
        assert_eq!(data.deleted_nodes.len(), 1);
        assert_eq!(data.deleted_nodes[0].id, a);

        journal.undo(&store).unwrap();
        assert!(store.contains_node(a));
        assert!(!store.contains_node(b));
        assert_eq!(store.nodes_by_label("Person"), vec![a]);
    }
}
