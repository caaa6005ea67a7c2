//! Inserting history snapshots at the front of a chain.
//!
//! A chain hangs off the live node (the head) through `__PREV_VERSION__`
//! edges, newest snapshot first:
//!
//! ```text
//! M ──► P ──► ... ──► oldest          before
//! M ──► S ──► P ──► ... ──► oldest    after insert_first_in_chain(M, S, v)
//! ```
//!
//! Only `M`, `S` and the pointer out of `M` are touched, whatever the
//! length of the chain.

use crate::keys;
use crate::range::{self, Range};
use chronograph_common::types::{EdgeId, NodeId, PropertyKey, Value, Version};
use chronograph_common::utils::error::{Error, Result};
use chronograph_core::graph::Direction;
use chronograph_engine::GraphAccess;
use indexmap::IndexMap;

/// Returns the chain pointer leaving `node` and its target, if any.
///
/// # Errors
///
/// Returns [`Error::Internal`] if the node has more than one chain pointer.
pub fn predecessor<G: GraphAccess + ?Sized>(
    graph: &G,
    node: NodeId,
) -> Result<Option<(EdgeId, NodeId)>> {
    let pointers = graph.edges(node, Direction::Outgoing, Some(&[keys::PREV_VERSION][..]));
    match pointers.as_slice() {
        [] => Ok(None),
        [(target, edge)] => Ok(Some((*edge, *target))),
        more => Err(Error::Internal(format!(
            "{node} has {} {} pointers",
            more.len(),
            keys::PREV_VERSION
        ))),
    }
}

/// Creates an unlinked snapshot of `head`.
///
/// The snapshot starts as a copy of every property of the head, including
/// the range keys, then each override is applied: `Some` sets the key,
/// `None` removes it.
///
/// # Errors
///
/// Returns an error if the head does not exist or a write is rejected.
pub fn snapshot_of<G: GraphAccess + ?Sized>(
    graph: &G,
    head: NodeId,
    overrides: &IndexMap<PropertyKey, Option<Value>>,
) -> Result<NodeId> {
    if !graph.contains_node(head) {
        return Err(Error::NodeNotFound(head));
    }

    let mut properties = graph.node_properties(head);
    for (key, value) in overrides {
        match value {
            Some(value) => {
                properties.insert(key.clone(), value.clone());
            }
            None => {
                properties.remove(key.as_str());
            }
        }
    }

    let snapshot = graph.create_node(&[])?;
    let mut keys: Vec<_> = properties.into_iter().collect();
    keys.sort_by(|a, b| a.0.cmp(&b.0));
    for (key, value) in keys {
        graph.set_node_property(snapshot, key.as_str(), value)?;
    }
    Ok(snapshot)
}

/// Makes `snapshot` the immediate predecessor of `head`.
///
/// The snapshot takes over the head's current range start and is closed at
/// `version - 1`; the head becomes valid from `version`. Its upper bound is
/// left alone.
///
/// # Errors
///
/// Returns an error if the head's chain is malformed or a write is rejected.
pub fn insert_first_in_chain<G: GraphAccess + ?Sized>(
    graph: &G,
    head: NodeId,
    snapshot: NodeId,
    version: Version,
) -> Result<()> {
    if let Some((pointer, older)) = predecessor(graph, head)? {
        graph.create_edge(snapshot, older, keys::PREV_VERSION)?;
        graph.delete_edge(pointer)?;
    }
    graph.create_edge(head, snapshot, keys::PREV_VERSION)?;

    let old_from = range::valid_from(graph, head);
    match old_from {
        Some(from) => Range::new(from, version.prev()).stamp(graph, snapshot)?,
        None => range::set_valid_to(graph, snapshot, version.prev())?,
    }
    range::set_valid_from(graph, head, version)?;

    tracing::debug!(%head, %snapshot, %version, "snapshot spliced into chain");
    Ok(())
}
