//! The metadata node holding the version counter.

use crate::keys;
use chronograph_common::types::{NodeId, Value, Version};
use chronograph_common::utils::error::{Error, Result};
use chronograph_engine::GraphAccess;

/// Finds the metadata node.
///
/// # Errors
///
/// Returns [`Error::Internal`] if more than one node carries the metadata
/// label.
pub fn find<G: GraphAccess + ?Sized>(graph: &G) -> Result<Option<NodeId>> {
    match graph.nodes_by_label(keys::METADATA_LABEL).as_slice() {
        [] => Ok(None),
        [node] => Ok(Some(*node)),
        more => Err(Error::Internal(format!(
            "{} nodes labelled {}",
            more.len(),
            keys::METADATA_LABEL
        ))),
    }
}

/// Finds the metadata node, creating it with a zero counter if missing.
///
/// # Errors
///
/// Returns an error if the lookup fails or a write is rejected.
pub fn find_or_create<G: GraphAccess + ?Sized>(graph: &G) -> Result<NodeId> {
    if let Some(node) = find(graph)? {
        return Ok(node);
    }
    let node = graph.create_node(&[keys::METADATA_LABEL])?;
    graph.set_node_property(node, keys::LATEST_VERSION, Value::Int64(0))?;
    tracing::info!(%node, "version metadata node created");
    Ok(node)
}

/// Reads the last allocated version. An absent counter reads as zero.
///
/// # Errors
///
/// Returns [`Error::TypeMismatch`] if the counter is not a non-negative
/// `Int64`.
pub fn latest_version<G: GraphAccess + ?Sized>(graph: &G, metadata: NodeId) -> Result<Version> {
    match graph.node_property(metadata, keys::LATEST_VERSION) {
        None => Ok(Version::ZERO),
        Some(value) => value
            .as_int64()
            .and_then(Version::from_stored)
            .ok_or_else(|| Error::TypeMismatch {
                expected: "non-negative Int64".to_string(),
                found: value.to_string(),
            }),
    }
}

/// Allocates the next version: locks the counter, reads it, writes it back
/// incremented.
///
/// # Errors
///
/// Returns an error if the counter is malformed or the host rejects the
/// write (for instance on a write conflict with another committer).
pub fn allocate<G: GraphAccess + ?Sized>(graph: &G, metadata: NodeId) -> Result<Version> {
    graph.set_node_property(metadata, keys::VERSION_LOCK, Value::Int64(0))?;
    let next = latest_version(graph, metadata)?.next();
    graph.set_node_property(metadata, keys::LATEST_VERSION, Value::Int64(next.to_stored()))?;
    Ok(next)
}

/// The version the current transaction will commit as, without allocating
/// it.
///
/// # Errors
///
/// Returns an error if the metadata node is missing or malformed.
pub fn pending_version<G: GraphAccess + ?Sized>(graph: &G) -> Result<Version> {
    let metadata = find(graph)?
        .ok_or_else(|| Error::Internal("versioning is not installed".to_string()))?;
    Ok(latest_version(graph, metadata)?.next())
}
