//! Version-bound node handles.

use crate::context::VersionContext;
use crate::entity::{PropertyContainer, RawNode};
use crate::keys;
use crate::relationship::VersionedRelationship;
use chronograph_common::types::{EntityRef, NodeId, PropertyKey, Value};
use chronograph_common::utils::error::{Result, VersionError};
use chronograph_common::utils::hash::FxHashMap;
use chronograph_core::graph::Direction;
use chronograph_engine::GraphAccess;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A node seen at one version.
///
/// Reads return the state that was authoritative at the bound version;
/// writes go to the live node and become history at the next commit.
/// Relationship enumeration silently skips relationships that were not valid
/// at the version.
pub struct VersionedNode<'g, G: GraphAccess + ?Sized> {
    graph: &'g G,
    id: NodeId,
    ctx: VersionContext,
}

impl<'g, G: GraphAccess + ?Sized> VersionedNode<'g, G> {
    pub(crate) fn new(graph: &'g G, id: NodeId, ctx: VersionContext) -> Self {
        Self { graph, id, ctx }
    }

    /// The live node id.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The context this handle reads through.
    #[must_use]
    pub fn context(&self) -> VersionContext {
        self.ctx
    }

    /// An unversioned handle on the same node.
    #[must_use]
    pub fn raw(&self) -> RawNode<'g, G> {
        RawNode {
            graph: self.graph,
            id: self.id,
        }
    }

    /// Returns the node's property, or `default` if absent or unresolvable.
    pub fn property_or(&self, key: &str, default: Value) -> Value {
        self.ctx.property_or(self.graph, self.id, key, default)
    }

    /// Property values at the bound version, in key order.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the node has no state at the bound version.
    pub fn property_values(&self) -> Result<Vec<Value>> {
        self.ctx.property_values(self.graph, self.id)
    }

    /// All visible properties at the bound version.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the node has no state at the bound version.
    pub fn properties(&self) -> Result<FxHashMap<PropertyKey, Value>> {
        self.ctx.properties(self.graph, self.id)
    }

    /// Relationships valid at the bound version.
    ///
    /// An empty `types` slice means every type. Chain pointers are never
    /// returned.
    pub fn relationships(
        &self,
        direction: Direction,
        types: &[&str],
    ) -> Vec<VersionedRelationship<'g, G>> {
        let filter = (!types.is_empty()).then_some(types);
        self.graph
            .edges(self.id, direction, filter)
            .into_iter()
            .filter(|(_, edge)| self.ctx.has_valid_version(self.graph, *edge))
            .filter_map(|(_, edge)| {
                let rel = VersionedRelationship::new(self.graph, edge, self.ctx);
                (!rel.is_type(keys::PREV_VERSION)).then_some(rel)
            })
            .collect()
    }

    /// Returns true if any relationship matches at the bound version.
    pub fn has_relationship(&self, direction: Direction, types: &[&str]) -> bool {
        !self.relationships(direction, types).is_empty()
    }

    /// The one relationship of a type and direction at the bound version.
    ///
    /// # Errors
    ///
    /// Returns `AmbiguousResult` if more than one matches.
    pub fn single_relationship(
        &self,
        edge_type: &str,
        direction: Direction,
    ) -> Result<Option<VersionedRelationship<'g, G>>> {
        let mut found = self.relationships(direction, &[edge_type]);
        if found.len() > 1 {
            return Err(VersionError::AmbiguousResult {
                node: self.id,
                edge_type: edge_type.to_string(),
                direction: direction.to_string(),
                version: self.ctx.version(),
            }
            .into());
        }
        Ok(found.pop())
    }

    /// Creates a relationship to `other` on the live graph and wraps it.
    ///
    /// The relationship becomes valid from the version its transaction
    /// commits at, so it is usually not visible through this handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the host rejects the write.
    pub fn create_relationship_to(
        &self,
        other: NodeId,
        edge_type: &str,
    ) -> Result<VersionedRelationship<'g, G>> {
        let edge = self.graph.create_edge(self.id, other, edge_type)?;
        Ok(VersionedRelationship::new(self.graph, edge, self.ctx))
    }

    /// Multi-hop traversal is not available on versioned nodes.
    ///
    /// # Errors
    ///
    /// Always returns `Unimplemented`.
    pub fn traverse(&self) -> Result<Vec<VersionedNode<'g, G>>> {
        Err(VersionError::Unimplemented("traversal over versioned nodes").into())
    }
}

impl<G: GraphAccess + ?Sized> PropertyContainer for VersionedNode<'_, G> {
    fn entity(&self) -> EntityRef {
        self.id.into()
    }

    fn property(&self, key: &str) -> Result<Option<Value>> {
        self.ctx.property(self.graph, self.id, key)
    }

    fn has_property(&self, key: &str) -> bool {
        self.ctx.has_property(self.graph, self.id, key)
    }

    fn property_keys(&self) -> Result<Vec<PropertyKey>> {
        self.ctx.property_keys(self.graph, self.id)
    }

    fn set_property(&self, key: &str, value: Value) -> Result<Option<Value>> {
        self.graph.set_node_property(self.id, key, value)
    }

    fn remove_property(&self, key: &str) -> Result<Option<Value>> {
        self.graph.remove_node_property(self.id, key)
    }

    /// Marks the node deleted as of the bound version.
    fn delete(&self) -> Result<()> {
        self.ctx.delete_node(self.graph, self.id)
    }
}

impl<G: GraphAccess + ?Sized> Clone for VersionedNode<'_, G> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<G: GraphAccess + ?Sized> Copy for VersionedNode<'_, G> {}

impl<G: GraphAccess + ?Sized> PartialEq for VersionedNode<'_, G> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<G: GraphAccess + ?Sized> Eq for VersionedNode<'_, G> {}

impl<G: GraphAccess + ?Sized> Hash for VersionedNode<'_, G> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<G: GraphAccess + ?Sized> fmt::Debug for VersionedNode<'_, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionedNode")
            .field("id", &self.id)
            .field("version", &self.ctx.version())
            .finish()
    }
}
