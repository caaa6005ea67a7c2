//! The capability set shared by raw and versioned entities.

use crate::keys;
use chronograph_common::types::{EdgeId, EntityRef, NodeId, PropertyKey, Value};
use chronograph_common::utils::error::{Error, Result};
use chronograph_engine::GraphAccess;

/// Something that carries properties.
///
/// Implemented by the raw handles ([`RawNode`], [`RawRelationship`]) and by
/// the version-bound proxies, so code can be written once against either.
pub trait PropertyContainer {
    /// The entity behind this handle.
    fn entity(&self) -> EntityRef;

    /// Reads a property. `Ok(None)` means the key is absent.
    ///
    /// # Errors
    ///
    /// Versioned implementations fail with `NotFound` when the entity has no
    /// state at their version.
    fn property(&self, key: &str) -> Result<Option<Value>>;

    /// Returns true if the property is present (and readable).
    fn has_property(&self, key: &str) -> bool {
        matches!(self.property(key), Ok(Some(_)))
    }

    /// Returns the property keys, sorted, without the reserved ones.
    ///
    /// # Errors
    ///
    /// As [`Self::property`].
    fn property_keys(&self) -> Result<Vec<PropertyKey>>;

    /// Writes a property on the live entity, returning the replaced value.
    ///
    /// # Errors
    ///
    /// Returns an error if the host rejects the write.
    fn set_property(&self, key: &str, value: Value) -> Result<Option<Value>>;

    /// Removes a property from the live entity, returning the removed value.
    ///
    /// # Errors
    ///
    /// Returns an error if the host rejects the write.
    fn remove_property(&self, key: &str) -> Result<Option<Value>>;

    /// Deletes the entity.
    ///
    /// Raw handles remove it from the store, and with it from every
    /// version. Versioned handles only mark it deleted as of their version.
    ///
    /// # Errors
    ///
    /// Raw handles fail with `NodeNotFound`/`EdgeNotFound` if the entity is
    /// already gone; any handle fails if the host rejects the write.
    fn delete(&self) -> Result<()>;
}

/// Reads a property of a node or edge.
pub(crate) fn read<G: GraphAccess + ?Sized>(
    graph: &G,
    entity: EntityRef,
    key: &str,
) -> Option<Value> {
    match entity {
        EntityRef::Node(id) => graph.node_property(id, key),
        EntityRef::Edge(id) => graph.edge_property(id, key),
    }
}

/// Writes a property of a node or edge.
pub(crate) fn write<G: GraphAccess + ?Sized>(
    graph: &G,
    entity: EntityRef,
    key: &str,
    value: Value,
) -> Result<Option<Value>> {
    match entity {
        EntityRef::Node(id) => graph.set_node_property(id, key, value),
        EntityRef::Edge(id) => graph.set_edge_property(id, key, value),
    }
}

/// Sorted, non-reserved keys of a property map.
pub(crate) fn visible_keys<'a>(keys: impl Iterator<Item = &'a PropertyKey>) -> Vec<PropertyKey> {
    let mut keys: Vec<PropertyKey> = keys
        .filter(|key| !keys::is_reserved(key.as_str()))
        .cloned()
        .collect();
    keys.sort();
    keys
}

/// An unversioned handle on a live node.
pub struct RawNode<'g, G: GraphAccess + ?Sized> {
    pub(crate) graph: &'g G,
    pub(crate) id: NodeId,
}

impl<'g, G: GraphAccess + ?Sized> RawNode<'g, G> {
    /// Wraps a node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] if the node does not exist.
    pub fn new(graph: &'g G, id: NodeId) -> Result<Self> {
        if graph.contains_node(id) {
            Ok(Self { graph, id })
        } else {
            Err(Error::NodeNotFound(id))
        }
    }

    /// The node id.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }
}

impl<G: GraphAccess + ?Sized> PropertyContainer for RawNode<'_, G> {
    fn entity(&self) -> EntityRef {
        self.id.into()
    }

    fn property(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.graph.node_property(self.id, key))
    }

    fn property_keys(&self) -> Result<Vec<PropertyKey>> {
        Ok(visible_keys(self.graph.node_properties(self.id).keys()))
    }

    fn set_property(&self, key: &str, value: Value) -> Result<Option<Value>> {
        self.graph.set_node_property(self.id, key, value)
    }

    fn remove_property(&self, key: &str) -> Result<Option<Value>> {
        self.graph.remove_node_property(self.id, key)
    }

    fn delete(&self) -> Result<()> {
        if self.graph.delete_node(self.id)? {
            Ok(())
        } else {
            Err(Error::NodeNotFound(self.id))
        }
    }
}

/// An unversioned handle on a live relationship.
pub struct RawRelationship<'g, G: GraphAccess + ?Sized> {
    pub(crate) graph: &'g G,
    pub(crate) id: EdgeId,
}

impl<'g, G: GraphAccess + ?Sized> RawRelationship<'g, G> {
    /// Wraps a relationship.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EdgeNotFound`] if the relationship does not exist.
    pub fn new(graph: &'g G, id: EdgeId) -> Result<Self> {
        match graph.edge(id) {
            Some(_) => Ok(Self { graph, id }),
            None => Err(Error::EdgeNotFound(id)),
        }
    }

    /// The relationship id.
    #[must_use]
    pub fn id(&self) -> EdgeId {
        self.id
    }
}

impl<G: GraphAccess + ?Sized> PropertyContainer for RawRelationship<'_, G> {
    fn entity(&self) -> EntityRef {
        self.id.into()
    }

    fn property(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.graph.edge_property(self.id, key))
    }

    fn property_keys(&self) -> Result<Vec<PropertyKey>> {
        Ok(visible_keys(self.graph.edge_properties(self.id).keys()))
    }

    fn set_property(&self, key: &str, value: Value) -> Result<Option<Value>> {
        self.graph.set_edge_property(self.id, key, value)
    }

    fn remove_property(&self, key: &str) -> Result<Option<Value>> {
        self.graph.remove_edge_property(self.id, key)
    }

    fn delete(&self) -> Result<()> {
        if self.graph.delete_edge(self.id)? {
            Ok(())
        } else {
            Err(Error::EdgeNotFound(self.id))
        }
    }
}
