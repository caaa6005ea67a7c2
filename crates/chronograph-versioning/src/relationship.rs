//! Version-bound relationship handles.

use crate::context::VersionContext;
use crate::entity::{self, PropertyContainer, RawRelationship};
use crate::node::VersionedNode;
use chronograph_common::types::{EdgeId, EntityRef, NodeId, PropertyKey, Value};
use chronograph_common::utils::error::{Error, Result, VersionError};
use chronograph_core::graph::lpg::Edge;
use chronograph_engine::GraphAccess;
use chronograph_engine::access::require_edge;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A relationship seen at one version.
///
/// Relationships are not chained: their own range decides visibility and
/// property reads fail with `NotFound` outside it.
pub struct VersionedRelationship<'g, G: GraphAccess + ?Sized> {
    graph: &'g G,
    id: EdgeId,
    ctx: VersionContext,
}

impl<'g, G: GraphAccess + ?Sized> VersionedRelationship<'g, G> {
    pub(crate) fn new(graph: &'g G, id: EdgeId, ctx: VersionContext) -> Self {
        Self { graph, id, ctx }
    }

    /// The relationship id.
    #[must_use]
    pub fn id(&self) -> EdgeId {
        self.id
    }

    /// The context this handle reads through.
    #[must_use]
    pub fn context(&self) -> VersionContext {
        self.ctx
    }

    /// An unversioned handle on the same relationship.
    #[must_use]
    pub fn raw(&self) -> RawRelationship<'g, G> {
        RawRelationship {
            graph: self.graph,
            id: self.id,
        }
    }

    fn edge(&self) -> Result<Edge> {
        require_edge(self.graph, self.id)
    }

    /// The relationship type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EdgeNotFound`] if the relationship was physically
    /// removed.
    pub fn relationship_type(&self) -> Result<Arc<str>> {
        Ok(self.edge()?.edge_type)
    }

    /// Returns true if the relationship has the given type.
    pub fn is_type(&self, edge_type: &str) -> bool {
        self.graph
            .edge(self.id)
            .is_some_and(|edge| &*edge.edge_type == edge_type)
    }

    /// The source node, bound to the same version.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EdgeNotFound`] if the relationship was physically
    /// removed.
    pub fn start_node(&self) -> Result<VersionedNode<'g, G>> {
        Ok(self.wrap(self.edge()?.src))
    }

    /// The target node, bound to the same version.
    ///
    /// # Errors
    ///
    /// As [`Self::start_node`].
    pub fn end_node(&self) -> Result<VersionedNode<'g, G>> {
        Ok(self.wrap(self.edge()?.dst))
    }

    /// The endpoint opposite `node`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] if `node` is not an endpoint.
    pub fn other_node(&self, node: NodeId) -> Result<VersionedNode<'g, G>> {
        self.edge()?
            .other_endpoint(node)
            .map(|other| self.wrap(other))
            .ok_or(Error::NodeNotFound(node))
    }

    /// Both endpoints, source first.
    ///
    /// # Errors
    ///
    /// As [`Self::start_node`].
    pub fn nodes(&self) -> Result<[VersionedNode<'g, G>; 2]> {
        let edge = self.edge()?;
        Ok([self.wrap(edge.src), self.wrap(edge.dst)])
    }

    fn wrap(&self, node: NodeId) -> VersionedNode<'g, G> {
        VersionedNode::new(self.graph, node, self.ctx)
    }

    fn check_valid(&self) -> Result<()> {
        if self.ctx.has_valid_version(self.graph, self.id) {
            Ok(())
        } else {
            Err(VersionError::NotFound {
                entity: self.id.into(),
                version: self.ctx.version(),
            }
            .into())
        }
    }
}

impl<G: GraphAccess + ?Sized> PropertyContainer for VersionedRelationship<'_, G> {
    fn entity(&self) -> EntityRef {
        self.id.into()
    }

    fn property(&self, key: &str) -> Result<Option<Value>> {
        self.check_valid()?;
        Ok(self.graph.edge_property(self.id, key))
    }

    fn property_keys(&self) -> Result<Vec<PropertyKey>> {
        self.check_valid()?;
        Ok(entity::visible_keys(self.graph.edge_properties(self.id).keys()))
    }

    fn set_property(&self, key: &str, value: Value) -> Result<Option<Value>> {
        self.graph.set_edge_property(self.id, key, value)
    }

    fn remove_property(&self, key: &str) -> Result<Option<Value>> {
        self.graph.remove_edge_property(self.id, key)
    }

    /// Marks the relationship deleted as of the bound version.
    fn delete(&self) -> Result<()> {
        self.ctx.delete_relationship(self.graph, self.id)
    }
}

impl<G: GraphAccess + ?Sized> Clone for VersionedRelationship<'_, G> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<G: GraphAccess + ?Sized> Copy for VersionedRelationship<'_, G> {}

impl<G: GraphAccess + ?Sized> PartialEq for VersionedRelationship<'_, G> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<G: GraphAccess + ?Sized> Eq for VersionedRelationship<'_, G> {}

impl<G: GraphAccess + ?Sized> Hash for VersionedRelationship<'_, G> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<G: GraphAccess + ?Sized> fmt::Debug for VersionedRelationship<'_, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionedRelationship")
            .field("id", &self.id)
            .field("version", &self.ctx.version())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys;
    use crate::range::Range;
    use chronograph_common::types::Version;
    use chronograph_core::graph::lpg::LpgStore;

    fn v(n: u64) -> Version {
        Version::new(n)
    }

    #[test]
    fn test_endpoints_share_context() {
        let store = LpgStore::new();
        let a = store.create_node(&[]).unwrap();
        let b = store.create_node(&[]).unwrap();
        let e = store.create_edge_with_props(a, b, "KNOWS", [("since", 2020i64)]).unwrap();
        Range::range(v(2)).stamp(&store, e).unwrap();

        let rel = VersionContext::new(v(2)).relationship(&store, e).unwrap();
        assert_eq!(rel.relationship_type().unwrap().as_ref(), "KNOWS");
        assert!(rel.is_type("KNOWS"));
        assert_eq!(rel.start_node().unwrap().id(), a);
        assert_eq!(rel.end_node().unwrap().id(), b);
        assert_eq!(rel.other_node(b).unwrap().id(), a);
        assert!(rel.other_node(NodeId::new(99)).is_err());
        assert_eq!(rel.nodes().unwrap().map(|n| n.id()), [a, b]);
        assert_eq!(rel.end_node().unwrap().context(), rel.context());

        assert_eq!(rel.property("since").unwrap(), Some(Value::Int64(2020)));
        assert_eq!(rel.property_keys().unwrap(), vec![PropertyKey::new("since")]);
    }

    #[test]
    fn test_reads_outside_range_fail() {
        let store = LpgStore::new();
        let a = store.create_node(&[]).unwrap();
        let e = store.create_edge(a, a, "SELF").unwrap();
        Range::new(v(1), v(1)).stamp(&store, e).unwrap();

        let stale = VersionedRelationship::new(&store, e, VersionContext::new(v(2)));
        assert!(stale.property("anything").unwrap_err().is_version_not_found());
        assert!(!stale.has_property(keys::VALID_FROM));

        assert!(stale.delete().unwrap_err().is_version_not_found());
        assert_eq!(store.get_edge_property(e, keys::DELETED), None);

        let current = VersionedRelationship::new(&store, e, VersionContext::new(v(1)));
        assert!(current.delete().unwrap_err().is_closed());
    }
}
