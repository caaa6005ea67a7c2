//! Reading and writing the graph as of one version.

use crate::entity;
use crate::history;
use crate::keys;
use crate::metadata;
use crate::node::VersionedNode;
use crate::range::Range;
use crate::relationship::VersionedRelationship;
use crate::splice;
use chronograph_common::types::{EdgeId, EntityRef, NodeId, PropertyKey, Value, Version};
use chronograph_common::utils::error::{Error, Result, TransactionError, VersionError};
use chronograph_common::utils::hash::FxHashMap;
use chronograph_engine::GraphAccess;
use indexmap::IndexMap;
use std::fmt;

/// A view of the graph bound to one version.
///
/// The context itself is a plain value; every operation takes the graph to
/// work on. Reads follow a node's chain to the snapshot that was
/// authoritative at the bound version.
///
/// # Examples
///
/// ```
/// use chronograph_common::types::Version;
/// use chronograph_versioning::VersionContext;
///
/// let ctx = VersionContext::new(Version::new(3));
/// assert_eq!(ctx.version(), Version::new(3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VersionContext {
    version: Version,
}

impl VersionContext {
    /// Creates a context bound to `version`.
    #[must_use]
    pub const fn new(version: Version) -> Self {
        Self { version }
    }

    /// The bound version.
    #[must_use]
    pub const fn version(&self) -> Version {
        self.version
    }

    /// Wraps a node, failing if it has no state at this version.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no link of the node's chain covers the version.
    pub fn node<'g, G: GraphAccess + ?Sized>(
        &self,
        graph: &'g G,
        id: NodeId,
    ) -> Result<VersionedNode<'g, G>> {
        self.resolve(graph, id)?;
        Ok(VersionedNode::new(graph, id, *self))
    }

    /// Wraps a relationship, failing if it is not valid at this version.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the relationship's range does not cover the
    /// version.
    pub fn relationship<'g, G: GraphAccess + ?Sized>(
        &self,
        graph: &'g G,
        id: EdgeId,
    ) -> Result<VersionedRelationship<'g, G>> {
        if !self.has_valid_version(graph, id) {
            return Err(self.not_found(id));
        }
        Ok(VersionedRelationship::new(graph, id, *self))
    }

    /// Finds the node holding `node`'s properties at this version.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the chain has no link covering the version.
    pub fn resolve<G: GraphAccess + ?Sized>(&self, graph: &G, node: NodeId) -> Result<NodeId> {
        history::find(graph, node, self.version)?
            .map(|link| link.node)
            .ok_or_else(|| self.not_found(node))
    }

    /// Returns true if the entity's own range covers this version.
    ///
    /// Unstamped entities are never valid.
    pub fn has_valid_version<G: GraphAccess + ?Sized>(
        &self,
        graph: &G,
        entity: impl Into<EntityRef>,
    ) -> bool {
        Range::of(graph, entity).is_some_and(|range| range.contains(self.version))
    }

    // === Properties ===

    /// Reads a property as of this version. `Ok(None)` means absent.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the node has no state at this version.
    pub fn property<G: GraphAccess + ?Sized>(
        &self,
        graph: &G,
        node: NodeId,
        key: &str,
    ) -> Result<Option<Value>> {
        let holder = self.resolve(graph, node)?;
        Ok(graph.node_property(holder, key))
    }

    /// Reads a property, falling back to `default` when it is absent or the
    /// node has no state at this version.
    pub fn property_or<G: GraphAccess + ?Sized>(
        &self,
        graph: &G,
        node: NodeId,
        key: &str,
        default: Value,
    ) -> Value {
        self.property(graph, node, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    /// Returns true if the property is present at this version.
    pub fn has_property<G: GraphAccess + ?Sized>(&self, graph: &G, node: NodeId, key: &str) -> bool {
        matches!(self.property(graph, node, key), Ok(Some(_)))
    }

    /// Property keys at this version, sorted, without the reserved keys.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the node has no state at this version.
    pub fn property_keys<G: GraphAccess + ?Sized>(
        &self,
        graph: &G,
        node: NodeId,
    ) -> Result<Vec<PropertyKey>> {
        let holder = self.resolve(graph, node)?;
        Ok(entity::visible_keys(graph.node_properties(holder).keys()))
    }

    /// Property values at this version, in key order.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the node has no state at this version.
    pub fn property_values<G: GraphAccess + ?Sized>(
        &self,
        graph: &G,
        node: NodeId,
    ) -> Result<Vec<Value>> {
        let holder = self.resolve(graph, node)?;
        let mut properties = graph.node_properties(holder);
        Ok(entity::visible_keys(properties.keys())
            .into_iter()
            .filter_map(|key| properties.remove(key.as_str()))
            .collect())
    }

    /// All visible properties at this version.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the node has no state at this version.
    pub fn properties<G: GraphAccess + ?Sized>(
        &self,
        graph: &G,
        node: NodeId,
    ) -> Result<FxHashMap<PropertyKey, Value>> {
        let holder = self.resolve(graph, node)?;
        let mut properties = graph.node_properties(holder);
        properties.retain(|key, _| !keys::is_reserved(key.as_str()));
        Ok(properties)
    }

    // === Deletion ===

    /// Marks a relationship deleted as of this version.
    ///
    /// Nothing is closed yet; the commit closes the range once the
    /// transaction's version is known.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the relationship is not valid at this version,
    /// `Closed` if it was already deleted, or an error if the host rejects
    /// the write.
    pub fn delete_relationship<G: GraphAccess + ?Sized>(&self, graph: &G, rel: EdgeId) -> Result<()> {
        if !self.has_valid_version(graph, rel) {
            return Err(self.not_found(rel));
        }
        ensure_open(graph, rel.into())?;
        self.mark_deleted(graph, rel.into())
    }

    /// Marks a node deleted as of this version.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the node has no state at this version, `Closed`
    /// if it was already deleted, or an error if the host rejects the write.
    pub fn delete_node<G: GraphAccess + ?Sized>(&self, graph: &G, node: NodeId) -> Result<()> {
        self.resolve(graph, node)?;
        ensure_open(graph, node.into())?;
        self.mark_deleted(graph, node.into())
    }

    fn mark_deleted<G: GraphAccess + ?Sized>(&self, graph: &G, entity: EntityRef) -> Result<()> {
        entity::write(graph, entity, keys::DELETED, Value::Int64(self.version.to_stored()))?;
        tracing::debug!(%entity, version = %self.version, "marked deleted");
        Ok(())
    }

    // === Ad-hoc history ===

    /// Splices in a snapshot equal to the node's current properties with
    /// `key` set to `value`, as of the version the surrounding transaction
    /// will commit at. The live node is not modified.
    ///
    /// Must run inside an explicit transaction so the splice and the commit
    /// agree on the version.
    ///
    /// # Errors
    ///
    /// Returns an error if versioning is not installed, the node is missing,
    /// or a write is rejected.
    pub fn add_versioned_property<G: GraphAccess + ?Sized>(
        graph: &G,
        node: NodeId,
        key: &str,
        value: Value,
    ) -> Result<NodeId> {
        let mut edit = IndexMap::new();
        edit.insert(PropertyKey::new(key), Some(value));
        Self::splice_edit(graph, node, &edit)
    }

    /// Splices in a snapshot equal to the node's current properties without
    /// `key`. Returns the value the snapshot dropped. The live node is not
    /// modified.
    ///
    /// # Errors
    ///
    /// As [`Self::add_versioned_property`].
    pub fn remove_versioned_property<G: GraphAccess + ?Sized>(
        graph: &G,
        node: NodeId,
        key: &str,
    ) -> Result<Option<Value>> {
        let removed = graph.node_property(node, key);
        let mut edit = IndexMap::new();
        edit.insert(PropertyKey::new(key), None);
        Self::splice_edit(graph, node, &edit)?;
        Ok(removed)
    }

    fn splice_edit<G: GraphAccess + ?Sized>(
        graph: &G,
        node: NodeId,
        edit: &IndexMap<PropertyKey, Option<Value>>,
    ) -> Result<NodeId> {
        if !graph.in_transaction() {
            return Err(TransactionError::InvalidState(
                "ad-hoc history edits need an open transaction".to_string(),
            )
            .into());
        }
        ensure_open(graph, node.into())?;
        let version = metadata::pending_version(graph)?;
        let snapshot = splice::snapshot_of(graph, node, edit)?;
        splice::insert_first_in_chain(graph, node, snapshot, version)?;
        Ok(snapshot)
    }

    fn not_found(&self, entity: impl Into<EntityRef>) -> Error {
        VersionError::NotFound {
            entity: entity.into(),
            version: self.version,
        }
        .into()
    }
}

/// Fails with `Closed` if the entity's range already has an upper bound.
fn ensure_open<G: GraphAccess + ?Sized>(graph: &G, entity: EntityRef) -> Result<()> {
    match Range::of(graph, entity) {
        Some(range) if !range.is_open() => Err(VersionError::Closed {
            entity,
            last: range.to(),
        }
        .into()),
        _ => Ok(()),
    }
}

impl fmt::Display for VersionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VersionContext({})", self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::splice::insert_first_in_chain;
    use chronograph_core::graph::lpg::LpgStore;

    fn v(n: u64) -> Version {
        Version::new(n)
    }

    fn ctx(n: u64) -> VersionContext {
        VersionContext::new(v(n))
    }

    /// A node named "x" at v1, "y" from v2.
    fn two_versions(store: &LpgStore) -> NodeId {
        let m = store
            .create_node_with_props(&[], [("name", "y"), ("city", "Lund")])
            .unwrap();
        Range::range(v(1)).stamp(store, m).unwrap();

        let mut overrides = IndexMap::new();
        overrides.insert(PropertyKey::new("name"), Some(Value::from("x")));
        let s = splice::snapshot_of(store, m, &overrides).unwrap();
        insert_first_in_chain(store, m, s, v(2)).unwrap();
        m
    }

    #[test]
    fn test_resolve_picks_covering_link() {
        let store = LpgStore::new();
        let m = two_versions(&store);

        assert_ne!(ctx(1).resolve(&store, m).unwrap(), m);
        assert_eq!(ctx(2).resolve(&store, m).unwrap(), m);
        assert_eq!(ctx(9).resolve(&store, m).unwrap(), m);

        let err = ctx(0).resolve(&store, m).unwrap_err();
        assert!(err.is_version_not_found());
    }

    #[test]
    fn test_property_reads() {
        let store = LpgStore::new();
        let m = two_versions(&store);

        assert_eq!(ctx(1).property(&store, m, "name").unwrap(), Some(Value::from("x")));
        assert_eq!(ctx(2).property(&store, m, "name").unwrap(), Some(Value::from("y")));
        assert_eq!(ctx(2).property(&store, m, "age").unwrap(), None);
        assert!(ctx(0).property(&store, m, "name").is_err());

        assert_eq!(
            ctx(0).property_or(&store, m, "name", Value::from("?")),
            Value::from("?")
        );
        assert!(ctx(1).has_property(&store, m, "city"));
        assert!(!ctx(0).has_property(&store, m, "city"));

        let names = ctx(1).property_keys(&store, m).unwrap();
        assert_eq!(names, vec![PropertyKey::new("city"), PropertyKey::new("name")]);
        assert_eq!(
            ctx(1).property_values(&store, m).unwrap(),
            vec![Value::from("Lund"), Value::from("x")]
        );
        let props = ctx(2).properties(&store, m).unwrap();
        assert_eq!(props.len(), 2);
        assert!(!props.contains_key(keys::VALID_FROM));
    }

    #[test]
    fn test_has_valid_version() {
        let store = LpgStore::new();
        let a = store.create_node(&[]).unwrap();
        let b = store.create_node(&[]).unwrap();
        let e = store.create_edge(a, b, "KNOWS").unwrap();

        assert!(!ctx(1).has_valid_version(&store, e));
        Range::new(v(1), v(2)).stamp(&store, e).unwrap();
        assert!(ctx(1).has_valid_version(&store, e));
        assert!(ctx(2).has_valid_version(&store, e));
        assert!(!ctx(3).has_valid_version(&store, e));

        assert!(ctx(3).relationship(&store, e).unwrap_err().is_version_not_found());
        assert!(ctx(1).relationship(&store, e).is_ok());
        assert!(ctx(1).node(&store, a).unwrap_err().is_version_not_found());
    }

    #[test]
    fn test_delete_marks_only() {
        let store = LpgStore::new();
        let m = two_versions(&store);

        ctx(4).delete_node(&store, m).unwrap();
        assert_eq!(store.get_node_property(m, keys::DELETED), Some(Value::Int64(4)));
        // The range is untouched until commit.
        assert_eq!(Range::of(&store, m), Some(Range::range(v(2))));
        assert!(!ctx(4).property_keys(&store, m).unwrap().iter().any(|k| k.as_str() == keys::DELETED));
    }

    #[test]
    fn test_delete_refuses_closed_or_missing() {
        let store = LpgStore::new();
        let m = two_versions(&store);
        let e = store.create_edge(m, m, "SELF").unwrap();
        Range::new(v(1), v(1)).stamp(&store, e).unwrap();

        assert!(ctx(4).delete_relationship(&store, e).unwrap_err().is_version_not_found());
        assert!(ctx(1).delete_relationship(&store, e).unwrap_err().is_closed());
        assert_eq!(store.get_edge_property(e, keys::DELETED), None);

        // Close the head as a committed deletion at v3 would.
        Range::new(v(2), v(2)).stamp(&store, m).unwrap();
        assert!(ctx(4).delete_node(&store, m).unwrap_err().is_version_not_found());
        assert!(ctx(2).delete_node(&store, m).unwrap_err().is_closed());
        assert_eq!(store.get_node_property(m, keys::DELETED), None);
    }

    #[test]
    fn test_ad_hoc_edits_need_metadata() {
        let store = LpgStore::new();
        let m = two_versions(&store);
        assert!(VersionContext::add_versioned_property(&store, m, "name", "q".into()).is_err());

        let meta = metadata::find_or_create(&store).unwrap();
        store
            .set_node_property(meta, keys::LATEST_VERSION, Value::Int64(4))
            .unwrap();

        let snapshot =
            VersionContext::add_versioned_property(&store, m, "name", "q".into()).unwrap();
        assert_eq!(Range::of(&store, snapshot), Some(Range::new(v(2), v(4))));
        assert_eq!(ctx(3).property(&store, m, "name").unwrap(), Some(Value::from("q")));
        assert_eq!(ctx(5).property(&store, m, "name").unwrap(), Some(Value::from("y")));

        let removed = VersionContext::remove_versioned_property(&store, m, "city").unwrap();
        assert_eq!(removed, Some(Value::from("Lund")));
        // Same pending version again: the new snapshot covers nothing.
        assert_eq!(ctx(5).property(&store, m, "city").unwrap(), Some(Value::from("Lund")));
    }
}
