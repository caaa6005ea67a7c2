//! The commit hook that turns transactions into versions.
//!
//! Once per transaction, before it commits:
//!
//! 1. allocate the next version on the metadata node,
//! 2. stamp created nodes and relationships `[version, ∞)`,
//! 3. close relationships whose deletion marker was set at `version - 1`,
//! 4. collect the pre-transaction values of edited node properties, closing
//!    nodes whose deletion marker was set instead (deletion wins),
//! 5. splice one snapshot per edited node holding those values.
//!
//! A range is closed once. Setting the marker again on a deleted entity
//! leaves its range alone, and editing a deleted entity rejects the commit
//! with `VersionError::Closed`.
//!
//! Everything runs in the committing transaction, so a rejected commit
//! rolls all of it back with the application's own writes.

use crate::keys;
use crate::metadata;
use crate::range::{self, Range};
use crate::splice;
use chronograph_common::types::{EdgeId, EntityRef, NodeId, PropertyKey, Value, Version};
use chronograph_common::utils::error::{Error, Result, VersionError};
use chronograph_common::utils::hash::FxHashSet;
use chronograph_engine::{
    GraphAccess, GraphDB, HandlerScope, PropertyEntry, TransactionData, TransactionEventHandler,
};
use indexmap::IndexMap;
use std::sync::Arc;

/// Pre-commit nesting depth of one transaction.
///
/// Lives in the transaction's [`HandlerScope`]: created on the first
/// pre-commit delivery, dropped when the matching post-notifications have
/// brought it back to zero.
#[derive(Debug, Default)]
pub struct CommitScope {
    depth: u32,
}

impl CommitScope {
    /// Current nesting depth.
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth
    }
}

/// Pre-transaction values per node, in first-touch order.
type PriorValues = IndexMap<NodeId, IndexMap<PropertyKey, Option<Value>>>;

/// Versions every transaction committed through the database it is
/// installed on.
#[derive(Debug)]
pub struct VersioningHandler {
    metadata: NodeId,
}

impl VersioningHandler {
    /// Creates a handler keeping its counter on `metadata`.
    ///
    /// Most callers want [`install`].
    #[must_use]
    pub fn new(metadata: NodeId) -> Self {
        Self { metadata }
    }

    /// The node holding the version counter.
    #[must_use]
    pub fn metadata_node(&self) -> NodeId {
        self.metadata
    }

    /// The last allocated version.
    ///
    /// # Errors
    ///
    /// Returns an error if the counter is malformed.
    pub fn latest_version<G: GraphAccess + ?Sized>(&self, graph: &G) -> Result<Version> {
        metadata::latest_version(graph, self.metadata)
    }

    fn version_transaction(&self, graph: &dyn GraphAccess, data: &TransactionData) -> Result<()> {
        let version = metadata::allocate(graph, self.metadata)?;
        let created = self.stamp_creations(graph, data, version)?;
        let closed = self.close_deleted_relationships(graph, data, version)?;
        self.reject_closed_relationship_edits(graph, data, &closed)?;
        let prior = self.collect_prior_values(graph, data, version)?;

        for (node, values) in &prior {
            let snapshot = splice::snapshot_of(graph, *node, values)?;
            splice::insert_first_in_chain(graph, *node, snapshot, version)?;
        }

        tracing::info!(
            %version,
            created,
            rotated = prior.len(),
            "transaction versioned"
        );
        Ok(())
    }

    /// Step 2. Entities that already carry a valid range were spliced in
    /// ad hoc and keep theirs; chain pointers are never stamped.
    fn stamp_creations(
        &self,
        graph: &dyn GraphAccess,
        data: &TransactionData,
        version: Version,
    ) -> Result<usize> {
        let mut stamped = 0;
        for &node in data.created_nodes() {
            if node == self.metadata || Range::of(graph, node).is_some() {
                continue;
            }
            Range::range(version).stamp(graph, node)?;
            stamped += 1;
        }
        for &edge in data.created_edges() {
            let is_pointer = graph
                .edge(edge)
                .is_some_and(|e| &*e.edge_type == keys::PREV_VERSION);
            if is_pointer || Range::of(graph, edge).is_some() {
                continue;
            }
            Range::range(version).stamp(graph, edge)?;
            stamped += 1;
        }
        Ok(stamped)
    }

    /// Step 3. Returns the relationships closed by this transaction.
    fn close_deleted_relationships(
        &self,
        graph: &dyn GraphAccess,
        data: &TransactionData,
        version: Version,
    ) -> Result<FxHashSet<EdgeId>> {
        let mut closed = FxHashSet::default();
        for entry in data.assigned_edge_properties() {
            if entry.key.as_str() != keys::DELETED {
                continue;
            }
            if closed_range(graph, entry.entity).is_some() {
                tracing::debug!(edge = %entry.entity, "relationship already closed");
                continue;
            }
            range::set_valid_to(graph, entry.entity, version.prev())?;
            closed.insert(entry.entity);
            tracing::debug!(edge = %entry.entity, %version, "relationship closed");
        }
        Ok(closed)
    }

    /// Relationships are not chained, so an edit to a deleted one would
    /// rewrite what earlier versions see.
    fn reject_closed_relationship_edits(
        &self,
        graph: &dyn GraphAccess,
        data: &TransactionData,
        closed_now: &FxHashSet<EdgeId>,
    ) -> Result<()> {
        let edited = data
            .assigned_edge_properties()
            .iter()
            .chain(data.removed_edge_properties())
            .filter(|entry| !keys::is_reserved(entry.key.as_str()))
            .map(|entry| entry.entity)
            .filter(|edge| !closed_now.contains(edge));
        for edge in edited {
            if let Some(last) = closed_range(graph, edge) {
                return Err(closed_error(edge, last));
            }
        }
        Ok(())
    }

    /// Step 4.
    fn collect_prior_values(
        &self,
        graph: &dyn GraphAccess,
        data: &TransactionData,
        version: Version,
    ) -> Result<PriorValues> {
        let created: FxHashSet<NodeId> = data.created_nodes().iter().copied().collect();
        let mut deleted = FxHashSet::default();
        let mut prior = PriorValues::new();

        let mut record = |entry: &PropertyEntry<NodeId>| {
            if created.contains(&entry.entity) || keys::is_reserved(entry.key.as_str()) {
                return;
            }
            prior
                .entry(entry.entity)
                .or_default()
                .insert(entry.key.clone(), entry.previously_committed.clone());
        };

        for entry in data.assigned_node_properties() {
            if entry.entity == self.metadata {
                continue;
            }
            if entry.key.as_str() == keys::DELETED {
                if closed_range(graph, entry.entity).is_some() {
                    tracing::debug!(node = %entry.entity, "node already closed");
                } else {
                    range::set_valid_to(graph, entry.entity, version.prev())?;
                    deleted.insert(entry.entity);
                    tracing::debug!(node = %entry.entity, %version, "node closed");
                }
                continue;
            }
            record(entry);
        }
        for entry in data.removed_node_properties() {
            if entry.entity != self.metadata {
                record(entry);
            }
        }

        prior.retain(|node, _| !deleted.contains(node));
        for &node in prior.keys() {
            if let Some(last) = closed_range(graph, node) {
                return Err(closed_error(node, last));
            }
        }
        Ok(prior)
    }

    fn exit(&self, scope: &mut HandlerScope) -> Result<()> {
        let tx = scope.tx_id();
        let remaining = match scope.get_mut::<CommitScope>() {
            Some(state) if state.depth > 0 => {
                state.depth -= 1;
                state.depth
            }
            _ => {
                tracing::error!(%tx, "commit scope exited more often than entered");
                return Err(Error::Internal(
                    "versioning commit scope exited without being entered".to_string(),
                ));
            }
        };
        if remaining == 0 {
            scope.remove::<CommitScope>();
        }
        Ok(())
    }
}

impl TransactionEventHandler for VersioningHandler {
    fn before_commit(
        &self,
        scope: &mut HandlerScope,
        graph: &dyn GraphAccess,
        data: &TransactionData,
    ) -> Result<()> {
        let depth = {
            let state = scope.get_or_default::<CommitScope>();
            state.depth += 1;
            state.depth
        };
        if depth > 1 {
            tracing::debug!(tx = %scope.tx_id(), depth, "nested pre-commit ignored");
            return Ok(());
        }
        self.version_transaction(graph, data)
    }

    fn after_commit(&self, scope: &mut HandlerScope, _data: &TransactionData) -> Result<()> {
        self.exit(scope)
    }

    fn after_rollback(&self, scope: &mut HandlerScope, _data: &TransactionData) -> Result<()> {
        self.exit(scope)
    }
}

/// The last valid version of an entity whose range is already closed.
fn closed_range(graph: &dyn GraphAccess, entity: impl Into<EntityRef>) -> Option<Version> {
    Range::of(graph, entity)
        .filter(|range| !range.is_open())
        .map(|range| range.to())
}

fn closed_error(entity: impl Into<EntityRef>, last: Version) -> Error {
    let entity = entity.into();
    tracing::warn!(%entity, %last, "edit to a deleted entity rejected");
    VersionError::Closed { entity, last }.into()
}

/// Enables versioning on a database.
///
/// Finds or creates the metadata node, hides chain pointers from ordinary
/// enumeration and registers a [`VersioningHandler`]. Install once per
/// database; data written before installation is not versioned.
///
/// # Errors
///
/// Returns an error if the metadata node cannot be found or created.
///
/// # Examples
///
/// ```
/// use chronograph_engine::{GraphAccess, GraphDB};
/// use chronograph_common::types::Version;
///
/// let db = GraphDB::new_in_memory();
/// let versioning = chronograph_versioning::install(&db).unwrap();
///
/// let session = db.session();
/// session.create_node(&["Person"]).unwrap();
/// assert_eq!(versioning.latest_version(&session).unwrap(), Version::new(1));
/// ```
pub fn install(db: &GraphDB) -> Result<Arc<VersioningHandler>> {
    let mut session = db.session();
    session.begin_tx()?;
    let metadata = match metadata::find_or_create(&session) {
        Ok(node) => node,
        Err(e) => {
            session.rollback()?;
            return Err(e);
        }
    };
    session.commit()?;

    db.store().hide_edge_type(keys::PREV_VERSION);
    let handler = Arc::new(VersioningHandler::new(metadata));
    db.register_handler(handler.clone());
    tracing::info!(%metadata, "versioning installed");
    Ok(handler)
}
