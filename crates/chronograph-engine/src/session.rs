//! Session management.

use crate::access::GraphAccess;
use crate::config::Config;
use crate::transaction::journal::{Journal, UndoEntry};
use crate::transaction::{
    HandlerRegistry, HandlerScope, TransactionData, TransactionEventHandler, TransactionManager,
};
use chronograph_common::types::{EdgeId, EntityRef, NodeId, PropertyKey, TxId, Value};
use chronograph_common::utils::error::{Error, Result, TransactionError};
use chronograph_common::utils::hash::FxHashMap;
use chronograph_core::graph::Direction;
use chronograph_core::graph::lpg::{Edge, LpgStore, Node};
use parking_lot::Mutex;
use std::sync::Arc;

fn no_active_tx() -> Error {
    TransactionError::InvalidState("No active transaction".to_string()).into()
}

/// The transaction a session currently has open.
struct ActiveTx {
    id: TxId,
    journal: Journal,
}

/// Write access to the open transaction, handed to write closures.
struct TxWrite<'a> {
    store: &'a LpgStore,
    tx_manager: &'a TransactionManager,
    tx: &'a mut ActiveTx,
}

impl TxWrite<'_> {
    fn lock(&self, entity: impl Into<EntityRef>) -> Result<()> {
        self.tx_manager.acquire_write(self.tx.id, entity.into())
    }

    fn record(&mut self, entry: UndoEntry) {
        self.tx.journal.push(entry);
    }
}

/// A session for interacting with the database.
///
/// Sessions provide isolation between concurrent users and manage
/// transaction state. Without an explicit transaction, every write runs in
/// its own transaction (auto-commit), including commit notifications.
///
/// Writes go through [`GraphAccess`]; bring the trait into scope to use them.
pub struct Session {
    /// The underlying store.
    store: Arc<LpgStore>,
    /// Transaction manager.
    tx_manager: Arc<TransactionManager>,
    /// Commit hooks.
    handlers: Arc<HandlerRegistry>,
    /// Maximum pre-commit deliveries per transaction.
    pre_commit_rounds: u32,
    /// Log commits at info level.
    commit_logging: bool,
    /// Current transaction (if any). Locked only for short store updates,
    /// never across handler calls, so handlers can write through the session.
    current_tx: Mutex<Option<ActiveTx>>,
    /// Whether the session is in auto-commit mode.
    auto_commit: bool,
}

impl Session {
    /// Creates a new session.
    pub(crate) fn new(
        store: Arc<LpgStore>,
        tx_manager: Arc<TransactionManager>,
        handlers: Arc<HandlerRegistry>,
        config: &Config,
    ) -> Self {
        Self {
            store,
            tx_manager,
            handlers,
            pre_commit_rounds: config.effective_pre_commit_rounds(),
            commit_logging: config.commit_logging,
            current_tx: Mutex::new(None),
            auto_commit: true,
        }
    }

    /// Begins a new transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if a transaction is already active.
    pub fn begin_tx(&mut self) -> Result<()> {
        self.begin_inner()
    }

    /// Commits the current transaction.
    ///
    /// Handlers run first; if any of them fails, the transaction is rolled
    /// back and that error is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if no transaction is active or a handler rejected
    /// the commit.
    pub fn commit(&mut self) -> Result<()> {
        self.commit_inner()
    }

    /// Aborts the current transaction, undoing all its writes.
    ///
    /// # Errors
    ///
    /// Returns an error if no transaction is active.
    pub fn rollback(&mut self) -> Result<()> {
        let tx = self.take_tx()?;
        let id = tx.id;
        self.undo(tx)?;
        tracing::debug!(%id, "transaction rolled back");
        Ok(())
    }

    /// Returns whether a transaction is active.
    #[must_use]
    pub fn in_transaction(&self) -> bool {
        self.current_tx.lock().is_some()
    }

    /// Returns the id of the current transaction.
    #[must_use]
    pub fn current_tx_id(&self) -> Option<TxId> {
        self.current_tx.lock().as_ref().map(|tx| tx.id)
    }

    /// Sets auto-commit mode.
    pub fn set_auto_commit(&mut self, auto_commit: bool) {
        self.auto_commit = auto_commit;
    }

    /// Returns whether auto-commit is enabled.
    #[must_use]
    pub fn auto_commit(&self) -> bool {
        self.auto_commit
    }

    /// Creates a node with properties.
    ///
    /// # Errors
    ///
    /// Returns an error if a write is rejected.
    pub fn create_node_with_props<'a>(
        &self,
        labels: &[&str],
        properties: impl IntoIterator<Item = (&'a str, Value)>,
    ) -> Result<NodeId> {
        let properties: Vec<_> = properties.into_iter().collect();
        self.write(|w| {
            let id = w.store.create_node(labels)?;
            w.record(UndoEntry::CreateNode(id));
            w.lock(id)?;
            for (key, value) in properties {
                let previous = w.store.set_node_property(id, key, value)?;
                w.record(UndoEntry::NodeProperty {
                    id,
                    key: key.into(),
                    previous,
                });
            }
            Ok(id)
        })
    }

    /// Returns a node view.
    #[must_use]
    pub fn get_node(&self, id: NodeId) -> Option<Node> {
        self.store.get_node(id)
    }

    /// Returns an edge view.
    #[must_use]
    pub fn get_edge(&self, id: EdgeId) -> Option<Edge> {
        self.store.get_edge(id)
    }

    // === Transaction plumbing ===

    fn begin_inner(&self) -> Result<()> {
        let mut current = self.current_tx.lock();
        if current.is_some() {
            return Err(
                TransactionError::InvalidState("Transaction already active".to_string()).into(),
            );
        }

        *current = Some(ActiveTx {
            id: self.tx_manager.begin(),
            journal: Journal::new(),
        });
        Ok(())
    }

    fn take_tx(&self) -> Result<ActiveTx> {
        self.current_tx
            .lock()
            .take()
            .ok_or_else(no_active_tx)
    }

    fn undo(&self, tx: ActiveTx) -> Result<()> {
        let undo = tx.journal.undo(&self.store);
        let abort = self.tx_manager.abort(tx.id);
        undo.and(abort)
    }

    /// Runs `op` inside the current transaction, or inside a transaction of
    /// its own when none is open and auto-commit is on.
    fn write<T>(&self, op: impl FnOnce(&mut TxWrite<'_>) -> Result<T>) -> Result<T> {
        if self.in_transaction() {
            return self.write_in_tx(op);
        }
        if !self.auto_commit {
            return Err(TransactionError::InvalidState(
                "No active transaction and auto-commit is disabled".to_string(),
            )
            .into());
        }

        self.begin_inner()?;
        match self.write_in_tx(op) {
            Ok(value) => {
                self.commit_inner()?;
                Ok(value)
            }
            Err(e) => {
                if let Err(undo) = self.take_tx().and_then(|tx| self.undo(tx)) {
                    tracing::error!(error = %undo, "failed to roll back auto-commit write");
                }
                Err(e)
            }
        }
    }

    fn write_in_tx<T>(&self, op: impl FnOnce(&mut TxWrite<'_>) -> Result<T>) -> Result<T> {
        let mut current = self.current_tx.lock();
        let tx = current
            .as_mut()
            .ok_or_else(no_active_tx)?;
        let mut w = TxWrite {
            store: &self.store,
            tx_manager: &self.tx_manager,
            tx,
        };
        op(&mut w)
    }

    /// Current change set and journal length of the open transaction.
    fn changes(&self) -> Result<(TransactionData, usize)> {
        let current = self.current_tx.lock();
        let tx = current
            .as_ref()
            .ok_or_else(no_active_tx)?;
        Ok((tx.journal.collect(&self.store), tx.journal.len()))
    }

    fn commit_inner(&self) -> Result<()> {
        let tx_id = self
            .current_tx_id()
            .ok_or_else(no_active_tx)?;

        let handlers = self.handlers.snapshot();
        let mut scopes: Vec<HandlerScope> =
            handlers.iter().map(|_| HandlerScope::new(tx_id)).collect();
        let mut deliveries = vec![0u32; handlers.len()];

        let (mut data, _) = self.changes()?;
        if let Err(e) = self.pre_commit(&handlers, &mut scopes, &mut deliveries, &mut data) {
            tracing::warn!(%tx_id, error = %e, "commit rejected, rolling back");
            let tx = self.take_tx()?;
            if let Err(undo) = self.undo(tx) {
                tracing::error!(%tx_id, error = %undo, "rollback after rejected commit failed");
            }
            for ((handler, scope), times) in handlers.iter().zip(&mut scopes).zip(&deliveries) {
                for _ in 0..*times {
                    if let Err(err) = handler.after_rollback(scope, &data) {
                        tracing::error!(%tx_id, error = %err, "after_rollback handler failed");
                    }
                }
            }
            return Err(e);
        }

        let tx = self.take_tx()?;
        self.tx_manager.commit(tx.id)?;

        if self.commit_logging {
            tracing::info!(%tx_id, changes = data.change_count(), "transaction committed");
        } else {
            tracing::debug!(%tx_id, changes = data.change_count(), "transaction committed");
        }

        for ((handler, scope), times) in handlers.iter().zip(&mut scopes).zip(&deliveries) {
            for _ in 0..*times {
                if let Err(err) = handler.after_commit(scope, &data) {
                    tracing::error!(%tx_id, error = %err, "after_commit handler failed");
                }
            }
        }
        Ok(())
    }

    /// Delivers pre-commit until a round leaves the transaction unchanged
    /// or the round limit is hit. On return `data` reflects the final state.
    fn pre_commit(
        &self,
        handlers: &[Arc<dyn TransactionEventHandler>],
        scopes: &mut [HandlerScope],
        deliveries: &mut [u32],
        data: &mut TransactionData,
    ) -> Result<()> {
        let mut round = 0;
        loop {
            let (_, len_before) = self.changes()?;
            let targets = handlers.iter().zip(scopes.iter_mut()).zip(deliveries.iter_mut());
            for ((handler, scope), count) in targets {
                *count += 1;
                handler.before_commit(scope, self, data)?;
            }
            round += 1;

            let (latest, len_after) = self.changes()?;
            *data = latest;
            if len_after == len_before || round >= self.pre_commit_rounds {
                return Ok(());
            }
            tracing::trace!(round, "handlers changed the transaction, redelivering pre-commit");
        }
    }
}

impl GraphAccess for Session {
    fn contains_node(&self, id: NodeId) -> bool {
        self.store.contains_node(id)
    }

    fn node_property(&self, id: NodeId, key: &str) -> Option<Value> {
        self.store.get_node_property(id, key)
    }

    fn node_properties(&self, id: NodeId) -> FxHashMap<PropertyKey, Value> {
        self.store.node_properties(id)
    }

    fn nodes_by_label(&self, label: &str) -> Vec<NodeId> {
        self.store.nodes_by_label(label)
    }

    fn edge(&self, id: EdgeId) -> Option<Edge> {
        self.store.get_edge(id)
    }

    fn edge_property(&self, id: EdgeId, key: &str) -> Option<Value> {
        self.store.get_edge_property(id, key)
    }

    fn edge_properties(&self, id: EdgeId) -> FxHashMap<PropertyKey, Value> {
        self.store.edge_properties(id)
    }

    fn edges(
        &self,
        node: NodeId,
        direction: Direction,
        types: Option<&[&str]>,
    ) -> Vec<(NodeId, EdgeId)> {
        self.store.edges(node, direction, types)
    }

    fn in_transaction(&self) -> bool {
        Session::in_transaction(self)
    }

    fn create_node(&self, labels: &[&str]) -> Result<NodeId> {
        self.write(|w| {
            let id = w.store.create_node(labels)?;
            w.record(UndoEntry::CreateNode(id));
            w.lock(id)?;
            Ok(id)
        })
    }

    fn set_node_property(&self, id: NodeId, key: &str, value: Value) -> Result<Option<Value>> {
        self.write(|w| {
            w.lock(id)?;
            let previous = w.store.set_node_property(id, key, value)?;
            w.record(UndoEntry::NodeProperty {
                id,
                key: key.into(),
                previous: previous.clone(),
            });
            Ok(previous)
        })
    }

    fn remove_node_property(&self, id: NodeId, key: &str) -> Result<Option<Value>> {
        self.write(|w| {
            w.lock(id)?;
            let previous = w.store.remove_node_property(id, key)?;
            if previous.is_some() {
                w.record(UndoEntry::NodeProperty {
                    id,
                    key: key.into(),
                    previous: previous.clone(),
                });
            }
            Ok(previous)
        })
    }

    fn create_edge(&self, src: NodeId, dst: NodeId, edge_type: &str) -> Result<EdgeId> {
        self.write(|w| {
            let id = w.store.create_edge(src, dst, edge_type)?;
            w.record(UndoEntry::CreateEdge(id));
            w.lock(id)?;
            Ok(id)
        })
    }

    fn delete_node(&self, id: NodeId) -> Result<bool> {
        self.write(|w| {
            w.lock(id)?;
            let Some(node) = w.store.get_node(id) else {
                return Ok(false);
            };
            w.store.delete_node(id);
            w.record(UndoEntry::DeleteNode(node));
            Ok(true)
        })
    }

    fn delete_edge(&self, id: EdgeId) -> Result<bool> {
        self.write(|w| {
            w.lock(id)?;
            match w.store.delete_edge(id) {
                Some(edge) => {
                    w.record(UndoEntry::DeleteEdge(edge));
                    Ok(true)
                }
                None => Ok(false),
            }
        })
    }

    fn set_edge_property(&self, id: EdgeId, key: &str, value: Value) -> Result<Option<Value>> {
        self.write(|w| {
            w.lock(id)?;
            let previous = w.store.set_edge_property(id, key, value)?;
            w.record(UndoEntry::EdgeProperty {
                id,
                key: key.into(),
                previous: previous.clone(),
            });
            Ok(previous)
        })
    }

    fn remove_edge_property(&self, id: EdgeId, key: &str) -> Result<Option<Value>> {
        self.write(|w| {
            w.lock(id)?;
            let previous = w.store.remove_edge_property(id, key)?;
            if previous.is_some() {
                w.record(UndoEntry::EdgeProperty {
                    id,
                    key: key.into(),
                    previous: previous.clone(),
                });
            }
            Ok(previous)
        })
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(tx) = self.current_tx.get_mut().take() {
            let id = tx.id;
            tracing::warn!(%id, "session dropped with an open transaction, rolling back");
            if let Err(e) = self.undo(tx) {
                tracing::error!(%id, error = %e, "rollback on drop failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::GraphDB;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_session_create_node() {
        let db = GraphDB::new_in_memory();
        let session = db.session();

        let id = session.create_node(&["Person"]).unwrap();
        assert!(id.is_valid());
        assert_eq!(db.node_count(), 1);
        assert!(!session.in_transaction());
    }

    #[test]
    fn test_session_transaction() {
        let db = GraphDB::new_in_memory();
        let mut session = db.session();

        assert!(!session.in_transaction());

        assert!(!GraphAccess::in_transaction(&session));

        session.begin_tx().unwrap();
        assert!(session.in_transaction());
        assert!(GraphAccess::in_transaction(&session));
        assert!(session.begin_tx().is_err());

        session.commit().unwrap();
        assert!(!session.in_transaction());
        assert!(session.commit().is_err());
    }

    #[test]
    fn test_session_rollback() {
        let db = GraphDB::new_in_memory();
        let mut session = db.session();
        let a = session
            .create_node_with_props(&["Person"], [("name", Value::from("Alix"))])
            .unwrap();
        let b = session.create_node(&[]).unwrap();
        let knows = session.create_edge(a, b, "KNOWS").unwrap();

        session.begin_tx().unwrap();
        session.set_node_property(a, "name", "Gus".into()).unwrap();
        session.remove_node_property(a, "name").unwrap();
        session.delete_edge(knows).unwrap();
        let c = session.create_node(&[]).unwrap();
        session.create_edge(a, c, "KNOWS").unwrap();
        assert!(session.delete_node(b).unwrap());
        assert!(!session.delete_node(b).unwrap());
        session.rollback().unwrap();

        assert!(!session.in_transaction());
        assert_eq!(session.node_property(a, "name"), Some(Value::from("Alix")));
        assert!(!session.contains_node(c));
        assert!(session.contains_node(b));
        assert_eq!(session.edges(a, Direction::Outgoing, None), vec![(b, knows)]);
    }

    #[test]
    fn test_writes_without_auto_commit_need_a_transaction() {
        let db = GraphDB::new_in_memory();
        let mut session = db.session();
        session.set_auto_commit(false);

        assert!(session.create_node(&[]).is_err());
        session.begin_tx().unwrap();
        session.create_node(&[]).unwrap();
        session.commit().unwrap();
        assert_eq!(db.node_count(), 1);
    }

    #[test]
    fn test_write_conflict_between_sessions() {
        let db = GraphDB::new_in_memory();
        let node = db.session().create_node(&[]).unwrap();

        let mut first = db.session();
        let mut second = db.session();
        first.begin_tx().unwrap();
        second.begin_tx().unwrap();

        first.set_node_property(node, "x", 1i64.into()).unwrap();
        let err = second.set_node_property(node, "x", 2i64.into()).unwrap_err();
        assert!(err.is_write_conflict());

        first.commit().unwrap();
        second.set_node_property(node, "x", 2i64.into()).unwrap();
        second.commit().unwrap();
        assert_eq!(db.session().node_property(node, "x"), Some(Value::from(2i64)));
    }

    #[test]
    fn test_dropping_session_rolls_back() {
        let db = GraphDB::new_in_memory();
        {
            let mut session = db.session();
            session.begin_tx().unwrap();
            session.create_node(&[]).unwrap();
        }
        assert_eq!(db.node_count(), 0);
    }

    /// Counts deliveries and writes a marker on the first one.
    #[derive(Default)]
    struct Marker {
        before: AtomicU32,
        after_commit: AtomicU32,
        after_rollback: AtomicU32,
        fail: bool,
    }

    impl TransactionEventHandler for Marker {
        fn before_commit(
            &self,
            _scope: &mut HandlerScope,
            graph: &dyn GraphAccess,
            data: &TransactionData,
        ) -> Result<()> {
            self.before.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::Internal("rejected".to_string()));
            }
            for &id in data.created_nodes() {
                if graph.node_property(id, "seen").is_none() {
                    graph.set_node_property(id, "seen", true.into())?;
                }
            }
            Ok(())
        }

        fn after_commit(&self, _scope: &mut HandlerScope, _data: &TransactionData) -> Result<()> {
            self.after_commit.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn after_rollback(&self, _scope: &mut HandlerScope, _data: &TransactionData) -> Result<()> {
            self.after_rollback.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_handler_writes_join_the_transaction() {
        let db = GraphDB::new_in_memory();
        let marker = Arc::new(Marker::default());
        db.register_handler(marker.clone());

        let session = db.session();
        let id = session.create_node(&[]).unwrap();

        assert_eq!(session.node_property(id, "seen"), Some(Value::from(true)));
        assert_eq!(marker.before.load(Ordering::SeqCst), 1);
        assert_eq!(marker.after_commit.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_pre_commit_redelivered_when_handlers_write() {
        let db = GraphDB::with_config(Config::in_memory().with_pre_commit_rounds(3));
        let marker = Arc::new(Marker::default());
        db.register_handler(marker.clone());

        db.session().create_node(&[]).unwrap();

        // Round one writes the marker, round two changes nothing.
        assert_eq!(marker.before.load(Ordering::SeqCst), 2);
        assert_eq!(marker.after_commit.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failing_handler_rolls_back() {
        let db = GraphDB::new_in_memory();
        let marker = Arc::new(Marker {
            fail: true,
            ..Marker::default()
        });
        db.register_handler(marker.clone());

        let mut session = db.session();
        session.begin_tx().unwrap();
        session.create_node(&[]).unwrap();
        assert!(session.commit().is_err());

        assert!(!session.in_transaction());
        assert_eq!(db.node_count(), 0);
        assert_eq!(marker.after_rollback.load(Ordering::SeqCst), 1);
        assert_eq!(marker.after_commit.load(Ordering::SeqCst), 0);
    }
}
