//! GraphDB main database struct.

use std::sync::Arc;

use chronograph_common::types::{EdgeId, NodeId};
use chronograph_core::graph::lpg::{Edge, LpgStore, Node};

use crate::config::Config;
use crate::session::Session;
use crate::transaction::{HandlerRegistry, TransactionEventHandler, TransactionManager};

/// An in-memory transactional property graph.
///
/// All access goes through [`Session`]s; handlers registered with
/// [`GraphDB::register_handler`] see every commit made by any session.
pub struct GraphDB {
    /// Database configuration.
    config: Config,
    /// The underlying graph store.
    store: Arc<LpgStore>,
    /// Transaction manager.
    tx_manager: Arc<TransactionManager>,
    /// Commit hooks shared by all sessions.
    handlers: Arc<HandlerRegistry>,
}

impl GraphDB {
    /// Creates a new in-memory database.
    ///
    /// # Examples
    ///
    /// ```
    /// use chronograph_engine::GraphDB;
    ///
    /// let db = GraphDB::new_in_memory();
    /// let session = db.session();
    /// ```
    #[must_use]
    pub fn new_in_memory() -> Self {
        Self::with_config(Config::in_memory())
    }

    /// Creates a database with the given configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use chronograph_engine::{Config, GraphDB};
    ///
    /// let config = Config::in_memory().with_capacity(64, 256);
    /// let db = GraphDB::with_config(config);
    /// assert_eq!(db.node_count(), 0);
    /// ```
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        let store = Arc::new(LpgStore::with_config(config.store_config()));
        tracing::debug!(?config, "database created");
        Self {
            config,
            store,
            tx_manager: Arc::new(TransactionManager::new()),
            handlers: Arc::new(HandlerRegistry::default()),
        }
    }

    /// Creates a new session for interacting with the database.
    ///
    /// # Examples
    ///
    /// ```
    /// use chronograph_engine::{GraphAccess, GraphDB};
    ///
    /// let db = GraphDB::new_in_memory();
    /// let session = db.session();
    /// let alix = session.create_node(&["Person"]).unwrap();
    /// assert!(session.contains_node(alix));
    /// ```
    #[must_use]
    pub fn session(&self) -> Session {
        Session::new(
            Arc::clone(&self.store),
            Arc::clone(&self.tx_manager),
            Arc::clone(&self.handlers),
            &self.config,
        )
    }

    /// Registers a transaction event handler.
    ///
    /// Transactions already committing keep the handler list they started
    /// with.
    pub fn register_handler(&self, handler: Arc<dyn TransactionEventHandler>) {
        self.handlers.register(handler);
        tracing::debug!(handlers = self.handlers.len(), "transaction handler registered");
    }

    /// Unregisters a handler previously passed to [`Self::register_handler`].
    ///
    /// Returns false if it was not registered.
    pub fn unregister_handler(&self, handler: &Arc<dyn TransactionEventHandler>) -> bool {
        self.handlers.unregister(handler)
    }

    /// Returns the number of registered handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the underlying store.
    ///
    /// Writes made here bypass transactions and handlers.
    #[must_use]
    pub fn store(&self) -> &Arc<LpgStore> {
        &self.store
    }

    /// Returns the transaction manager.
    #[must_use]
    pub fn transaction_manager(&self) -> &Arc<TransactionManager> {
        &self.tx_manager
    }

    /// Returns the number of nodes in the database.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.store.node_count()
    }

    /// Returns the number of edges in the database.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.store.edge_count()
    }

    /// Returns the number of distinct labels in the database.
    #[must_use]
    pub fn label_count(&self) -> usize {
        self.store.label_count()
    }

    /// Returns the number of distinct edge types in the database.
    #[must_use]
    pub fn edge_type_count(&self) -> usize {
        self.store.edge_type_count()
    }

    /// Gets a node by ID.
    #[must_use]
    pub fn get_node(&self, id: NodeId) -> Option<Node> {
        self.store.get_node(id)
    }

    /// Gets an edge by ID.
    #[must_use]
    pub fn get_edge(&self, id: EdgeId) -> Option<Edge> {
        self.store.get_edge(id)
    }
}
