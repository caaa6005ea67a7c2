//! Database configuration.

use chronograph_core::graph::lpg::LpgStoreConfig;

/// Configuration for a [`GraphDB`](crate::GraphDB).
///
/// ```
/// use chronograph_engine::Config;
///
/// let config = Config::in_memory()
///     .with_backward_edges(false)
///     .with_pre_commit_rounds(2);
/// assert_eq!(config.pre_commit_rounds, 2);
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Maintain incoming adjacency lists in the store.
    pub backward_edges: bool,
    /// Initial node capacity of the store.
    pub initial_node_capacity: usize,
    /// Initial edge capacity of the store.
    pub initial_edge_capacity: usize,
    /// How many times pre-commit may be delivered to the handlers of one
    /// transaction.
    ///
    /// A further round only happens when the previous one changed the
    /// transaction. Values below 1 are treated as 1.
    pub pre_commit_rounds: u32,
    /// Log every commit at `info` level instead of `debug`.
    pub commit_logging: bool,
}

impl Config {
    /// Configuration for an in-memory database.
    #[must_use]
    pub fn in_memory() -> Self {
        let store = LpgStoreConfig::default();
        Self {
            backward_edges: store.backward_edges,
            initial_node_capacity: store.initial_node_capacity,
            initial_edge_capacity: store.initial_edge_capacity,
            pre_commit_rounds: 1,
            commit_logging: false,
        }
    }

    /// Sets whether incoming adjacency lists are kept.
    #[must_use]
    pub fn with_backward_edges(mut self, enabled: bool) -> Self {
        self.backward_edges = enabled;
        self
    }

    /// Sets the initial node and edge capacities.
    #[must_use]
    pub fn with_capacity(mut self, nodes: usize, edges: usize) -> Self {
        self.initial_node_capacity = nodes;
        self.initial_edge_capacity = edges;
        self
    }

    /// Sets the maximum number of pre-commit deliveries per transaction.
    #[must_use]
    pub fn with_pre_commit_rounds(mut self, rounds: u32) -> Self {
        self.pre_commit_rounds = rounds;
        self
    }

    /// Enables `info`-level commit logging.
    #[must_use]
    pub fn with_commit_logging(mut self, enabled: bool) -> Self {
        self.commit_logging = enabled;
        self
    }

    /// The store configuration derived from this one.
    #[must_use]
    pub fn store_config(&self) -> LpgStoreConfig {
        LpgStoreConfig {
            backward_edges: self.backward_edges,
            initial_node_capacity: self.initial_node_capacity,
            initial_edge_capacity: self.initial_edge_capacity,
        }
    }

    pub(crate) fn effective_pre_commit_rounds(&self) -> u32 {
        self.pre_commit_rounds.max(1)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = Config::in_memory()
            .with_capacity(8, 16)
            .with_pre_commit_rounds(0)
            .with_commit_logging(true);

        let store = config.store_config();
        assert!(store.backward_edges);
        assert_eq!(store.initial_node_capacity, 8);
        assert_eq!(store.initial_edge_capacity, 16);
        assert_eq!(config.effective_pre_commit_rounds(), 1);
        assert!(config.commit_logging);
    }
}
