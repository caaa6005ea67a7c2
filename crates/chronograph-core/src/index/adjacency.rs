//! Chunked adjacency lists with delta buffers.
//!
//! Edges are appended in creation order and scanned in that order, which
//! keeps relationship enumeration deterministic. Deletions are tombstones so
//! a rolled-back delete can be revived without reshuffling the list; a
//! rolled-back create is purged outright.

use chronograph_common::types::{EdgeId, NodeId};
use chronograph_common::utils::hash::{FxHashMap, FxHashSet};
use parking_lot::RwLock;
use smallvec::SmallVec;

/// Default chunk capacity (number of edges per chunk).
const DEFAULT_CHUNK_CAPACITY: usize = 64;

/// A chunk of adjacency entries.
#[derive(Debug, Clone)]
struct AdjacencyChunk {
    /// Neighbor node IDs.
    neighbors: Vec<NodeId>,
    /// Edge IDs (parallel to neighbors).
    edge_ids: Vec<EdgeId>,
    capacity: usize,
}

impl AdjacencyChunk {
    fn new(capacity: usize) -> Self {
        Self {
            neighbors: Vec::with_capacity(capacity),
            edge_ids: Vec::with_capacity(capacity),
            capacity,
        }
    }

    fn is_full(&self) -> bool {
        self.neighbors.len() >= self.capacity
    }

    fn push(&mut self, neighbor: NodeId, edge_id: EdgeId) -> bool {
        if self.is_full() {
            return false;
        }
        self.neighbors.push(neighbor);
        self.edge_ids.push(edge_id);
        true
    }

    fn remove(&mut self, edge_id: EdgeId) -> bool {
        match self.edge_ids.iter().position(|&e| e == edge_id) {
            Some(pos) => {
                self.neighbors.remove(pos);
                self.edge_ids.remove(pos);
                true
            }
            None => false,
        }
    }

    fn iter(&self) -> impl Iterator<Item = (NodeId, EdgeId)> + '_ {
        self.neighbors
            .iter()
            .copied()
            .zip(self.edge_ids.iter().copied())
    }
}

/// Adjacency list for a single node.
#[derive(Debug)]
struct AdjacencyList {
    chunks: Vec<AdjacencyChunk>,
    /// Recent insertions that did not fit the last chunk.
    delta_inserts: SmallVec<[(NodeId, EdgeId); 8]>,
    /// Tombstoned edge IDs.
    deleted: FxHashSet<EdgeId>,
}

impl AdjacencyList {
    fn new() -> Self {
        Self {
            chunks: Vec::new(),
            delta_inserts: SmallVec::new(),
            deleted: FxHashSet::default(),
        }
    }

    fn add_edge(&mut self, neighbor: NodeId, edge_id: EdgeId, chunk_capacity: usize) {
        if self.delta_inserts.is_empty() {
            if let Some(last) = self.chunks.last_mut() {
                if last.push(neighbor, edge_id) {
                    return;
                }
            } else {
                let mut chunk = AdjacencyChunk::new(chunk_capacity);
                chunk.push(neighbor, edge_id);
                self.chunks.push(chunk);
                return;
            }
        }
        self.delta_inserts.push((neighbor, edge_id));
    }

    fn purge(&mut self, edge_id: EdgeId) -> bool {
        self.deleted.remove(&edge_id);
        if let Some(pos) = self.delta_inserts.iter().position(|&(_, e)| e == edge_id) {
            self.delta_inserts.remove(pos);
            return true;
        }
        self.chunks.iter_mut().any(|chunk| chunk.remove(edge_id))
    }

    fn compact(&mut self, chunk_capacity: usize) {
        if self.delta_inserts.is_empty() {
            return;
        }

        let mut current = AdjacencyChunk::new(chunk_capacity);
        for (neighbor, edge_id) in self.delta_inserts.drain(..) {
            if !current.push(neighbor, edge_id) {
                self.chunks.push(current);
                current = AdjacencyChunk::new(chunk_capacity);
                current.push(neighbor, edge_id);
            }
        }
        if !current.neighbors.is_empty() {
            self.chunks.push(current);
        }
    }

    fn iter(&self) -> impl Iterator<Item = (NodeId, EdgeId)> + '_ {
        let deleted = &self.deleted;

        self.chunks
            .iter()
            .flat_map(AdjacencyChunk::iter)
            .chain(self.delta_inserts.iter().copied())
            .filter(move |(_, edge_id)| !deleted.contains(edge_id))
    }
}

/// Chunked adjacency lists keyed by the node the edges are scanned from.
///
/// The store keeps one instance for outgoing edges and one for incoming.
pub struct ChunkedAdjacency {
    lists: RwLock<FxHashMap<NodeId, AdjacencyList>>,
    chunk_capacity: usize,
}

impl ChunkedAdjacency {
    /// Creates a new chunked adjacency structure.
    #[must_use]
    pub fn new() -> Self {
        Self::with_chunk_capacity(DEFAULT_CHUNK_CAPACITY)
    }

    /// Creates a new chunked adjacency with custom chunk capacity.
    #[must_use]
    pub fn with_chunk_capacity(capacity: usize) -> Self {
        Self {
            lists: RwLock::new(FxHashMap::default()),
            chunk_capacity: capacity.max(1),
        }
    }

    /// Adds an edge from `from` to `neighbor`.
    pub fn add_edge(&self, from: NodeId, neighbor: NodeId, edge_id: EdgeId) {
        let mut lists = self.lists.write();
        lists
            .entry(from)
            .or_insert_with(AdjacencyList::new)
            .add_edge(neighbor, edge_id, self.chunk_capacity);
    }

    /// Tombstones an edge.
    pub fn mark_deleted(&self, from: NodeId, edge_id: EdgeId) {
        if let Some(list) = self.lists.write().get_mut(&from) {
            list.deleted.insert(edge_id);
        }
    }

    /// Clears a tombstone set by [`Self::mark_deleted`].
    pub fn unmark_deleted(&self, from: NodeId, edge_id: EdgeId) {
        if let Some(list) = self.lists.write().get_mut(&from) {
            list.deleted.remove(&edge_id);
        }
    }

    /// Removes an edge entry entirely. Returns false if it was not present.
    pub fn purge_edge(&self, from: NodeId, edge_id: EdgeId) -> bool {
        self.lists
            .write()
            .get_mut(&from)
            .is_some_and(|list| list.purge(edge_id))
    }

    /// Returns live `(neighbor, edge_id)` pairs in insertion order.
    #[must_use]
    pub fn edges_from(&self, from: NodeId) -> Vec<(NodeId, EdgeId)> {
        self.lists
            .read()
            .get(&from)
            .map(|list| list.iter().collect())
            .unwrap_or_default()
    }

    /// Returns the number of live edges scanned from a node.
    #[must_use]
    pub fn degree(&self, from: NodeId) -> usize {
        self.lists.read().get(&from).map_or(0, |list| list.iter().count())
    }

    /// Folds delta buffers into chunks.
    pub fn compact(&self) {
        let mut lists = self.lists.write();
        for list in lists.values_mut() {
            list.compact(self.chunk_capacity);
        }
    }
}

impl Default for ChunkedAdjacency {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(id: u64) -> NodeId {
        NodeId::new(id)
    }

    fn e(id: u64) -> EdgeId {
        EdgeId::new(id)
    }

    #[test]
    fn test_insertion_order_survives_overflow() {
        let adj = ChunkedAdjacency::with_chunk_capacity(2);
        for i in 0..5 {
            adj.add_edge(n(0), n(i + 1), e(i));
        }

        let ids: Vec<_> = adj.edges_from(n(0)).into_iter().map(|(_, e)| e).collect();
        assert_eq!(ids, vec![e(0), e(1), e(2), e(3), e(4)]);

        adj.compact();
        let ids: Vec<_> = adj.edges_from(n(0)).into_iter().map(|(_, e)| e).collect();
        assert_eq!(ids, vec![e(0), e(1), e(2), e(3), e(4)]);
    }

    #[test]
    fn test_tombstone_and_revive() {
        let adj = ChunkedAdjacency::new();
        adj.add_edge(n(0), n(1), e(0));
        adj.add_edge(n(0), n(2), e(1));

        adj.mark_deleted(n(0), e(0));
        assert_eq!(adj.edges_from(n(0)), vec![(n(2), e(1))]);
        assert_eq!(adj.degree(n(0)), 1);

        adj.unmark_deleted(n(0), e(0));
        assert_eq!(adj.edges_from(n(0)), vec![(n(1), e(0)), (n(2), e(1))]);
    }

    #[test]
    fn test_purge() {
        let adj = ChunkedAdjacency::with_chunk_capacity(1);
        adj.add_edge(n(0), n(1), e(0));
        adj.add_edge(n(0), n(2), e(1));

        assert!(adj.purge_edge(n(0), e(1)));
        assert!(adj.purge_edge(n(0), e(0)));
        assert!(!adj.purge_edge(n(0), e(0)));
        assert_eq!(adj.degree(n(0)), 0);
        assert!(adj.edges_from(n(9)).is_empty());
    }
}
