//! Walking a node's history.

use crate::range::Range;
use crate::splice;
use chronograph_common::types::{NodeId, Version};
use chronograph_common::utils::error::{Error, Result};
use chronograph_engine::GraphAccess;

/// One link of a chain: the node holding a past (or the current) property
/// set and the versions it is authoritative for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainLink {
    /// The node holding the properties.
    pub node: NodeId,
    /// Its stamped range, `None` if unstamped.
    pub range: Option<Range>,
}

impl ChainLink {
    /// Returns true if this link is authoritative at `version`.
    #[must_use]
    pub fn covers(&self, version: Version) -> bool {
        self.range.is_some_and(|range| range.contains(version))
    }
}

/// Iterator over a chain, head first. Created by [`chain`].
///
/// Pointers are followed lazily, one lookup per step. A chain that loops
/// back on itself yields one [`Error::Internal`] and ends, after repeating
/// at most a couple of turns of the loop.
pub struct ChainIter<'g, G: GraphAccess + ?Sized> {
    graph: &'g G,
    pending: Option<NodeId>,
    last: Option<NodeId>,
    // Brent's cycle detection: `anchor` is re-placed every `power` steps,
    // doubling each time, and a loop eventually walks back onto it.
    anchor: Option<NodeId>,
    power: u64,
    steps: u64,
}

/// Iterates the chain starting at `head`.
pub fn chain<G: GraphAccess + ?Sized>(graph: &G, head: NodeId) -> ChainIter<'_, G> {
    ChainIter {
        graph,
        pending: Some(head),
        last: None,
        anchor: None,
        power: 1,
        steps: 0,
    }
}

impl<G: GraphAccess + ?Sized> Iterator for ChainIter<'_, G> {
    type Item = Result<ChainLink>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(previous) = self.last.take() {
            match splice::predecessor(self.graph, previous) {
                Ok(next) => self.pending = next.map(|(_, node)| node),
                Err(e) => return Some(Err(e)),
            }
        }

        let node = self.pending.take()?;
        if self.anchor == Some(node) {
            return Some(Err(Error::Internal(format!(
                "version chain loops back to {node}"
            ))));
        }
        self.steps += 1;
        if self.steps == self.power {
            self.anchor = Some(node);
            self.power = self.power.saturating_mul(2);
            self.steps = 0;
        }

        self.last = Some(node);
        Some(Ok(ChainLink {
            node,
            range: Range::of(self.graph, node),
        }))
    }
}

/// Collects the whole chain, head first.
///
/// # Errors
///
/// Returns an error if the chain is malformed.
pub fn links<G: GraphAccess + ?Sized>(graph: &G, head: NodeId) -> Result<Vec<ChainLink>> {
    chain(graph, head).collect()
}

/// Finds the link authoritative at `version`.
///
/// Returns `Ok(None)` when no link covers it.
///
/// # Errors
///
/// Returns an error if the chain is malformed.
pub fn find<G: GraphAccess + ?Sized>(
    graph: &G,
    head: NodeId,
    version: Version,
) -> Result<Option<ChainLink>> {
    let mut steps = 0usize;
    for link in chain(graph, head) {
        let link = link?;
        if link.covers(version) {
            tracing::trace!(%head, %version, holder = %link.node, steps, "chain resolved");
            return Ok(Some(link));
        }
        steps += 1;
    }
    tracing::debug!(%head, %version, steps, "no chain link covers version");
    Ok(None)
}
