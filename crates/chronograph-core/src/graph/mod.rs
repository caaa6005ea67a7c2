//! Graph model.
//!
//! - [`lpg`] - Labeled property graph storage

pub mod lpg;

use std::fmt;

/// Direction of edge traversal relative to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Edges that start at the node.
    Outgoing,
    /// Edges that end at the node.
    Incoming,
    /// Either.
    Both,
}

impl Direction {
    /// Returns the direction seen from the other endpoint.
    #[must_use]
    pub fn reverse(self) -> Self {
        match self {
            Self::Outgoing => Self::Incoming,
            Self::Incoming => Self::Outgoing,
            Self::Both => Self::Both,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Outgoing => "OUTGOING",
            Self::Incoming => "INCOMING",
            Self::Both => "BOTH",
        })
    }
}
