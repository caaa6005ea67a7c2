//! Identifier types.
//!
//! All identifiers are thin `u64` newtypes. `u64::MAX` is reserved as the
//! invalid sentinel so a default-constructed id never aliases a real entity.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(u64);

        impl $name {
            /// The invalid sentinel.
            pub const INVALID: Self = Self(u64::MAX);

            /// Creates an id from a raw value.
            #[inline]
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the raw value.
            #[inline]
            #[must_use]
            pub const fn as_u64(&self) -> u64 {
                self.0
            }

            /// Returns true unless this is the invalid sentinel.
            #[inline]
            #[must_use]
            pub const fn is_valid(&self) -> bool {
                self.0 != u64::MAX
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

define_id!(
    /// Identifier of a node.
    NodeId,
    "n"
);

define_id!(
    /// Identifier of an edge (relationship).
    EdgeId,
    "e"
);

define_id!(
    /// Identifier of a host transaction.
    TxId,
    "tx"
);

/// A reference to either kind of graph entity.
///
/// Used wherever nodes and edges are handled uniformly: write-conflict
/// tracking in the transaction manager and validity stamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityRef {
    /// A node.
    Node(NodeId),
    /// An edge.
    Edge(EdgeId),
}

impl From<NodeId> for EntityRef {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}

impl From<EdgeId> for EntityRef {
    fn from(id: EdgeId) -> Self {
        Self::Edge(id)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(id) => id.fmt(f),
            Self::Edge(id) => id.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_sentinel() {
        assert!(!NodeId::default().is_valid());
        assert!(NodeId::new(0).is_valid());
        assert_eq!(EdgeId::INVALID.as_u64(), u64::MAX);
    }

    #[test]
    fn test_display() {
        assert_eq!(NodeId::new(7).to_string(), "n7");
        assert_eq!(EntityRef::from(EdgeId::new(3)).to_string(), "e3");
        assert_eq!(TxId::new(1).to_string(), "tx1");
    }
}
