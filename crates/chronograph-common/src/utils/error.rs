//! Error types.
//!
//! One [`Error`] enum is shared by every crate in the workspace. Subsystems
//! with richer failure modes get their own nested enum ([`TransactionError`],
//! [`VersionError`]) so callers can match on the category first.

use crate::types::{EdgeId, EntityRef, NodeId, TxId, Version};
use thiserror::Error;

/// Result alias used throughout Chronograph.
pub type Result<T> = std::result::Result<T, Error>;

/// The top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// The node does not exist in the store.
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    /// The edge does not exist in the store.
    #[error("edge {0} not found")]
    EdgeNotFound(EdgeId),

    /// A value had the wrong type.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// The expected type name.
        expected: String,
        /// The type name actually found.
        found: String,
    },

    /// A value was structurally invalid.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// A transaction-level failure.
    #[error(transparent)]
    Transaction(#[from] TransactionError),

    /// A versioned-view failure.
    #[error(transparent)]
    Version(#[from] VersionError),

    /// An internal invariant was violated.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Transaction failures reported by the host.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// The operation is not valid in the current transaction state.
    #[error("invalid transaction state: {0}")]
    InvalidState(String),

    /// Another active transaction already wrote the entity.
    #[error("write conflict on {entity}: held by {holder}, requested by {requester}")]
    WriteConflict {
        /// The contended entity.
        entity: EntityRef,
        /// The transaction that holds the write.
        holder: TxId,
        /// The transaction that was refused.
        requester: TxId,
    },
}

/// Failures of version-scoped reads.
#[derive(Debug, Error)]
pub enum VersionError {
    /// The entity has no snapshot valid at the requested version.
    #[error("version [{version}] not found for {entity}")]
    NotFound {
        /// The entity that was looked up.
        entity: EntityRef,
        /// The requested version.
        version: Version,
    },

    /// A single-relationship query matched more than one relationship.
    #[error(
        "more than one relationship [{edge_type}, {direction}] found for {node} at {version}"
    )]
    AmbiguousResult {
        /// The node the query started from.
        node: NodeId,
        /// The requested relationship type.
        edge_type: String,
        /// The requested direction.
        direction: String,
        /// The bound version.
        version: Version,
    },

    /// The entity's range is already closed: it was deleted and its history
    /// no longer accepts changes.
    #[error("{entity} was deleted after {last} and cannot be changed")]
    Closed {
        /// The deleted entity.
        entity: EntityRef,
        /// The last version it is valid at.
        last: Version,
    },

    /// The operation is not supported on versioned views.
    #[error("not implemented: {0}")]
    Unimplemented(&'static str),
}

impl Error {
    /// Returns true if this is a version-scoped `NotFound`.
    #[must_use]
    pub fn is_version_not_found(&self) -> bool {
        matches!(self, Self::Version(VersionError::NotFound { .. }))
    }

    /// Returns true if the entity was already deleted.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Version(VersionError::Closed { .. }))
    }

    /// Returns true if this is a write-write conflict.
    #[must_use]
    pub fn is_write_conflict(&self) -> bool {
        matches!(self, Self::Transaction(TransactionError::WriteConflict { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = Error::from(VersionError::NotFound {
            entity: NodeId::new(4).into(),
            version: Version::new(0),
        });
        assert!(err.is_version_not_found());
        assert_eq!(err.to_string(), "version [v0] not found for n4");
    }

    #[test]
    fn test_closed_message() {
        let err = Error::from(VersionError::Closed {
            entity: NodeId::new(2).into(),
            last: Version::new(1),
        });
        assert!(err.is_closed());
        assert!(!err.is_version_not_found());
        assert_eq!(err.to_string(), "n2 was deleted after v1 and cannot be changed");
    }

    #[test]
    fn test_write_conflict_message() {
        let err = Error::from(TransactionError::WriteConflict {
            entity: NodeId::new(0).into(),
            holder: TxId::new(1),
            requester: TxId::new(2),
        });
        assert!(err.is_write_conflict());
        assert!(err.to_string().contains("held by tx1"));
    }
}
