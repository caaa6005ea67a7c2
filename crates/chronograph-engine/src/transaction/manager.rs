//! Transaction bookkeeping and write-write conflict detection.

use chronograph_common::types::{EntityRef, TxId};
use chronograph_common::utils::error::{Result, TransactionError};
use chronograph_common::utils::hash::{FxHashMap, FxHashSet};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};

/// Tracks active transactions and which of them holds each written entity.
///
/// Conflicts are detected eagerly: the first transaction to write an entity
/// owns it until it commits or aborts, and any other transaction that tries
/// to write the same entity fails immediately instead of waiting.
pub struct TransactionManager {
    next_tx_id: AtomicU64,
    active: RwLock<FxHashSet<TxId>>,
    write_owners: Mutex<FxHashMap<EntityRef, TxId>>,
    committed: AtomicU64,
    aborted: AtomicU64,
}

impl TransactionManager {
    /// Creates a manager with no transactions.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_tx_id: AtomicU64::new(1),
            active: RwLock::new(FxHashSet::default()),
            write_owners: Mutex::new(FxHashMap::default()),
            committed: AtomicU64::new(0),
            aborted: AtomicU64::new(0),
        }
    }

    /// Starts a transaction.
    pub fn begin(&self) -> TxId {
        let id = TxId::new(self.next_tx_id.fetch_add(1, Ordering::Relaxed));
        self.active.write().insert(id);
        tracing::trace!(%id, "transaction started");
        id
    }

    /// Returns true if the transaction is active.
    #[must_use]
    pub fn is_active(&self, tx: TxId) -> bool {
        self.active.read().contains(&tx)
    }

    /// Returns the number of active transactions.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.read().len()
    }

    /// Returns the most recently assigned transaction id, if any.
    #[must_use]
    pub fn last_assigned_tx_id(&self) -> Option<TxId> {
        match self.next_tx_id.load(Ordering::Relaxed) {
            1 => None,
            next => Some(TxId::new(next - 1)),
        }
    }

    /// Records that `tx` is about to write `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::InvalidState`] if `tx` is not active and
    /// [`TransactionError::WriteConflict`] if another active transaction
    /// already wrote the entity.
    pub fn acquire_write(&self, tx: TxId, entity: EntityRef) -> Result<()> {
        if !self.is_active(tx) {
            return Err(TransactionError::InvalidState(format!("{tx} is not active")).into());
        }

        let mut owners = self.write_owners.lock();
        match owners.get(&entity) {
            Some(&holder) if holder != tx => {
                tracing::warn!(%entity, %holder, requester = %tx, "write conflict");
                Err(TransactionError::WriteConflict {
                    entity,
                    holder,
                    requester: tx,
                }
                .into())
            }
            Some(_) => Ok(()),
            None => {
                owners.insert(entity, tx);
                Ok(())
            }
        }
    }

    /// Marks a transaction committed and releases its writes.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction is not active.
    pub fn commit(&self, tx: TxId) -> Result<()> {
        self.finish(tx)?;
        self.committed.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Marks a transaction aborted and releases its writes.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction is not active.
    pub fn abort(&self, tx: TxId) -> Result<()> {
        self.finish(tx)?;
        self.aborted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Returns `(committed, aborted)` counts since creation.
    #[must_use]
    pub fn outcome_counts(&self) -> (u64, u64) {
        (
            self.committed.load(Ordering::Relaxed),
            self.aborted.load(Ordering::Relaxed),
        )
    }

    fn finish(&self, tx: TxId) -> Result<()> {
        if !self.active.write().remove(&tx) {
            return Err(TransactionError::InvalidState(format!("{tx} is not active")).into());
        }
        self.write_owners.lock().retain(|_, owner| *owner != tx);
        Ok(())
    }
}

impl Default for TransactionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronograph_common::types::{EdgeId, NodeId};

    #[test]
    fn test_begin_commit_abort() {
        let mgr = TransactionManager::new();
        assert!(mgr.last_assigned_tx_id().is_none());

        let t1 = mgr.begin();
        let t2 = mgr.begin();
        assert_eq!(mgr.active_count(), 2);
        assert_eq!(mgr.last_assigned_tx_id(), Some(t2));

        mgr.commit(t1).unwrap();
        mgr.abort(t2).unwrap();
        assert_eq!(mgr.active_count(), 0);
        assert_eq!(mgr.outcome_counts(), (1, 1));

        assert!(mgr.commit(t1).is_err());
    }

    #[test]
    fn test_write_conflict_until_release() {
        let mgr = TransactionManager::new();
        let t1 = mgr.begin();
        let t2 = mgr.begin();
        let node = EntityRef::from(NodeId::new(0));

        mgr.acquire_write(t1, node).unwrap();
        mgr.acquire_write(t1, node).unwrap();
        let err = mgr.acquire_write(t2, node).unwrap_err();
        assert!(err.is_write_conflict());

        // Unrelated entities are not affected.
        mgr.acquire_write(t2, EntityRef::from(EdgeId::new(0))).unwrap();

        mgr.commit(t1).unwrap();
        mgr.acquire_write(t2, node).unwrap();
    }

    #[test]
    fn test_inactive_transaction_cannot_write() {
        let mgr = TransactionManager::new();
        let tx = mgr.begin();
        mgr.abort(tx).unwrap();
        assert!(mgr.acquire_write(tx, NodeId::new(1).into()).is_err());
    }
}
