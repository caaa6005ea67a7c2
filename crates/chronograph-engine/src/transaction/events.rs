//! Transaction event handlers.
//!
//! Handlers are notified around commit:
//!
//! ```text
//! commit() ──► before_commit ×N ──► store commit ──► after_commit ×N
//!                   │ error
//!                   └──────────► undo journal ──► after_rollback ×N
//! ```
//!
//! `N` is the number of pre-commit deliveries the handler received for this
//! transaction. Usually one, but the host re-delivers pre-commit when
//! [`Config::pre_commit_rounds`](crate::Config) allows it and a round added
//! changes, so handlers must tolerate repeated notification. The
//! post-notifications are delivered exactly as many times as pre-commit was,
//! letting handlers keep a balanced entry counter in their [`HandlerScope`].

use super::data::TransactionData;
use crate::access::GraphAccess;
use chronograph_common::types::TxId;
use chronograph_common::utils::error::Result;
use chronograph_common::utils::hash::FxHashMap;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Receives commit notifications from the host.
pub trait TransactionEventHandler: Send + Sync {
    /// Called before the transaction commits.
    ///
    /// Writes made through `graph` join the committing transaction. An
    /// error aborts and rolls back the whole transaction.
    fn before_commit(
        &self,
        scope: &mut HandlerScope,
        graph: &dyn GraphAccess,
        data: &TransactionData,
    ) -> Result<()>;

    /// Called after the transaction committed.
    ///
    /// Errors are logged by the host; the commit stands.
    fn after_commit(&self, scope: &mut HandlerScope, data: &TransactionData) -> Result<()> {
        let _ = (scope, data);
        Ok(())
    }

    /// Called after the transaction was rolled back during commit.
    ///
    /// Errors are logged by the host.
    fn after_rollback(&self, scope: &mut HandlerScope, data: &TransactionData) -> Result<()> {
        let _ = (scope, data);
        Ok(())
    }
}

/// Per-transaction, per-handler state owned by the host.
///
/// Created when a commit starts and dropped when its post-notifications
/// have been delivered. Handlers stash typed values here instead of keeping
/// shared mutable state of their own.
pub struct HandlerScope {
    tx_id: TxId,
    slots: FxHashMap<TypeId, Box<dyn Any + Send>>,
}

impl HandlerScope {
    /// Creates an empty scope for a transaction.
    #[must_use]
    pub fn new(tx_id: TxId) -> Self {
        Self {
            tx_id,
            slots: FxHashMap::default(),
        }
    }

    /// The transaction this scope belongs to.
    #[must_use]
    pub fn tx_id(&self) -> TxId {
        self.tx_id
    }

    /// Returns the stored value of type `T`.
    #[must_use]
    pub fn get<T: Any + Send>(&self) -> Option<&T> {
        self.slots
            .get(&TypeId::of::<T>())
            .and_then(|slot| slot.downcast_ref())
    }

    /// Returns the stored value of type `T` mutably.
    pub fn get_mut<T: Any + Send>(&mut self) -> Option<&mut T> {
        self.slots
            .get_mut(&TypeId::of::<T>())
            .and_then(|slot| slot.downcast_mut())
    }

    /// Returns the stored `T`, inserting `T::default()` first if absent.
    pub fn get_or_default<T: Any + Send + Default>(&mut self) -> &mut T {
        self.slots
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(T::default()))
            .downcast_mut()
            .unwrap_or_else(|| unreachable!("slot keyed by TypeId holds that type"))
    }

    /// Removes and returns the stored `T`.
    pub fn remove<T: Any + Send>(&mut self) -> Option<T> {
        self.slots
            .remove(&TypeId::of::<T>())
            .and_then(|slot| slot.downcast().ok())
            .map(|boxed| *boxed)
    }
}

impl fmt::Debug for HandlerScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerScope")
            .field("tx_id", &self.tx_id)
            .field("slots", &self.slots.len())
            .finish()
    }
}

/// The handlers registered with a database, in registration order.
#[derive(Default)]
pub(crate) struct HandlerRegistry {
    handlers: RwLock<Vec<Arc<dyn TransactionEventHandler>>>,
}

impl HandlerRegistry {
    pub(crate) fn register(&self, handler: Arc<dyn TransactionEventHandler>) {
        self.handlers.write().push(handler);
    }

    /// Removes a handler by identity. Returns false if it was not registered.
    pub(crate) fn unregister(&self, handler: &Arc<dyn TransactionEventHandler>) -> bool {
        let mut handlers = self.handlers.write();
        let before = handlers.len();
        handlers.retain(|h| !Arc::ptr_eq(h, handler));
        handlers.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.handlers.read().len()
    }

    /// The handlers as of now; registrations during a commit take effect on
    /// the next one.
    pub(crate) fn snapshot(&self) -> Vec<Arc<dyn TransactionEventHandler>> {
        self.handlers.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default, Debug, PartialEq)]
    struct Depth(u32);

    #[test]
    fn test_scope_slots() {
        let mut scope = HandlerScope::new(TxId::new(3));
        assert_eq!(scope.tx_id(), TxId::new(3));
        assert!(scope.get::<Depth>().is_none());

        scope.get_or_default::<Depth>().0 += 1;
        scope.get_or_default::<Depth>().0 += 1;
        assert_eq!(scope.get::<Depth>(), Some(&Depth(2)));

        scope.get_mut::<Depth>().unwrap().0 -= 1;
        assert_eq!(scope.remove::<Depth>(), Some(Depth(1)));
        assert!(scope.remove::<Depth>().is_none());
    }
}
