//! Transaction management.
//!
//! - [`TransactionManager`] hands out ids and detects write-write conflicts.
//! - The undo journal records what each open transaction changed.
//! - [`TransactionData`] is the change set handlers see at commit.
//! - [`TransactionEventHandler`] is the commit hook interface.

mod data;
mod events;
pub(crate) mod journal;
mod manager;

pub use data::{PropertyEntry, TransactionData};
pub use events::{HandlerScope, TransactionEventHandler};
pub(crate) use events::HandlerRegistry;
pub use manager::TransactionManager;
