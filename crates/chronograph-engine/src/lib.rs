//! # chronograph-engine
//!
//! The reference host for Chronograph: database management, sessions,
//! transactions and commit notifications on top of the raw store.
//!
//! ## Modules
//!
//! - [`database`] - GraphDB struct and handler registration
//! - [`session`] - Session/transaction management
//! - [`config`] - Configuration options
//! - [`transaction`] - Transaction manager, change sets, event handlers
//! - [`access`] - The `GraphAccess` trait layered crates program against

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod access;
pub mod config;
pub mod database;
pub mod session;
pub mod transaction;

pub use access::GraphAccess;
pub use config::Config;
pub use database::GraphDB;
pub use session::Session;
pub use transaction::{HandlerScope, PropertyEntry, TransactionData, TransactionEventHandler};
