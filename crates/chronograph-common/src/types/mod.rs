//! Core type definitions for Chronograph.
//!
//! This module contains all fundamental types used throughout the graph:
//! - Identifier types ([`NodeId`], [`EdgeId`], [`TxId`])
//! - Property types ([`Value`], [`PropertyKey`])
//! - Transaction-time axis ([`Version`])

mod id;
mod value;
mod version;

pub use id::{EdgeId, EntityRef, NodeId, TxId};
pub use value::{PropertyKey, Value};
pub use version::Version;
