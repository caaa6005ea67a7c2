//! # chronograph-common
//!
//! Foundation layer for Chronograph: identifiers, values, versions, and errors.
//!
//! This crate provides the fundamental building blocks used by all other
//! Chronograph crates. It has no internal dependencies and should be kept minimal.
//!
//! ## Modules
//!
//! - [`types`] - Core type definitions (NodeId, EdgeId, Value, Version, etc.)
//! - [`utils`] - Utility functions and helpers (hashing, errors)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod types;
pub mod utils;

// Re-export commonly used types at crate root
pub use types::{EdgeId, NodeId, PropertyKey, TxId, Value, Version};
pub use utils::error::{Error, Result};
