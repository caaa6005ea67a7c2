//! # chronograph-core
//!
//! Core layer for Chronograph: the raw labeled property graph store and its
//! index structures.
//!
//! This crate knows nothing about transactions or versions. It stores the
//! current state of every entity; the engine journals changes on top of it
//! and the versioning crate layers history over it.
//!
//! ## Modules
//!
//! - [`graph`] - Graph model (LPG store, property columns, node/edge views)
//! - [`index`] - Index structures (chunked adjacency)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod graph;
pub mod index;

// Re-export commonly used types
pub use graph::Direction;
pub use graph::lpg::{Edge, LpgStore, LpgStoreConfig, Node};
pub use index::adjacency::ChunkedAdjacency;
