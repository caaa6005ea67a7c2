//! Index structures.
//!
//! - [`adjacency`] - Chunked adjacency lists for neighbor traversal

pub mod adjacency;

pub use adjacency::ChunkedAdjacency;
