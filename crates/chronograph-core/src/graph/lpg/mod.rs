//! Labeled property graph (LPG) storage.
//!
//! - [`LpgStore`] - node/edge records, property columns, adjacency
//! - [`PropertyStorage`] - columnar property storage
//! - [`Node`] / [`Edge`] - materialized views returned by lookups

mod edge;
mod node;
mod property;
mod store;

pub use edge::{Edge, EdgeRecord};
pub use node::{Node, NodeRecord};
pub use property::{EntityId, PropertyColumn, PropertyStorage};
pub use store::{LpgStore, LpgStoreConfig};
