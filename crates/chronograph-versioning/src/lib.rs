//! # chronograph-versioning
//!
//! Bitemporal history for a property graph. Every committed transaction gets
//! the next version number; nodes keep their past property sets in a chain
//! of snapshots and relationships carry their own validity range, so the
//! graph can be read exactly as it was at any earlier version.
//!
//! Start with [`install`], then read through a [`VersionContext`].
//!
//! ## Modules
//!
//! - [`handler`] - The commit hook that allocates versions and rotates history
//! - [`context`] - Reads bound to one version, versioned deletion, ad-hoc edits
//! - [`node`] / [`relationship`] - Version-bound entity handles
//! - [`entity`] - The `PropertyContainer` trait and raw handles
//! - [`range`] - Validity ranges and their stored encoding
//! - [`history`] - Chain walking and resolution
//! - [`splice`] - Chain surgery
//! - [`metadata`] - The version counter
//! - [`keys`] - Reserved property keys, labels and relationship types
//!
//! ## Example
//!
//! ```
//! use chronograph_common::types::{Value, Version};
//! use chronograph_engine::{GraphAccess, GraphDB};
//! use chronograph_versioning::{PropertyContainer, VersionContext};
//!
//! let db = GraphDB::new_in_memory();
//! chronograph_versioning::install(&db)?;
//! let session = db.session();
//!
//! let alix = session.create_node_with_props(&["Person"], [("name", Value::from("Alix"))])?;
//! session.set_node_property(alix, "name", Value::from("Alix B."))?;
//!
//! let then = VersionContext::new(Version::new(1)).node(&session, alix)?;
//! assert_eq!(then.property("name")?, Some(Value::from("Alix")));
//!
//! let now = VersionContext::new(Version::new(2)).node(&session, alix)?;
//! assert_eq!(now.property("name")?, Some(Value::from("Alix B.")));
//! # Ok::<(), chronograph_common::utils::error::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod context;
pub mod entity;
pub mod handler;
pub mod history;
pub mod keys;
pub mod metadata;
pub mod node;
pub mod range;
pub mod relationship;
pub mod splice;

pub use context::VersionContext;
pub use entity::{PropertyContainer, RawNode, RawRelationship};
pub use handler::{CommitScope, VersioningHandler, install};
pub use history::ChainLink;
pub use node::VersionedNode;
pub use range::Range;
pub use relationship::VersionedRelationship;
