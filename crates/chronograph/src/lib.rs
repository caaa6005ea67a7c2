//! # Chronograph
//!
//! An embeddable, in-memory property graph that keeps its history.
//!
//! Every committed transaction is assigned the next version number. Node
//! property sets are kept in per-node chains of snapshots and relationships
//! carry their own validity range, so any earlier version can be read back
//! exactly as it was committed.
//!
//! If you're new here, start with [`GraphDB`] and [`install`], then read the
//! past through a [`VersionContext`].
//!
//! ## Quick Start
//!
//! ```rust
//! use chronograph::{Direction, GraphAccess, GraphDB, PropertyContainer, Value, Version, VersionContext};
//!
//! let db = GraphDB::new_in_memory();
//! chronograph::install(&db)?;
//! let mut session = db.session();
//!
//! // Version 1: two people who know each other
//! session.begin_tx()?;
//! let alix = session.create_node_with_props(&["Person"], [("name", Value::from("Alix"))])?;
//! let gus = session.create_node_with_props(&["Person"], [("name", Value::from("Gus"))])?;
//! let knows = session.create_edge(alix, gus, "KNOWS")?;
//! session.commit()?;
//!
//! // Version 2: they fall out, and Alix changes name
//! session.begin_tx()?;
//! VersionContext::new(Version::new(1)).delete_relationship(&session, knows)?;
//! session.set_node_property(alix, "name", Value::from("Alix B."))?;
//! session.commit()?;
//!
//! let then = VersionContext::new(Version::new(1)).node(&session, alix)?;
//! assert_eq!(then.property("name")?, Some(Value::from("Alix")));
//! assert_eq!(then.relationships(Direction::Outgoing, &["KNOWS"]).len(), 1);
//!
//! let now = VersionContext::new(Version::new(2)).node(&session, alix)?;
//! assert_eq!(now.property("name")?, Some(Value::from("Alix B.")));
//! assert!(now.relationships(Direction::Outgoing, &["KNOWS"]).is_empty());
//! # Ok::<(), chronograph::Error>(())
//! ```

// Re-export the host API
pub use chronograph_engine::{
    Config, GraphAccess, GraphDB, HandlerScope, Session, TransactionData, TransactionEventHandler,
};

// Versioning
pub use chronograph_versioning::{
    PropertyContainer, Range, RawNode, RawRelationship, VersionContext, VersionedNode,
    VersionedRelationship, VersioningHandler, install,
};

// Core types - you'll need these for ids, values and versions
pub use chronograph_common::types::{EdgeId, NodeId, PropertyKey, Value, Version};
pub use chronograph_common::utils::error::{Error, Result};
pub use chronograph_core::graph::Direction;
