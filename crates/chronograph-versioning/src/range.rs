//! Validity ranges and the properties that store them.

use crate::entity;
use crate::keys;
use chronograph_common::types::{EntityRef, Value, Version};
use chronograph_common::utils::error::Result;
use chronograph_engine::GraphAccess;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An inclusive range of versions, `[from, to]`.
///
/// `to == Version::MAX` is the open bound of a live entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    from: Version,
    to: Version,
}

impl Range {
    /// Creates `[from, to]`.
    #[must_use]
    pub const fn new(from: Version, to: Version) -> Self {
        Self { from, to }
    }

    /// Creates the open range `[from, +inf)`.
    #[must_use]
    pub const fn range(from: Version) -> Self {
        Self::new(from, Version::MAX)
    }

    /// First version covered.
    #[must_use]
    pub const fn from(&self) -> Version {
        self.from
    }

    /// Last version covered.
    #[must_use]
    pub const fn to(&self) -> Version {
        self.to
    }

    /// Returns true if the upper bound is open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.to.is_max()
    }

    /// Returns true if `from <= v <= to`.
    #[must_use]
    pub fn contains(&self, v: Version) -> bool {
        self.from <= v && v <= self.to
    }

    /// Reads the range stamped on an entity.
    ///
    /// Returns `None` if either bound is unset, which makes the entity
    /// invisible at every version.
    pub fn of<G: GraphAccess + ?Sized>(graph: &G, entity: impl Into<EntityRef>) -> Option<Self> {
        let entity = entity.into();
        Some(Self::new(
            valid_from(graph, entity)?,
            valid_to(graph, entity)?,
        ))
    }

    /// Writes both bounds onto an entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the host rejects the write.
    pub fn stamp<G: GraphAccess + ?Sized>(
        &self,
        graph: &G,
        entity: impl Into<EntityRef>,
    ) -> Result<()> {
        let entity = entity.into();
        set_valid_from(graph, entity, self.from)?;
        set_valid_to(graph, entity, self.to)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_open() {
            write!(f, "[{}, ∞)", self.from)
        } else {
            write!(f, "[{}, {}]", self.from, self.to)
        }
    }
}

fn read_bound<G: GraphAccess + ?Sized>(graph: &G, entity: EntityRef, key: &str) -> Option<Version> {
    entity::read(graph, entity, key)
        .and_then(|value| value.as_int64())
        .and_then(Version::from_stored)
}

/// Reads the lower bound of an entity's range.
pub fn valid_from<G: GraphAccess + ?Sized>(
    graph: &G,
    entity: impl Into<EntityRef>,
) -> Option<Version> {
    read_bound(graph, entity.into(), keys::VALID_FROM)
}

/// Reads the upper bound of an entity's range.
pub fn valid_to<G: GraphAccess + ?Sized>(
    graph: &G,
    entity: impl Into<EntityRef>,
) -> Option<Version> {
    read_bound(graph, entity.into(), keys::VALID_TO)
}

/// Sets the lower bound of an entity's range.
///
/// # Errors
///
/// Returns an error if the host rejects the write.
pub fn set_valid_from<G: GraphAccess + ?Sized>(
    graph: &G,
    entity: impl Into<EntityRef>,
    version: Version,
) -> Result<()> {
    entity::write(graph, entity.into(), keys::VALID_FROM, Value::Int64(version.to_stored()))
        .map(drop)
}

/// Sets the upper bound of an entity's range.
///
/// # Errors
///
/// Returns an error if the host rejects the write.
pub fn set_valid_to<G: GraphAccess + ?Sized>(
    graph: &G,
    entity: impl Into<EntityRef>,
    version: Version,
) -> Result<()> {
    entity::write(graph, entity.into(), keys::VALID_TO, Value::Int64(version.to_stored()))
        .map(drop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronograph_common::types::NodeId;
    use chronograph_core::graph::lpg::LpgStore;

    fn v(n: u64) -> Version {
        Version::new(n)
    }

    #[test]
    fn test_contains_is_inclusive() {
        let r = Range::new(v(2), v(4));
        assert!(!r.contains(v(1)));
        assert!(r.contains(v(2)));
        assert!(r.contains(v(4)));
        assert!(!r.contains(v(5)));

        let open = Range::range(v(3));
        assert!(open.is_open());
        assert!(open.contains(Version::MAX));
        assert!(!open.contains(v(2)));
    }

    #[test]
    fn test_display() {
        assert_eq!(Range::new(v(1), v(3)).to_string(), "[v1, v3]");
        assert_eq!(Range::range(v(7)).to_string(), "[v7, ∞)");
    }

    #[test]
    fn test_unset_bounds_are_invalid() {
        let store = LpgStore::new();
        let id: NodeId = GraphAccess::create_node(&store, &[]).unwrap();
        assert_eq!(Range::of(&store, id), None);

        set_valid_from(&store, id, v(1)).unwrap();
        assert_eq!(Range::of(&store, id), None);

        GraphAccess::set_node_property(&store, id, keys::VALID_TO, Value::Int64(keys::UNSET))
            .unwrap();
        assert_eq!(Range::of(&store, id), None);

        set_valid_to(&store, id, v(5)).unwrap();
        assert_eq!(Range::of(&store, id), Some(Range::new(v(1), v(5))));
    }

    #[test]
    fn test_stamp_round_trips_open_bound() {
        let store = LpgStore::new();
        let a = GraphAccess::create_node(&store, &[]).unwrap();
        let b = GraphAccess::create_node(&store, &[]).unwrap();
        let e = GraphAccess::create_edge(&store, a, b, "KNOWS").unwrap();

        Range::range(v(3)).stamp(&store, e).unwrap();
        assert_eq!(
            store.get_edge_property(e, keys::VALID_TO),
            Some(Value::Int64(i64::MAX))
        );
        assert_eq!(Range::of(&store, e), Some(Range::range(v(3))));
    }
}
