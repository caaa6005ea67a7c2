//! Property storage for the LPG model.
//!
//! Properties are stored column-wise: one sparse column per key. Every write
//! hands back the value it replaced so the transaction journal can record
//! the pre-image without a second lookup.

use chronograph_common::types::{EdgeId, NodeId, PropertyKey, Value};
use chronograph_common::utils::hash::FxHashMap;
use parking_lot::RwLock;
use std::hash::Hash;
use std::marker::PhantomData;

/// Trait for entity IDs that can be used as property storage keys.
pub trait EntityId: Copy + Eq + Hash + 'static {}

impl EntityId for NodeId {}
impl EntityId for EdgeId {}

/// Columnar property storage.
///
/// Generic over the entity ID type (NodeId or EdgeId).
pub struct PropertyStorage<Id: EntityId = NodeId> {
    /// Map from property key to column.
    columns: RwLock<FxHashMap<PropertyKey, PropertyColumn<Id>>>,
    _marker: PhantomData<Id>,
}

impl<Id: EntityId> PropertyStorage<Id> {
    /// Creates a new property storage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            columns: RwLock::new(FxHashMap::default()),
            _marker: PhantomData,
        }
    }

    /// Sets a property value, returning the value it replaced.
    pub fn set(&self, id: Id, key: PropertyKey, value: Value) -> Option<Value> {
        let mut columns = self.columns.write();
        columns
            .entry(key)
            .or_insert_with(PropertyColumn::new)
            .set(id, value)
    }

    /// Gets a property value for an entity.
    #[must_use]
    pub fn get(&self, id: Id, key: &str) -> Option<Value> {
        let columns = self.columns.read();
        columns.get(key).and_then(|col| col.get(id))
    }

    /// Removes a property value, returning it if it existed.
    pub fn remove(&self, id: Id, key: &str) -> Option<Value> {
        let mut columns = self.columns.write();
        columns.get_mut(key).and_then(|col| col.remove(id))
    }

    /// Removes all properties for an entity.
    pub fn remove_all(&self, id: Id) {
        let mut columns = self.columns.write();
        for col in columns.values_mut() {
            col.remove(id);
        }
    }

    /// Gets all properties for an entity.
    #[must_use]
    pub fn get_all(&self, id: Id) -> FxHashMap<PropertyKey, Value> {
        let columns = self.columns.read();
        let mut result = FxHashMap::default();
        for (key, col) in columns.iter() {
            if let Some(value) = col.get(id) {
                result.insert(key.clone(), value);
            }
        }
        result
    }

    /// Returns the keys an entity has values for.
    #[must_use]
    pub fn keys_of(&self, id: Id) -> Vec<PropertyKey> {
        let columns = self.columns.read();
        columns
            .iter()
            .filter(|(_, col)| col.contains(id))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Returns the number of property columns.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.read().len()
    }
}

impl<Id: EntityId> Default for PropertyStorage<Id> {
    fn default() -> Self {
        Self::new()
    }
}

/// A single property column.
///
/// Stores values for a specific property key across all entities.
pub struct PropertyColumn<Id: EntityId = NodeId> {
    /// Sparse storage: entity ID -> value.
    values: FxHashMap<Id, Value>,
}

impl<Id: EntityId> PropertyColumn<Id> {
    /// Creates a new empty column.
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: FxHashMap::default(),
        }
    }

    /// Sets a value, returning the previous one.
    pub fn set(&mut self, id: Id, value: Value) -> Option<Value> {
        self.values.insert(id, value)
    }

    /// Gets a value for an entity.
    #[must_use]
    pub fn get(&self, id: Id) -> Option<Value> {
        self.values.get(&id).cloned()
    }

    /// Returns true if the entity has a value in this column.
    #[must_use]
    pub fn contains(&self, id: Id) -> bool {
        self.values.contains_key(&id)
    }

    /// Removes a value for an entity.
    pub fn remove(&mut self, id: Id) -> Option<Value> {
        self.values.remove(&id)
    }

    /// Returns the number of values in this column.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if this column is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<Id: EntityId> Default for PropertyColumn<Id> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_returns_previous() {
        let storage = PropertyStorage::new();
        let node = NodeId::new(1);

        assert!(storage.set(node, "name".into(), "Alice".into()).is_none());
        let previous = storage.set(node, "name".into(), "Bob".into());
        assert_eq!(previous.as_ref().and_then(Value::as_str), Some("Alice"));
        assert_eq!(
            storage.get(node, "name").as_ref().and_then(Value::as_str),
            Some("Bob")
        );
    }

    #[test]
    fn test_remove_and_keys_of() {
        let storage = PropertyStorage::new();
        let node = NodeId::new(1);
        let other = NodeId::new(2);

        storage.set(node, "name".into(), "Alice".into());
        storage.set(node, "age".into(), 30i64.into());
        storage.set(other, "name".into(), "Bob".into());

        let mut keys: Vec<_> = storage.keys_of(node).into_iter().map(|k| k.to_string()).collect();
        keys.sort();
        assert_eq!(keys, vec!["age", "name"]);

        assert_eq!(storage.remove(node, "age").and_then(|v| v.as_int64()), Some(30));
        assert!(storage.remove(node, "age").is_none());
        assert_eq!(storage.keys_of(node).len(), 1);
        assert_eq!(storage.column_count(), 2);
    }

    #[test]
    fn test_remove_all_leaves_other_entities() {
        let storage = PropertyStorage::new();
        let node = NodeId::new(1);
        let other = NodeId::new(2);

        storage.set(node, "name".into(), "Alice".into());
        storage.set(other, "name".into(), "Bob".into());
        storage.remove_all(node);

        assert!(storage.get_all(node).is_empty());
        assert_eq!(storage.get_all(other).len(), 1);
    }

    #[test]
    fn test_property_column() {
        let mut col = PropertyColumn::new();

        col.set(EdgeId::new(1), "x".into());
        col.set(EdgeId::new(2), "y".into());
        assert_eq!(col.len(), 2);
        assert!(col.contains(EdgeId::new(1)));

        col.remove(EdgeId::new(1));
        assert!(!col.contains(EdgeId::new(1)));
        assert!(!col.is_empty());
    }
}
