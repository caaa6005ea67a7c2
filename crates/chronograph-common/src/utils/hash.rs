//! Fast, non-cryptographic hash containers.
//!
//! Graph ids are small dense integers, so SipHash's DoS resistance buys
//! nothing here. These aliases use `ahash` on top of `hashbrown`.

/// Hash map keyed with `ahash`.
pub type FxHashMap<K, V> = hashbrown::HashMap<K, V, ahash::RandomState>;

/// Hash set keyed with `ahash`.
pub type FxHashSet<K> = hashbrown::HashSet<K, ahash::RandomState>;
