//! Reserved property keys, labels and edge types.
//!
//! Application data must not use these names.

/// First version for which an entity is authoritative (`Int64`).
pub const VALID_FROM: &str = "__valid_from__";

/// Last version for which an entity is authoritative (`Int64`).
pub const VALID_TO: &str = "__valid_to__";

/// Deletion marker: the version at which deletion was requested (`Int64`).
pub const DELETED: &str = "__deleted__";

/// Last allocated version, on the metadata node (`Int64`).
pub const LATEST_VERSION: &str = "__LATEST_VERSION__";

/// Written to the metadata node before the counter is read, so the write
/// lock is held before the read.
pub const VERSION_LOCK: &str = "__DUMMY_LOCK__";

/// Edge type of the pointer from a chain link to its predecessor.
pub const PREV_VERSION: &str = "__PREV_VERSION__";

/// Label of the metadata node.
pub const METADATA_LABEL: &str = "__VersionMetadata__";

/// Stored value of an unset range bound.
pub const UNSET: i64 = -1;

/// Returns true for the keys versioning maintains on every entity.
///
/// These are hidden from property enumeration and never trigger history
/// rotation.
#[must_use]
pub fn is_reserved(key: &str) -> bool {
    matches!(key, VALID_FROM | VALID_TO | DELETED)
}
