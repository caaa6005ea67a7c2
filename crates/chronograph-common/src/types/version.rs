//! Logical versions: the transaction-time axis.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A logical version number.
///
/// One version is allocated per committed versioned transaction. Version 0
/// is the state before the first commit and is never assigned to data.
///
/// Versions are persisted as `Int64` properties, so the largest usable
/// version is `i64::MAX`, which doubles as the open upper bound of a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Version(u64);

impl Version {
    /// The state before any commit.
    pub const ZERO: Self = Self(0);

    /// The open upper bound (`+inf`).
    pub const MAX: Self = Self(i64::MAX as u64);

    /// Creates a version.
    #[inline]
    #[must_use]
    pub const fn new(v: u64) -> Self {
        Self(v)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Returns the version immediately after this one.
    #[inline]
    #[must_use]
    pub const fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the version immediately before this one, saturating at zero.
    #[inline]
    #[must_use]
    pub const fn prev(&self) -> Self {
        Self(self.0.saturating_sub(1))
    }

    /// Returns true if this is the open upper bound.
    #[inline]
    #[must_use]
    pub const fn is_max(&self) -> bool {
        self.0 == Self::MAX.0
    }

    /// Encodes this version for storage in an `Int64` property.
    #[inline]
    #[must_use]
    pub const fn to_stored(&self) -> i64 {
        self.0 as i64
    }

    /// Decodes a stored version. Negative values are unset sentinels.
    #[inline]
    #[must_use]
    pub const fn from_stored(raw: i64) -> Option<Self> {
        if raw < 0 { None } else { Some(Self(raw as u64)) }
    }
}

impl From<u64> for Version {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_max() {
            f.write_str("∞")
        } else {
            write!(f, "v{}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_round_trip_and_sentinel() {
        assert_eq!(Version::from_stored(Version::new(5).to_stored()), Some(Version::new(5)));
        assert_eq!(Version::from_stored(-1), None);
        assert_eq!(Version::MAX.to_stored(), i64::MAX);
    }

    #[test]
    fn test_prev_saturates() {
        assert_eq!(Version::ZERO.prev(), Version::ZERO);
        assert_eq!(Version::new(3).prev(), Version::new(2));
        assert_eq!(Version::new(3).next(), Version::new(4));
    }

    proptest::proptest! {
        #[test]
        fn stored_encoding_preserves_order(a in 0..=i64::MAX, b in 0..=i64::MAX) {
            let (va, vb) = (Version::from_stored(a).unwrap(), Version::from_stored(b).unwrap());
            proptest::prop_assert_eq!(va.cmp(&vb), a.cmp(&b));
            proptest::prop_assert_eq!(va.to_stored(), a);
        }

        #[test]
        fn negative_stored_values_are_unset(raw in i64::MIN..0) {
            proptest::prop_assert_eq!(Version::from_stored(raw), None);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Version::new(2).to_string(), "v2");
        assert_eq!(Version::MAX.to_string(), "∞");
    }
}
