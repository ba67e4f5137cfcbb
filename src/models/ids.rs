//! Strongly-typed ID wrappers for all entity types
//!
//! Persisted entities are identified by integers assigned by the storage
//! layer. Newtype wrappers keep account, bucket, event and tag IDs from being
//! mixed up at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;
use uuid::Uuid;

/// Macro to generate integer ID newtype wrappers
macro_rules! define_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw integer ID
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Get the underlying integer
            pub const fn get(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                let s = s.strip_prefix($display_prefix).unwrap_or(s);
                Ok(Self(s.parse()?))
            }
        }
    };
}

define_id!(AccountId, "acct-");
define_id!(EventId, "evt-");
define_id!(TagId, "tag-");

/// Placeholder for a bucket the user asked to create but that the storage
/// layer has not materialized yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PendingBucketId(Uuid);

impl PendingBucketId {
    /// Create a new random placeholder
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PendingBucketId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PendingBucketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pending-{}", &self.0.to_string()[..8])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_prefix() {
        assert_eq!(AccountId::new(3).to_string(), "acct-3");
        assert_eq!(EventId::new(12).to_string(), "evt-12");
        assert_eq!(TagId::new(7).to_string(), "tag-7");
    }

    #[test]
    fn test_parse_with_and_without_prefix() {
        assert_eq!("acct-3".parse::<AccountId>().unwrap(), AccountId::new(3));
        assert_eq!(" 42 ".parse::<AccountId>().unwrap(), AccountId::new(42));
        assert!("checking".parse::<AccountId>().is_err());
    }

    #[test]
    fn test_serializes_as_bare_integer() {
        let json = serde_json::to_string(&TagId::new(9)).unwrap();
        assert_eq!(json, "9");
        let back: TagId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TagId::new(9));
    }

    #[test]
    fn test_pending_ids_are_unique() {
        let a = PendingBucketId::new();
        let b = PendingBucketId::new();
        assert_ne!(a, b);
        assert!(a.to_string().starts_with("pending-"));
    }
}
