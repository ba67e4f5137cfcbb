//! Bucket model
//!
//! A bucket is an earmarked sub-balance inside an account. Buckets are either
//! real (persisted, integer identified) or virtual: a well-known default bucket
//! such as "aside" that every account offers but that only gets created the
//! first time money is assigned to it.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Money;

/// Identifier of a bucket
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BucketId {
    /// A persisted bucket
    Real(i64),
    /// A default bucket not yet materialized, named by its role token
    Virtual(String),
}

impl BucketId {
    pub fn is_real(&self) -> bool {
        matches!(self, Self::Real(_))
    }

    pub fn is_virtual(&self) -> bool {
        matches!(self, Self::Virtual(_))
    }
}

impl fmt::Display for BucketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Real(id) => write!(f, "{}", id),
            Self::Virtual(role) => write!(f, "{}", role),
        }
    }
}

/// A well-known bucket every account offers before it exists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultBucket {
    /// Role token, also used as the virtual bucket identifier
    pub role: String,
    /// Display name
    pub name: String,
}

impl DefaultBucket {
    pub fn new(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            name: name.into(),
        }
    }

    /// The buckets offered when nothing else is configured
    pub fn standard() -> Vec<Self> {
        vec![Self::new("aside", "Aside"), Self::new("default", "General")]
    }
}

/// A bucket within an account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub id: BucketId,

    pub name: String,

    /// Role token ("aside", "default", or empty for user buckets)
    #[serde(default)]
    pub role: String,

    #[serde(default)]
    pub balance: Money,

    /// Balance available for spending, when it differs from the raw balance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_balance: Option<Money>,
}

impl Bucket {
    /// Create a persisted bucket
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id: BucketId::Real(id),
            name: name.into(),
            role: String::new(),
            balance: Money::zero(),
            available_balance: None,
        }
    }

    /// Create the not-yet-materialized stand-in for a default bucket
    pub fn virtual_default(default: &DefaultBucket) -> Self {
        Self {
            id: BucketId::Virtual(default.role.clone()),
            name: default.name.clone(),
            role: default.role.clone(),
            balance: Money::zero(),
            available_balance: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    pub fn with_balance(mut self, balance: Money) -> Self {
        self.balance = balance;
        self
    }

    pub fn is_real(&self) -> bool {
        self.id.is_real()
    }

    pub fn is_virtual(&self) -> bool {
        self.id.is_virtual()
    }

    /// Available balance, falling back to the raw balance
    pub fn available(&self) -> Money {
        self.available_balance.unwrap_or(self.balance)
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
