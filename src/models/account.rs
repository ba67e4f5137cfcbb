//! Account model
//!
//! An account is a real-world money container (checking account, credit
//! card, ...) that owns the buckets its balance is divided into.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::bucket::{Bucket, BucketId};
use super::ids::AccountId;
use super::money::Money;

/// Role of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccountRole {
    #[default]
    Checking,
    CreditCard,
    Savings,
    Other,
}

impl AccountRole {
    /// Parse an account role from user input
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "checking" => Some(Self::Checking),
            "credit_card" | "credit-card" | "credit" => Some(Self::CreditCard),
            "savings" => Some(Self::Savings),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Checking => write!(f, "Checking"),
            Self::CreditCard => write!(f, "Credit Card"),
            Self::Savings => write!(f, "Savings"),
            Self::Other => write!(f, "Other"),
        }
    }
}

/// A financial account and the buckets it owns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,

    pub name: String,

    #[serde(default)]
    pub role: AccountRole,

    /// Persisted buckets, in catalog order
    #[serde(default)]
    pub buckets: Vec<Bucket>,
}

impl Account {
    pub fn new(id: AccountId, name: impl Into<String>, role: AccountRole) -> Self {
        Self {
            id,
            name: name.into(),
            role,
            buckets: Vec::new(),
        }
    }

    pub fn with_bucket(mut self, bucket: Bucket) -> Self {
        self.buckets.push(bucket);
        self
    }

    pub fn is_checking(&self) -> bool {
        self.role == AccountRole::Checking
    }

    pub fn is_credit_card(&self) -> bool {
        self.role == AccountRole::CreditCard
    }

    /// Find a persisted bucket
    pub fn bucket(&self, id: &BucketId) -> Option<&Bucket> {
        self.buckets.iter().find(|b| &b.id == id)
    }

    /// Find a persisted bucket by role token
    pub fn bucket_with_role(&self, role: &str) -> Option<&Bucket> {
        self.buckets.iter().find(|b| b.role == role)
    }

    /// Sum of all bucket balances
    pub fn balance(&self) -> Money {
        self.buckets.iter().map(|b| b.balance).sum()
    }

    /// Sum of all available bucket balances
    pub fn available_balance(&self) -> Money {
        self.buckets.iter().map(|b| b.available()).sum()
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!(AccountRole::parse("checking"), Some(AccountRole::Checking));
        assert_eq!(AccountRole::parse("Credit-Card"), Some(AccountRole::CreditCard));
        assert_eq!(AccountRole::parse("brokerage"), None);
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&AccountRole::CreditCard).unwrap();
        assert_eq!(json, "\"credit_card\"");
    }

    #[test]
    fn test_balances_sum_buckets() {
        let mut aside = Bucket::new(2, "Aside")
            .with_role("aside")
            .with_balance(Money::from_cents(2000));
        aside.available_balance = Some(Money::zero());

        let account = Account::new(AccountId::new(1), "Checking", AccountRole::Checking)
            .with_bucket(Bucket::new(1, "Rent").with_balance(Money::from_cents(10000)))
            .with_bucket(aside);

        assert_eq!(account.balance(), Money::from_cents(12000));
        assert_eq!(account.available_balance(), Money::from_cents(10000));
        assert!(account.bucket_with_role("aside").is_some());
        assert!(account.bucket(&BucketId::Real(3)).is_none());
    }
}
