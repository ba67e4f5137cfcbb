//! Catalog snapshot
//!
//! The accounts, buckets and tags of one subscription, as supplied by the
//! storage layer for a single request. Nothing in the engine mutates it.

use serde::{Deserialize, Serialize};

use super::account::Account;
use super::bucket::{Bucket, BucketId, DefaultBucket};
use super::ids::AccountId;
use super::tag::Tag;

/// Read-only view of a subscription's accounts, buckets and tags
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub accounts: Vec<Account>,

    #[serde(default)]
    pub tags: Vec<Tag>,

    /// Default buckets every account offers before they exist
    #[serde(default = "DefaultBucket::standard")]
    pub default_buckets: Vec<DefaultBucket>,
}

impl Catalog {
    pub fn new(accounts: Vec<Account>, tags: Vec<Tag>) -> Self {
        Self {
            accounts,
            tags,
            default_buckets: DefaultBucket::standard(),
        }
    }

    pub fn with_default_buckets(mut self, defaults: Vec<DefaultBucket>) -> Self {
        self.default_buckets = defaults;
        self
    }

    pub fn account(&self, id: AccountId) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    /// Find an account by ID or case-insensitive name
    pub fn find_account(&self, identifier: &str) -> Option<&Account> {
        if let Ok(id) = identifier.parse::<AccountId>() {
            if let Some(account) = self.account(id) {
                return Some(account);
            }
        }
        let lower = identifier.trim().to_lowercase();
        self.accounts.iter().find(|a| a.name.to_lowercase() == lower)
    }

    /// The account's persisted buckets followed by the default buckets it
    /// does not have yet, in catalog order
    pub fn buckets_with_defaults(&self, account_id: AccountId) -> Vec<Bucket> {
        let Some(account) = self.account(account_id) else {
            return Vec::new();
        };

        let mut buckets = account.buckets.clone();
        buckets.extend(
            self.default_buckets
                .iter()
                .filter(|default| account.bucket_with_role(&default.role).is_none())
                .map(Bucket::virtual_default),
        );
        buckets
    }

    /// Look up a bucket the account offers, virtual defaults included
    pub fn bucket(&self, account_id: AccountId, id: &BucketId) -> Option<Bucket> {
        self.buckets_with_defaults(account_id)
            .into_iter()
            .find(|b| &b.id == id)
    }

    /// Whether the account owns (or offers, for virtual buckets) the bucket
    pub fn owns(&self, account_id: AccountId, id: &BucketId) -> bool {
        self.bucket(account_id, id).is_some()
    }

    /// The account owning a persisted bucket
    pub fn owner_of(&self, bucket_id: i64) -> Option<&Account> {
        let id = BucketId::Real(bucket_id);
        self.accounts.iter().find(|a| a.bucket(&id).is_some())
    }

    /// Find a tag by exact name
    pub fn tag_named(&self, name: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::account::AccountRole;
    use crate::models::ids::TagId;

    fn catalog() -> Catalog {
        let checking = Account::new(AccountId::new(1), "Checking", AccountRole::Checking)
            .with_bucket(Bucket::new(10, "Rent"))
            .with_bucket(Bucket::new(11, "Aside").with_role("aside"));
        let visa = Account::new(AccountId::new(2), "Visa", AccountRole::CreditCard)
            .with_bucket(Bucket::new(20, "General").with_role("default"));

        Catalog::new(vec![checking, visa], vec![Tag::new(TagId::new(1), "food")])
    }

    #[test]
    fn test_defaults_only_fill_missing_roles() {
        let catalog = catalog();

        let checking: Vec<BucketId> = catalog
            .buckets_with_defaults(AccountId::new(1))
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(
            checking,
            vec![
                BucketId::Real(10),
                BucketId::Real(11),
                BucketId::Virtual("default".into())
            ]
        );

        let visa: Vec<BucketId> = catalog
            .buckets_with_defaults(AccountId::new(2))
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(
            visa,
            vec![BucketId::Real(20), BucketId::Virtual("aside".into())]
        );
    }

    #[test]
    fn test_ownership() {
        let catalog = catalog();
        assert!(catalog.owns(AccountId::new(1), &BucketId::Real(10)));
        assert!(!catalog.owns(AccountId::new(2), &BucketId::Real(10)));
        assert!(catalog.owns(AccountId::new(2), &BucketId::Virtual("aside".into())));
        assert!(!catalog.owns(AccountId::new(1), &BucketId::Virtual("aside".into())));
        assert!(!catalog.owns(AccountId::new(9), &BucketId::Real(10)));
        assert_eq!(catalog.owner_of(20).map(|a| a.id), Some(AccountId::new(2)));
        assert!(catalog.owner_of(99).is_none());
    }

    #[test]
    fn test_find_account_by_id_or_name() {
        let catalog = catalog();
        assert_eq!(catalog.find_account("2").unwrap().name, "Visa");
        assert_eq!(catalog.find_account("acct-1").unwrap().name, "Checking");
        assert_eq!(catalog.find_account("visa").unwrap().id, AccountId::new(2));
        assert!(catalog.find_account("Savings").is_none());
    }

    #[test]
    fn test_unknown_account_has_no_buckets() {
        assert!(catalog().buckets_with_defaults(AccountId::new(7)).is_empty());
    }
}
