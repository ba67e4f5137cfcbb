//! Catalog repository for JSON storage
//!
//! Manages loading and saving accounts, their buckets and tags to
//! catalog.json, along with the counters new IDs are drawn from.

use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use crate::error::{BucketwiseError, BucketwiseResult};
use crate::models::{
    Account, AccountId, AccountRole, Bucket, BucketId, Catalog, DefaultBucket, Money, Tag, TagId,
};

use super::file_io::{read_json, write_json_atomic};

/// Role token of the bucket money set aside for card repayments lands in
pub const ASIDE_ROLE: &str = "aside";

/// Serializable catalog data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogData {
    #[serde(default)]
    pub accounts: Vec<Account>,

    #[serde(default)]
    pub tags: Vec<Tag>,

    #[serde(default = "first_id")]
    next_account_id: i64,

    #[serde(default = "first_id")]
    next_bucket_id: i64,

    #[serde(default = "first_id")]
    next_tag_id: i64,
}

fn first_id() -> i64 {
    1
}

impl Default for CatalogData {
    fn default() -> Self {
        Self {
            accounts: Vec::new(),
            tags: Vec::new(),
            next_account_id: first_id(),
            next_bucket_id: first_id(),
            next_tag_id: first_id(),
        }
    }
}

impl CatalogData {
    /// Keep the counters ahead of every stored ID, for hand-edited files
    fn repair_counters(&mut self) {
        let max_account = self.accounts.iter().map(|a| a.id.get()).max().unwrap_or(0);
        let max_bucket = self
            .accounts
            .iter()
            .flat_map(|a| &a.buckets)
            .filter_map(|b| match b.id {
                BucketId::Real(id) => Some(id),
                BucketId::Virtual(_) => None,
            })
            .max()
            .unwrap_or(0);
        let max_tag = self.tags.iter().map(|t| t.id.get()).max().unwrap_or(0);

        self.next_account_id = self.next_account_id.max(max_account + 1);
        self.next_bucket_id = self.next_bucket_id.max(max_bucket + 1);
        self.next_tag_id = self.next_tag_id.max(max_tag + 1);
    }

    pub fn account(&self, id: AccountId) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    fn account_mut(&mut self, id: AccountId) -> BucketwiseResult<&mut Account> {
        self.accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| BucketwiseError::account_not_found(id.to_string()))
    }

    /// Add an account; names are unique ignoring case
    pub fn add_account(&mut self, name: &str, role: AccountRole) -> BucketwiseResult<Account> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BucketwiseError::Validation(
                "Account name cannot be empty".into(),
            ));
        }

        let lower = name.to_lowercase();
        if self.accounts.iter().any(|a| a.name.to_lowercase() == lower) {
            return Err(BucketwiseError::Duplicate {
                entity_type: "Account",
                identifier: name.to_string(),
            });
        }

        let account = Account::new(AccountId::new(self.next_account_id), name, role);
        self.next_account_id += 1;
        self.accounts.push(account.clone());
        Ok(account)
    }

    /// Add a bucket to an account; names are unique within the account
    /// ignoring case
    pub fn add_bucket(
        &mut self,
        account_id: AccountId,
        name: &str,
        role: &str,
    ) -> BucketwiseResult<Bucket> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BucketwiseError::Validation(
                "Bucket name cannot be empty".into(),
            ));
        }

        let id = self.next_bucket_id;
        let account = self.account_mut(account_id)?;

        let lower = name.to_lowercase();
        if account.buckets.iter().any(|b| b.name.to_lowercase() == lower) {
            return Err(BucketwiseError::Duplicate {
                entity_type: "Bucket",
                identifier: format!("{} in {}", name, account.name),
            });
        }

        let mut bucket = Bucket::new(id, name).with_role(role);
        if role == ASIDE_ROLE {
            bucket.available_balance = Some(Money::zero());
        }
        account.buckets.push(bucket.clone());
        self.next_bucket_id += 1;
        Ok(bucket)
    }

    /// The persisted bucket with the given role, created from its default
    /// when missing. The flag reports whether it was created.
    pub fn ensure_role_bucket(
        &mut self,
        account_id: AccountId,
        default: &DefaultBucket,
    ) -> BucketwiseResult<(Bucket, bool)> {
        let existing = self
            .account(account_id)
            .ok_or_else(|| BucketwiseError::account_not_found(account_id.to_string()))?
            .bucket_with_role(&default.role)
            .cloned();

        match existing {
            Some(bucket) => Ok((bucket, false)),
            None => Ok((self.add_bucket(account_id, &default.name, &default.role)?, true)),
        }
    }

    /// The tag with the given name, created when missing. The flag reports
    /// whether it was created.
    pub fn ensure_tag(&mut self, name: &str) -> (Tag, bool) {
        if let Some(tag) = self.tags.iter().find(|t| t.name == name) {
            return (tag.clone(), false);
        }

        let tag = Tag::new(TagId::new(self.next_tag_id), name);
        self.next_tag_id += 1;
        self.tags.push(tag.clone());
        (tag, true)
    }

    /// Apply a signed change to a bucket, returning it before and after.
    ///
    /// Money in an aside bucket is never available for spending.
    pub fn adjust_balance(
        &mut self,
        account_id: AccountId,
        bucket_id: i64,
        delta: Money,
    ) -> BucketwiseResult<(Bucket, Bucket)> {
        let account = self.account_mut(account_id)?;
        let bucket = account
            .buckets
            .iter_mut()
            .find(|b| b.id == BucketId::Real(bucket_id))
            .ok_or_else(|| BucketwiseError::bucket_not_found(bucket_id.to_string()))?;

        let overflow = || {
            BucketwiseError::Validation(format!(
                "balance of bucket {} cannot absorb {}",
                bucket_id, delta
            ))
        };
        let balance = bucket.balance.checked_add(delta).ok_or_else(overflow)?;
        let available = match bucket.available_balance {
            Some(available) if bucket.role != ASIDE_ROLE => {
                Some(available.checked_add(delta).ok_or_else(overflow)?)
            }
            unchanged => unchanged,
        };

        let before = bucket.clone();
        bucket.balance = balance;
        bucket.available_balance = available;
        Ok((before, bucket.clone()))
    }
}

/// Repository for catalog persistence
pub struct CatalogRepository {
    path: PathBuf,
    data: RwLock<CatalogData>,
}

impl CatalogRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(CatalogData::default()),
        }
    }

    /// Load the catalog from disk
    pub fn load(&self) -> BucketwiseResult<()> {
        let mut file_data: CatalogData = read_json(&self.path)?;
        file_data.repair_counters();

        let mut data = self.data.write().map_err(|e| {
            BucketwiseError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;
        *data = file_data;

        Ok(())
    }

    /// Immutable view for one request
    pub fn snapshot(&self, defaults: &[DefaultBucket]) -> BucketwiseResult<Catalog> {
        let data = self.data.read().map_err(|e| {
            BucketwiseError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(Catalog::new(data.accounts.clone(), data.tags.clone())
            .with_default_buckets(defaults.to_vec()))
    }

    /// Take the write lock for a change that spans more than the catalog
    pub fn lock(&self) -> BucketwiseResult<CatalogWriter<'_>> {
        let guard = self.data.write().map_err(|e| {
            BucketwiseError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        Ok(CatalogWriter {
            path: &self.path,
            guard,
        })
    }

    /// Change a copy of the catalog under the write lock, then write and
    /// adopt it. Nothing changes when `change` fails.
    pub fn update<T>(
        &self,
        change: impl FnOnce(&mut CatalogData) -> BucketwiseResult<T>,
    ) -> BucketwiseResult<T> {
        let writer = self.lock()?;
        let mut data = writer.working_copy();
        let result = change(&mut data)?;
        writer.save(data)?;
        Ok(result)
    }

    /// All accounts, in catalog order
    pub fn accounts(&self) -> BucketwiseResult<Vec<Account>> {
        let data = self.data.read().map_err(|e| {
            BucketwiseError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.accounts.clone())
    }
}

/// Exclusive access to the catalog until dropped or saved
pub struct CatalogWriter<'a> {
    path: &'a Path,
    guard: RwLockWriteGuard<'a, CatalogData>,
}

impl CatalogWriter<'_> {
    /// A copy to make changes on before they are written
    pub fn working_copy(&self) -> CatalogData {
        self.guard.clone()
    }

    /// Write a changed copy to disk, then adopt it
    pub fn save(mut self, changed: CatalogData) -> BucketwiseResult<()> {
        write_json_atomic(self.path, &changed)?;
        *self.guard = changed;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, CatalogRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = CatalogRepository::new(temp_dir.path().join("catalog.json"));
        (temp_dir, repo)
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        assert!(repo.accounts().unwrap().is_empty());
    }

    #[test]
    fn test_ids_are_sequential() {
        let mut data = CatalogData::default();
        let checking = data.add_account("Checking", AccountRole::Checking).unwrap();
        let visa = data.add_account("Visa", AccountRole::CreditCard).unwrap();
        assert_eq!(checking.id, AccountId::new(1));
        assert_eq!(visa.id, AccountId::new(2));

        let rent = data.add_bucket(checking.id, "Rent", "").unwrap();
        let general = data.add_bucket(visa.id, "General", "default").unwrap();
        assert_eq!(rent.id, BucketId::Real(1));
        assert_eq!(general.id, BucketId::Real(2));
    }

    #[test]
    fn test_duplicate_and_blank_names() {
        let mut data = CatalogData::default();
        let checking = data.add_account("Checking", AccountRole::Checking).unwrap();

        assert!(matches!(
            data.add_account("checking", AccountRole::Savings),
            Err(BucketwiseError::Duplicate { .. })
        ));
        assert!(data.add_account("  ", AccountRole::Savings).unwrap_err().is_validation());

        data.add_bucket(checking.id, "Rent", "").unwrap();
        assert!(matches!(
            data.add_bucket(checking.id, "RENT", ""),
            Err(BucketwiseError::Duplicate { .. })
        ));
        assert!(data
            .add_bucket(AccountId::new(9), "Rent", "")
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_ensure_role_bucket_and_tag() {
        let mut data = CatalogData::default();
        let checking = data.add_account("Checking", AccountRole::Checking).unwrap();
        let aside = DefaultBucket::new("aside", "Aside");

        let (first, created) = data.ensure_role_bucket(checking.id, &aside).unwrap();
        assert!(created);
        assert_eq!(first.available_balance, Some(Money::zero()));
        let (second, created) = data.ensure_role_bucket(checking.id, &aside).unwrap();
        assert!(!created);
        assert_eq!(first.id, second.id);

        let (food, created) = data.ensure_tag("food");
        assert!(created);
        assert_eq!(data.ensure_tag("food"), (food, false));
    }

    #[test]
    fn test_adjust_balance() {
        let mut data = CatalogData::default();
        let checking = data.add_account("Checking", AccountRole::Checking).unwrap();
        data.add_bucket(checking.id, "Rent", "").unwrap();
        let aside = DefaultBucket::new("aside", "Aside");
        let (aside_bucket, _) = data.ensure_role_bucket(checking.id, &aside).unwrap();
        let BucketId::Real(aside_id) = aside_bucket.id else {
            panic!("aside bucket should be persisted");
        };

        let (before, after) = data
            .adjust_balance(checking.id, 1, Money::from_cents(-250))
            .unwrap();
        assert_eq!(before.balance, Money::zero());
        assert_eq!(after.balance, Money::from_cents(-250));

        let (_, aside_after) = data
            .adjust_balance(checking.id, aside_id, Money::from_cents(250))
            .unwrap();
        assert_eq!(aside_after.balance, Money::from_cents(250));
        assert_eq!(aside_after.available(), Money::zero());

        assert!(data
            .adjust_balance(checking.id, 99, Money::from_cents(1))
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_adjust_balance_overflow_leaves_bucket_alone() {
        let mut data = CatalogData::default();
        let checking = data.add_account("Checking", AccountRole::Checking).unwrap();
        data.add_bucket(checking.id, "Rent", "").unwrap();
        data.adjust_balance(checking.id, 1, Money::from_cents(i64::MAX - 10))
            .unwrap();

        let err = data
            .adjust_balance(checking.id, 1, Money::from_cents(11))
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(
            data.accounts[0].buckets[0].balance,
            Money::from_cents(i64::MAX - 10)
        );
    }

    #[test]
    fn test_persist_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let account = repo
            .update(|data| {
                let account = data.add_account("Savings", AccountRole::Savings)?;
                data.add_bucket(account.id, "Rainy day", "")?;
                data.ensure_tag("gift");
                Ok(account)
            })
            .unwrap();

        let reloaded = CatalogRepository::new(temp_dir.path().join("catalog.json"));
        reloaded.load().unwrap();
        let catalog = reloaded.snapshot(&DefaultBucket::standard()).unwrap();

        assert_eq!(catalog.accounts.len(), 1);
        assert_eq!(catalog.accounts[0].buckets[0].name, "Rainy day");
        assert!(catalog.tag_named("gift").is_some());
        // Virtual defaults come from the snapshot, not the file
        assert_eq!(catalog.buckets_with_defaults(account.id).len(), 3);
    }

    #[test]
    fn test_counters_repaired_on_load() {
        let (temp_dir, repo) = create_test_repo();
        std::fs::write(
            temp_dir.path().join("catalog.json"),
            r#"{"accounts": [{"id": 4, "name": "Checking", "buckets": [{"id": 7, "name": "Rent"}]}]}"#,
        )
        .unwrap();
        repo.load().unwrap();

        let mut data = repo.lock().unwrap().working_copy();
        let savings = data.add_account("Savings", AccountRole::Savings).unwrap();
        let bucket = data.add_bucket(savings.id, "Fun", "").unwrap();
        assert_eq!(savings.id, AccountId::new(5));
        assert_eq!(bucket.id, BucketId::Real(8));
    }

    #[test]
    fn test_failed_update_changes_nothing() {
        let (temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        repo.update(|data| data.add_account("Checking", AccountRole::Checking))
            .unwrap();
        let before = std::fs::read_to_string(temp_dir.path().join("catalog.json")).unwrap();

        let err = repo
            .update(|data| {
                data.add_account("Savings", AccountRole::Savings)?;
                data.add_account("checking", AccountRole::Savings)
            })
            .unwrap_err();
        assert!(matches!(err, BucketwiseError::Duplicate { .. }));

        let after = std::fs::read_to_string(temp_dir.path().join("catalog.json")).unwrap();
        assert_eq!(before, after);
        assert_eq!(repo.accounts().unwrap().len(), 1);
    }

    #[test]
    fn test_updates_from_many_threads_are_all_kept() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        let checking = repo
            .update(|data| {
                let checking = data.add_account("Checking", AccountRole::Checking)?;
                data.add_bucket(checking.id, "Rent", "")?;
                Ok(checking)
            })
            .unwrap();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    repo.update(|data| {
                        data.adjust_balance(checking.id, 1, Money::from_cents(100))
                    })
                    .unwrap();
                });
            }
        });

        let accounts = repo.accounts().unwrap();
        assert_eq!(accounts[0].buckets[0].balance, Money::from_cents(800));
    }
}
