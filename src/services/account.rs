//! Account service
//!
//! Account and bucket management on top of the storage layer: creation with
//! validation and auditing, lookup, and display-ordered bucket lists.

use crate::audit::EntityType;
use crate::error::{BucketwiseError, BucketwiseResult};
use crate::models::{Account, AccountRole, Bucket};
use crate::storage::Storage;

use super::bucket_order::BucketOrderer;

/// Service for account management
pub struct AccountService<'a> {
    storage: &'a Storage,
}

impl<'a> AccountService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a new account
    pub fn create(&self, name: &str, role: AccountRole) -> BucketwiseResult<Account> {
        let account = self
            .storage
            .catalog
            .update(|data| data.add_account(name, role))?;

        self.storage.log_create(
            EntityType::Account,
            account.id.to_string(),
            Some(account.name.clone()),
            &account,
        )?;

        Ok(account)
    }

    /// Find an account by ID or name
    pub fn find(&self, identifier: &str) -> BucketwiseResult<Option<Account>> {
        let catalog = self.storage.snapshot()?;
        Ok(catalog.find_account(identifier).cloned())
    }

    /// Find an account by ID or name, failing when it does not exist
    pub fn get(&self, identifier: &str) -> BucketwiseResult<Account> {
        self.find(identifier)?
            .ok_or_else(|| BucketwiseError::account_not_found(identifier))
    }

    /// All accounts, in catalog order
    pub fn list(&self) -> BucketwiseResult<Vec<Account>> {
        self.storage.catalog.accounts()
    }

    /// Create a bucket in an account
    pub fn create_bucket(&self, account: &str, name: &str) -> BucketwiseResult<Bucket> {
        let account = self.get(account)?;

        let bucket = self
            .storage
            .catalog
            .update(|data| data.add_bucket(account.id, name, ""))?;

        self.storage.log_create(
            EntityType::Bucket,
            bucket.id.to_string(),
            Some(bucket.name.clone()),
            &bucket,
        )?;

        Ok(bucket)
    }

    /// The account's buckets, default buckets included, in display order
    pub fn buckets(&self, account: &str) -> BucketwiseResult<(Account, Vec<Bucket>)> {
        let catalog = self.storage.snapshot()?;
        let account = catalog
            .find_account(account)
            .cloned()
            .ok_or_else(|| BucketwiseError::account_not_found(account))?;

        let buckets = BucketOrderer::order(catalog.buckets_with_defaults(account.id));
        Ok((account, buckets))
    }
}
