//! Line-item allocation
//!
//! Resolves what the user picked for one form section into concrete line
//! items: a single bucket, a split across several buckets, or a bucket that
//! still has to be created. Every resolved section accounts for exactly the
//! event total.

use serde::Serialize;
use tracing::debug;

use super::error::AllocationError;
use crate::models::{
    AccountId, BucketId, BucketRef, BucketSelection, Catalog, DraftSection, Event, LineItem,
    Money, PendingBucketId, Section,
};

/// A bucket the storage layer has to create before the event is saved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketRequest {
    /// Stands in for the bucket's ID until it exists
    pub placeholder: PendingBucketId,
    pub account_id: AccountId,
    pub name: String,
}

/// The line items of one section plus the buckets they need created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAssignment {
    pub section: Section,
    pub line_items: Vec<LineItem>,
    pub bucket_requests: Vec<BucketRequest>,
}

impl ResolvedAssignment {
    fn new(section: Section) -> Self {
        Self {
            section,
            line_items: Vec::new(),
            bucket_requests: Vec::new(),
        }
    }

    /// Sum of the line items, `None` when it overflows
    pub fn total(&self) -> Option<Money> {
        self.line_items
            .iter()
            .try_fold(Money::zero(), |sum, item| sum.checked_add(item.amount))
    }
}

/// Resolves draft sections against a catalog snapshot
pub struct LineItemAllocator<'a> {
    catalog: &'a Catalog,
}

impl<'a> LineItemAllocator<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Resolve a section whose buckets all belong to its own account
    pub fn resolve(
        &self,
        draft: &DraftSection,
        total: Money,
    ) -> Result<ResolvedAssignment, AllocationError> {
        self.resolve_with_counterpart(draft, total, None)
    }

    /// Resolve a section, consulting the other side of a two-sided section.
    ///
    /// Reallocation buckets take their account from the bucket's owner. A
    /// virtual or new bucket has no owner yet and borrows the account of the
    /// counterpart side. A bucket owned by another account than the pair's
    /// is an `AccountBucketMismatch`.
    pub fn resolve_with_counterpart(
        &self,
        draft: &DraftSection,
        total: Money,
        counterpart: Option<&DraftSection>,
    ) -> Result<ResolvedAssignment, AllocationError> {
        let section = draft.section;
        if !section.holds_line_items() {
            return Err(AllocationError::InvalidSection(section.to_string()));
        }
        if !total.is_positive() {
            return Err(AllocationError::NonPositiveTotal { amount: total });
        }

        let context = if section.is_reallocation() {
            self.reallocation_account(draft, counterpart)
        } else {
            Some(self.explicit_account(draft)?)
        };

        let mut assignment = ResolvedAssignment::new(section);

        match &draft.selection {
            None => return Err(AllocationError::UnresolvedBucket { section }),
            Some(BucketSelection::Split) => {
                for row in &draft.items {
                    if row.selection.is_none() && row.amount.unwrap_or_default().is_zero() {
                        continue;
                    }
                    let amount = row.amount.unwrap_or_default();
                    if amount.is_negative() {
                        return Err(AllocationError::NegativeAmount { section });
                    }
                    let (account_id, bucket) = match &row.selection {
                        None | Some(BucketSelection::CreateNew) => {
                            return Err(AllocationError::UnresolvedBucket { section })
                        }
                        Some(BucketSelection::Split) => {
                            return Err(AllocationError::NestedSplit { section })
                        }
                        Some(selection) => self.existing_bucket(section, selection, context)?,
                    };
                    assignment.line_items.push(LineItem {
                        section,
                        account_id,
                        bucket,
                        amount,
                    });
                }

                let actual = assignment
                    .total()
                    .ok_or(AllocationError::AmountOverflow { section })?;
                if actual != total {
                    return Err(AllocationError::AmountMismatch {
                        section,
                        expected: total,
                        actual,
                    });
                }
                debug!(%section, rows = assignment.line_items.len(), "resolved split");
            }
            Some(selection) => {
                let amount = draft.amount.unwrap_or(total);
                if amount.is_negative() {
                    return Err(AllocationError::NegativeAmount { section });
                }
                if amount != total {
                    return Err(AllocationError::AmountMismatch {
                        section,
                        expected: total,
                        actual: amount,
                    });
                }

                let (account_id, bucket) = if *selection == BucketSelection::CreateNew {
                    let request = self.bucket_request(draft, context)?;
                    let target = (request.account_id, BucketRef::Pending(request.placeholder));
                    debug!(%section, name = %request.name, "requesting new bucket");
                    assignment.bucket_requests.push(request);
                    target
                } else {
                    self.existing_bucket(section, selection, context)?
                };

                assignment.line_items.push(LineItem {
                    section,
                    account_id,
                    bucket,
                    amount,
                });
            }
        }

        Ok(assignment)
    }

    /// The account a user-chosen section draws on
    fn explicit_account(&self, draft: &DraftSection) -> Result<AccountId, AllocationError> {
        let section = draft.section;
        let account = draft
            .account_id
            .and_then(|id| self.catalog.account(id))
            .ok_or(AllocationError::UnknownAccount {
                section,
                account_id: draft.account_id,
            })?;

        if section == Section::CreditOptions && !account.is_checking() {
            return Err(AllocationError::IneligibleAccount {
                section,
                account_id: account.id,
            });
        }
        Ok(account.id)
    }

    /// The account shared by a reallocation pair: the owner of the first
    /// persisted bucket, from side before to side, else an account the form
    /// named. Both sides see the same answer.
    fn reallocation_account(
        &self,
        draft: &DraftSection,
        counterpart: Option<&DraftSection>,
    ) -> Option<AccountId> {
        let (from, to) = if draft.section == Section::ReallocateFrom {
            (Some(draft), counterpart)
        } else {
            (counterpart, Some(draft))
        };
        let sides = from.into_iter().chain(to);
        let owner = sides.clone().flat_map(selections).find_map(|selection| match selection {
            BucketSelection::Real(id) => self.catalog.owner_of(*id).map(|a| a.id),
            _ => None,
        });

        owner.or_else(|| {
            sides
                .filter_map(|side| side.account_id)
                .find(|id| self.catalog.account(*id).is_some())
        })
    }

    /// Check a real or virtual selection against its account
    fn existing_bucket(
        &self,
        section: Section,
        selection: &BucketSelection,
        context: Option<AccountId>,
    ) -> Result<(AccountId, BucketRef), AllocationError> {
        let bucket_id = selection
            .bucket_id()
            .ok_or(AllocationError::UnresolvedBucket { section })?;

        // Both sides of a reallocation stay in the account of the pair
        let account_id = match (&bucket_id, section.is_reallocation()) {
            (BucketId::Real(id), true) => {
                let owner = self
                    .catalog
                    .owner_of(*id)
                    .map(|a| a.id)
                    .ok_or(AllocationError::UnresolvedBucket { section })?;
                context.unwrap_or(owner)
            }
            _ => context.ok_or(AllocationError::UnknownAccount {
                section,
                account_id: None,
            })?,
        };

        if !self.catalog.owns(account_id, &bucket_id) {
            return Err(AllocationError::AccountBucketMismatch {
                section,
                account_id,
                bucket: bucket_id,
            });
        }
        Ok((account_id, bucket_id.into()))
    }

    fn bucket_request(
        &self,
        draft: &DraftSection,
        context: Option<AccountId>,
    ) -> Result<BucketRequest, AllocationError> {
        let section = draft.section;
        let name = draft
            .new_bucket_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or(AllocationError::UnresolvedBucket { section })?;
        let account_id = context.ok_or(AllocationError::UnknownAccount {
            section,
            account_id: None,
        })?;

        Ok(BucketRequest {
            placeholder: PendingBucketId::new(),
            account_id,
            name: name.to_string(),
        })
    }
}

/// Every bucket selection a draft section carries, split rows included
fn selections(draft: &DraftSection) -> impl Iterator<Item = &BucketSelection> + Clone {
    draft
        .selection
        .iter()
        .chain(draft.items.iter().filter_map(|row| row.selection.as_ref()))
}

/// A fully allocated event waiting for storage to create its buckets
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreparedEvent {
    pub event: Event,
    pub bucket_requests: Vec<BucketRequest>,
}

impl PreparedEvent {
    /// Buckets still to be created
    pub fn has_pending(&self) -> bool {
        self.event.line_items.iter().any(|item| item.bucket.is_pending())
    }

    /// Swap a created bucket's ID in for its placeholder.
    ///
    /// Returns false when no line item used the placeholder.
    pub fn materialize(&mut self, placeholder: PendingBucketId, bucket_id: i64) -> bool {
        let pending = BucketRef::Pending(placeholder);
        let mut replaced = false;
        for item in &mut self.event.line_items {
            if item.bucket == pending {
                item.bucket = BucketRef::Real(bucket_id);
                replaced = true;
            }
        }
        self.bucket_requests.retain(|r| r.placeholder != placeholder);
        replaced
    }

    /// Distinct (account, role) pairs of the virtual buckets the event uses
    pub fn virtual_buckets(&self) -> Vec<(AccountId, String)> {
        let mut found: Vec<(AccountId, String)> = Vec::new();
        for item in &self.event.line_items {
            if let BucketRef::Virtual(role) = &item.bucket {
                let key = (item.account_id, role.clone());
                if !found.contains(&key) {
                    found.push(key);
                }
            }
        }
        found
    }

    /// Point every line item using a virtual bucket at its materialized bucket
    pub fn materialize_virtual(&mut self, account_id: AccountId, role: &str, bucket_id: i64) {
        for item in &mut self.event.line_items {
            if item.account_id == account_id
                && matches!(&item.bucket, BucketRef::Virtual(r) if r == role)
            {
                item.bucket = BucketRef::Real(bucket_id);
            }
        }
    }

    /// The resolved event; fails while any requested bucket is missing
    pub fn finalize(self) -> Result<Event, AllocationError> {
        if let Some(item) = self.event.line_items.iter().find(|i| i.bucket.is_pending()) {
            return Err(AllocationError::UnresolvedBucket {
                section: item.section,
            });
        }
        Ok(self.event)
    }
}
