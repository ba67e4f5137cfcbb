//! Allocation errors
//!
//! Everything the engine can reject about a draft. Errors are collected and
//! handed back to the caller as a list so the form can show all of them at
//! once; none of them is worth retrying.

use std::fmt;

use thiserror::Error;

use crate::models::{AccountId, BucketId, InvalidSection, Money, Section};

/// A single reason a draft could not be allocated
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    /// A section token outside the known set. This is a caller defect.
    #[error("unsupported form section: {0:?}")]
    InvalidSection(String),

    #[error("{section}: amounts add up to {actual} but the event total is {expected}")]
    AmountMismatch {
        section: Section,
        expected: Money,
        actual: Money,
    },

    #[error("{section}: amounts are too large to add up")]
    AmountOverflow { section: Section },

    #[error("{section}: a bucket still has to be chosen or created")]
    UnresolvedBucket { section: Section },

    #[error("{section}: bucket {bucket} does not belong to account {account_id}")]
    AccountBucketMismatch {
        section: Section,
        account_id: AccountId,
        bucket: BucketId,
    },

    #[error("{section}: no such account{}", .account_id.map(|id| format!(" {}", id)).unwrap_or_default())]
    UnknownAccount {
        section: Section,
        account_id: Option<AccountId>,
    },

    #[error("{section}: account {account_id} cannot be used here")]
    IneligibleAccount {
        section: Section,
        account_id: AccountId,
    },

    #[error("{section}: a split row cannot itself be split")]
    NestedSplit { section: Section },

    #[error("{section}: this section is required")]
    MissingSection { section: Section },

    #[error("{section}: amounts cannot be negative")]
    NegativeAmount { section: Section },

    #[error("the event amount must be greater than zero, got {amount}")]
    NonPositiveTotal { amount: Money },

    #[error("tag '{tag}': whole-event and partial tags cannot be mixed")]
    TagCoverageConflict { tag: String },

    #[error("tag '{tag}': tagged amounts reach {allocated}, more than the event total {total}")]
    TagOverallocation {
        tag: String,
        total: Money,
        allocated: Money,
    },

    #[error("tag '{tag}': a whole-event tag must cover {expected}, not {actual}")]
    TagAmountMismatch {
        tag: String,
        expected: Money,
        actual: Money,
    },
}

impl AllocationError {
    /// Whether the error points at a bug in the caller rather than bad input
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::InvalidSection(_))
    }

    /// The form section the error belongs to
    pub fn section(&self) -> Option<Section> {
        match self {
            Self::AmountMismatch { section, .. }
            | Self::AmountOverflow { section }
            | Self::UnresolvedBucket { section }
            | Self::AccountBucketMismatch { section, .. }
            | Self::UnknownAccount { section, .. }
            | Self::IneligibleAccount { section, .. }
            | Self::NestedSplit { section }
            | Self::MissingSection { section }
            | Self::NegativeAmount { section } => Some(*section),
            Self::TagCoverageConflict { .. }
            | Self::TagOverallocation { .. }
            | Self::TagAmountMismatch { .. } => Some(Section::Tags),
            Self::InvalidSection(_) | Self::NonPositiveTotal { .. } => None,
        }
    }
}

impl From<InvalidSection> for AllocationError {
    fn from(err: InvalidSection) -> Self {
        Self::InvalidSection(err.0)
    }
}

/// Every error found while allocating one draft
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocationErrors(Vec<AllocationError>);

impl AllocationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, err: AllocationError) {
        self.0.push(err);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AllocationError> {
        self.0.iter()
    }

    pub fn contains_contract_violation(&self) -> bool {
        self.0.iter().any(AllocationError::is_contract_violation)
    }

    /// `Ok(value)` when nothing was collected
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for AllocationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for AllocationErrors {}

impl From<AllocationError> for AllocationErrors {
    fn from(err: AllocationError) -> Self {
        Self(vec![err])
    }
}

impl Extend<AllocationError> for AllocationErrors {
    fn extend<I: IntoIterator<Item = AllocationError>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for AllocationErrors {
    type Item = AllocationError;
    type IntoIter = std::vec::IntoIter<AllocationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = AllocationError::AmountMismatch {
            section: Section::Deposit,
            expected: Money::from_cents(500),
            actual: Money::from_cents(450),
        };
        assert_eq!(
            err.to_string(),
            "deposit: amounts add up to $4.50 but the event total is $5.00"
        );

        let err = AllocationError::UnknownAccount {
            section: Section::PaymentSource,
            account_id: None,
        };
        assert_eq!(err.to_string(), "payment_source: no such account");

        let err = AllocationError::UnknownAccount {
            section: Section::PaymentSource,
            account_id: Some(AccountId::new(4)),
        };
        assert_eq!(err.to_string(), "payment_source: no such account acct-4");
    }

    #[test]
    fn test_only_invalid_section_is_a_contract_violation() {
        let invalid: AllocationError = InvalidSection("bogus".into()).into();
        assert!(invalid.is_contract_violation());
        assert_eq!(invalid.section(), None);

        let user_error = AllocationError::UnresolvedBucket {
            section: Section::TransferTo,
        };
        assert!(!user_error.is_contract_violation());
        assert_eq!(user_error.section(), Some(Section::TransferTo));
    }

    #[test]
    fn test_collection() {
        let mut errors = AllocationErrors::new();
        assert_eq!(errors.clone().into_result(1), Ok(1));

        errors.push(AllocationError::MissingSection {
            section: Section::Deposit,
        });
        errors.push(AllocationError::InvalidSection("x".into()));
        assert_eq!(errors.len(), 2);
        assert!(errors.contains_contract_violation());
        assert_eq!(
            errors.to_string(),
            "deposit: this section is required; unsupported form section: \"x\""
        );
        assert!(errors.into_result(()).is_err());
    }
}
