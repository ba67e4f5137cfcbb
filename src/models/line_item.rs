//! Line items and the draft input they are resolved from
//!
//! A line item assigns part of an event's amount to one account/bucket pair.
//! Drafts come from the event form and may still carry a split or
//! create-bucket choice; resolved line items never do.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::bucket::BucketId;
use super::ids::{AccountId, PendingBucketId};
use super::money::Money;
use super::section::Section;

/// Form token selecting the split option
pub const SPLIT_TOKEN: &str = "+";

/// Form token selecting the create-bucket option
pub const NEW_BUCKET_TOKEN: &str = "++";

/// What the user picked in a bucket selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BucketSelection {
    /// An existing persisted bucket
    Real(i64),
    /// A default bucket that may not exist yet
    Virtual(String),
    /// Divide the section across several buckets
    Split,
    /// Create a new bucket for this section
    CreateNew,
}

impl BucketSelection {
    /// Decode a bucket selector value. Empty values mean "nothing selected".
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        match token {
            "" => None,
            SPLIT_TOKEN => Some(Self::Split),
            NEW_BUCKET_TOKEN => Some(Self::CreateNew),
            _ => Some(match token.parse::<i64>() {
                Ok(id) => Self::Real(id),
                Err(_) => Self::Virtual(token.to_string()),
            }),
        }
    }

    /// The bucket this selection names, if it names one
    pub fn bucket_id(&self) -> Option<BucketId> {
        match self {
            Self::Real(id) => Some(BucketId::Real(*id)),
            Self::Virtual(role) => Some(BucketId::Virtual(role.clone())),
            Self::Split | Self::CreateNew => None,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self, Self::Split | Self::CreateNew)
    }
}

impl fmt::Display for BucketSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Real(id) => write!(f, "{}", id),
            Self::Virtual(role) => write!(f, "{}", role),
            Self::Split => f.write_str(SPLIT_TOKEN),
            Self::CreateNew => f.write_str(NEW_BUCKET_TOKEN),
        }
    }
}

/// One row of a split section
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DraftLineItem {
    pub selection: Option<BucketSelection>,
    pub amount: Option<Money>,
}

impl DraftLineItem {
    pub fn new(selection: BucketSelection, amount: Money) -> Self {
        Self {
            selection: Some(selection),
            amount: Some(amount),
        }
    }
}

/// A section of the event form as submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftSection {
    pub section: Section,
    pub account_id: Option<AccountId>,
    pub selection: Option<BucketSelection>,
    /// Explicit amount for a single-bucket section
    pub amount: Option<Money>,
    /// Name for a bucket requested with the create-bucket option
    pub new_bucket_name: Option<String>,
    /// Rows of a split section
    pub items: Vec<DraftLineItem>,
}

impl DraftSection {
    pub fn new(section: Section) -> Self {
        Self {
            section,
            account_id: None,
            selection: None,
            amount: None,
            new_bucket_name: None,
            items: Vec::new(),
        }
    }

    pub fn account(mut self, account_id: AccountId) -> Self {
        self.account_id = Some(account_id);
        self
    }

    pub fn bucket(mut self, selection: BucketSelection) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn amount(mut self, amount: Money) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn new_bucket(mut self, name: impl Into<String>) -> Self {
        self.selection = Some(BucketSelection::CreateNew);
        self.new_bucket_name = Some(name.into());
        self
    }

    /// Switch to a split and append one row
    pub fn split_row(mut self, selection: BucketSelection, amount: Money) -> Self {
        self.selection = Some(BucketSelection::Split);
        self.items.push(DraftLineItem::new(selection, amount));
        self
    }

    pub fn is_split(&self) -> bool {
        self.selection == Some(BucketSelection::Split)
    }

    /// Number of line items this section currently holds
    pub fn line_item_count(&self) -> usize {
        match &self.selection {
            Some(BucketSelection::Split) => self.items.len(),
            Some(_) => 1,
            None => usize::from(self.account_id.is_some()),
        }
    }
}

/// Bucket reference held by a resolved line item
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketRef {
    Real(i64),
    Virtual(String),
    /// A requested bucket the storage layer has yet to create
    Pending(PendingBucketId),
}

impl BucketRef {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// The catalog identifier, for references that have one
    pub fn bucket_id(&self) -> Option<BucketId> {
        match self {
            Self::Real(id) => Some(BucketId::Real(*id)),
            Self::Virtual(role) => Some(BucketId::Virtual(role.clone())),
            Self::Pending(_) => None,
        }
    }
}

impl From<BucketId> for BucketRef {
    fn from(id: BucketId) -> Self {
        match id {
            BucketId::Real(id) => Self::Real(id),
            BucketId::Virtual(role) => Self::Virtual(role),
        }
    }
}

impl fmt::Display for BucketRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Real(id) => write!(f, "{}", id),
            Self::Virtual(role) => write!(f, "{}", role),
            Self::Pending(placeholder) => write!(f, "{}", placeholder),
        }
    }
}

/// A portion of an event assigned to one account/bucket pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub section: Section,
    pub account_id: AccountId,
    pub bucket: BucketRef,
    /// Non-negative magnitude; the direction comes from the section
    pub amount: Money,
}

impl LineItem {
    /// Amount with the section's direction applied
    pub fn signed_amount(&self) -> Money {
        match self.section.polarity() {
            Some(polarity) => Money::from_cents(self.amount.cents() * polarity.sign()),
            None => self.amount,
        }
    }
}
