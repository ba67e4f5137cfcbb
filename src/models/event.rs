//! Event model
//!
//! An event is one recorded financial activity. Its role is fixed when it is
//! created and decides which form sections apply to it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::EventId;
use super::line_item::{DraftSection, LineItem};
use super::money::Money;
use super::section::Section;
use super::tag::{DraftTaggedItem, TaggedItem};

/// What kind of activity an event records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventRole {
    Expense,
    Deposit,
    Transfer,
    Reallocation,
}

impl EventRole {
    pub const ALL: [EventRole; 4] = [
        Self::Expense,
        Self::Deposit,
        Self::Transfer,
        Self::Reallocation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Deposit => "deposit",
            Self::Transfer => "transfer",
            Self::Reallocation => "reallocation",
        }
    }

    /// The section whose line items define the event's signed total
    pub fn primary_section(&self) -> Section {
        match self {
            Self::Expense => Section::PaymentSource,
            Self::Deposit => Section::Deposit,
            Self::Transfer => Section::TransferFrom,
            Self::Reallocation => Section::ReallocateFrom,
        }
    }
}

impl fmt::Display for EventRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventRole {
    type Err = UnknownEventRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|role| role.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| UnknownEventRole(s.to_string()))
    }
}

/// Error for unrecognized event role strings
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown event role: {0}")]
pub struct UnknownEventRole(pub String);

/// An event as submitted by the form, before allocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub id: Option<EventId>,
    pub role: EventRole,
    pub occurred_on: NaiveDate,
    pub memo: Option<String>,
    /// Total magnitude entered by the user
    pub amount: Money,
    pub sections: Vec<DraftSection>,
    pub tagged_items: Vec<DraftTaggedItem>,
}

impl EventDraft {
    pub fn new(role: EventRole, occurred_on: NaiveDate, amount: Money) -> Self {
        Self {
            id: None,
            role,
            occurred_on,
            memo: None,
            amount,
            sections: Vec::new(),
            tagged_items: Vec::new(),
        }
    }

    pub fn with_section(mut self, section: DraftSection) -> Self {
        self.sections.push(section);
        self
    }

    pub fn with_tag(mut self, item: DraftTaggedItem) -> Self {
        self.tagged_items.push(item);
        self
    }

    /// The submitted section, if the form carried one
    pub fn section(&self, section: Section) -> Option<&DraftSection> {
        self.sections.iter().find(|s| s.section == section)
    }

    /// One entry per line item the draft currently holds
    pub fn line_item_sections(&self) -> Vec<Section> {
        self.sections
            .iter()
            .flat_map(|s| std::iter::repeat(s.section).take(s.line_item_count()))
            .collect()
    }
}

/// A resolved event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EventId>,
    pub role: EventRole,
    pub occurred_on: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    pub amount: Money,
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub tagged_items: Vec<TaggedItem>,
}

impl Event {
    pub fn line_items_for(&self, section: Section) -> impl Iterator<Item = &LineItem> {
        self.line_items.iter().filter(move |item| item.section == section)
    }

    /// Signed total, derived from the primary section's line items
    pub fn signed_total(&self) -> Money {
        self.line_items_for(self.role.primary_section())
            .map(LineItem::signed_amount)
            .sum()
    }

    /// Names of the tags covering the whole event, sorted
    pub fn whole_tag_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .tagged_items
            .iter()
            .filter(|t| t.is_whole())
            .map(|t| t.name.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.occurred_on.format("%Y-%m-%d"),
            self.role,
            self.amount
        )
    }
}
