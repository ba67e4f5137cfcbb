//! Tag and tagged item models

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::TagId;
use super::money::Money;

/// A tag; names are unique within a catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

impl Tag {
    pub fn new(id: TagId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// How much of an event a tagged item covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Coverage {
    Whole,
    Partial,
}

impl fmt::Display for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Whole => write!(f, "whole"),
            Self::Partial => write!(f, "partial"),
        }
    }
}

/// Tag referenced by a tagged item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagRef {
    Existing(TagId),
    /// A tag that does not exist in the catalog yet
    New,
}

/// A tagged item as submitted by the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftTaggedItem {
    pub name: String,
    /// Left blank for whole tags, which always cover the event total
    pub amount: Option<Money>,
    pub coverage: Coverage,
}

impl DraftTaggedItem {
    pub fn whole(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount: None,
            coverage: Coverage::Whole,
        }
    }

    pub fn partial(name: impl Into<String>, amount: Money) -> Self {
        Self {
            name: name.into(),
            amount: Some(amount),
            coverage: Coverage::Partial,
        }
    }
}

/// Association between an event and a tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedItem {
    pub tag: TagRef,
    pub name: String,
    pub amount: Money,
    pub coverage: Coverage,
}

impl TaggedItem {
    pub fn is_whole(&self) -> bool {
        self.coverage == Coverage::Whole
    }
}
