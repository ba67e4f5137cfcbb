//! Event form sections
//!
//! A section is one logical slot of the transaction form: one side of an
//! event (where money came from, where it went) or one of the auxiliary
//! blocks (general information, tags). The set is closed; every other token
//! is rejected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A recognized section of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Section {
    GeneralInformation,
    PaymentSource,
    CreditOptions,
    Deposit,
    TransferFrom,
    TransferTo,
    ReallocateFrom,
    ReallocateTo,
    Tags,
}

/// Direction of the money a section's line items move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Money leaves the bucket
    Debit,
    /// Money enters the bucket
    Credit,
}

impl Polarity {
    /// Sign to apply to a magnitude moving in this direction
    pub fn sign(&self) -> i64 {
        match self {
            Self::Debit => -1,
            Self::Credit => 1,
        }
    }
}

impl Section {
    /// All sections in form order
    pub const ALL: [Section; 9] = [
        Self::GeneralInformation,
        Self::PaymentSource,
        Self::CreditOptions,
        Self::Deposit,
        Self::TransferFrom,
        Self::TransferTo,
        Self::ReallocateFrom,
        Self::ReallocateTo,
        Self::Tags,
    ];

    /// The stable identifier used by forms and storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GeneralInformation => "general_information",
            Self::PaymentSource => "payment_source",
            Self::CreditOptions => "credit_options",
            Self::Deposit => "deposit",
            Self::TransferFrom => "transfer_from",
            Self::TransferTo => "transfer_to",
            Self::ReallocateFrom => "reallocate_from",
            Self::ReallocateTo => "reallocate_to",
            Self::Tags => "tags",
        }
    }

    /// Direction of money for sections that hold line items
    pub fn polarity(&self) -> Option<Polarity> {
        match self {
            Self::PaymentSource
            | Self::CreditOptions
            | Self::TransferFrom
            | Self::ReallocateFrom => Some(Polarity::Debit),
            Self::Deposit | Self::TransferTo | Self::ReallocateTo => Some(Polarity::Credit),
            Self::GeneralInformation | Self::Tags => None,
        }
    }

    /// Whether line items can be assigned to this section
    pub fn holds_line_items(&self) -> bool {
        self.polarity().is_some()
    }

    /// Whether the section's account is chosen explicitly by the user.
    ///
    /// The reallocation pair moves money between buckets of one account and
    /// takes its account from the buckets involved.
    pub fn has_explicit_account(&self) -> bool {
        self.holds_line_items() && !self.is_reallocation()
    }

    pub fn is_reallocation(&self) -> bool {
        matches!(self, Self::ReallocateFrom | Self::ReallocateTo)
    }

    /// The other side of a two-sided section
    pub fn opposite(&self) -> Option<Section> {
        match self {
            Self::TransferFrom => Some(Self::TransferTo),
            Self::TransferTo => Some(Self::TransferFrom),
            Self::ReallocateFrom => Some(Self::ReallocateTo),
            Self::ReallocateTo => Some(Self::ReallocateFrom),
            _ => None,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = InvalidSection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|section| section.as_str() == s)
            .ok_or_else(|| InvalidSection(s.to_string()))
    }
}

impl Serialize for Section {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Section {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<Section>().map_err(serde::de::Error::custom)
    }
}

/// An unrecognized section token
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported form section: {0:?}")]
pub struct InvalidSection(pub String);
