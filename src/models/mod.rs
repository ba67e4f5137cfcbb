//! Core data models
//!
//! Accounts and their buckets, events with their line items and tagged
//! items, the form-side draft types, and the catalog snapshot the engine
//! works against.

pub mod account;
pub mod bucket;
pub mod catalog;
pub mod event;
pub mod ids;
pub mod line_item;
pub mod money;
pub mod section;
pub mod tag;

pub use account::{Account, AccountRole};
pub use bucket::{Bucket, BucketId, DefaultBucket};
pub use catalog::Catalog;
pub use event::{Event, EventDraft, EventRole, UnknownEventRole};
pub use ids::{AccountId, EventId, PendingBucketId, TagId};
pub use line_item::{BucketRef, BucketSelection, DraftLineItem, DraftSection, LineItem};
pub use money::{Money, MoneyParseError};
pub use section::{InvalidSection, Polarity, Section};
pub use tag::{Coverage, DraftTaggedItem, Tag, TagRef, TaggedItem};
