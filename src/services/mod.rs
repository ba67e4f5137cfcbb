//! Allocation engine
//!
//! The services decide which sections of the event form apply, resolve the
//! user's bucket choices into line items, validate tag coverage and order
//! buckets for display. They borrow a catalog snapshot and never touch
//! storage; `AccountService` is the one service that works on top of it.

pub mod account;
pub mod bucket_order;
pub mod classifier;
pub mod error;
pub mod line_item;
pub mod tagging;

pub use account::AccountService;
pub use bucket_order::BucketOrderer;
pub use classifier::{
    required_sections, role_sections, EventClassifier, Evaluation, SectionPlan, SectionVerdict,
};
pub use error::{AllocationError, AllocationErrors};
pub use line_item::{BucketRequest, LineItemAllocator, PreparedEvent, ResolvedAssignment};
pub use tagging::TaggedItemAllocator;
