//! bucketwise - bucket-based personal finance tracking
//!
//! Accounts hold named buckets of money. Every financial activity is
//! recorded as an event (expense, deposit, transfer or reallocation) whose
//! amount is assigned to buckets through line items.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (accounts, buckets, events, tags)
//! - `form`: Decoding of urlencoded event forms into drafts
//! - `services`: The allocation engine (section classification, line-item
//!   and tag allocation, bucket ordering) and account management
//! - `storage`: JSON file storage layer
//! - `audit`: Audit logging system
//! - `display`: Terminal formatting
//! - `cli`: Command handlers for the binary
//!
//! # Example
//!
//! ```rust,ignore
//! use bucketwise::form::parse_event_form;
//! use bucketwise::services::EventClassifier;
//!
//! let catalog = storage.snapshot()?;
//! let draft = parse_event_form(body, today)?;
//! let evaluation = EventClassifier::new(&catalog).evaluate(&draft)?;
//! let event = storage.commit(evaluation.prepared)?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod form;
pub mod models;
pub mod services;
pub mod storage;

pub use error::BucketwiseError;
