//! Audit logging for bucketwise
//!
//! Records every account, bucket, tag and event the storage layer creates,
//! and every bucket balance an event changes, in an append-only JSONL log.
//!
//! # Example
//!
//! ```rust,ignore
//! use bucketwise::audit::{AuditEntry, AuditLogger, EntityType};
//!
//! let logger = AuditLogger::new(paths.audit_log());
//! let entry = AuditEntry::create(
//!     EntityType::Bucket,
//!     "12",
//!     Some("Vacation".to_string()),
//!     &bucket,
//! );
//! logger.log(&entry)?;
//! ```

mod entry;
mod logger;

pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
