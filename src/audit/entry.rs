//! Audit log records
//!
//! One JSON line per change. Creations carry the new entity in `after`;
//! balance changes carry the bucket on both sides plus a one-line summary.

use std::fmt::{self, Write as _};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Bucket;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of record an entry is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Account,
    Bucket,
    Event,
    Tag,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Account => "Account",
            Self::Bucket => "Bucket",
            Self::Event => "Event",
            Self::Tag => "Tag",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub operation: Operation,
    pub entity_type: EntityType,
    pub entity_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<serde_json::Value>,

    /// e.g. `balance: $0.00 -> -$12.50`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_summary: Option<String>,
}

impl AuditEntry {
    /// Record a newly created account, bucket, tag or event
    pub fn create<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation: Operation::Create,
            entity_type,
            entity_id: entity_id.into(),
            entity_name,
            before: None,
            after: serde_json::to_value(entity).ok(),
            diff_summary: None,
        }
    }

    pub fn bucket_created(bucket: &Bucket) -> Self {
        Self::create(
            EntityType::Bucket,
            bucket.id.to_string(),
            Some(bucket.name.clone()),
            bucket,
        )
    }

    /// Record an event moving a bucket's balance
    pub fn balance_change(before: &Bucket, after: &Bucket) -> Self {
        Self {
            timestamp: Utc::now(),
            operation: Operation::Update,
            entity_type: EntityType::Bucket,
            entity_id: after.id.to_string(),
            entity_name: Some(after.name.clone()),
            before: serde_json::to_value(before).ok(),
            after: serde_json::to_value(after).ok(),
            diff_summary: Some(format!("balance: {} -> {}", before.balance, after.balance)),
        }
    }

    /// `[time] CREATE Event evt-1 (June rent)` with the summary on a second line
    pub fn format_human_readable(&self) -> String {
        let mut line = format!(
            "[{}] {} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.operation,
            self.entity_type,
            self.entity_id
        );
        if let Some(name) = &self.entity_name {
            let _ = write!(line, " ({})", name);
        }
        if let Some(diff) = &self.diff_summary {
            let _ = write!(line, "\n  Changes: {}", diff);
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use serde_json::json;

    fn rent(cents: i64) -> Bucket {
        let mut bucket = Bucket::new(3, "Rent");
        bucket.balance = Money::from_cents(cents);
        bucket
    }

    #[test]
    fn test_display() {
        assert_eq!(Operation::Create.to_string(), "CREATE");
        assert_eq!(Operation::Update.to_string(), "UPDATE");
        assert_eq!(EntityType::Bucket.to_string(), "Bucket");
    }

    #[test]
    fn test_bucket_created() {
        let entry = AuditEntry::bucket_created(&rent(0));

        assert_eq!(entry.operation, Operation::Create);
        assert_eq!(entry.entity_type, EntityType::Bucket);
        assert_eq!(entry.entity_id, "3");
        assert!(entry.before.is_none());
        assert_eq!(entry.after.as_ref().unwrap()["name"], "Rent");
    }

    #[test]
    fn test_balance_change() {
        let entry = AuditEntry::balance_change(&rent(100), &rent(-1150));

        assert_eq!(entry.operation, Operation::Update);
        assert_eq!(entry.entity_name.as_deref(), Some("Rent"));
        assert_eq!(
            entry.diff_summary.as_deref(),
            Some("balance: $1.00 -> -$11.50")
        );
        assert_eq!(entry.before.as_ref().unwrap()["balance"], 100);
    }

    #[test]
    fn test_serialization_skips_empty_fields() {
        let entry = AuditEntry::create(EntityType::Event, "evt-1", None, &json!({"amount": 5}));

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"entity_type\":\"event\""));
        assert!(json.contains("\"operation\":\"create\""));
        assert!(!json.contains("before"));
        assert!(!json.contains("entity_name"));

        let deserialized: AuditEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.entity_type, EntityType::Event);
    }

    #[test]
    fn test_human_readable_format() {
        let formatted = AuditEntry::balance_change(&rent(100), &rent(50)).format_human_readable();
        assert!(formatted.contains("UPDATE Bucket 3 (Rent)"));
        assert!(formatted.ends_with("\n  Changes: balance: $1.00 -> $0.50"));
    }
}
