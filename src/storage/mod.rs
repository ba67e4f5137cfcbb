//! Storage layer for bucketwise
//!
//! JSON file storage with atomic writes. `Storage::commit` is the second
//! half of the allocation handoff: it creates the buckets and tags an
//! evaluated event asked for, applies the event to bucket balances and
//! saves it.

pub mod catalog;
pub mod events;
pub mod file_io;
pub mod init;

pub use catalog::{CatalogData, CatalogRepository, ASIDE_ROLE};
pub use events::EventRepository;
pub use file_io::{read_json, read_json_required, write_json_atomic};
pub use init::initialize_storage;

use serde::Serialize;
use tracing::{debug, error};

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::config::{BucketwisePaths, Settings};
use crate::error::{BucketwiseError, BucketwiseResult};
use crate::models::{BucketId, BucketRef, Catalog, DefaultBucket, Event, Section, TagRef};
use crate::services::{AllocationErrors, PreparedEvent};

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: BucketwisePaths,
    pub catalog: CatalogRepository,
    pub events: EventRepository,
    audit: AuditLogger,
    audit_enabled: bool,
    default_buckets: Vec<DefaultBucket>,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: BucketwisePaths) -> BucketwiseResult<Self> {
        paths.ensure_directories()?;

        Ok(Self {
            catalog: CatalogRepository::new(paths.catalog_file()),
            events: EventRepository::new(paths.events_file()),
            audit: AuditLogger::new(paths.audit_log()),
            audit_enabled: true,
            default_buckets: DefaultBucket::standard(),
            paths,
        })
    }

    /// Apply the default buckets and audit preference from settings
    pub fn with_settings(mut self, settings: &Settings) -> Self {
        self.audit_enabled = settings.audit_enabled;
        self.default_buckets = settings.default_buckets.clone();
        self
    }

    pub fn paths(&self) -> &BucketwisePaths {
        &self.paths
    }

    /// Load all data from disk
    pub fn load_all(&self) -> BucketwiseResult<()> {
        self.catalog.load()?;
        self.events.load()?;
        Ok(())
    }

    /// Check if storage has been initialized
    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }

    pub fn default_buckets(&self) -> &[DefaultBucket] {
        &self.default_buckets
    }

    /// The catalog as the engine sees it for one request
    pub fn snapshot(&self) -> BucketwiseResult<Catalog> {
        self.catalog.snapshot(&self.default_buckets)
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Record entries unless auditing is switched off
    pub fn log_entries(&self, entries: &[AuditEntry]) -> BucketwiseResult<()> {
        if self.audit_enabled {
            self.audit.log_batch(entries)?;
        }
        Ok(())
    }

    /// Record the creation of an entity
    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> BucketwiseResult<()> {
        self.log_entries(&[AuditEntry::create(
            entity_type,
            entity_id,
            entity_name,
            entity,
        )])
    }

    /// Save an evaluated event.
    ///
    /// Requested and virtual buckets are created, new tags are added and
    /// every bucket the event touches is adjusted. The catalog stays locked
    /// for the whole commit. The event is written first and removed again
    /// if the catalog cannot be saved, so either both files change or
    /// neither does.
    pub fn commit(&self, mut prepared: PreparedEvent) -> BucketwiseResult<Event> {
        let writer = self.catalog.lock()?;
        let mut data = writer.working_copy();
        let mut entries: Vec<AuditEntry> = Vec::new();

        for request in prepared.bucket_requests.clone() {
            let bucket = data.add_bucket(request.account_id, &request.name, "")?;
            let BucketId::Real(id) = bucket.id else {
                return Err(BucketwiseError::Storage(format!(
                    "Bucket '{}' was not persisted",
                    bucket.name
                )));
            };
            prepared.materialize(request.placeholder, id);
            entries.push(AuditEntry::bucket_created(&bucket));
        }

        for (account_id, role) in prepared.virtual_buckets() {
            let default = self.default_for(&role);
            let (bucket, created) = data.ensure_role_bucket(account_id, &default)?;
            if let BucketId::Real(id) = bucket.id {
                prepared.materialize_virtual(account_id, &role, id);
                if created {
                    debug!(%account_id, %role, bucket = id, "materialized default bucket");
                    entries.push(AuditEntry::bucket_created(&bucket));
                }
            }
        }

        let mut event = prepared
            .finalize()
            .map_err(|e| BucketwiseError::Allocation(AllocationErrors::from(e)))?;

        for item in &mut event.tagged_items {
            if item.tag == TagRef::New {
                let (tag, created) = data.ensure_tag(&item.name);
                item.tag = TagRef::Existing(tag.id);
                if created {
                    entries.push(AuditEntry::create(
                        EntityType::Tag,
                        tag.id.to_string(),
                        Some(tag.name.clone()),
                        &tag,
                    ));
                }
            }
        }

        for item in &event.line_items {
            let BucketRef::Real(bucket_id) = item.bucket else {
                return Err(BucketwiseError::Storage(format!(
                    "{} line item still points at bucket {}",
                    item.section, item.bucket
                )));
            };

            let mut changes = vec![data.adjust_balance(
                item.account_id,
                bucket_id,
                item.signed_amount(),
            )?];

            // Paying a card from checking: the money moves to the aside bucket
            if item.section == Section::CreditOptions {
                let default = self.default_for(ASIDE_ROLE);
                let (aside, created) = data.ensure_role_bucket(item.account_id, &default)?;
                if let BucketId::Real(aside_id) = aside.id {
                    if created {
                        entries.push(AuditEntry::bucket_created(&aside));
                    }
                    changes.push(data.adjust_balance(item.account_id, aside_id, item.amount)?);
                }
            }

            entries.extend(
                changes
                    .iter()
                    .map(|(before, after)| AuditEntry::balance_change(before, after)),
            );
        }

        let event = self.events.append(event)?;
        if let Err(err) = writer.save(data) {
            if let Some(id) = event.id {
                if let Err(undo) = self.events.remove(id) {
                    error!(event = %id, error = %undo, "could not remove unsaved event");
                }
            }
            return Err(err);
        }

        let id = event.id.map(|id| id.to_string()).unwrap_or_default();
        debug!(event = %id, line_items = event.line_items.len(), "committed event");
        entries.push(AuditEntry::create(
            EntityType::Event,
            id,
            event.memo.clone(),
            &event,
        ));
        self.log_entries(&entries)?;

        Ok(event)
    }

    fn default_for(&self, role: &str) -> DefaultBucket {
        self.default_buckets
            .iter()
            .find(|d| d.role == role)
            .cloned()
            .unwrap_or_else(|| DefaultBucket::new(role, role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::Operation;
    use crate::models::{
        AccountId, AccountRole, BucketSelection, DraftSection, DraftTaggedItem, EventDraft,
        EventRole, Money,
    };
    use crate::services::EventClassifier;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = BucketwisePaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();

        storage
            .catalog
            .update(|data| {
                let checking = data.add_account("Checking", AccountRole::Checking)?;
                data.add_bucket(checking.id, "Rent", "")?;
                data.add_bucket(checking.id, "Groceries", "")?;
                let visa = data.add_account("Visa", AccountRole::CreditCard)?;
                data.add_bucket(visa.id, "General", "default")?;
                Ok(())
            })
            .unwrap();

        (temp_dir, storage)
    }

    fn evaluate(storage: &Storage, draft: &EventDraft) -> PreparedEvent {
        let catalog = storage.snapshot().unwrap();
        EventClassifier::new(&catalog)
            .evaluate(draft)
            .unwrap()
            .prepared
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()
    }

    #[test]
    fn test_storage_creation() {
        let temp_dir = TempDir::new().unwrap();
        let paths = BucketwisePaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();

        assert!(temp_dir.path().join("data").exists());
        assert!(!storage.is_initialized());
    }

    #[test]
    fn test_commit_deposit_into_new_bucket_and_virtual_default() {
        let (_temp_dir, storage) = setup();

        let draft = EventDraft::new(EventRole::Deposit, date(), Money::from_cents(3000))
            .with_section(
                DraftSection::new(Section::Deposit)
                    .account(AccountId::new(1))
                    .new_bucket("Vacation"),
            )
            .with_tag(DraftTaggedItem::whole("payday"));
        let event = storage.commit(evaluate(&storage, &draft)).unwrap();

        // Rent, Groceries and the card's General bucket hold IDs 1 to 3
        assert_eq!(event.line_items[0].bucket, BucketRef::Real(4));
        assert!(matches!(event.tagged_items[0].tag, TagRef::Existing(_)));

        let catalog = storage.snapshot().unwrap();
        let vacation = catalog.bucket(AccountId::new(1), &BucketId::Real(4)).unwrap();
        assert_eq!(vacation.name, "Vacation");
        assert_eq!(vacation.balance, Money::from_cents(3000));
        assert!(catalog.tag_named("payday").is_some());

        let transfer = EventDraft::new(EventRole::Reallocation, date(), Money::from_cents(500))
            .with_section(
                DraftSection::new(Section::ReallocateFrom).bucket(BucketSelection::Real(4)),
            )
            .with_section(
                DraftSection::new(Section::ReallocateTo)
                    .bucket(BucketSelection::Virtual("default".into())),
            );
        let event = storage.commit(evaluate(&storage, &transfer)).unwrap();
        assert_eq!(event.id.map(|id| id.get()), Some(2));

        let catalog = storage.snapshot().unwrap();
        let checking = catalog.account(AccountId::new(1)).unwrap();
        let general = checking.bucket_with_role("default").unwrap();
        assert_eq!(general.name, "General");
        assert_eq!(general.balance, Money::from_cents(500));
        assert_eq!(checking.balance(), Money::from_cents(3000));
    }

    #[test]
    fn test_commit_credit_options_moves_money_aside() {
        let (_temp_dir, storage) = setup();

        let draft = EventDraft::new(EventRole::Expense, date(), Money::from_cents(1200))
            .with_section(
                DraftSection::new(Section::PaymentSource)
                    .account(AccountId::new(2))
                    .bucket(BucketSelection::Real(3)),
            )
            .with_section(
                DraftSection::new(Section::CreditOptions)
                    .account(AccountId::new(1))
                    .bucket(BucketSelection::Real(2)),
            );
        storage.commit(evaluate(&storage, &draft)).unwrap();

        let catalog = storage.snapshot().unwrap();
        let visa = catalog.account(AccountId::new(2)).unwrap();
        assert_eq!(visa.balance(), Money::from_cents(-1200));

        let checking = catalog.account(AccountId::new(1)).unwrap();
        let groceries = checking.bucket(&BucketId::Real(2)).unwrap();
        let aside = checking.bucket_with_role(ASIDE_ROLE).unwrap();
        assert_eq!(groceries.balance, Money::from_cents(-1200));
        assert_eq!(aside.balance, Money::from_cents(1200));
        assert_eq!(checking.balance(), Money::zero());
        assert_eq!(aside.available(), Money::zero());
    }

    #[test]
    fn test_commit_writes_audit_trail() {
        let (_temp_dir, storage) = setup();

        let draft = EventDraft::new(EventRole::Expense, date(), Money::from_cents(100))
            .with_section(
                DraftSection::new(Section::PaymentSource)
                    .account(AccountId::new(1))
                    .bucket(BucketSelection::Real(1)),
            );
        storage.commit(evaluate(&storage, &draft)).unwrap();

        let entries = storage.audit().read_all().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].entity_type, EntityType::Bucket);
        assert_eq!(entries[0].operation, Operation::Update);
        assert_eq!(
            entries[0].diff_summary.as_deref(),
            Some("balance: $0.00 -> -$1.00")
        );
        assert_eq!(entries[1].entity_type, EntityType::Event);
        assert_eq!(entries[1].entity_id, "evt-1");
    }

    #[test]
    fn test_audit_can_be_disabled() {
        let (_temp_dir, storage) = setup();
        let settings = Settings {
            audit_enabled: false,
            ..Settings::default()
        };
        let storage = storage.with_settings(&settings);

        let draft = EventDraft::new(EventRole::Deposit, date(), Money::from_cents(100))
            .with_section(
                DraftSection::new(Section::Deposit)
                    .account(AccountId::new(1))
                    .bucket(BucketSelection::Real(1)),
            );
        storage.commit(evaluate(&storage, &draft)).unwrap();
        assert!(storage.audit().read_all().unwrap().is_empty());
    }

    #[test]
    fn test_failed_commit_leaves_disk_untouched() {
        let (temp_dir, storage) = setup();
        let before = std::fs::read_to_string(temp_dir.path().join("data/catalog.json")).unwrap();

        let draft = EventDraft::new(EventRole::Deposit, date(), Money::from_cents(100))
            .with_section(
                DraftSection::new(Section::Deposit)
                    .account(AccountId::new(1))
                    .new_bucket("Rent"),
            );
        let err = storage.commit(evaluate(&storage, &draft)).unwrap_err();
        assert!(matches!(err, BucketwiseError::Duplicate { .. }));

        let after = std::fs::read_to_string(temp_dir.path().join("data/catalog.json")).unwrap();
        assert_eq!(before, after);
        assert_eq!(storage.events.count().unwrap(), 0);
    }

    fn rent_deposit(cents: i64) -> EventDraft {
        EventDraft::new(EventRole::Deposit, date(), Money::from_cents(cents)).with_section(
            DraftSection::new(Section::Deposit)
                .account(AccountId::new(1))
                .bucket(BucketSelection::Real(1)),
        )
    }

    fn rent_balance(storage: &Storage) -> Money {
        let catalog = storage.snapshot().unwrap();
        catalog
            .bucket(AccountId::new(1), &BucketId::Real(1))
            .unwrap()
            .balance
    }

    #[test]
    fn test_unwritable_event_log_keeps_catalog() {
        let (temp_dir, storage) = setup();
        let catalog_file = temp_dir.path().join("data/catalog.json");
        let before = std::fs::read_to_string(&catalog_file).unwrap();

        // A directory where the event file should be makes every write fail
        std::fs::create_dir_all(temp_dir.path().join("data/events.json")).unwrap();

        let prepared = evaluate(&storage, &rent_deposit(700));
        assert!(storage.commit(prepared).is_err());

        assert_eq!(std::fs::read_to_string(&catalog_file).unwrap(), before);
        assert_eq!(rent_balance(&storage), Money::zero());
        assert_eq!(storage.events.count().unwrap(), 0);
    }

    #[test]
    fn test_unwritable_catalog_removes_event() {
        let (temp_dir, storage) = setup();
        storage.commit(evaluate(&storage, &rent_deposit(100))).unwrap();

        let catalog_file = temp_dir.path().join("data/catalog.json");
        std::fs::remove_file(&catalog_file).unwrap();
        std::fs::create_dir_all(&catalog_file).unwrap();

        let prepared = evaluate(&storage, &rent_deposit(700));
        assert!(storage.commit(prepared).is_err());

        assert_eq!(rent_balance(&storage), Money::from_cents(100));
        assert_eq!(storage.events.count().unwrap(), 1);

        let reloaded = EventRepository::new(temp_dir.path().join("data/events.json"));
        reloaded.load().unwrap();
        assert_eq!(reloaded.count().unwrap(), 1);
    }

    #[test]
    fn test_concurrent_commits_keep_every_balance_change() {
        let (_temp_dir, storage) = setup();
        let prepared: Vec<PreparedEvent> = (1..=6)
            .map(|i| evaluate(&storage, &rent_deposit(i * 100)))
            .collect();

        std::thread::scope(|scope| {
            for event in prepared {
                let storage = &storage;
                scope.spawn(move || storage.commit(event).unwrap());
            }
        });

        assert_eq!(rent_balance(&storage), Money::from_cents(2100));
        assert_eq!(storage.events.count().unwrap(), 6);
    }
}
