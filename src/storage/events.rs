//! Event repository for JSON storage
//!
//! Manages loading and saving resolved events to events.json

use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{BucketwiseError, BucketwiseResult};
use crate::models::{AccountId, Event, EventId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable event data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct EventData {
    #[serde(default)]
    events: Vec<Event>,
}

/// Repository for event persistence
pub struct EventRepository {
    path: PathBuf,
    data: RwLock<Vec<Event>>,
}

impl EventRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(Vec::new()),
        }
    }

    /// Load events from disk
    pub fn load(&self) -> BucketwiseResult<()> {
        let file_data: EventData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(|e| {
            BucketwiseError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;
        *data = file_data.events;

        Ok(())
    }

    /// Assign the next ID to an event, write it to disk, then keep it
    pub fn append(&self, mut event: Event) -> BucketwiseResult<Event> {
        let mut data = self.data.write().map_err(|e| {
            BucketwiseError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let next = data
            .iter()
            .filter_map(|e| e.id.map(|id| id.get()))
            .max()
            .unwrap_or(0)
            + 1;
        event.id = Some(EventId::new(next));

        let mut events = data.clone();
        events.push(event.clone());
        write_json_atomic(&self.path, &EventData { events })?;

        data.push(event.clone());
        Ok(event)
    }

    /// Drop an event from disk and memory, returning it if it was stored
    pub fn remove(&self, id: EventId) -> BucketwiseResult<Option<Event>> {
        let mut data = self.data.write().map_err(|e| {
            BucketwiseError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let Some(index) = data.iter().position(|e| e.id == Some(id)) else {
            return Ok(None);
        };
        let mut events = data.clone();
        let removed = events.remove(index);
        let file_data = EventData { events };
        write_json_atomic(&self.path, &file_data)?;

        *data = file_data.events;
        Ok(Some(removed))
    }

    pub fn get(&self, id: EventId) -> BucketwiseResult<Option<Event>> {
        let data = self.data.read().map_err(|e| {
            BucketwiseError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.iter().find(|e| e.id == Some(id)).cloned())
    }

    /// All events, most recent first
    pub fn get_all(&self) -> BucketwiseResult<Vec<Event>> {
        let data = self.data.read().map_err(|e| {
            BucketwiseError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut events = data.clone();
        events.sort_by(|a, b| b.occurred_on.cmp(&a.occurred_on).then(b.id.cmp(&a.id)));
        Ok(events)
    }

    /// Events with a line item on the account, most recent first
    pub fn get_by_account(&self, account_id: AccountId) -> BucketwiseResult<Vec<Event>> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|e| e.line_items.iter().any(|i| i.account_id == account_id))
            .collect())
    }

    pub fn count(&self) -> BucketwiseResult<usize> {
        let data = self.data.read().map_err(|e| {
            BucketwiseError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BucketRef, EventRole, LineItem, Money, Section};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn event(day: u32, account: i64) -> Event {
        Event {
            id: None,
            role: EventRole::Deposit,
            occurred_on: NaiveDate::from_ymd_opt(2025, 2, day).unwrap(),
            memo: Some("paycheck".into()),
            amount: Money::from_cents(1000),
            line_items: vec![LineItem {
                section: Section::Deposit,
                account_id: AccountId::new(account),
                bucket: BucketRef::Real(1),
                amount: Money::from_cents(1000),
            }],
            tagged_items: Vec::new(),
        }
    }

    fn create_test_repo() -> (TempDir, EventRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = EventRepository::new(temp_dir.path().join("events.json"));
        (temp_dir, repo)
    }

    #[test]
    fn test_append_assigns_ids() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let first = repo.append(event(1, 1)).unwrap();
        let second = repo.append(event(2, 2)).unwrap();

        assert_eq!(first.id, Some(EventId::new(1)));
        assert_eq!(second.id, Some(EventId::new(2)));
        assert_eq!(repo.count().unwrap(), 2);
        assert_eq!(repo.get(EventId::new(2)).unwrap(), Some(second));
    }

    #[test]
    fn test_append_is_written_immediately() {
        let (temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        repo.append(event(3, 1)).unwrap();

        let reloaded = EventRepository::new(temp_dir.path().join("events.json"));
        reloaded.load().unwrap();
        assert_eq!(reloaded.count().unwrap(), 1);
    }

    #[test]
    fn test_remove() {
        let (temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        let first = repo.append(event(1, 1)).unwrap();
        repo.append(event(2, 1)).unwrap();

        assert_eq!(repo.remove(EventId::new(1)).unwrap(), Some(first));
        assert_eq!(repo.remove(EventId::new(1)).unwrap(), None);

        let reloaded = EventRepository::new(temp_dir.path().join("events.json"));
        reloaded.load().unwrap();
        assert_eq!(reloaded.count().unwrap(), 1);
        assert!(reloaded.get(EventId::new(2)).unwrap().is_some());
    }

    #[test]
    fn test_ordering_and_account_filter() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        repo.append(event(1, 1)).unwrap();
        repo.append(event(9, 2)).unwrap();
        repo.append(event(5, 1)).unwrap();

        let days: Vec<u32> = repo
            .get_all()
            .unwrap()
            .iter()
            .map(|e| chrono::Datelike::day(&e.occurred_on))
            .collect();
        assert_eq!(days, vec![9, 5, 1]);

        assert_eq!(repo.get_by_account(AccountId::new(1)).unwrap().len(), 2);
        assert!(repo.get_by_account(AccountId::new(7)).unwrap().is_empty());
    }
}
