use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{InsertMode, InsertOutcome, SensorStore, StoreError};
use crate::db::models::SensorRecord;

/// In-memory sensor collection keyed by id.
///
/// Wrapped in `Arc` so clones share the same collection. Used for dry runs
/// and tests.
#[derive(Clone, Default)]
pub struct MemorySensorStore {
    inner: Arc<RwLock<BTreeMap<String, SensorRecord>>>,
    mode: InsertMode,
}

impl MemorySensorStore {
    pub fn new(mode: InsertMode) -> Self {
        Self {
            inner: Arc::default(),
            mode,
        }
    }
}

#[async_trait]
impl SensorStore for MemorySensorStore {
    async fn ensure_collection(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn reset_collection(&self) -> Result<(), StoreError> {
        self.inner.write().await.clear();
        Ok(())
    }

    async fn insert_record(&self, record: &SensorRecord) -> Result<InsertOutcome, StoreError> {
        record.validate()?;

        let mut records = self.inner.write().await;
        if records.contains_key(&record.id) {
            if self.mode == InsertMode::Strict {
                return Err(StoreError::DuplicateKey { id: record.id.clone() });
            }
            records.insert(record.id.clone(), record.clone());
            return Ok(InsertOutcome::Updated);
        }

        records.insert(record.id.clone(), record.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn get_record(&self, id: &str) -> Result<Option<SensorRecord>, StoreError> {
        Ok(self.inner.read().await.get(id).cloned())
    }

    async fn list_records(&self) -> Result<Vec<SensorRecord>, StoreError> {
        Ok(self.inner.read().await.values().cloned().collect())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.inner.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{SensorState, SensorType};

    fn make_record(serial: &str, address: &str) -> SensorRecord {
        SensorRecord::new(serial, "DS18B20", SensorState::Up, SensorType::Temperature)
            .with_address(address)
    }

    #[tokio::test]
    async fn empty_store_returns_nothing() {
        let store = MemorySensorStore::default();
        assert!(store.list_records().await.unwrap().is_empty());
        assert!(store.get_record("testing").await.unwrap().is_none());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn insert_and_get_single_record() {
        let store = MemorySensorStore::default();
        let outcome = store.insert_record(&make_record("dev1", "here")).await.unwrap();
        assert_eq!(outcome, InsertOutcome::Inserted);

        let got = store.get_record("dev1").await.unwrap().unwrap();
        assert_eq!(got.serial, "dev1");
        assert_eq!(got.address, "here");
    }

    #[tokio::test]
    async fn strict_mode_rejects_duplicate_and_keeps_original() {
        let store = MemorySensorStore::new(InsertMode::Strict);
        store.insert_record(&make_record("dev1", "old")).await.unwrap();

        let err = store.insert_record(&make_record("dev1", "new")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { ref id } if id == "dev1"));
        assert_eq!(store.get_record("dev1").await.unwrap().unwrap().address, "old");
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn upsert_mode_replaces_existing_record() {
        let store = MemorySensorStore::new(InsertMode::Upsert);
        store.insert_record(&make_record("dev1", "old")).await.unwrap();

        let outcome = store.insert_record(&make_record("dev1", "new")).await.unwrap();
        assert_eq!(outcome, InsertOutcome::Updated);
        assert_eq!(store.get_record("dev1").await.unwrap().unwrap().address, "new");
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn invalid_record_is_not_stored() {
        let store = MemorySensorStore::default();
        let mut r = make_record("dev1", "here");
        r.id = "other".to_owned();

        let err = store.insert_record(&r).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidRecord(_)));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn list_is_ordered_by_id() {
        let store = MemorySensorStore::default();
        store.insert_record(&make_record("zeta", "")).await.unwrap();
        store.insert_record(&make_record("alpha", "")).await.unwrap();

        let ids: Vec<_> = store
            .list_records()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, ["alpha", "zeta"]);
    }

    #[tokio::test]
    async fn reset_empties_the_collection() {
        let store = MemorySensorStore::default();
        store.insert_record(&make_record("dev1", "")).await.unwrap();
        store.insert_record(&make_record("dev2", "")).await.unwrap();

        store.reset_collection().await.unwrap();
        assert!(store.list_records().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clone_shares_state() {
        let store = MemorySensorStore::default();
        let clone = store.clone();

        store.insert_record(&make_record("dev1", "")).await.unwrap();

        assert!(clone.get_record("dev1").await.unwrap().is_some());
    }
}
