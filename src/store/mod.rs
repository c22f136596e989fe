pub mod memory;
pub mod postgres;

use std::{fmt, str::FromStr};

use anyhow::anyhow;
use async_trait::async_trait;

use crate::db::models::{SensorRecord, ValidationError};

pub use memory::MemorySensorStore;
pub use postgres::PgSensorStore;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unreachable: {0}")]
    Connection(#[source] sqlx::Error),
    #[error("database [{expected}] not found (connected to [{found}])")]
    DatabaseNotFound { expected: String, found: String },
    #[error("sensor with id [{id}] is already registered")]
    DuplicateKey { id: String },
    #[error("invalid sensor record: {0}")]
    InvalidRecord(#[from] ValidationError),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

// ---------------------------------------------------------------------------
// InsertMode
// ---------------------------------------------------------------------------

/// How a store treats an insert whose id is already present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InsertMode {
    /// Reject with [`StoreError::DuplicateKey`].
    #[default]
    Strict,
    /// Replace the stored record.
    Upsert,
}

impl FromStr for InsertMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "strict" => Ok(Self::Strict),
            "upsert" => Ok(Self::Upsert),
            other => Err(anyhow!("unknown insert mode: {other:?}")),
        }
    }
}

impl fmt::Display for InsertMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsertMode::Strict => f.write_str("strict"),
            InsertMode::Upsert => f.write_str("upsert"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    Updated,
}

// ---------------------------------------------------------------------------
// SensorStore
// ---------------------------------------------------------------------------

/// A collection of sensor records keyed by id.
#[async_trait]
pub trait SensorStore: Send + Sync {
    /// Makes sure the collection exists.
    async fn ensure_collection(&self) -> Result<(), StoreError>;

    /// Deletes every record in the collection.
    async fn reset_collection(&self) -> Result<(), StoreError>;

    /// Inserts `record`, honouring the store's [`InsertMode`] on conflict.
    async fn insert_record(&self, record: &SensorRecord) -> Result<InsertOutcome, StoreError>;

    async fn get_record(&self, id: &str) -> Result<Option<SensorRecord>, StoreError>;

    /// All records ordered by id.
    async fn list_records(&self) -> Result<Vec<SensorRecord>, StoreError>;

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.list_records().await?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_mode_from_str() {
        assert_eq!("strict".parse::<InsertMode>().unwrap(), InsertMode::Strict);
        assert_eq!("upsert".parse::<InsertMode>().unwrap(), InsertMode::Upsert);
    }

    #[test]
    fn insert_mode_unknown_errors() {
        let err = "replace".parse::<InsertMode>().unwrap_err();
        assert!(err.to_string().contains("unknown insert mode"));
    }

    #[test]
    fn insert_mode_defaults_to_strict() {
        assert_eq!(InsertMode::default(), InsertMode::Strict);
        assert_eq!(InsertMode::default().to_string(), "strict");
    }

    #[test]
    fn duplicate_key_message_names_the_id() {
        let err = StoreError::DuplicateKey { id: "testing".to_owned() };
        assert_eq!(err.to_string(), "sensor with id [testing] is already registered");
    }
}
