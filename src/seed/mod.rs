pub mod fixtures;

use tracing::{info, warn};

use crate::{
    db::models::SensorRecord,
    store::{InsertOutcome, SensorStore, StoreError},
};

pub use fixtures::SeedSet;

/// What a seeding run should do.
#[derive(Debug, Clone)]
pub struct SeedPlan {
    pub reset: bool,
    pub records: Vec<SensorRecord>,
}

impl SeedPlan {
    pub fn new(set: SeedSet, reset: Option<bool>) -> Self {
        Self {
            reset: reset.unwrap_or_else(|| set.resets_collection()),
            records: set.records(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub reset: bool,
    pub inserted: usize,
    pub updated: usize,
}

/// Populates a sensor collection with fixed records.
pub struct Seeder<S> {
    store: S,
}

impl<S: SensorStore> Seeder<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Deletes every record in the collection.
    pub async fn reset_collection(&self) -> Result<(), StoreError> {
        let before = self.store.count().await?;
        self.store.reset_collection().await?;
        warn!(removed = before, "Sensor collection reset");
        Ok(())
    }

    pub async fn insert_record(&self, record: &SensorRecord) -> Result<InsertOutcome, StoreError> {
        let outcome = self.store.insert_record(record).await?;
        info!(id = %record.id, outcome = ?outcome, "Sensor record seeded");
        Ok(outcome)
    }

    /// Ensures the collection, optionally resets it, then inserts every
    /// record of `plan` in order. Stops at the first failing insert.
    pub async fn run(&self, plan: &SeedPlan) -> Result<SeedReport, StoreError> {
        self.store.ensure_collection().await?;

        let mut report = SeedReport {
            reset: plan.reset,
            ..SeedReport::default()
        };

        if plan.reset {
            self.reset_collection().await?;
        }

        for record in &plan.records {
            match self.insert_record(record).await? {
                InsertOutcome::Inserted => report.inserted += 1,
                InsertOutcome::Updated => report.updated += 1,
            }
        }

        info!(
            reset = report.reset,
            inserted = report.inserted,
            updated = report.updated,
            "Seeding complete"
        );
        Ok(report)
    }

    /// Ids from `plan` whose stored record is missing or differs from the
    /// plan's copy.
    pub async fn verify(&self, plan: &SeedPlan) -> Result<Vec<String>, StoreError> {
        let mut mismatched = Vec::new();
        for record in &plan.records {
            if self.store.get_record(&record.id).await?.as_ref() != Some(record) {
                mismatched.push(record.id.clone());
            }
        }
        Ok(mismatched)
    }
}
