use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use super::{InsertMode, InsertOutcome, SensorStore, StoreError};
use crate::db::{self, models::SensorRecord};

/// `sensors` table backed collection.
#[derive(Clone)]
pub struct PgSensorStore {
    pool: PgPool,
    mode: InsertMode,
}

impl PgSensorStore {
    pub fn new(pool: PgPool, mode: InsertMode) -> Self {
        Self { pool, mode }
    }
}

#[async_trait]
impl SensorStore for PgSensorStore {
    async fn ensure_collection(&self) -> Result<(), StoreError> {
        db::run_migrations(&self.pool).await
    }

    async fn reset_collection(&self) -> Result<(), StoreError> {
        sqlx::query("TRUNCATE sensors").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_record(&self, record: &SensorRecord) -> Result<InsertOutcome, StoreError> {
        record.validate()?;

        // `xmax = 0` only holds for a freshly inserted tuple, so it tells an
        // insert apart from a conflict update.
        let sql = match self.mode {
            InsertMode::Strict => {
                r#"
                INSERT INTO sensors
                    (id, serial, geolocation, location, address,
                     state, name, type, description)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                RETURNING (xmax = 0) AS inserted
                "#
            }
            InsertMode::Upsert => {
                r#"
                INSERT INTO sensors
                    (id, serial, geolocation, location, address,
                     state, name, type, description)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                ON CONFLICT (id) DO UPDATE SET
                    serial      = EXCLUDED.serial,
                    geolocation = EXCLUDED.geolocation,
                    location    = EXCLUDED.location,
                    address     = EXCLUDED.address,
                    state       = EXCLUDED.state,
                    name        = EXCLUDED.name,
                    type        = EXCLUDED.type,
                    description = EXCLUDED.description
                RETURNING (xmax = 0) AS inserted
                "#
            }
        };

        let inserted: bool = sqlx::query_scalar(sql)
            .bind(&record.id)
            .bind(&record.serial)
            .bind(&record.geolocation)
            .bind(&record.location)
            .bind(&record.address)
            .bind(record.state)
            .bind(&record.name)
            .bind(record.sensor_type)
            .bind(&record.description)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                    StoreError::DuplicateKey { id: record.id.clone() }
                }
                other => StoreError::Database(other),
            })?;

        debug!(id = %record.id, inserted, "Sensor row written");

        Ok(if inserted {
            InsertOutcome::Inserted
        } else {
            InsertOutcome::Updated
        })
    }

    async fn get_record(&self, id: &str) -> Result<Option<SensorRecord>, StoreError> {
        let record = sqlx::query_as::<_, SensorRecord>(
            r#"
            SELECT id, serial, geolocation, location, address,
                   state, name, type, description
            FROM sensors
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn list_records(&self) -> Result<Vec<SensorRecord>, StoreError> {
        let records = sqlx::query_as::<_, SensorRecord>(
            r#"
            SELECT id, serial, geolocation, location, address,
                   state, name, type, description
            FROM sensors
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sensors")
            .fetch_one(&self.pool)
            .await?;

        Ok(n as usize)
    }
}
