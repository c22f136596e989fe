mod config;
mod db;
mod seed;
mod store;

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::{
    config::Config,
    seed::{SeedPlan, Seeder},
    store::{MemorySensorStore, PgSensorStore, SensorStore},
};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine, the environment may already be set.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    let plan = SeedPlan::new(config.seed_set, config.reset);
    info!(
        seed_set = %config.seed_set,
        reset = plan.reset,
        insert_mode = %config.insert_mode,
        dry_run = config.dry_run,
        "Seeding sensors"
    );

    run(&config, &plan).await
}

async fn run(config: &Config, plan: &SeedPlan) -> Result<()> {
    if config.dry_run {
        let seeder = Seeder::new(MemorySensorStore::new(config.insert_mode));
        seeder.run(plan).await?;

        let docs = seeder.store().list_records().await?;
        println!("{}", serde_json::to_string_pretty(&docs)?);
        return Ok(());
    }

    let url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL is required outside dry runs")?;
    let pool = db::create_pool(url, config.connect_timeout).await?;
    db::select_database(&pool, &config.database_name).await?;
    info!(database = %config.database_name, "Database ready");

    let seeder = Seeder::new(PgSensorStore::new(pool.clone(), config.insert_mode));
    seeder.run(plan).await?;

    let mismatched = seeder.verify(plan).await?;
    if !mismatched.is_empty() {
        bail!("seeded sensors not found as written: {mismatched:?}");
    }

    pool.close().await;
    Ok(())
}
