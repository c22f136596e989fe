use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::{seed::SeedSet, store::InsertMode};

#[derive(Debug, Clone)]
pub struct Config {
    /// Required unless `dry_run` is set.
    pub database_url: Option<String>,
    /// Name of the database the connection must land in.
    pub database_name: String,
    pub seed_set: SeedSet,
    /// Overrides the seed set's own reset behaviour when present.
    pub reset: Option<bool>,
    pub insert_mode: InsertMode,
    /// Seed an in-memory collection and print it instead of touching Postgres.
    pub dry_run: bool,
    pub connect_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let optional = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());

        let dry_run = parse_bool(&optional("SEED_DRY_RUN", "false"))
            .context("SEED_DRY_RUN must be true or false")?;

        let database_url = lookup("DATABASE_URL");
        if database_url.is_none() && !dry_run {
            bail!("missing required env var: DATABASE_URL");
        }

        let reset = lookup("SEED_RESET")
            .map(|v| parse_bool(&v))
            .transpose()
            .context("SEED_RESET must be true or false")?;

        Ok(Self {
            database_url,
            database_name: optional("SEED_DATABASE", "flaskapis"),
            seed_set: optional("SEED_SET", "initial")
                .parse()
                .context("SEED_SET must be 'initial' or 'relocation'")?,
            reset,
            insert_mode: optional("SEED_INSERT_MODE", "strict")
                .parse()
                .context("SEED_INSERT_MODE must be 'strict' or 'upsert'")?,
            dry_run,
            connect_timeout: parse_timeout_secs(&optional("DB_CONNECT_TIMEOUT_SECS", "5"))
                .context("DB_CONNECT_TIMEOUT_SECS must be an integer between 1 and 3600")?,
        })
    }
}

const MAX_CONNECT_TIMEOUT_SECS: u64 = 3600;

fn parse_timeout_secs(raw: &str) -> Result<Duration> {
    let secs: u64 = raw.trim().parse().with_context(|| format!("not an integer: {raw:?}"))?;
    if !(1..=MAX_CONNECT_TIMEOUT_SECS).contains(&secs) {
        bail!("timeout out of range: {secs}");
    }
    Ok(Duration::from_secs(secs))
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => bail!("not a boolean: {other:?}"),
    }
}
