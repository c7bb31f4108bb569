//! Secret resolution for the collector
//!
//! Secrets resolve Database → ENV → TOML:
//! 1. `settings` table, key lowercased (`london_prayer_times_api`)
//! 2. environment variable, key verbatim (`LONDON_PRAYER_TIMES_API`)
//! 3. TOML `[secrets]` table, key verbatim
//!
//! Empty or whitespace-only values count as absent at every tier.

use async_trait::async_trait;
use ptt_common::{Error, Result};
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::{info, warn};

/// Key-value secret lookup
#[async_trait]
pub trait SecretsProvider: Send + Sync {
    async fn get(&self, key: &str) -> Result<String>;
}

/// Database → ENV → TOML secret resolution
pub struct LayeredSecrets {
    db: SqlitePool,
    toml_secrets: HashMap<String, String>,
}

impl LayeredSecrets {
    pub fn new(db: SqlitePool, toml_secrets: HashMap<String, String>) -> Self {
        Self { db, toml_secrets }
    }
}

#[async_trait]
impl SecretsProvider for LayeredSecrets {
    async fn get(&self, key: &str) -> Result<String> {
        let db_value = crate::db::settings::get_setting(&self.db, &key.to_lowercase())
            .await?
            .filter(|v| is_valid_secret(v));
        let env_value = std::env::var(key).ok().filter(|v| is_valid_secret(v));
        let toml_value = self
            .toml_secrets
            .get(key)
            .filter(|v| is_valid_secret(v))
            .cloned();

        let sources: Vec<&str> = [
            ("database", db_value.is_some()),
            ("environment", env_value.is_some()),
            ("TOML", toml_value.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect();

        if sources.len() > 1 {
            warn!(
                "{} found in multiple sources: {}. Using {} (highest priority).",
                key,
                sources.join(", "),
                sources[0]
            );
        }

        match db_value.or(env_value).or(toml_value) {
            Some(value) => {
                info!("{} loaded from {}", key, sources[0]);
                Ok(value)
            }
            None => Err(Error::Config(format!(
                "{} not configured. Set one of:\n\
                 1. Database: settings key '{}'\n\
                 2. Environment: {}=<value>\n\
                 3. TOML config: [secrets] {} = \"<value>\"",
                key,
                key.to_lowercase(),
                key,
                key
            ))),
        }
    }
}

/// Non-empty, non-whitespace
pub fn is_valid_secret(value: &str) -> bool {
    !value.trim().is_empty()
}
