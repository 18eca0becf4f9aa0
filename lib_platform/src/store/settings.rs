//! Key/value settings. Each setting is one row; writes are single upserts,
//! so a save is atomic and last write wins.

use super::{Store, StoreError};
use crate::monetization::{MonetizationConfig, MONETIZATION_KEY};

impl Store {
    pub async fn get_setting(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        let client = self.client().await?;
        let row = client
            .query_opt("SELECT value FROM settings WHERE key = $1", &[&key])
            .await?;
        Ok(row.map(|r| r.get("value")))
    }

    pub async fn put_setting(
        &self,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<(), StoreError> {
        let client = self.client().await?;
        client
            .execute(
                "INSERT INTO settings (key, value) VALUES ($1, $2) \
                 ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = now()",
                &[&key, &value],
            )
            .await?;
        Ok(())
    }

    /// Effective monetization config. A missing or undecodable settings
    /// row yields the defaults silently; the gate pages must never fail
    /// over configuration.
    pub async fn monetization_config(&self) -> MonetizationConfig {
        match self.get_setting(MONETIZATION_KEY).await {
            Ok(Some(value)) => MonetizationConfig::from_value(value),
            Ok(None) => MonetizationConfig::default(),
            Err(e) => {
                tracing::warn!("failed to load monetization settings, using defaults: {}", e);
                MonetizationConfig::default()
            }
        }
    }

    pub async fn save_monetization_config(
        &self,
        config: &MonetizationConfig,
    ) -> Result<(), StoreError> {
        self.put_setting(MONETIZATION_KEY, &config.to_value()).await
    }
}
