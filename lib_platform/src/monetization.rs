//! Administrator-configured monetization settings driving the access gate:
//! how long a granted flag stays valid and which "original" URLs the
//! key-generation page advertises for the two verification servers.
//!
//! Persisted as one row in the `settings` table under [`MONETIZATION_KEY`],
//! snake_case fields, last write wins. Absent or unreadable settings fall
//! back to [`MonetizationConfig::default`] silently.

use serde::{Deserialize, Serialize};

use crate::access::validity_label;

/// Fixed `settings.key` under which the monetization config is stored.
pub const MONETIZATION_KEY: &str = "monetization";

/// Default validity window: one hour.
pub const DEFAULT_ACCESS_DURATION: u64 = 3600;

/// Closed set of selectable validity durations, in seconds:
/// 30 min, 1 h, 6 h, 12 h, 24 h, 3 d, 7 d. The settings endpoint rejects
/// anything outside this set; free-text durations are not accepted.
pub const ACCESS_DURATION_CHOICES: [u64; 7] =
    [1800, 3600, 21600, 43200, 86400, 259200, 604800];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonetizationConfig {
    /// Validity of the `verified`/`ads` cookie flags, in seconds.
    pub access_duration: u64,
    /// Original long URL behind the "Server 1" choice, to be shortened by
    /// the operator through LinkShortify out of band.
    pub server1_url: String,
    /// Original long URL behind the "Server 2" choice.
    pub server2_url: String,
    pub linkshortify_enabled: bool,
}

impl Default for MonetizationConfig {
    fn default() -> Self {
        Self {
            access_duration: DEFAULT_ACCESS_DURATION,
            server1_url: "https://your-domain.com/verify?server=1&redirect=set-verified"
                .to_string(),
            server2_url: "https://your-domain.com/verify?server=2&redirect=set-verified"
                .to_string(),
            linkshortify_enabled: true,
        }
    }
}

impl MonetizationConfig {
    /// Reads a config out of the stored `settings.value` JSON. Unknown or
    /// missing fields take their defaults; a value that does not
    /// deserialize at all yields the full default config. Never errors —
    /// a broken settings row must not break the key-generation page.
    pub fn from_value(value: serde_json::Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }

    /// JSON value as persisted in `settings.value`.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("monetization config serializes")
    }

    /// Validates an edit before persisting it.
    pub fn validate(&self) -> Result<(), String> {
        if !ACCESS_DURATION_CHOICES.contains(&self.access_duration) {
            return Err(format!(
                "access_duration {} is not one of the allowed values {:?}",
                self.access_duration, ACCESS_DURATION_CHOICES
            ));
        }
        Ok(())
    }

    /// Human label for the configured duration ("30 minutes", "6 hours",
    /// "3 days"), shared by the key-generation page and the settings panel.
    pub fn duration_label(&self) -> String {
        validity_label(self.access_duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn round_trips_through_stored_json() {
        let config = MonetizationConfig {
            access_duration: 21600,
            server1_url: "https://edu.example/v1".to_string(),
            server2_url: "https://edu.example/v2".to_string(),
            linkshortify_enabled: false,
        };

        let reloaded = MonetizationConfig::from_value(config.to_value());
        assert_eq!(reloaded, config);
    }

    #[test]
    fn absent_fields_fall_back_to_defaults() {
        let partial = MonetizationConfig::from_value(json!({ "access_duration": 86400 }));
        assert_eq!(partial.access_duration, 86400);
        assert_eq!(partial.server1_url, MonetizationConfig::default().server1_url);
        assert!(partial.linkshortify_enabled);

        let garbage = MonetizationConfig::from_value(json!("not an object"));
        assert_eq!(garbage, MonetizationConfig::default());
    }

    #[test]
    fn validation_enforces_the_closed_duration_set() {
        let mut config = MonetizationConfig::default();
        for secs in ACCESS_DURATION_CHOICES {
            config.access_duration = secs;
            assert!(config.validate().is_ok(), "{} should be allowed", secs);
        }

        config.access_duration = 1234;
        assert!(config.validate().is_err());
        config.access_duration = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn duration_label_matches_gate_formatting() {
        let mut config = MonetizationConfig::default();
        assert_eq!(config.duration_label(), "1 hours");
        config.access_duration = 259200;
        assert_eq!(config.duration_label(), "3 days");
    }
}
