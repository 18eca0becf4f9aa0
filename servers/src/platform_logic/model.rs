use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use lib_platform::models::{LiveStatus, Role};
use lib_platform::monetization::MonetizationConfig;

#[derive(Debug, Deserialize)]
pub struct CreateBatchPayload {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateBatchPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub assigned_uploaders: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSubjectPayload {
    pub name: String,
    #[serde(default = "default_subject_color")]
    pub color: String,
}

fn default_subject_color() -> String {
    "bg-blue-500".to_string()
}

#[derive(Debug, Deserialize)]
pub struct CreateChapterPayload {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateLiveStatusPayload {
    pub status: LiveStatus,
}

#[derive(Debug, Deserialize)]
pub struct SignInPayload {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserPayload {
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub assigned_batches: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserPayload {
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub assigned_batches: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct RestorePayload {
    pub restore_date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct IdResponse {
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct BackupCreated {
    pub backup_date: NaiveDate,
}

/// Monetization settings as the admin panel sees them: the stored fields
/// plus the human label for the configured duration.
#[derive(Debug, Serialize)]
pub struct MonetizationView {
    #[serde(flatten)]
    pub config: MonetizationConfig,
    pub duration_label: String,
}

impl From<MonetizationConfig> for MonetizationView {
    fn from(config: MonetizationConfig) -> Self {
        let duration_label = config.duration_label();
        Self {
            config,
            duration_label,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monetization_view_flattens_config_fields() {
        let view = MonetizationView::from(MonetizationConfig::default());
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["access_duration"], 3600);
        assert_eq!(json["duration_label"], "1 hours");
        assert!(json["server1_url"].is_string());
    }

    #[test]
    fn partial_update_payloads_default_missing_fields() {
        let payload: UpdateBatchPayload = serde_json::from_str(r#"{ "name": "JEE 2027" }"#).unwrap();
        assert_eq!(payload.name.as_deref(), Some("JEE 2027"));
        assert!(payload.description.is_none());
        assert!(payload.assigned_uploaders.is_none());
    }
}
