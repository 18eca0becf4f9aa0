//! Domain model of the platform: the nested content tree
//! (batch → subject → chapter → lecture), scheduled live classes, user
//! profiles and backup records. Shapes mirror the relational schema;
//! snake_case is the canonical field naming on the wire.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoType {
    Youtube,
    Direct,
}

impl VideoType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoType::Youtube => "youtube",
            VideoType::Direct => "direct",
        }
    }

    /// Unknown database values degrade to `Direct` rather than failing the
    /// whole tree load.
    pub fn from_db(value: &str) -> Self {
        match value {
            "youtube" => VideoType::Youtube,
            _ => VideoType::Direct,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiveStatus {
    Scheduled,
    Live,
    Completed,
}

impl LiveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LiveStatus::Scheduled => "scheduled",
            LiveStatus::Live => "live",
            LiveStatus::Completed => "completed",
        }
    }

    pub fn from_db(value: &str) -> Self {
        match value {
            "live" => LiveStatus::Live,
            "completed" => LiveStatus::Completed,
            _ => LiveStatus::Scheduled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    Uploader,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
            Role::Uploader => "uploader",
        }
    }

    pub fn from_db(value: &str) -> Self {
        match value {
            "super_admin" => Role::SuperAdmin,
            "admin" => Role::Admin,
            _ => Role::Uploader,
        }
    }

    /// Whether this role may manage content, users and settings. Uploaders
    /// are limited to adding lectures. UI-level gating only; real
    /// enforcement belongs to the backend's row-level policies.
    pub fn can_manage(&self) -> bool {
        matches!(self, Role::SuperAdmin | Role::Admin)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lecture {
    pub id: Uuid,
    pub chapter_id: Uuid,
    pub title: String,
    pub video_url: String,
    pub video_type: VideoType,
    pub notes_url: Option<String>,
    pub dpp_url: Option<String>,
    pub uploaded_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    pub id: Uuid,
    pub subject_id: Uuid,
    pub title: String,
    pub order_index: i32,
    pub lectures: Vec<Lecture>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: Uuid,
    pub batch_id: Uuid,
    pub name: String,
    pub color: String,
    pub chapters: Vec<Chapter>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub assigned_uploaders: Vec<String>,
    pub subjects: Vec<Subject>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveClass {
    pub id: Uuid,
    pub batch_id: Uuid,
    pub subject_id: Uuid,
    pub chapter_id: Uuid,
    pub title: String,
    pub live_url: String,
    pub scheduled_at: DateTime<Utc>,
    pub status: LiveStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub assigned_batches: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a lecture under a chapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLecture {
    pub title: String,
    pub video_url: String,
    pub video_type: VideoType,
    #[serde(default)]
    pub notes_url: Option<String>,
    #[serde(default)]
    pub dpp_url: Option<String>,
    /// Filled in by the server from the acting identity.
    #[serde(default)]
    pub uploaded_by: String,
}

/// Payload for scheduling a live class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLiveClass {
    pub batch_id: Uuid,
    pub subject_id: Uuid,
    pub chapter_id: Uuid,
    pub title: String,
    pub live_url: String,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default = "default_live_status")]
    pub status: LiveStatus,
}

fn default_live_status() -> LiveStatus {
    LiveStatus::Scheduled
}

/// One coherent view of everything the platform serves: the full content
/// tree plus the live-class schedule. This is what the state containers
/// broadcast after every reload and what backups persist as a JSON blob.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentSnapshot {
    pub batches: Vec<Batch>,
    pub live_classes: Vec<LiveClass>,
}

/// Listing entry for an available backup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupInfo {
    pub id: Uuid,
    pub backup_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_round_trip_their_db_strings() {
        for status in [LiveStatus::Scheduled, LiveStatus::Live, LiveStatus::Completed] {
            assert_eq!(LiveStatus::from_db(status.as_str()), status);
        }
        for role in [Role::SuperAdmin, Role::Admin, Role::Uploader] {
            assert_eq!(Role::from_db(role.as_str()), role);
        }
        assert_eq!(VideoType::from_db("youtube"), VideoType::Youtube);
        assert_eq!(VideoType::from_db("direct"), VideoType::Direct);
        assert_eq!(VideoType::from_db("webm"), VideoType::Direct);
    }

    #[test]
    fn role_permissions() {
        assert!(Role::SuperAdmin.can_manage());
        assert!(Role::Admin.can_manage());
        assert!(!Role::Uploader.can_manage());
    }

    #[test]
    fn serde_uses_snake_case_wire_names() {
        let json = serde_json::to_value(Role::SuperAdmin).unwrap();
        assert_eq!(json, serde_json::json!("super_admin"));
        let status: LiveStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(status, LiveStatus::Completed);
    }

    #[test]
    fn new_live_class_defaults_to_scheduled() {
        let payload: NewLiveClass = serde_json::from_value(serde_json::json!({
            "batch_id": "00000000-0000-0000-0000-000000000001",
            "subject_id": "00000000-0000-0000-0000-000000000002",
            "chapter_id": "00000000-0000-0000-0000-000000000003",
            "title": "Kinematics doubt session",
            "live_url": "https://meet.example/abc",
            "scheduled_at": "2026-09-01T14:30:00Z"
        }))
        .unwrap();
        assert_eq!(payload.status, LiveStatus::Scheduled);
    }
}
