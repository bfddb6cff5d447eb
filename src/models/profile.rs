use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Review state of a candidate profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "profile_status", rename_all = "snake_case")]
pub enum ProfileStatus {
    Draft,
    Pending,
    Approved,
    Rejected,
}

impl ProfileStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ProfileStatus::Draft => "draft",
            ProfileStatus::Pending => "pending",
            ProfileStatus::Approved => "approved",
            ProfileStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ProfileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub ministry_focus: Option<String>,
    pub bio: Option<String>,
    pub resume_url: Option<String>,
    pub video_url: Option<String>,
    pub status: ProfileStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn is_approved(&self) -> bool {
        self.status == ProfileStatus::Approved
    }
}
