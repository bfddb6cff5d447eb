use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Review state of a church job listing. Listings are submitted complete,
/// so there is no draft state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "job_listing_status", rename_all = "snake_case")]
pub enum JobListingStatus {
    Pending,
    Approved,
    Rejected,
}

impl JobListingStatus {
    pub const fn label(self) -> &'static str {
        match self {
            JobListingStatus::Pending => "pending",
            JobListingStatus::Approved => "approved",
            JobListingStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for JobListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct JobListing {
    pub id: Uuid,
    pub church_id: Uuid,
    pub title: String,
    pub position_type: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub compensation: Option<String>,
    pub status: JobListingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobListing {
    pub fn is_approved(&self) -> bool {
        self.status == JobListingStatus::Approved
    }
}
