use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Which party created an interest record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "interest_side", rename_all = "snake_case")]
pub enum InterestSide {
    Candidate,
    Church,
}

impl InterestSide {
    pub const fn label(self) -> &'static str {
        match self {
            InterestSide::Candidate => "candidate",
            InterestSide::Church => "church",
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            InterestSide::Candidate => InterestSide::Church,
            InterestSide::Church => InterestSide::Candidate,
        }
    }
}

impl fmt::Display for InterestSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One-sided declaration of interest over a (profile, job listing) pair.
/// At most one record exists per (profile, job listing, side).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct InterestRecord {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub job_listing_id: Uuid,
    pub expressed_by: InterestSide,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
