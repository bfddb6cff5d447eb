use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::models::{job_listing::JobListing, profile::Profile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Candidate,
    Church,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Role::Candidate => "candidate",
            Role::Church => "church",
            Role::Admin => "admin",
        };
        f.write_str(label)
    }
}

/// Caller identity supplied by the request layer. The engine never
/// authenticates; it only authorizes against this context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
    pub profile_id: Option<Uuid>,
    pub church_id: Option<Uuid>,
}

impl Actor {
    pub fn candidate(user_id: Uuid, profile_id: Option<Uuid>) -> Self {
        Self {
            user_id,
            role: Role::Candidate,
            profile_id,
            church_id: None,
        }
    }

    pub fn church(user_id: Uuid, church_id: Uuid) -> Self {
        Self {
            user_id,
            role: Role::Church,
            profile_id: None,
            church_id: Some(church_id),
        }
    }

    pub fn admin(user_id: Uuid) -> Self {
        Self {
            user_id,
            role: Role::Admin,
            profile_id: None,
            church_id: None,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn owns_profile(&self, profile: &Profile) -> bool {
        self.role == Role::Candidate && profile.user_id == self.user_id
    }

    pub fn owns_job_listing(&self, listing: &JobListing) -> bool {
        self.role == Role::Church && self.church_id == Some(listing.church_id)
    }
}
