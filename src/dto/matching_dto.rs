use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    interest::InterestRecord,
    job_listing::JobListing,
    profile::{Profile, ProfileStatus},
};

/// An interest record annotated with whether the opposite side has also
/// expressed interest in the same pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestView {
    #[serde(flatten)]
    pub record: InterestRecord,
    pub is_mutual: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: String,
    pub phone: Option<String>,
}

/// Church-facing projection of a candidate profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateCard {
    pub id: Uuid,
    pub full_name: String,
    pub city: Option<String>,
    pub region: Option<String>,
    pub ministry_focus: Option<String>,
    pub bio: Option<String>,
    pub resume_url: Option<String>,
    pub video_url: Option<String>,
    pub status: ProfileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<ContactInfo>,
    pub submitted_at: Option<DateTime<Utc>>,
}

impl CandidateCard {
    pub fn from_profile(profile: Profile, include_contact: bool) -> Self {
        let contact = include_contact.then(|| ContactInfo {
            email: profile.email.clone(),
            phone: profile.phone.clone(),
        });
        Self {
            id: profile.id,
            full_name: profile.full_name,
            city: profile.city,
            region: profile.region,
            ministry_focus: profile.ministry_focus,
            bio: profile.bio,
            resume_url: profile.resume_url,
            video_url: profile.video_url,
            status: profile.status,
            contact,
            submitted_at: profile.submitted_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateMatch {
    pub profile: CandidateCard,
    /// The church's own interest record for the selected listing.
    pub interest: Option<InterestRecord>,
    pub is_mutual: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingMatch {
    pub listing: JobListing,
    /// The candidate's own interest record for this listing.
    pub interest: Option<InterestRecord>,
    pub is_mutual: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleAction {
    Expressed,
    Withdrawn,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToggleOutcome {
    pub action: ToggleAction,
    pub interest: Option<InterestRecord>,
    pub is_mutual: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewQueue {
    pub profiles: Vec<Profile>,
    pub job_listings: Vec<JobListing>,
}
