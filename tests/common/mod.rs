#![allow(dead_code)]

use std::sync::Arc;

use ministry_match::{
    database::InMemoryStore,
    dto::{
        job_listing_dto::CreateJobListingPayload, matching_dto::ReviewDecision,
        profile_dto::CreateProfilePayload,
    },
    models::{actor::Actor, job_listing::JobListing, profile::Profile},
    services::matching_service::MatchingService,
};
use uuid::Uuid;

pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub matching: MatchingService<InMemoryStore>,
    pub admin: Actor,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            matching: MatchingService::new(Arc::clone(&store)),
            store,
            admin: Actor::admin(Uuid::new_v4()),
        }
    }

    pub fn church(&self, name: &str) -> Actor {
        let user_id = Uuid::new_v4();
        let church = self.store.add_church(user_id, name).expect("seed church");
        Actor::church(user_id, church.id)
    }

    pub async fn draft_profile(&self, full_name: &str) -> (Actor, Profile) {
        let candidate = Actor::candidate(Uuid::new_v4(), None);
        let profile = self
            .matching
            .create_profile(&candidate, profile_payload(full_name))
            .await
            .expect("create profile");
        let candidate = Actor::candidate(candidate.user_id, Some(profile.id));
        (candidate, profile)
    }

    pub async fn approved_profile(&self, full_name: &str) -> (Actor, Profile) {
        let (candidate, profile) = self.draft_profile(full_name).await;
        self.matching
            .submit_profile(&candidate, profile.id)
            .await
            .expect("submit profile");
        let profile = self
            .matching
            .review_profile(&self.admin, profile.id, ReviewDecision::Approve)
            .await
            .expect("approve profile");
        (candidate, profile)
    }

    pub async fn approved_listing(&self, church: &Actor, title: &str) -> JobListing {
        let listing = self
            .matching
            .create_job_listing(church, listing_payload(title))
            .await
            .expect("create listing");
        self.matching
            .review_job_listing(&self.admin, listing.id, ReviewDecision::Approve)
            .await
            .expect("approve listing")
    }
}

pub fn profile_payload(full_name: &str) -> CreateProfilePayload {
    CreateProfilePayload {
        full_name: full_name.to_string(),
        email: format!("{}@example.org", full_name.to_lowercase().replace(' ', ".")),
        phone: Some("+1 555 0100".to_string()),
        city: Some("Nashville".to_string()),
        region: Some("TN".to_string()),
        ministry_focus: Some("Youth".to_string()),
        bio: None,
        resume_url: None,
        video_url: None,
    }
}

pub fn listing_payload(title: &str) -> CreateJobListingPayload {
    CreateJobListingPayload {
        title: title.to_string(),
        position_type: Some("full_time".to_string()),
        location: Some("Nashville, TN".to_string()),
        description: None,
        requirements: None,
        compensation: None,
    }
}
