//! Entry point for the presentation layer. Every operation takes the caller's
//! [`Actor`] and returns plain data records.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::database::store::EntityStore;
use crate::dto::{
    job_listing_dto::{CreateJobListingPayload, UpdateJobListingPayload},
    matching_dto::{
        CandidateCard, CandidateMatch, InterestView, ListingMatch, ReviewDecision, ReviewQueue,
        ToggleAction, ToggleOutcome,
    },
    profile_dto::{CreateProfilePayload, UpdateProfilePayload},
};
use crate::error::{Error, Result};
use crate::models::{
    actor::{Actor, Role},
    interest::{InterestRecord, InterestSide},
    job_listing::{JobListing, JobListingStatus},
    profile::{Profile, ProfileStatus},
};
use crate::services::{
    interest_service::InterestService,
    lifecycle_service::LifecycleService,
    visibility,
};

pub struct MatchingService<S> {
    store: Arc<S>,
    lifecycle: LifecycleService<S>,
    interests: InterestService<S>,
}

impl<S> Clone for MatchingService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            lifecycle: self.lifecycle.clone(),
            interests: self.interests.clone(),
        }
    }
}

/// Own record and mutuality per counterpart id, from one side's perspective.
fn index_own_interest(
    views: Vec<InterestView>,
    own_side: InterestSide,
    key: impl Fn(&InterestRecord) -> Uuid,
) -> HashMap<Uuid, InterestView> {
    views
        .into_iter()
        .filter(|view| view.record.expressed_by == own_side)
        .map(|view| (key(&view.record), view))
        .collect()
}

fn require_church(actor: &Actor) -> Result<Uuid> {
    match (actor.role, actor.church_id) {
        (Role::Church, Some(church_id)) => Ok(church_id),
        _ => Err(Error::Forbidden("Church account required".to_string())),
    }
}

fn require_admin(actor: &Actor) -> Result<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(Error::Forbidden("Admin account required".to_string()))
    }
}

impl<S: EntityStore> MatchingService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            lifecycle: LifecycleService::new(Arc::clone(&store)),
            interests: InterestService::new(Arc::clone(&store)),
            store,
        }
    }

    pub fn lifecycle(&self) -> &LifecycleService<S> {
        &self.lifecycle
    }

    pub fn interests(&self) -> &InterestService<S> {
        &self.interests
    }

    async fn owned_profile(&self, actor: &Actor, profile_id: Uuid) -> Result<Profile> {
        let profile = self.store.get_profile(profile_id).await?;
        if actor.owns_profile(&profile) {
            Ok(profile)
        } else {
            Err(Error::Forbidden(format!(
                "Profile {} belongs to another user",
                profile_id
            )))
        }
    }

    async fn owned_job_listing(&self, actor: &Actor, job_listing_id: Uuid) -> Result<JobListing> {
        let listing = self.store.get_job_listing(job_listing_id).await?;
        if actor.owns_job_listing(&listing) {
            Ok(listing)
        } else {
            Err(Error::Forbidden(format!(
                "Job listing {} belongs to another church",
                job_listing_id
            )))
        }
    }

    /// Approved candidates annotated with the church's own interest for the
    /// selected listing. Contact details ride along for every approved profile.
    pub async fn browse_approved_candidates_for_church(
        &self,
        actor: &Actor,
        selected_job_listing_id: Uuid,
    ) -> Result<Vec<CandidateMatch>> {
        require_church(actor)?;
        let listing = self.owned_job_listing(actor, selected_job_listing_id).await?;

        let profiles = self
            .store
            .list_profiles_by_status(ProfileStatus::Approved)
            .await?;
        let views = self
            .interests
            .list_interests_for_job_listing(listing.id)
            .await?;
        let mut own = index_own_interest(views, InterestSide::Church, |r| r.profile_id);

        let matches = profiles
            .into_iter()
            .filter(visibility::is_profile_visible_to_churches)
            .map(|profile| {
                let include_contact = visibility::can_church_see_contact_info(&profile);
                let view = own.remove(&profile.id);
                CandidateMatch {
                    is_mutual: view.as_ref().is_some_and(|v| v.is_mutual),
                    interest: view.map(|v| v.record),
                    profile: CandidateCard::from_profile(profile, include_contact),
                }
            })
            .collect();
        Ok(matches)
    }

    /// Approved listings annotated with the candidate's own interest.
    pub async fn browse_approved_listings_for_candidate(
        &self,
        actor: &Actor,
        profile_id: Uuid,
    ) -> Result<Vec<ListingMatch>> {
        let profile = self.owned_profile(actor, profile_id).await?;

        let listings = self
            .store
            .list_job_listings_by_status(JobListingStatus::Approved)
            .await?;
        let views = self
            .interests
            .list_interests_for_profile(profile.id)
            .await?;
        let mut own = index_own_interest(views, InterestSide::Candidate, |r| r.job_listing_id);

        let matches = listings
            .into_iter()
            .filter(visibility::is_listing_visible_to_candidates)
            .map(|listing| {
                let view = own.remove(&listing.id);
                ListingMatch {
                    is_mutual: view.as_ref().is_some_and(|v| v.is_mutual),
                    interest: view.map(|v| v.record),
                    listing,
                }
            })
            .collect();
        Ok(matches)
    }

    /// Expresses the church's interest when absent, withdraws it when present.
    pub async fn toggle_church_interest(
        &self,
        actor: &Actor,
        profile_id: Uuid,
        job_listing_id: Uuid,
    ) -> Result<ToggleOutcome> {
        require_church(actor)?;
        self.toggle(actor, InterestSide::Church, profile_id, job_listing_id)
            .await
    }

    pub async fn toggle_candidate_interest(
        &self,
        actor: &Actor,
        profile_id: Uuid,
        job_listing_id: Uuid,
    ) -> Result<ToggleOutcome> {
        if actor.role != Role::Candidate {
            return Err(Error::Forbidden("Candidate account required".to_string()));
        }
        self.toggle(actor, InterestSide::Candidate, profile_id, job_listing_id)
            .await
    }

    async fn toggle(
        &self,
        actor: &Actor,
        side: InterestSide,
        profile_id: Uuid,
        job_listing_id: Uuid,
    ) -> Result<ToggleOutcome> {
        let existing = self
            .store
            .get_interest_record(profile_id, job_listing_id, side)
            .await?;

        let outcome = if existing.is_some() {
            self.interests
                .withdraw_interest(actor, profile_id, job_listing_id)
                .await?;
            ToggleOutcome {
                action: ToggleAction::Withdrawn,
                interest: None,
                is_mutual: false,
            }
        } else {
            let view = self
                .interests
                .express_interest(actor, profile_id, job_listing_id)
                .await?;
            ToggleOutcome {
                action: ToggleAction::Expressed,
                is_mutual: view.is_mutual,
                interest: Some(view.record),
            }
        };

        info!(
            %profile_id,
            %job_listing_id,
            %side,
            action = ?outcome.action,
            is_mutual = outcome.is_mutual,
            "Interest toggled"
        );
        Ok(outcome)
    }

    pub async fn candidate_interests(
        &self,
        actor: &Actor,
        profile_id: Uuid,
    ) -> Result<Vec<InterestView>> {
        let profile = self.owned_profile(actor, profile_id).await?;
        self.interests.list_interests_for_profile(profile.id).await
    }

    pub async fn church_interests(&self, actor: &Actor) -> Result<Vec<InterestView>> {
        let church_id = require_church(actor)?;
        self.interests.list_interests_for_church(church_id).await
    }

    pub async fn job_listing_interests(
        &self,
        actor: &Actor,
        job_listing_id: Uuid,
    ) -> Result<Vec<InterestView>> {
        let listing = self.store.get_job_listing(job_listing_id).await?;
        if !visibility::can_manage_listing(actor, &listing) {
            return Err(Error::Forbidden(format!(
                "Job listing {} belongs to another church",
                job_listing_id
            )));
        }
        self.interests
            .list_interests_for_job_listing(listing.id)
            .await
    }

    pub async fn is_mutual(&self, profile_id: Uuid, job_listing_id: Uuid) -> Result<bool> {
        self.interests.is_mutual(profile_id, job_listing_id).await
    }

    pub async fn review_queue(&self, actor: &Actor) -> Result<ReviewQueue> {
        require_admin(actor)?;
        let profiles = self
            .store
            .list_profiles_by_status(ProfileStatus::Pending)
            .await?;
        let job_listings = self
            .store
            .list_job_listings_by_status(JobListingStatus::Pending)
            .await?;
        Ok(ReviewQueue {
            profiles,
            job_listings,
        })
    }

    pub async fn create_profile(
        &self,
        actor: &Actor,
        payload: CreateProfilePayload,
    ) -> Result<Profile> {
        self.lifecycle.create_profile(actor, payload).await
    }

    pub async fn update_profile(
        &self,
        actor: &Actor,
        profile_id: Uuid,
        payload: UpdateProfilePayload,
    ) -> Result<Profile> {
        self.lifecycle
            .update_profile(actor, profile_id, payload)
            .await
    }

    pub async fn submit_profile(&self, actor: &Actor, profile_id: Uuid) -> Result<Profile> {
        let profile = self.store.get_profile(profile_id).await?;
        self.lifecycle
            .transition_profile(&profile, ProfileStatus::Pending, actor)
            .await
    }

    pub async fn reset_profile_to_draft(&self, actor: &Actor, profile_id: Uuid) -> Result<Profile> {
        let profile = self.store.get_profile(profile_id).await?;
        self.lifecycle
            .transition_profile(&profile, ProfileStatus::Draft, actor)
            .await
    }

    /// Rejection leaves existing interest records in place; it only blocks
    /// new ones while the profile is not approved.
    pub async fn review_profile(
        &self,
        actor: &Actor,
        profile_id: Uuid,
        decision: ReviewDecision,
    ) -> Result<Profile> {
        let target = match decision {
            ReviewDecision::Approve => ProfileStatus::Approved,
            ReviewDecision::Reject => ProfileStatus::Rejected,
        };
        let profile = self.store.get_profile(profile_id).await?;
        self.lifecycle
            .transition_profile(&profile, target, actor)
            .await
    }

    pub async fn delete_profile(&self, actor: &Actor, profile_id: Uuid) -> Result<u64> {
        self.lifecycle.delete_profile(actor, profile_id).await
    }

    pub async fn create_job_listing(
        &self,
        actor: &Actor,
        payload: CreateJobListingPayload,
    ) -> Result<JobListing> {
        self.lifecycle.create_job_listing(actor, payload).await
    }

    pub async fn update_job_listing(
        &self,
        actor: &Actor,
        job_listing_id: Uuid,
        payload: UpdateJobListingPayload,
    ) -> Result<JobListing> {
        self.lifecycle
            .update_job_listing(actor, job_listing_id, payload)
            .await
    }

    pub async fn resubmit_job_listing(
        &self,
        actor: &Actor,
        job_listing_id: Uuid,
    ) -> Result<JobListing> {
        let listing = self.store.get_job_listing(job_listing_id).await?;
        self.lifecycle
            .transition_job_listing(&listing, JobListingStatus::Pending, actor)
            .await
    }

    pub async fn review_job_listing(
        &self,
        actor: &Actor,
        job_listing_id: Uuid,
        decision: ReviewDecision,
    ) -> Result<JobListing> {
        let target = match decision {
            ReviewDecision::Approve => JobListingStatus::Approved,
            ReviewDecision::Reject => JobListingStatus::Rejected,
        };
        let listing = self.store.get_job_listing(job_listing_id).await?;
        self.lifecycle
            .transition_job_listing(&listing, target, actor)
            .await
    }

    pub async fn delete_job_listing(&self, actor: &Actor, job_listing_id: Uuid) -> Result<u64> {
        self.lifecycle
            .delete_job_listing(actor, job_listing_id)
            .await
    }
}
