//! Status lifecycle for candidate profiles and church job listings.
//!
//! Each entity has a single authoritative edge table. Authority is checked
//! first (who may move an entity into the target state), then the edge, then
//! the store applies the change as a compare-and-set so that concurrent
//! reviewers serialize: the loser observes `InvalidTransition` from the
//! state the winner left behind.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::database::store::EntityStore;
use crate::dto::{
    job_listing_dto::{CreateJobListingPayload, UpdateJobListingPayload},
    profile_dto::{CreateProfilePayload, UpdateProfilePayload},
};
use crate::error::{Error, Result};
use crate::models::{
    actor::{Actor, Role},
    job_listing::{JobListing, JobListingStatus},
    profile::{Profile, ProfileStatus},
};
use crate::services::audit_service::AuditService;
use crate::services::visibility;
use crate::utils::{time::now, validation::validate};

/// Allowed profile edges. Every non-draft state may be reset to draft.
const PROFILE_EDGES: &[(ProfileStatus, ProfileStatus)] = &[
    (ProfileStatus::Draft, ProfileStatus::Pending),
    (ProfileStatus::Rejected, ProfileStatus::Pending),
    (ProfileStatus::Pending, ProfileStatus::Approved),
    (ProfileStatus::Pending, ProfileStatus::Rejected),
    (ProfileStatus::Pending, ProfileStatus::Draft),
    (ProfileStatus::Approved, ProfileStatus::Draft),
    (ProfileStatus::Rejected, ProfileStatus::Draft),
];

const JOB_LISTING_EDGES: &[(JobListingStatus, JobListingStatus)] = &[
    (JobListingStatus::Pending, JobListingStatus::Approved),
    (JobListingStatus::Pending, JobListingStatus::Rejected),
    (JobListingStatus::Rejected, JobListingStatus::Pending),
];

pub fn is_profile_edge(from: ProfileStatus, to: ProfileStatus) -> bool {
    PROFILE_EDGES.contains(&(from, to))
}

pub fn is_job_listing_edge(from: JobListingStatus, to: JobListingStatus) -> bool {
    JOB_LISTING_EDGES.contains(&(from, to))
}

fn profile_transition_error(from: ProfileStatus, to: ProfileStatus) -> Error {
    Error::InvalidTransition {
        entity: "profile",
        from: from.to_string(),
        to: to.to_string(),
    }
}

fn job_listing_transition_error(from: JobListingStatus, to: JobListingStatus) -> Error {
    Error::InvalidTransition {
        entity: "job listing",
        from: from.to_string(),
        to: to.to_string(),
    }
}

fn authorize_profile_transition(
    profile: &Profile,
    target: ProfileStatus,
    actor: &Actor,
) -> Result<()> {
    let allowed = match target {
        ProfileStatus::Pending => actor.owns_profile(profile),
        ProfileStatus::Draft => actor.owns_profile(profile) || actor.is_admin(),
        ProfileStatus::Approved | ProfileStatus::Rejected => actor.is_admin(),
    };
    if allowed {
        Ok(())
    } else {
        Err(Error::Forbidden(format!(
            "{} may not move profile {} to {}",
            actor.role, profile.id, target
        )))
    }
}

fn authorize_job_listing_transition(
    listing: &JobListing,
    target: JobListingStatus,
    actor: &Actor,
) -> Result<()> {
    let allowed = match target {
        JobListingStatus::Pending => actor.owns_job_listing(listing),
        JobListingStatus::Approved | JobListingStatus::Rejected => actor.is_admin(),
    };
    if allowed {
        Ok(())
    } else {
        Err(Error::Forbidden(format!(
            "{} may not move job listing {} to {}",
            actor.role, listing.id, target
        )))
    }
}

pub struct LifecycleService<S> {
    store: Arc<S>,
    audit: AuditService<S>,
}

impl<S> Clone for LifecycleService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            audit: self.audit.clone(),
        }
    }
}

impl<S: EntityStore> LifecycleService<S> {
    pub fn new(store: Arc<S>) -> Self {
        let audit = AuditService::new(Arc::clone(&store));
        Self { store, audit }
    }

    pub async fn transition_profile(
        &self,
        profile: &Profile,
        target: ProfileStatus,
        actor: &Actor,
    ) -> Result<Profile> {
        authorize_profile_transition(profile, target, actor)?;
        if !is_profile_edge(profile.status, target) {
            return Err(profile_transition_error(profile.status, target));
        }

        let submitted_at =
            (target == ProfileStatus::Pending && profile.submitted_at.is_none()).then(now);

        match self
            .store
            .update_profile_status(profile.id, profile.status, target, submitted_at)
            .await
        {
            Ok(updated) => {
                info!(
                    profile_id = %profile.id,
                    from = %profile.status,
                    to = %target,
                    role = %actor.role,
                    "Profile transition applied"
                );
                self.audit
                    .record_transition(
                        actor,
                        "profile",
                        profile.id,
                        profile.status.label(),
                        target.label(),
                    )
                    .await;
                Ok(updated)
            }
            Err(Error::Conflict(_)) => {
                let current = self.store.get_profile(profile.id).await?;
                warn!(
                    profile_id = %profile.id,
                    expected = %profile.status,
                    actual = %current.status,
                    "Profile transition lost to a concurrent change"
                );
                Err(profile_transition_error(current.status, target))
            }
            Err(e) => Err(e),
        }
    }

    pub async fn transition_job_listing(
        &self,
        listing: &JobListing,
        target: JobListingStatus,
        actor: &Actor,
    ) -> Result<JobListing> {
        authorize_job_listing_transition(listing, target, actor)?;
        if !is_job_listing_edge(listing.status, target) {
            return Err(job_listing_transition_error(listing.status, target));
        }

        match self
            .store
            .update_job_listing_status(listing.id, listing.status, target)
            .await
        {
            Ok(updated) => {
                info!(
                    job_listing_id = %listing.id,
                    from = %listing.status,
                    to = %target,
                    role = %actor.role,
                    "Job listing transition applied"
                );
                self.audit
                    .record_transition(
                        actor,
                        "job_listing",
                        listing.id,
                        listing.status.label(),
                        target.label(),
                    )
                    .await;
                Ok(updated)
            }
            Err(Error::Conflict(_)) => {
                let current = self.store.get_job_listing(listing.id).await?;
                warn!(
                    job_listing_id = %listing.id,
                    expected = %listing.status,
                    actual = %current.status,
                    "Job listing transition lost to a concurrent change"
                );
                Err(job_listing_transition_error(current.status, target))
            }
            Err(e) => Err(e),
        }
    }

    /// Profiles start as drafts, one per candidate account.
    pub async fn create_profile(
        &self,
        actor: &Actor,
        payload: CreateProfilePayload,
    ) -> Result<Profile> {
        if actor.role != Role::Candidate {
            return Err(Error::Forbidden(
                "Only candidates can create a profile".to_string(),
            ));
        }
        validate(&payload)?;

        if self.store.find_profile_by_user(actor.user_id).await?.is_some() {
            return Err(Error::Conflict(format!(
                "User {} already has a profile",
                actor.user_id
            )));
        }

        let profile = self.store.insert_profile(actor.user_id, payload).await?;
        info!(profile_id = %profile.id, user_id = %actor.user_id, "Profile created");
        Ok(profile)
    }

    pub async fn update_profile(
        &self,
        actor: &Actor,
        profile_id: Uuid,
        payload: UpdateProfilePayload,
    ) -> Result<Profile> {
        validate(&payload)?;
        let profile = self.store.get_profile(profile_id).await?;
        if !actor.owns_profile(&profile) {
            return Err(Error::Forbidden(format!(
                "Profile {} belongs to another user",
                profile_id
            )));
        }
        self.store.update_profile_content(profile_id, payload).await
    }

    /// Removes the profile and, in the same store transaction, every interest
    /// record that references it. Returns the number of interests removed.
    pub async fn delete_profile(&self, actor: &Actor, profile_id: Uuid) -> Result<u64> {
        let profile = self.store.get_profile(profile_id).await?;
        if !visibility::can_manage_profile(actor, &profile) {
            return Err(Error::Forbidden(format!(
                "{} may not delete profile {}",
                actor.role, profile_id
            )));
        }

        let removed = self.store.delete_profile(profile_id).await?;
        info!(%profile_id, interests_removed = removed, "Profile deleted");
        Ok(removed)
    }

    /// Listings are created complete and enter review immediately.
    pub async fn create_job_listing(
        &self,
        actor: &Actor,
        payload: CreateJobListingPayload,
    ) -> Result<JobListing> {
        let church_id = match (actor.role, actor.church_id) {
            (Role::Church, Some(church_id)) => church_id,
            _ => {
                return Err(Error::Forbidden(
                    "Only churches can post job listings".to_string(),
                ))
            }
        };
        validate(&payload)?;

        let church = self.store.get_church(church_id).await?;
        let listing = self.store.insert_job_listing(church.id, payload).await?;
        info!(job_listing_id = %listing.id, church_id = %church.id, "Job listing created");
        Ok(listing)
    }

    pub async fn update_job_listing(
        &self,
        actor: &Actor,
        job_listing_id: Uuid,
        payload: UpdateJobListingPayload,
    ) -> Result<JobListing> {
        validate(&payload)?;
        let listing = self.store.get_job_listing(job_listing_id).await?;
        if !actor.owns_job_listing(&listing) {
            return Err(Error::Forbidden(format!(
                "Job listing {} belongs to another church",
                job_listing_id
            )));
        }
        self.store
            .update_job_listing_content(job_listing_id, payload)
            .await
    }

    pub async fn delete_job_listing(&self, actor: &Actor, job_listing_id: Uuid) -> Result<u64> {
        let listing = self.store.get_job_listing(job_listing_id).await?;
        if !visibility::can_manage_listing(actor, &listing) {
            return Err(Error::Forbidden(format!(
                "{} may not delete job listing {}",
                actor.role, job_listing_id
            )));
        }

        let removed = self.store.delete_job_listing(job_listing_id).await?;
        info!(%job_listing_id, interests_removed = removed, "Job listing deleted");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::store::MockEntityStore;
    use chrono::Utc;

    const ALL_PROFILE_STATES: [ProfileStatus; 4] = [
        ProfileStatus::Draft,
        ProfileStatus::Pending,
        ProfileStatus::Approved,
        ProfileStatus::Rejected,
    ];

    fn profile(owner: Uuid, status: ProfileStatus) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            user_id: owner,
            full_name: "Eli Brooks".into(),
            email: "eli@example.org".into(),
            phone: None,
            city: None,
            region: None,
            ministry_focus: None,
            bio: None,
            resume_url: None,
            video_url: None,
            status,
            submitted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn draft_never_jumps_straight_to_a_review_outcome() {
        assert!(!is_profile_edge(ProfileStatus::Draft, ProfileStatus::Approved));
        assert!(!is_profile_edge(ProfileStatus::Draft, ProfileStatus::Rejected));
        assert!(!is_profile_edge(ProfileStatus::Approved, ProfileStatus::Pending));
        assert!(!is_profile_edge(ProfileStatus::Rejected, ProfileStatus::Approved));
    }

    #[test]
    fn same_state_requests_are_not_edges() {
        for status in ALL_PROFILE_STATES {
            assert!(!is_profile_edge(status, status), "{status} -> {status}");
        }
    }

    #[test]
    fn every_state_except_draft_resets_to_draft() {
        for status in ALL_PROFILE_STATES {
            let expected = status != ProfileStatus::Draft;
            assert_eq!(is_profile_edge(status, ProfileStatus::Draft), expected);
        }
    }

    #[test]
    fn listings_have_no_path_back_from_approved() {
        assert!(is_job_listing_edge(
            JobListingStatus::Pending,
            JobListingStatus::Approved
        ));
        assert!(!is_job_listing_edge(
            JobListingStatus::Approved,
            JobListingStatus::Pending
        ));
        assert!(!is_job_listing_edge(
            JobListingStatus::Approved,
            JobListingStatus::Rejected
        ));
    }

    #[test]
    fn candidates_cannot_review_their_own_profile() {
        let owner = Uuid::new_v4();
        let candidate = Actor::candidate(owner, None);
        let pending = profile(owner, ProfileStatus::Pending);

        assert!(matches!(
            authorize_profile_transition(&pending, ProfileStatus::Approved, &candidate),
            Err(Error::Forbidden(_))
        ));
        assert!(
            authorize_profile_transition(&pending, ProfileStatus::Draft, &candidate).is_ok()
        );
    }

    #[test]
    fn admins_cannot_submit_on_behalf_of_candidates() {
        let draft = profile(Uuid::new_v4(), ProfileStatus::Draft);
        let admin = Actor::admin(Uuid::new_v4());
        assert!(matches!(
            authorize_profile_transition(&draft, ProfileStatus::Pending, &admin),
            Err(Error::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn concurrent_review_loser_sees_invalid_transition() {
        let pending = profile(Uuid::new_v4(), ProfileStatus::Pending);
        let mut approved = pending.clone();
        approved.status = ProfileStatus::Approved;

        let mut store = MockEntityStore::new();
        store
            .expect_update_profile_status()
            .times(1)
            .returning(|_, _, _, _| Err(Error::Conflict("stale".into())));
        store
            .expect_get_profile()
            .times(1)
            .returning(move |_| Ok(approved.clone()));

        let service = LifecycleService::new(Arc::new(store));
        let admin = Actor::admin(Uuid::new_v4());

        match service
            .transition_profile(&pending, ProfileStatus::Rejected, &admin)
            .await
        {
            Err(Error::InvalidTransition { from, to, .. }) => {
                assert_eq!(from, "approved");
                assert_eq!(to, "rejected");
            }
            other => panic!("expected invalid transition, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn audit_failure_does_not_fail_the_transition() {
        let owner = Uuid::new_v4();
        let draft = profile(owner, ProfileStatus::Draft);
        let mut submitted = draft.clone();
        submitted.status = ProfileStatus::Pending;
        submitted.submitted_at = Some(Utc::now());

        let mut store = MockEntityStore::new();
        store
            .expect_update_profile_status()
            .withf(|_, expected, target, submitted_at| {
                *expected == ProfileStatus::Draft
                    && *target == ProfileStatus::Pending
                    && submitted_at.is_some()
            })
            .times(1)
            .returning(move |_, _, _, _| Ok(submitted.clone()));
        store
            .expect_insert_audit_log()
            .times(1)
            .returning(|_| Err(Error::Internal("audit table unavailable".into())));

        let service = LifecycleService::new(Arc::new(store));
        let candidate = Actor::candidate(owner, Some(draft.id));

        let updated = service
            .transition_profile(&draft, ProfileStatus::Pending, &candidate)
            .await
            .expect("transition succeeds despite audit failure");
        assert_eq!(updated.status, ProfileStatus::Pending);
    }
}
