//! Interest records between candidate profiles and job listings, one per
//! side, and the mutuality derived from them.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::database::store::EntityStore;
use crate::dto::matching_dto::InterestView;
use crate::error::{Error, Result};
use crate::models::{
    actor::{Actor, Role},
    interest::{InterestRecord, InterestSide},
    job_listing::JobListing,
    profile::Profile,
};
use crate::services::visibility;

/// Create attempts before a duplicate-key race is reported as a failure.
/// The second attempt only runs when the winning row was withdrawn between
/// our conflict and the re-read.
const MAX_CREATE_ATTEMPTS: usize = 2;

/// The side an actor expresses interest for. Admins have no side.
pub fn side_for(actor: &Actor) -> Result<InterestSide> {
    match actor.role {
        Role::Candidate => Ok(InterestSide::Candidate),
        Role::Church => Ok(InterestSide::Church),
        Role::Admin => Err(Error::Forbidden(
            "Admins cannot express or withdraw interest".to_string(),
        )),
    }
}

/// Annotates each record with mutuality. `records` must contain both sides
/// of every pair it mentions, which holds for any per-profile, per-listing or
/// per-church projection.
pub fn annotate(records: Vec<InterestRecord>) -> Vec<InterestView> {
    let present: HashSet<(Uuid, Uuid, InterestSide)> = records
        .iter()
        .map(|r| (r.profile_id, r.job_listing_id, r.expressed_by))
        .collect();

    records
        .into_iter()
        .map(|record| {
            let is_mutual = present.contains(&(
                record.profile_id,
                record.job_listing_id,
                record.expressed_by.opposite(),
            ));
            InterestView { record, is_mutual }
        })
        .collect()
}

fn authorize_side(
    actor: &Actor,
    side: InterestSide,
    profile: &Profile,
    listing: &JobListing,
) -> Result<()> {
    let allowed = match side {
        InterestSide::Candidate => actor.owns_profile(profile),
        InterestSide::Church => actor.owns_job_listing(listing),
    };
    if allowed {
        Ok(())
    } else {
        Err(Error::Forbidden(format!(
            "{} does not own this side of profile {} / job listing {}",
            actor.role, profile.id, listing.id
        )))
    }
}

pub struct InterestService<S> {
    store: Arc<S>,
}

impl<S> Clone for InterestService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: EntityStore> InterestService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    async fn load_pair(&self, profile_id: Uuid, job_listing_id: Uuid) -> Result<(Profile, JobListing)> {
        let profile = self.store.get_profile(profile_id).await?;
        let listing = self.store.get_job_listing(job_listing_id).await?;
        Ok((profile, listing))
    }

    /// Records the actor's interest in the pair. Repeating the call returns
    /// the existing record instead of failing, including when an identical
    /// concurrent request wins the insert.
    pub async fn express_interest(
        &self,
        actor: &Actor,
        profile_id: Uuid,
        job_listing_id: Uuid,
    ) -> Result<InterestView> {
        let side = side_for(actor)?;
        let (profile, listing) = self.load_pair(profile_id, job_listing_id).await?;
        authorize_side(actor, side, &profile, &listing)?;

        if !visibility::is_profile_visible_to_churches(&profile) {
            return Err(Error::NotEligible(format!(
                "Profile {} is {} and not open for interest",
                profile.id, profile.status
            )));
        }
        if !visibility::is_listing_visible_to_candidates(&listing) {
            return Err(Error::NotEligible(format!(
                "Job listing {} is {} and not open for interest",
                listing.id, listing.status
            )));
        }

        let record = self.find_or_create(profile_id, job_listing_id, side).await?;
        let is_mutual = self
            .store
            .get_interest_record(profile_id, job_listing_id, side.opposite())
            .await?
            .is_some();

        if is_mutual {
            info!(%profile_id, %job_listing_id, "Mutual interest established");
        }
        Ok(InterestView { record, is_mutual })
    }

    async fn find_or_create(
        &self,
        profile_id: Uuid,
        job_listing_id: Uuid,
        side: InterestSide,
    ) -> Result<InterestRecord> {
        for _ in 0..MAX_CREATE_ATTEMPTS {
            if let Some(existing) = self
                .store
                .get_interest_record(profile_id, job_listing_id, side)
                .await?
            {
                debug!(interest_id = %existing.id, %side, "Interest already expressed");
                return Ok(existing);
            }

            match self
                .store
                .create_interest_record(profile_id, job_listing_id, side)
                .await
            {
                Ok(record) => {
                    info!(
                        interest_id = %record.id,
                        %profile_id,
                        %job_listing_id,
                        %side,
                        "Interest expressed"
                    );
                    return Ok(record);
                }
                Err(Error::Conflict(_)) => {
                    debug!(%profile_id, %job_listing_id, %side, "Absorbed duplicate interest insert");
                }
                Err(e) => return Err(e),
            }
        }

        warn!(%profile_id, %job_listing_id, %side, "Interest record kept flapping during create");
        Err(Error::Internal(format!(
            "Could not settle {} interest for profile {} / job listing {}",
            side, profile_id, job_listing_id
        )))
    }

    /// Deletes the actor's record for the pair. Returns `false` when there was
    /// nothing to withdraw.
    pub async fn withdraw_interest(
        &self,
        actor: &Actor,
        profile_id: Uuid,
        job_listing_id: Uuid,
    ) -> Result<bool> {
        let side = side_for(actor)?;
        let (profile, listing) = self.load_pair(profile_id, job_listing_id).await?;
        authorize_side(actor, side, &profile, &listing)?;

        let Some(record) = self
            .store
            .get_interest_record(profile_id, job_listing_id, side)
            .await?
        else {
            debug!(%profile_id, %job_listing_id, %side, "Nothing to withdraw");
            return Ok(false);
        };

        let removed = self.store.delete_interest_record(record.id).await?;
        info!(interest_id = %record.id, %side, removed, "Interest withdrawn");
        Ok(removed)
    }

    pub async fn is_mutual(&self, profile_id: Uuid, job_listing_id: Uuid) -> Result<bool> {
        let records = self
            .store
            .list_interests_for_pair(profile_id, job_listing_id)
            .await?;
        let has = |side| records.iter().any(|r| r.expressed_by == side);
        Ok(has(InterestSide::Candidate) && has(InterestSide::Church))
    }

    pub async fn list_interests_for_profile(&self, profile_id: Uuid) -> Result<Vec<InterestView>> {
        let records = self.store.list_interests_for_profile(profile_id).await?;
        Ok(annotate(records))
    }

    pub async fn list_interests_for_job_listing(
        &self,
        job_listing_id: Uuid,
    ) -> Result<Vec<InterestView>> {
        let records = self
            .store
            .list_interests_for_job_listing(job_listing_id)
            .await?;
        Ok(annotate(records))
    }

    pub async fn list_interests_for_church(&self, church_id: Uuid) -> Result<Vec<InterestView>> {
        let records = self.store.list_interests_for_church(church_id).await?;
        Ok(annotate(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::store::MockEntityStore;
    use crate::models::{job_listing::JobListingStatus, profile::ProfileStatus};
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn approved_profile(owner: Uuid) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            user_id: owner,
            full_name: "Faith Mendez".into(),
            email: "faith@example.org".into(),
            phone: None,
            city: None,
            region: None,
            ministry_focus: None,
            bio: None,
            resume_url: None,
            video_url: None,
            status: ProfileStatus::Approved,
            submitted_at: Some(Utc::now()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn approved_listing(church_id: Uuid) -> JobListing {
        JobListing {
            id: Uuid::new_v4(),
            church_id,
            title: "Associate Pastor".into(),
            position_type: None,
            location: None,
            description: None,
            requirements: None,
            compensation: None,
            status: JobListingStatus::Approved,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn record(profile_id: Uuid, job_listing_id: Uuid, side: InterestSide) -> InterestRecord {
        InterestRecord {
            id: Uuid::new_v4(),
            profile_id,
            job_listing_id,
            expressed_by: side,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn annotate_flags_only_pairs_with_both_sides() {
        let (p1, p2, l) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let views = annotate(vec![
            record(p1, l, InterestSide::Church),
            record(p1, l, InterestSide::Candidate),
            record(p2, l, InterestSide::Church),
        ]);

        for view in views {
            assert_eq!(view.is_mutual, view.record.profile_id == p1);
        }
    }

    #[test]
    fn admins_have_no_interest_side() {
        assert!(matches!(
            side_for(&Actor::admin(Uuid::new_v4())),
            Err(Error::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn duplicate_key_race_returns_the_winning_record() {
        let church_id = Uuid::new_v4();
        let profile = approved_profile(Uuid::new_v4());
        let listing = approved_listing(church_id);
        let winner = record(profile.id, listing.id, InterestSide::Church);

        let mut store = MockEntityStore::new();
        let p = profile.clone();
        store.expect_get_profile().returning(move |_| Ok(p.clone()));
        let l = listing.clone();
        store.expect_get_job_listing().returning(move |_| Ok(l.clone()));

        let church_reads = Arc::new(AtomicUsize::new(0));
        let w = winner.clone();
        store
            .expect_get_interest_record()
            .returning(move |_, _, side| match side {
                InterestSide::Candidate => Ok(None),
                InterestSide::Church => {
                    if church_reads.fetch_add(1, Ordering::SeqCst) == 0 {
                        Ok(None)
                    } else {
                        Ok(Some(w.clone()))
                    }
                }
            });
        store
            .expect_create_interest_record()
            .times(1)
            .returning(|_, _, _| {
                Err(Error::Conflict(
                    "duplicate key value violates unique constraint".into(),
                ))
            });

        let service = InterestService::new(Arc::new(store));
        let church = Actor::church(Uuid::new_v4(), church_id);

        let view = service
            .express_interest(&church, profile.id, listing.id)
            .await
            .expect("race is absorbed");
        assert_eq!(view.record.id, winner.id);
        assert!(!view.is_mutual);
    }

    #[tokio::test]
    async fn store_failures_other_than_conflict_propagate() {
        let church_id = Uuid::new_v4();
        let profile = approved_profile(Uuid::new_v4());
        let listing = approved_listing(church_id);

        let mut store = MockEntityStore::new();
        let p = profile.clone();
        store.expect_get_profile().returning(move |_| Ok(p.clone()));
        let l = listing.clone();
        store.expect_get_job_listing().returning(move |_| Ok(l.clone()));
        store
            .expect_get_interest_record()
            .returning(|_, _, _| Ok(None));
        store
            .expect_create_interest_record()
            .times(1)
            .returning(|_, _, _| Err(Error::Internal("connection reset".into())));

        let service = InterestService::new(Arc::new(store));
        let church = Actor::church(Uuid::new_v4(), church_id);

        let result = service
            .express_interest(&church, profile.id, listing.id)
            .await;
        assert!(matches!(result, Err(Error::Internal(_))));
    }
}
