use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::dto::{
    job_listing_dto::{CreateJobListingPayload, UpdateJobListingPayload},
    profile_dto::{CreateProfilePayload, UpdateProfilePayload},
};
use crate::error::Result;
use crate::models::{
    audit_log::{AuditLog, NewAuditLog},
    church::Church,
    interest::{InterestRecord, InterestSide},
    job_listing::{JobListing, JobListingStatus},
    profile::{Profile, ProfileStatus},
};

/// Durable records backing the matching engine.
///
/// Contract every implementation upholds:
/// - lookups by id fail with `Error::NotFound` for unknown ids;
/// - status updates are compare-and-set: they fail with `Error::Conflict`
///   when the stored status no longer equals `expected`;
/// - `create_interest_record` fails with `Error::Conflict` when a record for
///   the same (profile, job listing, side) already exists;
/// - deleting a profile or job listing removes its interest records in the
///   same transaction and returns how many were removed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn get_church(&self, id: Uuid) -> Result<Church>;

    async fn get_profile(&self, id: Uuid) -> Result<Profile>;
    async fn find_profile_by_user(&self, user_id: Uuid) -> Result<Option<Profile>>;
    async fn insert_profile(&self, user_id: Uuid, payload: CreateProfilePayload) -> Result<Profile>;
    async fn update_profile_content(
        &self,
        id: Uuid,
        payload: UpdateProfilePayload,
    ) -> Result<Profile>;
    /// `submitted_at` is only written when the stored value is still empty.
    async fn update_profile_status(
        &self,
        id: Uuid,
        expected: ProfileStatus,
        target: ProfileStatus,
        submitted_at: Option<DateTime<Utc>>,
    ) -> Result<Profile>;
    async fn delete_profile(&self, id: Uuid) -> Result<u64>;
    async fn list_profiles_by_status(&self, status: ProfileStatus) -> Result<Vec<Profile>>;

    async fn get_job_listing(&self, id: Uuid) -> Result<JobListing>;
    async fn insert_job_listing(
        &self,
        church_id: Uuid,
        payload: CreateJobListingPayload,
    ) -> Result<JobListing>;
    async fn update_job_listing_content(
        &self,
        id: Uuid,
        payload: UpdateJobListingPayload,
    ) -> Result<JobListing>;
    async fn update_job_listing_status(
        &self,
        id: Uuid,
        expected: JobListingStatus,
        target: JobListingStatus,
    ) -> Result<JobListing>;
    async fn delete_job_listing(&self, id: Uuid) -> Result<u64>;
    async fn list_job_listings_by_status(&self, status: JobListingStatus)
        -> Result<Vec<JobListing>>;

    async fn get_interest_record(
        &self,
        profile_id: Uuid,
        job_listing_id: Uuid,
        expressed_by: InterestSide,
    ) -> Result<Option<InterestRecord>>;
    async fn create_interest_record(
        &self,
        profile_id: Uuid,
        job_listing_id: Uuid,
        expressed_by: InterestSide,
    ) -> Result<InterestRecord>;
    async fn delete_interest_record(&self, id: Uuid) -> Result<bool>;
    async fn list_interests_for_pair(
        &self,
        profile_id: Uuid,
        job_listing_id: Uuid,
    ) -> Result<Vec<InterestRecord>>;
    async fn list_interests_for_profile(&self, profile_id: Uuid) -> Result<Vec<InterestRecord>>;
    async fn list_interests_for_job_listing(
        &self,
        job_listing_id: Uuid,
    ) -> Result<Vec<InterestRecord>>;
    async fn list_interests_for_church(&self, church_id: Uuid) -> Result<Vec<InterestRecord>>;

    async fn insert_audit_log(&self, entry: NewAuditLog) -> Result<AuditLog>;
}
