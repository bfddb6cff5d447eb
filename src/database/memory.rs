use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::database::store::EntityStore;
use crate::dto::{
    job_listing_dto::{CreateJobListingPayload, UpdateJobListingPayload},
    profile_dto::{CreateProfilePayload, UpdateProfilePayload},
};
use crate::error::{Error, Result};
use crate::models::{
    audit_log::{AuditLog, NewAuditLog},
    church::Church,
    interest::{InterestRecord, InterestSide},
    job_listing::{JobListing, JobListingStatus},
    profile::{Profile, ProfileStatus},
};
use crate::utils::time::now;

/// Process-local store with the same contract as [`PgStore`](super::PgStore).
/// Every operation runs under one lock, which stands in for the transaction
/// boundary the relational store provides.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    churches: HashMap<Uuid, Church>,
    profiles: HashMap<Uuid, Profile>,
    job_listings: HashMap<Uuid, JobListing>,
    interests: HashMap<Uuid, InterestRecord>,
    audit_logs: Vec<AuditLog>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| Error::Internal("in-memory store lock poisoned".to_string()))
    }

    /// Church accounts are issued by the identity layer; this seeds one.
    pub fn add_church(&self, user_id: Uuid, name: &str) -> Result<Church> {
        let church = Church {
            id: Uuid::new_v4(),
            user_id,
            name: name.to_string(),
            denomination: None,
            city: None,
            region: None,
            created_at: now(),
        };
        self.lock()?.churches.insert(church.id, church.clone());
        Ok(church)
    }

    pub fn audit_logs(&self) -> Result<Vec<AuditLog>> {
        Ok(self.lock()?.audit_logs.clone())
    }

    pub fn interest_count(&self) -> Result<usize> {
        Ok(self.lock()?.interests.len())
    }
}

fn newest_first<T, F>(mut items: Vec<T>, key: F) -> Vec<T>
where
    F: Fn(&T) -> DateTime<Utc>,
{
    items.sort_by_key(|item| std::cmp::Reverse(key(item)));
    items
}

fn profile_not_found(id: Uuid) -> Error {
    Error::NotFound(format!("Profile {} not found", id))
}

fn listing_not_found(id: Uuid) -> Error {
    Error::NotFound(format!("Job listing {} not found", id))
}

fn replace_if_some(slot: &mut Option<String>, value: Option<String>) {
    if value.is_some() {
        *slot = value;
    }
}

#[async_trait]
impl EntityStore for InMemoryStore {
    async fn get_church(&self, id: Uuid) -> Result<Church> {
        self.lock()?
            .churches
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Church {} not found", id)))
    }

    async fn get_profile(&self, id: Uuid) -> Result<Profile> {
        self.lock()?
            .profiles
            .get(&id)
            .cloned()
            .ok_or_else(|| profile_not_found(id))
    }

    async fn find_profile_by_user(&self, user_id: Uuid) -> Result<Option<Profile>> {
        Ok(self
            .lock()?
            .profiles
            .values()
            .find(|p| p.user_id == user_id)
            .cloned())
    }

    async fn insert_profile(&self, user_id: Uuid, payload: CreateProfilePayload) -> Result<Profile> {
        let mut tables = self.lock()?;
        if tables.profiles.values().any(|p| p.user_id == user_id) {
            return Err(Error::Conflict(format!(
                "User {} already has a profile",
                user_id
            )));
        }

        let timestamp = now();
        let profile = Profile {
            id: Uuid::new_v4(),
            user_id,
            full_name: payload.full_name,
            email: payload.email,
            phone: payload.phone,
            city: payload.city,
            region: payload.region,
            ministry_focus: payload.ministry_focus,
            bio: payload.bio,
            resume_url: payload.resume_url,
            video_url: payload.video_url,
            status: ProfileStatus::Draft,
            submitted_at: None,
            created_at: timestamp,
            updated_at: timestamp,
        };
        tables.profiles.insert(profile.id, profile.clone());
        Ok(profile)
    }

    async fn update_profile_content(
        &self,
        id: Uuid,
        payload: UpdateProfilePayload,
    ) -> Result<Profile> {
        let mut tables = self.lock()?;
        let profile = tables
            .profiles
            .get_mut(&id)
            .ok_or_else(|| profile_not_found(id))?;

        if let Some(full_name) = payload.full_name {
            profile.full_name = full_name;
        }
        if let Some(email) = payload.email {
            profile.email = email;
        }
        replace_if_some(&mut profile.phone, payload.phone);
        replace_if_some(&mut profile.city, payload.city);
        replace_if_some(&mut profile.region, payload.region);
        replace_if_some(&mut profile.ministry_focus, payload.ministry_focus);
        replace_if_some(&mut profile.bio, payload.bio);
        replace_if_some(&mut profile.resume_url, payload.resume_url);
        replace_if_some(&mut profile.video_url, payload.video_url);
        profile.updated_at = now();

        Ok(profile.clone())
    }

    async fn update_profile_status(
        &self,
        id: Uuid,
        expected: ProfileStatus,
        target: ProfileStatus,
        submitted_at: Option<DateTime<Utc>>,
    ) -> Result<Profile> {
        let mut tables = self.lock()?;
        let profile = tables
            .profiles
            .get_mut(&id)
            .ok_or_else(|| profile_not_found(id))?;

        if profile.status != expected {
            return Err(Error::Conflict(format!(
                "Profile {} is {}, expected {}",
                id, profile.status, expected
            )));
        }

        profile.status = target;
        if profile.submitted_at.is_none() {
            profile.submitted_at = submitted_at;
        }
        profile.updated_at = now();
        Ok(profile.clone())
    }

    async fn delete_profile(&self, id: Uuid) -> Result<u64> {
        let mut tables = self.lock()?;
        if tables.profiles.remove(&id).is_none() {
            return Err(profile_not_found(id));
        }
        let before = tables.interests.len();
        tables.interests.retain(|_, record| record.profile_id != id);
        Ok((before - tables.interests.len()) as u64)
    }

    async fn list_profiles_by_status(&self, status: ProfileStatus) -> Result<Vec<Profile>> {
        let items = self
            .lock()?
            .profiles
            .values()
            .filter(|p| p.status == status)
            .cloned()
            .collect();
        Ok(newest_first(items, |p: &Profile| {
            p.submitted_at.unwrap_or(p.created_at)
        }))
    }

    async fn get_job_listing(&self, id: Uuid) -> Result<JobListing> {
        self.lock()?
            .job_listings
            .get(&id)
            .cloned()
            .ok_or_else(|| listing_not_found(id))
    }

    async fn insert_job_listing(
        &self,
        church_id: Uuid,
        payload: CreateJobListingPayload,
    ) -> Result<JobListing> {
        let mut tables = self.lock()?;
        if !tables.churches.contains_key(&church_id) {
            return Err(Error::NotFound(format!("Church {} not found", church_id)));
        }

        let timestamp = now();
        let listing = JobListing {
            id: Uuid::new_v4(),
            church_id,
            title: payload.title,
            position_type: payload.position_type,
            location: payload.location,
            description: payload.description,
            requirements: payload.requirements,
            compensation: payload.compensation,
            status: JobListingStatus::Pending,
            created_at: timestamp,
            updated_at: timestamp,
        };
        tables.job_listings.insert(listing.id, listing.clone());
        Ok(listing)
    }

    async fn update_job_listing_content(
        &self,
        id: Uuid,
        payload: UpdateJobListingPayload,
    ) -> Result<JobListing> {
        let mut tables = self.lock()?;
        let listing = tables
            .job_listings
            .get_mut(&id)
            .ok_or_else(|| listing_not_found(id))?;

        if let Some(title) = payload.title {
            listing.title = title;
        }
        replace_if_some(&mut listing.position_type, payload.position_type);
        replace_if_some(&mut listing.location, payload.location);
        replace_if_some(&mut listing.description, payload.description);
        replace_if_some(&mut listing.requirements, payload.requirements);
        replace_if_some(&mut listing.compensation, payload.compensation);
        listing.updated_at = now();

        Ok(listing.clone())
    }

    async fn update_job_listing_status(
        &self,
        id: Uuid,
        expected: JobListingStatus,
        target: JobListingStatus,
    ) -> Result<JobListing> {
        let mut tables = self.lock()?;
        let listing = tables
            .job_listings
            .get_mut(&id)
            .ok_or_else(|| listing_not_found(id))?;

        if listing.status != expected {
            return Err(Error::Conflict(format!(
                "Job listing {} is {}, expected {}",
                id, listing.status, expected
            )));
        }

        listing.status = target;
        listing.updated_at = now();
        Ok(listing.clone())
    }

    async fn delete_job_listing(&self, id: Uuid) -> Result<u64> {
        let mut tables = self.lock()?;
        if tables.job_listings.remove(&id).is_none() {
            return Err(listing_not_found(id));
        }
        let before = tables.interests.len();
        tables.interests.retain(|_, record| record.job_listing_id != id);
        Ok((before - tables.interests.len()) as u64)
    }

    async fn list_job_listings_by_status(
        &self,
        status: JobListingStatus,
    ) -> Result<Vec<JobListing>> {
        let items = self
            .lock()?
            .job_listings
            .values()
            .filter(|l| l.status == status)
            .cloned()
            .collect();
        Ok(newest_first(items, |l: &JobListing| l.created_at))
    }

    async fn get_interest_record(
        &self,
        profile_id: Uuid,
        job_listing_id: Uuid,
        expressed_by: InterestSide,
    ) -> Result<Option<InterestRecord>> {
        Ok(self
            .lock()?
            .interests
            .values()
            .find(|r| {
                r.profile_id == profile_id
                    && r.job_listing_id == job_listing_id
                    && r.expressed_by == expressed_by
            })
            .cloned())
    }

    async fn create_interest_record(
        &self,
        profile_id: Uuid,
        job_listing_id: Uuid,
        expressed_by: InterestSide,
    ) -> Result<InterestRecord> {
        let mut tables = self.lock()?;
        if !tables.profiles.contains_key(&profile_id) {
            return Err(profile_not_found(profile_id));
        }
        if !tables.job_listings.contains_key(&job_listing_id) {
            return Err(listing_not_found(job_listing_id));
        }
        let duplicate = tables.interests.values().any(|r| {
            r.profile_id == profile_id
                && r.job_listing_id == job_listing_id
                && r.expressed_by == expressed_by
        });
        if duplicate {
            return Err(Error::Conflict(
                "duplicate key value violates unique constraint \"interest_records_unique_side\""
                    .to_string(),
            ));
        }

        let timestamp = now();
        let record = InterestRecord {
            id: Uuid::new_v4(),
            profile_id,
            job_listing_id,
            expressed_by,
            created_at: timestamp,
            updated_at: timestamp,
        };
        tables.interests.insert(record.id, record.clone());
        Ok(record)
    }

    async fn delete_interest_record(&self, id: Uuid) -> Result<bool> {
        Ok(self.lock()?.interests.remove(&id).is_some())
    }

    async fn list_interests_for_pair(
        &self,
        profile_id: Uuid,
        job_listing_id: Uuid,
    ) -> Result<Vec<InterestRecord>> {
        let items = self
            .lock()?
            .interests
            .values()
            .filter(|r| r.profile_id == profile_id && r.job_listing_id == job_listing_id)
            .cloned()
            .collect();
        Ok(items)
    }

    async fn list_interests_for_profile(&self, profile_id: Uuid) -> Result<Vec<InterestRecord>> {
        let items = self
            .lock()?
            .interests
            .values()
            .filter(|r| r.profile_id == profile_id)
            .cloned()
            .collect();
        Ok(newest_first(items, |r: &InterestRecord| r.created_at))
    }

    async fn list_interests_for_job_listing(
        &self,
        job_listing_id: Uuid,
    ) -> Result<Vec<InterestRecord>> {
        let items = self
            .lock()?
            .interests
            .values()
            .filter(|r| r.job_listing_id == job_listing_id)
            .cloned()
            .collect();
        Ok(newest_first(items, |r: &InterestRecord| r.created_at))
    }

    async fn list_interests_for_church(&self, church_id: Uuid) -> Result<Vec<InterestRecord>> {
        let tables = self.lock()?;
        let items = tables
            .interests
            .values()
            .filter(|r| {
                tables
                    .job_listings
                    .get(&r.job_listing_id)
                    .is_some_and(|l| l.church_id == church_id)
            })
            .cloned()
            .collect();
        Ok(newest_first(items, |r: &InterestRecord| r.created_at))
    }

    async fn insert_audit_log(&self, entry: NewAuditLog) -> Result<AuditLog> {
        let row = AuditLog {
            id: Uuid::new_v4(),
            user_id: entry.user_id,
            action: entry.action,
            entity_type: entry.entity_type,
            entity_id: entry.entity_id,
            changes: entry.changes,
            created_at: now(),
        };
        self.lock()?.audit_logs.push(row.clone());
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(name: &str) -> CreateProfilePayload {
        CreateProfilePayload {
            full_name: name.to_string(),
            email: format!("{}@example.org", name.to_lowercase()),
            phone: None,
            city: None,
            region: None,
            ministry_focus: None,
            bio: None,
            resume_url: None,
            video_url: None,
        }
    }

    fn listing_payload() -> CreateJobListingPayload {
        CreateJobListingPayload {
            title: "Worship Leader".into(),
            position_type: None,
            location: None,
            description: None,
            requirements: None,
            compensation: None,
        }
    }

    #[tokio::test]
    async fn status_update_is_compare_and_set() {
        let store = InMemoryStore::new();
        let profile = store
            .insert_profile(Uuid::new_v4(), payload("Ana"))
            .await
            .expect("insert");

        let stale = store
            .update_profile_status(profile.id, ProfileStatus::Pending, ProfileStatus::Approved, None)
            .await;
        assert!(matches!(stale, Err(Error::Conflict(_))));

        let first_submit = now();
        let submitted = store
            .update_profile_status(
                profile.id,
                ProfileStatus::Draft,
                ProfileStatus::Pending,
                Some(first_submit),
            )
            .await
            .expect("cas succeeds");
        assert_eq!(submitted.status, ProfileStatus::Pending);
        assert_eq!(submitted.submitted_at, Some(first_submit));
    }

    #[tokio::test]
    async fn duplicate_interest_is_a_conflict() {
        let store = InMemoryStore::new();
        let church = store.add_church(Uuid::new_v4(), "Grace").expect("church");
        let profile = store
            .insert_profile(Uuid::new_v4(), payload("Ben"))
            .await
            .expect("profile");
        let listing = store
            .insert_job_listing(church.id, listing_payload())
            .await
            .expect("listing");

        store
            .create_interest_record(profile.id, listing.id, InterestSide::Church)
            .await
            .expect("first insert");
        let second = store
            .create_interest_record(profile.id, listing.id, InterestSide::Church)
            .await;
        assert!(matches!(second, Err(Error::Conflict(_))));

        store
            .create_interest_record(profile.id, listing.id, InterestSide::Candidate)
            .await
            .expect("other side is a distinct key");
        assert_eq!(store.interest_count().expect("count"), 2);
    }

    #[tokio::test]
    async fn deleting_listing_cascades_to_interests() {
        let store = InMemoryStore::new();
        let church = store.add_church(Uuid::new_v4(), "Hope").expect("church");
        let profile = store
            .insert_profile(Uuid::new_v4(), payload("Cy"))
            .await
            .expect("profile");
        let listing = store
            .insert_job_listing(church.id, listing_payload())
            .await
            .expect("listing");
        store
            .create_interest_record(profile.id, listing.id, InterestSide::Candidate)
            .await
            .expect("interest");

        let removed = store.delete_job_listing(listing.id).await.expect("delete");
        assert_eq!(removed, 1);
        assert_eq!(store.interest_count().expect("count"), 0);
        assert!(matches!(
            store.get_job_listing(listing.id).await,
            Err(Error::NotFound(_))
        ));
    }
}
