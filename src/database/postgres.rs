use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
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

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityStore for PgStore {
    async fn get_church(&self, id: Uuid) -> Result<Church> {
        let church = sqlx::query_as::<_, Church>("SELECT * FROM churches WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        church.ok_or_else(|| Error::NotFound(format!("Church {} not found", id)))
    }

    async fn get_profile(&self, id: Uuid) -> Result<Profile> {
        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        profile.ok_or_else(|| Error::NotFound(format!("Profile {} not found", id)))
    }

    async fn find_profile_by_user(&self, user_id: Uuid) -> Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    async fn insert_profile(&self, user_id: Uuid, payload: CreateProfilePayload) -> Result<Profile> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (
                user_id, full_name, email, phone, city, region,
                ministry_focus, bio, resume_url, video_url, status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'draft')
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&payload.full_name)
        .bind(&payload.email)
        .bind(&payload.phone)
        .bind(&payload.city)
        .bind(&payload.region)
        .bind(&payload.ministry_focus)
        .bind(&payload.bio)
        .bind(&payload.resume_url)
        .bind(&payload.video_url)
        .fetch_one(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn update_profile_content(
        &self,
        id: Uuid,
        payload: UpdateProfilePayload,
    ) -> Result<Profile> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET
                full_name = COALESCE($2, full_name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                city = COALESCE($5, city),
                region = COALESCE($6, region),
                ministry_focus = COALESCE($7, ministry_focus),
                bio = COALESCE($8, bio),
                resume_url = COALESCE($9, resume_url),
                video_url = COALESCE($10, video_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.full_name)
        .bind(&payload.email)
        .bind(&payload.phone)
        .bind(&payload.city)
        .bind(&payload.region)
        .bind(&payload.ministry_focus)
        .bind(&payload.bio)
        .bind(&payload.resume_url)
        .bind(&payload.video_url)
        .fetch_optional(&self.pool)
        .await?;
        profile.ok_or_else(|| Error::NotFound(format!("Profile {} not found", id)))
    }

    async fn update_profile_status(
        &self,
        id: Uuid,
        expected: ProfileStatus,
        target: ProfileStatus,
        submitted_at: Option<DateTime<Utc>>,
    ) -> Result<Profile> {
        let updated = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET status = $3,
                submitted_at = COALESCE(submitted_at, $4),
                updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(expected)
        .bind(target)
        .bind(submitted_at)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(profile) => Ok(profile),
            None => {
                let current = self.get_profile(id).await?;
                Err(Error::Conflict(format!(
                    "Profile {} is {}, expected {}",
                    id, current.status, expected
                )))
            }
        }
    }

    async fn delete_profile(&self, id: Uuid) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM interest_records WHERE profile_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let deleted = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Profile {} not found", id)));
        }

        tx.commit().await?;
        Ok(removed)
    }

    async fn list_profiles_by_status(&self, status: ProfileStatus) -> Result<Vec<Profile>> {
        let items = sqlx::query_as::<_, Profile>(
            r#"
            SELECT * FROM profiles
            WHERE status = $1
            ORDER BY COALESCE(submitted_at, created_at) DESC
            "#,
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn get_job_listing(&self, id: Uuid) -> Result<JobListing> {
        let listing = sqlx::query_as::<_, JobListing>("SELECT * FROM job_listings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        listing.ok_or_else(|| Error::NotFound(format!("Job listing {} not found", id)))
    }

    async fn insert_job_listing(
        &self,
        church_id: Uuid,
        payload: CreateJobListingPayload,
    ) -> Result<JobListing> {
        let listing = sqlx::query_as::<_, JobListing>(
            r#"
            INSERT INTO job_listings (
                church_id, title, position_type, location,
                description, requirements, compensation, status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending')
            RETURNING *
            "#,
        )
        .bind(church_id)
        .bind(&payload.title)
        .bind(&payload.position_type)
        .bind(&payload.location)
        .bind(&payload.description)
        .bind(&payload.requirements)
        .bind(&payload.compensation)
        .fetch_one(&self.pool)
        .await?;
        Ok(listing)
    }

    async fn update_job_listing_content(
        &self,
        id: Uuid,
        payload: UpdateJobListingPayload,
    ) -> Result<JobListing> {
        let listing = sqlx::query_as::<_, JobListing>(
            r#"
            UPDATE job_listings
            SET
                title = COALESCE($2, title),
                position_type = COALESCE($3, position_type),
                location = COALESCE($4, location),
                description = COALESCE($5, description),
                requirements = COALESCE($6, requirements),
                compensation = COALESCE($7, compensation),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.title)
        .bind(&payload.position_type)
        .bind(&payload.location)
        .bind(&payload.description)
        .bind(&payload.requirements)
        .bind(&payload.compensation)
        .fetch_optional(&self.pool)
        .await?;
        listing.ok_or_else(|| Error::NotFound(format!("Job listing {} not found", id)))
    }

    async fn update_job_listing_status(
        &self,
        id: Uuid,
        expected: JobListingStatus,
        target: JobListingStatus,
    ) -> Result<JobListing> {
        let updated = sqlx::query_as::<_, JobListing>(
            r#"
            UPDATE job_listings
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(expected)
        .bind(target)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(listing) => Ok(listing),
            None => {
                let current = self.get_job_listing(id).await?;
                Err(Error::Conflict(format!(
                    "Job listing {} is {}, expected {}",
                    id, current.status, expected
                )))
            }
        }
    }

    async fn delete_job_listing(&self, id: Uuid) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM interest_records WHERE job_listing_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let deleted = sqlx::query("DELETE FROM job_listings WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Job listing {} not found", id)));
        }

        tx.commit().await?;
        Ok(removed)
    }

    async fn list_job_listings_by_status(
        &self,
        status: JobListingStatus,
    ) -> Result<Vec<JobListing>> {
        let items = sqlx::query_as::<_, JobListing>(
            "SELECT * FROM job_listings WHERE status = $1 ORDER BY created_at DESC",
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn get_interest_record(
        &self,
        profile_id: Uuid,
        job_listing_id: Uuid,
        expressed_by: InterestSide,
    ) -> Result<Option<InterestRecord>> {
        let record = sqlx::query_as::<_, InterestRecord>(
            r#"
            SELECT * FROM interest_records
            WHERE profile_id = $1 AND job_listing_id = $2 AND expressed_by = $3
            "#,
        )
        .bind(profile_id)
        .bind(job_listing_id)
        .bind(expressed_by)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn create_interest_record(
        &self,
        profile_id: Uuid,
        job_listing_id: Uuid,
        expressed_by: InterestSide,
    ) -> Result<InterestRecord> {
        // A duplicate (profile, listing, side) surfaces as Error::Conflict via
        // the unique-violation mapping in `From<sqlx::Error>`.
        let record = sqlx::query_as::<_, InterestRecord>(
            r#"
            INSERT INTO interest_records (profile_id, job_listing_id, expressed_by)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(profile_id)
        .bind(job_listing_id)
        .bind(expressed_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(record)
    }

    async fn delete_interest_record(&self, id: Uuid) -> Result<bool> {
        let res = sqlx::query("DELETE FROM interest_records WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn list_interests_for_pair(
        &self,
        profile_id: Uuid,
        job_listing_id: Uuid,
    ) -> Result<Vec<InterestRecord>> {
        let items = sqlx::query_as::<_, InterestRecord>(
            "SELECT * FROM interest_records WHERE profile_id = $1 AND job_listing_id = $2",
        )
        .bind(profile_id)
        .bind(job_listing_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn list_interests_for_profile(&self, profile_id: Uuid) -> Result<Vec<InterestRecord>> {
        let items = sqlx::query_as::<_, InterestRecord>(
            "SELECT * FROM interest_records WHERE profile_id = $1 ORDER BY created_at DESC",
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn list_interests_for_job_listing(
        &self,
        job_listing_id: Uuid,
    ) -> Result<Vec<InterestRecord>> {
        let items = sqlx::query_as::<_, InterestRecord>(
            "SELECT * FROM interest_records WHERE job_listing_id = $1 ORDER BY created_at DESC",
        )
        .bind(job_listing_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn list_interests_for_church(&self, church_id: Uuid) -> Result<Vec<InterestRecord>> {
        let items = sqlx::query_as::<_, InterestRecord>(
            r#"
            SELECT ir.*
            FROM interest_records ir
            JOIN job_listings jl ON jl.id = ir.job_listing_id
            WHERE jl.church_id = $1
            ORDER BY ir.created_at DESC
            "#,
        )
        .bind(church_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn insert_audit_log(&self, entry: NewAuditLog) -> Result<AuditLog> {
        let row = sqlx::query_as::<_, AuditLog>(
            r#"
            INSERT INTO audit_logs (user_id, action, entity_type, entity_id, changes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(entry.user_id)
        .bind(&entry.action)
        .bind(&entry.entity_type)
        .bind(entry.entity_id)
        .bind(&entry.changes)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}
