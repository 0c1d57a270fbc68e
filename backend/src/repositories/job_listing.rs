use sqlx::PgExecutor;

use crate::models::job_listing::{CreateJobListingRequest, JobListing, JobListingStatus};
use crate::types::{JobListingId, OrganizationId};

const JOB_LISTING_COLUMNS: &str = "id, organization_id, title, description, wage, wage_interval, \
     state_abbreviation, city, is_featured, location_requirement, experience_level, job_type, \
     status, posted_at, created_at, updated_at";

pub async fn insert_job_listing<'e, E>(
    executor: E,
    id: JobListingId,
    organization_id: OrganizationId,
    payload: &CreateJobListingRequest,
) -> Result<JobListing, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        r#"
        INSERT INTO job_listings
            (id, organization_id, title, description, wage, wage_interval,
             state_abbreviation, city, location_requirement, experience_level, job_type, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING {JOB_LISTING_COLUMNS}
        "#
    );
    sqlx::query_as::<_, JobListing>(&sql)
        .bind(id)
        .bind(organization_id)
        .bind(payload.title.trim())
        .bind(&payload.description)
        .bind(payload.wage)
        .bind(payload.wage_interval)
        .bind(payload.state_abbreviation.as_deref())
        .bind(payload.city.as_deref())
        .bind(payload.location_requirement)
        .bind(payload.experience_level)
        .bind(payload.job_type)
        .bind(JobListingStatus::Draft)
        .fetch_one(executor)
        .await
}

pub async fn list_job_listings<'e, E>(
    executor: E,
    organization_id: OrganizationId,
    limit: i64,
    offset: i64,
) -> Result<Vec<JobListing>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        r#"
        SELECT {JOB_LISTING_COLUMNS}
        FROM job_listings
        WHERE organization_id = $1
        ORDER BY created_at DESC, id DESC
        LIMIT $2 OFFSET $3
        "#
    );
    sqlx::query_as::<_, JobListing>(&sql)
        .bind(organization_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(executor)
        .await
}

pub async fn count_job_listings<'e, E>(
    executor: E,
    organization_id: OrganizationId,
) -> Result<i64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM job_listings WHERE organization_id = $1")
        .bind(organization_id)
        .fetch_one(executor)
        .await
}

/// Published listings only; unlisted and draft ones never count against a plan.
pub async fn count_published_job_listings<'e, E>(
    executor: E,
    organization_id: OrganizationId,
) -> Result<i64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM job_listings WHERE organization_id = $1 AND status = $2",
    )
    .bind(organization_id)
    .bind(JobListingStatus::Published)
    .fetch_one(executor)
    .await
}

pub async fn find_job_listing<'e, E>(
    executor: E,
    organization_id: OrganizationId,
    id: JobListingId,
) -> Result<Option<JobListing>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "SELECT {JOB_LISTING_COLUMNS} FROM job_listings WHERE id = $1 AND organization_id = $2"
    );
    sqlx::query_as::<_, JobListing>(&sql)
        .bind(id)
        .bind(organization_id)
        .fetch_optional(executor)
        .await
}

pub async fn find_published_job_listing<'e, E>(
    executor: E,
    id: JobListingId,
) -> Result<Option<JobListing>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql =
        format!("SELECT {JOB_LISTING_COLUMNS} FROM job_listings WHERE id = $1 AND status = $2");
    sqlx::query_as::<_, JobListing>(&sql)
        .bind(id)
        .bind(JobListingStatus::Published)
        .fetch_optional(executor)
        .await
}

/// Rewrites the editable fields of a listing. Status and `posted_at` are left alone.
pub async fn update_job_listing<'e, E>(
    executor: E,
    organization_id: OrganizationId,
    id: JobListingId,
    payload: &CreateJobListingRequest,
) -> Result<Option<JobListing>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        r#"
        UPDATE job_listings
        SET title = $1,
            description = $2,
            wage = $3,
            wage_interval = $4,
            state_abbreviation = $5,
            city = $6,
            location_requirement = $7,
            experience_level = $8,
            job_type = $9,
            updated_at = NOW()
        WHERE id = $10 AND organization_id = $11
        RETURNING {JOB_LISTING_COLUMNS}
        "#
    );
    sqlx::query_as::<_, JobListing>(&sql)
        .bind(payload.title.trim())
        .bind(&payload.description)
        .bind(payload.wage)
        .bind(payload.wage_interval)
        .bind(payload.state_abbreviation.as_deref())
        .bind(payload.city.as_deref())
        .bind(payload.location_requirement)
        .bind(payload.experience_level)
        .bind(payload.job_type)
        .bind(id)
        .bind(organization_id)
        .fetch_optional(executor)
        .await
}

/// Sets the status of a listing; `posted_at` is stamped the first time it is published.
pub async fn update_job_listing_status<'e, E>(
    executor: E,
    organization_id: OrganizationId,
    id: JobListingId,
    status: JobListingStatus,
) -> Result<Option<JobListing>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        r#"
        UPDATE job_listings
        SET status = $1,
            posted_at = CASE
                WHEN $1 = 'PUBLISHED'::job_listing_status AND posted_at IS NULL THEN NOW()
                ELSE posted_at
            END,
            updated_at = NOW()
        WHERE id = $2 AND organization_id = $3
        RETURNING {JOB_LISTING_COLUMNS}
        "#
    );
    sqlx::query_as::<_, JobListing>(&sql)
        .bind(status)
        .bind(id)
        .bind(organization_id)
        .fetch_optional(executor)
        .await
}

pub async fn delete_job_listing<'e, E>(
    executor: E,
    organization_id: OrganizationId,
    id: JobListingId,
) -> Result<bool, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM job_listings WHERE id = $1 AND organization_id = $2")
        .bind(id)
        .bind(organization_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}
