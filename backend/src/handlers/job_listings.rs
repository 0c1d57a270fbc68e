use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    error::AppError,
    middleware::session::Viewer,
    models::{
        job_listing::{
            CreateJobListingRequest, JobListing, PublishedCount, PublishedJobListing,
            UpdateJobListingStatusRequest,
        },
        PaginatedResponse, PaginationQuery,
    },
    repositories::{job_listing as job_listing_repo, organization as organization_repo},
    services::permissions::{
        JOB_LISTING_CHANGE_STATUS, JOB_LISTING_DELETE, JOB_LISTING_LIST, JOB_LISTING_READ,
        JOB_LISTING_UPDATE, JOB_LISTING_WRITE,
    },
    state::AppState,
    types::{JobListingId, OrganizationId},
};

fn listing_not_found() -> AppError {
    AppError::NotFound("Job listing not found".into())
}

pub async fn list_job_listings(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path(org_id): Path<OrganizationId>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<JobListing>>, AppError> {
    state
        .permissions
        .authorize(
            viewer.user.id,
            org_id,
            JOB_LISTING_LIST,
            Some("You cannot view job listings"),
        )
        .await?;

    let (limit, offset) = (query.limit(), query.offset());
    let listings = job_listing_repo::list_job_listings(&state.pool, org_id, limit, offset).await?;
    let total = job_listing_repo::count_job_listings(&state.pool, org_id).await?;
    Ok(Json(PaginatedResponse::new(listings, total, limit, offset)))
}

pub async fn published_job_listings_count(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path(org_id): Path<OrganizationId>,
) -> Result<Json<PublishedCount>, AppError> {
    state
        .permissions
        .authorize(
            viewer.user.id,
            org_id,
            JOB_LISTING_LIST,
            Some("You cannot view job listings"),
        )
        .await?;
    let count = job_listing_repo::count_published_job_listings(&state.pool, org_id).await?;
    Ok(Json(PublishedCount { count }))
}

pub async fn create_job_listing(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path(org_id): Path<OrganizationId>,
    Json(payload): Json<CreateJobListingRequest>,
) -> Result<impl IntoResponse, AppError> {
    state
        .permissions
        .authorize(
            viewer.user.id,
            org_id,
            JOB_LISTING_WRITE,
            Some("You cannot create job listings"),
        )
        .await?;
    payload.validate()?;

    let listing = job_listing_repo::insert_job_listing(
        &state.pool,
        JobListingId::generate(&state.ids),
        org_id,
        &payload,
    )
    .await?;
    tracing::info!(
        job_listing_id = %listing.id,
        organization_id = %org_id,
        "job listing created"
    );
    Ok((StatusCode::CREATED, Json(listing)))
}

pub async fn get_job_listing(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path((org_id, id)): Path<(OrganizationId, JobListingId)>,
) -> Result<Json<JobListing>, AppError> {
    state
        .permissions
        .authorize(viewer.user.id, org_id, JOB_LISTING_READ, None)
        .await?;
    job_listing_repo::find_job_listing(&state.pool, org_id, id)
        .await?
        .map(Json)
        .ok_or_else(listing_not_found)
}

pub async fn update_job_listing(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path((org_id, id)): Path<(OrganizationId, JobListingId)>,
    Json(payload): Json<CreateJobListingRequest>,
) -> Result<Json<JobListing>, AppError> {
    state
        .permissions
        .authorize(
            viewer.user.id,
            org_id,
            JOB_LISTING_UPDATE,
            Some("You cannot update job listings"),
        )
        .await?;
    payload.validate()?;

    let listing = job_listing_repo::update_job_listing(&state.pool, org_id, id, &payload)
        .await?
        .ok_or_else(listing_not_found)?;
    tracing::info!(job_listing_id = %id, organization_id = %org_id, "job listing updated");
    Ok(Json(listing))
}

pub async fn update_job_listing_status(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path((org_id, id)): Path<(OrganizationId, JobListingId)>,
    Json(payload): Json<UpdateJobListingStatusRequest>,
) -> Result<Json<JobListing>, AppError> {
    state
        .permissions
        .authorize(
            viewer.user.id,
            org_id,
            JOB_LISTING_CHANGE_STATUS,
            Some("You cannot change the status of job listings"),
        )
        .await?;
    let listing =
        job_listing_repo::update_job_listing_status(&state.pool, org_id, id, payload.status)
            .await?
            .ok_or_else(listing_not_found)?;
    tracing::info!(job_listing_id = %id, status = ?listing.status, "job listing status changed");
    Ok(Json(listing))
}

pub async fn delete_job_listing(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path((org_id, id)): Path<(OrganizationId, JobListingId)>,
) -> Result<StatusCode, AppError> {
    state
        .permissions
        .authorize(
            viewer.user.id,
            org_id,
            JOB_LISTING_DELETE,
            Some("You cannot delete job listings"),
        )
        .await?;
    if !job_listing_repo::delete_job_listing(&state.pool, org_id, id).await? {
        return Err(listing_not_found());
    }
    tracing::info!(job_listing_id = %id, "job listing deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Job-seeker view of a listing. Anything not published is reported as missing.
pub async fn view_job_listing(
    State(state): State<AppState>,
    Path(id): Path<JobListingId>,
) -> Result<Json<PublishedJobListing>, AppError> {
    let listing = job_listing_repo::find_published_job_listing(&state.pool, id)
        .await?
        .ok_or_else(listing_not_found)?;
    let organization = organization_repo::find_organization(&state.pool, listing.organization_id)
        .await?
        .ok_or_else(listing_not_found)?;
    Ok(Json(PublishedJobListing {
        listing,
        organization: organization.into(),
    }))
}
