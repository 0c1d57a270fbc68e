use axum::{
    extract::{Path, State},
    http::{header::SET_COOKIE, StatusCode},
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    error::AppError,
    middleware::session::Viewer,
    models::organization::{
        ActiveOrganization, ActiveRole, CreateOrganizationRequest, Organization,
        SelectOrganizationRequest, OWNER_ROLE_NAME,
    },
    repositories::{self, organization as organization_repo, permissions as permissions_repo},
    state::AppState,
    types::{MembershipId, OrganizationId, RoleId},
    utils::cookies::build_organization_cookie,
};

const NOT_A_MEMBER: &str = "You are not a member of this organization";

pub async fn list_organizations(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
) -> Result<Json<Vec<Organization>>, AppError> {
    let organizations =
        organization_repo::list_organizations_for_user(&state.pool, viewer.user.id).await?;
    Ok(Json(organizations))
}

/// Creates an organization and makes the viewer its owner.
pub async fn create_organization(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Json(payload): Json<CreateOrganizationRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut tx = repositories::begin_transaction(&state.pool).await?;
    let organization = organization_repo::insert_organization(
        &mut *tx,
        OrganizationId::generate(&state.ids),
        payload.name.trim(),
    )
    .await?;
    let role = organization_repo::insert_role(
        &mut *tx,
        RoleId::generate(&state.ids),
        organization.id,
        OWNER_ROLE_NAME,
    )
    .await?;
    let permission_ids = permissions_repo::all_permission_ids(&mut *tx).await?;
    permissions_repo::grant_permissions(&mut *tx, role.id, &permission_ids).await?;
    organization_repo::insert_membership(
        &mut *tx,
        MembershipId::generate(&state.ids),
        viewer.user.id,
        organization.id,
        role.id,
    )
    .await?;
    repositories::commit_transaction(tx).await?;

    tracing::info!(
        organization_id = %organization.id,
        owner_id = %viewer.user.id,
        "organization created"
    );
    Ok((StatusCode::CREATED, Json(organization)))
}

/// Remembers the organization the viewer is working in via the `c_org` cookie.
pub async fn select_organization(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Json(payload): Json<SelectOrganizationRequest>,
) -> Result<impl IntoResponse, AppError> {
    organization_repo::find_membership_role(&state.pool, viewer.user.id, payload.org_id)
        .await?
        .ok_or_else(|| AppError::forbidden(Some(NOT_A_MEMBER)))?;

    let cookie = build_organization_cookie(
        &payload.org_id.to_string(),
        state.config.cookie_max_age(),
        state.config.cookie_options(),
    );
    Ok((StatusCode::NO_CONTENT, [(SET_COOKIE, cookie)]))
}

pub async fn active_organization(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path(org_id): Path<OrganizationId>,
) -> Result<Json<ActiveOrganization>, AppError> {
    let (organization, role) =
        organization_repo::find_membership_role(&state.pool, viewer.user.id, org_id)
            .await?
            .ok_or_else(|| AppError::forbidden(Some(NOT_A_MEMBER)))?;
    let permissions = state.permissions.resolve(viewer.user.id, org_id).await?;

    Ok(Json(ActiveOrganization {
        id: organization.id,
        name: organization.name,
        image_url: organization.image_url,
        role: ActiveRole {
            id: role.id,
            name: role.name,
            permissions: permissions.into_vec(),
        },
    }))
}
