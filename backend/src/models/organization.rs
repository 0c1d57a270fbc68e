//! Organizations, their roles and user memberships.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::types::{MembershipId, OrganizationId, RoleId, UserId};

/// Role created for the founder of an organization; holds every permission.
pub const OWNER_ROLE_NAME: &str = "Owner";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    #[serde(rename = "imageURL")]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A named bundle of permissions scoped to one organization.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: RoleId,
    pub organization_id: OrganizationId,
    pub name: String,
}

/// Binds a user to an organization with exactly one role.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: MembershipId,
    pub user_id: UserId,
    pub organization_id: OrganizationId,
    pub role_id: RoleId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveRole {
    pub id: RoleId,
    pub name: String,
    pub permissions: Vec<String>,
}

/// The organization a user is currently working in, with their role in it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveOrganization {
    pub id: OrganizationId,
    pub name: String,
    #[serde(rename = "imageURL")]
    pub image_url: Option<String>,
    pub role: ActiveRole,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrganizationRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectOrganizationRequest {
    #[serde(rename = "orgID")]
    pub org_id: OrganizationId,
}
