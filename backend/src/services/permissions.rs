//! Effective permissions of a user inside an organization.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::AppError;
use crate::repositories::permissions::{self as permissions_repo, PermissionRow};
use crate::types::{OrganizationId, UserId};

pub const JOB_LISTING_READ: &str = "org:job_listing:read";
pub const JOB_LISTING_LIST: &str = "org:job_listing:list";
pub const JOB_LISTING_WRITE: &str = "org:job_listing:write";
pub const JOB_LISTING_UPDATE: &str = "org:job_listing:update";
pub const JOB_LISTING_CHANGE_STATUS: &str = "org:job_listing:change_status";
pub const JOB_LISTING_DELETE: &str = "org:job_listing:delete";
pub const MEMBER_READ: &str = "org:member:read";

/// Every permission seeded by the migrations.
pub const ALL_PERMISSIONS: [&str; 7] = [
    JOB_LISTING_READ,
    JOB_LISTING_LIST,
    JOB_LISTING_WRITE,
    JOB_LISTING_UPDATE,
    JOB_LISTING_CHANGE_STATUS,
    JOB_LISTING_DELETE,
    MEMBER_READ,
];

/// A deduplicated set of permission names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet(BTreeSet<String>);

impl PermissionSet {
    pub fn contains(&self, permission: &str) -> bool {
        self.0.contains(permission)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0.into_iter().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Union of the permission names in `rows`; duplicates reached through
/// several join paths collapse to one entry.
pub fn aggregate_permissions<I>(rows: I) -> PermissionSet
where
    I: IntoIterator<Item = PermissionRow>,
{
    rows.into_iter().map(|row| row.permission_name).collect()
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PermissionRepository: Send + Sync {
    async fn permission_rows(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> Result<Vec<PermissionRow>, AppError>;
}

#[derive(Clone)]
pub struct PgPermissionRepository {
    pool: PgPool,
}

impl PgPermissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PermissionRepository for PgPermissionRepository {
    async fn permission_rows(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> Result<Vec<PermissionRow>, AppError> {
        Ok(permissions_repo::fetch_permission_rows(&self.pool, user_id, organization_id).await?)
    }
}

pub struct PermissionResolver {
    repository: Arc<dyn PermissionRepository>,
}

impl PermissionResolver {
    pub fn new(repository: Arc<dyn PermissionRepository>) -> Self {
        Self { repository }
    }

    /// Permissions `user_id` holds in `organization_id`. Empty when the user
    /// is not a member.
    pub async fn resolve(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> Result<PermissionSet, AppError> {
        let rows = self
            .repository
            .permission_rows(user_id, organization_id)
            .await?;
        Ok(aggregate_permissions(rows))
    }

    /// Fails with `Forbidden` unless the user holds `required` in the organization.
    pub async fn authorize(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
        required: &str,
        message: Option<&str>,
    ) -> Result<PermissionSet, AppError> {
        let permissions = self.resolve(user_id, organization_id).await?;
        if !permissions.contains(required) {
            tracing::debug!(
                user_id = %user_id,
                organization_id = %organization_id,
                permission = required,
                "permission denied"
            );
            return Err(AppError::forbidden(message));
        }
        Ok(permissions)
    }
}
