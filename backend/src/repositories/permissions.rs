use sqlx::{FromRow, PgExecutor};

use crate::types::{OrganizationId, PermissionId, RoleId, UserId};

/// One `(role, permission)` pair reachable from a user's membership.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PermissionRow {
    pub role_id: RoleId,
    pub organization_id: OrganizationId,
    pub permission_name: String,
}

pub async fn fetch_permission_rows<'e, E>(
    executor: E,
    user_id: UserId,
    organization_id: OrganizationId,
) -> Result<Vec<PermissionRow>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, PermissionRow>(
        r#"
        SELECT r.id AS role_id, o.id AS organization_id, p.name AS permission_name
        FROM memberships m
        INNER JOIN organizations o ON o.id = m.organization_id
        INNER JOIN roles r ON r.id = m.role_id
        INNER JOIN role_permissions rp ON rp.role_id = r.id
        INNER JOIN permissions p ON p.id = rp.permission_id
        WHERE m.user_id = $1 AND m.organization_id = $2
        "#,
    )
    .bind(user_id)
    .bind(organization_id)
    .fetch_all(executor)
    .await
}

/// IDs of every permission in the catalogue, used when building an owner role.
pub async fn all_permission_ids<'e, E>(executor: E) -> Result<Vec<PermissionId>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar::<_, PermissionId>("SELECT id FROM permissions ORDER BY name")
        .fetch_all(executor)
        .await
}

pub async fn grant_permissions<'e, E>(
    executor: E,
    role_id: RoleId,
    permission_ids: &[PermissionId],
) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let ids: Vec<i64> = permission_ids.iter().map(|id| id.as_i64()).collect();
    let result = sqlx::query(
        r#"
        INSERT INTO role_permissions (role_id, permission_id)
        SELECT $1, UNNEST($2::bigint[])
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(role_id)
    .bind(&ids)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}
