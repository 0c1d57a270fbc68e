use sqlx::PgExecutor;

use crate::models::organization::{Membership, Organization, Role};
use crate::types::{MembershipId, OrganizationId, RoleId, UserId};

pub async fn insert_organization<'e, E>(
    executor: E,
    id: OrganizationId,
    name: &str,
) -> Result<Organization, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Organization>(
        r#"
        INSERT INTO organizations (id, name)
        VALUES ($1, $2)
        RETURNING id, name, image_url, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(name)
    .fetch_one(executor)
    .await
}

pub async fn find_organization<'e, E>(
    executor: E,
    id: OrganizationId,
) -> Result<Option<Organization>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Organization>(
        "SELECT id, name, image_url, created_at, updated_at FROM organizations WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn insert_role<'e, E>(
    executor: E,
    id: RoleId,
    organization_id: OrganizationId,
    name: &str,
) -> Result<Role, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Role>(
        r#"
        INSERT INTO roles (id, organization_id, name)
        VALUES ($1, $2, $3)
        RETURNING id, organization_id, name
        "#,
    )
    .bind(id)
    .bind(organization_id)
    .bind(name)
    .fetch_one(executor)
    .await
}

pub async fn insert_membership<'e, E>(
    executor: E,
    id: MembershipId,
    user_id: UserId,
    organization_id: OrganizationId,
    role_id: RoleId,
) -> Result<Membership, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Membership>(
        r#"
        INSERT INTO memberships (id, user_id, organization_id, role_id)
        VALUES ($1, $2, $3, $4)
        RETURNING id, user_id, organization_id, role_id, created_at
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(organization_id)
    .bind(role_id)
    .fetch_one(executor)
    .await
}

pub async fn list_organizations_for_user<'e, E>(
    executor: E,
    user_id: UserId,
) -> Result<Vec<Organization>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Organization>(
        r#"
        SELECT o.id, o.name, o.image_url, o.created_at, o.updated_at
        FROM organizations o
        INNER JOIN memberships m ON m.organization_id = o.id
        WHERE m.user_id = $1
        ORDER BY o.created_at DESC, o.id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(executor)
    .await
}

/// The organization and the role `user_id` holds in it, if they are a member.
pub async fn find_membership_role<'e, E>(
    executor: E,
    user_id: UserId,
    organization_id: OrganizationId,
) -> Result<Option<(Organization, Role)>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    #[derive(sqlx::FromRow)]
    struct Row {
        id: OrganizationId,
        name: String,
        image_url: Option<String>,
        created_at: chrono::DateTime<chrono::Utc>,
        updated_at: chrono::DateTime<chrono::Utc>,
        role_id: RoleId,
        role_name: String,
    }

    let row = sqlx::query_as::<_, Row>(
        r#"
        SELECT o.id, o.name, o.image_url, o.created_at, o.updated_at,
               r.id AS role_id, r.name AS role_name
        FROM memberships m
        INNER JOIN organizations o ON o.id = m.organization_id
        INNER JOIN roles r ON r.id = m.role_id
        WHERE m.user_id = $1 AND m.organization_id = $2
        "#,
    )
    .bind(user_id)
    .bind(organization_id)
    .fetch_optional(executor)
    .await?;

    Ok(row.map(|row| {
        let role = Role {
            id: row.role_id,
            organization_id: row.id,
            name: row.role_name,
        };
        let organization = Organization {
            id: row.id,
            name: row.name,
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        };
        (organization, role)
    }))
}
