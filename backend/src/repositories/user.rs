//! Repository functions for users and their local credentials.

use sqlx::PgExecutor;

use crate::models::account::{Account, LOCAL_PROVIDER};
use crate::models::user::User;
use crate::types::{AccountId, UserId};

pub async fn insert_user<'e, E>(
    executor: E,
    id: UserId,
    display_name: &str,
    email: &str,
) -> Result<User, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, display_name, email)
        VALUES ($1, $2, $3)
        RETURNING id, display_name, email, image, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(display_name)
    .bind(email)
    .fetch_one(executor)
    .await
}

pub async fn find_user_by_id<'e, E>(executor: E, id: UserId) -> Result<Option<User>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, User>(
        "SELECT id, display_name, email, image, created_at, updated_at FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn email_exists<'e, E>(executor: E, email: &str) -> Result<bool, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(email)
        .fetch_one(executor)
        .await
}

/// Inserts the password-backed account for a user.
pub async fn insert_local_account<'e, E>(
    executor: E,
    id: AccountId,
    user_id: UserId,
    password_hash: &str,
) -> Result<Account, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Account>(
        r#"
        INSERT INTO accounts (id, user_id, account_id, provider, password)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, user_id, account_id, provider, password, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(user_id.to_string())
    .bind(LOCAL_PROVIDER)
    .bind(password_hash)
    .fetch_one(executor)
    .await
}

/// Looks up the local account of the user registered under `email`.
pub async fn find_local_account_by_email<'e, E>(
    executor: E,
    email: &str,
) -> Result<Option<Account>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Account>(
        r#"
        SELECT a.id, a.user_id, a.account_id, a.provider, a.password, a.created_at, a.updated_at
        FROM accounts a
        INNER JOIN users u ON u.id = a.user_id
        WHERE u.email = $1 AND a.provider = $2
        "#,
    )
    .bind(email)
    .bind(LOCAL_PROVIDER)
    .fetch_optional(executor)
    .await
}
