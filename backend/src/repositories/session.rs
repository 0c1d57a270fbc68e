use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgExecutor};

use crate::models::session::{NewSession, Session};
use crate::models::user::User;
use crate::types::{SessionId, UserId};

/// A session row joined with the user that owns it.
#[derive(FromRow)]
struct SessionWithUserRow {
    id: SessionId,
    user_id: UserId,
    secret_hash: Vec<u8>,
    user_agent: Option<String>,
    ip_address: Option<String>,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    display_name: String,
    email: String,
    image: Option<String>,
    user_created_at: DateTime<Utc>,
    user_updated_at: DateTime<Utc>,
}

impl SessionWithUserRow {
    fn split(self) -> (Session, User) {
        let user = User {
            id: self.user_id,
            display_name: self.display_name,
            email: self.email,
            image: self.image,
            created_at: self.user_created_at,
            updated_at: self.user_updated_at,
        };
        let session = Session {
            id: self.id,
            user_id: self.user_id,
            secret_hash: self.secret_hash,
            user_agent: self.user_agent,
            ip_address: self.ip_address,
            expires_at: self.expires_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        (session, user)
    }
}

pub async fn insert_session<'e, E>(executor: E, new: &NewSession) -> Result<Session, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Session>(
        r#"
        INSERT INTO sessions (id, user_id, secret_hash, user_agent, ip_address, expires_at)
        VALUES ($1, $2, $3, $4, $5::inet, $6)
        RETURNING id, user_id, secret_hash, user_agent, host(ip_address) AS ip_address,
                  expires_at, created_at, updated_at
        "#,
    )
    .bind(new.id)
    .bind(new.user_id)
    .bind(&new.secret_hash)
    .bind(new.user_agent.as_deref())
    .bind(new.ip_address.as_deref())
    .bind(new.expires_at)
    .fetch_one(executor)
    .await
}

pub async fn find_session_with_user<'e, E>(
    executor: E,
    session_id: SessionId,
) -> Result<Option<(Session, User)>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, SessionWithUserRow>(
        r#"
        SELECT s.id, s.user_id, s.secret_hash, s.user_agent, host(s.ip_address) AS ip_address,
               s.expires_at, s.created_at, s.updated_at,
               u.display_name, u.email, u.image,
               u.created_at AS user_created_at, u.updated_at AS user_updated_at
        FROM sessions s
        INNER JOIN users u ON u.id = s.user_id
        WHERE s.id = $1
        "#,
    )
    .bind(session_id)
    .fetch_optional(executor)
    .await?;
    Ok(row.map(SessionWithUserRow::split))
}

pub async fn update_session_expiry<'e, E>(
    executor: E,
    session_id: SessionId,
    expires_at: DateTime<Utc>,
) -> Result<bool, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE sessions
        SET expires_at = $1, updated_at = NOW()
        WHERE id = $2
        "#,
    )
    .bind(expires_at)
    .bind(session_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_session<'e, E>(executor: E, session_id: SessionId) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query("DELETE FROM sessions WHERE id = $1")
        .bind(session_id)
        .execute(executor)
        .await
        .map(|_| ())
}

pub async fn delete_sessions_for_user<'e, E>(executor: E, user_id: UserId) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

pub async fn cleanup_expired_sessions<'e, E>(executor: E) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
