//! Issuing, validating, rotating and revoking login sessions.
//!
//! A session token has the form `<encoded id>.<secret>`. Only an HMAC of the
//! secret is stored, so a leaked `sessions` table cannot be replayed as
//! cookies.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::{PgConnection, PgPool};

use crate::error::AppError;
use crate::models::session::{IssuedSession, NewSession, Session};
use crate::models::user::User;
use crate::repositories::session as session_repo;
use crate::types::{SessionId, SnowflakeGenerator, UserId};
use crate::utils::id_codec::SessionIdCodec;
use crate::utils::session_token::{
    compose_token, generate_secret, hash_secret, parse_token, verify_secret,
};

/// Storage operations the session manager relies on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, new: NewSession) -> Result<Session, AppError>;

    async fn find_with_user(&self, id: SessionId) -> Result<Option<(Session, User)>, AppError>;

    async fn update_expiry(&self, id: SessionId, expires_at: DateTime<Utc>)
        -> Result<bool, AppError>;

    async fn delete(&self, id: SessionId) -> Result<(), AppError>;

    async fn delete_for_user(&self, user_id: UserId) -> Result<u64, AppError>;
}

#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn insert(&self, new: NewSession) -> Result<Session, AppError> {
        Ok(session_repo::insert_session(&self.pool, &new).await?)
    }

    async fn find_with_user(&self, id: SessionId) -> Result<Option<(Session, User)>, AppError> {
        Ok(session_repo::find_session_with_user(&self.pool, id).await?)
    }

    async fn update_expiry(
        &self,
        id: SessionId,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        Ok(session_repo::update_session_expiry(&self.pool, id, expires_at).await?)
    }

    async fn delete(&self, id: SessionId) -> Result<(), AppError> {
        Ok(session_repo::delete_session(&self.pool, id).await?)
    }

    async fn delete_for_user(&self, user_id: UserId) -> Result<u64, AppError> {
        Ok(session_repo::delete_sessions_for_user(&self.pool, user_id).await?)
    }
}

/// How long sessions live and when an access extends them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    pub lifetime: Duration,
    pub rotation_threshold: Duration,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            lifetime: Duration::days(30),
            rotation_threshold: Duration::days(15),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryDecision {
    Expired,
    Rotate(DateTime<Utc>),
    Valid,
}

/// Decides what to do with a session whose stored expiry is `expires_at`.
///
/// A session is dead from the instant `now` reaches `expires_at`. Inside the
/// rotation window (remaining lifetime at most the threshold) it is extended
/// to a full lifetime counted from `now`.
pub fn evaluate_expiry(
    expires_at: DateTime<Utc>,
    now: DateTime<Utc>,
    policy: SessionPolicy,
) -> ExpiryDecision {
    if now >= expires_at {
        ExpiryDecision::Expired
    } else if expires_at - now <= policy.rotation_threshold {
        match now.checked_add_signed(policy.lifetime) {
            Some(extended) => ExpiryDecision::Rotate(extended),
            None => ExpiryDecision::Valid,
        }
    } else {
        ExpiryDecision::Valid
    }
}

/// A validated session together with the user it belongs to.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub session: Session,
    pub user: User,
}

pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    ids: Arc<SnowflakeGenerator>,
    codec: SessionIdCodec,
    hmac_key: Vec<u8>,
    policy: SessionPolicy,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn SessionStore>,
        ids: Arc<SnowflakeGenerator>,
        codec: SessionIdCodec,
        hmac_key: impl Into<Vec<u8>>,
        policy: SessionPolicy,
    ) -> Self {
        Self {
            store,
            ids,
            codec,
            hmac_key: hmac_key.into(),
            policy,
        }
    }

    fn prepare(
        &self,
        user_id: UserId,
        user_agent: Option<&str>,
        ip_address: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(NewSession, String), AppError> {
        let expires_at = now
            .checked_add_signed(self.policy.lifetime)
            .ok_or_else(|| anyhow::anyhow!("session lifetime overflows the calendar"))?;
        let secret = generate_secret();
        let new = NewSession {
            id: SessionId::generate(&self.ids),
            user_id,
            secret_hash: hash_secret(&self.hmac_key, &secret),
            user_agent: user_agent.map(str::to_owned),
            ip_address: ip_address.map(str::to_owned),
            expires_at,
        };
        Ok((new, secret))
    }

    fn issue(&self, session: Session, secret: &str) -> IssuedSession {
        let token = compose_token(&self.codec, session.id, secret);
        tracing::info!(
            session_id = %session.id,
            user_id = %session.user_id,
            expires_at = %session.expires_at,
            "session created"
        );
        IssuedSession { session, token }
    }

    pub async fn create_session(
        &self,
        user_id: UserId,
        user_agent: Option<&str>,
        ip_address: Option<&str>,
    ) -> Result<IssuedSession, AppError> {
        let (new, secret) = self.prepare(user_id, user_agent, ip_address, Utc::now())?;
        let session = self.store.insert(new).await?;
        Ok(self.issue(session, &secret))
    }

    /// Same as [`Self::create_session`] but writes through `conn`, so the
    /// session commits or rolls back with the caller's transaction.
    pub async fn create_session_in(
        &self,
        conn: &mut PgConnection,
        user_id: UserId,
        user_agent: Option<&str>,
        ip_address: Option<&str>,
    ) -> Result<IssuedSession, AppError> {
        let (new, secret) = self.prepare(user_id, user_agent, ip_address, Utc::now())?;
        let session = session_repo::insert_session(conn, &new).await?;
        Ok(self.issue(session, &secret))
    }

    pub async fn validate_session(&self, token: &str) -> Result<Option<AuthSession>, AppError> {
        self.validate_session_at(token, Utc::now()).await
    }

    /// Validates `token` as of `now`.
    ///
    /// Every rejection reason yields `Ok(None)`; only storage failures are
    /// errors.
    pub async fn validate_session_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<AuthSession>, AppError> {
        let Some(parsed) = parse_token(&self.codec, token) else {
            tracing::debug!("rejecting malformed session token");
            return Ok(None);
        };

        let Some((mut session, user)) = self.store.find_with_user(parsed.session_id).await? else {
            tracing::debug!(session_id = %parsed.session_id, "session not found");
            return Ok(None);
        };

        let decision = evaluate_expiry(session.expires_at, now, self.policy);
        if decision == ExpiryDecision::Expired {
            tracing::debug!(session_id = %session.id, "session expired, deleting");
            self.store.delete(session.id).await?;
            return Ok(None);
        }

        if !verify_secret(&self.hmac_key, parsed.secret, &session.secret_hash) {
            tracing::debug!(session_id = %session.id, "session secret mismatch");
            return Ok(None);
        }

        if let ExpiryDecision::Rotate(expires_at) = decision {
            if !self.store.update_expiry(session.id, expires_at).await? {
                tracing::debug!(session_id = %session.id, "session vanished before rotation");
                return Ok(None);
            }
            tracing::debug!(session_id = %session.id, %expires_at, "session expiry extended");
            session.expires_at = expires_at;
        }

        Ok(Some(AuthSession { session, user }))
    }

    pub async fn delete_session(&self, session_id: SessionId) -> Result<(), AppError> {
        self.store.delete(session_id).await?;
        tracing::info!(session_id = %session_id, "session deleted");
        Ok(())
    }

    pub async fn delete_user_sessions(&self, user_id: UserId) -> Result<u64, AppError> {
        let removed = self.store.delete_for_user(user_id).await?;
        tracing::info!(user_id = %user_id, removed, "user sessions revoked");
        Ok(removed)
    }
}
