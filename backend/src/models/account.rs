//! Credential accounts linked to users.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::types::{AccountId, UserId};

pub const LOCAL_PROVIDER: &str = "local";

/// A way for a user to sign in. Only the `local` (email + password)
/// provider is issued by this service.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: AccountId,
    pub user_id: UserId,
    /// Provider-specific account identifier; the user ID for `local`.
    pub account_id: String,
    pub provider: String,
    /// Argon2 PHC string.
    pub password: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
