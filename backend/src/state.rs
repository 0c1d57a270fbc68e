use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::services::permissions::{PermissionResolver, PgPermissionRepository};
use crate::services::session::{PgSessionStore, SessionManager, SessionPolicy};
use crate::types::snowflake::SnowflakeError;
use crate::types::SnowflakeGenerator;
use crate::utils::id_codec::SessionIdCodec;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub ids: Arc<SnowflakeGenerator>,
    pub sessions: Arc<SessionManager>,
    pub permissions: Arc<PermissionResolver>,
}

impl AppState {
    /// Wires the Postgres-backed session manager and permission resolver.
    pub fn new(pool: PgPool, config: Config) -> Result<Self, SnowflakeError> {
        let ids = Arc::new(SnowflakeGenerator::new(
            config.snowflake_shard_id,
            config.snowflake_epoch_ms,
        )?);
        let sessions = SessionManager::new(
            Arc::new(PgSessionStore::new(pool.clone())),
            ids.clone(),
            SessionIdCodec::new(&config.session_id_salt),
            config.session_secret.as_bytes(),
            SessionPolicy {
                lifetime: chrono::Duration::days(config.session_lifetime_days),
                rotation_threshold: chrono::Duration::days(config.session_rotation_threshold_days),
            },
        );
        let permissions = PermissionResolver::new(Arc::new(PgPermissionRepository::new(pool.clone())));

        Ok(Self {
            pool,
            config: Arc::new(config),
            ids,
            sessions: Arc::new(sessions),
            permissions: Arc::new(permissions),
        })
    }
}
