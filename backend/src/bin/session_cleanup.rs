use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jobboard_backend::{
    config::Config, db::connection::create_pool, repositories::session as session_repo,
};

/// Removes sessions whose expiry has passed. Validation already deletes
/// expired sessions lazily; this catches the ones nobody presents again.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "session_cleanup=info,jobboard_backend=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    let pool = create_pool(&config.database_url).await?;

    let deleted = session_repo::cleanup_expired_sessions(&pool).await?;
    tracing::info!(deleted, "Deleted expired sessions");

    sqlx::query("VACUUM (ANALYZE) sessions")
        .execute(&pool)
        .await?;

    Ok(())
}
