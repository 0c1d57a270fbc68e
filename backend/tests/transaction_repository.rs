use jobboard_backend::{
    repositories::{self, user as user_repo},
    types::{SessionId, UserId},
};
use sqlx::PgPool;

mod support;

use support::{integration_guard, migrated_pool, test_state, unique_email};

async fn user_exists(pool: &PgPool, id: UserId) -> bool {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await
        .expect("user exists")
}

async fn session_exists(pool: &PgPool, id: SessionId) -> bool {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM sessions WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await
        .expect("session exists")
}

#[tokio::test]
async fn user_and_session_commit_together() {
    let _guard = integration_guard().await;
    let pool = migrated_pool().await;
    let state = test_state(pool.clone());

    let mut tx = repositories::begin_transaction(&pool).await.expect("begin");
    let user = user_repo::insert_user(&mut *tx, UserId::generate(&state.ids), "Tx", &unique_email())
        .await
        .expect("insert user");
    let issued = state
        .sessions
        .create_session_in(&mut tx, user.id, None, None)
        .await
        .expect("create session in transaction");
    repositories::commit_transaction(tx).await.expect("commit");

    assert!(user_exists(&pool, user.id).await);
    assert!(session_exists(&pool, issued.session.id).await);
    assert!(state
        .sessions
        .validate_session(&issued.token)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn dropped_transaction_discards_user_and_session() {
    let _guard = integration_guard().await;
    let pool = migrated_pool().await;
    let state = test_state(pool.clone());

    let mut tx = repositories::begin_transaction(&pool).await.expect("begin");
    let user = user_repo::insert_user(&mut *tx, UserId::generate(&state.ids), "Tx", &unique_email())
        .await
        .expect("insert user");
    let issued = state
        .sessions
        .create_session_in(&mut tx, user.id, None, None)
        .await
        .expect("create session in transaction");
    drop(tx);

    assert!(!user_exists(&pool, user.id).await);
    assert!(!session_exists(&pool, issued.session.id).await);
    assert!(state
        .sessions
        .validate_session(&issued.token)
        .await
        .unwrap()
        .is_none());
}
