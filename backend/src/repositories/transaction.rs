//! Transaction helpers shared by handlers that write several tables at once.

use sqlx::postgres::PgTransaction;
use sqlx::PgPool;

use crate::error::AppError;

/// Begin a transaction on the pool.
///
/// Dropping the returned handle without calling [`commit_transaction`]
/// rolls every statement back.
pub async fn begin_transaction(db: &PgPool) -> Result<PgTransaction<'static>, AppError> {
    db.begin()
        .await
        .map_err(|e| AppError::InternalServerError(e.into()))
}

pub async fn commit_transaction(tx: PgTransaction<'_>) -> Result<(), AppError> {
    tx.commit()
        .await
        .map_err(|e| AppError::InternalServerError(e.into()))
}
