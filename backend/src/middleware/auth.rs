use axum::{extract::Request, middleware::Next, response::Response};

use crate::error::AppError;
use crate::middleware::session::SessionContext;

/// Route layer for endpoints that need a signed-in user.
pub async fn require_session(request: Request, next: Next) -> Result<Response, AppError> {
    let authenticated = request
        .extensions()
        .get::<SessionContext>()
        .is_some_and(SessionContext::is_authenticated);
    if !authenticated {
        return Err(AppError::unauthorized());
    }
    Ok(next.run(request).await)
}
