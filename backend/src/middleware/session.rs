use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::services::session::AuthSession;
use crate::state::AppState;
use crate::utils::cookies::{extract_cookie_value, SESSION_COOKIE_NAME};

/// Identity attached to every request. Anonymous when the request carried
/// no session cookie or the cookie did not validate.
#[derive(Clone, Debug, Default)]
pub struct SessionContext(Option<AuthSession>);

impl SessionContext {
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn authenticated(session: AuthSession) -> Self {
        Self(Some(session))
    }

    pub fn get(&self) -> Option<&AuthSession> {
        self.0.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.0.is_some()
    }
}

fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|raw| extract_cookie_value(raw, SESSION_COOKIE_NAME))
}

/// Resolves the `session_secret` cookie into a [`SessionContext`].
pub async fn deserialize_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let context = match session_token(request.headers()) {
        Some(token) => match state.sessions.validate_session(&token).await? {
            Some(session) => SessionContext::authenticated(session),
            None => SessionContext::anonymous(),
        },
        None => SessionContext::anonymous(),
    };
    request.extensions_mut().insert(context);
    Ok(next.run(request).await)
}

/// Extracts the authenticated session, rejecting anonymous requests with 401.
#[derive(Clone, Debug)]
pub struct Viewer(pub AuthSession);

impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionContext>()
            .and_then(SessionContext::get)
            .cloned()
            .map(Viewer)
            .ok_or_else(AppError::unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn session_token_is_read_from_any_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("c_org=1"));
        headers.append(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session_secret=abc.def"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("abc.def"));
    }

    #[test]
    fn missing_cookie_yields_no_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("c_org=1"));
        assert!(session_token(&headers).is_none());
        assert!(session_token(&HeaderMap::new()).is_none());
    }

    #[test]
    fn default_context_is_anonymous() {
        assert!(!SessionContext::default().is_authenticated());
        assert!(SessionContext::anonymous().get().is_none());
    }
}
