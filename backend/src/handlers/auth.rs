use std::net::IpAddr;

use axum::{
    extract::State,
    http::{
        header::{SET_COOKIE, USER_AGENT},
        HeaderMap, StatusCode,
    },
    response::IntoResponse,
    Json,
};
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    middleware::session::Viewer,
    models::user::{LoginRequest, RegisterRequest, User},
    repositories::{self, user as user_repo},
    state::AppState,
    types::{AccountId, UserId},
    utils::{
        cookies::{build_clear_session_cookie, build_session_cookie},
        password::{hash_password, verify_password, verify_password_against_dummy},
    },
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// User agent and client address recorded on new sessions.
pub(crate) struct ClientMetadata {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

impl ClientMetadata {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            user_agent: extract_user_agent(headers),
            ip_address: extract_ip(headers),
        }
    }
}

fn extract_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|value| value.split(',').next());
    let real_ip = headers.get("x-real-ip").and_then(|v| v.to_str().ok());
    forwarded
        .or(real_ip)
        .and_then(|ip| ip.trim().parse::<IpAddr>().ok())
        .map(|ip| ip.to_string())
}

fn extract_user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|agent| agent.trim().to_string())
        .filter(|agent| !agent.is_empty())
}

pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let email = payload.normalized_email();

    if user_repo::email_exists(&state.pool, &email).await? {
        return Err(AppError::Conflict("Email is already registered".into()));
    }
    let password_hash = hash_password(&payload.password)?;
    let client = ClientMetadata::from_headers(&headers);

    let mut tx = repositories::begin_transaction(&state.pool).await?;
    let user = user_repo::insert_user(
        &mut *tx,
        UserId::generate(&state.ids),
        payload.display_name.trim(),
        &email,
    )
    .await?;
    user_repo::insert_local_account(
        &mut *tx,
        AccountId::generate(&state.ids),
        user.id,
        &password_hash,
    )
    .await?;
    let issued = state
        .sessions
        .create_session_in(
            &mut tx,
            user.id,
            client.user_agent.as_deref(),
            client.ip_address.as_deref(),
        )
        .await?;
    repositories::commit_transaction(tx).await?;

    tracing::info!(user_id = %user.id, "user registered");
    let cookie = build_session_cookie(
        &issued.token,
        state.config.cookie_max_age(),
        state.config.cookie_options(),
    );
    Ok((
        StatusCode::CREATED,
        [(SET_COOKIE, cookie)],
        Json(json!({ "success": true })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let email = payload.normalized_email();

    let account = user_repo::find_local_account_by_email(&state.pool, &email).await?;
    let matches = match account.as_ref().and_then(|a| a.password.as_deref()) {
        Some(hash) => verify_password(&payload.password, hash)?,
        None => verify_password_against_dummy(&payload.password)?,
    };
    let account = match account {
        Some(account) if matches => account,
        _ => {
            tracing::debug!("login rejected");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
        }
    };

    let client = ClientMetadata::from_headers(&headers);
    let issued = state
        .sessions
        .create_session(
            account.user_id,
            client.user_agent.as_deref(),
            client.ip_address.as_deref(),
        )
        .await?;

    let cookie = build_session_cookie(
        &issued.token,
        state.config.cookie_max_age(),
        state.config.cookie_options(),
    );
    Ok((
        [(SET_COOKIE, cookie)],
        Json(json!({ "isLoggedIn": true })),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
) -> Result<impl IntoResponse, AppError> {
    state.sessions.delete_session(viewer.session.id).await?;
    let cookie = build_clear_session_cookie(state.config.cookie_options());
    Ok((StatusCode::NO_CONTENT, [(SET_COOKIE, cookie)]))
}

pub async fn viewer(Viewer(viewer): Viewer) -> Json<User> {
    Json(viewer.user)
}
