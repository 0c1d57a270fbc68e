use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{handlers, middleware, state::AppState};

/// Routes reachable without a session.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route(
            "/api/job-listings/{id}",
            get(handlers::job_listings::view_job_listing),
        )
}

/// Routes that answer 401 to anonymous requests.
pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/logout", delete(handlers::auth::logout))
        .route("/api/auth/viewer", get(handlers::auth::viewer))
        .route(
            "/api/organizations",
            get(handlers::organizations::list_organizations)
                .post(handlers::organizations::create_organization),
        )
        .route(
            "/api/organizations/select",
            post(handlers::organizations::select_organization),
        )
        .route(
            "/api/organizations/{org_id}/active",
            get(handlers::organizations::active_organization),
        )
        .route(
            "/api/organizations/{org_id}/job-listings",
            get(handlers::job_listings::list_job_listings)
                .post(handlers::job_listings::create_job_listing),
        )
        .route(
            "/api/organizations/{org_id}/job-listings/published-count",
            get(handlers::job_listings::published_job_listings_count),
        )
        .route(
            "/api/organizations/{org_id}/job-listings/{id}",
            get(handlers::job_listings::get_job_listing)
                .patch(handlers::job_listings::update_job_listing)
                .delete(handlers::job_listings::delete_job_listing),
        )
        .route(
            "/api/organizations/{org_id}/job-listings/{id}/status",
            patch(handlers::job_listings::update_job_listing_status),
        )
        .route_layer(axum_middleware::from_fn(middleware::require_session))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(24 * 60 * 60))
}

/// The full application: every route behind session resolution, request IDs,
/// tracing and CORS.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(public_routes())
        .merge(session_routes())
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::deserialize_session,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(axum_middleware::from_fn(middleware::request_id))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.cors_allow_origins)),
        )
        .with_state(state)
}
