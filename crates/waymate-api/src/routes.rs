use axum::http::Method;
use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post},
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::middleware::require_auth;
use crate::state::AppState;
use crate::{auth, otp, requests, trips};

pub fn build_router(state: AppState) -> Router {
    // Mobile clients connect from emulator/device origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers(Any);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password/{token}", post(auth::reset_password))
        .route("/send-email-otp", post(otp::send_email_otp))
        .route("/verify-email-otp", post(otp::verify_email_otp))
        .merge(
            Router::new()
                .route("/me", get(auth::current_user))
                .route_layer(middleware::from_fn_with_state(state.clone(), require_auth)),
        );

    let trip_routes = Router::new()
        .route("/create-request", post(requests::create_trip_request))
        .route("/get-request", post(requests::get_trip_request))
        .route("/request/{trip_req_id}", patch(requests::update_trip_request))
        .route("/request/{trip_req_id}/photo", post(requests::upload_trip_photo))
        .route("/create", post(trips::create_trip))
        .route("/get", post(trips::get_trip));

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1/auth", auth_routes)
        .nest("/api/v1/trips", trip_routes)
        .layer(DefaultBodyLimit::max(12 * 1024 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// GET /health — liveness check (no auth).
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
