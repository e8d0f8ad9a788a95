use axum::{
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;

pub mod auth;
pub mod cars;
pub mod contact;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: public browsing and contact routes,
/// auth routes, and the session-guarded upload/delete routes.
pub fn build_router(cors: CorsLayer, state: auth::ServerState) -> Router {
    let uploads_dir = ServeDir::new(state.uploads.dir());

    // Public routes (listings, stored photos, contact, health)
    let public = Router::new()
        .route("/health", get(health))
        .route("/cars", get(cars::list_cars))
        .route("/contact", post(contact::submit_contact))
        .nest_service("/uploads", uploads_dir);

    // Account routes
    let accounts = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout));

    // Uploader-only routes
    let protected = Router::new()
        .route("/cars", post(cars::create_car))
        .route("/cars/:id", delete(cars::delete_car))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_auth));

    public
        .merge(accounts)
        .merge(protected)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
