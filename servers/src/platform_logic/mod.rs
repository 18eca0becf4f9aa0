pub mod backup;
pub mod config;
pub mod error;
pub mod gate;
pub mod logger;
pub mod model;
pub mod pages;
pub mod routes_admin;
pub mod state;

use axum::{
    Router, middleware,
    routing::{delete, get, patch, post},
};
use tower_http::cors::CorsLayer;

use crate::platform_logic::state::AppState;

/// Full route table. Content pages sit behind the access gate; the
/// gate's own endpoints, the health probe and the admin API stay outside
/// it (admin requests are gated by the session identity instead).
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/", get(pages::home))
        .route("/api/batches", get(pages::api_batches))
        .route("/api/live-classes", get(pages::api_live_classes))
        .layer(middleware::from_fn(gate::access_gate));

    let admin = Router::new()
        .route("/batches", post(routes_admin::create_batch))
        .route(
            "/batches/{id}",
            patch(routes_admin::update_batch).delete(routes_admin::delete_batch),
        )
        .route("/batches/{batch_id}/subjects", post(routes_admin::create_subject))
        .route("/subjects/{id}", delete(routes_admin::delete_subject))
        .route("/subjects/{subject_id}/chapters", post(routes_admin::create_chapter))
        .route("/chapters/{id}", delete(routes_admin::delete_chapter))
        .route("/chapters/{chapter_id}/lectures", post(routes_admin::create_lecture))
        .route("/lectures/{id}", delete(routes_admin::delete_lecture))
        .route("/live-classes", post(routes_admin::create_live_class))
        .route(
            "/live-classes/{id}/status",
            patch(routes_admin::update_live_class_status),
        )
        .route("/live-classes/{id}", delete(routes_admin::delete_live_class))
        .route(
            "/users",
            get(routes_admin::list_users).post(routes_admin::create_user),
        )
        .route(
            "/users/{id}",
            patch(routes_admin::update_user).delete(routes_admin::delete_user),
        )
        .route(
            "/settings/monetization",
            get(routes_admin::get_monetization).put(routes_admin::put_monetization),
        )
        .route(
            "/backups",
            get(routes_admin::list_backups).post(routes_admin::create_backup),
        )
        .route("/backups/restore", post(routes_admin::restore_backup));

    Router::new()
        .merge(protected)
        .route("/health", get(pages::health))
        .route("/key-generation", get(gate::key_generation_page))
        .route("/key-generation/server/{server}", get(gate::server_choice))
        .route("/key-generation/ads", get(gate::ads_choice))
        .route("/set-verified", get(gate::set_verified))
        .route("/api/auth/sign-in", post(routes_admin::sign_in))
        .route("/api/auth/sign-out", post(routes_admin::sign_out))
        .route("/api/auth/me", get(routes_admin::whoami))
        .nest("/api/admin", admin)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
