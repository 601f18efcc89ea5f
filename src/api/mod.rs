//! API layer - HTTP handlers and routing
//!
//! Server-rendered admin pages:
//! - Sign-in and sign-out
//! - Dashboard of pending drafts
//! - Manufacturers, models (with images, stages, timings, stage videos)
//! - Videos and video series (with series videos)
//! - Users and devices (admin only)
//! - Static files from the public directory

pub mod auth;
pub mod dashboard;
pub mod devices;
pub mod find;
pub mod manufacturers;
pub mod middleware;
pub mod models;
pub mod resource;
pub mod stages;
pub mod users;
pub mod video_series;
pub mod videos;

#[cfg(test)]
mod tests;

use axum::{
    handler::HandlerWithoutStateExt,
    middleware as axum_middleware,
    response::Redirect,
    routing::get,
    Router,
};
use std::path::Path;
use tower_http::{compression::CompressionLayer, services::ServeDir, trace::TraceLayer};

pub use middleware::{AdminError, AppState, RequestScope};

async fn page_not_found() -> AdminError {
    AdminError::PageNotFound
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, public_dir: &Path) -> Router {
    // Admin routes (need the session's admin flag)
    let admin_routes = Router::new()
        .nest("/users", users::router())
        .nest("/devices", devices::router())
        .route_layer(axum_middleware::from_fn(middleware::require_admin))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Protected routes (need a session)
    let protected_routes = Router::new()
        .nest("/dashboard", dashboard::router())
        .nest("/manufacturers", manufacturers::router())
        .nest("/models", models::router())
        .nest("/videos", videos::router())
        .nest("/videoSeries", video_series::router())
        .merge(find::router())
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    let static_files = ServeDir::new(public_dir).not_found_service(page_not_found.into_service());

    Router::new()
        .route("/", get(|| async { Redirect::to("/dashboard") }))
        .merge(auth::router())
        .merge(protected_routes)
        .merge(admin_routes)
        .fallback_service(static_files)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::render_error_pages,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .with_state(state)
}
