//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and request/response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/recipes", get(list_recipes_handler))
        .route("/recipes/:id", get(recipe_handler))
        .route("/recipes/:id/open", post(open_recipe_handler))
        .route("/view/close", post(close_view_handler))
        .route("/cook/start", post(start_handler))
        .route("/cook/stop", post(stop_handler))
        .route("/cook/reset", post(reset_handler))
        .route("/media/retry", post(retry_media_handler))
        .route("/media/events", post(media_event_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
