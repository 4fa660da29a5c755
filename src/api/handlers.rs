//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::{
    media::MediaEvent,
    recipe::{Recipe, RecipeSummary},
    state::AppState,
};
use super::responses::{
    ApiResponse, HealthResponse, MediaEventRequest, MediaResponse, StatusResponse,
};

/// Handle GET /recipes - List recipe summaries
pub async fn list_recipes_handler(State(state): State<Arc<AppState>>) -> Json<Vec<RecipeSummary>> {
    Json(state.catalog.summaries())
}

/// Handle GET /recipes/:id - Full recipe record
pub async fn recipe_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Recipe>, StatusCode> {
    state
        .catalog
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

/// Handle POST /recipes/:id/open - Open a recipe view and attach its video
pub async fn open_recipe_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>, StatusCode> {
    match state.open_recipe(&id) {
        Some(recipe) => {
            info!("Open endpoint called - viewing {}", recipe.title);
            Ok(Json(status_of(&state)))
        }
        None => {
            warn!("Open endpoint called with unknown recipe {}", id);
            Err(StatusCode::NOT_FOUND)
        }
    }
}

/// Handle POST /view/close - Tear down the open view
pub async fn close_view_handler(State(state): State<Arc<AppState>>) -> StatusCode {
    if state.close_view() {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::CONFLICT
    }
}

/// Handle POST /cook/start - Start (or restart) the cook-along session
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    let session = state.start_cooking().ok_or(StatusCode::CONFLICT)?;
    info!("Start endpoint called - cook-along session started");
    Ok(Json(ApiResponse::from_session(
        "Cook-along session started".to_string(),
        session,
    )))
}

/// Handle POST /cook/stop - Stop the session and pause the video
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    let session = state.stop_cooking().ok_or(StatusCode::CONFLICT)?;
    info!("Stop endpoint called - session stopped at {}", session.formatted);
    Ok(Json(ApiResponse::from_session(
        "Cook-along session stopped".to_string(),
        session,
    )))
}

/// Handle POST /cook/reset - Zero the timer and rewind the video
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    let session = state.reset_cooking().ok_or(StatusCode::CONFLICT)?;
    info!("Reset endpoint called - timer reset");
    Ok(Json(ApiResponse::from_session(
        "Cook-along timer reset".to_string(),
        session,
    )))
}

/// Handle POST /media/retry - Reload the current video
pub async fn retry_media_handler(State(state): State<Arc<AppState>>) -> Result<Json<MediaResponse>, StatusCode> {
    let binding = state.retry_media().ok_or(StatusCode::CONFLICT)?;
    Ok(Json(MediaResponse {
        accepted: true,
        binding,
        media: state.media_state(),
        timestamp: Utc::now(),
    }))
}

/// Handle POST /media/events - Event reported by the client's player
pub async fn media_event_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MediaEventRequest>,
) -> Json<MediaResponse> {
    let event = MediaEvent::from(request);
    debug!("Media event reported: {:?}", event);
    let binding = event.binding;
    let accepted = state.report_media_event(event);

    Json(MediaResponse {
        accepted,
        binding,
        media: state.media_state(),
        timestamp: Utc::now(),
    })
}

/// Handle GET /status - Return current view, session and media status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(status_of(&state))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

fn status_of(state: &AppState) -> StatusResponse {
    let (last_action, last_action_time) = state.get_last_action();

    StatusResponse {
        recipe: state.current_recipe().as_ref().map(RecipeSummary::from),
        session: state.session_snapshot(),
        media: state.media_state(),
        directive: state.playback_directive(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }
}
