//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    media::{MediaEvent, MediaEventKind},
    recipe::RecipeSummary,
    state::{MediaLoadState, PlaybackDirective, SessionSnapshot},
};

/// API response structure for session command endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub session: SessionSnapshot,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, session: SessionSnapshot) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            session,
        }
    }

    /// Create an active response
    pub fn active(message: String, session: SessionSnapshot) -> Self {
        Self::new("active".to_string(), message, session)
    }

    /// Create an idle response
    pub fn idle(message: String, session: SessionSnapshot) -> Self {
        Self::new("idle".to_string(), message, session)
    }

    /// Pick active/idle from the snapshot itself
    pub fn from_session(message: String, session: SessionSnapshot) -> Self {
        if session.active {
            Self::active(message, session)
        } else {
            Self::idle(message, session)
        }
    }
}

/// Response for media retry and event reports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaResponse {
    pub accepted: bool,
    pub binding: u64,
    pub media: MediaLoadState,
    pub timestamp: DateTime<Utc>,
}

/// Full status of the open view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub recipe: Option<RecipeSummary>,
    pub session: Option<SessionSnapshot>,
    pub media: MediaLoadState,
    pub directive: PlaybackDirective,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Event names a client's player may report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaEventName {
    Ready,
    Error,
    Ended,
    PlayRejected,
}

/// Body of `POST /media/events`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaEventRequest {
    pub binding: u64,
    pub event: MediaEventName,
    #[serde(default)]
    pub message: Option<String>,
}

impl From<MediaEventRequest> for MediaEvent {
    fn from(request: MediaEventRequest) -> Self {
        let kind = match request.event {
            MediaEventName::Ready => MediaEventKind::Ready,
            MediaEventName::Ended => MediaEventKind::Ended,
            MediaEventName::Error => MediaEventKind::Error(
                request
                    .message
                    .unwrap_or_else(|| "Failed to load video. Please try again.".to_string()),
            ),
            MediaEventName::PlayRejected => MediaEventKind::PlayRejected(
                request
                    .message
                    .unwrap_or_else(|| "playback blocked".to_string()),
            ),
        };
        MediaEvent::new(request.binding, kind)
    }
}
