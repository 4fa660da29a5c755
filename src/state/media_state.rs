//! Media load state and playback directive structures

use serde::{Deserialize, Serialize};

/// Load state of the currently bound media resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum MediaLoadState {
    #[default]
    Loading,
    Ready,
    Error(String),
}

impl MediaLoadState {
    pub fn is_ready(&self) -> bool {
        matches!(self, MediaLoadState::Ready)
    }
}

/// What the presentation layer's player should currently be doing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackDirective {
    /// Binding generation the directive belongs to
    pub binding: u64,
    /// Resource to load, `None` when nothing is bound
    pub resource: Option<String>,
    pub playing: bool,
    /// Bumped on every seek-to-start so a client applies each seek once
    pub seek_epoch: u64,
}
