//! Error types for media playback

use thiserror::Error;

/// Failures reported by a media binding.
///
/// None of these are fatal to a cook session: load errors surface as
/// [`MediaLoadState::Error`](crate::state::MediaLoadState), rejections as a
/// [`PlayOutcome`](crate::media::PlayOutcome), and invalid transitions are
/// dropped after a debug log.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    /// The resource failed to become ready
    #[error("Failed to load media: {0}")]
    LoadError(String),

    /// The environment refused to start playback
    #[error("Playback rejected: {0}")]
    PlaybackRejected(String),

    /// The operation has no effect in the current load state
    #[error("Ignoring {0}: media is not ready")]
    InvalidTransition(&'static str),
}
