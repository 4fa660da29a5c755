//! Media playback module
//!
//! A [`MediaHandle`] owns one resource binding at a time and drives a
//! [`Player`] backend; the presentation layer only observes its state.

pub mod handle;
pub mod player;

// Re-export main types
pub use handle::{MediaEvent, MediaEventKind, MediaHandle, PlayOutcome};
pub use player::{ClientPlayer, Player, PlayerCall, RecordingPlayer};
