//! State management module
//!
//! This module contains the session and media state structures and the
//! application state that owns the open recipe view.

pub mod session_state;
pub mod media_state;
pub mod app_state;

// Re-export main types
pub use session_state::{format_elapsed, progress_percent, SessionSnapshot, TARGET_SECONDS};
pub use media_state::{MediaLoadState, PlaybackDirective};
pub use app_state::{AppState, RecipeView};
