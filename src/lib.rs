//! Cook Along - a recipe cook-along timer kept in step with the recipe video
//!
//! This library provides the cook-along session controller, the media binding
//! it drives, and the HTTP surface a browser client uses to follow along.

pub mod config;
pub mod error;
pub mod state;
pub mod media;
pub mod session;
pub mod recipe;
pub mod api;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::MediaError;
pub use state::AppState;
pub use media::MediaHandle;
pub use session::CookAlongController;
pub use api::create_router;
pub use utils::signals::shutdown_signal;
