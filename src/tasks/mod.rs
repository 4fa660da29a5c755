//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod media_events;

// Re-export main functions
pub use media_events::media_event_task;
