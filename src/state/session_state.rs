//! Cook session snapshot and display helpers

use serde::{Deserialize, Serialize};

/// Fixed cook-along target: five minutes
pub const TARGET_SECONDS: u64 = 5 * 60;

/// Observable view of a cook session, published on every transition and tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub active: bool,
    pub elapsed_seconds: u64,
    pub target_seconds: u64,
    /// Elapsed time as `MM:SS`
    pub formatted: String,
    /// Elapsed time as a percentage of the target, capped at 100
    pub progress: f64,
}

impl SessionSnapshot {
    /// Build a snapshot from the raw counter values
    pub fn new(active: bool, elapsed_seconds: u64, target_seconds: u64) -> Self {
        Self {
            active,
            elapsed_seconds,
            target_seconds,
            formatted: format_elapsed(elapsed_seconds),
            progress: progress_percent(elapsed_seconds, target_seconds),
        }
    }

    /// Idle snapshot with nothing elapsed
    pub fn idle(target_seconds: u64) -> Self {
        Self::new(false, 0, target_seconds)
    }
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self::idle(TARGET_SECONDS)
    }
}

/// Format seconds as zero-padded `MM:SS`.
///
/// Minutes are not wrapped, so an hour-long session reads `60:00`.
pub fn format_elapsed(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Percentage of `target_seconds` covered by `elapsed_seconds`, saturating at 100
pub fn progress_percent(elapsed_seconds: u64, target_seconds: u64) -> f64 {
    if target_seconds == 0 {
        return 100.0;
    }
    (elapsed_seconds as f64 / target_seconds as f64 * 100.0).min(100.0)
}
