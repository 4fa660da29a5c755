//! Cook-along session module
//!
//! The controller owns the elapsed counter; schedulers supply its ticks.

pub mod controller;
pub mod scheduler;

// Re-export main types
pub use controller::{ControllerOptions, CookAlongController};
pub use scheduler::{
    ManualScheduler, PendingTick, Scheduler, TickFn, TickRegistration, TokioScheduler,
};
