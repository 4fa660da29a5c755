//! Periodic tick sources

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};
use tokio::{runtime::Handle, time::{interval_at, Instant}};
use tracing::debug;

/// Callback invoked on every tick
pub type TickFn = Arc<dyn Fn() + Send + Sync + 'static>;

/// "Notify me every `period` until cancelled"
pub trait Scheduler: Send + Sync {
    fn every(&self, period: Duration, tick: TickFn) -> TickRegistration;
}

/// Cancellation handle for a periodic registration. Dropping it cancels too.
pub struct TickRegistration {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl TickRegistration {
    pub fn new<F>(cancel: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self { cancel: Some(Box::new(cancel)) }
    }

    pub fn cancel(mut self) {
        self.run_cancel();
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for TickRegistration {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl std::fmt::Debug for TickRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickRegistration")
            .field("live", &self.cancel.is_some())
            .finish()
    }
}

/// Scheduler backed by a tokio interval task per registration
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    runtime: Handle,
}

impl TokioScheduler {
    pub fn new(runtime: Handle) -> Self {
        Self { runtime }
    }

    /// Use the runtime of the calling task. Panics outside a tokio runtime.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }
}

impl Scheduler for TokioScheduler {
    fn every(&self, period: Duration, tick: TickFn) -> TickRegistration {
        let task = self.runtime.spawn(async move {
            // First tick lands one full period after registration
            let mut interval = interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                tick();
            }
        });

        TickRegistration::new(move || {
            debug!("Cancelling tick task");
            task.abort();
        })
    }
}

struct Slot {
    id: u64,
    tick: TickFn,
}

#[derive(Default)]
struct ManualSlots {
    next_id: u64,
    live: Vec<Slot>,
}

/// Scheduler that only ticks when told to, for deterministic driving
#[derive(Clone, Default)]
pub struct ManualScheduler {
    slots: Arc<Mutex<ManualSlots>>,
}

/// A tick that was already dispatched; running it models an in-flight callback
#[derive(Clone)]
pub struct PendingTick(TickFn);

impl PendingTick {
    pub fn run(&self) {
        (self.0)();
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire every live registration once. Returns how many fired.
    pub fn fire(&self) -> usize {
        let pending = self.dispatch();
        for tick in &pending {
            tick.run();
        }
        pending.len()
    }

    /// Fire `n` rounds
    pub fn fire_times(&self, n: usize) {
        for _ in 0..n {
            self.fire();
        }
    }

    /// Capture the callbacks of every live registration without running them
    pub fn dispatch(&self) -> Vec<PendingTick> {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .live
            .iter()
            .map(|slot| PendingTick(slot.tick.clone()))
            .collect()
    }

    /// Number of registrations not yet cancelled
    pub fn live_registrations(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .live
            .len()
    }
}

impl Scheduler for ManualScheduler {
    fn every(&self, _period: Duration, tick: TickFn) -> TickRegistration {
        let id = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.next_id += 1;
            let id = slots.next_id;
            slots.live.push(Slot { id, tick });
            id
        };

        let slots = Arc::clone(&self.slots);
        TickRegistration::new(move || {
            slots
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .live
                .retain(|slot| slot.id != id);
        })
    }
}
