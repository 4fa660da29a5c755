//! Media binding: load state, playback control and event fan-out

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use super::Player;
use crate::{error::MediaError, state::MediaLoadState};

/// Notification raised by the media subsystem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaEventKind {
    Ready,
    Error(String),
    Ended,
    /// Asynchronous refusal of an earlier `play` request
    PlayRejected(String),
}

/// A media event tagged with the binding generation it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaEvent {
    pub binding: u64,
    pub kind: MediaEventKind,
    /// Rewind count of the handle when the event was accepted; stamped by
    /// [`MediaHandle::handle_event`], so playback that ended before a later
    /// seek-to-start can be told apart from the current run
    #[serde(default)]
    pub rewind_epoch: u64,
}

impl MediaEvent {
    pub fn new(binding: u64, kind: MediaEventKind) -> Self {
        Self { binding, kind, rewind_epoch: 0 }
    }
}

/// Result of a play request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    Accepted,
    Rejected(String),
}

impl PlayOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, PlayOutcome::Accepted)
    }
}

#[derive(Debug, Default)]
struct Binding {
    generation: u64,
    resource: Option<String>,
    /// Seeks to start forwarded to the player, across bindings
    rewinds: u64,
}

/// Exclusive owner of one media resource binding at a time.
///
/// Every `attach`/`detach` bumps the binding generation; events carrying an
/// older generation are discarded, so listeners of a released resource can
/// never affect the current one.
pub struct MediaHandle {
    player: Arc<dyn Player>,
    binding: Mutex<Binding>,
    load_state_tx: watch::Sender<MediaLoadState>,
    events_tx: broadcast::Sender<MediaEvent>,
}

impl MediaHandle {
    pub fn new(player: Arc<dyn Player>) -> Self {
        let (load_state_tx, _) = watch::channel(MediaLoadState::Loading);
        let (events_tx, _) = broadcast::channel(64);

        Self {
            player,
            binding: Mutex::new(Binding::default()),
            load_state_tx,
            events_tx,
        }
    }

    /// Bind `resource`, releasing any prior binding first. Returns the new generation.
    pub fn attach(&self, resource: &str) -> u64 {
        let mut binding = self.lock();
        self.release_locked(&mut binding);

        binding.generation += 1;
        binding.resource = Some(resource.to_string());
        let generation = binding.generation;
        self.set_load_state(MediaLoadState::Loading);

        info!("Attaching media {} (binding {})", resource, generation);
        if let Err(e) = self.player.load(generation, resource) {
            warn!("{}", e);
            self.set_load_state(MediaLoadState::Error(e.to_string()));
        }

        generation
    }

    /// Release the current binding without attaching a new one
    pub fn detach(&self) {
        let mut binding = self.lock();
        if binding.resource.is_none() {
            return;
        }
        self.release_locked(&mut binding);
        binding.generation += 1;
        self.set_load_state(MediaLoadState::Loading);
    }

    /// Re-attach the current resource, forcing a reload
    pub fn retry(&self) -> Option<u64> {
        let resource = self.current_resource()?;
        info!("Retrying media {}", resource);
        Some(self.attach(&resource))
    }

    pub fn load_state(&self) -> MediaLoadState {
        self.load_state_tx.borrow().clone()
    }

    /// Observe load state transitions
    pub fn subscribe_load_state(&self) -> watch::Receiver<MediaLoadState> {
        self.load_state_tx.subscribe()
    }

    /// Observe ready / error / ended / play-rejected notifications
    pub fn subscribe_events(&self) -> broadcast::Receiver<MediaEvent> {
        self.events_tx.subscribe()
    }

    /// Current binding generation
    pub fn binding(&self) -> u64 {
        self.lock().generation
    }

    pub fn current_resource(&self) -> Option<String> {
        self.lock().resource.clone()
    }

    /// Best-effort rewind; ignored unless the resource is ready
    pub fn seek_to_start(&self) {
        if !self.load_state().is_ready() {
            debug!("{}", MediaError::InvalidTransition("seek to start"));
            return;
        }
        self.lock().rewinds += 1;
        self.player.seek_to_start();
    }

    /// Number of seeks to start forwarded to the player so far
    pub fn rewind_epoch(&self) -> u64 {
        self.lock().rewinds
    }

    pub fn play(&self) -> PlayOutcome {
        if !self.load_state().is_ready() {
            return PlayOutcome::Rejected("resource unavailable".to_string());
        }

        match self.player.play() {
            Ok(()) => PlayOutcome::Accepted,
            Err(MediaError::PlaybackRejected(reason)) => PlayOutcome::Rejected(reason),
            Err(e) => PlayOutcome::Rejected(e.to_string()),
        }
    }

    /// Idempotent
    pub fn pause(&self) {
        if self.lock().resource.is_some() {
            self.player.pause();
        }
    }

    /// Apply an event from the media subsystem.
    ///
    /// Returns `false` when the event belongs to a stale binding and was dropped.
    pub fn handle_event(&self, mut event: MediaEvent) -> bool {
        let binding = self.lock();
        if binding.resource.is_none() || event.binding != binding.generation {
            debug!(
                "Discarding media event {:?} for stale binding {} (current {})",
                event.kind, event.binding, binding.generation
            );
            return false;
        }

        match &event.kind {
            MediaEventKind::Ready => {
                info!("Media ready (binding {})", event.binding);
                self.set_load_state(MediaLoadState::Ready);
            }
            MediaEventKind::Error(message) => {
                warn!("{}", MediaError::LoadError(message.clone()));
                self.set_load_state(MediaLoadState::Error(message.clone()));
            }
            MediaEventKind::Ended => debug!("Media ended (binding {})", event.binding),
            MediaEventKind::PlayRejected(reason) => {
                warn!("{}", MediaError::PlaybackRejected(reason.clone()))
            }
        }
        event.rewind_epoch = binding.rewinds;
        drop(binding);

        if self.events_tx.send(event).is_err() {
            debug!("No media event subscribers");
        }
        true
    }

    fn release_locked(&self, binding: &mut Binding) {
        if binding.resource.take().is_some() {
            debug!("Releasing media binding {}", binding.generation);
            self.player.release(binding.generation);
        }
    }

    fn set_load_state(&self, state: MediaLoadState) {
        self.load_state_tx.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            *current = state;
            true
        });
    }

    fn lock(&self) -> MutexGuard<'_, Binding> {
        self.binding.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for MediaHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaHandle")
            .field("binding", &*self.lock())
            .field("load_state", &self.load_state())
            .finish()
    }
}
