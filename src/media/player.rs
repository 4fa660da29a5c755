//! Playback backends driven by a [`MediaHandle`](super::MediaHandle)

use std::sync::{Mutex, PoisonError};
use tokio::sync::watch;
use tracing::debug;

use crate::{error::MediaError, state::PlaybackDirective};

/// The playback surface behind a media binding.
///
/// Load completion, errors and end-of-stream are not returned from these
/// calls; the media subsystem reports them later through
/// [`MediaHandle::handle_event`](super::MediaHandle::handle_event).
pub trait Player: Send + Sync {
    /// Begin loading `resource` under the given binding generation
    fn load(&self, binding: u64, resource: &str) -> Result<(), MediaError>;

    /// Drop everything associated with `binding`
    fn release(&self, binding: u64);

    fn seek_to_start(&self);

    /// Request playback; `Err(PlaybackRejected)` when the environment refuses
    fn play(&self) -> Result<(), MediaError>;

    fn pause(&self);
}

/// Player that publishes directives for a remote client to apply.
///
/// The browser owns the real `<video>` element: it watches the directive
/// (via `GET /status`), loads the resource, honours `playing` and applies
/// each new `seek_epoch` once, then posts its load/end events back.
#[derive(Debug)]
pub struct ClientPlayer {
    directive_tx: watch::Sender<PlaybackDirective>,
}

impl ClientPlayer {
    pub fn new() -> Self {
        let (directive_tx, _) = watch::channel(PlaybackDirective::default());
        Self { directive_tx }
    }

    /// Current directive
    pub fn directive(&self) -> PlaybackDirective {
        self.directive_tx.borrow().clone()
    }
}

impl Default for ClientPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Player for ClientPlayer {
    fn load(&self, binding: u64, resource: &str) -> Result<(), MediaError> {
        if resource.trim().is_empty() {
            return Err(MediaError::LoadError("empty media reference".to_string()));
        }

        debug!("Client player loading {} (binding {})", resource, binding);
        self.directive_tx.send_modify(|directive| {
            directive.binding = binding;
            directive.resource = Some(resource.to_string());
            directive.playing = false;
        });
        Ok(())
    }

    fn release(&self, binding: u64) {
        self.directive_tx.send_if_modified(|directive| {
            if directive.binding != binding {
                return false;
            }
            directive.resource = None;
            directive.playing = false;
            true
        });
    }

    fn seek_to_start(&self) {
        self.directive_tx
            .send_modify(|directive| directive.seek_epoch += 1);
    }

    fn play(&self) -> Result<(), MediaError> {
        let mut accepted = false;
        self.directive_tx.send_if_modified(|directive| {
            if directive.resource.is_none() {
                return false;
            }
            accepted = true;
            let changed = !directive.playing;
            directive.playing = true;
            changed
        });

        if accepted {
            Ok(())
        } else {
            Err(MediaError::PlaybackRejected("resource unavailable".to_string()))
        }
    }

    fn pause(&self) {
        self.directive_tx.send_if_modified(|directive| {
            let changed = directive.playing;
            directive.playing = false;
            changed
        });
    }
}

/// A call observed by [`RecordingPlayer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerCall {
    Load(u64, String),
    Release(u64),
    SeekToStart,
    Play,
    Pause,
}

/// In-memory player that records every call, for headless runs and tests
#[derive(Debug, Default)]
pub struct RecordingPlayer {
    calls: Mutex<Vec<PlayerCall>>,
    reject_play: Mutex<Option<String>>,
}

impl RecordingPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `play` calls fail with `reason`, or succeed again with `None`
    pub fn set_reject_play(&self, reason: Option<&str>) {
        *self.reject_play.lock().unwrap_or_else(PoisonError::into_inner) =
            reason.map(str::to_string);
    }

    pub fn calls(&self) -> Vec<PlayerCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of recorded calls equal to `call`
    pub fn count(&self, call: &PlayerCall) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|c| *c == call)
            .count()
    }

    pub fn clear(&self) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn record(&self, call: PlayerCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

impl Player for RecordingPlayer {
    fn load(&self, binding: u64, resource: &str) -> Result<(), MediaError> {
        self.record(PlayerCall::Load(binding, resource.to_string()));
        Ok(())
    }

    fn release(&self, binding: u64) {
        self.record(PlayerCall::Release(binding));
    }

    fn seek_to_start(&self) {
        self.record(PlayerCall::SeekToStart);
    }

    fn play(&self) -> Result<(), MediaError> {
        self.record(PlayerCall::Play);
        match self
            .reject_play
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            Some(reason) => Err(MediaError::PlaybackRejected(reason)),
            None => Ok(()),
        }
    }

    fn pause(&self) {
        self.record(PlayerCall::Pause);
    }
}
