//! Cook-along session controller

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    time::Duration,
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::{Scheduler, TickRegistration};
use crate::{
    media::{MediaEvent, MediaEventKind, MediaHandle, PlayOutcome},
    state::{format_elapsed, progress_percent, SessionSnapshot, TARGET_SECONDS},
};

/// Controller tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerOptions {
    pub target_seconds: u64,
    pub tick_period: Duration,
    /// Stop the session when the bound media reports end of stream
    pub stop_on_media_end: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            target_seconds: TARGET_SECONDS,
            tick_period: Duration::from_secs(1),
            stop_on_media_end: false,
        }
    }
}

#[derive(Debug, Default)]
struct Session {
    active: bool,
    elapsed_seconds: u64,
    /// Bumped on every start/stop/teardown; ticks from older generations are ignored
    generation: u64,
    registration: Option<TickRegistration>,
    /// Media rewind epoch of the latest seek-to-start issued for this session
    media_epoch: u64,
}

#[derive(Debug)]
struct Shared {
    session: Mutex<Session>,
    target_seconds: u64,
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, session: &Session) {
        self.snapshot_tx.send_replace(SessionSnapshot::new(
            session.active,
            session.elapsed_seconds,
            self.target_seconds,
        ));
    }

    fn on_tick(&self, generation: u64) -> bool {
        let mut session = self.lock();
        if !session.active || session.generation != generation {
            debug!("Dropping stale tick for generation {}", generation);
            return false;
        }
        session.elapsed_seconds += 1;
        self.publish(&session);
        true
    }
}

/// Owns the "is cooking" state and the elapsed counter for one recipe view,
/// and keeps the bound media in step with session transitions.
pub struct CookAlongController {
    shared: Arc<Shared>,
    media: Arc<MediaHandle>,
    scheduler: Arc<dyn Scheduler>,
    options: ControllerOptions,
}

impl CookAlongController {
    pub fn new(
        media: Arc<MediaHandle>,
        scheduler: Arc<dyn Scheduler>,
        options: ControllerOptions,
    ) -> Self {
        let (snapshot_tx, _) = watch::channel(SessionSnapshot::idle(options.target_seconds));

        Self {
            shared: Arc::new(Shared {
                session: Mutex::new(Session::default()),
                target_seconds: options.target_seconds,
                snapshot_tx,
            }),
            media,
            scheduler,
            options,
        }
    }

    /// Begin a session from zero and start the bound media from the top.
    ///
    /// Calling this while already active restarts the session; the previous
    /// tick registration is cancelled before the new one is installed.
    pub fn start(&self) {
        {
            let mut session = self.shared.lock();
            if let Some(previous) = session.registration.take() {
                debug!("Replacing live tick registration");
                previous.cancel();
            }

            session.generation += 1;
            session.active = true;
            session.elapsed_seconds = 0;

            let generation = session.generation;
            let shared: Weak<Shared> = Arc::downgrade(&self.shared);
            session.registration = Some(self.scheduler.every(
                self.options.tick_period,
                Arc::new(move || {
                    if let Some(shared) = shared.upgrade() {
                        shared.on_tick(generation);
                    }
                }),
            ));
            self.shared.publish(&session);
            info!("Cook-along session started (generation {})", generation);
        }

        self.play_from_start();
    }

    /// End the session. No tick is applied after this returns; elapsed is kept.
    pub fn stop(&self) {
        self.stop_locked(&mut self.shared.lock());
        self.media.pause();
    }

    fn stop_locked(&self, session: &mut Session) {
        if let Some(registration) = session.registration.take() {
            registration.cancel();
        }
        session.generation += 1;
        if session.active {
            info!(
                "Cook-along session stopped at {}",
                format_elapsed(session.elapsed_seconds)
            );
        }
        session.active = false;
        self.shared.publish(session);
    }

    fn rewind_media(&self) {
        self.media.seek_to_start();
        let epoch = self.media.rewind_epoch();
        let mut session = self.shared.lock();
        session.media_epoch = session.media_epoch.max(epoch);
    }

    fn play_from_start(&self) {
        self.rewind_media();
        match self.media.play() {
            PlayOutcome::Accepted => debug!("Playback started"),
            PlayOutcome::Rejected(reason) => {
                warn!("Playback rejected, session continues: {}", reason)
            }
        }
    }

    /// Zero the counter and rewind the media; active state is unchanged
    pub fn reset(&self) {
        {
            let mut session = self.shared.lock();
            session.elapsed_seconds = 0;
            self.shared.publish(&session);
        }

        debug!("Cook-along timer reset");
        self.rewind_media();
    }

    /// Cancel any live tick, clear the session and release the media binding
    pub fn teardown(&self) {
        {
            let mut session = self.shared.lock();
            if let Some(registration) = session.registration.take() {
                registration.cancel();
            }
            session.generation += 1;
            session.active = false;
            session.elapsed_seconds = 0;
            self.shared.publish(&session);
        }

        self.media.detach();
        debug!("Cook-along controller torn down");
    }

    /// React to a notification from the bound media
    pub fn on_media_event(&self, event: &MediaEvent) {
        let stale = event.binding != self.media.binding();

        match &event.kind {
            MediaEventKind::Ended => {
                let stopped = {
                    let mut session = self.shared.lock();
                    if stale || !session.active || event.rewind_epoch < session.media_epoch {
                        debug!("Ignoring end of stream outside the current playback");
                        false
                    } else if self.options.stop_on_media_end {
                        info!("Media ended, stopping cook-along session");
                        self.stop_locked(&mut session);
                        true
                    } else {
                        debug!("Media ended, session continues");
                        false
                    }
                };
                if stopped {
                    self.media.pause();
                }
            }
            MediaEventKind::PlayRejected(reason) => {
                if stale || !self.is_active() {
                    debug!("Discarding stale play rejection: {}", reason);
                } else {
                    warn!("Playback rejected during session, timer continues: {}", reason);
                }
            }
            MediaEventKind::Error(message) => {
                debug!("Media error, timer unaffected: {}", message);
            }
            MediaEventKind::Ready => {
                if !stale && self.is_active() {
                    info!("Media ready during session, starting playback");
                    self.play_from_start();
                }
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.shared.lock().active
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.shared.lock().elapsed_seconds
    }

    /// Elapsed time as `MM:SS`
    pub fn formatted_elapsed(&self) -> String {
        format_elapsed(self.elapsed_seconds())
    }

    pub fn progress_percent(&self) -> f64 {
        progress_percent(self.elapsed_seconds(), self.options.target_seconds)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let session = self.shared.lock();
        SessionSnapshot::new(session.active, session.elapsed_seconds, self.options.target_seconds)
    }

    /// Watch snapshots, published on every transition and tick
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.shared.snapshot_tx.subscribe()
    }

    pub fn media(&self) -> &Arc<MediaHandle> {
        &self.media
    }
}

impl Drop for CookAlongController {
    fn drop(&mut self) {
        // The media binding may already belong to a newer view, so only the tick is released here
        let mut session = self.shared.lock();
        session.generation += 1;
        session.active = false;
        if let Some(registration) = session.registration.take() {
            registration.cancel();
        }
    }
}

impl std::fmt::Debug for CookAlongController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookAlongController")
            .field("session", &self.snapshot())
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        media::{PlayerCall, RecordingPlayer},
        session::ManualScheduler,
    };

    fn controller() -> (ManualScheduler, Arc<RecordingPlayer>, CookAlongController) {
        let scheduler = ManualScheduler::new();
        let player = Arc::new(RecordingPlayer::new());
        let media = Arc::new(MediaHandle::new(player.clone()));
        let binding = media.attach("videos/chia.mp4");
        media.handle_event(MediaEvent::new(binding, MediaEventKind::Ready));
        player.clear();

        let controller = CookAlongController::new(
            media,
            Arc::new(scheduler.clone()),
            ControllerOptions::default(),
        );
        (scheduler, player, controller)
    }

    #[test]
    fn start_seeks_then_plays() {
        let (scheduler, player, controller) = controller();
        controller.start();

        assert!(controller.is_active());
        assert_eq!(scheduler.live_registrations(), 1);
        assert_eq!(player.calls(), vec![PlayerCall::SeekToStart, PlayerCall::Play]);
    }

    #[test]
    fn ticks_only_advance_while_active() {
        let (scheduler, _player, controller) = controller();
        scheduler.fire();
        assert_eq!(controller.elapsed_seconds(), 0);

        controller.start();
        scheduler.fire_times(65);
        assert_eq!(controller.formatted_elapsed(), "01:05");

        controller.stop();
        scheduler.fire_times(10);
        assert_eq!(controller.elapsed_seconds(), 65);
        assert!(!controller.is_active());
    }

    #[test]
    fn stop_pauses_media() {
        let (_scheduler, player, controller) = controller();
        controller.start();
        controller.stop();
        assert_eq!(player.calls().last(), Some(&PlayerCall::Pause));
    }

    #[test]
    fn drop_cancels_registration() {
        let (scheduler, _player, controller) = controller();
        controller.start();
        drop(controller);
        assert_eq!(scheduler.live_registrations(), 0);
    }

    #[test]
    fn teardown_releases_media() {
        let (scheduler, player, controller) = controller();
        controller.start();
        scheduler.fire_times(4);
        controller.teardown();

        assert_eq!(scheduler.live_registrations(), 0);
        assert_eq!(controller.snapshot(), SessionSnapshot::idle(TARGET_SECONDS));
        assert!(controller.media().current_resource().is_none());
        assert!(player.calls().contains(&PlayerCall::Release(1)));
    }

    #[test]
    fn media_end_stops_when_configured() {
        let scheduler = ManualScheduler::new();
        let player = Arc::new(RecordingPlayer::new());
        let media = Arc::new(MediaHandle::new(player));
        let binding = media.attach("videos/oats.mp4");
        let controller = CookAlongController::new(
            media,
            Arc::new(scheduler.clone()),
            ControllerOptions { stop_on_media_end: true, ..Default::default() },
        );

        controller.start();
        scheduler.fire_times(2);
        controller.on_media_event(&MediaEvent::new(binding, MediaEventKind::Ended));

        assert!(!controller.is_active());
        assert_eq!(controller.elapsed_seconds(), 2);
    }

    #[test]
    fn ready_during_session_starts_playback() {
        let scheduler = ManualScheduler::new();
        let player = Arc::new(RecordingPlayer::new());
        let media = Arc::new(MediaHandle::new(player.clone()));
        let binding = media.attach("videos/oats.mp4");
        let controller = CookAlongController::new(
            Arc::clone(&media),
            Arc::new(scheduler.clone()),
            ControllerOptions::default(),
        );

        controller.start();
        assert_eq!(player.count(&PlayerCall::Play), 0);

        let ready = MediaEvent::new(binding, MediaEventKind::Ready);
        media.handle_event(ready.clone());
        controller.on_media_event(&ready);
        assert_eq!(player.count(&PlayerCall::SeekToStart), 1);
        assert_eq!(player.count(&PlayerCall::Play), 1);
    }

    #[test]
    fn ready_while_idle_does_not_play() {
        let (_scheduler, player, controller) = controller();
        let binding = controller.media().binding();
        controller.on_media_event(&MediaEvent::new(binding, MediaEventKind::Ready));
        assert!(player.calls().is_empty());
    }

    #[test]
    fn end_of_previous_playback_does_not_stop_restart() {
        let scheduler = ManualScheduler::new();
        let player = Arc::new(RecordingPlayer::new());
        let media = Arc::new(MediaHandle::new(player));
        let binding = media.attach("videos/oats.mp4");
        media.handle_event(MediaEvent::new(binding, MediaEventKind::Ready));
        let controller = CookAlongController::new(
            Arc::clone(&media),
            Arc::new(scheduler.clone()),
            ControllerOptions { stop_on_media_end: true, ..Default::default() },
        );
        let mut events = media.subscribe_events();

        controller.start();
        media.handle_event(MediaEvent::new(binding, MediaEventKind::Ended));
        let ended = events.try_recv().unwrap();

        // Restart lands before the reactor gets to the old end of stream
        controller.start();
        controller.on_media_event(&ended);
        assert!(controller.is_active());

        media.handle_event(MediaEvent::new(binding, MediaEventKind::Ended));
        controller.on_media_event(&events.try_recv().unwrap());
        assert!(!controller.is_active());
    }

    #[test]
    fn media_end_ignored_by_default() {
        let (_scheduler, _player, controller) = controller();
        controller.start();
        let binding = controller.media().binding();
        controller.on_media_event(&MediaEvent::new(binding, MediaEventKind::Ended));
        assert!(controller.is_active());
    }

    #[tokio::test]
    async fn subscribers_see_ticks() {
        let (scheduler, _player, controller) = controller();
        let mut snapshots = controller.subscribe();

        controller.start();
        scheduler.fire();
        snapshots.changed().await.unwrap();

        let snapshot = snapshots.borrow().clone();
        assert!(snapshot.active);
        assert_eq!(snapshot.elapsed_seconds, 1);
        assert_eq!(snapshot.formatted, "00:01");
    }
}
