use std::sync::Arc;

use cook_along::{
    media::{MediaEvent, MediaEventKind, MediaHandle, PlayerCall, RecordingPlayer},
    session::{ControllerOptions, CookAlongController, ManualScheduler},
    state::MediaLoadState,
};

struct Rig {
    scheduler: ManualScheduler,
    player: Arc<RecordingPlayer>,
    media: Arc<MediaHandle>,
    controller: CookAlongController,
}

fn rig() -> Rig {
    let scheduler = ManualScheduler::new();
    let player = Arc::new(RecordingPlayer::new());
    let media = Arc::new(MediaHandle::new(player.clone()));
    let binding = media.attach("videos/breakfast-chia-pudding.mp4");
    media.handle_event(MediaEvent::new(binding, MediaEventKind::Ready));
    player.clear();

    let controller = CookAlongController::new(
        Arc::clone(&media),
        Arc::new(scheduler.clone()),
        ControllerOptions::default(),
    );
    Rig { scheduler, player, media, controller }
}

#[test]
fn start_always_begins_from_zero() {
    let rig = rig();
    rig.controller.start();
    rig.scheduler.fire_times(47);
    assert_eq!(rig.controller.elapsed_seconds(), 47);

    rig.controller.start();
    assert_eq!(rig.controller.elapsed_seconds(), 0);
    assert_eq!(rig.controller.formatted_elapsed(), "00:00");
}

#[test]
fn restart_after_stop_does_not_resume() {
    let rig = rig();
    rig.controller.start();
    rig.scheduler.fire_times(10);
    rig.controller.stop();
    assert_eq!(rig.controller.elapsed_seconds(), 10);

    rig.controller.start();
    rig.scheduler.fire();
    assert_eq!(rig.controller.elapsed_seconds(), 1);
}

#[test]
fn double_start_installs_one_tick_source() {
    let rig = rig();
    rig.controller.start();
    rig.controller.start();
    assert_eq!(rig.scheduler.live_registrations(), 1);

    rig.scheduler.fire_times(3);
    assert_eq!(rig.controller.elapsed_seconds(), 3);
}

#[test]
fn tick_in_flight_at_stop_is_discarded() {
    let rig = rig();
    rig.controller.start();
    rig.scheduler.fire_times(5);

    // Dispatched before stop, delivered after it
    let in_flight = rig.scheduler.dispatch();
    rig.controller.stop();
    for tick in &in_flight {
        tick.run();
    }

    assert_eq!(rig.controller.elapsed_seconds(), 5);
    assert!(!rig.controller.is_active());
}

#[test]
fn tick_from_previous_start_is_discarded() {
    let rig = rig();
    rig.controller.start();
    let stale = rig.scheduler.dispatch();
    rig.controller.start();

    for tick in &stale {
        tick.run();
    }
    assert_eq!(rig.controller.elapsed_seconds(), 0);

    rig.scheduler.fire();
    assert_eq!(rig.controller.elapsed_seconds(), 1);
}

#[test]
fn elapsed_follows_command_sequence() {
    let rig = rig();
    let commands = [0, 1, 2, 0, 0, 2, 1, 1, 2, 0, 2, 1];
    let mut expected = 0;
    let mut active = false;

    for (step, command) in commands.iter().enumerate() {
        let before = rig.controller.elapsed_seconds();
        match command {
            0 => {
                rig.controller.start();
                active = true;
                expected = 0;
            }
            1 => {
                rig.controller.stop();
                active = false;
                assert_eq!(rig.controller.elapsed_seconds(), before, "stop at step {}", step);
            }
            _ => {
                rig.controller.reset();
                expected = 0;
            }
        }
        assert_eq!(rig.controller.elapsed_seconds(), expected, "after command {}", step);
        assert_eq!(rig.controller.is_active(), active);

        let ticks = step % 3 + 1;
        rig.scheduler.fire_times(ticks);
        if active {
            expected += ticks as u64;
        }
        assert_eq!(rig.controller.elapsed_seconds(), expected, "after ticks {}", step);
    }
}

#[test]
fn reset_while_active_keeps_session_running() {
    let rig = rig();
    rig.controller.start();
    rig.scheduler.fire_times(30);
    rig.player.clear();

    rig.controller.reset();
    assert!(rig.controller.is_active());
    assert_eq!(rig.controller.elapsed_seconds(), 0);
    assert_eq!(rig.player.calls(), vec![PlayerCall::SeekToStart]);

    rig.scheduler.fire_times(2);
    assert_eq!(rig.controller.elapsed_seconds(), 2);
}

#[test]
fn reset_while_idle_stays_idle() {
    let rig = rig();
    rig.controller.start();
    rig.scheduler.fire_times(8);
    rig.controller.stop();

    rig.controller.reset();
    assert!(!rig.controller.is_active());
    assert_eq!(rig.controller.elapsed_seconds(), 0);
}

#[test]
fn progress_saturates_for_long_sessions() {
    let rig = rig();
    rig.controller.start();

    rig.scheduler.fire_times(299);
    assert!((rig.controller.progress_percent() - 99.67).abs() < 0.01);

    rig.scheduler.fire();
    assert_eq!(rig.controller.progress_percent(), 100.0);
    assert_eq!(rig.controller.formatted_elapsed(), "05:00");

    rig.scheduler.fire_times(300);
    assert_eq!(rig.controller.progress_percent(), 100.0);
    assert_eq!(rig.controller.formatted_elapsed(), "10:00");
}

#[test]
fn play_rejection_does_not_stop_session() {
    let rig = rig();
    rig.player.set_reject_play(Some("playback blocked"));

    rig.controller.start();
    rig.scheduler.fire_times(2);

    assert!(rig.controller.is_active());
    assert_eq!(rig.controller.elapsed_seconds(), 2);
}

#[test]
fn late_play_rejection_after_stop_is_ignored() {
    let rig = rig();
    rig.controller.start();
    rig.scheduler.fire_times(4);
    rig.controller.stop();

    let rejection = MediaEvent::new(
        rig.media.binding(),
        MediaEventKind::PlayRejected("playback blocked".into()),
    );
    rig.media.handle_event(rejection.clone());
    rig.controller.on_media_event(&rejection);

    assert!(!rig.controller.is_active());
    assert_eq!(rig.controller.elapsed_seconds(), 4);
}

#[test]
fn timer_runs_without_video() {
    let scheduler = ManualScheduler::new();
    let player = Arc::new(RecordingPlayer::new());
    let media = Arc::new(MediaHandle::new(player.clone()));
    let binding = media.attach("videos/missing.mp4");
    media.handle_event(MediaEvent::new(binding, MediaEventKind::Error("404".into())));

    let controller =
        CookAlongController::new(Arc::clone(&media), Arc::new(scheduler.clone()), Default::default());
    controller.start();
    scheduler.fire_times(65);

    assert_eq!(media.load_state(), MediaLoadState::Error("404".into()));
    assert_eq!(controller.formatted_elapsed(), "01:05");
    // Neither the seek nor the play reached the backend
    assert_eq!(player.count(&PlayerCall::SeekToStart), 0);
    assert_eq!(player.count(&PlayerCall::Play), 0);
}

#[test]
fn teardown_cancels_ticks_and_releases_media() {
    let rig = rig();
    rig.controller.start();
    let in_flight = rig.scheduler.dispatch();
    rig.controller.teardown();

    for tick in &in_flight {
        tick.run();
    }
    assert_eq!(rig.scheduler.live_registrations(), 0);
    assert_eq!(rig.controller.elapsed_seconds(), 0);
    assert!(rig.media.current_resource().is_none());
}
