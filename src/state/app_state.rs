//! Main application state management

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::{MediaLoadState, PlaybackDirective, SessionSnapshot};
use crate::{
    media::{ClientPlayer, MediaEvent, MediaHandle},
    recipe::{Recipe, RecipeCatalog},
    session::{ControllerOptions, CookAlongController, Scheduler},
};

/// The recipe currently on screen and its cook-along controller
#[derive(Debug)]
pub struct RecipeView {
    pub recipe: Recipe,
    pub controller: CookAlongController,
}

/// Main application state that owns the catalog, the media binding and the open view
pub struct AppState {
    /// Recipe lookup
    pub catalog: RecipeCatalog,
    /// Media binding shared by successive views
    pub media: Arc<MediaHandle>,
    /// Directive publisher the browser's video element follows
    pub player: Arc<ClientPlayer>,
    scheduler: Arc<dyn Scheduler>,
    options: ControllerOptions,
    /// At most one recipe view at a time
    view: Mutex<Option<RecipeView>>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl AppState {
    /// Create a new AppState with no open view
    pub fn new(
        port: u16,
        host: String,
        catalog: RecipeCatalog,
        scheduler: Arc<dyn Scheduler>,
        options: ControllerOptions,
    ) -> Self {
        let player = Arc::new(ClientPlayer::new());
        let media = Arc::new(MediaHandle::new(player.clone()));

        Self {
            catalog,
            media,
            player,
            scheduler,
            options,
            view: Mutex::new(None),
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
        }
    }

    /// Open a recipe view, tearing down the previous one first
    pub fn open_recipe(&self, id: &str) -> Option<Recipe> {
        let recipe = self.catalog.get(id)?.clone();

        let mut view = self.lock_view();
        if let Some(previous) = view.take() {
            info!("Closing recipe view {}", previous.recipe.id);
            previous.controller.teardown();
        }

        info!("Opening recipe view {} ({})", recipe.id, recipe.title);
        self.media.attach(&recipe.media_ref);
        *view = Some(RecipeView {
            recipe: recipe.clone(),
            controller: CookAlongController::new(
                Arc::clone(&self.media),
                Arc::clone(&self.scheduler),
                self.options,
            ),
        });
        drop(view);

        self.record_action(&format!("open:{}", recipe.id));
        Some(recipe)
    }

    /// Tear down the current view. Returns `false` if none was open.
    pub fn close_view(&self) -> bool {
        let Some(view) = self.lock_view().take() else {
            return false;
        };

        info!("Closing recipe view {}", view.recipe.id);
        view.controller.teardown();
        self.record_action("close");
        true
    }

    /// Run `action` against the open view's controller
    pub fn with_controller<F, R>(&self, action: &str, f: F) -> Option<R>
    where
        F: FnOnce(&CookAlongController) -> R,
    {
        let view = self.lock_view();
        let result = f(&view.as_ref()?.controller);
        drop(view);

        self.record_action(action);
        Some(result)
    }

    pub fn start_cooking(&self) -> Option<SessionSnapshot> {
        self.with_controller("start", |controller| {
            controller.start();
            controller.snapshot()
        })
    }

    pub fn stop_cooking(&self) -> Option<SessionSnapshot> {
        self.with_controller("stop", |controller| {
            controller.stop();
            controller.snapshot()
        })
    }

    pub fn reset_cooking(&self) -> Option<SessionSnapshot> {
        self.with_controller("reset", |controller| {
            controller.reset();
            controller.snapshot()
        })
    }

    /// Reload the open view's media. Returns the new binding generation.
    pub fn retry_media(&self) -> Option<u64> {
        if self.lock_view().is_none() {
            return None;
        }
        let binding = self.media.retry();
        self.record_action("retry");
        binding
    }

    /// Feed an event reported by the client into the media binding
    pub fn report_media_event(&self, event: MediaEvent) -> bool {
        self.media.handle_event(event)
    }

    /// Let the open view's controller react to a media event
    pub fn dispatch_media_event(&self, event: &MediaEvent) {
        if let Some(view) = self.lock_view().as_ref() {
            view.controller.on_media_event(event);
        }
    }

    /// Recipe currently open
    pub fn current_recipe(&self) -> Option<Recipe> {
        self.lock_view().as_ref().map(|view| view.recipe.clone())
    }

    /// Session snapshot of the open view
    pub fn session_snapshot(&self) -> Option<SessionSnapshot> {
        self.lock_view()
            .as_ref()
            .map(|view| view.controller.snapshot())
    }

    pub fn media_state(&self) -> MediaLoadState {
        self.media.load_state()
    }

    pub fn playback_directive(&self) -> PlaybackDirective {
        self.player.directive()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    fn record_action(&self, action: &str) {
        match self.last_action.lock() {
            Ok(mut last_action) => *last_action = Some(action.to_string()),
            Err(e) => warn!("Failed to record last action: {}", e),
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    fn lock_view(&self) -> MutexGuard<'_, Option<RecipeView>> {
        self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("recipes", &self.catalog.len())
            .field("media", &self.media)
            .field("view", &*self.lock_view())
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}
