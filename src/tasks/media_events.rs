//! Media event background task

use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::state::AppState;

/// Background task that forwards media events to the open view's controller
pub async fn media_event_task(state: Arc<AppState>) {
    info!("Starting media event task");

    let mut events_rx = state.media.subscribe_events();

    loop {
        match events_rx.recv().await {
            Ok(event) => {
                debug!("Media event task received {:?}", event);
                state.dispatch_media_event(&event);
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Media event task lagged, skipped {} events", skipped);
            }
            Err(RecvError::Closed) => {
                info!("Media event channel closed, stopping media event task");
                break;
            }
        }
    }
}
