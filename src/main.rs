//! Cook Along - recipe cook-along timer service
//!
//! This is the main entry point for the cook-along application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use cook_along::{
    api::create_router,
    config::Config,
    recipe::RecipeCatalog,
    session::TokioScheduler,
    state::AppState,
    tasks::media_event_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("cook_along={},tower_http=info", config.log_level()))
        .init();

    info!("Starting cook-along server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, stop_on_end={}",
          config.host, config.port, config.stop_on_end);

    let catalog = match &config.recipes {
        Some(path) => RecipeCatalog::load(path)?,
        None => {
            info!("No recipe catalog given, serving built-in breakfast recipes");
            RecipeCatalog::builtin()
        }
    };

    // Create application state
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        catalog,
        Arc::new(TokioScheduler::current()),
        config.controller_options(),
    ));

    // Forward media events to the open view's controller
    let event_state = Arc::clone(&state);
    tokio::spawn(async move {
        media_event_task(event_state).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /recipes           - List recipes");
    info!("  GET  /recipes/:id       - Recipe details");
    info!("  POST /recipes/:id/open  - Open a recipe view");
    info!("  POST /view/close        - Close the current view");
    info!("  POST /cook/start        - Start cooking along");
    info!("  POST /cook/stop         - Stop cooking");
    info!("  POST /cook/reset        - Reset the timer");
    info!("  POST /media/retry       - Reload the recipe video");
    info!("  POST /media/events      - Report player events");
    info!("  GET  /status            - Current session status");
    info!("  GET  /health            - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    // Release any live tick and the media binding before exit
    state.close_view();

    info!("Server shutdown complete");
    Ok(())
}
