//! DevGotchi Timer - persistent timer service for the DevGotchi widget
//!
//! This is the main entry point for the devgotchi-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use devgotchi_timer::{
    api::create_router,
    config::Config,
    state::AppState,
    storage::{FileStore, KeyValueStore, MemoryStore},
    tasks::spawn_timer_ticker,
    timer::{PersistentTimer, SystemClock},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("devgotchi_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting devgotchi-timer v{}", env!("CARGO_PKG_VERSION"));

    let store: Arc<dyn KeyValueStore> = if config.ephemeral {
        info!("Using in-memory timer storage");
        Arc::new(MemoryStore::new())
    } else {
        let dir = config.state_dir();
        info!("Persisting timer state in {}", dir.display());
        Arc::new(FileStore::new(dir))
    };

    // Attach resumes any run left in storage by a previous process
    let timer = PersistentTimer::attach(store, Arc::new(SystemClock), config.storage_key.clone());
    let state = Arc::new(AppState::new(
        timer,
        config.port,
        config.host.clone(),
        config.tick_interval(),
    ));

    let ticker = spawn_timer_ticker(Arc::clone(&state))?;

    let app = create_router(state);

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /timer                    - Current timer snapshot");
    info!("  POST /timer/add                - Stage minutes while idle");
    info!("  POST /timer/start              - Start countdown or countup");
    info!("  POST /timer/reset              - Stop and clear the timer");
    info!("  POST /api/timer/set            - Queue a voice timer command");
    info!("  GET  /api/timer/pending        - Take the queued command");
    info!("  POST /api/timer/pending/apply  - Apply the queued command");
    info!("  GET  /status                   - Timer and server status");
    info!("  GET  /health                   - Health check");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            info!("Shutdown signal received");
        })
        .await?;

    // Leave the persisted run in place; the next start resumes it
    ticker.dispose().await;
    info!("Server shutdown complete");
    Ok(())
}
