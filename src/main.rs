use std::{error::Error, sync::Arc};

use taskmaster_server::{
    app_state::AppState,
    build_app,
    clock::SystemClock,
    data_context::DataContext,
    in_memory::InMemoryTaskStore,
    settings::{Settings, StoreMode},
    task_store::{IndexField, TaskStore},
    telemetry,
};
use tokio::{net::TcpListener, signal};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        tracing::error!(error = %e, "server stopped");
        eprintln!("taskmaster: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    // ── Configuration ──────────────────────────────────────────
    dotenvy::dotenv().ok();
    let settings = Settings::load()?;
    telemetry::init(&settings);

    // ── Store ──────────────────────────────────────────────────
    let store: Arc<dyn TaskStore> = match settings.store {
        StoreMode::Redb => {
            tracing::info!(path = %settings.database_path, "opening redb store");
            Arc::new(DataContext::open(&settings.database_path)?)
        }
        StoreMode::Memory => {
            tracing::warn!("using in-memory store; tasks are lost on exit");
            Arc::new(InMemoryTaskStore::new())
        }
    };

    // Indexes only speed up queries.
    match store.ensure_indexes(&IndexField::ALL) {
        Ok(()) => tracing::info!("task indexes ready"),
        Err(e) => tracing::warn!(error = %e, "could not create task indexes"),
    }

    // ── Router ─────────────────────────────────────────────────
    let state = Arc::new(AppState::new(store, Arc::new(SystemClock), &settings));
    let app = build_app(state, &settings);

    // ── Start ──────────────────────────────────────────────────
    let address = settings.socket_address()?;
    let listener = TcpListener::bind(address).await?;
    tracing::info!("TaskMaster API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
