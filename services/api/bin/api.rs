//! Main Entrypoint for the Interview API Service
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Loading and validating the interview catalog, rubric and prompt templates.
//! 3. Initializing the text-generation backend.
//! 4. Constructing the Axum router and applying middleware.
//! 5. Starting the idle-session sweeper.
//! 6. Starting the web server and handling graceful shutdown.

use anyhow::Context;
use interview_api::{config::Config, router::create_router, sessions::SessionStore, state::AppState};
use interview_core::{generator::build_generator, loader::load_from_dir};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        return;
    }
    info!("Received shutdown signal. Shutting down gracefully...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Initializing application state...");

    // --- 3. Load Interview Data ---
    let profiles = Arc::new(
        load_from_dir(&config.data_path).with_context(|| {
            format!(
                "Failed to load interview data from {}",
                config.data_path.display()
            )
        })?,
    );

    // --- 4. Initialize the Generator ---
    let generator =
        build_generator(&config.generator).context("Failed to initialize the generator")?;

    let sessions = Arc::new(SessionStore::new(config.session_ttl));
    let app_state = Arc::new(AppState {
        profiles,
        generator,
        sessions: sessions.clone(),
        config: Arc::new(config.clone()),
    });

    // --- 5. Create Router and Apply Middleware ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(app_state).layer(cors);

    // --- 6. Sweep Idle Sessions ---
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sessions.idle_ttl() / 4);
        loop {
            ticker.tick().await;
            sessions.evict_idle().await;
        }
    });

    // --- 7. Start Server ---
    info!(
        provider = %config.generator.provider,
        model = %config.generator.model,
        bind_address = %config.bind_address,
        "Service configured. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server has shut down.");
    Ok(())
}
