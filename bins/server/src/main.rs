//! Fleetrent API Server
//!
//! Main entry point for the Fleetrent rental service.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fleetrent_api::{AppState, TracingNotifier, create_router};
use fleetrent_core::ports::SystemClock;
use fleetrent_core::{RentalPolicy, RentalService};
use fleetrent_shared::AppConfig;
use fleetrent_store::JsonFileStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fleetrent=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Open snapshot storage
    let store = JsonFileStore::open(&config.storage.data_dir)
        .await
        .context("Failed to open data directory")?;
    info!(data_dir = %config.storage.data_dir, "Storage ready");

    // Load the catalog and start the dispatcher
    let policy = RentalPolicy::from(&config.rental);
    let service = Arc::new(
        RentalService::open(
            policy,
            Arc::new(store),
            Arc::new(TracingNotifier),
            Arc::new(SystemClock),
        )
        .await
        .context("Failed to load rental catalog")?,
    );
    info!(
        buffer_days = policy.buffer_days,
        critical_severity = policy.critical_severity,
        "Rental service started"
    );

    // Reminder sweep
    let sweeper = service.clone();
    let every = Duration::from_secs(config.rental.reminder_interval_secs.max(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let sent = sweeper.run_reminder_sweep().await;
            if sent > 0 {
                info!(sent, "Reminder sweep finished");
            }
        }
    });

    // Create router
    let app = create_router(AppState {
        service: service.clone(),
    });

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    service.flush().await;
    info!("Server stopped");
    Ok(())
}
