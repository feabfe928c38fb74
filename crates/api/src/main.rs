use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use silhouette_db::store::{ItemStore, MemoryItemStore, PgItemStore};
use silhouette_disk::{CaptureStore, PreferencesStore};
use silhouette_genai::{GeminiApi, MediaGenerator};
use silhouette_vision::{OvershootAnalyzer, StyleAnalyzer};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use silhouette_api::background::{job_retention, VideoJobManager};
use silhouette_api::config::{warn_retired_vars, ServerConfig};
use silhouette_api::error::expose_internal_details;
use silhouette_api::router::build_app_router;
use silhouette_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "silhouette_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        production = config.production,
        "Loaded server configuration",
    );
    expose_internal_details(!config.production);
    warn_retired_vars();

    // --- Item store ---
    let items: Arc<dyn ItemStore> = match &config.database_url {
        Some(database_url) => {
            let pool = silhouette_db::create_pool(database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            silhouette_db::health_check(&pool)
                .await
                .expect("Database health check failed");
            tracing::info!("Database health check passed");

            silhouette_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            Arc::new(PgItemStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, items are kept in memory");
            Arc::new(MemoryItemStore::new())
        }
    };

    // --- File stores ---
    let captures = CaptureStore::open(&config.captures_dir)
        .await
        .expect("Failed to open captures directory");
    let preferences = PreferencesStore::open(&config.preferences_dir)
        .await
        .expect("Failed to open preferences directory");
    tracing::info!(
        captures = %config.captures_dir.display(),
        preferences = %config.preferences_dir.display(),
        "File stores ready",
    );

    // --- Providers ---
    let media: Option<Arc<dyn MediaGenerator>> = match &config.gemini.api_key {
        Some(key) => Some(Arc::new(GeminiApi::new(
            key.clone(),
            config.gemini.base_url.clone(),
        ))),
        None => {
            tracing::warn!("GEMINI_API_KEY not set, generation endpoints are disabled");
            None
        }
    };
    let analyzer: Option<Arc<dyn StyleAnalyzer>> = match &config.overshoot.api_key {
        Some(key) => Some(Arc::new(OvershootAnalyzer::new(
            config.overshoot.api_url.clone(),
            key.clone(),
            config.overshoot.window,
        ))),
        None => {
            tracing::warn!("OVERSHOOT_API_KEY not set, style analysis is disabled");
            None
        }
    };

    // --- Background video jobs ---
    let shutdown = CancellationToken::new();
    let video_jobs = Arc::new(VideoJobManager::new(shutdown.child_token()));
    let retention_handle = tokio::spawn(job_retention::run(
        Arc::clone(&video_jobs),
        config.video_job_retention,
        shutdown.child_token(),
    ));

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        items,
        captures: Arc::new(captures),
        preferences: Arc::new(preferences),
        media,
        analyzer,
        video_jobs: Arc::clone(&video_jobs),
        shutdown: shutdown.clone(),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    let signal_token = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            // Unblocks synchronous video polls so connections can drain.
            signal_token.cancel();
        })
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    let active = video_jobs.active_count().await;
    tracing::info!(active, "Cancelling video jobs");
    video_jobs.shutdown_all().await;
    let _ = tokio::time::timeout(Duration::from_secs(5), retention_handle).await;

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
