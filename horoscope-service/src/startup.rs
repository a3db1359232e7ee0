//! Application startup and lifecycle management.

use crate::config::HoroscopeConfig;
use crate::handlers::{health, horoscope};
use crate::services::providers::gemini::GeminiGenerator;
use crate::services::providers::TextGenerator;
use crate::services::{CredentialPool, HoroscopeService, HoroscopeStore, SelectionStrategy};
use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{cors::{Any, CorsLayer}, trace::TraceLayer};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: HoroscopeConfig,
    pub store: HoroscopeStore,
    pub horoscopes: HoroscopeService,
}

/// Build the HTTP router for the given state.
///
/// CORS is wide open: the API is consumed by a packaged mobile webview
/// with no fixed origin.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/api/signs", get(horoscope::list_signs))
        .route("/api/horoscope/:sign", get(horoscope::get_horoscope))
        .route("/api/cache/cleanup", post(horoscope::cleanup_cache))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: HoroscopeConfig) -> Result<Self, AppError> {
        let store = HoroscopeStore::connect(&config.database.url)
            .await
            .map_err(|e| {
                tracing::error!("Failed to open SQLite database: {}", e);
                e
            })?;

        store.run_migrations().await.map_err(|e| {
            tracing::error!("Failed to run database migrations: {}", e);
            e
        })?;

        let strategy = SelectionStrategy::parse(&config.gemini.strategy)?;
        let credentials = CredentialPool::from_raw(&config.gemini.api_keys, strategy)?;
        tracing::info!(
            pool_size = credentials.len(),
            strategy = ?strategy,
            "Loaded Gemini credential pool"
        );

        let generator: Arc<dyn TextGenerator> =
            Arc::new(GeminiGenerator::new(config.gemini.model.clone()));
        tracing::info!(model = %config.gemini.model, "Initialized Gemini text generator");

        let horoscopes = HoroscopeService::new(store.clone(), generator, credentials);

        let state = AppState {
            config: config.clone(),
            store,
            horoscopes,
        };

        // Port 0 = random port for testing.
        let addr = config.common.bind_address();
        let listener = TcpListener::bind(&addr).await.map_err(|e| {
            tracing::error!("Failed to bind listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Horoscope service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get a reference to the store.
    pub fn store(&self) -> &HoroscopeStore {
        &self.state.store
    }

    /// Run the application until stopped.
    ///
    /// Spawns the periodic cache sweep alongside the HTTP server.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        spawn_cleanup_sweep(
            self.state.horoscopes.clone(),
            self.state.config.cache.max_age_days,
            Duration::from_secs(self.state.config.cache.sweep_interval_hours * 3600),
        );

        let app = router(self.state);
        axum::serve(self.listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

/// Periodically delete cache rows older than `max_age_days`.
///
/// The sweep may run concurrently with lookups and writes; it only ever
/// deletes rows older than the cutoff, so a freshly written row is never
/// eligible.
fn spawn_cleanup_sweep(horoscopes: HoroscopeService, max_age_days: i64, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick fires immediately; skip it so startup stays quiet.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if let Err(e) = horoscopes.cleanup_old_cache(max_age_days).await {
                tracing::error!(error = %e, "Periodic cache cleanup failed");
            }
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
