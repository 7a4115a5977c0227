#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web server for the traffic accident dashboard.
//!
//! Serves the dashboard page at `/` and its JSON payload under `/api`.
//! The accident table is loaded once per `(path, row limit)` through a
//! shared [`AccidentLoader`]; aggregates, charts and the map sample are
//! rebuilt on every request.

pub mod config;
mod handlers;
pub mod interactive;
pub mod layout;
pub mod presenter;

use std::sync::Arc;

use accident_dashboard_loader::{AccidentLoader, AccidentTable, LoadError};
use accident_dashboard_server_models::DashboardPayload;
use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};

pub use config::{ConfigArgs, ConfigError, DashboardConfig};

/// Errors that can occur while rendering the dashboard.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// The accident table could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The page payload could not be serialized.
    #[error("Failed to serialize dashboard: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Shared application state.
#[derive(Debug)]
pub struct AppState {
    /// Resolved configuration.
    pub config: DashboardConfig,
    /// Memoizing loader shared by every worker.
    pub loader: AccidentLoader,
}

impl AppState {
    /// Creates state with an empty loader using the configured timestamp
    /// policy.
    #[must_use]
    pub fn new(config: DashboardConfig) -> Self {
        let loader = AccidentLoader::new(config.timestamp_policy);
        Self { config, loader }
    }

    /// Returns the configured table, loading it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the CSV cannot be loaded.
    pub fn table(&self) -> Result<Arc<AccidentTable>, LoadError> {
        self.loader
            .load(&self.config.data_path, self.config.row_limit)
    }

    /// Builds the dashboard payload with a fresh map sample.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Load`] if the CSV cannot be loaded.
    pub fn render_payload(&self) -> Result<DashboardPayload, DashboardError> {
        let table = self.table()?;
        Ok(presenter::build_dashboard(
            &table,
            self.config.sample_size,
            &mut rand::thread_rng(),
        ))
    }

    /// Builds the full dashboard page.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError`] if the CSV cannot be loaded or the
    /// payload cannot be serialized.
    pub fn render_html(&self) -> Result<String, DashboardError> {
        let payload = self.render_payload()?;
        Ok(layout::render_page(&payload)?)
    }
}

/// Registers the dashboard routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::index)).service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/dashboard", web::get().to(handlers::dashboard))
            .route("/cache/invalidate", web::post().to(handlers::invalidate)),
    );
}

/// Starts the dashboard server.
///
/// This is a regular async function; the caller provides the runtime
/// (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: DashboardConfig) -> std::io::Result<()> {
    let bind_addr = config.bind_addr.clone();
    let port = config.port;

    log::info!(
        "Serving {} (row limit {}, sample size {}, timestamp policy {})",
        config.data_path.display(),
        config.row_limit,
        config.sample_size,
        config.timestamp_policy
    );

    let state = web::Data::new(AppState::new(config));

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
