// app/src/main.rs

mod config;
mod db;
mod errors;
mod models;
mod state;
mod web;

use crate::config::AppConfig;
use crate::db::listener::spawn_change_listener;
use crate::db::PgBackend;
use crate::state::AppState;

use actix_web::{web as actix_data, App, HttpServer};
use sqlx::PgPool;
use std::sync::Arc;
use storefront::{ChangeHub, SharedBackend};
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

/// Logs a startup failure and turns it into the process exit error.
fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
  tracing::error!(error = %err, "{}", context);
  std::io::Error::other(format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting storefront server...");

  let app_config = Arc::new(AppConfig::from_env().map_err(|e| startup_error("Failed to load configuration", e))?);

  let db_pool = PgPool::connect(&app_config.database_url)
    .await
    .map_err(|e| startup_error("Failed to connect to the database", e))?;
  tracing::info!("Successfully connected to the database.");

  if app_config.run_migrations {
    sqlx::migrate!("./migrations")
      .run(&db_pool)
      .await
      .map_err(|e| startup_error("Failed to run migrations", e))?;
    tracing::info!("Database migrations applied.");
  }

  let hub = ChangeHub::default();
  let _listener = spawn_change_listener(db_pool.clone(), hub.clone());
  let backend: SharedBackend = Arc::new(PgBackend::new(db_pool, hub));

  let app_state = AppState::build(app_config.clone(), backend).map_err(|e| startup_error("Failed to build session", e))?;
  // Load the active cart once so the first request is not served an empty view.
  app_state.cart.refresh().await;
  let app_data = actix_data::Data::new(app_state);

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(app_data.clone())
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(web::configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
