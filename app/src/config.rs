// app/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use storefront::StorefrontSettings;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,

  /// Where the device-local cart document lives.
  pub data_dir: PathBuf,
  /// Identity of this device's anonymous cart. Generated and persisted under
  /// `data_dir` when not configured.
  pub device_id: Option<Uuid>,

  pub payment_upi_handle: String,
  pub payment_qr_ttl_minutes: i64,
  pub default_currency: String,

  pub run_migrations: bool,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = get_env("DATABASE_URL")?;

    let data_dir = PathBuf::from(get_env("STOREFRONT_DATA_DIR").unwrap_or_else(|_| ".storefront".to_string()));
    let device_id = match get_env("DEVICE_ID") {
      Ok(raw) => Some(Uuid::parse_str(raw.trim()).map_err(|e| AppError::Config(format!("Invalid DEVICE_ID: {}", e)))?),
      Err(_) => None,
    };

    let payment_upi_handle = get_env("PAYMENT_UPI_HANDLE").unwrap_or_else(|_| "storefront@upi".to_string());
    let payment_qr_ttl_minutes = get_env("PAYMENT_QR_TTL_MINUTES")
      .unwrap_or_else(|_| "15".to_string())
      .parse::<i64>()
      .map_err(|e| AppError::Config(format!("Invalid PAYMENT_QR_TTL_MINUTES: {}", e)))?;
    if payment_qr_ttl_minutes <= 0 {
      return Err(AppError::Config("PAYMENT_QR_TTL_MINUTES must be positive".to_string()));
    }
    let default_currency = get_env("DEFAULT_CURRENCY").unwrap_or_else(|_| "INR".to_string());

    let run_migrations = get_env("RUN_MIGRATIONS")
      .unwrap_or_else(|_| "true".to_string())
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid RUN_MIGRATIONS value: {}", e)))?;

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      database_url,
      data_dir,
      device_id,
      payment_upi_handle,
      payment_qr_ttl_minutes,
      default_currency,
      run_migrations,
    })
  }

  pub fn settings(&self) -> StorefrontSettings {
    StorefrontSettings {
      currency: self.default_currency.clone(),
      payment_upi_handle: self.payment_upi_handle.clone(),
      payment_qr_ttl: chrono::Duration::minutes(self.payment_qr_ttl_minutes),
    }
  }
}
