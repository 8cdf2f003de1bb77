// app/src/errors.rs

use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use storefront::{ErrorKind, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error(transparent)]
  Store(#[from] StoreError),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl ResponseError for AppError {
  fn error_response(&self) -> HttpResponse {
    match self {
      AppError::Validation(m) => HttpResponse::BadRequest().json(json!({"error": m})),
      AppError::Auth(m) => HttpResponse::Unauthorized().json(json!({"error": m})),
      AppError::Config(m) => {
        tracing::error!(application_error = %self, "Responding with error");
        HttpResponse::InternalServerError().json(json!({"error": "Configuration issue", "detail": m}))
      }
      AppError::Store(e) => store_error_response(e),
      AppError::Internal(m) => {
        tracing::error!(application_error = %self, "Responding with error");
        HttpResponse::InternalServerError().json(json!({"error": "An internal error occurred", "detail": m}))
      }
    }
  }
}

fn store_error_response(e: &StoreError) -> HttpResponse {
  let kind = e.kind();
  let body = json!({"error": e.to_string(), "kind": kind});
  match kind {
    ErrorKind::NotFound => HttpResponse::NotFound().json(body),
    ErrorKind::Conflict => HttpResponse::Conflict().json(body),
    ErrorKind::Unauthorized => HttpResponse::Unauthorized().json(body),
    ErrorKind::Validation => HttpResponse::BadRequest().json(body),
    ErrorKind::TransientIo => {
      tracing::warn!(error = %e, "Backend unavailable for request.");
      HttpResponse::ServiceUnavailable().json(body)
    }
    ErrorKind::Storage | ErrorKind::Internal => {
      tracing::error!(error = %e, "Responding with error");
      HttpResponse::InternalServerError().json(body)
    }
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::http::StatusCode;

  #[test]
  fn store_errors_map_to_status_codes() {
    let cases = [
      (StoreError::NotFound("x".into()), StatusCode::NOT_FOUND),
      (StoreError::Conflict("x".into()), StatusCode::CONFLICT),
      (StoreError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
      (StoreError::Validation("x".into()), StatusCode::BAD_REQUEST),
      (StoreError::transient(std::io::Error::other("down")), StatusCode::SERVICE_UNAVAILABLE),
      (StoreError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (err, status) in cases {
      assert_eq!(AppError::from(err).error_response().status(), status);
    }
  }

  #[test]
  fn auth_and_validation_errors_are_client_errors() {
    assert_eq!(AppError::Auth("x".into()).error_response().status(), StatusCode::UNAUTHORIZED);
    assert_eq!(AppError::Validation("x".into()).error_response().status(), StatusCode::BAD_REQUEST);
  }
}
