// app/src/web/extractors.rs

use crate::errors::AppError;
use crate::state::AppState;
use actix_web::{web, FromRequest, HttpRequest};
use storefront::Owner;
use tracing::warn;
use uuid::Uuid;

/// The user the device session is signed in as. Rejects anonymous sessions.
#[derive(Debug, Clone, Copy)]
pub struct SignedInUser {
  pub user_id: Uuid,
}

impl FromRequest for SignedInUser {
  type Error = AppError;
  type Future = futures_util::future::Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    let result = match req.app_data::<web::Data<AppState>>() {
      Some(state) => match state.cart.owner() {
        Owner::User { user_id } => Ok(SignedInUser { user_id }),
        Owner::Anonymous { .. } => {
          warn!(path = %req.path(), "Signed-in route called without a session.");
          Err(AppError::Auth("Sign in first".to_string()))
        }
      },
      None => Err(AppError::Internal("Application state not configured".to_string())),
    };
    futures_util::future::ready(result)
  }
}
