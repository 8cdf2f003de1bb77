// app/src/web/handlers/session_handlers.rs

use crate::errors::AppError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use storefront::Owner;
use tracing::{info, instrument, warn};
use uuid::Uuid;

#[derive(Deserialize, Debug)]
pub struct SignInRequestPayload {
  pub user_id: Uuid,
}

#[instrument(name = "handler::get_session", skip(app_state))]
pub async fn get_session_handler(app_state: web::Data<AppState>) -> HttpResponse {
  let owner = app_state.cart.owner();
  HttpResponse::Ok().json(json!({
    "owner": owner,
    "signed_in": matches!(owner, Owner::User { .. }),
    "device_id": app_state.cart.device_id(),
    "currency": app_state.config.default_currency,
  }))
}

/// Signs the device in and folds its anonymous cart into the user's.
#[instrument(name = "handler::sign_in", skip(app_state, req_payload), fields(user_id = %req_payload.user_id))]
pub async fn sign_in_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<SignInRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let user_id = req_payload.user_id;
  if !app_state.backend.profile_exists(user_id).await? {
    warn!("Sign-in refused: no profile.");
    return Err(AppError::Auth("Unknown user".to_string()));
  }

  let report = app_state.cart.sign_in(user_id).await?;
  info!(merged = report.merged.len(), dropped = report.dropped.len(), "Signed in.");
  Ok(HttpResponse::Ok().json(json!({
    "report": report,
    "cart": app_state.cart.view(),
  })))
}

#[instrument(name = "handler::sign_out", skip(app_state))]
pub async fn sign_out_handler(app_state: web::Data<AppState>) -> HttpResponse {
  app_state.cart.sign_out().await;
  HttpResponse::Ok().json(json!({ "cart": app_state.cart.view() }))
}
