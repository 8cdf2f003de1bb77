// app/src/web/handlers/checkout_handlers.rs

use crate::errors::AppError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Deserialize, Debug)]
pub struct CheckoutRequestPayload {
  pub address_id: Uuid,
}

/// The signed-in check lives in the placement workflow, which answers
/// `Unauthorized` for anonymous sessions.
#[instrument(name = "handler::place_order", skip(app_state, req_payload), fields(address_id = %req_payload.address_id))]
pub async fn place_order_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<CheckoutRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let placed = app_state.checkout.place_order(req_payload.address_id).await?;
  info!(
    order_id = %placed.order.order_id,
    amount_total_cents = placed.order.amount_total_cents,
    "Order placed."
  );
  Ok(HttpResponse::Created().json(placed))
}
