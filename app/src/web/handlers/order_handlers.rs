// app/src/web/handlers/order_handlers.rs

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::SignedInUser;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Deserialize, Debug)]
pub struct PaymentReferencePayload {
  pub utr: String,
}

/// Order history, newest first. A failed load reads as no orders.
#[instrument(name = "handler::list_orders", skip(app_state, user), fields(user_id = %user.user_id))]
pub async fn list_orders_handler(app_state: web::Data<AppState>, user: SignedInUser) -> HttpResponse {
  HttpResponse::Ok().json(app_state.orders.load_or_empty(user.user_id).await)
}

#[instrument(name = "handler::submit_payment", skip(app_state, user, path, req_payload), fields(user_id = %user.user_id, order = %path))]
pub async fn submit_payment_handler(
  app_state: web::Data<AppState>,
  user: SignedInUser,
  path: web::Path<Uuid>,
  req_payload: web::Json<PaymentReferencePayload>,
) -> Result<HttpResponse, AppError> {
  let order = app_state
    .orders
    .submit_payment_reference(user.user_id, path.into_inner(), &req_payload.utr)
    .await?;
  info!(order_id = %order.order_id, "Payment reference recorded.");
  Ok(HttpResponse::Ok().json(order))
}
