// app/src/web/handlers/cart_handlers.rs

use crate::errors::AppError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Deserialize, Debug)]
pub struct AddToCartRequestPayload {
  pub product_id: Uuid,
  #[serde(default = "default_qty")]
  pub qty: i32,
}

fn default_qty() -> i32 {
  1
}

#[derive(Deserialize, Debug)]
pub struct UpdateQuantityRequestPayload {
  pub qty: i32,
}

/// Reloads the active cart before answering, so a stale view is never served.
#[instrument(name = "handler::get_cart", skip(app_state))]
pub async fn get_cart_handler(app_state: web::Data<AppState>) -> HttpResponse {
  HttpResponse::Ok().json(app_state.cart.refresh().await)
}

#[instrument(
    name = "handler::add_to_cart",
    skip(app_state, req_payload),
    fields(product_id = %req_payload.product_id, qty = req_payload.qty)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<AddToCartRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let view = app_state.cart.add_to_cart(req_payload.product_id, req_payload.qty).await?;
  info!(total_items = view.total_items, "Item added to cart.");
  Ok(HttpResponse::Ok().json(view))
}

#[instrument(name = "handler::update_quantity", skip(app_state, path, req_payload), fields(product_id = %path, qty = req_payload.qty))]
pub async fn update_quantity_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  req_payload: web::Json<UpdateQuantityRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let view = app_state.cart.update_quantity(path.into_inner(), req_payload.qty).await?;
  Ok(HttpResponse::Ok().json(view))
}

#[instrument(name = "handler::remove_from_cart", skip(app_state, path), fields(product_id = %path))]
pub async fn remove_from_cart_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let view = app_state.cart.remove_from_cart(path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(view))
}

#[instrument(name = "handler::clear_cart", skip(app_state))]
pub async fn clear_cart_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let view = app_state.cart.clear_cart().await?;
  Ok(HttpResponse::Ok().json(view))
}
