// app/src/web/handlers/admin_handlers.rs

//! Admin routes act as the signed-in user; the console itself checks the role.

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::SignedInUser;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use storefront::OrderStatus;
use tracing::{info, instrument};
use uuid::Uuid;

const DEFAULT_LIST_LIMIT: i64 = 50;

#[derive(Deserialize, Debug)]
pub struct ListOrdersQuery {
  pub limit: Option<i64>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateStatusPayload {
  pub status: OrderStatus,
}

#[derive(Deserialize, Debug)]
pub struct ConfirmPaymentPayload {
  pub paid: bool,
}

#[derive(Deserialize, Debug)]
pub struct SetPricePayload {
  pub price_cents: i64,
}

#[derive(Deserialize, Debug)]
pub struct SetStockPayload {
  pub stock_qty: i32,
  pub in_stock: bool,
}

/// Lets the UI decide whether to show admin screens. Never refuses a signed-in user.
#[instrument(name = "handler::admin_role", skip(app_state, user), fields(actor = %user.user_id))]
pub async fn role_handler(app_state: web::Data<AppState>, user: SignedInUser) -> Result<HttpResponse, AppError> {
  let is_admin = app_state.admin.is_admin(user.user_id).await?;
  Ok(HttpResponse::Ok().json(json!({ "user_id": user.user_id, "is_admin": is_admin })))
}

#[instrument(name = "handler::admin_dashboard", skip(app_state, user), fields(actor = %user.user_id))]
pub async fn dashboard_handler(app_state: web::Data<AppState>, user: SignedInUser) -> Result<HttpResponse, AppError> {
  let summary = app_state.admin.dashboard(user.user_id).await?;
  Ok(HttpResponse::Ok().json(summary))
}

#[instrument(name = "handler::admin_list_orders", skip(app_state, user), fields(actor = %user.user_id))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  user: SignedInUser,
  query: web::Query<ListOrdersQuery>,
) -> Result<HttpResponse, AppError> {
  let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);
  let orders = app_state.admin.list_orders(user.user_id, limit).await?;
  Ok(HttpResponse::Ok().json(orders))
}

#[instrument(name = "handler::admin_update_status", skip(app_state, user, path, req_payload), fields(actor = %user.user_id, order = %path, status = ?req_payload.status))]
pub async fn update_status_handler(
  app_state: web::Data<AppState>,
  user: SignedInUser,
  path: web::Path<Uuid>,
  req_payload: web::Json<UpdateStatusPayload>,
) -> Result<HttpResponse, AppError> {
  let order = app_state
    .admin
    .update_status(user.user_id, path.into_inner(), req_payload.status)
    .await?;
  info!(order_id = %order.order_id, "Order status changed.");
  Ok(HttpResponse::Ok().json(order))
}

#[instrument(name = "handler::admin_confirm_payment", skip(app_state, user, path, req_payload), fields(actor = %user.user_id, order = %path, paid = req_payload.paid))]
pub async fn confirm_payment_handler(
  app_state: web::Data<AppState>,
  user: SignedInUser,
  path: web::Path<Uuid>,
  req_payload: web::Json<ConfirmPaymentPayload>,
) -> Result<HttpResponse, AppError> {
  let order = app_state
    .admin
    .confirm_payment(user.user_id, path.into_inner(), req_payload.paid)
    .await?;
  Ok(HttpResponse::Ok().json(order))
}

#[instrument(name = "handler::admin_set_price", skip(app_state, user, path, req_payload), fields(actor = %user.user_id, product_id = %path))]
pub async fn set_price_handler(
  app_state: web::Data<AppState>,
  user: SignedInUser,
  path: web::Path<Uuid>,
  req_payload: web::Json<SetPricePayload>,
) -> Result<HttpResponse, AppError> {
  let product = app_state
    .admin
    .set_product_price(user.user_id, path.into_inner(), req_payload.price_cents)
    .await?;
  Ok(HttpResponse::Ok().json(product))
}

#[instrument(name = "handler::admin_set_stock", skip(app_state, user, path, req_payload), fields(actor = %user.user_id, product_id = %path))]
pub async fn set_stock_handler(
  app_state: web::Data<AppState>,
  user: SignedInUser,
  path: web::Path<Uuid>,
  req_payload: web::Json<SetStockPayload>,
) -> Result<HttpResponse, AppError> {
  let product = app_state
    .admin
    .set_stock(user.user_id, path.into_inner(), req_payload.stock_qty, req_payload.in_stock)
    .await?;
  Ok(HttpResponse::Ok().json(product))
}
