// app/src/web/handlers/catalog_handlers.rs

use crate::errors::AppError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use tracing::instrument;
use uuid::Uuid;

/// Never fails: an unreachable backend yields the built-in catalog.
#[instrument(name = "handler::list_products", skip(app_state))]
pub async fn list_products_handler(app_state: web::Data<AppState>) -> HttpResponse {
  HttpResponse::Ok().json(app_state.catalog.list_products().await)
}

#[instrument(name = "handler::list_banners", skip(app_state))]
pub async fn list_banners_handler(app_state: web::Data<AppState>) -> HttpResponse {
  HttpResponse::Ok().json(app_state.catalog.list_banners().await)
}

#[instrument(name = "handler::get_product", skip(app_state), fields(product_id = %path))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let product = app_state.catalog.product(path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(product))
}
