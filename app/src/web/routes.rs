// app/src/web/routes.rs

use crate::web::handlers::{
  admin_handlers, address_handlers, cart_handlers, catalog_handlers, checkout_handlers, order_handlers,
  session_handlers,
};
use actix_web::web;

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .route("/health", web::get().to(health_check_handler))
    .service(
      web::scope("/catalog")
        .route("/products", web::get().to(catalog_handlers::list_products_handler))
        .route("/products/{product_id}", web::get().to(catalog_handlers::get_product_handler))
        .route("/banners", web::get().to(catalog_handlers::list_banners_handler)),
    )
    .service(
      web::scope("/cart")
        .route("", web::get().to(cart_handlers::get_cart_handler))
        .route("", web::delete().to(cart_handlers::clear_cart_handler))
        .route("/items", web::post().to(cart_handlers::add_to_cart_handler))
        .route("/items/{product_id}", web::put().to(cart_handlers::update_quantity_handler))
        .route("/items/{product_id}", web::delete().to(cart_handlers::remove_from_cart_handler)),
    )
    .service(
      web::scope("/session")
        .route("", web::get().to(session_handlers::get_session_handler))
        .route("", web::post().to(session_handlers::sign_in_handler))
        .route("", web::delete().to(session_handlers::sign_out_handler)),
    )
    .service(
      web::scope("/addresses")
        .route("", web::get().to(address_handlers::list_addresses_handler))
        .route("", web::post().to(address_handlers::create_address_handler)),
    )
    .route("/checkout", web::post().to(checkout_handlers::place_order_handler))
    .service(
      web::scope("/orders")
        .route("", web::get().to(order_handlers::list_orders_handler))
        .route("/{order_id}/payment", web::post().to(order_handlers::submit_payment_handler)),
    )
    .service(
      web::scope("/admin")
        .route("/me", web::get().to(admin_handlers::role_handler))
        .route("/dashboard", web::get().to(admin_handlers::dashboard_handler))
        .route("/orders", web::get().to(admin_handlers::list_orders_handler))
        .route("/orders/{order_id}/status", web::put().to(admin_handlers::update_status_handler))
        .route("/orders/{order_id}/payment", web::put().to(admin_handlers::confirm_payment_handler))
        .route("/products/{product_id}/price", web::put().to(admin_handlers::set_price_handler))
        .route("/products/{product_id}/stock", web::put().to(admin_handlers::set_stock_handler)),
    );
}
