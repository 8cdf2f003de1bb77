// app/src/web/handlers/address_handlers.rs

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::SignedInUser;
use actix_web::{web, HttpResponse};
use storefront::NewAddress;
use tracing::{info, instrument};

fn validate(address: &NewAddress) -> Result<(), AppError> {
  let required = [
    ("full_name", &address.full_name),
    ("line1", &address.line1),
    ("city", &address.city),
    ("state", &address.state),
    ("postal_code", &address.postal_code),
    ("phone", &address.phone),
  ];
  if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
    return Err(AppError::Validation(format!("'{}' is required", field)));
  }
  Ok(())
}

#[instrument(name = "handler::list_addresses", skip(app_state, user), fields(user_id = %user.user_id))]
pub async fn list_addresses_handler(
  app_state: web::Data<AppState>,
  user: SignedInUser,
) -> Result<HttpResponse, AppError> {
  let addresses = app_state.backend.addresses(user.user_id).await?;
  Ok(HttpResponse::Ok().json(addresses))
}

#[instrument(name = "handler::create_address", skip(app_state, user, req_payload), fields(user_id = %user.user_id))]
pub async fn create_address_handler(
  app_state: web::Data<AppState>,
  user: SignedInUser,
  req_payload: web::Json<NewAddress>,
) -> Result<HttpResponse, AppError> {
  let new_address = req_payload.into_inner();
  validate(&new_address)?;
  let address = app_state.backend.insert_address(user.user_id, new_address).await?;
  info!(address_id = %address.id, "Address saved.");
  Ok(HttpResponse::Created().json(address))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn address() -> NewAddress {
    NewAddress {
      full_name: "Asha Rao".into(),
      line1: "12 MG Road".into(),
      line2: None,
      city: "Bengaluru".into(),
      state: "KA".into(),
      postal_code: "560001".into(),
      phone: "9800000000".into(),
    }
  }

  #[test]
  fn complete_address_passes() {
    assert!(validate(&address()).is_ok());
  }

  #[test]
  fn blank_required_field_is_rejected() {
    let mut blank = address();
    blank.city = "  ".into();
    match validate(&blank) {
      Err(AppError::Validation(message)) => assert!(message.contains("city")),
      other => panic!("expected validation error, got {:?}", other),
    }
  }
}
