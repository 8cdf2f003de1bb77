// core/src/settings.rs

use chrono::Duration;

/// Knobs the core needs from the surrounding application.
#[derive(Debug, Clone)]
pub struct StorefrontSettings {
  /// Currency stamped on new orders. Catalog prices are assumed to be in it.
  pub currency: String,
  /// UPI handle the buyer pays to; copied onto each order.
  pub payment_upi_handle: String,
  /// How long the payment QR shown after checkout stays valid.
  pub payment_qr_ttl: Duration,
}

impl Default for StorefrontSettings {
  fn default() -> Self {
    Self {
      currency: "INR".to_string(),
      payment_upi_handle: "storefront@upi".to_string(),
      payment_qr_ttl: Duration::minutes(15),
    }
  }
}
