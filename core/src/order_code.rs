// core/src/order_code.rs

//! Human-readable order codes: `YYMMDD` of the placement day followed by six
//! random digits. Uniqueness comes from the caller's collision check, not
//! from the randomness.

use chrono::{DateTime, Utc};
use rand::Rng;

pub const ORDER_CODE_LEN: usize = 12;

pub fn candidate<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> String {
  let suffix: u32 = rng.gen_range(0..1_000_000);
  format!("{}{:06}", now.format("%y%m%d"), suffix)
}

/// Draws candidates until `taken` rejects none of them.
pub fn generate_unique<R, F>(now: DateTime<Utc>, rng: &mut R, mut taken: F) -> String
where
  R: Rng + ?Sized,
  F: FnMut(&str) -> bool,
{
  let mut attempts = 0u32;
  loop {
    attempts += 1;
    let code = candidate(now, rng);
    if !taken(&code) {
      if attempts > 1 {
        tracing::debug!(attempts, "Order code found after collisions.");
      }
      return code;
    }
  }
}

pub fn is_well_formed(code: &str) -> bool {
  code.len() == ORDER_CODE_LEN && code.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  #[test]
  fn candidate_is_twelve_digits_with_date_prefix() {
    let now = Utc.with_ymd_and_hms(2026, 3, 9, 10, 0, 0).unwrap();
    let mut rng = StdRng::seed_from_u64(7);
    let code = candidate(now, &mut rng);
    assert!(is_well_formed(&code));
    assert!(code.starts_with("260309"));
  }

  #[test]
  fn generate_unique_retries_past_collisions() {
    let now = Utc::now();
    let mut rng = StdRng::seed_from_u64(42);
    let mut calls = 0;
    let code = generate_unique(now, &mut rng, |_| {
      calls += 1;
      calls < 4
    });
    assert_eq!(calls, 4);
    assert!(is_well_formed(&code));
  }
}
