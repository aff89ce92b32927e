//! Field-level input validation.
//!
//! Validators collect every failing field instead of stopping at the first,
//! so a form can highlight all offending inputs in one round trip.

use std::fmt;

use serde::Serialize;

/// Earliest vintage accepted for a wine. `0` is separately allowed as "unset".
pub const MIN_YEAR: i32 = 1800;

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 50;
pub const NOTE_MAX_CHARS: usize = 500;
pub const RATING_MAX: f64 = 5.0;

/// Largest batch accepted by a single add-bottles call.
pub const MAX_BOTTLE_BATCH: u32 = 1000;

/// One rejected field and a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
  pub field:   &'static str,
  pub message: String,
}

/// Every field that failed validation for a single input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
  pub fn new() -> Self { Self::default() }

  /// Shorthand for a single-field failure.
  pub fn single(field: &'static str, message: impl Into<String>) -> Self {
    let mut errors = Self::new();
    errors.push(field, message);
    errors
  }

  pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
    self.0.push(FieldError { field, message: message.into() });
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn fields(&self) -> &[FieldError] { &self.0 }

  /// `Ok(())` when nothing was pushed, otherwise `Err(self)`.
  pub fn into_result(self) -> Result<(), Self> {
    if self.is_empty() { Ok(()) } else { Err(self) }
  }
}

impl fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut first = true;
    for e in &self.0 {
      if !first {
        f.write_str("; ")?;
      }
      write!(f, "{}: {}", e.field, e.message)?;
      first = false;
    }
    Ok(())
  }
}

impl std::error::Error for ValidationErrors {}

// ─── Individual checks ───────────────────────────────────────────────────────

/// `0` means "unset"; anything else must fall in `MIN_YEAR..=current_year`.
pub fn check_year(year: i32, current_year: i32) -> Result<(), String> {
  if year == 0 || (MIN_YEAR..=current_year).contains(&year) {
    Ok(())
  } else {
    Err(format!(
      "must be 0 or between {MIN_YEAR} and {current_year}"
    ))
  }
}

/// Ratings live in `0.0..=5.0` at one-decimal granularity.
pub fn check_rating(rating: f64) -> Result<(), String> {
  if !rating.is_finite() || !(0.0..=RATING_MAX).contains(&rating) {
    return Err(format!("must be between 0 and {RATING_MAX}"));
  }
  let tenths = rating * 10.0;
  if (tenths - tenths.round()).abs() > 1e-9 {
    return Err("must be a multiple of 0.1".to_string());
  }
  Ok(())
}

pub fn check_char_range(
  value: &str,
  min: usize,
  max: usize,
) -> Result<(), String> {
  let len = value.chars().count();
  if len < min {
    Err(format!("must contain at least {min} character(s)"))
  } else if len > max {
    Err(format!("must contain at most {max} character(s)"))
  } else {
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn year_boundaries() {
    let current = 2026;
    assert!(check_year(0, current).is_ok());
    assert!(check_year(1800, current).is_ok());
    assert!(check_year(current, current).is_ok());
    assert!(check_year(1799, current).is_err());
    assert!(check_year(current + 1, current).is_err());
    assert!(check_year(-5, current).is_err());
  }

  #[test]
  fn rating_granularity() {
    assert!(check_rating(0.0).is_ok());
    assert!(check_rating(4.3).is_ok());
    assert!(check_rating(5.0).is_ok());
    assert!(check_rating(4.35).is_err());
    assert!(check_rating(5.1).is_err());
    assert!(check_rating(-0.1).is_err());
    assert!(check_rating(f64::NAN).is_err());
  }

  #[test]
  fn char_range_counts_chars_not_bytes() {
    assert!(check_char_range("Ré", 2, 50).is_ok());
    assert!(check_char_range("R", 2, 50).is_err());
    assert!(check_char_range(&"x".repeat(51), 2, 50).is_err());
  }

  #[test]
  fn display_joins_all_fields() {
    let mut errors = ValidationErrors::new();
    errors.push("name", "too short");
    errors.push("year", "out of range");
    assert_eq!(errors.to_string(), "name: too short; year: out of range");
    assert!(errors.into_result().is_err());
    assert!(ValidationErrors::new().into_result().is_ok());
  }
}
