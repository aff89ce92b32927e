//! Wines and the physical bottles that belong to them.

use chrono::{DateTime, Datelike as _, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::validate::{
  NAME_MAX_CHARS, NAME_MIN_CHARS, NOTE_MAX_CHARS, ValidationErrors,
  check_char_range, check_rating, check_year,
};

// ─── Wine ────────────────────────────────────────────────────────────────────

/// Colour category of a wine.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum WineType {
  Red,
  White,
  Rose,
}

/// Every user-editable field of a wine. Create and edit both take the full
/// set; an edit overwrites all of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WineFields {
  pub name:       String,
  /// URL produced by the external upload service, if any.
  #[serde(default)]
  pub image_url:  Option<String>,
  /// `0` means the vintage is unknown.
  pub year:       i32,
  #[serde(rename = "type")]
  pub wine_type:  WineType,
  pub varietal:   String,
  pub rating:     f64,
  /// Key into the static winery table (see [`crate::winery`]).
  pub winery_key: String,
  pub note:       String,
}

impl WineFields {
  /// Validate against the current calendar year.
  pub fn validate(&self) -> Result<(), ValidationErrors> {
    self.validate_at(Utc::now().year())
  }

  /// Validate with an explicit "current year" for the vintage upper bound.
  pub fn validate_at(&self, current_year: i32) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if let Err(m) = check_char_range(&self.name, NAME_MIN_CHARS, NAME_MAX_CHARS)
    {
      errors.push("name", m);
    }
    if let Err(m) = check_year(self.year, current_year) {
      errors.push("year", m);
    }
    if let Err(m) = check_rating(self.rating) {
      errors.push("rating", m);
    }
    if self.winery_key.is_empty() {
      errors.push("winery_key", "a selected winery is required");
    }
    if let Err(m) = check_char_range(&self.note, 0, NOTE_MAX_CHARS) {
      errors.push("note", m);
    }

    errors.into_result()
  }
}

/// A stored wine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wine {
  pub id:         i64,
  #[serde(flatten)]
  pub fields:     WineFields,
  /// Set at creation; never changes.
  pub owner_id:   Uuid,
  pub created_at: DateTime<Utc>,
}

/// A wine annotated with how many bottles it has (consumed or not).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WineSummary {
  #[serde(flatten)]
  pub wine:         Wine,
  pub bottle_count: u64,
}

/// A wine together with all of its bottles, ordered by ascending counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WineDetail {
  #[serde(flatten)]
  pub wine:    Wine,
  pub bottles: Vec<WineBottle>,
}

// ─── Bottles ─────────────────────────────────────────────────────────────────

/// One physical bottle of a wine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WineBottle {
  pub id:            i64,
  pub wine_id:       i64,
  /// Human-facing label. Sequential across all bottles of the same owner,
  /// not per wine.
  pub counter:       i64,
  pub consumed:      bool,
  /// Present exactly when `consumed` is true.
  pub date_consumed: Option<DateTime<Utc>>,
  pub note:          String,
  pub created_at:    DateTime<Utc>,
}

/// Input to [`crate::store::CellarStore::insert_bottles`].
#[derive(Debug, Clone)]
pub struct NewBottles {
  pub wine_id:       i64,
  /// Counter of the first bottle; the rest follow consecutively.
  pub first_counter: i64,
  pub quantity:      u32,
  pub note:          String,
}

/// Replacement state for a bottle. `consumed` is derived from
/// `date_consumed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BottleUpdate {
  pub date_consumed: Option<DateTime<Utc>>,
  pub note:          String,
}

impl BottleUpdate {
  pub fn new(date_consumed: Option<DateTime<Utc>>, note: Option<String>) -> Self {
    Self { date_consumed, note: note.unwrap_or_default() }
  }

  pub fn consumed(&self) -> bool { self.date_consumed.is_some() }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn fields() -> WineFields {
    WineFields {
      name:       "Chateau Margaux".into(),
      image_url:  None,
      year:       2015,
      wine_type:  WineType::Red,
      varietal:   "Cabernet Sauvignon".into(),
      rating:     4.5,
      winery_key: "margaux".into(),
      note:       String::new(),
    }
  }

  #[test]
  fn valid_fields_pass() {
    assert!(fields().validate_at(2026).is_ok());
  }

  #[test]
  fn unset_year_is_accepted() {
    let f = WineFields { year: 0, ..fields() };
    assert!(f.validate_at(2026).is_ok());
  }

  #[test]
  fn year_bounds() {
    for (year, ok) in [(1799, false), (1800, true), (2026, true), (2027, false)] {
      let f = WineFields { year, ..fields() };
      assert_eq!(f.validate_at(2026).is_ok(), ok, "year {year}");
    }
  }

  #[test]
  fn every_bad_field_is_reported() {
    let f = WineFields {
      name:       "X".into(),
      image_url:  None,
      year:       1700,
      wine_type:  WineType::White,
      varietal:   String::new(),
      rating:     7.0,
      winery_key: String::new(),
      note:       "n".repeat(501),
    };
    let errors = f.validate_at(2026).unwrap_err();
    let names: Vec<_> = errors.fields().iter().map(|e| e.field).collect();
    assert_eq!(names, ["name", "year", "rating", "winery_key", "note"]);
  }

  #[test]
  fn wine_type_text_forms() {
    assert_eq!(WineType::Rose.to_string(), "ROSE");
    assert_eq!("WHITE".parse::<WineType>().unwrap(), WineType::White);
    assert!("PINK".parse::<WineType>().is_err());
    assert_eq!(serde_json::to_string(&WineType::Red).unwrap(), "\"RED\"");
  }

  #[test]
  fn fields_json_uses_type_key() {
    let json = serde_json::to_value(fields()).unwrap();
    assert_eq!(json["type"], "RED");
    assert!(json.get("wine_type").is_none());
  }

  #[test]
  fn bottle_update_derives_consumed() {
    let open = BottleUpdate::new(Some(Utc::now()), Some("great".into()));
    assert!(open.consumed());
    let shelf = BottleUpdate::new(None, None);
    assert!(!shelf.consumed());
    assert_eq!(shelf.note, "");
  }
}
