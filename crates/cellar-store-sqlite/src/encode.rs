//! Encoding and decoding helpers between Rust domain types and the plain
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, UUIDs as hyphenated lowercase
//! strings, wine types as their upper-case names.

use cellar_core::{
  session::Session,
  user::{AppVersion, User},
  wine::{Wine, WineBottle, WineFields, WineSummary, WineType},
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── WineType ────────────────────────────────────────────────────────────────

pub fn encode_wine_type(t: WineType) -> String { t.to_string() }

pub fn decode_wine_type(s: &str) -> Result<WineType> {
  s.parse()
    .map_err(|_| cellar_core::Error::UnknownWineType(s.to_owned()).into())
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawWine::from_row`], for `wines` aliased as `w`.
pub const WINE_COLUMNS: &str = "w.id, w.owner_id, w.name, w.image_url, w.year, \
                                w.wine_type, w.varietal, w.rating, w.winery_key, \
                                w.note, w.created_at";

/// Raw values read directly from a `wines` row.
pub struct RawWine {
  pub id:         i64,
  pub owner_id:   String,
  pub name:       String,
  pub image_url:  Option<String>,
  pub year:       i32,
  pub wine_type:  String,
  pub varietal:   String,
  pub rating:     f64,
  pub winery_key: String,
  pub note:       String,
  pub created_at: String,
}

impl RawWine {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      owner_id:   row.get(1)?,
      name:       row.get(2)?,
      image_url:  row.get(3)?,
      year:       row.get(4)?,
      wine_type:  row.get(5)?,
      varietal:   row.get(6)?,
      rating:     row.get(7)?,
      winery_key: row.get(8)?,
      note:       row.get(9)?,
      created_at: row.get(10)?,
    })
  }

  pub fn into_wine(self) -> Result<Wine> {
    Ok(Wine {
      id:         self.id,
      fields:     WineFields {
        name:       self.name,
        image_url:  self.image_url,
        year:       self.year,
        wine_type:  decode_wine_type(&self.wine_type)?,
        varietal:   self.varietal,
        rating:     self.rating,
        winery_key: self.winery_key,
        note:       self.note,
      },
      owner_id:   decode_uuid(&self.owner_id)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// A `wines` row plus its bottle count (the column after [`WINE_COLUMNS`]).
pub struct RawWineSummary {
  pub wine:         RawWine,
  pub bottle_count: i64,
}

impl RawWineSummary {
  pub fn into_summary(self) -> Result<WineSummary> {
    Ok(WineSummary {
      wine:         self.wine.into_wine()?,
      bottle_count: u64::try_from(self.bottle_count).unwrap_or(0),
    })
  }
}

/// Column list matching [`RawBottle::from_row`].
pub const BOTTLE_COLUMNS: &str =
  "id, wine_id, counter, consumed, date_consumed, note, created_at";

/// Raw values read directly from a `wine_bottles` row.
pub struct RawBottle {
  pub id:            i64,
  pub wine_id:       i64,
  pub counter:       i64,
  pub consumed:      bool,
  pub date_consumed: Option<String>,
  pub note:          String,
  pub created_at:    String,
}

impl RawBottle {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      wine_id:       row.get(1)?,
      counter:       row.get(2)?,
      consumed:      row.get(3)?,
      date_consumed: row.get(4)?,
      note:          row.get(5)?,
      created_at:    row.get(6)?,
    })
  }

  pub fn into_bottle(self) -> Result<WineBottle> {
    Ok(WineBottle {
      id:            self.id,
      wine_id:       self.wine_id,
      counter:       self.counter,
      consumed:      self.consumed,
      date_consumed: self.date_consumed.as_deref().map(decode_dt).transpose()?,
      note:          self.note,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Column list matching [`RawUser::from_row`].
pub const USER_COLUMNS: &str = "user_id, email, password_hash, version, created_at";

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub user_id:       String,
  pub email:         String,
  pub password_hash: String,
  pub version:       Option<i64>,
  pub created_at:    String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:       row.get(0)?,
      email:         row.get(1)?,
      password_hash: row.get(2)?,
      version:       row.get(3)?,
      created_at:    row.get(4)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:       decode_uuid(&self.user_id)?,
      email:         self.email,
      password_hash: self.password_hash,
      version:       self.version.map(AppVersion::try_from).transpose()?,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `sessions` row.
pub struct RawSession {
  pub token_hash: String,
  pub user_id:    String,
  pub created_at: String,
  pub expires_at: String,
}

impl RawSession {
  pub fn into_session(self) -> Result<Session> {
    Ok(Session {
      token_hash: self.token_hash,
      user_id:    decode_uuid(&self.user_id)?,
      created_at: decode_dt(&self.created_at)?,
      expires_at: decode_dt(&self.expires_at)?,
    })
  }
}
