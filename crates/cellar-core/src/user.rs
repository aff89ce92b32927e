//! Users and the per-user application version flag.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Which client-side field-handling variant a user sees.
///
/// The server only stores the flag; interpretation is up to the client.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(into = "i64", try_from = "i64")]
pub enum AppVersion {
  #[default]
  V1,
  V2,
}

impl AppVersion {
  pub fn as_i64(self) -> i64 {
    match self {
      Self::V1 => 1,
      Self::V2 => 2,
    }
  }
}

impl TryFrom<i64> for AppVersion {
  type Error = Error;

  fn try_from(v: i64) -> Result<Self> {
    match v {
      1 => Ok(Self::V1),
      2 => Ok(Self::V2),
      other => Err(Error::UnknownVersion(other)),
    }
  }
}

impl From<AppVersion> for i64 {
  fn from(v: AppVersion) -> Self { v.as_i64() }
}

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub user_id:       Uuid,
  pub email:         String,
  /// argon2 PHC string. Never sent to clients.
  #[serde(skip_serializing, default)]
  pub password_hash: String,
  pub version:       Option<AppVersion>,
  pub created_at:    DateTime<Utc>,
}

/// Input to [`crate::store::CellarStore::create_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
  /// Already normalised (trimmed, lower-cased).
  pub email:         String,
  pub password_hash: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn version_from_integer() {
    assert_eq!(AppVersion::try_from(1).unwrap(), AppVersion::V1);
    assert_eq!(AppVersion::try_from(2).unwrap(), AppVersion::V2);
    assert!(matches!(AppVersion::try_from(3), Err(Error::UnknownVersion(3))));
  }

  #[test]
  fn version_serialises_as_number() {
    assert_eq!(serde_json::to_string(&AppVersion::V2).unwrap(), "2");
    let v: AppVersion = serde_json::from_str("1").unwrap();
    assert_eq!(v, AppVersion::V1);
    assert!(serde_json::from_str::<AppVersion>("7").is_err());
  }

  #[test]
  fn user_json_omits_password_hash() {
    let user = User {
      user_id:       Uuid::new_v4(),
      email:         "a@example.com".into(),
      password_hash: "$argon2id$secret".into(),
      version:       Some(AppVersion::V1),
      created_at:    Utc::now(),
    };
    let json = serde_json::to_value(&user).unwrap();
    assert!(json.get("password_hash").is_none());
    assert_eq!(json["version"], 1);
  }
}
