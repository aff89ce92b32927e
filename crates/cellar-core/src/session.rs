//! Login sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A server-side session. The bearer token itself is never stored, only its
/// SHA-256 digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
  /// Lowercase hex SHA-256 of the bearer token.
  pub token_hash: String,
  pub user_id:    Uuid,
  pub created_at: DateTime<Utc>,
  pub expires_at: DateTime<Utc>,
}

impl Session {
  pub fn is_expired(&self, now: DateTime<Utc>) -> bool { now >= self.expires_at }
}
