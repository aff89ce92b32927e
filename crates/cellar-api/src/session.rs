//! Bearer-token session guard.
//!
//! Every guarded handler takes a [`Caller`]; extraction fails with
//! [`ApiError::Unauthenticated`] before the handler body runs.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use cellar_core::store::CellarStore;
use chrono::Utc;
use rand_core::{OsRng, RngCore as _};
use sha2::{Digest as _, Sha256};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// Random bytes per bearer token.
const TOKEN_BYTES: usize = 32;

/// The authenticated user behind a request.
#[derive(Debug, Clone)]
pub struct Caller {
  pub user_id:    Uuid,
  /// Digest of the presented token; identifies the session for sign-out.
  pub token_hash: String,
}

/// Generate a fresh bearer token (hex-encoded).
pub fn generate_token() -> String {
  let mut bytes = [0u8; TOKEN_BYTES];
  OsRng.fill_bytes(&mut bytes);
  hex::encode(bytes)
}

/// The digest under which a token's session is stored.
pub fn hash_token(token: &str) -> String {
  hex::encode(Sha256::digest(token.as_bytes()))
}

/// Pull the token out of an `Authorization: Bearer <token>` header. The
/// scheme name is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.split_once(' '))
    .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
    .map(|(_, token)| token.trim())
    .filter(|t| !t.is_empty())
}

impl<S> FromRequestParts<AppState<S>> for Caller
where
  S: CellarStore + Clone + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token      = bearer_token(&parts.headers).ok_or(ApiError::Unauthenticated)?;
    let token_hash = hash_token(token);

    let session = state
      .store
      .get_session(&token_hash)
      .await
      .map_err(ApiError::store)?
      .ok_or(ApiError::Unauthenticated)?;

    if session.is_expired(Utc::now()) {
      tracing::debug!(user_id = %session.user_id, "rejecting expired session");
      state
        .store
        .delete_session(&token_hash)
        .await
        .map_err(ApiError::store)?;
      return Err(ApiError::Unauthenticated);
    }

    Ok(Caller { user_id: session.user_id, token_hash })
  }
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  fn headers(value: &str) -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    h
  }

  #[test]
  fn tokens_are_unique_hex() {
    let a = generate_token();
    let b = generate_token();
    assert_eq!(a.len(), TOKEN_BYTES * 2);
    assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(a, b);
  }

  #[test]
  fn hash_is_stable_and_not_the_token() {
    let token = generate_token();
    assert_eq!(hash_token(&token), hash_token(&token));
    assert_ne!(hash_token(&token), token);
  }

  #[test]
  fn bearer_parsing() {
    assert_eq!(bearer_token(&headers("Bearer abc")), Some("abc"));
    assert_eq!(bearer_token(&headers("bearer abc")), Some("abc"));
    assert_eq!(bearer_token(&headers("BEARER abc")), Some("abc"));
    assert_eq!(bearer_token(&headers("Basic abc")), None);
    assert_eq!(bearer_token(&headers("Bearerabc")), None);
    assert_eq!(bearer_token(&headers("Bearer ")), None);
    assert_eq!(bearer_token(&HeaderMap::new()), None);
  }
}
