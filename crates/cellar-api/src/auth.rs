//! Handlers for `/auth/*`: credential sign-in with auto-registration,
//! sign-out, and the current-session lookup.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/signin`  | Body: [`SignInBody`]; unseen emails are registered |
//! | `POST` | `/auth/signout` | Drops the presented session; 204 |
//! | `GET`  | `/auth/session` | The caller's [`User`] |

use argon2::{
  Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier as _,
  password_hash::SaltString,
};
use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::StatusCode,
};
use cellar_core::{
  session::Session,
  store::CellarStore,
  user::{NewUser, User},
  validate::ValidationErrors,
};
use chrono::{DateTime, TimeDelta, Utc};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};

use crate::{
  AppState,
  error::ApiError,
  session::{Caller, generate_token, hash_token},
};

// ─── Passwords ───────────────────────────────────────────────────────────────

/// Produce an argon2 PHC string for `password`.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| ApiError::Internal(format!("argon2 error: {e}")))
}

/// `true` if `password` matches the stored PHC string.
pub fn verify_password(password: &str, phc: &str) -> bool {
  PasswordHash::new(phc)
    .and_then(|parsed| {
      Argon2::default().verify_password(password.as_bytes(), &parsed)
    })
    .is_ok()
}

fn check_password(user: User, password: &str) -> Result<User, ApiError> {
  if verify_password(password, &user.password_hash) {
    Ok(user)
  } else {
    tracing::info!(user_id = %user.user_id, "sign-in rejected: password mismatch");
    Err(ApiError::Unauthenticated)
  }
}

/// `now + ttl_hours`, or an internal error when the TTL is not a positive
/// representable span.
pub fn session_expiry(
  now: DateTime<Utc>,
  ttl_hours: i64,
) -> Result<DateTime<Utc>, ApiError> {
  TimeDelta::try_hours(ttl_hours)
    .filter(|ttl| *ttl > TimeDelta::zero())
    .and_then(|ttl| now.checked_add_signed(ttl))
    .ok_or_else(|| {
      ApiError::Internal(format!("session ttl of {ttl_hours} hours is out of range"))
    })
}

// ─── Sign in ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SignInBody {
  pub email:    String,
  pub password: String,
}

impl SignInBody {
  /// Trimmed, lower-cased email plus the password, or field errors.
  fn normalise(self) -> Result<(String, String), ValidationErrors> {
    let email = self.email.trim().to_lowercase();
    let mut errors = ValidationErrors::new();
    if email.is_empty() || !email.contains('@') {
      errors.push("email", "must be an email address");
    }
    if self.password.is_empty() {
      errors.push("password", "is required");
    }
    errors.into_result()?;
    Ok((email, self.password))
  }
}

#[derive(Debug, Serialize)]
pub struct SignInResponse {
  /// Bearer token; shown once and never stored server-side.
  pub token:      String,
  pub expires_at: DateTime<Utc>,
  pub user:       User,
}

/// `POST /auth/signin`
pub async fn sign_in<S>(
  State(state): State<AppState<S>>,
  payload: Result<Json<SignInBody>, JsonRejection>,
) -> Result<Json<SignInResponse>, ApiError>
where
  S: CellarStore + Clone + 'static,
{
  let Json(body) = payload?;
  let (email, password) = body.normalise()?;

  let now        = Utc::now();
  let expires_at = session_expiry(now, state.config.session_ttl_hours)?;

  let existing = state
    .store
    .find_user_by_email(&email)
    .await
    .map_err(ApiError::store)?;

  let user = match existing {
    Some(user) => check_password(user, &password)?,
    None => {
      let password_hash = hash_password(&password)?;
      let created = state
        .store
        .create_user(NewUser { email: email.clone(), password_hash })
        .await;
      match created {
        Ok(user) => {
          tracing::info!(user_id = %user.user_id, "registered new user on first sign-in");
          user
        }
        // A concurrent first sign-in may have registered the email between
        // the lookup and the insert.
        Err(e) => match state
          .store
          .find_user_by_email(&email)
          .await
          .map_err(ApiError::store)?
        {
          Some(user) => check_password(user, &password)?,
          None => return Err(ApiError::store(e)),
        },
      }
    }
  };

  let token = generate_token();
  let session = state
    .store
    .create_session(Session {
      token_hash: hash_token(&token),
      user_id:    user.user_id,
      created_at: now,
      expires_at,
    })
    .await
    .map_err(ApiError::store)?;

  tracing::info!(user_id = %user.user_id, "signed in");
  Ok(Json(SignInResponse { token, expires_at: session.expires_at, user }))
}

// ─── Sign out ────────────────────────────────────────────────────────────────

/// `POST /auth/signout`
pub async fn sign_out<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
) -> Result<StatusCode, ApiError>
where
  S: CellarStore + Clone + 'static,
{
  state
    .store
    .delete_session(&caller.token_hash)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Current session ─────────────────────────────────────────────────────────

/// `GET /auth/session`
pub async fn current<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
) -> Result<Json<User>, ApiError>
where
  S: CellarStore + Clone + 'static,
{
  let user = state
    .store
    .get_user(caller.user_id)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::Unauthenticated)?;
  Ok(Json(user))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn password_hash_verifies() {
    let phc = hash_password("hunter2").unwrap();
    assert!(phc.starts_with("$argon2"));
    assert!(verify_password("hunter2", &phc));
    assert!(!verify_password("hunter3", &phc));
    assert!(!verify_password("hunter2", "not-a-phc-string"));
  }

  #[test]
  fn session_expiry_rejects_unusable_ttls() {
    let now = Utc::now();
    assert_eq!(session_expiry(now, 2).unwrap(), now + TimeDelta::hours(2));
    assert!(session_expiry(now, 0).is_err());
    assert!(session_expiry(now, -5).is_err());
    assert!(session_expiry(now, i64::MAX / 1000).is_err());
  }

  #[test]
  fn sign_in_body_normalises_email() {
    let body = SignInBody {
      email:    "  Ann@Example.COM ".into(),
      password: "pw".into(),
    };
    let (email, password) = body.normalise().unwrap();
    assert_eq!(email, "ann@example.com");
    assert_eq!(password, "pw");
  }

  #[test]
  fn sign_in_body_reports_both_fields() {
    let body = SignInBody { email: "nope".into(), password: String::new() };
    let errors = body.normalise().unwrap_err();
    let fields: Vec<_> = errors.fields().iter().map(|e| e.field).collect();
    assert_eq!(fields, ["email", "password"]);
  }
}
