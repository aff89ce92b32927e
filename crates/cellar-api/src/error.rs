//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, QueryRejection},
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use cellar_core::validate::ValidationErrors;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// No session, or the session is unknown or expired.
  #[error("unauthenticated")]
  Unauthenticated,

  /// The record is missing or belongs to someone else. The two cases are
  /// deliberately indistinguishable.
  #[error("forbidden")]
  Forbidden,

  #[error("invalid input: {0}")]
  InvalidInput(ValidationErrors),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("internal error: {0}")]
  Internal(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

impl From<ValidationErrors> for ApiError {
  fn from(errors: ValidationErrors) -> Self { Self::InvalidInput(errors) }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    Self::InvalidInput(ValidationErrors::single("body", rejection.body_text()))
  }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self {
    Self::InvalidInput(ValidationErrors::single("query", rejection.body_text()))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::Unauthenticated => {
        let mut res = (
          StatusCode::UNAUTHORIZED,
          Json(json!({ "error": "unauthenticated" })),
        )
          .into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Bearer realm=\"cellar\""),
        );
        res
      }
      ApiError::Forbidden => {
        (StatusCode::FORBIDDEN, Json(json!({ "error": "forbidden" })))
          .into_response()
      }
      ApiError::InvalidInput(errors) => (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "invalid input", "fields": errors })),
      )
        .into_response(),
      ApiError::NotFound(m) => {
        (StatusCode::NOT_FOUND, Json(json!({ "error": m }))).into_response()
      }
      ApiError::Internal(m) => {
        tracing::error!(error = %m, "internal error");
        internal_error()
      }
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store error");
        internal_error()
      }
    }
  }
}

fn internal_error() -> Response {
  (
    StatusCode::INTERNAL_SERVER_ERROR,
    Json(json!({ "error": "internal server error" })),
  )
    .into_response()
}
