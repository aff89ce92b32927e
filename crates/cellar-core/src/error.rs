//! Error types for `cellar-core`.

use thiserror::Error;

use crate::validate::ValidationErrors;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid input: {0}")]
  InvalidInput(#[from] ValidationErrors),

  #[error("unknown wine type: {0:?}")]
  UnknownWineType(String),

  #[error("unsupported application version: {0}")]
  UnknownVersion(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
