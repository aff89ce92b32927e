//! Error type for `cellar-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] cellar_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A bottle batch that would need more counters than fit in an `i64`.
  #[error("bottle counter overflow starting at {0}")]
  CounterOverflow(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
