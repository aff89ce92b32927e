//! Runtime configuration, layered from an optional TOML file and `CELLAR_*`
//! environment variables.

use std::path::{Path, PathBuf};

use cellar_api::ApiConfig;
use serde::Deserialize;

/// Upper bound for `session_ttl_hours`: ten years.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365 * 10;

/// Runtime server configuration.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:              String,
  pub port:              u16,
  /// SQLite file; a leading `~/` is expanded.
  pub database_path:     PathBuf,
  pub session_ttl_hours: i64,
  pub strict_ownership:  bool,
}

impl Default for ServerConfig {
  fn default() -> Self {
    let api = ApiConfig::default();
    Self {
      host:              "127.0.0.1".to_string(),
      port:              3000,
      database_path:     PathBuf::from("cellar.db"),
      session_ttl_hours: api.session_ttl_hours,
      strict_ownership:  api.strict_ownership,
    }
  }
}

impl ServerConfig {
  /// Read `path` (if it exists) and overlay `CELLAR_*` environment variables.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("CELLAR"))
      .build()?
      .try_deserialize::<Self>()?
      .checked()
  }

  /// Reject values the server cannot run with.
  pub fn checked(self) -> Result<Self, config::ConfigError> {
    if !(1..=MAX_SESSION_TTL_HOURS).contains(&self.session_ttl_hours) {
      return Err(config::ConfigError::Message(format!(
        "session_ttl_hours must be between 1 and {MAX_SESSION_TTL_HOURS}, got {}",
        self.session_ttl_hours
      )));
    }
    Ok(self)
  }

  pub fn api_config(&self) -> ApiConfig {
    ApiConfig {
      session_ttl_hours: self.session_ttl_hours,
      strict_ownership:  self.strict_ownership,
    }
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
