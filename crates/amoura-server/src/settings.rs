//! Layered server configuration: defaults, then an optional TOML file, then
//! `AMOURA_*` environment variables.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Runtime server configuration.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
  pub host:                 String,
  pub port:                 u16,
  pub store_path:           PathBuf,
  /// Upper bound on a single request, swipe included.
  pub request_timeout_secs: u64,
}

impl ServerConfig {
  /// Build from `file` (may be missing) and `env`.
  pub fn load(file: &Path, env: Environment) -> Result<Self, ConfigError> {
    Config::builder()
      .set_default("host", "127.0.0.1")?
      .set_default("port", 8080)?
      .set_default("store_path", "~/.local/share/amoura/amoura.db")?
      .set_default("request_timeout_secs", 10)?
      .add_source(File::from(file).required(false))
      .add_source(env.try_parsing(true))
      .build()?
      .try_deserialize()
  }

  /// The process environment source, `AMOURA_STORE_PATH` → `store_path`.
  pub fn environment() -> Environment { Environment::with_prefix("AMOURA") }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn request_timeout(&self) -> Duration { Duration::from_secs(self.request_timeout_secs) }

  /// `store_path` with a leading `~` expanded.
  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
