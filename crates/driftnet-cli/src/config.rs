//! Process configuration, built once at startup and passed down.
//!
//! Layering: an optional TOML file, overlaid by `DRIFTNET_`-prefixed
//! environment variables (`DRIFTNET_CLIENT_ID`, `DRIFTNET_CLIENT_SECRET`,
//! …). Nothing below the CLI reads ambient state.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use driftnet_reddit::Credentials;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  /// Community (subreddit) to extract from.
  #[serde(default = "default_community")]
  pub community: String,

  #[serde(default)]
  pub client_id: String,

  #[serde(default)]
  pub client_secret: String,

  #[serde(default = "default_user_agent")]
  pub user_agent: String,

  /// Path of the production SQLite database.
  #[serde(default = "default_db_path")]
  pub db_path: PathBuf,

  /// Path of the isolated test database (`--test`).
  #[serde(default = "default_test_db_path")]
  pub test_db_path: PathBuf,
}

fn default_community() -> String { "universityofauckland".to_owned() }

fn default_user_agent() -> String {
  "driftnet/0.1 (periodic thread extractor)".to_owned()
}

fn default_db_path() -> PathBuf { PathBuf::from("driftnet.db") }

fn default_test_db_path() -> PathBuf { PathBuf::from("driftnet_test.db") }

impl Config {
  /// Load from `path` (missing file is fine — defaults plus environment).
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(config::Environment::with_prefix("DRIFTNET"))
      .build()
      .with_context(|| format!("failed to read config file {}", path.display()))?;

    settings
      .try_deserialize()
      .context("failed to deserialise configuration")
  }

  pub fn credentials(&self) -> Credentials {
    Credentials {
      client_id:     self.client_id.clone(),
      client_secret: self.client_secret.clone(),
      user_agent:    self.user_agent.clone(),
    }
  }

  pub fn db_path(&self, use_test_db: bool) -> &Path {
    if use_test_db { &self.test_db_path } else { &self.db_path }
  }
}
