//! Error type for `driftnet-reddit`.
//!
//! Every variant is a "source unavailable" class failure from the pipeline's
//! point of view: fatal for post extraction, isolated per post for comment
//! extraction.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("reddit credentials are not configured")]
  NotConfigured,

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("token request rejected with status {0}")]
  Auth(reqwest::StatusCode),

  #[error("upstream returned status {0}")]
  UpstreamStatus(reqwest::StatusCode),

  #[error("post not found upstream: {0}")]
  PostNotFound(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
