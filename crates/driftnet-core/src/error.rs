//! Error types for `driftnet-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown ranking window: {0:?}")]
  UnknownWindow(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
