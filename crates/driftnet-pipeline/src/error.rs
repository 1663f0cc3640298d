//! Error type for `driftnet-pipeline`.
//!
//! A pipeline error is always one of its collaborators' errors, so the type
//! is generic over both. Which side failed matters to the caller: source
//! failures are retryable on the next scheduled run, store failures usually
//! mean the run left the database exactly as durable as it was at the
//! failure point.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error<SE, TE>
where
  SE: std::error::Error,
  TE: std::error::Error,
{
  #[error("source error: {0}")]
  Source(#[source] SE),

  #[error("store error: {0}")]
  Store(#[source] TE),
}
