//! Reddit adapter for Driftnet — the one concrete [`Source`] implementation.
//!
//! Talks to Reddit's application-only OAuth2 endpoint and JSON listing API,
//! converts the listing envelope into core records, and flattens nested
//! comment trees into the flat shape the store expects.
//!
//! [`Source`]: driftnet_core::Source

mod source;
mod wire;

pub mod error;

pub use error::{Error, Result};
pub use source::{Credentials, RedditSource};
