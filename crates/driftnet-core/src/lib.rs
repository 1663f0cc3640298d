//! Core types and trait definitions for the Driftnet thread extractor.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod record;
pub mod source;
pub mod store;
pub mod window;

pub use error::{Error, Result};
pub use record::{Comment, Post};
pub use source::{Source, ThreadBatch};
pub use store::Store;
pub use window::RankingWindow;
