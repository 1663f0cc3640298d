//! The Driftnet pipeline orchestrator.
//!
//! Drives one extract → dedup → load run over a [`Source`] and a [`Store`]:
//! posts first (fail-fast), then comments for the freshly saved posts only
//! (fault-isolated per post). Generic over both trait contracts so tests can
//! substitute fakes for either side.
//!
//! [`Source`]: driftnet_core::Source
//! [`Store`]: driftnet_core::Store

mod pipeline;
mod report;

pub mod error;

pub use error::Error;
pub use pipeline::Pipeline;
pub use report::{CommentRun, PipelineRun, PostRun, Stats};

#[cfg(test)]
mod tests;
