//! Run reports — the counters each pipeline stage produces.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome of the post stage.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PostRun {
  /// How many posts the source returned.
  pub fetched:   usize,
  pub saved:     usize,
  /// Posts that already existed locally and were left untouched.
  pub skipped:   usize,
  /// IDs actually saved this run, in fetch order. Threaded through so the
  /// comment stage targets exactly these posts instead of re-deriving them
  /// by query.
  pub saved_ids: Vec<String>,
}

/// Outcome of the comment stage.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CommentRun {
  pub fetched:         usize,
  pub saved:           usize,
  pub skipped:         usize,
  /// Every target post attempted, including failed ones.
  pub posts_processed: usize,
  /// Targets whose comment fetch or persistence failed and were skipped.
  pub posts_failed:    usize,
}

/// Aggregated outcome of one full pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRun {
  /// Wall-clock duration of the whole run.
  pub duration: Duration,
  pub posts:    PostRun,
  pub comments: CommentRun,
}

impl PipelineRun {
  /// Newly stored records: posts saved plus comments saved.
  pub fn total_data_points(&self) -> usize {
    self.posts.saved + self.comments.saved
  }
}

/// Read-only snapshot of what the store holds for one community.
#[derive(Debug, Clone, Serialize)]
pub struct Stats {
  pub community:           String,
  pub post_count:          u64,
  pub comment_count:       u64,
  pub latest_post_created: Option<DateTime<Utc>>,
}
