//! The [`Store`] trait — the persistence side of the pipeline.
//!
//! Implemented by storage backends (e.g. `driftnet-store-sqlite`). The
//! pipeline depends on this abstraction, not on any concrete backend.

use chrono::{DateTime, Utc};

use crate::record::{Comment, Post};

/// Abstraction over a durable store of posts and comments.
///
/// Each method is one scoped unit of work: commit on success, roll back and
/// propagate on error. The existence check and a subsequent save for the
/// same record are deliberately *not* one transaction — a single writer per
/// store is assumed.
///
/// `save_post` and `save_comment` are idempotent upserts: applying the same
/// record twice yields one stored row whose fields equal the most recently
/// applied version. They return `Ok(false)` instead of an error when the
/// record is rejected by an ordinary constraint violation, which callers
/// treat as a skip signal; infrastructure failures are `Err`. The store
/// stamps `extracted_at` with the local clock on every save.
pub trait Store {
  type Error: std::error::Error + Send + Sync + 'static;

  async fn post_exists(&self, id: &str) -> Result<bool, Self::Error>;

  async fn comment_exists(&self, id: &str) -> Result<bool, Self::Error>;

  /// Insert-or-replace one post by primary key.
  async fn save_post(&self, post: &Post) -> Result<bool, Self::Error>;

  /// Insert-or-replace one comment by primary key.
  async fn save_comment(
    &self,
    comment: &Comment,
  ) -> Result<bool, Self::Error>;

  /// Upsert a batch of posts with per-record isolation: one record's
  /// failure is logged and counted as not-saved without aborting the rest.
  /// Returns the number of records saved.
  async fn save_posts(&self, posts: &[Post]) -> Result<usize, Self::Error>;

  /// Batch counterpart of [`Store::save_comment`]; same isolation rules.
  async fn save_comments(
    &self,
    comments: &[Comment],
  ) -> Result<usize, Self::Error>;

  /// Number of stored posts tagged with `community`.
  async fn post_count(&self, community: &str) -> Result<u64, Self::Error>;

  /// Number of stored comments whose post is tagged with `community`.
  /// Comments whose post is not stored locally are not counted.
  async fn comment_count(&self, community: &str) -> Result<u64, Self::Error>;

  /// The maximum creation timestamp among posts tagged with `community`,
  /// or `None` if no rows match.
  async fn latest_post_created(
    &self,
    community: &str,
  ) -> Result<Option<DateTime<Utc>>, Self::Error>;

  /// IDs of the most recently created posts for `community`, creation
  /// timestamp descending. Used to auto-discover comment targets.
  async fn recent_post_ids(
    &self,
    community: &str,
    limit: u32,
  ) -> Result<Vec<String>, Self::Error>;
}
