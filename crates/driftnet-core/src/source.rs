//! The [`Source`] trait — the fetch side of the pipeline.
//!
//! Implemented by upstream adapters (e.g. `driftnet-reddit`). The pipeline
//! depends on this abstraction, not on any concrete API client, so tests can
//! substitute fakes.

use crate::{
  record::{Comment, Post},
  window::RankingWindow,
};

/// Posts and their comments fetched in one combined pass.
#[derive(Debug, Clone, Default)]
pub struct ThreadBatch {
  pub posts:    Vec<Post>,
  pub comments: Vec<Comment>,
}

impl ThreadBatch {
  pub fn post_count(&self) -> usize { self.posts.len() }

  pub fn comment_count(&self) -> usize { self.comments.len() }
}

/// Abstraction over an upstream content source scoped to one community.
///
/// Every record yielded is fully normalized: text trimmed and stripped of
/// embedded NUL bytes, empty/absent text mapped to `None`, epoch-seconds
/// timestamps converted to UTC instants. Fetch calls fail with the adapter's
/// error type when the upstream is unreachable, credentials are rejected, or
/// a post cannot be located.
pub trait Source {
  type Error: std::error::Error + Send + Sync + 'static;

  /// The community this source is scoped to.
  fn community(&self) -> &str;

  /// Fetch up to `limit` posts ranked "top" within `window`, in rank order.
  async fn fetch_posts(
    &self,
    limit: u32,
    window: RankingWindow,
  ) -> Result<Vec<Post>, Self::Error>;

  /// Fetch comments for `post_id`, flattened (reply trees collapsed into a
  /// flat sequence retaining `parent_id` linkage). `limit` of `None` means
  /// all available comments.
  async fn fetch_comments(
    &self,
    post_id: &str,
    limit: Option<u32>,
  ) -> Result<Vec<Comment>, Self::Error>;

  /// Convenience composition: posts plus their comments, fetched per post.
  async fn fetch_posts_with_comments(
    &self,
    limit: u32,
    window: RankingWindow,
    comment_limit: Option<u32>,
  ) -> Result<ThreadBatch, Self::Error> {
    let posts = self.fetch_posts(limit, window).await?;

    let mut comments = Vec::new();
    for post in &posts {
      comments.extend(self.fetch_comments(&post.id, comment_limit).await?);
    }

    Ok(ThreadBatch { posts, comments })
  }
}
