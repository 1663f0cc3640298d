//! [`Pipeline`] — one sequential extract → dedup → load run.

use std::time::Instant;

use tracing::{debug, error, info, warn};

use driftnet_core::{RankingWindow, Source, Store};

use crate::{
  error::Error,
  report::{CommentRun, PipelineRun, PostRun, Stats},
};

/// When no explicit comment targets are given, fall back to this many of the
/// most recently created locally-stored posts.
const DISCOVERY_LIMIT: u32 = 10;

type RunResult<T, F, S> =
  Result<T, Error<<F as Source>::Error, <S as Store>::Error>>;

/// Orchestrates extraction from a [`Source`] into a [`Store`] for one
/// community.
///
/// Execution is strictly sequential: one source or store call in flight at a
/// time, posts fully processed before any comment work begins. The store
/// connection is created once (by the caller) and reused across stages.
pub struct Pipeline<F, S>
where
  F: Source,
  S: Store,
{
  source:    F,
  store:     S,
  community: String,
}

impl<F, S> Pipeline<F, S>
where
  F: Source,
  S: Store,
{
  pub fn new(source: F, store: S) -> Self {
    let community = source.community().to_owned();
    Self { source, store, community }
  }

  pub fn community(&self) -> &str { &self.community }

  pub fn source(&self) -> &F { &self.source }

  pub fn store(&self) -> &S { &self.store }

  /// Fetch ranked posts and load the ones not yet stored.
  ///
  /// The fetch is a fail-fast boundary: if it errors, the whole run aborts —
  /// comments depend on having posts. Per post, an existing row is skipped
  /// (never overwritten by this path), a constraint-rejected save is counted
  /// and logged, and a store failure propagates.
  pub async fn extract_and_load_posts(
    &self,
    limit: u32,
    window: RankingWindow,
  ) -> RunResult<PostRun, F, S> {
    info!(community = %self.community, limit, %window, "starting post extraction");

    let posts = self
      .source
      .fetch_posts(limit, window)
      .await
      .map_err(Error::Source)?;

    if posts.is_empty() {
      warn!("no posts extracted");
      return Ok(PostRun::default());
    }

    let mut run = PostRun {
      fetched: posts.len(),
      ..PostRun::default()
    };

    for post in &posts {
      if self
        .store
        .post_exists(&post.id)
        .await
        .map_err(Error::Store)?
      {
        run.skipped += 1;
        debug!(post_id = %post.id, "post already exists, skipping");
      } else if self.store.save_post(post).await.map_err(Error::Store)? {
        run.saved += 1;
        run.saved_ids.push(post.id.clone());
        debug!(post_id = %post.id, "saved post");
      } else {
        error!(post_id = %post.id, "failed to save post");
      }
    }

    info!(
      fetched = run.fetched,
      saved = run.saved,
      skipped = run.skipped,
      "post extraction completed"
    );
    Ok(run)
  }

  /// Fetch and load comments for the given posts, or for up to
  /// [`DISCOVERY_LIMIT`] recently created stored posts when `post_ids` is
  /// `None`.
  ///
  /// Unlike the post stage, each target is fault-isolated: a fetch or
  /// persistence failure for one post's comments is logged and the loop
  /// moves on to the next target.
  pub async fn extract_and_load_comments(
    &self,
    post_ids: Option<Vec<String>>,
    comment_limit: Option<u32>,
  ) -> RunResult<CommentRun, F, S> {
    let post_ids = match post_ids {
      Some(ids) => ids,
      None => self
        .store
        .recent_post_ids(&self.community, DISCOVERY_LIMIT)
        .await
        .map_err(Error::Store)?,
    };

    info!(targets = post_ids.len(), "starting comment extraction");

    let mut run = CommentRun {
      posts_processed: post_ids.len(),
      ..CommentRun::default()
    };

    for post_id in &post_ids {
      match self.load_comments_for_post(post_id, comment_limit).await {
        Ok((fetched, saved, skipped)) => {
          run.fetched += fetched;
          run.saved += saved;
          run.skipped += skipped;
        }
        Err(e) => {
          error!(post_id = %post_id, error = %e, "comment extraction failed for post");
          run.posts_failed += 1;
        }
      }
    }

    info!(
      fetched = run.fetched,
      saved = run.saved,
      skipped = run.skipped,
      posts_processed = run.posts_processed,
      posts_failed = run.posts_failed,
      "comment extraction completed"
    );
    Ok(run)
  }

  /// One target's comments: fetch, then exists/skip/save per comment.
  /// Returns `(fetched, saved, skipped)`.
  async fn load_comments_for_post(
    &self,
    post_id: &str,
    comment_limit: Option<u32>,
  ) -> RunResult<(usize, usize, usize), F, S> {
    let comments = self
      .source
      .fetch_comments(post_id, comment_limit)
      .await
      .map_err(Error::Source)?;

    let mut saved = 0;
    let mut skipped = 0;

    for comment in &comments {
      if self
        .store
        .comment_exists(&comment.id)
        .await
        .map_err(Error::Store)?
      {
        skipped += 1;
        debug!(comment_id = %comment.id, "comment already exists, skipping");
      } else if self
        .store
        .save_comment(comment)
        .await
        .map_err(Error::Store)?
      {
        saved += 1;
        debug!(comment_id = %comment.id, "saved comment");
      } else {
        error!(comment_id = %comment.id, "failed to save comment");
      }
    }

    Ok((comments.len(), saved, skipped))
  }

  /// The full run: posts, then comments for exactly the posts saved in this
  /// run. If nothing new was saved, the comment stage is skipped entirely —
  /// comments are only pulled for freshly discovered posts here.
  pub async fn run_full_pipeline(
    &self,
    post_limit: u32,
    window: RankingWindow,
    comment_limit: Option<u32>,
  ) -> RunResult<PipelineRun, F, S> {
    info!(community = %self.community, "starting full pipeline run");
    let started = Instant::now();

    let posts = self.extract_and_load_posts(post_limit, window).await?;

    let comments = if posts.saved > 0 {
      self
        .extract_and_load_comments(Some(posts.saved_ids.clone()), comment_limit)
        .await?
    } else {
      info!("no new posts saved, skipping comment extraction");
      CommentRun::default()
    };

    let run = PipelineRun {
      duration: started.elapsed(),
      posts,
      comments,
    };

    info!(
      duration_secs = run.duration.as_secs_f64(),
      total_data_points = run.total_data_points(),
      "full pipeline completed"
    );
    Ok(run)
  }

  /// Read-only snapshot of the store for this community. No side effects.
  pub async fn stats(&self) -> RunResult<Stats, F, S> {
    Ok(Stats {
      community:           self.community.clone(),
      post_count:          self
        .store
        .post_count(&self.community)
        .await
        .map_err(Error::Store)?,
      comment_count:       self
        .store
        .comment_count(&self.community)
        .await
        .map_err(Error::Store)?,
      latest_post_created: self
        .store
        .latest_post_created(&self.community)
        .await
        .map_err(Error::Store)?,
    })
  }
}
