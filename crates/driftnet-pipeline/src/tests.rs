//! Pipeline tests against a fake source and the in-memory SQLite store.

use std::{
  collections::{HashMap, HashSet},
  sync::Mutex,
};

use chrono::{TimeZone, Utc};
use thiserror::Error;

use driftnet_core::{Comment, Post, RankingWindow, Source, Store};
use driftnet_store_sqlite::SqliteStore;

use crate::{Error, Pipeline};

const COMMUNITY: &str = "universityofauckland";

// ─── Fake source ─────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
#[error("upstream unavailable")]
struct FakeError;

/// A scripted [`Source`]: fixed posts, comments keyed by post ID, optional
/// failure injection, and a log of comment-fetch calls for assertions.
#[derive(Default)]
struct FakeSource {
  posts:           Vec<Post>,
  comments:        HashMap<String, Vec<Comment>>,
  failing_posts:   HashSet<String>,
  fail_post_fetch: bool,
  comment_calls:   Mutex<Vec<String>>,
}

impl FakeSource {
  fn comment_calls(&self) -> Vec<String> {
    self.comment_calls.lock().unwrap().clone()
  }
}

impl Source for FakeSource {
  type Error = FakeError;

  fn community(&self) -> &str { COMMUNITY }

  async fn fetch_posts(
    &self,
    limit: u32,
    _window: RankingWindow,
  ) -> Result<Vec<Post>, FakeError> {
    if self.fail_post_fetch {
      return Err(FakeError);
    }
    Ok(self.posts.iter().take(limit as usize).cloned().collect())
  }

  async fn fetch_comments(
    &self,
    post_id: &str,
    limit: Option<u32>,
  ) -> Result<Vec<Comment>, FakeError> {
    self.comment_calls.lock().unwrap().push(post_id.to_owned());

    if self.failing_posts.contains(post_id) {
      return Err(FakeError);
    }

    let mut comments =
      self.comments.get(post_id).cloned().unwrap_or_default();
    if let Some(limit) = limit {
      comments.truncate(limit as usize);
    }
    Ok(comments)
  }
}

// ─── Builders ────────────────────────────────────────────────────────────────

fn post(id: &str, created_day: u32) -> Post {
  Post {
    id:            id.to_owned(),
    title:         format!("post {id}"),
    body:          None,
    author:        Some("alice".to_owned()),
    created_at:    Some(
      Utc.with_ymd_and_hms(2024, 6, created_day, 0, 0, 0).unwrap(),
    ),
    score:         Some(1),
    comment_count: None,
    upvote_ratio:  None,
    url:           None,
    community:     Some(COMMUNITY.to_owned()),
    flair:         None,
    is_video:      None,
    is_self:       Some(true),
    permalink:     None,
    content_hint:  None,
    extracted_at:  Utc::now(),
  }
}

fn comment(id: &str, post_id: &str) -> Comment {
  Comment {
    id:               id.to_owned(),
    post_id:          post_id.to_owned(),
    parent_id:        Some(format!("t3_{post_id}")),
    body:             Some("text".to_owned()),
    author:           Some("bob".to_owned()),
    created_at:       None,
    score:            None,
    from_post_author: Some(false),
    permalink:        None,
    extracted_at:     Utc::now(),
  }
}

async fn pipeline(source: FakeSource) -> Pipeline<FakeSource, SqliteStore> {
  let store = SqliteStore::open_in_memory().await.expect("in-memory store");
  Pipeline::new(source, store)
}

// ─── Post stage ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn posts_dedup_counts() {
  let source = FakeSource {
    posts: vec![post("p1", 1), post("p2", 2), post("p3", 3)],
    ..FakeSource::default()
  };
  let p = pipeline(source).await;

  // p2 already exists locally.
  p.store().save_post(&post("p2", 2)).await.unwrap();

  let run = p
    .extract_and_load_posts(25, RankingWindow::Day)
    .await
    .unwrap();

  assert_eq!(run.fetched, 3);
  assert_eq!(run.saved, 2);
  assert_eq!(run.skipped, 1);
  assert_eq!(run.saved_ids, vec!["p1", "p3"]);
}

#[tokio::test]
async fn existing_posts_are_not_overwritten() {
  let mut refetched = post("p1", 1);
  refetched.title = "updated upstream".to_owned();

  let source = FakeSource {
    posts: vec![refetched],
    ..FakeSource::default()
  };
  let p = pipeline(source).await;
  p.store().save_post(&post("p1", 1)).await.unwrap();

  p.extract_and_load_posts(25, RankingWindow::Day)
    .await
    .unwrap();

  let stored = p.store().get_post("p1").await.unwrap().unwrap();
  assert_eq!(stored.title, "post p1");
}

#[tokio::test]
async fn post_fetch_failure_aborts_the_run() {
  let source = FakeSource {
    fail_post_fetch: true,
    ..FakeSource::default()
  };
  let p = pipeline(source).await;

  let err = p
    .extract_and_load_posts(25, RankingWindow::Day)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Source(_)));
}

#[tokio::test]
async fn empty_fetch_yields_zeroed_run() {
  let p = pipeline(FakeSource::default()).await;

  let run = p
    .extract_and_load_posts(25, RankingWindow::Day)
    .await
    .unwrap();
  assert_eq!(run.fetched, 0);
  assert_eq!(run.saved, 0);
  assert!(run.saved_ids.is_empty());
}

// ─── Comment stage ───────────────────────────────────────────────────────────

#[tokio::test]
async fn comment_failure_is_isolated_per_post() {
  let source = FakeSource {
    comments:      HashMap::from([
      ("p1".to_owned(), vec![comment("c1", "p1"), comment("c2", "p1")]),
      ("p3".to_owned(), vec![comment("c3", "p3")]),
    ]),
    failing_posts: HashSet::from(["p2".to_owned()]),
    ..FakeSource::default()
  };
  let p = pipeline(source).await;

  let targets = vec!["p1".to_owned(), "p2".to_owned(), "p3".to_owned()];
  let run = p
    .extract_and_load_comments(Some(targets), None)
    .await
    .unwrap();

  assert_eq!(run.posts_processed, 3);
  assert_eq!(run.posts_failed, 1);
  assert_eq!(run.fetched, 3);
  assert_eq!(run.saved, 3);
  assert!(p.store().comment_exists("c1").await.unwrap());
  assert!(p.store().comment_exists("c3").await.unwrap());
}

#[tokio::test]
async fn comment_dedup_counts() {
  let source = FakeSource {
    comments: HashMap::from([(
      "p1".to_owned(),
      vec![comment("c1", "p1"), comment("c2", "p1")],
    )]),
    ..FakeSource::default()
  };
  let p = pipeline(source).await;
  p.store().save_comment(&comment("c1", "p1")).await.unwrap();

  let run = p
    .extract_and_load_comments(Some(vec!["p1".to_owned()]), None)
    .await
    .unwrap();

  assert_eq!(run.fetched, 2);
  assert_eq!(run.saved, 1);
  assert_eq!(run.skipped, 1);
}

#[tokio::test]
async fn comment_targets_auto_discovered_from_recent_posts() {
  let p = pipeline(FakeSource::default()).await;

  // 12 stored posts; only the 10 most recently created become targets.
  for day in 1..=12 {
    p.store()
      .save_post(&post(&format!("p{day}"), day))
      .await
      .unwrap();
  }

  let run = p.extract_and_load_comments(None, None).await.unwrap();
  assert_eq!(run.posts_processed, 10);

  let calls = p.source().comment_calls();
  assert_eq!(calls.len(), 10);
  assert_eq!(calls[0], "p12");
  assert!(!calls.contains(&"p1".to_owned()));
  assert!(!calls.contains(&"p2".to_owned()));
}

#[tokio::test]
async fn comment_limit_is_passed_through() {
  let source = FakeSource {
    comments: HashMap::from([(
      "p1".to_owned(),
      vec![
        comment("c1", "p1"),
        comment("c2", "p1"),
        comment("c3", "p1"),
      ],
    )]),
    ..FakeSource::default()
  };
  let p = pipeline(source).await;

  let run = p
    .extract_and_load_comments(Some(vec!["p1".to_owned()]), Some(2))
    .await
    .unwrap();
  assert_eq!(run.fetched, 2);
  assert_eq!(run.saved, 2);
}

// ─── Full pipeline ───────────────────────────────────────────────────────────

#[tokio::test]
async fn no_new_posts_short_circuits_comment_stage() {
  let source = FakeSource {
    posts: vec![post("p1", 1)],
    comments: HashMap::from([(
      "p1".to_owned(),
      vec![comment("c1", "p1")],
    )]),
    ..FakeSource::default()
  };
  let p = pipeline(source).await;
  p.store().save_post(&post("p1", 1)).await.unwrap();

  let run = p
    .run_full_pipeline(25, RankingWindow::Day, None)
    .await
    .unwrap();

  assert_eq!(run.posts.saved, 0);
  assert_eq!(run.posts.skipped, 1);
  assert_eq!(run.comments.fetched, 0);
  assert_eq!(run.comments.saved, 0);
  assert_eq!(run.comments.posts_processed, 0);
  assert_eq!(run.total_data_points(), 0);

  // The comment fetch was never invoked at all.
  assert!(p.source().comment_calls().is_empty());
}

#[tokio::test]
async fn full_pipeline_end_to_end() {
  // Source yields 2 posts (p1 new, p2 pre-existing) and, for p1 only,
  // 3 comments (2 new, 1 pre-existing).
  let source = FakeSource {
    posts: vec![post("p1", 1), post("p2", 2)],
    comments: HashMap::from([(
      "p1".to_owned(),
      vec![
        comment("c1", "p1"),
        comment("c2", "p1"),
        comment("c3", "p1"),
      ],
    )]),
    ..FakeSource::default()
  };
  let p = pipeline(source).await;
  p.store().save_post(&post("p2", 2)).await.unwrap();
  p.store().save_comment(&comment("c3", "p1")).await.unwrap();

  let run = p
    .run_full_pipeline(25, RankingWindow::Day, None)
    .await
    .unwrap();

  assert_eq!(run.posts.saved, 1);
  assert_eq!(run.posts.skipped, 1);
  assert_eq!(run.comments.saved, 2);
  assert_eq!(run.comments.skipped, 1);
  assert_eq!(run.total_data_points(), 3);

  // Comments were pulled only for the freshly saved post.
  assert_eq!(p.source().comment_calls(), vec!["p1".to_owned()]);
}

#[tokio::test]
async fn stats_increase_by_exactly_the_saved_counts() {
  let source = FakeSource {
    posts: vec![post("p1", 1), post("p2", 2)],
    comments: HashMap::from([
      ("p1".to_owned(), vec![comment("c1", "p1")]),
      ("p2".to_owned(), vec![comment("c2", "p2"), comment("c3", "p2")]),
    ]),
    ..FakeSource::default()
  };
  let p = pipeline(source).await;

  let before = p.stats().await.unwrap();
  assert_eq!(before.post_count, 0);
  assert_eq!(before.comment_count, 0);
  assert!(before.latest_post_created.is_none());

  let run = p
    .run_full_pipeline(25, RankingWindow::Day, None)
    .await
    .unwrap();
  assert_eq!(run.posts.saved, 2);
  assert_eq!(run.comments.saved, 3);

  let after = p.stats().await.unwrap();
  assert_eq!(after.community, COMMUNITY);
  assert_eq!(after.post_count, before.post_count + 2);
  assert_eq!(after.comment_count, before.comment_count + 3);
  assert_eq!(
    after.latest_post_created,
    Some(Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap())
  );
}

// ─── Source composition ──────────────────────────────────────────────────────

#[tokio::test]
async fn fetch_posts_with_comments_composes_both_calls() {
  let source = FakeSource {
    posts: vec![post("p1", 1), post("p2", 2)],
    comments: HashMap::from([
      ("p1".to_owned(), vec![comment("c1", "p1")]),
      ("p2".to_owned(), vec![comment("c2", "p2")]),
    ]),
    ..FakeSource::default()
  };

  let batch = source
    .fetch_posts_with_comments(10, RankingWindow::Week, None)
    .await
    .unwrap();

  assert_eq!(batch.post_count(), 2);
  assert_eq!(batch.comment_count(), 2);
}
