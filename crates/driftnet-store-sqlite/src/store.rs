//! [`SqliteStore`] — the SQLite implementation of [`Store`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use tracing::warn;

use driftnet_core::{Comment, Post, Store};

use crate::{
  Error, Result,
  encode::{RawComment, RawPost, decode_dt, encode_dt},
  schema::SCHEMA,
};

/// A Driftnet store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. Each method
/// call is one scoped unit of work; an existence check and a subsequent save
/// are two separate ones, so a single writer per database is assumed.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// Whether `err` is an ordinary constraint violation — the one failure class
/// the caller treats as a per-record skip rather than an error.
fn is_constraint_violation(err: &tokio_rusqlite::Error) -> bool {
  matches!(
    err,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _))
      if e.code == rusqlite::ErrorCode::ConstraintViolation
  )
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Fetch one post by ID. Not part of the [`Store`] contract; used by
  /// callers that need to inspect stored rows.
  pub async fn get_post(&self, id: &str) -> Result<Option<Post>> {
    let id = id.to_owned();

    let raw: Option<RawPost> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, title, body, author, created_at, score,
                      comment_count, upvote_ratio, url, community, flair,
                      is_video, is_self, permalink, content_hint, extracted_at
               FROM posts WHERE id = ?1",
              rusqlite::params![id],
              |row| {
                Ok(RawPost {
                  id:            row.get(0)?,
                  title:         row.get(1)?,
                  body:          row.get(2)?,
                  author:        row.get(3)?,
                  created_at:    row.get(4)?,
                  score:         row.get(5)?,
                  comment_count: row.get(6)?,
                  upvote_ratio:  row.get(7)?,
                  url:           row.get(8)?,
                  community:     row.get(9)?,
                  flair:         row.get(10)?,
                  is_video:      row.get(11)?,
                  is_self:       row.get(12)?,
                  permalink:     row.get(13)?,
                  content_hint:  row.get(14)?,
                  extracted_at:  row.get(15)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPost::into_post).transpose()
  }

  /// Fetch one comment by ID. Companion to [`SqliteStore::get_post`].
  pub async fn get_comment(&self, id: &str) -> Result<Option<Comment>> {
    let id = id.to_owned();

    let raw: Option<RawComment> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, post_id, parent_id, body, author, created_at,
                      score, from_post_author, permalink, extracted_at
               FROM comments WHERE id = ?1",
              rusqlite::params![id],
              |row| {
                Ok(RawComment {
                  id:               row.get(0)?,
                  post_id:          row.get(1)?,
                  parent_id:        row.get(2)?,
                  body:             row.get(3)?,
                  author:           row.get(4)?,
                  created_at:       row.get(5)?,
                  score:            row.get(6)?,
                  from_post_author: row.get(7)?,
                  permalink:        row.get(8)?,
                  extracted_at:     row.get(9)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawComment::into_comment).transpose()
  }

  async fn exists(&self, table: &'static str, id: &str) -> Result<bool> {
    let id = id.to_owned();

    let found = self
      .conn
      .call(move |conn| {
        let sql = match table {
          "posts" => "SELECT 1 FROM posts WHERE id = ?1",
          _ => "SELECT 1 FROM comments WHERE id = ?1",
        };
        Ok(
          conn
            .query_row(sql, rusqlite::params![id], |_| Ok(true))
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;

    Ok(found)
  }
}

// ─── Store impl ──────────────────────────────────────────────────────────────

impl Store for SqliteStore {
  type Error = Error;

  async fn post_exists(&self, id: &str) -> Result<bool> {
    self.exists("posts", id).await
  }

  async fn comment_exists(&self, id: &str) -> Result<bool> {
    self.exists("comments", id).await
  }

  async fn save_post(&self, post: &Post) -> Result<bool> {
    let post = post.clone();
    // extracted_at is authoritative at the store boundary: stamped with the
    // local clock on every save, so a re-save refreshes it.
    let extracted_at = encode_dt(Utc::now());

    let result = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO posts (
             id, title, body, author, created_at, score, comment_count,
             upvote_ratio, url, community, flair, is_video, is_self,
             permalink, content_hint, extracted_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                     ?13, ?14, ?15, ?16)",
          rusqlite::params![
            post.id,
            post.title,
            post.body,
            post.author,
            post.created_at.map(encode_dt),
            post.score,
            post.comment_count,
            post.upvote_ratio,
            post.url,
            post.community,
            post.flair,
            post.is_video,
            post.is_self,
            post.permalink,
            post.content_hint,
            extracted_at,
          ],
        )?;
        Ok(())
      })
      .await;

    match result {
      Ok(()) => Ok(true),
      Err(e) if is_constraint_violation(&e) => {
        warn!(error = %e, "post rejected by constraint");
        Ok(false)
      }
      Err(e) => Err(e.into()),
    }
  }

  async fn save_comment(&self, comment: &Comment) -> Result<bool> {
    let comment = comment.clone();
    let extracted_at = encode_dt(Utc::now());

    let result = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO comments (
             id, post_id, parent_id, body, author, created_at, score,
             from_post_author, permalink, extracted_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            comment.id,
            comment.post_id,
            comment.parent_id,
            comment.body,
            comment.author,
            comment.created_at.map(encode_dt),
            comment.score,
            comment.from_post_author,
            comment.permalink,
            extracted_at,
          ],
        )?;
        Ok(())
      })
      .await;

    match result {
      Ok(()) => Ok(true),
      Err(e) if is_constraint_violation(&e) => {
        warn!(error = %e, "comment rejected by constraint");
        Ok(false)
      }
      Err(e) => Err(e.into()),
    }
  }

  async fn save_posts(&self, posts: &[Post]) -> Result<usize> {
    let mut saved = 0;
    for post in posts {
      match self.save_post(post).await {
        Ok(true) => saved += 1,
        Ok(false) => {}
        Err(e) => warn!(post_id = %post.id, error = %e, "failed to save post"),
      }
    }
    Ok(saved)
  }

  async fn save_comments(&self, comments: &[Comment]) -> Result<usize> {
    let mut saved = 0;
    for comment in comments {
      match self.save_comment(comment).await {
        Ok(true) => saved += 1,
        Ok(false) => {}
        Err(e) => {
          warn!(comment_id = %comment.id, error = %e, "failed to save comment")
        }
      }
    }
    Ok(saved)
  }

  async fn post_count(&self, community: &str) -> Result<u64> {
    let community = community.to_owned();

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM posts WHERE community = ?1",
          rusqlite::params![community],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(count as u64)
  }

  async fn comment_count(&self, community: &str) -> Result<u64> {
    let community = community.to_owned();

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*)
           FROM comments c
           JOIN posts p ON p.id = c.post_id
           WHERE p.community = ?1",
          rusqlite::params![community],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(count as u64)
  }

  async fn latest_post_created(
    &self,
    community: &str,
  ) -> Result<Option<DateTime<Utc>>> {
    let community = community.to_owned();

    // MAX over RFC 3339 text is chronological; see encode.rs.
    let latest: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT MAX(created_at) FROM posts WHERE community = ?1",
          rusqlite::params![community],
          |row| row.get(0),
        )?)
      })
      .await?;

    latest.as_deref().map(decode_dt).transpose()
  }

  async fn recent_post_ids(
    &self,
    community: &str,
    limit: u32,
  ) -> Result<Vec<String>> {
    let community = community.to_owned();

    let ids = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id FROM posts
           WHERE community = ?1
           ORDER BY created_at DESC
           LIMIT ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![community, limit], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(ids)
  }
}
