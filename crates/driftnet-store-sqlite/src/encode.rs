//! Encoding and decoding helpers between Rust record types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings in UTC, which makes their
//! lexicographic order chronological — `MAX(created_at)` and
//! `ORDER BY created_at DESC` rely on this.

use chrono::{DateTime, Utc};
use driftnet_core::{Comment, Post};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `posts` row.
pub struct RawPost {
  pub id:            String,
  pub title:         String,
  pub body:          Option<String>,
  pub author:        Option<String>,
  pub created_at:    Option<String>,
  pub score:         Option<i64>,
  pub comment_count: Option<i64>,
  pub upvote_ratio:  Option<f64>,
  pub url:           Option<String>,
  pub community:     Option<String>,
  pub flair:         Option<String>,
  pub is_video:      Option<bool>,
  pub is_self:       Option<bool>,
  pub permalink:     Option<String>,
  pub content_hint:  Option<String>,
  pub extracted_at:  String,
}

impl RawPost {
  pub fn into_post(self) -> Result<Post> {
    Ok(Post {
      id:            self.id,
      title:         self.title,
      body:          self.body,
      author:        self.author,
      created_at:    self.created_at.as_deref().map(decode_dt).transpose()?,
      score:         self.score,
      comment_count: self.comment_count,
      upvote_ratio:  self.upvote_ratio,
      url:           self.url,
      community:     self.community,
      flair:         self.flair,
      is_video:      self.is_video,
      is_self:       self.is_self,
      permalink:     self.permalink,
      content_hint:  self.content_hint,
      extracted_at:  decode_dt(&self.extracted_at)?,
    })
  }
}

/// Raw values read directly from a `comments` row.
pub struct RawComment {
  pub id:               String,
  pub post_id:          String,
  pub parent_id:        Option<String>,
  pub body:             Option<String>,
  pub author:           Option<String>,
  pub created_at:       Option<String>,
  pub score:            Option<i64>,
  pub from_post_author: Option<bool>,
  pub permalink:        Option<String>,
  pub extracted_at:     String,
}

impl RawComment {
  pub fn into_comment(self) -> Result<Comment> {
    Ok(Comment {
      id:               self.id,
      post_id:          self.post_id,
      parent_id:        self.parent_id,
      body:             self.body,
      author:           self.author,
      created_at:       self.created_at.as_deref().map(decode_dt).transpose()?,
      score:            self.score,
      from_post_author: self.from_post_author,
      permalink:        self.permalink,
      extracted_at:     decode_dt(&self.extracted_at)?,
    })
  }
}
