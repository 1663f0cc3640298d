//! Wire types mirroring Reddit's listing envelope, plus the conversion into
//! core records.
//!
//! Conversion is where normalization happens: text is trimmed and stripped
//! of embedded NUL bytes, empty or absent text becomes `None`, and
//! epoch-seconds timestamps become UTC instants.

use chrono::{DateTime, Utc};
use driftnet_core::{Comment, Post};
use serde::Deserialize;

// ─── Listing envelope ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct Listing<T> {
  pub data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
pub struct ListingData<T> {
  #[serde(default = "Vec::new")]
  pub children: Vec<Thing<T>>,
}

/// One `{kind, data}` node. Posts are kind `t3`, comments `t1`; unresolved
/// "load more" placeholders are kind `more` and carry a different payload,
/// which is why the raw record types default every field.
#[derive(Debug, Deserialize)]
pub struct Thing<T> {
  pub kind: String,
  pub data: T,
}

// ─── Raw records ─────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawPost {
  pub id:              String,
  pub title:           String,
  pub selftext:        Option<String>,
  pub author:          Option<String>,
  pub created_utc:     Option<f64>,
  pub score:           Option<i64>,
  pub num_comments:    Option<i64>,
  pub upvote_ratio:    Option<f64>,
  pub url:             Option<String>,
  pub subreddit:       Option<String>,
  pub link_flair_text: Option<String>,
  pub is_video:        Option<bool>,
  pub is_self:         Option<bool>,
  pub permalink:       Option<String>,
  pub post_hint:       Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawComment {
  pub id:           String,
  pub parent_id:    Option<String>,
  pub body:         Option<String>,
  pub author:       Option<String>,
  pub created_utc:  Option<f64>,
  pub score:        Option<i64>,
  pub is_submitter: Option<bool>,
  pub permalink:    Option<String>,
  pub replies:      Replies,
}

/// The `replies` field is a nested listing when the comment has replies and
/// the empty string when it does not.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Replies {
  Listing(Box<Listing<RawComment>>),
  Empty(String),
}

impl Default for Replies {
  fn default() -> Self { Self::Empty(String::new()) }
}

// ─── Normalization ───────────────────────────────────────────────────────────

/// Trim, strip embedded NULs, and map empty text to `None`.
fn clean(text: Option<String>) -> Option<String> {
  let cleaned = text?.replace('\0', "").trim().to_owned();
  if cleaned.is_empty() { None } else { Some(cleaned) }
}

/// Epoch seconds (source clock) to a UTC instant.
fn epoch_to_utc(secs: Option<f64>) -> Option<DateTime<Utc>> {
  DateTime::from_timestamp(secs? as i64, 0)
}

// ─── Conversions ─────────────────────────────────────────────────────────────

impl RawPost {
  pub fn into_post(self, community: &str) -> Post {
    Post {
      title:         clean(Some(self.title)).unwrap_or_default(),
      body:          clean(self.selftext),
      author:        clean(self.author),
      created_at:    epoch_to_utc(self.created_utc),
      score:         self.score,
      comment_count: self.num_comments,
      upvote_ratio:  self.upvote_ratio,
      url:           clean(self.url),
      community:     clean(self.subreddit)
        .or_else(|| Some(community.to_owned())),
      flair:         clean(self.link_flair_text),
      is_video:      self.is_video,
      is_self:       self.is_self,
      permalink:     clean(self.permalink),
      content_hint:  clean(self.post_hint),
      id:            self.id,
      extracted_at:  Utc::now(),
    }
  }
}

impl RawComment {
  fn into_comment(self, post_id: &str) -> (Comment, Replies) {
    let comment = Comment {
      id:               self.id,
      post_id:          post_id.to_owned(),
      parent_id:        clean(self.parent_id),
      body:             clean(self.body),
      author:           clean(self.author),
      created_at:       epoch_to_utc(self.created_utc),
      score:            self.score,
      from_post_author: self.is_submitter,
      permalink:        clean(self.permalink),
      extracted_at:     Utc::now(),
    };
    (comment, self.replies)
  }
}

/// Flatten a comment forest depth-first into `out`, retaining `parent_id`
/// linkage. `more` placeholder nodes are dropped, matching the behaviour of
/// resolving no additional pages. Stops once `limit` comments are collected.
pub fn flatten_comments(
  children: Vec<Thing<RawComment>>,
  post_id: &str,
  limit: Option<u32>,
  out: &mut Vec<Comment>,
) {
  for thing in children {
    if let Some(limit) = limit
      && out.len() >= limit as usize
    {
      return;
    }
    if thing.kind != "t1" {
      continue;
    }

    let (comment, replies) = thing.data.into_comment(post_id);
    out.push(comment);

    if let Replies::Listing(listing) = replies {
      flatten_comments(listing.data.children, post_id, limit, out);
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
