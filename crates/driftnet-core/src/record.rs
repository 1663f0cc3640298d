//! The two persisted record shapes: [`Post`] and [`Comment`].
//!
//! Records are built by a [`Source`](crate::source::Source) from upstream
//! data and never mutated in place afterwards — an upsert replaces every
//! field. Identifiers are assigned by the upstream source and immutable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single discussion post, fully normalized.
///
/// Only `id` and `title` are guaranteed by the upstream API; everything else
/// is best-effort and stored as fetched. `extracted_at` is stamped by the
/// store with the local clock each time the record is written, so a re-save
/// refreshes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
  /// Source-assigned identifier, globally unique. Primary key.
  pub id:            String,
  pub title:         String,
  /// Self-text body; `None` for link posts or empty bodies.
  pub body:          Option<String>,
  pub author:        Option<String>,
  /// Creation time according to the source's clock.
  pub created_at:    Option<DateTime<Utc>>,
  pub score:         Option<i64>,
  pub comment_count: Option<i64>,
  /// Fraction of votes that were upvotes, in `[0, 1]`.
  pub upvote_ratio:  Option<f64>,
  pub url:           Option<String>,
  /// The community this post was fetched from.
  pub community:     Option<String>,
  pub flair:         Option<String>,
  pub is_video:      Option<bool>,
  pub is_self:       Option<bool>,
  pub permalink:     Option<String>,
  /// Upstream's hint about the content type (e.g. `"image"`).
  pub content_hint:  Option<String>,
  pub extracted_at:  DateTime<Utc>,
}

/// A single comment, stored flat.
///
/// `parent_id` links the comment into its reply tree — it names either the
/// post itself (a top-level comment) or another comment (a reply) — but the
/// tree is never traversed here, only stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
  /// Source-assigned identifier, unique. Primary key.
  pub id:               String,
  /// The post this comment belongs to. A logical foreign key only: the
  /// referenced post need not exist locally.
  pub post_id:          String,
  pub parent_id:        Option<String>,
  pub body:             Option<String>,
  pub author:           Option<String>,
  pub created_at:       Option<DateTime<Utc>>,
  pub score:            Option<i64>,
  /// `true` if the comment author is the post author.
  pub from_post_author: Option<bool>,
  pub permalink:        Option<String>,
  pub extracted_at:     DateTime<Utc>,
}
