//! SQL schema for the Driftnet SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `user_version` pragma.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS posts (
    id            TEXT PRIMARY KEY,   -- source-assigned, immutable
    title         TEXT NOT NULL,
    body          TEXT,
    author        TEXT,
    created_at    TEXT,               -- ISO 8601 UTC; source clock
    score         INTEGER,
    comment_count INTEGER,
    upvote_ratio  REAL,               -- fraction in [0, 1]
    url           TEXT,
    community     TEXT,
    flair         TEXT,
    is_video      INTEGER,
    is_self       INTEGER,
    permalink     TEXT,
    content_hint  TEXT,
    extracted_at  TEXT NOT NULL       -- ISO 8601 UTC; store-assigned
);

-- post_id is a logical foreign key only: comments may be stored before or
-- without their post, so no REFERENCES clause.
CREATE TABLE IF NOT EXISTS comments (
    id               TEXT PRIMARY KEY,
    post_id          TEXT NOT NULL,
    parent_id        TEXT,            -- the post itself or another comment
    body             TEXT,
    author           TEXT,
    created_at       TEXT,
    score            INTEGER,
    from_post_author INTEGER,
    permalink        TEXT,
    extracted_at     TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS posts_community_idx  ON posts(community);
CREATE INDEX IF NOT EXISTS posts_created_idx    ON posts(created_at);
CREATE INDEX IF NOT EXISTS comments_post_idx    ON comments(post_id);

PRAGMA user_version = 1;
";
