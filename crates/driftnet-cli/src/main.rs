//! `driftnet` — periodic Reddit thread extractor.
//!
//! # Usage
//!
//! ```
//! driftnet extract                            # 25 top posts from today
//! driftnet extract --posts 50 --window week   # 50 posts from this week
//! driftnet extract --comments 20 --test       # capped comments, test db
//! driftnet continuous --interval-hours 6      # unattended, every 6 hours
//! driftnet stats                              # read-only snapshot
//! ```

mod config;

use std::{path::PathBuf, time::Duration};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing::{error, info, level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;

use driftnet_core::RankingWindow;
use driftnet_pipeline::Pipeline;
use driftnet_reddit::RedditSource;
use driftnet_store_sqlite::SqliteStore;

use crate::config::Config;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "driftnet", about = "Periodic Reddit thread extractor")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "driftnet.toml")]
  config: PathBuf,

  /// Community (subreddit) to extract from; overrides the config file.
  #[arg(long)]
  community: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Run a single extraction cycle.
  Extract {
    /// Number of posts to extract.
    #[arg(long, default_value_t = 25)]
    posts: u32,

    /// Ranking window: hour, day, week, month, year or all.
    #[arg(long, default_value = "day", value_parser = parse_window)]
    window: RankingWindow,

    /// Limit comments per post (default: no limit).
    #[arg(long)]
    comments: Option<u32>,

    /// Use the isolated test database instead of production.
    #[arg(long)]
    test: bool,
  },

  /// Run extraction repeatedly, sleeping a fixed interval between runs.
  Continuous {
    /// Hours between extraction runs.
    #[arg(long, default_value_t = 12)]
    interval_hours: u64,

    #[arg(long, default_value_t = 25)]
    posts: u32,

    #[arg(long, default_value = "day", value_parser = parse_window)]
    window: RankingWindow,

    #[arg(long)]
    comments: Option<u32>,

    /// Refused in continuous mode; the production database is always used.
    #[arg(long)]
    test: bool,
  },

  /// Show current store statistics.
  Stats {
    #[arg(long)]
    test: bool,
  },
}

fn parse_window(s: &str) -> Result<RankingWindow, driftnet_core::Error> {
  s.parse()
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Configuration failures exit non-zero before any pipeline work begins.
  let mut cfg = Config::load(&cli.config)?;
  if let Some(community) = cli.community {
    cfg.community = community;
  }

  match cli.command {
    Command::Extract { posts, window, comments, test } => {
      let pipeline = build_pipeline(&cfg, test).await?;
      run_single(&pipeline, posts, window, comments).await?;
    }

    Command::Continuous { interval_hours, posts, window, comments, test } => {
      if test {
        warn!("continuous mode does not use the test database; using production");
      }
      let pipeline = build_pipeline(&cfg, false).await?;
      run_continuous(&pipeline, interval_hours, posts, window, comments).await;
    }

    Command::Stats { test } => {
      let pipeline = build_pipeline(&cfg, test).await?;
      let stats = pipeline.stats().await?;

      println!("\nPipeline statistics for r/{}", stats.community);
      println!("{}", "=".repeat(50));
      println!("Total posts:    {}", stats.post_count);
      println!("Total comments: {}", stats.comment_count);
      match stats.latest_post_created {
        Some(ts) => println!("Latest post:    {}", ts.to_rfc3339()),
        None => println!("Latest post:    (none)"),
      }
      println!("{}", "=".repeat(50));
    }
  }

  Ok(())
}

// ─── Commands ─────────────────────────────────────────────────────────────────

async fn build_pipeline(
  cfg: &Config,
  use_test_db: bool,
) -> anyhow::Result<Pipeline<RedditSource, SqliteStore>> {
  let source = RedditSource::new(cfg.community.clone(), cfg.credentials())
    .context(
      "reddit credentials not configured; set DRIFTNET_CLIENT_ID and \
       DRIFTNET_CLIENT_SECRET (or the config file equivalents)",
    )?;

  let db_path = cfg.db_path(use_test_db);
  let store = SqliteStore::open(db_path)
    .await
    .with_context(|| format!("failed to open store at {}", db_path.display()))?;

  Ok(Pipeline::new(source, store))
}

async fn run_single(
  pipeline: &Pipeline<RedditSource, SqliteStore>,
  posts: u32,
  window: RankingWindow,
  comments: Option<u32>,
) -> anyhow::Result<()> {
  let stats = pipeline.stats().await?;
  info!(
    community = %stats.community,
    posts = stats.post_count,
    comments = stats.comment_count,
    "current store contents"
  );

  let run = pipeline
    .run_full_pipeline(posts, window, comments)
    .await
    .context("pipeline run failed")?;

  info!(
    duration_secs = run.duration.as_secs_f64(),
    posts_saved = run.posts.saved,
    posts_skipped = run.posts.skipped,
    comments_saved = run.comments.saved,
    comments_skipped = run.comments.skipped,
    total_data_points = run.total_data_points(),
    "extraction completed"
  );

  Ok(())
}

/// Loop forever: run, then sleep the interval. A failed run is logged and
/// retried after a full interval. Ctrl-C between runs exits cleanly.
async fn run_continuous(
  pipeline: &Pipeline<RedditSource, SqliteStore>,
  interval_hours: u64,
  posts: u32,
  window: RankingWindow,
  comments: Option<u32>,
) {
  info!(interval_hours, "starting continuous mode");
  let interval = Duration::from_secs(interval_hours * 3600);

  loop {
    if let Err(e) = run_single(pipeline, posts, window, comments).await {
      error!("extraction run failed: {e:#}");
    }

    info!(interval_hours, "sleeping until next extraction");
    tokio::select! {
      _ = tokio::time::sleep(interval) => {}
      _ = tokio::signal::ctrl_c() => {
        info!("interrupt received, stopping continuous mode");
        break;
      }
    }
  }
}
