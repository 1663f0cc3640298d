//! [`RedditSource`] — fetches ranked posts and flattened comment trees over
//! Reddit's application-only OAuth2 API.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use driftnet_core::{Comment, Post, RankingWindow, Source};

use crate::{
  Error, Result,
  wire::{Listing, RawComment, RawPost, flatten_comments},
};

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const API_BASE: &str = "https://oauth.reddit.com";

/// Refresh the bearer token this long before the server-reported expiry.
const TOKEN_SLACK: Duration = Duration::from_secs(60);

/// The three credential-like strings Reddit's app-only flow needs.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
  pub client_id:     String,
  pub client_secret: String,
  pub user_agent:    String,
}

impl Credentials {
  /// All three strings present. Checked before any fetch is attempted.
  pub fn is_configured(&self) -> bool {
    !self.client_id.is_empty()
      && !self.client_secret.is_empty()
      && !self.user_agent.is_empty()
  }
}

#[derive(Debug)]
struct BearerToken {
  token:      String,
  expires_at: Instant,
}

#[derive(Deserialize)]
struct TokenResponse {
  access_token: String,
  expires_in:   u64,
}

/// A [`Source`] scoped to one subreddit.
///
/// Read-only access: the client-credentials grant never acts on behalf of a
/// user. The bearer token is cached and refreshed shortly before expiry.
#[derive(Debug)]
pub struct RedditSource {
  http:        Client,
  credentials: Credentials,
  community:   String,
  token:       Mutex<Option<BearerToken>>,
}

impl RedditSource {
  /// Build a source for `community`. Fails with [`Error::NotConfigured`]
  /// when any credential string is missing.
  pub fn new(
    community: impl Into<String>,
    credentials: Credentials,
  ) -> Result<Self> {
    if !credentials.is_configured() {
      return Err(Error::NotConfigured);
    }

    let http = Client::builder()
      .user_agent(credentials.user_agent.clone())
      .timeout(Duration::from_secs(30))
      .build()?;

    Ok(Self {
      http,
      credentials,
      community: community.into(),
      token: Mutex::new(None),
    })
  }

  /// A valid bearer token, fetching or refreshing it when needed.
  async fn bearer(&self) -> Result<String> {
    let mut guard = self.token.lock().await;

    if let Some(cached) = guard.as_ref()
      && cached.expires_at > Instant::now()
    {
      return Ok(cached.token.clone());
    }

    debug!("requesting app-only access token");
    let resp = self
      .http
      .post(TOKEN_URL)
      .basic_auth(&self.credentials.client_id, Some(&self.credentials.client_secret))
      .form(&[("grant_type", "client_credentials")])
      .send()
      .await?;

    if !resp.status().is_success() {
      return Err(Error::Auth(resp.status()));
    }

    let token: TokenResponse = resp.json().await?;
    let expires_at = Instant::now()
      + Duration::from_secs(token.expires_in).saturating_sub(TOKEN_SLACK);

    *guard = Some(BearerToken {
      token: token.access_token.clone(),
      expires_at,
    });

    Ok(token.access_token)
  }
}

// ─── Source impl ─────────────────────────────────────────────────────────────

impl Source for RedditSource {
  type Error = Error;

  fn community(&self) -> &str { &self.community }

  async fn fetch_posts(
    &self,
    limit: u32,
    window: RankingWindow,
  ) -> Result<Vec<Post>> {
    let bearer = self.bearer().await?;
    let url = format!("{API_BASE}/r/{}/top", self.community);

    debug!(community = %self.community, limit, window = %window, "fetching top posts");
    let resp = self
      .http
      .get(&url)
      .bearer_auth(bearer)
      .query(&[
        ("t", window.as_str().to_owned()),
        ("limit", limit.to_string()),
        ("raw_json", "1".to_owned()),
      ])
      .send()
      .await?;

    if !resp.status().is_success() {
      return Err(Error::UpstreamStatus(resp.status()));
    }

    let listing: Listing<RawPost> = resp.json().await?;

    Ok(
      listing
        .data
        .children
        .into_iter()
        .filter(|thing| thing.kind == "t3")
        .map(|thing| thing.data.into_post(&self.community))
        .collect(),
    )
  }

  async fn fetch_comments(
    &self,
    post_id: &str,
    limit: Option<u32>,
  ) -> Result<Vec<Comment>> {
    let bearer = self.bearer().await?;
    let url = format!("{API_BASE}/comments/{post_id}");

    debug!(post_id, ?limit, "fetching comment tree");
    let resp = self
      .http
      .get(&url)
      .bearer_auth(bearer)
      .query(&[("raw_json", "1")])
      .send()
      .await?;

    if resp.status() == reqwest::StatusCode::NOT_FOUND {
      return Err(Error::PostNotFound(post_id.to_owned()));
    }
    if !resp.status().is_success() {
      return Err(Error::UpstreamStatus(resp.status()));
    }

    // The endpoint returns two listings: the post itself, then its comments.
    let (_, comment_listing): (serde_json::Value, Listing<RawComment>) =
      resp.json().await?;

    let mut comments = Vec::new();
    flatten_comments(comment_listing.data.children, post_id, limit, &mut comments);

    Ok(comments)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn credentials() -> Credentials {
    Credentials {
      client_id:     "id".to_owned(),
      client_secret: "secret".to_owned(),
      user_agent:    "driftnet test".to_owned(),
    }
  }

  #[test]
  fn is_configured_requires_all_three_strings() {
    assert!(credentials().is_configured());

    let wipes: [fn(&mut Credentials); 3] = [
      |c| c.client_id.clear(),
      |c| c.client_secret.clear(),
      |c| c.user_agent.clear(),
    ];
    for wipe in wipes {
      let mut c = credentials();
      wipe(&mut c);
      assert!(!c.is_configured());
    }
  }

  #[test]
  fn new_rejects_missing_credentials() {
    let err = RedditSource::new("rust", Credentials::default()).unwrap_err();
    assert!(matches!(err, Error::NotConfigured));
  }

  #[test]
  fn new_accepts_configured_credentials() {
    let source = RedditSource::new("rust", credentials()).unwrap();
    assert_eq!(source.community(), "rust");
  }
}
