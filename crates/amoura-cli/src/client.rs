//! Async HTTP client wrapping the Amoura JSON API.

use std::time::Duration;

use amoura_core::{
  matching::{FeedEntry, Match},
  message::Message,
  service::SwipeOutcome,
  swipe::Direction,
  user::User,
};
use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use uuid::Uuid;

/// Connection settings for the Amoura API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub email:    String,
  pub password: String,
}

/// Async HTTP client for the Amoura JSON REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    if self.config.email.is_empty() {
      req
    } else {
      req.basic_auth(&self.config.email, Some(&self.config.password))
    }
  }

  /// Send `req`, turning a non-2xx status into an error carrying the
  /// server's `message`.
  async fn execute<T: DeserializeOwned>(&self, what: &str, req: RequestBuilder) -> Result<T> {
    tracing::debug!(request = what, "sending");
    let resp = req.send().await.with_context(|| format!("{what} failed"))?;
    let resp = check(what, resp).await?;
    resp.json().await.with_context(|| format!("deserialising {what} response"))
  }

  // ── Users ─────────────────────────────────────────────────────────────────

  /// `POST /api/users` with the configured e-mail and password.
  pub async fn register(&self, display_name: &str) -> Result<User> {
    let body = json!({
      "email":       self.config.email,
      "displayName": display_name,
      "password":    self.config.password,
    });
    self
      .execute("POST /users", self.client.post(self.url("/users")).json(&body))
      .await
  }

  /// `GET /api/users/me`
  pub async fn me(&self) -> Result<User> {
    self
      .execute("GET /users/me", self.auth(self.client.get(self.url("/users/me"))))
      .await
  }

  // ── Swipes ────────────────────────────────────────────────────────────────

  /// `POST /api/swipes`
  pub async fn swipe(&self, to_user: Uuid, direction: Direction) -> Result<SwipeOutcome> {
    let body = json!({ "toUser": to_user, "direction": direction });
    self
      .execute("POST /swipes", self.auth(self.client.post(self.url("/swipes"))).json(&body))
      .await
  }

  // ── Matches ───────────────────────────────────────────────────────────────

  /// `GET /api/matches`
  pub async fn matches(&self) -> Result<Vec<FeedEntry>> {
    self
      .execute("GET /matches", self.auth(self.client.get(self.url("/matches"))))
      .await
  }

  /// `POST /api/matches/{id}/deactivate`
  pub async fn deactivate(&self, match_id: Uuid) -> Result<Match> {
    let url = self.url(&format!("/matches/{match_id}/deactivate"));
    self
      .execute("POST /matches/{id}/deactivate", self.auth(self.client.post(url)))
      .await
  }

  // ── Messages ──────────────────────────────────────────────────────────────

  /// `POST /api/messages/{match_id}`
  pub async fn send_message(&self, match_id: Uuid, text: &str) -> Result<Message> {
    let url = self.url(&format!("/messages/{match_id}"));
    self
      .execute(
        "POST /messages/{id}",
        self.auth(self.client.post(url)).json(&json!({ "text": text })),
      )
      .await
  }

  /// `GET /api/messages/{match_id}[?since=...]`
  pub async fn messages(
    &self,
    match_id: Uuid,
    since: Option<DateTime<Utc>>,
  ) -> Result<Vec<Message>> {
    let mut req = self.auth(self.client.get(self.url(&format!("/messages/{match_id}"))));
    if let Some(since) = since {
      req = req.query(&[("since", since.to_rfc3339())]);
    }
    self.execute("GET /messages/{id}", req).await
  }
}

async fn check(what: &str, resp: Response) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let body: serde_json::Value = resp.json().await.unwrap_or_default();
  match body.get("message").and_then(|m| m.as_str()) {
    Some(message) => Err(anyhow!("{what} → {status}: {message}")),
    None => Err(anyhow!("{what} → {status}")),
  }
}
