//! HTTP client for the external bot endpoint.
//!
//! One GET per user message: `BOT_API_URL?m=<user text>`. Two response
//! policies implement the same [`BotApi`] trait; which one a deployment uses
//! is fixed at construction time.

use std::time::Duration;

use async_trait::async_trait;

pub mod error;

pub use error::{Error, Result};

// ── Constants ────────────────────────────────────────────────────────────────

/// Total time allowed for one outbound call, connect through body.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(45);

/// How much of an error response body is kept for the error message.
pub const ERROR_BODY_PREVIEW_CHARS: usize = 300;

// ── Trait ────────────────────────────────────────────────────────────────────

/// A single-question client for the bot endpoint.
#[async_trait]
pub trait BotApi: Send + Sync {
    /// Forward one user message and return the bot's reply text.
    async fn ask(&self, user_text: &str) -> Result<String>;
}

fn http_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?)
}

// ── Structured variant ───────────────────────────────────────────────────────

/// Treats the endpoint as a chat-completion style API: error statuses fail
/// the call, success bodies are JSON holding `choices[0].message.content`.
pub struct StructuredBotApi {
    http: reqwest::Client,
    base_url: String,
}

impl StructuredBotApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            http: http_client()?,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl BotApi for StructuredBotApi {
    async fn ask(&self, user_text: &str) -> Result<String> {
        let resp = self
            .http
            .get(&self.base_url)
            .query(&[("m", user_text)])
            .send()
            .await?;

        let status = resp.status();
        if status.as_u16() >= 400 {
            let body = resp.text().await?;
            return Err(Error::Status {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_PREVIEW_CHARS).collect(),
            });
        }

        let value: serde_json::Value = resp.json().await?;
        Ok(extract_reply(&value))
    }
}

/// Pull the reply out of a chat-completion response.
///
/// A merely absent key along `choices[0].message.content` yields an empty
/// string; a shape mismatch (non-array `choices`, empty array, non-object
/// element, non-string `content`) falls back to the whole response serialized,
/// so the client at least sees what the endpoint said.
fn extract_reply(value: &serde_json::Value) -> String {
    let Some(choices) = value.get("choices") else {
        return String::new();
    };
    let Some(list) = choices.as_array() else {
        return value.to_string();
    };
    let Some(first) = list.first() else {
        return value.to_string();
    };
    if !first.is_object() {
        return value.to_string();
    }
    let Some(message) = first.get("message") else {
        return String::new();
    };
    if !message.is_object() {
        return value.to_string();
    }
    match message.get("content") {
        None => String::new(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(_) => value.to_string(),
    }
}

// ── Raw-passthrough variant ──────────────────────────────────────────────────

/// Opaque relay: returns the response body verbatim for any status code.
/// Upstream failures are indistinguishable from replies here; see DESIGN.md.
pub struct RawBotApi {
    http: reqwest::Client,
    base_url: String,
}

impl RawBotApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            http: http_client()?,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl BotApi for RawBotApi {
    async fn ask(&self, user_text: &str) -> Result<String> {
        let resp = self
            .http
            .get(&self.base_url)
            .query(&[("m", user_text)])
            .send()
            .await?;
        Ok(resp.text().await?)
    }
}
