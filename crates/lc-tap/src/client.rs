//! Synchronous TAP query client.
//!
//! Sends `REQUEST=doQuery&LANG=ADQL&FORMAT=json&QUERY=...` to `{base}/sync`
//! and classifies the reply body as JSON or plain text without judging the
//! status code. Callers decide whether a non-success reply is an error.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;

use lc_config::TapConfig;

use crate::error::TapError;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Body of a TAP reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyBody {
    Json(Value),
    Text(String),
}

/// A TAP reply: upstream status plus the classified body.
#[derive(Debug, Clone, PartialEq)]
pub struct TapReply {
    pub status: u16,
    pub body: ReplyBody,
}

impl TapReply {
    /// Classify a raw reply.
    ///
    /// The body is parsed as JSON when the content type says JSON or the text
    /// starts with `{`. Anything that fails to parse stays text.
    #[must_use]
    pub fn interpret(status: u16, content_type: &str, text: String) -> Self {
        let looks_json =
            content_type.contains("application/json") || text.trim_start().starts_with('{');

        let body = if looks_json {
            match serde_json::from_str(&text) {
                Ok(value) => ReplyBody::Json(value),
                Err(error) => {
                    tracing::debug!(%error, status, "reply claimed JSON but did not parse");
                    ReplyBody::Text(text)
                }
            }
        } else {
            ReplyBody::Text(text)
        };
        Self { status, body }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// The JSON payload of a successful reply.
    ///
    /// # Errors
    ///
    /// Returns [`TapError::Api`] for a non-success status and
    /// [`TapError::Parse`] for a text body.
    pub fn into_json(self) -> Result<Value, TapError> {
        match (self.is_success(), self.body) {
            (true, ReplyBody::Json(value)) => Ok(value),
            (true, ReplyBody::Text(text)) => Err(TapError::Parse(format!(
                "expected JSON result, got text: {}",
                preview(&text)
            ))),
            (false, ReplyBody::Json(value)) => Err(TapError::Api {
                status: self.status,
                message: value.to_string(),
            }),
            (false, ReplyBody::Text(text)) => Err(TapError::Api {
                status: self.status,
                message: text,
            }),
        }
    }
}

fn preview(text: &str) -> String {
    const MAX: usize = 200;
    let trimmed = text.trim();
    match trimmed.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}…", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

/// Build the form-encoded `doQuery` payload.
#[must_use]
pub fn sync_form(adql: &str) -> String {
    format!(
        "REQUEST=doQuery&LANG=ADQL&FORMAT=json&QUERY={}",
        urlencoding::encode(adql)
    )
}

/// Build the shared `reqwest` client, applying the configured timeout.
///
/// # Errors
///
/// Returns [`TapError::Http`] if the TLS backend fails to initialize.
pub fn http_client(config: &TapConfig) -> Result<reqwest::Client, TapError> {
    let mut builder = reqwest::Client::builder().user_agent(concat!(
        "lightcurve/",
        env!("CARGO_PKG_VERSION")
    ));
    if let Some(timeout) = config.timeout() {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

/// HTTP client for a TAP service's synchronous endpoint.
#[derive(Debug, Clone)]
pub struct TapClient {
    http: reqwest::Client,
    sync_url: String,
    token: Option<String>,
}

impl TapClient {
    /// Create a client for the configured service.
    ///
    /// # Errors
    ///
    /// Returns [`TapError::Http`] if the underlying client cannot be built.
    pub fn new(config: &TapConfig) -> Result<Self, TapError> {
        Ok(Self {
            http: http_client(config)?,
            sync_url: config.sync_url(),
            token: config.bearer_token().map(str::to_string),
        })
    }

    #[must_use]
    pub fn sync_url(&self) -> &str {
        &self.sync_url
    }

    /// Run one synchronous query and return the classified reply.
    ///
    /// # Errors
    ///
    /// Returns [`TapError::Http`] on transport failure or timeout. Upstream
    /// error statuses are not errors here; inspect [`TapReply::status`].
    pub async fn sync_query(&self, adql: &str) -> Result<TapReply, TapError> {
        let mut request = self
            .http
            .post(&self.sync_url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(sync_form(adql));
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        tracing::debug!(url = %self.sync_url, query_len = adql.len(), "sending TAP sync query");
        let resp = request.send().await?;

        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let text = resp.text().await?;

        tracing::debug!(status, bytes = text.len(), %content_type, "TAP sync reply");
        Ok(TapReply::interpret(status, &content_type, text))
    }
}
