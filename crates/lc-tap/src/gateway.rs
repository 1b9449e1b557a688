//! Query gateways: where the explorer sends an ADQL string to get rows back.
//!
//! The explorer either talks to the TAP service itself ([`TapClient`]) or
//! posts `{"adql": ...}` to a running proxy ([`ProxyClient`]). Both resolve
//! to the raw JSON payload; shaping it into rows is the caller's job.

use std::future::Future;

use reqwest::header::CONTENT_TYPE;
use serde_json::{Value, json};

use lc_config::{LightcurveConfig, TapConfig};

use crate::client::{ReplyBody, TapClient, TapReply, http_client};
use crate::error::TapError;

/// Something that can answer an ADQL query with a JSON payload.
pub trait QueryGateway: Send + Sync + 'static {
    /// Run `adql` and return the JSON result.
    ///
    /// Non-success replies and non-JSON bodies are errors.
    fn run(&self, adql: &str) -> impl Future<Output = Result<Value, TapError>> + Send;
}

impl QueryGateway for TapClient {
    async fn run(&self, adql: &str) -> Result<Value, TapError> {
        self.sync_query(adql).await?.into_json()
    }
}

/// Client for the `/api/adql` proxy route.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    http: reqwest::Client,
    url: String,
}

impl ProxyClient {
    /// Create a client posting to `url`.
    ///
    /// # Errors
    ///
    /// Returns [`TapError::Http`] if the underlying client cannot be built.
    pub fn new(url: impl Into<String>, tap: &TapConfig) -> Result<Self, TapError> {
        Ok(Self {
            http: http_client(tap)?,
            url: url.into(),
        })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl QueryGateway for ProxyClient {
    async fn run(&self, adql: &str) -> Result<Value, TapError> {
        tracing::debug!(url = %self.url, "posting query to proxy");
        let resp = self
            .http
            .post(&self.url)
            .json(&json!({ "adql": adql }))
            .send()
            .await?;

        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let text = resp.text().await?;

        let reply = TapReply::interpret(status, &content_type, text);
        if !reply.is_success()
            && let ReplyBody::Json(Value::Object(map)) = &reply.body
            && let Some(Value::String(message)) = map.get("error")
        {
            return Err(TapError::Api {
                status,
                message: message.clone(),
            });
        }
        reply.into_json()
    }
}

/// Gateway selected from configuration.
#[derive(Debug, Clone)]
pub enum Gateway {
    Direct(TapClient),
    Proxy(ProxyClient),
}

impl Gateway {
    /// Use the proxy when `query.proxy_url` is set, otherwise call TAP directly.
    ///
    /// # Errors
    ///
    /// Returns [`TapError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &LightcurveConfig) -> Result<Self, TapError> {
        match config.query.proxy_url() {
            Some(url) => Ok(Self::Proxy(ProxyClient::new(url, &config.tap)?)),
            None => Ok(Self::Direct(TapClient::new(&config.tap)?)),
        }
    }

    /// Where queries go, for display.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        match self {
            Self::Direct(client) => client.sync_url(),
            Self::Proxy(client) => client.url(),
        }
    }
}

impl QueryGateway for Gateway {
    async fn run(&self, adql: &str) -> Result<Value, TapError> {
        match self {
            Self::Direct(client) => client.run(adql).await,
            Self::Proxy(client) => client.run(adql).await,
        }
    }
}
