//! Upstream TAP service configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Public Rubin Science Platform TAP endpoint.
pub const DEFAULT_TAP_URL: &str = "https://data.lsst.cloud/api/tap";

fn default_url() -> String {
    DEFAULT_TAP_URL.to_string()
}

fn default_table() -> String {
    lc_core::adql::DEFAULT_TABLE.to_string()
}

/// Default outbound request timeout in seconds.
const fn default_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TapConfig {
    /// TAP service base URL; `/sync` is appended.
    #[serde(default = "default_url")]
    pub url: String,

    /// Optional bearer token sent as `Authorization: Bearer <token>`.
    #[serde(default)]
    pub token: String,

    /// Table queried by the region builder.
    #[serde(default = "default_table")]
    pub table: String,

    /// Outbound request timeout, in seconds. `0` disables the timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TapConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            token: String::new(),
            table: default_table(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl TapConfig {
    /// Synchronous query endpoint, `{url}/sync` without a doubled slash.
    #[must_use]
    pub fn sync_url(&self) -> String {
        format!("{}/sync", self.url.trim_end_matches('/'))
    }

    #[must_use]
    pub fn bearer_token(&self) -> Option<&str> {
        let token = self.token.trim();
        (!token.is_empty()).then_some(token)
    }

    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        if self.timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.timeout_secs))
        }
    }
}
