//! # lc-config
//!
//! Layered configuration loading for Lightcurve Explorer using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`LIGHTCURVE_*` prefix, `__` as separator)
//! 2. Legacy proxy variables `TAP_URL`, `TAP_TOKEN`, `PORT`
//! 3. Project-level `.lightcurve/config.toml`
//! 4. User-level `~/.config/lightcurve/config.toml`
//! 5. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `LIGHTCURVE_TAP__URL` -> `tap.url`, `LIGHTCURVE_PROXY__PORT` ->
//! `proxy.port`, etc. The legacy names map onto `tap.url`, `tap.token`, and
//! `proxy.port`.
//!
//! # Usage
//!
//! ```no_run
//! use lc_config::LightcurveConfig;
//!
//! let config = LightcurveConfig::load_with_dotenv().expect("config");
//! println!("TAP endpoint: {}", config.tap.sync_url());
//! ```

mod error;
mod proxy;
mod query;
mod store;
mod tap;

pub use error::ConfigError;
pub use proxy::ProxyConfig;
pub use query::QueryConfig;
pub use store::{STATE_SLOT, StoreConfig};
pub use tap::{DEFAULT_TAP_URL, TapConfig};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Unprefixed variables read by earlier proxy deployments.
const LEGACY_ENV: &[(&str, &str)] = &[
    ("TAP_URL", "tap.url"),
    ("TAP_TOKEN", "tap.token"),
    ("PORT", "proxy.port"),
];

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LightcurveConfig {
    #[serde(default)]
    pub tap: TapConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub query: QueryConfig,
}

impl LightcurveConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if a source fails to parse or a value
    /// has the wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration after reading `.env` from the current directory.
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment or layer extra providers.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".lightcurve/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Legacy proxy variables
        figment = figment.merge(Self::legacy_env());

        // Layer 4: Prefixed environment variables (highest priority)
        figment.merge(Env::prefixed("LIGHTCURVE_").split("__"))
    }

    fn legacy_env() -> Env {
        Env::raw()
            .filter(|key| {
                LEGACY_ENV
                    .iter()
                    .any(|(name, _)| key.as_str().eq_ignore_ascii_case(name))
            })
            .map(|key| {
                LEGACY_ENV
                    .iter()
                    .find(|(name, _)| key.as_str().eq_ignore_ascii_case(name))
                    .map_or_else(|| key.into(), |(_, path)| (*path).into())
            })
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("lightcurve").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn default_config_loads() {
        let config = LightcurveConfig::default();
        assert_eq!(config.tap.url, DEFAULT_TAP_URL);
        assert_eq!(config.proxy.port, 3000);
        assert!(config.store.path.is_empty());
        assert_eq!(config.query.limit, 20);
    }

    #[test]
    fn figment_builds_without_files() {
        figment::Jail::expect_with(|_jail| {
            let config: LightcurveConfig = LightcurveConfig::figment().extract()?;
            assert_eq!(config.tap.timeout_secs, 120);
            assert_eq!(config.proxy.route, "/api/adql");
            Ok(())
        });
    }
}
