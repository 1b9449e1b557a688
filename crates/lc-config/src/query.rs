//! Defaults for region queries issued by the explorer.

use lc_core::QueryParameters;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const fn default_ra() -> f64 {
    150.0
}

const fn default_dec() -> f64 {
    2.0
}

const fn default_radius_deg() -> f64 {
    0.2
}

const fn default_limit() -> u32 {
    20
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryConfig {
    #[serde(default = "default_ra")]
    pub ra: f64,

    #[serde(default = "default_dec")]
    pub dec: f64,

    #[serde(default = "default_radius_deg")]
    pub radius_deg: f64,

    /// Maximum number of objects kept from one query.
    #[serde(default = "default_limit")]
    pub limit: u32,

    /// Route queries through a running proxy (e.g. `http://localhost:3000/api/adql`)
    /// instead of calling the TAP service directly.
    #[serde(default)]
    pub proxy_url: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            ra: default_ra(),
            dec: default_dec(),
            radius_deg: default_radius_deg(),
            limit: default_limit(),
            proxy_url: String::new(),
        }
    }
}

impl QueryConfig {
    /// Default region parameters, validated.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the configured region is not
    /// a valid cone search.
    pub fn parameters(&self) -> Result<QueryParameters, ConfigError> {
        let params = QueryParameters {
            ra: self.ra,
            dec: self.dec,
            radius_deg: self.radius_deg,
            object_limit: self.limit,
        };
        params
            .validate()
            .map_err(|error| ConfigError::InvalidValue {
                field: "query".into(),
                reason: error.to_string(),
            })?;
        Ok(params)
    }

    #[must_use]
    pub fn proxy_url(&self) -> Option<&str> {
        let url = self.proxy_url.trim();
        (!url.is_empty()).then_some(url)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_are_the_initial_form_values() {
        let params = QueryConfig::default().parameters().unwrap();
        assert_eq!(params, QueryParameters::default());
        assert!(QueryConfig::default().proxy_url().is_none());
    }

    #[test]
    fn invalid_region_is_reported() {
        let config = QueryConfig {
            radius_deg: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            config.parameters(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
