//! Local state slot configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Name of the single persisted slot.
pub const STATE_SLOT: &str = "rle_annotations_v1";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Explicit state file path. Empty means `<data_dir>/lightcurve/<slot>.json`.
    #[serde(default)]
    pub path: String,
}

impl StoreConfig {
    /// Resolve the state file location.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoDataDir`] when no path is configured and the
    /// platform has no data directory.
    pub fn resolve_path(&self) -> Result<PathBuf, ConfigError> {
        if !self.path.trim().is_empty() {
            return Ok(PathBuf::from(self.path.trim()));
        }
        dirs::data_dir()
            .map(|dir| dir.join("lightcurve").join(format!("{STATE_SLOT}.json")))
            .ok_or(ConfigError::NoDataDir)
    }
}
