use anyhow::Context;
use lc_config::LightcurveConfig;

use crate::cli::GlobalFlags;

/// Load `.env` and the layered config, then apply global flag overrides.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<LightcurveConfig> {
    let mut config =
        LightcurveConfig::load_with_dotenv().context("failed to load lightcurve configuration")?;

    if let Some(state) = &flags.state {
        config.store.path = state.to_string_lossy().into_owned();
    }
    Ok(config)
}
