use anyhow::Context;
use lc_config::LightcurveConfig;

use crate::cli::commands::ServeArgs;

/// Handle `lce serve`.
pub async fn handle(args: &ServeArgs, mut config: LightcurveConfig) -> anyhow::Result<()> {
    if let Some(port) = args.port {
        config.proxy.port = port;
    }
    if let Some(host) = &args.host {
        config.proxy.host.clone_from(host);
    }
    if config.tap.bearer_token().is_none() {
        tracing::info!("no TAP token configured; forwarding queries anonymously");
    }

    lc_tap::proxy::serve(&config)
        .await
        .with_context(|| format!("proxy on {} failed", config.proxy.bind_address()))
}
