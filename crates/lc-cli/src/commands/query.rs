use anyhow::Context;
use lc_config::LightcurveConfig;
use lc_core::{QueryParameters, ResponseShape};
use lc_core::adql::build_region_query;
use lc_explorer::{Explorer, ExplorerOptions, QueryOutcome};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::commands::{QueryArgs, RegionArgs};
use crate::commands::browse::ObjectSummary;
use crate::output::output;

#[derive(Debug, Serialize)]
struct AdqlReport {
    table: String,
    adql: String,
}

#[derive(Debug, Serialize)]
struct QueryReport {
    endpoint: String,
    #[serde(flatten)]
    outcome: QueryOutcome,
    objects_loaded: Vec<ObjectSummary>,
}

/// Region parameters: command-line values over the `query` config section.
fn region(args: &RegionArgs, config: &LightcurveConfig) -> anyhow::Result<QueryParameters> {
    let defaults = &config.query;
    let params = QueryParameters {
        ra: args.ra.unwrap_or(defaults.ra),
        dec: args.dec.unwrap_or(defaults.dec),
        radius_deg: args.radius.unwrap_or(defaults.radius_deg),
        object_limit: args.objects.unwrap_or(defaults.limit),
    };
    params.validate().context("invalid region")?;
    Ok(params)
}

/// Handle `lce adql`.
pub fn handle_adql(
    args: &RegionArgs,
    config: &LightcurveConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    output(&adql_report(args, config)?, flags.format)
}

/// The query `lce query` would send, with the same table fallback.
fn adql_report(args: &RegionArgs, config: &LightcurveConfig) -> anyhow::Result<AdqlReport> {
    let params = region(args, config)?;
    let table = ExplorerOptions::from_tap(&config.tap).table;
    Ok(AdqlReport {
        adql: build_region_query(&params, &table),
        table,
    })
}

/// Handle `lce query`. Ctrl+C cancels the running query.
pub async fn handle_query(
    args: &QueryArgs,
    mut config: LightcurveConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let params = region(&args.region, &config)?;
    if let Some(proxy) = &args.proxy {
        config.query.proxy_url.clone_from(proxy);
    }

    let mut explorer = Explorer::from_config(&config).context("failed to open local state")?;
    let endpoint = explorer.gateway().endpoint().to_string();
    explorer.start_query(&params)?;

    let finished = tokio::select! {
        result = explorer.finish_query() => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };
    let Some(result) = finished else {
        let ticket = explorer.cancel_query()?;
        anyhow::bail!("query {ticket} cancelled");
    };
    let outcome = result.with_context(|| format!("region query via {endpoint} failed"))?;

    if outcome.shape == ResponseShape::Unrecognized {
        tracing::warn!("response did not look like a TAP result; collection is now empty");
    }

    let objects_loaded = ObjectSummary::list(&explorer);
    output(
        &QueryReport {
            endpoint,
            outcome,
            objects_loaded,
        },
        flags.format,
    )
}
