use std::fs;
use std::path::Path;

use anyhow::Context;
use lc_config::LightcurveConfig;
use lc_explorer::Explorer;

use crate::cli::{Commands, GlobalFlags};

pub mod annotate;
pub mod browse;
pub mod chart;
pub mod export;
pub mod query;
pub mod schema;
pub mod serve;

/// Route a parsed command to its handler.
pub async fn dispatch(
    command: Commands,
    config: LightcurveConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Serve(args) => serve::handle(&args, config).await,
        Commands::Adql(args) => query::handle_adql(&args, &config, flags),
        Commands::Query(args) => query::handle_query(&args, config, flags).await,
        Commands::List => browse::handle_list(&open(&config)?, flags),
        Commands::Show(args) => browse::handle_show(&args, &open(&config)?, flags),
        Commands::Select(args) => browse::handle_select(&args, &mut open(&config)?, flags),
        Commands::Next => browse::handle_step(1, &mut open(&config)?, flags),
        Commands::Prev => browse::handle_step(-1, &mut open(&config)?, flags),
        Commands::Annotate(args) => annotate::handle(args, &mut open(&config)?, flags),
        Commands::Snapshot(args) => chart::handle_snapshot(&args, &mut open(&config)?, flags),
        Commands::Render(args) => chart::handle_render(&args, &mut open(&config)?, flags),
        Commands::Export(args) => export::handle(&args, &open(&config)?, flags),
        Commands::Schema => schema::handle(flags),
    }
}

fn open(config: &LightcurveConfig) -> anyhow::Result<Explorer> {
    Explorer::from_config(config).context("failed to open local state")
}

/// Select `object` first when given, so commands can target any object.
fn target(explorer: &mut Explorer, object: Option<&str>) -> anyhow::Result<()> {
    if let Some(id) = object {
        explorer.select_id(id)?;
    }
    Ok(())
}

/// Whether `path` means standard output.
fn is_stdout(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn write_file(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}
