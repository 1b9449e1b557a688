use std::path::PathBuf;

use lc_explorer::Explorer;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::commands::ExportArgs;
use crate::commands::{is_stdout, write_file};
use crate::output::output;

#[derive(Debug, Serialize)]
struct ExportReport {
    path: PathBuf,
    objects: usize,
}

/// Handle `lce export`.
pub fn handle(args: &ExportArgs, explorer: &Explorer, flags: &GlobalFlags) -> anyhow::Result<()> {
    let csv = explorer.export_csv()?;

    if is_stdout(&args.output) {
        print!("{csv}");
        return Ok(());
    }

    write_file(&args.output, &csv)?;
    tracing::info!(path = %args.output.display(), "exported collection");
    output(
        &ExportReport {
            path: args.output.clone(),
            objects: explorer.state().objects().len(),
        },
        flags.format,
    )
}
