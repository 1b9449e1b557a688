use std::path::PathBuf;

use lc_explorer::Explorer;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::commands::{ObjectArg, RenderArgs};
use crate::commands::{is_stdout, target, write_file};
use crate::output::output;

#[derive(Debug, Serialize)]
struct SnapshotReport {
    #[serde(rename = "objectId")]
    object_id: String,
    bytes: usize,
}

#[derive(Debug, Serialize)]
struct RenderReport {
    #[serde(rename = "objectId")]
    object_id: String,
    path: PathBuf,
    bytes: usize,
}

/// Handle `lce snapshot`.
pub fn handle_snapshot(
    args: &ObjectArg,
    explorer: &mut Explorer,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    target(explorer, args.object.as_deref())?;
    let image = explorer.capture_snapshot()?;
    output(
        &SnapshotReport {
            object_id: explorer.current()?.id.clone(),
            bytes: image.len(),
        },
        flags.format,
    )
}

/// Handle `lce render`. SVG goes to stdout unless `--output` names a file.
pub fn handle_render(
    args: &RenderArgs,
    explorer: &mut Explorer,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    target(explorer, args.target.object.as_deref())?;
    let svg = explorer.render_current()?;

    if is_stdout(&args.output) {
        println!("{svg}");
        return Ok(());
    }

    write_file(&args.output, &svg)?;
    output(
        &RenderReport {
            object_id: explorer.current()?.id.clone(),
            path: args.output.clone(),
            bytes: svg.len(),
        },
        flags.format,
    )
}
