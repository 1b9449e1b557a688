use lc_core::AnnotationUpdate;
use lc_explorer::Explorer;

use crate::cli::GlobalFlags;
use crate::cli::commands::AnnotateArgs;
use crate::commands::browse::ObjectSummary;
use crate::commands::target;
use crate::output::output;

/// Handle `lce annotate`. Only the given fields change.
pub fn handle(args: AnnotateArgs, explorer: &mut Explorer, flags: &GlobalFlags) -> anyhow::Result<()> {
    target(explorer, args.target.object.as_deref())?;
    explorer.annotate(AnnotationUpdate {
        name: args.name,
        category: args.category,
        note: args.note,
    })?;
    output(&ObjectSummary::selected(explorer)?, flags.format)
}
