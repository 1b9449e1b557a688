use std::path::PathBuf;

use clap::{ArgGroup, Args, Subcommand};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Run the ADQL proxy (`POST /api/adql`) in front of the TAP service.
    Serve(ServeArgs),
    /// Print the region query that `query` would send.
    Adql(RegionArgs),
    /// Run a region query and replace the local collection with its objects.
    Query(QueryArgs),
    /// List objects in the local collection.
    List,
    /// Show one object with its measurements (default: the selected one).
    Show(ObjectArg),
    /// Select an object by id or position.
    Select(SelectArgs),
    /// Select the next object.
    Next,
    /// Select the previous object.
    Prev,
    /// Edit the selected object's annotations.
    Annotate(AnnotateArgs),
    /// Render the selected object's chart and keep it as its snapshot.
    Snapshot(ObjectArg),
    /// Write the selected object's chart as SVG.
    Render(RenderArgs),
    /// Export the collection with annotations as CSV.
    Export(ExportArgs),
    /// Print the JSON Schema of the local state slot.
    Schema,
}

#[derive(Clone, Debug, Args)]
pub struct ServeArgs {
    /// Listen port (overrides config and PORT).
    #[arg(long)]
    pub port: Option<u16>,

    /// Listen address (overrides config).
    #[arg(long)]
    pub host: Option<String>,
}

/// Cone search parameters; unset values come from the `query` config section.
#[derive(Clone, Debug, Default, Args)]
pub struct RegionArgs {
    /// Right ascension of the centre, degrees.
    #[arg(long, allow_negative_numbers = true)]
    pub ra: Option<f64>,

    /// Declination of the centre, degrees.
    #[arg(long, allow_negative_numbers = true)]
    pub dec: Option<f64>,

    /// Search radius, degrees.
    #[arg(long)]
    pub radius: Option<f64>,

    /// Maximum number of objects to keep.
    #[arg(long = "objects")]
    pub objects: Option<u32>,
}

#[derive(Clone, Debug, Args)]
pub struct QueryArgs {
    #[command(flatten)]
    pub region: RegionArgs,

    /// Send the query through a running proxy instead of the TAP service.
    #[arg(long)]
    pub proxy: Option<String>,
}

#[derive(Clone, Debug, Default, Args)]
pub struct ObjectArg {
    /// Object id (default: the selected object). Commands that change
    /// an object also select it.
    #[arg(long = "object")]
    pub object: Option<String>,
}

#[derive(Clone, Debug, Args)]
#[command(group(ArgGroup::new("target").required(true).args(["id", "index"])))]
pub struct SelectArgs {
    /// Object id.
    pub id: Option<String>,

    /// Zero-based position in the collection.
    #[arg(long)]
    pub index: Option<usize>,
}

#[derive(Clone, Debug, Args)]
#[command(group(ArgGroup::new("fields").required(true).multiple(true).args(["name", "category", "note"])))]
pub struct AnnotateArgs {
    #[command(flatten)]
    pub target: ObjectArg,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub note: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct RenderArgs {
    #[command(flatten)]
    pub target: ObjectArg,

    /// Output file; `-` writes to stdout.
    #[arg(short, long, default_value = "-")]
    pub output: PathBuf,
}

#[derive(Clone, Debug, Args)]
pub struct ExportArgs {
    /// Output file; `-` writes to stdout.
    #[arg(short, long, default_value = lc_core::export::DEFAULT_EXPORT_FILE)]
    pub output: PathBuf,
}
