//! # lc-chart
//!
//! Renders one object's light curve: magnitude against MJD on an 800×320
//! plot, polyline plus point markers, axis lines and labels.
//!
//! Rendering targets the [`Surface`] trait. [`SvgSurface`] produces an SVG
//! document (what snapshots and `lce render` use) and [`RecordingSurface`]
//! keeps the draw calls for inspection.

mod recording;
mod render;
mod surface;
mod svg;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use lc_core::Measurement;

pub use recording::{DrawCommand, RecordingSurface};
pub use render::{
    AXIS_COLOR, EMPTY_COLOR, EMPTY_LABEL, HEIGHT, LABEL_COLOR, MAGNITUDE_LABEL, MARGIN,
    POINT_RADIUS, SERIES_COLOR, TIME_LABEL, WIDTH, render_lightcurve,
};
pub use surface::{Point, Surface};
pub use svg::SvgSurface;

/// Prefix of every snapshot produced by [`snapshot_data_url`].
pub const SNAPSHOT_PREFIX: &str = "data:image/svg+xml;base64,";

/// Render `measurements` to a standalone SVG document at the default size.
#[must_use]
pub fn render_svg(measurements: &[Measurement]) -> String {
    let mut surface = SvgSurface::default();
    render_lightcurve(&mut surface, measurements);
    surface.to_svg_string()
}

/// Render `measurements` and encode the SVG as a base64 data URL.
#[must_use]
pub fn snapshot_data_url(measurements: &[Measurement]) -> String {
    let svg = render_svg(measurements);
    format!("{SNAPSHOT_PREFIX}{}", STANDARD.encode(svg.as_bytes()))
}

/// Recover the SVG document from a snapshot produced by [`snapshot_data_url`].
///
/// Returns `None` for other data URLs or invalid base64.
#[must_use]
pub fn decode_snapshot(data_url: &str) -> Option<String> {
    let encoded = data_url.strip_prefix(SNAPSHOT_PREFIX)?;
    let bytes = STANDARD.decode(encoded).ok()?;
    String::from_utf8(bytes).ok()
}
