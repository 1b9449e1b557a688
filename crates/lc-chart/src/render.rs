//! Light-curve plot layout.

use lc_core::Measurement;

use crate::surface::{Point, Surface};

/// Default surface size in pixels.
pub const WIDTH: f64 = 800.0;
pub const HEIGHT: f64 = 320.0;
/// Inset between the surface edge and the plot area.
pub const MARGIN: f64 = 40.0;

pub const AXIS_COLOR: &str = "#ccc";
pub const SERIES_COLOR: &str = "#0070f3";
pub const LABEL_COLOR: &str = "#333";
pub const EMPTY_COLOR: &str = "#888";

pub const POINT_RADIUS: f64 = 2.0;
pub const TIME_LABEL: &str = "MJD";
pub const MAGNITUDE_LABEL: &str = "mag (lower up)";
pub const EMPTY_LABEL: &str = "no data";

/// Linear map from data space into the plot area.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Scale {
    min_time: f64,
    time_span: f64,
    min_mag: f64,
    mag_span: f64,
    width: f64,
    height: f64,
}

impl Scale {
    /// Fit `measurements` into a `width`×`height` plot area. A zero-width
    /// range on either axis is treated as 1.
    fn fit(measurements: &[Measurement], width: f64, height: f64) -> Self {
        let (min_time, max_time) = bounds(measurements.iter().map(|m| m.time));
        let (min_mag, max_mag) = bounds(measurements.iter().map(|m| m.magnitude));
        Self {
            min_time,
            time_span: span(min_time, max_time),
            min_mag,
            mag_span: span(min_mag, max_mag),
            width,
            height,
        }
    }

    fn project(&self, m: &Measurement) -> Point {
        let x = MARGIN + (m.time - self.min_time) / self.time_span * self.width;
        let y = MARGIN + (1.0 - (m.magnitude - self.min_mag) / self.mag_span) * self.height;
        Point::new(x, y)
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

fn span(min: f64, max: f64) -> f64 {
    let span = max - min;
    if span > 0.0 { span } else { 1.0 }
}

/// Draw one light curve onto `surface`.
///
/// The surface is cleared first, so the result depends only on
/// `measurements` and the surface size. Points are joined in the order given.
pub fn render_lightcurve<S: Surface + ?Sized>(surface: &mut S, measurements: &[Measurement]) {
    surface.clear();
    let (surface_width, surface_height) = surface.size();

    if measurements.is_empty() {
        surface.fill_text(EMPTY_LABEL, Point::new(10.0, 20.0), EMPTY_COLOR);
        return;
    }

    let width = surface_width - MARGIN * 2.0;
    let height = surface_height - MARGIN * 2.0;
    let scale = Scale::fit(measurements, width, height);

    surface.stroke_path(
        &[
            Point::new(MARGIN, MARGIN),
            Point::new(MARGIN, MARGIN + height),
            Point::new(MARGIN + width, MARGIN + height),
        ],
        AXIS_COLOR,
    );

    let points: Vec<Point> = measurements.iter().map(|m| scale.project(m)).collect();
    surface.stroke_path(&points, SERIES_COLOR);
    for &point in &points {
        surface.fill_circle(point, POINT_RADIUS, SERIES_COLOR);
    }

    surface.fill_text(
        TIME_LABEL,
        Point::new(surface_width / 2.0, surface_height - 6.0),
        LABEL_COLOR,
    );
    surface.fill_text(MAGNITUDE_LABEL, Point::new(6.0, 12.0), LABEL_COLOR);
}
