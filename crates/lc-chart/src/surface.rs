//! Drawing surface abstraction.

/// A position in surface pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Minimal 2D drawing target the chart renderer paints onto.
pub trait Surface {
    /// Width and height in pixels.
    fn size(&self) -> (f64, f64);

    /// Erase everything drawn so far.
    fn clear(&mut self);

    /// Stroke an open path through `points` in `color`.
    fn stroke_path(&mut self, points: &[Point], color: &str);

    /// Fill a circle of `radius` around `center`.
    fn fill_circle(&mut self, center: Point, radius: f64, color: &str);

    /// Draw `text` with its baseline starting at `at`.
    fn fill_text(&mut self, text: &str, at: Point, color: &str);
}
