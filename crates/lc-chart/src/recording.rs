//! Surface that records draw calls instead of painting.

use crate::render::{HEIGHT, WIDTH};
use crate::surface::{Point, Surface};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    StrokePath { points: Vec<Point>, color: String },
    FillCircle { center: Point, radius: f64, color: String },
    FillText { text: String, at: Point, color: String },
}

#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: f64,
    height: f64,
    commands: Vec<DrawCommand>,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new(WIDTH, HEIGHT)
    }
}

impl RecordingSurface {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    /// Every command since the surface was created, including clears.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Commands after the most recent clear: what would be visible.
    #[must_use]
    pub fn visible(&self) -> &[DrawCommand] {
        let start = self
            .commands
            .iter()
            .rposition(|c| matches!(c, DrawCommand::Clear))
            .map_or(0, |i| i + 1);
        &self.commands[start..]
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn stroke_path(&mut self, points: &[Point], color: &str) {
        self.commands.push(DrawCommand::StrokePath {
            points: points.to_vec(),
            color: color.to_string(),
        });
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: &str) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            color: color.to_string(),
        });
    }

    fn fill_text(&mut self, text: &str, at: Point, color: &str) {
        self.commands.push(DrawCommand::FillText {
            text: text.to_string(),
            at,
            color: color.to_string(),
        });
    }
}
