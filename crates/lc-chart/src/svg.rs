//! SVG document surface.

use std::fmt::Write as _;

use crate::render::{HEIGHT, WIDTH};
use crate::surface::{Point, Surface};

const FONT: &str = r#"font-family="sans-serif" font-size="10""#;

/// Accumulates SVG elements; [`SvgSurface::to_svg_string`] emits the document.
#[derive(Debug, Clone)]
pub struct SvgSurface {
    width: f64,
    height: f64,
    elements: Vec<String>,
}

impl Default for SvgSurface {
    fn default() -> Self {
        Self::new(WIDTH, HEIGHT)
    }
}

impl SvgSurface {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            elements: Vec::new(),
        }
    }

    /// Number of drawn elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Complete SVG document on a white background.
    #[must_use]
    pub fn to_svg_string(&self) -> String {
        let mut out = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height,
        );
        out.push('\n');
        let _ = writeln!(
            out,
            r#"  <rect width="{}" height="{}" fill="white"/>"#,
            self.width, self.height
        );
        for element in &self.elements {
            out.push_str("  ");
            out.push_str(element);
            out.push('\n');
        }
        out.push_str("</svg>\n");
        out
    }
}

impl Surface for SvgSurface {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.elements.clear();
    }

    fn stroke_path(&mut self, points: &[Point], color: &str) {
        if points.is_empty() {
            return;
        }
        let coords = points
            .iter()
            .map(|p| format!("{:.2},{:.2}", p.x, p.y))
            .collect::<Vec<_>>()
            .join(" ");
        self.elements.push(format!(
            r#"<polyline points="{coords}" fill="none" stroke="{color}" stroke-width="1"/>"#
        ));
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: &str) {
        self.elements.push(format!(
            r#"<circle cx="{:.2}" cy="{:.2}" r="{radius}" fill="{color}"/>"#,
            center.x, center.y
        ));
    }

    fn fill_text(&mut self, text: &str, at: Point, color: &str) {
        self.elements.push(format!(
            r#"<text x="{:.2}" y="{:.2}" fill="{color}" {FONT}>{}</text>"#,
            at.x,
            at.y,
            escape(text)
        ));
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
