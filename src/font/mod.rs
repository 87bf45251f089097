//! # Fonts and Glyph Paths
//!
//! Text on a ticket is emitted as vector outlines inside an SVG overlay, not
//! as pre-rasterized bitmaps. This module measures strings and converts glyph
//! outlines into SVG path data using ab_glyph.
//!
//! The [`FontCatalog`] is built once at start-up from two font files (regular
//! and bold) and handed to the layout engine by reference. Layout code only
//! depends on the [`TextShaper`] trait, so tests can swap in fixed metrics.
//!
//! ## Coordinates
//!
//! `font_size` is the em size in pixels. Strings are anchored at their top
//! edge: the baseline sits `ascent` pixels below the requested `y`, and the
//! measured height is `ascent - descent`.

use std::fmt::Write;
use std::path::Path;

use ab_glyph::{Font, FontArc, OutlineCurve, Point, PxScale, ScaleFont};
use serde::{Deserialize, Serialize};

use crate::error::TicketError;

/// Font weight of a text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weight {
    #[default]
    Regular,
    Bold,
}

/// Bounding metrics of a string at a given size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub width: f32,
    pub height: f32,
}

/// Measures strings and produces their outlines as SVG paths.
pub trait TextShaper: Send + Sync {
    /// Measure `text` at `font_size` pixels per em.
    fn measure(&self, text: &str, font_size: f32, weight: Weight) -> TextMetrics;

    /// SVG `<path>` element for `text` with its top-left corner at `(x, y)`.
    fn glyph_path(&self, text: &str, x: f32, y: f32, font_size: f32, weight: Weight) -> String;
}

/// The regular and bold faces used for every ticket.
pub struct FontCatalog {
    regular: FontArc,
    bold: FontArc,
}

impl FontCatalog {
    /// Load both faces from disk.
    ///
    /// Failure here is fatal for the printer: nothing can be laid out
    /// without glyph metrics.
    pub fn load<P: AsRef<Path>>(regular: P, bold: P) -> Result<Self, TicketError> {
        let regular = load_face(regular.as_ref())?;
        let bold = load_face(bold.as_ref())?;
        tracing::info!("fonts loaded");
        Ok(Self { regular, bold })
    }

    /// Build a catalog from in-memory font files.
    pub fn from_bytes(regular: Vec<u8>, bold: Vec<u8>) -> Result<Self, TicketError> {
        let regular = FontArc::try_from_vec(regular)
            .map_err(|e| TicketError::Font(format!("Invalid regular font: {}", e)))?;
        let bold = FontArc::try_from_vec(bold)
            .map_err(|e| TicketError::Font(format!("Invalid bold font: {}", e)))?;
        Ok(Self { regular, bold })
    }

    fn face(&self, weight: Weight) -> &FontArc {
        match weight {
            Weight::Regular => &self.regular,
            Weight::Bold => &self.bold,
        }
    }
}

fn load_face(path: &Path) -> Result<FontArc, TicketError> {
    let bytes = std::fs::read(path)
        .map_err(|e| TicketError::Font(format!("Failed to read {}: {}", path.display(), e)))?;
    FontArc::try_from_vec(bytes)
        .map_err(|e| TicketError::Font(format!("Invalid font {}: {}", path.display(), e)))
}

/// Pixel scale whose em square is `font_size` pixels.
fn em_scale(font: &FontArc, font_size: f32) -> PxScale {
    let units_per_em = font.units_per_em().unwrap_or(1000.0);
    PxScale::from(font_size * font.height_unscaled() / units_per_em)
}

impl TextShaper for FontCatalog {
    fn measure(&self, text: &str, font_size: f32, weight: Weight) -> TextMetrics {
        let font = self.face(weight);
        let scaled = font.as_scaled(em_scale(font, font_size));

        let mut width = 0.0f32;
        let mut previous = None;
        for ch in text.chars() {
            let id = font.glyph_id(ch);
            if let Some(prev) = previous {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            previous = Some(id);
        }

        TextMetrics {
            width,
            height: scaled.ascent() - scaled.descent(),
        }
    }

    fn glyph_path(&self, text: &str, x: f32, y: f32, font_size: f32, weight: Weight) -> String {
        let font = self.face(weight);
        let scaled = font.as_scaled(em_scale(font, font_size));
        let h = scaled.h_scale_factor();
        let v = scaled.v_scale_factor();
        let baseline = y + scaled.ascent();

        let mut d = PathData::default();
        let mut caret = x;
        let mut previous = None;

        for ch in text.chars() {
            let id = font.glyph_id(ch);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id);
            }
            if let Some(outline) = font.outline(id) {
                let to_canvas = |p: Point| (caret + p.x * h, baseline - p.y * v);
                for curve in &outline.curves {
                    match *curve {
                        OutlineCurve::Line(p0, p1) => {
                            d.move_to(to_canvas(p0));
                            d.line_to(to_canvas(p1));
                        }
                        OutlineCurve::Quad(p0, p1, p2) => {
                            d.move_to(to_canvas(p0));
                            d.quad_to(to_canvas(p1), to_canvas(p2));
                        }
                        OutlineCurve::Cubic(p0, p1, p2, p3) => {
                            d.move_to(to_canvas(p0));
                            d.cubic_to(to_canvas(p1), to_canvas(p2), to_canvas(p3));
                        }
                    }
                }
            }
            caret += scaled.h_advance(id);
            previous = Some(id);
        }

        format!(r#"<path fill="black" d="{}"/>"#, d.finish())
    }
}

/// Incremental SVG path data builder.
///
/// Outline curves come as disconnected segments; a new subpath is started
/// whenever a segment does not begin where the previous one ended.
#[derive(Default)]
struct PathData {
    d: String,
    current: Option<(f32, f32)>,
}

impl PathData {
    fn move_to(&mut self, p: (f32, f32)) {
        if self.current.is_some_and(|c| close(c, p)) {
            return;
        }
        if self.current.is_some() {
            self.d.push('Z');
        }
        let _ = write!(self.d, "M{:.2} {:.2}", p.0, p.1);
        self.current = Some(p);
    }

    fn line_to(&mut self, p: (f32, f32)) {
        let _ = write!(self.d, "L{:.2} {:.2}", p.0, p.1);
        self.current = Some(p);
    }

    fn quad_to(&mut self, c: (f32, f32), p: (f32, f32)) {
        let _ = write!(self.d, "Q{:.2} {:.2} {:.2} {:.2}", c.0, c.1, p.0, p.1);
        self.current = Some(p);
    }

    fn cubic_to(&mut self, c1: (f32, f32), c2: (f32, f32), p: (f32, f32)) {
        let _ = write!(
            self.d,
            "C{:.2} {:.2} {:.2} {:.2} {:.2} {:.2}",
            c1.0, c1.1, c2.0, c2.1, p.0, p.1
        );
        self.current = Some(p);
    }

    fn finish(mut self) -> String {
        if self.current.is_some() {
            self.d.push('Z');
        }
        self.d
    }
}

#[inline]
fn close(a: (f32, f32), b: (f32, f32)) -> bool {
    (a.0 - b.0).abs() < 1e-3 && (a.1 - b.1).abs() < 1e-3
}
