//! # Ticket Rasterization
//!
//! Renders a [`TicketLayout`] into a single monochrome buffer:
//!
//! 1. Render the SVG text overlay with resvg at the layout's exact size.
//! 2. Convert to 8-bit luminance.
//! 3. Copy every photo placement over the canvas.
//! 4. Hard threshold: values at or above the configured threshold become
//!    paper (255), everything else ink (0).
//!
//! The resulting [`TicketRaster`] feeds either the device framer or the PNG
//! preview.

use std::io::Cursor;
use std::path::Path;

use image::{GrayImage, ImageFormat, imageops::FilterType};
use resvg::{tiny_skia, usvg};

use super::dither::{BLACK, WHITE};
use crate::error::TicketError;
use crate::printer::config::RasterSettings;
use crate::ticket::layout::{Placement, TicketLayout};

/// A rendered ticket: one byte per pixel, each exactly 0 or 255.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketRaster {
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

/// Rasterize a laid-out ticket.
pub fn rasterize(layout: &TicketLayout, settings: &RasterSettings) -> Result<TicketRaster, TicketError> {
    let mut gray = render_svg(&layout.svg, layout.width, layout.height, settings.density)?;

    for placement in &layout.placements {
        composite(&mut gray, layout.width, layout.height, placement);
    }

    threshold(&mut gray, settings.threshold);

    Ok(TicketRaster {
        data: gray,
        width: layout.width,
        height: layout.height,
    })
}

/// Render an SVG document to a luminance buffer of exactly `width`×`height`.
pub fn render_svg(svg: &str, width: usize, height: usize, density: f32) -> Result<Vec<u8>, TicketError> {
    let options = usvg::Options {
        dpi: density,
        ..Default::default()
    };
    let tree = usvg::Tree::from_str(svg, &options)
        .map_err(|e| TicketError::Render(format!("Failed to parse SVG: {}", e)))?;

    let mut pixmap = tiny_skia::Pixmap::new(width as u32, height as u32).ok_or_else(|| {
        TicketError::Render(format!("Failed to allocate {}x{} canvas", width, height))
    })?;
    pixmap.fill(tiny_skia::Color::WHITE);
    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());

    let gray = pixmap
        .pixels()
        .iter()
        .map(|p| {
            let c = p.demultiply();
            luma(c.red(), c.green(), c.blue())
        })
        .collect();

    Ok(gray)
}

/// Copy a photo over the canvas, clipped to the canvas bounds.
pub fn composite(canvas: &mut [u8], width: usize, height: usize, placement: &Placement) {
    let size = placement.bitmap.size;
    for row in 0..size {
        let y = placement.top + row;
        if y >= height {
            break;
        }
        if placement.left >= width {
            break;
        }
        let cols = size.min(width - placement.left);
        let src = &placement.bitmap.data[row * size..row * size + cols];
        let dst = y * width + placement.left;
        canvas[dst..dst + cols].copy_from_slice(src);
    }
}

/// Binarize in place.
pub fn threshold(data: &mut [u8], threshold: u8) {
    for v in data.iter_mut() {
        *v = if *v >= threshold { WHITE } else { BLACK };
    }
}

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * 299 + g as u32 * 587 + b as u32 * 114) / 1000) as u8
}

impl TicketRaster {
    /// Convert to an image buffer.
    pub fn to_image(&self) -> Result<GrayImage, TicketError> {
        GrayImage::from_raw(self.width as u32, self.height as u32, self.data.clone())
            .ok_or_else(|| TicketError::Image("Raster size does not match its buffer".to_string()))
    }

    /// Encode a PNG scaled to `target_width` (height follows the aspect ratio).
    pub fn preview_png(&self, target_width: usize) -> Result<Vec<u8>, TicketError> {
        let image = self.preview_image(target_width)?;
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| TicketError::Image(format!("Failed to encode PNG: {}", e)))?;
        Ok(bytes)
    }

    /// Write a PNG preview scaled to `target_width`.
    pub fn save_preview<P: AsRef<Path>>(&self, path: P, target_width: usize) -> Result<(), TicketError> {
        let path = path.as_ref();
        self.preview_image(target_width)?
            .save(path)
            .map_err(|e| TicketError::Image(format!("Failed to save {}: {}", path.display(), e)))
    }

    fn preview_image(&self, target_width: usize) -> Result<GrayImage, TicketError> {
        let image = self.to_image()?;
        if target_width == self.width || self.width == 0 {
            return Ok(image);
        }
        let target_height = (self.height * target_width).div_ceil(self.width).max(1);
        Ok(image::imageops::resize(
            &image,
            target_width as u32,
            target_height as u32,
            FilterType::Nearest,
        ))
    }
}
