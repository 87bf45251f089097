//! # Photo Compositing
//!
//! Turns an avatar or any other picture into a square monochrome bitmap
//! ready to be placed on a ticket.
//!
//! ## Pipeline
//!
//! ```text
//! bytes / URL ─► decode ─► cover-crop to side×side ─► grayscale
//!   ─► normalise ─► brightness ×1.4          (legibility pre-pass)
//!   ─► linear 1.2·v − 10 ─► normalise        (contrast stretch)
//!   ─► dither ─► optional circle mask + ring border
//! ```
//!
//! The side length is `min(max_width, max_height)`.
//!
//! ## Circle Mask
//!
//! With `r = side/2 − 3`, pixels whose squared distance from the centre is
//! within `(r − 0.5)²` keep their dithered value, pixels out to `(r + 2)²`
//! become ink when the border is enabled, and everything beyond is paper.

use image::{DynamicImage, imageops::FilterType};

use super::adjust;
use super::dither::{self, BLACK, DitherConfig, WHITE};
use crate::error::TicketError;
use crate::ticket::PhotoSource;

/// Brightness multiplier of the legibility pre-pass.
const PREPASS_BRIGHTNESS: f32 = 1.4;

/// Contrast stretch applied right before dithering (`v * a + b`).
const CONTRAST_GAIN: f32 = 1.2;
const CONTRAST_OFFSET: f32 = -10.0;

/// Distance from the bitmap edge to the nominal circle radius.
const MASK_INSET: f32 = 3.0;

/// Width of the border ring outside the nominal radius.
const RING_WIDTH: f32 = 2.0;

/// Masking and dithering options for one photo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhotoOptions {
    pub circle_mask: bool,
    pub border: bool,
    pub dither: DitherConfig,
}

/// A square monochrome bitmap.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoBitmap {
    pub data: Vec<u8>,
    pub size: usize,
}

/// Load a photo from its source and render it as a monochrome bitmap.
///
/// Download failures propagate unchanged; there is no retry.
pub async fn load_photo_bitmap(
    client: &reqwest::Client,
    src: &PhotoSource,
    max_width: usize,
    max_height: usize,
    options: PhotoOptions,
) -> Result<PhotoBitmap, TicketError> {
    let bytes = match src {
        PhotoSource::Bytes(bytes) => bytes.clone(),
        PhotoSource::Url(url) => fetch_bytes(client, url).await?,
    };

    let size = max_width.min(max_height);
    tokio::task::spawn_blocking(move || {
        let image = image::load_from_memory(&bytes)
            .map_err(|e| TicketError::Image(format!("Failed to decode image: {}", e)))?;
        Ok::<_, TicketError>(compose_photo(&image, size, &options))
    })
    .await
    .map_err(|e| TicketError::Image(format!("Photo task failed: {}", e)))?
}

/// Download an image over HTTP.
pub async fn fetch_bytes(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, TicketError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| TicketError::Fetch(format!("Failed to download {}: {}", url, e)))?;
    if !response.status().is_success() {
        return Err(TicketError::Fetch(format!(
            "Failed to download {}: HTTP {}",
            url,
            response.status()
        )));
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|e| TicketError::Fetch(format!("Failed to read image data: {}", e)))?;
    Ok(bytes.to_vec())
}

/// Synchronous part of the pipeline, from decoded image to masked bitmap.
pub fn compose_photo(image: &DynamicImage, size: usize, options: &PhotoOptions) -> PhotoBitmap {
    let gray = prepare_grayscale(image, size);
    let dithered = dither::dither(&gray, size, size, &options.dither);

    tracing::debug!(size, circle_mask = options.circle_mask, "photo dithered");

    let data = if options.circle_mask {
        circle_mask(&dithered, size, options.border)
    } else {
        dithered
    };

    PhotoBitmap { data, size }
}

/// Cover-crop to `size`×`size` and run both tone passes.
pub fn prepare_grayscale(image: &DynamicImage, size: usize) -> Vec<u8> {
    let side = size as u32;
    let cropped = if image.width() == side && image.height() == side {
        image.clone()
    } else {
        image.resize_to_fill(side, side, FilterType::Lanczos3)
    };

    let mut gray = cropped.to_luma8().into_raw();

    adjust::normalise(&mut gray);
    adjust::modulate_brightness(&mut gray, PREPASS_BRIGHTNESS);

    adjust::linear(&mut gray, CONTRAST_GAIN, CONTRAST_OFFSET);
    adjust::normalise(&mut gray);

    gray
}

/// Inner (kept) and outer (border) squared radii of the mask.
///
/// Meaningless below `2 * MASK_INSET` pixels: the radius goes negative, so
/// squaring keeps a small centre patch and no ring is drawn.
pub fn mask_radii_squared(size: usize) -> (f32, f32) {
    let radius = size as f32 / 2.0 - MASK_INSET;
    let inner = radius - 0.5;
    let outer = radius + RING_WIDTH;
    (inner * inner, outer * outer)
}

/// Apply the circular mask to a square monochrome bitmap.
pub fn circle_mask(dithered: &[u8], size: usize, border: bool) -> Vec<u8> {
    let mut out = vec![WHITE; size * size];
    let center = size as f32 / 2.0;
    let (inner_sq, outer_sq) = mask_radii_squared(size);

    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 - center;
            let dy = y as f32 - center;
            let dist_sq = dx * dx + dy * dy;
            let i = y * size + x;

            if dist_sq <= inner_sq {
                out[i] = dithered[i];
            } else if border && dist_sq <= outer_sq {
                out[i] = BLACK;
            }
        }
    }

    out
}
