//! # Photo Dithering
//!
//! Converts an 8-bit grayscale buffer (one byte per pixel, row-major) into a
//! monochrome buffer of the same dimensions where every byte is exactly
//! `0` (ink) or `255` (paper).
//!
//! Two algorithms are available:
//!
//! | Mode | Order dependent | Tunables |
//! |------|-----------------|----------|
//! | Error diffusion (Floyd-Steinberg) | Yes, sequential scan | threshold, strength, serpentine |
//! | Ordered (Bayer) | No, pure function of position | matrix size, gamma |
//!
//! The fields of [`DitherConfig`] that do not belong to the selected mode are
//! ignored, never cross-validated.
//!
//! ## Error Diffusion
//!
//! Quantization error is pushed to the four unvisited neighbours:
//!
//! ```text
//!          X   7/16
//!   3/16  5/16 1/16
//! ```
//!
//! mirrored on rows scanned right-to-left. The last row and last column are
//! never diffusion targets; they are thresholded on their own with a binary
//! cutoff (`0` when the configured threshold is below 128, `255` otherwise).
//!
//! ## Ordered Dithering
//!
//! ```text
//!     0   1   2   3   (x mod 4)
//!   ┌───┬───┬───┬───┐
//! 0 │ 0 │ 8 │ 2 │10 │
//!   ├───┼───┼───┼───┤
//! 1 │12 │ 4 │14 │ 6 │
//!   ├───┼───┼───┼───┤
//! 2 │ 3 │11 │ 1 │ 9 │
//!   ├───┼───┼───┼───┤
//! 3 │15 │ 7 │13 │ 5 │
//!   └───┴───┴───┴───┘
//! (y mod 4)
//! ```
//!
//! Matrix values are normalized to `(value + 0.5) / N²` so no cell is exactly
//! 0 or 1. A pixel prints when `(value / 255)^gamma` falls below its cell.
//!
//! ## Usage Example
//!
//! ```
//! use ticketera::render::dither::{self, DitherConfig};
//!
//! let gray = vec![0u8, 64, 128, 255, 32, 96, 160, 224, 10, 20, 30, 40];
//! let mono = dither::dither(&gray, 4, 3, &DitherConfig::default());
//!
//! assert_eq!(mono.len(), gray.len());
//! assert!(mono.iter().all(|&v| v == 0 || v == 255));
//! ```

use serde::{Deserialize, Serialize};

/// Bayer 4x4 dithering matrix (values 0-15).
pub const BAYER4: [[u8; 4]; 4] = [
    [0, 8, 2, 10],
    [12, 4, 14, 6],
    [3, 11, 1, 9],
    [15, 7, 13, 5],
];

/// Bayer 8x8 dithering matrix (values 0-63).
pub const BAYER8: [[u8; 8]; 8] = [
    [0, 32, 8, 40, 2, 34, 10, 42],
    [48, 16, 56, 24, 50, 18, 58, 26],
    [12, 44, 4, 36, 14, 46, 6, 38],
    [60, 28, 52, 20, 62, 30, 54, 22],
    [3, 35, 11, 43, 1, 33, 9, 41],
    [51, 19, 59, 27, 49, 17, 57, 25],
    [15, 47, 7, 39, 13, 45, 5, 37],
    [63, 31, 55, 23, 61, 29, 53, 21],
];

/// Ink value in monochrome buffers.
pub const BLACK: u8 = 0;

/// Paper value in monochrome buffers.
pub const WHITE: u8 = 255;

/// Dithering algorithm selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DitherMode {
    /// Floyd-Steinberg error diffusion
    #[default]
    #[serde(alias = "floyd-steinberg", alias = "floyd_steinberg")]
    Fs,
    /// Ordered threshold matrix
    Bayer,
}

/// Ordered dithering matrix size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum MatrixSize {
    #[default]
    Four,
    Eight,
}

impl MatrixSize {
    /// Side length of the matrix.
    pub fn side(self) -> usize {
        match self {
            MatrixSize::Four => 4,
            MatrixSize::Eight => 8,
        }
    }
}

impl TryFrom<u8> for MatrixSize {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            4 => Ok(MatrixSize::Four),
            8 => Ok(MatrixSize::Eight),
            other => Err(format!("matrix size must be 4 or 8, got {}", other)),
        }
    }
}

impl From<MatrixSize> for u8 {
    fn from(size: MatrixSize) -> Self {
        size.side() as u8
    }
}

/// Dithering parameters for one photo.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DitherConfig {
    pub mode: DitherMode,
    /// Error diffusion: pixels below this become ink.
    pub threshold: u8,
    /// Error diffusion: fraction of the quantization error propagated.
    pub strength: f32,
    /// Error diffusion: alternate scan direction on every row.
    pub serpentine: bool,
    /// Ordered: matrix size.
    pub matrix_size: MatrixSize,
    /// Ordered: power-curve pre-correction.
    pub gamma: f32,
}

impl Default for DitherConfig {
    fn default() -> Self {
        Self {
            mode: DitherMode::Fs,
            threshold: 128,
            strength: 1.0,
            serpentine: true,
            matrix_size: MatrixSize::Four,
            gamma: 1.0,
        }
    }
}

/// Dither a grayscale buffer with the configured algorithm.
///
/// `data.len()` must equal `width * height`.
pub fn dither(data: &[u8], width: usize, height: usize, config: &DitherConfig) -> Vec<u8> {
    debug_assert_eq!(
        data.len(),
        width * height,
        "Buffer length mismatch. Expected {}x{}",
        width,
        height
    );

    match config.mode {
        DitherMode::Fs => floyd_steinberg(
            data,
            width,
            height,
            config.threshold,
            config.strength,
            config.serpentine,
        ),
        DitherMode::Bayer => ordered(data, width, height, config.matrix_size, config.gamma),
    }
}

/// Normalized ordered-dither threshold for a pixel position, in (0, 1).
#[inline]
pub fn matrix_threshold(size: MatrixSize, x: usize, y: usize) -> f32 {
    match size {
        MatrixSize::Four => (BAYER4[y & 3][x & 3] as f32 + 0.5) / 16.0,
        MatrixSize::Eight => (BAYER8[y & 7][x & 7] as f32 + 0.5) / 64.0,
    }
}

/// Ordered (Bayer) dithering.
pub fn ordered(data: &[u8], width: usize, height: usize, size: MatrixSize, gamma: f32) -> Vec<u8> {
    let mut out = vec![WHITE; width * height];

    for y in 0..height {
        for x in 0..width {
            let i = y * width + x;
            let v = (data[i] as f32 / 255.0).powf(gamma);
            out[i] = if v < matrix_threshold(size, x, y) {
                BLACK
            } else {
                WHITE
            };
        }
    }

    out
}

/// Floyd-Steinberg error diffusion.
pub fn floyd_steinberg(
    data: &[u8],
    width: usize,
    height: usize,
    threshold: u8,
    strength: f32,
    serpentine: bool,
) -> Vec<u8> {
    let mut out = data.to_vec();
    if width == 0 || height == 0 {
        return out;
    }

    let last_x = width - 1;
    let last_y = height - 1;

    for y in 0..last_y {
        let left_to_right = !serpentine || y % 2 == 0;

        for step in 0..last_x {
            let x = if left_to_right { step } else { last_x - 1 - step };
            let i = y * width + x;

            let old = out[i];
            let new = if old < threshold { BLACK } else { WHITE };
            out[i] = new;

            let err = (old as f32 - new as f32) * strength;
            if err == 0.0 {
                continue;
            }

            let ahead = if left_to_right { x.checked_add(1) } else { x.checked_sub(1) };
            let behind = if left_to_right { x.checked_sub(1) } else { x.checked_add(1) };
            let below = y + 1;

            // Edge row and column are thresholded separately, never diffused into.
            let mut push = |tx: Option<usize>, ty: usize, weight: f32| {
                if let Some(tx) = tx
                    && tx < last_x
                    && ty < last_y
                {
                    let j = ty * width + tx;
                    out[j] = clamp8(out[j] as f32 + err * weight);
                }
            };

            push(ahead, y, 7.0 / 16.0);
            push(behind, below, 3.0 / 16.0);
            push(Some(x), below, 5.0 / 16.0);
            push(ahead, below, 1.0 / 16.0);
        }
    }

    let cutoff = edge_cutoff(threshold);
    for x in 0..width {
        let i = last_y * width + x;
        out[i] = if out[i] < cutoff { BLACK } else { WHITE };
    }
    for y in 0..height {
        let i = y * width + last_x;
        out[i] = if out[i] < cutoff { BLACK } else { WHITE };
    }

    out
}

/// Cutoff applied to the last row and last column in error diffusion mode.
#[inline]
pub fn edge_cutoff(threshold: u8) -> u8 {
    if threshold < 128 { 0 } else { 255 }
}

#[inline]
fn clamp8(v: f32) -> u8 {
    v.clamp(0.0, 255.0) as u8
}

// ============================================================================
// TESTS
// ============================================================================
