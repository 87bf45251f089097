//! # Rendering Module
//!
//! Turns ticket content into monochrome pixels.
//!
//! ## Modules
//!
//! - [`dither`]: Floyd-Steinberg and ordered Bayer dithering
//! - [`adjust`]: Grayscale tone adjustments for photos
//! - [`photo`]: Photo fetch, crop, dither and circular mask
//! - [`raster`]: SVG text overlay plus photos into one binary raster
//!
//! ## Usage Example
//!
//! ```
//! use ticketera::render::dither::{self, DitherConfig};
//!
//! // 4x4 mid-gray square
//! let gray = vec![128u8; 16];
//! let out = dither::dither(&gray, 4, 4, &DitherConfig::default());
//!
//! assert!(out.iter().all(|&v| v == 0 || v == 255));
//! ```

pub mod adjust;
pub mod dither;
pub mod photo;
pub mod raster;
