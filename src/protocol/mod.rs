//! # ESC/POS Protocol Implementation
//!
//! Low-level command builders for generic ESC/POS thermal receipt printers.
//!
//! ## Module Structure
//!
//! - [`commands`]: Control commands (init, feed, heating parameters)
//! - [`graphics`]: `GS v 0` raster framing
//!
//! ## Usage Example
//!
//! ```
//! use ticketera::protocol::{commands, graphics};
//!
//! let mut data = Vec::new();
//! data.extend(commands::init());
//!
//! // 384-dot wide, 24-row white band
//! let raster = vec![255u8; 384 * 24];
//! for chunk in graphics::frame_raster(&raster, 384, 24, 192) {
//!     data.extend(chunk);
//! }
//!
//! data.extend(commands::feed_dots(120));
//! // Send `data` to printer via transport...
//! ```

pub mod commands;
pub mod graphics;
