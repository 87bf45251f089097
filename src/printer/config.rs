//! # Printer Configuration
//!
//! Hardware and layout settings for the 58mm receipt printer. Values are read
//! once at start-up and shared read-only by every pipeline stage.
//!
//! ## Defaults
//!
//! | Setting | Value |
//! |---------|-------|
//! | Width | 384 dots (48 bytes) |
//! | Margins | 14 left, 14 right, 12 top, 8 bottom |
//! | Raster threshold | 145 |
//! | Chunk | 192 rows, 25ms apart |
//! | Tail feed | 120 dots |
//! | Photo | 220×220, circle mask with border |
//!
//! ## Usage
//!
//! ```
//! use ticketera::printer::PrinterConfig;
//!
//! let config = PrinterConfig::default();
//! assert_eq!(config.width, 384);
//! assert_eq!(config.content_width(), 356);
//! ```
//!
//! Any subset of fields can be overridden from a JSON file:
//!
//! ```json
//! { "margins": { "top": 20 }, "printer": { "chunkDelayMs": 40 } }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::TicketError;

/// Default serial device path.
pub const DEFAULT_PORT: &str = "/dev/rfcomm0";

/// Default serial baud rate.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

pub const DEFAULT_FONT_REGULAR: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";
pub const DEFAULT_FONT_BOLD: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf";

/// Blank space around the printable content, in dots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub left: usize,
    pub right: usize,
    pub top: usize,
    pub bottom: usize,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: 14,
            right: 14,
            top: 12,
            bottom: 8,
        }
    }
}

/// Settings for rasterizing the ticket canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterSettings {
    pub gamma: f32,
    /// Gray values at or above this become paper.
    pub threshold: u8,
    /// SVG rendering density (DPI).
    pub density: f32,
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self {
            gamma: 1.0,
            threshold: 145,
            density: 72.0,
        }
    }
}

/// Device pacing and command parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeviceSettings {
    /// Heating dots, heat time and heat interval (`ESC 7`).
    pub heat: [u8; 3],
    /// Send the heating parameters after reset.
    pub send_heat: bool,
    /// Rows per raster command.
    pub chunk_rows: usize,
    /// Pause after each raster command.
    pub chunk_delay_ms: u64,
    /// Paper advance after the last chunk, in dots.
    pub tail_feed_dots: u8,
}

impl DeviceSettings {
    pub fn chunk_delay(&self) -> Duration {
        Duration::from_millis(self.chunk_delay_ms)
    }
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            heat: [0x07, 0xA0, 0x02],
            send_heat: false,
            chunk_rows: 192,
            chunk_delay_ms: 25,
            tail_feed_dots: 120,
        }
    }
}

/// Defaults for photo blocks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhotoDefaults {
    pub max_width: usize,
    pub max_height: usize,
    pub circle_mask: bool,
    pub border: bool,
}

impl Default for PhotoDefaults {
    fn default() -> Self {
        Self {
            max_width: 220,
            max_height: 220,
            circle_mask: true,
            border: true,
        }
    }
}

/// # Printer Configuration
///
/// Physical width, margins and every tunable of the render and transport
/// stages.
///
/// `wrap_safety`, `measure_bleed_pad`, `tail_safe_px`, `grow_step_px` and
/// `max_grows` are carried for configuration compatibility; single-line
/// layout does not consult them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PrinterConfig {
    /// Printable width in dots
    pub width: usize,
    pub margins: Margins,
    pub wrap_safety: usize,
    pub measure_bleed_pad: usize,
    pub raster: RasterSettings,
    pub tail_safe_px: usize,
    pub grow_step_px: usize,
    pub max_grows: usize,
    pub printer: DeviceSettings,
    pub photo: PhotoDefaults,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            width: 384,
            margins: Margins::default(),
            wrap_safety: 24,
            measure_bleed_pad: 20,
            raster: RasterSettings::default(),
            tail_safe_px: 12,
            grow_step_px: 48,
            max_grows: 4,
            printer: DeviceSettings::default(),
            photo: PhotoDefaults::default(),
        }
    }
}

impl PrinterConfig {
    /// Width available to content between the side margins.
    #[inline]
    pub fn content_width(&self) -> usize {
        self.width
            .saturating_sub(self.margins.left)
            .saturating_sub(self.margins.right)
    }

    /// Width in bytes of one packed raster row.
    #[inline]
    pub fn width_bytes(&self) -> usize {
        self.width.div_ceil(8)
    }

    /// Parse a JSON override document on top of the defaults.
    pub fn from_json(json: &str) -> Result<Self, TicketError> {
        serde_json::from_str(json)
            .map_err(|e| TicketError::Config(format!("Invalid printer config: {}", e)))
    }

    /// Load a JSON override file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TicketError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            TicketError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }
}

/// Serial connection and font settings, read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionConfig {
    /// When false, tickets are rendered nowhere and printing is a no-op.
    pub enabled: bool,
    pub port: PathBuf,
    pub baud_rate: u32,
    pub font_regular: PathBuf,
    pub font_bold: PathBuf,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: PathBuf::from(DEFAULT_PORT),
            baud_rate: DEFAULT_BAUD_RATE,
            font_regular: PathBuf::from(DEFAULT_FONT_REGULAR),
            font_bold: PathBuf::from(DEFAULT_FONT_BOLD),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
