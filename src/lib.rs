//! # Ticketera - Alert Tickets for Thermal Receipt Printers
//!
//! Ticketera turns stream alerts (a new follower, for instance) into printed
//! receipt tickets on a 58mm ESC/POS thermal printer. It provides:
//!
//! - **Layout**: titles, text and photos flowed top to bottom
//! - **Dithering**: Floyd-Steinberg and ordered Bayer for photos
//! - **Protocol**: `GS v 0` raster framing in device-sized chunks
//! - **Transport**: serial/RFCOMM spooling with a single-job gate
//!
//! ## Quick Start
//!
//! ```no_run
//! use ticketera::{ConnectionConfig, PrinterConfig, TicketPrinter, ticket::TicketBlock};
//!
//! # async fn run() -> Result<(), ticketera::TicketError> {
//! let connection = ConnectionConfig {
//!     enabled: true,
//!     ..Default::default()
//! };
//! let printer = TicketPrinter::from_connection(&connection, PrinterConfig::default())?;
//!
//! let blocks = vec![
//!     TicketBlock::title("HELLO"),
//!     TicketBlock::text("Printed from Rust"),
//! ];
//! printer.print_ticket(&blocks).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`ticket`] | Block model, layout engine, follower ticket |
//! | [`render`] | Dithering, photo pipeline, rasterizer |
//! | [`font`] | Font catalog and glyph outlines |
//! | [`protocol`] | ESC/POS command builders |
//! | [`transport`] | Serial port and print spooler |
//! | [`printer`] | Configuration and the print entry point |
//! | [`error`] | Error types |

pub mod error;
pub mod font;
pub mod printer;
pub mod protocol;
pub mod render;
pub mod ticket;
pub mod transport;

// Re-exports for convenience
pub use error::TicketError;
pub use font::FontCatalog;
pub use printer::{ConnectionConfig, PrintOutcome, PrinterConfig, TicketPrinter};
pub use render::raster::TicketRaster;
