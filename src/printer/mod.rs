//! # Printer Module
//!
//! ## Modules
//!
//! - [`config`]: Printer hardware, layout and connection settings
//! - [`job`]: [`TicketPrinter`], the print-ticket entry point

pub mod config;
pub mod job;

pub use config::{ConnectionConfig, PrinterConfig};
pub use job::{PrintOutcome, TicketPrinter, http_client};
