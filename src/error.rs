//! # Error Types
//!
//! This module defines error types used throughout the ticketera library.

use thiserror::Error;

/// Main error type for ticketera operations
#[derive(Debug, Error)]
pub enum TicketError {
    /// The printer device could not be opened
    #[error("Connection error: {0}")]
    Connection(String),

    /// Transport-level errors after the port is open (write, drain)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Image decoding or processing error
    #[error("Image error: {0}")]
    Image(String),

    /// Remote resource could not be downloaded
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Font loading error
    #[error("Font error: {0}")]
    Font(String),

    /// Rasterization error (SVG parsing, canvas allocation)
    #[error("Render error: {0}")]
    Render(String),

    /// Invalid or unreadable configuration
    #[error("Config error: {0}")]
    Config(String),
}
