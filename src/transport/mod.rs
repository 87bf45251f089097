//! # Printer Transport Layer
//!
//! - [`spool`]: the port seam ([`PrinterPort`], [`Connector`]) and the
//!   single-job [`Spooler`]
//! - [`serial`]: serial/RFCOMM device backend
//!
//! Tests plug an in-memory [`Connector`] into the spooler; no hardware is
//! needed.

pub mod serial;
pub mod spool;

pub use serial::{SerialConnector, SerialPort};
pub use spool::{Connector, PrintSlot, PrinterPort, Spooler};
