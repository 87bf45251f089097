//! # Print Spooler
//!
//! Drives one ticket through the device and enforces that only one ticket
//! holds the printer at a time.
//!
//! ## Job Sequence
//!
//! ```text
//! open ─→ ESC @ ─→ [ESC 7] ─→ chunk 0 ─→ drain ─→ sleep ─→ ... ─→ ESC J n ─→ close
//! ```
//!
//! - Open failure aborts the job before any byte is written.
//! - The port is always closed, whether writing succeeded or not. A close
//!   failure is logged and never replaces the job's own result.
//!
//! ## Gate
//!
//! The spooler owns a single-permit semaphore. A job claims it with
//! [`Spooler::try_claim`] before doing any work; a ticket arriving while the
//! permit is held is dropped, never queued. The permit is released when the
//! returned [`PrintSlot`] goes out of scope.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::error::TicketError;
use crate::printer::config::DeviceSettings;
use crate::protocol::{commands, graphics};
use crate::render::raster::TicketRaster;

/// An open connection to the printer.
#[async_trait]
pub trait PrinterPort: Send {
    /// Write all bytes.
    async fn write(&mut self, data: &[u8]) -> Result<(), TicketError>;
    /// Wait until every written byte has left the host.
    async fn drain(&mut self) -> Result<(), TicketError>;
    async fn close(&mut self) -> Result<(), TicketError>;
}

/// Opens printer connections.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn open(&self) -> Result<Box<dyn PrinterPort>, TicketError>;
}

/// Proof that the caller holds the printer.
#[derive(Debug)]
pub struct PrintSlot {
    _permit: OwnedSemaphorePermit,
}

/// Single-job print spooler.
pub struct Spooler {
    gate: Arc<Semaphore>,
    connector: Box<dyn Connector>,
    settings: DeviceSettings,
}

impl Spooler {
    pub fn new<C: Connector + 'static>(connector: C, settings: DeviceSettings) -> Self {
        Self {
            gate: Arc::new(Semaphore::new(1)),
            connector: Box::new(connector),
            settings,
        }
    }

    /// Claim the printer, or `None` if another job holds it.
    pub fn try_claim(&self) -> Option<PrintSlot> {
        Arc::clone(&self.gate)
            .try_acquire_owned()
            .ok()
            .map(|permit| PrintSlot { _permit: permit })
    }

    /// True while a job holds the printer.
    pub fn is_busy(&self) -> bool {
        self.gate.available_permits() == 0
    }

    /// Send a rendered ticket.
    ///
    /// The slot is held for the whole sequence and released on return.
    pub async fn send(&self, slot: PrintSlot, raster: &TicketRaster) -> Result<(), TicketError> {
        let chunks = graphics::frame_raster(
            &raster.data,
            raster.width,
            raster.height,
            self.settings.chunk_rows,
        );

        let mut port = self.connector.open().await?;
        let result = self.write_job(port.as_mut(), &chunks).await;

        if let Err(e) = port.close().await {
            tracing::warn!(error = %e, "failed to close printer port");
        }
        drop(slot);

        if result.is_ok() {
            tracing::info!(
                width = raster.width,
                height = raster.height,
                chunks = chunks.len(),
                "ticket sent"
            );
        }
        result
    }

    async fn write_job(&self, port: &mut dyn PrinterPort, chunks: &[Vec<u8>]) -> Result<(), TicketError> {
        port.write(&commands::init()).await?;
        if self.settings.send_heat {
            let [dots, time, interval] = self.settings.heat;
            port.write(&commands::heat_settings(dots, time, interval)).await?;
        }

        let delay = self.settings.chunk_delay();
        for (index, chunk) in chunks.iter().enumerate() {
            port.write(chunk).await?;
            port.drain().await?;
            tracing::debug!(index, bytes = chunk.len(), "chunk written");
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        port.write(&commands::feed_dots(self.settings.tail_feed_dots)).await?;
        port.drain().await
    }
}

// ============================================================================
// TESTS
// ============================================================================
