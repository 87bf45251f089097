//! # Ticket Printer
//!
//! The public entry point: blocks in, paper out.
//!
//! ```text
//! try_claim ─→ layout ─→ rasterize ─→ frame ─→ spool
//!    │
//!    └─ held by another job → Dropped (warn)
//! ```
//!
//! [`TicketPrinter::print_ticket`] reports every failure to its caller.
//! Alert handlers use [`TicketPrinter::spawn_print_ticket`] or
//! [`TicketPrinter::spawn_follower_ticket`] instead, which log failures and
//! never propagate them.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use super::config::{ConnectionConfig, PrinterConfig};
use crate::error::TicketError;
use crate::font::{FontCatalog, TextShaper};
use crate::render::raster::{self, TicketRaster};
use crate::ticket::{self, LayoutContext, TicketBlock};
use crate::transport::{SerialConnector, Spooler};

/// Timeout for avatar lookups and photo downloads.
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// What happened to a ticket handed to [`TicketPrinter::print_ticket`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintOutcome {
    /// Sent to the device.
    Printed,
    /// Another ticket held the printer; this one was discarded.
    Dropped,
    /// Printing is switched off.
    Disabled,
}

/// HTTP client used for photo downloads and avatar lookups.
pub fn http_client() -> Result<reqwest::Client, TicketError> {
    reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(|e| TicketError::Config(format!("Failed to build HTTP client: {}", e)))
}

/// Renders tickets and sends them to a single printer.
pub struct TicketPrinter {
    shaper: Arc<dyn TextShaper>,
    config: PrinterConfig,
    spooler: Spooler,
    client: reqwest::Client,
    enabled: bool,
}

impl TicketPrinter {
    pub fn new(
        shaper: Arc<dyn TextShaper>,
        config: PrinterConfig,
        spooler: Spooler,
        client: reqwest::Client,
    ) -> Self {
        Self {
            shaper,
            config,
            spooler,
            client,
            enabled: true,
        }
    }

    /// Build a printer on the configured serial port.
    ///
    /// Fonts are loaded here; a missing font is fatal.
    pub fn from_connection(connection: &ConnectionConfig, config: PrinterConfig) -> Result<Self, TicketError> {
        let fonts = FontCatalog::load(&connection.font_regular, &connection.font_bold)?;
        let connector = SerialConnector::new(&connection.port, connection.baud_rate);
        let spooler = Spooler::new(connector, config.printer);

        tracing::info!(
            port = %connection.port.display(),
            baud_rate = connection.baud_rate,
            enabled = connection.enabled,
            "printer configured"
        );

        Ok(Self::new(Arc::new(fonts), config, spooler, http_client()?).with_enabled(connection.enabled))
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn config(&self) -> &PrinterConfig {
        &self.config
    }

    /// Render and print a ticket.
    ///
    /// The printer is claimed before any rendering starts, so a dropped
    /// ticket costs nothing. Nothing reaches the device unless the whole
    /// ticket rendered successfully.
    pub async fn print_ticket(&self, blocks: &[TicketBlock]) -> Result<PrintOutcome, TicketError> {
        if !self.enabled {
            tracing::debug!(blocks = blocks.len(), "printing disabled, ticket skipped");
            return Ok(PrintOutcome::Disabled);
        }

        let Some(slot) = self.spooler.try_claim() else {
            tracing::warn!(blocks = blocks.len(), "printer busy, ticket dropped");
            return Ok(PrintOutcome::Dropped);
        };

        let raster = self.render(blocks).await?;
        self.spooler.send(slot, &raster).await?;
        Ok(PrintOutcome::Printed)
    }

    /// Lay out and rasterize without touching the device.
    pub async fn render(&self, blocks: &[TicketBlock]) -> Result<TicketRaster, TicketError> {
        let ctx = LayoutContext {
            config: &self.config,
            shaper: self.shaper.as_ref(),
            client: &self.client,
        };
        let layout = ticket::layout_ticket(blocks, &ctx).await?;
        let settings = self.config.raster;

        let raster = tokio::task::spawn_blocking(move || raster::rasterize(&layout, &settings))
            .await
            .map_err(|e| TicketError::Render(format!("Raster task failed: {}", e)))??;

        tracing::debug!(width = raster.width, height = raster.height, "ticket rendered");
        Ok(raster)
    }

    /// Follower ticket blocks.
    ///
    /// `photo` wins over the avatar lookup; the lookup only runs when
    /// `lookup_avatar` is set.
    pub async fn follower_blocks(
        &self,
        username: &str,
        photo: Option<String>,
        lookup_avatar: bool,
    ) -> Vec<TicketBlock> {
        let avatar = match photo {
            Some(url) => Some(url),
            None if lookup_avatar => ticket::kick_avatar(&self.client, username).await,
            None => None,
        };
        ticket::follower_ticket(username, avatar.as_deref(), &self.config)
    }

    /// Print a ticket in the background.
    ///
    /// Failures are logged, never returned: an alert handler must keep
    /// running whatever the printer does.
    pub fn spawn_print_ticket(self: &Arc<Self>, blocks: Vec<TicketBlock>) -> JoinHandle<()> {
        let printer = Arc::clone(self);
        tokio::spawn(async move {
            printer.print_logged(&blocks, "ticket").await;
        })
    }

    /// Print a follower ticket in the background, looking up the avatar first.
    pub fn spawn_follower_ticket(self: &Arc<Self>, username: impl Into<String>) -> JoinHandle<()> {
        let printer = Arc::clone(self);
        let username = username.into();
        tokio::spawn(async move {
            let blocks = printer.follower_blocks(&username, None, true).await;
            printer.print_logged(&blocks, &username).await;
        })
    }

    async fn print_logged(&self, blocks: &[TicketBlock], label: &str) {
        match self.print_ticket(blocks).await {
            Ok(outcome) => tracing::info!(label, ?outcome, "ticket handled"),
            Err(e) => tracing::error!(label, error = %e, "ticket failed"),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{TextMetrics, Weight};
    use crate::printer::config::DeviceSettings;
    use crate::transport::spool::tests::{Event, RecordingConnector};
    use pretty_assertions::assert_eq;

    struct BoxShaper;

    impl TextShaper for BoxShaper {
        fn measure(&self, text: &str, font_size: f32, _weight: Weight) -> TextMetrics {
            TextMetrics {
                width: text.chars().count() as f32 * font_size / 2.0,
                height: font_size,
            }
        }

        fn glyph_path(&self, text: &str, x: f32, y: f32, font_size: f32, weight: Weight) -> String {
            let m = self.measure(text, font_size, weight);
            format!(
                r#"<path fill="black" d="M{x} {y}L{r} {y}L{r} {b}L{x} {b}Z"/>"#,
                x = x,
                y = y,
                r = x + m.width,
                b = y + m.height
            )
        }
    }

    fn printer(connector: RecordingConnector) -> TicketPrinter {
        let config = PrinterConfig {
            printer: DeviceSettings {
                chunk_delay_ms: 0,
                ..DeviceSettings::default()
            },
            ..PrinterConfig::default()
        };
        let spooler = Spooler::new(connector, config.printer);
        TicketPrinter::new(Arc::new(BoxShaper), config, spooler, reqwest::Client::new())
    }

    #[tokio::test]
    async fn test_render_dimensions() {
        let printer = printer(RecordingConnector::default());
        let raster = printer.render(&[TicketBlock::title("HI")]).await.unwrap();
        assert_eq!(raster.width, 384);
        // 12 top + 24 title + 8 bottom
        assert_eq!(raster.height, 44);
        assert!(raster.data.contains(&0));
    }

    #[tokio::test]
    async fn test_print_sends_to_device() {
        let connector = RecordingConnector::default();
        let printer = printer(connector.clone());

        let outcome = printer.print_ticket(&[TicketBlock::text("hello")]).await.unwrap();
        assert_eq!(outcome, PrintOutcome::Printed);

        let events = connector.events();
        assert_eq!(events.first(), Some(&Event::Open));
        assert_eq!(events[1], Event::Write(vec![0x1B, 0x40]));
        assert_eq!(events.last(), Some(&Event::Close));
    }

    #[tokio::test]
    async fn test_disabled_is_noop() {
        let connector = RecordingConnector::default();
        let printer = printer(connector.clone()).with_enabled(false);

        let outcome = printer.print_ticket(&[TicketBlock::text("hello")]).await.unwrap();
        assert_eq!(outcome, PrintOutcome::Disabled);
        assert!(connector.events().is_empty());
    }

    #[tokio::test]
    async fn test_busy_printer_drops_ticket() {
        let connector = RecordingConnector::default();
        let printer = printer(connector.clone());

        let slot = printer.spooler.try_claim().unwrap();
        let outcome = printer.print_ticket(&[TicketBlock::text("hello")]).await.unwrap();
        assert_eq!(outcome, PrintOutcome::Dropped);
        assert!(connector.events().is_empty());
        drop(slot);
    }

    #[tokio::test]
    async fn test_photo_failure_sends_nothing() {
        let connector = RecordingConnector::default();
        let printer = printer(connector.clone());

        let blocks = [
            TicketBlock::title("HI"),
            TicketBlock::photo(ticket::PhotoSource::Bytes(b"not an image".to_vec())),
        ];
        let result = printer.print_ticket(&blocks).await;
        assert!(matches!(result, Err(TicketError::Image(_))));
        assert!(connector.events().is_empty());
        assert!(!printer.spooler.is_busy());
    }

    #[tokio::test]
    async fn test_spawned_ticket_prints() {
        let connector = RecordingConnector::default();
        let printer = Arc::new(printer(connector.clone()));

        let handle = printer.spawn_print_ticket(vec![TicketBlock::text("hello")]);
        assert!(handle.await.is_ok());

        let events = connector.events();
        assert_eq!(events.first(), Some(&Event::Open));
        assert_eq!(events.last(), Some(&Event::Close));
        assert!(!printer.spooler.is_busy());
    }

    #[tokio::test]
    async fn test_spawned_ticket_failure_is_contained() {
        let connector = RecordingConnector::default();
        let printer = Arc::new(printer(connector.clone()));

        let handle = printer.spawn_print_ticket(vec![
            TicketBlock::title("HI"),
            TicketBlock::photo(ticket::PhotoSource::Bytes(b"not an image".to_vec())),
        ]);
        assert!(handle.await.is_ok());
        assert!(connector.events().is_empty());
        assert!(!printer.spooler.is_busy());
    }

    #[tokio::test]
    async fn test_follower_blocks_with_explicit_photo() {
        let printer = printer(RecordingConnector::default());
        let blocks = printer
            .follower_blocks("alice", Some("https://example.com/a.png".to_string()), false)
            .await;
        assert_eq!(blocks.len(), 5);

        let blocks = printer.follower_blocks("alice", None, false).await;
        assert_eq!(blocks.len(), 4);
    }
}
