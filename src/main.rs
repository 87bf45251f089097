//! # Ticketera CLI
//!
//! Command-line interface for rendering and printing alert tickets.
//!
//! ## Usage
//!
//! ```bash
//! # Render a follower ticket to preview_follower.png
//! ticketera preview alice
//!
//! # Same, with a specific photo and no avatar lookup
//! ticketera preview alice --photo https://example.com/me.png --out me.png
//!
//! # Print a follower ticket
//! PRINTER_ENABLED=true ticketera follower alice
//!
//! # Print (or preview) an arbitrary JSON block list
//! ticketera print blocks.json
//! ticketera print blocks.json --png blocks.png
//! ```
//!
//! Connection settings come from flags, the environment or a `.env` file.

use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ticketera::{
    ConnectionConfig, PrintOutcome, PrinterConfig, TicketError, TicketPrinter, TicketRaster,
    printer::config::{DEFAULT_BAUD_RATE, DEFAULT_FONT_BOLD, DEFAULT_FONT_REGULAR, DEFAULT_PORT},
    ticket::TicketBlock,
};

/// Ticketera - Alert tickets for thermal receipt printers
#[derive(Parser, Debug)]
#[command(name = "ticketera")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct ConnectionArgs {
    /// Send tickets to the printer (otherwise printing is a no-op)
    #[arg(long, env = "PRINTER_ENABLED", default_value_t = false, action = ArgAction::Set, global = true)]
    enabled: bool,

    /// Printer serial device
    #[arg(long, env = "PRINTER_PORT", default_value = DEFAULT_PORT, global = true)]
    port: PathBuf,

    /// Serial baud rate
    #[arg(long, env = "PRINTER_BAUD", default_value_t = DEFAULT_BAUD_RATE, global = true)]
    baud: u32,

    /// Regular font file
    #[arg(long, env = "PRINTER_FONT_REGULAR", default_value = DEFAULT_FONT_REGULAR, global = true)]
    font_regular: PathBuf,

    /// Bold font file
    #[arg(long, env = "PRINTER_FONT_BOLD", default_value = DEFAULT_FONT_BOLD, global = true)]
    font_bold: PathBuf,

    /// JSON file overriding printer settings
    #[arg(long, env = "PRINTER_CONFIG", global = true)]
    config: Option<PathBuf>,
}

impl ConnectionArgs {
    fn connection(&self) -> ConnectionConfig {
        ConnectionConfig {
            enabled: self.enabled,
            port: self.port.clone(),
            baud_rate: self.baud,
            font_regular: self.font_regular.clone(),
            font_bold: self.font_bold.clone(),
        }
    }

    fn printer_config(&self) -> Result<PrinterConfig, TicketError> {
        match &self.config {
            Some(path) => PrinterConfig::load(path),
            None => Ok(PrinterConfig::default()),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a follower ticket to a PNG file
    Preview {
        /// Follower username
        name: String,

        /// Photo URL (skips the avatar lookup)
        #[arg(long, value_name = "URL")]
        photo: Option<String>,

        /// Don't look up the follower's avatar
        #[arg(long)]
        no_avatar: bool,

        /// Output file
        #[arg(long, value_name = "FILE", default_value = "preview_follower.png")]
        out: PathBuf,
    },

    /// Print a follower ticket
    Follower {
        /// Follower username
        name: String,

        /// Photo URL (skips the avatar lookup)
        #[arg(long, value_name = "URL")]
        photo: Option<String>,

        /// Don't look up the follower's avatar
        #[arg(long)]
        no_avatar: bool,
    },

    /// Print a JSON block list
    Print {
        /// JSON file with an array of blocks
        blocks: PathBuf,

        /// Output to PNG file instead of printing
        #[arg(long, value_name = "FILE")]
        png: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), TicketError> {
    let cli = Cli::parse();
    let printer = TicketPrinter::from_connection(
        &cli.connection.connection(),
        cli.connection.printer_config()?,
    )?;

    match cli.command {
        Commands::Preview {
            name,
            photo,
            no_avatar,
            out,
        } => {
            let blocks = printer.follower_blocks(&name, photo, !no_avatar).await;
            let raster = printer.render(&blocks).await?;
            save_preview(&printer, &raster, &out)?;
        }

        Commands::Follower {
            name,
            photo,
            no_avatar,
        } => {
            let blocks = printer.follower_blocks(&name, photo, !no_avatar).await;
            report(printer.print_ticket(&blocks).await?);
        }

        Commands::Print { blocks, png } => {
            let json = tokio::fs::read_to_string(&blocks).await.map_err(|e| {
                TicketError::Config(format!("Failed to read {}: {}", blocks.display(), e))
            })?;
            let blocks: Vec<TicketBlock> = serde_json::from_str(&json)
                .map_err(|e| TicketError::Config(format!("Invalid block list: {}", e)))?;

            match png {
                Some(path) => {
                    let raster = printer.render(&blocks).await?;
                    save_preview(&printer, &raster, &path)?;
                }
                None => report(printer.print_ticket(&blocks).await?),
            }
        }
    }

    Ok(())
}

fn save_preview(printer: &TicketPrinter, raster: &TicketRaster, path: &Path) -> Result<(), TicketError> {
    raster.save_preview(path, printer.config().width)?;
    println!(
        "Wrote {} ({}x{})",
        path.display(),
        raster.width,
        raster.height
    );
    Ok(())
}

fn report(outcome: PrintOutcome) {
    match outcome {
        PrintOutcome::Printed => println!("Printed."),
        PrintOutcome::Dropped => println!("Printer busy, ticket dropped."),
        PrintOutcome::Disabled => println!("Printing disabled (set PRINTER_ENABLED=true)."),
    }
}
