//! # Struk CLI
//!
//! Command-line interface for retribution receipt printing over Bluetooth LE.
//!
//! ## Usage
//!
//! ```bash
//! # Print the built-in sample receipt on the nearest printer
//! struk print --sample
//!
//! # Print a receipt from JSON, choosing the printer from a list
//! struk print receipt.json --pick
//!
//! # Print on an 80mm printer whose name contains "MTP"
//! struk print receipt.json --printer 80mm --device MTP
//!
//! # Serve the HTTP print API
//! struk serve --listen 0.0.0.0:8080
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `struk=info,tower_http=info`).

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use struk::{
    PrinterConfig, PrinterConnection, ReceiptData, ReceiptLayout, StrukError,
    receipt::current_date,
    server::{self, ServerConfig},
    transport::{BtleplugHost, DeviceChooser, ScanOptions, TransportConfig},
};

/// Struk - Receipt printing on Bluetooth LE thermal printers
#[derive(Parser, Debug)]
#[command(name = "struk")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print one receipt
    Print {
        /// Receipt JSON file
        #[arg(value_name = "RECEIPT.json", required_unless_present = "sample")]
        receipt: Option<PathBuf>,

        /// Print the built-in sample receipt
        #[arg(long, conflicts_with = "receipt")]
        sample: bool,

        #[command(flatten)]
        ble: BleArgs,
    },

    /// Run the HTTP print API
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8080")]
        listen: String,

        #[command(flatten)]
        ble: BleArgs,
    },
}

/// Printer, selection and transfer options shared by all commands.
#[derive(Args, Debug)]
struct BleArgs {
    /// Printer profile (58mm or 80mm)
    #[arg(long, default_value = "58mm", value_parser = PrinterConfig::parse)]
    printer: PrinterConfig,

    /// Use the first printer whose name contains this text, or whose address matches
    #[arg(long, value_name = "SUBSTR", conflicts_with = "pick")]
    device: Option<String>,

    /// Choose the printer from a list
    #[arg(long)]
    pick: bool,

    /// Seconds to scan per selection strategy
    #[arg(long, default_value = "4")]
    scan_secs: u64,

    /// Seconds to wait for connect and service discovery
    #[arg(long, default_value = "10")]
    connect_timeout_secs: u64,

    /// Bytes per BLE write (defaults to the printer profile)
    #[arg(long)]
    chunk_bytes: Option<usize>,

    /// Pause between BLE writes, in milliseconds
    #[arg(long, default_value = "0")]
    chunk_delay_ms: u64,

    /// First header line
    #[arg(long)]
    header_top: Option<String>,

    /// Second header line
    #[arg(long)]
    header_bottom: Option<String>,
}

impl BleArgs {
    fn scan_options(&self) -> ScanOptions {
        let chooser = match (&self.device, self.pick) {
            (Some(needle), _) => DeviceChooser::Matching(needle.clone()),
            (None, true) => DeviceChooser::Prompt,
            (None, false) => DeviceChooser::First,
        };
        ScanOptions {
            scan_duration: Duration::from_secs(self.scan_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            chooser,
            ..ScanOptions::default()
        }
    }

    fn transport_config(&self) -> TransportConfig {
        let mut config = TransportConfig::for_printer(&self.printer);
        if let Some(bytes) = self.chunk_bytes {
            config.max_chunk_bytes = bytes;
        }
        config.chunk_delay = Duration::from_millis(self.chunk_delay_ms);
        config
    }

    fn layout(&self) -> ReceiptLayout {
        let mut layout = ReceiptLayout::for_printer(&self.printer);
        if let Some(top) = &self.header_top {
            layout.header[0] = top.clone();
        }
        if let Some(bottom) = &self.header_bottom {
            layout.header[1] = bottom.clone();
        }
        layout
    }

    async fn connect(&self) -> Result<PrinterConnection<BtleplugHost>, StrukError> {
        let config = self.transport_config();
        let host = BtleplugHost::new(self.scan_options()).await;
        PrinterConnection::with_config(host, config, self.layout())
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("struk=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        match e {
            StrukError::Print(e) => eprintln!("Error: {}", e.user_message()),
            other => eprintln!("Error: {}", other),
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StrukError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Print {
            receipt,
            sample,
            ble,
        } => {
            let data = match (receipt, sample) {
                (_, true) => ReceiptData {
                    date: current_date(),
                    ..ReceiptData::sample()
                },
                (Some(path), false) => ReceiptData::load(path)?,
                (None, false) => {
                    return Err(StrukError::Config(
                        "a receipt file or --sample is required".to_string(),
                    ));
                }
            };

            let mut printer = ble.connect().await?;
            let result = printer.print(&data).await;
            printer.reset().await;

            match result {
                Ok(()) => {
                    println!("Printed receipt {}", data.bill_number);
                    Ok(())
                }
                Err(e) if e.is_cancellation() => {
                    println!("{}", e.user_message());
                    Ok(())
                }
                Err(e) => Err(e.into()),
            }
        }

        Commands::Serve { listen, ble } => {
            let printer = ble.connect().await?;
            server::serve(ServerConfig { listen_addr: listen }, printer).await
        }
    }
}
