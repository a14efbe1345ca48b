//! # Recibo CLI
//!
//! Command-line interface for printing a demo receipt over Bluetooth.
//!
//! ## Usage
//!
//! ```bash
//! # Print the demo receipt via the first bound RFCOMM device
//! recibo print
//!
//! # Print via a specific device node
//! recibo print --device /dev/rfcomm1
//!
//! # Print for a different printer model
//! recibo print --series t88
//!
//! # Show what the receipt looks like without a printer
//! recibo preview
//! ```

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use recibo::config::Configuration;
use recibo::error::ReciboError;
use recibo::job::{Printer, PrinterEventDelegate};
use recibo::receipt;
use recibo::transport::BluezPlatform;

/// Recibo - thermal receipt printing utility
#[derive(Parser, Debug)]
#[command(name = "recibo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the demo receipt to a Bluetooth printer
    Print {
        /// RFCOMM device path (defaults to scanning /dev/rfcommN)
        #[arg(long)]
        device: Option<String>,

        /// Printer series (e.g. "m30ii", "t88")
        #[arg(long, default_value = "m30ii")]
        series: String,

        /// Order number shown on the receipt
        #[arg(long, default_value = "30003")]
        order: u32,
    },
    /// Render the demo receipt as text without printing
    Preview {
        /// Order number shown on the receipt
        #[arg(long, default_value = "30003")]
        order: u32,
    },
}

/// Outcome of one print job, relayed from the delegate callbacks.
enum Outcome {
    Success,
    Error(String),
}

struct ChannelDelegate(mpsc::UnboundedSender<Outcome>);

impl PrinterEventDelegate for ChannelDelegate {
    fn on_error(&self, message: &str) {
        let _ = self.0.send(Outcome::Error(message.to_string()));
    }
    fn on_success_printed(&self) {
        let _ = self.0.send(Outcome::Success);
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("Error: {message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Commands::Preview { order } => {
            for template in receipt::demo_receipt(order) {
                print!("{}", template.kind.value());
                if template.line_break_after {
                    println!();
                }
            }
            Ok(())
        }
        Commands::Print {
            device,
            series,
            order,
        } => {
            let series = Configuration::parse_series(&series)?;
            let configuration = Configuration {
                series,
                ..Configuration::m30ii()
            };

            let platform = match device {
                Some(device) => BluezPlatform::with_device(device),
                None => BluezPlatform::new(),
            };

            let (tx, mut rx) = mpsc::unbounded_channel();
            let printer = Printer::new(
                configuration.clone(),
                Box::new(platform),
                Arc::new(ChannelDelegate(tx)),
            );

            set_template_when_ready(&printer, order, configuration.probe_grace).await?;
            printer
                .print()
                .await
                .map_err(|err| err.to_string())?;

            println!("Printing...");
            match rx.recv().await {
                Some(Outcome::Success) => {
                    println!("Printed.");
                    Ok(())
                }
                Some(Outcome::Error(message)) => Err(message),
                None => Err("printer task stopped unexpectedly".to_string()),
            }
        }
    }
}

/// The device handle only exists once the startup permission probe has
/// settled, so retry setup errors for a while before giving up.
async fn set_template_when_ready(
    printer: &Printer,
    order: u32,
    probe_grace: Duration,
) -> Result<(), String> {
    let deadline = tokio::time::Instant::now() + probe_grace * 3;
    loop {
        match printer.set_template(receipt::demo_receipt(order)).await {
            Ok(()) => return Ok(()),
            Err(ReciboError::Setup(_)) if tokio::time::Instant::now() < deadline => {
                tokio::time::sleep(Duration::from_millis(250)).await;
            }
            Err(err) => return Err(err.to_string()),
        }
    }
}
