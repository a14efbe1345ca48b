//! # Recibo - Thermal Receipt Print Jobs
//!
//! Recibo drives Epson TM-series thermal receipt printers over Bluetooth.
//! It provides:
//!
//! - **Templates**: a declarative receipt model with two-sided rows and
//!   recursive column wrapping
//! - **Protocol**: ESC/POS command builders
//! - **Job lifecycle**: discovery, connection, transmission, and status
//!   interpretation behind a single delegate callback
//! - **Transport**: Bluetooth RFCOMM communication (Linux)
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use recibo::{
//!     config::Configuration,
//!     job::{Printer, PrinterEventDelegate},
//!     receipt,
//!     transport::BluezPlatform,
//! };
//!
//! struct LogDelegate;
//!
//! impl PrinterEventDelegate for LogDelegate {
//!     fn on_error(&self, message: &str) {
//!         eprintln!("print failed: {message}");
//!     }
//!     fn on_success_printed(&self) {
//!         println!("printed!");
//!     }
//! }
//!
//! # async fn print() -> Result<(), recibo::ReciboError> {
//! let printer = Printer::new(
//!     Configuration::m30ii(),
//!     Box::new(BluezPlatform::with_device("/dev/rfcomm0")),
//!     Arc::new(LogDelegate),
//! );
//!
//! // The device handle exists once the startup permission probe settles.
//! tokio::time::sleep(Configuration::m30ii().probe_grace * 2).await;
//!
//! printer.set_template(receipt::demo_receipt(30003)).await?;
//! printer.print().await?;
//! // The job's outcome arrives through the delegate.
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`template`] | Receipt template model |
//! | [`layout`] | Fixed-width column layout and wrapping |
//! | [`render`] | Template-to-device-command rendering |
//! | [`job`] | Print job lifecycle state machine |
//! | [`device`] | Device capability interfaces |
//! | [`protocol`] | ESC/POS command builders |
//! | [`transport`] | Bluetooth RFCOMM backend |
//! | [`config`] | Printer model configuration |
//! | [`strings`] | Error message string tables |
//! | [`error`] | Error types |
//!
//! ## Supported Printers
//!
//! Currently tested with:
//! - Epson TM-m30II (80mm paper, Bluetooth)
//!
//! Other TM-series printers speaking ESC/POS should work with the
//! appropriate [`config::Configuration`].

pub mod config;
pub mod device;
pub mod error;
pub mod job;
pub mod layout;
pub mod protocol;
pub mod receipt;
pub mod render;
pub mod strings;
pub mod template;
pub mod transport;

// Re-exports for convenience
pub use config::Configuration;
pub use error::ReciboError;
pub use job::{Printer, PrinterEventDelegate};
pub use template::Template;
