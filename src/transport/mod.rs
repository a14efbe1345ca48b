//! # Printer Transport Layer
//!
//! Concrete implementations of the device capability interfaces in
//! [`crate::device`].
//!
//! ## Available Transports
//!
//! - [`bluetooth`]: Bluetooth SPP via an RFCOMM device node (Linux),
//!   plus RFCOMM-based discovery and a BlueZ radio monitor.
//!
//! ## Future Transports
//!
//! - USB serial
//! - Network (TCP/IP)

pub mod bluetooth;

pub use bluetooth::{BluetoothPort, BluezPlatform, BluezRadio, RfcommDiscovery};
