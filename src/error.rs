//! # Error Types
//!
//! This module defines error types used throughout the recibo library.
//!
//! Failures that occur after a print job is in flight (discovery,
//! connection, transmission, and device status problems) are reported as
//! composed human-readable messages through the
//! [`PrinterEventDelegate`](crate::job::PrinterEventDelegate); this enum
//! covers the operations that return a `Result` to the caller.

use thiserror::Error;

use crate::device::ResultCode;

/// Main error type for recibo operations
#[derive(Debug, Error)]
pub enum ReciboError {
    /// No device handle exists yet (the permission probe has not settled).
    #[error("{0}")]
    Setup(String),

    /// A device command returned a non-success result code.
    #[error("{method} failed with {code} {reason}")]
    Command {
        method: &'static str,
        code: ResultCode,
        reason: String,
    },

    /// A print job is already in flight on this printer.
    #[error("a print job is already in progress")]
    Busy,

    /// The printer control task has shut down.
    #[error("printer control task is gone")]
    ChannelClosed,
}

impl ReciboError {
    /// Command error with no free-form reason.
    pub(crate) fn command(method: &'static str, code: ResultCode) -> Self {
        Self::Command {
            method,
            code,
            reason: String::new(),
        }
    }
}
