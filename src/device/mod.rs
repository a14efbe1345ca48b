//! # Device Capability Interfaces
//!
//! The seams between the job orchestrator and the platform: the printer
//! command port, the discovery transport, and the radio power-state
//! monitor. Concrete Bluetooth-backed implementations live in
//! [`crate::transport`]; tests substitute in-memory fakes.
//!
//! Every port command returns a [`ResultCode`]. `Success` is the only
//! success value; everything else is a specific error with a stable
//! symbolic name that shows up verbatim in composed error messages.

pub mod status;

use std::fmt;

use crate::config::Configuration;
use crate::protocol::Alignment;
use crate::template::TextFont;

pub use status::StatusSnapshot;

/// Result code returned by every device command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultCode {
    Success,
    ErrParam,
    ErrConnect,
    ErrTimeout,
    ErrMemory,
    ErrIllegal,
    ErrProcessing,
    ErrNotFound,
    ErrInUse,
    ErrTypeInvalid,
    ErrDisconnect,
    ErrAlreadyOpened,
    ErrAlreadyUsed,
    ErrUnsupported,
    ErrFailure,
}

impl ResultCode {
    pub fn is_success(self) -> bool {
        self == ResultCode::Success
    }

    /// Stable symbolic name, used when composing error messages.
    pub fn symbol(self) -> &'static str {
        match self {
            ResultCode::Success => "SUCCESS",
            ResultCode::ErrParam => "ERR_PARAM",
            ResultCode::ErrConnect => "ERR_CONNECT",
            ResultCode::ErrTimeout => "ERR_TIMEOUT",
            ResultCode::ErrMemory => "ERR_MEMORY",
            ResultCode::ErrIllegal => "ERR_ILLEGAL",
            ResultCode::ErrProcessing => "ERR_PROCESSING",
            ResultCode::ErrNotFound => "ERR_NOT_FOUND",
            ResultCode::ErrInUse => "ERR_IN_USE",
            ResultCode::ErrTypeInvalid => "ERR_TYPE_INVALID",
            ResultCode::ErrDisconnect => "ERR_DISCONNECT",
            ResultCode::ErrAlreadyOpened => "ERR_ALREADY_OPENED",
            ResultCode::ErrAlreadyUsed => "ERR_ALREADY_USED",
            ResultCode::ErrUnsupported => "ERR_UNSUPPORTED",
            ResultCode::ErrFailure => "ERR_FAILURE",
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Paper-cut variant for the finalize step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CutKind {
    /// Feed to the cut position, then cut.
    #[default]
    Feed,
    /// Cut at the current position without feeding.
    NoFeed,
}

/// A discovered device, carrying the connection target identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub device_name: String,
    pub target: String,
}

/// Device classes the discovery transport can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceType {
    #[default]
    All,
    Printer,
    Display,
}

/// Discovery filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceFilter {
    pub device_type: DeviceType,
}

impl DeviceFilter {
    /// Filter for printers only.
    pub fn printers() -> Self {
        Self {
            device_type: DeviceType::Printer,
        }
    }
}

/// Radio power state reported by the platform's wireless stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioState {
    PoweredOn,
    PoweredOff,
    Unauthorized,
    Unsupported,
}

/// Callback invoked with the device's asynchronous status report.
/// May fire from an arbitrary notification thread.
pub type StatusListener = Box<dyn Fn(StatusSnapshot) + Send>;

/// Callback invoked when discovery finds a device.
pub type DiscoveryListener = Box<dyn Fn(DeviceInfo) + Send>;

/// Callback invoked when the radio power state is reported.
pub type RadioListener = Box<dyn Fn(RadioState) + Send>;

/// The printer command interface.
///
/// Commands are buffered on the device side until [`send_data`] flushes
/// them; [`clear_command_buffer`] discards anything pending. Each call
/// reports success or a specific error through its [`ResultCode`].
///
/// [`send_data`]: PrinterPort::send_data
/// [`clear_command_buffer`]: PrinterPort::clear_command_buffer
pub trait PrinterPort: Send {
    fn add_text_align(&mut self, alignment: Alignment) -> ResultCode;
    /// Magnification on each axis, 1–8.
    fn add_text_size(&mut self, width: u8, height: u8) -> ResultCode;
    fn add_text_font(&mut self, font: TextFont) -> ResultCode;
    fn add_text(&mut self, text: &str) -> ResultCode;
    fn add_feed_line(&mut self, lines: u8) -> ResultCode;
    fn add_cut(&mut self, cut: CutKind) -> ResultCode;
    fn clear_command_buffer(&mut self);
    fn connect(&mut self, target: &str) -> ResultCode;
    fn disconnect(&mut self) -> ResultCode;
    /// Transmit the buffered commands. The device answers later with an
    /// asynchronous status report through the registered listener.
    fn send_data(&mut self) -> ResultCode;
    fn is_connected(&self) -> bool;
    fn set_status_listener(&mut self, listener: StatusListener);
}

/// The device discovery transport.
pub trait Discovery: Send {
    /// Begin discovery. An already-running scan is restarted. Found
    /// devices are reported through `listener`, possibly from another
    /// thread.
    fn start(&mut self, filter: DeviceFilter, listener: DiscoveryListener) -> ResultCode;
    fn stop(&mut self);
}

/// The wireless-stack power-state provider.
pub trait RadioMonitor: Send {
    /// Register for power-state notifications. Implementations report the
    /// current state promptly after subscription (discovery is started
    /// from that first report), then any later transitions.
    fn subscribe(&mut self, listener: RadioListener);
}

/// Factory for the platform collaborators a [`Printer`](crate::job::Printer)
/// owns. Discovery and radio handles are created fresh for each search and
/// released during cleanup, so the platform hands out new instances on
/// demand.
pub trait Platform: Send {
    fn open_port(&self, configuration: &Configuration) -> Box<dyn PrinterPort>;
    fn discovery(&self) -> Box<dyn Discovery>;
    fn radio(&self) -> Box<dyn RadioMonitor>;
}
