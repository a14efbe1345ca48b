//! # Bluetooth RFCOMM Transport
//!
//! Communication with Epson TM-series printers over Bluetooth Serial
//! Port Profile (SPP) via RFCOMM.
//!
//! ## Bluetooth Setup (Linux)
//!
//! Before this transport can connect, the printer must be paired and
//! bound to an RFCOMM device:
//!
//! ```bash
//! # 1. Find the printer's Bluetooth address
//! $ bluetoothctl
//! [bluetooth]# scan on
//! # Look for "TM-m30II" and note the address, e.g. 00:01:90:XX:XX:XX
//!
//! # 2. Pair with the printer
//! [bluetooth]# pair 00:01:90:XX:XX:XX
//!
//! # 3. Bind to an RFCOMM device
//! $ sudo rfcomm bind 0 00:01:90:XX:XX:XX
//! # This creates /dev/rfcomm0
//! ```
//!
//! ## TTY Configuration
//!
//! The RFCOMM device is opened in raw mode so command bytes pass through
//! unmodified: no input/output processing, 8-bit characters, no echo, no
//! canonical mode, and no XON/XOFF flow control (0x11/0x13 are valid
//! command bytes).
//!
//! ## Chunked Writes
//!
//! Large buffers are written in chunks with a small delay between them to
//! avoid overrunning the printer's Bluetooth receive buffer.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::Configuration;
use crate::device::status::StatusSnapshot;
use crate::device::{
    CutKind, DeviceFilter, DeviceInfo, Discovery, DiscoveryListener, Platform, PrinterPort,
    RadioListener, RadioMonitor, RadioState, ResultCode, StatusListener,
};
use crate::protocol;
use crate::template::TextFont;

/// Default RFCOMM device path
pub const DEFAULT_DEVICE: &str = "/dev/rfcomm0";

/// Chunk size for writes (bytes)
const CHUNK_SIZE: usize = 4096;

/// Delay between chunks (milliseconds)
const CHUNK_DELAY_MS: u64 = 2;

/// How often discovery re-checks for a bound RFCOMM node (milliseconds)
const DISCOVERY_POLL_MS: u64 = 500;

/// # Bluetooth Printer Port
///
/// A [`PrinterPort`] backed by an RFCOMM device node. Commands accumulate
/// in a local buffer as protocol bytes; [`send_data`](PrinterPort::send_data)
/// flushes the buffer over the link in chunks.
///
/// The SPP link here is write-only, so no status report ever comes back
/// from the wire. A transmission that reaches the device cleanly is
/// answered with an all-clear snapshot through the registered status
/// listener; a transmission that fails surfaces through its result code
/// instead.
pub struct BluetoothPort {
    buffer: Vec<u8>,
    file: Option<File>,
    chunk_size: usize,
    chunk_delay: Duration,
    listener: Option<StatusListener>,
}

impl BluetoothPort {
    pub fn new() -> Self {
        Self {
            buffer: protocol::init(),
            file: None,
            chunk_size: CHUNK_SIZE,
            chunk_delay: Duration::from_millis(CHUNK_DELAY_MS),
            listener: None,
        }
    }

    /// Set the chunk size for large writes.
    ///
    /// Larger chunks are faster but may overflow the Bluetooth buffer.
    pub fn set_chunk_size(&mut self, size: usize) {
        self.chunk_size = size;
    }

    /// Set the delay between chunks.
    pub fn set_chunk_delay(&mut self, delay: Duration) {
        self.chunk_delay = delay;
    }

    /// Resolve a connection target to a device path.
    ///
    /// Accepts `BT:XX:XX:XX:XX:XX:XX` (looked up among bound RFCOMM
    /// nodes) or a literal device path such as `/dev/rfcomm0`.
    fn resolve_target(target: &str) -> Option<String> {
        if let Some(mac) = target.strip_prefix("BT:") {
            if !is_valid_mac(mac) {
                return None;
            }
            return find_rfcomm_for_mac(mac);
        }
        if target.starts_with("/dev/") {
            return Some(target.to_string());
        }
        None
    }

    fn write_chunked(&mut self, data: &[u8]) -> io::Result<()> {
        let Some(file) = self.file.as_mut() else {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "not connected"));
        };
        if data.len() <= self.chunk_size {
            file.write_all(data)?;
        } else {
            for chunk in data.chunks(self.chunk_size) {
                file.write_all(chunk)?;
                if !self.chunk_delay.is_zero() {
                    thread::sleep(self.chunk_delay);
                }
            }
        }
        file.flush()
    }
}

impl Default for BluetoothPort {
    fn default() -> Self {
        Self::new()
    }
}

impl PrinterPort for BluetoothPort {
    fn add_text_align(&mut self, alignment: protocol::Alignment) -> ResultCode {
        self.buffer.extend(protocol::align(alignment));
        ResultCode::Success
    }

    fn add_text_size(&mut self, width: u8, height: u8) -> ResultCode {
        if !(1..=8).contains(&width) || !(1..=8).contains(&height) {
            return ResultCode::ErrParam;
        }
        self.buffer.extend(protocol::text_size(width, height));
        ResultCode::Success
    }

    fn add_text_font(&mut self, font: TextFont) -> ResultCode {
        self.buffer.extend(protocol::font(font.code()));
        ResultCode::Success
    }

    fn add_text(&mut self, text: &str) -> ResultCode {
        if text.is_empty() {
            return ResultCode::ErrParam;
        }
        self.buffer.extend(protocol::text(text));
        ResultCode::Success
    }

    fn add_feed_line(&mut self, lines: u8) -> ResultCode {
        self.buffer.extend(protocol::feed_lines(lines));
        ResultCode::Success
    }

    fn add_cut(&mut self, cut: CutKind) -> ResultCode {
        let bytes = match cut {
            CutKind::Feed => protocol::cut_feed(),
            CutKind::NoFeed => protocol::cut_no_feed(),
        };
        self.buffer.extend(bytes);
        ResultCode::Success
    }

    fn clear_command_buffer(&mut self) {
        self.buffer.clear();
        self.buffer.extend(protocol::init());
    }

    fn connect(&mut self, target: &str) -> ResultCode {
        if self.file.is_some() {
            return ResultCode::ErrAlreadyOpened;
        }
        let Some(path) = Self::resolve_target(target) else {
            warn!(%target, "unusable connection target");
            return ResultCode::ErrParam;
        };

        let file = match OpenOptions::new().write(true).open(&path) {
            Ok(file) => file,
            Err(err) => {
                warn!(%path, %err, "failed to open RFCOMM device");
                return ResultCode::ErrConnect;
            }
        };
        if let Err(err) = configure_tty_raw(file.as_raw_fd()) {
            warn!(%path, %err, "failed to configure TTY");
            return ResultCode::ErrConnect;
        }

        debug!(%path, "connected");
        self.file = Some(file);
        ResultCode::Success
    }

    fn disconnect(&mut self) -> ResultCode {
        match self.file.take() {
            Some(mut file) => {
                let _ = file.flush();
                debug!("disconnected");
                ResultCode::Success
            }
            None => ResultCode::ErrDisconnect,
        }
    }

    fn send_data(&mut self) -> ResultCode {
        if self.file.is_none() {
            return ResultCode::ErrIllegal;
        }
        let data = self.buffer.clone();
        debug!(bytes = data.len(), "transmitting buffered commands");
        if let Err(err) = self.write_chunked(&data) {
            warn!(%err, "transmission failed");
            return ResultCode::ErrFailure;
        }
        // Write-only link: a clean flush is the best status signal we get.
        if let Some(listener) = self.listener.as_ref() {
            listener(StatusSnapshot::default());
        }
        ResultCode::Success
    }

    fn is_connected(&self) -> bool {
        self.file.is_some()
    }

    fn set_status_listener(&mut self, listener: StatusListener) {
        self.listener = Some(listener);
    }
}

// ============================================================================
// DISCOVERY & RADIO
// ============================================================================

/// # RFCOMM Discovery
///
/// Reports a bound RFCOMM device node as the discovered printer. A
/// background thread polls until a node appears or [`stop`](Discovery::stop)
/// is called; the first hit is reported through the listener.
pub struct RfcommDiscovery {
    /// Preferred device path; when unset, bound nodes are scanned.
    preferred: Option<String>,
    running: Arc<AtomicBool>,
}

impl RfcommDiscovery {
    pub fn new(preferred: Option<String>) -> Self {
        Self {
            preferred,
            running: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Discovery for RfcommDiscovery {
    fn start(&mut self, _filter: DeviceFilter, listener: DiscoveryListener) -> ResultCode {
        self.stop();
        let running = Arc::new(AtomicBool::new(true));
        self.running = running.clone();
        let preferred = self.preferred.clone();

        thread::spawn(move || {
            while running.load(Ordering::Relaxed) {
                if let Some(path) = find_bound_device(preferred.as_deref()) {
                    debug!(%path, "discovery found RFCOMM device");
                    listener(DeviceInfo {
                        device_name: path.clone(),
                        target: path,
                    });
                    return;
                }
                thread::sleep(Duration::from_millis(DISCOVERY_POLL_MS));
            }
        });
        ResultCode::Success
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
    }
}

impl Drop for RfcommDiscovery {
    fn drop(&mut self) {
        self.stop();
    }
}

/// First usable RFCOMM device node: the preferred path if it exists,
/// otherwise the first of `/dev/rfcomm0`..`/dev/rfcomm3`.
fn find_bound_device(preferred: Option<&str>) -> Option<String> {
    if let Some(path) = preferred {
        return Path::new(path).exists().then(|| path.to_string());
    }
    (0..4)
        .map(|n| format!("/dev/rfcomm{n}"))
        .find(|path| Path::new(path).exists())
}

/// # BlueZ Radio Monitor
///
/// Reports the Bluetooth adapter's power state by asking `bluetoothctl`.
/// The current state is reported once, promptly after subscription, from
/// a background thread.
pub struct BluezRadio;

impl RadioMonitor for BluezRadio {
    fn subscribe(&mut self, listener: RadioListener) {
        thread::spawn(move || {
            let state = match Command::new("bluetoothctl").arg("show").output() {
                Ok(output) if !output.status.success() => RadioState::PoweredOff,
                Ok(output) => {
                    if String::from_utf8_lossy(&output.stdout).contains("Powered: yes") {
                        RadioState::PoweredOn
                    } else {
                        RadioState::PoweredOff
                    }
                }
                Err(err) => {
                    warn!(%err, "bluetoothctl not available");
                    RadioState::Unsupported
                }
            };
            debug!(?state, "adapter power state");
            listener(state);
        });
    }
}

/// The Linux BlueZ/RFCOMM platform: [`BluetoothPort`] for commands,
/// [`RfcommDiscovery`] for discovery, [`BluezRadio`] for power state.
#[derive(Default)]
pub struct BluezPlatform {
    /// Fixed device path to prefer during discovery (e.g. `/dev/rfcomm0`).
    pub device: Option<String>,
}

impl BluezPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(device: impl Into<String>) -> Self {
        Self {
            device: Some(device.into()),
        }
    }
}

impl Platform for BluezPlatform {
    fn open_port(&self, configuration: &Configuration) -> Box<dyn PrinterPort> {
        debug!(
            series = configuration.series.name(),
            "opening Bluetooth port"
        );
        Box::new(BluetoothPort::new())
    }

    fn discovery(&self) -> Box<dyn Discovery> {
        Box::new(RfcommDiscovery::new(self.device.clone()))
    }

    fn radio(&self) -> Box<dyn RadioMonitor> {
        Box::new(BluezRadio)
    }
}

// ============================================================================
// RFCOMM HELPERS
// ============================================================================

/// Validate a Bluetooth MAC address format (XX:XX:XX:XX:XX:XX).
pub fn is_valid_mac(mac: &str) -> bool {
    let parts: Vec<&str> = mac.split(':').collect();
    if parts.len() != 6 {
        return false;
    }
    parts
        .iter()
        .all(|part| part.len() == 2 && part.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Find an existing RFCOMM device bound to the given MAC address.
///
/// Checks `/proc/net/rfcomm` and falls back to the `rfcomm -a` command.
/// Returns the device path (e.g. "/dev/rfcomm0") if one exists.
pub fn find_rfcomm_for_mac(mac: &str) -> Option<String> {
    let mac_upper = mac.to_uppercase();

    // /proc/net/rfcomm format: "rfcomm0: XX:XX:XX:XX:XX:XX channel N ..."
    if let Ok(contents) = fs::read_to_string("/proc/net/rfcomm") {
        if let Some(path) = device_for_mac_in(&contents, &mac_upper) {
            return Some(path);
        }
    }

    match Command::new("rfcomm").arg("-a").output() {
        Ok(output) => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            device_for_mac_in(&stdout, &mac_upper)
        }
        Err(err) => {
            warn!(%err, "failed to run 'rfcomm -a'");
            None
        }
    }
}

fn device_for_mac_in(listing: &str, mac_upper: &str) -> Option<String> {
    for line in listing.lines() {
        if !line.to_uppercase().contains(mac_upper) {
            continue;
        }
        if let Some(dev_name) = line.split(':').next() {
            let device_path = format!("/dev/{}", dev_name.trim());
            if Path::new(&device_path).exists() {
                return Some(device_path);
            }
        }
    }
    None
}

/// Configure a file descriptor for raw TTY mode.
///
/// Disables all input/output processing so command bytes pass through
/// unmodified. IXON/IXOFF/IXANY matter most: 0x11 (XON) and 0x13 (XOFF)
/// are valid bytes in a command stream.
#[cfg(unix)]
fn configure_tty_raw(fd: i32) -> io::Result<()> {
    use std::mem::MaybeUninit;

    let mut termios = MaybeUninit::uninit();
    if unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) } != 0 {
        return Err(io::Error::last_os_error());
    }
    let mut termios = unsafe { termios.assume_init() };

    termios.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON
        | libc::IXOFF
        | libc::IXANY);
    termios.c_oflag &= !libc::OPOST;
    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
    termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
    termios.c_cflag |= libc::CS8;

    if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(not(unix))]
fn configure_tty_raw(_fd: i32) -> io::Result<()> {
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
