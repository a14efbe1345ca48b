//! # Device Status
//!
//! The status snapshot a printer reports after a transmission, and the
//! classifier that turns it into zero or more human-readable error
//! fragments. An empty classification means the print succeeded.

use crate::strings::StringTable;

/// Roll paper level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaperStatus {
    #[default]
    Ok,
    NearEnd,
    Empty,
}

/// The device's general error state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorStatus {
    #[default]
    NoError,
    Mechanical,
    AutoCutter,
    Unrecoverable,
    /// Clears by itself once the sub-condition (see
    /// [`AutoRecoverReason`]) goes away.
    AutoRecover,
}

/// Sub-reason for an auto-recoverable error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoRecoverReason {
    HeadOverheat,
    MotorOverheat,
    BatteryOverheat,
    WrongPaper,
}

/// Battery charge level, `Level0` (empty) through `Level6` (full).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BatteryLevel {
    Level0,
    Level1,
    Level2,
    Level3,
    Level4,
    Level5,
    Level6,
}

impl Default for BatteryLevel {
    fn default() -> Self {
        BatteryLevel::Level6
    }
}

/// Whether the printer is waiting for printed paper to be taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemovalWaiting {
    #[default]
    WaitNone,
    WaitPaper,
}

/// Power-supply fault detail for unrecoverable conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoltageError {
    HighVoltage,
    LowVoltage,
}

/// One self-reported health snapshot, received once per job and consumed
/// once by [`make_error_message`].
///
/// The default snapshot is fully healthy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub online: bool,
    pub connection: bool,
    pub cover_open: bool,
    pub paper: PaperStatus,
    pub paper_feed: bool,
    pub panel_switch: bool,
    pub error_status: ErrorStatus,
    pub auto_recover_error: Option<AutoRecoverReason>,
    pub battery_level: BatteryLevel,
    pub removal_waiting: RemovalWaiting,
    pub voltage_error: Option<VoltageError>,
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self {
            online: true,
            connection: true,
            cover_open: false,
            paper: PaperStatus::Ok,
            paper_feed: false,
            panel_switch: false,
            error_status: ErrorStatus::NoError,
            auto_recover_error: None,
            battery_level: BatteryLevel::default(),
            removal_waiting: RemovalWaiting::WaitNone,
            voltage_error: None,
        }
    }
}

/// Compose the error message for a status snapshot.
///
/// Each field is evaluated independently in a fixed order and contributes
/// its fragment when it indicates a problem; co-occurring conditions all
/// appear. An empty result means no error condition was detected and the
/// job succeeded.
pub fn make_error_message(status: &StatusSnapshot, strings: &dyn StringTable) -> String {
    let mut msg = String::new();

    if !status.online {
        msg.push_str(&strings.lookup("err_offline"));
    }
    if !status.connection {
        msg.push_str(&strings.lookup("err_no_response"));
    }
    if status.cover_open {
        msg.push_str(&strings.lookup("err_cover_open"));
    }
    if status.paper == PaperStatus::Empty {
        msg.push_str(&strings.lookup("err_receipt_end"));
    }
    if status.paper_feed || status.panel_switch {
        msg.push_str(&strings.lookup("err_paper_feed"));
    }
    if matches!(
        status.error_status,
        ErrorStatus::Mechanical | ErrorStatus::AutoCutter
    ) {
        msg.push_str(&strings.lookup("err_autocutter"));
        msg.push_str(&strings.lookup("err_need_recover"));
    }
    if status.error_status == ErrorStatus::Unrecoverable {
        msg.push_str(&strings.lookup("err_unrecover"));
    }
    if status.error_status == ErrorStatus::AutoRecover {
        match status.auto_recover_error {
            Some(AutoRecoverReason::HeadOverheat) => {
                msg.push_str(&strings.lookup("err_overheat"));
                msg.push_str(&strings.lookup("err_head"));
            }
            Some(AutoRecoverReason::MotorOverheat) => {
                msg.push_str(&strings.lookup("err_overheat"));
                msg.push_str(&strings.lookup("err_motor"));
            }
            Some(AutoRecoverReason::BatteryOverheat) => {
                msg.push_str(&strings.lookup("err_overheat"));
                msg.push_str(&strings.lookup("err_battery"));
            }
            Some(AutoRecoverReason::WrongPaper) => {
                msg.push_str(&strings.lookup("err_wrong_paper"));
            }
            None => {}
        }
    }
    if status.battery_level == BatteryLevel::Level0 {
        msg.push_str(&strings.lookup("err_battery_real_end"));
    }
    if status.removal_waiting == RemovalWaiting::WaitPaper {
        msg.push_str(&strings.lookup("err_wait_removal"));
    }
    if status.voltage_error.is_some() {
        msg.push_str(&strings.lookup("err_voltage"));
    }

    msg
}
