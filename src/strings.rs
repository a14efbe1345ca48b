//! # Status Message Strings
//!
//! Human-readable fragments used to compose device error messages. The
//! lookup is a capability seam: callers that ship their own translations
//! implement [`StringTable`]; everyone else gets the bundled English
//! table.

/// Localized-string lookup for error text.
pub trait StringTable: Send + Sync {
    /// Resolve a message key to display text. Unknown keys resolve to the
    /// key itself so a missing entry is visible rather than silent.
    fn lookup(&self, key: &str) -> String;
}

/// The bundled English string table.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnglishStrings;

impl StringTable for EnglishStrings {
    fn lookup(&self, key: &str) -> String {
        let text = match key {
            "methoderr_errcode" => "error occurred with result code",
            "err_offline" => "Printer is offline.\n",
            "err_no_response" => "Printer is not responding. Check the connection between the printer and this device.\n",
            "err_cover_open" => "Close the roll paper cover.\n",
            "err_receipt_end" => "Roll paper is empty. Load new roll paper.\n",
            "err_paper_feed" => "Release the paper feed switch.\n",
            "err_autocutter" => "Remove jammed paper and close the roll paper cover.\n",
            "err_need_recover" => "Then restart the printer with the power switch.\n",
            "err_unrecover" => "An unrecoverable error occurred. Cycle the printer's power switch.\n",
            "err_overheat" => "Wait until the printer's error light turns off.\n",
            "err_head" => "The print head is overheated.\n",
            "err_motor" => "The motor driver is overheated.\n",
            "err_battery" => "The battery is overheated.\n",
            "err_wrong_paper" => "Load the correct roll paper.\n",
            "err_battery_real_end" => "The battery is empty. Connect the AC adapter or replace the battery.\n",
            "err_wait_removal" => "Remove the printed paper.\n",
            "err_voltage" => "A power-supply voltage error occurred.\n",
            _ => key,
        };
        text.to_string()
    }
}
