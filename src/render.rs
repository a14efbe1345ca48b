//! # Template Rendering
//!
//! Converts an ordered template list into device commands on a
//! [`PrinterPort`]. Each entry becomes an align / size / font / text
//! command group, with an optional feed after it. The first command the
//! device rejects aborts the remaining entries and clears the device's
//! pending buffer so a malformed sequence can't leak into a later job.

use crate::device::{PrinterPort, ResultCode};
use crate::error::ReciboError;
use crate::protocol::Alignment;
use crate::template::Template;

fn check(
    port: &mut dyn PrinterPort,
    code: ResultCode,
    method: &'static str,
) -> Result<(), ReciboError> {
    if code.is_success() {
        Ok(())
    } else {
        port.clear_command_buffer();
        Err(ReciboError::command(method, code))
    }
}

/// Render `templates` onto the device's command buffer, in order.
///
/// Returns the concatenated rendered text. The text has no behavioral
/// role; it exists so callers can log what the receipt will say.
pub fn render(
    port: &mut dyn PrinterPort,
    templates: &[Template],
) -> Result<String, ReciboError> {
    let mut full_text = String::new();

    for template in templates {
        let code = port.add_text_align(Alignment::Center);
        check(port, code, "add_text_align")?;

        let size = template.style.magnification();
        let code = port.add_text_size(size, size);
        check(port, code, "add_text_size")?;

        let code = port.add_text_font(template.font);
        check(port, code, "add_text_font")?;

        let text = template.kind.value();
        let code = port.add_text(&text);
        check(port, code, "add_text")?;
        full_text.push_str(&text);

        if template.line_break_after {
            let code = port.add_feed_line(1);
            check(port, code, "add_feed_line")?;
        }
    }

    Ok(full_text)
}
