//! # Column Layout
//!
//! Fixed-width line layout for two-sided receipt rows ("label left, value
//! right"). A row that fits is padded with spaces to exactly the column
//! width. A row that does not fit wraps recursively: whichever side is
//! longer spills onto continuation lines, padded so the printer's own
//! column wrapping keeps the overflow aligned.
//!
//! Widths are measured in characters, matching the printer's column count
//! for the active font and magnification (e.g. 24 columns for Font A at
//! 2x on 80mm paper).

/// Pad `s` with leading spaces up to `to_length` characters.
///
/// A string already longer than `to_length` is truncated to its trailing
/// `to_length` characters.
pub fn left_padding(s: &str, to_length: usize) -> String {
    let len = s.chars().count();
    if len < to_length {
        let mut out = " ".repeat(to_length - len);
        out.push_str(s);
        out
    } else {
        s.chars().skip(len - to_length).collect()
    }
}

/// Lay out a two-sided row into a `column_width`-character line, wrapping
/// overflow onto continuation lines.
///
/// When `left` and `right` together fit, the result is
/// `left + padding + right`, exactly `column_width` characters.
///
/// When they do not fit, the longer side wraps:
///
/// - If the sides differ in length, the **right** side wraps. The first
///   `|len(left) - len(right)|` characters of `right` stay on the current
///   line; the remainder goes on a continuation line, left-padded so the
///   line is exactly `column_width` wide and the printer's own wrapping
///   breaks it there. If the "portion that fits" turns out to be all of
///   `right` (degenerate or zero-width layouts), `right` is returned
///   unchanged rather than recursing forever.
/// - If the sides are equal in length, the **left** side wraps: its
///   remainder moves to a continuation line introduced by an explicit line
///   break plus `indent` leading spaces.
///
/// Every recursive call strictly shrinks the text still to be placed, so
/// the recursion terminates even for a zero column width.
pub fn pad_line(left: Option<&str>, right: Option<&str>, column_width: usize, indent: usize) -> String {
    let left = left.unwrap_or("");
    let right = right.unwrap_or("");
    let left_len = left.chars().count();
    let right_len = right.chars().count();

    if left_len + right_len <= column_width {
        let padding = column_width - (left_len + right_len);
        return format!("{left}{}{right}", " ".repeat(padding));
    }

    let overflow = left_len as isize - right_len as isize;
    if overflow != 0 {
        // Right side wraps.
        let keep = overflow.unsigned_abs();
        let portion: String = right.chars().take(keep).collect();
        if portion == right {
            return right.to_string();
        }
        let mut out = pad_line(Some(left), Some(&portion), column_width, indent);
        let rest: String = right.chars().skip(keep).collect();
        let rest_len = right_len - keep;
        let padded = left_padding("", column_width.saturating_sub(rest_len));
        out.push_str(&pad_line(
            None,
            Some(&format!("{padded}{rest}")),
            column_width,
            indent,
        ));
        out
    } else {
        // Sides are the same length: the left side wraps instead.
        let keep = overflow as usize;
        let portion: String = left.chars().take(keep).collect();
        let mut out = pad_line(Some(&portion), Some(right), column_width, indent);
        let padded = left_padding("", indent);
        let rest: String = left.chars().skip(keep).collect();
        out.push_str(&pad_line(
            Some(&format!("\n{padded}{rest}")),
            None,
            column_width,
            indent,
        ));
        out
    }
}

/// A horizontal divider: `column_width` dash characters.
pub fn divider(column_width: usize) -> String {
    "-".repeat(column_width)
}
