//! # Receipt Templates
//!
//! The declarative model for one receipt: an ordered list of [`Template`]
//! entries, each one line-or-block of content plus its visual directives.
//! Entries are immutable once constructed and render in list order.

use crate::layout;

/// Character magnification applied to an entry.
///
/// The factor feeds the printer's text-size command on both axes, so
/// `Header` text prints 4x wide and 4x tall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextStyle {
    Header,
    Large,
    Medium,
    #[default]
    Normal,
}

impl TextStyle {
    /// Magnification factor for the device text-size command.
    pub fn magnification(self) -> u8 {
        match self {
            TextStyle::Header => 4,
            TextStyle::Large => 3,
            TextStyle::Medium => 2,
            TextStyle::Normal => 1,
        }
    }
}

/// Device font selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextFont {
    #[default]
    A,
    B,
    C,
    D,
    E,
}

impl TextFont {
    /// The device-side font code.
    pub fn code(self) -> u8 {
        match self {
            TextFont::A => 0,
            TextFont::B => 1,
            TextFont::C => 2,
            TextFont::D => 3,
            TextFont::E => 4,
        }
    }
}

/// The content of one template entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    /// Free text, passed through unchanged.
    Text(String),
    /// A two-sided row: label on the left, value on the right, laid out
    /// into `column_width` characters by [`layout::pad_line`]. `indent`
    /// spaces prefix the left side and continuation lines.
    TwoSided {
        left: Option<String>,
        right: Option<String>,
        column_width: usize,
        indent: Option<usize>,
    },
    /// A dashed divider spanning `column_width` characters.
    Divider { column_width: usize },
}

impl Kind {
    /// The printable text for this entry.
    pub fn value(&self) -> String {
        match self {
            Kind::Text(text) => text.clone(),
            Kind::TwoSided {
                left,
                right,
                column_width,
                indent,
            } => {
                let indent = indent.unwrap_or(0);
                let padded = layout::left_padding("", indent);
                let left = format!("{padded}{}", left.as_deref().unwrap_or(""));
                layout::pad_line(Some(&left), right.as_deref(), *column_width, indent)
            }
            Kind::Divider { column_width } => layout::divider(*column_width),
        }
    }
}

/// One unit of receipt content plus its visual directives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub kind: Kind,
    pub style: TextStyle,
    pub font: TextFont,
    pub line_break_after: bool,
}

impl Template {
    pub fn new(kind: Kind, style: TextStyle, font: TextFont, line_break_after: bool) -> Self {
        Self {
            kind,
            style,
            font,
            line_break_after,
        }
    }

    /// Free text in the default style, followed by a line break.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(Kind::Text(text.into()), TextStyle::Normal, TextFont::A, true)
    }

    /// A two-sided row in the default style, followed by a line break.
    pub fn two_sided(
        left: impl Into<String>,
        right: impl Into<String>,
        column_width: usize,
    ) -> Self {
        Self::new(
            Kind::TwoSided {
                left: Some(left.into()),
                right: Some(right.into()),
                column_width,
                indent: None,
            },
            TextStyle::Normal,
            TextFont::A,
            true,
        )
    }

    /// A divider row in the default style, followed by a line break.
    pub fn divider(column_width: usize) -> Self {
        Self::new(
            Kind::Divider { column_width },
            TextStyle::Normal,
            TextFont::A,
            true,
        )
    }

    /// Override the text style.
    pub fn style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    /// Override the font.
    pub fn font(mut self, font: TextFont) -> Self {
        self.font = font;
        self
    }
}
