//! # Receipt Builders
//!
//! Pre-built template lists demonstrating the layout engine. These are
//! what the CLI prints and what the integration tests render.

use chrono::Local;

use crate::template::{Kind, Template, TextFont, TextStyle};

/// Column width for Font A at 2x magnification on 80mm paper.
pub const DEMO_COLUMNS: usize = 24;

fn medium(kind: Kind) -> Template {
    Template::new(kind, TextStyle::Medium, TextFont::A, true)
}

fn two_sided(left: &str, right: &str, indent: Option<usize>) -> Template {
    medium(Kind::TwoSided {
        left: Some(left.into()),
        right: Some(right.into()),
        column_width: DEMO_COLUMNS,
        indent,
    })
}

/// A demo order receipt.
///
/// Features demonstrated:
/// - Header magnification for the order number
/// - Two-sided rows, including an indented modifier row
/// - A row long enough to wrap onto a continuation line
/// - Dividers between sections
pub fn demo_receipt(order_number: u32) -> Vec<Template> {
    let placed = Local::now().format("Placed on %-d %b %Y, %I:%M %p");
    vec![
        medium(Kind::Text("Chicken Stop".into())),
        Template::new(
            Kind::Text(format!("\n #{order_number} \n")),
            TextStyle::Header,
            TextFont::A,
            true,
        ),
        medium(Kind::Text(format!("{placed} \n"))),
        medium(Kind::Text("Total Item: 2".into())),
        medium(Kind::Divider {
            column_width: DEMO_COLUMNS,
        }),
        two_sided("Payment Method:", "Visa", None),
        two_sided("Delivery Option:", "In-store pickup", None),
        medium(Kind::Divider {
            column_width: DEMO_COLUMNS,
        }),
        two_sided("1x 1pc. Chicken Meal", "$20", None),
        two_sided("Green Tea", "$0", Some(3)),
        medium(Kind::Divider {
            column_width: DEMO_COLUMNS,
        }),
        two_sided("Sub Total", "$20.00", None),
        two_sided("Total", "$20.00", None),
        Template::new(
            Kind::Text("\n\n\n".into()),
            TextStyle::Medium,
            TextFont::A,
            false,
        ),
    ]
}
