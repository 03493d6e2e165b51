//! Rendering a [`SaleSubset`] into an email subject and body.
//!
//! Both body formats show the same four columns in subset order, with every
//! number printed to two decimal places. Absent values render as empty cells.

use countdowner_core::{SaleRow, SaleSubset};
use rust_decimal::Decimal;

const COLUMNS: [&str; 4] = [
    "name",
    "sale_price",
    "regular_price",
    "discount_percentage",
];

/// Which body field the message carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyFormat {
    #[default]
    Html,
    Text,
}

impl BodyFormat {
    /// The Mailgun form field that holds a body of this format.
    #[must_use]
    pub fn form_field(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Text => "text",
        }
    }
}

#[must_use]
pub fn subject_line(sale_count: usize) -> String {
    format!("{sale_count} sales on your Countdown watchlist")
}

/// Renders the body for `subset` in the requested format.
#[must_use]
pub fn render_body(subset: &SaleSubset, format: BodyFormat) -> String {
    match format {
        BodyFormat::Html => render_html(subset),
        BodyFormat::Text => render_text(subset),
    }
}

fn money(value: Decimal) -> String {
    format!("{value:.2}")
}

fn cells(row: &SaleRow) -> [String; 4] {
    [
        row.name.clone().unwrap_or_default(),
        money(row.sale_price),
        row.regular_price.map(money).unwrap_or_default(),
        row.discount_percentage
            .map(|pct| format!("{pct:.2}"))
            .unwrap_or_default(),
    ]
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Renders `subset` as an HTML `<table>` with a header row.
#[must_use]
pub fn render_html(subset: &SaleSubset) -> String {
    let mut html = String::from("<table border=\"1\">\n  <thead>\n    <tr>");
    for column in COLUMNS {
        html.push_str(&format!("<th>{column}</th>"));
    }
    html.push_str("</tr>\n  </thead>\n  <tbody>\n");

    for row in subset.iter() {
        html.push_str("    <tr>");
        for cell in cells(row) {
            html.push_str(&format!("<td>{}</td>", html_escape(&cell)));
        }
        html.push_str("</tr>\n");
    }

    html.push_str("  </tbody>\n</table>\n");
    html
}

/// Renders `subset` as a column-aligned plain-text table.
///
/// The name column is left-aligned; numeric columns are right-aligned.
#[must_use]
pub fn render_text(subset: &SaleSubset) -> String {
    let body: Vec<[String; 4]> = subset.iter().map(cells).collect();

    let mut widths = COLUMNS.map(str::len);
    for row in &body {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_line = |line: [&str; 4]| -> String {
        line.iter()
            .zip(widths)
            .enumerate()
            .map(|(i, (cell, width))| {
                if i == 0 {
                    format!("{cell:<width$}")
                } else {
                    format!("{cell:>width$}")
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_owned()
    };

    let mut lines = vec![format_line(COLUMNS)];
    for row in &body {
        lines.push(format_line([&row[0], &row[1], &row[2], &row[3]]));
    }
    lines.join("\n")
}
