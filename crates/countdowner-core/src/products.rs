//! Product records extracted from storefront detail pages, the per-run table
//! they are aggregated into, and the discounted-items view derived from it.

use std::cmp::Ordering;
use std::io::Write;
use std::path::Path;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::ExportError;

/// Fixed local-time format for `observed_at`, both in memory and on disk.
pub const OBSERVED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Column order of the exported product CSV.
pub const CSV_HEADER: [&str; 9] = [
    "stock_code",
    "name",
    "description",
    "size",
    "regular_price",
    "sale_price",
    "discount_percentage",
    "unit_price",
    "observed_at",
];

/// Pricing information extracted from one product detail page.
///
/// Every field except `stock_code` and `observed_at` is optional and defaults
/// to `None`; a page whose layout could not be recognised still yields a
/// record carrying only the requested stock code.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    /// The identifier that was requested, even if the page never echoed it.
    pub stock_code: String,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Pack size as displayed, e.g. `"500g"`.
    pub size: Option<String>,
    /// Shelf price, or the "was"/non-club price when the item is discounted.
    pub regular_price: Option<Decimal>,
    /// Present only when the item is on special or club price.
    pub sale_price: Option<Decimal>,
    /// `100 * (1 - sale_price / regular_price)`; present iff `sale_price` is.
    pub discount_percentage: Option<f64>,
    /// Display text such as `"$1.20 / 100g"`.
    pub unit_price: Option<String>,
    /// Local wall-clock time the page was parsed, truncated to whole seconds.
    pub observed_at: NaiveDateTime,
}

impl ProductRecord {
    /// A record with every optional field absent.
    #[must_use]
    pub fn bare(stock_code: impl Into<String>, observed_at: NaiveDateTime) -> Self {
        Self {
            stock_code: stock_code.into(),
            name: None,
            description: None,
            size: None,
            regular_price: None,
            sale_price: None,
            discount_percentage: None,
            unit_price: None,
            observed_at,
        }
    }

    #[must_use]
    pub fn is_on_sale(&self) -> bool {
        self.sale_price.is_some()
    }

    /// Formats `observed_at` with [`OBSERVED_AT_FORMAT`].
    #[must_use]
    pub fn observed_at_display(&self) -> String {
        self.observed_at.format(OBSERVED_AT_FORMAT).to_string()
    }
}

/// Row order: `name` ascending (case-sensitive, unnamed rows last), then
/// `stock_code` ascending.
fn table_order(a: &ProductRecord, b: &ProductRecord) -> Ordering {
    a.name
        .is_none()
        .cmp(&b.name.is_none())
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.stock_code.cmp(&b.stock_code))
}

/// The records collected in one batch, sorted deterministically.
///
/// Row order never depends on the order fetches completed in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductTable {
    records: Vec<ProductRecord>,
}

impl ProductTable {
    /// Builds a table from records in any order.
    #[must_use]
    pub fn from_records(mut records: Vec<ProductRecord>) -> Self {
        records.sort_by(table_order);
        Self { records }
    }

    #[must_use]
    pub fn records(&self) -> &[ProductRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProductRecord> {
        self.records.iter()
    }

    /// Writes the table as CSV with [`CSV_HEADER`]. The header is written
    /// even when the table is empty.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Csv`] if the underlying writer fails.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), ExportError> {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        wtr.write_record(CSV_HEADER)?;
        for record in &self.records {
            wtr.serialize(CsvRow::from(record))?;
        }
        wtr.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    /// Creates (or truncates) the file at `path` and writes the table to it.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Io`] if the file cannot be created, or
    /// [`ExportError::Csv`] if writing fails.
    pub fn write_csv_file(&self, path: &Path) -> Result<(), ExportError> {
        let file = std::fs::File::create(path).map_err(|e| ExportError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        self.write_csv(std::io::BufWriter::new(file))
    }
}

impl<'a> IntoIterator for &'a ProductTable {
    type Item = &'a ProductRecord;
    type IntoIter = std::slice::Iter<'a, ProductRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    stock_code: &'a str,
    name: Option<&'a str>,
    description: Option<&'a str>,
    size: Option<&'a str>,
    regular_price: Option<Decimal>,
    sale_price: Option<Decimal>,
    discount_percentage: Option<f64>,
    unit_price: Option<&'a str>,
    observed_at: String,
}

impl<'a> From<&'a ProductRecord> for CsvRow<'a> {
    fn from(record: &'a ProductRecord) -> Self {
        Self {
            stock_code: &record.stock_code,
            name: record.name.as_deref(),
            description: record.description.as_deref(),
            size: record.size.as_deref(),
            regular_price: record.regular_price,
            sale_price: record.sale_price,
            discount_percentage: record.discount_percentage,
            unit_price: record.unit_price.as_deref(),
            observed_at: record.observed_at_display(),
        }
    }
}

/// One discounted product, projected to the columns the sale email shows.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleRow {
    pub name: Option<String>,
    pub sale_price: Decimal,
    pub regular_price: Option<Decimal>,
    pub discount_percentage: Option<f64>,
}

/// The discounted rows of a [`ProductTable`], in table order.
///
/// Empty (never absent) when nothing is on sale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaleSubset {
    rows: Vec<SaleRow>,
}

impl SaleSubset {
    #[must_use]
    pub fn from_rows(rows: Vec<SaleRow>) -> Self {
        Self { rows }
    }

    #[must_use]
    pub fn rows(&self) -> &[SaleRow] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SaleRow> {
        self.rows.iter()
    }
}

impl<'a> IntoIterator for &'a SaleSubset {
    type Item = &'a SaleRow;
    type IntoIter = std::slice::Iter<'a, SaleRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
#[path = "products_test.rs"]
mod tests;
