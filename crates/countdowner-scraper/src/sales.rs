use countdowner_core::{ProductTable, SaleRow, SaleSubset};

/// Keeps the rows of `table` that carry a sale price, projected to
/// `name`, `sale_price`, `regular_price`, `discount_percentage`.
///
/// Table order is preserved. Returns an empty subset when nothing is on sale.
#[must_use]
pub fn filter_sales(table: &ProductTable) -> SaleSubset {
    let rows = table
        .iter()
        .filter_map(|record| {
            record.sale_price.map(|sale_price| SaleRow {
                name: record.name.clone(),
                sale_price,
                regular_price: record.regular_price,
                discount_percentage: record.discount_percentage,
            })
        })
        .collect();
    SaleSubset::from_rows(rows)
}
