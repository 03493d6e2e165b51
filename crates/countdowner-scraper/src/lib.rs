pub mod client;
pub mod collect;
pub mod error;
pub mod extract;
pub mod price;
pub mod sales;

pub use client::{FetchOutcome, FetchedPage, ProductClient, ProductSource};
pub use collect::collect;
pub use error::ScraperError;
pub use extract::{extract, extract_at};
pub use price::{discount_percentage, parse_price};
pub use sales::filter_sales;
