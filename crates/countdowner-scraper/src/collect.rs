//! Batch collection: fetch and extract every stock code in a watchlist.
//!
//! Fetches run concurrently up to a fixed in-flight ceiling. A product whose
//! fetch fails is logged and left out of the table; one bad product never
//! aborts the batch.

use std::collections::HashSet;

use countdowner_core::{ProductRecord, ProductTable};
use futures::stream::{self, StreamExt};

use crate::client::ProductSource;
use crate::error::ScraperError;
use crate::extract::extract;

/// Rejects blank stock codes and drops repeats, keeping first occurrences
/// in input order.
fn unique_stock_codes(stock_codes: &[String]) -> Result<Vec<&str>, ScraperError> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(stock_codes.len());

    for (index, code) in stock_codes.iter().enumerate() {
        if code.trim().is_empty() {
            return Err(ScraperError::InvalidIdentifier {
                index,
                reason: "stock code is blank".to_owned(),
            });
        }
        if seen.insert(code.as_str()) {
            unique.push(code.as_str());
        } else {
            tracing::debug!(stock_code = %code, "duplicate stock code; fetching once");
        }
    }

    Ok(unique)
}

/// Fetches every distinct stock code from `source`, extracts each successful
/// page, and returns the records as a [`ProductTable`].
///
/// At most `max_in_flight` fetches are outstanding at any moment (values
/// below 1 are treated as 1); every stock code is attempted exactly once.
/// Per-item failures are absorbed: the stock code is simply absent from the
/// table. An input where every fetch fails yields an empty table.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidIdentifier`] if any stock code is blank,
/// before any request is issued. Errors that are not per-item (see
/// [`ScraperError::is_per_item`]) propagate after all fetches have settled.
pub async fn collect<S: ProductSource>(
    source: &S,
    stock_codes: &[String],
    max_in_flight: usize,
) -> Result<ProductTable, ScraperError> {
    let unique = unique_stock_codes(stock_codes)?;
    let attempted = unique.len();
    let max_in_flight = max_in_flight.max(1);

    tracing::info!(attempted, max_in_flight, "collecting products");

    let outcomes: Vec<(&str, Result<ProductRecord, ScraperError>)> = stream::iter(unique)
        .map(|code| async move {
            let outcome = source.fetch(code).await;
            // Extraction is synchronous and stamps the parse time.
            (code, outcome.map(|page| extract(&page.markup, code)))
        })
        .buffer_unordered(max_in_flight)
        .collect()
        .await;

    let mut records = Vec::with_capacity(outcomes.len());
    let mut dropped = 0usize;

    for (code, outcome) in outcomes {
        match outcome {
            Ok(record) => records.push(record),
            Err(err) if err.is_per_item() => {
                tracing::warn!(stock_code = code, error = %err, "fetch failed; skipping product");
                dropped += 1;
            }
            Err(err) => return Err(err),
        }
    }

    tracing::info!(
        attempted,
        collected = records.len(),
        dropped,
        "product collection finished"
    );

    Ok(ProductTable::from_records(records))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::client::{FetchOutcome, FetchedPage};

    fn page(name: &str, price: &str) -> String {
        format!(
            r#"<div class="product-title"><h1>{name}</h1></div><span class="price">{price}</span>"#
        )
    }

    /// In-memory source with a per-code delay so tests can control the order
    /// fetches complete in.
    #[derive(Default)]
    struct FakeSource {
        pages: HashMap<String, (u64, Option<String>)>,
        calls: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
        peak_in_flight: AtomicUsize,
    }

    impl FakeSource {
        fn with(mut self, code: &str, delay_ms: u64, markup: Option<String>) -> Self {
            self.pages.insert(code.to_owned(), (delay_ms, markup));
            self
        }
    }

    impl ProductSource for FakeSource {
        async fn fetch(&self, stock_code: &str) -> FetchOutcome {
            self.calls.lock().unwrap().push(stock_code.to_owned());
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

            let (delay_ms, markup) = self
                .pages
                .get(stock_code)
                .cloned()
                .unwrap_or((0, None));
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            match markup {
                Some(markup) => Ok(FetchedPage {
                    markup,
                    final_url: format!("https://example.test/detail?stockcode={stock_code}"),
                }),
                None => Err(ScraperError::UnexpectedStatus {
                    status: 404,
                    url: format!("https://example.test/detail?stockcode={stock_code}"),
                }),
            }
        }
    }

    /// Caller-error source: every fetch reports a misconfigured endpoint.
    struct MisconfiguredSource;

    impl ProductSource for MisconfiguredSource {
        async fn fetch(&self, _stock_code: &str) -> FetchOutcome {
            Err(ScraperError::InvalidEndpoint {
                url: "relative/path".to_owned(),
                reason: "relative URL without a base".to_owned(),
            })
        }
    }

    fn codes(list: &[&str]) -> Vec<String> {
        list.iter().map(|c| (*c).to_owned()).collect()
    }

    fn summary(table: &ProductTable) -> Vec<(String, Option<String>, Option<String>)> {
        table
            .iter()
            .map(|r| {
                (
                    r.stock_code.clone(),
                    r.name.clone(),
                    r.regular_price.map(|p| p.to_string()),
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn empty_input_yields_empty_table() {
        let source = FakeSource::default();
        let table = collect(&source, &[], 10).await.unwrap();
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn failed_fetch_is_dropped() {
        let source = FakeSource::default()
            .with("A", 0, None)
            .with("B", 0, Some(page("Bread", "$3.50")));
        let table = collect(&source, &codes(&["A", "B"]), 10).await.unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.records()[0].stock_code, "B");
    }

    #[tokio::test]
    async fn all_failures_yield_empty_table_not_error() {
        let source = FakeSource::default().with("A", 0, None).with("B", 0, None);
        let table = collect(&source, &codes(&["A", "B"]), 2).await.unwrap();
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn rows_sorted_by_name_regardless_of_completion_order() {
        let fast_first = FakeSource::default()
            .with("1", 5, Some(page("Milk", "$2.00")))
            .with("2", 40, Some(page("Apples", "$4.00")))
            .with("3", 20, Some(page("Cheese", "$9.00")));
        let slow_first = FakeSource::default()
            .with("1", 40, Some(page("Milk", "$2.00")))
            .with("2", 5, Some(page("Apples", "$4.00")))
            .with("3", 20, Some(page("Cheese", "$9.00")));

        let input = codes(&["1", "2", "3"]);
        let a = collect(&fast_first, &input, 3).await.unwrap();
        let b = collect(&slow_first, &input, 3).await.unwrap();

        assert_eq!(summary(&a), summary(&b));
        let names: Vec<_> = a.iter().filter_map(|r| r.name.as_deref()).collect();
        assert_eq!(names, vec!["Apples", "Cheese", "Milk"]);
    }

    #[tokio::test]
    async fn in_flight_requests_never_exceed_ceiling() {
        let mut source = FakeSource::default();
        let input: Vec<String> = (0..12).map(|i| i.to_string()).collect();
        for code in &input {
            source = source.with(code, 15, Some(page(&format!("Item {code}"), "$1.00")));
        }

        let table = collect(&source, &input, 3).await.unwrap();

        assert_eq!(table.len(), 12);
        assert!(source.peak_in_flight.load(Ordering::SeqCst) <= 3);
        assert_eq!(source.calls.lock().unwrap().len(), 12);
    }

    #[tokio::test]
    async fn zero_ceiling_is_treated_as_one() {
        let source = FakeSource::default()
            .with("1", 5, Some(page("Milk", "$2.00")))
            .with("2", 5, Some(page("Eggs", "$6.00")));
        let table = collect(&source, &codes(&["1", "2"]), 0).await.unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(source.peak_in_flight.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn duplicate_codes_are_fetched_once() {
        let source = FakeSource::default().with("7", 0, Some(page("Tea", "$5.00")));
        let table = collect(&source, &codes(&["7", "7", "7"]), 10).await.unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(*source.calls.lock().unwrap(), vec!["7".to_owned()]);
    }

    #[tokio::test]
    async fn row_count_never_exceeds_input() {
        let source = FakeSource::default()
            .with("1", 0, Some(page("Milk", "$2.00")))
            .with("2", 0, None)
            .with("3", 0, Some("<html>gone</html>".to_owned()));
        let input = codes(&["1", "2", "3"]);
        let table = collect(&source, &input, 10).await.unwrap();
        assert!(table.len() <= input.len());
        // Unrecognised page still produces a bare row.
        assert_eq!(table.len(), 2);
    }

    #[tokio::test]
    async fn blank_code_is_rejected_before_fetching() {
        let source = FakeSource::default();
        let err = collect(&source, &codes(&["1", "  "]), 10).await.unwrap_err();

        assert!(
            matches!(err, ScraperError::InvalidIdentifier { index: 1, .. }),
            "expected InvalidIdentifier, got: {err:?}"
        );
        assert!(source.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn caller_errors_propagate() {
        let err = collect(&MisconfiguredSource, &codes(&["1"]), 10)
            .await
            .unwrap_err();
        assert!(matches!(err, ScraperError::InvalidEndpoint { .. }));
    }

    #[test]
    fn unique_codes_keep_first_occurrence_order() {
        let input = codes(&["b", "a", "b", "c", "a"]);
        assert_eq!(unique_stock_codes(&input).unwrap(), vec!["b", "a", "c"]);
    }
}
