//! The `run` command: watchlist in, price CSV and sale email out.
//!
//! Per-product fetch failures are absorbed by the collector and only show up
//! as missing rows. Anything that fails here (watchlist, output directory,
//! CSV write, email) aborts the run.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDateTime;
use countdowner_core::{AppConfig, Watchlist};
use countdowner_mailer::{BodyFormat, MailgunClient};
use countdowner_scraper::{collect, filter_sales, ProductClient};

/// Timestamp format used in output file names.
const FILE_STAMP_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Clone)]
pub(crate) struct RunOptions {
    pub watchlist_path: PathBuf,
    pub out_dir: PathBuf,
    pub format: BodyFormat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RunSummary {
    pub csv_path: PathBuf,
    pub products: usize,
    pub sales: usize,
    pub emailed: bool,
}

/// `{name}_prices_{YYYY-MM-DDTHH:MM}.csv`, with path separators in the
/// watchlist name replaced so the file always lands directly in `out_dir`.
pub(crate) fn output_file_name(watchlist_name: &str, at: NaiveDateTime) -> String {
    let name: String = watchlist_name
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("{name}_prices_{}.csv", at.format(FILE_STAMP_FORMAT))
}

/// Replaces the configured Mailgun key and domain with any given on the
/// command line. Blank overrides count as not given.
pub(crate) fn apply_mailgun_overrides(
    config: &mut AppConfig,
    key: Option<String>,
    domain: Option<String>,
) {
    let non_blank = |value: Option<String>| {
        value
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
    };
    if let Some(key) = non_blank(key) {
        config.mailgun_api_key = Some(key);
    }
    if let Some(domain) = non_blank(domain) {
        config.mailgun_domain = Some(domain);
    }
}

/// The `check` command: loads and validates a watchlist. Reads no
/// configuration and makes no requests.
pub(crate) fn check_watchlist(path: &Path) -> anyhow::Result<Watchlist> {
    let watchlist = countdowner_core::load_watchlist(path)
        .with_context(|| format!("invalid watchlist {}", path.display()))?;
    tracing::info!(
        name = %watchlist.name,
        email_address = %watchlist.email_address,
        products = watchlist.products.len(),
        "watchlist is valid"
    );
    Ok(watchlist)
}

/// Runs the full pipeline for one watchlist.
///
/// Loads the watchlist, collects every stock code with at most
/// `config.max_concurrent_requests` fetches in flight, writes the table to a
/// timestamped CSV under `options.out_dir`, filters the sales, and emails
/// them when `mailer` is set and at least one product is on sale.
///
/// # Errors
///
/// Returns an error if the watchlist cannot be loaded, the product client
/// cannot be built, the output directory or CSV cannot be written, or the
/// email is rejected.
pub(crate) async fn run_pipeline(
    config: &AppConfig,
    options: &RunOptions,
    mailer: Option<&MailgunClient>,
) -> anyhow::Result<RunSummary> {
    let watchlist = countdowner_core::load_watchlist(&options.watchlist_path)?;
    tracing::info!(
        name = %watchlist.name,
        products = watchlist.products.len(),
        "loaded watchlist"
    );

    let client = ProductClient::from_config(config)?;
    let table = collect(
        &client,
        &watchlist.stock_codes(),
        config.max_concurrent_requests,
    )
    .await?;

    let csv_path = write_output(&options.out_dir, &watchlist.name, &table)?;
    tracing::info!(path = %csv_path.display(), rows = table.len(), "wrote price table");

    let sales = filter_sales(&table);
    let mut emailed = false;
    if sales.is_empty() {
        tracing::info!("no products on sale");
    } else if let Some(mailer) = mailer {
        mailer
            .send_sales(&watchlist.email_address, &sales, options.format)
            .await
            .context("failed to send sale notification")?;
        emailed = true;
    } else {
        tracing::debug!(sales = sales.len(), "email disabled; skipping notification");
    }

    Ok(RunSummary {
        csv_path,
        products: table.len(),
        sales: sales.len(),
        emailed,
    })
}

fn write_output(
    out_dir: &Path,
    watchlist_name: &str,
    table: &countdowner_core::ProductTable,
) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output directory {}", out_dir.display()))?;

    let now = chrono::Local::now().naive_local();
    let path = out_dir.join(output_file_name(watchlist_name, now));
    table.write_csv_file(&path)?;
    Ok(path)
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
