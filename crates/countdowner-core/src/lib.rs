pub mod app_config;
pub mod config;
pub mod products;
pub mod watchlist;

use thiserror::Error;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env, DEFAULT_LOG_LEVEL};
pub use products::{
    ProductRecord, ProductTable, SaleRow, SaleSubset, CSV_HEADER, OBSERVED_AT_FORMAT,
};
pub use watchlist::{is_valid_email, load_watchlist, parse_watchlist, WatchedProduct, Watchlist};

/// Errors raised while loading configuration or a watchlist.
///
/// These are fatal for a pipeline run: they are surfaced to the driver
/// immediately rather than absorbed like per-product failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read watchlist at {path}: {source}")]
    WatchlistIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse watchlist YAML: {0}")]
    WatchlistParse(#[from] serde_yaml::Error),

    #[error("failed to parse watchlist products CSV: {0}")]
    ProductsCsv(#[from] csv::Error),

    #[error("invalid watchlist: {0}")]
    Validation(String),
}

/// Errors raised while writing a [`ProductTable`] to disk.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
