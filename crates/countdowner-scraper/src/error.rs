use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    /// DNS, connect, timeout, or body decode failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("malformed price \"{raw}\"")]
    MalformedPrice { raw: String },

    #[error("invalid stock code at position {index}: {reason}")]
    InvalidIdentifier { index: usize, reason: String },

    #[error("invalid product endpoint \"{url}\": {reason}")]
    InvalidEndpoint { url: String, reason: String },
}

impl ScraperError {
    /// Returns `true` for failures scoped to a single product, which a batch
    /// absorbs by dropping that product.
    ///
    /// Per-item errors:
    /// - [`ScraperError::Http`] and [`ScraperError::UnexpectedStatus`]: the
    ///   fetch for one stock code failed.
    /// - [`ScraperError::MalformedPrice`]: one price on one page was unreadable.
    ///
    /// Everything else is a caller error and must propagate.
    #[must_use]
    pub fn is_per_item(&self) -> bool {
        matches!(
            self,
            ScraperError::Http(_)
                | ScraperError::UnexpectedStatus { .. }
                | ScraperError::MalformedPrice { .. }
        )
    }
}
