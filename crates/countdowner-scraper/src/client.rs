//! HTTP client for the storefront's product-detail endpoint.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::ScraperError;

/// A successfully fetched product detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub markup: String,
    /// URL after redirects.
    pub final_url: String,
}

/// Result of one fetch attempt for one stock code.
///
/// `Err` carries a per-item [`ScraperError`] (transport failure or non-2xx
/// status) that the batch collector absorbs.
pub type FetchOutcome = Result<FetchedPage, ScraperError>;

/// Something that can fetch a product detail page by stock code.
///
/// [`ProductClient`] is the network implementation; the batch collector only
/// depends on this trait.
pub trait ProductSource {
    fn fetch(&self, stock_code: &str) -> impl Future<Output = FetchOutcome> + Send;
}

/// Issues one GET per stock code against the product-detail endpoint.
///
/// No retries: a failed fetch is terminal for that stock code within a run.
#[derive(Debug, Clone)]
pub struct ProductClient {
    client: Client,
    endpoint: Url,
}

impl ProductClient {
    /// Creates a client for `product_url` with a total per-request timeout,
    /// a 10 s connect timeout, and the given `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidEndpoint`] if `product_url` is not an
    /// absolute http(s) URL, or [`ScraperError::Http`] if the underlying
    /// `reqwest::Client` cannot be constructed.
    pub fn new(
        product_url: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ScraperError> {
        let endpoint = Url::parse(product_url).map_err(|e| ScraperError::InvalidEndpoint {
            url: product_url.to_owned(),
            reason: e.to_string(),
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ScraperError::InvalidEndpoint {
                url: product_url.to_owned(),
                reason: format!("unsupported scheme \"{}\"", endpoint.scheme()),
            });
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client, endpoint })
    }

    /// Builds a client from the run configuration.
    ///
    /// # Errors
    ///
    /// See [`ProductClient::new`].
    pub fn from_config(config: &countdowner_core::AppConfig) -> Result<Self, ScraperError> {
        Self::new(
            &config.product_url,
            config.request_timeout_secs,
            &config.user_agent,
        )
    }

    /// The detail-page URL for `stock_code`: the endpoint with
    /// `stockcode=<code>` appended to its query string.
    fn product_url(&self, stock_code: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("stockcode", stock_code);
        url
    }

    /// Fetches the detail page for one stock code.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::UnexpectedStatus`] for any non-2xx status.
    /// - [`ScraperError::Http`] on DNS, connect, timeout, or body decode failure.
    pub async fn fetch_product(&self, stock_code: &str) -> FetchOutcome {
        let url = self.product_url(stock_code);
        let response = self
            .client
            .get(url.clone())
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8",
            )
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let final_url = response.url().to_string();
        let markup = response.text().await?;

        Ok(FetchedPage { markup, final_url })
    }
}

impl ProductSource for ProductClient {
    async fn fetch(&self, stock_code: &str) -> FetchOutcome {
        self.fetch_product(stock_code).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(url: &str) -> ProductClient {
        ProductClient::new(url, 5, "countdowner-test/0.1").unwrap()
    }

    #[test]
    fn product_url_appends_stockcode() {
        let c = client("https://shop.countdown.co.nz/Shop/ProductDetails");
        assert_eq!(
            c.product_url("260803").as_str(),
            "https://shop.countdown.co.nz/Shop/ProductDetails?stockcode=260803"
        );
    }

    #[test]
    fn product_url_keeps_existing_query() {
        let c = client("https://example.com/detail?lang=en");
        assert_eq!(
            c.product_url("42").as_str(),
            "https://example.com/detail?lang=en&stockcode=42"
        );
    }

    #[test]
    fn product_url_encodes_stock_code() {
        let c = client("https://example.com/detail");
        assert_eq!(
            c.product_url("a b&c").as_str(),
            "https://example.com/detail?stockcode=a+b%26c"
        );
    }

    #[test]
    fn new_rejects_relative_url() {
        let err = ProductClient::new("not-a-url", 5, "ua").unwrap_err();
        assert!(
            matches!(err, ScraperError::InvalidEndpoint { .. }),
            "expected InvalidEndpoint, got: {err:?}"
        );
    }

    #[test]
    fn new_rejects_non_http_scheme() {
        let err = ProductClient::new("ftp://example.com/detail", 5, "ua").unwrap_err();
        assert!(
            matches!(err, ScraperError::InvalidEndpoint { ref reason, .. } if reason.contains("ftp")),
            "expected InvalidEndpoint, got: {err:?}"
        );
    }
}
