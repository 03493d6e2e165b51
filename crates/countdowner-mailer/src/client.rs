//! HTTP client for the Mailgun messages endpoint.

use std::time::Duration;

use countdowner_core::SaleSubset;
use reqwest::{Client, Url};

use crate::error::MailerError;
use crate::render::{render_body, subject_line, BodyFormat};

const DEFAULT_BASE_URL: &str = "https://api.mailgun.net/v3/";

/// Sender shown on every notification.
pub const FROM_ADDRESS: &str = "Countdowner <hello@countdowner.io>";

/// Client for sending messages through one Mailgun domain.
///
/// Use [`MailgunClient::new`] for production or
/// [`MailgunClient::with_base_url`] to point at a mock server in tests.
pub struct MailgunClient {
    client: Client,
    api_key: String,
    messages_url: Url,
}

impl std::fmt::Debug for MailgunClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailgunClient")
            .field("api_key", &"[redacted]")
            .field("messages_url", &self.messages_url.as_str())
            .finish_non_exhaustive()
    }
}

impl MailgunClient {
    /// Creates a client for `domain` against the production Mailgun API.
    ///
    /// # Errors
    ///
    /// Returns [`MailerError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(domain: &str, api_key: &str, timeout_secs: u64) -> Result<Self, MailerError> {
        Self::with_base_url(domain, api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom API base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`MailerError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`MailerError::InvalidBaseUrl`] if
    /// `base_url` is not a valid URL.
    pub fn with_base_url(
        domain: &str,
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, MailerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        // Exactly one trailing slash so `join` appends rather than replaces.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let messages_url = Url::parse(&normalised)
            .and_then(|base| base.join(&format!("{}/messages", domain.trim_matches('/'))))
            .map_err(|e| MailerError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            messages_url,
        })
    }

    /// Sends the sale notification for `sales` to `to`.
    ///
    /// The subject names the number of sales; the body is `sales` rendered
    /// in `format`.
    ///
    /// # Errors
    ///
    /// - [`MailerError::UnexpectedStatus`] if Mailgun returns a non-2xx status.
    /// - [`MailerError::Http`] on network failure or timeout.
    pub async fn send_sales(
        &self,
        to: &str,
        sales: &SaleSubset,
        format: BodyFormat,
    ) -> Result<(), MailerError> {
        let subject = subject_line(sales.len());
        let body = render_body(sales, format);

        let response = self
            .client
            .post(self.messages_url.clone())
            .basic_auth("api", Some(&self.api_key))
            .form(&[
                ("from", FROM_ADDRESS),
                ("to", to),
                ("subject", subject.as_str()),
                (format.form_field(), body.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailerError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(to, sales = sales.len(), "sale notification sent");
        Ok(())
    }
}
