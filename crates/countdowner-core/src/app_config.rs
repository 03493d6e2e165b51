/// Runtime settings for a pipeline run, loaded from the environment.
#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    /// Product-detail endpoint; the stock code is appended as `?stockcode=`.
    pub product_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Ceiling on simultaneously in-flight product requests. Always >= 1.
    pub max_concurrent_requests: usize,
    pub mailgun_domain: Option<String>,
    pub mailgun_api_key: Option<String>,
}

impl AppConfig {
    /// Returns `(domain, api_key)` when both Mailgun settings are present.
    #[must_use]
    pub fn mailgun_credentials(&self) -> Option<(&str, &str)> {
        match (&self.mailgun_domain, &self.mailgun_api_key) {
            (Some(domain), Some(key)) => Some((domain.as_str(), key.as_str())),
            _ => None,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("product_url", &self.product_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_concurrent_requests", &self.max_concurrent_requests)
            .field("mailgun_domain", &self.mailgun_domain)
            .field(
                "mailgun_api_key",
                &self.mailgun_api_key.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}
