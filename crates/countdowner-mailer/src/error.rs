use thiserror::Error;

/// Errors returned while sending a sale notification.
#[derive(Debug, Error)]
pub enum MailerError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Mailgun answered with a non-2xx status.
    #[error("mailgun rejected the message with status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("invalid mailgun base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
