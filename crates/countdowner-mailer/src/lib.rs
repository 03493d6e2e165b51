//! Sale notification emails delivered through the Mailgun HTTP API.

pub mod client;
pub mod error;
pub mod render;

pub use client::{MailgunClient, FROM_ADDRESS};
pub use error::MailerError;
pub use render::{render_body, render_html, render_text, subject_line, BodyFormat};
