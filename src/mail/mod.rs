//! Outbound email. Handlers only see the [`Mailer`] trait; the SMTP
//! implementation is wired in at startup.

mod smtp;
pub mod templates;

use async_trait::async_trait;
use thiserror::Error;

pub use smtp::SmtpMailer;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address {address}: {reason}")]
    Address { address: String, reason: String },
    #[error("failed to build message: {0}")]
    Build(String),
    #[error("smtp transport error: {0}")]
    Transport(String),
}

/// A file attached to an outgoing message.
#[derive(Debug, Clone, PartialEq)]
pub struct MailAttachment {
    pub filename: String,
    pub content_type: &'static str,
    pub content: Vec<u8>,
}

impl MailAttachment {
    pub fn pdf(filename: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: "application/pdf",
            content,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: Option<String>,
    pub attachment: Option<MailAttachment>,
}

impl OutgoingMail {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            text: text.into(),
            html: None,
            attachment: None,
        }
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    pub fn with_attachment(mut self, attachment: MailAttachment) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError>;
}
