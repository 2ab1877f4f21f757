//! Distribution of rendered documents: rasterize to PDF, then either hand
//! the bytes back for an inline response or mail them as an attachment.

pub mod handlers;
mod rasterizer;

use std::sync::Arc;
use thiserror::Error;

use crate::document::RenderedDocument;
use crate::mail::{MailAttachment, MailError, Mailer, OutgoingMail};
use crate::validation::is_valid_email;

pub use rasterizer::{ChromeRasterizer, RasterizeError, Rasterizer};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Invalid email format: {0}")]
    InvalidRecipient(String),
    #[error(transparent)]
    Rasterize(#[from] RasterizeError),
    #[error(transparent)]
    Mail(#[from] MailError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryMode {
    InlineResponse,
    /// Mail to the address in the caller's token.
    EmailSelf(String),
    /// Mail to a caller-supplied address.
    EmailOther(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    Inline { filename: String, pdf: Vec<u8> },
    Mailed { recipient: String },
}

#[derive(Clone)]
pub struct Dispatcher {
    rasterizer: Arc<dyn Rasterizer>,
    mailer: Arc<dyn Mailer>,
}

impl Dispatcher {
    pub fn new(rasterizer: Arc<dyn Rasterizer>, mailer: Arc<dyn Mailer>) -> Self {
        Self { rasterizer, mailer }
    }

    /// Deliver one document. Recipients are checked before any PDF work
    /// starts; rasterizer and mail failures are returned as-is.
    pub async fn dispatch(
        &self,
        document: &RenderedDocument,
        mode: DeliveryMode,
    ) -> Result<Delivery, DispatchError> {
        let recipient = match mode {
            DeliveryMode::InlineResponse => None,
            DeliveryMode::EmailSelf(address) => Some(address),
            DeliveryMode::EmailOther(address) => {
                let address = address.trim().to_string();
                if !is_valid_email(&address) {
                    return Err(DispatchError::InvalidRecipient(address));
                }
                Some(address)
            }
        };

        let pdf = self.rasterizer.rasterize(&document.html).await?;

        match recipient {
            None => Ok(Delivery::Inline {
                filename: document.filename(false),
                pdf,
            }),
            Some(recipient) => {
                self.send_pdf(document, &recipient, pdf).await?;
                Ok(Delivery::Mailed { recipient })
            }
        }
    }

    async fn send_pdf(
        &self,
        document: &RenderedDocument,
        recipient: &str,
        pdf: Vec<u8>,
    ) -> Result<(), MailError> {
        let mail = OutgoingMail::new(recipient, document.mail_subject(), document.mail_text())
            .with_attachment(MailAttachment::pdf(document.filename(true), pdf));
        self.mailer.send(mail).await
    }
}
