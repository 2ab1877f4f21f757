use async_trait::async_trait;
use lettre::message::{header::ContentType, Attachment, Mailbox, Message, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};

use super::{MailError, Mailer, OutgoingMail};
use crate::config::SmtpConfig;

const SENDER_NAME: &str = "Staff Remuneration System";

/// SMTP mailer over a pooled async lettre transport.
pub struct SmtpMailer {
    from: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
        let from = parse_mailbox(&format!("{} <{}>", SENDER_NAME, config.from))?;

        // 465 speaks TLS from the first byte; everything else upgrades with STARTTLS
        let relay = if config.port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        };
        let builder = relay
            .map_err(|e| MailError::Transport(format!("invalid SMTP host {}: {}", config.host, e)))?
            .port(config.port);

        let builder = match (&config.username, &config.password) {
            (Some(user), Some(pass)) => {
                builder.credentials(Credentials::new(user.clone(), pass.clone()))
            }
            _ => {
                log::warn!("SMTP credentials not set, sending unauthenticated");
                builder
            }
        };

        Ok(Self {
            from,
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        let recipient = mail.to.clone();
        let message = build_message(&self.from, mail)?;

        self.transport.send(message).await.map_err(|e| {
            log::error!("[email] send to {} failed: {}", recipient, e);
            MailError::Transport(e.to_string())
        })?;

        log::info!("[email] sent to {}", recipient);
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse().map_err(|e: lettre::address::AddressError| MailError::Address {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

/// Assemble the MIME message: plain text, optional HTML alternative,
/// optional attachment.
pub(crate) fn build_message(from: &Mailbox, mail: OutgoingMail) -> Result<Message, MailError> {
    let to = parse_mailbox(mail.to.trim())?;

    let body = match mail.html {
        Some(html) => MultiPart::alternative()
            .singlepart(SinglePart::plain(mail.text))
            .singlepart(SinglePart::html(html)),
        None => MultiPart::mixed().singlepart(SinglePart::plain(mail.text)),
    };

    let body = match mail.attachment {
        Some(file) => {
            let content_type = ContentType::parse(file.content_type)
                .map_err(|e| MailError::Build(e.to_string()))?;
            MultiPart::mixed()
                .multipart(body)
                .singlepart(Attachment::new(file.filename).body(file.content, content_type))
        }
        None => body,
    };

    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(mail.subject)
        .multipart(body)
        .map_err(|e| MailError::Build(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::MailAttachment;

    fn sender() -> Mailbox {
        parse_mailbox("Staff Remuneration System <exam.cell@example.edu>").unwrap()
    }

    #[test]
    fn test_message_with_pdf_attachment() {
        let mail = OutgoingMail::new("hod@example.edu", "Main Bill - Optics - 01 March 2025", "See attached")
            .with_attachment(MailAttachment::pdf("main_bill_Optics.pdf", b"%PDF-1.4".to_vec()));

        let message = build_message(&sender(), mail).unwrap();
        let raw = String::from_utf8_lossy(&message.formatted()).to_string();

        assert!(raw.contains("Subject: Main Bill - Optics - 01 March 2025"));
        assert!(raw.contains("application/pdf"));
        assert!(raw.contains("main_bill_Optics.pdf"));
    }

    #[test]
    fn test_html_alternative() {
        let mail = OutgoingMail::new("teacher@example.edu", "Your OTP Code", "Code 123456")
            .with_html("<h1>123456</h1>");
        let raw = String::from_utf8_lossy(&build_message(&sender(), mail).unwrap().formatted())
            .to_string();
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("text/html"));
    }

    #[test]
    fn test_bad_recipient_rejected() {
        let mail = OutgoingMail::new("not an address", "s", "t");
        assert!(matches!(
            build_message(&sender(), mail),
            Err(MailError::Address { .. })
        ));
    }
}
