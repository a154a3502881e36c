//! SMTP provider

use anyhow::{Context, Result};
use async_trait::async_trait;
use intake_core::{NotificationConfig, NotificationProvider};
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;
use std::time::Duration;

use super::{DeliveryError, DispatchReceipt, NotificationDispatcher, OutboundMessage};

/// Sends submissions through an SMTP relay.
#[derive(Clone)]
pub struct SmtpDispatcher {
    mailer: Arc<AsyncSmtpTransport<Tokio1Executor>>,
}

impl SmtpDispatcher {
    pub fn from_config(config: &NotificationConfig) -> Result<Self> {
        let host = config
            .smtp_host
            .as_deref()
            .context("SMTP_HOST is required for the smtp notification provider")?;
        let port = config.smtp_port;
        let timeout = Some(Duration::from_secs(config.timeout_secs));

        let mailer = if config.smtp_tls {
            let b = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .with_context(|| format!("Failed to configure STARTTLS relay for {}", host))?
                .port(port)
                .timeout(timeout);
            let b = if let (Some(u), Some(p)) = (&config.smtp_user, &config.smtp_password) {
                b.credentials(Credentials::new(u.clone(), p.clone()))
            } else {
                b
            };
            tracing::info!(
                host = %host,
                port = port,
                "SMTP dispatcher initialized (STARTTLS)"
            );
            b.build()
        } else {
            let b = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
                .port(port)
                .timeout(timeout);
            let b = if let (Some(u), Some(p)) = (&config.smtp_user, &config.smtp_password) {
                b.credentials(Credentials::new(u.clone(), p.clone()))
            } else {
                b
            };
            tracing::warn!(host = %host, port = port, "SMTP dispatcher initialized without TLS");
            b.build()
        };

        Ok(Self {
            mailer: Arc::new(mailer),
        })
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, DeliveryError> {
    address.parse().map_err(|e: lettre::address::AddressError| {
        DeliveryError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        }
    })
}

/// Build the MIME message: a text/html alternative followed by one
/// attachment part per file.
pub(crate) fn build_message(message: &OutboundMessage) -> Result<Message, DeliveryError> {
    if message.to.is_empty() {
        return Err(DeliveryError::Build("no recipients".to_string()));
    }

    let mut builder = Message::builder()
        .from(parse_mailbox(&message.from)?)
        .subject(message.subject.as_str())
        .message_id(None);
    for recipient in &message.to {
        builder = builder.to(parse_mailbox(recipient)?);
    }
    if let Some(reply_to) = &message.reply_to {
        builder = builder.reply_to(parse_mailbox(reply_to)?);
    }

    let mut body = MultiPart::mixed().multipart(MultiPart::alternative_plain_html(
        message.text.clone(),
        message.html.clone(),
    ));
    for attachment in &message.attachments {
        let content_type = ContentType::parse(&attachment.content_type)
            .map_err(|e| DeliveryError::Build(e.to_string()))?;
        body = body.singlepart(
            Attachment::new(attachment.filename.clone()).body(attachment.data.to_vec(), content_type),
        );
    }

    builder
        .multipart(body)
        .map_err(|e| DeliveryError::Build(e.to_string()))
}

#[async_trait]
impl NotificationDispatcher for SmtpDispatcher {
    fn provider(&self) -> NotificationProvider {
        NotificationProvider::Smtp
    }

    async fn dispatch(&self, message: OutboundMessage) -> Result<DispatchReceipt, DeliveryError> {
        let email = build_message(&message)?;
        let message_id = email
            .headers()
            .get_raw("Message-ID")
            .map(|id| id.to_string());

        let response = self
            .mailer
            .send(email)
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        tracing::debug!(code = %response.code(), "SMTP relay accepted message");

        Ok(DispatchReceipt::new(NotificationProvider::Smtp, message_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::tests::sample_submission;

    fn message() -> OutboundMessage {
        OutboundMessage::from_submission(
            sample_submission(),
            "Intake <intake@example.com>",
            vec!["sales@example.com".to_string()],
        )
    }

    #[test]
    fn builds_multipart_message_with_attachments() {
        let email = build_message(&message()).expect("message");
        let raw = String::from_utf8(email.formatted()).expect("utf8");

        assert!(raw.contains("Subject: New Project Submission: Bracket"));
        assert!(raw.contains("Reply-To: ada@example.com"));
        assert!(raw.contains("multipart/mixed"));
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("filename=\"bracket.step\""));
        assert!(raw.contains("filename=\"bracket.pdf\""));
        assert!(email.headers().get_raw("Message-ID").is_some());
    }

    #[test]
    fn invalid_sender_is_rejected() {
        let mut message = message();
        message.from = "not an address".to_string();
        assert!(matches!(
            build_message(&message),
            Err(DeliveryError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn empty_recipient_list_is_rejected() {
        let mut message = message();
        message.to.clear();
        assert!(matches!(build_message(&message), Err(DeliveryError::Build(_))));
    }

    #[test]
    fn from_config_requires_host() {
        let config = intake_core::IntakeConfig::from_source(|_| None).expect("config");
        assert!(SmtpDispatcher::from_config(&config.notification).is_err());
    }
}
