//! Notification dispatch
//!
//! A validated submission leaves the service as exactly one [`OutboundMessage`].
//! Providers implement [`NotificationDispatcher`]; none of them retries.

mod log;
mod render;

#[cfg(feature = "resend")]
pub mod resend;
#[cfg(feature = "smtp")]
pub mod smtp;

use async_trait::async_trait;
use bytes::Bytes;
use intake_core::{Config, NotificationProvider, ValidatedSubmission};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

pub use log::LogDispatcher;
pub use render::{render_submission, RenderedBody};

/// Provider result returned to the client on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DispatchReceipt {
    /// Provider that accepted the message (`resend`, `smtp`, `log`)
    #[schema(example = "resend")]
    pub provider: String,
    /// Provider-assigned message id, when the provider returns one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl DispatchReceipt {
    pub fn new(provider: NotificationProvider, id: Option<String>) -> Self {
        Self {
            provider: provider.as_str().to_string(),
            id,
        }
    }
}

/// Errors raised by a notification provider.
///
/// The detail is for logs only; clients see a generic delivery failure.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("provider rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("failed to build message: {0}")]
    Build(String),
}

/// One file attached to the outbound message.
#[derive(Debug, Clone)]
pub struct OutboundAttachment {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Everything a provider needs to deliver one submission.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub from: String,
    pub to: Vec<String>,
    pub reply_to: Option<String>,
    pub subject: String,
    pub html: String,
    pub text: String,
    pub attachments: Vec<OutboundAttachment>,
}

impl OutboundMessage {
    /// Build the message for a submission, consuming it so the attachment
    /// buffers move instead of being copied.
    pub fn from_submission(
        submission: ValidatedSubmission,
        from: impl Into<String>,
        to: Vec<String>,
    ) -> Self {
        let body = render_submission(&submission.fields);

        let attachments = submission
            .attachments
            .into_iter()
            .map(|attachment| OutboundAttachment {
                filename: attachment.filename,
                content_type: attachment.content_type,
                data: attachment.data,
            })
            .collect();

        Self {
            from: from.into(),
            to,
            reply_to: Some(submission.fields.email),
            subject: body.subject,
            html: body.html,
            text: body.text,
            attachments,
        }
    }

    pub fn attachment_bytes(&self) -> usize {
        self.attachments.iter().map(|a| a.data.len()).sum()
    }
}

/// Outbound channel for validated submissions.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Provider name used in logs and receipts
    fn provider(&self) -> NotificationProvider;

    /// Deliver one message. Called at most once per submission.
    async fn dispatch(&self, message: OutboundMessage) -> Result<DispatchReceipt, DeliveryError>;
}

/// Build the dispatcher selected by configuration.
pub fn dispatcher_from_config(config: &Config) -> anyhow::Result<Arc<dyn NotificationDispatcher>> {
    let notification = config.notification();

    let dispatcher: Arc<dyn NotificationDispatcher> = match notification.provider {
        #[cfg(feature = "resend")]
        NotificationProvider::Resend => Arc::new(resend::ResendDispatcher::from_config(notification)?),
        #[cfg(feature = "smtp")]
        NotificationProvider::Smtp => Arc::new(smtp::SmtpDispatcher::from_config(notification)?),
        NotificationProvider::Log => Arc::new(LogDispatcher::new()),
        #[allow(unreachable_patterns)]
        other => {
            return Err(anyhow::anyhow!(
                "Notification provider '{}' is not compiled in (enable the '{}' feature)",
                other.as_str(),
                other.as_str()
            ))
        }
    };

    tracing::info!(
        provider = dispatcher.provider().as_str(),
        recipients = notification.to_emails.len(),
        "Notification dispatcher initialized"
    );

    Ok(dispatcher)
}
