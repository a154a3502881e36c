use async_trait::async_trait;
use intake_core::NotificationProvider;

use super::{DeliveryError, DispatchReceipt, NotificationDispatcher, OutboundMessage};

/// Dispatcher that only logs the message. Used in development when no
/// provider credentials are configured.
#[derive(Debug, Default, Clone)]
pub struct LogDispatcher;

impl LogDispatcher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationDispatcher for LogDispatcher {
    fn provider(&self) -> NotificationProvider {
        NotificationProvider::Log
    }

    async fn dispatch(&self, message: OutboundMessage) -> Result<DispatchReceipt, DeliveryError> {
        let attachments: Vec<&str> = message
            .attachments
            .iter()
            .map(|a| a.filename.as_str())
            .collect();

        tracing::info!(
            subject = %message.subject,
            recipients = message.to.len(),
            attachments = ?attachments,
            attachment_bytes = message.attachment_bytes(),
            "Notification not sent (log provider)"
        );

        Ok(DispatchReceipt::new(NotificationProvider::Log, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::tests::sample_submission;

    #[tokio::test]
    async fn log_dispatcher_always_succeeds() {
        let message = OutboundMessage::from_submission(sample_submission(), "from@example.com", vec![]);
        let receipt = LogDispatcher::new().dispatch(message).await.expect("dispatch");
        assert_eq!(receipt.provider, "log");
        assert_eq!(receipt.id, None);
    }
}
