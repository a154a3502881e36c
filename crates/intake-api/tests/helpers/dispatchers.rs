//! In-memory notification dispatchers.

use async_trait::async_trait;
use intake_core::NotificationProvider;
use intake_services::{DeliveryError, DispatchReceipt, NotificationDispatcher, OutboundMessage};
use std::sync::{Arc, Mutex};

/// Records every dispatched message and returns a fixed receipt.
#[derive(Clone, Default)]
pub struct RecordingDispatcher {
    messages: Arc<Mutex<Vec<OutboundMessage>>>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<OutboundMessage> {
        self.messages.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.messages.lock().unwrap().len()
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    fn provider(&self) -> NotificationProvider {
        NotificationProvider::Resend
    }

    async fn dispatch(&self, message: OutboundMessage) -> Result<DispatchReceipt, DeliveryError> {
        let mut messages = self.messages.lock().unwrap();
        messages.push(message);
        Ok(DispatchReceipt::new(
            NotificationProvider::Resend,
            Some(format!("msg_{}", messages.len())),
        ))
    }
}

/// Always fails, as a provider outage would.
#[derive(Clone, Default)]
pub struct FailingDispatcher;

#[async_trait]
impl NotificationDispatcher for FailingDispatcher {
    fn provider(&self) -> NotificationProvider {
        NotificationProvider::Resend
    }

    async fn dispatch(&self, _message: OutboundMessage) -> Result<DispatchReceipt, DeliveryError> {
        Err(DeliveryError::Rejected {
            status: 401,
            body: "{\"message\":\"API key is invalid: re_live_secret\"}".to_string(),
        })
    }
}
