//! Resend HTTP email API provider
//!
//! API: https://resend.com/docs/api-reference/emails/send-email

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use intake_core::{NotificationConfig, NotificationProvider};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use super::{DeliveryError, DispatchReceipt, NotificationDispatcher, OutboundMessage};

const MAX_ERROR_BODY_CHARS: usize = 512;

/// Sends submissions through the Resend `POST /emails` endpoint.
pub struct ResendDispatcher {
    http_client: reqwest::Client,
    api_key: String,
    api_url: String,
}

impl Debug for ResendDispatcher {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ResendDispatcher")
            .field("api_url", &self.api_url)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    html: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<AttachmentPayload<'a>>,
}

#[derive(Debug, Serialize)]
struct AttachmentPayload<'a> {
    filename: &'a str,
    /// Base64-encoded file bytes
    content: String,
    content_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: Option<String>,
}

impl ResendDispatcher {
    pub fn new(api_key: impl Into<String>, api_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client for Resend")?;

        Ok(Self {
            http_client,
            api_key: api_key.into(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &NotificationConfig) -> Result<Self> {
        let api_key = config
            .resend_api_key
            .as_deref()
            .context("RESEND_API_KEY is required for the resend notification provider")?;

        Self::new(
            api_key,
            config.resend_api_url.as_str(),
            Duration::from_secs(config.timeout_secs),
        )
    }
}

#[async_trait]
impl NotificationDispatcher for ResendDispatcher {
    fn provider(&self) -> NotificationProvider {
        NotificationProvider::Resend
    }

    async fn dispatch(&self, message: OutboundMessage) -> Result<DispatchReceipt, DeliveryError> {
        let url = format!("{}/emails", self.api_url);

        let request = SendEmailRequest {
            from: &message.from,
            to: &message.to,
            subject: &message.subject,
            html: &message.html,
            text: &message.text,
            reply_to: message.reply_to.as_deref(),
            attachments: message
                .attachments
                .iter()
                .map(|a| AttachmentPayload {
                    filename: &a.filename,
                    content: general_purpose::STANDARD.encode(&a.data),
                    content_type: &a.content_type,
                })
                .collect(),
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let parsed: SendEmailResponse = response
            .json()
            .await
            .map_err(|e| DeliveryError::Transport(format!("invalid Resend response: {}", e)))?;

        tracing::debug!(message_id = ?parsed.id, "Resend accepted message");

        Ok(DispatchReceipt::new(NotificationProvider::Resend, parsed.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::tests::sample_submission;
    use axum::{extract::State, http::HeaderMap, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured {
        requests: Arc<Mutex<Vec<(Option<String>, Value)>>>,
    }

    async fn accept(
        State(captured): State<Captured>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        captured.requests.lock().unwrap().push((auth, body));
        Json(json!({ "id": "4ef9a417-02e9-4d39-ad75-9611e0fcc33c" }))
    }

    async fn reject() -> (StatusCode, Json<Value>) {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "name": "validation_error", "message": "Invalid `from` field." })),
        )
    }

    async fn spawn_mock(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock server");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("mock server");
        });
        format!("http://{}", addr)
    }

    fn message() -> OutboundMessage {
        OutboundMessage::from_submission(
            sample_submission(),
            "Intake <intake@example.com>",
            vec!["sales@example.com".to_string(), "eng@example.com".to_string()],
        )
    }

    #[tokio::test]
    async fn sends_message_with_base64_attachments() {
        let captured = Captured::default();
        let router = Router::new()
            .route("/emails", post(accept))
            .with_state(captured.clone());
        let url = spawn_mock(router).await;

        let dispatcher = ResendDispatcher::new("re_test_key", url, Duration::from_secs(5))
            .expect("dispatcher");
        let receipt = dispatcher.dispatch(message()).await.expect("dispatch");

        assert_eq!(receipt.provider, "resend");
        assert_eq!(receipt.id.as_deref(), Some("4ef9a417-02e9-4d39-ad75-9611e0fcc33c"));

        let requests = captured.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let (auth, body) = &requests[0];
        assert_eq!(auth.as_deref(), Some("Bearer re_test_key"));
        assert_eq!(body["from"], "Intake <intake@example.com>");
        assert_eq!(body["to"], json!(["sales@example.com", "eng@example.com"]));
        assert_eq!(body["subject"], "New Project Submission: Bracket");
        assert_eq!(body["reply_to"], "ada@example.com");
        assert_eq!(body["attachments"][0]["filename"], "bracket.step");
        assert_eq!(
            body["attachments"][0]["content"],
            general_purpose::STANDARD.encode(b"ISO-10303-21;")
        );
        assert_eq!(body["attachments"][1]["content_type"], "application/pdf");
    }

    #[tokio::test]
    async fn provider_rejection_is_a_delivery_error() {
        let url = spawn_mock(Router::new().route("/emails", post(reject))).await;

        let dispatcher =
            ResendDispatcher::new("re_test_key", url, Duration::from_secs(5)).expect("dispatcher");
        let err = dispatcher.dispatch(message()).await.unwrap_err();

        match err {
            DeliveryError::Rejected { status, body } => {
                assert_eq!(status, 422);
                assert!(body.contains("validation_error"));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn unreachable_provider_is_a_transport_error() {
        // Bind then drop to get a port with nothing listening.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let dispatcher = ResendDispatcher::new(
            "re_test_key",
            format!("http://{}", addr),
            Duration::from_secs(5),
        )
        .expect("dispatcher");
        let err = dispatcher.dispatch(message()).await.unwrap_err();
        assert!(matches!(err, DeliveryError::Transport(_)));
    }

    #[test]
    fn from_config_requires_api_key() {
        let config = intake_core::IntakeConfig::from_source(|_| None).expect("config");
        assert!(ResendDispatcher::from_config(&config.notification).is_err());
    }

    #[test]
    fn debug_hides_api_key() {
        let dispatcher = ResendDispatcher::new("re_secret", "https://api.resend.com/", Duration::from_secs(1))
            .expect("dispatcher");
        let rendered = format!("{:?}", dispatcher);
        assert!(!rendered.contains("re_secret"));
        assert!(rendered.contains("https://api.resend.com\""));
    }
}
