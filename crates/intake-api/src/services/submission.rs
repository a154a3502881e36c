//! Submission orchestration
//!
//! One call per request: validate every text field, run the file policy on each
//! present slot, then hand the result to the notification dispatcher exactly
//! once. Nothing is kept between calls.

use intake_core::constants::MAX_FILE_SLOTS;
use intake_core::validation::validate_fields;
use intake_core::{
    AppError, Config, ErrorMetadata, FieldViolation, FileSlot, RawSubmission, ValidatedSubmission,
};
use intake_processing::FilePolicy;
use intake_services::{DispatchReceipt, NotificationDispatcher, OutboundMessage};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Result of an accepted and delivered submission.
#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    pub submission_id: Uuid,
    pub receipt: DispatchReceipt,
}

#[derive(Clone)]
pub struct SubmissionService {
    policy: FilePolicy,
    dispatcher: Arc<dyn NotificationDispatcher>,
    from_email: String,
    recipients: Vec<String>,
    dispatch_timeout: Duration,
}

impl SubmissionService {
    pub fn new(config: &Config, dispatcher: Arc<dyn NotificationDispatcher>) -> Self {
        Self {
            policy: FilePolicy::new(config.max_file_size_bytes()),
            dispatcher,
            from_email: config.from_email().to_string(),
            recipients: config.to_emails().to_vec(),
            dispatch_timeout: Duration::from_secs(config.notification_timeout_secs()),
        }
    }

    /// Override the bound on a single dispatch call.
    pub fn with_dispatch_timeout(mut self, timeout: Duration) -> Self {
        self.dispatch_timeout = timeout;
        self
    }

    pub fn max_file_size(&self) -> usize {
        self.policy.max_file_size()
    }

    /// Validate a raw submission without dispatching it.
    ///
    /// Field violations, including a missing `file3D`, are collected and
    /// reported together. File policy runs only once every field is valid and
    /// stops at the first rejected slot.
    pub fn validate(
        &self,
        submission_id: Uuid,
        raw: RawSubmission,
    ) -> Result<ValidatedSubmission, AppError> {
        let (typed, mut violations) = match validate_fields(&raw.fields) {
            Ok(typed) => (Some(typed), Vec::new()),
            Err(violations) => (None, violations),
        };

        for slot in FileSlot::ALL {
            if slot.is_required() && raw.file(slot).is_none() {
                violations.push(FieldViolation::new(slot.field_name(), slot.missing_message()));
            }
        }

        let typed = match typed {
            Some(typed) if violations.is_empty() => typed,
            _ => return Err(AppError::FieldValidation(violations)),
        };

        let RawSubmission { file_3d, file_2d, .. } = raw;

        let mut attachments = Vec::with_capacity(MAX_FILE_SLOTS);
        for (slot, file) in [(FileSlot::Primary3D, file_3d), (FileSlot::Drawing2D, file_2d)] {
            let Some(file) = file else {
                continue;
            };

            let attachment =
                self.policy
                    .evaluate(slot, file)
                    .map_err(|rejection| AppError::FileRejected {
                        slot,
                        kind: rejection.kind(),
                        reason: rejection.to_string(),
                    })?;

            tracing::debug!(
                submission_id = %submission_id,
                slot = slot.field_name(),
                category = attachment.category.as_str(),
                size = attachment.size(),
                "Attachment accepted"
            );
            attachments.push(attachment);
        }

        Ok(ValidatedSubmission {
            id: submission_id,
            fields: typed,
            attachments,
        })
    }

    /// Hand a validated submission to the dispatcher, bounded by the dispatch
    /// timeout. Any failure is a delivery failure, never a validation one.
    pub async fn deliver(
        &self,
        submission: ValidatedSubmission,
    ) -> Result<DispatchReceipt, AppError> {
        let submission_id = submission.id;
        let message = OutboundMessage::from_submission(
            submission,
            self.from_email.clone(),
            self.recipients.clone(),
        );

        match tokio::time::timeout(self.dispatch_timeout, self.dispatcher.dispatch(message)).await {
            Ok(Ok(receipt)) => Ok(receipt),
            Ok(Err(e)) => {
                tracing::error!(
                    submission_id = %submission_id,
                    provider = self.dispatcher.provider().as_str(),
                    error = %e,
                    "Notification dispatch failed"
                );
                Err(AppError::DeliveryFailed(e.to_string()))
            }
            Err(_) => {
                tracing::error!(
                    submission_id = %submission_id,
                    provider = self.dispatcher.provider().as_str(),
                    timeout_ms = self.dispatch_timeout.as_millis() as u64,
                    "Notification dispatch timed out"
                );
                Err(AppError::DeliveryFailed(format!(
                    "dispatch timed out after {:?}",
                    self.dispatch_timeout
                )))
            }
        }
    }

    /// Validate and deliver one submission.
    pub async fn submit(&self, raw: RawSubmission) -> Result<SubmissionOutcome, AppError> {
        let submission_id = Uuid::new_v4();
        let field_count = raw.fields.len();

        let submission = self.validate(submission_id, raw).map_err(|e| {
            tracing::info!(
                submission_id = %submission_id,
                field_count = field_count,
                code = e.error_code(),
                violations = e.violations().len(),
                "Submission rejected"
            );
            e
        })?;

        tracing::info!(
            submission_id = %submission_id,
            project_name = %submission.fields.project_name,
            attachments = submission.attachments.len(),
            "Submission validated"
        );

        let receipt = self.deliver(submission).await?;

        tracing::info!(
            submission_id = %submission_id,
            provider = %receipt.provider,
            message_id = ?receipt.id,
            "Submission delivered"
        );

        Ok(SubmissionOutcome {
            submission_id,
            receipt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_core::{FileCategory, FilePayload, FileRejectionKind, IntakeConfig};
    use intake_services::{DeliveryError, LogDispatcher};

    const STEP: &[u8] = b"ISO-10303-21;\nHEADER;\n";

    fn test_config() -> Config {
        Config(Box::new(
            IntakeConfig::from_source(|key| match key {
                "MAX_FILE_SIZE_MB" => Some("1".to_string()),
                "FROM_EMAIL" => Some("intake@example.com".to_string()),
                "TO_EMAIL" => Some("sales@example.com".to_string()),
                _ => None,
            })
            .expect("config"),
        ))
    }

    fn service() -> SubmissionService {
        SubmissionService::new(&test_config(), Arc::new(LogDispatcher::new()))
    }

    fn valid_raw() -> RawSubmission {
        let mut raw = RawSubmission::default();
        for (k, v) in [
            ("name", "Ada Lovelace"),
            ("email", "ada@example.com"),
            ("projectName", "Bracket"),
            ("material", "steel"),
            ("quantity", "12"),
        ] {
            raw.fields.insert(k.to_string(), v.to_string());
        }
        raw.set_file(
            FileSlot::Primary3D,
            FilePayload::new("bracket.step", "application/octet-stream", STEP.to_vec()),
        );
        raw
    }

    #[test]
    fn valid_submission_is_assembled_in_slot_order() {
        let mut raw = valid_raw();
        raw.set_file(
            FileSlot::Drawing2D,
            FilePayload::new("drawing.pdf", "application/pdf", b"%PDF-1.7".to_vec()),
        );

        let id = Uuid::new_v4();
        let submission = service().validate(id, raw).expect("valid");
        assert_eq!(submission.id, id);
        assert_eq!(submission.fields.quantity, 12);
        let slots: Vec<FileSlot> = submission.attachments.iter().map(|a| a.slot).collect();
        assert_eq!(slots, vec![FileSlot::Primary3D, FileSlot::Drawing2D]);
        assert_eq!(submission.attachments[1].category, FileCategory::Document);
    }

    #[test]
    fn missing_fields_and_file_are_reported_together() {
        let mut raw = valid_raw();
        raw.fields.remove("name");
        raw.fields.remove("email");
        raw.file_3d = None;

        let err = service().validate(Uuid::new_v4(), raw).unwrap_err();
        let fields: Vec<&str> = err.violations().iter().map(|v| v.field).collect();
        assert_eq!(fields, vec!["name", "email", "file3D"]);
        assert!(err.client_message().ends_with("file3D: 3D file is required"));
    }

    #[test]
    fn files_are_not_inspected_when_fields_fail() {
        let mut raw = valid_raw();
        raw.fields.insert("quantity".to_string(), "0".to_string());
        raw.set_file(
            FileSlot::Primary3D,
            FilePayload::new("part.stp", "application/octet-stream", b"MZ\x90\x00".to_vec()),
        );

        let err = service().validate(Uuid::new_v4(), raw).unwrap_err();
        assert!(matches!(err, AppError::FieldValidation(_)));
    }

    #[test]
    fn rejected_drawing_names_its_slot() {
        let mut raw = valid_raw();
        raw.set_file(
            FileSlot::Drawing2D,
            FilePayload::new("drawing.pdf", "application/pdf", b"GIF89a".to_vec()),
        );

        match service().validate(Uuid::new_v4(), raw).unwrap_err() {
            AppError::FileRejected { slot, kind, reason } => {
                assert_eq!(slot, FileSlot::Drawing2D);
                assert_eq!(kind, FileRejectionKind::Signature);
                assert_eq!(reason, "invalid PDF file signature");
            }
            other => panic!("expected file rejection, got {:?}", other),
        }
    }

    struct StalledDispatcher;

    #[async_trait::async_trait]
    impl NotificationDispatcher for StalledDispatcher {
        fn provider(&self) -> intake_core::NotificationProvider {
            intake_core::NotificationProvider::Resend
        }

        async fn dispatch(
            &self,
            _message: OutboundMessage,
        ) -> Result<DispatchReceipt, DeliveryError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Err(DeliveryError::Transport("unreachable".to_string()))
        }
    }

    #[tokio::test]
    async fn stalled_dispatch_times_out_as_delivery_failure() {
        let service = SubmissionService::new(&test_config(), Arc::new(StalledDispatcher))
            .with_dispatch_timeout(Duration::from_millis(20));

        let err = service.submit(valid_raw()).await.unwrap_err();
        assert!(matches!(err, AppError::DeliveryFailed(_)));
        assert_eq!(err.http_status_code(), 500);
    }

    #[tokio::test]
    async fn log_dispatcher_round_trip() {
        let outcome = service().submit(valid_raw()).await.expect("submitted");
        assert_eq!(outcome.receipt.provider, "log");
    }
}
