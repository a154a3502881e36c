//! Intake Core Library
//!
//! This crate provides the domain models, error types, configuration, and form
//! field validation shared by every component of the project intake service.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{BaseConfig, Config, IntakeConfig, NotificationConfig, NotificationProvider};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    FieldViolation, FileCategory, FilePayload, FileRejectionKind, FileSlot, Material,
    RawSubmission, SanitizedAttachment, SubmissionFields, ValidatedSubmission,
};
