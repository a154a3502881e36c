//! Domain models for project submissions

pub mod submission;

pub use submission::{
    FieldViolation, FileCategory, FilePayload, FileRejectionKind, FileSlot, Material,
    RawSubmission, SanitizedAttachment, SubmissionFields, ValidatedSubmission,
};
