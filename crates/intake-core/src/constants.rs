//! Protocol constants shared by the intake pipeline.

/// Default per-file upload cap (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE_MB: usize = 10;

/// Number of file slots a submission can carry (3D model + 2D drawing).
pub const MAX_FILE_SLOTS: usize = 2;

/// Headroom reserved for the textual form fields on top of the file payloads
/// when sizing the request body limit.
pub const FORM_FIELDS_BODY_ALLOWANCE: usize = 256 * 1024;

/// Client-facing message for a failed notification dispatch.
pub const DELIVERY_FAILED_MESSAGE: &str = "Failed to send email";

/// Client-facing message for a successful submission.
pub const SUBMISSION_ACCEPTED_MESSAGE: &str = "Email sent successfully";
