//! Intake Processing Library
//!
//! Byte-level inspection and accept/reject policy for uploaded files.

pub mod signature;
pub mod validator;

pub use signature::{detect_executable, matches_signature, ExecutableKind, SignatureFormat};
pub use validator::{
    normalize_mime_type, sanitize_filename, FileDecision, FilePolicy, FileRejection,
    ACCEPTED_MIME_TYPES, CAD_EXTENSIONS, DENIED_EXTENSIONS,
};
