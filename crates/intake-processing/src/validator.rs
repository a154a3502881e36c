use intake_core::constants::DEFAULT_MAX_FILE_SIZE_MB;
use intake_core::{FileCategory, FilePayload, FileRejectionKind, FileSlot, SanitizedAttachment};

use crate::signature::{detect_executable, matches_signature, SignatureFormat};

/// Declared MIME types accepted when the bytes carry the matching signature
pub const ACCEPTED_MIME_TYPES: &[&str] = &["application/pdf", "image/jpeg", "image/png"];

/// CAD extensions accepted by extension alone (no fixed signature exists)
pub const CAD_EXTENSIONS: &[&str] = &["step", "stp", "dwg", "dxf", "igs", "iges"];

/// Extensions that are never accepted, wherever they appear in the name
pub const DENIED_EXTENSIONS: &[&str] = &[
    "exe", "bat", "cmd", "com", "pif", "scr", "vbs", "js", "jar", "zip", "rar", "7z",
];

const MAX_FILENAME_LENGTH: usize = 255;
const CAD_CONTENT_TYPE: &str = "application/octet-stream";

/// Why a file was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FileRejection {
    #[error("file is empty")]
    EmptyFile,

    #[error("file too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("file type not allowed (.{extension})")]
    DangerousExtension { extension: String },

    #[error("suspicious double extension (.{extension})")]
    SuspiciousDoubleExtension { extension: String },

    #[error("invalid {} file signature", .format.name())]
    InvalidSignature { format: SignatureFormat },

    #[error("executable disguised as CAD file")]
    ExecutableDisguisedAsCad,

    #[error("unsupported file type; allowed: {allowed}")]
    UnsupportedType { allowed: String },
}

impl FileRejection {
    pub fn kind(&self) -> FileRejectionKind {
        match self {
            FileRejection::EmptyFile | FileRejection::FileTooLarge { .. } => {
                FileRejectionKind::Size
            }
            FileRejection::DangerousExtension { .. }
            | FileRejection::SuspiciousDoubleExtension { .. } => FileRejectionKind::Extension,
            FileRejection::InvalidSignature { .. } => FileRejectionKind::Signature,
            FileRejection::ExecutableDisguisedAsCad => FileRejectionKind::Executable,
            FileRejection::UnsupportedType { .. } => FileRejectionKind::UnsupportedType,
        }
    }
}

/// Outcome of classifying one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileDecision {
    Document(SignatureFormat),
    Image(SignatureFormat),
    Cad { extension: String },
    Rejected(FileRejection),
}

impl FileDecision {
    pub fn category(&self) -> Option<FileCategory> {
        match self {
            FileDecision::Document(_) => Some(FileCategory::Document),
            FileDecision::Image(_) => Some(FileCategory::Image),
            FileDecision::Cad { .. } => Some(FileCategory::Cad),
            FileDecision::Rejected(_) => None,
        }
    }
}

/// Upload policy for submission attachments
///
/// Combines size limit, extension denylist, declared MIME type and byte
/// signature into one decision per file. The decision order is fixed and
/// short-circuits on the first failure:
/// 1. size (empty or over the cap)
/// 2. denylisted extension, final or interior
/// 3. recognized document/image MIME type, verified by signature
/// 4. recognized CAD extension, checked for executable headers
/// 5. anything else is unsupported
#[derive(Debug, Clone)]
pub struct FilePolicy {
    max_file_size: usize,
    accepted_mime_types: Vec<String>,
    cad_extensions: Vec<String>,
    denied_extensions: Vec<String>,
}

impl FilePolicy {
    pub fn new(max_file_size: usize) -> Self {
        Self {
            max_file_size,
            accepted_mime_types: ACCEPTED_MIME_TYPES.iter().map(|s| s.to_string()).collect(),
            cad_extensions: CAD_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            denied_extensions: DENIED_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: usize) -> Result<(), FileRejection> {
        if size == 0 {
            return Err(FileRejection::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(FileRejection::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Reject denylisted extensions, both final and interior
    /// (`drawing.pdf.exe`, `payload.exe.step`).
    pub fn validate_extension(&self, filename: &str) -> Result<(), FileRejection> {
        let segments = extension_segments(filename);

        if segments.len() > 1 {
            if let Some(denied) = segments.iter().find(|s| self.is_denied(s)) {
                return Err(FileRejection::SuspiciousDoubleExtension {
                    extension: denied.clone(),
                });
            }
        }

        match segments.last() {
            Some(extension) if self.is_denied(extension) => {
                Err(FileRejection::DangerousExtension {
                    extension: extension.clone(),
                })
            }
            _ => Ok(()),
        }
    }

    fn is_denied(&self, extension: &str) -> bool {
        self.denied_extensions.iter().any(|d| d == extension)
    }

    /// Classify a file without taking ownership of its bytes.
    pub fn classify(&self, file: &FilePayload) -> FileDecision {
        if let Err(rejection) = self.validate_file_size(file.byte_len) {
            return FileDecision::Rejected(rejection);
        }

        if let Err(rejection) = self.validate_extension(&file.file_name) {
            return FileDecision::Rejected(rejection);
        }

        let mime_type = normalize_mime_type(&file.content_type);
        if self.accepted_mime_types.iter().any(|m| *m == mime_type) {
            if let Some(format) = SignatureFormat::from_mime_type(&mime_type) {
                if !matches_signature(&file.data, format) {
                    return FileDecision::Rejected(FileRejection::InvalidSignature { format });
                }
                return match format.category() {
                    FileCategory::Image => FileDecision::Image(format),
                    _ => FileDecision::Document(format),
                };
            }
        }

        if let Some(extension) = extension_segments(&file.file_name).pop() {
            if self.cad_extensions.contains(&extension) {
                if let Some(kind) = detect_executable(&file.data) {
                    tracing::warn!(
                        filename = %sanitize_filename(&file.file_name),
                        executable = ?kind,
                        "Executable header found in CAD upload"
                    );
                    return FileDecision::Rejected(FileRejection::ExecutableDisguisedAsCad);
                }
                return FileDecision::Cad { extension };
            }
        }

        FileDecision::Rejected(FileRejection::UnsupportedType {
            allowed: self.allowed_types_description(),
        })
    }

    /// Accept or reject one file, producing the attachment that goes downstream.
    pub fn evaluate(
        &self,
        slot: FileSlot,
        file: FilePayload,
    ) -> Result<SanitizedAttachment, FileRejection> {
        let decision = self.classify(&file);
        let (category, content_type) = match decision {
            FileDecision::Document(format) | FileDecision::Image(format) => {
                (format.category(), format.mime_type())
            }
            FileDecision::Cad { .. } => (FileCategory::Cad, CAD_CONTENT_TYPE),
            FileDecision::Rejected(rejection) => return Err(rejection),
        };

        Ok(SanitizedAttachment {
            slot,
            filename: sanitize_filename(&file.file_name),
            content_type: content_type.to_string(),
            category,
            data: file.data,
        })
    }

    fn allowed_types_description(&self) -> String {
        let mut allowed: Vec<String> = self
            .accepted_mime_types
            .iter()
            .filter_map(|m| SignatureFormat::from_mime_type(m))
            .map(|f| f.name().to_string())
            .collect();
        allowed.extend(self.cad_extensions.iter().map(|e| format!(".{}", e)));
        allowed.join(", ")
    }
}

impl Default for FilePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_SIZE_MB * 1024 * 1024)
    }
}

/// Lowercased extension segments after the base name: `a.PDF.exe` -> `["pdf", "exe"]`.
fn extension_segments(filename: &str) -> Vec<String> {
    filename
        .trim()
        .to_lowercase()
        .split('.')
        .skip(1)
        .map(|s| s.trim().to_string())
        .collect()
}

/// Normalize MIME type by stripping parameters (e.g. "image/jpeg; charset=utf-8" -> "image/jpeg").
pub fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_lowercase()
}

/// Replace every character outside `[A-Za-z0-9._-]` with `_`.
///
/// The result, never the client-supplied name, is what gets attached downstream.
/// Names over the length limit lose characters from the stem; the final
/// extension is kept.
pub fn sanitize_filename(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.trim_matches(|c| c == '.' || c == '_').is_empty() {
        return "attachment".to_string();
    }

    // Only ASCII remains, so byte offsets are character offsets.
    if sanitized.len() <= MAX_FILENAME_LENGTH {
        return sanitized;
    }

    match sanitized.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && ext.len() + 1 < MAX_FILENAME_LENGTH => {
            let stem_len = MAX_FILENAME_LENGTH - ext.len() - 1;
            format!("{}.{}", &stem[..stem_len.min(stem.len())], ext)
        }
        _ => sanitized[..MAX_FILENAME_LENGTH].to_string(),
    }
}
