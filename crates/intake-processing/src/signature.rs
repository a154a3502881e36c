//! File signature inspection
//!
//! Identifies formats by their leading bytes, never by the client-declared
//! content type or extension.

use intake_core::FileCategory;

/// Formats with a fixed leading-byte signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureFormat {
    Pdf,
    Jpeg,
    Png,
}

impl SignatureFormat {
    pub const ALL: [SignatureFormat; 3] = [
        SignatureFormat::Pdf,
        SignatureFormat::Jpeg,
        SignatureFormat::Png,
    ];

    /// Exact leading bytes of the format.
    pub const fn magic(&self) -> &'static [u8] {
        match self {
            // %PDF
            SignatureFormat::Pdf => &[0x25, 0x50, 0x44, 0x46],
            SignatureFormat::Jpeg => &[0xFF, 0xD8, 0xFF],
            SignatureFormat::Png => &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A],
        }
    }

    /// Canonical MIME type.
    pub const fn mime_type(&self) -> &'static str {
        match self {
            SignatureFormat::Pdf => "application/pdf",
            SignatureFormat::Jpeg => "image/jpeg",
            SignatureFormat::Png => "image/png",
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            SignatureFormat::Pdf => "PDF",
            SignatureFormat::Jpeg => "JPEG",
            SignatureFormat::Png => "PNG",
        }
    }

    pub const fn category(&self) -> FileCategory {
        match self {
            SignatureFormat::Pdf => FileCategory::Document,
            SignatureFormat::Jpeg | SignatureFormat::Png => FileCategory::Image,
        }
    }

    /// Format claimed by a (normalized, lowercase) MIME type.
    pub fn from_mime_type(mime_type: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.mime_type() == mime_type)
    }
}

/// Report whether `data` starts with the signature of `format`.
pub fn matches_signature(data: &[u8], format: SignatureFormat) -> bool {
    data.starts_with(format.magic())
}

/// Executable formats that must never pass as a CAD file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutableKind {
    /// Windows PE/DOS executable, `MZ`
    WindowsPe,
    /// ELF binary, `\x7FELF`
    Elf,
}

impl ExecutableKind {
    pub const fn marker(&self) -> &'static [u8] {
        match self {
            ExecutableKind::WindowsPe => &[0x4D, 0x5A],
            ExecutableKind::Elf => &[0x7F, 0x45, 0x4C, 0x46],
        }
    }
}

/// Detect a known executable header at the start of `data`.
pub fn detect_executable(data: &[u8]) -> Option<ExecutableKind> {
    [ExecutableKind::WindowsPe, ExecutableKind::Elf]
        .into_iter()
        .find(|kind| data.starts_with(kind.marker()))
}
