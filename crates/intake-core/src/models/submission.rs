use bytes::Bytes;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Upload slot a file arrived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileSlot {
    /// `file3D`: the 3D model, required for every submission
    Primary3D,
    /// `file2D`: an optional technical drawing
    Drawing2D,
}

impl FileSlot {
    /// All slots in attachment order.
    pub const ALL: [FileSlot; 2] = [FileSlot::Primary3D, FileSlot::Drawing2D];

    /// Multipart field name carrying this slot.
    pub fn field_name(&self) -> &'static str {
        match self {
            FileSlot::Primary3D => "file3D",
            FileSlot::Drawing2D => "file2D",
        }
    }

    /// Human-readable label used as the prefix of rejection messages.
    pub fn label(&self) -> &'static str {
        match self {
            FileSlot::Primary3D => "3D File",
            FileSlot::Drawing2D => "2D File",
        }
    }

    pub fn from_field_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.field_name() == name)
    }

    pub fn is_required(&self) -> bool {
        matches!(self, FileSlot::Primary3D)
    }

    /// Field violation message when a required slot is empty.
    pub fn missing_message(&self) -> &'static str {
        match self {
            FileSlot::Primary3D => "3D file is required",
            FileSlot::Drawing2D => "2D file is required",
        }
    }
}

impl fmt::Display for FileSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// One uploaded file as read from the transport.
///
/// `byte_len` is the number of bytes the client actually sent. When the upload
/// exceeded the per-file cap the buffer is released while reading, so `data`
/// may be shorter than `byte_len`.
#[derive(Debug, Clone)]
pub struct FilePayload {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
    pub byte_len: usize,
}

impl FilePayload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        let data = data.into();
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            byte_len: data.len(),
            data,
        }
    }

    /// A part with no filename and no content (what a browser sends for an
    /// untouched file input) counts as absent.
    pub fn is_absent(&self) -> bool {
        self.byte_len == 0 && self.file_name.trim().is_empty()
    }

    /// True when the buffer was dropped because the upload exceeded the cap.
    pub fn is_truncated(&self) -> bool {
        self.byte_len > self.data.len()
    }
}

/// Untyped input of one submission request.
#[derive(Debug, Clone, Default)]
pub struct RawSubmission {
    pub fields: HashMap<String, String>,
    pub file_3d: Option<FilePayload>,
    pub file_2d: Option<FilePayload>,
}

impl RawSubmission {
    pub fn file(&self, slot: FileSlot) -> Option<&FilePayload> {
        match slot {
            FileSlot::Primary3D => self.file_3d.as_ref(),
            FileSlot::Drawing2D => self.file_2d.as_ref(),
        }
    }

    pub fn set_file(&mut self, slot: FileSlot, payload: FilePayload) {
        match slot {
            FileSlot::Primary3D => self.file_3d = Some(payload),
            FileSlot::Drawing2D => self.file_2d = Some(payload),
        }
    }
}

/// Material choices offered by the intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Material {
    Aluminum,
    Steel,
    Plastic,
    Titanium,
    Copper,
    Other,
}

impl Material {
    pub const ALL: [Material; 6] = [
        Material::Aluminum,
        Material::Steel,
        Material::Plastic,
        Material::Titanium,
        Material::Copper,
        Material::Other,
    ];

    /// Wire token, exactly as submitted by the form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Material::Aluminum => "aluminum",
            Material::Steel => "steel",
            Material::Plastic => "plastic",
            Material::Titanium => "titanium",
            Material::Copper => "copper",
            Material::Other => "other",
        }
    }

    /// Label shown to the people reading the notification.
    pub fn display_name(&self) -> &'static str {
        match self {
            Material::Aluminum => "Aluminum (6061, 7075)",
            Material::Steel => "Steel (Stainless, Carbon)",
            Material::Plastic => "Plastic (ABS, PC, PEEK)",
            Material::Titanium => "Titanium",
            Material::Copper => "Copper/Brass",
            Material::Other => "Other (specify in notes)",
        }
    }

    /// Exact, case-sensitive token match.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == token)
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content category an accepted file was classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Document,
    Image,
    Cad,
}

impl FileCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileCategory::Document => "document",
            FileCategory::Image => "image",
            FileCategory::Cad => "cad",
        }
    }
}

/// Which check a rejected file failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileRejectionKind {
    Size,
    Extension,
    Signature,
    Executable,
    UnsupportedType,
}

impl FileRejectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileRejectionKind::Size => "size",
            FileRejectionKind::Extension => "extension",
            FileRejectionKind::Signature => "signature",
            FileRejectionKind::Executable => "executable",
            FileRejectionKind::UnsupportedType => "unsupported_type",
        }
    }
}

/// A single schema violation on a named form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Typed, bounded and sanitized form fields.
///
/// Optional fields that were not submitted are empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionFields {
    pub name: String,
    pub email: String,
    pub project_name: String,
    pub material: Material,
    pub quantity: u32,
    pub surface_treatment: String,
    pub tolerance: String,
    pub delivery_date: Option<NaiveDate>,
    pub destination: String,
    pub additional_notes: String,
}

/// An accepted upload, renamed to a safe filename.
#[derive(Debug, Clone)]
pub struct SanitizedAttachment {
    pub slot: FileSlot,
    pub filename: String,
    pub content_type: String,
    pub category: FileCategory,
    pub data: Bytes,
}

impl SanitizedAttachment {
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Output of a successful validation pass.
///
/// Owned by the request that produced it and handed once to the notification
/// dispatcher; deliberately not `Clone`.
#[derive(Debug)]
pub struct ValidatedSubmission {
    pub id: Uuid,
    pub fields: SubmissionFields,
    pub attachments: Vec<SanitizedAttachment>,
}
