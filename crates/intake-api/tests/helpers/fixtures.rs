//! Test fixtures: file blobs and form builders.

use axum_test::multipart::{MultipartForm, Part};
use bytes::Bytes;

/// STEP (ISO 10303-21) header; CAD files have no fixed signature.
pub fn step_file() -> Vec<u8> {
    b"ISO-10303-21;\nHEADER;\nFILE_DESCRIPTION(('bracket'),'2;1');\nENDSEC;\nDATA;\nENDSEC;\nEND-ISO-10303-21;\n"
        .to_vec()
}

/// Minimal valid PDF.
pub fn pdf_file() -> Vec<u8> {
    b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\ntrailer\n<< /Root 1 0 R >>\n%%EOF\n"
        .to_vec()
}

/// Minimal valid 1x1 PNG bytes.
pub fn png_file() -> Vec<u8> {
    vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00, 0x00, 0x90,
        0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44, 0x41, 0x54, 0x08, 0xD7, 0x63, 0xF8,
        0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x18, 0xDD, 0x8D, 0x89, 0x00, 0x00, 0x00,
        0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ]
}

/// Windows PE header.
pub fn windows_executable() -> Vec<u8> {
    let mut exe = vec![0x4D, 0x5A, 0x90, 0x00, 0x03, 0x00, 0x00, 0x00];
    exe.extend_from_slice(&[0u8; 56]);
    exe
}

pub fn file_part(data: Vec<u8>, file_name: &str, mime_type: &str) -> Part {
    Part::bytes(Bytes::from(data))
        .file_name(file_name)
        .mime_type(mime_type)
}

pub const VALID_FIELDS: &[(&str, &str)] = &[
    ("name", "Ada Lovelace"),
    ("email", "ada@example.com"),
    ("projectName", "Bracket rev B"),
    ("material", "aluminum"),
    ("quantity", "250"),
    ("surfaceTreatment", "Anodized black"),
    ("tolerance", "+/- 0.05 mm on bores\nH7 fit on shaft"),
    ("deliveryDate", "2026-12-01"),
    ("destination", "Lyon, France"),
    ("additionalNotes", "Deburr all edges."),
];

/// Text fields only, with `overrides` replacing or adding values and
/// `omit` removing fields.
pub fn fields_form(overrides: &[(&str, &str)], omit: &[&str]) -> MultipartForm {
    let mut form = MultipartForm::new();
    for (name, value) in VALID_FIELDS {
        if omit.contains(name) || overrides.iter().any(|(o, _)| o == name) {
            continue;
        }
        form = form.add_text(*name, *value);
    }
    for (name, value) in overrides {
        form = form.add_text(*name, *value);
    }
    form
}

/// A complete valid submission with a STEP model.
pub fn valid_form() -> MultipartForm {
    fields_form(&[], &[]).add_part(
        "file3D",
        file_part(step_file(), "bracket.step", "application/octet-stream"),
    )
}
