//! Multipart extraction for the submission form

use crate::error::multipart_error;
use axum::extract::multipart::{Field, Multipart};
use bytes::BytesMut;
use intake_core::validation::FIELD_SCHEMA;
use intake_core::{AppError, FilePayload, FileSlot, RawSubmission};
use std::collections::HashSet;

/// Upper bound on the bytes kept for one text field. Large enough that any
/// value within the schema's longest limit (2000 chars of up to 4 bytes) fits
/// untouched; anything cut here is still over its length limit.
const MAX_TEXT_FIELD_BYTES: usize = 8 * 1024;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Read the whole multipart body into a [`RawSubmission`].
///
/// - File parts (`file3D`, `file2D`) are streamed chunk by chunk. Past
///   `max_file_size` the buffer is released and only the byte count continues,
///   so an oversized upload never sits in memory.
/// - A file part with no filename and no bytes counts as absent.
/// - Unknown parts are skipped; a known name sent twice is malformed.
pub async fn extract_submission(
    mut multipart: Multipart,
    max_file_size: usize,
) -> Result<RawSubmission, AppError> {
    let mut raw = RawSubmission::default();
    let mut seen: HashSet<String> = HashSet::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        if let Some(slot) = FileSlot::from_field_name(&field_name) {
            if !seen.insert(field_name.clone()) {
                return Err(duplicate_field(&field_name));
            }

            let payload = read_file_part(field, max_file_size).await?;
            tracing::debug!(
                slot = slot.field_name(),
                byte_len = payload.byte_len,
                truncated = payload.is_truncated(),
                "Read file part"
            );

            if !payload.is_absent() {
                raw.set_file(slot, payload);
            }
        } else if FIELD_SCHEMA.iter().any(|rule| rule.name == field_name) {
            if !seen.insert(field_name.clone()) {
                return Err(duplicate_field(&field_name));
            }

            let value = read_text_part(field).await?;
            raw.fields.insert(field_name, value);
        } else {
            tracing::debug!(field = %field_name, "Ignoring unknown multipart field");
        }
    }

    Ok(raw)
}

fn duplicate_field(name: &str) -> AppError {
    AppError::MalformedRequest(format!("duplicate field '{}'", name))
}

async fn read_file_part(
    mut field: Field<'_>,
    max_file_size: usize,
) -> Result<FilePayload, AppError> {
    let file_name = field.file_name().map(|s| s.to_string()).unwrap_or_default();
    let content_type = field
        .content_type()
        .map(|s| s.to_string())
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

    let mut buffer = BytesMut::new();
    let mut byte_len: usize = 0;
    let mut over_cap = false;

    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        byte_len = byte_len.saturating_add(chunk.len());
        if over_cap {
            continue;
        }
        if byte_len > max_file_size {
            over_cap = true;
            buffer = BytesMut::new();
            continue;
        }
        buffer.extend_from_slice(&chunk);
    }

    Ok(FilePayload {
        file_name,
        content_type,
        data: buffer.freeze(),
        byte_len,
    })
}

async fn read_text_part(mut field: Field<'_>) -> Result<String, AppError> {
    let mut buffer: Vec<u8> = Vec::new();
    let mut truncated = false;

    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if truncated {
            continue;
        }
        let room = MAX_TEXT_FIELD_BYTES - buffer.len();
        if chunk.len() > room {
            buffer.extend_from_slice(&chunk[..room]);
            truncated = true;
        } else {
            buffer.extend_from_slice(&chunk);
        }
    }

    if truncated {
        // May have cut a code point in half; the value fails its length rule anyway.
        return Ok(String::from_utf8_lossy(&buffer).into_owned());
    }

    String::from_utf8(buffer)
        .map_err(|_| AppError::MalformedRequest("form field is not valid UTF-8".to_string()))
}
