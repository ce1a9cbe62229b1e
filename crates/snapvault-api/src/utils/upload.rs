//! Multipart intake for upload handlers

use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use snapvault_core::UploadError;
use snapvault_processing::UploadSubmission;

/// Name of the multipart field carrying the image.
pub const FILE_FIELD: &str = "file";

fn map_multipart_error(err: MultipartError, max_bytes: usize) -> UploadError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::FileTooLarge { max: max_bytes }
    } else {
        // Incomplete read: nothing has been committed yet
        UploadError::NoFile(format!("Failed to read upload: {}", err.body_text()))
    }
}

/// Read the `file` field into a submission.
///
/// Reading stops as soon as more than `max_bytes` have been buffered, so an
/// oversized upload costs at most `max_bytes + 1` bytes of memory before the
/// validator rejects it. A request without a `file` field yields a submission
/// with no filename. Other fields are ignored.
pub async fn read_file_field(
    mut multipart: Multipart,
    max_bytes: usize,
) -> Result<UploadSubmission, UploadError> {
    let mut submission: Option<UploadSubmission> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| map_multipart_error(e, max_bytes))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        if submission.is_some() {
            return Err(UploadError::NoFile(
                "Multiple file fields are not allowed; send exactly one field named 'file'"
                    .to_string(),
            ));
        }

        let filename = field.file_name().map(str::to_string);
        let mut data = Vec::new();

        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| map_multipart_error(e, max_bytes))?
        {
            data.extend_from_slice(&chunk);
            if data.len() > max_bytes {
                data.truncate(max_bytes + 1);
                tracing::debug!(max_bytes, "Upload exceeds size limit, stopped reading");
                return Ok(UploadSubmission {
                    filename,
                    data,
                    source_address: None,
                });
            }
        }

        submission = Some(UploadSubmission {
            filename,
            data,
            source_address: None,
        });
    }

    Ok(submission.unwrap_or_default())
}
