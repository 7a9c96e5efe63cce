//! Multipart upload extraction and validation

use super::error::ApiError;
use axum::body::Bytes;
use axum::extract::{multipart::MultipartRejection, Multipart};

/// Multipart field that carries the image
pub const FILE_FIELD: &str = "file";

/// Accepted file name extensions, compared case-insensitively
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["jpg", "png", "jpeg"];

/// Client errors reported as `400 {"error": ...}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("missing file")]
    MissingFile,

    #[error("invalid file format")]
    InvalidFormat,

    #[error("empty image")]
    EmptyImage,
}

/// A validated image upload
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub data: Bytes,
}

/// Whether the text after the last `.` of `file_name` is an accepted extension
#[must_use]
pub fn has_allowed_extension(file_name: &str) -> bool {
    file_name.rsplit_once('.').is_some_and(|(_, extension)| {
        ALLOWED_EXTENSIONS
            .iter()
            .any(|allowed| extension.eq_ignore_ascii_case(allowed))
    })
}

/// Pull the `file` field out of the request and validate it
///
/// Checks run in order: presence of a `file` field with a file name, the
/// extension, then a non-empty payload. A request that is not multipart at
/// all counts as a missing file.
///
/// # Errors
/// - `UploadError` for each failed check
/// - `ApiError::Multipart` for a malformed or oversized stream
pub async fn read_upload(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<ImageUpload, ApiError> {
    let Ok(mut multipart) = multipart else {
        return Err(UploadError::MissingFile.into());
    };

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_owned) else {
            continue;
        };

        if !has_allowed_extension(&file_name) {
            return Err(UploadError::InvalidFormat.into());
        }

        let data = field.bytes().await?;
        if data.is_empty() {
            return Err(UploadError::EmptyImage.into());
        }

        return Ok(ImageUpload { file_name, data });
    }

    Err(UploadError::MissingFile.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_extensions() {
        assert!(has_allowed_extension("photo.jpg"));
        assert!(has_allowed_extension("photo.JPEG"));
        assert!(has_allowed_extension("archive.tar.Png"));
        assert!(!has_allowed_extension("photo.gif"));
        assert!(!has_allowed_extension("photo.jpg.exe"));
        assert!(!has_allowed_extension("photo"));
        assert!(!has_allowed_extension(""));
        assert!(!has_allowed_extension("photo."));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(UploadError::MissingFile.to_string(), "missing file");
        assert_eq!(UploadError::InvalidFormat.to_string(), "invalid file format");
        assert_eq!(UploadError::EmptyImage.to_string(), "empty image");
    }
}
