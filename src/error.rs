//! Crate-wide error enum
//!
//! The HTTP layer maps every variant here to a 500; upload validation has
//! its own error type in `server::upload`.

use thiserror::Error;

/// Shorthand used across the crate
pub type Result<T> = std::result::Result<T, RemovalError>;

/// Failure while starting the server, loading a model or serving one image
#[derive(Error, Debug)]
pub enum RemovalError {
    /// Filesystem failure, usually carrying the path it happened on
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Upload bytes could not be decoded, or the PNG could not be written
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// The network failed to run or returned no usable tensor
    #[error("Inference error: {0}")]
    Inference(String),

    /// Rejected by `ServerConfig::validate` or a CLI conversion
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Model file missing, unreadable or not a loadable graph
    #[error("Model error: {0}")]
    Model(String),

    /// Mask normalization, resize or compositing went wrong
    #[error("Processing error: {0}")]
    Processing(String),

    /// Fetching a model into the cache failed or its digest did not match
    #[error("Download error: {0}")]
    Download(String),

    /// Poisoned lock, panicked worker and similar
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RemovalError {
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn model<S: Into<String>>(msg: S) -> Self {
        Self::Model(msg.into())
    }

    pub fn processing<S: Into<String>>(msg: S) -> Self {
        Self::Processing(msg.into())
    }

    pub fn inference<S: Into<String>>(msg: S) -> Self {
        Self::Inference(msg.into())
    }

    pub fn download<S: Into<String>>(msg: S) -> Self {
        Self::Download(msg.into())
    }

    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// I/O error prefixed with `Failed to <operation> '<path>'`, keeping the kind
    pub fn file_io_error<P: AsRef<std::path::Path>>(
        operation: &str,
        path: P,
        error: &std::io::Error,
    ) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {} '{}': {}", operation, path_display, error),
        ))
    }

    /// Model error that lists what the operator can try next
    pub fn model_error_with_context<P: AsRef<std::path::Path>>(
        operation: &str,
        model_path: P,
        error: &str,
        suggestions: &[&str],
    ) -> Self {
        let path_display = model_path.as_ref().display();
        let suggestion_text = if suggestions.is_empty() {
            String::new()
        } else {
            format!(" Suggestions: {}", suggestions.join(", "))
        };

        Self::Model(format!(
            "Failed to {} model '{}': {}.{}",
            operation, path_display, error, suggestion_text
        ))
    }

    /// Configuration error naming the offending value and what is accepted
    pub fn config_value_error<T: std::fmt::Display>(
        parameter: &str,
        value: T,
        valid_range: &str,
    ) -> Self {
        Self::InvalidConfig(format!(
            "Invalid {}: {} (valid range: {})",
            parameter, value, valid_range
        ))
    }

    /// Processing error tagged with the pipeline stage and optional input label
    pub fn processing_stage_error(stage: &str, details: &str, input_info: Option<&str>) -> Self {
        let input_context = match input_info {
            Some(info) => format!(" (input: {})", info),
            None => String::new(),
        };

        Self::Processing(format!(
            "Processing failed at stage '{}'{}: {}",
            stage, input_context, details
        ))
    }
}

impl From<reqwest::Error> for RemovalError {
    fn from(error: reqwest::Error) -> Self {
        Self::Download(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_error_display() {
        let err = RemovalError::invalid_config("port must not be zero");
        assert_eq!(err.to_string(), "Invalid configuration: port must not be zero");

        let err = RemovalError::inference("no output tensor");
        assert!(matches!(err, RemovalError::Inference(_)));
    }

    #[test]
    fn test_enhanced_error_context() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = RemovalError::file_io_error("read model", Path::new("/models/u2net.onnx"), &io_error);
        let error_string = err.to_string();
        assert!(error_string.contains("read model"));
        assert!(error_string.contains("/models/u2net.onnx"));

        let err = RemovalError::model_error_with_context(
            "load",
            Path::new("/models/u2net.onnx"),
            "file not found",
            &["pass --model", "allow downloads"],
        );
        let error_string = err.to_string();
        assert!(error_string.contains("Suggestions: pass --model, allow downloads"));

        let err = RemovalError::config_value_error("port", 0, "1-65535");
        assert_eq!(err.to_string(), "Invalid configuration: Invalid port: 0 (valid range: 1-65535)");

        let err = RemovalError::processing_stage_error("decode", "unexpected EOF", Some("photo.png"));
        let error_string = err.to_string();
        assert!(error_string.contains("'decode'"));
        assert!(error_string.contains("photo.png"));
    }
}
