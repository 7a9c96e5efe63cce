//! Model variants, metadata and on-disk model loading

use crate::error::{RemovalError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Square input resolution shared by both U2-Net variants
pub const U2NET_INPUT_SIZE: usize = 320;

/// U2-Net model variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Full U2-Net (~176 MB)
    #[default]
    U2Net,
    /// Lightweight U2-Net (~4.7 MB)
    U2NetP,
}

impl ModelKind {
    /// Model name as used by the upstream release assets
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::U2Net => "u2net",
            Self::U2NetP => "u2netp",
        }
    }

    /// File name inside the model cache
    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            Self::U2Net => "u2net.onnx",
            Self::U2NetP => "u2netp.onnx",
        }
    }

    /// Default download location of the ONNX export
    #[must_use]
    pub fn default_url(self) -> &'static str {
        match self {
            Self::U2Net => {
                "https://github.com/danielgatis/rembg/releases/download/v0.0.0/u2net.onnx"
            },
            Self::U2NetP => {
                "https://github.com/danielgatis/rembg/releases/download/v0.0.0/u2netp.onnx"
            },
        }
    }

    /// Model shapes in NCHW format: (input, output)
    #[must_use]
    pub fn shapes(self) -> ((usize, usize, usize, usize), (usize, usize, usize, usize)) {
        (
            (1, 3, U2NET_INPUT_SIZE, U2NET_INPUT_SIZE),
            (1, 1, U2NET_INPUT_SIZE, U2NET_INPUT_SIZE),
        )
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ModelKind {
    type Err = RemovalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "u2net" => Ok(Self::U2Net),
            "u2netp" => Ok(Self::U2NetP),
            other => Err(RemovalError::invalid_config(format!(
                "Unknown model '{}'. Expected one of: u2net, u2netp",
                other
            ))),
        }
    }
}

/// Where a model file comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ModelSource {
    /// ONNX file at an explicit filesystem path
    External(PathBuf),
    /// Model resolved from (and if allowed, downloaded into) the cache
    Downloaded(ModelKind),
}

impl ModelSource {
    /// Get a display name for tracing and logging
    #[must_use]
    pub fn display_name(&self) -> String {
        match self {
            ModelSource::External(path) => {
                format!(
                    "external:{}",
                    path.file_name().unwrap_or_default().to_string_lossy()
                )
            },
            ModelSource::Downloaded(kind) => format!("cached:{}", kind),
        }
    }
}

/// Model information and metadata
#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub name: String,
    pub precision: String,
    pub size_bytes: usize,
    pub input_shape: (usize, usize, usize, usize), // NCHW format
    pub output_shape: (usize, usize, usize, usize),
}

/// Preprocessing parameters expected by the network
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessingConfig {
    /// Target (width, height) of the network input
    pub target_size: [u32; 2],
    /// Per-channel mean subtracted after scaling to `[0, 1]`
    pub normalization_mean: [f32; 3],
    /// Per-channel standard deviation divided out after the mean
    pub normalization_std: [f32; 3],
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            target_size: [U2NET_INPUT_SIZE as u32, U2NET_INPUT_SIZE as u32],
            normalization_mean: [0.485, 0.456, 0.406],
            normalization_std: [0.229, 0.224, 0.225],
        }
    }
}

/// Model manager for a single ONNX file on disk
#[derive(Debug, Clone)]
pub struct ModelManager {
    model_path: PathBuf,
    kind: ModelKind,
}

impl ModelManager {
    /// Create a model manager for a model file
    ///
    /// # Errors
    /// - Model path does not exist
    /// - Model path is a directory
    pub fn from_path<P: AsRef<Path>>(model_path: P, kind: ModelKind) -> Result<Self> {
        let model_path = model_path.as_ref().to_path_buf();

        if !model_path.exists() {
            return Err(RemovalError::model_error_with_context(
                "locate",
                &model_path,
                "file does not exist",
                &["pass --model <path>", "allow downloads into the cache"],
            ));
        }

        if !model_path.is_file() {
            return Err(RemovalError::invalid_config(format!(
                "Model path must be a file: {}",
                model_path.display()
            )));
        }

        Ok(Self { model_path, kind })
    }

    /// Load model data
    ///
    /// # Errors
    /// - File I/O errors when reading model data
    pub fn load_model(&self) -> Result<Vec<u8>> {
        std::fs::read(&self.model_path)
            .map_err(|e| RemovalError::file_io_error("read model", &self.model_path, &e))
    }

    /// Get model information
    ///
    /// # Errors
    /// - Model file metadata cannot be read
    pub fn get_info(&self) -> Result<ModelInfo> {
        let metadata = std::fs::metadata(&self.model_path)
            .map_err(|e| RemovalError::file_io_error("inspect model", &self.model_path, &e))?;
        let (input_shape, output_shape) = self.kind.shapes();

        Ok(ModelInfo {
            name: self.kind.name().to_string(),
            precision: "fp32".to_string(),
            size_bytes: metadata.len() as usize,
            input_shape,
            output_shape,
        })
    }

    /// Get preprocessing configuration
    #[must_use]
    pub fn get_preprocessing_config(&self) -> PreprocessingConfig {
        PreprocessingConfig::default()
    }

    /// Get the model file path
    #[must_use]
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Get the model variant
    #[must_use]
    pub fn kind(&self) -> ModelKind {
        self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_model_kind_parsing() {
        assert_eq!("u2net".parse::<ModelKind>().unwrap(), ModelKind::U2Net);
        assert_eq!("U2NetP".parse::<ModelKind>().unwrap(), ModelKind::U2NetP);
        assert!("isnet".parse::<ModelKind>().is_err());
        assert_eq!(ModelKind::U2NetP.to_string(), "u2netp");
        assert_eq!(ModelKind::U2Net.file_name(), "u2net.onnx");
    }

    #[test]
    fn test_source_display_name() {
        let source = ModelSource::External(PathBuf::from("/models/custom.onnx"));
        assert_eq!(source.display_name(), "external:custom.onnx");
        assert_eq!(
            ModelSource::Downloaded(ModelKind::U2Net).display_name(),
            "cached:u2net"
        );
    }

    #[test]
    fn test_model_manager_missing_file() {
        let err = ModelManager::from_path("/definitely/not/here.onnx", ModelKind::U2Net)
            .unwrap_err();
        assert!(matches!(err, RemovalError::Model(_)));
        assert!(err.to_string().contains("/definitely/not/here.onnx"));
    }

    #[test]
    fn test_model_manager_rejects_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = ModelManager::from_path(dir.path(), ModelKind::U2Net).unwrap_err();
        assert!(matches!(err, RemovalError::InvalidConfig(_)));
    }

    #[test]
    fn test_model_manager_info() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0u8; 64]).unwrap();

        let manager = ModelManager::from_path(file.path(), ModelKind::U2NetP).unwrap();
        let info = manager.get_info().unwrap();
        assert_eq!(info.name, "u2netp");
        assert_eq!(info.size_bytes, 64);
        assert_eq!(info.input_shape, (1, 3, 320, 320));
        assert_eq!(info.output_shape, (1, 1, 320, 320));
        assert_eq!(manager.load_model().unwrap().len(), 64);
        assert_eq!(manager.get_preprocessing_config().target_size, [320, 320]);
    }
}
