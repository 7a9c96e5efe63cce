//! Model cache directory management
//!
//! Downloaded ONNX files live in an XDG-compliant cache directory
//! (`~/.cache/u2net-serve/models` on Linux) unless overridden by the
//! `U2NET_SERVE_CACHE_DIR` environment variable or an explicit path.

use crate::error::{RemovalError, Result};
use crate::models::ModelKind;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the cache root
pub const CACHE_DIR_ENV: &str = "U2NET_SERVE_CACHE_DIR";

/// Model cache rooted at a single directory
#[derive(Debug, Clone)]
pub struct ModelCache {
    cache_dir: PathBuf,
}

impl ModelCache {
    /// Create a cache in the default location, creating it if needed
    ///
    /// # Errors
    /// - Failed to determine the user cache directory
    /// - Failed to create the cache directory
    pub fn new() -> Result<Self> {
        let cache_dir = Self::get_cache_dir()?;
        Self::at(cache_dir)
    }

    /// Create a cache under a custom root (models go in `<root>/models`)
    ///
    /// # Errors
    /// - Failed to create the cache directory
    pub fn with_custom_cache_dir<P: AsRef<Path>>(root: P) -> Result<Self> {
        Self::at(root.as_ref().join("models"))
    }

    fn at(cache_dir: PathBuf) -> Result<Self> {
        if !cache_dir.exists() {
            fs::create_dir_all(&cache_dir).map_err(|e| {
                RemovalError::file_io_error("create cache directory", &cache_dir, &e)
            })?;
        }

        Ok(Self { cache_dir })
    }

    fn get_cache_dir() -> Result<PathBuf> {
        if let Ok(cache_override) = std::env::var(CACHE_DIR_ENV) {
            return Ok(PathBuf::from(cache_override).join("models"));
        }

        Ok(dirs::cache_dir()
            .ok_or_else(|| {
                RemovalError::invalid_config(format!(
                    "Failed to determine cache directory. Set {} environment variable.",
                    CACHE_DIR_ENV
                ))
            })?
            .join("u2net-serve")
            .join("models"))
    }

    /// Directory holding cached model files
    #[must_use]
    pub fn get_current_cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Path a model occupies in the cache, whether or not it exists yet
    #[must_use]
    pub fn model_path(&self, kind: ModelKind) -> PathBuf {
        self.cache_dir.join(kind.file_name())
    }

    /// Whether a non-empty model file is present for `kind`
    #[must_use]
    pub fn is_model_cached(&self, kind: ModelKind) -> bool {
        fs::metadata(self.model_path(kind))
            .map(|m| m.is_file() && m.len() > 0)
            .unwrap_or(false)
    }
}
