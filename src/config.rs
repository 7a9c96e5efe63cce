//! Configuration types for the background replacement server

use crate::error::{RemovalError, Result};
use crate::models::{ModelKind, ModelSource};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Background color painted behind the foreground mask
pub const DEFAULT_BACKGROUND_COLOR: [u8; 3] = [83, 40, 130];

/// Listen port used when neither `--port` nor `PORT` is given
pub const DEFAULT_PORT: u16 = 8888;

/// Upload body limit; large enough for camera-sized JPEGs
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Execution provider options for ONNX Runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionProvider {
    /// Auto-detect best available provider (CUDA > `CoreML` > CPU)
    #[default]
    Auto,
    /// CPU execution (always available)
    Cpu,
    /// NVIDIA CUDA GPU acceleration
    Cuda,
    /// Apple Silicon GPU acceleration
    CoreMl,
}

impl std::fmt::Display for ExecutionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Cpu => write!(f, "cpu"),
            Self::Cuda => write!(f, "cuda"),
            Self::CoreMl => write!(f, "coreml"),
        }
    }
}

/// Inference backend selected at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    /// Tract backend (pure Rust, no external dependencies)
    #[default]
    Tract,
    /// ONNX Runtime backend (supports GPU acceleration)
    Onnx,
    /// Deterministic mock backend, no model file required
    Mock,
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tract => write!(f, "tract"),
            Self::Onnx => write!(f, "onnx"),
            Self::Mock => write!(f, "mock"),
        }
    }
}

/// Configuration for the HTTP service and the model it serves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host name or address to bind
    pub host: String,

    /// TCP port to listen on
    pub port: u16,

    /// Debug mode: verbose logging and error details in 500 bodies
    pub debug: bool,

    /// Backend used to run the segmentation network
    pub backend_type: BackendType,

    /// Execution provider for ONNX Runtime
    pub execution_provider: ExecutionProvider,

    /// Number of intra-op threads for inference (0 = auto)
    pub intra_threads: usize,

    /// Which U2-Net variant to serve
    pub model_kind: ModelKind,

    /// Where the model file comes from
    pub model_source: ModelSource,

    /// Model cache directory override
    pub cache_dir: Option<PathBuf>,

    /// Whether a missing cached model may be downloaded at startup
    pub allow_download: bool,

    /// Hex SHA-256 a freshly downloaded model must match
    pub model_sha256: Option<String>,

    /// RGB background color for composited output
    pub background_color: [u8; 3],

    /// Maximum accepted request body size in bytes
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            debug: true,
            backend_type: BackendType::default(),
            execution_provider: ExecutionProvider::default(),
            intra_threads: 0,
            model_kind: ModelKind::default(),
            model_source: ModelSource::Downloaded(ModelKind::default()),
            cache_dir: None,
            allow_download: true,
            model_sha256: None,
            background_color: DEFAULT_BACKGROUND_COLOR,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    /// Create a new configuration builder
    ///
    /// # Examples
    /// ```rust
    /// use u2net_serve::ServerConfig;
    ///
    /// let config = ServerConfig::builder()
    ///     .port(9000)
    ///     .debug(false)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.port, 9000);
    /// ```
    #[must_use]
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(RemovalError::invalid_config("host must not be empty"));
        }

        if self.port == 0 {
            return Err(RemovalError::config_value_error("port", self.port, "1-65535"));
        }

        if self.max_upload_bytes == 0 {
            return Err(RemovalError::config_value_error(
                "max upload size",
                self.max_upload_bytes,
                "> 0 bytes",
            ));
        }

        if let Some(digest) = &self.model_sha256 {
            if digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(RemovalError::config_value_error(
                    "model SHA-256",
                    digest,
                    "64 hex characters",
                ));
            }
        }

        Ok(())
    }

    /// `host:port` string suitable for logging and binding
    #[must_use]
    pub fn socket_addr_string(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Builder for `ServerConfig`
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    #[must_use]
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.host = host.into();
        self
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    #[must_use]
    pub fn backend_type(mut self, backend_type: BackendType) -> Self {
        self.config.backend_type = backend_type;
        self
    }

    #[must_use]
    pub fn execution_provider(mut self, provider: ExecutionProvider) -> Self {
        self.config.execution_provider = provider;
        self
    }

    #[must_use]
    pub fn intra_threads(mut self, threads: usize) -> Self {
        self.config.intra_threads = threads;
        self
    }

    /// Select the model variant; a downloaded source follows the variant
    #[must_use]
    pub fn model_kind(mut self, kind: ModelKind) -> Self {
        self.config.model_kind = kind;
        if let ModelSource::Downloaded(_) = self.config.model_source {
            self.config.model_source = ModelSource::Downloaded(kind);
        }
        self
    }

    #[must_use]
    pub fn model_source(mut self, source: ModelSource) -> Self {
        self.config.model_source = source;
        self
    }

    #[must_use]
    pub fn cache_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.config.cache_dir = dir;
        self
    }

    #[must_use]
    pub fn allow_download(mut self, allow: bool) -> Self {
        self.config.allow_download = allow;
        self
    }

    #[must_use]
    pub fn model_sha256(mut self, digest: Option<String>) -> Self {
        self.config.model_sha256 = digest;
        self
    }

    #[must_use]
    pub fn background_color(mut self, color: [u8; 3]) -> Self {
        self.config.background_color = color;
        self
    }

    #[must_use]
    pub fn max_upload_bytes(mut self, bytes: usize) -> Self {
        self.config.max_upload_bytes = bytes;
        self
    }

    /// Build the configuration, validating it first
    pub fn build(self) -> Result<ServerConfig> {
        let config = self.config;
        config.validate()?;
        Ok(config)
    }
}
