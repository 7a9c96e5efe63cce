#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::unused_async)]

//! # u2net-serve
//!
//! HTTP service that replaces image backgrounds with a solid color using the
//! U2-Net salient object detection network.
//!
//! An upload goes through validation, U2-Net preprocessing and inference. The
//! predicted mask is min-max normalized, resized back to the image with one of
//! six resampling filters (one route each) and used to alpha-composite the
//! image over the background color. The PNG result is returned as a
//! `data:image/png;base64,` string.
//!
//! ## Feature Flags
//!
//! - `tract` (default): Pure Rust inference backend
//! - `onnx`: ONNX Runtime backend with CUDA and `CoreML` execution providers
//! - `cli` (default): `u2net-serve` binary and tracing subscriber setup
//! - `tracing-json`: JSON log output
//!
//! ## Embedding the router
//!
//! ```rust,no_run
//! use u2net_serve::{
//!     backends::MockBackend, server, AppState, BackgroundRemovalProcessor, ServerConfig,
//! };
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServerConfig::default();
//! let processor =
//!     BackgroundRemovalProcessor::new(Box::new(MockBackend::new()), config.background_color);
//! let router = server::build_router(AppState::new(processor, true), config.max_upload_bytes);
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8888").await?;
//! axum::serve(listener, router).await?;
//! # Ok(())
//! # }
//! ```

pub mod backends;
pub mod cache;
#[cfg(feature = "cli")]
pub mod cli;
pub mod compositor;
pub mod config;
pub mod download;
pub mod encoder;
pub mod error;
pub mod inference;
pub mod models;
pub mod processor;
pub mod resample;
pub mod server;
#[cfg(feature = "cli")]
pub mod tracing_config;
pub mod types;
pub mod utils;

pub use backends::{BackendFactory, DefaultBackendFactory};
pub use cache::ModelCache;
pub use config::{BackendType, ExecutionProvider, ServerConfig, ServerConfigBuilder};
pub use download::ModelDownloader;
pub use error::{RemovalError, Result};
pub use inference::InferenceBackend;
pub use models::{ModelInfo, ModelKind, ModelManager, ModelSource, PreprocessingConfig};
pub use processor::BackgroundRemovalProcessor;
pub use resample::ResampleFilter;
pub use server::{build_router, AppState, ApiError, UploadError};
pub use types::{ProcessingTimings, RemovalResult, SegmentationMask};
