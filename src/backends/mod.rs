//! Backend implementations for different inference engines
//!
//! - Tract backend (pure Rust, default)
//! - ONNX Runtime backend (GPU acceleration, `onnx` feature)
//! - Mock backend (deterministic, no model file)

pub mod mock;

#[cfg(feature = "onnx")]
pub mod onnx;

#[cfg(feature = "tract")]
pub mod tract;

pub use self::mock::MockBackend;

#[cfg(feature = "onnx")]
pub use self::onnx::OnnxBackend;

#[cfg(feature = "tract")]
pub use self::tract::TractBackend;

use crate::config::BackendType;
use crate::error::{RemovalError, Result};
use crate::inference::InferenceBackend;
use crate::models::ModelManager;

/// Factory trait for creating inference backends
pub trait BackendFactory: Send + Sync {
    /// Create a backend instance of the specified type
    ///
    /// `model_manager` is `None` only for backends that need no model file.
    ///
    /// # Errors
    /// - Backend type not compiled in
    /// - Model manager missing for a model-backed backend
    fn create_backend(
        &self,
        backend_type: BackendType,
        model_manager: Option<ModelManager>,
    ) -> Result<Box<dyn InferenceBackend>>;
}

/// Backend factory covering every backend enabled at compile time
#[derive(Debug, Default)]
pub struct DefaultBackendFactory;

impl BackendFactory for DefaultBackendFactory {
    fn create_backend(
        &self,
        backend_type: BackendType,
        model_manager: Option<ModelManager>,
    ) -> Result<Box<dyn InferenceBackend>> {
        match backend_type {
            BackendType::Mock => Ok(Box::new(MockBackend::new())),
            #[cfg(feature = "tract")]
            BackendType::Tract => {
                let manager = model_manager.ok_or_else(|| {
                    RemovalError::model("Tract backend requires a model file")
                })?;
                Ok(Box::new(TractBackend::with_model_manager(manager)))
            },
            #[cfg(feature = "onnx")]
            BackendType::Onnx => {
                let manager = model_manager
                    .ok_or_else(|| RemovalError::model("ONNX backend requires a model file"))?;
                Ok(Box::new(OnnxBackend::with_model_manager(manager)))
            },
            #[allow(unreachable_patterns)]
            other => {
                #[cfg(not(any(feature = "tract", feature = "onnx")))]
                let _ = model_manager;
                Err(RemovalError::invalid_config(format!(
                    "Backend '{}' is not compiled in. Rebuild with --features {}",
                    other, other
                )))
            },
        }
    }
}
