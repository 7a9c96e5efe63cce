//! Inference backend abstraction

use crate::{
    config::ServerConfig,
    error::Result,
    models::{ModelInfo, PreprocessingConfig},
};
use ndarray::Array4;

// Use instant crate for cross-platform time compatibility
use instant::Duration;

/// Trait for inference backends
///
/// Backends are driven from a blocking worker thread and must be `Send`.
pub trait InferenceBackend: Send {
    /// Initialize the backend with the given configuration
    ///
    /// Returns the model load time, or `None` if the backend was already initialized.
    ///
    /// # Errors
    /// - Model loading or validation errors
    /// - Invalid configuration parameters
    fn initialize(&mut self, config: &ServerConfig) -> Result<Option<Duration>>;

    /// Run inference on a `[1, 3, H, W]` input tensor, returning the `[1, 1, H, W]` saliency map
    ///
    /// # Errors
    /// - Backend not initialized
    /// - Model inference failures
    /// - Unexpected output tensor rank
    fn infer(&mut self, input: &Array4<f32>) -> Result<Array4<f32>>;

    /// Get the expected input shape for this backend
    fn input_shape(&self) -> (usize, usize, usize, usize);

    /// Get the expected output shape for this backend
    fn output_shape(&self) -> (usize, usize, usize, usize);

    /// Get preprocessing configuration for this backend
    ///
    /// # Errors
    /// - Model manager not available
    fn get_preprocessing_config(&self) -> Result<PreprocessingConfig>;

    /// Get model information for this backend
    ///
    /// # Errors
    /// - Model manager not available or model metadata unreadable
    fn get_model_info(&self) -> Result<ModelInfo>;

    /// Check if backend is initialized
    fn is_initialized(&self) -> bool;
}
