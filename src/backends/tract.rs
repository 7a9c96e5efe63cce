//! Tract backend implementation for U2-Net
//!
//! Tract is a pure Rust ONNX inference engine. This is the default backend of
//! the server.

use crate::config::ServerConfig;
use crate::error::{RemovalError, Result};
use crate::inference::InferenceBackend;
use crate::models::{ModelInfo, ModelManager, PreprocessingConfig};
use log;
use ndarray::Array4;
use tract_onnx::prelude::*;

/// Type alias for the complex Tract model type to reduce complexity warnings
type TractModel = RunnableModel<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

// Use instant crate for cross-platform time compatibility
use instant::{Duration, Instant};

/// Tract backend for running U2-Net using pure Rust inference
#[derive(Debug)]
pub struct TractBackend {
    model: Option<TractModel>,
    model_manager: Option<ModelManager>,
    initialized: bool,
}

impl TractBackend {
    /// Create a new uninitialized Tract backend
    #[must_use]
    pub fn new() -> Self {
        Self {
            model: None,
            model_manager: None,
            initialized: false,
        }
    }

    /// Create a Tract backend with a pre-configured model manager
    #[must_use]
    pub fn with_model_manager(model_manager: ModelManager) -> Self {
        Self {
            model: None,
            model_manager: Some(model_manager),
            initialized: false,
        }
    }

    /// Load and initialize the model using Tract
    fn load_model(&mut self) -> Result<Duration> {
        let model_load_start = Instant::now();

        let Some(ref model_manager) = self.model_manager else {
            return Err(RemovalError::model(
                "No model manager available for Tract backend",
            ));
        };

        let model_data = model_manager.load_model()?;
        let model_info = model_manager.get_info()?;
        let (n, c, h, w) = model_info.input_shape;

        log::info!("Initializing Tract backend");
        log::info!("Model: {} ({})", model_info.name, model_info.precision);
        #[allow(clippy::cast_precision_loss)] // Precision loss acceptable for logging display
        let size_mb = model_info.size_bytes as f64 / (1024.0 * 1024.0);
        log::info!("Model size: {size_mb:.2} MB");

        log::debug!("Creating Tract model from ONNX data...");
        let model = onnx()
            .model_for_read(&mut std::io::Cursor::new(model_data))
            .map_err(|e| RemovalError::model(format!("Failed to load ONNX model: {e}")))?
            .with_input_fact(0, f32::fact([n, c, h, w]).into())
            .map_err(|e| RemovalError::model(format!("Failed to set input shape: {e}")))?
            .into_optimized()
            .map_err(|e| RemovalError::model(format!("Failed to optimize model: {e}")))?
            .into_runnable()
            .map_err(|e| RemovalError::model(format!("Failed to create runnable model: {e}")))?;

        self.model = Some(model);
        self.initialized = true;

        let model_load_time = model_load_start.elapsed();
        log::info!(
            "Tract backend initialized in {}ms",
            model_load_time.as_millis()
        );

        Ok(model_load_time)
    }
}

impl Default for TractBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InferenceBackend for TractBackend {
    fn initialize(&mut self, _config: &ServerConfig) -> Result<Option<Duration>> {
        if self.initialized {
            return Ok(None);
        }

        let model_load_time = self.load_model()?;
        Ok(Some(model_load_time))
    }

    fn infer(&mut self, input: &Array4<f32>) -> Result<Array4<f32>> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| RemovalError::inference("Tract model not initialized"))?;

        log::debug!("Running Tract inference on {:?}", input.shape());
        let inference_start = Instant::now();

        let (n, c, h, w) = input.dim();
        let input_data: Vec<f32> = input.iter().copied().collect();
        let input_tensor = Tensor::from_shape(&[n, c, h, w], &input_data)
            .map_err(|e| RemovalError::inference(format!("Failed to build input tensor: {e}")))?;
        let outputs = model
            .run(tvec![input_tensor.into()])
            .map_err(|e| RemovalError::inference(format!("Tract inference failed: {e}")))?;

        // U2-Net emits seven side outputs; the first is the fused map
        let output_tensor = outputs
            .into_iter()
            .next()
            .ok_or_else(|| RemovalError::inference("No output tensor found"))?
            .into_arc_tensor();

        let output_data = output_tensor.to_array_view::<f32>().map_err(|e| {
            RemovalError::inference(format!("Failed to convert output tensor: {e}"))
        })?;

        let output_shape = output_data.shape();
        let &[on, oc, oh, ow] = output_shape else {
            return Err(RemovalError::inference(format!(
                "Expected 4D output tensor, got {}D",
                output_shape.len()
            )));
        };

        let output_array =
            Array4::from_shape_vec((on, oc, oh, ow), output_data.iter().copied().collect())
                .map_err(|e| {
                    RemovalError::inference(format!("Failed to reshape output tensor: {e}"))
                })?;

        log::debug!(
            "Tract inference completed in {}ms, output {:?}",
            inference_start.elapsed().as_millis(),
            output_array.shape()
        );

        Ok(output_array)
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn input_shape(&self) -> (usize, usize, usize, usize) {
        self.model_manager
            .as_ref()
            .map_or((1, 3, 320, 320), |manager| manager.kind().shapes().0)
    }

    fn output_shape(&self) -> (usize, usize, usize, usize) {
        self.model_manager
            .as_ref()
            .map_or((1, 1, 320, 320), |manager| manager.kind().shapes().1)
    }

    fn get_preprocessing_config(&self) -> Result<PreprocessingConfig> {
        let model_manager = self
            .model_manager
            .as_ref()
            .ok_or_else(|| RemovalError::internal("Model manager not initialized"))?;
        Ok(model_manager.get_preprocessing_config())
    }

    fn get_model_info(&self) -> Result<ModelInfo> {
        let model_manager = self
            .model_manager
            .as_ref()
            .ok_or_else(|| RemovalError::internal("Model manager not initialized"))?;
        model_manager.get_info()
    }
}
