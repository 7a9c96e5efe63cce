//! ONNX Runtime backend implementation for U2-Net
//!
//! Uses ONNX Runtime with selectable execution providers (CPU, CUDA, `CoreML`).
//! Providers that are requested but unavailable fall back to CPU with a warning.

use crate::config::{ExecutionProvider, ServerConfig};
use crate::error::{RemovalError, Result};
use crate::inference::InferenceBackend;
use crate::models::{ModelInfo, ModelManager, PreprocessingConfig};
use log;
use ndarray::Array4;
use ort::execution_providers::{
    CUDAExecutionProvider, CoreMLExecutionProvider, ExecutionProvider as OrtExecutionProvider,
};
use ort::session::{builder::GraphOptimizationLevel, builder::SessionBuilder, Session};
use ort::{self, value::Value};

/// ONNX Runtime backend for running U2-Net
#[derive(Debug)]
pub struct OnnxBackend {
    session: Option<Session>,
    model_manager: Option<ModelManager>,
    initialized: bool,
}

impl OnnxBackend {
    /// Create a new ONNX backend with specific model manager
    #[must_use]
    pub fn with_model_manager(model_manager: ModelManager) -> Self {
        Self {
            session: None,
            model_manager: Some(model_manager),
            initialized: false,
        }
    }

    /// Create a new ONNX backend without a model; `initialize` will fail until one is set
    #[must_use]
    pub fn new() -> Self {
        Self {
            session: None,
            model_manager: None,
            initialized: false,
        }
    }

    fn configure_providers(
        session_builder: SessionBuilder,
        provider: ExecutionProvider,
    ) -> Result<SessionBuilder> {
        let cuda_provider = CUDAExecutionProvider::default();
        let coreml_provider = CoreMLExecutionProvider::default().with_subgraphs(true);
        let cuda_available = OrtExecutionProvider::is_available(&cuda_provider).unwrap_or(false);
        let coreml_available =
            OrtExecutionProvider::is_available(&coreml_provider).unwrap_or(false);

        let providers = match provider {
            ExecutionProvider::Cpu => {
                log::info!("Using CPU execution provider");
                Vec::new()
            },
            ExecutionProvider::Auto => {
                let mut providers = Vec::new();
                if cuda_available {
                    log::info!("CUDA execution provider is available and will be used");
                    providers.push(cuda_provider.build());
                }
                if coreml_available {
                    log::info!("CoreML execution provider is available and will be used");
                    providers.push(coreml_provider.build());
                }
                if providers.is_empty() {
                    log::warn!("No hardware acceleration available, falling back to CPU");
                }
                providers
            },
            ExecutionProvider::Cuda if cuda_available => {
                log::info!("Using CUDA execution provider");
                vec![cuda_provider.build()]
            },
            ExecutionProvider::CoreMl if coreml_available => {
                log::info!("Using CoreML execution provider");
                vec![coreml_provider.build()]
            },
            ExecutionProvider::Cuda | ExecutionProvider::CoreMl => {
                log::warn!(
                    "{provider} execution provider requested but not available, falling back to CPU"
                );
                Vec::new()
            },
        };

        if providers.is_empty() {
            return Ok(session_builder);
        }

        session_builder
            .with_execution_providers(providers)
            .map_err(|e| {
                RemovalError::inference(format!("Failed to set execution providers: {e}"))
            })
    }

    /// Load and initialize the ONNX model
    fn load_model(&mut self, config: &ServerConfig) -> Result<std::time::Duration> {
        let model_load_start = std::time::Instant::now();
        let model_manager = self
            .model_manager
            .as_ref()
            .ok_or_else(|| RemovalError::model("No model manager available for ONNX backend"))?;

        let model_data = model_manager.load_model()?;
        let model_info = model_manager.get_info()?;

        let session_builder = Session::builder()
            .map_err(|e| {
                RemovalError::inference(format!("Failed to create session builder: {e}"))
            })?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| {
                RemovalError::inference(format!("Failed to set optimization level: {e}"))
            })?;

        let session_builder =
            Self::configure_providers(session_builder, config.execution_provider)?;

        let intra_threads = if config.intra_threads > 0 {
            config.intra_threads
        } else {
            std::thread::available_parallelism()
                .map(std::num::NonZeroUsize::get)
                .unwrap_or(4)
        };

        let session = session_builder
            .with_intra_threads(intra_threads)
            .map_err(|e| RemovalError::inference(format!("Failed to set intra threads: {e}")))?
            .commit_from_memory(&model_data)
            .map_err(|e| {
                RemovalError::inference(format!("Failed to create session from model data: {e}"))
            })?;

        log::debug!("ONNX Runtime session created");
        log::debug!("  - Requested provider: {}", config.execution_provider);
        log::debug!("  - Threading: {intra_threads} intra-op threads");
        log::debug!("  - Model: {} ({})", model_info.name, model_info.precision);

        self.session = Some(session);
        self.initialized = true;

        let model_load_time = model_load_start.elapsed();
        log::info!(
            "Model loading complete: {:.0}ms",
            model_load_time.as_secs_f64() * 1000.0
        );

        Ok(model_load_time)
    }
}

impl Default for OnnxBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InferenceBackend for OnnxBackend {
    fn initialize(&mut self, config: &ServerConfig) -> Result<Option<std::time::Duration>> {
        if self.initialized {
            return Ok(None);
        }

        let model_load_time = self.load_model(config)?;
        Ok(Some(model_load_time))
    }

    fn infer(&mut self, input: &Array4<f32>) -> Result<Array4<f32>> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| RemovalError::inference("ONNX session not initialized"))?;

        let inference_start = std::time::Instant::now();
        log::debug!("Starting inference with input shape: {:?}", input.dim());

        let input_value = Value::from_array(input.clone()).map_err(|e| {
            RemovalError::inference(format!("Failed to convert input tensor: {e}"))
        })?;

        let outputs = session
            .run(ort::inputs![input_value])
            .map_err(|e| RemovalError::inference(format!("ONNX inference failed: {e}")))?;

        // U2-Net emits seven side outputs; positional access picks the fused map
        let keys: Vec<_> = outputs.keys().collect();
        let first_key = keys
            .first()
            .ok_or_else(|| RemovalError::inference("No output tensors found"))?;
        let output_tensor = outputs
            .get(first_key)
            .ok_or_else(|| RemovalError::inference("First output tensor not found"))?
            .try_extract_array::<f32>()
            .map_err(|e| RemovalError::inference(format!("Failed to extract output tensor: {e}")))?;

        let output_shape = output_tensor.shape();
        let &[n, c, h, w] = output_shape else {
            return Err(RemovalError::inference(format!(
                "Expected 4D output tensor, got {}D",
                output_shape.len()
            )));
        };

        let result = Array4::from_shape_vec((n, c, h, w), output_tensor.iter().copied().collect())
            .map_err(|e| RemovalError::inference(format!("Failed to reshape output tensor: {e}")))?;

        log::debug!(
            "ONNX inference completed in {:.2}ms",
            inference_start.elapsed().as_secs_f64() * 1000.0
        );

        Ok(result)
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

    fn is_initialized(&self) -> bool {
        self.initialized
    }
}
