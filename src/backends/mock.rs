//! Mock backend implementation for testing and debugging

use crate::config::ServerConfig;
use crate::error::{RemovalError, Result};
use crate::inference::InferenceBackend;
use crate::models::{ModelInfo, ModelKind, PreprocessingConfig};
use ndarray::Array4;

/// Mock backend for testing and debugging purposes
///
/// The "saliency" it reports is the de-normalized red channel of the input,
/// so bright red regions become foreground. Output is deterministic and needs
/// no model file.
#[derive(Debug)]
pub struct MockBackend {
    input_shape: (usize, usize, usize, usize),
    output_shape: (usize, usize, usize, usize),
    preprocessing: PreprocessingConfig,
    fail_inference: bool,
}

impl MockBackend {
    /// Create a new mock backend
    #[must_use]
    pub fn new() -> Self {
        let (input_shape, output_shape) = ModelKind::U2Net.shapes();
        Self {
            input_shape,
            output_shape,
            preprocessing: PreprocessingConfig::default(),
            fail_inference: false,
        }
    }

    /// Create a mock backend whose every inference call fails
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_inference: true,
            ..Self::new()
        }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InferenceBackend for MockBackend {
    fn initialize(&mut self, _config: &ServerConfig) -> Result<Option<std::time::Duration>> {
        Ok(None)
    }

    fn infer(&mut self, input: &Array4<f32>) -> Result<Array4<f32>> {
        if self.fail_inference {
            return Err(RemovalError::inference("Mock backend configured to fail"));
        }

        let (n, _c, h, w) = input.dim();
        let mean = self.preprocessing.normalization_mean[0];
        let std = self.preprocessing.normalization_std[0];

        let mut output = Array4::<f32>::zeros((n, 1, h, w));
        for ((b, _, y, x), value) in output.indexed_iter_mut() {
            let red = input.get([b, 0, y, x]).copied().unwrap_or(0.0);
            *value = (red * std + mean).clamp(0.0, 1.0);
        }

        Ok(output)
    }

    fn input_shape(&self) -> (usize, usize, usize, usize) {
        self.input_shape
    }

    fn output_shape(&self) -> (usize, usize, usize, usize) {
        self.output_shape
    }

    fn get_preprocessing_config(&self) -> Result<PreprocessingConfig> {
        Ok(self.preprocessing.clone())
    }

    fn get_model_info(&self) -> Result<ModelInfo> {
        Ok(ModelInfo {
            name: "Mock Backend".to_string(),
            precision: "mock".to_string(),
            size_bytes: 0,
            input_shape: self.input_shape,
            output_shape: self.output_shape,
        })
    }

    fn is_initialized(&self) -> bool {
        true // Mock backend is always "initialized"
    }
}
