//! Background replacement processor
//!
//! `BackgroundRemovalProcessor` owns the loaded inference backend and runs the
//! full decode, preprocess, infer, mask and composite pipeline for one image.
//! The HTTP layer holds a single instance for the lifetime of the server.

use crate::{
    compositor,
    config::ServerConfig,
    error::{RemovalError, Result},
    inference::InferenceBackend,
    models::ModelInfo,
    resample::ResampleFilter,
    types::{ProcessingTimings, RemovalResult, SegmentationMask},
    utils::ImagePreprocessor,
};
use image::{DynamicImage, RgbaImage};
use instant::{Duration, Instant};
use log::{debug, info};
use ndarray::Array4;
use tracing::{debug as trace_debug, instrument, span, Level};

/// Processor that replaces image backgrounds with a solid color
pub struct BackgroundRemovalProcessor {
    backend: Box<dyn InferenceBackend>,
    background_color: [u8; 3],
}

impl std::fmt::Debug for BackgroundRemovalProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundRemovalProcessor")
            .field("initialized", &self.backend.is_initialized())
            .field("background_color", &self.background_color)
            .finish_non_exhaustive()
    }
}

impl BackgroundRemovalProcessor {
    /// Create a processor around an already constructed backend
    #[must_use]
    pub fn new(backend: Box<dyn InferenceBackend>, background_color: [u8; 3]) -> Self {
        Self {
            backend,
            background_color,
        }
    }

    /// Initialize the backend, loading its model
    ///
    /// Returns the model load time, or `None` if already initialized.
    ///
    /// # Errors
    /// - Model loading failures
    /// - Backend initialization errors
    pub fn initialize(&mut self, config: &ServerConfig) -> Result<Option<Duration>> {
        if self.backend.is_initialized() {
            return Ok(None);
        }

        info!("Initializing background removal processor");
        debug!("Backend type: {}", config.backend_type);
        debug!("Model: {}", config.model_source.display_name());

        let load_time = self.backend.initialize(config)?;
        info!("Background removal processor initialized successfully");
        Ok(load_time)
    }

    /// Decode uploaded bytes and replace the background
    ///
    /// The format is sniffed from the content, not from any file name.
    ///
    /// # Errors
    /// - Undecodable image data
    /// - Inference or compositing failures
    pub fn process_bytes(
        &mut self,
        image_bytes: &[u8],
        filter: ResampleFilter,
    ) -> Result<RemovalResult> {
        let decode_start = Instant::now();
        let image = image::load_from_memory(image_bytes)?;
        let decode_ms = decode_start.elapsed().as_millis() as u64;

        let mut result = self.process_image(&image, filter)?;
        result.timings.image_decode_ms = decode_ms;
        result.timings.total_ms += decode_ms;
        Ok(result)
    }

    /// Replace the background of a decoded image
    ///
    /// # Errors
    /// - Backend not initialized
    /// - Inference failures
    /// - Unexpected output tensor shape
    #[instrument(
        skip(self, image, filter),
        fields(
            filter = %filter,
            dimensions = %format!("{}x{}", image.width(), image.height())
        )
    )]
    pub fn process_image(
        &mut self,
        image: &DynamicImage,
        filter: ResampleFilter,
    ) -> Result<RemovalResult> {
        if !self.backend.is_initialized() {
            return Err(RemovalError::processing("Backend not initialized"));
        }

        let mut timings = ProcessingTimings::default();
        let total_start = Instant::now();
        let original_dimensions = (image.width(), image.height());

        let input_tensor = {
            let _span = span!(
                Level::DEBUG,
                "preprocessing",
                original_width = %original_dimensions.0,
                original_height = %original_dimensions.1
            )
            .entered();
            self.preprocess_image_for_inference(image, &mut timings)?
        };

        let output_tensor = {
            let _span = span!(Level::DEBUG, "inference").entered();
            self.perform_inference(&input_tensor, &mut timings)?
        };

        let (mask, result_image) = {
            let _span = span!(
                Level::DEBUG,
                "compositing",
                width = %original_dimensions.0,
                height = %original_dimensions.1
            )
            .entered();
            self.generate_mask_and_composite(
                &output_tensor,
                image,
                original_dimensions,
                filter,
                &mut timings,
            )?
        };

        timings.total_ms = total_start.elapsed().as_millis() as u64;
        trace_debug!(
            preprocessing_ms = timings.preprocessing_ms,
            inference_ms = timings.inference_ms,
            postprocessing_ms = timings.postprocessing_ms,
            "Image processed"
        );

        Ok(RemovalResult::new(result_image, mask, timings))
    }

    fn preprocess_image_for_inference(
        &self,
        image: &DynamicImage,
        timings: &mut ProcessingTimings,
    ) -> Result<Array4<f32>> {
        let preprocess_start = Instant::now();
        let preprocessing_config = self.backend.get_preprocessing_config()?;
        let input_tensor =
            ImagePreprocessor::preprocess_for_inference(image, &preprocessing_config)?;
        timings.preprocessing_ms = preprocess_start.elapsed().as_millis() as u64;
        Ok(input_tensor)
    }

    fn perform_inference(
        &mut self,
        input_tensor: &Array4<f32>,
        timings: &mut ProcessingTimings,
    ) -> Result<Array4<f32>> {
        let inference_start = Instant::now();
        let output_tensor = self.backend.infer(input_tensor)?;
        timings.inference_ms = inference_start.elapsed().as_millis() as u64;
        Ok(output_tensor)
    }

    fn generate_mask_and_composite(
        &self,
        output_tensor: &Array4<f32>,
        image: &DynamicImage,
        original_dimensions: (u32, u32),
        filter: ResampleFilter,
        timings: &mut ProcessingTimings,
    ) -> Result<(SegmentationMask, RgbaImage)> {
        let postprocess_start = Instant::now();

        let (width, height) = original_dimensions;
        let mask = SegmentationMask::from_tensor(output_tensor)?.resize(width, height, filter)?;
        let result_image = compositor::composite(image, &mask, self.background_color)?;

        timings.postprocessing_ms = postprocess_start.elapsed().as_millis() as u64;
        Ok((mask, result_image))
    }

    /// Background color painted where the mask is empty
    #[must_use]
    pub fn background_color(&self) -> [u8; 3] {
        self.background_color
    }

    /// Check if the backend has loaded its model
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.backend.is_initialized()
    }

    /// Information about the loaded model
    ///
    /// # Errors
    /// - Backend has no model metadata
    pub fn model_info(&self) -> Result<ModelInfo> {
        self.backend.get_model_info()
    }
}
