//! Image preprocessing for U2-Net inference

use crate::{
    error::{RemovalError, Result},
    models::PreprocessingConfig,
};
use image::{imageops::FilterType, DynamicImage, RgbImage};
use ndarray::Array4;

/// Shared image preprocessing utilities
pub struct ImagePreprocessor;

impl ImagePreprocessor {
    /// Preprocess image for model inference
    ///
    /// This function handles:
    /// - RGB conversion (gray and palette images are expanded, alpha is dropped)
    /// - Resize to the target size without preserving aspect ratio
    /// - Scaling so the brightest sample becomes 1.0
    /// - Mean/std normalization to NCHW tensor format
    ///
    /// # Errors
    /// - Zero-sized input image or target size
    pub fn preprocess_for_inference(
        image: &DynamicImage,
        preprocessing_config: &PreprocessingConfig,
    ) -> Result<Array4<f32>> {
        let [target_width, target_height] = preprocessing_config.target_size;
        if target_width == 0 || target_height == 0 {
            return Err(RemovalError::invalid_config(
                "Preprocessing target size must be non-zero",
            ));
        }
        if image.width() == 0 || image.height() == 0 {
            return Err(RemovalError::processing_stage_error(
                "preprocessing",
                "image has no pixels",
                None,
            ));
        }

        let rgb_image = image.to_rgb8();
        let resized = image::imageops::resize(
            &rgb_image,
            target_width,
            target_height,
            FilterType::Triangle,
        );

        Ok(Self::canvas_to_tensor(&resized, preprocessing_config))
    }

    /// Convert resized canvas to normalized tensor
    fn canvas_to_tensor(canvas: &RgbImage, preprocessing_config: &PreprocessingConfig) -> Array4<f32> {
        let (width, height) = canvas.dimensions();
        let mut tensor = Array4::<f32>::zeros((1, 3, height as usize, width as usize));

        // An all-black image keeps its zeros instead of dividing by zero
        let max_value = canvas.as_raw().iter().copied().max().unwrap_or(0);
        let scale = if max_value == 0 {
            1.0
        } else {
            f32::from(max_value)
        };

        let mean = preprocessing_config.normalization_mean;
        let std = preprocessing_config.normalization_std;

        for (x, y, pixel) in canvas.enumerate_pixels() {
            for (channel, (&value, (&m, &s))) in
                pixel.0.iter().zip(mean.iter().zip(std.iter())).enumerate()
            {
                if let Some(slot) = tensor.get_mut([0, channel, y as usize, x as usize]) {
                    *slot = (f32::from(value) / scale - m) / s;
                }
            }
        }

        tensor
    }
}
