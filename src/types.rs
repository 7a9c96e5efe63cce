//! Core types for background replacement operations

use crate::{
    encoder,
    error::{RemovalError, Result},
    resample::ResampleFilter,
};
use image::RgbaImage;
use ndarray::Array4;

/// Result of a background replacement operation
#[derive(Debug, Clone)]
pub struct RemovalResult {
    /// Composited image, same dimensions as the input, always RGBA
    pub image: RgbaImage,

    /// Mask at the input's resolution
    pub mask: SegmentationMask,

    /// Per-stage timings
    pub timings: ProcessingTimings,
}

impl RemovalResult {
    #[must_use]
    pub fn new(image: RgbaImage, mask: SegmentationMask, timings: ProcessingTimings) -> Self {
        Self {
            image,
            mask,
            timings,
        }
    }

    /// Encode the composited image as PNG bytes
    ///
    /// # Errors
    /// - PNG encoder failure
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        encoder::encode_png(&self.image)
    }

    /// Encode the composited image as a `data:image/png;base64,` URI
    ///
    /// # Errors
    /// - PNG encoder failure
    pub fn to_data_uri(&self) -> Result<String> {
        Ok(encoder::to_data_uri(&self.to_png_bytes()?))
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// One-line timing breakdown for logs
    #[must_use]
    pub fn timing_summary(&self) -> String {
        let t = &self.timings;
        format!(
            "decode {}ms, preprocess {}ms, inference {}ms, postprocess {}ms, total {}ms",
            t.image_decode_ms, t.preprocessing_ms, t.inference_ms, t.postprocessing_ms, t.total_ms
        )
    }
}

/// Grayscale mask, one byte per pixel in row-major order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentationMask {
    /// Mask data as grayscale values (0-255)
    pub data: Vec<u8>,

    /// Mask dimensions (width, height)
    pub dimensions: (u32, u32),
}

impl SegmentationMask {
    /// Create a new segmentation mask
    #[must_use]
    pub fn new(data: Vec<u8>, dimensions: (u32, u32)) -> Self {
        Self { data, dimensions }
    }

    /// Build a mask from a `[1, 1, H, W]` saliency tensor
    ///
    /// Values are min-max normalized over the whole map, then scaled to
    /// `0..=255` with truncation. A constant map yields an all-zero mask.
    ///
    /// # Errors
    /// - Tensor is not `[1, 1, H, W]` or has an empty plane
    pub fn from_tensor(tensor: &Array4<f32>) -> Result<Self> {
        let (n, c, height, width) = tensor.dim();
        if n != 1 || c != 1 || height == 0 || width == 0 {
            return Err(RemovalError::processing(format!(
                "Invalid output tensor shape: {:?}",
                tensor.shape()
            )));
        }

        let (min, max) = tensor
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let range = max - min;

        let data = tensor
            .iter()
            .map(|&v| {
                let normalized = if range > 0.0 { (v - min) / range } else { 0.0 };
                (normalized.clamp(0.0, 1.0) * 255.0) as u8
            })
            .collect();

        Ok(Self::new(data, (width as u32, height as u32)))
    }

    /// Resize the mask to new dimensions with the given filter
    ///
    /// # Errors
    /// - Zero target dimensions
    /// - Data length does not match dimensions
    pub fn resize(&self, new_width: u32, new_height: u32, filter: ResampleFilter) -> Result<Self> {
        let data = filter.resize_gray(self.data.clone(), self.dimensions, (new_width, new_height))?;
        Ok(Self::new(data, (new_width, new_height)))
    }
}

/// Detailed timing breakdown for a single request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingTimings {
    /// Image decoding from the upload bytes
    pub image_decode_ms: u64,

    /// Resize, scaling and tensor conversion
    pub preprocessing_ms: u64,

    /// Model execution
    pub inference_ms: u64,

    /// Mask generation, resize and compositing
    pub postprocessing_ms: u64,

    /// Total end-to-end processing time
    pub total_ms: u64,
}
