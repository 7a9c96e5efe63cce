//! Resampling filters used to upscale the network mask
//!
//! Each filter owns one HTTP route. Kernels come from `fast_image_resize`,
//! whose convolution filters follow the same definitions as Pillow's.

use crate::error::{RemovalError, Result};
use fast_image_resize::{images::Image, FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use serde::{Deserialize, Serialize};

/// Interpolation filter applied to the mask before compositing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResampleFilter {
    /// Triangle filter; served on `/remove`
    #[default]
    Bilinear,
    Nearest,
    Box,
    Hamming,
    /// Catmull-Rom cubic (a = -0.5)
    Bicubic,
    /// Lanczos with a 3-lobe window
    Lanczos,
}

impl ResampleFilter {
    /// Every filter, in route registration order
    pub const ALL: [ResampleFilter; 6] = [
        Self::Bilinear,
        Self::Nearest,
        Self::Box,
        Self::Hamming,
        Self::Bicubic,
        Self::Lanczos,
    ];

    /// Lowercase filter name
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Bilinear => "bilinear",
            Self::Nearest => "nearest",
            Self::Box => "box",
            Self::Hamming => "hamming",
            Self::Bicubic => "bicubic",
            Self::Lanczos => "lanczos",
        }
    }

    /// HTTP route that applies this filter
    #[must_use]
    pub fn route(self) -> &'static str {
        match self {
            Self::Bilinear => "/remove",
            Self::Nearest => "/remove_nearest",
            Self::Box => "/remove_box",
            Self::Hamming => "/remove_hamming",
            Self::Bicubic => "/remove_bicubic",
            Self::Lanczos => "/remove_lanczos",
        }
    }

    fn resize_alg(self) -> ResizeAlg {
        match self {
            Self::Nearest => ResizeAlg::Nearest,
            Self::Bilinear => ResizeAlg::Convolution(FilterType::Bilinear),
            Self::Box => ResizeAlg::Convolution(FilterType::Box),
            Self::Hamming => ResizeAlg::Convolution(FilterType::Hamming),
            Self::Bicubic => ResizeAlg::Convolution(FilterType::CatmullRom),
            Self::Lanczos => ResizeAlg::Convolution(FilterType::Lanczos3),
        }
    }

    /// Resize a single-channel 8-bit plane
    ///
    /// # Errors
    /// - `data` length does not match `src` dimensions
    /// - Zero-sized source or destination
    pub fn resize_gray(
        self,
        data: Vec<u8>,
        src: (u32, u32),
        dst: (u32, u32),
    ) -> Result<Vec<u8>> {
        if src.0 == 0 || src.1 == 0 || dst.0 == 0 || dst.1 == 0 {
            return Err(RemovalError::processing(format!(
                "Cannot resize {}x{} mask to {}x{}",
                src.0, src.1, dst.0, dst.1
            )));
        }
        if src == dst {
            return Ok(data);
        }

        let src_image = Image::from_vec_u8(src.0, src.1, data, PixelType::U8)
            .map_err(|e| RemovalError::processing(format!("Invalid mask buffer: {e}")))?;
        let mut dst_image = Image::new(dst.0, dst.1, PixelType::U8);

        let options = ResizeOptions::new().resize_alg(self.resize_alg());
        Resizer::new()
            .resize(&src_image, &mut dst_image, &options)
            .map_err(|e| RemovalError::processing(format!("Mask resize failed: {e}")))?;

        Ok(dst_image.into_vec())
    }
}

impl std::fmt::Display for ResampleFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ResampleFilter {
    type Err = RemovalError;

    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|filter| filter.name() == lowered)
            .ok_or_else(|| {
                RemovalError::invalid_config(format!("Unknown resample filter '{}'", s))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_are_unique() {
        let mut routes: Vec<_> = ResampleFilter::ALL.iter().map(|f| f.route()).collect();
        routes.sort_unstable();
        routes.dedup();
        assert_eq!(routes.len(), 6);
        assert_eq!(ResampleFilter::default().route(), "/remove");
    }

    #[test]
    fn test_parse_and_display() {
        for filter in ResampleFilter::ALL {
            assert_eq!(filter.to_string().parse::<ResampleFilter>().unwrap(), filter);
        }
        assert_eq!("LANCZOS".parse::<ResampleFilter>().unwrap(), ResampleFilter::Lanczos);
        assert!("gaussian".parse::<ResampleFilter>().is_err());
    }

    #[test]
    fn test_every_filter_hits_target_dimensions() {
        let src: Vec<u8> = (0..16u8).map(|v| v * 16).collect();
        for filter in ResampleFilter::ALL {
            let out = filter.resize_gray(src.clone(), (4, 4), (37, 11)).unwrap();
            assert_eq!(out.len(), 37 * 11, "{filter}");
        }
    }

    #[test]
    fn test_uniform_plane_stays_uniform() {
        let src = vec![200u8; 10 * 10];
        for filter in ResampleFilter::ALL {
            let out = filter.resize_gray(src.clone(), (10, 10), (25, 7)).unwrap();
            assert!(out.iter().all(|&v| v.abs_diff(200) <= 1), "{filter}");
        }
    }

    #[test]
    fn test_same_size_is_identity() {
        let src = vec![1, 2, 3, 4];
        let out = ResampleFilter::Lanczos.resize_gray(src.clone(), (2, 2), (2, 2)).unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn test_nearest_keeps_hard_edges() {
        let src = vec![0, 255, 0, 255];
        let out = ResampleFilter::Nearest.resize_gray(src, (2, 2), (4, 4)).unwrap();
        assert!(out.iter().all(|&v| v == 0 || v == 255));
    }

    #[test]
    fn test_rejects_bad_buffers() {
        assert!(ResampleFilter::Box.resize_gray(vec![0; 3], (2, 2), (4, 4)).is_err());
        assert!(ResampleFilter::Box.resize_gray(vec![0; 4], (2, 2), (0, 4)).is_err());
    }
}
