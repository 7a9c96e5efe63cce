//! Alpha compositing of the source image over a solid background

use crate::error::{RemovalError, Result};
use crate::types::SegmentationMask;
use image::{DynamicImage, Rgba, RgbaImage};

/// Blend `image` over an opaque `background` color using `mask` as coverage
///
/// Every channel, alpha included, is mixed as
/// `(src * m + bg * (255 - m) + 127) / 255`. The result is always RGBA and
/// has the image's dimensions.
///
/// # Errors
/// - Mask dimensions differ from the image dimensions
pub fn composite(
    image: &DynamicImage,
    mask: &SegmentationMask,
    background: [u8; 3],
) -> Result<RgbaImage> {
    let source = image.to_rgba8();
    if source.dimensions() != mask.dimensions {
        return Err(RemovalError::processing(format!(
            "Image and mask dimensions do not match: {:?} vs {:?}",
            source.dimensions(),
            mask.dimensions
        )));
    }

    let [r, g, b] = background;
    let background = Rgba([r, g, b, 255]);
    let mut result = source;

    for (pixel, &coverage) in result.pixels_mut().zip(&mask.data) {
        for (channel, &bg) in pixel.0.iter_mut().zip(&background.0) {
            *channel = blend(*channel, bg, coverage);
        }
    }

    Ok(result)
}

fn blend(src: u8, bg: u8, coverage: u8) -> u8 {
    let m = u32::from(coverage);
    let value = (u32::from(src) * m + u32::from(bg) * (255 - m) + 127) / 255;
    value as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    const BG: [u8; 3] = [83, 40, 130];

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 40) as u8, (y * 60) as u8, 200])
        }))
    }

    #[test]
    fn test_full_mask_reproduces_source() {
        let image = gradient(5, 4);
        let mask = SegmentationMask::new(vec![255; 20], (5, 4));
        let out = composite(&image, &mask, BG).unwrap();
        assert_eq!(out, image.to_rgba8());
    }

    #[test]
    fn test_zero_mask_yields_background() {
        let image = gradient(5, 4);
        let mask = SegmentationMask::new(vec![0; 20], (5, 4));
        let out = composite(&image, &mask, BG).unwrap();
        assert!(out.pixels().all(|p| *p == Rgba([83, 40, 130, 255])));
    }

    #[test]
    fn test_half_coverage_rounds() {
        assert_eq!(blend(255, 0, 128), 128);
        assert_eq!(blend(0, 255, 128), 127);
        assert_eq!(blend(200, 200, 77), 200);
    }

    #[test]
    fn test_transparent_source_alpha_blends() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([10, 10, 10, 0])));
        let mask = SegmentationMask::new(vec![255], (1, 1));
        let out = composite(&image, &mask, BG).unwrap();
        assert_eq!(out.get_pixel(0, 0).0[3], 0);

        let mask = SegmentationMask::new(vec![0], (1, 1));
        let out = composite(&image, &mask, BG).unwrap();
        assert_eq!(out.get_pixel(0, 0).0[3], 255);
    }

    #[test]
    fn test_dimension_mismatch() {
        let image = gradient(3, 3);
        let mask = SegmentationMask::new(vec![0; 4], (2, 2));
        assert!(composite(&image, &mask, BG).is_err());
    }
}
