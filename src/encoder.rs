//! PNG and data URI encoding of composited results

use crate::error::Result;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{codecs::png::PngEncoder, ImageEncoder, RgbaImage};

pub const DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Encode an RGBA image as PNG
///
/// # Errors
/// - PNG encoder failure
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ExtendedColorType::Rgba8,
    )?;
    Ok(buffer)
}

/// Wrap PNG bytes in a standard-alphabet, padded base64 data URI
#[must_use]
pub fn to_data_uri(png_bytes: &[u8]) -> String {
    let mut uri = String::with_capacity(DATA_URI_PREFIX.len() + (png_bytes.len() + 2) / 3 * 4);
    uri.push_str(DATA_URI_PREFIX);
    STANDARD.encode_string(png_bytes, &mut uri);
    uri
}
