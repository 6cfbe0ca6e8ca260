//! Decoding and encoding at the pipeline boundary
//!
//! Input rasters arrive as encoded bytes (JPEG, PNG, or WEBP) from an
//! upload or an HTTP fetch; the canonical processed output is PNG, which
//! supports alpha for background-removed results. All downstream geometry
//! depends on the decoded width/height, so zero-dimension rasters are
//! rejected here, before any coordinate math runs.

use crate::error::{ExtractError, Result};
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Raster encodings accepted at the pipeline boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// JPEG image
    Jpeg,
    /// PNG image
    Png,
    /// WebP image
    WebP,
}

impl InputFormat {
    /// Detect format from a MIME type string
    pub fn from_mime(mime: &str) -> Option<InputFormat> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(InputFormat::Jpeg),
            "image/png" => Some(InputFormat::Png),
            "image/webp" => Some(InputFormat::WebP),
            _ => None,
        }
    }

    /// Detect format from leading magic bytes
    pub fn from_magic(bytes: &[u8]) -> Option<InputFormat> {
        match image::guess_format(bytes).ok()? {
            image::ImageFormat::Jpeg => Some(InputFormat::Jpeg),
            image::ImageFormat::Png => Some(InputFormat::Png),
            image::ImageFormat::WebP => Some(InputFormat::WebP),
            _ => None,
        }
    }

    /// Canonical MIME type for this format
    pub fn mime(&self) -> &'static str {
        match self {
            InputFormat::Jpeg => "image/jpeg",
            InputFormat::Png => "image/png",
            InputFormat::WebP => "image/webp",
        }
    }
}

/// Decode an encoded raster from memory
///
/// # Errors
///
/// Returns `ExtractError::InvalidImage` if:
/// - The bytes are not a supported encoding (JPEG, PNG, WEBP)
/// - Decoding fails
/// - The decoded raster has zero width or height
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    if InputFormat::from_magic(bytes).is_none() {
        return Err(ExtractError::invalid_image_msg(
            "unsupported encoding; expected JPEG, PNG, or WEBP",
        ));
    }

    let img = image::load_from_memory(bytes)
        .map_err(|e| ExtractError::invalid_image("failed to decode image", e))?;

    if img.width() == 0 || img.height() == 0 {
        return Err(ExtractError::invalid_image_msg(
            "decoded image has zero width or height",
        ));
    }

    debug!(
        width = img.width(),
        height = img.height(),
        "decoded source image"
    );
    Ok(img)
}

/// Encode a raster as PNG bytes
///
/// # Errors
///
/// Returns `ExtractError::EncodeFailure` if the encoder fails.
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .map_err(|e| ExtractError::encode("failed to encode PNG", e))?;
    Ok(bytes)
}
