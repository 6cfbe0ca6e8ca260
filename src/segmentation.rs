//! Segmentation preprocessor: classifier-only lightened crop variant
//!
//! The external background classifier misreads very dark or pure-black
//! foreground regions as background. This stage derives a lightened
//! variant of the crop that pushes near-black pixels into a
//! distinguishable grey range before the crop crosses the service
//! boundary (as base64 PNG bytes).
//!
//! The lightened variant is never user-visible: the classifier's alpha
//! mask is grafted onto the *original* crop by [`graft_alpha`], which
//! copies the pristine RGB channels byte-for-byte.

use crate::config::SegmentationPrepConfig;
use crate::error::{ExtractError, Result};
use crate::image_loader::{decode_image, encode_png};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::{DynamicImage, RgbaImage};
use tracing::debug;

/// Lightened variant of a crop, encoded for the service boundary
#[derive(Debug, Clone)]
pub struct SegmentationInput {
    /// Lightened crop as PNG bytes
    pub png_bytes: Vec<u8>,
    /// Same bytes, base64-encoded for transports that require text
    pub base64: String,
    pub width: u32,
    pub height: u32,
}

/// Produces the lightened crop variant for the background classifier
pub struct SegmentationPreprocessor {
    config: SegmentationPrepConfig,
    /// Gamma lookup: `255 * (v/255)^(1/gamma)` then `v * scale + offset`,
    /// precomputed once per preprocessor
    lut: [u8; 256],
}

impl Default for SegmentationPreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentationPreprocessor {
    /// Create a preprocessor with default parameters
    pub fn new() -> Self {
        Self::with_config(SegmentationPrepConfig::default())
    }

    /// Create a preprocessor with explicit parameters
    pub fn with_config(config: SegmentationPrepConfig) -> Self {
        let mut lut = [0u8; 256];
        for (value, entry) in lut.iter_mut().enumerate() {
            let normalized = value as f32 / 255.0;
            let lightened = 255.0 * normalized.powf(1.0 / config.gamma);
            let lifted = lightened * config.lift_scale + config.lift_offset;
            *entry = lifted.clamp(0.0, 255.0).round() as u8;
        }
        Self { config, lut }
    }

    /// Derive the lightened raster variant (RGB channels only; alpha
    /// passes through)
    pub fn lighten(&self, crop: &DynamicImage) -> DynamicImage {
        let mut rgba = crop.to_rgba8();
        for pixel in rgba.pixels_mut() {
            for channel in 0..3 {
                pixel.0[channel] = self.lut[pixel.0[channel] as usize];
            }
        }
        DynamicImage::ImageRgba8(rgba)
    }

    /// Produce the encoded boundary payload for the background classifier
    ///
    /// # Errors
    ///
    /// Returns `ExtractError::EncodeFailure` if PNG encoding fails.
    pub fn prepare(&self, crop: &DynamicImage) -> Result<SegmentationInput> {
        debug!(
            gamma = self.config.gamma,
            lift_scale = self.config.lift_scale,
            lift_offset = self.config.lift_offset,
            "preparing lightened segmentation variant"
        );
        let lightened = self.lighten(crop);
        let png_bytes = encode_png(&lightened)?;
        let base64 = BASE64.encode(&png_bytes);
        Ok(SegmentationInput {
            base64,
            width: lightened.width(),
            height: lightened.height(),
            png_bytes,
        })
    }
}

/// Graft a classifier-returned alpha mask onto the pristine crop
///
/// The mask raster must have the crop's dimensions; its first channel
/// becomes the output alpha. The crop's RGB channels are copied unchanged:
/// the lightened variant never reaches the output.
///
/// # Errors
///
/// Returns `ExtractError::InvalidImage` if the mask bytes cannot be
/// decoded, or `ExtractError::MaskMismatch` on a dimension mismatch.
pub fn graft_alpha(crop: &DynamicImage, mask_bytes: &[u8]) -> Result<DynamicImage> {
    let mask = decode_image(mask_bytes)?;
    if mask.width() != crop.width() || mask.height() != crop.height() {
        return Err(ExtractError::MaskMismatch {
            crop_width: crop.width(),
            crop_height: crop.height(),
            mask_width: mask.width(),
            mask_height: mask.height(),
        });
    }

    let mask_gray = mask.to_luma8();
    let crop_rgba = crop.to_rgba8();
    let mut out = RgbaImage::new(crop.width(), crop.height());
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let [r, g, b, _] = crop_rgba.get_pixel(x, y).0;
        let alpha = mask_gray.get_pixel(x, y).0[0];
        pixel.0 = [r, g, b, alpha];
    }
    Ok(DynamicImage::ImageRgba8(out))
}
