//! Deterministic visual enhancement of the extracted print
//!
//! A fixed sequence applied after extraction, for human perceptual quality
//! only (no automated classifier consumes this output):
//! 1. Unsharp-mask sharpening (edge contrast)
//! 2. Tonal normalization (per-channel percentile histogram stretch,
//!    recovering contrast on washed-out photos)
//! 3. Saturation boost by a fixed factor via HSL
//!
//! The sequence preserves raster dimensions and the alpha channel.

use crate::config::EnhancementConfig;
use crate::error::Result;
use crate::image_loader::encode_png;
use image::{DynamicImage, RgbaImage};
use palette::{FromColor, Hsl, Srgb};
use tracing::debug;

/// Print enhancer applying the fixed sharpen/normalize/saturate sequence
pub struct Enhancer {
    config: EnhancementConfig,
}

impl Default for Enhancer {
    fn default() -> Self {
        Self::new()
    }
}

impl Enhancer {
    /// Create an enhancer with default parameters
    pub fn new() -> Self {
        Self {
            config: EnhancementConfig::default(),
        }
    }

    /// Create an enhancer with explicit parameters
    pub fn with_config(config: EnhancementConfig) -> Self {
        Self { config }
    }

    /// Apply the enhancement sequence to a raster
    ///
    /// Output dimensions equal input dimensions; alpha passes through
    /// untouched.
    pub fn enhance(&self, img: &DynamicImage) -> DynamicImage {
        debug!(
            width = img.width(),
            height = img.height(),
            "enhancing extracted region"
        );

        let sharpened = img.unsharpen(self.config.sharpen_sigma, self.config.sharpen_threshold);
        let mut rgba = sharpened.to_rgba8();

        if self.config.normalize {
            normalize_channels(&mut rgba);
        }
        boost_saturation(&mut rgba, self.config.saturation_boost);

        DynamicImage::ImageRgba8(rgba)
    }

    /// Apply the enhancement sequence and encode as PNG
    ///
    /// # Errors
    ///
    /// Returns `ExtractError::EncodeFailure` if PNG encoding fails.
    pub fn enhance_to_png(&self, img: &DynamicImage) -> Result<Vec<u8>> {
        encode_png(&self.enhance(img))
    }
}

/// Stretch each RGB channel so its 1st-99th percentile range spans 0-255.
///
/// Percentile bounds rather than strict min/max keep single hot or dead
/// pixels from defeating the stretch. Alpha is not touched. A channel whose
/// percentile bounds coincide (flat content) is left unchanged.
fn normalize_channels(rgba: &mut RgbaImage) {
    use crate::constants::enhancement::{NORMALIZE_LOWER_PERCENTILE, NORMALIZE_UPPER_PERCENTILE};

    let total = (rgba.width() as u64) * (rgba.height() as u64);
    if total == 0 {
        return;
    }
    let lower_count = (total as f64 * f64::from(NORMALIZE_LOWER_PERCENTILE) / 100.0) as u64;
    let upper_count = (total as f64 * f64::from(NORMALIZE_UPPER_PERCENTILE) / 100.0) as u64;

    for channel in 0..3 {
        let mut histogram = [0u64; 256];
        for pixel in rgba.pixels() {
            histogram[pixel.0[channel] as usize] += 1;
        }

        let mut cumulative = 0u64;
        let mut low = 0u8;
        let mut high = 255u8;
        let mut low_found = false;
        for (value, &count) in histogram.iter().enumerate() {
            cumulative += count;
            if !low_found && cumulative > lower_count {
                low = value as u8;
                low_found = true;
            }
            if cumulative >= upper_count {
                high = value as u8;
                break;
            }
        }

        if high <= low {
            continue;
        }

        let range = f32::from(high) - f32::from(low);
        for pixel in rgba.pixels_mut() {
            let v = f32::from(pixel.0[channel]);
            let stretched = ((v - f32::from(low)) * 255.0 / range).clamp(0.0, 255.0);
            pixel.0[channel] = stretched.round() as u8;
        }
    }
}

/// Multiply HSL saturation by `factor`, clamped to fully saturated
fn boost_saturation(rgba: &mut RgbaImage, factor: f32) {
    for pixel in rgba.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        let srgb = Srgb::new(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
        );
        let mut hsl = Hsl::from_color(srgb);
        hsl.saturation = (hsl.saturation * factor).min(1.0);
        let boosted = Srgb::from_color(hsl);
        pixel.0 = [
            (boosted.red * 255.0).round().clamp(0.0, 255.0) as u8,
            (boosted.green * 255.0).round().clamp(0.0, 255.0) as u8,
            (boosted.blue * 255.0).round().clamp(0.0, 255.0) as u8,
            a,
        ];
    }
}
