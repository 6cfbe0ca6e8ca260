//! Fixed pipeline parameters for print extraction
//!
//! This module contains compile-time constants for every stage of the
//! extraction pipeline. None of these are user-configurable at runtime
//! unless re-exposed through [`crate::config`].

/// Enhancement stage parameters
pub mod enhancement {
    /// Unsharp mask sigma (Gaussian radius of the blurred subtrahend)
    pub const SHARPEN_SIGMA: f32 = 1.0;

    /// Unsharp mask threshold: minimum brightness difference to sharpen
    pub const SHARPEN_THRESHOLD: i32 = 3;

    /// Lower percentile for tonal normalization (per channel)
    pub const NORMALIZE_LOWER_PERCENTILE: f32 = 1.0;

    /// Upper percentile for tonal normalization (per channel)
    pub const NORMALIZE_UPPER_PERCENTILE: f32 = 99.0;

    /// Multiplicative saturation boost applied after normalization
    pub const SATURATION_BOOST: f32 = 1.2;
}

/// Segmentation preprocessor parameters
///
/// The downstream background classifier misreads very dark foreground
/// regions as background. These values push near-black pixels into a
/// distinguishable grey range before the crop is sent to it.
pub mod segmentation {
    /// Gamma applied as `255 * (v/255)^(1/GAMMA)`; > 1 lightens midtones
    pub const GAMMA: f32 = 2.5;

    /// Linear black-point lift: multiplicative factor
    pub const LIFT_SCALE: f32 = 1.3;

    /// Linear black-point lift: additive offset on an 8-bit scale
    pub const LIFT_OFFSET: f32 = 40.0;
}

/// Palette extraction parameters
pub mod palette {
    /// Side length of the square sampling grid (cover-resized)
    pub const SAMPLE_SIZE: u32 = 64;

    /// Quantization step per channel: 0, 16, 32, ..., 240, 255
    pub const QUANT_STEP: u32 = 16;

    /// Number of ranked colors returned
    pub const TOP_K: usize = 5;
}

/// Performance limits
pub mod performance {
    /// Maximum pixel count processed without downscaling.
    ///
    /// Smartphone photos commonly reach 48MP; extraction quality does not
    /// benefit beyond this budget and enhancement cost grows linearly.
    pub const MAX_PROCESSING_PIXELS: u64 = 16_000_000;

    /// Pixel target when an oversized image is downscaled
    pub const DOWNSCALE_TARGET_PIXELS: u64 = 8_000_000;
}
