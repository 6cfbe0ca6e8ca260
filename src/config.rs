//! Configuration structures for the print extraction pipeline.
//!
//! Every tunable parameter has a fixed default taken from
//! [`crate::constants`]; configuration exists for reproducible experiments
//! and host-application overrides, not for per-request variation.
//!
//! # Configuration Loading
//!
//! ```no_run
//! use print_lift::PipelineConfig;
//! use std::path::Path;
//!
//! // Load from file
//! let config = PipelineConfig::from_json_file(Path::new("config.json"))?;
//!
//! // Or use defaults
//! let config = PipelineConfig::default();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::constants::{enhancement, palette, performance, segmentation};
use crate::error::{ExtractError, Result};
use serde::{Deserialize, Serialize};

/// Complete pipeline configuration for print extraction.
///
/// Can be serialized to/from JSON for reproducible runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Preprocessing applied before any geometry math
    pub preprocessing: PreprocessingConfig,

    /// Enhancement stage parameters
    pub enhancement: EnhancementConfig,

    /// Segmentation preprocessor parameters
    pub segmentation: SegmentationPrepConfig,

    /// Palette extraction parameters
    pub palette: PaletteConfig,
}

/// Preprocessing parameters applied to the source photo.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessingConfig {
    /// Apply EXIF orientation correction before extraction
    pub exif_correction: bool,

    /// Downscale images above this pixel count before extraction.
    /// 0 disables the guard.
    pub max_processing_pixels: u64,
}

/// Enhancement stage parameters.
///
/// Applied in fixed order: unsharp mask, tonal normalization, saturation
/// boost. Output is always PNG.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhancementConfig {
    /// Unsharp mask sigma
    pub sharpen_sigma: f32,

    /// Unsharp mask threshold
    pub sharpen_threshold: i32,

    /// Multiplicative saturation factor (must be >= 1.0)
    pub saturation_boost: f32,

    /// Enable tonal normalization (percentile histogram stretch)
    pub normalize: bool,
}

/// Segmentation preprocessor parameters.
///
/// Controls the lightened crop variant fed to the background classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationPrepConfig {
    /// Gamma value, > 1 lightens midtones
    pub gamma: f32,

    /// Black-point lift multiplicative factor
    pub lift_scale: f32,

    /// Black-point lift additive offset (8-bit scale)
    pub lift_offset: f32,
}

/// Palette extraction parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    /// Side length of the square sampling grid
    pub sample_size: u32,

    /// Quantization step per channel
    pub quantize_step: u32,

    /// Number of ranked colors returned
    pub top_k: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            preprocessing: PreprocessingConfig::default(),
            enhancement: EnhancementConfig::default(),
            segmentation: SegmentationPrepConfig::default(),
            palette: PaletteConfig::default(),
        }
    }
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            exif_correction: true,
            max_processing_pixels: performance::MAX_PROCESSING_PIXELS,
        }
    }
}

impl Default for EnhancementConfig {
    fn default() -> Self {
        Self {
            sharpen_sigma: enhancement::SHARPEN_SIGMA,
            sharpen_threshold: enhancement::SHARPEN_THRESHOLD,
            saturation_boost: enhancement::SATURATION_BOOST,
            normalize: true,
        }
    }
}

impl Default for SegmentationPrepConfig {
    fn default() -> Self {
        Self {
            gamma: segmentation::GAMMA,
            lift_scale: segmentation::LIFT_SCALE,
            lift_offset: segmentation::LIFT_OFFSET,
        }
    }
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            sample_size: palette::SAMPLE_SIZE,
            quantize_step: palette::QUANT_STEP,
            top_k: palette::TOP_K,
        }
    }
}

impl PipelineConfig {
    /// Validate parameter ranges
    ///
    /// # Errors
    ///
    /// Returns `ExtractError::InvalidParameter` naming the first offending
    /// field.
    pub fn validate(&self) -> Result<()> {
        if self.enhancement.saturation_boost < 1.0 {
            return Err(ExtractError::InvalidParameter {
                parameter: "enhancement.saturation_boost".into(),
                value: self.enhancement.saturation_boost.to_string(),
            });
        }
        if self.enhancement.sharpen_sigma <= 0.0 {
            return Err(ExtractError::InvalidParameter {
                parameter: "enhancement.sharpen_sigma".into(),
                value: self.enhancement.sharpen_sigma.to_string(),
            });
        }
        if self.segmentation.gamma <= 1.0 {
            return Err(ExtractError::InvalidParameter {
                parameter: "segmentation.gamma".into(),
                value: self.segmentation.gamma.to_string(),
            });
        }
        if self.palette.sample_size == 0 {
            return Err(ExtractError::InvalidParameter {
                parameter: "palette.sample_size".into(),
                value: "0".into(),
            });
        }
        if self.palette.quantize_step == 0 || self.palette.quantize_step > 128 {
            return Err(ExtractError::InvalidParameter {
                parameter: "palette.quantize_step".into(),
                value: self.palette.quantize_step.to_string(),
            });
        }
        if self.palette.top_k == 0 {
            return Err(ExtractError::InvalidParameter {
                parameter: "palette.top_k".into(),
                value: "0".into(),
            });
        }
        Ok(())
    }

    /// Load configuration from JSON file
    pub fn from_json_file(path: &std::path::Path) -> std::result::Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to JSON file
    pub fn to_json_file(&self, path: &std::path::Path) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_values_match_constants() {
        let config = PipelineConfig::default();
        assert_eq!(config.palette.sample_size, 64);
        assert_eq!(config.palette.top_k, 5);
        assert!((config.enhancement.saturation_boost - 1.2).abs() < 1e-6);
        assert!((config.segmentation.gamma - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_validation_rejects_desaturation() {
        let mut config = PipelineConfig::default();
        config.enhancement.saturation_boost = 0.8;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ExtractError::InvalidParameter { .. }));
    }

    #[test]
    fn test_validation_rejects_zero_grid() {
        let mut config = PipelineConfig::default();
        config.palette.sample_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let config = PipelineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.palette.top_k, config.palette.top_k);
        assert_eq!(back.preprocessing.exif_correction, true);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let back: PipelineConfig =
            serde_json::from_str(r#"{"palette": {"top_k": 3}}"#).unwrap();
        assert_eq!(back.palette.top_k, 3);
        assert_eq!(back.palette.sample_size, 64);
        assert!(back.enhancement.normalize);
    }
}
