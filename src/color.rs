//! Deterministic color palette summarization
//!
//! Downsamples a raster to a fixed square sample grid, quantizes every
//! sampled pixel into coarse RGB buckets, and ranks the buckets by
//! frequency. The output is stable across runs: sampling is row-major and
//! ties are broken by first-encountered order.
//!
//! Alpha is discarded before sampling; a fully transparent pixel still
//! votes with whatever RGB it carries. Known simplification, kept on
//! purpose (see DESIGN.md).

use crate::config::PaletteConfig;
use image::{imageops::FilterType, DynamicImage};
use std::collections::HashMap;
use tracing::debug;

/// One ranked palette entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorEntry {
    /// Quantized color as lowercase `#rrggbb`
    pub hex: String,
    /// Occurrences over the sample grid
    pub count: u64,
}

/// Palette extractor implementing fixed-grid bucket quantization
pub struct PaletteExtractor {
    config: PaletteConfig,
}

impl Default for PaletteExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PaletteExtractor {
    /// Create an extractor with default parameters (64x64 grid, step 16,
    /// top 5)
    pub fn new() -> Self {
        Self {
            config: PaletteConfig::default(),
        }
    }

    /// Create an extractor with explicit parameters
    pub fn with_config(config: PaletteConfig) -> Self {
        Self { config }
    }

    /// Extract the ranked palette as hex strings
    ///
    /// Returns at most `top_k` entries; fewer when the sample contains
    /// fewer unique quantized colors. Never padded.
    pub fn extract(&self, img: &DynamicImage) -> Vec<String> {
        self.extract_entries(img)
            .into_iter()
            .map(|entry| entry.hex)
            .collect()
    }

    /// Extract the ranked palette with occurrence counts
    pub fn extract_entries(&self, img: &DynamicImage) -> Vec<ColorEntry> {
        let size = self.config.sample_size;

        // Cover-style resize: scale to fill the square grid, center-crop
        // the overhang, so the sample count is aspect-independent.
        // Nearest-neighbor keeps sampled values actual source colors
        // instead of resampling-invented blends.
        let sampled = img.resize_to_fill(size, size, FilterType::Nearest);
        let rgb = sampled.to_rgb8();

        let mut counts: Vec<(u32, u64)> = Vec::new();
        let mut index: HashMap<u32, usize> = HashMap::new();

        // Row-major iteration keeps tie order identical on every run
        for pixel in rgb.pixels() {
            let r = quantize_channel(pixel.0[0], self.config.quantize_step);
            let g = quantize_channel(pixel.0[1], self.config.quantize_step);
            let b = quantize_channel(pixel.0[2], self.config.quantize_step);
            let key = (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b);

            match index.get(&key) {
                Some(&slot) => counts[slot].1 += 1,
                None => {
                    index.insert(key, counts.len());
                    counts.push((key, 1));
                }
            }
        }

        // Stable sort: equal counts keep first-insertion order
        counts.sort_by(|a, b| b.1.cmp(&a.1));

        debug!(
            unique_colors = counts.len(),
            top_k = self.config.top_k,
            "ranked quantized palette"
        );

        counts
            .into_iter()
            .take(self.config.top_k)
            .map(|(key, count)| ColorEntry {
                hex: format!("#{:06x}", key),
                count,
            })
            .collect()
    }
}

/// Quantize one channel to the nearest multiple of `step`, clamped to 255
///
/// Rounding is half-away-from-zero (`f32::round`), so a channel value of 8
/// with step 16 lands on 16, not 0. Values at the top of the range would
/// round to 256, which no two-digit hex code can carry; they clamp to 255.
pub fn quantize_channel(value: u8, step: u32) -> u8 {
    let bucket = (f32::from(value) / step as f32).round() as u32;
    (bucket * step).min(255) as u8
}
