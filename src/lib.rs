//! # Print Lift
//!
//! A Rust crate for extracting garment print regions from product photographs.
//!
//! This library turns a photo of a printed garment plus a detected print
//! region into a clean, enhanced raster of the print itself by:
//! - Denormalizing and clamping detected geometry into pixel space
//! - Cropping the region directly or approximately straightening a
//!   quadrilateral
//! - Applying a deterministic sharpen/normalize/saturate enhancement pass
//! - Summarizing the result into a ranked hex color palette
//!
//! Detection and background segmentation are external collaborators: this
//! crate defines their traits ([`detection::PrintDetector`],
//! [`detection::BackgroundSegmenter`]) and everything deterministic around
//! them, including the lightened crop variant the segmenter consumes and
//! the alpha grafting of its mask.
//!
//! ## Example
//!
//! ```rust,no_run
//! use print_lift::{extract_print, Detection};
//!
//! let image_bytes = std::fs::read("photo.jpg")?;
//! let detection: Detection = serde_json::from_str(r#"{
//!     "garmentType": "t-shirt",
//!     "printLocation": "front-center",
//!     "boundingBox": { "x": 0.1, "y": 0.1, "width": 0.3, "height": 0.2 },
//!     "confidence": 0.92,
//!     "extractionApproach": "direct"
//! }"#)?;
//!
//! let output = extract_print(&image_bytes, &detection)?;
//! println!("{}x{}, palette: {:?}", output.width, output.height, output.color_palette);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod color;
pub mod config;
pub mod constants;
pub mod detection;
pub mod enhance;
pub mod error;
pub mod exif;
pub mod extraction;
pub mod geometry;
pub mod image_loader;
pub mod pipeline;
pub mod segmentation;

pub use config::PipelineConfig;
pub use detection::{BackgroundSegmenter, Detection, ExtractionApproach, PrintDetector};
pub use error::{ExtractError, Result};
pub use geometry::{BoundingBox, PerspectivePoints};
pub use pipeline::{ExtractionOutput, ExtractionPipeline, GarmentWorkflow, WorkflowOptions};

/// Extract the print region from an image with default parameters
///
/// This is the main entry point for one-shot extraction. It decodes the
/// image, crops or straightens the detected region, enhances it, and
/// summarizes its palette.
///
/// # Arguments
///
/// * `image_bytes` - Encoded source photo (JPEG, PNG, or WebP)
/// * `detection` - Detected print region and extraction approach
///
/// # Returns
///
/// An `ExtractionOutput` with the enhanced region as PNG bytes, its
/// dimensions, and the ranked color palette
///
/// # Errors
///
/// Returns `ExtractError` if:
/// - The image bytes cannot be decoded or use an unsupported format
/// - The bounding box clamps to an empty region
/// - The output raster cannot be encoded
pub fn extract_print(image_bytes: &[u8], detection: &Detection) -> Result<ExtractionOutput> {
    ExtractionPipeline::new().extract(image_bytes, detection, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_json_round_trip() {
        let json = r#"{
            "garmentType": "hoodie",
            "printLocation": "back",
            "boundingBox": { "x": 0.2, "y": 0.1, "width": 0.5, "height": 0.4 },
            "perspectivePoints": [[0.2, 0.1], [0.7, 0.1], [0.7, 0.5], [0.2, 0.5]],
            "confidence": 0.88,
            "extractionApproach": "perspective-correct"
        }"#;

        let detection: Detection = serde_json::from_str(json).unwrap();
        assert_eq!(detection.garment_type, "hoodie");
        assert_eq!(
            detection.extraction_approach,
            ExtractionApproach::PerspectiveCorrect
        );

        let serialized = serde_json::to_string(&detection).unwrap();
        let back: Detection = serde_json::from_str(&serialized).unwrap();
        assert_eq!(detection, back);
    }
}
