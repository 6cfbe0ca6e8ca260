//! Detection boundary types and collaborator contracts
//!
//! The vision model that locates the print and the background segmentation
//! model are external collaborators: this crate only defines the structured
//! result it consumes and the traits through which the orchestrator reaches
//! them. Both are injected at construction, never ambient globals; schema
//! validation, retry and backoff live with the collaborator implementations.

use crate::error::Result;
use crate::geometry::{BoundingBox, PerspectivePoints};
use serde::{Deserialize, Serialize};

/// Strategy tag selecting the extraction code path.
///
/// Supplied by the external detector and only read here. Unknown tags are a
/// serde decode error at the collaborator boundary, never a silent default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionApproach {
    /// Use the bounding box verbatim: plain crop
    Direct,
    /// Use the quadrilateral corners: approximate perspective correction
    PerspectiveCorrect,
    /// Quadrilateral path, but the result is a tileable texture patch;
    /// the orchestrator skips background removal for it
    TextureRemove,
}

impl ExtractionApproach {
    /// Whether this approach reads the quadrilateral rather than the box
    pub fn uses_quad(&self) -> bool {
        matches!(
            self,
            ExtractionApproach::PerspectiveCorrect | ExtractionApproach::TextureRemove
        )
    }
}

/// Validated detection result from the external vision model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    /// Garment category as reported by the detector (e.g. "t-shirt")
    pub garment_type: String,
    /// Where on the garment the print sits (e.g. "front-center")
    pub print_location: String,
    /// Axis-aligned region around the print, normalized
    pub bounding_box: BoundingBox,
    /// Quadrilateral corners around the print, normalized; present for the
    /// quad-based approaches
    pub perspective_points: Option<PerspectivePoints>,
    /// Detector confidence in [0, 1]
    pub confidence: f32,
    /// Which extraction code path to take
    pub extraction_approach: ExtractionApproach,
}

/// External vision model locating the print in a garment photo.
///
/// Implementations own their transport, schema validation and retry
/// policy; this crate treats the call as an opaque function.
pub trait PrintDetector {
    /// Detect the print region in the given encoded image
    fn detect(&self, image_bytes: &[u8], mime_type: &str) -> Result<Detection>;
}

/// External background segmentation model.
///
/// Receives the lightened crop variant produced by
/// [`crate::segmentation::SegmentationPreprocessor`] and returns an alpha
/// mask raster of equal dimensions (any decodable single-channel or RGBA
/// encoding; only the first channel is read).
pub trait BackgroundSegmenter {
    /// Produce an alpha mask for the given lightened PNG crop
    fn segment(&self, lightened_png: &[u8]) -> Result<Vec<u8>>;
}
