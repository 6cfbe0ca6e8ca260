//! Pipeline orchestration: one extraction request from bytes to output
//!
//! [`ExtractionPipeline`] is the deterministic core: decode, orient,
//! extract per the approach tag, enhance, summarize. It holds no
//! cross-request state; every call touches only its own buffers, so
//! concurrent requests need no coordination.
//!
//! [`GarmentWorkflow`] composes the core with the two external
//! collaborators (print detector, background segmenter), injected at
//! construction. Background removal is a policy decision of the caller and
//! is always skipped for the `texture-remove` approach.

use crate::color::PaletteExtractor;
use crate::config::PipelineConfig;
use crate::constants::performance;
use crate::detection::{BackgroundSegmenter, Detection, ExtractionApproach, PrintDetector};
use crate::enhance::Enhancer;
use crate::error::Result;
use crate::exif::auto_orient;
use crate::extraction::{extract_direct, extract_quad};
use crate::geometry::PerspectivePoints;
use crate::image_loader::{decode_image, encode_png};
use crate::segmentation::{graft_alpha, SegmentationInput, SegmentationPreprocessor};
use image::{imageops::FilterType, DynamicImage};
use tracing::{debug, info, warn};

/// Final result of one extraction request
#[derive(Debug, Clone)]
pub struct ExtractionOutput {
    /// Enhanced print region as PNG bytes
    pub image_bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Top-ranked quantized colors, `#rrggbb` strings
    pub color_palette: Vec<String>,
}

/// The deterministic extraction core
pub struct ExtractionPipeline {
    config: PipelineConfig,
    enhancer: Enhancer,
    preprocessor: SegmentationPreprocessor,
    palette: PaletteExtractor,
}

impl Default for ExtractionPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionPipeline {
    /// Create a pipeline with default parameters
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            enhancer: Enhancer::new(),
            preprocessor: SegmentationPreprocessor::new(),
            palette: PaletteExtractor::new(),
        }
    }

    /// Create a pipeline with explicit configuration
    ///
    /// # Errors
    ///
    /// Returns `ExtractError::InvalidParameter` if the configuration fails
    /// validation.
    pub fn with_config(pipeline_config: PipelineConfig) -> Result<Self> {
        pipeline_config.validate()?;
        Ok(Self {
            enhancer: Enhancer::with_config(pipeline_config.enhancement.clone()),
            preprocessor: SegmentationPreprocessor::with_config(
                pipeline_config.segmentation.clone(),
            ),
            palette: PaletteExtractor::with_config(pipeline_config.palette.clone()),
            config: pipeline_config,
        })
    }

    /// Run the full deterministic pipeline: decode, extract, enhance,
    /// summarize
    ///
    /// Caller-supplied `adjusted_points` override the detector's
    /// quadrilateral for the quad-based approaches.
    ///
    /// # Errors
    ///
    /// - `ExtractError::InvalidImage` if the bytes cannot be decoded
    /// - `ExtractError::EmptyRegion` if the direct-crop rectangle clamps
    ///   to zero area
    /// - `ExtractError::EncodeFailure` if the output cannot be encoded
    pub fn extract(
        &self,
        image_bytes: &[u8],
        detection: &Detection,
        adjusted_points: Option<&PerspectivePoints>,
    ) -> Result<ExtractionOutput> {
        let source = self.load_source(image_bytes)?;
        let region = self.extract_region(&source, detection, adjusted_points)?;
        self.finish(region)
    }

    /// Step 1: decode the source photo, apply EXIF orientation, downscale
    /// oversized images
    pub fn load_source(&self, image_bytes: &[u8]) -> Result<DynamicImage> {
        let decoded = decode_image(image_bytes)?;
        let oriented = if self.config.preprocessing.exif_correction {
            auto_orient(decoded, image_bytes)
        } else {
            decoded
        };
        Ok(downscale_to_budget(
            oriented,
            self.config.preprocessing.max_processing_pixels,
        ))
    }

    /// Step 2: extract the print region per the approach tag
    ///
    /// A quad approach without any quadrilateral (neither adjusted nor
    /// detected) degrades to the bounding-box crop.
    pub fn extract_region(
        &self,
        source: &DynamicImage,
        detection: &Detection,
        adjusted_points: Option<&PerspectivePoints>,
    ) -> Result<DynamicImage> {
        match detection.extraction_approach {
            ExtractionApproach::Direct => extract_direct(source, &detection.bounding_box),
            ExtractionApproach::PerspectiveCorrect | ExtractionApproach::TextureRemove => {
                let points = adjusted_points.or(detection.perspective_points.as_ref());
                match points {
                    Some(points) => Ok(extract_quad(source, points)),
                    None => {
                        warn!(
                            approach = ?detection.extraction_approach,
                            "quad approach without perspective points; using bounding box"
                        );
                        extract_direct(source, &detection.bounding_box)
                    }
                }
            }
        }
    }

    /// Step 3: enhance the region, extract its palette, encode the output
    pub fn finish(&self, region: DynamicImage) -> Result<ExtractionOutput> {
        let enhanced = self.enhancer.enhance(&region);
        let color_palette = self.palette.extract(&enhanced);
        let image_bytes = encode_png(&enhanced)?;

        info!(
            width = enhanced.width(),
            height = enhanced.height(),
            colors = color_palette.len(),
            "extraction complete"
        );
        Ok(ExtractionOutput {
            image_bytes,
            width: enhanced.width(),
            height: enhanced.height(),
            color_palette,
        })
    }

    /// Independently callable stage: the lightened crop variant for the
    /// background classifier. Never part of the user-visible output.
    pub fn prepare_segmentation(&self, crop: &DynamicImage) -> Result<SegmentationInput> {
        self.preprocessor.prepare(crop)
    }

    /// The configuration this pipeline was built with
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

/// Background-removal policy for one workflow run
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkflowOptions {
    /// Ask the segmenter for an alpha mask and graft it onto the crop.
    /// Ignored for the `texture-remove` approach.
    pub remove_background: bool,
}

/// Full workflow with injected external collaborators
pub struct GarmentWorkflow<D: PrintDetector, S: BackgroundSegmenter> {
    pipeline: ExtractionPipeline,
    detector: D,
    segmenter: S,
}

impl<D: PrintDetector, S: BackgroundSegmenter> GarmentWorkflow<D, S> {
    /// Create a workflow with the default pipeline configuration
    pub fn new(detector: D, segmenter: S) -> Self {
        Self {
            pipeline: ExtractionPipeline::new(),
            detector,
            segmenter,
        }
    }

    /// Create a workflow around an explicitly configured pipeline
    pub fn with_pipeline(pipeline: ExtractionPipeline, detector: D, segmenter: S) -> Self {
        Self {
            pipeline,
            detector,
            segmenter,
        }
    }

    /// Detect the print and run the extraction pipeline
    pub fn process(
        &self,
        image_bytes: &[u8],
        mime_type: &str,
        options: &WorkflowOptions,
    ) -> Result<ExtractionOutput> {
        let detection = self.detector.detect(image_bytes, mime_type)?;
        debug!(
            garment = %detection.garment_type,
            approach = ?detection.extraction_approach,
            confidence = detection.confidence,
            "detector result"
        );
        self.process_detected(image_bytes, &detection, None, options)
    }

    /// Run the extraction pipeline for an existing (possibly user-adjusted)
    /// detection
    ///
    /// When background removal applies, the segmenter sees only the
    /// lightened variant; its mask is grafted onto the pristine crop, and
    /// enhancement runs after grafting so the visible output keeps its
    /// original colors under the mask.
    pub fn process_detected(
        &self,
        image_bytes: &[u8],
        detection: &Detection,
        adjusted_points: Option<&PerspectivePoints>,
        options: &WorkflowOptions,
    ) -> Result<ExtractionOutput> {
        let source = self.pipeline.load_source(image_bytes)?;
        let crop = self
            .pipeline
            .extract_region(&source, detection, adjusted_points)?;

        let remove_background = options.remove_background
            && detection.extraction_approach != ExtractionApproach::TextureRemove;

        let crop = if remove_background {
            let seg_input = self.pipeline.prepare_segmentation(&crop)?;
            let mask_bytes = self.segmenter.segment(&seg_input.png_bytes)?;
            graft_alpha(&crop, &mask_bytes)?
        } else {
            crop
        };

        self.pipeline.finish(crop)
    }
}

/// Downscale a raster that exceeds the pixel budget, preserving aspect.
/// A budget of 0 disables the guard.
fn downscale_to_budget(img: DynamicImage, max_pixels: u64) -> DynamicImage {
    if max_pixels == 0 {
        return img;
    }
    let pixels = u64::from(img.width()) * u64::from(img.height());
    if pixels <= max_pixels {
        return img;
    }

    let target = performance::DOWNSCALE_TARGET_PIXELS.min(max_pixels);
    let scale = (target as f64 / pixels as f64).sqrt();
    let width = ((f64::from(img.width()) * scale).round() as u32).max(1);
    let height = ((f64::from(img.height()) * scale).round() as u32).max(1);
    debug!(
        from_width = img.width(),
        from_height = img.height(),
        width,
        height,
        "downscaling oversized source"
    );
    img.resize_exact(width, height, FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractError;
    use crate::geometry::BoundingBox;
    use image::{Luma, Rgb, RgbImage};

    fn source_png(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 120])
        }));
        encode_png(&img).unwrap()
    }

    fn detection(approach: ExtractionApproach) -> Detection {
        Detection {
            garment_type: "t-shirt".into(),
            print_location: "front-center".into(),
            bounding_box: BoundingBox {
                x: 0.1,
                y: 0.1,
                width: 0.3,
                height: 0.2,
            },
            perspective_points: Some(PerspectivePoints([
                [0.1, 0.1],
                [0.4, 0.1],
                [0.4, 0.3],
                [0.1, 0.3],
            ])),
            confidence: 0.9,
            extraction_approach: approach,
        }
    }

    struct StubDetector(Detection);

    impl PrintDetector for StubDetector {
        fn detect(&self, _image_bytes: &[u8], _mime_type: &str) -> Result<Detection> {
            Ok(self.0.clone())
        }
    }

    /// Returns a mask that is opaque on the left half, transparent on the
    /// right
    struct HalfMaskSegmenter;

    impl BackgroundSegmenter for HalfMaskSegmenter {
        fn segment(&self, lightened_png: &[u8]) -> Result<Vec<u8>> {
            let lightened = decode_image(lightened_png)?;
            let (w, h) = (lightened.width(), lightened.height());
            let mask =
                image::GrayImage::from_fn(w, h, |x, _| Luma([if x < w / 2 { 255 } else { 0 }]));
            encode_png(&DynamicImage::ImageLuma8(mask))
        }
    }

    /// Fails the test if the segmenter is ever reached
    struct UnreachableSegmenter;

    impl BackgroundSegmenter for UnreachableSegmenter {
        fn segment(&self, _lightened_png: &[u8]) -> Result<Vec<u8>> {
            panic!("segmenter must not be called");
        }
    }

    #[test]
    fn test_direct_approach_end_to_end() {
        let pipeline = ExtractionPipeline::new();
        let output = pipeline
            .extract(&source_png(1000, 800), &detection(ExtractionApproach::Direct), None)
            .unwrap();
        assert_eq!((output.width, output.height), (300, 160));
        assert!(!output.color_palette.is_empty());
        assert!(output.color_palette.len() <= 5);

        let decoded = decode_image(&output.image_bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (300, 160));
    }

    #[test]
    fn test_perspective_approach_end_to_end() {
        let pipeline = ExtractionPipeline::new();
        let output = pipeline
            .extract(
                &source_png(1000, 800),
                &detection(ExtractionApproach::PerspectiveCorrect),
                None,
            )
            .unwrap();
        // Axis-aligned quad degrades to a plain 300x160 extraction
        assert_eq!((output.width, output.height), (300, 160));
    }

    #[test]
    fn test_adjusted_points_override_detected_points() {
        let pipeline = ExtractionPipeline::new();
        let adjusted = PerspectivePoints([[0.0, 0.0], [0.2, 0.0], [0.2, 0.1], [0.0, 0.1]]);
        let output = pipeline
            .extract(
                &source_png(1000, 800),
                &detection(ExtractionApproach::PerspectiveCorrect),
                Some(&adjusted),
            )
            .unwrap();
        assert_eq!((output.width, output.height), (200, 80));
    }

    #[test]
    fn test_out_of_range_box_reports_empty_region() {
        let pipeline = ExtractionPipeline::new();
        let mut bad = detection(ExtractionApproach::Direct);
        bad.bounding_box = BoundingBox {
            x: 1.2,
            y: 0.0,
            width: 0.1,
            height: 0.1,
        };
        let err = pipeline
            .extract(&source_png(640, 480), &bad, None)
            .unwrap_err();
        assert!(matches!(err, ExtractError::EmptyRegion { .. }));
    }

    #[test]
    fn test_garbage_bytes_report_invalid_image() {
        let pipeline = ExtractionPipeline::new();
        let err = pipeline
            .extract(b"not an image", &detection(ExtractionApproach::Direct), None)
            .unwrap_err();
        assert!(matches!(err, ExtractError::InvalidImage { .. }));
    }

    #[test]
    fn test_quad_approach_without_points_uses_bounding_box() {
        let pipeline = ExtractionPipeline::new();
        let mut det = detection(ExtractionApproach::PerspectiveCorrect);
        det.perspective_points = None;
        let output = pipeline.extract(&source_png(1000, 800), &det, None).unwrap();
        assert_eq!((output.width, output.height), (300, 160));
    }

    #[test]
    fn test_workflow_grafts_mask_onto_pristine_crop() {
        let workflow = GarmentWorkflow::new(
            StubDetector(detection(ExtractionApproach::Direct)),
            HalfMaskSegmenter,
        );
        let output = workflow
            .process(
                &source_png(1000, 800),
                "image/png",
                &WorkflowOptions {
                    remove_background: true,
                },
            )
            .unwrap();

        let decoded = decode_image(&output.image_bytes).unwrap().to_rgba8();
        // Left half opaque, right half transparent, per the mask
        assert_eq!(decoded.get_pixel(10, 80).0[3], 255);
        assert_eq!(decoded.get_pixel(290, 80).0[3], 0);
    }

    #[test]
    fn test_texture_remove_skips_background_removal() {
        let workflow = GarmentWorkflow::new(
            StubDetector(detection(ExtractionApproach::TextureRemove)),
            UnreachableSegmenter,
        );
        let output = workflow
            .process(
                &source_png(1000, 800),
                "image/png",
                &WorkflowOptions {
                    remove_background: true,
                },
            )
            .unwrap();
        assert_eq!((output.width, output.height), (300, 160));
    }

    #[test]
    fn test_background_removal_disabled_by_default() {
        let workflow = GarmentWorkflow::new(
            StubDetector(detection(ExtractionApproach::Direct)),
            UnreachableSegmenter,
        );
        let output = workflow
            .process(&source_png(1000, 800), "image/png", &WorkflowOptions::default())
            .unwrap();
        assert_eq!((output.width, output.height), (300, 160));
    }

    #[test]
    fn test_downscale_guard_respects_budget() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(400, 300));
        let kept = downscale_to_budget(img.clone(), 200_000);
        assert_eq!((kept.width(), kept.height()), (400, 300));

        let shrunk = downscale_to_budget(img.clone(), 30_000);
        assert!(u64::from(shrunk.width()) * u64::from(shrunk.height()) <= 31_000);
        // Aspect preserved within rounding
        let ratio = f64::from(shrunk.width()) / f64::from(shrunk.height());
        assert!((ratio - 4.0 / 3.0).abs() < 0.05);

        let disabled = downscale_to_budget(img, 0);
        assert_eq!((disabled.width(), disabled.height()), (400, 300));
    }
}
