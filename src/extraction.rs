//! Region extraction: box crop and approximate perspective correction
//!
//! Produces a single flat raster for the print region from either an
//! axis-aligned bounding box (`direct` approach) or a quadrilateral
//! (`perspective-correct` / `texture-remove` approaches).
//!
//! True projective unwarping is out of scope. The quad path approximates it
//! by cropping the quad's enclosing rectangle and resampling non-uniformly
//! to the quad's edge lengths. This straightens a tilted rectangle when the
//! quad is close to a parallelogram; it does not remove keystone distortion.

use crate::error::{ExtractError, Result};
use crate::geometry::{
    clamp_rect, denormalize_box, denormalize_quad, BoundingBox, PerspectivePoints, PixelQuad,
    PixelRect,
};
use image::{imageops::FilterType, DynamicImage};
use tracing::debug;

/// Euclidean distance between two pixel corners
fn edge_length(a: [i64; 2], b: [i64; 2]) -> f64 {
    let dx = (a[0] - b[0]) as f64;
    let dy = (a[1] - b[1]) as f64;
    (dx * dx + dy * dy).sqrt()
}

/// Output dimensions for the corrected raster: the longer of the two
/// horizontal edges by the longer of the two vertical edges
fn target_dimensions(quad: &PixelQuad) -> (i64, i64) {
    let top = edge_length(quad.top_left(), quad.top_right());
    let bottom = edge_length(quad.bottom_left(), quad.bottom_right());
    let left = edge_length(quad.top_left(), quad.bottom_left());
    let right = edge_length(quad.top_right(), quad.bottom_right());

    let width = top.max(bottom).round() as i64;
    let height = left.max(right).round() as i64;
    (width, height)
}

/// Axis-aligned rectangle enclosing the quad, read from corner pairs.
///
/// Known approximation, kept as-is: each extreme comes from the two corners
/// expected on that side (e.g. `min_x` from TL/BL only), not a full
/// four-corner min/max. A quad with inward-bowed corners is under-covered.
fn enclosing_rect(quad: &PixelQuad) -> PixelRect {
    let min_x = quad.top_left()[0].min(quad.bottom_left()[0]);
    let min_y = quad.top_left()[1].min(quad.top_right()[1]);
    let max_x = quad.top_right()[0].max(quad.bottom_right()[0]);
    let max_y = quad.bottom_left()[1].max(quad.bottom_right()[1]);

    PixelRect {
        left: min_x,
        top: min_y,
        width: max_x - min_x,
        height: max_y - min_y,
    }
}

/// Extract the bounding-box region as an exact pixel crop (no resampling)
///
/// # Errors
///
/// Returns `ExtractError::EmptyRegion` if the clamped rectangle has zero
/// area, e.g. when the box lies entirely outside the image. The caller
/// decides whether to fall back; this function does not retry.
pub fn extract_direct(img: &DynamicImage, bbox: &BoundingBox) -> Result<DynamicImage> {
    let rect = denormalize_box(bbox, img.width(), img.height());
    let clamped = clamp_rect(&rect, img.width(), img.height());

    if clamped.is_empty() {
        return Err(ExtractError::EmptyRegion {
            left: clamped.left,
            top: clamped.top,
            width: clamped.width,
            height: clamped.height,
        });
    }

    debug!(
        left = clamped.left,
        top = clamped.top,
        width = clamped.width,
        height = clamped.height,
        "direct crop"
    );
    Ok(img.crop_imm(
        clamped.left as u32,
        clamped.top as u32,
        clamped.width as u32,
        clamped.height as u32,
    ))
}

/// Extract and approximately straighten the quadrilateral region
///
/// Crops the quad's enclosing rectangle and resizes it non-uniformly to the
/// quad's edge-length dimensions. For an axis-aligned quad this degrades to
/// a plain crop (the resize is dimension-preserving).
///
/// Degenerate input — an enclosing rectangle that clamps to zero area, or
/// zero target dimensions — returns the source raster unchanged. Graceful
/// degradation is the documented policy here, not an error.
pub fn extract_quad(img: &DynamicImage, points: &PerspectivePoints) -> DynamicImage {
    let quad = denormalize_quad(points, img.width(), img.height());
    let (target_width, target_height) = target_dimensions(&quad);
    let clamped = clamp_rect(&enclosing_rect(&quad), img.width(), img.height());

    if clamped.is_empty() || target_width <= 0 || target_height <= 0 {
        debug!("degenerate quad; returning source raster unchanged");
        return img.clone();
    }

    debug!(
        left = clamped.left,
        top = clamped.top,
        crop_width = clamped.width,
        crop_height = clamped.height,
        target_width,
        target_height,
        "quad extraction"
    );

    let crop = img.crop_imm(
        clamped.left as u32,
        clamped.top as u32,
        clamped.width as u32,
        clamped.height as u32,
    );
    crop.resize_exact(
        target_width as u32,
        target_height as u32,
        FilterType::Lanczos3,
    )
}
