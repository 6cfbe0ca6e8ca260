//! Normalized-to-pixel coordinate mapping with boundary clamping
//!
//! All region coordinates entering the pipeline are normalized to [0, 1]
//! relative to image width (x) or height (y). This module converts them to
//! pixel space and clamps the result into the image, with no I/O and no
//! error paths: every function here is total over finite numeric input
//! (NaN/Infinity rejection is the schema validator's concern, upstream).

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in normalized coordinates, anchored at top-left.
///
/// The detector may legitimately supply a box that exceeds image bounds
/// after denormalization; that is handled by [`clamp_rect`], not rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Ordered quadrilateral corners in normalized coordinates.
///
/// Positional contract: top-left, top-right, bottom-right, bottom-left.
/// The order is not geometrically validated (no convexity or winding
/// checks); downstream logic tolerates degenerate input by falling back
/// to the uncorrected raster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PerspectivePoints(pub [[f64; 2]; 4]);

impl PerspectivePoints {
    pub fn top_left(&self) -> [f64; 2] {
        self.0[0]
    }

    pub fn top_right(&self) -> [f64; 2] {
        self.0[1]
    }

    pub fn bottom_right(&self) -> [f64; 2] {
        self.0[2]
    }

    pub fn bottom_left(&self) -> [f64; 2] {
        self.0[3]
    }
}

/// Pixel-space rectangle. Signed so out-of-range denormalization results
/// survive until clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
}

impl PixelRect {
    /// A rectangle with zero (or negative) area selects no pixels
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// Pixel-space quadrilateral, same corner order as [`PerspectivePoints`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelQuad(pub [[i64; 2]; 4]);

impl PixelQuad {
    pub fn top_left(&self) -> [i64; 2] {
        self.0[0]
    }

    pub fn top_right(&self) -> [i64; 2] {
        self.0[1]
    }

    pub fn bottom_right(&self) -> [i64; 2] {
        self.0[2]
    }

    pub fn bottom_left(&self) -> [i64; 2] {
        self.0[3]
    }
}

/// Convert one normalized coordinate to a pixel coordinate
///
/// Pixel coordinate = `round(normalized * dimension)`.
pub fn denormalize_coord(normalized: f64, dimension: u32) -> i64 {
    (normalized * f64::from(dimension)).round() as i64
}

/// Convert a normalized bounding box to a pixel rectangle
pub fn denormalize_box(bbox: &BoundingBox, img_width: u32, img_height: u32) -> PixelRect {
    PixelRect {
        left: denormalize_coord(bbox.x, img_width),
        top: denormalize_coord(bbox.y, img_height),
        width: denormalize_coord(bbox.width, img_width),
        height: denormalize_coord(bbox.height, img_height),
    }
}

/// Convert normalized quadrilateral corners to pixel space
pub fn denormalize_quad(points: &PerspectivePoints, img_width: u32, img_height: u32) -> PixelQuad {
    let mut corners = [[0i64; 2]; 4];
    for (corner, [x, y]) in corners.iter_mut().zip(points.0.iter()) {
        corner[0] = denormalize_coord(*x, img_width);
        corner[1] = denormalize_coord(*y, img_height);
    }
    PixelQuad(corners)
}

/// Clamp a pixel rectangle into `[0, img_width) x [0, img_height)`
///
/// Guarantees `0 <= left`, `0 <= top`, `left + width <= img_width`,
/// `top + height <= img_height`, and non-negative width/height. The size
/// bound is taken against the unclamped edge as well as the clamped one,
/// so a rectangle lying entirely past the right or bottom edge collapses
/// to zero area instead of leaving a one-pixel sliver at the border.
/// Callers must handle a zero-area result.
pub fn clamp_rect(rect: &PixelRect, img_width: u32, img_height: u32) -> PixelRect {
    let w = i64::from(img_width);
    let h = i64::from(img_height);

    let left = rect.left.clamp(0, (w - 1).max(0));
    let top = rect.top.clamp(0, (h - 1).max(0));

    let width = rect.width.min(w - rect.left).min(w - left).max(0);
    let height = rect.height.min(h - rect.top).min(h - top).max(0);

    PixelRect {
        left,
        top,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denormalize_coord_rounds_to_nearest() {
        assert_eq!(denormalize_coord(0.1, 1000), 100);
        assert_eq!(denormalize_coord(0.5, 3), 2); // 1.5 rounds half away from zero
        assert_eq!(denormalize_coord(1.0, 800), 800);
        assert_eq!(denormalize_coord(0.0, 800), 0);
    }

    #[test]
    fn test_denormalize_box_scenario_a() {
        // 1000x800 image, box {0.1, 0.1, 0.3, 0.2}
        let bbox = BoundingBox {
            x: 0.1,
            y: 0.1,
            width: 0.3,
            height: 0.2,
        };
        let rect = denormalize_box(&bbox, 1000, 800);
        assert_eq!(
            rect,
            PixelRect {
                left: 100,
                top: 80,
                width: 300,
                height: 160
            }
        );
    }

    #[test]
    fn test_clamp_rect_in_bounds_is_identity() {
        let rect = PixelRect {
            left: 100,
            top: 80,
            width: 300,
            height: 160,
        };
        assert_eq!(clamp_rect(&rect, 1000, 800), rect);
    }

    #[test]
    fn test_clamp_rect_overhanging_right_edge() {
        let rect = PixelRect {
            left: 900,
            top: 0,
            width: 300,
            height: 100,
        };
        let clamped = clamp_rect(&rect, 1000, 800);
        assert_eq!(clamped.left, 900);
        assert_eq!(clamped.width, 100);
        assert_eq!(clamped.height, 100);
    }

    #[test]
    fn test_clamp_rect_fully_outside_collapses_to_zero() {
        // x = 1.2 on a 1000-wide image -> left = 1200
        let rect = PixelRect {
            left: 1200,
            top: 0,
            width: 100,
            height: 80,
        };
        let clamped = clamp_rect(&rect, 1000, 800);
        assert_eq!(clamped.width, 0);
        assert!(clamped.is_empty());
        // Still inside bounds
        assert!(clamped.left >= 0 && clamped.left < 1000);
    }

    #[test]
    fn test_clamp_rect_negative_origin() {
        let rect = PixelRect {
            left: -50,
            top: -20,
            width: 100,
            height: 100,
        };
        let clamped = clamp_rect(&rect, 1000, 800);
        assert_eq!(clamped.left, 0);
        assert_eq!(clamped.top, 0);
        assert_eq!(clamped.width, 100);
        assert_eq!(clamped.height, 100);
    }

    #[test]
    fn test_clamp_rect_invariants_hold_for_arbitrary_boxes() {
        // Denormalization correctness property over a coarse sweep
        let sizes = [(1u32, 1u32), (3, 7), (640, 480), (1000, 800)];
        let coords = [-0.5, 0.0, 0.1, 0.5, 0.99, 1.0, 1.5];
        for &(w, h) in &sizes {
            for &x in &coords {
                for &y in &coords {
                    for &bw in &coords[1..] {
                        for &bh in &coords[1..] {
                            let bbox = BoundingBox {
                                x,
                                y,
                                width: bw,
                                height: bh,
                            };
                            let clamped = clamp_rect(&denormalize_box(&bbox, w, h), w, h);
                            assert!(clamped.left >= 0);
                            assert!(clamped.top >= 0);
                            assert!(clamped.width >= 0);
                            assert!(clamped.height >= 0);
                            assert!(clamped.left + clamped.width <= i64::from(w));
                            assert!(clamped.top + clamped.height <= i64::from(h));
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_quad_corner_order() {
        let points = PerspectivePoints([[0.1, 0.1], [0.4, 0.1], [0.4, 0.3], [0.1, 0.3]]);
        let quad = denormalize_quad(&points, 1000, 800);
        assert_eq!(quad.top_left(), [100, 80]);
        assert_eq!(quad.top_right(), [400, 80]);
        assert_eq!(quad.bottom_right(), [400, 240]);
        assert_eq!(quad.bottom_left(), [100, 240]);
    }

    #[test]
    fn test_perspective_points_serde_is_nested_pairs() {
        let points = PerspectivePoints([[0.1, 0.2], [0.9, 0.2], [0.9, 0.8], [0.1, 0.8]]);
        let json = serde_json::to_string(&points).unwrap();
        assert_eq!(json, "[[0.1,0.2],[0.9,0.2],[0.9,0.8],[0.1,0.8]]");
        let back: PerspectivePoints = serde_json::from_str(&json).unwrap();
        assert_eq!(back, points);
    }
}
