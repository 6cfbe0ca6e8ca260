//! EXIF orientation handling for phone photos
//!
//! Garment photos come overwhelmingly from phones, which store the sensor
//! raster unrotated and record the display orientation as EXIF tag 274.
//! Detector coordinates are normalized against the *upright* photo, so the
//! orientation must be applied before any geometry math. Missing or
//! unparseable EXIF degrades to the identity orientation rather than
//! failing the call.

use exif::{In, Reader, Tag};
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// EXIF orientation values 1-8 (tag 274)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// 1: upright
    Normal,
    /// 2: mirrored horizontally
    FlipHorizontal,
    /// 3: rotated 180
    Rotate180,
    /// 4: mirrored vertically
    FlipVertical,
    /// 5: mirrored along the top-left diagonal
    Transpose,
    /// 6: rotated 90 clockwise
    Rotate90,
    /// 7: mirrored along the top-right diagonal
    Transverse,
    /// 8: rotated 270 clockwise
    Rotate270,
}

impl Orientation {
    /// Map the raw EXIF tag value to an orientation
    pub fn from_exif_value(value: u32) -> Option<Orientation> {
        match value {
            1 => Some(Orientation::Normal),
            2 => Some(Orientation::FlipHorizontal),
            3 => Some(Orientation::Rotate180),
            4 => Some(Orientation::FlipVertical),
            5 => Some(Orientation::Transpose),
            6 => Some(Orientation::Rotate90),
            7 => Some(Orientation::Transverse),
            8 => Some(Orientation::Rotate270),
            _ => None,
        }
    }

    /// Whether applying this orientation swaps width and height
    pub fn swaps_dimensions(&self) -> bool {
        matches!(
            self,
            Orientation::Transpose
                | Orientation::Rotate90
                | Orientation::Transverse
                | Orientation::Rotate270
        )
    }

    /// Apply this orientation to a raster, producing the upright image
    pub fn apply(&self, img: DynamicImage) -> DynamicImage {
        match self {
            Orientation::Normal => img,
            Orientation::FlipHorizontal => img.fliph(),
            Orientation::Rotate180 => img.rotate180(),
            Orientation::FlipVertical => img.flipv(),
            Orientation::Transpose => img.rotate90().fliph(),
            Orientation::Rotate90 => img.rotate90(),
            Orientation::Transverse => img.rotate270().fliph(),
            Orientation::Rotate270 => img.rotate270(),
        }
    }
}

/// Read the orientation recorded in the encoded image's EXIF block
///
/// Returns [`Orientation::Normal`] when the container carries no EXIF,
/// no orientation tag, or an out-of-range value.
pub fn read_orientation(image_bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(image_bytes);
    let parsed = match Reader::new().read_from_container(&mut cursor) {
        Ok(parsed) => parsed,
        Err(err) => {
            debug!(error = %err, "no EXIF block; assuming upright");
            return Orientation::Normal;
        }
    };

    parsed
        .get_field(Tag::Orientation, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .and_then(Orientation::from_exif_value)
        .unwrap_or(Orientation::Normal)
}

/// Decode-time helper: rotate/flip the raster into its upright position
/// based on the EXIF block of the original encoded bytes
pub fn auto_orient(img: DynamicImage, image_bytes: &[u8]) -> DynamicImage {
    let orientation = read_orientation(image_bytes);
    if orientation != Orientation::Normal {
        debug!(?orientation, "applying EXIF orientation");
    }
    orientation.apply(img)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    /// 2x1 image: red at (0,0), blue at (1,0)
    fn two_pixel() -> DynamicImage {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        img.put_pixel(1, 0, Rgb([0, 0, 255]));
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_exif_value_mapping() {
        assert_eq!(Orientation::from_exif_value(1), Some(Orientation::Normal));
        assert_eq!(Orientation::from_exif_value(6), Some(Orientation::Rotate90));
        assert_eq!(Orientation::from_exif_value(8), Some(Orientation::Rotate270));
        assert_eq!(Orientation::from_exif_value(0), None);
        assert_eq!(Orientation::from_exif_value(9), None);
    }

    #[test]
    fn test_dimension_swap_classification() {
        assert!(!Orientation::Normal.swaps_dimensions());
        assert!(!Orientation::Rotate180.swaps_dimensions());
        assert!(Orientation::Rotate90.swaps_dimensions());
        assert!(Orientation::Transpose.swaps_dimensions());
    }

    #[test]
    fn test_rotate90_moves_first_pixel() {
        let rotated = Orientation::Rotate90.apply(two_pixel());
        assert_eq!((rotated.width(), rotated.height()), (1, 2));
        // Red pixel was at (0,0); after 90 CW it sits at (0,0) still,
        // blue moves below it
        let rgb = rotated.to_rgb8();
        assert_eq!(rgb.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(rgb.get_pixel(0, 1).0, [0, 0, 255]);
    }

    #[test]
    fn test_fliph_swaps_pixels() {
        let flipped = Orientation::FlipHorizontal.apply(two_pixel());
        let rgb = flipped.to_rgb8();
        assert_eq!(rgb.get_pixel(0, 0).0, [0, 0, 255]);
        assert_eq!(rgb.get_pixel(1, 0).0, [255, 0, 0]);
    }

    #[test]
    fn test_no_exif_degrades_to_identity() {
        assert_eq!(read_orientation(b"not an image at all"), Orientation::Normal);
    }

    #[test]
    fn test_auto_orient_without_exif_is_identity() {
        let img = two_pixel();
        let oriented = auto_orient(img.clone(), b"no exif here");
        assert_eq!(oriented.to_rgb8().as_raw(), img.to_rgb8().as_raw());
    }
}
