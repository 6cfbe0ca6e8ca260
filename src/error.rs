//! Error types for the print_lift library

use thiserror::Error;

/// Result type alias for print_lift operations
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Comprehensive error types for print extraction operations
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Input bytes could not be decoded, or the decoded raster has zero area
    #[error("Invalid image: {message}")]
    InvalidImage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The clamped extraction rectangle has zero area (direct-crop path)
    #[error("Empty extraction region: clamped to {width}x{height} at ({left}, {top})")]
    EmptyRegion {
        left: i64,
        top: i64,
        width: i64,
        height: i64,
    },

    /// A raster could not be re-encoded after processing
    #[error("Encode failure: {message}")]
    EncodeFailure {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Segmentation mask dimensions do not match the crop
    #[error("Mask dimension mismatch: crop is {crop_width}x{crop_height}, mask is {mask_width}x{mask_height}")]
    MaskMismatch {
        crop_width: u32,
        crop_height: u32,
        mask_width: u32,
        mask_height: u32,
    },

    /// EXIF metadata could not be parsed
    #[error("EXIF processing error: {message}")]
    ExifError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalid configuration or input parameters
    #[error("Invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },

    /// External collaborator (detector or segmenter) failed
    #[error("Collaborator error: {message}")]
    CollaboratorError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ExtractError {
    /// Create an invalid-image error with context
    pub fn invalid_image<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::InvalidImage {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid-image error without an underlying source
    pub fn invalid_image_msg(message: impl Into<String>) -> Self {
        Self::InvalidImage {
            message: message.into(),
            source: None,
        }
    }

    /// Create an encode-failure error with context
    pub fn encode<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::EncodeFailure {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an EXIF processing error with context
    pub fn exif<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ExifError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a collaborator error with context
    pub fn collaborator<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::CollaboratorError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Check if this error indicates a recoverable condition
    ///
    /// An empty region can be recovered from by re-running detection or
    /// letting the user adjust the region; decode and encode failures cannot.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ExtractError::EmptyRegion { .. } | ExtractError::ExifError { .. }
        )
    }

    /// Get user-friendly error description for application display
    pub fn user_message(&self) -> String {
        match self {
            ExtractError::InvalidImage { .. } => {
                "Could not read the photo. Please upload a JPEG, PNG, or WEBP image.".to_string()
            }
            ExtractError::EmptyRegion { .. } => {
                "The selected region falls outside the photo. Please adjust the selection and try again.".to_string()
            }
            ExtractError::EncodeFailure { .. } => {
                "Could not produce the output image. Please try again with a different photo.".to_string()
            }
            ExtractError::MaskMismatch { .. } => {
                "Background removal returned an unusable result. Please try again.".to_string()
            }
            _ => "Print extraction failed. Please try with a different photo.".to_string(),
        }
    }
}
