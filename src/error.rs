//! Error types for the compositing pipeline

use thiserror::Error;

/// Convenience result type for pipeline operations.
pub type Result<T> = std::result::Result<T, CompositeError>;

/// Terminal failure for a single (template, replacement) pair.
///
/// The pipeline never retries and never emits partial output; callers attach
/// the offending file name and decide whether to skip or abort.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompositeError {
    /// Input bytes are not a readable raster image
    #[error("Failed to decode image: {0}")]
    Decode(String),
    /// Template frame has no opaque region to replace
    #[error("Template has no opaque subject region")]
    NoSubject,
    /// Replacement artwork is fully transparent in every frame
    #[error("Replacement has no visible content")]
    EmptyReplacement,
    /// A computed canvas or resize target has a zero dimension
    #[error("Invalid dimensions {width}x{height}")]
    InvalidDimensions { width: i64, height: i64 },
    /// Output serialization failed
    #[error("Failed to encode animation: {0}")]
    Encode(String),
}

impl CompositeError {
    pub(crate) fn invalid_dimensions(width: impl Into<i64>, height: impl Into<i64>) -> Self {
        CompositeError::InvalidDimensions { width: width.into(), height: height.into() }
    }
}

impl From<image::ImageError> for CompositeError {
    fn from(e: image::ImageError) -> Self {
        CompositeError::Decode(e.to_string())
    }
}

impl From<gif::DecodingError> for CompositeError {
    fn from(e: gif::DecodingError) -> Self {
        CompositeError::Decode(e.to_string())
    }
}

impl From<gif::EncodingError> for CompositeError {
    fn from(e: gif::EncodingError) -> Self {
        CompositeError::Encode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(CompositeError::NoSubject.to_string(), "Template has no opaque subject region");
        assert_eq!(
            CompositeError::invalid_dimensions(0, 12).to_string(),
            "Invalid dimensions 0x12"
        );
        assert!(CompositeError::Decode("bad header".into()).to_string().contains("bad header"));
    }
}
