//! Error types for the pii-mask crate.

/// Errors that can occur while decoding, masking or encoding an image.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input bytes are not a supported or well-formed image.
    #[error("failed to decode image: {0}")]
    Decode(image::ImageError),

    /// The masked buffer could not be encoded into output bytes.
    #[error("failed to encode image: {0}")]
    Encode(image::ImageError),

    /// A region does not lie entirely inside the image.
    #[error(
        "region {width}x{height} at ({x},{y}) exceeds {image_width}x{image_height} image bounds"
    )]
    InvalidRegion {
        /// Region left edge.
        x: u32,
        /// Region top edge.
        y: u32,
        /// Region width.
        width: u32,
        /// Region height.
        height: u32,
        /// Image width in pixels.
        image_width: u32,
        /// Image height in pixels.
        image_height: u32,
    },

    /// Blur radius must be at least 1.
    #[error("blur radius must be >= 1, got {0}")]
    InvalidBlurRadius(u32),

    /// The masking style name is not one of `blackbar`, `blur` or `pixelate`.
    #[error("unknown masking style: {0:?}")]
    UnknownStyle(String),

    /// The image format is not supported for output.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
