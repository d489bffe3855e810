//! Conversion between encoded image bytes and RGBA pixel buffers.

use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::buffer::ConvertBuffer;
use image::{ImageFormat, RgbImage, RgbaImage};

use crate::error::{Error, Result};

/// Decodes input bytes and encodes masked output.
pub trait Codec {
    /// Decode encoded image bytes into an RGBA buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] for malformed or unsupported input.
    fn decode(&self, bytes: &[u8]) -> Result<RgbaImage>;

    /// Encode an RGBA buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] or [`Error::UnsupportedFormat`] on failure.
    fn encode(&self, image: &RgbaImage) -> Result<Vec<u8>>;
}

/// [`Codec`] backed by the `image` crate.
///
/// Decoding sniffs the input format (JPEG, PNG, GIF, WebP, BMP). Encoding
/// writes the configured output format; PNG by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageCodec {
    format: ImageFormat,
}

impl ImageCodec {
    /// Codec writing `format`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] if `format` cannot be written.
    pub fn new(format: ImageFormat) -> Result<Self> {
        match format {
            ImageFormat::Png
            | ImageFormat::Jpeg
            | ImageFormat::Gif
            | ImageFormat::WebP
            | ImageFormat::Bmp => Ok(Self { format }),
            other => Err(Error::UnsupportedFormat(format!("{other:?}"))),
        }
    }

    /// Codec writing the format implied by a file extension.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] if the extension is unknown or
    /// not writable.
    pub fn for_path(path: &Path) -> Result<Self> {
        let format =
            ImageFormat::from_path(path).map_err(|e| Error::UnsupportedFormat(e.to_string()))?;
        Self::new(format)
    }

    /// Output format.
    #[must_use]
    pub fn format(&self) -> ImageFormat {
        self.format
    }
}

impl Default for ImageCodec {
    fn default() -> Self {
        Self {
            format: ImageFormat::Png,
        }
    }
}

impl Codec for ImageCodec {
    fn decode(&self, bytes: &[u8]) -> Result<RgbaImage> {
        let img = image::load_from_memory(bytes).map_err(Error::Decode)?;
        Ok(img.to_rgba8())
    }

    fn encode(&self, image: &RgbaImage) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        match self.format {
            ImageFormat::Jpeg => {
                // JPEG has no alpha channel.
                let rgb: RgbImage = image.convert();
                let mut encoder = JpegEncoder::new_with_quality(&mut out, 100);
                encoder.encode_image(&rgb).map_err(Error::Encode)?;
            }
            format => {
                image
                    .write_to(&mut Cursor::new(&mut out), format)
                    .map_err(Error::Encode)?;
            }
        }
        Ok(out)
    }
}
