//! Obscure sensitive regions of an image.
//!
//! A [`RegionDetector`] proposes rectangular regions (faces, text, ID
//! numbers, addresses) and the [`MaskingEngine`] irreversibly obscures each
//! one with the requested [`MaskingStyle`]: a translucent black bar with a
//! `MASKED` label, a Gaussian blur, or block pixelation.
//!
//! The bundled detector, [`RegionSynthesizer`], is a stand-in that places
//! regions at random from an injected RNG; a real detector plugs in behind
//! the same trait.
//!
//! # Quick Start
//!
//! ```no_run
//! use pii_mask::{MaskingEngine, MaskingStyle, RegionSynthesizer};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let engine = MaskingEngine::new();
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let mut detector = RegionSynthesizer::new(StdRng::seed_from_u64(7));
//! let result = engine.process(&bytes, MaskingStyle::Blur, &mut detector).unwrap();
//! std::fs::write("masked.png", &result.data).unwrap();
//! println!("faces masked: {}", result.summary.faces);
//! ```
//!
//! # Masking a buffer directly
//!
//! ```
//! use image::{Rgba, RgbaImage};
//! use pii_mask::{Category, MaskingEngine, MaskingStyle, Region};
//!
//! let mut img = RgbaImage::from_pixel(100, 100, Rgba([255, 255, 255, 255]));
//! let face = Region::new(10, 10, 20, 20, Category::Face);
//! MaskingEngine::new()
//!     .mask_all(&mut img, &[face], MaskingStyle::BlackBar)
//!     .unwrap();
//! assert!(img.get_pixel(11, 11)[0] <= 25);
//! ```

#![deny(missing_docs)]

pub mod blur;
pub mod codec;
mod engine;
pub mod error;
pub mod overlay;
pub mod pixelate;
pub mod region;
pub mod service;
pub mod synth;

pub use codec::{Codec, ImageCodec};
pub use engine::{
    default_output_path, is_supported_image, save_image, MaskOptions, MaskResult, MaskingEngine,
    MaskingStyle, ProcessResult,
};
pub use error::{Error, Result};
pub use region::{Category, DetectionSummary, Region};
pub use synth::{synthesize, RegionDetector, RegionSynthesizer};

/// Decoded RGBA8 pixel data, row-major.
pub type PixelBuffer = image::RgbaImage;
