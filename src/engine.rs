//! Core masking engine.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use image::RgbaImage;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::blur::{self, GaussianKernel, DEFAULT_RADIUS};
use crate::codec::{Codec, ImageCodec};
use crate::error::{Error, Result};
use crate::overlay::{self, BitmapLabel, LabelRenderer};
use crate::pixelate;
use crate::region::{DetectionSummary, Region};
use crate::synth::{RegionDetector, RegionSynthesizer};

/// Visual transform applied to every region of a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum MaskingStyle {
    /// Translucent black bar with a `MASKED` label.
    #[default]
    #[cfg_attr(feature = "cli", value(name = "blackbar"))]
    BlackBar,
    /// Gaussian blur.
    Blur,
    /// Block pixelation.
    Pixelate,
}

impl MaskingStyle {
    /// Wire name: `blackbar`, `blur` or `pixelate`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BlackBar => "blackbar",
            Self::Blur => "blur",
            Self::Pixelate => "pixelate",
        }
    }

    /// Parse a wire name, falling back to [`MaskingStyle::BlackBar`] for
    /// anything unrecognized.
    #[must_use]
    pub fn from_name_or_default(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }
}

impl fmt::Display for MaskingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaskingStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blackbar" => Ok(Self::BlackBar),
            "blur" => Ok(Self::Blur),
            "pixelate" => Ok(Self::Pixelate),
            _ => Err(Error::UnknownStyle(s.to_string())),
        }
    }
}

/// Options controlling masking behavior.
#[derive(Debug, Clone)]
pub struct MaskOptions {
    /// Transform applied to every region.
    pub style: MaskingStyle,
    /// Gaussian blur radius in pixels (>= 1).
    pub blur_radius: u32,
    /// Seed for the region synthesizer; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Enable verbose logging.
    pub verbose: bool,
    /// Suppress non-error output.
    pub quiet: bool,
}

impl Default for MaskOptions {
    fn default() -> Self {
        Self {
            style: MaskingStyle::default(),
            blur_radius: DEFAULT_RADIUS,
            seed: None,
            verbose: false,
            quiet: false,
        }
    }
}

impl MaskOptions {
    /// Region synthesizer seeded according to these options.
    #[must_use]
    pub fn synthesizer(&self) -> RegionSynthesizer<StdRng> {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        RegionSynthesizer::new(rng)
    }
}

/// Output of one successful masking request.
#[derive(Debug, Clone)]
pub struct MaskResult {
    /// The masked pixel buffer.
    pub image: RgbaImage,
    /// `image` encoded by the engine's codec.
    pub data: Vec<u8>,
    /// Per-category count of masked regions.
    pub summary: DetectionSummary,
    /// Style that was applied.
    pub style: MaskingStyle,
}

/// Result of processing a single image file.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResult {
    /// Path of the processed file.
    pub path: PathBuf,
    /// Whether processing succeeded.
    pub success: bool,
    /// Per-category count of masked regions (zero on failure).
    pub detected_pii: DetectionSummary,
    /// Style that was applied.
    pub style: MaskingStyle,
    /// Human-readable status message.
    pub message: String,
}

impl ProcessResult {
    fn failed(path: &Path, style: MaskingStyle, message: String) -> Self {
        Self {
            path: path.to_path_buf(),
            success: false,
            detected_pii: DetectionSummary::default(),
            style,
            message,
        }
    }
}

/// The masking engine: dispatches regions to filters and runs the
/// decode, detect, mask, encode pipeline.
///
/// Create once and reuse; each request works on its own buffer, so a shared
/// engine is safe across threads.
pub struct MaskingEngine {
    kernel: GaussianKernel,
    label: Box<dyn LabelRenderer + Send + Sync>,
    codec: ImageCodec,
}

impl Default for MaskingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MaskingEngine {
    /// Engine with the default blur radius, bitmap label and PNG output.
    #[must_use]
    pub fn new() -> Self {
        Self {
            kernel: GaussianKernel::default(),
            label: Box::new(BitmapLabel::default()),
            codec: ImageCodec::default(),
        }
    }

    /// Engine configured from [`MaskOptions`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBlurRadius`] if `opts.blur_radius` is 0.
    pub fn with_options(opts: &MaskOptions) -> Result<Self> {
        Ok(Self {
            kernel: GaussianKernel::new(opts.blur_radius)?,
            ..Self::new()
        })
    }

    /// Replace the output codec used by [`MaskingEngine::process`].
    #[must_use]
    pub fn with_codec(mut self, codec: ImageCodec) -> Self {
        self.codec = codec;
        self
    }

    /// Replace the renderer used for the black-bar label.
    #[must_use]
    pub fn with_label_renderer(mut self, label: Box<dyn LabelRenderer + Send + Sync>) -> Self {
        self.label = label;
        self
    }

    /// Blur kernel in use.
    #[must_use]
    pub fn kernel(&self) -> &GaussianKernel {
        &self.kernel
    }

    /// Apply `style` to one region.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegion`] if the region does not fit the image.
    pub fn mask_region(
        &self,
        image: &mut RgbaImage,
        region: &Region,
        style: MaskingStyle,
    ) -> Result<()> {
        match style {
            MaskingStyle::Blur => blur::apply(image, region, &self.kernel),
            MaskingStyle::Pixelate => pixelate::apply(image, region),
            MaskingStyle::BlackBar => overlay::apply(image, region, self.label.as_ref()),
        }
    }

    /// Apply `style` to every region, in order.
    ///
    /// Later regions overwrite earlier ones where they overlap. Stops at the
    /// first invalid region.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegion`] if any region does not fit the image.
    pub fn mask_all(
        &self,
        image: &mut RgbaImage,
        regions: &[Region],
        style: MaskingStyle,
    ) -> Result<()> {
        for region in regions {
            debug!(category = ?region.category, %style, "masking region");
            self.mask_region(image, region, style)?;
        }
        Ok(())
    }

    /// Detect regions in a decoded image and mask them in place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegion`] if the detector emits a region
    /// outside the image.
    pub fn mask_image<D: RegionDetector + ?Sized>(
        &self,
        image: &mut RgbaImage,
        style: MaskingStyle,
        detector: &mut D,
    ) -> Result<DetectionSummary> {
        let (regions, summary) = detector.detect(image.width(), image.height());
        self.mask_all(image, &regions, style)?;
        Ok(summary)
    }

    /// Full pipeline: decode, detect, mask, encode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] for unreadable input, [`Error::InvalidRegion`]
    /// for a misbehaving detector and [`Error::Encode`] if the output cannot
    /// be written.
    pub fn process<D: RegionDetector + ?Sized>(
        &self,
        bytes: &[u8],
        style: MaskingStyle,
        detector: &mut D,
    ) -> Result<MaskResult> {
        let mut image = self.codec.decode(bytes)?;
        let summary = self.mask_image(&mut image, style, detector)?;
        let data = self.codec.encode(&image)?;

        info!(
            width = image.width(),
            height = image.height(),
            regions = summary.total(),
            %style,
            "masked image"
        );

        Ok(MaskResult {
            image,
            data,
            summary,
            style,
        })
    }

    /// Process a single image file: load, detect, mask, save.
    ///
    /// The output format follows the output path's extension.
    #[must_use]
    pub fn process_file(&self, input: &Path, output: &Path, opts: &MaskOptions) -> ProcessResult {
        let style = opts.style;

        let bytes = match std::fs::read(input) {
            Ok(b) => b,
            Err(e) => return ProcessResult::failed(input, style, format!("Failed to read: {e}")),
        };

        let mut image = match self.codec.decode(&bytes) {
            Ok(img) => img,
            Err(e) => return ProcessResult::failed(input, style, format!("Failed to load: {e}")),
        };

        let mut detector = opts.synthesizer();
        let summary = match self.mask_image(&mut image, style, &mut detector) {
            Ok(s) => s,
            Err(e) => return ProcessResult::failed(input, style, format!("Failed to mask: {e}")),
        };

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    return ProcessResult::failed(
                        input,
                        style,
                        format!("Failed to create output directory: {e}"),
                    );
                }
            }
        }

        if let Err(e) = save_image(&image, output) {
            warn!(path = %output.display(), error = %e, "failed to save masked image");
            return ProcessResult::failed(input, style, format!("Failed to save: {e}"));
        }

        ProcessResult {
            path: input.to_path_buf(),
            success: true,
            detected_pii: summary,
            style,
            message: format!("Masked {} region(s)", summary.total()),
        }
    }

    /// Process all supported images in a directory.
    ///
    /// Uses parallel iteration when the `cli` feature is enabled (via rayon).
    /// Returns a [`ProcessResult`] for each image found.
    #[must_use]
    pub fn process_directory(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        opts: &MaskOptions,
    ) -> Vec<ProcessResult> {
        let entries: Vec<PathBuf> = match std::fs::read_dir(input_dir) {
            Ok(rd) => rd
                .filter_map(std::result::Result::ok)
                .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
                .map(|e| e.path())
                .filter(|p| is_supported_image(p))
                .collect(),
            Err(e) => {
                return vec![ProcessResult::failed(
                    input_dir,
                    opts.style,
                    format!("Failed to read directory: {e}"),
                )];
            }
        };

        if !output_dir.exists() {
            if let Err(e) = std::fs::create_dir_all(output_dir) {
                return vec![ProcessResult::failed(
                    output_dir,
                    opts.style,
                    format!("Failed to create output directory: {e}"),
                )];
            }
        }

        let run = |input: &PathBuf| match input.file_name() {
            Some(name) => self.process_file(input, &output_dir.join(name), opts),
            None => ProcessResult::failed(input, opts.style, "Missing file name".to_string()),
        };

        #[cfg(feature = "cli")]
        {
            use rayon::prelude::*;
            entries.par_iter().map(run).collect()
        }

        #[cfg(not(feature = "cli"))]
        {
            entries.iter().map(run).collect()
        }
    }
}

/// Check if a file has a supported image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => matches!(
            ext.to_lowercase().as_str(),
            "jpg" | "jpeg" | "png" | "gif" | "webp" | "bmp"
        ),
        None => false,
    }
}

/// Save an RGBA image in the format implied by the path's extension.
///
/// # Errors
///
/// Returns an error if the format is unsupported or writing fails.
pub fn save_image(img: &RgbaImage, path: &Path) -> Result<()> {
    let bytes = ImageCodec::for_path(path)?.encode(img)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Generate a default output path from an input path.
///
/// Example: `"photo.jpg"` becomes `"photo_masked.jpg"`.
#[must_use]
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let ext = input.extension().unwrap_or_default().to_string_lossy();
    let parent = input.parent().unwrap_or(Path::new("."));
    parent.join(format!("{stem}_masked.{ext}"))
}
