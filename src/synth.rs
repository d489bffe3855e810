//! Stand-in region detector.
//!
//! [`RegionSynthesizer`] fabricates plausible face and text regions from a
//! random source instead of looking at pixels. It sits behind the
//! [`RegionDetector`] trait so a real face/text detector can replace it
//! without touching the masking pipeline.
//!
//! Placement fractions are fixed calibration constants of the stand-in:
//! - faces: 1-3, anywhere in the left 60% / top 40%, 15-25% wide, 20-30% tall
//! - text: 0-4, anywhere in the left 70% / top 80%, 20-50% wide, 3-7% tall,
//!   classified 40% text, 30% ID number, 30% address

use rand::Rng;
use tracing::debug;

use crate::region::{Category, DetectionSummary, Region};

const FACE_X_SPAN: f64 = 0.6;
const FACE_Y_SPAN: f64 = 0.4;
const FACE_MIN_WIDTH: f64 = 0.15;
const FACE_WIDTH_JITTER: f64 = 0.1;
const FACE_MIN_HEIGHT: f64 = 0.2;
const FACE_HEIGHT_JITTER: f64 = 0.1;

const TEXT_X_SPAN: f64 = 0.7;
const TEXT_Y_SPAN: f64 = 0.8;
const TEXT_MIN_WIDTH: f64 = 0.2;
const TEXT_WIDTH_JITTER: f64 = 0.3;
const TEXT_MIN_HEIGHT: f64 = 0.03;
const TEXT_HEIGHT_JITTER: f64 = 0.04;

/// Draws below this classify as plain text.
const TEXT_REGION_CUTOFF: f64 = 0.4;
/// Draws below this (and above the text cutoff) classify as ID numbers.
const ID_NUMBER_CUTOFF: f64 = 0.7;

/// Source of candidate sensitive regions for an image of a given size.
pub trait RegionDetector {
    /// Return regions (in processing order) and their per-category tally.
    ///
    /// Every region must satisfy [`Region::check_bounds`] for `width` x `height`.
    fn detect(&mut self, width: u32, height: u32) -> (Vec<Region>, DetectionSummary);
}

/// Random region generator driven by an injected RNG.
///
/// Seed it (e.g. `StdRng::seed_from_u64`) for reproducible output.
#[derive(Debug, Clone)]
pub struct RegionSynthesizer<R> {
    rng: R,
}

impl<R: Rng> RegionSynthesizer<R> {
    /// Wrap a random source.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Give back the random source.
    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl<R: Rng> RegionDetector for RegionSynthesizer<R> {
    fn detect(&mut self, width: u32, height: u32) -> (Vec<Region>, DetectionSummary) {
        synthesize(width, height, &mut self.rng)
    }
}

/// Uniform draw in `[0, max)`.
fn uniform<R: Rng + ?Sized>(rng: &mut R, max: f64) -> f64 {
    rng.random::<f64>() * max
}

/// Snap a floating-point rectangle to whole pixels inside the image.
///
/// `width` and `height` must be non-zero.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_to_image(
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    width: u32,
    height: u32,
    category: Category,
) -> Region {
    let x = (x.floor().max(0.0) as u32).min(width - 1);
    let y = (y.floor().max(0.0) as u32).min(height - 1);
    let w = (w.floor().max(0.0) as u32).clamp(1, width - x);
    let h = (h.floor().max(0.0) as u32).clamp(1, height - y);
    Region::new(x, y, w, h, category)
}

/// Generate faces first, then text-type regions, in draw order.
///
/// Returns no regions and an all-zero summary when either dimension is 0.
pub fn synthesize<R: Rng + ?Sized>(
    width: u32,
    height: u32,
    rng: &mut R,
) -> (Vec<Region>, DetectionSummary) {
    let mut regions = Vec::new();
    let mut summary = DetectionSummary::default();

    if width == 0 || height == 0 {
        return (regions, summary);
    }

    let w = f64::from(width);
    let h = f64::from(height);

    let face_count: usize = rng.random_range(1..=3);
    for _ in 0..face_count {
        let x = uniform(rng, w * FACE_X_SPAN);
        let y = uniform(rng, h * FACE_Y_SPAN);
        let rw = w * (FACE_MIN_WIDTH + uniform(rng, FACE_WIDTH_JITTER));
        let rh = h * (FACE_MIN_HEIGHT + uniform(rng, FACE_HEIGHT_JITTER));
        let region = clamp_to_image(x, y, rw, rh, width, height, Category::Face);
        summary.record(region.category);
        regions.push(region);
    }

    let text_count: usize = rng.random_range(0..=4);
    for _ in 0..text_count {
        let x = uniform(rng, w * TEXT_X_SPAN);
        let y = uniform(rng, h * TEXT_Y_SPAN);
        let rw = w * (TEXT_MIN_WIDTH + uniform(rng, TEXT_WIDTH_JITTER));
        let rh = h * (TEXT_MIN_HEIGHT + uniform(rng, TEXT_HEIGHT_JITTER));

        let t = uniform(rng, 1.0);
        let category = if t < TEXT_REGION_CUTOFF {
            Category::TextRegion
        } else if t < ID_NUMBER_CUTOFF {
            Category::IdNumber
        } else {
            Category::Address
        };

        let region = clamp_to_image(x, y, rw, rh, width, height, category);
        summary.record(region.category);
        regions.push(region);
    }

    debug!(
        width,
        height,
        faces = face_count,
        text = text_count,
        "synthesized candidate regions"
    );

    (regions, summary)
}
