//! Gaussian blur restricted to a region.
//!
//! The kernel is the normalized 2-D Gaussian
//! `w(kx, ky) = exp(-((kx - r)^2 + (ky - r)^2) / (2 * sigma^2))` with
//! `sigma = r / 3` over a `(2r + 1)^2` window. Because it factors into the
//! outer product of two normalized 1-D kernels, [`apply`] runs a horizontal
//! and a vertical pass instead of the full 2-D convolution; intermediate sums
//! stay in `f32` so the result matches the direct form within rounding.
//!
//! Neighborhood samples use clamp-to-edge addressing on the whole image, so
//! pixels just outside the region still contribute.

use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::error::{Error, Result};
use crate::region::Region;

/// Radius used when none is configured.
pub const DEFAULT_RADIUS: u32 = 15;

/// Normalized, separable Gaussian kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianKernel {
    radius: u32,
    weights: Vec<f32>,
}

impl GaussianKernel {
    /// Build a kernel of size `2 * radius + 1`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBlurRadius`] if `radius` is 0.
    pub fn new(radius: u32) -> Result<Self> {
        if radius == 0 {
            return Err(Error::InvalidBlurRadius(radius));
        }
        Ok(Self::build(radius))
    }

    fn build(radius: u32) -> Self {
        let r = f64::from(radius);
        let sigma = r / 3.0;
        let denom = 2.0 * sigma * sigma;

        let raw: Vec<f64> = (0..=2 * radius)
            .map(|k| {
                let d = f64::from(k) - r;
                (-(d * d) / denom).exp()
            })
            .collect();
        let sum: f64 = raw.iter().sum();

        #[allow(clippy::cast_possible_truncation)]
        let weights = raw.iter().map(|w| (w / sum) as f32).collect();

        Self { radius, weights }
    }

    /// Kernel radius.
    #[must_use]
    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Side length of the square kernel window.
    #[must_use]
    pub fn size(&self) -> usize {
        self.weights.len()
    }

    /// 1-D weights; each axis of the 2-D kernel uses these.
    #[must_use]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Weight of 2-D cell `(kx, ky)`, both in `0..size()`.
    #[must_use]
    pub fn weight(&self, kx: usize, ky: usize) -> f32 {
        self.weights[kx] * self.weights[ky]
    }
}

impl Default for GaussianKernel {
    fn default() -> Self {
        Self::build(DEFAULT_RADIUS)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_coord(c: i64, len: u32) -> u32 {
    c.clamp(0, i64::from(len) - 1) as u32
}

/// Blur `region` of `image` in place.
///
/// Pixels outside the region are left untouched.
///
/// # Errors
///
/// Returns [`Error::InvalidRegion`] if the region does not fit the image.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]
pub fn apply(image: &mut RgbaImage, region: &Region, kernel: &GaussianKernel) -> Result<()> {
    region.ensure_within(image)?;

    let (img_w, img_h) = image.dimensions();
    let r = i64::from(kernel.radius);
    let weights = kernel.weights();
    let region_w = region.width as usize;

    // Rows the vertical pass can reach, after clamping.
    let row_start = clamp_coord(i64::from(region.y) - r, img_h);
    let row_end = clamp_coord(i64::from(region.bottom() - 1) + r, img_h);

    // Horizontal pass: region columns, every reachable row.
    let mut horizontal = Vec::with_capacity((row_end - row_start + 1) as usize * region_w);
    for sy in row_start..=row_end {
        for x in region.x..region.right() {
            let mut acc = [0.0_f32; 4];
            for (k, w) in weights.iter().enumerate() {
                let sx = clamp_coord(i64::from(x) + k as i64 - r, img_w);
                let px = image.get_pixel(sx, sy);
                for ch in 0..4 {
                    acc[ch] += f32::from(px[ch]) * w;
                }
            }
            horizontal.push(acc);
        }
    }

    // Vertical pass into a separate buffer.
    let mut output = Vec::with_capacity(region_w * region.height as usize);
    for y in region.y..region.bottom() {
        for col in 0..region_w {
            let mut acc = [0.0_f32; 4];
            for (k, w) in weights.iter().enumerate() {
                let sy = clamp_coord(i64::from(y) + k as i64 - r, img_h);
                let row = (sy - row_start) as usize;
                let h = horizontal[row * region_w + col];
                for ch in 0..4 {
                    acc[ch] += h[ch] * w;
                }
            }
            output.push(Rgba(acc.map(|v| v.round().clamp(0.0, 255.0) as u8)));
        }
    }

    // Copy back.
    for (i, px) in output.into_iter().enumerate() {
        let dx = (i % region_w) as u32;
        let dy = (i / region_w) as u32;
        image.put_pixel(region.x + dx, region.y + dy, px);
    }

    debug!(
        x = region.x,
        y = region.y,
        width = region.width,
        height = region.height,
        radius = kernel.radius,
        "blurred region"
    );

    Ok(())
}
