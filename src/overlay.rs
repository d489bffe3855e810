//! Translucent black bar with a centered `MASKED` label.
//!
//! The bar composites black at 90% strength over the region. Label
//! placement follows a fixed rule: horizontally centered, baseline at 60%
//! of the region height, font size `max(12, 0.4 * height)`. Drawing the
//! glyphs is delegated to a [`LabelRenderer`].

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use tracing::debug;

use crate::error::Result;
use crate::region::Region;

/// Text stamped on every bar.
pub const LABEL: &str = "MASKED";

/// Strength of the black fill.
pub const OVERLAY_OPACITY: f32 = 0.9;

/// Smallest label font size in pixels.
pub const MIN_FONT_SIZE: f32 = 12.0;

const FONT_SIZE_RATIO: f32 = 0.4;
const BASELINE_RATIO: f32 = 0.6;

/// Where and how large to draw the label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelPlacement {
    /// Horizontal center of the text.
    pub center_x: f32,
    /// Baseline (bottom of capitals).
    pub baseline_y: f32,
    /// Font size in pixels.
    pub font_size: f32,
}

impl LabelPlacement {
    /// Placement of the label inside `region`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn for_region(region: &Region) -> Self {
        let (x, y) = (region.x as f32, region.y as f32);
        let (w, h) = (region.width as f32, region.height as f32);
        Self {
            center_x: x + w / 2.0,
            baseline_y: y + h * BASELINE_RATIO,
            font_size: (h * FONT_SIZE_RATIO).max(MIN_FONT_SIZE),
        }
    }
}

/// Rasterizes label text into an image.
pub trait LabelRenderer {
    /// Draw `text` at `placement`, touching only pixels inside `clip`.
    fn render(
        &self,
        image: &mut RgbaImage,
        text: &str,
        placement: &LabelPlacement,
        clip: &Region,
    );
}

/// Built-in 5x7 bitmap font covering the letters of [`LABEL`].
///
/// Each glyph cell becomes a `scale` x `scale` square, where `scale` is the
/// cap height (70% of the font size) divided by the 7 glyph rows.
#[derive(Debug, Clone, Copy)]
pub struct BitmapLabel {
    color: Rgba<u8>,
}

const GLYPH_WIDTH: i64 = 5;
const GLYPH_HEIGHT: i64 = 7;
const GLYPH_ADVANCE: i64 = GLYPH_WIDTH + 1;
const CAP_HEIGHT_RATIO: f32 = 0.7;

/// Rows of a glyph, most significant of the low 5 bits is the leftmost column.
fn glyph(c: char) -> Option<[u8; 7]> {
    let rows = match c.to_ascii_uppercase() {
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'D' => [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        _ => return None,
    };
    Some(rows)
}

impl BitmapLabel {
    /// Renderer drawing in `color`.
    #[must_use]
    pub fn new(color: Rgba<u8>) -> Self {
        Self { color }
    }

    /// Pixel size of one glyph cell for a font size.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn scale(font_size: f32) -> i64 {
        ((font_size * CAP_HEIGHT_RATIO / 7.0).round() as i64).max(1)
    }
}

impl Default for BitmapLabel {
    fn default() -> Self {
        Self::new(Rgba([255, 255, 255, 255]))
    }
}

impl LabelRenderer for BitmapLabel {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    fn render(
        &self,
        image: &mut RgbaImage,
        text: &str,
        placement: &LabelPlacement,
        clip: &Region,
    ) {
        let scale = Self::scale(placement.font_size);
        let chars = text.chars().count() as i64;
        if chars == 0 {
            return;
        }
        let text_width = chars * GLYPH_ADVANCE * scale - scale;
        let left = (placement.center_x - (text_width as f32) / 2.0).round() as i64;
        let top = placement.baseline_y.round() as i64 - GLYPH_HEIGHT * scale;

        let (clip_x0, clip_y0) = (i64::from(clip.x), i64::from(clip.y));
        let (clip_x1, clip_y1) = (i64::from(clip.right()), i64::from(clip.bottom()));

        for (i, c) in text.chars().enumerate() {
            let Some(rows) = glyph(c) else { continue };
            let origin_x = left + i as i64 * GLYPH_ADVANCE * scale;

            for (row, &bits) in rows.iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if (bits >> (GLYPH_WIDTH - 1 - col)) & 1 == 0 {
                        continue;
                    }
                    let x0 = (origin_x + col * scale).max(clip_x0);
                    let y0 = (top + row as i64 * scale).max(clip_y0);
                    let x1 = (origin_x + (col + 1) * scale).min(clip_x1);
                    let y1 = (top + (row as i64 + 1) * scale).min(clip_y1);
                    if x0 >= x1 || y0 >= y1 {
                        continue;
                    }
                    let rect = Rect::at(x0 as i32, y0 as i32)
                        .of_size((x1 - x0) as u32, (y1 - y0) as u32);
                    draw_filled_rect_mut(image, rect, self.color);
                }
            }
        }
    }
}

/// Darken `region` to a near-black bar and stamp [`LABEL`] on it.
///
/// # Errors
///
/// Returns [`Error::InvalidRegion`](crate::Error::InvalidRegion) if the
/// region does not fit the image.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn apply(image: &mut RgbaImage, region: &Region, renderer: &dyn LabelRenderer) -> Result<()> {
    region.ensure_within(image)?;

    let keep = 1.0 - OVERLAY_OPACITY;
    for y in region.y..region.bottom() {
        for x in region.x..region.right() {
            let px = image.get_pixel_mut(x, y);
            for ch in 0..3 {
                px[ch] = (f32::from(px[ch]) * keep) as u8;
            }
            let alpha = OVERLAY_OPACITY * 255.0 + f32::from(px[3]) * keep;
            px[3] = alpha.round().clamp(0.0, 255.0) as u8;
        }
    }

    let placement = LabelPlacement::for_region(region);
    renderer.render(image, LABEL, &placement, region);

    debug!(
        x = region.x,
        y = region.y,
        width = region.width,
        height = region.height,
        font_size = placement.font_size,
        "drew redaction bar"
    );

    Ok(())
}
