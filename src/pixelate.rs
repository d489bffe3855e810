//! Block pixelation.
//!
//! Each block takes the color of its top-left pixel (corner sampling, not
//! averaging). Edge blocks are clipped to the region.

use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::error::Result;
use crate::region::Region;

/// Smallest block edge in pixels.
pub const MIN_BLOCK_SIZE: u32 = 8;

/// Block edge for a region: a tenth of its shorter side, at least [`MIN_BLOCK_SIZE`].
#[must_use]
pub fn block_size(region: &Region) -> u32 {
    (region.width.min(region.height) / 10).max(MIN_BLOCK_SIZE)
}

/// Pixelate `region` of `image` in place. Output alpha is fully opaque.
///
/// # Errors
///
/// Returns [`Error::InvalidRegion`](crate::Error::InvalidRegion) if the
/// region does not fit the image.
pub fn apply(image: &mut RgbaImage, region: &Region) -> Result<()> {
    region.ensure_within(image)?;

    let block = block_size(region);

    for by in (region.y..region.bottom()).step_by(block as usize) {
        for bx in (region.x..region.right()).step_by(block as usize) {
            let sample = *image.get_pixel(bx, by);
            let fill = Rgba([sample[0], sample[1], sample[2], u8::MAX]);

            let x_end = (bx + block).min(region.right());
            let y_end = (by + block).min(region.bottom());
            for y in by..y_end {
                for x in bx..x_end {
                    image.put_pixel(x, y, fill);
                }
            }
        }
    }

    debug!(
        x = region.x,
        y = region.y,
        width = region.width,
        height = region.height,
        block,
        "pixelated region"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::Category;

    #[allow(clippy::cast_possible_truncation)]
    fn noise_image(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| {
            let v = x.wrapping_mul(2_654_435_761).wrapping_add(y.wrapping_mul(40_503));
            Rgba([(v >> 3) as u8, (v >> 11) as u8, (v >> 19) as u8, 128])
        })
    }

    #[test]
    fn block_size_uses_region_not_image() {
        assert_eq!(block_size(&Region::new(0, 0, 20, 20, Category::Face)), 8);
        assert_eq!(block_size(&Region::new(0, 0, 300, 120, Category::Face)), 12);
        assert_eq!(block_size(&Region::new(0, 0, 1000, 5, Category::Address)), 8);
    }

    #[test]
    fn every_block_matches_its_top_left_sample() {
        let original = noise_image(64, 64);
        let mut img = original.clone();
        let region = Region::new(3, 5, 50, 37, Category::Face);
        apply(&mut img, &region).unwrap();

        let block = block_size(&region);
        for (x, y, px) in img.enumerate_pixels() {
            if !region.contains(x, y) {
                assert_eq!(px, original.get_pixel(x, y));
                continue;
            }
            let bx = region.x + (x - region.x) / block * block;
            let by = region.y + (y - region.y) / block * block;
            let s = original.get_pixel(bx, by);
            assert_eq!(*px, Rgba([s[0], s[1], s[2], 255]), "pixel ({x},{y})");
        }
    }

    #[test]
    fn twenty_pixel_region_splits_into_clipped_blocks() {
        let original = noise_image(100, 100);
        let mut img = original.clone();
        let region = Region::new(10, 10, 20, 20, Category::Face);
        apply(&mut img, &region).unwrap();

        // Origins at 10, 18, 26; the last block is 4 pixels wide.
        for (ox, oy) in [(10, 10), (18, 10), (26, 26), (10, 26)] {
            let s = original.get_pixel(ox, oy);
            let expected = Rgba([s[0], s[1], s[2], 255]);
            let w = if ox == 26 { 4 } else { 8 };
            let h = if oy == 26 { 4 } else { 8 };
            for y in oy..oy + h {
                for x in ox..ox + w {
                    assert_eq!(*img.get_pixel(x, y), expected);
                }
            }
        }
        assert_eq!(img.get_pixel(30, 30), original.get_pixel(30, 30));
    }

    #[test]
    fn rejects_out_of_bounds_region() {
        let mut img = RgbaImage::new(16, 16);
        assert!(apply(&mut img, &Region::new(10, 0, 8, 8, Category::Face)).is_err());
    }
}
