//! Sensitive regions and the per-category tally reported back to callers.

use image::RgbaImage;
use serde::Serialize;

use crate::error::{Error, Result};

/// What kind of sensitive content a region holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    /// A human face.
    Face,
    /// Free-form text.
    TextRegion,
    /// An identification number (passport, licence, account).
    IdNumber,
    /// A postal address.
    Address,
}

/// An axis-aligned rectangle flagged as containing sensitive content.
///
/// Producers must clamp regions to the image before emitting them; filters
/// still check with [`Region::ensure_within`] before touching pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Region {
    /// Left edge in pixels.
    pub x: u32,
    /// Top edge in pixels.
    pub y: u32,
    /// Width in pixels (> 0).
    pub width: u32,
    /// Height in pixels (> 0).
    pub height: u32,
    /// Kind of content inside the region.
    pub category: Category,
}

impl Region {
    /// Create a region.
    #[must_use]
    pub fn new(x: u32, y: u32, width: u32, height: u32, category: Category) -> Self {
        Self {
            x,
            y,
            width,
            height,
            category,
        }
    }

    /// Exclusive right edge.
    #[must_use]
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge.
    #[must_use]
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Whether `(px, py)` lies inside the region.
    #[must_use]
    pub fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// Check that the region is non-empty and fits inside a `width` x `height` image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegion`] if the region is empty or extends past
    /// the image edges.
    pub fn check_bounds(&self, width: u32, height: u32) -> Result<()> {
        let fits = self.width > 0
            && self.height > 0
            && self.x.checked_add(self.width).is_some_and(|r| r <= width)
            && self.y.checked_add(self.height).is_some_and(|b| b <= height);
        if fits {
            Ok(())
        } else {
            Err(Error::InvalidRegion {
                x: self.x,
                y: self.y,
                width: self.width,
                height: self.height,
                image_width: width,
                image_height: height,
            })
        }
    }

    /// [`Region::check_bounds`] against an image's dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegion`] if the region does not fit `image`.
    pub fn ensure_within(&self, image: &RgbaImage) -> Result<()> {
        self.check_bounds(image.width(), image.height())
    }
}

/// Number of regions found per category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionSummary {
    /// Face regions.
    pub faces: usize,
    /// Generic text regions.
    pub text_regions: usize,
    /// Identification numbers.
    pub id_numbers: usize,
    /// Postal addresses.
    pub addresses: usize,
}

impl DetectionSummary {
    /// Tally a list of regions.
    #[must_use]
    pub fn from_regions(regions: &[Region]) -> Self {
        let mut summary = Self::default();
        for region in regions {
            summary.record(region.category);
        }
        summary
    }

    /// Count one more region of `category`.
    pub fn record(&mut self, category: Category) {
        match category {
            Category::Face => self.faces += 1,
            Category::TextRegion => self.text_regions += 1,
            Category::IdNumber => self.id_numbers += 1,
            Category::Address => self.addresses += 1,
        }
    }

    /// Total number of regions counted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.faces + self.text_regions + self.id_numbers + self.addresses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_bounds_accepts_region_touching_edges() {
        let region = Region::new(80, 40, 20, 10, Category::Face);
        assert!(region.check_bounds(100, 50).is_ok());
    }

    #[test]
    fn check_bounds_rejects_overflowing_and_empty_regions() {
        assert!(Region::new(81, 0, 20, 10, Category::Face)
            .check_bounds(100, 50)
            .is_err());
        assert!(Region::new(0, 45, 10, 6, Category::Address)
            .check_bounds(100, 50)
            .is_err());
        assert!(Region::new(0, 0, 0, 10, Category::TextRegion)
            .check_bounds(100, 50)
            .is_err());
        assert!(Region::new(u32::MAX, 0, 2, 2, Category::IdNumber)
            .check_bounds(100, 50)
            .is_err());
    }

    #[test]
    fn contains_uses_exclusive_far_edges() {
        let region = Region::new(10, 10, 20, 20, Category::Face);
        assert!(region.contains(10, 10));
        assert!(region.contains(29, 29));
        assert!(!region.contains(30, 29));
        assert!(!region.contains(9, 15));
    }

    #[test]
    fn summary_counts_each_category_once() {
        let regions = [
            Region::new(0, 0, 1, 1, Category::Face),
            Region::new(0, 0, 1, 1, Category::Face),
            Region::new(0, 0, 1, 1, Category::TextRegion),
            Region::new(0, 0, 1, 1, Category::IdNumber),
            Region::new(0, 0, 1, 1, Category::Address),
            Region::new(0, 0, 1, 1, Category::Address),
        ];
        let summary = DetectionSummary::from_regions(&regions);
        assert_eq!(summary.faces, 2);
        assert_eq!(summary.text_regions, 1);
        assert_eq!(summary.id_numbers, 1);
        assert_eq!(summary.addresses, 2);
        assert_eq!(summary.total(), regions.len());
    }

    #[test]
    fn summary_serializes_with_camel_case_keys() {
        let summary = DetectionSummary {
            faces: 1,
            text_regions: 2,
            id_numbers: 3,
            addresses: 4,
        };
        let json = serde_json::to_string(&summary).unwrap();
        assert_eq!(
            json,
            r#"{"faces":1,"textRegions":2,"idNumbers":3,"addresses":4}"#
        );
    }
}
