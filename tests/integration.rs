use image::{Rgba, RgbaImage};
use pii_mask::pixelate::block_size;
use pii_mask::{
    synthesize, Category, Codec, DetectionSummary, Error, ImageCodec, MaskOptions, MaskingEngine,
    MaskingStyle, Region, RegionDetector, RegionSynthesizer,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Detector returning a fixed list of regions.
struct Fixed(Vec<Region>);

impl RegionDetector for Fixed {
    fn detect(&mut self, _: u32, _: u32) -> (Vec<Region>, DetectionSummary) {
        (self.0.clone(), DetectionSummary::from_regions(&self.0))
    }
}

#[allow(clippy::cast_possible_truncation)]
fn pattern(w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_fn(w, h, |x, y| {
        Rgba([(x * 13 % 256) as u8, (y * 7 % 256) as u8, ((x ^ y) % 256) as u8, 255])
    })
}

#[test]
fn black_bar_on_white_face_region() {
    let mut img = RgbaImage::from_pixel(100, 100, WHITE);
    let face = Region::new(10, 10, 20, 20, Category::Face);
    MaskingEngine::new()
        .mask_all(&mut img, &[face], MaskingStyle::BlackBar)
        .unwrap();

    let mut label_pixels = 0;
    for (x, y, px) in img.enumerate_pixels() {
        if face.contains(x, y) {
            if *px == WHITE {
                label_pixels += 1;
            } else {
                for ch in 0..3 {
                    assert!(px[ch] <= 25, "({x},{y}) not near-black: {px:?}");
                }
            }
        } else {
            assert_eq!(*px, WHITE, "({x},{y}) outside region changed");
        }
    }
    assert!(label_pixels > 0, "label should be visible");
    assert!(label_pixels < 20 * 20 / 2);
}

#[test]
fn pixelate_twenty_pixel_face_region() {
    let face = Region::new(10, 10, 20, 20, Category::Face);
    assert_eq!(block_size(&face), 8);

    let original = pattern(100, 100);
    let mut img = original.clone();
    MaskingEngine::new()
        .mask_all(&mut img, &[face], MaskingStyle::Pixelate)
        .unwrap();

    for oy in [10u32, 18, 26] {
        for ox in [10u32, 18, 26] {
            let s = original.get_pixel(ox, oy);
            let expected = Rgba([s[0], s[1], s[2], 255]);
            for y in oy..(oy + 8).min(30) {
                for x in ox..(ox + 8).min(30) {
                    assert_eq!(*img.get_pixel(x, y), expected, "block ({ox},{oy}) at ({x},{y})");
                }
            }
        }
    }
    for (x, y, px) in img.enumerate_pixels() {
        if !face.contains(x, y) {
            assert_eq!(px, original.get_pixel(x, y));
        }
    }
}

#[test]
fn blur_keeps_dimensions_and_outside_pixels() {
    let original = pattern(80, 60);
    let mut img = original.clone();
    let region = Region::new(20, 15, 30, 25, Category::TextRegion);
    MaskingEngine::new()
        .mask_all(&mut img, &[region], MaskingStyle::Blur)
        .unwrap();

    assert_eq!(img.dimensions(), original.dimensions());
    for (x, y, px) in img.enumerate_pixels() {
        if !region.contains(x, y) {
            assert_eq!(px, original.get_pixel(x, y));
        }
    }
}

#[test]
fn synthesize_on_empty_image_is_empty() {
    let (regions, summary) = synthesize(0, 0, &mut StdRng::seed_from_u64(0));
    assert!(regions.is_empty());
    assert_eq!(summary, DetectionSummary::default());
}

#[test]
fn png_round_trip_is_pixel_identical() {
    let codec = ImageCodec::default();
    let img = pattern(33, 21);
    let decoded = codec.decode(&codec.encode(&img).unwrap()).unwrap();
    assert_eq!(decoded, img);
}

#[test]
fn seeded_pipeline_is_reproducible() {
    let engine = MaskingEngine::new();
    let bytes = ImageCodec::default().encode(&pattern(120, 90)).unwrap();

    let run = |seed| {
        let mut detector = RegionSynthesizer::new(StdRng::seed_from_u64(seed));
        engine
            .process(&bytes, MaskingStyle::Pixelate, &mut detector)
            .unwrap()
    };
    let a = run(77);
    let b = run(77);
    assert_eq!(a.image, b.image);
    assert_eq!(a.data, b.data);
    assert_eq!(a.summary, b.summary);
    assert!((1..=3).contains(&a.summary.faces));
    assert_ne!(a.image, pattern(120, 90));
}

#[test]
fn pipeline_summary_matches_synthesized_regions() {
    let engine = MaskingEngine::new();
    let bytes = ImageCodec::default().encode(&pattern(64, 64)).unwrap();
    let (regions, expected) = synthesize(64, 64, &mut StdRng::seed_from_u64(3));

    let mut detector = RegionSynthesizer::new(StdRng::seed_from_u64(3));
    let result = engine
        .process(&bytes, MaskingStyle::BlackBar, &mut detector)
        .unwrap();
    assert_eq!(result.summary, expected);
    assert_eq!(result.summary.total(), regions.len());
}

#[test]
fn corrupt_input_is_a_decode_error() {
    let engine = MaskingEngine::new();
    let mut detector = Fixed(Vec::new());
    let err = engine
        .process(b"\x89PNG\r\n\x1a\ntruncated", MaskingStyle::Blur, &mut detector)
        .unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
}

#[test]
fn out_of_bounds_region_is_rejected_for_every_style() {
    let engine = MaskingEngine::new();
    let bad = Region::new(90, 90, 20, 20, Category::Face);
    for style in [MaskingStyle::BlackBar, MaskingStyle::Blur, MaskingStyle::Pixelate] {
        let mut img = RgbaImage::from_pixel(100, 100, WHITE);
        let err = engine.mask_all(&mut img, &[bad], style).unwrap_err();
        assert!(matches!(err, Error::InvalidRegion { .. }));
        assert!(img.pixels().all(|px| *px == WHITE));
    }
}

#[test]
fn process_file_writes_masked_output() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    let input = dir.join("in.png");
    let output = dir.join("out").join("in_masked.png");
    pattern(50, 40).save(&input).unwrap();

    let opts = MaskOptions {
        style: MaskingStyle::Blur,
        blur_radius: 3,
        seed: Some(12),
        ..MaskOptions::default()
    };
    let engine = MaskingEngine::with_options(&opts).unwrap();
    let result = engine.process_file(&input, &output, &opts);
    assert!(result.success, "{}", result.message);
    assert!(result.detected_pii.faces >= 1);

    let written = image::open(&output).unwrap().to_rgba8();
    assert_eq!(written.dimensions(), (50, 40));

    let missing = engine.process_file(&dir.join("nope.png"), &output, &opts);
    assert!(!missing.success);

    let batch = engine.process_directory(dir, &dir.join("batch"), &opts);
    assert_eq!(batch.len(), 1);
    assert!(batch[0].success);
    assert!(dir.join("batch").join("in.png").exists());
}
