//! End-to-end tests for the compositing pipeline
//!
//! Inputs are synthesised in-test as GIF or PNG bytes and run through the
//! public API, then the encoded output is decoded again and checked.

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};
use spriteswap::encode::encode_gif;
use spriteswap::frames::{load_frames, normalize_durations, union_content_bbox};
use spriteswap::regions::extract_regions;
use spriteswap::{composite, composite_with, BBox, CompositeError, Thresholds};

const SUBJECT: Rgba<u8> = Rgba([150, 90, 40, 255]);
const BADGE: Rgba<u8> = Rgba([0, 200, 0, 255]);
const ART: Rgba<u8> = Rgba([30, 30, 220, 255]);

fn fill(img: &mut RgbaImage, bbox: BBox, color: Rgba<u8>) {
    for y in bbox.top..bbox.bottom {
        for x in bbox.left..bbox.right {
            img.put_pixel(x, y, color);
        }
    }
}

/// 64x64 template with a 32x32 subject and one 10x10 badge 4px to its right
fn badge_template() -> Vec<u8> {
    let mut img = RgbaImage::new(64, 64);
    fill(&mut img, BBox::new(8, 8, 40, 40), SUBJECT);
    fill(&mut img, BBox::new(44, 50, 54, 60), BADGE);
    encode_gif(&[img], &[100], 0).unwrap()
}

fn solid_gif(w: u32, h: u32, frames: usize, durations: &[u32]) -> Vec<u8> {
    let images = vec![RgbaImage::from_pixel(w, h, ART); frames];
    encode_gif(&images, durations, 0).unwrap()
}

fn png_bytes(img: &RgbaImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

fn apng_bytes(images: &[RgbaImage], delay_ms: u16, plays: u32) -> Vec<u8> {
    let (width, height) = images[0].dimensions();
    let mut buf = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buf, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_animated(images.len() as u32, plays).unwrap();
        let mut writer = encoder.write_header().unwrap();
        for image in images {
            writer.set_frame_delay(delay_ms, 1000).unwrap();
            writer.write_image_data(image.as_raw()).unwrap();
        }
        writer.finish().unwrap();
    }
    buf
}

#[test]
fn test_scale_factor_from_replacement_size() {
    let mut img = RgbaImage::new(64, 64);
    fill(&mut img, BBox::new(16, 16, 48, 48), SUBJECT);
    let template = encode_gif(&[img], &[100], 0).unwrap();

    let result = composite(&template, &solid_gif(64, 40, 1, &[100])).unwrap();
    let g = &result.geometry;

    assert_eq!(g.main_bbox, BBox::new(16, 16, 48, 48));
    assert_eq!(g.scale_factor, 2.0);
    assert_eq!(g.badge_shift, 0);
    assert_eq!(g.canvas_size, (128, 128));

    let decoded = load_frames(&result.output_bytes).unwrap();
    assert_eq!(decoded.canvas_size(), (128, 128));
    // Replacement sits bottom-aligned in the scaled slot (32..96 on both axes)
    let content = union_content_bbox(decoded.images()).unwrap();
    assert_eq!(content, BBox::new(32, 56, 96, 96));
}

#[test]
fn test_badges_never_scale() {
    let template = badge_template();

    for (size, scale, shift) in [(20u32, 1.0, 4u32), (48, 1.5, 6), (96, 3.0, 12)] {
        let result = composite(&template, &solid_gif(size, size, 2, &[50, 50])).unwrap();
        let g = &result.geometry;

        assert_eq!(g.scale_factor, scale, "replacement {}px", size);
        assert_eq!(g.badge_shift, shift, "replacement {}px", size);
        assert_eq!(g.badge_bboxes.len(), 1);

        let badge = g.badge_bboxes[0];
        assert_eq!(badge.size(), (10, 10), "badge resized at scale {}", scale);
        // Distance to the canvas bottom is kept
        assert_eq!(g.canvas_size.1 - badge.bottom, 4);

        let decoded = load_frames(&result.output_bytes).unwrap();
        for frame in decoded.frames() {
            assert_eq!(*frame.image().get_pixel(badge.left, badge.top), BADGE);
            assert_eq!(*frame.image().get_pixel(badge.right - 1, badge.bottom - 1), BADGE);
        }
    }
}

#[test]
fn test_badge_gap_is_enforced() {
    let result = composite(&badge_template(), &solid_gif(20, 20, 1, &[100])).unwrap();
    let g = &result.geometry;

    // Canvas grows by the shift so the badge still fits
    assert_eq!(g.canvas_size, (68, 64));
    assert_eq!(g.badge_bboxes, vec![BBox::new(48, 50, 58, 60)]);
}

#[test]
fn test_transparent_template_is_no_subject() {
    let template = png_bytes(&RgbaImage::new(48, 48));
    let result = composite(&template, &solid_gif(8, 8, 1, &[100]));
    assert!(matches!(result, Err(CompositeError::NoSubject)));
}

#[test]
fn test_faint_template_below_threshold_is_no_subject() {
    let template = png_bytes(&RgbaImage::from_pixel(16, 16, Rgba([255, 255, 255, 20])));
    let result = composite(&template, &solid_gif(8, 8, 1, &[100]));
    assert!(matches!(result, Err(CompositeError::NoSubject)));
}

#[test]
fn test_transparent_replacement_is_rejected() {
    let replacement = png_bytes(&RgbaImage::new(8, 8));
    let result = composite(&badge_template(), &replacement);
    assert!(matches!(result, Err(CompositeError::EmptyReplacement)));
}

#[test]
fn test_corrupt_input_is_decode_error() {
    let result = composite(b"GIF89a\x00", &solid_gif(8, 8, 1, &[100]));
    assert!(matches!(result, Err(CompositeError::Decode(_))));
}

#[test]
fn test_still_png_replacement_uses_default_duration() {
    let replacement = png_bytes(&RgbaImage::from_pixel(12, 12, ART));
    let result = composite(&badge_template(), &replacement).unwrap();

    assert_eq!(result.frames.len(), 1);
    assert_eq!(result.frames.durations(), vec![100]);
    assert_eq!(load_frames(&result.output_bytes).unwrap().durations(), vec![100]);
}

#[test]
fn test_output_follows_replacement_timing() {
    let template = {
        let mut a = RgbaImage::new(64, 64);
        fill(&mut a, BBox::new(8, 8, 40, 40), SUBJECT);
        let b = a.clone();
        // Template animation length is irrelevant; only frame 0 is analyzed
        encode_gif(&[a, b], &[300, 300], 0).unwrap()
    };
    let replacement = solid_gif(16, 16, 3, &[40, 70, 120]);

    let result = composite(&template, &replacement).unwrap();
    let decoded = load_frames(&result.output_bytes).unwrap();
    assert_eq!(decoded.len(), 3);
    assert_eq!(decoded.durations(), vec![40, 70, 120]);
}

#[test]
fn test_duration_normalization_pads_with_last() {
    let durations = normalize_durations(&[30, 60, 90], 5, 100);
    assert_eq!(durations, vec![30, 60, 90, 90, 90]);
}

#[test]
fn test_single_square_region() {
    let mut img = RgbaImage::new(64, 64);
    fill(&mut img, BBox::new(16, 16, 48, 48), SUBJECT);

    let regions = extract_regions(&img, 32);
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].bbox, BBox::new(16, 16, 48, 48));
    assert_eq!(regions[0].pixel_count, 1024);
}

#[test]
fn test_custom_thresholds_drop_badge() {
    let strict = Thresholds { badge_max_pixels: 50, ..Default::default() };
    let result = composite_with(&badge_template(), &solid_gif(20, 20, 1, &[100]), &strict).unwrap();

    assert!(result.geometry.badge_bboxes.is_empty());
    // No badges: gap is measured to the template edge
    assert_eq!(result.geometry.badge_shift, 0);
    let decoded = load_frames(&result.output_bytes).unwrap();
    assert_eq!(decoded.first().image().get_pixel(48, 55)[3], 0);
}

#[test]
fn test_apng_play_count_reaches_output() {
    let images = vec![RgbaImage::from_pixel(12, 12, ART); 2];
    let result = composite(&badge_template(), &apng_bytes(&images, 200, 3)).unwrap();

    assert_eq!(result.frames.loop_count(), 3);
    let decoded = load_frames(&result.output_bytes).unwrap();
    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded.durations(), vec![200, 200]);
    assert_eq!(decoded.loop_count(), 3);
}

#[test]
fn test_runaway_scale_is_invalid_dimensions() {
    // A lone pixel becomes the subject through the size fallback
    let mut img = RgbaImage::new(400, 400);
    img.put_pixel(10, 10, SUBJECT);
    let result = composite(&png_bytes(&img), &solid_gif(300, 300, 1, &[100]));

    assert!(matches!(
        result,
        Err(CompositeError::InvalidDimensions { width: 120_000, height: 120_000 })
    ));
}
