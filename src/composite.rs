//! Scale-aware compositing
//!
//! Places replacement artwork into the template's subject slot without ever
//! shrinking it. When the replacement is larger than the template's subject,
//! the whole canvas grows by the same factor instead. Badges keep their pixel
//! size and stay anchored to the bottom of the canvas.
//!
//! Layout is computed once per call by [`plan_layout`]; [`composite_frames`]
//! then builds every output frame on a fresh transparent canvas.

use image::{Rgba, RgbaImage};
use serde::Serialize;

use crate::classify::Classification;
use crate::error::{CompositeError, Result};
use crate::frames::{
    normalize_durations, Disposal, Frame, FrameSet, DEFAULT_FRAME_DURATION_MS,
};
use crate::geometry::{scale_truncate, BBox};
use crate::resample::crop;
use crate::thresholds::Thresholds;

/// Largest canvas side the GIF container can describe.
pub const MAX_CANVAS_SIDE: u32 = u16::MAX as u32;

/// Pixel budget for one output canvas (256 MiB of RGBA per frame).
pub const MAX_CANVAS_PIXELS: u64 = 1 << 26;

/// Geometry used for one composition, returned to callers as metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositionGeometry {
    /// Main subject bbox in the template, before scaling
    pub main_bbox: BBox,
    /// Canvas growth factor, never below 1.0
    pub scale_factor: f64,
    /// Output canvas `(width, height)` after scaling and badge shift
    pub canvas_size: (u32, u32),
    /// Badge placements in the output canvas, at original pixel size
    pub badge_bboxes: Vec<BBox>,
    /// Horizontal shift applied to badges in output pixels
    pub badge_shift: u32,
}

/// A badge's source rectangle in the template and its output placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgePlacement {
    pub source: BBox,
    pub target: BBox,
}

/// Full layout plan for compositing one replacement into one template.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub geometry: CompositionGeometry,
    /// Main subject bbox after scaling
    pub scaled_main_bbox: BBox,
    /// Union content bbox of the replacement frames
    pub replacement_bbox: BBox,
    pub badges: Vec<BadgePlacement>,
}

/// Compute canvas size and placements.
///
/// # Errors
///
/// * [`CompositeError::NoSubject`] if the classification has no main region
/// * [`CompositeError::InvalidDimensions`] if a box or the canvas is empty, or
///   the canvas exceeds [`MAX_CANVAS_SIDE`] or [`MAX_CANVAS_PIXELS`]
pub fn plan_layout(
    template_size: (u32, u32),
    classification: &Classification,
    replacement_bbox: BBox,
    thresholds: &Thresholds,
) -> Result<Layout> {
    let main = classification.main.ok_or(CompositeError::NoSubject)?;
    let main_bbox = main.bbox;

    let (main_w, main_h) = main_bbox.size();
    if main_w == 0 || main_h == 0 {
        return Err(CompositeError::invalid_dimensions(main_w, main_h));
    }
    let (rep_w, rep_h) = replacement_bbox.size();
    if rep_w == 0 || rep_h == 0 {
        return Err(CompositeError::invalid_dimensions(rep_w, rep_h));
    }

    let scale_factor = 1.0_f64
        .max(rep_w as f64 / main_w as f64)
        .max(rep_h as f64 / main_h as f64);

    let (template_w, template_h) = template_size;
    let scaled_w = scale_truncate(template_w, scale_factor);
    let scaled_h = scale_truncate(template_h, scale_factor);
    let scaled_main_bbox = main_bbox.scaled(scale_factor);

    // Push badges right when they sit closer than the gap to the subject
    let nearest_badge_left = classification
        .badges
        .iter()
        .map(|b| b.bbox.left)
        .min()
        .unwrap_or(template_w);
    let current_gap = nearest_badge_left as i64 - main_bbox.right as i64;
    let required_shift = (thresholds.badge_gap as i64 - current_gap).max(0) as u32;
    let badge_shift = scale_truncate(required_shift, scale_factor);

    let canvas_w = scaled_w + badge_shift;
    let canvas_h = scaled_h;
    if canvas_w == 0 || canvas_h == 0 {
        return Err(CompositeError::invalid_dimensions(canvas_w, canvas_h));
    }
    // Checked before any frame is allocated
    if canvas_w > MAX_CANVAS_SIDE
        || canvas_h > MAX_CANVAS_SIDE
        || canvas_w as u64 * canvas_h as u64 > MAX_CANVAS_PIXELS
    {
        tracing::debug!("canvas {}x{} too large at scale {:.2}", canvas_w, canvas_h, scale_factor);
        return Err(CompositeError::invalid_dimensions(canvas_w, canvas_h));
    }

    let badges: Vec<BadgePlacement> = classification
        .badges
        .iter()
        .map(|badge| {
            let source = badge.bbox;
            let left = scale_truncate(source.left, scale_factor) + badge_shift;
            // Keep the original distance from the canvas bottom
            let distance_from_bottom = template_h.saturating_sub(source.bottom);
            let top = canvas_h.saturating_sub(distance_from_bottom + source.height());
            BadgePlacement {
                source,
                target: BBox::from_origin_size(left, top, source.width(), source.height()),
            }
        })
        .collect();

    let geometry = CompositionGeometry {
        main_bbox,
        scale_factor,
        canvas_size: (canvas_w, canvas_h),
        badge_bboxes: badges.iter().map(|b| b.target).collect(),
        badge_shift,
    };

    tracing::debug!(
        "layout: scale={:.2} canvas={}x{} main={} scaled_main={} shift={}",
        scale_factor,
        canvas_w,
        canvas_h,
        main_bbox,
        scaled_main_bbox,
        badge_shift
    );

    Ok(Layout { geometry, scaled_main_bbox, replacement_bbox, badges })
}

/// Composite every replacement frame according to `layout`.
///
/// Each output frame is a fresh transparent canvas with the cropped
/// replacement pasted centered on the scaled subject slot and bottom-aligned
/// to it, followed by the unscaled badges cut from `template`. Output frames
/// keep the replacement's timing and loop count and always use
/// [`Disposal::RestoreBackground`].
pub fn composite_frames(
    template: &RgbaImage,
    replacement: &FrameSet,
    layout: &Layout,
) -> Result<FrameSet> {
    let (canvas_w, canvas_h) = layout.geometry.canvas_size;
    let badge_layers: Vec<(RgbaImage, BBox)> =
        layout.badges.iter().map(|b| (crop(template, b.source), b.target)).collect();

    let slot = layout.scaled_main_bbox;
    let durations =
        normalize_durations(&replacement.durations(), replacement.len(), DEFAULT_FRAME_DURATION_MS);

    let frames = replacement
        .frames()
        .iter()
        .zip(durations)
        .map(|(frame, duration)| {
            let content = crop(frame.image(), layout.replacement_bbox);
            let (content_w, content_h) = content.dimensions();

            let center_x = slot.left as i64 + slot.width() as i64 / 2;
            let paste_x = clamp_offset(center_x - content_w as i64 / 2, canvas_w, content_w);
            let paste_y = clamp_offset(slot.bottom as i64 - content_h as i64, canvas_h, content_h);

            let mut canvas = RgbaImage::new(canvas_w, canvas_h);
            blit_over(&mut canvas, &content, paste_x, paste_y);
            for (badge, target) in &badge_layers {
                blit_over(&mut canvas, badge, target.left, target.top);
            }

            Frame::new(canvas, duration, Disposal::RestoreBackground)
        })
        .collect();

    FrameSet::new(frames, replacement.loop_count())
}

/// Keep a paste of `size` pixels inside `0..limit`.
fn clamp_offset(offset: i64, limit: u32, size: u32) -> u32 {
    offset.min(limit as i64 - size as i64).max(0) as u32
}

/// Draw `sprite` onto `canvas` at `(x, y)` with source-over alpha blending.
/// Pixels falling outside the canvas are clipped.
pub(crate) fn blit_over(canvas: &mut RgbaImage, sprite: &RgbaImage, x: u32, y: u32) {
    let canvas_width = canvas.width();
    let canvas_height = canvas.height();

    for (sy, row) in sprite.rows().enumerate() {
        let dest_y = y + sy as u32;
        if dest_y >= canvas_height {
            break;
        }

        for (sx, src) in row.enumerate() {
            let dest_x = x + sx as u32;
            if dest_x >= canvas_width {
                break;
            }
            if src[3] == 0 {
                continue;
            }

            let dst = canvas.get_pixel(dest_x, dest_y);
            let blended = source_over(src, dst);
            canvas.put_pixel(dest_x, dest_y, blended);
        }
    }
}

fn source_over(src: &Rgba<u8>, dst: &Rgba<u8>) -> Rgba<u8> {
    if src[3] == 255 || dst[3] == 0 {
        return *src;
    }

    let src_alpha = src[3] as f32 / 255.0;
    let dst_alpha = dst[3] as f32 / 255.0;
    let out_alpha = src_alpha + dst_alpha * (1.0 - src_alpha);

    // out = (src * src_a + dst * dst_a * (1 - src_a)) / out_a
    let channel = |s: u8, d: u8| -> u8 {
        let s = s as f32 / 255.0;
        let d = d as f32 / 255.0;
        let result = (s * src_alpha + d * dst_alpha * (1.0 - src_alpha)) / out_alpha;
        (result.clamp(0.0, 1.0) * 255.0).round() as u8
    };

    Rgba([
        channel(src[0], dst[0]),
        channel(src[1], dst[1]),
        channel(src[2], dst[2]),
        (out_alpha * 255.0).round() as u8,
    ])
}
