//! Resampling filter policy and resize helpers
//!
//! Every resize in the crate goes through [`choose_filter`]: exact integer
//! upscales use nearest-neighbor so pixel art stays crisp, everything else
//! (fractional scales, downscales) uses Lanczos.

use image::imageops::{self, FilterType};
use image::RgbaImage;
use serde::Serialize;

use crate::error::{CompositeError, Result};
use crate::frames::{content_bbox, union_content_bbox};
use crate::geometry::BBox;

/// Interpolation used for a resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResampleFilter {
    NearestNeighbor,
    Lanczos,
}

impl ResampleFilter {
    pub fn filter_type(self) -> FilterType {
        match self {
            ResampleFilter::NearestNeighbor => FilterType::Nearest,
            ResampleFilter::Lanczos => FilterType::Lanczos3,
        }
    }
}

/// Pick a filter for resizing `source` to `target` (both `(width, height)`).
///
/// Nearest-neighbor only when both axes scale by a whole number ≥ 1.
pub fn choose_filter(source: (u32, u32), target: (u32, u32)) -> ResampleFilter {
    let integer_upscale = |src: u32, dst: u32| src > 0 && dst >= src && dst % src == 0;

    if integer_upscale(source.0, target.0) && integer_upscale(source.1, target.1) {
        ResampleFilter::NearestNeighbor
    } else {
        ResampleFilter::Lanczos
    }
}

/// Resize `image` to exactly `size` using the filter picked by [`choose_filter`].
pub fn resize_exact(image: &RgbaImage, size: (u32, u32)) -> Result<RgbaImage> {
    check_size(size)?;
    if image.dimensions() == size {
        return Ok(image.clone());
    }
    let filter = choose_filter(image.dimensions(), size);
    Ok(imageops::resize(image, size.0, size.1, filter.filter_type()))
}

/// Crop `image` to its visible content, then resize it to `size`.
pub fn resize_image(image: &RgbaImage, size: (u32, u32)) -> Result<RgbaImage> {
    check_size(size)?;
    let cropped = match content_bbox(image) {
        Some(bbox) => crop(image, bbox),
        None => image.clone(),
    };
    resize_exact(&cropped, size)
}

/// Resize an animation to `size`, cropping every frame to the union content
/// bbox first so the subject stays aligned across frames.
pub fn resize_frames(images: &[RgbaImage], size: (u32, u32)) -> Result<Vec<RgbaImage>> {
    check_size(size)?;
    let bbox = union_content_bbox(images);

    images
        .iter()
        .map(|image| match bbox {
            Some(bbox) => resize_exact(&crop(image, bbox), size),
            None => resize_exact(image, size),
        })
        .collect()
}

/// Crop an animation to its union content bbox and shrink it, keeping the
/// aspect ratio, until it fits within `max_size`. Never upscales.
///
/// Fully transparent input is returned unchanged.
pub fn fit_frames(images: &[RgbaImage], max_size: (u32, u32)) -> Result<Vec<RgbaImage>> {
    check_size(max_size)?;
    let Some(bbox) = union_content_bbox(images) else {
        return Ok(images.to_vec());
    };

    let (w, h) = bbox.size();
    let scale = (max_size.0 as f64 / w as f64).min(max_size.1 as f64 / h as f64).min(1.0);
    let target = (
        ((w as f64 * scale).round() as u32).max(1),
        ((h as f64 * scale).round() as u32).max(1),
    );

    images.iter().map(|image| resize_exact(&crop(image, bbox), target)).collect()
}

/// Copy the pixels inside `bbox` into a new image. No resampling.
pub fn crop(image: &RgbaImage, bbox: BBox) -> RgbaImage {
    imageops::crop_imm(image, bbox.left, bbox.top, bbox.width(), bbox.height()).to_image()
}

fn check_size(size: (u32, u32)) -> Result<()> {
    if size.0 == 0 || size.1 == 0 {
        return Err(CompositeError::invalid_dimensions(size.0, size.1));
    }
    Ok(())
}
