//! End-to-end compositing of one (template, replacement) pair
//!
//! The pipeline is a stateless function of its inputs: decode the template,
//! find its subject and badges in frame 0, decode the replacement, lay out
//! the grown canvas, composite every replacement frame and encode the result.
//! All buffers are owned by the call; nothing is cached between calls.

use image::RgbaImage;
use serde::Serialize;

use crate::classify::{classify_regions, Classification};
use crate::composite::{composite_frames, plan_layout, CompositionGeometry};
use crate::encode::encode_composition;
use crate::error::{CompositeError, Result};
use crate::frames::{load_frames, FrameSet};
use crate::regions::{extract_regions, Region};
use crate::thresholds::Thresholds;

/// Output of a successful composition.
#[derive(Debug, Clone)]
pub struct CompositionResult {
    /// Composited frames, in order
    pub frames: FrameSet,
    /// Encoded animated GIF
    pub output_bytes: Vec<u8>,
    pub geometry: CompositionGeometry,
}

/// Regions found in a template frame and how they were classified.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateAnalysis {
    pub regions: Vec<Region>,
    pub classification: Classification,
}

/// Composite `replacement_bytes` into the template using default thresholds.
pub fn composite(template_bytes: &[u8], replacement_bytes: &[u8]) -> Result<CompositionResult> {
    composite_with(template_bytes, replacement_bytes, &Thresholds::default())
}

/// Composite with explicit thresholds.
///
/// # Errors
///
/// * [`CompositeError::Decode`] if either input is unreadable
/// * [`CompositeError::NoSubject`] if the template has no opaque region
/// * [`CompositeError::EmptyReplacement`] if the replacement is fully transparent
/// * [`CompositeError::InvalidDimensions`] / [`CompositeError::Encode`] from layout and encoding
pub fn composite_with(
    template_bytes: &[u8],
    replacement_bytes: &[u8],
    thresholds: &Thresholds,
) -> Result<CompositionResult> {
    let template = load_frames(template_bytes)?;
    let analysis = analyze_template(template.first().image(), thresholds);
    if analysis.classification.main.is_none() {
        return Err(CompositeError::NoSubject);
    }

    let replacement = load_frames(replacement_bytes)?;
    composite_analyzed(template.first().image(), &analysis.classification, &replacement, thresholds)
}

/// Composite already-decoded frame sets.
///
/// Callers batching many replacements against one template can decode the
/// template once and reuse it here.
pub fn composite_decoded(
    template: &FrameSet,
    replacement: &FrameSet,
    thresholds: &Thresholds,
) -> Result<CompositionResult> {
    let base = template.first().image();
    let analysis = analyze_template(base, thresholds);
    composite_analyzed(base, &analysis.classification, replacement, thresholds)
}

/// Extract and classify the regions of one template frame.
pub fn analyze_template(frame: &RgbaImage, thresholds: &Thresholds) -> TemplateAnalysis {
    let regions = extract_regions(frame, thresholds.opacity);
    let classification = classify_regions(&regions, thresholds);
    tracing::debug!(
        "template: {} regions, main={:?}, {} badges",
        regions.len(),
        classification.main.map(|m| m.bbox),
        classification.badges.len()
    );
    TemplateAnalysis { regions, classification }
}

fn composite_analyzed(
    base: &RgbaImage,
    classification: &Classification,
    replacement: &FrameSet,
    thresholds: &Thresholds,
) -> Result<CompositionResult> {
    let replacement_bbox = replacement.content_bbox().ok_or(CompositeError::EmptyReplacement)?;
    let layout = plan_layout(base.dimensions(), classification, replacement_bbox, thresholds)?;
    let frames = composite_frames(base, replacement, &layout)?;

    tracing::info!(
        "composited {} frames (scale={:.2}x, main={}, shift={}, canvas={}x{})",
        frames.len(),
        layout.geometry.scale_factor,
        layout.geometry.main_bbox,
        layout.geometry.badge_shift,
        layout.geometry.canvas_size.0,
        layout.geometry.canvas_size.1
    );

    encode_composition(frames, layout.geometry)
}
