//! Animated GIF encoding

use std::collections::HashMap;

use image::RgbaImage;

use crate::composite::CompositionGeometry;
use crate::error::{CompositeError, Result};
use crate::frames::{normalize_durations, Disposal, FrameSet, DEFAULT_FRAME_DURATION_MS, LOOP_FOREVER};
use crate::pipeline::CompositionResult;

/// Alpha below this becomes the transparent palette entry.
pub const TRANSPARENCY_CUTOFF: u8 = 128;

/// NeuQuant speed for frames that need quantizing (1 = best, 30 = fastest).
const QUANTIZE_SPEED: i32 = 10;

/// Encode frames as an animated GIF.
///
/// `durations` are in milliseconds and are normalized to the frame count
/// first. `loop_count` 0 loops forever. Every frame is written with
/// restore-to-background disposal. Frames using at most 255 distinct colors
/// keep their exact colors; busier frames are quantized.
///
/// # Errors
///
/// [`CompositeError::Encode`] when there are no frames, frame sizes differ,
/// the canvas exceeds GIF limits, or the writer fails.
pub fn encode_gif(images: &[RgbaImage], durations: &[u32], loop_count: u16) -> Result<Vec<u8>> {
    let first = images
        .first()
        .ok_or_else(|| CompositeError::Encode("no frames to encode".to_string()))?;
    let (width, height) = first.dimensions();

    if let Some(other) = images.iter().find(|img| img.dimensions() != (width, height)) {
        return Err(CompositeError::Encode(format!(
            "frame size {}x{} differs from canvas {}x{}",
            other.width(),
            other.height(),
            width,
            height
        )));
    }
    let (Ok(gif_w), Ok(gif_h)) = (u16::try_from(width), u16::try_from(height)) else {
        return Err(CompositeError::Encode(format!(
            "canvas {}x{} exceeds GIF limit of {}",
            width,
            height,
            u16::MAX
        )));
    };

    let durations = normalize_durations(durations, images.len(), DEFAULT_FRAME_DURATION_MS);
    let repeat = if loop_count == LOOP_FOREVER {
        gif::Repeat::Infinite
    } else {
        gif::Repeat::Finite(loop_count)
    };

    let mut buf = Vec::new();
    {
        let mut encoder = gif::Encoder::new(&mut buf, gif_w, gif_h, &[])?;
        encoder.set_repeat(repeat)?;

        for (image, duration_ms) in images.iter().zip(durations) {
            let mut frame = exact_palette_frame(image, gif_w, gif_h)
                .unwrap_or_else(|| quantized_frame(image, gif_w, gif_h));
            // GIF delays are in centiseconds
            frame.delay = (duration_ms / 10).clamp(1, u16::MAX as u32) as u16;
            frame.dispose = Disposal::RestoreBackground.to_gif();
            encoder.write_frame(&frame)?;
        }
    }

    Ok(buf)
}

/// Encode a [`FrameSet`] with its own durations and loop count.
pub fn encode_frame_set(frames: &FrameSet) -> Result<Vec<u8>> {
    let images: Vec<RgbaImage> = frames.images().cloned().collect();
    encode_gif(&images, &frames.durations(), frames.loop_count())
}

/// Serialize composited frames and pair them with the geometry that produced them.
pub fn encode_composition(
    frames: FrameSet,
    geometry: CompositionGeometry,
) -> Result<CompositionResult> {
    let output_bytes = encode_frame_set(&frames)?;
    Ok(CompositionResult { frames, output_bytes, geometry })
}

/// Palette frame with index 0 reserved for transparency, or `None` when the
/// image has more than 255 opaque colors.
fn exact_palette_frame(image: &RgbaImage, width: u16, height: u16) -> Option<gif::Frame<'static>> {
    let mut palette: Vec<[u8; 3]> = vec![[0, 0, 0]];
    let mut lookup: HashMap<[u8; 3], u8> = HashMap::new();
    let mut indices = Vec::with_capacity(image.len() / 4);

    for pixel in image.pixels() {
        if pixel[3] < TRANSPARENCY_CUTOFF {
            indices.push(0);
            continue;
        }
        let rgb = [pixel[0], pixel[1], pixel[2]];
        let index = match lookup.get(&rgb) {
            Some(&index) => index,
            None => {
                if palette.len() == 256 {
                    return None;
                }
                let index = palette.len() as u8;
                palette.push(rgb);
                lookup.insert(rgb, index);
                index
            }
        };
        indices.push(index);
    }

    let flat: Vec<u8> = palette.concat();
    Some(gif::Frame::from_palette_pixels(width, height, indices.as_slice(), flat.as_slice(), Some(0)))
}

fn quantized_frame(image: &RgbaImage, width: u16, height: u16) -> gif::Frame<'static> {
    let mut rgba = image.as_raw().clone();
    for px in rgba.chunks_exact_mut(4) {
        px[3] = if px[3] < TRANSPARENCY_CUTOFF { 0 } else { 255 };
    }
    gif::Frame::from_rgba_speed(width, height, &mut rgba, QUANTIZE_SPEED)
}
