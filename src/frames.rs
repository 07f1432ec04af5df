//! Frame loading and normalization
//!
//! Decodes a possibly-animated raster image into an ordered [`FrameSet`] of
//! full-canvas RGBA frames, each carrying its display duration and disposal
//! method. GIF input is decoded frame by frame with disposal applied onto a
//! running canvas, so partial GIF frames come out as complete images. APNG and
//! animated WebP go through `image`'s animation decoders and every other format
//! decodes as a single still frame.

use std::io::Cursor;

use image::codecs::png::PngDecoder;
use image::codecs::webp::WebPDecoder;
use image::{AnimationDecoder, ImageFormat, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::{CompositeError, Result};
use crate::geometry::BBox;

/// Display time used when neither the frame nor the container declares one.
pub const DEFAULT_FRAME_DURATION_MS: u32 = 100;

/// Loop count meaning "repeat forever" (NETSCAPE convention).
pub const LOOP_FOREVER: u16 = 0;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// How a frame's area is cleared before the next frame is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposal {
    /// No disposal declared
    Unspecified,
    /// Leave the frame in place
    Keep,
    /// Clear the frame area to transparent
    #[default]
    RestoreBackground,
    /// Restore the canvas to its state before the frame
    RestorePrevious,
}

impl Disposal {
    /// GIF disposal code (0-3).
    pub fn code(self) -> u8 {
        match self {
            Disposal::Unspecified => 0,
            Disposal::Keep => 1,
            Disposal::RestoreBackground => 2,
            Disposal::RestorePrevious => 3,
        }
    }

    fn from_gif(method: gif::DisposalMethod) -> Self {
        match method {
            gif::DisposalMethod::Any => Disposal::Unspecified,
            gif::DisposalMethod::Keep => Disposal::Keep,
            gif::DisposalMethod::Background => Disposal::RestoreBackground,
            gif::DisposalMethod::Previous => Disposal::RestorePrevious,
        }
    }

    pub(crate) fn to_gif(self) -> gif::DisposalMethod {
        match self {
            Disposal::Unspecified => gif::DisposalMethod::Any,
            Disposal::Keep => gif::DisposalMethod::Keep,
            Disposal::RestoreBackground => gif::DisposalMethod::Background,
            Disposal::RestorePrevious => gif::DisposalMethod::Previous,
        }
    }
}

/// One full-canvas animation frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    image: RgbaImage,
    duration_ms: u32,
    disposal: Disposal,
}

impl Frame {
    pub fn new(image: RgbaImage, duration_ms: u32, disposal: Disposal) -> Self {
        Self { image, duration_ms, disposal }
    }

    /// A still frame with default timing.
    pub fn still(image: RgbaImage) -> Self {
        Self::new(image, DEFAULT_FRAME_DURATION_MS, Disposal::default())
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    pub fn disposal(&self) -> Disposal {
        self.disposal
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Bounds of the non-transparent pixels in this frame.
    pub fn content_bbox(&self) -> Option<BBox> {
        content_bbox(&self.image)
    }
}

/// Ordered, non-empty sequence of frames sharing one loop count.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSet {
    frames: Vec<Frame>,
    loop_count: u16,
}

impl FrameSet {
    /// Build a frame set. Fails when `frames` is empty.
    pub fn new(frames: Vec<Frame>, loop_count: u16) -> Result<Self> {
        if frames.is_empty() {
            return Err(CompositeError::Decode("image contains no frames".to_string()));
        }
        Ok(Self { frames, loop_count })
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }

    /// First frame; always present.
    pub fn first(&self) -> &Frame {
        &self.frames[0]
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// A frame set holds at least one frame, so this is never true.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn loop_count(&self) -> u16 {
        self.loop_count
    }

    pub fn durations(&self) -> Vec<u32> {
        self.frames.iter().map(Frame::duration_ms).collect()
    }

    pub fn images(&self) -> impl Iterator<Item = &RgbaImage> {
        self.frames.iter().map(Frame::image)
    }

    /// Dimensions of the first frame.
    pub fn canvas_size(&self) -> (u32, u32) {
        self.first().dimensions()
    }

    /// Union of every frame's content bounds.
    pub fn content_bbox(&self) -> Option<BBox> {
        union_content_bbox(self.images())
    }
}

/// Decode image bytes into a [`FrameSet`].
///
/// Durations fall back to the container default (the first frame's delay) and
/// then to [`DEFAULT_FRAME_DURATION_MS`]; disposal falls back the same way and
/// then to [`Disposal::RestoreBackground`].
///
/// # Errors
///
/// [`CompositeError::Decode`] when the bytes are not a supported raster format.
pub fn load_frames(bytes: &[u8]) -> Result<FrameSet> {
    let format = image::guess_format(bytes)?;
    match format {
        ImageFormat::Gif => decode_gif(bytes),
        ImageFormat::Png => decode_png(bytes),
        ImageFormat::WebP => decode_webp(bytes),
        _ => {
            let image = image::load_from_memory_with_format(bytes, format)?.to_rgba8();
            FrameSet::new(vec![Frame::still(image)], LOOP_FOREVER)
        }
    }
}

fn decode_gif(bytes: &[u8]) -> Result<FrameSet> {
    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::RGBA);
    let mut decoder = options.read_info(Cursor::new(bytes))?;

    let width = decoder.width() as u32;
    let height = decoder.height() as u32;
    if width == 0 || height == 0 {
        return Err(CompositeError::Decode(format!("GIF has empty canvas {}x{}", width, height)));
    }

    // Running canvas; GIF frames may cover only part of it
    let mut canvas = RgbaImage::from_pixel(width, height, TRANSPARENT);
    let mut decoded: Vec<(RgbaImage, u32, Disposal)> = Vec::new();

    while let Some(frame) = decoder.read_next_frame()? {
        let area = BBox::from_origin_size(
            frame.left as u32,
            frame.top as u32,
            frame.width as u32,
            frame.height as u32,
        );
        let saved = (frame.dispose == gif::DisposalMethod::Previous).then(|| canvas.clone());

        paint_rgba(&mut canvas, &frame.buffer, area);
        decoded.push((canvas.clone(), frame.delay as u32 * 10, Disposal::from_gif(frame.dispose)));

        match frame.dispose {
            gif::DisposalMethod::Background => clear_area(&mut canvas, area),
            gif::DisposalMethod::Previous => {
                if let Some(previous) = saved {
                    canvas = previous;
                }
            }
            _ => {}
        }
    }

    let loop_count = match decoder.repeat() {
        gif::Repeat::Infinite => LOOP_FOREVER,
        gif::Repeat::Finite(n) => n,
    };

    if decoded.is_empty() {
        tracing::debug!("GIF has no frame data, using blank {}x{} canvas", width, height);
        return FrameSet::new(vec![Frame::still(canvas)], loop_count);
    }

    let default_duration = decoded
        .first()
        .map(|(_, ms, _)| *ms)
        .filter(|ms| *ms > 0)
        .unwrap_or(DEFAULT_FRAME_DURATION_MS);
    let default_disposal = decoded
        .first()
        .map(|(_, _, d)| *d)
        .filter(|d| *d != Disposal::Unspecified)
        .unwrap_or_default();

    let frames = decoded
        .into_iter()
        .map(|(image, ms, disposal)| {
            let duration = if ms > 0 { ms } else { default_duration };
            let disposal = if disposal == Disposal::Unspecified { default_disposal } else { disposal };
            Frame::new(image, duration, disposal)
        })
        .collect();

    FrameSet::new(frames, loop_count)
}

fn decode_png(bytes: &[u8]) -> Result<FrameSet> {
    let decoder = PngDecoder::new(Cursor::new(bytes))?;
    if !decoder.is_apng() {
        let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)?.to_rgba8();
        return FrameSet::new(vec![Frame::still(image)], LOOP_FOREVER);
    }

    let loop_count = apng_play_count(bytes)?;
    let frames = collect_animation(decoder.apng())?;
    FrameSet::new(frames, loop_count)
}

/// Play count from the APNG `acTL` chunk; 0 means forever, as in GIF.
fn apng_play_count(bytes: &[u8]) -> Result<u16> {
    let reader = png::Decoder::new(Cursor::new(bytes))
        .read_info()
        .map_err(|e| CompositeError::Decode(e.to_string()))?;
    let plays = reader.info().animation_control.as_ref().map_or(0, |actl| actl.num_plays);
    Ok(u16::try_from(plays).unwrap_or(u16::MAX))
}

fn decode_webp(bytes: &[u8]) -> Result<FrameSet> {
    let decoder = WebPDecoder::new(Cursor::new(bytes))?;
    if !decoder.has_animation() {
        let image = image::load_from_memory_with_format(bytes, ImageFormat::WebP)?.to_rgba8();
        return FrameSet::new(vec![Frame::still(image)], LOOP_FOREVER);
    }

    let loop_count = webp_loop_count(bytes);
    let frames = collect_animation(decoder)?;
    FrameSet::new(frames, loop_count)
}

/// Loop count from the WebP `ANIM` chunk, or forever when it is missing.
fn webp_loop_count(bytes: &[u8]) -> u16 {
    // RIFF header, then fourcc + little-endian size chunks padded to even length
    let mut pos = 12usize;
    while let Some(header) = bytes.get(pos..pos + 8) {
        let size = u32::from_le_bytes([header[4], header[5], header[6], header[7]]) as usize;
        if &header[..4] == b"ANIM" {
            // 4 bytes of background colour precede the loop count
            return bytes
                .get(pos + 12..pos + 14)
                .map_or(LOOP_FOREVER, |n| u16::from_le_bytes([n[0], n[1]]));
        }
        pos = pos.saturating_add(8).saturating_add(size).saturating_add(size & 1);
    }
    LOOP_FOREVER
}

/// Decode every frame of an `image` animation into full-canvas frames.
fn collect_animation<'a>(decoder: impl AnimationDecoder<'a>) -> Result<Vec<Frame>> {
    let frames = decoder
        .into_frames()
        .collect_frames()?
        .into_iter()
        .map(|frame| {
            let (numer, denom) = frame.delay().numer_denom_ms();
            let ms = if denom == 0 { 0 } else { numer / denom };
            let duration = if ms > 0 { ms } else { DEFAULT_FRAME_DURATION_MS };
            Frame::new(frame.into_buffer(), duration, Disposal::default())
        })
        .collect();
    Ok(frames)
}

/// Copy the visible pixels of a decoded RGBA sub-frame onto the canvas.
fn paint_rgba(canvas: &mut RgbaImage, buffer: &[u8], area: BBox) {
    let (width, height) = canvas.dimensions();
    let frame_w = area.width() as usize;

    for (i, px) in buffer.chunks_exact(4).enumerate() {
        if px[3] == 0 {
            continue;
        }
        let x = area.left + (i % frame_w) as u32;
        let y = area.top + (i / frame_w) as u32;
        if x < width && y < height {
            canvas.put_pixel(x, y, Rgba([px[0], px[1], px[2], px[3]]));
        }
    }
}

fn clear_area(canvas: &mut RgbaImage, area: BBox) {
    let right = area.right.min(canvas.width());
    let bottom = area.bottom.min(canvas.height());
    for y in area.top..bottom {
        for x in area.left..right {
            canvas.put_pixel(x, y, TRANSPARENT);
        }
    }
}

/// Bounds of all pixels with non-zero alpha, or `None` if fully transparent.
pub fn content_bbox(image: &RgbaImage) -> Option<BBox> {
    let mut bounds: Option<BBox> = None;
    for (y, row) in image.rows().enumerate() {
        let mut first = None;
        let mut last = 0;
        for (x, pixel) in row.enumerate() {
            if pixel[3] > 0 {
                first.get_or_insert(x as u32);
                last = x as u32;
            }
        }
        if let Some(first) = first {
            let row_box = BBox::new(first, y as u32, last + 1, y as u32 + 1);
            bounds = Some(match bounds {
                Some(b) => b.union(&row_box),
                None => row_box,
            });
        }
    }
    bounds
}

/// Smallest box enclosing every non-transparent pixel across all images.
///
/// Animated subjects move between frames, so the envelope has to cover the
/// whole animation rather than frame 0 alone.
pub fn union_content_bbox<'a>(images: impl IntoIterator<Item = &'a RgbaImage>) -> Option<BBox> {
    images
        .into_iter()
        .filter_map(content_bbox)
        .reduce(|acc, b| acc.union(&b))
}

/// Fit a duration list to `frame_count` entries.
///
/// Zero entries take `fallback`, missing entries repeat the last known
/// duration and extra entries are dropped.
pub fn normalize_durations(durations: &[u32], frame_count: usize, fallback: u32) -> Vec<u32> {
    if frame_count == 0 {
        return Vec::new();
    }

    let mut normalized: Vec<u32> = if durations.is_empty() {
        vec![fallback; frame_count]
    } else {
        durations.iter().map(|&d| if d == 0 { fallback } else { d }).collect()
    };

    if normalized.len() < frame_count {
        let last = normalized.last().copied().unwrap_or(fallback);
        normalized.resize(frame_count, last);
    } else {
        normalized.truncate(frame_count);
    }

    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Encode a palette GIF with explicit per-frame placement, delay and disposal.
    fn gif_bytes(
        size: (u16, u16),
        frames: &[(BBox, u16, gif::DisposalMethod)],
        repeat: Option<gif::Repeat>,
    ) -> Vec<u8> {
        // index 0 transparent, 1 red
        let palette = [0u8, 0, 0, 255, 0, 0];
        let mut buf = Vec::new();
        {
            let mut encoder = gif::Encoder::new(&mut buf, size.0, size.1, &palette).unwrap();
            if let Some(repeat) = repeat {
                encoder.set_repeat(repeat).unwrap();
            }
            for (area, delay, dispose) in frames {
                let pixels = vec![1u8; area.area() as usize];
                let mut frame = gif::Frame::from_palette_pixels(
                    area.width() as u16,
                    area.height() as u16,
                    pixels.as_slice(),
                    palette.as_slice(),
                    Some(0),
                );
                frame.left = area.left as u16;
                frame.top = area.top as u16;
                frame.delay = *delay;
                frame.dispose = *dispose;
                encoder.write_frame(&frame).unwrap();
            }
        }
        buf
    }

    fn png_bytes(image: &RgbaImage) -> Vec<u8> {
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(image.clone())
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    fn apng_bytes(frames: &[RgbaImage], delay_ms: u16, plays: u32) -> Vec<u8> {
        let (width, height) = frames[0].dimensions();
        let mut buf = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut buf, width, height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            encoder.set_animated(frames.len() as u32, plays).unwrap();
            let mut writer = encoder.write_header().unwrap();
            for frame in frames {
                writer.set_frame_delay(delay_ms, 1000).unwrap();
                writer.write_image_data(frame.as_raw()).unwrap();
            }
            writer.finish().unwrap();
        }
        buf
    }

    fn webp_still_bytes(image: &RgbaImage) -> Vec<u8> {
        let mut buf = Vec::new();
        image::codecs::webp::WebPEncoder::new_lossless(&mut buf)
            .encode(image.as_raw(), image.width(), image.height(), image::ColorType::Rgba8)
            .unwrap();
        buf
    }

    fn riff_chunk(fourcc: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut chunk = fourcc.to_vec();
        chunk.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        chunk.extend_from_slice(payload);
        if payload.len() % 2 == 1 {
            chunk.push(0);
        }
        chunk
    }

    fn u24(value: u32) -> [u8; 3] {
        let b = value.to_le_bytes();
        [b[0], b[1], b[2]]
    }

    /// Assemble an animated WebP from lossless still encodes of each frame.
    fn animated_webp_bytes(frames: &[RgbaImage], duration_ms: u32, loops: u16) -> Vec<u8> {
        let (width, height) = frames[0].dimensions();

        let mut vp8x = vec![0x10 | 0x02, 0, 0, 0];
        vp8x.extend_from_slice(&u24(width - 1));
        vp8x.extend_from_slice(&u24(height - 1));

        let mut anim = vec![0u8; 4];
        anim.extend_from_slice(&loops.to_le_bytes());

        let mut body = b"WEBP".to_vec();
        body.extend(riff_chunk(b"VP8X", &vp8x));
        body.extend(riff_chunk(b"ANIM", &anim));

        for frame in frames {
            let still = webp_still_bytes(frame);
            // Pull the VP8L chunk (header included) out of the still file
            let mut pos = 12;
            let vp8l = loop {
                let size = u32::from_le_bytes(still[pos + 4..pos + 8].try_into().unwrap()) as usize;
                let end = pos + 8 + size + (size & 1);
                if &still[pos..pos + 4] == b"VP8L" {
                    break still[pos..end].to_vec();
                }
                pos = end;
            };

            let mut anmf = Vec::new();
            anmf.extend_from_slice(&u24(0));
            anmf.extend_from_slice(&u24(0));
            anmf.extend_from_slice(&u24(width - 1));
            anmf.extend_from_slice(&u24(height - 1));
            anmf.extend_from_slice(&u24(duration_ms));
            // no blending, no disposal
            anmf.push(0x02);
            anmf.extend(vp8l);
            body.extend(riff_chunk(b"ANMF", &anmf));
        }

        let mut out = b"RIFF".to_vec();
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        out.extend(body);
        out
    }

    #[test]
    fn test_webp_loop_count_without_anim_chunk() {
        assert_eq!(webp_loop_count(&webp_still_bytes(&RgbaImage::new(2, 2))), LOOP_FOREVER);
        assert_eq!(webp_loop_count(b"RIFF\x04\x00\x00\x00WEBP"), LOOP_FOREVER);
    }

    #[test]
    fn test_load_still_png() {
        let mut img = RgbaImage::new(8, 6);
        img.put_pixel(2, 3, Rgba([10, 20, 30, 255]));
        let set = load_frames(&png_bytes(&img)).unwrap();

        assert_eq!(set.len(), 1);
        assert_eq!(set.canvas_size(), (8, 6));
        assert_eq!(set.first().duration_ms(), DEFAULT_FRAME_DURATION_MS);
        assert_eq!(set.first().disposal(), Disposal::RestoreBackground);
        assert_eq!(set.content_bbox(), Some(BBox::new(2, 3, 3, 4)));
    }

    #[test]
    fn test_load_rejects_garbage() {
        let err = load_frames(b"definitely not an image").unwrap_err();
        assert!(matches!(err, CompositeError::Decode(_)));
    }

    #[test]
    fn test_load_gif_durations_and_disposal() {
        let bytes = gif_bytes(
            (10, 10),
            &[
                (BBox::new(0, 0, 4, 4), 5, gif::DisposalMethod::Keep),
                (BBox::new(4, 4, 8, 8), 0, gif::DisposalMethod::Any),
                (BBox::new(6, 6, 10, 10), 20, gif::DisposalMethod::Background),
            ],
            Some(gif::Repeat::Finite(3)),
        );
        let set = load_frames(&bytes).unwrap();

        assert_eq!(set.len(), 3);
        // zero delay falls back to the first frame's delay
        assert_eq!(set.durations(), vec![50, 50, 200]);
        // unspecified disposal falls back to the first frame's disposal
        let disposals: Vec<_> = set.frames().iter().map(Frame::disposal).collect();
        assert_eq!(disposals, vec![Disposal::Keep, Disposal::Keep, Disposal::RestoreBackground]);
        assert_eq!(set.loop_count(), 3);
    }

    #[test]
    fn test_load_gif_composites_partial_frames() {
        let bytes = gif_bytes(
            (10, 10),
            &[
                (BBox::new(0, 0, 4, 4), 10, gif::DisposalMethod::Keep),
                (BBox::new(4, 4, 8, 8), 10, gif::DisposalMethod::Background),
                (BBox::new(8, 8, 10, 10), 10, gif::DisposalMethod::Keep),
            ],
            None,
        );
        let set = load_frames(&bytes).unwrap();

        // Frame 1 keeps frame 0's pixels underneath
        assert_eq!(set.frames()[1].content_bbox(), Some(BBox::new(0, 0, 8, 8)));
        // Frame 1 was cleared before frame 2 was drawn
        assert_eq!(set.frames()[2].image().get_pixel(5, 5)[3], 0);
        assert_eq!(set.frames()[2].image().get_pixel(1, 1)[3], 255);
        assert_eq!(set.loop_count(), LOOP_FOREVER);
    }

    #[test]
    fn test_load_gif_restores_previous_canvas() {
        let bytes = gif_bytes(
            (10, 10),
            &[
                (BBox::new(0, 0, 4, 4), 10, gif::DisposalMethod::Keep),
                (BBox::new(4, 4, 8, 8), 10, gif::DisposalMethod::Previous),
                (BBox::new(8, 8, 10, 10), 10, gif::DisposalMethod::Keep),
            ],
            None,
        );
        let set = load_frames(&bytes).unwrap();

        assert_eq!(set.frames()[1].disposal(), Disposal::RestorePrevious);
        assert_eq!(set.frames()[1].content_bbox(), Some(BBox::new(0, 0, 8, 8)));
        // Frame 1 is undone, frame 0 stays underneath frame 2
        let last = set.frames()[2].image();
        assert_eq!(last.get_pixel(5, 5)[3], 0);
        assert_eq!(last.get_pixel(1, 1)[3], 255);
        assert_eq!(last.get_pixel(9, 9)[3], 255);
    }

    #[test]
    fn test_load_apng_frames_and_play_count() {
        let a = RgbaImage::from_pixel(6, 4, Rgba([255, 0, 0, 255]));
        let mut b = RgbaImage::new(6, 4);
        b.put_pixel(5, 3, Rgba([0, 0, 255, 255]));
        let set = load_frames(&apng_bytes(&[a, b], 200, 3)).unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.canvas_size(), (6, 4));
        assert_eq!(set.durations(), vec![200, 200]);
        assert_eq!(set.loop_count(), 3);
        assert_eq!(set.frames()[1].content_bbox(), Some(BBox::new(5, 3, 6, 4)));
    }

    #[test]
    fn test_load_apng_zero_plays_is_forever() {
        let frames = vec![RgbaImage::from_pixel(2, 2, Rgba([9, 9, 9, 255])); 2];
        let set = load_frames(&apng_bytes(&frames, 50, 0)).unwrap();
        assert_eq!(set.loop_count(), LOOP_FOREVER);
        assert_eq!(set.durations(), vec![50, 50]);
    }

    #[test]
    fn test_load_animated_webp() {
        let a = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]));
        let mut b = RgbaImage::new(4, 4);
        b.put_pixel(0, 0, Rgba([0, 255, 0, 255]));
        let c = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 255]));
        let set = load_frames(&animated_webp_bytes(&[a, b, c], 80, 2)).unwrap();

        assert_eq!(set.len(), 3);
        assert_eq!(set.canvas_size(), (4, 4));
        assert_eq!(set.durations(), vec![80, 80, 80]);
        assert_eq!(set.loop_count(), 2);
        assert_eq!(*set.frames()[2].image().get_pixel(3, 3), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn test_load_still_webp() {
        let img = RgbaImage::from_pixel(3, 5, Rgba([1, 2, 3, 255]));
        let set = load_frames(&webp_still_bytes(&img)).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.canvas_size(), (3, 5));
        assert_eq!(set.loop_count(), LOOP_FOREVER);
    }

    #[test]
    fn test_load_gif_defaults_without_metadata() {
        let bytes = gif_bytes((4, 4), &[(BBox::new(0, 0, 4, 4), 0, gif::DisposalMethod::Any)], None);
        let set = load_frames(&bytes).unwrap();
        assert_eq!(set.first().duration_ms(), DEFAULT_FRAME_DURATION_MS);
        assert_eq!(set.first().disposal(), Disposal::RestoreBackground);
    }

    #[test]
    fn test_content_bbox_transparent_is_none() {
        assert_eq!(content_bbox(&RgbaImage::new(5, 5)), None);
    }

    #[test]
    fn test_union_content_bbox_contains_each_frame() {
        let mut a = RgbaImage::new(20, 20);
        a.put_pixel(2, 15, Rgba([1, 1, 1, 255]));
        let mut b = RgbaImage::new(20, 20);
        b.put_pixel(17, 3, Rgba([1, 1, 1, 40]));
        let c = RgbaImage::new(20, 20);

        let images = [a, b, c];
        let union = union_content_bbox(images.iter()).unwrap();
        assert_eq!(union, BBox::new(2, 3, 18, 16));
        for img in &images {
            if let Some(own) = content_bbox(img) {
                assert!(union.contains(&own));
            }
        }
    }

    #[test]
    fn test_union_content_bbox_all_transparent() {
        let images = [RgbaImage::new(4, 4), RgbaImage::new(4, 4)];
        assert_eq!(union_content_bbox(images.iter()), None);
    }

    #[test]
    fn test_normalize_durations_pads_with_last() {
        assert_eq!(normalize_durations(&[80, 90, 120], 5, 100), vec![80, 90, 120, 120, 120]);
    }

    #[test]
    fn test_normalize_durations_truncates_and_fills_zero() {
        assert_eq!(normalize_durations(&[0, 60, 70, 80], 2, 100), vec![100, 60]);
        assert_eq!(normalize_durations(&[], 3, 100), vec![100, 100, 100]);
        assert!(normalize_durations(&[50], 0, 100).is_empty());
    }

    #[test]
    fn test_frame_set_rejects_empty() {
        assert!(FrameSet::new(Vec::new(), 0).is_err());
    }
}
