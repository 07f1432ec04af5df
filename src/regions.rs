//! Connected-region extraction from a frame's alpha channel
//!
//! Labels 4-connected groups of opaque pixels. Growth uses an explicit work
//! stack over a flat visited mask, so a fully opaque canvas costs O(W×H) time
//! and never recurses.

use image::RgbaImage;
use serde::Serialize;

use crate::geometry::BBox;

/// Alpha value at or above which a pixel belongs to a region.
pub const DEFAULT_OPACITY_THRESHOLD: u8 = 32;

/// A 4-connected group of pixels with alpha at or above the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Region {
    pub bbox: BBox,
    pub pixel_count: u32,
}

impl Region {
    pub fn new(bbox: BBox, pixel_count: u32) -> Self {
        Self { bbox, pixel_count }
    }
}

/// Find all regions in `image`, largest first.
///
/// Pixels with alpha below `opacity_threshold` are background: they never
/// start or extend a region. Regions with equal pixel counts keep scan order.
pub fn extract_regions(image: &RgbaImage, opacity_threshold: u8) -> Vec<Region> {
    let (width, height) = image.dimensions();
    let w = width as usize;
    let h = height as usize;

    let alpha: Vec<u8> = image.pixels().map(|p| p[3]).collect();
    let mut visited = vec![false; w * h];
    let mut stack: Vec<(usize, usize)> = Vec::new();
    let mut regions = Vec::new();

    for y in 0..h {
        for x in 0..w {
            let index = y * w + x;
            if visited[index] {
                continue;
            }
            visited[index] = true;
            if alpha[index] < opacity_threshold {
                continue;
            }

            let (mut min_x, mut max_x, mut min_y, mut max_y) = (x, x, y, y);
            let mut count: u32 = 0;
            stack.push((x, y));

            while let Some((cx, cy)) = stack.pop() {
                count += 1;
                min_x = min_x.min(cx);
                max_x = max_x.max(cx);
                min_y = min_y.min(cy);
                max_y = max_y.max(cy);

                // Up, down, left, right; diagonals are not connected
                let neighbors = [
                    (cx.wrapping_sub(1), cy),
                    (cx + 1, cy),
                    (cx, cy.wrapping_sub(1)),
                    (cx, cy + 1),
                ];
                for (nx, ny) in neighbors {
                    if nx >= w || ny >= h {
                        continue;
                    }
                    let n = ny * w + nx;
                    if visited[n] {
                        continue;
                    }
                    visited[n] = true;
                    if alpha[n] >= opacity_threshold {
                        stack.push((nx, ny));
                    }
                }
            }

            let bbox = BBox::new(min_x as u32, min_y as u32, max_x as u32 + 1, max_y as u32 + 1);
            regions.push(Region::new(bbox, count));
        }
    }

    regions.sort_by(|a, b| b.pixel_count.cmp(&a.pixel_count));
    regions
}
