//! Axis-aligned bounding boxes in pixel space

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle `(left, top, right, bottom)`.
///
/// `right` and `bottom` are exclusive, so a box covering the single pixel at
/// `(3, 4)` is `BBox::new(3, 4, 4, 5)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BBox {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl BBox {
    pub fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self { left, top, right, bottom }
    }

    /// Box anchored at `(x, y)` with the given size.
    pub fn from_origin_size(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { left: x, top: y, right: x + width, bottom: y + height }
    }

    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    /// `[left, top, right, bottom]`, the layout used in JSON summaries.
    pub fn to_array(&self) -> [u32; 4] {
        [self.left, self.top, self.right, self.bottom]
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Smallest box containing both `self` and `other`.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    /// Area shared by `self` and `other` (0 when they are disjoint).
    pub fn intersection_area(&self, other: &BBox) -> u64 {
        let overlap_x = self.right.min(other.right).saturating_sub(self.left.max(other.left));
        let overlap_y = self.bottom.min(other.bottom).saturating_sub(self.top.max(other.top));
        overlap_x as u64 * overlap_y as u64
    }

    /// Whether `other` lies entirely inside `self`.
    pub fn contains(&self, other: &BBox) -> bool {
        other.left >= self.left
            && other.top >= self.top
            && other.right <= self.right
            && other.bottom <= self.bottom
    }

    /// Multiply every coordinate by `factor`, truncating toward zero.
    pub fn scaled(&self, factor: f64) -> BBox {
        BBox {
            left: scale_truncate(self.left, factor),
            top: scale_truncate(self.top, factor),
            right: scale_truncate(self.right, factor),
            bottom: scale_truncate(self.bottom, factor),
        }
    }
}

impl std::fmt::Display for BBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {}, {})", self.left, self.top, self.right, self.bottom)
    }
}

/// Scale a pixel coordinate and truncate, matching integer canvas math.
pub fn scale_truncate(value: u32, factor: f64) -> u32 {
    (value as f64 * factor) as u32
}
