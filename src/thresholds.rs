//! Tunable thresholds for region extraction, classification and layout

use serde::{Deserialize, Serialize};

use crate::regions::DEFAULT_OPACITY_THRESHOLD;

/// Heuristic limits shared by the extractor, classifier and compositor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Thresholds {
    /// Minimum alpha for a pixel to belong to a region
    pub opacity: u8,
    /// Minimum pixel count for a region to be the main subject or a badge
    pub min_pixels: u32,
    /// Largest badge size as a fraction of the main subject's pixel count
    pub badge_max_ratio: f64,
    /// Largest badge size in pixels
    pub badge_max_pixels: u32,
    /// Largest fraction of a badge's bbox that may overlap the main bbox
    pub badge_max_overlap: f64,
    /// Template-space gap kept between the main subject and the badges
    pub badge_gap: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            opacity: DEFAULT_OPACITY_THRESHOLD,
            min_pixels: 100,
            badge_max_ratio: 0.40,
            badge_max_pixels: 2000,
            badge_max_overlap: 0.50,
            badge_gap: 8,
        }
    }
}

impl Thresholds {
    /// Check value ranges, returning one message per violation.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.opacity == 0 {
            errors.push("thresholds.opacity must be between 1 and 255".to_string());
        }
        for (name, value) in
            [("badge_max_ratio", self.badge_max_ratio), ("badge_max_overlap", self.badge_max_overlap)]
        {
            if !(value > 0.0 && value <= 1.0) {
                errors.push(format!("thresholds.{} must be in (0, 1], got {}", name, value));
            }
        }

        errors
    }
}
