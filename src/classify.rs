//! Main-subject and badge classification
//!
//! Picks the largest qualifying region as the main subject and keeps only
//! small, mostly non-overlapping regions as badges. Anything else (large
//! secondary effects, stray specks) is dropped and never rendered.

use serde::Serialize;

use crate::regions::Region;
use crate::thresholds::Thresholds;

/// Partition of a frame's regions into one main subject and its badges.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Classification {
    pub main: Option<Region>,
    /// Ordered top to bottom by `bbox.top`
    pub badges: Vec<Region>,
}

/// Classify `regions` (sorted largest first, as produced by
/// [`extract_regions`](crate::regions::extract_regions)).
///
/// Main is the largest region with at least `min_pixels` pixels, or the
/// largest region overall when none qualify. Badge candidates are the other
/// qualifying regions; each must pass the size-ratio, absolute-size and
/// overlap limits. An empty input yields no main and no badges.
pub fn classify_regions(regions: &[Region], thresholds: &Thresholds) -> Classification {
    let Some(largest) = regions.first() else {
        return Classification::default();
    };

    let qualifying: Vec<&Region> =
        regions.iter().filter(|r| r.pixel_count >= thresholds.min_pixels).collect();

    let Some((&main, candidates)) = qualifying.split_first() else {
        tracing::debug!(
            "no region reaches {} pixels, falling back to largest ({} px)",
            thresholds.min_pixels,
            largest.pixel_count
        );
        return Classification { main: Some(*largest), badges: Vec::new() };
    };

    let mut badges: Vec<Region> =
        candidates.iter().copied().filter(|c| is_badge(c, main, thresholds)).copied().collect();
    badges.sort_by_key(|b| b.bbox.top);

    Classification { main: Some(*main), badges }
}

fn is_badge(candidate: &Region, main: &Region, thresholds: &Thresholds) -> bool {
    let size_ratio = candidate.pixel_count as f64 / main.pixel_count as f64;
    if size_ratio > thresholds.badge_max_ratio {
        return false;
    }

    if candidate.pixel_count > thresholds.badge_max_pixels {
        return false;
    }

    // Mostly inside the main bbox means it is part of the subject
    let overlap = candidate.bbox.intersection_area(&main.bbox) as f64;
    overlap <= candidate.bbox.area() as f64 * thresholds.badge_max_overlap
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BBox;

    fn region(left: u32, top: u32, w: u32, h: u32, count: u32) -> Region {
        Region::new(BBox::from_origin_size(left, top, w, h), count)
    }

    #[test]
    fn test_empty_input() {
        let c = classify_regions(&[], &Thresholds::default());
        assert_eq!(c.main, None);
        assert!(c.badges.is_empty());
    }

    #[test]
    fn test_badge_kept_and_large_secondary_dropped() {
        let main = region(10, 10, 40, 40, 1600);
        let effect = region(60, 10, 30, 30, 900);
        let badge = region(100, 80, 10, 10, 100);

        let c = classify_regions(&[main, effect, badge], &Thresholds::default());
        assert_eq!(c.main, Some(main));
        assert_eq!(c.badges, vec![badge]);
    }

    #[test]
    fn test_absolute_size_cap() {
        let main = region(0, 0, 100, 100, 10_000);
        let big_badge = region(120, 0, 50, 50, 2001);
        let c = classify_regions(&[main, big_badge], &Thresholds::default());
        assert!(c.badges.is_empty());
    }

    #[test]
    fn test_overlapping_region_dropped() {
        let main = region(0, 0, 40, 40, 1600);
        // 10x10 bbox with 60% inside main
        let inside = region(34, 0, 10, 10, 100);
        // 10x10 bbox with exactly 50% inside main
        let edge = region(35, 20, 10, 10, 100);

        let c = classify_regions(&[main, inside, edge], &Thresholds::default());
        assert_eq!(c.badges, vec![edge]);
    }

    #[test]
    fn test_badges_ordered_top_to_bottom() {
        let main = region(0, 0, 40, 40, 1600);
        let lower = region(50, 30, 10, 10, 120);
        let upper = region(50, 5, 10, 10, 110);

        let c = classify_regions(&[main, lower, upper], &Thresholds::default());
        assert_eq!(c.badges, vec![upper, lower]);
    }

    #[test]
    fn test_fallback_to_largest_below_threshold() {
        let a = region(0, 0, 5, 5, 25);
        let b = region(10, 10, 2, 2, 4);

        let c = classify_regions(&[a, b], &Thresholds::default());
        assert_eq!(c.main, Some(a));
        assert!(c.badges.is_empty());
    }

    #[test]
    fn test_specks_below_threshold_are_not_badges() {
        let main = region(0, 0, 40, 40, 1600);
        let speck = region(60, 60, 3, 3, 9);

        let c = classify_regions(&[main, speck], &Thresholds::default());
        assert!(c.badges.is_empty());
    }

    #[test]
    fn test_custom_thresholds() {
        let main = region(0, 0, 40, 40, 1600);
        let medium = region(60, 0, 30, 30, 900);
        let loose = Thresholds { badge_max_ratio: 0.6, ..Default::default() };

        let c = classify_regions(&[main, medium], &loose);
        assert_eq!(c.badges, vec![medium]);
    }
}
