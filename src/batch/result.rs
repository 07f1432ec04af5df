//! Batch result types.
//!
//! Per-pair outcomes plus the JSON geometry summary written after a run.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::batch::BatchError;
use crate::composite::CompositionGeometry;
use crate::output::write_bytes;

/// Status of a single template/replacement pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairStatus {
    Success,
    /// Not processed, with the reason
    Skipped(String),
    Failed(String),
}

impl PairStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, PairStatus::Failed(_))
    }
}

impl std::fmt::Display for PairStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PairStatus::Success => write!(f, "success"),
            PairStatus::Skipped(reason) => write!(f, "skipped: {}", reason),
            PairStatus::Failed(err) => write!(f, "failed: {}", err),
        }
    }
}

/// Result of compositing one pair.
#[derive(Debug, Clone)]
pub struct PairResult {
    /// Template file name, also the summary key
    pub name: String,
    pub status: PairStatus,
    pub output_path: Option<PathBuf>,
    pub geometry: Option<CompositionGeometry>,
    pub duration: Duration,
}

impl PairResult {
    pub fn success(
        name: String,
        output_path: PathBuf,
        geometry: CompositionGeometry,
        duration: Duration,
    ) -> Self {
        Self {
            name,
            status: PairStatus::Success,
            output_path: Some(output_path),
            geometry: Some(geometry),
            duration,
        }
    }

    pub fn skipped(name: String, reason: impl Into<String>) -> Self {
        Self {
            name,
            status: PairStatus::Skipped(reason.into()),
            output_path: None,
            geometry: None,
            duration: Duration::ZERO,
        }
    }

    pub fn failed(name: String, error: String, duration: Duration) -> Self {
        Self { name, status: PairStatus::Failed(error), output_path: None, geometry: None, duration }
    }

    pub fn is_success(&self) -> bool {
        self.status == PairStatus::Success
    }
}

/// Summary entry for one successful pair.
///
/// Boxes are `[left, top, right, bottom]` arrays so scale-table tooling can
/// read them without knowing this crate's types.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairSummary {
    pub main_bbox: [u32; 4],
    pub badge_bboxes: Vec<[u32; 4]>,
    pub badge_shift: u32,
    pub scale_factor: f64,
    pub canvas_size: (u32, u32),
    pub output_path: PathBuf,
}

impl PairSummary {
    fn new(geometry: &CompositionGeometry, output_path: &Path) -> Self {
        Self {
            main_bbox: geometry.main_bbox.to_array(),
            badge_bboxes: geometry.badge_bboxes.iter().map(|b| b.to_array()).collect(),
            badge_shift: geometry.badge_shift,
            scale_factor: geometry.scale_factor,
            canvas_size: geometry.canvas_size,
            output_path: output_path.to_path_buf(),
        }
    }
}

/// Result of a complete batch run, in template order.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub pairs: Vec<PairResult>,
    pub total_duration: Duration,
}

impl BatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_result(&mut self, result: PairResult) {
        self.pairs.push(result);
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.total_duration = duration;
        self
    }

    pub fn success_count(&self) -> usize {
        self.pairs.iter().filter(|r| r.is_success()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.pairs.iter().filter(|r| matches!(r.status, PairStatus::Skipped(_))).count()
    }

    pub fn failed_count(&self) -> usize {
        self.pairs.iter().filter(|r| r.status.is_failure()).count()
    }

    /// No pair failed. Skipped pairs do not count as failures.
    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }

    pub fn failures(&self) -> Vec<&PairResult> {
        self.pairs.iter().filter(|r| r.status.is_failure()).collect()
    }

    /// Geometry of every successful pair keyed by template file name.
    pub fn summary(&self) -> BTreeMap<String, PairSummary> {
        self.pairs
            .iter()
            .filter_map(|pair| match (&pair.geometry, &pair.output_path) {
                (Some(geometry), Some(path)) => {
                    Some((pair.name.clone(), PairSummary::new(geometry, path)))
                }
                _ => None,
            })
            .collect()
    }

    /// Write [`summary`](Self::summary) as pretty-printed JSON.
    pub fn write_summary(&self, path: &Path) -> Result<(), BatchError> {
        let json = serde_json::to_string_pretty(&self.summary())?;
        write_bytes(json.as_bytes(), path)?;
        tracing::info!("wrote bounding box summary to {}", path.display());
        Ok(())
    }

    /// Human-readable outcome of the run.
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        let success = self.success_count();
        let skipped = self.skipped_count();
        let failed = self.failed_count();
        let total = self.pairs.len();

        if failed > 0 {
            lines.push(format!(
                "Batch finished with errors: {} composited, {} skipped, {} failed ({} total)",
                success, skipped, failed, total
            ));
            for pair in self.failures() {
                lines.push(format!("  - {}: {}", pair.name, pair.status));
            }
        } else {
            lines.push(format!(
                "Batch succeeded: {} composited, {} skipped ({} total) in {:?}",
                success, skipped, total, self.total_duration
            ));
        }

        lines.join("\n")
    }
}
