//! Configuration schema types for `spriteswap.toml`
//!
//! ```toml
//! [thresholds]
//! min_pixels = 80
//! badge_gap = 6
//!
//! [batch]
//! template_dir = "templates"
//! replacement_dir = "sprites"
//! output_dir = "out"
//! summary = "out/bboxes.json"
//! log_file = "out/process.log"
//! jobs = 4
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::thresholds::Thresholds;

/// Batch run settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchConfig {
    /// Directory holding template animations
    #[serde(default = "default_template_dir")]
    pub template_dir: PathBuf,
    /// Directory holding replacement sprites, matched to templates by file name
    #[serde(default = "default_replacement_dir")]
    pub replacement_dir: PathBuf,
    /// Directory composited GIFs are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Where to write the JSON geometry summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<PathBuf>,
    /// Worker threads (defaults to the number of CPUs)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,
    /// Process at most this many templates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Also write the run's log here, replacing any previous run's log
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            template_dir: default_template_dir(),
            replacement_dir: default_replacement_dir(),
            output_dir: default_output_dir(),
            summary: None,
            jobs: None,
            limit: None,
            log_file: None,
        }
    }
}

fn default_template_dir() -> PathBuf {
    PathBuf::from("templates")
}

fn default_replacement_dir() -> PathBuf {
    PathBuf::from("replacements")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

/// Complete `spriteswap.toml` configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SwapConfig {
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub batch: BatchConfig,
}

impl SwapConfig {
    /// Validate the configuration and return every problem found
    pub fn validate(&self) -> Vec<String> {
        let mut errors = self.thresholds.validate();

        if self.batch.jobs == Some(0) {
            errors.push("batch.jobs must be a positive integer".to_string());
        }
        if self.batch.limit == Some(0) {
            errors.push("batch.limit must be a positive integer".to_string());
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}
