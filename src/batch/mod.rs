//! Batch compositing of template/replacement directories
//!
//! Templates are paired with the replacement of the same file name and
//! composited in parallel on a rayon pool. One failing pair never stops the
//! others unless fail-fast is enabled.
//!
//! # Example
//!
//! ```ignore
//! use spriteswap::batch::{find_pairs, BatchRunner};
//!
//! let pairs = find_pairs(Path::new("templates"), Path::new("sprites"), None)?;
//! let result = BatchRunner::new("out", Thresholds::default()).with_jobs(4).run(&pairs)?;
//! result.write_summary(Path::new("out/bounding_boxes.json"))?;
//! ```

pub mod result;

pub use result::*;

use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use thiserror::Error;

use crate::composite::CompositionGeometry;
use crate::config::SwapConfig;
use crate::error::CompositeError;
use crate::output::{generate_output_path, write_bytes, OutputError};
use crate::pipeline::composite_with;
use crate::thresholds::Thresholds;

/// Directory-level batch failure. Per-pair failures end up in [`PairResult`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BatchError {
    #[error("Directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),
    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Output(#[from] OutputError),
    #[error(transparent)]
    Composite(#[from] CompositeError),
    #[error("Failed to write summary: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// A template and the replacement sharing its file name, if there is one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpritePair {
    /// Template file name
    pub name: String,
    pub template: PathBuf,
    pub replacement: Option<PathBuf>,
}

/// List the files in `template_dir`, sorted by name, and pair each with the
/// same-named file in `replacement_dir`.
///
/// `limit` keeps only the first N templates.
pub fn find_pairs(
    template_dir: &Path,
    replacement_dir: &Path,
    limit: Option<usize>,
) -> Result<Vec<SpritePair>, BatchError> {
    for dir in [template_dir, replacement_dir] {
        if !dir.is_dir() {
            return Err(BatchError::MissingDirectory(dir.to_path_buf()));
        }
    }

    let pattern = format!("{}/*", glob::Pattern::escape(&template_dir.to_string_lossy()));
    let mut templates = Vec::new();
    for entry in glob::glob(&pattern)? {
        match entry {
            Ok(path) if path.is_file() => templates.push(path),
            Ok(_) => {}
            Err(e) => tracing::warn!("error reading path: {}", e),
        }
    }
    templates.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    if let Some(limit) = limit {
        templates.truncate(limit);
    }

    let pairs = templates
        .into_iter()
        .filter_map(|template| {
            let name = template.file_name()?.to_string_lossy().into_owned();
            let candidate = replacement_dir.join(&name);
            let replacement = candidate.is_file().then_some(candidate);
            Some(SpritePair { name, template, replacement })
        })
        .collect();

    Ok(pairs)
}

/// Parallel batch executor.
pub struct BatchRunner {
    output_dir: PathBuf,
    thresholds: Thresholds,
    /// Worker threads, `None` for rayon's default
    jobs: Option<usize>,
    fail_fast: bool,
}

impl BatchRunner {
    pub fn new(output_dir: impl Into<PathBuf>, thresholds: Thresholds) -> Self {
        Self { output_dir: output_dir.into(), thresholds, jobs: None, fail_fast: false }
    }

    /// Runner for the `[batch]` and `[thresholds]` sections of a config.
    pub fn from_config(config: &SwapConfig) -> Self {
        let mut runner = Self::new(&config.batch.output_dir, config.thresholds.clone());
        runner.jobs = config.batch.jobs;
        runner
    }

    /// Set the number of parallel jobs (at least 1).
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs.max(1));
        self
    }

    /// Skip the remaining pairs after the first failure.
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn jobs(&self) -> Option<usize> {
        self.jobs
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Composite every pair. Results come back in the order of `pairs`.
    pub fn run(&self, pairs: &[SpritePair]) -> Result<BatchResult, BatchError> {
        let start = Instant::now();
        fs::create_dir_all(&self.output_dir)?;

        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(n) = self.jobs {
            builder = builder.num_threads(n);
        }
        let pool = builder.build()?;

        tracing::info!(
            "compositing {} pairs on {} threads",
            pairs.len(),
            pool.current_num_threads()
        );

        let cancelled = AtomicBool::new(false);
        let results: Vec<PairResult> = pool.install(|| {
            pairs
                .par_iter()
                .map(|pair| {
                    if self.fail_fast && cancelled.load(Ordering::Relaxed) {
                        return PairResult::skipped(
                            pair.name.clone(),
                            "cancelled after an earlier failure",
                        );
                    }
                    let result = self.process_pair(pair);
                    if self.fail_fast && result.status.is_failure() {
                        cancelled.store(true, Ordering::Relaxed);
                    }
                    result
                })
                .collect()
        });

        let mut batch = BatchResult::new();
        for result in results {
            batch.add_result(result);
        }
        tracing::info!("completed batch ({} successful)", batch.success_count());

        Ok(batch.with_duration(start.elapsed()))
    }

    fn process_pair(&self, pair: &SpritePair) -> PairResult {
        let Some(replacement) = &pair.replacement else {
            tracing::warn!("{}: no replacement with the same name, skipping", pair.name);
            return PairResult::skipped(pair.name.clone(), "no replacement with the same name");
        };

        let start = Instant::now();
        let output_path = generate_output_path(&pair.template, &self.output_dir);
        match self.composite_pair(&pair.template, replacement, &output_path) {
            Ok(geometry) => {
                tracing::info!(
                    "{}: scale={:.2}x bbox={} shift={} -> {}",
                    pair.name,
                    geometry.scale_factor,
                    geometry.main_bbox,
                    geometry.badge_shift,
                    output_path.display()
                );
                PairResult::success(pair.name.clone(), output_path, geometry, start.elapsed())
            }
            Err(e) => {
                tracing::error!("{}: failed to process pair: {}", pair.name, e);
                PairResult::failed(pair.name.clone(), e.to_string(), start.elapsed())
            }
        }
    }

    fn composite_pair(
        &self,
        template: &Path,
        replacement: &Path,
        output_path: &Path,
    ) -> Result<CompositionGeometry, BatchError> {
        let template_bytes = fs::read(template)?;
        let replacement_bytes = fs::read(replacement)?;
        let result = composite_with(&template_bytes, &replacement_bytes, &self.thresholds)?;
        write_bytes(&result.output_bytes, output_path)?;
        Ok(result.geometry)
    }
}
