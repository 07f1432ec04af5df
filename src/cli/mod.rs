//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod batch;
mod composite;
mod inspect;

use clap::{Parser, Subcommand};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;

use crate::config::{find_config, load_config, resolve_path, CliOverrides, ConfigError, SwapConfig};

pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// spriteswap - Replace the subject of animated sprites while keeping their badges
#[derive(Parser)]
#[command(name = "spriteswap")]
#[command(about = "Composite replacement sprites into animated templates, keeping badges intact")]
#[command(version)]
pub struct Cli {
    /// Path to spriteswap.toml (default: search upward from the working directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only show warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Composite one replacement sprite into one template
    Composite {
        /// Template animation (GIF, APNG or still image)
        template: PathBuf,

        /// Replacement sprite or animation
        replacement: PathBuf,

        /// Output GIF file, or a directory (ends with /) to use the template's name
        #[arg(short, long)]
        output: PathBuf,

        /// Also write the first output frame, shrunk to fit --preview-size, as a PNG
        #[arg(long)]
        preview: Option<PathBuf>,

        /// Maximum preview size (e.g., "96x96")
        #[arg(long, default_value = "96x96")]
        preview_size: String,

        /// Print the composition geometry as JSON
        #[arg(long)]
        json: bool,
    },
    /// Composite every template in a directory with its same-named replacement
    Batch {
        /// Template directory (overrides [batch].template_dir)
        #[arg(long)]
        templates: Option<PathBuf>,

        /// Replacement directory (overrides [batch].replacement_dir)
        #[arg(long)]
        replacements: Option<PathBuf>,

        /// Output directory (overrides [batch].output_dir)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the bounding box summary JSON here
        #[arg(long)]
        summary: Option<PathBuf>,

        /// Number of parallel jobs
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Only process the first N templates
        #[arg(long)]
        limit: Option<usize>,

        /// Also write the log to this file (overrides [batch].log_file)
        #[arg(long)]
        log_file: Option<PathBuf>,

        /// Stop scheduling new pairs after the first failure
        #[arg(long)]
        fail_fast: bool,
    },
    /// Show the regions and classification of a template's first frame
    Inspect {
        /// Template animation or image
        template: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_settings(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            init_logging(cli.verbose, cli.quiet, None);
            eprintln!("Error loading config: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    match cli.command {
        Commands::Composite { template, replacement, output, preview, preview_size, json } => {
            init_logging(cli.verbose, cli.quiet, None);
            composite::run_composite(
                &config.config,
                &template,
                &replacement,
                &output,
                preview.as_deref(),
                &preview_size,
                json,
            )
        }
        Commands::Batch {
            templates,
            replacements,
            output,
            summary,
            jobs,
            limit,
            log_file,
            fail_fast,
        } => {
            let log_path = batch_log_path(&config, log_file.as_deref());
            init_logging(cli.verbose, cli.quiet, log_path.as_deref());
            let overrides = CliOverrides {
                template_dir: templates,
                replacement_dir: replacements,
                output_dir: output,
                summary,
                jobs,
                limit,
                log_file,
            };
            batch::run_batch(config, &overrides, fail_fast)
        }
        Commands::Inspect { template, json } => {
            init_logging(cli.verbose, cli.quiet, None);
            inspect::run_inspect(&config.config.thresholds, &template, json)
        }
    }
}

/// Loaded configuration and the directory relative paths resolve against.
pub(crate) struct Settings {
    pub config: SwapConfig,
    pub root: PathBuf,
}

fn load_settings(explicit: Option<&Path>) -> Result<Settings, ConfigError> {
    let cwd = std::env::current_dir().unwrap_or_default();
    let path = explicit.map(Path::to_path_buf).or_else(find_config);

    let config = load_config(path.as_deref())?;
    let root = path
        .as_deref()
        .and_then(Path::parent)
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or(cwd);

    Ok(Settings { config, root })
}

/// Log file for a batch run: the flag (cwd-relative) wins over the config
/// value (relative to the config file).
fn batch_log_path(settings: &Settings, flag: Option<&Path>) -> Option<PathBuf> {
    match flag {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let configured = settings.config.batch.log_file.as_deref()?;
            Some(resolve_path(&settings.root, configured))
        }
    }
}

/// Install the log subscriber. INFO by default, to stderr and optionally to
/// `log_file` (truncated each run, no ANSI colours).
fn init_logging(verbose: bool, quiet: bool, log_file: Option<&Path>) {
    let level = if verbose {
        Level::DEBUG
    } else if quiet {
        Level::WARN
    } else {
        Level::INFO
    };

    let file_layer = log_file.and_then(|path| match create_log_file(path) {
        Ok(file) => Some(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(file)),
        ),
        Err(e) => {
            eprintln!("Warning: cannot open log file {}: {}", path.display(), e);
            None
        }
    });

    // Already installed when run in-process more than once
    let _ = tracing_subscriber::registry()
        .with(LevelFilter::from_level(level))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(file_layer)
        .try_init();
}

fn create_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    File::create(path)
}

/// Parse a "WxH" size string into (width, height).
pub(crate) fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 2 {
        return Err(format!("invalid size '{}', expected WxH (e.g., \"96x96\")", s));
    }
    let w: u32 =
        parts[0].trim().parse().map_err(|_| format!("invalid width '{}'", parts[0].trim()))?;
    let h: u32 =
        parts[1].trim().parse().map_err(|_| format!("invalid height '{}'", parts[1].trim()))?;
    if w == 0 || h == 0 {
        return Err(format!("size dimensions must be > 0, got {}x{}", w, h));
    }
    Ok((w, h))
}
