//! Configuration loading and discovery for `spriteswap.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::SwapConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name searched for during discovery
pub const CONFIG_FILE_NAME: &str = "spriteswap.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse spriteswap.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub template_dir: Option<PathBuf>,
    pub replacement_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub summary: Option<PathBuf>,
    /// Number of parallel jobs
    pub jobs: Option<usize>,
    /// Maximum number of templates to process
    pub limit: Option<usize>,
    pub log_file: Option<PathBuf>,
}

/// Find spriteswap.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for spriteswap.toml
/// 2. Check XDG_CONFIG_HOME/spriteswap/spriteswap.toml (or ~/.config/spriteswap/spriteswap.toml)
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find spriteswap.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("spriteswap").join(CONFIG_FILE_NAME);
    config_path.exists().then_some(config_path)
}

/// Find spriteswap.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a spriteswap.toml file.
///
/// If a path is provided, loads from that file and fails if it is missing.
/// Otherwise uses [`find_config`]; when nothing is found the defaults apply.
pub fn load_config(path: Option<&Path>) -> Result<SwapConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => {
            tracing::debug!("loading config from {}", p.display());
            load_config_file(&p)
        }
        None => Ok(SwapConfig::default()),
    }
}

fn load_config_file(path: &Path) -> Result<SwapConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: SwapConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors));
    }

    Ok(config)
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values. The merged
/// configuration is validated again since flags bypass the file checks.
pub fn merge_cli_overrides(
    config: &mut SwapConfig,
    overrides: &CliOverrides,
) -> Result<(), ConfigError> {
    let batch = &mut config.batch;
    if let Some(ref dir) = overrides.template_dir {
        batch.template_dir = dir.clone();
    }
    if let Some(ref dir) = overrides.replacement_dir {
        batch.replacement_dir = dir.clone();
    }
    if let Some(ref dir) = overrides.output_dir {
        batch.output_dir = dir.clone();
    }
    if let Some(ref summary) = overrides.summary {
        batch.summary = Some(summary.clone());
    }
    if let Some(jobs) = overrides.jobs {
        batch.jobs = Some(jobs);
    }
    if let Some(limit) = overrides.limit {
        batch.limit = Some(limit);
    }
    if let Some(ref log_file) = overrides.log_file {
        batch.log_file = Some(log_file.clone());
    }

    let errors = config.validate();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Validation(errors))
    }
}

/// Resolve a path relative to the directory holding the config file.
///
/// Absolute paths are returned unchanged.
pub fn resolve_path(config_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        config_root.join(path)
    }
}
