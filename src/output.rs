//! Writing composited output and previews to disk

use image::RgbaImage;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for output operations
#[derive(Debug, Error)]
pub enum OutputError {
    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Image encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Write encoded bytes to `path`, creating parent directories as needed.
pub fn write_bytes(bytes: &[u8], path: &Path) -> Result<(), OutputError> {
    ensure_parent(path)?;
    fs::write(path, bytes)?;
    Ok(())
}

/// Save an RGBA image to a PNG file.
///
/// # Returns
///
/// * `Ok(())` on success
/// * `Err(OutputError)` on failure
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), OutputError> {
    ensure_parent(path)?;
    image.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

/// Output path for a composited template.
///
/// | `output` | Result |
/// |----------|--------|
/// | directory (existing, or ending in `/`) | `dir/{template_stem}.gif` |
/// | file path | unchanged |
pub fn generate_output_path(template: &Path, output: &Path) -> PathBuf {
    let is_dir = output.as_os_str().to_string_lossy().ends_with('/') || output.is_dir();
    if !is_dir {
        return output.to_path_buf();
    }

    let stem = template.file_stem().and_then(|s| s.to_str()).unwrap_or("output");
    output.join(format!("{}.gif", stem))
}

fn ensure_parent(path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
