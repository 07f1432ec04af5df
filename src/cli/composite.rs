//! Composite command implementation

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use super::{parse_size, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::config::SwapConfig;
use crate::output::{generate_output_path, save_png, write_bytes};
use crate::pipeline::composite_with;
use crate::resample::fit_frames;

/// Run the composite command
pub fn run_composite(
    config: &SwapConfig,
    template: &Path,
    replacement: &Path,
    output: &Path,
    preview: Option<&Path>,
    preview_size: &str,
    json: bool,
) -> ExitCode {
    let preview_size = match parse_size(preview_size) {
        Ok(size) => size,
        Err(e) => {
            eprintln!("Error: --preview-size: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let template_bytes = match fs::read(template) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error: Cannot read template '{}': {}", template.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    let replacement_bytes = match fs::read(replacement) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error: Cannot read replacement '{}': {}", replacement.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let result = match composite_with(&template_bytes, &replacement_bytes, &config.thresholds) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {}: {}", template.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let output_path = generate_output_path(template, output);
    if let Err(e) = write_bytes(&result.output_bytes, &output_path) {
        eprintln!("Error: Failed to write '{}': {}", output_path.display(), e);
        return ExitCode::from(EXIT_ERROR);
    }

    if let Some(preview_path) = preview {
        let first = [result.frames.first().image().clone()];
        let saved = fit_frames(&first, preview_size)
            .map_err(|e| e.to_string())
            .and_then(|frames| match frames.first() {
                Some(frame) => save_png(frame, preview_path).map_err(|e| e.to_string()),
                None => Ok(()),
            });
        if let Err(e) = saved {
            eprintln!("Error: Failed to write preview '{}': {}", preview_path.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    }

    let geometry = &result.geometry;
    if json {
        match serde_json::to_string_pretty(geometry) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    } else {
        println!("Saved: {}", output_path.display());
        println!("  frames: {}", result.frames.len());
        println!("  scale: {:.2}x", geometry.scale_factor);
        println!("  main bbox: {}", geometry.main_bbox);
        println!("  canvas: {}x{}", geometry.canvas_size.0, geometry.canvas_size.1);
        println!("  badge shift: {}", geometry.badge_shift);
        for badge in &geometry.badge_bboxes {
            println!("  badge: {}", badge);
        }
    }

    ExitCode::from(EXIT_SUCCESS)
}
