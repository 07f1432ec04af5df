//! Inspect command: show how a template's first frame is classified

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use super::{EXIT_ERROR, EXIT_SUCCESS};
use crate::frames::load_frames;
use crate::pipeline::analyze_template;
use crate::thresholds::Thresholds;

/// Run the inspect command
pub fn run_inspect(thresholds: &Thresholds, template: &Path, json: bool) -> ExitCode {
    let loaded = fs::read(template)
        .map_err(|e| e.to_string())
        .and_then(|bytes| load_frames(&bytes).map_err(|e| e.to_string()));
    let frames = match loaded {
        Ok(frames) => frames,
        Err(e) => {
            eprintln!("Error: {}: {}", template.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let analysis = analyze_template(frames.first().image(), thresholds);

    if json {
        return match serde_json::to_string_pretty(&analysis) {
            Ok(text) => {
                println!("{}", text);
                ExitCode::from(EXIT_SUCCESS)
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::from(EXIT_ERROR)
            }
        };
    }

    let (w, h) = frames.canvas_size();
    println!(
        "{}: {}x{}, {} frames, loop {}",
        template.display(),
        w,
        h,
        frames.len(),
        frames.loop_count()
    );
    println!("Regions ({}):", analysis.regions.len());
    for region in &analysis.regions {
        let role = if Some(region) == analysis.classification.main.as_ref() {
            "main"
        } else if analysis.classification.badges.contains(region) {
            "badge"
        } else {
            "dropped"
        };
        println!("  {:>7} px  {}  {}", region.pixel_count, region.bbox, role);
    }

    if analysis.classification.main.is_none() {
        println!("No subject found: every pixel is below opacity {}", thresholds.opacity);
    }

    ExitCode::from(EXIT_SUCCESS)
}
