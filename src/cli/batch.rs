//! Batch command implementation

use std::process::ExitCode;

use super::{Settings, EXIT_ERROR, EXIT_SUCCESS};
use crate::batch::{find_pairs, BatchRunner};
use crate::config::{merge_cli_overrides, resolve_path, CliOverrides};

/// Run the batch command
pub fn run_batch(settings: Settings, overrides: &CliOverrides, fail_fast: bool) -> ExitCode {
    let Settings { mut config, root } = settings;
    if let Err(e) = merge_cli_overrides(&mut config, overrides) {
        eprintln!("Error: {}", e);
        return ExitCode::from(EXIT_ERROR);
    }

    // Relative paths from the file are relative to the file, flags to the cwd
    let cwd = std::env::current_dir().unwrap_or_default();
    let base_for = |overridden: bool| if overridden { cwd.as_path() } else { root.as_path() };
    let batch = &mut config.batch;
    batch.template_dir =
        resolve_path(base_for(overrides.template_dir.is_some()), &batch.template_dir);
    batch.replacement_dir =
        resolve_path(base_for(overrides.replacement_dir.is_some()), &batch.replacement_dir);
    batch.output_dir = resolve_path(base_for(overrides.output_dir.is_some()), &batch.output_dir);
    batch.summary = batch
        .summary
        .as_ref()
        .map(|p| resolve_path(base_for(overrides.summary.is_some()), p));

    let pairs = match find_pairs(&batch.template_dir, &batch.replacement_dir, batch.limit) {
        Ok(pairs) => pairs,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    if pairs.is_empty() {
        println!("No templates found in {}", batch.template_dir.display());
        return ExitCode::from(EXIT_SUCCESS);
    }

    let runner = BatchRunner::from_config(&config).with_fail_fast(fail_fast);
    let result = match runner.run(&pairs) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    if let Some(summary_path) = &config.batch.summary {
        if let Err(e) = result.write_summary(summary_path) {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    }

    println!("{}", result.report());

    if result.is_success() {
        ExitCode::from(EXIT_SUCCESS)
    } else {
        ExitCode::from(EXIT_ERROR)
    }
}
