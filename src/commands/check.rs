// src/commands/check.rs

use std::path::Path;
use std::process::ExitCode;

use super::common::{
    PipelineError, PipelineOptions, check_source, read_source, render_pipeline_error,
};

/// Check a CFlat source file (parse + type check, no code generation)
pub fn check_file(path: &Path, plain: bool) -> ExitCode {
    match check_single_file(path, plain) {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE, // already rendered
    }
}

fn check_single_file(path: &Path, plain: bool) -> Result<(), PipelineError> {
    let file_path = path.to_string_lossy();
    let source = match read_source(path) {
        Ok(s) => s,
        Err(e) => {
            let opts = PipelineOptions {
                source: "",
                file_path: &file_path,
                plain,
            };
            render_pipeline_error(&e, &opts, &mut std::io::stderr());
            return Err(e);
        }
    };

    let opts = PipelineOptions {
        source: &source,
        file_path: &file_path,
        plain,
    };
    let result = check_source(&opts, &mut std::io::stderr());
    if let Err(ref e) = result {
        render_pipeline_error(e, &opts, &mut std::io::stderr());
    }
    result.map(|_| ())
}
