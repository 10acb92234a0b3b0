// src/commands/build.rs

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use super::common::{
    PipelineError, PipelineOptions, compile_source, read_source, render_pipeline_error,
};

/// Where the listing goes when no `-o` is given: the input with a `.s` extension
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("s")
}

/// Compile a CFlat source file to an ARM assembly listing
pub fn build_file(path: &Path, output: Option<&Path>, plain: bool) -> ExitCode {
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
            return ExitCode::FAILURE;
        }
    };

    let opts = PipelineOptions {
        source: &source,
        file_path: &file_path,
        plain,
    };
    let assembly = match compile_source(&opts, &mut std::io::stderr()) {
        Ok(asm) => asm,
        Err(e) => {
            render_pipeline_error(&e, &opts, &mut std::io::stderr());
            return ExitCode::FAILURE;
        }
    };

    let out_path = output.map_or_else(|| default_output_path(path), Path::to_path_buf);
    let written = File::create(&out_path).and_then(|file| {
        let mut writer = BufWriter::new(file);
        assembly.write_to(&mut writer)?;
        writer.flush()
    });
    if let Err(source) = written {
        let e = PipelineError::Io {
            path: out_path,
            source,
        };
        render_pipeline_error(&e, &opts, &mut std::io::stderr());
        return ExitCode::FAILURE;
    }

    tracing::info!(output = %out_path.display(), "wrote assembly");
    ExitCode::SUCCESS
}
