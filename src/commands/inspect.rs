// src/commands/inspect.rs

use std::path::Path;
use std::process::ExitCode;

use crate::cli::InspectType;
use crate::frontend::{AstPrinter, NodeId};

use super::common::{
    PipelineOptions, check_source, parse_source, read_source, render_pipeline_error,
};

/// Print the syntax tree of a file, optionally annotated with checked types
pub fn inspect_file(inspect_type: InspectType, path: &Path) -> ExitCode {
    let file_path = path.to_string_lossy();
    let source = match read_source(path) {
        Ok(s) => s,
        Err(e) => {
            let opts = PipelineOptions {
                source: "",
                file_path: &file_path,
                plain: false,
            };
            render_pipeline_error(&e, &opts, &mut std::io::stderr());
            return ExitCode::FAILURE;
        }
    };
    let opts = PipelineOptions {
        source: &source,
        file_path: &file_path,
        plain: false,
    };

    let printed = match inspect_type {
        InspectType::Ast => parse_source(&source).map(|(program, interner)| {
            AstPrinter::new(&interner).print_program(&program)
        }),
        InspectType::Types => check_source(&opts, &mut std::io::stderr()).map(|checked| {
            let analysis = &checked.analysis;
            let lookup = |id: NodeId| {
                analysis
                    .expr_data
                    .get_type(id)
                    .map(|ty| analysis.registry.display(ty))
            };
            AstPrinter::new(&checked.interner)
                .with_types(&lookup)
                .print_program(&checked.program)
        }),
    };

    match printed {
        Ok(text) => {
            print!("{}", text);
            ExitCode::SUCCESS
        }
        Err(e) => {
            render_pipeline_error(&e, &opts, &mut std::io::stderr());
            ExitCode::FAILURE
        }
    }
}
