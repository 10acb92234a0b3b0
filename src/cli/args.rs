// src/cli/args.rs

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CFlat compiler targeting 32-bit ARM assembly
#[derive(Parser)]
#[command(name = "cflat")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "CFlat compiler", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check a CFlat source file for errors without generating code
    #[command(visible_alias = "c")]
    Check {
        /// Path to the source file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print diagnostics as `<line>: <message>`
        #[arg(long)]
        plain: bool,
    },
    /// Compile a CFlat source file to ARM assembly
    #[command(visible_alias = "b")]
    Build {
        /// Path to the source file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output path (default: FILE with a `.s` extension)
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,

        /// Print diagnostics as `<line>: <message>`
        #[arg(long)]
        plain: bool,
    },
    /// Inspect the syntax tree, optionally with checked types
    #[command(visible_alias = "i")]
    Inspect {
        /// What to inspect: ast, types
        #[arg(value_name = "TYPE")]
        inspect_type: InspectType,

        /// Path to the source file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum InspectType {
    Ast,
    Types,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_build_with_output() {
        let cli = Cli::try_parse_from(["cflat", "build", "a.cb", "-o", "out.s", "--plain"]).unwrap();
        match cli.command {
            Commands::Build {
                file,
                output,
                plain,
            } => {
                assert_eq!(file, PathBuf::from("a.cb"));
                assert_eq!(output, Some(PathBuf::from("out.s")));
                assert!(plain);
            }
            _ => panic!("expected build"),
        }
    }

    #[test]
    fn rejects_unknown_inspect_type() {
        assert!(Cli::try_parse_from(["cflat", "inspect", "ir", "a.cb"]).is_err());
    }
}
