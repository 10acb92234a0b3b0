// src/bin/cflat.rs

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::time::FormatTime;

use cflat::cli::{Cli, Commands};
use cflat::commands::build::build_file;
use cflat::commands::check::check_file;
use cflat::commands::inspect::inspect_file;

/// A timer that outputs nothing but still enables span timing calculation
struct NoTimestamp;

impl FormatTime for NoTimestamp {
    fn format_time(
        &self,
        _w: &mut tracing_subscriber::fmt::format::Writer<'_>,
    ) -> std::fmt::Result {
        Ok(())
    }
}

fn main() -> ExitCode {
    // Tracing is off unless CFLAT_LOG is set, e.g. CFLAT_LOG=cflat=debug
    if let Ok(filter) = EnvFilter::try_from_env("CFLAT_LOG") {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .with_timer(NoTimestamp)
            .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
            .with_writer(std::io::stderr)
            .init();
        tracing::debug!("tracing initialized");
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::Check { file, plain } => check_file(&file, plain),
        Commands::Build {
            file,
            output,
            plain,
        } => build_file(&file, output.as_deref(), plain),
        Commands::Inspect { inspect_type, file } => inspect_file(inspect_type, &file),
    }
}
