//! Animcheck CLI: GIF round-trip conformance checks
//!
//! ## Usage
//!
//! ```bash
//! animcheck verify                                  # 60x20 wipe, normal playback
//! animcheck verify --mode ping-pong --format json   # JSON report
//! animcheck encode --height 8 --out wipe.gif        # Write the stream
//! animcheck matrix --size 80x50                     # Every mode x size policy
//! ```

use animcheck_cli::{
    init_logging, run_encode, run_matrix, run_verify, Cli, CliConfig, CliResult, ColorArg,
    ColorChoice, Commands, LogFormat, LogFormatArg, Verbosity,
};
use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_logging(&config)?;

    match &cli.command {
        Commands::Verify(args) => run_verify(&config, args),
        Commands::Encode(args) => run_encode(&config, args),
        Commands::Matrix(args) => run_matrix(&config, args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let color = match cli.color {
        ColorArg::Auto => ColorChoice::Auto,
        ColorArg::Always => ColorChoice::Always,
        ColorArg::Never => ColorChoice::Never,
    };
    let log_format = match cli.log_format {
        LogFormatArg::Text => LogFormat::Text,
        LogFormatArg::Json => LogFormat::Json,
    };

    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(color)
        .with_log_format(log_format)
}
