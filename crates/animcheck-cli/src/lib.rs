//! Animcheck CLI library
//!
//! Command-line front end for the animcheck round-trip harness: builds the
//! wipe animation from flags and an optional YAML run file, encodes it as GIF,
//! decodes it back and reports per-frame verification results.

#![warn(missing_docs)]

mod commands;
mod config;
mod error;
mod logging;
mod output;
mod runner;

pub use commands::{
    AnimationArgs, BackgroundArg, Cli, ColorArg, Commands, DithererArg, EncodeArgs, LogFormatArg,
    MatrixArgs, ModeArg, OutputFormatArg, QuantizerArg, SizeHandlingArg, VerifyArgs,
};
pub use config::{
    CliConfig, ColorChoice, LogFormat, ResolvedRun, RunConfig, Verbosity, DEFAULT_HEIGHT,
    DEFAULT_HOLD_DELAY_MS, DEFAULT_MAX_COLORS, DEFAULT_STEP_DELAY_MS, DEFAULT_WIDTH,
};
pub use error::{CliError, CliResult};
pub use logging::{build_filter, init_logging};
pub use output::{
    matrix_summary, matrix_table, report_line, MatrixOutcome, MatrixRow, OutputFormat,
    ProgressReporter,
};
pub use runner::{
    matrix_cell, out_of_range_releases, run_encode, run_matrix, run_verify, save_artifacts,
};
