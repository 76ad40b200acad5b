//! Output formatting and progress reporting

use crate::commands::OutputFormatArg;
use crate::error::CliResult;
use animcheck::{AnimationMode, SizeHandling, VerificationReport};
use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON output
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Text => Self::Text,
            OutputFormatArg::Json => Self::Json,
        }
    }
}

/// Outcome of one matrix cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatrixOutcome {
    /// Every compared frame matched
    Passed,
    /// Pixels differed
    Mismatched,
    /// Strict size policy refused a differing stream size, as intended
    ExpectedFailure,
    /// The round trip could not complete
    Error,
}

impl MatrixOutcome {
    /// Whether this cell counts against the run
    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(self, Self::Mismatched | Self::Error)
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Passed => "pass",
            Self::Mismatched => "mismatch",
            Self::ExpectedFailure => "expected-failure",
            Self::Error => "error",
        }
    }
}

/// One row of the matrix summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixRow {
    /// Playback mode
    pub mode: AnimationMode,
    /// Size-handling policy
    pub size_handling: SizeHandling,
    /// Cell outcome
    pub outcome: MatrixOutcome,
    /// Decoded frames compared, zero when the run did not complete
    pub compared_frames: usize,
    /// Differing pixels
    pub mismatched_pixels: usize,
    /// Error text for failed or refused runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Progress reporter for round-trip runs
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stdout(),
            progress_bar: None,
            use_color,
            quiet,
        }
    }

    /// Start a progress bar on stderr
    pub fn start_progress(&mut self, total: u64, message: &str) {
        if self.quiet {
            return;
        }

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(message.to_string());
        self.progress_bar = Some(pb);
    }

    /// Increment progress
    pub fn increment(&self, delta: u64) {
        if let Some(ref pb) = self.progress_bar {
            pb.inc(delta);
        }
    }

    /// Update progress message
    pub fn set_message(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_message(message.to_string());
        }
    }

    /// Finish and clear the progress bar
    pub fn finish(&mut self) {
        if let Some(pb) = self.progress_bar.take() {
            pb.finish_and_clear();
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "PASS".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Failures print even in quiet mode
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("⚠").yellow().bold().to_string()
        } else {
            "WARN".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("ℹ").blue().bold().to_string()
        } else {
            "INFO".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print raw text (JSON documents); not suppressed by quiet mode
    pub fn raw(&self, text: &str) {
        let _ = self.term.write_line(text);
    }

    /// Print a verification report
    ///
    /// # Errors
    ///
    /// Returns error if JSON serialization fails
    pub fn report(&self, report: &VerificationReport, format: OutputFormat) -> CliResult<()> {
        match format {
            OutputFormat::Json => self.raw(&serde_json::to_string_pretty(report)?),
            OutputFormat::Text => {
                let line = report_line(report);
                if report.passed() {
                    self.success(&line);
                } else {
                    self.failure(&line);
                    for comparison in report.mismatches.iter().take(5) {
                        if let Some(first) = comparison.mismatches.first() {
                            let _ = self.term.write_line(&format!(
                                "  frame {}: {} pixels differ, first at ({}, {}) expected {:?} got {:?}",
                                comparison.frame,
                                comparison.mismatched_pixels,
                                first.x,
                                first.y,
                                first.expected,
                                first.actual
                            ));
                        }
                    }
                }
                if !report.skipped_frames.is_empty() {
                    self.info(&format!("skipped released frames {:?}", report.skipped_frames));
                }
            }
        }
        Ok(())
    }

    /// Print the matrix summary
    ///
    /// # Errors
    ///
    /// Returns error if JSON serialization fails
    pub fn matrix(&self, rows: &[MatrixRow], format: OutputFormat) -> CliResult<()> {
        match format {
            OutputFormat::Json => self.raw(&serde_json::to_string_pretty(rows)?),
            OutputFormat::Text => {
                let _ = self.term.write_line(&matrix_table(rows));
                let failed = rows.iter().filter(|r| r.outcome.is_failure()).count();
                let summary = matrix_summary(rows);
                if failed == 0 {
                    self.success(&summary);
                } else if self.use_color {
                    self.failure(&Style::new().red().apply_to(summary).to_string());
                } else {
                    self.failure(&summary);
                }
            }
        }
        Ok(())
    }
}

/// One-line text summary of a report
#[must_use]
pub fn report_line(report: &VerificationReport) -> String {
    let mut line = format!(
        "{} {}/{}: {} of {} decoded frames compared at {} ({}",
        report.format,
        report.mode,
        report.size_handling,
        report.compared_frames,
        report.decoded_frames,
        report.stream_size,
        report.quantizer
    );
    if let Some(ditherer) = &report.ditherer {
        let _ = write!(line, ", {ditherer}");
    }
    line.push(')');
    if !report.passed() {
        let _ = write!(
            line,
            ", {} pixels differ in {} frames",
            report.mismatched_pixels,
            report.mismatches.len()
        );
    }
    line
}

/// Summary line: passed cells over the cells expected to pass, then expected failures
#[must_use]
pub fn matrix_summary(rows: &[MatrixRow]) -> String {
    let passed = rows
        .iter()
        .filter(|r| r.outcome == MatrixOutcome::Passed)
        .count();
    let expected_failures = rows
        .iter()
        .filter(|r| r.outcome == MatrixOutcome::ExpectedFailure)
        .count();
    let mut summary = format!(
        "{passed} of {} combinations passed",
        rows.len() - expected_failures
    );
    match expected_failures {
        0 => {}
        1 => summary.push_str(", 1 expected failure"),
        n => {
            let _ = write!(summary, ", {n} expected failures");
        }
    }
    summary
}

/// Plain-text matrix table
#[must_use]
pub fn matrix_table(rows: &[MatrixRow]) -> String {
    let mut table = format!(
        "{:<10} {:<17} {:<17} {:>8} {:>10}\n",
        "MODE", "SIZE HANDLING", "OUTCOME", "FRAMES", "PIXELS"
    );
    for row in rows {
        let _ = writeln!(
            table,
            "{:<10} {:<17} {:<17} {:>8} {:>10}",
            row.mode.to_string(),
            row.size_handling.to_string(),
            row.outcome.label(),
            row.compared_frames,
            row.mismatched_pixels
        );
    }
    table.trim_end().to_string()
}
