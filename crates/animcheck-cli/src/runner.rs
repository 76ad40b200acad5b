//! Command implementations

use crate::commands::{EncodeArgs, MatrixArgs, VerifyArgs};
use crate::config::{CliConfig, ResolvedRun};
use crate::error::{CliError, CliResult};
use crate::output::{MatrixOutcome, MatrixRow, OutputFormat, ProgressReporter};
use animcheck::artifacts::{save_diff_png, save_stream};
use animcheck::{
    diff_image, AnimationConfig, AnimationEncoder, AnimationMode, AnimcheckError, GifDecoder,
    GifEncoder, RoundTripVerifier, SizeHandling, VerificationRun,
};
use std::path::{Path, PathBuf};

type GifVerifier = RoundTripVerifier<GifEncoder, GifDecoder>;

fn reporter_for(config: &CliConfig) -> ProgressReporter {
    ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet())
}

fn verifier_for(run: &ResolvedRun) -> GifVerifier {
    RoundTripVerifier::gif().with_released(run.release.iter().copied())
}

/// Released indices that name no source frame
#[must_use]
pub fn out_of_range_releases(released: &[usize], frame_count: usize) -> Vec<usize> {
    released
        .iter()
        .copied()
        .filter(|&index| index >= frame_count)
        .collect()
}

/// Save the stream and, for a failed run, a diff of its first mismatching frame
///
/// # Errors
///
/// Returns error if a file cannot be written or the expected frame cannot be rebuilt
pub fn save_artifacts(
    dir: &Path,
    verifier: &GifVerifier,
    animation: &AnimationConfig,
    run: &VerificationRun,
) -> CliResult<Vec<PathBuf>> {
    let mode = animation.mode().to_string();
    let mut saved = vec![save_stream(
        dir,
        "verify",
        Some(&mode),
        &run.bytes,
        verifier.encoder().extension(),
    )?];

    if let Some(index) = run.report.first_mismatch() {
        let expected = verifier.expected_at(animation, run.decoded.size(), index)?;
        let actual = run
            .decoded
            .frame(index)
            .ok_or_else(|| AnimcheckError::decoding(format!("decoded frame {index} is missing")))?;
        let diff = diff_image(&expected, actual)?;
        saved.push(save_diff_png(dir, "verify", index, &diff)?);
    }
    Ok(saved)
}

/// Run the `verify` command
///
/// # Errors
///
/// Returns error on configuration or codec failures, reconciliation
/// violations, and when any pixel differs
pub fn run_verify(config: &CliConfig, args: &VerifyArgs) -> CliResult<()> {
    let resolved =
        ResolvedRun::from_args(&args.animation, &args.release, args.save_dir.as_deref())?;
    let animation = resolved.animation_config()?;
    let verifier = verifier_for(&resolved);
    let reporter = reporter_for(config);
    tracing::info!(
        width = resolved.width,
        height = resolved.height,
        mode = %resolved.mode,
        size_handling = %resolved.size_handling,
        "verifying wipe animation"
    );

    for index in out_of_range_releases(&resolved.release, animation.frame_count()) {
        reporter.warning(&format!(
            "released frame {index} is past the last source frame ({} frames)",
            animation.frame_count()
        ));
    }

    let run = verifier.run(&animation)?;

    if let Some(dir) = &resolved.save_dir {
        for path in save_artifacts(dir, &verifier, &animation, &run)? {
            reporter.info(&format!("saved {}", path.display()));
        }
    }

    reporter.report(&run.report, OutputFormat::from(args.format))?;
    if run.report.passed() {
        Ok(())
    } else {
        Err(CliError::verification(format!(
            "{} pixel(s) differ across {} frame(s)",
            run.report.mismatched_pixels,
            run.report.mismatches.len()
        )))
    }
}

/// Run the `encode` command
///
/// # Errors
///
/// Returns error on configuration or encoder failures, or if the file cannot be written
pub fn run_encode(config: &CliConfig, args: &EncodeArgs) -> CliResult<()> {
    let resolved = ResolvedRun::from_args(&args.animation, &[], None)?;
    let animation = resolved.animation_config()?;
    let bytes = GifEncoder::new().encode(&animation)?;
    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&args.out, &bytes)?;
    tracing::info!(path = %args.out.display(), bytes = bytes.len(), "wrote stream");

    reporter_for(config).success(&format!(
        "wrote {} ({} bytes, {} source frames, {} playback)",
        args.out.display(),
        bytes.len(),
        animation.frame_count(),
        animation.mode()
    ));
    Ok(())
}

/// Verify one mode and policy combination
#[must_use]
pub fn matrix_cell(
    resolved: &ResolvedRun,
    verifier: &GifVerifier,
    mode: AnimationMode,
    size_handling: SizeHandling,
) -> MatrixRow {
    let outcome = resolved
        .animation_config_with(mode, size_handling)
        .and_then(|animation| verifier.run(&animation).map_err(CliError::from));

    let (outcome, compared_frames, mismatched_pixels, detail) = match outcome {
        Ok(run) if run.report.passed() => {
            (MatrixOutcome::Passed, run.report.compared_frames, 0, None)
        }
        Ok(run) => (
            MatrixOutcome::Mismatched,
            run.report.compared_frames,
            run.report.mismatched_pixels,
            None,
        ),
        Err(CliError::Animcheck(e @ AnimcheckError::SizeMismatch { .. }))
            if size_handling == SizeHandling::ErrorIfDiffers =>
        {
            (MatrixOutcome::ExpectedFailure, 0, 0, Some(e.to_string()))
        }
        Err(e) => (MatrixOutcome::Error, 0, 0, Some(e.to_string())),
    };
    tracing::debug!(%mode, %size_handling, ?outcome, "matrix cell finished");

    MatrixRow {
        mode,
        size_handling,
        outcome,
        compared_frames,
        mismatched_pixels,
        detail,
    }
}

/// Run the `matrix` command
///
/// # Errors
///
/// Returns error if the run file cannot be loaded, or if any combination
/// mismatched or failed unexpectedly
pub fn run_matrix(config: &CliConfig, args: &MatrixArgs) -> CliResult<()> {
    let resolved = ResolvedRun::from_args(&args.animation, &[], None)?;
    let verifier = verifier_for(&resolved);
    let mut reporter = reporter_for(config);
    let cells: Vec<(AnimationMode, SizeHandling)> = AnimationMode::ALL
        .into_iter()
        .flat_map(|mode| SizeHandling::ALL.into_iter().map(move |policy| (mode, policy)))
        .collect();

    reporter.start_progress(cells.len() as u64, "matrix");
    let mut rows = Vec::with_capacity(cells.len());
    for (mode, policy) in cells {
        reporter.set_message(&format!("{mode}/{policy}"));
        rows.push(matrix_cell(&resolved, &verifier, mode, policy));
        reporter.increment(1);
    }
    reporter.finish();

    reporter.matrix(&rows, OutputFormat::from(args.format))?;
    let failed = rows.iter().filter(|r| r.outcome.is_failure()).count();
    if failed == 0 {
        Ok(())
    } else {
        Err(CliError::verification(format!(
            "{failed} of {} combinations failed",
            rows.len()
        )))
    }
}
