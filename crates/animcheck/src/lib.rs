//! Animcheck: round-trip conformance checks for animated-image encoders
//!
//! Animcheck generates deterministic synthetic content, turns it into a lazy
//! "wipe" animation, encodes it with a pluggable color-reduction pipeline,
//! decodes the result and verifies every decoded frame bit-exactly against an
//! independently computed expectation.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────┐   ┌──────────────┐   ┌─────────┐   ┌─────────┐
//! │ Gradient  │──►│ WipeAnimation│──►│ Encoder │──►│ Decoder │
//! └───────────┘   └──────┬───────┘   └─────────┘   └────┬────┘
//!                        │ second traversal             │
//!                        ▼                              ▼
//!              ┌────────────────────┐       ┌──────────────────┐
//!              │ placement + reduce │──────►│ FrameComparator  │
//!              └────────────────────┘       └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use animcheck::{AnimationConfig, AnimationMode, RoundTripVerifier, WipeAnimation};
//!
//! # fn main() -> animcheck::AnimcheckResult<()> {
//! let wipe = WipeAnimation::from_gradient(60, 20)?;
//! let config = AnimationConfig::new(wipe)?.with_mode(AnimationMode::PingPong);
//! let run = RoundTripVerifier::gif().run(&config)?;
//! assert!(run.report.passed());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

/// Saving encoded streams and diff images
pub mod artifacts;

/// Encoder/decoder collaborators (GIF)
pub mod codec;

/// Color quantization and dithering
pub mod quantize;

mod compare;
mod config;
mod frame;
mod gradient;
mod placement;
mod reconcile;
mod result;
mod source;
mod verify;
mod wipe;

pub use codec::{
    AnimationDecoder, AnimationEncoder, DecodedAnimation, DecodedFrame, GifDecoder, GifEncoder,
    StreamInfo,
};
pub use compare::{
    diff_image, FrameComparator, FrameComparison, PixelMismatch, ReportPolicy,
    DEFAULT_MAX_REPORTED,
};
pub use config::{AnimationConfig, AnimationMode, SizeHandling};
pub use frame::{ClipToByte, Frame, FrameSize, TRANSPARENT};
pub use gradient::{fill_alpha_gradient, generate_alpha_gradient};
pub use placement::{expected_frame, place_frame, resolve_placement, Placement};
pub use quantize::{
    ColorMapper, Ditherer, ErrorDiffusion, OptimizedPalette, OrderedDither, Palette,
    PredefinedColors, PredefinedKind, Quantizer,
};
pub use reconcile::{check_frame_count, expected_frame_count, mirror_index, source_index};
pub use result::{AnimcheckError, AnimcheckResult};
pub use source::{FrameCursor, FrameList, FrameSource};
pub use verify::{RoundTripVerifier, VerificationReport, VerificationRun};
pub use wipe::{WipeAnimation, DEFAULT_HOLD_DELAY, DEFAULT_STEP_DELAY};
