//! Result and error types for animcheck.

use crate::config::AnimationMode;
use crate::frame::FrameSize;
use thiserror::Error;

/// Result type for animcheck operations
pub type AnimcheckResult<T> = Result<T, AnimcheckError>;

/// Errors that can occur while generating, encoding, decoding or verifying an animation
#[derive(Debug, Error)]
pub enum AnimcheckError {
    /// A caller-supplied value violates a precondition
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// Decoded frame count does not match the playback mode
    #[error("Frame count mismatch: expected {expected} decoded frames ({mode} playback), got {actual}")]
    FrameCountMismatch {
        /// Frames the decoded stream must contain
        expected: usize,
        /// Frames the decoded stream actually contains
        actual: usize,
        /// Playback mode the expectation was derived from
        mode: AnimationMode,
    },

    /// Frame sizes differ where the policy forbids it
    #[error("Frame size mismatch: expected {expected}, got {actual}")]
    SizeMismatch {
        /// Size the source side declares
        expected: FrameSize,
        /// Size found on the decoded side
        actual: FrameSize,
    },

    /// Verification finished with differing pixels
    #[error("Pixel mismatch: {mismatched_pixels} pixel(s) differ across {mismatched_frames} frame(s)")]
    PixelMismatch {
        /// Number of frames with at least one differing pixel
        mismatched_frames: usize,
        /// Total number of differing pixels
        mismatched_pixels: usize,
    },

    /// Encoder failure
    #[error("Encoding failed: {message}")]
    Encoding {
        /// Error message
        message: String,
    },

    /// Decoder failure
    #[error("Decoding failed: {message}")]
    Decoding {
        /// Error message
        message: String,
    },

    /// Image processing error (resizing, PNG export, etc.)
    #[error("Image processing failed: {message}")]
    ImageProcessing {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnimcheckError {
    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an encoding error
    #[must_use]
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }

    /// Create a decoding error
    #[must_use]
    pub fn decoding(message: impl Into<String>) -> Self {
        Self::Decoding {
            message: message.into(),
        }
    }

    /// Whether this error is a reconciliation violation (frame count or size)
    #[must_use]
    pub const fn is_reconciliation(&self) -> bool {
        matches!(
            self,
            Self::FrameCountMismatch { .. } | Self::SizeMismatch { .. }
        )
    }
}
