//! Pixel-exact frame comparison and visual diffs.

use crate::frame::Frame;
use crate::result::{AnimcheckError, AnimcheckResult};
use image::Rgba;
use serde::{Deserialize, Serialize};

/// Default cap on mismatches recorded per frame
pub const DEFAULT_MAX_REPORTED: usize = 1000;

/// Which mismatches of a frame get recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportPolicy {
    /// Record every differing pixel, up to the cap
    #[default]
    CollectAll,
    /// Record only the first differing pixel of each frame
    FirstPerFrame,
}

/// One differing pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelMismatch {
    /// Decoded frame index
    pub frame: usize,
    /// Column
    pub x: u32,
    /// Row
    pub y: u32,
    /// Expected RGBA
    pub expected: [u8; 4],
    /// Decoded RGBA
    pub actual: [u8; 4],
}

/// Outcome of comparing one frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameComparison {
    /// Decoded frame index
    pub frame: usize,
    /// Total number of differing pixels (recorded or not)
    pub mismatched_pixels: usize,
    /// Recorded mismatches
    pub mismatches: Vec<PixelMismatch>,
}

impl FrameComparison {
    /// Whether every pixel matched
    #[must_use]
    pub const fn is_match(&self) -> bool {
        self.mismatched_pixels == 0
    }
}

/// Exact, tolerance-free frame comparator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameComparator {
    policy: ReportPolicy,
    max_reported: usize,
}

impl Default for FrameComparator {
    fn default() -> Self {
        Self {
            policy: ReportPolicy::default(),
            max_reported: DEFAULT_MAX_REPORTED,
        }
    }
}

impl FrameComparator {
    /// Create a comparator with the given policy
    #[must_use]
    pub const fn new(policy: ReportPolicy) -> Self {
        Self {
            policy,
            max_reported: DEFAULT_MAX_REPORTED,
        }
    }

    /// Cap the mismatches recorded per frame
    #[must_use]
    pub const fn with_max_reported(mut self, max: usize) -> Self {
        self.max_reported = max;
        self
    }

    /// Reporting policy
    #[must_use]
    pub const fn policy(&self) -> ReportPolicy {
        self.policy
    }

    /// Compare decoded frame `frame` against its expectation
    ///
    /// # Errors
    ///
    /// Returns [`AnimcheckError::SizeMismatch`] if the frames differ in size
    pub fn compare(
        &self,
        frame: usize,
        expected: &Frame,
        actual: &Frame,
    ) -> AnimcheckResult<FrameComparison> {
        if expected.size() != actual.size() {
            return Err(AnimcheckError::SizeMismatch {
                expected: expected.size(),
                actual: actual.size(),
            });
        }

        let limit = match self.policy {
            ReportPolicy::CollectAll => self.max_reported,
            ReportPolicy::FirstPerFrame => self.max_reported.min(1),
        };
        let mut mismatched_pixels = 0;
        let mut mismatches = Vec::new();
        let pairs = expected
            .as_image()
            .enumerate_pixels()
            .zip(actual.as_image().pixels());
        for ((x, y, want), got) in pairs {
            if want == got {
                continue;
            }
            mismatched_pixels += 1;
            if mismatches.len() < limit {
                mismatches.push(PixelMismatch {
                    frame,
                    x,
                    y,
                    expected: want.0,
                    actual: got.0,
                });
            }
        }

        Ok(FrameComparison {
            frame,
            mismatched_pixels,
            mismatches,
        })
    }
}

/// Build a visual diff: differing pixels red, matching pixels dimmed
///
/// # Errors
///
/// Returns error if the frames differ in size
pub fn diff_image(expected: &Frame, actual: &Frame) -> AnimcheckResult<Frame> {
    if expected.size() != actual.size() {
        return Err(AnimcheckError::SizeMismatch {
            expected: expected.size(),
            actual: actual.size(),
        });
    }
    let mut diff = actual.clone();
    for (px, want) in diff.as_image_mut().pixels_mut().zip(expected.as_image().pixels()) {
        *px = if *px == *want {
            let Rgba([r, g, b, _]) = *px;
            Rgba([r / 2, g / 2, b / 2, 128])
        } else {
            Rgba([255, 0, 0, 255])
        };
    }
    Ok(diff)
}
