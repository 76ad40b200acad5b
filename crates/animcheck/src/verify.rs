//! Round-trip verification.
//!
//! The verifier encodes a configuration, decodes the bytes, checks the frame
//! count for the playback mode, and then walks a second, independent traversal
//! of the source frames. Every source frame is turned into its expected stream
//! frame (placement, then reduction) and compared against the decoded frame at
//! the same index, and against its reverse-pass copy in ping-pong mode.

use crate::codec::{AnimationDecoder, AnimationEncoder, DecodedAnimation, GifDecoder, GifEncoder};
use crate::compare::{FrameComparator, FrameComparison};
use crate::config::{AnimationConfig, AnimationMode, SizeHandling};
use crate::frame::{Frame, FrameSize};
use crate::placement::{expected_frame, resolve_placement};
use crate::reconcile::{check_frame_count, mirror_index, source_index};
use crate::result::{AnimcheckError, AnimcheckResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Outcome of verifying one decoded stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Stream format
    pub format: String,
    /// Playback mode
    pub mode: AnimationMode,
    /// Size-handling policy
    pub size_handling: SizeHandling,
    /// Quantizer name
    pub quantizer: String,
    /// Ditherer name, if any
    pub ditherer: Option<String>,
    /// Decoded frame size
    pub stream_size: FrameSize,
    /// Number of source frames
    pub source_frames: usize,
    /// Number of decoded frames
    pub decoded_frames: usize,
    /// Decoded frames compared pixel by pixel
    pub compared_frames: usize,
    /// Decoded frame indices skipped because their source was released
    pub skipped_frames: Vec<usize>,
    /// Total differing pixels over all frames
    pub mismatched_pixels: usize,
    /// Frames with at least one differing pixel, in decoded order
    pub mismatches: Vec<FrameComparison>,
}

impl VerificationReport {
    /// Whether every compared frame matched exactly
    #[must_use]
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }

    /// Decoded index of the first mismatching frame
    #[must_use]
    pub fn first_mismatch(&self) -> Option<usize> {
        self.mismatches.first().map(|m| m.frame)
    }

    /// Convert into a `Result`, failing with [`AnimcheckError::PixelMismatch`]
    ///
    /// # Errors
    ///
    /// Returns error if any frame mismatched
    pub fn into_result(self) -> AnimcheckResult<Self> {
        if self.passed() {
            Ok(self)
        } else {
            Err(AnimcheckError::PixelMismatch {
                mismatched_frames: self.mismatches.len(),
                mismatched_pixels: self.mismatched_pixels,
            })
        }
    }
}

/// Everything a full round trip produced
#[derive(Debug, Clone)]
pub struct VerificationRun {
    /// Encoded stream
    pub bytes: Vec<u8>,
    /// Decoded stream
    pub decoded: DecodedAnimation,
    /// Comparison outcome
    pub report: VerificationReport,
}

/// Encode, decode and compare
#[derive(Debug, Clone)]
pub struct RoundTripVerifier<E, D> {
    encoder: E,
    decoder: D,
    comparator: FrameComparator,
    released: BTreeSet<usize>,
}

impl RoundTripVerifier<GifEncoder, GifDecoder> {
    /// Verifier for the bundled GIF codec
    #[must_use]
    pub fn gif() -> Self {
        Self::new(GifEncoder::new(), GifDecoder::new())
    }
}

impl<E: AnimationEncoder, D: AnimationDecoder> RoundTripVerifier<E, D> {
    /// Create a verifier over an encoder/decoder pair
    #[must_use]
    pub fn new(encoder: E, decoder: D) -> Self {
        Self {
            encoder,
            decoder,
            comparator: FrameComparator::default(),
            released: BTreeSet::new(),
        }
    }

    /// Use a specific comparator
    #[must_use]
    pub const fn with_comparator(mut self, comparator: FrameComparator) -> Self {
        self.comparator = comparator;
        self
    }

    /// Exclude source frame `index` from comparison. It still counts toward
    /// frame-count reconciliation and index alignment.
    pub fn mark_released(&mut self, index: usize) {
        self.released.insert(index);
    }

    /// Builder form of [`Self::mark_released`]
    #[must_use]
    pub fn with_released(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.released.extend(indices);
        self
    }

    /// Released source frame indices
    #[must_use]
    pub const fn released(&self) -> &BTreeSet<usize> {
        &self.released
    }

    /// The encoder
    #[must_use]
    pub const fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Encode `config`, decode the result and verify it
    ///
    /// # Errors
    ///
    /// Returns error on codec failures and reconciliation violations. Pixel
    /// mismatches are reported, not returned as errors.
    #[tracing::instrument(skip_all, fields(mode = %config.mode(), size_handling = %config.size_handling()))]
    pub fn run(&self, config: &AnimationConfig) -> AnimcheckResult<VerificationRun> {
        let bytes = self.encoder.encode(config)?;
        let decoded = self.decoder.decode(&bytes)?;
        let report = self.verify_decoded(config, &decoded)?;
        Ok(VerificationRun {
            bytes,
            decoded,
            report,
        })
    }

    /// Decode `bytes` and verify them against `config`
    ///
    /// # Errors
    ///
    /// Returns error on decode failures and reconciliation violations
    pub fn verify_stream(
        &self,
        config: &AnimationConfig,
        bytes: &[u8],
    ) -> AnimcheckResult<VerificationReport> {
        let decoded = self.decoder.decode(bytes)?;
        self.verify_decoded(config, &decoded)
    }

    /// Verify an already decoded stream against `config`
    ///
    /// # Errors
    ///
    /// Returns [`AnimcheckError::FrameCountMismatch`] or
    /// [`AnimcheckError::SizeMismatch`] on reconciliation violations, and
    /// propagates traversal and quantizer errors
    pub fn verify_decoded(
        &self,
        config: &AnimationConfig,
        decoded: &DecodedAnimation,
    ) -> AnimcheckResult<VerificationReport> {
        let mode = config.mode();
        let policy = config.size_handling();
        let source_frames = config.frame_count();
        check_frame_count(source_frames, decoded.len(), mode)?;

        let target = decoded.size();
        if policy == SizeHandling::ErrorIfDiffers {
            if let Some(source) = config.source().first_frame_size() {
                resolve_placement(source, target, policy)?;
            }
        }

        for &index in self.released.range(source_frames..) {
            tracing::warn!(index, source_frames, "released index is past the last source frame");
        }

        let quantizer = config.effective_quantizer();
        let ditherer = config.ditherer();
        let mut cursor = config.frames();
        let mut compared_frames = 0;
        let mut skipped_frames = Vec::new();
        let mut mismatches = Vec::new();
        let mut index = 0;

        while let Some(frame) = cursor.advance()? {
            let targets = std::iter::once(index).chain(mirror_index(index, source_frames, mode));
            if self.released.contains(&index) {
                tracing::debug!(index, "skipping released frame");
                skipped_frames.extend(targets);
                index += 1;
                continue;
            }

            let expected = expected_frame(frame, target, policy, quantizer.as_ref(), ditherer)?;
            for decoded_index in targets {
                let actual = decoded.frame(decoded_index).ok_or_else(|| {
                    AnimcheckError::decoding(format!("decoded frame {decoded_index} is missing"))
                })?;
                let comparison = self.comparator.compare(decoded_index, &expected, actual)?;
                compared_frames += 1;
                if !comparison.is_match() {
                    tracing::debug!(
                        frame = decoded_index,
                        pixels = comparison.mismatched_pixels,
                        "frame mismatch"
                    );
                    mismatches.push(comparison);
                }
            }
            index += 1;
        }

        mismatches.sort_by_key(|m| m.frame);
        skipped_frames.sort_unstable();
        let mismatched_pixels = mismatches.iter().map(|m| m.mismatched_pixels).sum();

        let report = VerificationReport {
            format: self.encoder.format().to_string(),
            mode,
            size_handling: policy,
            quantizer: quantizer.name(),
            ditherer: ditherer.map(|d| d.name()),
            stream_size: target,
            source_frames,
            decoded_frames: decoded.len(),
            compared_frames,
            skipped_frames,
            mismatched_pixels,
            mismatches,
        };
        if report.passed() {
            tracing::info!(compared = report.compared_frames, "round trip verified");
        } else {
            tracing::warn!(
                frames = report.mismatches.len(),
                pixels = report.mismatched_pixels,
                "round trip mismatched"
            );
        }
        Ok(report)
    }

    /// Expected stream frame at decoded index `decoded_index`, for diagnostics
    ///
    /// # Errors
    ///
    /// Returns error if the index is out of range for the playback mode, or
    /// propagates placement and quantizer errors
    pub fn expected_at(
        &self,
        config: &AnimationConfig,
        target: FrameSize,
        decoded_index: usize,
    ) -> AnimcheckResult<Frame> {
        let source = source_index(decoded_index, config.frame_count(), config.mode())
            .ok_or_else(|| {
                AnimcheckError::invalid_argument(format!(
                    "decoded index {decoded_index} is out of range"
                ))
            })?;
        let quantizer = config.effective_quantizer();
        let mut cursor = config.frames();
        let mut position = 0;
        while let Some(frame) = cursor.advance()? {
            if position == source {
                return expected_frame(
                    frame,
                    target,
                    config.size_handling(),
                    quantizer.as_ref(),
                    config.ditherer(),
                );
            }
            position += 1;
        }
        Err(AnimcheckError::invalid_argument(format!(
            "source frame {source} was never produced"
        )))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::codec::DecodedFrame;
    use crate::quantize::PredefinedColors;
    use crate::source::FrameList;
    use crate::wipe::WipeAnimation;
    use image::Rgba;
    use std::time::Duration;

    fn ten_frames() -> FrameList {
        let frames = (0..10u8)
            .map(|i| Frame::filled(FrameSize::new(4, 4), Rgba([i * 20, 255 - i * 20, 0, 255])))
            .collect();
        FrameList::uniform(frames, Duration::from_millis(30)).unwrap()
    }

    /// Decoded stream built directly from the expected frames, without a codec
    fn perfect_stream(config: &AnimationConfig) -> DecodedAnimation {
        let verifier = RoundTripVerifier::gif();
        let size = config.stream_size().unwrap();
        let total = crate::reconcile::expected_frame_count(config.frame_count(), config.mode());
        let frames = (0..total)
            .map(|i| DecodedFrame {
                frame: verifier.expected_at(config, size, i).unwrap(),
                delay: Duration::from_millis(30),
            })
            .collect();
        DecodedAnimation::new(size, frames, Some(0))
    }

    mod report_tests {
        use super::*;

        #[test]
        fn test_perfect_stream_passes() {
            let config = AnimationConfig::new(ten_frames())
                .unwrap()
                .with_mode(AnimationMode::PingPong);
            let decoded = perfect_stream(&config);
            let report = RoundTripVerifier::gif().verify_decoded(&config, &decoded).unwrap();
            assert!(report.passed());
            assert_eq!(report.decoded_frames, 18);
            assert_eq!(report.compared_frames, 18);
            assert!(report.clone().into_result().is_ok());
        }

        #[test]
        fn test_frame_count_mismatch_is_fatal() {
            let config = AnimationConfig::new(ten_frames()).unwrap();
            let decoded = perfect_stream(&config);
            let ping_pong = config.clone().with_mode(AnimationMode::PingPong);
            let err = RoundTripVerifier::gif()
                .verify_decoded(&ping_pong, &decoded)
                .unwrap_err();
            assert!(matches!(
                err,
                AnimcheckError::FrameCountMismatch {
                    expected: 18,
                    actual: 10,
                    ..
                }
            ));
        }

        #[test]
        fn test_corrupt_pixel_is_reported_with_coordinates() {
            let config = AnimationConfig::new(ten_frames()).unwrap();
            let decoded = perfect_stream(&config);
            let mut frames = decoded.frames().to_vec();
            frames[4].frame.put_pixel(2, 1, Rgba([1, 2, 3, 255]));
            let corrupted = DecodedAnimation::new(decoded.size(), frames, Some(0));

            let report = RoundTripVerifier::gif().verify_decoded(&config, &corrupted).unwrap();
            assert!(!report.passed());
            assert_eq!(report.first_mismatch(), Some(4));
            let m = report.mismatches[0].mismatches[0];
            assert_eq!((m.frame, m.x, m.y), (4, 2, 1));
            assert!(matches!(
                report.into_result(),
                Err(AnimcheckError::PixelMismatch {
                    mismatched_frames: 1,
                    mismatched_pixels: 1
                })
            ));
        }

        #[test]
        fn test_released_frame_is_skipped() {
            let config = AnimationConfig::new(ten_frames()).unwrap();
            let decoded = perfect_stream(&config);
            let mut frames = decoded.frames().to_vec();
            frames[3].frame.put_pixel(0, 0, Rgba([1, 2, 3, 255]));
            frames[6].frame.put_pixel(0, 0, Rgba([1, 2, 3, 255]));
            let corrupted = DecodedAnimation::new(decoded.size(), frames, Some(0));

            let mut verifier = RoundTripVerifier::gif();
            verifier.mark_released(3);
            let report = verifier.verify_decoded(&config, &corrupted).unwrap();
            assert_eq!(report.skipped_frames, vec![3]);
            assert_eq!(report.compared_frames, 9);
            assert_eq!(report.first_mismatch(), Some(6));
            assert_eq!(report.mismatches.len(), 1);
        }

        #[test]
        fn test_released_frame_skips_its_mirror() {
            let config = AnimationConfig::new(ten_frames())
                .unwrap()
                .with_mode(AnimationMode::PingPong);
            let decoded = perfect_stream(&config);
            let verifier = RoundTripVerifier::gif().with_released([3]);
            let report = verifier.verify_decoded(&config, &decoded).unwrap();
            assert_eq!(report.skipped_frames, vec![3, 15]);
            assert_eq!(report.compared_frames, 16);
        }
    }

    mod round_trip_tests {
        use super::*;

        #[test]
        fn test_wipe_round_trip_passes() {
            let wipe = WipeAnimation::from_gradient(24, 4).unwrap();
            let config = AnimationConfig::new(wipe)
                .unwrap()
                .with_quantizer(PredefinedColors::web_safe(Rgba([0, 0, 0, 255])));
            let run = RoundTripVerifier::gif().run(&config).unwrap();
            assert!(run.report.passed(), "{:?}", run.report.mismatches);
            assert_eq!(run.report.decoded_frames, 8);
            assert_eq!(run.report.format, "gif");
        }

        #[test]
        fn test_error_if_differs_rejects_other_size() {
            let config = AnimationConfig::new(ten_frames())
                .unwrap()
                .with_size(FrameSize::new(8, 8))
                .with_size_handling(SizeHandling::Resize);
            let verifier = RoundTripVerifier::gif();
            let run = verifier.run(&config).unwrap();
            assert!(run.report.passed());

            let strict = config.clone().with_size_handling(SizeHandling::ErrorIfDiffers);
            let err = verifier.verify_stream(&strict, &run.bytes).unwrap_err();
            assert!(err.is_reconciliation());
        }
    }
}
