//! Size-handling resolution.
//!
//! The encoder and the verifier both go through [`expected_frame`], so the
//! frame the verifier expects is exactly the frame the encoder was told to
//! write.

use crate::config::SizeHandling;
use crate::frame::{Frame, FrameSize};
use crate::quantize::{reduce, Ditherer, Quantizer};
use crate::result::{AnimcheckError, AnimcheckResult};
use image::imageops::{self, FilterType};

/// How a source frame maps onto the stream frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Sizes already agree
    Identity,
    /// Scale to `target`
    Resize {
        /// Stream frame size
        target: FrameSize,
    },
    /// Place unscaled at `(x, y)` on an empty `target` canvas
    Center {
        /// Stream frame size
        target: FrameSize,
        /// Horizontal offset, negative when the source is wider
        x: i64,
        /// Vertical offset, negative when the source is taller
        y: i64,
    },
}

/// Work out how `source` maps onto `target` under `policy`
///
/// # Errors
///
/// Returns [`AnimcheckError::SizeMismatch`] when sizes differ under
/// [`SizeHandling::ErrorIfDiffers`]
pub fn resolve_placement(
    source: FrameSize,
    target: FrameSize,
    policy: SizeHandling,
) -> AnimcheckResult<Placement> {
    if source == target {
        return Ok(Placement::Identity);
    }
    match policy {
        SizeHandling::ErrorIfDiffers => Err(AnimcheckError::SizeMismatch {
            expected: target,
            actual: source,
        }),
        SizeHandling::Resize => Ok(Placement::Resize { target }),
        SizeHandling::Center => Ok(Placement::Center {
            target,
            x: i64::from(target.width / 2) - i64::from(source.width / 2),
            y: i64::from(target.height / 2) - i64::from(source.height / 2),
        }),
    }
}

/// Apply the size policy to `frame`, producing a frame of size `target`
///
/// # Errors
///
/// Propagates [`resolve_placement`] errors
pub fn place_frame(
    frame: &Frame,
    target: FrameSize,
    policy: SizeHandling,
) -> AnimcheckResult<Frame> {
    let placed = match resolve_placement(frame.size(), target, policy)? {
        Placement::Identity => frame.clone(),
        Placement::Resize { target } => Frame::from(imageops::resize(
            frame.as_image(),
            target.width,
            target.height,
            FilterType::Triangle,
        )),
        Placement::Center { target, x, y } => {
            let mut canvas = Frame::with_size(target);
            imageops::replace(canvas.as_image_mut(), frame.as_image(), x, y);
            canvas
        }
    };
    Ok(placed)
}

/// The frame a decoder must reproduce for `frame`: placed on the stream
/// frame, then color-reduced
///
/// # Errors
///
/// Propagates placement and quantizer errors
pub fn expected_frame(
    frame: &Frame,
    target: FrameSize,
    policy: SizeHandling,
    quantizer: &dyn Quantizer,
    ditherer: Option<&dyn Ditherer>,
) -> AnimcheckResult<Frame> {
    let placed = place_frame(frame, target, policy)?;
    reduce(&placed, quantizer, ditherer)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::frame::TRANSPARENT;
    use crate::quantize::PredefinedColors;
    use image::Rgba;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    mod resolve_tests {
        use super::*;

        #[test]
        fn test_same_size_is_identity_for_every_policy() {
            let size = FrameSize::new(4, 4);
            for policy in SizeHandling::ALL {
                assert_eq!(resolve_placement(size, size, policy).unwrap(), Placement::Identity);
            }
        }

        #[test]
        fn test_error_if_differs() {
            let err = resolve_placement(
                FrameSize::new(4, 4),
                FrameSize::new(8, 4),
                SizeHandling::ErrorIfDiffers,
            )
            .unwrap_err();
            assert!(err.is_reconciliation());
            assert!(err.to_string().contains("8x4"));
        }

        #[test]
        fn test_center_offsets_use_matching_axes() {
            let placement = resolve_placement(
                FrameSize::new(10, 4),
                FrameSize::new(20, 30),
                SizeHandling::Center,
            )
            .unwrap();
            assert_eq!(
                placement,
                Placement::Center {
                    target: FrameSize::new(20, 30),
                    x: 5,
                    y: 13
                }
            );
        }

        #[test]
        fn test_center_offsets_can_be_negative() {
            let placement = resolve_placement(
                FrameSize::new(9, 9),
                FrameSize::new(3, 3),
                SizeHandling::Center,
            )
            .unwrap();
            assert!(matches!(placement, Placement::Center { x: -3, y: -3, .. }));
        }
    }

    mod place_tests {
        use super::*;

        #[test]
        fn test_center_pads_with_transparency() {
            let frame = Frame::filled(FrameSize::new(2, 2), RED);
            let placed = place_frame(&frame, FrameSize::new(6, 4), SizeHandling::Center).unwrap();
            assert_eq!(placed.size(), FrameSize::new(6, 4));
            assert_eq!(placed.pixel(0, 0), TRANSPARENT);
            assert_eq!(placed.pixel(2, 1), RED);
            assert_eq!(placed.pixel(3, 2), RED);
            assert_eq!(placed.pixel(4, 2), TRANSPARENT);
        }

        #[test]
        fn test_center_crops_larger_source() {
            let frame = Frame::filled(FrameSize::new(8, 8), RED);
            let placed = place_frame(&frame, FrameSize::new(2, 2), SizeHandling::Center).unwrap();
            assert!(placed.as_image().pixels().all(|p| *p == RED));
        }

        #[test]
        fn test_resize_fills_target() {
            let frame = Frame::filled(FrameSize::new(3, 3), RED);
            let placed = place_frame(&frame, FrameSize::new(7, 5), SizeHandling::Resize).unwrap();
            assert_eq!(placed.size(), FrameSize::new(7, 5));
            assert!(placed.as_image().pixels().all(|p| *p == RED));
        }

        #[test]
        fn test_expected_frame_is_deterministic() {
            let frame = crate::gradient::generate_alpha_gradient(12, 6).unwrap();
            let q = PredefinedColors::web_safe(Rgba([0, 0, 0, 255]));
            let a = expected_frame(&frame, FrameSize::new(20, 9), SizeHandling::Resize, &q, None)
                .unwrap();
            let b = expected_frame(&frame, FrameSize::new(20, 9), SizeHandling::Resize, &q, None)
                .unwrap();
            assert_eq!(a, b);
            assert_eq!(a.size(), FrameSize::new(20, 9));
        }
    }
}
