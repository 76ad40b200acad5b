//! The "wipe" animation: a W×H image revealed and then concealed inside a
//! W×2H canvas, one source row per frame.
//!
//! Only one canvas exists per traversal. Each step copies a single row into it
//! and lends the canvas out until the next step, so memory use is independent
//! of the number of frames.

use crate::frame::{Frame, FrameSize};
use crate::gradient::generate_alpha_gradient;
use crate::quantize::{ColorMapper, PredefinedColors};
use crate::result::{AnimcheckError, AnimcheckResult};
use crate::source::{FrameCursor, FrameSource};
use image::Rgba;
use std::time::Duration;

/// Default delay between wipe steps
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(20);

/// Default delay on the final frame
pub const DEFAULT_HOLD_DELAY: Duration = Duration::from_secs(3);

/// Reveal/conceal wipe over a static base image
#[derive(Debug, Clone)]
pub struct WipeAnimation {
    base: Frame,
    step_delay: Duration,
    hold_delay: Duration,
    reveal: Option<ColorMapper>,
    conceal: Option<ColorMapper>,
}

impl WipeAnimation {
    /// Create a wipe over `base`.
    ///
    /// The reveal phase reduces rows through true color over white and the
    /// conceal phase through true color over black.
    ///
    /// # Errors
    ///
    /// Returns error if `base` has a zero dimension or is too tall to double
    pub fn new(base: Frame) -> AnimcheckResult<Self> {
        if base.size().is_empty() {
            return Err(AnimcheckError::invalid_argument(format!(
                "wipe base must be non-empty, got {}",
                base.size()
            )));
        }
        if base.height().checked_mul(2).is_none() {
            return Err(AnimcheckError::invalid_argument(format!(
                "wipe base too tall: {}",
                base.height()
            )));
        }
        Ok(Self {
            base,
            step_delay: DEFAULT_STEP_DELAY,
            hold_delay: DEFAULT_HOLD_DELAY,
            reveal: Some(PredefinedColors::rgb888(Rgba([255, 255, 255, 255])).mapper()?),
            conceal: Some(PredefinedColors::rgb888(Rgba([0, 0, 0, 255])).mapper()?),
        })
    }

    /// Create a wipe over a freshly generated alpha gradient
    ///
    /// # Errors
    ///
    /// Returns error if either dimension is zero
    pub fn from_gradient(width: u32, height: u32) -> AnimcheckResult<Self> {
        Self::new(generate_alpha_gradient(width, height)?)
    }

    /// Set the per-step and final hold delays
    ///
    /// # Errors
    ///
    /// Returns error unless `hold` is strictly longer than `step`
    pub fn with_delays(mut self, step: Duration, hold: Duration) -> AnimcheckResult<Self> {
        if hold <= step {
            return Err(AnimcheckError::invalid_argument(format!(
                "hold delay ({hold:?}) must be longer than step delay ({step:?})"
            )));
        }
        self.step_delay = step;
        self.hold_delay = hold;
        Ok(self)
    }

    /// Replace the per-phase row reduction; `None` copies rows untouched
    #[must_use]
    pub fn with_phase_mappers(
        mut self,
        reveal: Option<ColorMapper>,
        conceal: Option<ColorMapper>,
    ) -> Self {
        self.reveal = reveal;
        self.conceal = conceal;
        self
    }

    /// Copy rows without any reduction
    #[must_use]
    pub fn without_phase_reduction(self) -> Self {
        self.with_phase_mappers(None, None)
    }

    /// The static base image
    #[must_use]
    pub const fn base(&self) -> &Frame {
        &self.base
    }

    /// Canvas size (W×2H)
    #[must_use]
    pub fn canvas_size(&self) -> FrameSize {
        FrameSize::new(self.base.width(), self.base.height() * 2)
    }

    /// Delay between steps
    #[must_use]
    pub const fn step_delay(&self) -> Duration {
        self.step_delay
    }

    /// Delay on the final frame
    #[must_use]
    pub const fn hold_delay(&self) -> Duration {
        self.hold_delay
    }

    /// Source row, canvas row and row mapper for step `step`
    fn plan(&self, step: u32) -> (u32, u32, Option<&ColorMapper>) {
        let h = self.base.height();
        if step < h {
            let y = h - 1 - step;
            (y, h - y, self.reveal.as_ref())
        } else {
            let y = step - h;
            (y, y + h, self.conceal.as_ref())
        }
    }
}

impl FrameSource for WipeAnimation {
    fn frames(&self) -> Box<dyn FrameCursor + '_> {
        Box::new(WipeCursor {
            wipe: self,
            canvas: Frame::with_size(self.canvas_size()),
            step: 0,
        })
    }

    fn delays(&self) -> Box<dyn Iterator<Item = Duration> + '_> {
        let steps = self.frame_count().saturating_sub(1);
        Box::new(
            std::iter::repeat(self.step_delay)
                .take(steps)
                .chain(std::iter::once(self.hold_delay)),
        )
    }

    fn frame_count(&self) -> usize {
        self.base.height() as usize * 2
    }

    fn first_frame_size(&self) -> Option<FrameSize> {
        Some(self.canvas_size())
    }
}

struct WipeCursor<'a> {
    wipe: &'a WipeAnimation,
    canvas: Frame,
    step: usize,
}

impl FrameCursor for WipeCursor<'_> {
    fn advance(&mut self) -> AnimcheckResult<Option<&Frame>> {
        if self.step >= self.len() {
            return Ok(None);
        }
        let step = u32::try_from(self.step)
            .map_err(|_| AnimcheckError::invalid_argument("wipe step out of range"))?;
        let wipe = self.wipe;
        let (source_y, dest_y, mapper) = wipe.plan(step);
        self.canvas
            .copy_row_from(&wipe.base, source_y, dest_y, mapper)?;
        self.step += 1;
        tracing::trace!(step, source_y, dest_y, "wipe step");
        Ok(Some(&self.canvas))
    }

    fn len(&self) -> usize {
        self.wipe.frame_count()
    }

    fn position(&self) -> usize {
        self.step
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::frame::TRANSPARENT;
    use crate::source::FrameList;
    use proptest::prelude::*;

    mod construction_tests {
        use super::*;

        #[test]
        fn test_rejects_empty_base() {
            assert!(WipeAnimation::new(Frame::new(0, 3)).is_err());
            assert!(WipeAnimation::from_gradient(6, 0).is_err());
        }

        #[test]
        fn test_hold_must_exceed_step() {
            let wipe = WipeAnimation::from_gradient(6, 2).unwrap();
            assert!(wipe
                .clone()
                .with_delays(Duration::from_millis(50), Duration::from_millis(50))
                .is_err());
            let wipe = wipe
                .with_delays(Duration::from_millis(10), Duration::from_millis(500))
                .unwrap();
            assert_eq!(wipe.step_delay(), Duration::from_millis(10));
            assert_eq!(wipe.hold_delay(), Duration::from_millis(500));
        }

        #[test]
        fn test_canvas_is_double_height() {
            let wipe = WipeAnimation::from_gradient(12, 5).unwrap();
            assert_eq!(wipe.canvas_size(), FrameSize::new(12, 10));
            assert_eq!(wipe.first_frame_size(), Some(FrameSize::new(12, 10)));
        }
    }

    mod traversal_tests {
        use super::*;

        #[test]
        fn test_reveal_then_conceal_rows() {
            let wipe = WipeAnimation::from_gradient(6, 3)
                .unwrap()
                .without_phase_reduction();
            let base = wipe.base().clone();
            let mut cursor = wipe.frames();

            // Reveal: source row 2 lands on canvas row 1.
            let frame = cursor.advance().unwrap().unwrap();
            assert_eq!(frame.row(1), base.row(2));
            assert!(frame.row(0).iter().all(|b| *b == 0));

            cursor.advance().unwrap();
            let frame = cursor.advance().unwrap().unwrap();
            assert_eq!(frame.row(3), base.row(0));
            assert_eq!(frame.row(2), base.row(1));

            // Conceal: source row 0 lands on canvas row 3, then row 1 on 4.
            cursor.advance().unwrap();
            let frame = cursor.advance().unwrap().unwrap();
            assert_eq!(frame.row(4), base.row(1));
            let frame = cursor.advance().unwrap().unwrap();
            assert_eq!(frame.row(5), base.row(2));
            assert!(cursor.advance().unwrap().is_none());
            assert_eq!(cursor.position(), 6);
        }

        #[test]
        fn test_row_zero_stays_transparent() {
            let wipe = WipeAnimation::from_gradient(6, 4).unwrap();
            let last = FrameList::collect_from(&wipe).unwrap();
            let final_frame = last.as_slice().last().unwrap();
            for x in 0..6 {
                assert_eq!(final_frame.pixel(x, 0), TRANSPARENT);
            }
        }

        #[test]
        fn test_phase_mappers_flatten_alpha() {
            let wipe = WipeAnimation::from_gradient(6, 2).unwrap();
            let mut cursor = wipe.frames();
            // Reveal copies the faded row 1 over white.
            let frame = cursor.advance().unwrap().unwrap();
            assert!(frame.row(1).chunks_exact(4).all(|p| p[3] == 255 || p[3] == 0));
        }

        #[test]
        fn test_traversals_are_independent() {
            let wipe = WipeAnimation::from_gradient(18, 6).unwrap();
            let mut a = wipe.frames();
            let mut b = wipe.frames();
            for _ in 0..wipe.frame_count() {
                let fa = a.advance().unwrap().unwrap().clone();
                let fb = b.advance().unwrap().unwrap();
                assert_eq!(&fa, fb);
            }
        }

        #[test]
        fn test_delays_hold_on_last_frame() {
            let wipe = WipeAnimation::from_gradient(6, 3).unwrap();
            let delays: Vec<Duration> = wipe.delays().collect();
            assert_eq!(delays.len(), 6);
            assert!(delays[..5].iter().all(|d| *d == DEFAULT_STEP_DELAY));
            assert_eq!(delays[5], DEFAULT_HOLD_DELAY);
        }
    }

    proptest! {
        #[test]
        fn prop_length_and_delays(w in 1u32..24, h in 2u32..24) {
            let wipe = WipeAnimation::from_gradient(w, h).unwrap();
            let frames = FrameList::collect_from(&wipe).unwrap();
            prop_assert_eq!(frames.as_slice().len(), 2 * h as usize);
            let delays: Vec<Duration> = wipe.delays().collect();
            prop_assert_eq!(delays.len(), 2 * h as usize);
            let last = delays[delays.len() - 1];
            prop_assert!(delays[..delays.len() - 1].iter().all(|d| *d < last));
        }

        #[test]
        fn prop_restartable(w in 1u32..16, h in 1u32..12) {
            let wipe = WipeAnimation::from_gradient(w, h).unwrap();
            let first = FrameList::collect_from(&wipe).unwrap();
            let second = FrameList::collect_from(&wipe).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
