//! Lazy, restartable frame sequences.
//!
//! A [`FrameSource`] is a factory: every call to [`FrameSource::frames`] starts
//! an independent traversal with its own canvas. A [`FrameCursor`] is one such
//! traversal. It lends out a view of its current frame that stays valid only
//! until the next [`FrameCursor::advance`]; the borrow checker enforces this, and
//! `Frame::clone` is the escape hatch for keeping a snapshot.

use crate::frame::{Frame, FrameSize};
use crate::result::{AnimcheckError, AnimcheckResult};
use std::fmt;
use std::time::Duration;

/// One traversal of a frame sequence
pub trait FrameCursor {
    /// Step to the next frame and borrow it
    ///
    /// # Errors
    ///
    /// Returns error if producing the frame fails
    fn advance(&mut self) -> AnimcheckResult<Option<&Frame>>;

    /// Total number of frames this traversal yields
    fn len(&self) -> usize;

    /// Number of frames yielded so far
    fn position(&self) -> usize;

    /// Whether the traversal yields no frames at all
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A re-invocable factory of frame and delay sequences
pub trait FrameSource: fmt::Debug + Send + Sync {
    /// Start a new, independent traversal
    fn frames(&self) -> Box<dyn FrameCursor + '_>;

    /// Per-frame display delays for one traversal
    fn delays(&self) -> Box<dyn Iterator<Item = Duration> + '_>;

    /// Number of frames a traversal yields
    fn frame_count(&self) -> usize;

    /// Size of the first frame, if any
    fn first_frame_size(&self) -> Option<FrameSize>;
}

/// Owned frames with explicit delays.
///
/// Useful for inputs whose frames differ in size, and for snapshotting a
/// traversal with [`FrameList::collect_from`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameList {
    frames: Vec<Frame>,
    delays: Vec<Duration>,
}

impl FrameList {
    /// Create a list
    ///
    /// # Errors
    ///
    /// Returns error if there are no frames or the delay count differs from the frame count
    pub fn new(frames: Vec<Frame>, delays: Vec<Duration>) -> AnimcheckResult<Self> {
        if frames.is_empty() {
            return Err(AnimcheckError::invalid_argument("frame list is empty"));
        }
        if frames.len() != delays.len() {
            return Err(AnimcheckError::invalid_argument(format!(
                "{} frames but {} delays",
                frames.len(),
                delays.len()
            )));
        }
        Ok(Self { frames, delays })
    }

    /// Create a list where every frame shows for `delay`
    ///
    /// # Errors
    ///
    /// Returns error if there are no frames
    pub fn uniform(frames: Vec<Frame>, delay: Duration) -> AnimcheckResult<Self> {
        let delays = vec![delay; frames.len()];
        Self::new(frames, delays)
    }

    /// Snapshot every frame of one traversal of `source`
    ///
    /// # Errors
    ///
    /// Propagates cursor errors and list validation errors
    pub fn collect_from(source: &dyn FrameSource) -> AnimcheckResult<Self> {
        let mut cursor = source.frames();
        let mut frames = Vec::with_capacity(cursor.len());
        while let Some(frame) = cursor.advance()? {
            frames.push(frame.clone());
        }
        Self::new(frames, source.delays().collect())
    }

    /// Owned frames
    #[must_use]
    pub fn as_slice(&self) -> &[Frame] {
        &self.frames
    }
}

impl FrameSource for FrameList {
    fn frames(&self) -> Box<dyn FrameCursor + '_> {
        Box::new(ListCursor {
            frames: &self.frames,
            position: 0,
        })
    }

    fn delays(&self) -> Box<dyn Iterator<Item = Duration> + '_> {
        Box::new(self.delays.iter().copied())
    }

    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn first_frame_size(&self) -> Option<FrameSize> {
        self.frames.first().map(Frame::size)
    }
}

struct ListCursor<'a> {
    frames: &'a [Frame],
    position: usize,
}

impl FrameCursor for ListCursor<'_> {
    fn advance(&mut self) -> AnimcheckResult<Option<&Frame>> {
        let frame = self.frames.get(self.position);
        if frame.is_some() {
            self.position += 1;
        }
        Ok(frame)
    }

    fn len(&self) -> usize {
        self.frames.len()
    }

    fn position(&self) -> usize {
        self.position
    }
}
