//! Encoder and decoder collaborators.
//!
//! The verifier only sees the [`AnimationEncoder`] and [`AnimationDecoder`]
//! traits. [`GifEncoder`] and [`GifDecoder`] are the bundled implementations.

mod gif_decoder;
mod gif_encoder;

pub use gif_decoder::GifDecoder;
pub use gif_encoder::GifEncoder;

use crate::config::AnimationConfig;
use crate::frame::{Frame, FrameSize};
use crate::result::AnimcheckResult;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Turns a configured frame sequence into a byte stream
pub trait AnimationEncoder {
    /// Short format name, e.g. `"gif"`
    fn format(&self) -> &'static str;

    /// File extension for saved streams
    fn extension(&self) -> &'static str {
        self.format()
    }

    /// Encode `config` in a single forward traversal of its frames
    ///
    /// # Errors
    ///
    /// Returns error if the configuration cannot be encoded
    fn encode(&self, config: &AnimationConfig) -> AnimcheckResult<Vec<u8>>;
}

/// Turns a byte stream back into owned frames
pub trait AnimationDecoder {
    /// Decode every frame
    ///
    /// # Errors
    ///
    /// Returns error if the stream is malformed
    fn decode(&self, bytes: &[u8]) -> AnimcheckResult<DecodedAnimation>;

    /// Read only the stream metadata
    ///
    /// # Errors
    ///
    /// Returns error if the stream is malformed
    fn probe(&self, bytes: &[u8]) -> AnimcheckResult<StreamInfo>;
}

/// Stream metadata available without a full decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamInfo {
    /// Declared frame size
    pub size: FrameSize,
    /// Number of frames in the stream
    pub frame_count: usize,
}

/// One decoded frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    /// Full-size frame pixels
    pub frame: Frame,
    /// Display delay
    pub delay: Duration,
}

/// A fully decoded animation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAnimation {
    size: FrameSize,
    frames: Vec<DecodedFrame>,
    loop_count: Option<u16>,
}

impl DecodedAnimation {
    /// Create a decoded animation
    #[must_use]
    pub const fn new(size: FrameSize, frames: Vec<DecodedFrame>, loop_count: Option<u16>) -> Self {
        Self {
            size,
            frames,
            loop_count,
        }
    }

    /// Declared frame size
    #[must_use]
    pub const fn size(&self) -> FrameSize {
        self.size
    }

    /// Number of frames
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether there are no frames
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Decoded frames in stream order
    #[must_use]
    pub fn frames(&self) -> &[DecodedFrame] {
        &self.frames
    }

    /// Frame pixels at `index`
    #[must_use]
    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index).map(|f| &f.frame)
    }

    /// Loop count: `Some(0)` loops forever, `None` plays once
    #[must_use]
    pub const fn loop_count(&self) -> Option<u16> {
        self.loop_count
    }

    /// Stream metadata
    #[must_use]
    pub fn info(&self) -> StreamInfo {
        StreamInfo {
            size: self.size,
            frame_count: self.frames.len(),
        }
    }
}

/// Convert a duration to GIF centiseconds, truncating and saturating
#[must_use]
pub fn delay_to_centis(delay: Duration) -> u16 {
    u16::try_from(delay.as_millis() / 10).unwrap_or(u16::MAX)
}
