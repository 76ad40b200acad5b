//! Animation configuration.
//!
//! [`AnimationConfig`] is the immutable bundle handed to an encoder and to the
//! verifier. The frame sequence is exposed as a re-invocable factory
//! ([`AnimationConfig::frames`]) so a verifier can take its own independent
//! traversal after the encoder has consumed one.

use crate::frame::FrameSize;
use crate::quantize::{Ditherer, OptimizedPalette, Quantizer};
use crate::result::{AnimcheckError, AnimcheckResult};
use crate::source::{FrameCursor, FrameSource};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Playback mode of the encoded animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnimationMode {
    /// Frames play once forward, then loop
    #[default]
    Normal,
    /// Frames play forward then backward, without repeating the endpoints
    PingPong,
}

impl AnimationMode {
    /// All modes
    pub const ALL: [Self; 2] = [Self::Normal, Self::PingPong];
}

impl fmt::Display for AnimationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::PingPong => write!(f, "ping-pong"),
        }
    }
}

/// What to do when a source frame's size differs from the stream's frame size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SizeHandling {
    /// Differing sizes are a contract violation
    #[default]
    ErrorIfDiffers,
    /// Scale the source to fill the target exactly
    Resize,
    /// Place the source unscaled in the middle of an empty target
    Center,
}

impl SizeHandling {
    /// All policies
    pub const ALL: [Self; 3] = [Self::ErrorIfDiffers, Self::Resize, Self::Center];
}

impl fmt::Display for SizeHandling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ErrorIfDiffers => write!(f, "error-if-differs"),
            Self::Resize => write!(f, "resize"),
            Self::Center => write!(f, "center"),
        }
    }
}

/// Immutable encoding configuration
#[derive(Debug, Clone)]
pub struct AnimationConfig {
    source: Arc<dyn FrameSource>,
    quantizer: Option<Arc<dyn Quantizer>>,
    ditherer: Option<Arc<dyn Ditherer>>,
    mode: AnimationMode,
    size_handling: SizeHandling,
    size: Option<FrameSize>,
    loop_count: u16,
}

impl AnimationConfig {
    /// Create a configuration over `source` with default settings
    ///
    /// # Errors
    ///
    /// Returns error if `source` yields no frames
    pub fn new(source: impl FrameSource + 'static) -> AnimcheckResult<Self> {
        Self::from_shared(Arc::new(source))
    }

    /// Create a configuration over a shared source
    ///
    /// # Errors
    ///
    /// Returns error if `source` yields no frames
    pub fn from_shared(source: Arc<dyn FrameSource>) -> AnimcheckResult<Self> {
        if source.frame_count() == 0 {
            return Err(AnimcheckError::invalid_argument(
                "animation needs at least one frame",
            ));
        }
        Ok(Self {
            source,
            quantizer: None,
            ditherer: None,
            mode: AnimationMode::default(),
            size_handling: SizeHandling::default(),
            size: None,
            loop_count: 0,
        })
    }

    /// Set the quantizer
    #[must_use]
    pub fn with_quantizer(mut self, quantizer: impl Quantizer + 'static) -> Self {
        self.quantizer = Some(Arc::new(quantizer));
        self
    }

    /// Set the ditherer
    #[must_use]
    pub fn with_ditherer(mut self, ditherer: impl Ditherer + 'static) -> Self {
        self.ditherer = Some(Arc::new(ditherer));
        self
    }

    /// Set or clear the quantizer from a shared handle
    #[must_use]
    pub fn with_shared_quantizer(mut self, quantizer: Option<Arc<dyn Quantizer>>) -> Self {
        self.quantizer = quantizer;
        self
    }

    /// Set or clear the ditherer from a shared handle
    #[must_use]
    pub fn with_shared_ditherer(mut self, ditherer: Option<Arc<dyn Ditherer>>) -> Self {
        self.ditherer = ditherer;
        self
    }

    /// Set the playback mode
    #[must_use]
    pub const fn with_mode(mut self, mode: AnimationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the size-handling policy
    #[must_use]
    pub const fn with_size_handling(mut self, policy: SizeHandling) -> Self {
        self.size_handling = policy;
        self
    }

    /// Set the stream frame size (defaults to the first source frame's size)
    #[must_use]
    pub const fn with_size(mut self, size: FrameSize) -> Self {
        self.size = Some(size);
        self
    }

    /// Set the loop count (0 = forever)
    #[must_use]
    pub const fn with_loop_count(mut self, loop_count: u16) -> Self {
        self.loop_count = loop_count;
        self
    }

    /// Start an independent traversal of the source frames
    #[must_use]
    pub fn frames(&self) -> Box<dyn FrameCursor + '_> {
        self.source.frames()
    }

    /// Per-frame delays for one traversal
    #[must_use]
    pub fn delays(&self) -> Box<dyn Iterator<Item = Duration> + '_> {
        self.source.delays()
    }

    /// Number of source frames
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.source.frame_count()
    }

    /// The frame source factory
    #[must_use]
    pub fn source(&self) -> &Arc<dyn FrameSource> {
        &self.source
    }

    /// Configured quantizer, if any
    #[must_use]
    pub fn quantizer(&self) -> Option<&Arc<dyn Quantizer>> {
        self.quantizer.as_ref()
    }

    /// The quantizer actually used: the configured one or an optimized palette
    #[must_use]
    pub fn effective_quantizer(&self) -> Arc<dyn Quantizer> {
        self.quantizer
            .clone()
            .unwrap_or_else(|| Arc::new(OptimizedPalette::default()))
    }

    /// Configured ditherer, if any
    #[must_use]
    pub fn ditherer(&self) -> Option<&dyn Ditherer> {
        self.ditherer.as_deref()
    }

    /// Playback mode
    #[must_use]
    pub const fn mode(&self) -> AnimationMode {
        self.mode
    }

    /// Size-handling policy
    #[must_use]
    pub const fn size_handling(&self) -> SizeHandling {
        self.size_handling
    }

    /// Explicit stream frame size, if set
    #[must_use]
    pub const fn size(&self) -> Option<FrameSize> {
        self.size
    }

    /// Stream frame size: the explicit size or the first source frame's size
    ///
    /// # Errors
    ///
    /// Returns error if neither is available
    pub fn stream_size(&self) -> AnimcheckResult<FrameSize> {
        self.size
            .or_else(|| self.source.first_frame_size())
            .ok_or_else(|| AnimcheckError::invalid_argument("cannot determine stream frame size"))
    }

    /// Loop count (0 = forever)
    #[must_use]
    pub const fn loop_count(&self) -> u16 {
        self.loop_count
    }
}
