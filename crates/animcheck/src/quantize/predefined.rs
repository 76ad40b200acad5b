//! Quantizers with a fixed, content-independent palette.

use super::{ColorMapper, Palette, Quantizer, DEFAULT_ALPHA_THRESHOLD};
use crate::frame::Frame;
use crate::result::AnimcheckResult;
use image::Rgba;

/// Which fixed color set a [`PredefinedColors`] quantizer maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredefinedKind {
    /// 24-bit true color; only alpha is reduced (no palette)
    Rgb888,
    /// The 216-color web-safe cube
    WebSafe,
    /// 16 evenly spaced gray levels
    Grayscale16,
    /// Black and white
    BlackAndWhite,
}

impl PredefinedKind {
    fn palette(self) -> Option<Vec<Rgba<u8>>> {
        match self {
            Self::Rgb888 => None,
            Self::WebSafe => {
                let levels = [0u8, 51, 102, 153, 204, 255];
                let mut colors = Vec::with_capacity(216);
                for r in levels {
                    for g in levels {
                        for b in levels {
                            colors.push(Rgba([r, g, b, 255]));
                        }
                    }
                }
                Some(colors)
            }
            Self::Grayscale16 => Some((0..16u8).map(|i| Rgba([i * 17, i * 17, i * 17, 255])).collect()),
            Self::BlackAndWhite => Some(vec![Rgba([0, 0, 0, 255]), Rgba([255, 255, 255, 255])]),
        }
    }
}

/// A fixed-palette quantizer.
///
/// Pixels with alpha below the threshold become transparent; the rest are
/// blended over the background color before being snapped to the palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredefinedColors {
    kind: PredefinedKind,
    background: Rgba<u8>,
    alpha_threshold: u8,
}

impl PredefinedColors {
    /// Create a quantizer of the given kind
    #[must_use]
    pub const fn new(kind: PredefinedKind, background: Rgba<u8>) -> Self {
        Self {
            kind,
            background,
            alpha_threshold: DEFAULT_ALPHA_THRESHOLD,
        }
    }

    /// True color blended over `background`
    #[must_use]
    pub const fn rgb888(background: Rgba<u8>) -> Self {
        Self::new(PredefinedKind::Rgb888, background)
    }

    /// Web-safe 216 colors
    #[must_use]
    pub const fn web_safe(background: Rgba<u8>) -> Self {
        Self::new(PredefinedKind::WebSafe, background)
    }

    /// 16 gray levels
    #[must_use]
    pub const fn grayscale(background: Rgba<u8>) -> Self {
        Self::new(PredefinedKind::Grayscale16, background)
    }

    /// Black and white
    #[must_use]
    pub const fn black_and_white(background: Rgba<u8>) -> Self {
        Self::new(PredefinedKind::BlackAndWhite, background)
    }

    /// Set the alpha threshold (0 disables transparency)
    #[must_use]
    pub const fn with_alpha_threshold(mut self, threshold: u8) -> Self {
        self.alpha_threshold = threshold;
        self
    }

    /// Palette kind
    #[must_use]
    pub const fn kind(&self) -> PredefinedKind {
        self.kind
    }

    /// Build the mapper without looking at any frame
    ///
    /// # Errors
    ///
    /// Never fails for the built-in kinds; kept fallible to match [`Quantizer::color_map`]
    pub fn mapper(&self) -> AnimcheckResult<ColorMapper> {
        Ok(match self.kind.palette() {
            Some(colors) => {
                ColorMapper::with_palette(Palette::new(colors)?, self.background, self.alpha_threshold)
            }
            None => ColorMapper::direct(self.background, self.alpha_threshold),
        })
    }
}

impl Quantizer for PredefinedColors {
    fn name(&self) -> String {
        let kind = match self.kind {
            PredefinedKind::Rgb888 => "rgb888",
            PredefinedKind::WebSafe => "web-safe",
            PredefinedKind::Grayscale16 => "grayscale16",
            PredefinedKind::BlackAndWhite => "black-and-white",
        };
        let [r, g, b, _] = self.background.0;
        format!("{kind}(#{r:02x}{g:02x}{b:02x})")
    }

    fn color_map(&self, _frame: &Frame) -> AnimcheckResult<ColorMapper> {
        self.mapper()
    }
}
