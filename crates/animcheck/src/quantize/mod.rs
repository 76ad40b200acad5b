//! Color reduction capabilities.
//!
//! A [`Quantizer`] inspects a frame and produces a [`ColorMapper`]: an alpha
//! threshold, a background color for blending partially transparent pixels, and
//! an optional [`Palette`]. A [`Ditherer`] spreads the mapping error over
//! neighbouring pixels. [`reduce`] is the single entry point shared by the
//! encoder and the verifier, so both sides of a round trip reduce identically.

mod dither;
mod optimized;
mod predefined;

pub use dither::{ErrorDiffusion, OrderedDither};
pub use optimized::OptimizedPalette;
pub use predefined::{PredefinedColors, PredefinedKind};

use crate::frame::{Frame, TRANSPARENT};
use crate::result::{AnimcheckError, AnimcheckResult};
use image::imageops::ColorMap;
use image::Rgba;
use std::collections::HashMap;
use std::fmt;

/// Maximum opaque palette entries; one GIF slot stays reserved for transparency.
pub const MAX_PALETTE_COLORS: usize = 255;

/// Default alpha threshold: pixels below it become fully transparent.
pub const DEFAULT_ALPHA_THRESHOLD: u8 = 128;

/// An ordered set of opaque colors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgba<u8>>,
}

impl Palette {
    /// Create a palette. Alpha of every entry is forced to 255.
    ///
    /// # Errors
    ///
    /// Returns error if `colors` is empty or has more than [`MAX_PALETTE_COLORS`] entries
    pub fn new(colors: Vec<Rgba<u8>>) -> AnimcheckResult<Self> {
        if colors.is_empty() || colors.len() > MAX_PALETTE_COLORS {
            return Err(AnimcheckError::invalid_argument(format!(
                "palette must have 1..={MAX_PALETTE_COLORS} colors, got {}",
                colors.len()
            )));
        }
        let colors = colors
            .into_iter()
            .map(|Rgba([r, g, b, _])| Rgba([r, g, b, 255]))
            .collect();
        Ok(Self { colors })
    }

    /// Palette entries
    #[must_use]
    pub fn colors(&self) -> &[Rgba<u8>] {
        &self.colors
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false; a palette has at least one entry
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Index of the closest entry by squared RGB distance; the lowest index wins ties
    #[must_use]
    pub fn nearest_index(&self, color: Rgba<u8>) -> usize {
        let mut best = 0;
        let mut best_distance = u32::MAX;
        for (i, entry) in self.colors.iter().enumerate() {
            let distance = rgb_distance(*entry, color);
            if distance < best_distance {
                best = i;
                best_distance = distance;
                if distance == 0 {
                    break;
                }
            }
        }
        best
    }

    /// Closest entry
    #[must_use]
    pub fn nearest(&self, color: Rgba<u8>) -> Rgba<u8> {
        self.colors[self.nearest_index(color)]
    }
}

fn rgb_distance(a: Rgba<u8>, b: Rgba<u8>) -> u32 {
    a.0[..3]
        .iter()
        .zip(&b.0[..3])
        .map(|(&x, &y)| {
            let d = i32::from(x) - i32::from(y);
            d.unsigned_abs() * d.unsigned_abs()
        })
        .sum()
}

/// Blend a straight-alpha color over an opaque background
#[must_use]
pub fn blend_over(color: Rgba<u8>, background: Rgba<u8>) -> Rgba<u8> {
    let Rgba([r, g, b, a]) = color;
    if a == 255 {
        return color;
    }
    let a = u16::from(a);
    let inv = 255 - a;
    let mix = |c: u8, bg: u8| (mul_div255(u16::from(c), a) + mul_div255(u16::from(bg), inv)).min(255) as u8;
    Rgba([
        mix(r, background[0]),
        mix(g, background[1]),
        mix(b, background[2]),
        255,
    ])
}

fn mul_div255(x: u16, y: u16) -> u16 {
    ((u32::from(x) * u32::from(y) + 127) / 255) as u16
}

/// Per-pixel color mapping produced by a [`Quantizer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorMapper {
    background: Rgba<u8>,
    alpha_threshold: u8,
    palette: Option<Palette>,
}

impl ColorMapper {
    /// True-color mapping: threshold alpha, blend the rest over `background`
    #[must_use]
    pub const fn direct(background: Rgba<u8>, alpha_threshold: u8) -> Self {
        Self {
            background,
            alpha_threshold,
            palette: None,
        }
    }

    /// Indexed mapping onto `palette`
    #[must_use]
    pub const fn with_palette(palette: Palette, background: Rgba<u8>, alpha_threshold: u8) -> Self {
        Self {
            background,
            alpha_threshold,
            palette: Some(palette),
        }
    }

    /// The palette, if this mapping is indexed
    #[must_use]
    pub const fn palette(&self) -> Option<&Palette> {
        self.palette.as_ref()
    }

    /// Background used for blending
    #[must_use]
    pub const fn background(&self) -> Rgba<u8> {
        self.background
    }

    /// Alpha threshold
    #[must_use]
    pub const fn alpha_threshold(&self) -> u8 {
        self.alpha_threshold
    }

    /// Map one color
    #[must_use]
    pub fn map(&self, color: Rgba<u8>) -> Rgba<u8> {
        if color[3] < self.alpha_threshold {
            return TRANSPARENT;
        }
        let opaque = blend_over(color, self.background);
        match &self.palette {
            Some(palette) => palette.nearest(opaque),
            None => opaque,
        }
    }

    /// Map every pixel of `frame` into a new frame
    #[must_use]
    pub fn apply(&self, frame: &Frame) -> Frame {
        let mut cache: HashMap<[u8; 4], Rgba<u8>> = HashMap::new();
        let mut out = frame.clone();
        for px in out.as_image_mut().pixels_mut() {
            *px = *cache.entry(px.0).or_insert_with(|| self.map(*px));
        }
        out
    }
}

impl ColorMap for ColorMapper {
    type Color = Rgba<u8>;

    fn index_of(&self, color: &Rgba<u8>) -> usize {
        match &self.palette {
            Some(palette) if color[3] >= self.alpha_threshold => {
                palette.nearest_index(blend_over(*color, self.background))
            }
            Some(palette) => palette.len(),
            None => 0,
        }
    }

    fn map_color(&self, color: &mut Rgba<u8>) {
        *color = self.map(*color);
    }
}

/// A color quantization strategy
pub trait Quantizer: fmt::Debug + Send + Sync {
    /// Short human-readable name
    fn name(&self) -> String;

    /// Build the color mapping for `frame`
    ///
    /// # Errors
    ///
    /// Returns error if no mapping can be derived for the frame
    fn color_map(&self, frame: &Frame) -> AnimcheckResult<ColorMapper>;

    /// Reduce `frame` without dithering
    ///
    /// # Errors
    ///
    /// Propagates [`Quantizer::color_map`] errors
    fn reduce(&self, frame: &Frame) -> AnimcheckResult<Frame> {
        Ok(self.color_map(frame)?.apply(frame))
    }
}

/// A dithering strategy composed with a quantizer
pub trait Ditherer: fmt::Debug + Send + Sync {
    /// Short human-readable name
    fn name(&self) -> String;

    /// Reduce `frame` through `mapper`, diffusing the error
    fn dither(&self, frame: &Frame, mapper: &ColorMapper) -> Frame;

    /// Reduce `frame` with the mapping `quantizer` derives for it
    ///
    /// # Errors
    ///
    /// Propagates [`Quantizer::color_map`] errors
    fn reduce_with_dither(
        &self,
        frame: &Frame,
        quantizer: &dyn Quantizer,
    ) -> AnimcheckResult<Frame> {
        let mapper = quantizer.color_map(frame)?;
        Ok(self.dither(frame, &mapper))
    }
}

/// Reduce `frame` with `quantizer`, dithering when a ditherer is given
///
/// # Errors
///
/// Propagates quantizer errors
pub fn reduce(
    frame: &Frame,
    quantizer: &dyn Quantizer,
    ditherer: Option<&dyn Ditherer>,
) -> AnimcheckResult<Frame> {
    match ditherer {
        Some(ditherer) => ditherer.reduce_with_dither(frame, quantizer),
        None => quantizer.reduce(frame),
    }
}
