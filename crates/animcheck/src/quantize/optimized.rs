//! Content-adaptive palettes.
//!
//! Frames that already fit in the palette get an exact palette of their own
//! colors. Everything else is trained with NeuQuant from the `color_quant`
//! crate, which is deterministic for a given input.

use super::{
    blend_over, ColorMapper, Palette, Quantizer, DEFAULT_ALPHA_THRESHOLD, MAX_PALETTE_COLORS,
};
use crate::frame::Frame;
use crate::result::{AnimcheckError, AnimcheckResult};
use color_quant::NeuQuant;
use image::Rgba;
use std::collections::BTreeSet;

/// NeuQuant misbehaves with very small networks.
const MIN_NEUQUANT_COLORS: usize = 16;

/// Optimized palette quantizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizedPalette {
    max_colors: usize,
    sample_factor: i32,
    background: Rgba<u8>,
    alpha_threshold: u8,
}

impl Default for OptimizedPalette {
    fn default() -> Self {
        Self {
            max_colors: MAX_PALETTE_COLORS,
            sample_factor: 10,
            background: Rgba([0, 0, 0, 255]),
            alpha_threshold: DEFAULT_ALPHA_THRESHOLD,
        }
    }
}

impl OptimizedPalette {
    /// Create a quantizer limited to `max_colors` opaque colors
    ///
    /// # Errors
    ///
    /// Returns error if `max_colors` is outside `2..=255`
    pub fn new(max_colors: usize) -> AnimcheckResult<Self> {
        if !(2..=MAX_PALETTE_COLORS).contains(&max_colors) {
            return Err(AnimcheckError::invalid_argument(format!(
                "optimized palette needs 2..={MAX_PALETTE_COLORS} colors, got {max_colors}"
            )));
        }
        Ok(Self {
            max_colors,
            ..Self::default()
        })
    }

    /// NeuQuant sampling factor (1 = every pixel, 30 = fastest)
    #[must_use]
    pub fn with_sample_factor(mut self, factor: i32) -> Self {
        self.sample_factor = factor.clamp(1, 30);
        self
    }

    /// Background used to flatten partially transparent pixels
    #[must_use]
    pub const fn with_background(mut self, background: Rgba<u8>) -> Self {
        self.background = background;
        self
    }

    /// Alpha threshold (0 disables transparency)
    #[must_use]
    pub const fn with_alpha_threshold(mut self, threshold: u8) -> Self {
        self.alpha_threshold = threshold;
        self
    }

    /// Maximum opaque colors
    #[must_use]
    pub const fn max_colors(&self) -> usize {
        self.max_colors
    }

    fn opaque_pixels(&self, frame: &Frame) -> Vec<Rgba<u8>> {
        frame
            .as_image()
            .pixels()
            .filter(|p| p[3] >= self.alpha_threshold)
            .map(|p| blend_over(*p, self.background))
            .collect()
    }

    fn train(&self, pixels: &[Rgba<u8>]) -> Vec<Rgba<u8>> {
        let colors = self.max_colors.max(MIN_NEUQUANT_COLORS).min(MAX_PALETTE_COLORS);
        let bytes: Vec<u8> = pixels.iter().flat_map(|p| p.0).collect();
        let nq = NeuQuant::new(self.sample_factor, colors, &bytes);

        let mut seen = BTreeSet::new();
        let mut palette = Vec::with_capacity(colors);
        for chunk in nq.color_map_rgba().chunks_exact(4) {
            let color = [chunk[0], chunk[1], chunk[2]];
            if seen.insert(color) {
                palette.push(Rgba([color[0], color[1], color[2], 255]));
            }
        }
        palette.truncate(self.max_colors);
        palette
    }
}

impl Quantizer for OptimizedPalette {
    fn name(&self) -> String {
        format!("optimized({})", self.max_colors)
    }

    fn color_map(&self, frame: &Frame) -> AnimcheckResult<ColorMapper> {
        let pixels = self.opaque_pixels(frame);
        let distinct: BTreeSet<[u8; 4]> = pixels.iter().map(|p| p.0).collect();

        let colors = if distinct.is_empty() {
            // Fully transparent frame; any single entry will do.
            vec![self.background]
        } else if distinct.len() <= self.max_colors {
            distinct.into_iter().map(Rgba).collect()
        } else {
            self.train(&pixels)
        };

        tracing::trace!(
            quantizer = %self.name(),
            palette = colors.len(),
            "built optimized palette"
        );
        Ok(ColorMapper::with_palette(
            Palette::new(colors)?,
            self.background,
            self.alpha_threshold,
        ))
    }
}
