//! Dithering strategies.

use super::{blend_over, ColorMapper, Ditherer};
use crate::frame::{ClipToByte, Frame, TRANSPARENT};
use image::Rgba;

/// Error-diffusion dithering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorDiffusion {
    _private: (),
}

impl ErrorDiffusion {
    /// Floyd–Steinberg error diffusion (the `image` crate's implementation)
    #[must_use]
    pub const fn floyd_steinberg() -> Self {
        Self { _private: () }
    }
}

impl Ditherer for ErrorDiffusion {
    fn name(&self) -> String {
        "floyd-steinberg".to_string()
    }

    fn dither(&self, frame: &Frame, mapper: &ColorMapper) -> Frame {
        if frame.width() < 2 || frame.height() < 2 {
            return dither_line(frame, mapper);
        }
        let mut out = frame.clone();
        image::imageops::dither(out.as_image_mut(), mapper);
        out
    }
}

/// Floyd–Steinberg restricted to a single row or column.
///
/// `imageops::dither` indexes past the edge of 1-pixel-wide images. On a line
/// only one neighbour exists: the right one (7/16) along a row, the one below
/// (5/16) down a column.
fn dither_line(frame: &Frame, mapper: &ColorMapper) -> Frame {
    let mut out = frame.clone();
    let weight = if frame.height() == 1 { 7 } else { 5 };
    let mut carry = [0i32; 3];
    for px in out.as_image_mut().pixels_mut() {
        if px[3] < mapper.alpha_threshold() {
            *px = TRANSPARENT;
            carry = [0; 3];
            continue;
        }
        let Rgba([r, g, b, _]) = blend_over(*px, mapper.background());
        let wanted = [
            i32::from(r) + carry[0],
            i32::from(g) + carry[1],
            i32::from(b) + carry[2],
        ];
        let mapped = mapper.map(Rgba([
            wanted[0].clip_to_byte(),
            wanted[1].clip_to_byte(),
            wanted[2].clip_to_byte(),
            255,
        ]));
        for ((slot, want), got) in carry.iter_mut().zip(wanted).zip(mapped.0) {
            *slot = (want - i32::from(got)) * weight / 16;
        }
        *px = mapped;
    }
    out
}

const BAYER_8X8: [[u8; 8]; 8] = [
    [0, 32, 8, 40, 2, 34, 10, 42],
    [48, 16, 56, 24, 50, 18, 58, 26],
    [12, 44, 4, 36, 14, 46, 6, 38],
    [60, 28, 52, 20, 62, 30, 54, 22],
    [3, 35, 11, 43, 1, 33, 9, 41],
    [51, 19, 59, 27, 49, 17, 57, 25],
    [15, 47, 7, 39, 13, 45, 5, 37],
    [63, 31, 55, 23, 61, 29, 53, 21],
];

/// Ordered (Bayer matrix) dithering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderedDither {
    strength: u8,
}

impl Default for OrderedDither {
    fn default() -> Self {
        Self::bayer8x8()
    }
}

impl OrderedDither {
    /// 8x8 Bayer matrix with the default strength
    #[must_use]
    pub const fn bayer8x8() -> Self {
        Self { strength: 32 }
    }

    /// Peak-to-peak channel offset the matrix adds before mapping
    #[must_use]
    pub const fn with_strength(mut self, strength: u8) -> Self {
        self.strength = strength;
        self
    }

    fn offset(&self, x: u32, y: u32) -> i32 {
        let t = i32::from(BAYER_8X8[(y % 8) as usize][(x % 8) as usize]);
        (t * 2 + 1 - 64) * i32::from(self.strength) / 128
    }
}

impl Ditherer for OrderedDither {
    fn name(&self) -> String {
        format!("bayer8x8({})", self.strength)
    }

    fn dither(&self, frame: &Frame, mapper: &ColorMapper) -> Frame {
        let mut out = frame.clone();
        for (x, y, px) in out.as_image_mut().enumerate_pixels_mut() {
            if px[3] < mapper.alpha_threshold() {
                *px = TRANSPARENT;
                continue;
            }
            let Rgba([r, g, b, _]) = blend_over(*px, mapper.background());
            let offset = self.offset(x, y);
            let shift = |c: u8| (i32::from(c) + offset).clip_to_byte();
            *px = mapper.map(Rgba([shift(r), shift(g), shift(b), 255]));
        }
        out
    }
}
