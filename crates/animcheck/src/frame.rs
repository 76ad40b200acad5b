//! Owned RGBA frames and frame sizes.
//!
//! A [`Frame`] is a fixed-format (8-bit straight-alpha RGBA) pixel grid backed by
//! an `image::RgbaImage`. Frames handed out by a [`crate::FrameCursor`] are
//! borrowed views of a shared canvas; `clone()` turns one into an independent
//! snapshot.

use crate::quantize::ColorMapper;
use crate::result::{AnimcheckError, AnimcheckResult};
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The fully transparent pixel. Empty canvases and transparent palette entries use it.
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Saturating conversion of a wide intermediate value to a color channel.
pub trait ClipToByte {
    /// Clamp to `0..=255` and narrow to `u8`
    fn clip_to_byte(self) -> u8;
}

impl ClipToByte for i32 {
    fn clip_to_byte(self) -> u8 {
        self.clamp(0, 255) as u8
    }
}

impl ClipToByte for i64 {
    fn clip_to_byte(self) -> u8 {
        self.clamp(0, 255) as u8
    }
}

/// Width and height of a frame in pixels. Serializes as `"WxH"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FrameSize {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl FrameSize {
    /// Create a new size
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of pixels covered by this size
    #[must_use]
    pub const fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Whether either dimension is zero
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for FrameSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for FrameSize {
    type Err = AnimcheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .split_once(|c: char| c == 'x' || c == 'X')
            .ok_or_else(|| AnimcheckError::invalid_argument(format!("expected WxH, got '{s}'")))?;
        let parse = |part: &str| {
            part.trim().parse::<u32>().map_err(|e| {
                AnimcheckError::invalid_argument(format!("invalid dimension '{part}' in '{s}': {e}"))
            })
        };
        let size = Self::new(parse(w)?, parse(h)?);
        if size.is_empty() {
            return Err(AnimcheckError::invalid_argument(format!(
                "frame size must be non-zero, got {size}"
            )));
        }
        Ok(size)
    }
}

impl TryFrom<String> for FrameSize {
    type Error = AnimcheckError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FrameSize> for String {
    fn from(size: FrameSize) -> Self {
        size.to_string()
    }
}

/// An owned RGBA frame
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    image: RgbaImage,
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame {{ size: {} }}", self.size())
    }
}

impl From<RgbaImage> for Frame {
    fn from(image: RgbaImage) -> Self {
        Self { image }
    }
}

impl Frame {
    /// Create a fully transparent frame
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    /// Create a fully transparent frame of the given size
    #[must_use]
    pub fn with_size(size: FrameSize) -> Self {
        Self::new(size.width, size.height)
    }

    /// Create a frame filled with one color
    #[must_use]
    pub fn filled(size: FrameSize, color: Rgba<u8>) -> Self {
        Self {
            image: RgbaImage::from_pixel(size.width, size.height, color),
        }
    }

    /// Create a frame from raw RGBA bytes
    ///
    /// # Errors
    ///
    /// Returns error if `data` is not exactly `width * height * 4` bytes
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> AnimcheckResult<Self> {
        let len = data.len();
        RgbaImage::from_raw(width, height, data)
            .map(Self::from)
            .ok_or_else(|| {
                AnimcheckError::invalid_argument(format!(
                    "{len} bytes do not form a {width}x{height} RGBA frame"
                ))
            })
    }

    /// Frame width
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Frame height
    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Frame size
    #[must_use]
    pub fn size(&self) -> FrameSize {
        FrameSize::new(self.width(), self.height())
    }

    /// Pixel at `(x, y)`. Panics when out of bounds, like `image::ImageBuffer`.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.image.get_pixel(x, y)
    }

    /// Overwrite the pixel at `(x, y)`
    pub fn put_pixel(&mut self, x: u32, y: u32, color: Rgba<u8>) {
        self.image.put_pixel(x, y, color);
    }

    /// Raw RGBA bytes of row `y`
    #[must_use]
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.stride();
        let start = y as usize * stride;
        &self.image.as_raw()[start..start + stride]
    }

    /// Mutable raw RGBA bytes of row `y`
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let stride = self.stride();
        let start = y as usize * stride;
        let raw: &mut [u8] = &mut self.image;
        &mut raw[start..start + stride]
    }

    /// Copy row `source_y` of `source` into row `dest_y` of this frame, optionally
    /// reducing every pixel through `mapper` on the way.
    ///
    /// Only the overlapping width is copied.
    ///
    /// # Errors
    ///
    /// Returns error if either row index is out of range
    pub fn copy_row_from(
        &mut self,
        source: &Self,
        source_y: u32,
        dest_y: u32,
        mapper: Option<&ColorMapper>,
    ) -> AnimcheckResult<()> {
        if source_y >= source.height() || dest_y >= self.height() {
            return Err(AnimcheckError::invalid_argument(format!(
                "row copy {source_y} -> {dest_y} out of range ({} -> {})",
                source.size(),
                self.size()
            )));
        }

        let bytes = source.stride().min(self.stride());
        let src = &source.row(source_y)[..bytes];
        let dst = &mut self.row_mut(dest_y)[..bytes];
        match mapper {
            None => dst.copy_from_slice(src),
            Some(mapper) => {
                for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
                    let mapped = mapper.map(Rgba([s[0], s[1], s[2], s[3]]));
                    d.copy_from_slice(&mapped.0);
                }
            }
        }
        Ok(())
    }

    /// Raw RGBA bytes of the whole frame
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Underlying image buffer
    #[must_use]
    pub const fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    /// Mutable underlying image buffer
    pub fn as_image_mut(&mut self) -> &mut RgbaImage {
        &mut self.image
    }

    /// Consume the frame and return the image buffer
    #[must_use]
    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Count of distinct colors in the frame
    #[must_use]
    pub fn distinct_colors(&self) -> usize {
        let mut seen = std::collections::HashSet::new();
        for px in self.image.pixels() {
            seen.insert(px.0);
        }
        seen.len()
    }

    fn stride(&self) -> usize {
        self.width() as usize * 4
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod size_tests {
        use super::*;

        #[test]
        fn test_display_and_parse() {
            let size: FrameSize = "160x100".parse().unwrap();
            assert_eq!(size, FrameSize::new(160, 100));
            assert_eq!(size.to_string(), "160x100");
            assert_eq!(" 3X4 ".parse::<FrameSize>().unwrap(), FrameSize::new(3, 4));
        }

        #[test]
        fn test_parse_rejects_garbage() {
            assert!("160".parse::<FrameSize>().is_err());
            assert!("ax4".parse::<FrameSize>().is_err());
            assert!("0x4".parse::<FrameSize>().is_err());
        }

        #[test]
        fn test_pixel_count() {
            assert_eq!(FrameSize::new(7, 3).pixel_count(), 21);
            assert!(FrameSize::new(0, 3).is_empty());
        }

        #[test]
        fn test_serde_uses_text_form() {
            let json = serde_json::to_string(&FrameSize::new(40, 20)).unwrap();
            assert_eq!(json, "\"40x20\"");
            let size: FrameSize = serde_json::from_str("\"12x10\"").unwrap();
            assert_eq!(size, FrameSize::new(12, 10));
            assert!(serde_json::from_str::<FrameSize>("\"0x10\"").is_err());
        }
    }

    mod frame_tests {
        use super::*;

        #[test]
        fn test_new_frame_is_transparent() {
            let frame = Frame::new(3, 2);
            assert_eq!(frame.size(), FrameSize::new(3, 2));
            assert!(frame.as_image().pixels().all(|p| *p == TRANSPARENT));
        }

        #[test]
        fn test_from_raw_validates_length() {
            assert!(Frame::from_raw(2, 2, vec![0; 16]).is_ok());
            assert!(Frame::from_raw(2, 2, vec![0; 15]).is_err());
        }

        #[test]
        fn test_row_access() {
            let mut frame = Frame::new(2, 2);
            frame.put_pixel(1, 1, Rgba([1, 2, 3, 4]));
            assert_eq!(frame.row(0), &[0; 8]);
            assert_eq!(&frame.row(1)[4..], &[1, 2, 3, 4]);
            frame.row_mut(0)[0] = 9;
            assert_eq!(frame.pixel(0, 0), Rgba([9, 0, 0, 0]));
        }

        #[test]
        fn test_copy_row_without_mapper() {
            let source = Frame::filled(FrameSize::new(2, 1), Rgba([10, 20, 30, 40]));
            let mut dest = Frame::new(2, 3);
            dest.copy_row_from(&source, 0, 2, None).unwrap();
            assert_eq!(dest.pixel(0, 2), Rgba([10, 20, 30, 40]));
            assert_eq!(dest.pixel(1, 1), TRANSPARENT);
        }

        #[test]
        fn test_copy_row_out_of_range() {
            let source = Frame::new(2, 1);
            let mut dest = Frame::new(2, 2);
            assert!(dest.copy_row_from(&source, 1, 0, None).is_err());
            assert!(dest.copy_row_from(&source, 0, 2, None).is_err());
        }

        #[test]
        fn test_debug_is_compact() {
            assert_eq!(format!("{:?}", Frame::new(4, 5)), "Frame { size: 4x5 }");
        }

        #[test]
        fn test_clip_to_byte_saturates() {
            assert_eq!((-5i32).clip_to_byte(), 0);
            assert_eq!(300i32.clip_to_byte(), 255);
            assert_eq!(128i32.clip_to_byte(), 128);
            assert_eq!(i64::MAX.clip_to_byte(), 255);
        }
    }
}
