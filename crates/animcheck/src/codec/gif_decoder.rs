//! GIF decoding on top of the `gif` crate.
//!
//! Each GIF frame is composited onto a logical-screen canvas and handed out as
//! an owned full-size [`Frame`]. Disposal is applied after the snapshot, as a
//! viewer would before drawing the next frame.

use super::{AnimationDecoder, DecodedAnimation, DecodedFrame, StreamInfo};
use crate::frame::{Frame, FrameSize, TRANSPARENT};
use crate::result::{AnimcheckError, AnimcheckResult};
use gif::{ColorOutput, DecodeOptions, DisposalMethod, Repeat};
use image::Rgba;
use std::io::Cursor;
use std::time::Duration;

/// Animated GIF decoder
#[derive(Debug, Clone, Copy, Default)]
pub struct GifDecoder;

impl GifDecoder {
    /// Create a decoder
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn open(bytes: &[u8]) -> AnimcheckResult<gif::Decoder<Cursor<&[u8]>>> {
        let mut options = DecodeOptions::new();
        options.set_color_output(ColorOutput::RGBA);
        options
            .read_info(Cursor::new(bytes))
            .map_err(|e| AnimcheckError::decoding(format!("Failed to read GIF header: {e}")))
    }
}

impl AnimationDecoder for GifDecoder {
    #[tracing::instrument(skip_all, fields(bytes = bytes.len()))]
    fn decode(&self, bytes: &[u8]) -> AnimcheckResult<DecodedAnimation> {
        let mut decoder = Self::open(bytes)?;
        let size = FrameSize::new(u32::from(decoder.width()), u32::from(decoder.height()));
        let mut canvas = Frame::with_size(size);
        let mut frames = Vec::new();

        while let Some(gif_frame) = decoder.read_next_frame().map_err(|e| {
            AnimcheckError::decoding(format!("Failed to read GIF frame {}: {e}", frames.len()))
        })? {
            let rect = Rect::of(gif_frame, size);
            let saved = (gif_frame.dispose == DisposalMethod::Previous).then(|| canvas.clone());

            composite(&mut canvas, gif_frame, rect);
            frames.push(DecodedFrame {
                frame: canvas.clone(),
                delay: Duration::from_millis(u64::from(gif_frame.delay) * 10),
            });

            match gif_frame.dispose {
                DisposalMethod::Background => rect.clear(&mut canvas),
                DisposalMethod::Previous => {
                    if let Some(saved) = saved {
                        canvas = saved;
                    }
                }
                _ => {}
            }
        }

        let loop_count = match decoder.repeat() {
            Repeat::Infinite => Some(0),
            Repeat::Finite(0) => None,
            Repeat::Finite(n) => Some(n),
        };
        tracing::info!(frames = frames.len(), %size, "decoded GIF");
        Ok(DecodedAnimation::new(size, frames, loop_count))
    }

    fn probe(&self, bytes: &[u8]) -> AnimcheckResult<StreamInfo> {
        let mut decoder = Self::open(bytes)?;
        let size = FrameSize::new(u32::from(decoder.width()), u32::from(decoder.height()));
        let mut frame_count = 0;
        while decoder
            .next_frame_info()
            .map_err(|e| {
                AnimcheckError::decoding(format!("Failed to read GIF frame {frame_count}: {e}"))
            })?
            .is_some()
        {
            frame_count += 1;
        }
        Ok(StreamInfo { size, frame_count })
    }
}

/// Frame rectangle clipped to the logical screen
#[derive(Debug, Clone, Copy)]
struct Rect {
    left: u32,
    top: u32,
    width: u32,
    height: u32,
    stride: u32,
}

impl Rect {
    fn of(frame: &gif::Frame<'_>, screen: FrameSize) -> Self {
        let left = u32::from(frame.left);
        let top = u32::from(frame.top);
        Self {
            left,
            top,
            width: u32::from(frame.width).min(screen.width.saturating_sub(left)),
            height: u32::from(frame.height).min(screen.height.saturating_sub(top)),
            stride: u32::from(frame.width),
        }
    }

    fn clear(self, canvas: &mut Frame) {
        for y in 0..self.height {
            for x in 0..self.width {
                canvas.put_pixel(self.left + x, self.top + y, TRANSPARENT);
            }
        }
    }
}

fn composite(canvas: &mut Frame, frame: &gif::Frame<'_>, rect: Rect) {
    for y in 0..rect.height {
        for x in 0..rect.width {
            let offset = ((y * rect.stride + x) * 4) as usize;
            let Some(px) = frame.buffer.get(offset..offset + 4) else {
                continue;
            };
            if px[3] == 0 {
                continue;
            }
            canvas.put_pixel(
                rect.left + x,
                rect.top + y,
                Rgba([px[0], px[1], px[2], px[3]]),
            );
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    const RED: [u8; 3] = [255, 0, 0];
    const BLUE: [u8; 3] = [0, 0, 255];

    /// Hand-built GIF: 4x2 screen, frames described as (left, width, color, dispose)
    fn build(frames: &[(u16, u16, [u8; 3], DisposalMethod)]) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = gif::Encoder::new(&mut out, 4, 2, &[]).unwrap();
            for &(left, width, color, dispose) in frames {
                let mut frame = gif::Frame::default();
                frame.left = left;
                frame.width = width;
                frame.height = 2;
                frame.palette = Some(color.to_vec());
                frame.buffer = Cow::Owned(vec![0; usize::from(width) * 2]);
                frame.dispose = dispose;
                frame.delay = 5;
                encoder.write_frame(&frame).unwrap();
            }
        }
        out
    }

    #[test]
    fn test_keep_composites_over_previous() {
        let bytes = build(&[
            (0, 4, RED, DisposalMethod::Keep),
            (2, 2, BLUE, DisposalMethod::Keep),
        ]);
        let animation = GifDecoder::new().decode(&bytes).unwrap();
        assert_eq!(animation.len(), 2);
        let second = animation.frame(1).unwrap();
        assert_eq!(second.pixel(0, 0), Rgba([255, 0, 0, 255]));
        assert_eq!(second.pixel(3, 1), Rgba([0, 0, 255, 255]));
        assert_eq!(animation.frames()[1].delay, Duration::from_millis(50));
    }

    #[test]
    fn test_background_disposal_clears_rect() {
        let bytes = build(&[
            (0, 4, RED, DisposalMethod::Background),
            (2, 2, BLUE, DisposalMethod::Keep),
        ]);
        let animation = GifDecoder::new().decode(&bytes).unwrap();
        let second = animation.frame(1).unwrap();
        assert_eq!(second.pixel(0, 0), TRANSPARENT);
        assert_eq!(second.pixel(2, 0), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn test_previous_disposal_restores() {
        let bytes = build(&[
            (0, 4, RED, DisposalMethod::Keep),
            (2, 2, BLUE, DisposalMethod::Previous),
            (0, 1, BLUE, DisposalMethod::Keep),
        ]);
        let animation = GifDecoder::new().decode(&bytes).unwrap();
        let third = animation.frame(2).unwrap();
        assert_eq!(third.pixel(3, 0), Rgba([255, 0, 0, 255]));
        assert_eq!(third.pixel(0, 0), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn test_probe_counts_frames() {
        let bytes = build(&[
            (0, 4, RED, DisposalMethod::Keep),
            (0, 4, BLUE, DisposalMethod::Keep),
            (0, 4, RED, DisposalMethod::Keep),
        ]);
        let info = GifDecoder::new().probe(&bytes).unwrap();
        assert_eq!(info.frame_count, 3);
        assert_eq!(info.size, FrameSize::new(4, 2));
    }

    #[test]
    fn test_garbage_is_a_decoding_error() {
        let err = GifDecoder::new().decode(b"not a gif").unwrap_err();
        assert!(matches!(err, AnimcheckError::Decoding { .. }));
    }
}
