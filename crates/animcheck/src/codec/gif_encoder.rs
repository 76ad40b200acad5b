//! GIF encoding on top of the `gif` crate.

use super::{delay_to_centis, AnimationEncoder};
use crate::config::{AnimationConfig, AnimationMode};
use crate::frame::{Frame, FrameSize};
use crate::placement::expected_frame;
use crate::result::{AnimcheckError, AnimcheckResult};
use gif::{DisposalMethod, Encoder, Repeat};
use std::borrow::Cow;
use std::collections::HashMap;

/// Maximum entries in a GIF color table
const GIF_PALETTE_SIZE: usize = 256;

/// Animated GIF encoder
#[derive(Debug, Clone, Copy, Default)]
pub struct GifEncoder;

impl GifEncoder {
    /// Create an encoder
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl AnimationEncoder for GifEncoder {
    fn format(&self) -> &'static str {
        "gif"
    }

    #[tracing::instrument(skip_all, fields(frames = config.frame_count(), mode = %config.mode()))]
    fn encode(&self, config: &AnimationConfig) -> AnimcheckResult<Vec<u8>> {
        let size = config.stream_size()?;
        let (width, height) = gif_dimensions(size)?;
        let quantizer = config.effective_quantizer();
        let ping_pong = config.mode() == AnimationMode::PingPong;

        let mut output = Vec::new();
        {
            let mut encoder = Encoder::new(&mut output, width, height, &[]).map_err(|e| {
                AnimcheckError::encoding(format!("Failed to create GIF encoder: {e}"))
            })?;

            let repeat = if config.loop_count() == 0 {
                Repeat::Infinite
            } else {
                Repeat::Finite(config.loop_count())
            };
            encoder
                .set_repeat(repeat)
                .map_err(|e| AnimcheckError::encoding(format!("Failed to set GIF repeat: {e}")))?;

            let mut cursor = config.frames();
            let total = cursor.len();
            if total == 0 {
                return Err(AnimcheckError::invalid_argument("cannot encode an empty sequence"));
            }
            let mut delays = config.delays();
            let mut reverse_pass = Vec::new();
            let mut index = 0usize;

            while let Some(frame) = cursor.advance()? {
                let delay = delays.next().ok_or_else(|| {
                    AnimcheckError::invalid_argument(format!(
                        "missing delay for frame {index} of {total}"
                    ))
                })?;
                let reduced = expected_frame(
                    frame,
                    size,
                    config.size_handling(),
                    quantizer.as_ref(),
                    config.ditherer(),
                )?;
                let mut gif_frame = index_frame(&reduced, width, height).map_err(|e| match e {
                    AnimcheckError::Encoding { message } => {
                        AnimcheckError::encoding(format!("frame {index}: {message}"))
                    }
                    other => other,
                })?;
                gif_frame.delay = delay_to_centis(delay);

                encoder.write_frame(&gif_frame).map_err(|e| {
                    AnimcheckError::encoding(format!("Failed to write GIF frame {index}: {e}"))
                })?;
                tracing::debug!(
                    index,
                    colors = gif_frame.palette.as_ref().map_or(0, |p| p.len() / 3),
                    "wrote frame"
                );

                if ping_pong && index > 0 && index + 1 < total {
                    reverse_pass.push(gif_frame);
                }
                index += 1;
            }

            let surplus = delays.count();
            if surplus > 0 {
                tracing::warn!(surplus, "ignoring delays beyond the last frame");
            }

            for (offset, gif_frame) in reverse_pass.iter().rev().enumerate() {
                encoder.write_frame(gif_frame).map_err(|e| {
                    AnimcheckError::encoding(format!(
                        "Failed to write reverse-pass GIF frame {}: {e}",
                        index + offset
                    ))
                })?;
            }
            tracing::info!(
                forward = index,
                reverse = reverse_pass.len(),
                quantizer = %quantizer.name(),
                "encoded GIF"
            );
        }

        Ok(output)
    }
}

fn gif_dimensions(size: FrameSize) -> AnimcheckResult<(u16, u16)> {
    let convert = |v: u32| {
        u16::try_from(v).map_err(|_| {
            AnimcheckError::invalid_argument(format!(
                "GIF dimensions are limited to {}, got {size}",
                u16::MAX
            ))
        })
    };
    Ok((convert(size.width)?, convert(size.height)?))
}

/// Turn a reduced frame into a full-screen indexed GIF frame with a local palette.
///
/// Alpha 0 pixels share one transparent entry with RGB (0,0,0).
fn index_frame(frame: &Frame, width: u16, height: u16) -> AnimcheckResult<gif::Frame<'static>> {
    let mut lookup: HashMap<[u8; 3], u8> = HashMap::new();
    let mut palette: Vec<u8> = Vec::new();
    let mut transparent: Option<u8> = None;
    let mut indices = Vec::with_capacity(frame.size().pixel_count());
    let mut opaque = 0usize;

    for px in frame.as_image().pixels() {
        let [r, g, b, a] = px.0;
        let index = match a {
            0 => {
                if let Some(t) = transparent {
                    t
                } else {
                    let t = next_index(palette.len())?;
                    palette.extend_from_slice(&[0, 0, 0]);
                    transparent = Some(t);
                    t
                }
            }
            255 => {
                if let Some(&i) = lookup.get(&[r, g, b]) {
                    i
                } else {
                    opaque += 1;
                    let i = next_index(palette.len()).map_err(|_| {
                        AnimcheckError::encoding(format!(
                            "more than {GIF_PALETTE_SIZE} colors after reduction ({opaque} opaque so far)"
                        ))
                    })?;
                    palette.extend_from_slice(&[r, g, b]);
                    lookup.insert([r, g, b], i);
                    i
                }
            }
            other => {
                return Err(AnimcheckError::encoding(format!(
                    "partially transparent pixel (alpha {other}) survived reduction"
                )))
            }
        };
        indices.push(index);
    }

    let mut gif_frame = gif::Frame::default();
    gif_frame.width = width;
    gif_frame.height = height;
    gif_frame.buffer = Cow::Owned(indices);
    gif_frame.palette = Some(palette);
    gif_frame.transparent = transparent;
    gif_frame.dispose = DisposalMethod::Background;
    Ok(gif_frame)
}

fn next_index(palette_bytes: usize) -> AnimcheckResult<u8> {
    let entries = palette_bytes / 3;
    if entries >= GIF_PALETTE_SIZE {
        return Err(AnimcheckError::encoding(format!(
            "more than {GIF_PALETTE_SIZE} colors after reduction"
        )));
    }
    u8::try_from(entries).map_err(|_| AnimcheckError::encoding("palette index overflow"))
}
