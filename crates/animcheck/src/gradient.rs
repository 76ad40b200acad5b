//! Deterministic test content: a full-spectrum hue gradient with an alpha ramp.
//!
//! Row 0 sweeps red → yellow → green → cyan → blue → magenta → red across six
//! equal segments. Every following row repeats the same colors with a uniform
//! alpha that fades linearly from opaque toward transparent.

use crate::frame::{ClipToByte, Frame};
use crate::result::{AnimcheckError, AnimcheckResult};
use image::Rgba;

/// Generate a `width`x`height` alpha gradient.
///
/// Arithmetic is done in `f32`, truncated toward zero and then clamped, so the
/// output is a pure function of the size.
///
/// # Errors
///
/// Returns error if either dimension is zero
pub fn generate_alpha_gradient(width: u32, height: u32) -> AnimcheckResult<Frame> {
    if width == 0 || height == 0 {
        return Err(AnimcheckError::invalid_argument(format!(
            "gradient size must be non-zero, got {width}x{height}"
        )));
    }

    let mut frame = Frame::new(width, height);
    fill_alpha_gradient(&mut frame);
    Ok(frame)
}

/// Fill an existing frame with the alpha gradient
pub fn fill_alpha_gradient(frame: &mut Frame) {
    let width = frame.width();
    let height = frame.height();
    if width == 0 || height == 0 {
        return;
    }

    for x in 0..width {
        frame.put_pixel(x, 0, hue_at(x, width));
    }

    if height < 2 {
        return;
    }

    let ratio = 255f32 / height as f32;
    for y in 1..height {
        let alpha = ((255f32 - y as f32 * ratio) as i32).clip_to_byte();
        for x in 0..width {
            let Rgba([r, g, b, _]) = frame.pixel(x, 0);
            frame.put_pixel(x, y, Rgba([r, g, b, alpha]));
        }
    }
}

/// Opaque hue for column `x` of a `width`-wide first row
fn hue_at(x: u32, width: u32) -> Rgba<u8> {
    let limit = width as f32 / 6f32;
    let ratio = 255f32 / limit;
    let x = x as f32;
    let up = |offset: f32| (((x - offset) * ratio) as i32).clip_to_byte();
    let down = |offset: f32| ((255f32 - (x - offset) * ratio) as i32).clip_to_byte();

    let [r, g, b] = if x < limit {
        [255, up(0.0), 0]
    } else if x < limit * 2.0 {
        [down(limit), 255, 0]
    } else if x < limit * 3.0 {
        [0, 255, up(limit * 2.0)]
    } else if x < limit * 4.0 {
        [0, down(limit * 3.0), 255]
    } else if x < limit * 5.0 {
        [up(limit * 4.0), 0, 255]
    } else {
        [255, 0, down(limit * 5.0)]
    };
    Rgba([r, g, b, 255])
}
