//! Saving encoded streams and diff images for inspection.

use crate::frame::Frame;
use crate::result::{AnimcheckError, AnimcheckResult};
use chrono::Local;
use image::codecs::png::PngEncoder;
use image::ImageEncoder;
use std::fs;
use std::path::{Path, PathBuf};

/// File name for a saved stream: `<test>[_<stream>].<yyyyMMddHHmmssfff>.<ext>`
#[must_use]
pub fn artifact_file_name(test_name: &str, stream_name: Option<&str>, extension: &str) -> String {
    let stamp = Local::now().format("%Y%m%d%H%M%S%3f");
    let extension = extension.trim_start_matches('.');
    match stream_name {
        Some(stream) if !stream.is_empty() => format!("{test_name}_{stream}.{stamp}.{extension}"),
        _ => format!("{test_name}.{stamp}.{extension}"),
    }
}

/// Write `bytes` under `dir`, creating it when missing
///
/// # Errors
///
/// Returns error if `test_name` is empty or the file cannot be written
pub fn save_stream(
    dir: &Path,
    test_name: &str,
    stream_name: Option<&str>,
    bytes: &[u8],
    extension: &str,
) -> AnimcheckResult<PathBuf> {
    if test_name.is_empty() {
        return Err(AnimcheckError::invalid_argument("artifact test name is empty"));
    }
    fs::create_dir_all(dir)?;
    let path = dir.join(artifact_file_name(test_name, stream_name, extension));
    fs::write(&path, bytes)?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "saved stream");
    Ok(path)
}

/// Encode a frame as PNG
///
/// # Errors
///
/// Returns error if PNG encoding fails
pub fn encode_png(frame: &Frame) -> AnimcheckResult<Vec<u8>> {
    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(
            frame.as_raw(),
            frame.width(),
            frame.height(),
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| AnimcheckError::ImageProcessing {
            message: format!("Failed to encode PNG: {e}"),
        })?;
    Ok(buffer)
}

/// Write a diff image for decoded frame `frame_index` as PNG
///
/// # Errors
///
/// Returns error if encoding or writing fails
pub fn save_diff_png(
    dir: &Path,
    test_name: &str,
    frame_index: usize,
    diff: &Frame,
) -> AnimcheckResult<PathBuf> {
    let png = encode_png(diff)?;
    save_stream(dir, test_name, Some(&format!("diff{frame_index}")), &png, "png")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::frame::FrameSize;
    use image::Rgba;
    use tempfile::TempDir;

    #[test]
    fn test_file_name_shape() {
        let name = artifact_file_name("wipe", Some("normal"), ".gif");
        let parts: Vec<&str> = name.split('.').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "wipe_normal");
        assert_eq!(parts[1].len(), 17);
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2], "gif");

        let bare = artifact_file_name("wipe", None, "gif");
        assert!(bare.starts_with("wipe."));
    }

    #[test]
    fn test_save_stream_creates_directory() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("nested").join("out");
        let path = save_stream(&dir, "wipe", Some("ping-pong"), b"GIF89a", "gif").unwrap();
        assert!(path.starts_with(&dir));
        assert_eq!(fs::read(&path).unwrap(), b"GIF89a");
    }

    #[test]
    fn test_save_stream_rejects_empty_name() {
        let tmp = TempDir::new().unwrap();
        assert!(save_stream(tmp.path(), "", None, b"x", "gif").is_err());
    }

    #[test]
    fn test_diff_png_is_readable() {
        let tmp = TempDir::new().unwrap();
        let frame = Frame::filled(FrameSize::new(3, 2), Rgba([255, 0, 0, 255]));
        let path = save_diff_png(tmp.path(), "wipe", 4, &frame).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("wipe_diff4."));
        let loaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(loaded.dimensions(), (3, 2));
        assert_eq!(*loaded.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
    }
}
