//! Frame-count arithmetic for playback modes.

use crate::config::AnimationMode;
use crate::result::{AnimcheckError, AnimcheckResult};

/// Number of frames a decoded stream must contain for `source_frames` inputs.
///
/// Ping-pong adds the reverse pass without its two endpoints.
#[must_use]
pub const fn expected_frame_count(source_frames: usize, mode: AnimationMode) -> usize {
    match mode {
        AnimationMode::Normal => source_frames,
        AnimationMode::PingPong => source_frames + source_frames.saturating_sub(2),
    }
}

/// Source frame index shown at decoded position `decoded_index`, if any
#[must_use]
pub const fn source_index(
    decoded_index: usize,
    source_frames: usize,
    mode: AnimationMode,
) -> Option<usize> {
    if decoded_index >= expected_frame_count(source_frames, mode) {
        return None;
    }
    if decoded_index < source_frames {
        return Some(decoded_index);
    }
    // Reverse pass: N, N+1, .. show N-2, N-3, ..
    Some(2 * source_frames - 2 - decoded_index)
}

/// Decoded index of the reverse-pass copy of `source`, if it has one
#[must_use]
pub const fn mirror_index(source: usize, source_frames: usize, mode: AnimationMode) -> Option<usize> {
    match mode {
        AnimationMode::Normal => None,
        AnimationMode::PingPong => {
            if source == 0 || source + 1 >= source_frames {
                None
            } else {
                Some(2 * source_frames - 2 - source)
            }
        }
    }
}

/// Fail with [`AnimcheckError::FrameCountMismatch`] unless `actual` is what
/// `mode` requires for `source_frames` inputs
///
/// # Errors
///
/// Returns error on any mismatch
pub fn check_frame_count(
    source_frames: usize,
    actual: usize,
    mode: AnimationMode,
) -> AnimcheckResult<usize> {
    let expected = expected_frame_count(source_frames, mode);
    if expected != actual {
        return Err(AnimcheckError::FrameCountMismatch {
            expected,
            actual,
            mode,
        });
    }
    Ok(expected)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_ten_frames() {
        assert_eq!(expected_frame_count(10, AnimationMode::Normal), 10);
        assert_eq!(expected_frame_count(10, AnimationMode::PingPong), 18);
    }

    #[test]
    fn test_small_ping_pong() {
        assert_eq!(expected_frame_count(0, AnimationMode::PingPong), 0);
        assert_eq!(expected_frame_count(1, AnimationMode::PingPong), 1);
        assert_eq!(expected_frame_count(2, AnimationMode::PingPong), 2);
        assert_eq!(expected_frame_count(3, AnimationMode::PingPong), 4);
    }

    #[test]
    fn test_source_index_ping_pong() {
        let mapped: Vec<usize> = (0..18)
            .map(|i| source_index(i, 10, AnimationMode::PingPong).unwrap())
            .collect();
        assert_eq!(
            mapped,
            vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 8, 7, 6, 5, 4, 3, 2, 1]
        );
        assert_eq!(source_index(18, 10, AnimationMode::PingPong), None);
        assert_eq!(source_index(10, 10, AnimationMode::Normal), None);
    }

    #[test]
    fn test_mirror_index() {
        assert_eq!(mirror_index(3, 10, AnimationMode::PingPong), Some(15));
        assert_eq!(mirror_index(0, 10, AnimationMode::PingPong), None);
        assert_eq!(mirror_index(9, 10, AnimationMode::PingPong), None);
        assert_eq!(mirror_index(3, 10, AnimationMode::Normal), None);
    }

    #[test]
    fn test_check_reports_counts() {
        assert_eq!(check_frame_count(10, 18, AnimationMode::PingPong).unwrap(), 18);
        let err = check_frame_count(10, 10, AnimationMode::PingPong).unwrap_err();
        match err {
            AnimcheckError::FrameCountMismatch { expected, actual, mode } => {
                assert_eq!((expected, actual, mode), (18, 10, AnimationMode::PingPong));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    proptest! {
        #[test]
        fn prop_mirror_maps_back(n in 0usize..200, s in 0usize..200) {
            if let Some(m) = mirror_index(s, n, AnimationMode::PingPong) {
                prop_assert!(m >= n);
                prop_assert_eq!(source_index(m, n, AnimationMode::PingPong), Some(s));
            }
        }

        #[test]
        fn prop_every_decoded_index_has_a_source(n in 1usize..200) {
            for mode in AnimationMode::ALL {
                let expected = expected_frame_count(n, mode);
                for i in 0..expected {
                    let s = source_index(i, n, mode);
                    prop_assert!(s.is_some_and(|s| s < n));
                }
            }
        }
    }
}
