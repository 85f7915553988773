//! Time → pose bracketing for looping playback
//!
//! Pose tracks are sparse: a mesh only has a pose at the keyframes where it
//! carried data. Sampling finds the pose at or before the requested time and
//! the one after it, wrapping from the last pose back to the first, and
//! returns how far between the two the time lies.

/// A pose with a keyframe number
pub trait Timed {
    fn frame(&self) -> u32;
}

/// Two poses to interpolate between
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    /// Index of the pose at or before the sample time
    pub current: usize,
    /// Index of the pose after it; wraps to 0 past the last pose
    pub next: usize,
    /// Interpolation parameter in `[0, 1]`
    pub frac: f32,
}

impl Bracket {
    /// True when the sample lands exactly on `current`
    pub fn is_exact(&self) -> bool {
        self.frac == 0.0
    }
}

#[inline]
fn pose_time<T: Timed>(pose: &T, fps: f32) -> f32 {
    pose.frame() as f32 / fps
}

/// Find the poses bracketing `time` in a looping animation of `frame_count`
/// keyframes played at `fps`
///
/// `poses` must be sorted by frame. Returns `None` for an empty track or a
/// non-positive duration.
///
/// Past the last pose, the next pose is the first one timed at
/// `duration + first_time`. This equals `duration` only when the first pose
/// sits on frame 0; otherwise the wrap target lies past the loop end.
pub fn locate<T: Timed>(poses: &[T], time: f32, fps: f32, frame_count: u32) -> Option<Bracket> {
    let (first, last) = (poses.first()?, poses.last()?);
    if fps.is_nan() || fps <= 0.0 || !time.is_finite() {
        return None;
    }
    let duration = frame_count as f32 / fps;
    if duration <= 0.0 {
        return None;
    }

    let mut local = time.rem_euclid(duration);
    // rem_euclid can round up to `duration` for tiny negative inputs
    if local >= duration {
        local = 0.0;
    }

    let upper = poses.partition_point(|p| pose_time(p, fps) <= local);
    let (current, current_time, next, next_time) = if upper == 0 {
        // Before the first pose: come from the last pose of the previous loop
        (
            poses.len() - 1,
            pose_time(last, fps) - duration,
            0,
            pose_time(first, fps),
        )
    } else if upper < poses.len() {
        (
            upper - 1,
            pose_time(&poses[upper - 1], fps),
            upper,
            pose_time(&poses[upper], fps),
        )
    } else {
        // Past the last pose: close the loop back to the first
        (
            upper - 1,
            pose_time(last, fps),
            0,
            duration + pose_time(first, fps),
        )
    };

    let frac = if next_time == current_time {
        1.0
    } else {
        (local - current_time) / (next_time - current_time)
    };
    debug_assert!(
        (0.0..=1.0).contains(&frac),
        "frac {} out of range: poses out of order?",
        frac
    );

    Some(Bracket {
        current,
        next,
        frac: frac.clamp(0.0, 1.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    impl Timed for u32 {
        fn frame(&self) -> u32 {
            *self
        }
    }

    #[test]
    fn test_empty_track() {
        let poses: [u32; 0] = [];
        assert_eq!(locate(&poses, 0.0, 15.0, 10), None);
    }

    #[test]
    fn test_invalid_rate_or_duration() {
        assert_eq!(locate(&[0u32], 0.0, 0.0, 10), None);
        assert_eq!(locate(&[0u32], 0.0, -1.0, 10), None);
        assert_eq!(locate(&[0u32], 0.0, 15.0, 0), None);
        assert_eq!(locate(&[0u32], f32::NAN, 15.0, 10), None);
    }

    #[test]
    fn test_exact_keyframe_has_zero_frac() {
        let poses = [0u32, 2, 5];
        let fps = 10.0;
        for (index, &frame) in poses.iter().enumerate() {
            let bracket = locate(&poses, frame as f32 / fps, fps, 8).unwrap();
            assert_eq!(bracket.current, index);
            assert!(bracket.is_exact());
        }
    }

    #[test]
    fn test_between_poses() {
        let poses = [0u32, 4];
        let bracket = locate(&poses, 0.1, 10.0, 8).unwrap();
        assert_eq!((bracket.current, bracket.next), (0, 1));
        assert!((bracket.frac - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_wraps_after_last_pose() {
        let poses = [0u32, 4];
        // Last pose at 0.4s, loop closes at 0.8s
        let bracket = locate(&poses, 0.6, 10.0, 8).unwrap();
        assert_eq!((bracket.current, bracket.next), (1, 0));
        assert!((bracket.frac - 0.5).abs() < 1e-5);

        let looped = locate(&poses, 0.8 + 0.6, 10.0, 8).unwrap();
        assert_eq!((looped.current, looped.next), (1, 0));
        assert!((looped.frac - bracket.frac).abs() < 1e-4);
    }

    #[test]
    fn test_negative_time_wraps() {
        let poses = [0u32, 4];
        let bracket = locate(&poses, -0.2, 10.0, 8).unwrap();
        assert_eq!((bracket.current, bracket.next), (1, 0));
        assert!((bracket.frac - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_before_first_pose() {
        // First pose at frame 2: t = 0 sits between the last pose of the
        // previous loop (frame 6 - 8) and frame 2
        let poses = [2u32, 6];
        let bracket = locate(&poses, 0.0, 1.0, 8).unwrap();
        assert_eq!((bracket.current, bracket.next), (1, 0));
        assert!((bracket.frac - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_wrap_target_follows_first_pose() {
        // Last pose at 6s, first pose at 2s of the next loop (8 + 2 = 10s)
        let poses = [2u32, 6];
        let bracket = locate(&poses, 7.0, 1.0, 8).unwrap();
        assert_eq!((bracket.current, bracket.next), (1, 0));
        assert!((bracket.frac - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_single_pose() {
        let bracket = locate(&[3u32], 1.7, 1.0, 6).unwrap();
        assert_eq!((bracket.current, bracket.next), (0, 0));
        assert!((0.0..=1.0).contains(&bracket.frac));
    }
}
