//! Frame-rate resampling of a per-frame, per-bone key matrix.

use glam::{Quat, Vec3};

/// One bone's pose at one frame: rotation then translation
pub type BoneKey = (Quat, Vec3);

/// Generate the sample times for retiming `source_frame_count` frames by
/// `frame_step`.
///
/// Times run `0, step, 2*step, ...` while they stay below the last source
/// frame, and the last frame is always appended as a forced final sample so
/// the end of the authored motion survives any step.
pub fn sample_frame_times(source_frame_count: usize, frame_step: f32) -> Vec<f32> {
    if source_frame_count == 0 {
        return Vec::new();
    }
    let last = (source_frame_count - 1) as f32;
    let mut times = Vec::new();
    let mut time = 0.0f32;
    while time < last {
        times.push(time);
        time += frame_step;
    }
    times.push(last);
    times
}

/// Retime a `[frame][bone]` matrix of keys to a new step.
///
/// `frame_step` is `source_fps / target_fps`; a step of exactly 1.0 returns
/// the input unchanged. Samples landing on an integer frame copy it verbatim
/// so integer boundaries carry no interpolation error. Fractional samples
/// slerp rotations (renormalized to counter floating-point drift) and lerp
/// translations between the bracketing frames, per bone independently.
pub fn resample_keys(frames: &[Vec<BoneKey>], frame_step: f32) -> Vec<Vec<BoneKey>> {
    if frame_step == 1.0 || frames.len() < 2 {
        return frames.to_vec();
    }

    sample_frame_times(frames.len(), frame_step)
        .into_iter()
        .map(|time| {
            let frame_index = time as usize;
            if time.fract() == 0.0 {
                frames[frame_index].clone()
            } else {
                let factor = time - frame_index as f32;
                let current = &frames[frame_index];
                let next = &frames[frame_index + 1];
                current
                    .iter()
                    .zip(next.iter())
                    .map(|(&(rotation_a, location_a), &(rotation_b, location_b))| {
                        (
                            rotation_a.slerp(rotation_b, factor).normalize(),
                            location_a.lerp(location_b, factor),
                        )
                    })
                    .collect()
            }
        })
        .collect()
}
