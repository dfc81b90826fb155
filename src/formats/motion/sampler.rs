//! Continuous-time curve sampling
//!
//! Channels store values at sparse keyframe numbers. Sampling maps a time in
//! seconds onto the channel's frame clock, brackets it between two
//! keyframes, and interpolates: linearly for vectors, spherically for
//! rotations. Times before the first keyframe or past the last clamp to the
//! boundary value.

use glam::{Quat, Vec3, Vec4};

use super::document::{BoneTrack, Channel, ChannelKind, Motion};

/// One bone's transform sampled at a point in time. Components the track
/// does not animate are `None`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackSample {
    pub position: Option<Vec3>,
    pub rotation: Option<Quat>,
    pub scale: Option<Vec3>,
}

impl Channel {
    /// Samples the channel at `time` seconds. Returns `None` only when the
    /// channel has no keyframes.
    pub fn sample_at(&self, time: f32) -> Option<Vec4> {
        if self.is_empty() {
            return None;
        }

        let position = time * self.frame_rate;
        let (lower, upper, t) = bracket(&self.frames, position);
        if lower == upper || t <= 0.0 {
            return Some(self.value_at(lower));
        }

        let a = self.value_at(lower);
        let b = self.value_at(upper);
        Some(match self.kind {
            ChannelKind::Rotation => {
                let qa = Quat::from_vec4(a);
                let qb = Quat::from_vec4(b);
                Vec4::from(qa.slerp(qb, t))
            }
            ChannelKind::Position | ChannelKind::Scale => a.lerp(b, t),
        })
    }
}

/// Brackets a fractional frame position between two adjacent keyframes,
/// returning their indices and the interpolation fraction. Positions at or
/// outside the keyframe range clamp to the nearest end with fraction zero.
fn bracket(frames: &[u32], position: f32) -> (usize, usize, f32) {
    let first = frames[0] as f32;
    if position.is_nan() || position <= first {
        return (0, 0, 0.0);
    }

    let last_index = frames.len() - 1;
    let last = frames[last_index] as f32;
    if position >= last {
        return (last_index, last_index, 0.0);
    }

    let upper = frames.partition_point(|&frame| frame as f32 <= position);
    let lower = upper - 1;
    let a = frames[lower] as f32;
    let b = frames[upper] as f32;
    let t = if b > a { (position - a) / (b - a) } else { 0.0 };
    (lower, upper, t)
}

impl BoneTrack {
    /// Samples every channel the track carries at `time` seconds.
    pub fn sample(&self, time: f32) -> TrackSample {
        TrackSample {
            position: self
                .position
                .as_ref()
                .and_then(|c| c.sample_at(time))
                .map(Vec4::truncate),
            rotation: self
                .rotation
                .as_ref()
                .and_then(|c| c.sample_at(time))
                .map(Quat::from_vec4),
            scale: self
                .scale
                .as_ref()
                .and_then(|c| c.sample_at(time))
                .map(Vec4::truncate),
        }
    }
}

impl Motion {
    /// Samples the track bound to `bone_hash` at `time` seconds. Returns
    /// `None` when no track drives that bone.
    pub fn sample(&self, bone_hash: u32, time: f32) -> Option<TrackSample> {
        self.track_for_hash(bone_hash)
            .map(|track| track.sample(time))
    }
}
