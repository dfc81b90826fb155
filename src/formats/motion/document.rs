//! Motion document structure definitions

use std::fmt;

use glam::{Quat, Vec4};

use super::codec::SampleCodec;

/// Which transform component a channel animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    Position,
    Rotation,
    Scale,
}

impl ChannelKind {
    /// Channel kinds in on-disk declaration order. A track's curve records
    /// are stored in this order, one per bit set in its usage mask.
    pub const ALL: [ChannelKind; 3] = [
        ChannelKind::Position,
        ChannelKind::Rotation,
        ChannelKind::Scale,
    ];

    /// The bit this kind occupies in a track's usage mask.
    pub(crate) fn bit(self) -> u16 {
        match self {
            ChannelKind::Position => 1,
            ChannelKind::Rotation => 1 << 1,
            ChannelKind::Scale => 1 << 2,
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelKind::Position => write!(f, "position"),
            ChannelKind::Rotation => write!(f, "rotation"),
            ChannelKind::Scale => write!(f, "scale"),
        }
    }
}

/// One decoded curve: keyframes for a single transform component of a
/// single bone.
#[derive(Debug, Clone)]
pub struct Channel {
    pub kind: ChannelKind,
    /// Raw encoding tag, kept for diagnostics.
    pub flags: u32,
    /// Keyframe clock in frames per second, never zero.
    pub frame_rate: f32,
    /// Curve length in seconds.
    pub duration: f32,
    /// Frame number of each keyframe, monotonically non-decreasing.
    pub frames: Vec<u32>,
    pub(crate) codec: SampleCodec,
}

impl Channel {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Decodes the value stored at keyframe `index`.
    ///
    /// Rotation channels yield unit quaternions as `(x, y, z, w)`; position
    /// and scale channels carry their vector in `xyz` with `w` unused.
    pub fn value_at(&self, index: usize) -> Vec4 {
        self.codec.sample(index)
    }
}

/// Animation curves for one bone. Tracks bind to bones by joint hash, not
/// by table position.
#[derive(Debug, Clone)]
pub struct BoneTrack {
    /// Purpose unresolved; preserved verbatim.
    pub unknown: i16,
    pub bone_hash: u32,
    /// Per-track blend weight, present from schema 65 on.
    pub weight: Option<f32>,
    pub position: Option<Channel>,
    pub rotation: Option<Channel>,
    pub scale: Option<Channel>,
}

impl BoneTrack {
    pub fn channel(&self, kind: ChannelKind) -> Option<&Channel> {
        match kind {
            ChannelKind::Position => self.position.as_ref(),
            ChannelKind::Rotation => self.rotation.as_ref(),
            ChannelKind::Scale => self.scale.as_ref(),
        }
    }

    /// Iterates the channels that are present, in declaration order.
    pub fn channels(&self) -> impl Iterator<Item = &Channel> {
        ChannelKind::ALL.into_iter().filter_map(|k| self.channel(k))
    }
}

/// One bone record with its rest pose and name-based hierarchy links.
#[derive(Debug, Clone)]
pub struct Bone {
    pub name: String,
    pub parent_name: Option<String>,
    pub first_child_name: Option<String>,
    pub last_child_name: Option<String>,
    /// Rest translation; `w` is padding as stored.
    pub position: Vec4,
    pub rotation: Quat,
    pub id: u32,
    pub hash: u32,
}

/// A decoded motion asset.
#[derive(Debug, Clone)]
pub struct Motion {
    /// Schema version the asset was decoded from.
    pub version: u32,
    pub name: String,
    /// Playback clock in frames per second.
    pub frame_rate: f32,
    /// Frame intervals as stored; index 0 is the end frame, index 1 the
    /// loop start, the rest reserved.
    pub intervals: [f32; 4],
    /// Embedded clip count (schema 458; zero elsewhere).
    pub clip_count: u8,
    pub bones: Vec<Bone>,
    pub tracks: Vec<BoneTrack>,
    /// Non-fatal problems encountered while decoding.
    pub warnings: Vec<DecodeWarning>,
}

impl Motion {
    /// Playback length in seconds.
    pub fn duration_seconds(&self) -> f32 {
        if self.frame_rate > 0.0 {
            self.intervals[0] / self.frame_rate
        } else {
            0.0
        }
    }

    pub fn track_for_hash(&self, bone_hash: u32) -> Option<&BoneTrack> {
        self.tracks.iter().find(|t| t.bone_hash == bone_hash)
    }
}

/// A bone hierarchy with parent links resolved to table indices.
#[derive(Debug, Clone)]
pub struct Skeleton {
    pub bones: Vec<SkeletonBone>,
}

#[derive(Debug, Clone)]
pub struct SkeletonBone {
    pub name: String,
    /// Index of the parent bone, `None` for roots.
    pub parent: Option<usize>,
    pub position: Vec4,
    pub rotation: Quat,
    pub id: u32,
    pub hash: u32,
}

impl Skeleton {
    /// Builds a hierarchy from raw bone records, resolving parent names to
    /// indices. First match wins when names collide; a parent name with no
    /// matching bone leaves the bone a root.
    pub fn from_bones(bones: &[Bone]) -> Skeleton {
        let resolved = bones
            .iter()
            .map(|bone| {
                let parent = bone.parent_name.as_deref().and_then(|name| {
                    bones
                        .iter()
                        .position(|candidate| candidate.name == name)
                });

                SkeletonBone {
                    name: bone.name.clone(),
                    parent,
                    position: bone.position,
                    rotation: bone.rotation,
                    id: bone.id,
                    hash: bone.hash,
                }
            })
            .collect();

        Skeleton { bones: resolved }
    }

    pub fn bone_by_name(&self, name: &str) -> Option<&SkeletonBone> {
        self.bones.iter().find(|b| b.name == name)
    }

    pub fn bone_by_hash(&self, hash: u32) -> Option<&SkeletonBone> {
        self.bones.iter().find(|b| b.hash == hash)
    }
}

/// A non-fatal decoding problem. Warnings are accumulated on the decoded
/// document; they never abort the asset.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeWarning {
    #[error("unrecognized curve encoding {flags:#010x} on bone {bone_hash:#010x}")]
    UnknownCurveEncoding { bone_hash: u32, flags: u32 },

    #[error("malformed {kind} curve on bone {bone_hash:#010x}: {reason}")]
    MalformedCurve {
        bone_hash: u32,
        kind: ChannelKind,
        reason: String,
    },

    #[error("motion slot {slot} failed to decode: {reason}")]
    MotionSlotFailed { slot: usize, reason: String },
}
