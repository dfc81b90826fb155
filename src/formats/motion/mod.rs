//! Motion asset format
//!
//! A motion holds per-bone animation tracks, an optional rest-pose bone
//! table, and a playback clock. Four schema versions are supported: 43, 65,
//! 78 and 458. They differ in header layout, pointer width and curve
//! encoding tables, and all decode to the same [`Motion`] document.

mod codec;
mod document;
mod reader;
mod sampler;

pub use document::{
    Bone, BoneTrack, Channel, ChannelKind, DecodeWarning, Motion, Skeleton, SkeletonBone,
};
pub use sampler::TrackSample;

pub(crate) use reader::{read_v43, read_v65, read_v78, read_v458};
