//! File format handlers for the motion asset family

pub mod common;
pub mod motion;
pub mod motion_list;
pub mod registry;

// Re-export common types for convenience
pub use common::{AssetHeader, AssetKind, Endianness, ImageView};

// Re-export main document types
pub use motion::{Bone, BoneTrack, Channel, ChannelKind, DecodeWarning, Motion, Skeleton};
pub use motion_list::MotionList;

// Re-export the decoding entry points
pub use registry::{Asset, from_bytes, load};
