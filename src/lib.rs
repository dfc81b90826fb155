//! # remot
//!
//! A pure-Rust library for decoding RE Engine motion assets.
//!
//! ## Supported Formats
//!
//! - **mot** - Single motion clips (schemas 43, 65, 78 and 458): bone
//!   tables, per-bone animation tracks, and compressed keyframe curves
//! - **motlist** - Motion containers (schemas 60, 85, 99 and 486) holding
//!   many nested motion assets in one image
//!
//! Both kinds decode from either byte order; the source platform is
//! detected from the kind tag in the asset header.
//!
//! ## Quick Start
//!
//! ### Decoding an Asset
//!
//! ```no_run
//! use remot::formats::registry;
//!
//! // Decode any supported asset from disk
//! let asset = registry::load("pl0100.motlist")?;
//!
//! if let Some(list) = asset.as_motion_list() {
//!     println!("'{}' holds {} motions", list.name, list.decoded_motions().count());
//! }
//! # Ok::<(), remot::Error>(())
//! ```
//!
//! ### Sampling a Motion
//!
//! Decoded channels evaluate at any point on the clip's timeline, with
//! linear interpolation for vectors and spherical interpolation for
//! rotations:
//!
//! ```no_run
//! use remot::formats::{Asset, from_bytes};
//!
//! let image = std::fs::read("walk.mot")?;
//! if let Asset::Motion(motion) = from_bytes(&image)? {
//!     for track in &motion.tracks {
//!         let sample = track.sample(0.25);
//!         if let Some(rotation) = sample.rotation {
//!             println!("bone {:#010x}: {rotation:?}", track.bone_hash);
//!         }
//!     }
//! }
//! # Ok::<(), remot::Error>(())
//! ```
//!
//! ### Using the Prelude
//!
//! The prelude provides convenient access to commonly used types:
//!
//! ```
//! use remot::prelude::*;
//!
//! // Now you have access to:
//! // - Asset, Motion, MotionList, Skeleton
//! // - BoneTrack, Channel, ChannelKind, TrackSample
//! // - Error, Result, and more
//! ```

pub mod error;
pub mod formats;

// Re-exports for convenience
pub use error::{Error, Result};

/// The math crate used throughout the public API, re-exported so callers
/// can name its types without pinning their own copy.
pub use glam;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::formats::common::{AssetHeader, AssetKind, Endianness, ImageView};
    pub use crate::formats::motion::{
        Bone, BoneTrack, Channel, ChannelKind, DecodeWarning, Motion, Skeleton, SkeletonBone,
        TrackSample,
    };
    pub use crate::formats::motion_list::MotionList;
    pub use crate::formats::registry::{Asset, from_bytes, load};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
