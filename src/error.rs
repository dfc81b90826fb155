//! Error types for `remot`

use thiserror::Error;

use crate::formats::common::AssetKind;

/// The error type for `remot` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== Header / Registry Errors ====================
    /// The blob's kind tag does not match any asset kind this library knows.
    #[error("invalid asset header: unrecognized kind tag {tag:?}")]
    InvalidHeader {
        /// The four tag bytes as stored in the image.
        tag: [u8; 4],
    },

    /// The kind tag is recognized but the schema version is not registered.
    #[error("unsupported {kind} version {version}")]
    UnsupportedAssetVersion {
        /// The recognized asset kind.
        kind: AssetKind,
        /// The schema version found in the header.
        version: u32,
    },

    /// The image is too small to hold an asset header.
    #[error("truncated asset image: {len} bytes, need at least 8")]
    TruncatedImage {
        /// The image size in bytes.
        len: usize,
    },

    /// A nested asset decoded to a kind its container cannot hold.
    #[error("expected a {expected} asset, found {found}")]
    UnexpectedAssetKind {
        /// The kind the container requires.
        expected: AssetKind,
        /// The kind the nested header declared.
        found: AssetKind,
    },

    // ==================== Relocation Errors ====================
    /// A stored offset points outside the owning image.
    #[error("offset {offset:#x} out of bounds for {len}-byte image")]
    OffsetOutOfBounds {
        /// The absolute byte position that failed to resolve.
        offset: u64,
        /// The image size in bytes.
        len: usize,
    },

    /// A read of `count` bytes at `offset` would run past the image end.
    #[error("short read: {count} bytes at {offset:#x} exceeds {len}-byte image")]
    ShortRead {
        /// The absolute byte position of the read.
        offset: u64,
        /// The number of bytes requested.
        count: usize,
        /// The image size in bytes.
        len: usize,
    },

    /// A wide string ran past the image end without a terminator.
    #[error("unterminated string at {offset:#x}")]
    UnterminatedString {
        /// The absolute byte position where the string starts.
        offset: u64,
    },

    // ==================== Curve Errors ====================
    /// A curve declares keyframes but carries no control point data.
    #[error("curve has {frames} keyframes but no control point data")]
    MissingControlPoints {
        /// The declared keyframe count.
        frames: u32,
    },
}

/// A specialized Result type for `remot` operations.
pub type Result<T> = std::result::Result<T, Error>;
