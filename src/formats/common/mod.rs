//! Common types shared across all asset formats

pub mod image;

pub use image::{Endianness, ImageView};

use crate::error::{Error, Result};

/// Kind tag for motion clip assets.
pub const MOTION_TAG: [u8; 4] = *b"mot ";

/// Kind tag for motion list assets.
pub const MOTION_LIST_TAG: [u8; 4] = *b"mlst";

/// The broad asset type identified by a blob's kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// A single motion clip (`mot `).
    Motion,
    /// A list of motion clips plus skeleton data (`mlst`).
    MotionList,
}

impl AssetKind {
    /// The on-disk tag bytes for this kind, in file order on a
    /// little-endian source platform.
    pub fn tag(self) -> [u8; 4] {
        match self {
            AssetKind::Motion => MOTION_TAG,
            AssetKind::MotionList => MOTION_LIST_TAG,
        }
    }

    fn from_tag(tag: [u8; 4]) -> Option<AssetKind> {
        match tag {
            MOTION_TAG => Some(AssetKind::Motion),
            MOTION_LIST_TAG => Some(AssetKind::MotionList),
            _ => None,
        }
    }
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetKind::Motion => write!(f, "motion"),
            AssetKind::MotionList => write!(f, "motion list"),
        }
    }
}

/// The first 8 bytes of every asset blob: schema version, then kind tag.
///
/// The tag is ASCII and therefore also reveals the source platform's byte
/// order: a big-endian source stores the tag's four bytes reversed. All
/// multi-byte fields in the image, offsets included, follow the detected
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetHeader {
    /// On-disk schema generation.
    pub version: u32,
    /// Recognized asset kind.
    pub kind: AssetKind,
    /// Byte order of every multi-byte field in the image.
    pub endianness: Endianness,
}

impl AssetHeader {
    /// Reads the header from the start of an asset image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TruncatedImage`] when the image is shorter than the
    /// 8-byte header and [`Error::InvalidHeader`] when the kind tag matches
    /// no known asset kind in either byte order.
    pub fn parse(image: &[u8]) -> Result<AssetHeader> {
        if image.len() < 8 {
            return Err(Error::TruncatedImage { len: image.len() });
        }

        let tag = [image[4], image[5], image[6], image[7]];

        if let Some(kind) = AssetKind::from_tag(tag) {
            return Ok(AssetHeader {
                version: u32::from_le_bytes([image[0], image[1], image[2], image[3]]),
                kind,
                endianness: Endianness::Little,
            });
        }

        let swapped = [tag[3], tag[2], tag[1], tag[0]];

        if let Some(kind) = AssetKind::from_tag(swapped) {
            return Ok(AssetHeader {
                version: u32::from_be_bytes([image[0], image[1], image[2], image[3]]),
                kind,
                endianness: Endianness::Big,
            });
        }

        Err(Error::InvalidHeader { tag })
    }

    /// Reads the header of an asset nested inside a larger image, at the
    /// view's origin. A nested asset shares the parent's byte order, so the
    /// tag is only accepted in that order.
    pub(crate) fn parse_nested(view: &ImageView<'_>) -> Result<AssetHeader> {
        let base = view.origin();
        let version = view.u32_at(base)?;
        let raw = view.bytes_at(base + 4, 4)?;
        let stored = [raw[0], raw[1], raw[2], raw[3]];

        let tag = match view.endianness() {
            Endianness::Little => stored,
            Endianness::Big => [stored[3], stored[2], stored[1], stored[0]],
        };

        let kind = AssetKind::from_tag(tag).ok_or(Error::InvalidHeader { tag: stored })?;
        Ok(AssetHeader {
            version,
            kind,
            endianness: view.endianness(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_little_endian_motion_header() {
        let mut image = vec![0u8; 16];
        image[0..4].copy_from_slice(&43u32.to_le_bytes());
        image[4..8].copy_from_slice(b"mot ");

        let header = AssetHeader::parse(&image).unwrap();
        assert_eq!(header.version, 43);
        assert_eq!(header.kind, AssetKind::Motion);
        assert_eq!(header.endianness, Endianness::Little);
    }

    #[test]
    fn parses_big_endian_motion_list_header() {
        let mut image = vec![0u8; 16];
        image[0..4].copy_from_slice(&85u32.to_be_bytes());
        image[4..8].copy_from_slice(b"tslm");

        let header = AssetHeader::parse(&image).unwrap();
        assert_eq!(header.version, 85);
        assert_eq!(header.kind, AssetKind::MotionList);
        assert_eq!(header.endianness, Endianness::Big);
    }

    #[test]
    fn rejects_unknown_tag() {
        let mut image = vec![0u8; 16];
        image[4..8].copy_from_slice(b"mesh");

        match AssetHeader::parse(&image) {
            Err(Error::InvalidHeader { tag }) => assert_eq!(&tag, b"mesh"),
            other => panic!("expected InvalidHeader, got {other:?}"),
        }
    }

    #[test]
    fn rejects_truncated_image() {
        assert!(matches!(
            AssetHeader::parse(&[1, 2, 3]),
            Err(Error::TruncatedImage { len: 3 })
        ));
    }

    #[test]
    fn parses_nested_headers_at_the_view_origin() {
        let mut image = vec![0u8; 64];
        image[40..44].copy_from_slice(&78u32.to_le_bytes());
        image[44..48].copy_from_slice(b"mot ");

        let view = ImageView::new(&image, Endianness::Little);
        let nested = view.rebase(40).unwrap();

        let header = AssetHeader::parse_nested(&nested).unwrap();
        assert_eq!(header.version, 78);
        assert_eq!(header.kind, AssetKind::Motion);
    }
}
