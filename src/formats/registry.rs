//! Asset registry
//!
//! Decoding starts here. [`from_bytes`] parses the 8-byte asset header,
//! detects byte order from the kind tag, and dispatches to the decoder
//! registered for the (kind, version) pair. Containers route their nested
//! assets back through the same table, so a list slot accepts any motion
//! version the registry knows.

use std::path::Path;

use crate::error::{Error, Result};
use crate::formats::common::{AssetHeader, AssetKind, ImageView};
use crate::formats::motion::{self, Motion};
use crate::formats::motion_list::{self, MotionList};

/// Any asset this library can decode.
#[derive(Debug, Clone)]
pub enum Asset {
    Motion(Motion),
    MotionList(MotionList),
}

impl Asset {
    pub fn kind(&self) -> AssetKind {
        match self {
            Asset::Motion(_) => AssetKind::Motion,
            Asset::MotionList(_) => AssetKind::MotionList,
        }
    }

    pub fn as_motion(&self) -> Option<&Motion> {
        match self {
            Asset::Motion(motion) => Some(motion),
            Asset::MotionList(_) => None,
        }
    }

    pub fn as_motion_list(&self) -> Option<&MotionList> {
        match self {
            Asset::MotionList(list) => Some(list),
            Asset::Motion(_) => None,
        }
    }
}

type DecodeFn = fn(&ImageView<'_>) -> Result<Asset>;

/// Registered decoders keyed by kind tag and schema version.
const REGISTRY: &[(AssetKind, u32, DecodeFn)] = &[
    (AssetKind::Motion, 43, decode_motion_43),
    (AssetKind::Motion, 65, decode_motion_65),
    (AssetKind::Motion, 78, decode_motion_78),
    (AssetKind::Motion, 458, decode_motion_458),
    (AssetKind::MotionList, 60, decode_list_60),
    (AssetKind::MotionList, 85, decode_list_85),
    (AssetKind::MotionList, 99, decode_list_99),
    (AssetKind::MotionList, 486, decode_list_486),
];

fn decode_motion_43(view: &ImageView<'_>) -> Result<Asset> {
    motion::read_v43(view).map(Asset::Motion)
}

fn decode_motion_65(view: &ImageView<'_>) -> Result<Asset> {
    motion::read_v65(view).map(Asset::Motion)
}

fn decode_motion_78(view: &ImageView<'_>) -> Result<Asset> {
    motion::read_v78(view).map(Asset::Motion)
}

fn decode_motion_458(view: &ImageView<'_>) -> Result<Asset> {
    motion::read_v458(view).map(Asset::Motion)
}

fn decode_list_60(view: &ImageView<'_>) -> Result<Asset> {
    motion_list::read_v60(view).map(Asset::MotionList)
}

fn decode_list_85(view: &ImageView<'_>) -> Result<Asset> {
    motion_list::read_v85(view).map(Asset::MotionList)
}

fn decode_list_99(view: &ImageView<'_>) -> Result<Asset> {
    motion_list::read_v99(view).map(Asset::MotionList)
}

fn decode_list_486(view: &ImageView<'_>) -> Result<Asset> {
    motion_list::read_v486(view).map(Asset::MotionList)
}

/// Reads and decodes an asset file from disk.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read, plus everything
/// [`from_bytes`] can return.
///
/// [`Error::Io`]: crate::Error::Io
pub fn load<P: AsRef<Path>>(path: P) -> Result<Asset> {
    let image = std::fs::read(path)?;
    from_bytes(&image)
}

/// Decodes an asset image held in memory.
///
/// # Errors
///
/// Returns [`Error::InvalidHeader`] or [`Error::TruncatedImage`] when the
/// image does not start with a recognizable asset header, and
/// [`Error::UnsupportedAssetVersion`] when the header names a schema
/// version with no registered decoder.
///
/// [`Error::InvalidHeader`]: crate::Error::InvalidHeader
/// [`Error::TruncatedImage`]: crate::Error::TruncatedImage
/// [`Error::UnsupportedAssetVersion`]: crate::Error::UnsupportedAssetVersion
pub fn from_bytes(image: &[u8]) -> Result<Asset> {
    let header = AssetHeader::parse(image)?;
    let view = ImageView::new(image, header.endianness);
    decode(&view, header)
}

/// Dispatches a parsed header to its registered decoder. The view's origin
/// must sit on the asset's first byte.
pub(crate) fn decode(view: &ImageView<'_>, header: AssetHeader) -> Result<Asset> {
    let decoder = REGISTRY
        .iter()
        .find_map(|&(kind, version, decoder)| {
            (kind == header.kind && version == header.version).then_some(decoder)
        })
        .ok_or(Error::UnsupportedAssetVersion {
            kind: header.kind,
            version: header.version,
        })?;

    decoder(view)
}
