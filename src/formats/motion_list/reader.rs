//! Motion list reading
//!
//! A list is a table of pointer slots, each holding a complete motion
//! asset with its own header. Slots decode independently through the asset
//! registry: an empty slot stays `None`, and a slot whose motion fails to
//! decode is recorded as a warning and left `None` rather than failing the
//! whole container.

use super::document::MotionList;
use crate::error::{Error, Result};
use crate::formats::common::{AssetHeader, AssetKind, ImageView};
use crate::formats::motion::{DecodeWarning, Motion, Skeleton};
use crate::formats::registry::{self, Asset};

/// Layout parameters for one list schema version. Only the slot count
/// placement moved across versions.
#[derive(Debug, Clone, Copy)]
struct Schema {
    version: u32,
    count_offset: u64,
}

const SCHEMA_60: Schema = Schema {
    version: 60,
    count_offset: 40,
};

const SCHEMA_85: Schema = Schema {
    version: 85,
    count_offset: 48,
};

const SCHEMA_99: Schema = Schema {
    version: 99,
    count_offset: 48,
};

const SCHEMA_486: Schema = Schema {
    version: 486,
    count_offset: 48,
};

/// Reads a schema 60 motion list at the view origin.
pub(crate) fn read_v60(view: &ImageView<'_>) -> Result<MotionList> {
    read_list(view, SCHEMA_60)
}

/// Reads a schema 85 motion list at the view origin.
pub(crate) fn read_v85(view: &ImageView<'_>) -> Result<MotionList> {
    read_list(view, SCHEMA_85)
}

/// Reads a schema 99 motion list at the view origin.
pub(crate) fn read_v99(view: &ImageView<'_>) -> Result<MotionList> {
    read_list(view, SCHEMA_99)
}

/// Reads a schema 486 motion list at the view origin.
pub(crate) fn read_v486(view: &ImageView<'_>) -> Result<MotionList> {
    read_list(view, SCHEMA_486)
}

fn read_list(view: &ImageView<'_>, schema: Schema) -> Result<MotionList> {
    let base = view.origin();
    let mut warnings = Vec::new();

    let name = match view.resolve(view.u64_at(base + 32)?)? {
        Some(offset) => view.wide_string_at(offset)?,
        None => String::new(),
    };

    let count = view.u32_at(base + schema.count_offset)? as usize;
    let motions = read_slots(view, view.u64_at(base + 16)?, count, &mut warnings)?;

    // The container stores no skeleton of its own. The first motion that
    // carries a bone table provides one for the whole list.
    let skeleton = motions
        .iter()
        .flatten()
        .find(|motion| !motion.bones.is_empty())
        .map(|motion| Skeleton::from_bones(&motion.bones));

    tracing::debug!(
        "Decoded motion list '{}' (schema {}): {} of {} slots, {} warnings",
        name,
        schema.version,
        motions.iter().flatten().count(),
        motions.len(),
        warnings.len()
    );

    Ok(MotionList {
        version: schema.version,
        name,
        motions,
        skeleton,
        warnings,
    })
}

fn read_slots(
    view: &ImageView<'_>,
    stored: u64,
    count: usize,
    warnings: &mut Vec<DecodeWarning>,
) -> Result<Vec<Option<Motion>>> {
    let Some(table) = view.resolve(stored)? else {
        return Ok(vec![None; count]);
    };

    Ok((0..count)
        .map(|slot| {
            decode_slot(view, table + (slot as u64) * 8).unwrap_or_else(|err| {
                tracing::warn!("Motion slot {slot} failed to decode: {err}");
                warnings.push(DecodeWarning::MotionSlotFailed {
                    slot,
                    reason: err.to_string(),
                });
                None
            })
        })
        .collect())
}

/// Decodes the asset behind one pointer slot. The nested motion carries its
/// own header, and every offset inside it is relative to its first byte, so
/// the view is rebased there before dispatch.
fn decode_slot(view: &ImageView<'_>, slot: u64) -> Result<Option<Motion>> {
    let Some(start) = view.resolve(view.u64_at(slot)?)? else {
        return Ok(None);
    };

    let nested = view.rebase(start)?;
    let header = AssetHeader::parse_nested(&nested)?;

    // Containers hold motions only. Checking the kind before dispatch also
    // rules out list-in-list recursion.
    if header.kind != AssetKind::Motion {
        return Err(Error::UnexpectedAssetKind {
            expected: AssetKind::Motion,
            found: header.kind,
        });
    }

    match registry::decode(&nested, header)? {
        Asset::Motion(motion) => Ok(Some(motion)),
        Asset::MotionList(_) => Err(Error::UnexpectedAssetKind {
            expected: AssetKind::Motion,
            found: AssetKind::MotionList,
        }),
    }
}
