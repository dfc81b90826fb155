//! Motion asset reading
//!
//! All four motion schemas decode through one path parameterized by a
//! [`Schema`] record capturing what moved between versions: header field
//! placement, track record stride, pointer slot width, and which codec
//! selection table applies.
//!
//! Every read goes through an [`ImageView`], so a motion embedded in a
//! container decodes with the same code as a standalone file once the view
//! is rebased to the motion's first byte.

use glam::{Quat, Vec4};

use super::codec::{self, CodecGeneration, CurveRecord};
use super::document::{Bone, BoneTrack, ChannelKind, DecodeWarning, Motion};
use crate::error::Result;
use crate::formats::common::ImageView;

/// Stride of one bone record.
const BONE_STRIDE: u64 = 80;

/// Layout parameters for one motion schema version.
#[derive(Debug, Clone, Copy)]
struct Schema {
    version: u32,
    generation: CodecGeneration,
    /// Track and curve records store 32-bit buffer offsets instead of
    /// 64-bit pointer slots.
    narrow_offsets: bool,
    /// Track records carry a per-bone blend weight.
    track_weight: bool,
    /// The header pad field doubles as an extension marker; when it is set
    /// the bone table is absent even if the pointer is not.
    pad_gates_bones: bool,
    track_stride: u64,
    curve_stride: u64,
}

const SCHEMA_43: Schema = Schema {
    version: 43,
    generation: CodecGeneration::Gen43,
    narrow_offsets: false,
    track_weight: false,
    pad_gates_bones: false,
    track_stride: 16,
    curve_stride: 40,
};

const SCHEMA_65: Schema = Schema {
    version: 65,
    generation: CodecGeneration::Gen65,
    narrow_offsets: false,
    track_weight: true,
    pad_gates_bones: false,
    track_stride: 24,
    curve_stride: 40,
};

const SCHEMA_78: Schema = Schema {
    version: 78,
    generation: CodecGeneration::Gen78,
    narrow_offsets: true,
    track_weight: false,
    pad_gates_bones: true,
    track_stride: 12,
    curve_stride: 20,
};

const SCHEMA_458: Schema = Schema {
    version: 458,
    generation: CodecGeneration::Gen78,
    narrow_offsets: true,
    track_weight: false,
    pad_gates_bones: true,
    track_stride: 12,
    curve_stride: 20,
};

/// Reads a schema 43 motion at the view origin.
pub(crate) fn read_v43(view: &ImageView<'_>) -> Result<Motion> {
    let header = read_header(view)?;
    decode_motion(view, &header, SCHEMA_43)
}

/// Reads a schema 65 motion at the view origin.
pub(crate) fn read_v65(view: &ImageView<'_>) -> Result<Motion> {
    let header = read_header(view)?;
    decode_motion(view, &header, SCHEMA_65)
}

/// Reads a schema 78 motion at the view origin.
pub(crate) fn read_v78(view: &ImageView<'_>) -> Result<Motion> {
    let header = read_header(view)?;
    decode_motion(view, &header, SCHEMA_78)
}

/// Reads a schema 458 motion at the view origin.
pub(crate) fn read_v458(view: &ImageView<'_>) -> Result<Motion> {
    let header = read_header_458(view)?;
    decode_motion(view, &header, SCHEMA_458)
}

/// Header fields normalized across both header layouts. Pointer fields are
/// kept unresolved.
#[derive(Debug)]
struct RawHeader {
    pad: u64,
    bones: u64,
    tracks: u64,
    name: u64,
    intervals: [f32; 4],
    num_bones: u16,
    num_tracks: u16,
    clip_count: u8,
    frame_rate: f32,
}

/// Reads the 120-byte header shared by schemas 43, 65 and 78.
fn read_header(view: &ImageView<'_>) -> Result<RawHeader> {
    let base = view.origin();
    Ok(RawHeader {
        pad: view.u64_at(base + 8)?,
        bones: view.u64_at(base + 16)?,
        tracks: view.u64_at(base + 24)?,
        name: view.u64_at(base + 80)?,
        intervals: read_intervals(view, base + 88)?,
        num_bones: view.u16_at(base + 104)?,
        num_tracks: view.u16_at(base + 106)?,
        clip_count: 0,
        frame_rate: f32::from(view.u16_at(base + 110)?),
    })
}

/// Reads the 128-byte schema 458 header, which gains a clip count and
/// widens the frame rate to 32 bits.
fn read_header_458(view: &ImageView<'_>) -> Result<RawHeader> {
    let base = view.origin();
    Ok(RawHeader {
        pad: view.u64_at(base + 8)?,
        bones: view.u64_at(base + 16)?,
        tracks: view.u64_at(base + 24)?,
        name: view.u64_at(base + 88)?,
        intervals: read_intervals(view, base + 96)?,
        num_bones: view.u16_at(base + 112)?,
        num_tracks: view.u16_at(base + 114)?,
        clip_count: view.u8_at(base + 116)?,
        frame_rate: view.u32_at(base + 120)? as f32,
    })
}

fn read_intervals(view: &ImageView<'_>, offset: u64) -> Result<[f32; 4]> {
    let values = view.f32s_at(offset, 4)?;
    Ok([values[0], values[1], values[2], values[3]])
}

fn decode_motion(view: &ImageView<'_>, header: &RawHeader, schema: Schema) -> Result<Motion> {
    let mut warnings = Vec::new();

    let name = match view.resolve(header.name)? {
        Some(offset) => view.wide_string_at(offset)?,
        None => String::new(),
    };

    let bones = if schema.pad_gates_bones && header.pad != 0 {
        Vec::new()
    } else {
        read_bones(view, header.bones, usize::from(header.num_bones))?
    };

    let tracks = read_tracks(view, header, schema, &mut warnings)?;

    tracing::debug!(
        "Decoded motion '{}' (schema {}): {} bones, {} tracks, {} warnings",
        name,
        schema.version,
        bones.len(),
        tracks.len(),
        warnings.len()
    );

    Ok(Motion {
        version: schema.version,
        name,
        frame_rate: header.frame_rate,
        intervals: header.intervals,
        clip_count: header.clip_count,
        bones,
        tracks,
        warnings,
    })
}

fn read_bones(view: &ImageView<'_>, stored: u64, count: usize) -> Result<Vec<Bone>> {
    let Some(array) = view.resolve(stored)? else {
        return Ok(Vec::new());
    };

    // The bones field points at an array header whose first slot points at
    // the records. The array header's own element count is not trusted;
    // the motion header count drives iteration.
    let Some(base) = view.resolve(view.u64_at(array)?)? else {
        return Ok(Vec::new());
    };

    (0..count as u64)
        .map(|index| read_bone(view, base + index * BONE_STRIDE))
        .collect()
}

fn read_bone(view: &ImageView<'_>, record: u64) -> Result<Bone> {
    let name = match view.resolve(view.u64_at(record)?)? {
        Some(offset) => view.wide_string_at(offset)?,
        None => String::new(),
    };

    Ok(Bone {
        name,
        parent_name: read_linked_name(view, view.u64_at(record + 8)?)?,
        first_child_name: read_linked_name(view, view.u64_at(record + 16)?)?,
        last_child_name: read_linked_name(view, view.u64_at(record + 24)?)?,
        position: read_vec4(view, record + 32)?,
        rotation: read_quat(view, record + 48)?,
        id: view.u32_at(record + 64)?,
        hash: view.u32_at(record + 68)?,
    })
}

/// Hierarchy links do not point at a string. They point at the linked
/// bone's own name field, so the name itself is two hops away.
fn read_linked_name(view: &ImageView<'_>, stored: u64) -> Result<Option<String>> {
    let Some(link) = view.resolve(stored)? else {
        return Ok(None);
    };

    let Some(name) = view.resolve(view.u64_at(link)?)? else {
        return Ok(None);
    };

    Ok(Some(view.wide_string_at(name)?))
}

fn read_vec4(view: &ImageView<'_>, offset: u64) -> Result<Vec4> {
    let values = view.f32s_at(offset, 4)?;
    Ok(Vec4::new(values[0], values[1], values[2], values[3]))
}

fn read_quat(view: &ImageView<'_>, offset: u64) -> Result<Quat> {
    let values = view.f32s_at(offset, 4)?;
    Ok(Quat::from_xyzw(values[0], values[1], values[2], values[3]))
}

fn read_tracks(
    view: &ImageView<'_>,
    header: &RawHeader,
    schema: Schema,
    warnings: &mut Vec<DecodeWarning>,
) -> Result<Vec<BoneTrack>> {
    let Some(base) = view.resolve(header.tracks)? else {
        return Ok(Vec::new());
    };

    (0..u64::from(header.num_tracks))
        .map(|index| read_track(view, base + index * schema.track_stride, schema, warnings))
        .collect()
}

fn read_track(
    view: &ImageView<'_>,
    offset: u64,
    schema: Schema,
    warnings: &mut Vec<DecodeWarning>,
) -> Result<BoneTrack> {
    let unknown = view.i16_at(offset)?;
    let used = view.u16_at(offset + 2)?;
    let bone_hash = view.u32_at(offset + 4)?;

    let (weight, curves_field) = if schema.track_weight {
        (Some(view.f32_at(offset + 8)?), offset + 16)
    } else {
        (None, offset + 8)
    };

    let mut track = BoneTrack {
        unknown,
        bone_hash,
        weight,
        position: None,
        rotation: None,
        scale: None,
    };

    let curves = read_pointer(view, curves_field, schema)?;
    let Some(mut cursor) = view.resolve(curves)? else {
        // Usage bits with no curve table leave the channels empty.
        for kind in ChannelKind::ALL {
            if used & kind.bit() != 0 {
                tracing::warn!(
                    "Track for bone {bone_hash:#010x} declares a {kind} curve but has no curve table"
                );
                warnings.push(DecodeWarning::MalformedCurve {
                    bone_hash,
                    kind,
                    reason: "curve table offset is zero".to_string(),
                });
            }
        }
        return Ok(track);
    };

    // Curve records sit back to back, one per set usage bit, in channel
    // declaration order.
    for kind in ChannelKind::ALL {
        if used & kind.bit() == 0 {
            continue;
        }

        match read_curve_record(view, cursor, schema) {
            Ok(curve) => bind_track_channel(view, &curve, kind, schema, &mut track, warnings),
            Err(err) => {
                tracing::warn!(
                    "Unreadable {kind} curve record on bone {bone_hash:#010x}: {err}"
                );
                warnings.push(DecodeWarning::MalformedCurve {
                    bone_hash,
                    kind,
                    reason: err.to_string(),
                });
            }
        }

        cursor += schema.curve_stride;
    }

    Ok(track)
}

/// Selects and binds one curve. Unknown encodings and payload read failures
/// downgrade to warnings so one bad curve cannot sink the motion.
fn bind_track_channel(
    view: &ImageView<'_>,
    curve: &CurveRecord,
    kind: ChannelKind,
    schema: Schema,
    track: &mut BoneTrack,
    warnings: &mut Vec<DecodeWarning>,
) {
    let Some(selected) = codec::select(schema.generation, curve.flags) else {
        tracing::warn!(
            "Unrecognized curve encoding {:#010x} on bone {:#010x}",
            curve.flags,
            track.bone_hash
        );
        warnings.push(DecodeWarning::UnknownCurveEncoding {
            bone_hash: track.bone_hash,
            flags: curve.flags,
        });
        return;
    };

    match codec::bind_channel(view, curve, kind, selected) {
        Ok(channel) => match kind {
            ChannelKind::Position => track.position = Some(channel),
            ChannelKind::Rotation => track.rotation = Some(channel),
            ChannelKind::Scale => track.scale = Some(channel),
        },
        Err(err) => {
            tracing::warn!(
                "Dropping malformed {kind} curve on bone {:#010x}: {err}",
                track.bone_hash
            );
            warnings.push(DecodeWarning::MalformedCurve {
                bone_hash: track.bone_hash,
                kind,
                reason: err.to_string(),
            });
        }
    }
}

fn read_curve_record(view: &ImageView<'_>, offset: u64, schema: Schema) -> Result<CurveRecord> {
    if schema.narrow_offsets {
        // Narrow records drop the per-curve rate and duration.
        Ok(CurveRecord {
            flags: view.u32_at(offset)?,
            num_frames: view.u32_at(offset + 4)?,
            frame_rate: 0,
            duration: 0.0,
            frames: u64::from(view.u32_at(offset + 8)?),
            control_points: u64::from(view.u32_at(offset + 12)?),
            bounds: u64::from(view.u32_at(offset + 16)?),
        })
    } else {
        Ok(CurveRecord {
            flags: view.u32_at(offset)?,
            num_frames: view.u32_at(offset + 4)?,
            frame_rate: view.u32_at(offset + 8)?,
            duration: view.f32_at(offset + 12)?,
            frames: view.u64_at(offset + 16)?,
            control_points: view.u64_at(offset + 24)?,
            bounds: view.u64_at(offset + 32)?,
        })
    }
}

fn read_pointer(view: &ImageView<'_>, field: u64, schema: Schema) -> Result<u64> {
    if schema.narrow_offsets {
        Ok(u64::from(view.u32_at(field)?))
    } else {
        view.u64_at(field)
    }
}
