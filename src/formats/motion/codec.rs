//! Curve compression codecs
//!
//! Every curve record carries a 32-bit encoding tag. Bits 20..24 select the
//! keyframe number width (4 means 16-bit, anything else 8-bit) and take no
//! part in codec selection, so lookup masks them off with [`SELECTION_MASK`].
//! Bits 12..16 name the animated lane for single-axis codecs and stay part
//! of the key.
//!
//! Selection tables changed across schema versions and a few keys were
//! recycled with a different meaning, so each curve generation gets its own
//! table instead of one shared map.
//!
//! Payloads come in three families:
//! - raw: one float triple per keyframe, quaternions store xyz only
//! - packed: all three lanes quantized into one small integer per keyframe,
//!   expanded against bounds as `value = normalized * scale + bias`
//! - single-axis: one scalar per keyframe drives a single lane while the
//!   bounds pin the rest

use glam::{Vec3, Vec4};

use super::document::{Channel, ChannelKind};
use crate::error::{Error, Result};
use crate::formats::common::ImageView;

/// Bits of the encoding tag that participate in codec selection.
const SELECTION_MASK: u32 = 0xff0f_ffff;

/// Value of the width nibble that selects 16-bit keyframe numbers.
const WIDE_FRAME_NUMBERS: u32 = 4;

/// Sampling clock applied when a curve record carries no rate of its own.
const FALLBACK_FRAME_RATE: f32 = 60.0;

/// Curve encoding generation. Motion schemas 43 and 65 each have their own
/// table; 78 and 458 share the third.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CodecGeneration {
    Gen43,
    Gen65,
    Gen78,
}

/// Lane selector for single-axis codecs, taken from bits 12..16 of the
/// encoding tag. `All` broadcasts the scalar to every lane and only occurs
/// on vector curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Axis {
    X,
    Y,
    Z,
    All,
}

impl Axis {
    fn from_flags(flags: u32) -> Axis {
        match (flags >> 12) & 0xf {
            1 => Axis::X,
            2 => Axis::Y,
            3 => Axis::Z,
            _ => Axis::All,
        }
    }

    fn lane(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
            Axis::All => 3,
        }
    }
}

/// Quantization width of a packed payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PackedWidth {
    /// Three 5-bit lanes in a u16.
    B5,
    /// Three bytes, one per lane.
    B8,
    /// Three 10-bit lanes in a u32.
    B10,
    /// Three 13-bit lanes in five big-endian bytes.
    B13,
    /// Three u16 values, one per lane.
    B16,
    /// Three 18-bit lanes in seven big-endian bytes.
    B18,
    /// Three 21-bit lanes in a u64.
    B21,
}

/// A decode behavior selected from an encoding tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CodecKind {
    Vec3Raw,
    Quat3Raw,
    Vec3Packed(PackedWidth),
    Quat3Packed(PackedWidth),
    Vec3Axis,
    Vec3AxisPacked16,
    Quat3Axis,
    Quat3AxisPacked16,
    /// 16-bit single-axis rotation with the older bounds layout, where the
    /// animated lane reads its scale and bias from its own bounds lanes.
    Quat3AxisPacked16Legacy,
}

/// Schema 43 selection table.
const CODECS_43: &[(u32, CodecKind)] = &[
    (0x000F2, CodecKind::Vec3Raw),
    (0xB0112, CodecKind::Quat3Raw),
    (0x31112, CodecKind::Quat3Axis),
    (0x32112, CodecKind::Quat3Axis),
    (0x33112, CodecKind::Quat3Axis),
    (0x21112, CodecKind::Quat3AxisPacked16Legacy),
    (0x22112, CodecKind::Quat3AxisPacked16Legacy),
    (0x23112, CodecKind::Quat3AxisPacked16Legacy),
    (0x30112, CodecKind::Quat3Packed(PackedWidth::B10)),
    (0x70112, CodecKind::Quat3Packed(PackedWidth::B21)),
];

/// Schema 65 selection table. Adds single-axis vector codecs and switches
/// the 16-bit single-axis rotations to the reworked bounds layout.
const CODECS_65: &[(u32, CodecKind)] = &[
    (0x000F2, CodecKind::Vec3Raw),
    (0xB0112, CodecKind::Quat3Raw),
    (0x31112, CodecKind::Quat3Axis),
    (0x32112, CodecKind::Quat3Axis),
    (0x33112, CodecKind::Quat3Axis),
    (0x21112, CodecKind::Quat3AxisPacked16),
    (0x22112, CodecKind::Quat3AxisPacked16),
    (0x23112, CodecKind::Quat3AxisPacked16),
    (0x310F2, CodecKind::Vec3Axis),
    (0x320F2, CodecKind::Vec3Axis),
    (0x330F2, CodecKind::Vec3Axis),
    (0x340F2, CodecKind::Vec3Axis),
    (0x210F2, CodecKind::Vec3AxisPacked16),
    (0x220F2, CodecKind::Vec3AxisPacked16),
    (0x230F2, CodecKind::Vec3AxisPacked16),
    (0x240F2, CodecKind::Vec3AxisPacked16),
    (0x30112, CodecKind::Quat3Packed(PackedWidth::B10)),
    (0x70112, CodecKind::Quat3Packed(PackedWidth::B21)),
];

/// Schema 78 and 458 selection table. The single-axis keys moved to the
/// 0x4 block and the full packed width ladder appeared. 0x30112 and 0x70112
/// bind to narrower layouts here than in the older tables.
const CODECS_78: &[(u32, CodecKind)] = &[
    (0x000F2, CodecKind::Vec3Raw),
    (0xC0112, CodecKind::Quat3Raw),
    (0x41112, CodecKind::Quat3Axis),
    (0x42112, CodecKind::Quat3Axis),
    (0x43112, CodecKind::Quat3Axis),
    (0x21112, CodecKind::Quat3AxisPacked16),
    (0x22112, CodecKind::Quat3AxisPacked16),
    (0x23112, CodecKind::Quat3AxisPacked16),
    (0x410F2, CodecKind::Vec3Axis),
    (0x420F2, CodecKind::Vec3Axis),
    (0x430F2, CodecKind::Vec3Axis),
    (0x440F2, CodecKind::Vec3Axis),
    (0x210F2, CodecKind::Vec3AxisPacked16),
    (0x220F2, CodecKind::Vec3AxisPacked16),
    (0x230F2, CodecKind::Vec3AxisPacked16),
    (0x240F2, CodecKind::Vec3AxisPacked16),
    (0x200F2, CodecKind::Vec3Packed(PackedWidth::B5)),
    (0x400F2, CodecKind::Vec3Packed(PackedWidth::B10)),
    (0x800F2, CodecKind::Vec3Packed(PackedWidth::B21)),
    (0x20112, CodecKind::Quat3Packed(PackedWidth::B5)),
    (0x30112, CodecKind::Quat3Packed(PackedWidth::B8)),
    (0x40112, CodecKind::Quat3Packed(PackedWidth::B10)),
    (0x50112, CodecKind::Quat3Packed(PackedWidth::B13)),
    (0x60112, CodecKind::Quat3Packed(PackedWidth::B16)),
    (0x70112, CodecKind::Quat3Packed(PackedWidth::B18)),
    (0x80112, CodecKind::Quat3Packed(PackedWidth::B21)),
];

/// Looks up the codec an encoding tag selects under a given generation.
/// Returns `None` for tags the generation does not define.
pub(crate) fn select(generation: CodecGeneration, flags: u32) -> Option<CodecKind> {
    let key = flags & SELECTION_MASK;
    let table = match generation {
        CodecGeneration::Gen43 => CODECS_43,
        CodecGeneration::Gen65 => CODECS_65,
        CodecGeneration::Gen78 => CODECS_78,
    };

    table
        .iter()
        .find_map(|&(id, kind)| (id == key).then_some(kind))
}

/// Curve record fields normalized across schema layouts. Offsets are kept
/// unresolved; zero denotes an absent field. Schemas without a per-curve
/// rate or duration leave those at zero.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CurveRecord {
    pub flags: u32,
    pub num_frames: u32,
    pub frame_rate: u32,
    pub duration: f32,
    pub frames: u64,
    pub control_points: u64,
    pub bounds: u64,
}

#[derive(Debug, Clone, Copy)]
struct Bounds {
    min: Vec4,
    max: Vec4,
}

impl Bounds {
    /// Bounds default to zero when the record carries none, which decodes
    /// packed payloads to zero rather than failing.
    const ZERO: Bounds = Bounds {
        min: Vec4::ZERO,
        max: Vec4::ZERO,
    };
}

/// Binds a curve record to a decoded [`Channel`], reading keyframe numbers,
/// bounds, and the control point payload through `view`.
///
/// # Errors
///
/// Fails when the payload reads run past the image or when keyframes are
/// declared without control point data. Callers treat any failure here as
/// a malformed curve, not a malformed asset.
pub(crate) fn bind_channel(
    view: &ImageView<'_>,
    record: &CurveRecord,
    kind: ChannelKind,
    codec: CodecKind,
) -> Result<Channel> {
    let count = record.num_frames as usize;
    let frames = read_frame_numbers(view, record, count)?;
    let bounds = read_bounds(view, record)?;

    let control_points = match view.resolve(record.control_points)? {
        Some(offset) => offset,
        None if count == 0 => 0,
        None => {
            return Err(Error::MissingControlPoints {
                frames: record.num_frames,
            });
        }
    };

    let frame_rate = if record.frame_rate > 0 {
        record.frame_rate as f32
    } else {
        FALLBACK_FRAME_RATE
    };

    let duration = if record.duration > 0.0 {
        record.duration
    } else {
        frames.last().map_or(0.0, |&last| last as f32 / frame_rate)
    };

    let codec = build_codec(view, record, codec, &bounds, control_points, count)?;

    Ok(Channel {
        kind,
        flags: record.flags,
        frame_rate,
        duration,
        frames,
        codec,
    })
}

fn read_frame_numbers(
    view: &ImageView<'_>,
    record: &CurveRecord,
    count: usize,
) -> Result<Vec<u32>> {
    let Some(offset) = view.resolve(record.frames)? else {
        // No keyframe number table: the keyframes are consecutive.
        return Ok((0..count as u32).collect());
    };

    if (record.flags >> 20) & 0xf == WIDE_FRAME_NUMBERS {
        Ok(view
            .u16s_at(offset, count)?
            .into_iter()
            .map(u32::from)
            .collect())
    } else {
        Ok(view
            .bytes_at(offset, count)?
            .iter()
            .map(|&n| u32::from(n))
            .collect())
    }
}

fn read_bounds(view: &ImageView<'_>, record: &CurveRecord) -> Result<Bounds> {
    let Some(offset) = view.resolve(record.bounds)? else {
        return Ok(Bounds::ZERO);
    };

    let values = view.f32s_at(offset, 8)?;
    Ok(Bounds {
        min: Vec4::from_slice(&values[0..4]),
        max: Vec4::from_slice(&values[4..8]),
    })
}

fn build_codec(
    view: &ImageView<'_>,
    record: &CurveRecord,
    codec: CodecKind,
    bounds: &Bounds,
    control_points: u64,
    count: usize,
) -> Result<SampleCodec> {
    let min = bounds.min;
    let max = bounds.max;
    let axis = Axis::from_flags(record.flags);

    Ok(match codec {
        CodecKind::Vec3Raw => SampleCodec::Vec3Raw {
            values: read_triples(view, control_points, count)?,
        },
        CodecKind::Quat3Raw => SampleCodec::Quat3Raw {
            values: read_triples(view, control_points, count)?,
        },
        CodecKind::Vec3Packed(width) => SampleCodec::Vec3Packed {
            lanes: read_lanes(view, control_points, width, count)?,
            scale: min.truncate(),
            // Vector bounds store the bias shuffled one lane over.
            bias: Vec3::new(min.w, max.x, max.y),
        },
        CodecKind::Quat3Packed(width) => SampleCodec::Quat3Packed {
            lanes: read_lanes(view, control_points, width, count)?,
            scale: min.truncate(),
            bias: max.truncate(),
        },
        CodecKind::Vec3Axis => SampleCodec::Vec3Axis {
            axis,
            values: view.f32s_at(control_points, count)?,
            base: min.truncate(),
        },
        CodecKind::Vec3AxisPacked16 => SampleCodec::Vec3AxisPacked16 {
            axis,
            raw: view.u16s_at(control_points, count)?,
            scale: min.x,
            base: Vec3::new(min.y, min.z, min.w),
        },
        CodecKind::Quat3Axis => SampleCodec::Quat3Axis {
            axis,
            values: view.f32s_at(control_points, count)?,
        },
        CodecKind::Quat3AxisPacked16 => SampleCodec::Quat3AxisPacked16 {
            axis,
            raw: view.u16s_at(control_points, count)?,
            scale: min.x,
            bias: min.y,
        },
        CodecKind::Quat3AxisPacked16Legacy => {
            let lane = axis.lane().min(2);
            SampleCodec::Quat3AxisPacked16 {
                axis,
                raw: view.u16s_at(control_points, count)?,
                scale: min[lane],
                bias: max[lane],
            }
        }
    })
}

fn read_triples(view: &ImageView<'_>, offset: u64, count: usize) -> Result<Vec<Vec3>> {
    let floats = view.f32s_at(offset, count * 3)?;
    Ok(floats
        .chunks_exact(3)
        .map(|c| Vec3::new(c[0], c[1], c[2]))
        .collect())
}

fn read_lanes(
    view: &ImageView<'_>,
    offset: u64,
    width: PackedWidth,
    count: usize,
) -> Result<PackedLanes> {
    Ok(match width {
        PackedWidth::B5 => PackedLanes::B5(view.u16s_at(offset, count)?),
        PackedWidth::B10 => PackedLanes::B10(view.u32s_at(offset, count)?),
        PackedWidth::B21 => PackedLanes::B21(view.u64s_at(offset, count)?),
        PackedWidth::B8 => PackedLanes::B8(
            view.bytes_at(offset, count * 3)?
                .chunks_exact(3)
                .map(|c| [c[0], c[1], c[2]])
                .collect(),
        ),
        PackedWidth::B16 => PackedLanes::B16(
            view.u16s_at(offset, count * 3)?
                .chunks_exact(3)
                .map(|c| [c[0], c[1], c[2]])
                .collect(),
        ),
        PackedWidth::B13 => PackedLanes::B13(
            view.bytes_at(offset, count * 5)?
                .chunks_exact(5)
                .map(|c| [c[0], c[1], c[2], c[3], c[4]])
                .collect(),
        ),
        PackedWidth::B18 => PackedLanes::B18(
            view.bytes_at(offset, count * 7)?
                .chunks_exact(7)
                .map(|c| [c[0], c[1], c[2], c[3], c[4], c[5], c[6]])
                .collect(),
        ),
    })
}

/// Packed per-keyframe lane storage. `normalized` expands one keyframe to
/// three lanes scaled into `0..=1`.
#[derive(Debug, Clone)]
pub(crate) enum PackedLanes {
    B5(Vec<u16>),
    B8(Vec<[u8; 3]>),
    B10(Vec<u32>),
    B13(Vec<[u8; 5]>),
    B16(Vec<[u16; 3]>),
    B18(Vec<[u8; 7]>),
    B21(Vec<u64>),
}

impl PackedLanes {
    fn normalized(&self, index: usize) -> Vec3 {
        match self {
            PackedLanes::B5(words) => unpack3(u64::from(words[index]), 5),
            PackedLanes::B10(words) => unpack3(u64::from(words[index]), 10),
            PackedLanes::B21(words) => unpack3(words[index], 21),
            PackedLanes::B8(triples) => {
                let [x, y, z] = triples[index];
                Vec3::new(f32::from(x), f32::from(y), f32::from(z)) / 255.0
            }
            PackedLanes::B16(triples) => {
                let [x, y, z] = triples[index];
                Vec3::new(f32::from(x), f32::from(y), f32::from(z)) / 65535.0
            }
            PackedLanes::B13(groups) => {
                let g = groups[index];
                let raw = (u64::from(g[0]) << 32)
                    | (u64::from(g[1]) << 24)
                    | (u64::from(g[2]) << 16)
                    | (u64::from(g[3]) << 8)
                    | u64::from(g[4]);
                unpack3(raw, 13)
            }
            PackedLanes::B18(groups) => {
                let g = groups[index];
                let raw = (u64::from(g[0]) << 48)
                    | (u64::from(g[1]) << 40)
                    | (u64::from(g[2]) << 32)
                    | (u64::from(g[3]) << 24)
                    | (u64::from(g[4]) << 16)
                    | (u64::from(g[5]) << 8)
                    | u64::from(g[6]);
                unpack3(raw, 18)
            }
        }
    }
}

/// Splits a packed integer into three lanes of `bits` each, least
/// significant lane first, normalized by the lane maximum.
fn unpack3(raw: u64, bits: u32) -> Vec3 {
    let mask = (1u64 << bits) - 1;
    Vec3::new(
        (raw & mask) as f32,
        ((raw >> bits) & mask) as f32,
        ((raw >> (bits * 2)) & mask) as f32,
    ) / mask as f32
}

/// Rebuilds the implicit fourth lane of a unit quaternion stored as xyz.
/// The encoder keeps w non-negative, so the root is taken directly.
fn reconstruct_w(xyz: Vec3) -> Vec4 {
    let w = (1.0 - xyz.length_squared()).max(0.0).sqrt();
    xyz.extend(w)
}

/// A bound codec holding its decoded payload. Sampling is pure and
/// allocation free.
#[derive(Debug, Clone)]
pub(crate) enum SampleCodec {
    Vec3Raw {
        values: Vec<Vec3>,
    },
    Quat3Raw {
        values: Vec<Vec3>,
    },
    Vec3Packed {
        lanes: PackedLanes,
        scale: Vec3,
        bias: Vec3,
    },
    Quat3Packed {
        lanes: PackedLanes,
        scale: Vec3,
        bias: Vec3,
    },
    Vec3Axis {
        axis: Axis,
        values: Vec<f32>,
        base: Vec3,
    },
    Vec3AxisPacked16 {
        axis: Axis,
        raw: Vec<u16>,
        scale: f32,
        base: Vec3,
    },
    Quat3Axis {
        axis: Axis,
        values: Vec<f32>,
    },
    Quat3AxisPacked16 {
        axis: Axis,
        raw: Vec<u16>,
        scale: f32,
        bias: f32,
    },
}

impl SampleCodec {
    /// Decodes the value at keyframe `index`. The index must be in range
    /// for the channel's keyframe table.
    pub(crate) fn sample(&self, index: usize) -> Vec4 {
        match self {
            SampleCodec::Vec3Raw { values } => values[index].extend(0.0),
            SampleCodec::Quat3Raw { values } => reconstruct_w(values[index]),
            SampleCodec::Vec3Packed { lanes, scale, bias } => {
                (lanes.normalized(index) * *scale + *bias).extend(0.0)
            }
            SampleCodec::Quat3Packed { lanes, scale, bias } => {
                reconstruct_w(lanes.normalized(index) * *scale + *bias)
            }
            SampleCodec::Vec3Axis { axis, values, base } => {
                single_lane_vector(*axis, *base, values[index])
            }
            SampleCodec::Vec3AxisPacked16 {
                axis,
                raw,
                scale,
                base,
            } => {
                let t = f32::from(raw[index]) / 65535.0;
                let value = base[axis.lane() % 3] + scale * t;
                single_lane_vector(*axis, *base, value)
            }
            SampleCodec::Quat3Axis { axis, values } => {
                single_lane_quat(*axis, values[index])
            }
            SampleCodec::Quat3AxisPacked16 {
                axis,
                raw,
                scale,
                bias,
            } => {
                let t = f32::from(raw[index]) / 65535.0;
                single_lane_quat(*axis, bias + scale * t)
            }
        }
    }
}

fn single_lane_vector(axis: Axis, base: Vec3, value: f32) -> Vec4 {
    if axis == Axis::All {
        return Vec4::new(value, value, value, 0.0);
    }

    let mut out = base.extend(0.0);
    out[axis.lane()] = value;
    out
}

fn single_lane_quat(axis: Axis, value: f32) -> Vec4 {
    let mut xyz = Vec3::ZERO;
    if axis.lane() < 3 {
        xyz[axis.lane()] = value;
    }
    reconstruct_w(xyz)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const EPS: f32 = 1e-5;

    fn le_view(data: &[u8]) -> ImageView<'_> {
        ImageView::new(data, crate::formats::common::Endianness::Little)
    }

    fn record(flags: u32, num_frames: u32, frames: u64, control_points: u64, bounds: u64) -> CurveRecord {
        CurveRecord {
            flags,
            num_frames,
            frame_rate: 0,
            duration: 0.0,
            frames,
            control_points,
            bounds,
        }
    }

    fn push_f32s(data: &mut Vec<u8>, values: &[f32]) {
        for v in values {
            data.extend_from_slice(&v.to_le_bytes());
        }
    }

    fn assert_vec4_eq(actual: Vec4, expected: Vec4) {
        assert!(
            (actual - expected).abs().max_element() < EPS,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn selection_ignores_the_frame_width_nibble() {
        assert_eq!(
            select(CodecGeneration::Gen43, 0x000F2),
            select(CodecGeneration::Gen43, 0x4000F2)
        );
        assert_eq!(
            select(CodecGeneration::Gen43, 0x4000F2),
            Some(CodecKind::Vec3Raw)
        );
    }

    #[test]
    fn recycled_keys_select_by_generation() {
        assert_eq!(
            select(CodecGeneration::Gen43, 0x30112),
            Some(CodecKind::Quat3Packed(PackedWidth::B10))
        );
        assert_eq!(
            select(CodecGeneration::Gen78, 0x30112),
            Some(CodecKind::Quat3Packed(PackedWidth::B8))
        );
        assert_eq!(
            select(CodecGeneration::Gen43, 0x70112),
            Some(CodecKind::Quat3Packed(PackedWidth::B21))
        );
        assert_eq!(
            select(CodecGeneration::Gen78, 0x70112),
            Some(CodecKind::Quat3Packed(PackedWidth::B18))
        );
    }

    #[test]
    fn single_axis_vectors_appear_in_later_generations() {
        assert_eq!(select(CodecGeneration::Gen43, 0x310F2), None);
        assert_eq!(
            select(CodecGeneration::Gen65, 0x310F2),
            Some(CodecKind::Vec3Axis)
        );
        assert_eq!(select(CodecGeneration::Gen78, 0x310F2), None);
        assert_eq!(
            select(CodecGeneration::Gen78, 0x410F2),
            Some(CodecKind::Vec3Axis)
        );
    }

    #[test]
    fn unknown_tag_selects_nothing() {
        assert_eq!(select(CodecGeneration::Gen78, 0xDEAD0), None);
    }

    #[test]
    fn binds_raw_vector_curves() {
        let mut data = vec![0u8; 16];
        let frames_off = data.len() as u64;
        data.extend_from_slice(&[0, 10]);
        let cp_off = data.len() as u64;
        push_f32s(&mut data, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

        let view = le_view(&data);
        let rec = record(0x000F2, 2, frames_off, cp_off, 0);
        let channel =
            bind_channel(&view, &rec, ChannelKind::Position, CodecKind::Vec3Raw).unwrap();

        assert_eq!(channel.frames, vec![0, 10]);
        assert_vec4_eq(channel.value_at(0), Vec4::new(1.0, 2.0, 3.0, 0.0));
        assert_vec4_eq(channel.value_at(1), Vec4::new(4.0, 5.0, 6.0, 0.0));
    }

    #[test]
    fn wide_nibble_reads_16bit_frame_numbers() {
        let mut data = vec![0u8; 16];
        let frames_off = data.len() as u64;
        data.extend_from_slice(&300u16.to_le_bytes());
        let cp_off = data.len() as u64;
        push_f32s(&mut data, &[1.0, 1.0, 1.0]);

        let view = le_view(&data);
        let rec = record(0x4000F2, 1, frames_off, cp_off, 0);
        let channel =
            bind_channel(&view, &rec, ChannelKind::Position, CodecKind::Vec3Raw).unwrap();

        assert_eq!(channel.frames, vec![300]);
    }

    #[test]
    fn missing_frame_table_synthesizes_consecutive_numbers() {
        let mut data = vec![0u8; 16];
        let cp_off = data.len() as u64;
        push_f32s(&mut data, &[0.0; 9]);

        let view = le_view(&data);
        let rec = record(0x000F2, 3, 0, cp_off, 0);
        let channel =
            bind_channel(&view, &rec, ChannelKind::Position, CodecKind::Vec3Raw).unwrap();

        assert_eq!(channel.frames, vec![0, 1, 2]);
    }

    #[test]
    fn missing_control_points_fail_the_curve() {
        let data = vec![0u8; 16];
        let view = le_view(&data);
        let rec = record(0x000F2, 2, 0, 0, 0);

        let result = bind_channel(&view, &rec, ChannelKind::Position, CodecKind::Vec3Raw);
        assert!(matches!(
            result,
            Err(Error::MissingControlPoints { frames: 2 })
        ));
    }

    #[test]
    fn truncated_control_points_fail_the_curve() {
        let mut data = vec![0u8; 16];
        let cp_off = data.len() as u64;
        push_f32s(&mut data, &[1.0, 2.0, 3.0]);

        let view = le_view(&data);
        let rec = record(0x000F2, 2, 0, cp_off, 0);

        assert!(bind_channel(&view, &rec, ChannelKind::Position, CodecKind::Vec3Raw).is_err());
    }

    #[test]
    fn raw_quaternions_rebuild_the_fourth_lane() {
        let mut data = vec![0u8; 16];
        let cp_off = data.len() as u64;
        push_f32s(&mut data, &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

        let view = le_view(&data);
        let rec = record(0xB0112, 2, 0, cp_off, 0);
        let channel =
            bind_channel(&view, &rec, ChannelKind::Rotation, CodecKind::Quat3Raw).unwrap();

        assert_vec4_eq(channel.value_at(0), Vec4::new(0.0, 0.0, 0.0, 1.0));
        assert_vec4_eq(channel.value_at(1), Vec4::new(1.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn packed_vector_dequantizes_against_shuffled_bias() {
        // scale (min.xyz) = 2, bias = (min.w, max.x, max.y) = (10, 20, 30).
        let mut data = vec![0u8; 16];
        let bounds_off = data.len() as u64;
        push_f32s(&mut data, &[2.0, 2.0, 2.0, 10.0, 20.0, 30.0, 0.0, 0.0]);
        let cp_off = data.len() as u64;
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&0x3FFF_FFFFu32.to_le_bytes());

        let view = le_view(&data);
        let rec = record(0x400F2, 2, 0, cp_off, bounds_off);
        let channel = bind_channel(
            &view,
            &rec,
            ChannelKind::Position,
            CodecKind::Vec3Packed(PackedWidth::B10),
        )
        .unwrap();

        // Zero quantized lanes land on the bias exactly.
        assert_vec4_eq(channel.value_at(0), Vec4::new(10.0, 20.0, 30.0, 0.0));
        // Saturated lanes land on scale + bias.
        assert_vec4_eq(channel.value_at(1), Vec4::new(12.0, 22.0, 32.0, 0.0));
    }

    #[test]
    fn packed_quaternion_keeps_unit_length() {
        let half = 0.5f32;
        // Encode x = y = 0.5 with scale 1 and bias 0, leaving z at zero.
        let raw = (half * 1023.0).round() as u32;
        let word = raw | (raw << 10);

        let mut data = vec![0u8; 16];
        let bounds_off = data.len() as u64;
        push_f32s(&mut data, &[1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let cp_off = data.len() as u64;
        data.extend_from_slice(&word.to_le_bytes());

        let view = le_view(&data);
        let rec = record(0x30112, 1, 0, cp_off, bounds_off);
        let channel = bind_channel(
            &view,
            &rec,
            ChannelKind::Rotation,
            CodecKind::Quat3Packed(PackedWidth::B10),
        )
        .unwrap();

        let q = channel.value_at(0);
        assert!((q.length() - 1.0).abs() < 1e-4);
        assert!((q.x - half).abs() < 1e-3);
        assert!((q.y - half).abs() < 1e-3);
        assert!(q.w > 0.0);
    }

    #[test]
    fn thirteen_bit_groups_assemble_big_endian() {
        // Lane x saturated, lanes y and z zero: raw 40-bit value 0x1FFF.
        let mut data = vec![0u8; 16];
        let bounds_off = data.len() as u64;
        push_f32s(&mut data, &[1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let cp_off = data.len() as u64;
        data.extend_from_slice(&[0x00, 0x00, 0x00, 0x1F, 0xFF]);

        let view = le_view(&data);
        let rec = record(0x50112, 1, 0, cp_off, bounds_off);
        let channel = bind_channel(
            &view,
            &rec,
            ChannelKind::Rotation,
            CodecKind::Quat3Packed(PackedWidth::B13),
        )
        .unwrap();

        let q = channel.value_at(0);
        assert!((q.x - 1.0).abs() < EPS);
        assert!(q.y.abs() < EPS);
        assert!(q.z.abs() < EPS);
        assert!(q.w.abs() < 1e-3);
    }

    #[test]
    fn eighteen_bit_groups_assemble_big_endian() {
        // Lane y saturated: raw = mask << 18.
        let raw: u64 = 0x3FFFF << 18;
        let group = [
            (raw >> 48) as u8,
            (raw >> 40) as u8,
            (raw >> 32) as u8,
            (raw >> 24) as u8,
            (raw >> 16) as u8,
            (raw >> 8) as u8,
            raw as u8,
        ];

        let mut data = vec![0u8; 16];
        let bounds_off = data.len() as u64;
        push_f32s(&mut data, &[1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let cp_off = data.len() as u64;
        data.extend_from_slice(&group);

        let view = le_view(&data);
        let rec = record(0x70112, 1, 0, cp_off, bounds_off);
        let channel = bind_channel(
            &view,
            &rec,
            ChannelKind::Rotation,
            CodecKind::Quat3Packed(PackedWidth::B18),
        )
        .unwrap();

        let q = channel.value_at(0);
        assert!(q.x.abs() < EPS);
        assert!((q.y - 1.0).abs() < EPS);
        assert!(q.z.abs() < EPS);
    }

    #[test]
    fn single_axis_vector_pins_the_other_lanes_to_the_bounds() {
        let mut data = vec![0u8; 16];
        let bounds_off = data.len() as u64;
        push_f32s(&mut data, &[7.0, 8.0, 9.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let cp_off = data.len() as u64;
        push_f32s(&mut data, &[42.0]);

        let view = le_view(&data);
        // Key 0x320F2 animates the y lane.
        let rec = record(0x320F2, 1, 0, cp_off, bounds_off);
        let channel =
            bind_channel(&view, &rec, ChannelKind::Scale, CodecKind::Vec3Axis).unwrap();

        assert_vec4_eq(channel.value_at(0), Vec4::new(7.0, 42.0, 9.0, 0.0));
    }

    #[test]
    fn broadcast_axis_splats_the_scalar() {
        let mut data = vec![0u8; 16];
        let cp_off = data.len() as u64;
        push_f32s(&mut data, &[0.5]);

        let view = le_view(&data);
        let rec = record(0x340F2, 1, 0, cp_off, 0);
        let channel =
            bind_channel(&view, &rec, ChannelKind::Scale, CodecKind::Vec3Axis).unwrap();

        assert_vec4_eq(channel.value_at(0), Vec4::new(0.5, 0.5, 0.5, 0.0));
    }

    #[test]
    fn packed_axis_vector_offsets_from_the_base_lane() {
        // base = (min.y, min.z, min.w), animated lane adds min.x * t.
        let mut data = vec![0u8; 16];
        let bounds_off = data.len() as u64;
        push_f32s(&mut data, &[4.0, 1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 0.0]);
        let cp_off = data.len() as u64;
        data.extend_from_slice(&u16::MAX.to_le_bytes());

        let view = le_view(&data);
        // Key 0x210F2 animates the x lane.
        let rec = record(0x210F2, 1, 0, cp_off, bounds_off);
        let channel = bind_channel(
            &view,
            &rec,
            ChannelKind::Position,
            CodecKind::Vec3AxisPacked16,
        )
        .unwrap();

        assert_vec4_eq(channel.value_at(0), Vec4::new(5.0, 2.0, 3.0, 0.0));
    }

    #[test]
    fn legacy_and_reworked_axis_rotations_read_different_bounds_lanes() {
        let mut data = vec![0u8; 16];
        let bounds_off = data.len() as u64;
        // min = (0.25, 0.5, 0.75, 0), max = (0.1, 0.2, 0.3, 0).
        push_f32s(&mut data, &[0.25, 0.5, 0.75, 0.0, 0.1, 0.2, 0.3, 0.0]);
        let cp_off = data.len() as u64;
        data.extend_from_slice(&u16::MAX.to_le_bytes());

        let view = le_view(&data);
        // Key 0x22112 animates the y lane.
        let rec = record(0x22112, 1, 0, cp_off, bounds_off);

        let reworked = bind_channel(
            &view,
            &rec,
            ChannelKind::Rotation,
            CodecKind::Quat3AxisPacked16,
        )
        .unwrap();
        // bias min.y + scale min.x.
        assert!((reworked.value_at(0).y - 0.75).abs() < EPS);

        let legacy = bind_channel(
            &view,
            &rec,
            ChannelKind::Rotation,
            CodecKind::Quat3AxisPacked16Legacy,
        )
        .unwrap();
        // bias max.y + scale min.y.
        assert!((legacy.value_at(0).y - 0.7).abs() < EPS);
    }

    #[test]
    fn curve_rate_falls_back_to_the_engine_clock() {
        let mut data = vec![0u8; 16];
        let cp_off = data.len() as u64;
        push_f32s(&mut data, &[1.0, 1.0, 1.0]);

        let view = le_view(&data);
        let rec = record(0x000F2, 1, 0, cp_off, 0);
        let channel =
            bind_channel(&view, &rec, ChannelKind::Position, CodecKind::Vec3Raw).unwrap();

        assert_eq!(channel.frame_rate, 60.0);
    }

    #[test]
    fn empty_curve_binds_without_control_points() {
        let data = vec![0u8; 16];
        let view = le_view(&data);
        let rec = record(0x000F2, 0, 0, 0, 0);

        let channel =
            bind_channel(&view, &rec, ChannelKind::Position, CodecKind::Vec3Raw).unwrap();
        assert!(channel.is_empty());
    }
}
