//! Bounds-checked views over raw asset images
//!
//! Asset blobs embed structure positions as integer offsets relative to a
//! base position instead of live pointers. [`ImageView`] models that
//! contract directly: a borrowed byte region, the origin its stored offsets
//! are relative to, and the byte order every multi-byte field uses.
//! Resolution is a pure computation over `(offset, view)`, so resolving the
//! same field twice always yields the same position and the image itself is
//! never rewritten.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::error::{Error, Result};

/// Byte order of all multi-byte fields in an asset image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    /// Little-endian source platform (the common case).
    Little,
    /// Big-endian source platform.
    Big,
}

/// A read-only window into one asset's on-disk image.
///
/// Stored offsets resolve relative to the view's origin. A top-level asset
/// uses origin 0; a motion nested inside a motion list uses a view re-based
/// at the motion's own header, since its internal offsets are relative to
/// that header rather than the list start. Re-basing borrows the same bytes,
/// matching the on-disk contract that nested assets share the parent's
/// allocation.
#[derive(Debug, Clone, Copy)]
pub struct ImageView<'a> {
    data: &'a [u8],
    origin: u64,
    order: Endianness,
}

impl<'a> ImageView<'a> {
    /// Creates a view over a whole asset image with offsets relative to
    /// byte 0.
    pub fn new(data: &'a [u8], order: Endianness) -> ImageView<'a> {
        ImageView {
            data,
            origin: 0,
            order,
        }
    }

    /// Returns a view over the same bytes whose stored offsets resolve
    /// relative to `origin`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OffsetOutOfBounds`] when `origin` lies outside the
    /// image.
    pub fn rebase(&self, origin: u64) -> Result<ImageView<'a>> {
        if origin >= self.data.len() as u64 {
            return Err(Error::OffsetOutOfBounds {
                offset: origin,
                len: self.data.len(),
            });
        }

        Ok(ImageView {
            data: self.data,
            origin,
            order: self.order,
        })
    }

    /// The byte order of every multi-byte field read through this view.
    #[must_use]
    pub fn endianness(&self) -> Endianness {
        self.order
    }

    /// The absolute position stored offsets are relative to.
    #[must_use]
    pub fn origin(&self) -> u64 {
        self.origin
    }

    /// Total image size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the underlying image is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Resolves a stored self-relative offset to an absolute image position.
    ///
    /// A zero offset denotes "field absent" and yields `Ok(None)`. A
    /// non-zero offset outside the image is a malformed file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OffsetOutOfBounds`] for non-zero offsets that land
    /// past the image end.
    pub fn resolve(&self, stored: u64) -> Result<Option<u64>> {
        if stored == 0 {
            return Ok(None);
        }

        let absolute = self
            .origin
            .checked_add(stored)
            .ok_or_else(|| Error::OffsetOutOfBounds {
                offset: u64::MAX,
                len: self.data.len(),
            })?;

        if absolute >= self.data.len() as u64 {
            return Err(Error::OffsetOutOfBounds {
                offset: absolute,
                len: self.data.len(),
            });
        }

        Ok(Some(absolute))
    }

    /// Borrows `count` bytes starting at an absolute position.
    pub fn bytes_at(&self, offset: u64, count: usize) -> Result<&'a [u8]> {
        let short_read = || Error::ShortRead {
            offset,
            count,
            len: self.data.len(),
        };

        let start = usize::try_from(offset).map_err(|_| short_read())?;
        let end = start.checked_add(count).ok_or_else(short_read)?;
        self.data.get(start..end).ok_or_else(short_read)
    }

    pub fn u8_at(&self, offset: u64) -> Result<u8> {
        Ok(self.bytes_at(offset, 1)?[0])
    }

    pub fn u16_at(&self, offset: u64) -> Result<u16> {
        let bytes = self.bytes_at(offset, 2)?;
        Ok(match self.order {
            Endianness::Little => LittleEndian::read_u16(bytes),
            Endianness::Big => BigEndian::read_u16(bytes),
        })
    }

    pub fn i16_at(&self, offset: u64) -> Result<i16> {
        Ok(self.u16_at(offset)? as i16)
    }

    pub fn u32_at(&self, offset: u64) -> Result<u32> {
        let bytes = self.bytes_at(offset, 4)?;
        Ok(match self.order {
            Endianness::Little => LittleEndian::read_u32(bytes),
            Endianness::Big => BigEndian::read_u32(bytes),
        })
    }

    pub fn i32_at(&self, offset: u64) -> Result<i32> {
        Ok(self.u32_at(offset)? as i32)
    }

    pub fn u64_at(&self, offset: u64) -> Result<u64> {
        let bytes = self.bytes_at(offset, 8)?;
        Ok(match self.order {
            Endianness::Little => LittleEndian::read_u64(bytes),
            Endianness::Big => BigEndian::read_u64(bytes),
        })
    }

    pub fn f32_at(&self, offset: u64) -> Result<f32> {
        Ok(f32::from_bits(self.u32_at(offset)?))
    }

    /// Reads `count` consecutive u16 values.
    pub fn u16s_at(&self, offset: u64, count: usize) -> Result<Vec<u16>> {
        let bytes = self.bytes_at(offset, count * 2)?;
        let mut out = vec![0u16; count];
        match self.order {
            Endianness::Little => LittleEndian::read_u16_into(bytes, &mut out),
            Endianness::Big => BigEndian::read_u16_into(bytes, &mut out),
        }
        Ok(out)
    }

    /// Reads `count` consecutive u32 values.
    pub fn u32s_at(&self, offset: u64, count: usize) -> Result<Vec<u32>> {
        let bytes = self.bytes_at(offset, count * 4)?;
        let mut out = vec![0u32; count];
        match self.order {
            Endianness::Little => LittleEndian::read_u32_into(bytes, &mut out),
            Endianness::Big => BigEndian::read_u32_into(bytes, &mut out),
        }
        Ok(out)
    }

    /// Reads `count` consecutive u64 values.
    pub fn u64s_at(&self, offset: u64, count: usize) -> Result<Vec<u64>> {
        let bytes = self.bytes_at(offset, count * 8)?;
        let mut out = vec![0u64; count];
        match self.order {
            Endianness::Little => LittleEndian::read_u64_into(bytes, &mut out),
            Endianness::Big => BigEndian::read_u64_into(bytes, &mut out),
        }
        Ok(out)
    }

    /// Reads `count` consecutive f32 values.
    pub fn f32s_at(&self, offset: u64, count: usize) -> Result<Vec<f32>> {
        Ok(self
            .u32s_at(offset, count)?
            .into_iter()
            .map(f32::from_bits)
            .collect())
    }

    /// Reads a NUL-terminated UTF-16 string at an absolute position.
    ///
    /// Unpaired surrogates are replaced rather than rejected; asset names
    /// are diagnostics, not load-bearing data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnterminatedString`] when the image ends before a
    /// NUL terminator.
    pub fn wide_string_at(&self, offset: u64) -> Result<String> {
        let mut units = Vec::new();
        let mut pos = offset;

        loop {
            let past_end = pos
                .checked_add(2)
                .is_none_or(|end| end > self.data.len() as u64);
            if past_end {
                return Err(Error::UnterminatedString { offset });
            }

            let unit = self.u16_at(pos)?;
            if unit == 0 {
                break;
            }

            units.push(unit);
            pos += 2;
        }

        Ok(String::from_utf16_lossy(&units))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn le_view(data: &[u8]) -> ImageView<'_> {
        ImageView::new(data, Endianness::Little)
    }

    #[test]
    fn zero_offset_is_absent() {
        let data = [0u8; 32];
        let view = le_view(&data);
        assert_eq!(view.resolve(0).unwrap(), None);
    }

    #[test]
    fn resolution_is_idempotent() {
        let data = [0u8; 32];
        let view = le_view(&data);

        let first = view.resolve(16).unwrap();
        let second = view.resolve(16).unwrap();
        assert_eq!(first, Some(16));
        assert_eq!(first, second);
    }

    #[test]
    fn out_of_range_offset_is_an_error() {
        let data = [0u8; 32];
        let view = le_view(&data);

        assert!(matches!(
            view.resolve(32),
            Err(Error::OffsetOutOfBounds { offset: 32, len: 32 })
        ));
    }

    #[test]
    fn rebase_shifts_resolution() {
        let data = [0u8; 64];
        let view = le_view(&data);
        let nested = view.rebase(40).unwrap();

        assert_eq!(nested.resolve(8).unwrap(), Some(48));
        // The parent view is unaffected.
        assert_eq!(view.resolve(8).unwrap(), Some(8));
    }

    #[test]
    fn reads_honor_byte_order() {
        let data = [0x12, 0x34, 0x56, 0x78];

        let le = ImageView::new(&data, Endianness::Little);
        assert_eq!(le.u32_at(0).unwrap(), 0x78563412);

        let be = ImageView::new(&data, Endianness::Big);
        assert_eq!(be.u32_at(0).unwrap(), 0x12345678);
    }

    #[test]
    fn bulk_reads_honor_byte_order() {
        let data = [0x01, 0x00, 0x02, 0x00];

        let le = ImageView::new(&data, Endianness::Little);
        assert_eq!(le.u16s_at(0, 2).unwrap(), vec![1, 2]);

        let be = ImageView::new(&data, Endianness::Big);
        assert_eq!(be.u16s_at(0, 2).unwrap(), vec![0x0100, 0x0200]);
    }

    #[test]
    fn short_read_is_an_error() {
        let data = [0u8; 4];
        let view = le_view(&data);

        assert!(matches!(
            view.u64_at(0),
            Err(Error::ShortRead { offset: 0, count: 8, len: 4 })
        ));
    }

    #[test]
    fn reads_wide_strings() {
        let mut data = vec![0u8; 4];
        for unit in "root".encode_utf16() {
            data.extend_from_slice(&unit.to_le_bytes());
        }
        data.extend_from_slice(&[0, 0]);

        let view = le_view(&data);
        assert_eq!(view.wide_string_at(4).unwrap(), "root");
    }

    #[test]
    fn unterminated_wide_string_is_an_error() {
        let mut data = Vec::new();
        for unit in "ab".encode_utf16() {
            data.extend_from_slice(&unit.to_le_bytes());
        }

        let view = le_view(&data);
        assert!(matches!(
            view.wide_string_at(0),
            Err(Error::UnterminatedString { offset: 0 })
        ));
    }
}
