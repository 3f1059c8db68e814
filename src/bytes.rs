//! Endian-aware byte buffers shared by every WKB read and write path.

use byteorder::{BigEndian, ByteOrder as Endian, LittleEndian};

use crate::error::{GpkgError, Result};

/// Bit pattern written for every NaN ordinate.
pub const CANONICAL_NAN_BITS: u64 = 0x7FF8_0000_0000_0000;

/// Bits of `value`, with every NaN mapped to [`CANONICAL_NAN_BITS`].
#[inline]
pub(crate) fn canonical_bits(value: f64) -> u64 {
    if value.is_nan() {
        CANONICAL_NAN_BITS
    } else {
        value.to_bits()
    }
}

/// Byte order of a WKB geometry or a GeoPackage header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    /// Marker `0` ("XDR", network order).
    BigEndian,
    /// Marker `1` ("NDR").
    #[default]
    LittleEndian,
}

impl ByteOrder {
    /// The WKB byte order marker for this byte order.
    pub fn marker(self) -> u8 {
        match self {
            ByteOrder::BigEndian => 0,
            ByteOrder::LittleEndian => 1,
        }
    }

    /// Parse a WKB byte order marker.
    pub fn from_marker(marker: u8) -> Option<Self> {
        match marker {
            0 => Some(ByteOrder::BigEndian),
            1 => Some(ByteOrder::LittleEndian),
            _ => None,
        }
    }
}

/// Growable output buffer.
///
/// Multi-byte values are written in the writer's current byte order. A single
/// writer is owned by one encode call at a time; parents write their header and
/// then hand the same writer to each child in order.
#[derive(Clone, Debug, Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
    order: ByteOrder,
}

impl ByteWriter {
    pub fn new(order: ByteOrder) -> Self {
        Self {
            buf: Vec::new(),
            order,
        }
    }

    pub fn with_capacity(order: ByteOrder, capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            order,
        }
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    pub fn set_byte_order(&mut self, order: ByteOrder) {
        self.order = order;
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Drop everything written after the first `len` bytes.
    pub fn truncate(&mut self, len: usize) {
        self.buf.truncate(len);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_u32(&mut self, value: u32) {
        let mut bytes = [0u8; 4];
        match self.order {
            ByteOrder::BigEndian => BigEndian::write_u32(&mut bytes, value),
            ByteOrder::LittleEndian => LittleEndian::write_u32(&mut bytes, value),
        }
        self.buf.extend_from_slice(&bytes);
    }

    pub fn write_i32(&mut self, value: i32) {
        let mut bytes = [0u8; 4];
        match self.order {
            ByteOrder::BigEndian => BigEndian::write_i32(&mut bytes, value),
            ByteOrder::LittleEndian => LittleEndian::write_i32(&mut bytes, value),
        }
        self.buf.extend_from_slice(&bytes);
    }

    /// Write an IEEE-754 double. NaN is always written as [`CANONICAL_NAN_BITS`].
    pub fn write_f64(&mut self, value: f64) {
        let mut bytes = [0u8; 8];
        let bits = canonical_bits(value);
        match self.order {
            ByteOrder::BigEndian => BigEndian::write_u64(&mut bytes, bits),
            ByteOrder::LittleEndian => LittleEndian::write_u64(&mut bytes, bits),
        }
        self.buf.extend_from_slice(&bytes);
    }

    /// Write an element count as a 4-byte unsigned integer. Nothing is
    /// written when the count does not fit.
    pub fn write_count(&mut self, count: usize) -> Result<()> {
        let count = u32::try_from(count).map_err(|_| {
            GpkgError::invalid_argument(format!(
                "{count} elements cannot be encoded in a 32 bit count"
            ))
        })?;
        self.write_u32(count);
        Ok(())
    }

    /// Write the WKB byte order marker matching this writer's byte order.
    pub fn write_byte_order(&mut self) {
        let marker = self.order.marker();
        self.write_u8(marker);
    }
}

/// Cursor over an input buffer.
///
/// Every read is bounds-checked and fails with a malformed-data error instead
/// of panicking.
#[derive(Clone, Debug)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
    position: usize,
    order: ByteOrder,
}

impl<'a> ByteReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            position: 0,
            order: ByteOrder::default(),
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.position
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    pub fn set_byte_order(&mut self, order: ByteOrder) {
        self.order = order;
    }

    /// The bytes that have not been consumed yet.
    pub fn rest(&self) -> &'a [u8] {
        &self.buf[self.position..]
    }

    pub fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(GpkgError::UnexpectedEof {
                offset: self.position,
                needed: len,
                remaining: self.remaining(),
            });
        }
        let bytes = &self.buf[self.position..self.position + len];
        self.position += len;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(match self.order {
            ByteOrder::BigEndian => BigEndian::read_u32(bytes),
            ByteOrder::LittleEndian => LittleEndian::read_u32(bytes),
        })
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        let bytes = self.take(4)?;
        Ok(match self.order {
            ByteOrder::BigEndian => BigEndian::read_i32(bytes),
            ByteOrder::LittleEndian => LittleEndian::read_i32(bytes),
        })
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        let bytes = self.take(8)?;
        Ok(match self.order {
            ByteOrder::BigEndian => BigEndian::read_f64(bytes),
            ByteOrder::LittleEndian => LittleEndian::read_f64(bytes),
        })
    }

    /// Read a WKB byte order marker and switch this reader to it.
    pub fn read_byte_order(&mut self) -> Result<ByteOrder> {
        let offset = self.position;
        let marker = self.read_u8()?;
        let order = ByteOrder::from_marker(marker)
            .ok_or(GpkgError::InvalidByteOrder { offset, marker })?;
        self.order = order;
        Ok(order)
    }

    /// Read a 4-byte element count and check that `count * min_element_size`
    /// bytes are still available.
    pub fn read_count(&mut self, min_element_size: usize) -> Result<usize> {
        let offset = self.position;
        let count = self.read_u32()?;
        let required = (count as usize).saturating_mul(min_element_size);
        if required > self.remaining() {
            return Err(GpkgError::CountExceedsBuffer {
                offset,
                count,
                remaining: self.remaining(),
            });
        }
        Ok(count as usize)
    }

    /// Fail if any unread bytes are left.
    pub fn finish(&self) -> Result<()> {
        if self.remaining() > 0 {
            return Err(GpkgError::TrailingBytes {
                offset: self.position,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ByteOrder, ByteReader, ByteWriter, CANONICAL_NAN_BITS};
    use crate::Result;
    use crate::error::GpkgError;

    #[test]
    fn writes_in_requested_byte_order() {
        let mut big = ByteWriter::new(ByteOrder::BigEndian);
        big.write_u32(1);
        assert_eq!(big.as_bytes(), &[0, 0, 0, 1]);

        let mut little = ByteWriter::new(ByteOrder::LittleEndian);
        little.write_u32(1);
        assert_eq!(little.as_bytes(), &[1, 0, 0, 0]);
    }

    #[test]
    fn nan_is_written_canonically() {
        let odd_nan = f64::from_bits(0x7FF0_0000_0000_0001);
        assert!(odd_nan.is_nan());

        let mut writer = ByteWriter::new(ByteOrder::BigEndian);
        writer.write_f64(odd_nan);
        assert_eq!(writer.as_bytes(), &CANONICAL_NAN_BITS.to_be_bytes());
    }

    #[test]
    fn reads_back_mixed_values() -> Result<()> {
        let mut writer = ByteWriter::new(ByteOrder::BigEndian);
        writer.write_byte_order();
        writer.write_i32(-4326);
        writer.write_f64(2.5);

        let bytes = writer.into_bytes();
        let mut reader = ByteReader::new(&bytes);
        assert_eq!(reader.read_byte_order()?, ByteOrder::BigEndian);
        assert_eq!(reader.read_i32()?, -4326);
        assert_eq!(reader.read_f64()?, 2.5);
        reader.finish()?;
        Ok(())
    }

    #[test]
    fn truncated_read_reports_eof() {
        let bytes = [1u8, 2, 3];
        let mut reader = ByteReader::new(&bytes);
        let err = reader.read_f64().expect_err("three bytes cannot hold a double");
        assert!(matches!(
            err,
            GpkgError::UnexpectedEof {
                offset: 0,
                needed: 8,
                remaining: 3
            }
        ));
    }

    #[test]
    fn invalid_byte_order_marker_is_rejected() {
        let bytes = [7u8];
        let mut reader = ByteReader::new(&bytes);
        let err = reader.read_byte_order().expect_err("7 is not a marker");
        assert!(matches!(
            err,
            GpkgError::InvalidByteOrder {
                offset: 0,
                marker: 7
            }
        ));
    }

    #[test]
    fn count_larger_than_buffer_is_rejected() -> Result<()> {
        let mut writer = ByteWriter::new(ByteOrder::LittleEndian);
        writer.write_u32(3);
        writer.write_f64(1.0);
        writer.write_f64(2.0);

        let bytes = writer.into_bytes();
        let mut reader = ByteReader::new(&bytes);
        let err = reader.read_count(8).expect_err("two doubles cannot hold three");
        assert!(matches!(
            err,
            GpkgError::CountExceedsBuffer {
                offset: 0,
                count: 3,
                remaining: 16
            }
        ));

        let mut reader = ByteReader::new(&bytes);
        assert_eq!(reader.read_count(4)?, 3);
        Ok(())
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn oversized_count_writes_nothing() {
        let mut writer = ByteWriter::new(ByteOrder::LittleEndian);
        writer.write_u8(1);
        writer
            .write_count(u32::MAX as usize + 1)
            .expect_err("count does not fit in 32 bits");
        assert_eq!(writer.as_bytes(), &[1]);

        writer.write_count(u32::MAX as usize).expect("largest count fits");
        assert_eq!(writer.len(), 5);
        writer.truncate(1);
        assert_eq!(writer.as_bytes(), &[1]);
    }
}
