//! GeoPackage geometry blobs.
//!
//! A blob is a small header followed by a WKB geometry:
//!
//! | bytes | content |
//! |---|---|
//! | 2 | magic `GP` |
//! | 1 | version (0 means version 1) |
//! | 1 | flags |
//! | 4 | `srs_id`, in the byte order given by the flags |
//! | 0, 32, 48 or 64 | envelope `[minx, maxx, miny, maxy, (minz, maxz), (minm, maxm)]` |
//!
//! Flags: bit 0 byte order (1 = little endian), bits 1-3 envelope contents
//! indicator, bit 4 empty geometry, bit 5 extended binary type.
//!
//! cf. <https://www.geopackage.org/spec140/index.html#gpb_format>

use crate::bytes::{ByteOrder, ByteReader, ByteWriter};
use crate::coordinate::{Contents, ordinates_eq};
use crate::envelope::{EnvelopeContentsIndicator, GeometryEnvelope};
use crate::error::{GpkgError, Result};
use crate::geometry::Geometry;

pub const MAGIC: [u8; 2] = *b"GP";

/// Size of magic, version, flags and `srs_id`.
const FIXED_HEADER_SIZE: usize = 8;

const EMPTY_FLAG: u8 = 1 << 4;
const EXTENDED_FLAG: u8 = 1 << 5;

/// Standard blobs hold a WKB geometry; extended blobs hold a geometry type
/// defined by an extension and are not decoded here.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BinaryType {
    #[default]
    Standard,
    Extended,
}

impl BinaryType {
    pub fn bit_mask(self) -> u8 {
        match self {
            BinaryType::Standard => 0,
            BinaryType::Extended => EXTENDED_FLAG,
        }
    }
}

/// Header of a GeoPackage geometry blob.
#[derive(Clone, Debug)]
pub struct BinaryHeader {
    version: u8,
    binary_type: BinaryType,
    contents: Contents,
    byte_order: ByteOrder,
    srs_id: i32,
    envelope_indicator: EnvelopeContentsIndicator,
    envelope: Vec<f64>,
}

impl BinaryHeader {
    /// Fails with an invalid argument error when `envelope` does not have the
    /// length `envelope_indicator` calls for.
    pub fn new(
        version: u8,
        binary_type: BinaryType,
        contents: Contents,
        byte_order: ByteOrder,
        srs_id: i32,
        envelope_indicator: EnvelopeContentsIndicator,
        envelope: Vec<f64>,
    ) -> Result<Self> {
        if envelope.len() != envelope_indicator.array_size() {
            return Err(GpkgError::invalid_argument(format!(
                "envelope has {} values but the contents indicator {envelope_indicator:?} requires {}",
                envelope.len(),
                envelope_indicator.array_size()
            )));
        }
        Ok(Self {
            version,
            binary_type,
            contents,
            byte_order,
            srs_id,
            envelope_indicator,
            envelope,
        })
    }

    /// A version 1, standard, little endian header carrying the geometry's
    /// own envelope.
    pub fn for_geometry(geometry: &Geometry, srs_id: i32) -> Self {
        let envelope = geometry.envelope();
        Self {
            version: 0,
            binary_type: BinaryType::Standard,
            contents: geometry.contents(),
            byte_order: ByteOrder::LittleEndian,
            srs_id,
            envelope_indicator: envelope.contents_indicator(),
            envelope: envelope.to_array(),
        }
    }

    /// Parse the header at the start of `bytes`.
    pub fn read(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < FIXED_HEADER_SIZE {
            return Err(GpkgError::InvalidGpkgGeometryLength {
                len: bytes.len(),
                minimum: FIXED_HEADER_SIZE,
            });
        }

        let mut reader = ByteReader::new(bytes);
        let magic = reader.take(2)?;
        if magic != MAGIC.as_slice() {
            return Err(GpkgError::InvalidGpkgGeometryMagic([magic[0], magic[1]]));
        }
        let version = reader.read_u8()?;
        let flags = reader.read_u8()?;

        let envelope_indicator = EnvelopeContentsIndicator::try_from((flags >> 1) & 0b111)
            .map_err(|_| GpkgError::InvalidGpkgGeometryFlags(flags))?;
        let byte_order = if flags & 1 == 1 {
            ByteOrder::LittleEndian
        } else {
            ByteOrder::BigEndian
        };
        let binary_type = if flags & EXTENDED_FLAG != 0 {
            BinaryType::Extended
        } else {
            BinaryType::Standard
        };
        let contents = Contents::from_is_empty(flags & EMPTY_FLAG != 0);

        let required = FIXED_HEADER_SIZE + envelope_indicator.byte_size();
        if bytes.len() < required {
            return Err(GpkgError::InvalidGpkgGeometryEnvelope {
                len: bytes.len(),
                required,
            });
        }

        reader.set_byte_order(byte_order);
        let srs_id = reader.read_i32()?;
        let envelope = (0..envelope_indicator.array_size())
            .map(|_| reader.read_f64())
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            version,
            binary_type,
            contents,
            byte_order,
            srs_id,
            envelope_indicator,
            envelope,
        })
    }

    /// Append the header. `srs_id` and the envelope use the header's byte
    /// order; the writer's own byte order is restored afterwards.
    pub fn write(&self, writer: &mut ByteWriter) {
        let previous = writer.byte_order();
        writer.set_byte_order(self.byte_order);

        writer.write_bytes(&MAGIC);
        writer.write_u8(self.version);
        writer.write_u8(self.flags());
        writer.write_i32(self.srs_id);
        for value in &self.envelope {
            writer.write_f64(*value);
        }

        writer.set_byte_order(previous);
    }

    pub fn flags(&self) -> u8 {
        let byte_order = match self.byte_order {
            ByteOrder::LittleEndian => 1,
            ByteOrder::BigEndian => 0,
        };
        self.binary_type.bit_mask()
            | self.contents.bit_mask()
            | (self.envelope_indicator.code() << 1)
            | byte_order
    }

    /// Size of the encoded header in bytes.
    pub fn byte_size(&self) -> usize {
        FIXED_HEADER_SIZE + self.envelope_indicator.byte_size()
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn binary_type(&self) -> BinaryType {
        self.binary_type
    }

    pub fn contents(&self) -> Contents {
        self.contents
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn srs_id(&self) -> i32 {
        self.srs_id
    }

    pub fn envelope_contents_indicator(&self) -> EnvelopeContentsIndicator {
        self.envelope_indicator
    }

    /// The raw envelope array, in header order.
    pub fn envelope(&self) -> &[f64] {
        &self.envelope
    }

    /// The envelope as a typed value, if the header carries one.
    pub fn geometry_envelope(&self) -> Option<GeometryEnvelope> {
        GeometryEnvelope::from_array(self.envelope_indicator, &self.envelope)
            .ok()
            .flatten()
    }
}

impl PartialEq for BinaryHeader {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
            && self.binary_type == other.binary_type
            && self.contents == other.contents
            && self.byte_order == other.byte_order
            && self.srs_id == other.srs_id
            && self.envelope_indicator == other.envelope_indicator
            && ordinates_eq(&self.envelope, &other.envelope)
    }
}

/// A decoded GeoPackage geometry blob.
#[derive(Clone, Debug, PartialEq)]
pub struct GpkgGeometry {
    header: BinaryHeader,
    geometry: Geometry,
}

impl GpkgGeometry {
    /// Wrap `geometry` with a header built by [`BinaryHeader::for_geometry`].
    pub fn new(geometry: impl Into<Geometry>, srs_id: i32) -> Self {
        let geometry = geometry.into();
        Self {
            header: BinaryHeader::for_geometry(&geometry, srs_id),
            geometry,
        }
    }

    pub fn from_parts(header: BinaryHeader, geometry: Geometry) -> Self {
        Self { header, geometry }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let header = BinaryHeader::read(bytes)?;
        if header.binary_type == BinaryType::Extended {
            return Err(GpkgError::ExtendedGpkgGeometry);
        }
        let geometry = Geometry::from_wkb(&bytes[header.byte_size()..])?;
        Ok(Self { header, geometry })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = ByteWriter::with_capacity(self.header.byte_order, self.header.byte_size());
        self.header.write(&mut writer);
        self.geometry.write_wkb(&mut writer)?;
        Ok(writer.into_bytes())
    }

    pub fn header(&self) -> &BinaryHeader {
        &self.header
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn into_geometry(self) -> Geometry {
        self.geometry
    }

    pub fn srs_id(&self) -> i32 {
        self.header.srs_id
    }
}

/// Return the WKB part of a GeoPackage geometry blob.
pub fn gpkg_geometry_to_wkb(bytes: &[u8]) -> Result<&[u8]> {
    let header = BinaryHeader::read(bytes)?;
    Ok(&bytes[header.byte_size()..])
}

/// Prefix `wkb` with a little endian header that carries no envelope.
pub fn wkb_to_gpkg_geometry(wkb: &[u8], srs_id: i32) -> Result<Vec<u8>> {
    let geometry = Geometry::from_wkb(wkb)?;
    let header = BinaryHeader::new(
        0,
        BinaryType::Standard,
        geometry.contents(),
        ByteOrder::LittleEndian,
        srs_id,
        EnvelopeContentsIndicator::NoEnvelope,
        Vec::new(),
    )?;

    let mut writer =
        ByteWriter::with_capacity(ByteOrder::LittleEndian, FIXED_HEADER_SIZE + wkb.len());
    header.write(&mut writer);
    writer.write_bytes(wkb);
    Ok(writer.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::{
        BinaryHeader, BinaryType, GpkgGeometry, gpkg_geometry_to_wkb, wkb_to_gpkg_geometry,
    };
    use crate::Result;
    use crate::bytes::{ByteOrder, ByteWriter};
    use crate::coordinate::{Contents, Coordinate, CoordinateZ};
    use crate::envelope::{EnvelopeContentsIndicator, EnvelopeZ, GeometryEnvelope};
    use crate::error::{ErrorKind, GpkgError};
    use crate::geometry::{Geometry, LineStringZ, Point, WkbShape};

    #[test]
    fn read_big_endian_extended_empty_header() -> Result<()> {
        let indicator = EnvelopeContentsIndicator::Xyzm;
        let flags = BinaryType::Extended.bit_mask()
            | Contents::Empty.bit_mask()
            | (indicator.code() << 1);

        let mut writer = ByteWriter::new(ByteOrder::BigEndian);
        writer.write_bytes(b"GP");
        writer.write_u8(0);
        writer.write_u8(flags);
        writer.write_i32(4326);
        for _ in 0..8 {
            writer.write_f64(f64::NAN);
        }
        let bytes = writer.into_bytes();

        let header = BinaryHeader::read(&bytes)?;
        assert_eq!(header.version(), 0);
        assert_eq!(header.binary_type(), BinaryType::Extended);
        assert_eq!(header.contents(), Contents::Empty);
        assert_eq!(header.byte_order(), ByteOrder::BigEndian);
        assert_eq!(header.srs_id(), 4326);
        assert_eq!(header.envelope_contents_indicator(), indicator);
        assert_eq!(header.envelope().len(), 8);
        assert!(header.envelope().iter().all(|v| v.is_nan()));
        assert_eq!(header.flags(), flags);
        assert_eq!(header.byte_size(), bytes.len());

        let mut written = ByteWriter::new(ByteOrder::LittleEndian);
        header.write(&mut written);
        assert_eq!(written.as_bytes(), bytes.as_slice());
        assert_eq!(written.byte_order(), ByteOrder::LittleEndian);
        Ok(())
    }

    #[test]
    fn malformed_headers_are_rejected() {
        assert!(matches!(
            BinaryHeader::read(b"GP"),
            Err(GpkgError::InvalidGpkgGeometryLength {
                len: 2,
                minimum: 8
            })
        ));
        assert!(matches!(
            BinaryHeader::read(&[0; 8]),
            Err(GpkgError::InvalidGpkgGeometryMagic([0, 0]))
        ));
        // xyzm envelope declared, but no envelope bytes
        assert!(matches!(
            BinaryHeader::read(&[b'G', b'P', 0, 0b0000_1000, 0, 0, 0, 0]),
            Err(GpkgError::InvalidGpkgGeometryEnvelope {
                len: 8,
                required: 72
            })
        ));
        // envelope indicator 5
        let mut blob = vec![b'G', b'P', 0, 0b0000_1010, 0, 0, 0, 0];
        blob.extend_from_slice(&[0; 64]);
        assert!(matches!(
            BinaryHeader::read(&blob),
            Err(GpkgError::InvalidGpkgGeometryFlags(0b0000_1010))
        ));
    }

    #[test]
    fn envelope_must_match_indicator() {
        let err = BinaryHeader::new(
            1,
            BinaryType::Standard,
            Contents::NotEmpty,
            ByteOrder::BigEndian,
            4326,
            EnvelopeContentsIndicator::Xy,
            vec![0.0; 6],
        )
        .expect_err("xy envelope needs four values");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn geometry_blob_round_trip() -> Result<()> {
        let line = LineStringZ::new(vec![
            CoordinateZ::new(0.0, 1.0, 2.0),
            CoordinateZ::new(3.0, -1.0, 5.0),
        ]);
        let blob = GpkgGeometry::new(line.clone(), 4326);

        let header = blob.header();
        assert_eq!(
            header.envelope_contents_indicator(),
            EnvelopeContentsIndicator::Xyz
        );
        assert_eq!(header.envelope(), &[0.0, 3.0, -1.0, 1.0, 2.0, 5.0]);
        assert_eq!(
            header.geometry_envelope(),
            Some(GeometryEnvelope::Z(EnvelopeZ::new(0.0, -1.0, 2.0, 3.0, 1.0, 5.0)))
        );

        let bytes = blob.to_bytes()?;
        assert_eq!(&bytes[..4], &[b'G', b'P', 0, 0b0000_0101]);
        assert_eq!(&bytes[header.byte_size()..], line.to_wkb()?.as_slice());

        let decoded = GpkgGeometry::from_bytes(&bytes)?;
        assert_eq!(decoded, blob);
        assert_eq!(decoded.srs_id(), 4326);
        Ok(())
    }

    #[test]
    fn empty_geometry_has_no_envelope() -> Result<()> {
        let blob = GpkgGeometry::new(Point::<Coordinate>::empty(), 0);
        assert_eq!(blob.header().contents(), Contents::Empty);
        assert_eq!(
            blob.header().envelope_contents_indicator(),
            EnvelopeContentsIndicator::NoEnvelope
        );
        assert_eq!(blob.header().flags(), 0b0001_0001);
        assert_eq!(GpkgGeometry::from_bytes(&blob.to_bytes()?)?, blob);
        Ok(())
    }

    #[test]
    fn extended_blobs_are_not_decoded() -> Result<()> {
        let header = BinaryHeader::new(
            0,
            BinaryType::Extended,
            Contents::NotEmpty,
            ByteOrder::LittleEndian,
            0,
            EnvelopeContentsIndicator::NoEnvelope,
            Vec::new(),
        )?;
        let mut writer = ByteWriter::default();
        header.write(&mut writer);
        writer.write_bytes(&Point::new(Coordinate::new(1.0, 1.0)).to_wkb()?);

        assert!(matches!(
            GpkgGeometry::from_bytes(writer.as_bytes()),
            Err(GpkgError::ExtendedGpkgGeometry)
        ));
        Ok(())
    }

    #[test]
    fn wkb_slice_round_trip() -> Result<()> {
        let point = geo_types::Point::new(3.0, -1.0);
        let mut wkb = Vec::new();
        wkb::writer::write_geometry(&mut wkb, &point, &Default::default())
            .expect("geo-types point encodes");

        let blob = wkb_to_gpkg_geometry(&wkb, 4326)?;
        assert_eq!(gpkg_geometry_to_wkb(&blob)?, wkb.as_slice());

        let decoded = GpkgGeometry::from_bytes(&blob)?;
        assert_eq!(
            decoded.geometry(),
            &Geometry::from(Point::new(Coordinate::new(3.0, -1.0)))
        );
        Ok(())
    }

    #[test]
    fn wkb_to_gpkg_geometry_validates_input() {
        let err = wkb_to_gpkg_geometry(&[1, 1, 0], 4326).expect_err("truncated wkb");
        assert_eq!(err.kind(), ErrorKind::MalformedData);
    }
}
