//! Typed WKB geometries.
//!
//! Every geometry is generic over its coordinate shape `C`, so one
//! `Polygon<C>` covers XY, XYZ, XYM and XYZM polygons. The per-dimensionality
//! names (`PolygonZ`, `MultiPointZM`, ...) are type aliases.
//!
//! [`WkbGeometry<C>`] is the closed set of kinds for one dimensionality and
//! [`Geometry`] erases the dimensionality. Decoding dispatches on the WKB type
//! code with an exhaustive match, so an unknown code is simply an error.

mod collection;
mod line_string;
mod linear_ring;
mod multi;
mod point;
mod polygon;

pub use collection::GeometryCollection;
pub use line_string::LineString;
pub use linear_ring::LinearRing;
pub use multi::{MultiLineString, MultiPoint, MultiPolygon};
pub use point::Point;
pub use polygon::Polygon;

use log::trace;
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::bytes::{ByteOrder, ByteReader, ByteWriter};
use crate::coordinate::{
    Contents, Coordinate, CoordinateM, CoordinateTuple, CoordinateZ, CoordinateZM, Dimension,
};
use crate::envelope::{BoundingBox, Envelope, GeometryEnvelope};
use crate::error::{GpkgError, Result};

/// Envelope type matching the coordinate shape `C`.
pub type EnvelopeOf<C> = <C as CoordinateTuple>::Envelope;

/// Size of the byte order marker plus the type code.
pub(crate) const WKB_HEADER_SIZE: usize = 5;

/// Deepest accepted nesting of geometry collections on read.
pub const MAX_NESTING_DEPTH: usize = 128;

/// The seven geometry kinds, numbered as in the WKB type code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum GeometryKind {
    Point = 1,
    LineString = 2,
    Polygon = 3,
    MultiPoint = 4,
    MultiLineString = 5,
    MultiPolygon = 6,
    GeometryCollection = 7,
}

impl GeometryKind {
    pub fn code(self) -> u32 {
        self.into()
    }

    pub fn name(self) -> &'static str {
        match self {
            GeometryKind::Point => "Point",
            GeometryKind::LineString => "LineString",
            GeometryKind::Polygon => "Polygon",
            GeometryKind::MultiPoint => "MultiPoint",
            GeometryKind::MultiLineString => "MultiLineString",
            GeometryKind::MultiPolygon => "MultiPolygon",
            GeometryKind::GeometryCollection => "GeometryCollection",
        }
    }

    /// Name used in `gpkg_geometry_columns.geometry_type_name`.
    pub fn sql_name(self) -> &'static str {
        match self {
            GeometryKind::Point => "POINT",
            GeometryKind::LineString => "LINESTRING",
            GeometryKind::Polygon => "POLYGON",
            GeometryKind::MultiPoint => "MULTIPOINT",
            GeometryKind::MultiLineString => "MULTILINESTRING",
            GeometryKind::MultiPolygon => "MULTIPOLYGON",
            GeometryKind::GeometryCollection => "GEOMETRYCOLLECTION",
        }
    }

    /// WKB type code of this kind in the given dimensionality.
    pub fn type_code(self, dimension: Dimension) -> u32 {
        dimension.type_code_base() + self.code()
    }
}

/// Split a WKB type code into kind and dimensionality.
pub fn split_type_code(code: u32) -> Result<(GeometryKind, Dimension)> {
    let dimension = Dimension::from_type_code_base(code / 1000 * 1000)
        .ok_or(GpkgError::UnknownGeometryTypeCode(code))?;
    match code % 1000 {
        0 => Err(GpkgError::AbstractGeometryType(code)),
        // CircularString .. Surface, only defined by GeoPackage extensions
        8..=14 => Err(GpkgError::ExtensionGeometryType(code)),
        kind => {
            let kind = GeometryKind::try_from(kind)
                .map_err(|_| GpkgError::UnknownGeometryTypeCode(code))?;
            Ok((kind, dimension))
        }
    }
}

pub(crate) fn write_header(writer: &mut ByteWriter, type_code: u32) {
    writer.write_byte_order();
    writer.write_u32(type_code);
}

/// Read a byte order marker and type code, switching `reader` to that byte order.
pub(crate) fn read_header(reader: &mut ByteReader<'_>) -> Result<(GeometryKind, Dimension)> {
    let offset = reader.position();
    reader.read_byte_order()?;
    let code = reader.read_u32()?;
    trace!("geometry type code {code} at offset {offset}");
    split_type_code(code)
}

/// Read a header and fail unless it names exactly `kind` in dimensionality `C`.
pub(crate) fn expect_header<C: CoordinateTuple>(
    reader: &mut ByteReader<'_>,
    kind: GeometryKind,
) -> Result<()> {
    let (found_kind, found_dimension) = read_header(reader)?;
    if found_kind != kind || found_dimension != C::DIMENSION {
        return Err(GpkgError::UnexpectedGeometryType {
            expected: kind.type_code(C::DIMENSION),
            found: found_kind.type_code(found_dimension),
        });
    }
    Ok(())
}

/// Contract shared by every geometry of a fixed dimensionality.
pub trait WkbShape: Sized {
    type Coord: CoordinateTuple;

    /// Smallest number of bytes an encoding of this type can occupy.
    const MIN_WKB_SIZE: usize;

    fn kind(&self) -> GeometryKind;

    fn is_empty(&self) -> bool;

    /// Envelope over the geometry's coordinates, in its own dimensionality.
    fn envelope(&self) -> EnvelopeOf<Self::Coord>;

    /// Append everything after the type code.
    #[doc(hidden)]
    fn write_payload(&self, writer: &mut ByteWriter) -> Result<()>;

    /// Read one complete geometry (header and payload).
    fn read_wkb(reader: &mut ByteReader<'_>) -> Result<Self>;

    fn dimension(&self) -> Dimension {
        Self::Coord::DIMENSION
    }

    fn type_code(&self) -> u32 {
        self.kind().type_code(self.dimension())
    }

    fn geometry_type_name(&self) -> &'static str {
        self.kind().name()
    }

    fn contents(&self) -> Contents {
        Contents::from_is_empty(self.is_empty())
    }

    /// The envelope projected onto XY.
    fn envelope_xy(&self) -> Envelope {
        self.envelope().to_xy()
    }

    /// Append one complete geometry in the writer's byte order. On error the
    /// writer is left as it was before the call.
    fn write_wkb(&self, writer: &mut ByteWriter) -> Result<()> {
        let start = writer.len();
        write_header(writer, self.type_code());
        self.write_payload(writer).inspect_err(|_| writer.truncate(start))
    }

    fn to_wkb(&self) -> Result<Vec<u8>> {
        self.to_wkb_with_byte_order(ByteOrder::default())
    }

    fn to_wkb_with_byte_order(&self, order: ByteOrder) -> Result<Vec<u8>> {
        let mut writer = ByteWriter::new(order);
        self.write_wkb(&mut writer)?;
        Ok(writer.into_bytes())
    }

    /// Decode a buffer holding exactly one geometry.
    fn from_wkb(bytes: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(bytes);
        let geometry = Self::read_wkb(&mut reader)?;
        reader.finish()?;
        Ok(geometry)
    }
}

/// Any geometry of dimensionality `C`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum WkbGeometry<C = Coordinate> {
    Point(Point<C>),
    LineString(LineString<C>),
    Polygon(Polygon<C>),
    MultiPoint(MultiPoint<C>),
    MultiLineString(MultiLineString<C>),
    MultiPolygon(MultiPolygon<C>),
    GeometryCollection(GeometryCollection<C>),
}

impl<C: CoordinateTuple> WkbShape for WkbGeometry<C> {
    type Coord = C;

    const MIN_WKB_SIZE: usize = WKB_HEADER_SIZE + 4;

    fn kind(&self) -> GeometryKind {
        match self {
            WkbGeometry::Point(_) => GeometryKind::Point,
            WkbGeometry::LineString(_) => GeometryKind::LineString,
            WkbGeometry::Polygon(_) => GeometryKind::Polygon,
            WkbGeometry::MultiPoint(_) => GeometryKind::MultiPoint,
            WkbGeometry::MultiLineString(_) => GeometryKind::MultiLineString,
            WkbGeometry::MultiPolygon(_) => GeometryKind::MultiPolygon,
            WkbGeometry::GeometryCollection(_) => GeometryKind::GeometryCollection,
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            WkbGeometry::Point(g) => g.is_empty(),
            WkbGeometry::LineString(g) => g.is_empty(),
            WkbGeometry::Polygon(g) => g.is_empty(),
            WkbGeometry::MultiPoint(g) => g.is_empty(),
            WkbGeometry::MultiLineString(g) => g.is_empty(),
            WkbGeometry::MultiPolygon(g) => g.is_empty(),
            WkbGeometry::GeometryCollection(g) => g.is_empty(),
        }
    }

    fn envelope(&self) -> EnvelopeOf<C> {
        match self {
            WkbGeometry::Point(g) => g.envelope(),
            WkbGeometry::LineString(g) => g.envelope(),
            WkbGeometry::Polygon(g) => g.envelope(),
            WkbGeometry::MultiPoint(g) => g.envelope(),
            WkbGeometry::MultiLineString(g) => g.envelope(),
            WkbGeometry::MultiPolygon(g) => g.envelope(),
            WkbGeometry::GeometryCollection(g) => g.envelope(),
        }
    }

    fn write_payload(&self, writer: &mut ByteWriter) -> Result<()> {
        match self {
            WkbGeometry::Point(g) => g.write_payload(writer),
            WkbGeometry::LineString(g) => g.write_payload(writer),
            WkbGeometry::Polygon(g) => g.write_payload(writer),
            WkbGeometry::MultiPoint(g) => g.write_payload(writer),
            WkbGeometry::MultiLineString(g) => g.write_payload(writer),
            WkbGeometry::MultiPolygon(g) => g.write_payload(writer),
            WkbGeometry::GeometryCollection(g) => g.write_payload(writer),
        }
    }

    fn read_wkb(reader: &mut ByteReader<'_>) -> Result<Self> {
        let (kind, dimension) = read_header(reader)?;
        Self::read_body(reader, kind, dimension, 0)
    }
}

impl<C: CoordinateTuple> WkbGeometry<C> {
    /// Read the payload after an already parsed header. `depth` counts the
    /// enclosing geometry collections.
    pub(crate) fn read_body(
        reader: &mut ByteReader<'_>,
        kind: GeometryKind,
        dimension: Dimension,
        depth: usize,
    ) -> Result<Self> {
        if dimension != C::DIMENSION {
            return Err(GpkgError::UnexpectedGeometryType {
                expected: kind.type_code(C::DIMENSION),
                found: kind.type_code(dimension),
            });
        }
        Ok(match kind {
            GeometryKind::Point => WkbGeometry::Point(Point::read_payload(reader)?),
            GeometryKind::LineString => WkbGeometry::LineString(LineString::read_payload(reader)?),
            GeometryKind::Polygon => WkbGeometry::Polygon(Polygon::read_payload(reader)?),
            GeometryKind::MultiPoint => WkbGeometry::MultiPoint(MultiPoint::read_payload(reader)?),
            GeometryKind::MultiLineString => {
                WkbGeometry::MultiLineString(MultiLineString::read_payload(reader)?)
            }
            GeometryKind::MultiPolygon => {
                WkbGeometry::MultiPolygon(MultiPolygon::read_payload(reader)?)
            }
            GeometryKind::GeometryCollection => {
                WkbGeometry::GeometryCollection(GeometryCollection::read_payload(reader, depth)?)
            }
        })
    }
}

// Conversions between each concrete kind and the enums wrapping it.
macro_rules! impl_kind_conversions {
    ($($kind:ident),*) => {
        $(
            impl<C: CoordinateTuple> From<$kind<C>> for WkbGeometry<C> {
                fn from(geometry: $kind<C>) -> Self {
                    WkbGeometry::$kind(geometry)
                }
            }

            impl<C: CoordinateTuple> From<$kind<C>> for Geometry {
                fn from(geometry: $kind<C>) -> Self {
                    C::erase(WkbGeometry::$kind(geometry))
                }
            }

            impl<C: CoordinateTuple> TryFrom<WkbGeometry<C>> for $kind<C> {
                type Error = GpkgError;

                fn try_from(geometry: WkbGeometry<C>) -> Result<Self> {
                    match geometry {
                        WkbGeometry::$kind(g) => Ok(g),
                        other => Err(GpkgError::invalid_argument(format!(
                            "expected {}, got {}",
                            GeometryKind::$kind.name(),
                            other.geometry_type_name()
                        ))),
                    }
                }
            }
        )*
    };
}

impl_kind_conversions!(
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    GeometryCollection
);

/// A geometry of any dimensionality.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Geometry {
    Xy(WkbGeometry<Coordinate>),
    Z(WkbGeometry<CoordinateZ>),
    M(WkbGeometry<CoordinateM>),
    Zm(WkbGeometry<CoordinateZM>),
}

impl<C: CoordinateTuple> From<WkbGeometry<C>> for Geometry {
    fn from(geometry: WkbGeometry<C>) -> Self {
        C::erase(geometry)
    }
}

impl<C: CoordinateTuple> TryFrom<Geometry> for WkbGeometry<C> {
    type Error = GpkgError;

    fn try_from(geometry: Geometry) -> Result<Self> {
        C::downcast(geometry).map_err(|other| {
            GpkgError::invalid_argument(format!(
                "expected a {:?} geometry, got {:?}",
                C::DIMENSION,
                other.dimension()
            ))
        })
    }
}

// Forward a method call to the wrapped `WkbGeometry` of any dimensionality.
macro_rules! dispatch {
    ($self:expr, $g:ident => $body:expr) => {
        match $self {
            Geometry::Xy($g) => $body,
            Geometry::Z($g) => $body,
            Geometry::M($g) => $body,
            Geometry::Zm($g) => $body,
        }
    };
}

impl Geometry {
    /// Read one complete geometry of any kind and dimensionality.
    pub fn read_wkb(reader: &mut ByteReader<'_>) -> Result<Self> {
        let (kind, dimension) = read_header(reader)?;
        Ok(match dimension {
            Dimension::Xy => Geometry::Xy(WkbGeometry::read_body(reader, kind, dimension, 0)?),
            Dimension::Xyz => Geometry::Z(WkbGeometry::read_body(reader, kind, dimension, 0)?),
            Dimension::Xym => Geometry::M(WkbGeometry::read_body(reader, kind, dimension, 0)?),
            Dimension::Xyzm => Geometry::Zm(WkbGeometry::read_body(reader, kind, dimension, 0)?),
        })
    }

    /// Decode a buffer holding exactly one geometry.
    pub fn from_wkb(bytes: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(bytes);
        let geometry = Self::read_wkb(&mut reader)?;
        reader.finish()?;
        Ok(geometry)
    }

    pub fn write_wkb(&self, writer: &mut ByteWriter) -> Result<()> {
        dispatch!(self, g => g.write_wkb(writer))
    }

    pub fn to_wkb(&self) -> Result<Vec<u8>> {
        dispatch!(self, g => g.to_wkb())
    }

    pub fn to_wkb_with_byte_order(&self, order: ByteOrder) -> Result<Vec<u8>> {
        dispatch!(self, g => g.to_wkb_with_byte_order(order))
    }

    pub fn kind(&self) -> GeometryKind {
        dispatch!(self, g => g.kind())
    }

    pub fn dimension(&self) -> Dimension {
        dispatch!(self, g => g.dimension())
    }

    pub fn type_code(&self) -> u32 {
        dispatch!(self, g => g.type_code())
    }

    pub fn geometry_type_name(&self) -> &'static str {
        self.kind().name()
    }

    pub fn is_empty(&self) -> bool {
        dispatch!(self, g => g.is_empty())
    }

    pub fn contents(&self) -> Contents {
        Contents::from_is_empty(self.is_empty())
    }

    /// The envelope in the geometry's own dimensionality.
    pub fn envelope(&self) -> GeometryEnvelope {
        dispatch!(self, g => g.envelope().erase())
    }

    pub fn envelope_xy(&self) -> Envelope {
        dispatch!(self, g => g.envelope_xy())
    }

    /// Borrow the geometry as dimensionality `C`, if it has that dimensionality.
    pub fn as_typed<C: CoordinateTuple>(&self) -> Option<&WkbGeometry<C>> {
        C::downcast_ref(self)
    }
}

pub type LinearRingZ = LinearRing<CoordinateZ>;
pub type LinearRingM = LinearRing<CoordinateM>;
pub type LinearRingZM = LinearRing<CoordinateZM>;
pub type PointZ = Point<CoordinateZ>;
pub type PointM = Point<CoordinateM>;
pub type PointZM = Point<CoordinateZM>;
pub type LineStringZ = LineString<CoordinateZ>;
pub type LineStringM = LineString<CoordinateM>;
pub type LineStringZM = LineString<CoordinateZM>;
pub type PolygonZ = Polygon<CoordinateZ>;
pub type PolygonM = Polygon<CoordinateM>;
pub type PolygonZM = Polygon<CoordinateZM>;
pub type MultiPointZ = MultiPoint<CoordinateZ>;
pub type MultiPointM = MultiPoint<CoordinateM>;
pub type MultiPointZM = MultiPoint<CoordinateZM>;
pub type MultiLineStringZ = MultiLineString<CoordinateZ>;
pub type MultiLineStringM = MultiLineString<CoordinateM>;
pub type MultiLineStringZM = MultiLineString<CoordinateZM>;
pub type MultiPolygonZ = MultiPolygon<CoordinateZ>;
pub type MultiPolygonM = MultiPolygon<CoordinateM>;
pub type MultiPolygonZM = MultiPolygon<CoordinateZM>;
pub type GeometryCollectionZ = GeometryCollection<CoordinateZ>;
pub type GeometryCollectionM = GeometryCollection<CoordinateM>;
pub type GeometryCollectionZM = GeometryCollection<CoordinateZM>;
pub type WkbGeometryZ = WkbGeometry<CoordinateZ>;
pub type WkbGeometryM = WkbGeometry<CoordinateM>;
pub type WkbGeometryZM = WkbGeometry<CoordinateZM>;
