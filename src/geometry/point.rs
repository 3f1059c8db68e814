use crate::bytes::{ByteReader, ByteWriter};
use crate::coordinate::{Coordinate, CoordinateTuple};
use crate::error::Result;
use crate::geometry::{EnvelopeOf, GeometryKind, WKB_HEADER_SIZE, WkbShape, expect_header};

/// A single position. `POINT EMPTY` is a point whose ordinates are all NaN.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Point<C = Coordinate> {
    coordinate: C,
}

impl<C: CoordinateTuple> Point<C> {
    pub fn new(coordinate: C) -> Self {
        Self { coordinate }
    }

    pub fn empty() -> Self {
        Self::new(C::empty())
    }

    pub fn coordinate(&self) -> &C {
        &self.coordinate
    }

    pub fn x(&self) -> f64 {
        self.coordinate.x()
    }

    pub fn y(&self) -> f64 {
        self.coordinate.y()
    }

    pub(crate) fn read_payload(reader: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self::new(C::read_wkb(reader)?))
    }
}

impl<C: CoordinateTuple> From<C> for Point<C> {
    fn from(coordinate: C) -> Self {
        Self::new(coordinate)
    }
}

impl<C: CoordinateTuple> WkbShape for Point<C> {
    type Coord = C;

    const MIN_WKB_SIZE: usize = WKB_HEADER_SIZE + C::WKB_SIZE;

    fn kind(&self) -> GeometryKind {
        GeometryKind::Point
    }

    fn is_empty(&self) -> bool {
        self.coordinate.is_empty()
    }

    fn envelope(&self) -> EnvelopeOf<C> {
        self.coordinate.envelope()
    }

    fn write_payload(&self, writer: &mut ByteWriter) -> Result<()> {
        self.coordinate.write_wkb(writer);
        Ok(())
    }

    fn read_wkb(reader: &mut ByteReader<'_>) -> Result<Self> {
        expect_header::<C>(reader, GeometryKind::Point)?;
        Self::read_payload(reader)
    }
}
