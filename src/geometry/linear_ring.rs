use crate::bytes::{ByteReader, ByteWriter};
use crate::coordinate::{Coordinate, CoordinateTuple};
use crate::envelope::combine_all;
use crate::error::Result;
use crate::geometry::EnvelopeOf;

/// Closed boundary of a polygon.
///
/// Neither closure (first == last) nor a minimum vertex count is checked
/// here; a ring may even be empty.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LinearRing<C = Coordinate> {
    coordinates: Vec<C>,
}

impl<C: CoordinateTuple> LinearRing<C> {
    pub fn new(coordinates: Vec<C>) -> Self {
        Self { coordinates }
    }

    pub fn empty() -> Self {
        Self {
            coordinates: Vec::new(),
        }
    }

    pub fn coordinates(&self) -> &[C] {
        &self.coordinates
    }

    pub fn into_coordinates(self) -> Vec<C> {
        self.coordinates
    }

    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    /// True iff the ring has no coordinates.
    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    pub fn envelope(&self) -> EnvelopeOf<C> {
        envelope_of(&self.coordinates)
    }

    /// Append the coordinate count and the coordinates.
    pub fn write_wkb(&self, writer: &mut ByteWriter) -> Result<()> {
        write_coordinates(writer, &self.coordinates)
    }

    pub fn read_wkb(reader: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self::new(read_coordinates(reader)?))
    }
}

impl<C: CoordinateTuple> FromIterator<C> for LinearRing<C> {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

pub(crate) fn envelope_of<C: CoordinateTuple>(coordinates: &[C]) -> EnvelopeOf<C> {
    combine_all(coordinates.iter().map(|c| c.envelope()))
}

pub(crate) fn write_coordinates<C: CoordinateTuple>(
    writer: &mut ByteWriter,
    coordinates: &[C],
) -> Result<()> {
    writer.write_count(coordinates.len())?;
    for coordinate in coordinates {
        coordinate.write_wkb(writer);
    }
    Ok(())
}

pub(crate) fn read_coordinates<C: CoordinateTuple>(reader: &mut ByteReader<'_>) -> Result<Vec<C>> {
    let count = reader.read_count(C::WKB_SIZE)?;
    let mut coordinates = Vec::with_capacity(count);
    for _ in 0..count {
        coordinates.push(C::read_wkb(reader)?);
    }
    Ok(coordinates)
}
