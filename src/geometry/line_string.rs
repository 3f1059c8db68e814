use crate::bytes::{ByteReader, ByteWriter};
use crate::coordinate::{Coordinate, CoordinateTuple};
use crate::error::Result;
use crate::geometry::linear_ring::{envelope_of, read_coordinates, write_coordinates};
use crate::geometry::{EnvelopeOf, GeometryKind, WKB_HEADER_SIZE, WkbShape, expect_header};

/// An open path through an ordered list of coordinates.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LineString<C = Coordinate> {
    coordinates: Vec<C>,
}

impl<C: CoordinateTuple> LineString<C> {
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

    pub(crate) fn read_payload(reader: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self::new(read_coordinates(reader)?))
    }
}

impl<C: CoordinateTuple> FromIterator<C> for LineString<C> {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<C: CoordinateTuple> WkbShape for LineString<C> {
    type Coord = C;

    const MIN_WKB_SIZE: usize = WKB_HEADER_SIZE + 4;

    fn kind(&self) -> GeometryKind {
        GeometryKind::LineString
    }

    fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    fn envelope(&self) -> EnvelopeOf<C> {
        envelope_of(&self.coordinates)
    }

    fn write_payload(&self, writer: &mut ByteWriter) -> Result<()> {
        write_coordinates(writer, &self.coordinates)
    }

    fn read_wkb(reader: &mut ByteReader<'_>) -> Result<Self> {
        expect_header::<C>(reader, GeometryKind::LineString)?;
        Self::read_payload(reader)
    }
}

#[cfg(test)]
mod tests {
    use crate::Result;
    use crate::coordinate::CoordinateM;
    use crate::envelope::EnvelopeM;
    use crate::geometry::{LineStringM, WkbShape};

    #[test]
    fn line_string_layout() -> Result<()> {
        let line = LineStringM::new(vec![
            CoordinateM::new(0.0, 0.0, 10.0),
            CoordinateM::new(3.0, -4.0, 20.0),
        ]);
        let bytes = line.to_wkb()?;

        assert_eq!(&bytes[..5], &[1, 0xD2, 0x07, 0, 0]);
        assert_eq!(&bytes[5..9], &2u32.to_le_bytes());
        assert_eq!(bytes.len(), 9 + 2 * 24);
        assert_eq!(LineStringM::from_wkb(&bytes)?, line);

        assert_eq!(
            line.envelope(),
            EnvelopeM::new(0.0, -4.0, 10.0, 3.0, 0.0, 20.0)
        );
        Ok(())
    }

    #[test]
    fn empty_line_string_has_zero_count() -> Result<()> {
        let line = LineStringM::empty();
        assert!(line.is_empty());
        let bytes = line.to_wkb()?;
        assert_eq!(bytes, vec![1, 0xD2, 0x07, 0, 0, 0, 0, 0, 0]);
        assert_eq!(LineStringM::from_wkb(&bytes)?, line);
        Ok(())
    }
}
