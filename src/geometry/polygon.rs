use crate::bytes::{ByteReader, ByteWriter};
use crate::coordinate::{Coordinate, CoordinateTuple};
use crate::error::Result;
use crate::geometry::{
    EnvelopeOf, GeometryKind, LinearRing, WKB_HEADER_SIZE, WkbShape, expect_header,
};

/// A polygon: one exterior ring and any number of interior rings (holes).
///
/// A polygon is empty when its exterior ring is empty. Only the exterior ring
/// contributes to the envelope.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Polygon<C = Coordinate> {
    exterior: LinearRing<C>,
    interiors: Vec<LinearRing<C>>,
}

impl<C: CoordinateTuple> Polygon<C> {
    pub fn new(exterior: LinearRing<C>, interiors: Vec<LinearRing<C>>) -> Self {
        Self {
            exterior,
            interiors,
        }
    }

    pub fn empty() -> Self {
        Self::new(LinearRing::empty(), Vec::new())
    }

    pub fn exterior_ring(&self) -> &LinearRing<C> {
        &self.exterior
    }

    pub fn interior_rings(&self) -> &[LinearRing<C>] {
        &self.interiors
    }

    pub(crate) fn read_payload(reader: &mut ByteReader<'_>) -> Result<Self> {
        // every ring carries at least its own count
        let ring_count = reader.read_count(4)?;
        if ring_count == 0 {
            return Ok(Self::empty());
        }
        let exterior = LinearRing::read_wkb(reader)?;
        let mut interiors = Vec::with_capacity(ring_count - 1);
        for _ in 1..ring_count {
            interiors.push(LinearRing::read_wkb(reader)?);
        }
        Ok(Self::new(exterior, interiors))
    }
}

impl<C: CoordinateTuple> WkbShape for Polygon<C> {
    type Coord = C;

    const MIN_WKB_SIZE: usize = WKB_HEADER_SIZE + 4;

    fn kind(&self) -> GeometryKind {
        GeometryKind::Polygon
    }

    fn is_empty(&self) -> bool {
        self.exterior.is_empty()
    }

    fn envelope(&self) -> EnvelopeOf<C> {
        self.exterior.envelope()
    }

    fn write_payload(&self, writer: &mut ByteWriter) -> Result<()> {
        if self.exterior.is_empty() && self.interiors.is_empty() {
            return writer.write_count(0);
        }
        writer.write_count(1 + self.interiors.len())?;
        self.exterior.write_wkb(writer)?;
        for ring in &self.interiors {
            ring.write_wkb(writer)?;
        }
        Ok(())
    }

    fn read_wkb(reader: &mut ByteReader<'_>) -> Result<Self> {
        expect_header::<C>(reader, GeometryKind::Polygon)?;
        Self::read_payload(reader)
    }
}

#[cfg(test)]
mod tests {
    use super::Polygon;
    use crate::Result;
    use crate::coordinate::{Contents, Coordinate};
    use crate::envelope::Envelope;
    use crate::geometry::{LinearRing, WkbShape};

    fn square(min: f64, max: f64) -> LinearRing<Coordinate> {
        LinearRing::new(vec![
            Coordinate::new(min, min),
            Coordinate::new(max, min),
            Coordinate::new(max, max),
            Coordinate::new(min, max),
            Coordinate::new(min, min),
        ])
    }

    #[test]
    fn empty_polygon_has_no_rings() -> Result<()> {
        let polygon = Polygon::<Coordinate>::empty();
        assert_eq!(polygon.contents(), Contents::Empty);
        assert!(polygon.interior_rings().is_empty());

        let bytes = polygon.to_wkb()?;
        assert_eq!(bytes, vec![1, 3, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(Polygon::<Coordinate>::from_wkb(&bytes)?, polygon);
        Ok(())
    }

    #[test]
    fn ring_count_includes_exterior() -> Result<()> {
        let polygon = Polygon::new(square(0.0, 10.0), vec![square(2.0, 3.0), square(5.0, 6.0)]);
        let bytes = polygon.to_wkb()?;
        assert_eq!(&bytes[5..9], &3u32.to_le_bytes());
        assert_eq!(Polygon::<Coordinate>::from_wkb(&bytes)?, polygon);
        Ok(())
    }

    #[test]
    fn holes_do_not_widen_the_envelope() {
        let polygon = Polygon::new(square(0.0, 1.0), vec![square(-5.0, 5.0)]);
        assert_eq!(polygon.envelope(), Envelope::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn hole_without_exterior_survives_round_trip() -> Result<()> {
        let polygon = Polygon::new(LinearRing::empty(), vec![square(0.0, 1.0)]);
        assert!(polygon.is_empty());

        let decoded = Polygon::<Coordinate>::from_wkb(&polygon.to_wkb()?)?;
        assert_eq!(decoded.interior_rings().len(), 1);
        assert_eq!(decoded, polygon);
        Ok(())
    }
}
