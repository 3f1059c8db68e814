use crate::bytes::{ByteReader, ByteWriter};
use crate::coordinate::{Coordinate, CoordinateTuple};
use crate::envelope::combine_all;
use crate::error::{GpkgError, Result};
use crate::geometry::{
    EnvelopeOf, GeometryKind, MAX_NESTING_DEPTH, WKB_HEADER_SIZE, WkbGeometry, WkbShape,
    expect_header, read_header,
};

/// Ordered collection of geometries of any kind, all of dimensionality `C`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GeometryCollection<C = Coordinate> {
    geometries: Vec<WkbGeometry<C>>,
}

impl<C: CoordinateTuple> GeometryCollection<C> {
    pub fn new(geometries: Vec<WkbGeometry<C>>) -> Self {
        Self { geometries }
    }

    pub fn empty() -> Self {
        Self {
            geometries: Vec::new(),
        }
    }

    pub fn geometries(&self) -> &[WkbGeometry<C>] {
        &self.geometries
    }

    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WkbGeometry<C>> {
        self.geometries.iter()
    }

    /// Read the count and children. `depth` is the number of collections
    /// enclosing this one.
    pub(crate) fn read_payload(reader: &mut ByteReader<'_>, depth: usize) -> Result<Self> {
        if depth >= MAX_NESTING_DEPTH {
            return Err(GpkgError::NestingTooDeep {
                offset: reader.position(),
                limit: MAX_NESTING_DEPTH,
            });
        }
        let count = reader.read_count(WkbGeometry::<C>::MIN_WKB_SIZE)?;
        let mut geometries = Vec::with_capacity(count);
        for _ in 0..count {
            let (kind, dimension) = read_header(reader)?;
            geometries.push(WkbGeometry::<C>::read_body(
                reader, kind, dimension, depth + 1,
            )?);
        }
        Ok(Self::new(geometries))
    }
}

impl<C: CoordinateTuple> FromIterator<WkbGeometry<C>> for GeometryCollection<C> {
    fn from_iter<I: IntoIterator<Item = WkbGeometry<C>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<C: CoordinateTuple> WkbShape for GeometryCollection<C> {
    type Coord = C;

    const MIN_WKB_SIZE: usize = WKB_HEADER_SIZE + 4;

    fn kind(&self) -> GeometryKind {
        GeometryKind::GeometryCollection
    }

    fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    fn envelope(&self) -> EnvelopeOf<C> {
        combine_all(self.geometries.iter().map(|g| g.envelope()))
    }

    fn write_payload(&self, writer: &mut ByteWriter) -> Result<()> {
        writer.write_count(self.geometries.len())?;
        for geometry in &self.geometries {
            geometry.write_wkb(writer)?;
        }
        Ok(())
    }

    fn read_wkb(reader: &mut ByteReader<'_>) -> Result<Self> {
        expect_header::<C>(reader, GeometryKind::GeometryCollection)?;
        Self::read_payload(reader, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::GeometryCollection;
    use crate::Result;
    use crate::coordinate::{Coordinate, CoordinateZM};
    use crate::envelope::EnvelopeZM;
    use crate::error::{ErrorKind, GpkgError};
    use crate::geometry::{
        Geometry, GeometryCollectionZM, LineStringZM, MAX_NESTING_DEPTH, MultiPointZM, PointZM,
        WkbGeometry, WkbShape,
    };

    // `levels` collections, each holding the next one, the innermost empty.
    fn nested_collections(levels: usize) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(levels * 9);
        for level in 0..levels {
            let count: u32 = if level + 1 == levels { 0 } else { 1 };
            bytes.push(1);
            bytes.extend_from_slice(&7u32.to_le_bytes());
            bytes.extend_from_slice(&count.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn nested_collection_round_trips() -> Result<()> {
        let inner: GeometryCollectionZM = [WkbGeometry::Point(PointZM::new(CoordinateZM::new(
            9.0, 9.0, 9.0, 9.0,
        )))]
        .into_iter()
        .collect();
        let collection = GeometryCollectionZM::new(vec![
            LineStringZM::new(vec![
                CoordinateZM::new(0.0, 0.0, 0.0, 0.0),
                CoordinateZM::new(1.0, 2.0, 3.0, 4.0),
            ])
            .into(),
            MultiPointZM::empty().into(),
            inner.into(),
        ]);

        assert_eq!(collection.len(), 3);
        assert_eq!(collection.type_code(), 3007);
        assert_eq!(
            collection.envelope(),
            EnvelopeZM::new(0.0, 0.0, 0.0, 0.0, 9.0, 9.0, 9.0, 9.0)
        );
        assert_eq!(
            GeometryCollectionZM::from_wkb(&collection.to_wkb()?)?,
            collection
        );
        Ok(())
    }

    #[test]
    fn nesting_up_to_the_limit_is_accepted() -> Result<()> {
        let geometry = Geometry::from_wkb(&nested_collections(MAX_NESTING_DEPTH))?;
        assert_eq!(geometry.type_code(), 7);
        assert!(!geometry.is_empty());
        Ok(())
    }

    #[test]
    fn deeper_nesting_is_malformed() {
        let bytes = nested_collections(MAX_NESTING_DEPTH + 1);
        let err = Geometry::from_wkb(&bytes).expect_err("one level too deep");
        assert!(matches!(
            err,
            GpkgError::NestingTooDeep {
                limit: MAX_NESTING_DEPTH,
                ..
            }
        ));
        assert_eq!(err.kind(), ErrorKind::MalformedData);

        // thousands of levels fail the same way instead of exhausting the stack
        let err = GeometryCollection::<Coordinate>::from_wkb(&nested_collections(20_000))
            .expect_err("far too deep");
        assert!(matches!(err, GpkgError::NestingTooDeep { .. }));
    }

    #[test]
    fn child_count_overrunning_the_buffer_is_malformed() {
        let mut bytes = vec![1];
        bytes.extend_from_slice(&7u32.to_le_bytes());
        bytes.extend_from_slice(&1u32.to_le_bytes());
        // a line string claiming 1000 coordinates, followed by a single one
        bytes.push(1);
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(&1000u32.to_le_bytes());
        bytes.extend_from_slice(&[0; 16]);

        let err = Geometry::from_wkb(&bytes).expect_err("count exceeds the buffer");
        assert!(matches!(
            err,
            GpkgError::CountExceedsBuffer {
                offset: 14,
                count: 1000,
                remaining: 16
            }
        ));
    }
}
