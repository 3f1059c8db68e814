use crate::bytes::{ByteReader, ByteWriter};
use crate::coordinate::{Coordinate, CoordinateTuple};
use crate::envelope::combine_all;
use crate::error::Result;
use crate::geometry::{
    EnvelopeOf, GeometryKind, LineString, Point, Polygon, WKB_HEADER_SIZE, WkbGeometry, WkbShape,
    expect_header,
};

// The three homogeneous collections only differ in their element type.
macro_rules! multi_geometry {
    ($(#[$doc:meta])* $name:ident, $child:ident, $accessor:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash)]
        pub struct $name<C = Coordinate> {
            elements: Vec<$child<C>>,
        }

        impl<C: CoordinateTuple> $name<C> {
            pub fn new(elements: Vec<$child<C>>) -> Self {
                Self { elements }
            }

            pub fn empty() -> Self {
                Self {
                    elements: Vec::new(),
                }
            }

            /// Build from kind-erased geometries. Fails with an invalid
            /// argument error if any element is of another kind.
            pub fn try_from_geometries(
                geometries: impl IntoIterator<Item = WkbGeometry<C>>,
            ) -> Result<Self> {
                let elements = geometries
                    .into_iter()
                    .map($child::<C>::try_from)
                    .collect::<Result<Vec<_>>>()?;
                Ok(Self::new(elements))
            }

            pub fn $accessor(&self) -> &[$child<C>] {
                &self.elements
            }

            pub fn len(&self) -> usize {
                self.elements.len()
            }

            pub fn iter(&self) -> std::slice::Iter<'_, $child<C>> {
                self.elements.iter()
            }

            pub(crate) fn read_payload(reader: &mut ByteReader<'_>) -> Result<Self> {
                let count = reader.read_count(<$child<C> as WkbShape>::MIN_WKB_SIZE)?;
                let mut elements = Vec::with_capacity(count);
                for _ in 0..count {
                    elements.push($child::<C>::read_wkb(reader)?);
                }
                Ok(Self::new(elements))
            }
        }

        impl<C: CoordinateTuple> FromIterator<$child<C>> for $name<C> {
            fn from_iter<I: IntoIterator<Item = $child<C>>>(iter: I) -> Self {
                Self::new(iter.into_iter().collect())
            }
        }

        impl<C: CoordinateTuple> WkbShape for $name<C> {
            type Coord = C;

            const MIN_WKB_SIZE: usize = WKB_HEADER_SIZE + 4;

            fn kind(&self) -> GeometryKind {
                GeometryKind::$name
            }

            fn is_empty(&self) -> bool {
                self.elements.is_empty()
            }

            fn envelope(&self) -> EnvelopeOf<C> {
                combine_all(self.elements.iter().map(|e| e.envelope()))
            }

            fn write_payload(&self, writer: &mut ByteWriter) -> Result<()> {
                writer.write_count(self.elements.len())?;
                for element in &self.elements {
                    element.write_wkb(writer)?;
                }
                Ok(())
            }

            fn read_wkb(reader: &mut ByteReader<'_>) -> Result<Self> {
                expect_header::<C>(reader, GeometryKind::$name)?;
                Self::read_payload(reader)
            }
        }
    };
}

multi_geometry!(
    /// Ordered collection of points.
    MultiPoint,
    Point,
    points
);

multi_geometry!(
    /// Ordered collection of line strings.
    MultiLineString,
    LineString,
    line_strings
);

multi_geometry!(
    /// Ordered collection of polygons.
    MultiPolygon,
    Polygon,
    polygons
);
