use geo_traits::{
    CoordTrait, Dimensions, GeometryCollectionTrait, GeometryTrait, GeometryType as GeoType,
    LineStringTrait, MultiLineStringTrait, MultiPointTrait, MultiPolygonTrait, PointTrait,
    PolygonTrait,
};

use crate::coordinate::{
    Coordinate, CoordinateM, CoordinateTuple, CoordinateZ, CoordinateZM, Dimension,
};
use crate::error::{GpkgError, Result};
use crate::geometry::{
    Geometry, GeometryCollection, GeometryKind, LineString, LinearRing, Point, Polygon,
    WkbGeometry,
};

/// Parse a `geometry_type_name` as stored in `gpkg_geometry_columns`.
///
/// The comparison is case-insensitive. `GEOMETRY` is accepted and mapped to
/// [`GeometryKind::GeometryCollection`], which can hold any geometry.
#[inline]
pub fn geometry_kind_from_str(geometry_type_str: &str) -> Result<GeometryKind> {
    let s = geometry_type_str;
    if s.eq_ignore_ascii_case("GEOMETRY") || s.eq_ignore_ascii_case("GEOMETRYCOLLECTION") {
        Ok(GeometryKind::GeometryCollection)
    } else if s.eq_ignore_ascii_case("POINT") {
        Ok(GeometryKind::Point)
    } else if s.eq_ignore_ascii_case("LINESTRING") {
        Ok(GeometryKind::LineString)
    } else if s.eq_ignore_ascii_case("POLYGON") {
        Ok(GeometryKind::Polygon)
    } else if s.eq_ignore_ascii_case("MULTIPOINT") {
        Ok(GeometryKind::MultiPoint)
    } else if s.eq_ignore_ascii_case("MULTILINESTRING") {
        Ok(GeometryKind::MultiLineString)
    } else if s.eq_ignore_ascii_case("MULTIPOLYGON") {
        Ok(GeometryKind::MultiPolygon)
    } else {
        Err(GpkgError::UnsupportedGeometryType(
            geometry_type_str.to_string(),
        ))
    }
}

/// The `(z, m)` flags of `gpkg_geometry_columns` for a dimensionality.
#[inline]
pub fn dimension_to_zm(dimension: Dimension) -> (i8, i8) {
    match dimension {
        Dimension::Xy => (0, 0),
        Dimension::Xyz => (1, 0),
        Dimension::Xym => (0, 1),
        Dimension::Xyzm => (1, 1),
    }
}

#[inline]
pub fn dimension_from_zm(z: i8, m: i8) -> Result<Dimension> {
    match (z, m) {
        (0, 0) => Ok(Dimension::Xy),
        (1, 0) => Ok(Dimension::Xyz),
        (0, 1) => Ok(Dimension::Xym),
        (1, 1) => Ok(Dimension::Xyzm),
        // 2 ("optional") names no single dimensionality
        _ => Err(GpkgError::InvalidDimension { z, m }),
    }
}

fn dimension_from_geo_traits(dim: Dimensions) -> Result<Dimension> {
    match dim {
        Dimensions::Xy => Ok(Dimension::Xy),
        Dimensions::Xyz => Ok(Dimension::Xyz),
        Dimensions::Xym => Ok(Dimension::Xym),
        Dimensions::Xyzm => Ok(Dimension::Xyzm),
        Dimensions::Unknown(n) => Err(GpkgError::invalid_argument(format!(
            "unknown dimensionality with {n} ordinates"
        ))),
    }
}

impl Geometry {
    /// Convert any geo-traits geometry, picking the dimensionality from its
    /// `dim()`.
    pub fn from_geo_traits<G: GeometryTrait<T = f64>>(geom: &G) -> Result<Self> {
        let geometry = match dimension_from_geo_traits(geom.dim())? {
            Dimension::Xy => WkbGeometry::<Coordinate>::from_geo_traits(geom)?.into(),
            Dimension::Xyz => WkbGeometry::<CoordinateZ>::from_geo_traits(geom)?.into(),
            Dimension::Xym => WkbGeometry::<CoordinateM>::from_geo_traits(geom)?.into(),
            Dimension::Xyzm => WkbGeometry::<CoordinateZM>::from_geo_traits(geom)?.into(),
        };
        Ok(geometry)
    }
}

impl<C: CoordinateTuple> WkbGeometry<C> {
    /// Convert a geo-traits geometry whose dimensionality is `C`.
    pub fn from_geo_traits<G: GeometryTrait<T = f64>>(geom: &G) -> Result<Self> {
        let dimension = dimension_from_geo_traits(geom.dim())?;
        if dimension != C::DIMENSION {
            return Err(GpkgError::invalid_argument(format!(
                "geometry has dimension {dimension:?}, expected {:?}",
                C::DIMENSION
            )));
        }

        let geometry = match geom.as_type() {
            GeoType::Point(point) => Self::Point(point_from_geo_traits(point)),
            GeoType::LineString(line) => Self::LineString(line_string_from_geo_traits(line)),
            GeoType::Polygon(poly) => Self::Polygon(polygon_from_geo_traits(poly)),
            GeoType::MultiPoint(multi) => Self::MultiPoint(
                multi.points().map(|p| point_from_geo_traits(&p)).collect(),
            ),
            GeoType::MultiLineString(multi) => Self::MultiLineString(
                multi
                    .line_strings()
                    .map(|line| line_string_from_geo_traits(&line))
                    .collect(),
            ),
            GeoType::MultiPolygon(multi) => Self::MultiPolygon(
                multi
                    .polygons()
                    .map(|p| polygon_from_geo_traits(&p))
                    .collect(),
            ),
            GeoType::GeometryCollection(collection) => {
                let geometries = collection
                    .geometries()
                    .map(|g| Self::from_geo_traits(&g))
                    .collect::<Result<Vec<_>>>()?;
                Self::GeometryCollection(GeometryCollection::new(geometries))
            }
            GeoType::Rect(_) | GeoType::Triangle(_) | GeoType::Line(_) => {
                return Err(GpkgError::invalid_argument(
                    "Rect, Triangle and Line have no GeoPackage geometry type",
                ));
            }
        };
        Ok(geometry)
    }
}

fn coordinate_from_geo_traits<C: CoordinateTuple>(coord: &impl CoordTrait<T = f64>) -> C {
    C::from_fn(|i| coord.nth(i).unwrap_or(f64::NAN))
}

fn point_from_geo_traits<C: CoordinateTuple>(point: &impl PointTrait<T = f64>) -> Point<C> {
    match point.coord() {
        Some(coord) => Point::new(coordinate_from_geo_traits(&coord)),
        None => Point::empty(),
    }
}

fn line_string_from_geo_traits<C: CoordinateTuple>(
    line: &impl LineStringTrait<T = f64>,
) -> LineString<C> {
    LineString::new(line.coords().map(|c| coordinate_from_geo_traits(&c)).collect())
}

fn ring_from_geo_traits<C: CoordinateTuple>(
    ring: &impl LineStringTrait<T = f64>,
) -> LinearRing<C> {
    ring.coords().map(|c| coordinate_from_geo_traits(&c)).collect()
}

fn polygon_from_geo_traits<C: CoordinateTuple>(poly: &impl PolygonTrait<T = f64>) -> Polygon<C> {
    let exterior = match poly.exterior() {
        Some(ring) => ring_from_geo_traits(&ring),
        None => LinearRing::empty(),
    };
    let interiors = poly
        .interiors()
        .map(|ring| ring_from_geo_traits(&ring))
        .collect();
    Polygon::new(exterior, interiors)
}

#[cfg(test)]
mod tests {
    use super::{dimension_from_zm, dimension_to_zm, geometry_kind_from_str};
    use crate::coordinate::{Coordinate, CoordinateM, CoordinateZ, Dimension};
    use crate::envelope::{Envelope, GeometryEnvelope};
    use crate::error::ErrorKind;
    use crate::geometry::{Geometry, GeometryKind, Point, PointM, WkbGeometry, WkbShape};
    use std::str::FromStr;
    use wkt::Wkt;

    fn wkt(text: &str) -> Wkt<f64> {
        Wkt::from_str(text).expect("valid wkt")
    }

    fn wkb_crate_bytes<G: geo_traits::GeometryTrait<T = f64>>(geometry: &G) -> Vec<u8> {
        let mut bytes = Vec::new();
        wkb::writer::write_geometry(&mut bytes, geometry, &Default::default())
            .expect("geometry encodes as wkb");
        bytes
    }

    #[test]
    fn geometry_kind_names_are_case_insensitive() -> crate::Result<()> {
        assert_eq!(geometry_kind_from_str("point")?, GeometryKind::Point);
        assert_eq!(
            geometry_kind_from_str("MultiPolygon")?,
            GeometryKind::MultiPolygon
        );
        assert_eq!(
            geometry_kind_from_str("GEOMETRY")?,
            GeometryKind::GeometryCollection
        );

        let err = geometry_kind_from_str("CIRCULARSTRING").expect_err("curves are unsupported");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        Ok(())
    }

    #[test]
    fn zm_flags_follow_dimension() -> crate::Result<()> {
        for dimension in [
            Dimension::Xy,
            Dimension::Xyz,
            Dimension::Xym,
            Dimension::Xyzm,
        ] {
            let (z, m) = dimension_to_zm(dimension);
            assert_eq!(dimension_from_zm(z, m)?, dimension);
        }
        assert_eq!(dimension_to_zm(Dimension::Xym), (0, 1));
        assert!(dimension_from_zm(2, 0).is_err());
        Ok(())
    }

    #[test]
    fn polygon_from_wkt_encodes_like_the_wkb_crate() -> crate::Result<()> {
        let source = wkt("POLYGON ((0 0, 4 0, 4 4, 0 0), (1 1, 2 1, 2 2, 1 1))");
        let geometry = Geometry::from_geo_traits(&source)?;

        assert_eq!(geometry.kind(), GeometryKind::Polygon);
        assert_eq!(geometry.dimension(), Dimension::Xy);
        assert_eq!(
            geometry.envelope(),
            GeometryEnvelope::Xy(Envelope::new(0.0, 0.0, 4.0, 4.0))
        );
        assert_eq!(geometry.to_wkb()?, wkb_crate_bytes(&source));
        Ok(())
    }

    #[test]
    fn dimensionality_comes_from_the_source() -> crate::Result<()> {
        let geometry = Geometry::from_geo_traits(&wkt("POINT Z (1 2 3)"))?;
        assert_eq!(geometry.type_code(), 1001);
        assert_eq!(
            geometry.as_typed::<CoordinateZ>(),
            Some(&WkbGeometry::Point(Point::new(CoordinateZ::new(1.0, 2.0, 3.0))))
        );

        let geometry = Geometry::from_geo_traits(&wkt("LINESTRING M (0 0 5, 1 1 7)"))?;
        assert_eq!(geometry.type_code(), 2002);
        assert_eq!(geometry.envelope().m_range(), Some((5.0, 7.0)));
        Ok(())
    }

    #[test]
    fn empty_point_becomes_empty() -> crate::Result<()> {
        let geometry = Geometry::from_geo_traits(&wkt("POINT EMPTY"))?;
        assert!(geometry.is_empty());
        assert_eq!(
            geometry.as_typed::<Coordinate>(),
            Some(&WkbGeometry::Point(Point::empty()))
        );
        Ok(())
    }

    #[test]
    fn collection_matches_decoded_wkb() -> crate::Result<()> {
        let source = wkt(
            "GEOMETRYCOLLECTION (POINT (5 -1), LINESTRING (-2 2, 1 3), MULTIPOINT ((0 0), (1 1)))",
        );
        let from_wkt = Geometry::from_geo_traits(&source)?;
        let from_bytes = Geometry::from_wkb(&wkb_crate_bytes(&source))?;
        assert_eq!(from_wkt, from_bytes);
        Ok(())
    }

    #[test]
    fn wkb_crate_reads_our_encoding() -> crate::Result<()> {
        let original: Geometry = PointM::new(CoordinateM::new(1.0, 2.0, 3.0)).into();
        let bytes = original.to_wkb()?;

        let parsed = wkb::reader::Wkb::try_new(&bytes).expect("wkb crate decodes our bytes");
        assert_eq!(Geometry::from_geo_traits(&parsed)?, original);
        Ok(())
    }

    #[test]
    fn geo_types_geometries_convert() -> crate::Result<()> {
        let line = geo_types::LineString::from(vec![(0.0, 0.0), (3.0, -1.0)]);
        let geometry = Geometry::from_geo_traits(&line)?;
        assert_eq!(geometry.kind(), GeometryKind::LineString);
        assert_eq!(geometry.envelope_xy(), Envelope::new(0.0, -1.0, 3.0, 0.0));

        let rect = geo_types::Geometry::Rect(geo_types::Rect::new(
            geo_types::coord! { x: 0.0, y: 0.0 },
            geo_types::coord! { x: 1.0, y: 1.0 },
        ));
        let err = Geometry::from_geo_traits(&rect).expect_err("rect has no wkb type");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        Ok(())
    }

    #[test]
    fn typed_conversion_checks_dimension() {
        let err = WkbGeometry::<Coordinate>::from_geo_traits(&wkt("POINT Z (1 2 3)"))
            .expect_err("xyz is not xy");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(
            WkbGeometry::<CoordinateZ>::from_geo_traits(&wkt("POINT Z (1 2 3)"))
                .is_ok_and(|g| g.type_code() == 1001)
        );
    }
}
