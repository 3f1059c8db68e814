//! GeoPackage geometry codec built on top of rusqlite.
//!
//! ## Overview
//!
//! - `Coordinate`, `CoordinateZ`, `CoordinateM`, `CoordinateZM` are the
//!   coordinate tuples. An all-NaN coordinate is empty.
//! - `Envelope`, `EnvelopeZ`, `EnvelopeM`, `EnvelopeZM` are the matching
//!   bounding boxes. `combine` unions two of them; the all-NaN envelope is the
//!   identity.
//! - `Point<C>`, `LineString<C>`, `Polygon<C>`, `MultiPoint<C>`,
//!   `MultiLineString<C>`, `MultiPolygon<C>` and `GeometryCollection<C>` are
//!   the geometries, generic over the coordinate tuple `C`. `PointZ`,
//!   `PolygonZM`, ... are aliases.
//! - `Geometry` holds a geometry of any kind and any dimensionality, as read
//!   from an untyped WKB buffer.
//! - `GpkgGeometry` is a GeoPackage geometry blob: the `GP` binary header
//!   followed by WKB.
//!
//! ## Short usage
//!
//! ```no_run
//! use gpkg_geometry::{Coordinate, Geometry, LineString, WkbShape};
//!
//! let line = LineString::new(vec![Coordinate::new(0.0, 0.0), Coordinate::new(2.0, 1.0)]);
//! let wkb = line.to_wkb()?;
//!
//! let geometry = Geometry::from_wkb(&wkb)?;
//! assert_eq!(geometry.type_code(), 2);
//! assert_eq!(geometry.envelope_xy().max_x(), 2.0);
//! # Ok::<(), gpkg_geometry::GpkgError>(())
//! ```
//!
//! ## GeoPackage blobs
//!
//! `GpkgGeometry` implements `ToSql` and `FromSql`, so it can be bound to and
//! read from a geometry column directly:
//!
//! ```no_run
//! use gpkg_geometry::{CoordinateZ, GpkgGeometry, PointZ, register_spatial_functions};
//! use rusqlite::Connection;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let conn = Connection::open_in_memory()?;
//!     register_spatial_functions(&conn)?;
//!
//!     let geom = GpkgGeometry::new(PointZ::new(CoordinateZ::new(1.0, 2.0, 3.0)), 4326);
//!     let max_z: f64 = conn.query_row("SELECT ST_MaxZ(?1)", [&geom], |row| row.get(0))?;
//!     assert_eq!(max_z, 3.0);
//!
//!     let back: GpkgGeometry = conn.query_row("SELECT ?1", [&geom], |row| row.get(0))?;
//!     assert_eq!(back.srs_id(), 4326);
//!     Ok(())
//! }
//! ```
//!
//! Any geometry that implements `geo_traits::GeometryTrait<T = f64>` (for
//! example `geo_types::Point` or `wkt::Wkt`) converts with
//! `Geometry::from_geo_traits`.
mod bytes;
mod conversions;
mod coordinate;
mod envelope;
mod error;
mod geometry;
mod gpkg;
mod sql;

pub use bytes::{ByteOrder, ByteReader, ByteWriter, CANONICAL_NAN_BITS};
pub use conversions::{dimension_from_zm, dimension_to_zm, geometry_kind_from_str};
pub use coordinate::{
    Contents, Coordinate, CoordinateM, CoordinateTuple, CoordinateZ, CoordinateZM, Dimension,
};
pub use envelope::{
    BoundingBox, Envelope, EnvelopeContentsIndicator, EnvelopeM, EnvelopeZ, EnvelopeZM,
    GeometryEnvelope,
};
pub use error::{ErrorKind, GpkgError, Result};
pub use geometry::*;
pub use gpkg::{
    BinaryHeader, BinaryType, GpkgGeometry, gpkg_geometry_to_wkb, wkb_to_gpkg_geometry,
};
pub use sql::register_spatial_functions;
