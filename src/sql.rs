use crate::envelope::GeometryEnvelope;
use crate::error::Result;
use crate::gpkg::GpkgGeometry;
use log::debug;
use rusqlite::functions::{Context, FunctionFlags};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Type, ValueRef};
use rusqlite::{Connection, Error};

impl ToSql for GpkgGeometry {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let bytes = self
            .to_bytes()
            .map_err(|err| Error::ToSqlConversionFailure(Box::new(err)))?;
        Ok(ToSqlOutput::from(bytes))
    }
}

impl FromSql for GpkgGeometry {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let blob = value.as_blob()?;
        GpkgGeometry::from_bytes(blob).map_err(|err| FromSqlError::Other(Box::new(err)))
    }
}

/// Register all spatial SQL helper functions in the provided connection.
///
/// Every function takes a GeoPackage geometry blob and returns NULL for a
/// NULL argument. The bound functions (`ST_MinX`, ..., `ST_MaxM`) return
/// NULL when the geometry is empty or has no such axis.
///
/// Example:
/// ```no_run
/// use rusqlite::Connection;
/// use gpkg_geometry::register_spatial_functions;
///
/// let conn = Connection::open_in_memory()?;
/// register_spatial_functions(&conn)?;
/// # Ok::<(), gpkg_geometry::GpkgError>(())
/// ```
pub fn register_spatial_functions(conn: &Connection) -> Result<()> {
    register_st_minx(conn)?;
    register_st_miny(conn)?;
    register_st_maxx(conn)?;
    register_st_maxy(conn)?;
    register_st_minz(conn)?;
    register_st_maxz(conn)?;
    register_st_minm(conn)?;
    register_st_maxm(conn)?;
    register_st_isempty(conn)?;
    register_st_geometrytype(conn)?;
    register_st_srid(conn)?;
    Ok(())
}

pub(crate) fn register_st_minx(conn: &Connection) -> Result<()> {
    register_bounds_component(conn, "ST_MinX", |e| Some(e.to_xy().min_x()))
}

pub(crate) fn register_st_miny(conn: &Connection) -> Result<()> {
    register_bounds_component(conn, "ST_MinY", |e| Some(e.to_xy().min_y()))
}

pub(crate) fn register_st_maxx(conn: &Connection) -> Result<()> {
    register_bounds_component(conn, "ST_MaxX", |e| Some(e.to_xy().max_x()))
}

pub(crate) fn register_st_maxy(conn: &Connection) -> Result<()> {
    register_bounds_component(conn, "ST_MaxY", |e| Some(e.to_xy().max_y()))
}

pub(crate) fn register_st_minz(conn: &Connection) -> Result<()> {
    register_bounds_component(conn, "ST_MinZ", |e| e.z_range().map(|(min, _)| min))
}

pub(crate) fn register_st_maxz(conn: &Connection) -> Result<()> {
    register_bounds_component(conn, "ST_MaxZ", |e| e.z_range().map(|(_, max)| max))
}

pub(crate) fn register_st_minm(conn: &Connection) -> Result<()> {
    register_bounds_component(conn, "ST_MinM", |e| e.m_range().map(|(min, _)| min))
}

pub(crate) fn register_st_maxm(conn: &Connection) -> Result<()> {
    register_bounds_component(conn, "ST_MaxM", |e| e.m_range().map(|(_, max)| max))
}

pub(crate) fn register_st_isempty(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        "ST_IsEmpty",
        1,
        FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let geometry = match geometry_from_ctx(ctx, "ST_IsEmpty")? {
                Some(geometry) => geometry,
                None => return Ok(None),
            };
            Ok(Some(i64::from(geometry.geometry().is_empty())))
        },
    )?;
    Ok(())
}

pub(crate) fn register_st_geometrytype(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        "ST_GeometryType",
        1,
        FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let geometry = match geometry_from_ctx(ctx, "ST_GeometryType")? {
                Some(geometry) => geometry,
                None => return Ok(None),
            };
            Ok(Some(geometry.geometry().kind().sql_name().to_string()))
        },
    )?;
    Ok(())
}

pub(crate) fn register_st_srid(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        "ST_SRID",
        1,
        FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let geometry = match geometry_from_ctx(ctx, "ST_SRID")? {
                Some(geometry) => geometry,
                None => return Ok(None),
            };
            Ok(Some(i64::from(geometry.srs_id())))
        },
    )?;
    Ok(())
}

fn register_bounds_component<F>(conn: &Connection, name: &'static str, f: F) -> Result<()>
where
    F: Fn(&GeometryEnvelope) -> Option<f64> + Copy + Send + Sync + 'static,
{
    conn.create_scalar_function(name, 1, FunctionFlags::SQLITE_DETERMINISTIC, move |ctx| {
        let geometry = match geometry_from_ctx(ctx, name)? {
            Some(geometry) => geometry,
            None => return Ok(None),
        };
        let envelope = geometry.geometry().envelope();
        // an empty geometry has NaN bounds, which SQL sees as NULL
        Ok(f(&envelope).filter(|v| !v.is_nan()))
    })?;
    Ok(())
}

fn geometry_from_ctx(ctx: &Context<'_>, name: &str) -> rusqlite::Result<Option<GpkgGeometry>> {
    match ctx.get_raw(0) {
        ValueRef::Null => Ok(None),
        ValueRef::Blob(blob) => match GpkgGeometry::from_bytes(blob) {
            Ok(geometry) => Ok(Some(geometry)),
            Err(err) => {
                debug!("{name}: cannot decode geometry blob of {} bytes: {err}", blob.len());
                Err(Error::UserFunctionError(Box::new(err)))
            }
        },
        _ => Err(Error::InvalidFunctionParameterType(0, Type::Blob)),
    }
}
