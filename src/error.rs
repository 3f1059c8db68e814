use std::error::Error;
use std::fmt;

/// Broad classification of a [`GpkgError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller passed an argument that cannot be accepted. Nothing was
    /// constructed or written.
    InvalidArgument,
    /// The input bytes are not a valid encoding (truncated buffer, bad counts,
    /// unknown type codes, ...).
    MalformedData,
    /// Error reported by SQLite through `rusqlite`.
    Sql,
}

/// Crate error type for geometry encoding and decoding.
#[derive(Debug)]
pub enum GpkgError {
    /// Wraps errors returned by `rusqlite`.
    Sql(rusqlite::Error),
    /// An argument was rejected before any bytes were touched.
    InvalidArgument(String),
    /// The buffer ended before a value could be read.
    UnexpectedEof {
        offset: usize,
        needed: usize,
        remaining: usize,
    },
    /// The WKB byte order marker was neither 0 (big endian) nor 1 (little endian).
    InvalidByteOrder { offset: usize, marker: u8 },
    /// The WKB type code does not name any known geometry type.
    UnknownGeometryTypeCode(u32),
    /// The WKB type code names the abstract `Geometry` type (0, 1000, 2000, 3000).
    AbstractGeometryType(u32),
    /// The WKB type code names a GeoPackage extension geometry type (curves and surfaces).
    ExtensionGeometryType(u32),
    /// A geometry of a specific type was expected, but another one was found.
    UnexpectedGeometryType { expected: u32, found: u32 },
    /// A count field claims more elements than the remaining bytes can hold.
    CountExceedsBuffer {
        offset: usize,
        count: u32,
        remaining: usize,
    },
    /// Geometry collections are nested deeper than `limit` levels.
    NestingTooDeep { offset: usize, limit: usize },
    /// Bytes were left over after the top-level geometry was decoded.
    TrailingBytes { offset: usize, remaining: usize },
    /// A geometry type name could not be mapped to a supported geometry type.
    UnsupportedGeometryType(String),
    /// Invalid or mixed `z` / `m` dimension flags in GeoPackage metadata.
    InvalidDimension { z: i8, m: i8 },
    /// The first two bytes of a GeoPackage geometry blob were not `GP`.
    InvalidGpkgGeometryMagic([u8; 2]),
    /// Invalid GeoPackage geometry flags byte.
    InvalidGpkgGeometryFlags(u8),
    /// GeoPackage geometry blob is too short for the fixed header.
    InvalidGpkgGeometryLength { len: usize, minimum: usize },
    /// GeoPackage geometry blob is too short for the declared envelope payload.
    InvalidGpkgGeometryEnvelope { len: usize, required: usize },
    /// The blob uses the ExtendedGeoPackageBinary encoding, which is not decoded here.
    ExtendedGpkgGeometry,
}

impl GpkgError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Sql(_) => ErrorKind::Sql,
            Self::InvalidArgument(_)
            | Self::UnsupportedGeometryType(_)
            | Self::InvalidDimension { .. } => ErrorKind::InvalidArgument,
            Self::UnexpectedEof { .. }
            | Self::InvalidByteOrder { .. }
            | Self::UnknownGeometryTypeCode(_)
            | Self::AbstractGeometryType(_)
            | Self::ExtensionGeometryType(_)
            | Self::UnexpectedGeometryType { .. }
            | Self::CountExceedsBuffer { .. }
            | Self::NestingTooDeep { .. }
            | Self::TrailingBytes { .. }
            | Self::InvalidGpkgGeometryMagic(_)
            | Self::InvalidGpkgGeometryFlags(_)
            | Self::InvalidGpkgGeometryLength { .. }
            | Self::InvalidGpkgGeometryEnvelope { .. }
            | Self::ExtendedGpkgGeometry => ErrorKind::MalformedData,
        }
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

impl fmt::Display for GpkgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sql(err) => write!(f, "{err}"),
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::UnexpectedEof {
                offset,
                needed,
                remaining,
            } => write!(
                f,
                "unexpected end of buffer at offset {offset}: needed {needed} bytes, {remaining} remaining"
            ),
            Self::InvalidByteOrder { offset, marker } => {
                write!(f, "invalid byte order marker {marker:#04x} at offset {offset}")
            }
            Self::UnknownGeometryTypeCode(code) => {
                write!(f, "unrecognized geometry type code {code}")
            }
            Self::AbstractGeometryType(code) => write!(
                f,
                "cannot instantiate abstract 'Geometry' type (geometry type code {code})"
            ),
            Self::ExtensionGeometryType(code) => write!(
                f,
                "geometry type code {code} requires a GeoPackage extension and is not supported"
            ),
            Self::UnexpectedGeometryType { expected, found } => {
                write!(f, "unexpected geometry type {found}, expected {expected}")
            }
            Self::CountExceedsBuffer {
                offset,
                count,
                remaining,
            } => write!(
                f,
                "count {count} at offset {offset} exceeds the {remaining} remaining bytes"
            ),
            Self::NestingTooDeep { offset, limit } => write!(
                f,
                "geometry collections nested deeper than {limit} levels at offset {offset}"
            ),
            Self::TrailingBytes { offset, remaining } => {
                write!(f, "{remaining} trailing bytes after geometry at offset {offset}")
            }
            Self::UnsupportedGeometryType(ty) => write!(f, "unsupported geometry type: {ty}"),
            Self::InvalidDimension { z, m } => {
                write!(f, "invalid or mixed geometry dimension (z={z}, m={m})")
            }
            Self::InvalidGpkgGeometryMagic(magic) => write!(
                f,
                "invalid gpkg geometry magic: {:#04x} {:#04x}",
                magic[0], magic[1]
            ),
            Self::InvalidGpkgGeometryFlags(flags) => {
                write!(f, "invalid gpkg geometry flags: {flags:#04x}")
            }
            Self::InvalidGpkgGeometryLength { len, minimum } => {
                write!(
                    f,
                    "invalid gpkg geometry length: got {len} bytes, expected at least {minimum}"
                )
            }
            Self::InvalidGpkgGeometryEnvelope { len, required } => {
                write!(
                    f,
                    "invalid gpkg geometry envelope length: got {len} bytes, required {required}"
                )
            }
            Self::ExtendedGpkgGeometry => {
                write!(f, "extended gpkg geometry blobs are not supported")
            }
        }
    }
}

impl Error for GpkgError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sql(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for GpkgError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Sql(err)
    }
}

pub type Result<T> = std::result::Result<T, GpkgError>;
