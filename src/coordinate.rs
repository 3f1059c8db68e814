//! Coordinate tuples for the four WKB dimensionalities.
//!
//! A coordinate is empty when *every* ordinate is NaN; that is how WKB encodes
//! `POINT EMPTY`. Equality and hashing compare ordinates by their bits after
//! mapping every NaN to [`CANONICAL_NAN_BITS`](crate::bytes::CANONICAL_NAN_BITS),
//! so two empty coordinates are always equal, while `0.0` and `-0.0` are not.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::bytes::{ByteReader, ByteWriter, canonical_bits};
use crate::envelope::{BoundingBox, Envelope, EnvelopeM, EnvelopeZ, EnvelopeZM};
use crate::error::Result;
use crate::geometry::{Geometry, WkbGeometry};

/// Whether a value holds any data. Mirrors the "empty geometry" flag of the
/// GeoPackage binary header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Contents {
    NotEmpty,
    Empty,
}

impl Contents {
    pub fn from_is_empty(is_empty: bool) -> Self {
        if is_empty {
            Contents::Empty
        } else {
            Contents::NotEmpty
        }
    }

    /// Bit of the GeoPackage binary header flags byte that marks an empty geometry.
    pub fn bit_mask(self) -> u8 {
        match self {
            Contents::Empty => 1 << 4,
            Contents::NotEmpty => 0,
        }
    }
}

/// Coordinate dimensionality of a geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dimension {
    Xy,
    Xyz,
    Xym,
    Xyzm,
}

impl Dimension {
    /// The offset added to the geometry kind code in a WKB type code.
    pub fn type_code_base(self) -> u32 {
        match self {
            Dimension::Xy => 0,
            Dimension::Xyz => 1000,
            Dimension::Xym => 2000,
            Dimension::Xyzm => 3000,
        }
    }

    pub fn from_type_code_base(base: u32) -> Option<Self> {
        match base {
            0 => Some(Dimension::Xy),
            1000 => Some(Dimension::Xyz),
            2000 => Some(Dimension::Xym),
            3000 => Some(Dimension::Xyzm),
            _ => None,
        }
    }

    pub fn has_z(self) -> bool {
        matches!(self, Dimension::Xyz | Dimension::Xyzm)
    }

    pub fn has_m(self) -> bool {
        matches!(self, Dimension::Xym | Dimension::Xyzm)
    }

    /// Number of ordinates per coordinate.
    pub fn size(self) -> usize {
        match self {
            Dimension::Xy => 2,
            Dimension::Xyz | Dimension::Xym => 3,
            Dimension::Xyzm => 4,
        }
    }
}

/// Shape shared by [`Coordinate`], [`CoordinateZ`], [`CoordinateM`] and
/// [`CoordinateZM`]. Every geometry type is generic over it.
pub trait CoordinateTuple:
    Copy + PartialEq + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    /// Envelope covering coordinates of this shape.
    type Envelope: BoundingBox;

    const DIMENSION: Dimension;

    /// Size of one encoded coordinate in bytes.
    const WKB_SIZE: usize;

    /// The all-NaN coordinate.
    fn empty() -> Self;

    /// Build a coordinate from its ordinates in canonical order (x, y, \[z\], \[m\]).
    fn from_fn(f: impl FnMut(usize) -> f64) -> Self;

    fn x(&self) -> f64;

    fn y(&self) -> f64;

    /// True iff every ordinate is NaN.
    fn is_empty(&self) -> bool;

    fn contents(&self) -> Contents {
        Contents::from_is_empty(self.is_empty())
    }

    /// The envelope covering exactly this coordinate. All bounds are NaN for
    /// an empty coordinate.
    fn envelope(&self) -> Self::Envelope;

    /// Deterministic 32 bit hash over the canonical ordinate bits.
    fn hash_code(&self) -> i32;

    /// Append the ordinates in canonical order.
    fn write_wkb(&self, writer: &mut ByteWriter);

    fn read_wkb(reader: &mut ByteReader<'_>) -> Result<Self>;

    #[doc(hidden)]
    fn erase(geometry: WkbGeometry<Self>) -> Geometry;

    #[doc(hidden)]
    fn downcast(geometry: Geometry) -> std::result::Result<WkbGeometry<Self>, Geometry>;

    #[doc(hidden)]
    fn downcast_ref(geometry: &Geometry) -> Option<&WkbGeometry<Self>>;
}

fn fold_bits(value: f64) -> i32 {
    let bits = canonical_bits(value);
    (bits ^ (bits >> 32)) as i32
}

pub(crate) fn hash_code_of(ordinates: &[f64]) -> i32 {
    let mut ordinates = ordinates.iter();
    let first = ordinates.next().map_or(0, |v| fold_bits(*v));
    ordinates.fold(first, |acc, v| {
        acc.wrapping_mul(31).wrapping_add(fold_bits(*v))
    })
}

pub(crate) fn ordinates_eq(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(a, b)| canonical_bits(*a) == canonical_bits(*b))
}

pub(crate) fn hash_ordinates<H: Hasher>(ordinates: &[f64], state: &mut H) {
    for v in ordinates {
        canonical_bits(*v).hash(state);
    }
}

// Equality and hashing over canonical bits, for any type with an
// `ordinates()` method returning a fixed-size array.
macro_rules! impl_ordinate_eq_hash {
    ($($t:ty),*) => {
        $(
            impl PartialEq for $t {
                fn eq(&self, other: &Self) -> bool {
                    crate::coordinate::ordinates_eq(&self.ordinates(), &other.ordinates())
                }
            }

            impl Eq for $t {}

            impl std::hash::Hash for $t {
                fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                    crate::coordinate::hash_ordinates(&self.ordinates(), state);
                }
            }
        )*
    };
}

pub(crate) use impl_ordinate_eq_hash;

/// An XY coordinate.
#[derive(Clone, Copy, Debug)]
pub struct Coordinate {
    x: f64,
    y: f64,
}

impl Coordinate {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn ordinates(&self) -> [f64; 2] {
        [self.x, self.y]
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.x, self.y)
    }
}

impl CoordinateTuple for Coordinate {
    type Envelope = Envelope;

    const DIMENSION: Dimension = Dimension::Xy;
    const WKB_SIZE: usize = 16;

    fn empty() -> Self {
        Self::new(f64::NAN, f64::NAN)
    }

    fn from_fn(mut f: impl FnMut(usize) -> f64) -> Self {
        Self::new(f(0), f(1))
    }

    fn x(&self) -> f64 {
        self.x
    }

    fn y(&self) -> f64 {
        self.y
    }

    fn is_empty(&self) -> bool {
        self.x.is_nan() && self.y.is_nan()
    }

    fn envelope(&self) -> Envelope {
        if self.is_empty() {
            return Envelope::empty();
        }
        Envelope::new(self.x, self.y, self.x, self.y)
    }

    fn hash_code(&self) -> i32 {
        hash_code_of(&self.ordinates())
    }

    fn write_wkb(&self, writer: &mut ByteWriter) {
        writer.write_f64(self.x);
        writer.write_f64(self.y);
    }

    fn read_wkb(reader: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self::new(reader.read_f64()?, reader.read_f64()?))
    }

    fn erase(geometry: WkbGeometry<Self>) -> Geometry {
        Geometry::Xy(geometry)
    }

    fn downcast(geometry: Geometry) -> std::result::Result<WkbGeometry<Self>, Geometry> {
        match geometry {
            Geometry::Xy(g) => Ok(g),
            other => Err(other),
        }
    }

    fn downcast_ref(geometry: &Geometry) -> Option<&WkbGeometry<Self>> {
        match geometry {
            Geometry::Xy(g) => Some(g),
            _ => None,
        }
    }
}

/// An XYZ coordinate.
#[derive(Clone, Copy, Debug)]
pub struct CoordinateZ {
    x: f64,
    y: f64,
    z: f64,
}

impl CoordinateZ {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn z(&self) -> f64 {
        self.z
    }

    pub fn ordinates(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<(f64, f64, f64)> for CoordinateZ {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        Self::new(x, y, z)
    }
}

impl fmt::Display for CoordinateZ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6}, {:.6})", self.x, self.y, self.z)
    }
}

impl CoordinateTuple for CoordinateZ {
    type Envelope = EnvelopeZ;

    const DIMENSION: Dimension = Dimension::Xyz;
    const WKB_SIZE: usize = 24;

    fn empty() -> Self {
        Self::new(f64::NAN, f64::NAN, f64::NAN)
    }

    fn from_fn(mut f: impl FnMut(usize) -> f64) -> Self {
        Self::new(f(0), f(1), f(2))
    }

    fn x(&self) -> f64 {
        self.x
    }

    fn y(&self) -> f64 {
        self.y
    }

    fn is_empty(&self) -> bool {
        self.x.is_nan() && self.y.is_nan() && self.z.is_nan()
    }

    fn envelope(&self) -> EnvelopeZ {
        if self.is_empty() {
            return EnvelopeZ::empty();
        }
        EnvelopeZ::new(self.x, self.y, self.z, self.x, self.y, self.z)
    }

    fn hash_code(&self) -> i32 {
        hash_code_of(&self.ordinates())
    }

    fn write_wkb(&self, writer: &mut ByteWriter) {
        writer.write_f64(self.x);
        writer.write_f64(self.y);
        writer.write_f64(self.z);
    }

    fn read_wkb(reader: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self::new(
            reader.read_f64()?,
            reader.read_f64()?,
            reader.read_f64()?,
        ))
    }

    fn erase(geometry: WkbGeometry<Self>) -> Geometry {
        Geometry::Z(geometry)
    }

    fn downcast(geometry: Geometry) -> std::result::Result<WkbGeometry<Self>, Geometry> {
        match geometry {
            Geometry::Z(g) => Ok(g),
            other => Err(other),
        }
    }

    fn downcast_ref(geometry: &Geometry) -> Option<&WkbGeometry<Self>> {
        match geometry {
            Geometry::Z(g) => Some(g),
            _ => None,
        }
    }
}

/// An XY coordinate with a measure.
#[derive(Clone, Copy, Debug)]
pub struct CoordinateM {
    x: f64,
    y: f64,
    m: f64,
}

impl CoordinateM {
    pub const fn new(x: f64, y: f64, m: f64) -> Self {
        Self { x, y, m }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn m(&self) -> f64 {
        self.m
    }

    pub fn ordinates(&self) -> [f64; 3] {
        [self.x, self.y, self.m]
    }
}

impl fmt::Display for CoordinateM {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6}, {:.6} m)", self.x, self.y, self.m)
    }
}

impl CoordinateTuple for CoordinateM {
    type Envelope = EnvelopeM;

    const DIMENSION: Dimension = Dimension::Xym;
    const WKB_SIZE: usize = 24;

    fn empty() -> Self {
        Self::new(f64::NAN, f64::NAN, f64::NAN)
    }

    fn from_fn(mut f: impl FnMut(usize) -> f64) -> Self {
        Self::new(f(0), f(1), f(2))
    }

    fn x(&self) -> f64 {
        self.x
    }

    fn y(&self) -> f64 {
        self.y
    }

    fn is_empty(&self) -> bool {
        self.x.is_nan() && self.y.is_nan() && self.m.is_nan()
    }

    fn envelope(&self) -> EnvelopeM {
        if self.is_empty() {
            return EnvelopeM::empty();
        }
        EnvelopeM::new(self.x, self.y, self.m, self.x, self.y, self.m)
    }

    fn hash_code(&self) -> i32 {
        hash_code_of(&self.ordinates())
    }

    fn write_wkb(&self, writer: &mut ByteWriter) {
        writer.write_f64(self.x);
        writer.write_f64(self.y);
        writer.write_f64(self.m);
    }

    fn read_wkb(reader: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self::new(
            reader.read_f64()?,
            reader.read_f64()?,
            reader.read_f64()?,
        ))
    }

    fn erase(geometry: WkbGeometry<Self>) -> Geometry {
        Geometry::M(geometry)
    }

    fn downcast(geometry: Geometry) -> std::result::Result<WkbGeometry<Self>, Geometry> {
        match geometry {
            Geometry::M(g) => Ok(g),
            other => Err(other),
        }
    }

    fn downcast_ref(geometry: &Geometry) -> Option<&WkbGeometry<Self>> {
        match geometry {
            Geometry::M(g) => Some(g),
            _ => None,
        }
    }
}

/// An XYZ coordinate with a measure.
#[derive(Clone, Copy, Debug)]
pub struct CoordinateZM {
    x: f64,
    y: f64,
    z: f64,
    m: f64,
}

impl CoordinateZM {
    pub const fn new(x: f64, y: f64, z: f64, m: f64) -> Self {
        Self { x, y, z, m }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn z(&self) -> f64 {
        self.z
    }

    pub fn m(&self) -> f64 {
        self.m
    }

    pub fn ordinates(&self) -> [f64; 4] {
        [self.x, self.y, self.z, self.m]
    }
}

impl fmt::Display for CoordinateZM {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.6}, {:.6}, {:.6}, {:.6} m)",
            self.x, self.y, self.z, self.m
        )
    }
}

impl CoordinateTuple for CoordinateZM {
    type Envelope = EnvelopeZM;

    const DIMENSION: Dimension = Dimension::Xyzm;
    const WKB_SIZE: usize = 32;

    fn empty() -> Self {
        Self::new(f64::NAN, f64::NAN, f64::NAN, f64::NAN)
    }

    fn from_fn(mut f: impl FnMut(usize) -> f64) -> Self {
        Self::new(f(0), f(1), f(2), f(3))
    }

    fn x(&self) -> f64 {
        self.x
    }

    fn y(&self) -> f64 {
        self.y
    }

    fn is_empty(&self) -> bool {
        self.x.is_nan() && self.y.is_nan() && self.z.is_nan() && self.m.is_nan()
    }

    fn envelope(&self) -> EnvelopeZM {
        if self.is_empty() {
            return EnvelopeZM::empty();
        }
        EnvelopeZM::new(
            self.x, self.y, self.z, self.m, self.x, self.y, self.z, self.m,
        )
    }

    fn hash_code(&self) -> i32 {
        hash_code_of(&self.ordinates())
    }

    fn write_wkb(&self, writer: &mut ByteWriter) {
        writer.write_f64(self.x);
        writer.write_f64(self.y);
        writer.write_f64(self.z);
        writer.write_f64(self.m);
    }

    fn read_wkb(reader: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self::new(
            reader.read_f64()?,
            reader.read_f64()?,
            reader.read_f64()?,
            reader.read_f64()?,
        ))
    }

    fn erase(geometry: WkbGeometry<Self>) -> Geometry {
        Geometry::Zm(geometry)
    }

    fn downcast(geometry: Geometry) -> std::result::Result<WkbGeometry<Self>, Geometry> {
        match geometry {
            Geometry::Zm(g) => Ok(g),
            other => Err(other),
        }
    }

    fn downcast_ref(geometry: &Geometry) -> Option<&WkbGeometry<Self>> {
        match geometry {
            Geometry::Zm(g) => Some(g),
            _ => None,
        }
    }
}

impl_ordinate_eq_hash!(Coordinate, CoordinateZ, CoordinateM, CoordinateZM);

#[cfg(test)]
mod tests {
    use super::{
        Contents, Coordinate, CoordinateM, CoordinateTuple, CoordinateZ, CoordinateZM, Dimension,
    };
    use crate::Result;
    use crate::bytes::{ByteOrder, ByteReader, ByteWriter};
    use crate::envelope::{BoundingBox, Envelope, EnvelopeZM};
    use std::collections::HashSet;

    #[test]
    fn hash_code_is_pinned() {
        let coord = CoordinateM::new(1.0, 1.0, 1.0);
        assert_eq!(coord.hash_code(), 32505856);
        assert_eq!(coord.hash_code(), CoordinateM::new(1.0, 1.0, 1.0).hash_code());
    }

    #[test]
    fn emptiness_requires_every_ordinate_to_be_nan() {
        assert!(Coordinate::new(f64::NAN, f64::NAN).is_empty());
        assert_eq!(
            Coordinate::new(f64::NAN, f64::NAN).contents(),
            Contents::Empty
        );
        assert!(!Coordinate::new(f64::NAN, 1.0).is_empty());
        assert_eq!(Coordinate::new(f64::NAN, 1.0).contents(), Contents::NotEmpty);

        assert!(CoordinateZ::empty().is_empty());
        assert!(!CoordinateZ::new(f64::NAN, f64::NAN, 0.0).is_empty());
        assert!(CoordinateM::new(f64::NAN, f64::NAN, f64::NAN).is_empty());
        assert!(!CoordinateZM::new(1.0, 1.0, 1.0, 1.0).is_empty());
        assert_eq!(
            CoordinateZM::new(1.0, 1.0, 1.0, 1.0).contents(),
            Contents::NotEmpty
        );
    }

    #[test]
    fn empty_coordinates_compare_equal_regardless_of_nan_payload() {
        let odd_nan = f64::from_bits(0x7FF0_0000_0000_0001);
        let a = Coordinate::new(f64::NAN, f64::NAN);
        let b = Coordinate::new(odd_nan, -f64::NAN);
        assert_eq!(a, b);
        assert_eq!(a.hash_code(), b.hash_code());

        let set: HashSet<Coordinate> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn signed_zeros_are_distinct() {
        assert_ne!(Coordinate::new(0.0, 0.0), Coordinate::new(-0.0, 0.0));
    }

    #[test]
    fn envelope_of_single_coordinate() {
        let envelope = Coordinate::new(3.0, -1.0).envelope();
        assert_eq!(envelope, Envelope::new(3.0, -1.0, 3.0, -1.0));
        assert_eq!(envelope.to_array(), vec![3.0, 3.0, -1.0, -1.0]);

        let empty = CoordinateZM::empty().envelope();
        assert!(empty.is_empty());
        assert_eq!(empty, EnvelopeZM::empty());
        assert!(empty.to_array().is_empty());
    }

    #[test]
    fn writes_ordinates_in_canonical_order() -> Result<()> {
        let coord = CoordinateZM::new(1.0, 2.0, 3.0, 4.0);
        let mut writer = ByteWriter::new(ByteOrder::LittleEndian);
        coord.write_wkb(&mut writer);

        let expected: Vec<u8> = [1.0f64, 2.0, 3.0, 4.0]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        assert_eq!(writer.as_bytes(), expected.as_slice());

        let bytes = writer.into_bytes();
        let mut reader = ByteReader::new(&bytes);
        assert_eq!(CoordinateZM::read_wkb(&mut reader)?, coord);
        reader.finish()?;
        Ok(())
    }

    #[test]
    fn dimension_metadata() {
        assert_eq!(Coordinate::DIMENSION, Dimension::Xy);
        assert_eq!(CoordinateM::DIMENSION.type_code_base(), 2000);
        assert!(CoordinateZM::DIMENSION.has_z() && CoordinateZM::DIMENSION.has_m());
        assert_eq!(
            CoordinateZ::WKB_SIZE,
            CoordinateZ::DIMENSION.size() * std::mem::size_of::<f64>()
        );
        assert_eq!(Dimension::from_type_code_base(3000), Some(Dimension::Xyzm));
        assert_eq!(Dimension::from_type_code_base(4000), None);
    }

    #[test]
    fn display_matches_dimensionality() {
        assert_eq!(
            CoordinateM::new(1.0, 2.0, 3.0).to_string(),
            "(1.000000, 2.000000, 3.000000 m)"
        );
        assert_eq!(Coordinate::new(1.5, 2.0).to_string(), "(1.500000, 2.000000)");
    }
}
