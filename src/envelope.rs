//! Axis-aligned bounding boxes.
//!
//! Envelopes are built by folding [`BoundingBox::combine`] over coordinates.
//! The per-axis fold uses [`f64::min`] / [`f64::max`], which drop a NaN operand,
//! so the all-NaN envelope returned by [`BoundingBox::empty`] is the identity of
//! `combine`.

use std::fmt;
use std::hash::Hash;

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::coordinate::impl_ordinate_eq_hash;
use crate::error::{GpkgError, Result};

/// Which envelope layout follows the fixed part of a GeoPackage binary header.
///
/// The discriminant is the value stored in bits 1-3 of the header flags byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum EnvelopeContentsIndicator {
    NoEnvelope = 0,
    Xy = 1,
    Xyz = 2,
    Xym = 3,
    Xyzm = 4,
}

impl EnvelopeContentsIndicator {
    pub fn code(self) -> u8 {
        self.into()
    }

    /// Number of doubles in the envelope array.
    pub fn array_size(self) -> usize {
        match self {
            EnvelopeContentsIndicator::NoEnvelope => 0,
            EnvelopeContentsIndicator::Xy => 4,
            EnvelopeContentsIndicator::Xyz | EnvelopeContentsIndicator::Xym => 6,
            EnvelopeContentsIndicator::Xyzm => 8,
        }
    }

    pub fn byte_size(self) -> usize {
        self.array_size() * std::mem::size_of::<f64>()
    }
}

/// Operations shared by the four envelope types.
pub trait BoundingBox: Copy + PartialEq + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    const HAS_Z: bool;
    const HAS_M: bool;

    /// The envelope with every bound NaN.
    fn empty() -> Self;

    /// True iff every bound is NaN.
    fn is_empty(&self) -> bool;

    /// Component-wise union.
    fn combine(&self, other: &Self) -> Self;

    /// Bounds in GeoPackage header order: `[minX, maxX, minY, maxY, (minZ, maxZ), (minM, maxM)]`.
    /// Empty when the envelope is empty.
    fn to_array(&self) -> Vec<f64>;

    fn contents_indicator(&self) -> EnvelopeContentsIndicator;

    /// The XY projection.
    fn to_xy(&self) -> Envelope;

    #[doc(hidden)]
    fn erase(self) -> GeometryEnvelope;

    fn has_z(&self) -> bool {
        Self::HAS_Z
    }

    fn has_m(&self) -> bool {
        Self::HAS_M
    }
}

/// Smaller of two bounds. A NaN operand is dropped and `-0.0 < 0.0`.
fn nan_min(a: f64, b: f64) -> f64 {
    if a.is_nan() {
        b
    } else if b.is_nan() || a.total_cmp(&b).is_le() {
        a
    } else {
        b
    }
}

/// Larger of two bounds. A NaN operand is dropped and `-0.0 < 0.0`.
fn nan_max(a: f64, b: f64) -> f64 {
    if a.is_nan() {
        b
    } else if b.is_nan() || a.total_cmp(&b).is_ge() {
        a
    } else {
        b
    }
}

/// Fold `combine` over `envelopes`, starting from the empty envelope.
pub(crate) fn combine_all<E: BoundingBox>(envelopes: impl IntoIterator<Item = E>) -> E {
    envelopes
        .into_iter()
        .fold(E::empty(), |acc, envelope| acc.combine(&envelope))
}

/// XY envelope.
#[derive(Clone, Copy, Debug)]
pub struct Envelope {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl Envelope {
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    fn ordinates(&self) -> [f64; 4] {
        [self.min_x, self.min_y, self.max_x, self.max_y]
    }
}

impl BoundingBox for Envelope {
    const HAS_Z: bool = false;
    const HAS_M: bool = false;

    fn empty() -> Self {
        Self::new(f64::NAN, f64::NAN, f64::NAN, f64::NAN)
    }

    fn is_empty(&self) -> bool {
        self.ordinates().iter().all(|v| v.is_nan())
    }

    fn combine(&self, other: &Self) -> Self {
        Self::new(
            nan_min(self.min_x, other.min_x),
            nan_min(self.min_y, other.min_y),
            nan_max(self.max_x, other.max_x),
            nan_max(self.max_y, other.max_y),
        )
    }

    fn to_array(&self) -> Vec<f64> {
        if self.is_empty() {
            return Vec::new();
        }
        vec![self.min_x, self.max_x, self.min_y, self.max_y]
    }

    fn contents_indicator(&self) -> EnvelopeContentsIndicator {
        if self.is_empty() {
            EnvelopeContentsIndicator::NoEnvelope
        } else {
            EnvelopeContentsIndicator::Xy
        }
    }

    fn to_xy(&self) -> Envelope {
        *self
    }

    fn erase(self) -> GeometryEnvelope {
        GeometryEnvelope::Xy(self)
    }
}

/// XYZ envelope.
#[derive(Clone, Copy, Debug)]
pub struct EnvelopeZ {
    min_x: f64,
    min_y: f64,
    min_z: f64,
    max_x: f64,
    max_y: f64,
    max_z: f64,
}

impl EnvelopeZ {
    pub const fn new(
        min_x: f64,
        min_y: f64,
        min_z: f64,
        max_x: f64,
        max_y: f64,
        max_z: f64,
    ) -> Self {
        Self {
            min_x,
            min_y,
            min_z,
            max_x,
            max_y,
            max_z,
        }
    }

    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    pub fn min_z(&self) -> f64 {
        self.min_z
    }

    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    pub fn max_z(&self) -> f64 {
        self.max_z
    }

    fn ordinates(&self) -> [f64; 6] {
        [
            self.min_x, self.min_y, self.min_z, self.max_x, self.max_y, self.max_z,
        ]
    }
}

impl BoundingBox for EnvelopeZ {
    const HAS_Z: bool = true;
    const HAS_M: bool = false;

    fn empty() -> Self {
        Self::new(f64::NAN, f64::NAN, f64::NAN, f64::NAN, f64::NAN, f64::NAN)
    }

    fn is_empty(&self) -> bool {
        self.ordinates().iter().all(|v| v.is_nan())
    }

    fn combine(&self, other: &Self) -> Self {
        Self::new(
            nan_min(self.min_x, other.min_x),
            nan_min(self.min_y, other.min_y),
            nan_min(self.min_z, other.min_z),
            nan_max(self.max_x, other.max_x),
            nan_max(self.max_y, other.max_y),
            nan_max(self.max_z, other.max_z),
        )
    }

    fn to_array(&self) -> Vec<f64> {
        if self.is_empty() {
            return Vec::new();
        }
        vec![
            self.min_x, self.max_x, self.min_y, self.max_y, self.min_z, self.max_z,
        ]
    }

    fn contents_indicator(&self) -> EnvelopeContentsIndicator {
        if self.is_empty() {
            EnvelopeContentsIndicator::NoEnvelope
        } else {
            EnvelopeContentsIndicator::Xyz
        }
    }

    fn to_xy(&self) -> Envelope {
        Envelope::new(self.min_x, self.min_y, self.max_x, self.max_y)
    }

    fn erase(self) -> GeometryEnvelope {
        GeometryEnvelope::Z(self)
    }
}

/// XY envelope with a measure range.
#[derive(Clone, Copy, Debug)]
pub struct EnvelopeM {
    min_x: f64,
    min_y: f64,
    min_m: f64,
    max_x: f64,
    max_y: f64,
    max_m: f64,
}

impl EnvelopeM {
    pub const fn new(
        min_x: f64,
        min_y: f64,
        min_m: f64,
        max_x: f64,
        max_y: f64,
        max_m: f64,
    ) -> Self {
        Self {
            min_x,
            min_y,
            min_m,
            max_x,
            max_y,
            max_m,
        }
    }

    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    pub fn min_m(&self) -> f64 {
        self.min_m
    }

    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    pub fn max_m(&self) -> f64 {
        self.max_m
    }

    fn ordinates(&self) -> [f64; 6] {
        [
            self.min_x, self.min_y, self.min_m, self.max_x, self.max_y, self.max_m,
        ]
    }
}

impl BoundingBox for EnvelopeM {
    const HAS_Z: bool = false;
    const HAS_M: bool = true;

    fn empty() -> Self {
        Self::new(f64::NAN, f64::NAN, f64::NAN, f64::NAN, f64::NAN, f64::NAN)
    }

    fn is_empty(&self) -> bool {
        self.ordinates().iter().all(|v| v.is_nan())
    }

    fn combine(&self, other: &Self) -> Self {
        Self::new(
            nan_min(self.min_x, other.min_x),
            nan_min(self.min_y, other.min_y),
            nan_min(self.min_m, other.min_m),
            nan_max(self.max_x, other.max_x),
            nan_max(self.max_y, other.max_y),
            nan_max(self.max_m, other.max_m),
        )
    }

    fn to_array(&self) -> Vec<f64> {
        if self.is_empty() {
            return Vec::new();
        }
        vec![
            self.min_x, self.max_x, self.min_y, self.max_y, self.min_m, self.max_m,
        ]
    }

    fn contents_indicator(&self) -> EnvelopeContentsIndicator {
        if self.is_empty() {
            EnvelopeContentsIndicator::NoEnvelope
        } else {
            EnvelopeContentsIndicator::Xym
        }
    }

    fn to_xy(&self) -> Envelope {
        Envelope::new(self.min_x, self.min_y, self.max_x, self.max_y)
    }

    fn erase(self) -> GeometryEnvelope {
        GeometryEnvelope::M(self)
    }
}

/// XYZ envelope with a measure range.
#[derive(Clone, Copy, Debug)]
pub struct EnvelopeZM {
    min_x: f64,
    min_y: f64,
    min_z: f64,
    min_m: f64,
    max_x: f64,
    max_y: f64,
    max_z: f64,
    max_m: f64,
}

impl EnvelopeZM {
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        min_x: f64,
        min_y: f64,
        min_z: f64,
        min_m: f64,
        max_x: f64,
        max_y: f64,
        max_z: f64,
        max_m: f64,
    ) -> Self {
        Self {
            min_x,
            min_y,
            min_z,
            min_m,
            max_x,
            max_y,
            max_z,
            max_m,
        }
    }

    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    pub fn min_z(&self) -> f64 {
        self.min_z
    }

    pub fn min_m(&self) -> f64 {
        self.min_m
    }

    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    pub fn max_z(&self) -> f64 {
        self.max_z
    }

    pub fn max_m(&self) -> f64 {
        self.max_m
    }

    fn ordinates(&self) -> [f64; 8] {
        [
            self.min_x, self.min_y, self.min_z, self.min_m, self.max_x, self.max_y, self.max_z,
            self.max_m,
        ]
    }
}

impl BoundingBox for EnvelopeZM {
    const HAS_Z: bool = true;
    const HAS_M: bool = true;

    fn empty() -> Self {
        Self::new(
            f64::NAN,
            f64::NAN,
            f64::NAN,
            f64::NAN,
            f64::NAN,
            f64::NAN,
            f64::NAN,
            f64::NAN,
        )
    }

    fn is_empty(&self) -> bool {
        self.ordinates().iter().all(|v| v.is_nan())
    }

    fn combine(&self, other: &Self) -> Self {
        Self::new(
            nan_min(self.min_x, other.min_x),
            nan_min(self.min_y, other.min_y),
            nan_min(self.min_z, other.min_z),
            nan_min(self.min_m, other.min_m),
            nan_max(self.max_x, other.max_x),
            nan_max(self.max_y, other.max_y),
            nan_max(self.max_z, other.max_z),
            nan_max(self.max_m, other.max_m),
        )
    }

    fn to_array(&self) -> Vec<f64> {
        if self.is_empty() {
            return Vec::new();
        }
        vec![
            self.min_x, self.max_x, self.min_y, self.max_y, self.min_z, self.max_z, self.min_m,
            self.max_m,
        ]
    }

    fn contents_indicator(&self) -> EnvelopeContentsIndicator {
        if self.is_empty() {
            EnvelopeContentsIndicator::NoEnvelope
        } else {
            EnvelopeContentsIndicator::Xyzm
        }
    }

    fn to_xy(&self) -> Envelope {
        Envelope::new(self.min_x, self.min_y, self.max_x, self.max_y)
    }

    fn erase(self) -> GeometryEnvelope {
        GeometryEnvelope::Zm(self)
    }
}

impl_ordinate_eq_hash!(Envelope, EnvelopeZ, EnvelopeM, EnvelopeZM);

/// An envelope of any dimensionality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeometryEnvelope {
    Xy(Envelope),
    Z(EnvelopeZ),
    M(EnvelopeM),
    Zm(EnvelopeZM),
}

impl GeometryEnvelope {
    /// Rebuild an envelope from a GeoPackage header envelope array.
    ///
    /// Returns `None` for [`EnvelopeContentsIndicator::NoEnvelope`].
    pub fn from_array(
        indicator: EnvelopeContentsIndicator,
        values: &[f64],
    ) -> Result<Option<Self>> {
        let envelope = match (indicator, values) {
            (EnvelopeContentsIndicator::NoEnvelope, &[]) => return Ok(None),
            (EnvelopeContentsIndicator::Xy, &[min_x, max_x, min_y, max_y]) => {
                GeometryEnvelope::Xy(Envelope::new(min_x, min_y, max_x, max_y))
            }
            (EnvelopeContentsIndicator::Xyz, &[min_x, max_x, min_y, max_y, min_z, max_z]) => {
                GeometryEnvelope::Z(EnvelopeZ::new(min_x, min_y, min_z, max_x, max_y, max_z))
            }
            (EnvelopeContentsIndicator::Xym, &[min_x, max_x, min_y, max_y, min_m, max_m]) => {
                GeometryEnvelope::M(EnvelopeM::new(min_x, min_y, min_m, max_x, max_y, max_m))
            }
            (
                EnvelopeContentsIndicator::Xyzm,
                &[min_x, max_x, min_y, max_y, min_z, max_z, min_m, max_m],
            ) => GeometryEnvelope::Zm(EnvelopeZM::new(
                min_x, min_y, min_z, min_m, max_x, max_y, max_z, max_m,
            )),
            _ => {
                return Err(GpkgError::invalid_argument(format!(
                    "envelope indicator {indicator:?} needs {} values, got {}",
                    indicator.array_size(),
                    values.len()
                )));
            }
        };
        Ok(Some(envelope))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            GeometryEnvelope::Xy(e) => e.is_empty(),
            GeometryEnvelope::Z(e) => e.is_empty(),
            GeometryEnvelope::M(e) => e.is_empty(),
            GeometryEnvelope::Zm(e) => e.is_empty(),
        }
    }

    pub fn to_array(&self) -> Vec<f64> {
        match self {
            GeometryEnvelope::Xy(e) => e.to_array(),
            GeometryEnvelope::Z(e) => e.to_array(),
            GeometryEnvelope::M(e) => e.to_array(),
            GeometryEnvelope::Zm(e) => e.to_array(),
        }
    }

    pub fn contents_indicator(&self) -> EnvelopeContentsIndicator {
        match self {
            GeometryEnvelope::Xy(e) => e.contents_indicator(),
            GeometryEnvelope::Z(e) => e.contents_indicator(),
            GeometryEnvelope::M(e) => e.contents_indicator(),
            GeometryEnvelope::Zm(e) => e.contents_indicator(),
        }
    }

    pub fn to_xy(&self) -> Envelope {
        match self {
            GeometryEnvelope::Xy(e) => e.to_xy(),
            GeometryEnvelope::Z(e) => e.to_xy(),
            GeometryEnvelope::M(e) => e.to_xy(),
            GeometryEnvelope::Zm(e) => e.to_xy(),
        }
    }

    pub fn has_z(&self) -> bool {
        matches!(self, GeometryEnvelope::Z(_) | GeometryEnvelope::Zm(_))
    }

    pub fn has_m(&self) -> bool {
        matches!(self, GeometryEnvelope::M(_) | GeometryEnvelope::Zm(_))
    }

    /// Z range, if this envelope carries one.
    pub fn z_range(&self) -> Option<(f64, f64)> {
        match self {
            GeometryEnvelope::Z(e) => Some((e.min_z, e.max_z)),
            GeometryEnvelope::Zm(e) => Some((e.min_z, e.max_z)),
            _ => None,
        }
    }

    /// M range, if this envelope carries one.
    pub fn m_range(&self) -> Option<(f64, f64)> {
        match self {
            GeometryEnvelope::M(e) => Some((e.min_m, e.max_m)),
            GeometryEnvelope::Zm(e) => Some((e.min_m, e.max_m)),
            _ => None,
        }
    }
}
