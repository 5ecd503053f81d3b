//! Scalar Kinds - Element Type System and Promotion Lattice
//!
//! Defines the numeric element kinds an operand may carry, the static
//! promotion table used to pick the common kind of an elementwise
//! operation, the casting policies applied when a result is written into a
//! pre-supplied output, and the `Element` trait binding every concrete kind
//! to its Rust type.
//!
//! # Key Features
//! - `ScalarKind` enumeration with a stable index order
//! - Symmetric 9x9 promotion table with an absorbing `Undefined`
//! - Casting policies (`Unsafe`, `SameKind`, `Safe`)
//! - `dispatch_kind!` for monomorphizing over a runtime kind
//!
//! # Example
//! ```rust
//! use tessera_core::{promote_types, ScalarKind};
//!
//! assert_eq!(promote_types(ScalarKind::Byte, ScalarKind::Char), ScalarKind::Short);
//! assert_eq!(promote_types(ScalarKind::Half, ScalarKind::Int), ScalarKind::Double);
//! ```
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

use core::fmt::{self, Debug};

use bytemuck::Pod;
use half::f16;
use num_traits::{One, Zero};

// =============================================================================
// ScalarKind Enum
// =============================================================================

/// Runtime tag for the element type of an operand.
///
/// The discriminant order is the row/column order of the promotion table.
/// Never reorder the variants without rewriting `PROMOTE_TABLE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ScalarKind {
    /// 8-bit unsigned integer.
    Byte = 0,
    /// 8-bit signed integer.
    Char = 1,
    /// 16-bit signed integer.
    Short = 2,
    /// 32-bit signed integer.
    Int = 3,
    /// 64-bit signed integer.
    Long = 4,
    /// 16-bit floating point.
    Half = 5,
    /// 32-bit floating point.
    Float = 6,
    /// 64-bit floating point.
    Double = 7,
    /// Sentinel for a missing or unknown kind.
    Undefined = 8,
}

/// Number of entries along one axis of the promotion table.
pub const NUM_KINDS: usize = 9;

impl ScalarKind {
    /// Every kind, in table order.
    pub const ALL: [Self; NUM_KINDS] = [
        Self::Byte,
        Self::Char,
        Self::Short,
        Self::Int,
        Self::Long,
        Self::Half,
        Self::Float,
        Self::Double,
        Self::Undefined,
    ];

    /// Every concrete kind (excludes `Undefined`).
    pub const CONCRETE: [Self; NUM_KINDS - 1] = [
        Self::Byte,
        Self::Char,
        Self::Short,
        Self::Int,
        Self::Long,
        Self::Half,
        Self::Float,
        Self::Double,
    ];

    /// Returns the size in bytes of one element of this kind.
    ///
    /// `Undefined` has no storage and reports 0.
    #[must_use]
    pub const fn size_of(self) -> usize {
        match self {
            Self::Byte | Self::Char => 1,
            Self::Short | Self::Half => 2,
            Self::Int | Self::Float => 4,
            Self::Long | Self::Double => 8,
            Self::Undefined => 0,
        }
    }

    /// Returns true for the integral kinds.
    #[must_use]
    pub const fn is_integral(self) -> bool {
        matches!(
            self,
            Self::Byte | Self::Char | Self::Short | Self::Int | Self::Long
        )
    }

    /// Returns true for the floating point kinds.
    #[must_use]
    pub const fn is_floating(self) -> bool {
        matches!(self, Self::Half | Self::Float | Self::Double)
    }

    /// Returns true for kinds that can represent negative values.
    #[must_use]
    pub const fn is_signed(self) -> bool {
        !matches!(self, Self::Byte | Self::Undefined)
    }

    /// Returns true unless this is the `Undefined` sentinel.
    #[must_use]
    pub const fn is_defined(self) -> bool {
        !matches!(self, Self::Undefined)
    }

    /// Returns the short name of this kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Byte => "uint8",
            Self::Char => "int8",
            Self::Short => "int16",
            Self::Int => "int32",
            Self::Long => "int64",
            Self::Half => "float16",
            Self::Float => "float32",
            Self::Double => "float64",
            Self::Undefined => "undefined",
        }
    }

    /// Returns the row/column index of this kind in the promotion table.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Looks a kind up by its table index.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < NUM_KINDS {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// Returns the default floating point kind (`Float`).
    #[must_use]
    pub const fn default_float() -> Self {
        Self::Float
    }

    /// Returns the default integral kind (`Long`).
    #[must_use]
    pub const fn default_int() -> Self {
        Self::Long
    }
}

impl Default for ScalarKind {
    fn default() -> Self {
        Self::default_float()
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Promotion Table
// =============================================================================

const U1: ScalarKind = ScalarKind::Byte;
const I1: ScalarKind = ScalarKind::Char;
const I2: ScalarKind = ScalarKind::Short;
const I4: ScalarKind = ScalarKind::Int;
const I8: ScalarKind = ScalarKind::Long;
const F2: ScalarKind = ScalarKind::Half;
const F4: ScalarKind = ScalarKind::Float;
const F8: ScalarKind = ScalarKind::Double;
const UD: ScalarKind = ScalarKind::Undefined;

/// Pairwise promotion results, indexed `[row][col]` by `ScalarKind::index`.
#[rustfmt::skip]
static PROMOTE_TABLE: [[ScalarKind; NUM_KINDS]; NUM_KINDS] = [
    /*          u1  i1  i2  i4  i8  f2  f4  f8  ud */
    /* u1 */ [ U1, I2, I2, I4, I8, F2, F4, F8, UD ],
    /* i1 */ [ I2, I1, I2, I4, I8, F2, F4, F8, UD ],
    /* i2 */ [ I2, I2, I2, I4, I8, F4, F4, F8, UD ],
    /* i4 */ [ I4, I4, I4, I4, I8, F8, F4, F8, UD ],
    /* i8 */ [ I8, I8, I8, I8, I8, F8, F4, F8, UD ],
    /* f2 */ [ F2, F2, F4, F8, F8, F2, F4, F8, UD ],
    /* f4 */ [ F4, F4, F4, F4, F4, F4, F4, F8, UD ],
    /* f8 */ [ F8, F8, F8, F8, F8, F8, F8, F8, UD ],
    /* ud */ [ UD, UD, UD, UD, UD, UD, UD, UD, UD ],
];

/// Returns the kind that holds the result of combining `a` and `b`.
///
/// The result comes straight from the static table. `Undefined` on either
/// side yields `Undefined`; callers check for it before relying on the
/// result.
#[must_use]
pub fn promote_types(a: ScalarKind, b: ScalarKind) -> ScalarKind {
    PROMOTE_TABLE[a.index()][b.index()]
}

/// Folds `promote_types` over a sequence of kinds.
///
/// An empty sequence yields `Undefined`.
#[must_use]
pub fn promote_all<I: IntoIterator<Item = ScalarKind>>(kinds: I) -> ScalarKind {
    let mut iter = kinds.into_iter();
    match iter.next() {
        Some(first) => iter.fold(first, promote_types),
        None => ScalarKind::Undefined,
    }
}

// =============================================================================
// Casting Policy
// =============================================================================

/// Rule deciding whether a computed kind may be written into an output of
/// another kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CastingPolicy {
    /// Any conversion is allowed, including silent narrowing.
    #[default]
    Unsafe,
    /// Conversions within a category, or from integral to floating.
    SameKind,
    /// Only conversions that lose no information.
    Safe,
}

impl CastingPolicy {
    /// Returns true if a value of kind `from` may be stored as `to`.
    #[must_use]
    pub fn allows(self, from: ScalarKind, to: ScalarKind) -> bool {
        if from == to {
            return true;
        }
        if !from.is_defined() || !to.is_defined() {
            return false;
        }
        match self {
            Self::Unsafe => true,
            Self::SameKind => !(from.is_floating() && to.is_integral()),
            Self::Safe => promote_types(from, to) == to,
        }
    }

    /// Parses a policy name (`unsafe`, `same_kind`, `safe`).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "unsafe" => Some(Self::Unsafe),
            "same_kind" | "same-kind" | "samekind" => Some(Self::SameKind),
            "safe" => Some(Self::Safe),
            _ => None,
        }
    }

    /// Returns the canonical name of this policy.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Unsafe => "unsafe",
            Self::SameKind => "same_kind",
            Self::Safe => "safe",
        }
    }
}

impl fmt::Display for CastingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Element Trait
// =============================================================================

/// A concrete Rust type that can be stored in an operand of some `ScalarKind`.
///
/// Arithmetic on integral elements wraps on overflow. Conversions follow
/// Rust `as` semantics (floating to integral saturates).
pub trait Element:
    Pod + Zero + One + Debug + PartialEq + PartialOrd + Send + Sync + 'static
{
    /// The runtime tag of this element type.
    const KIND: ScalarKind;

    /// `self + rhs`.
    fn add_value(self, rhs: Self) -> Self;
    /// `self - rhs`.
    fn sub_value(self, rhs: Self) -> Self;
    /// `self * rhs`.
    fn mul_value(self, rhs: Self) -> Self;
    /// `self / rhs`. Integral division by zero panics; kernels check first.
    fn div_value(self, rhs: Self) -> Self;
    /// `-self`.
    fn neg_value(self) -> Self;
    /// `|self|`.
    fn abs_value(self) -> Self;

    /// Converts to `f64`.
    fn to_f64(self) -> f64;
    /// Converts to `i64`.
    fn to_i64(self) -> i64;
    /// Converts from `f64`.
    fn from_f64(value: f64) -> Self;
    /// Converts from `i64`.
    fn from_i64(value: i64) -> Self;

    /// Converts this element to another element type.
    #[inline]
    fn cast<D: Element>(self) -> D {
        if Self::KIND.is_integral() {
            D::from_i64(self.to_i64())
        } else {
            D::from_f64(self.to_f64())
        }
    }
}

macro_rules! impl_int_element {
    ($ty:ty, $kind:ident, |$v:ident| $abs:expr) => {
        impl Element for $ty {
            const KIND: ScalarKind = ScalarKind::$kind;

            #[inline]
            fn add_value(self, rhs: Self) -> Self {
                self.wrapping_add(rhs)
            }

            #[inline]
            fn sub_value(self, rhs: Self) -> Self {
                self.wrapping_sub(rhs)
            }

            #[inline]
            fn mul_value(self, rhs: Self) -> Self {
                self.wrapping_mul(rhs)
            }

            #[inline]
            fn div_value(self, rhs: Self) -> Self {
                self.wrapping_div(rhs)
            }

            #[inline]
            fn neg_value(self) -> Self {
                self.wrapping_neg()
            }

            #[inline]
            fn abs_value(self) -> Self {
                let $v = self;
                $abs
            }

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn to_i64(self) -> i64 {
                self as i64
            }

            #[inline]
            fn from_f64(value: f64) -> Self {
                value as $ty
            }

            #[inline]
            fn from_i64(value: i64) -> Self {
                value as $ty
            }
        }
    };
}

impl_int_element!(u8, Byte, |v| v);
impl_int_element!(i8, Char, |v| v.wrapping_abs());
impl_int_element!(i16, Short, |v| v.wrapping_abs());
impl_int_element!(i32, Int, |v| v.wrapping_abs());
impl_int_element!(i64, Long, |v| v.wrapping_abs());

macro_rules! impl_float_element {
    ($ty:ty, $kind:ident) => {
        impl Element for $ty {
            const KIND: ScalarKind = ScalarKind::$kind;

            #[inline]
            fn add_value(self, rhs: Self) -> Self {
                self + rhs
            }

            #[inline]
            fn sub_value(self, rhs: Self) -> Self {
                self - rhs
            }

            #[inline]
            fn mul_value(self, rhs: Self) -> Self {
                self * rhs
            }

            #[inline]
            fn div_value(self, rhs: Self) -> Self {
                self / rhs
            }

            #[inline]
            fn neg_value(self) -> Self {
                -self
            }

            #[inline]
            fn abs_value(self) -> Self {
                self.abs()
            }

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn to_i64(self) -> i64 {
                self as i64
            }

            #[inline]
            fn from_f64(value: f64) -> Self {
                value as $ty
            }

            #[inline]
            fn from_i64(value: i64) -> Self {
                value as $ty
            }
        }
    };
}

impl_float_element!(f32, Float);
impl_float_element!(f64, Double);

// Half precision computes through f32.
impl Element for f16 {
    const KIND: ScalarKind = ScalarKind::Half;

    #[inline]
    fn add_value(self, rhs: Self) -> Self {
        f16::from_f32(self.to_f32() + rhs.to_f32())
    }

    #[inline]
    fn sub_value(self, rhs: Self) -> Self {
        f16::from_f32(self.to_f32() - rhs.to_f32())
    }

    #[inline]
    fn mul_value(self, rhs: Self) -> Self {
        f16::from_f32(self.to_f32() * rhs.to_f32())
    }

    #[inline]
    fn div_value(self, rhs: Self) -> Self {
        f16::from_f32(self.to_f32() / rhs.to_f32())
    }

    #[inline]
    fn neg_value(self) -> Self {
        -self
    }

    #[inline]
    fn abs_value(self) -> Self {
        f16::from_f32(self.to_f32().abs())
    }

    #[inline]
    fn to_f64(self) -> f64 {
        f16::to_f64(self)
    }

    #[inline]
    fn to_i64(self) -> i64 {
        f16::to_f64(self) as i64
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        f16::from_f64(value)
    }

    #[inline]
    fn from_i64(value: i64) -> Self {
        f16::from_f64(value as f64)
    }
}

// =============================================================================
// Kind Dispatch
// =============================================================================

/// Runs a body with a type alias bound to the element type of a runtime kind.
///
/// ```rust
/// use tessera_core::{dispatch_kind, ScalarKind};
///
/// let bytes = dispatch_kind!(ScalarKind::Int, T => core::mem::size_of::<T>(), _ => 0);
/// assert_eq!(bytes, 4);
/// ```
#[macro_export]
macro_rules! dispatch_kind {
    ($kind:expr, $T:ident => $body:expr, _ => $fallback:expr) => {
        match $kind {
            $crate::ScalarKind::Byte => {
                type $T = u8;
                $body
            }
            $crate::ScalarKind::Char => {
                type $T = i8;
                $body
            }
            $crate::ScalarKind::Short => {
                type $T = i16;
                $body
            }
            $crate::ScalarKind::Int => {
                type $T = i32;
                $body
            }
            $crate::ScalarKind::Long => {
                type $T = i64;
                $body
            }
            $crate::ScalarKind::Half => {
                type $T = $crate::f16;
                $body
            }
            $crate::ScalarKind::Float => {
                type $T = f32;
                $body
            }
            $crate::ScalarKind::Double => {
                type $T = f64;
                $body
            }
            $crate::ScalarKind::Undefined => $fallback,
        }
    };
}

// =============================================================================
// Tests
// =============================================================================
