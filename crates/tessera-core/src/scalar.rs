//! Runtime Scalars
//!
//! `ScalarValue` carries a number whose kind is only known at runtime, such
//! as the `alpha` multiplier of `add`/`sub` or the right-hand side of a
//! scalar overload. Integral values stay exact as `i64`; floating values
//! are held as `f64`.
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

use core::fmt;

use half::f16;

use crate::dtype::{Element, ScalarKind};

/// A runtime number of integral or floating category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarValue {
    /// Integral value.
    Int(i64),
    /// Floating value.
    Float(f64),
}

impl ScalarValue {
    /// Returns true if the value is integral.
    #[must_use]
    pub const fn is_integral(self) -> bool {
        matches!(self, Self::Int(_))
    }

    /// Returns true if the value is floating.
    #[must_use]
    pub const fn is_floating(self) -> bool {
        matches!(self, Self::Float(_))
    }

    /// Kind of a tensor wrapping this value (`Long` or `Double`).
    #[must_use]
    pub const fn kind(self) -> ScalarKind {
        match self {
            Self::Int(_) => ScalarKind::Long,
            Self::Float(_) => ScalarKind::Double,
        }
    }

    /// Converts to an element of type `T`.
    #[must_use]
    pub fn to_element<T: Element>(self) -> T {
        match self {
            Self::Int(v) => T::from_i64(v),
            Self::Float(v) => T::from_f64(v),
        }
    }

    /// Returns the value as `f64`.
    #[must_use]
    pub fn to_f64(self) -> f64 {
        match self {
            Self::Int(v) => v as f64,
            Self::Float(v) => v,
        }
    }

    /// Returns true if the value equals one.
    #[must_use]
    pub fn is_one(self) -> bool {
        match self {
            Self::Int(v) => v == 1,
            Self::Float(v) => v == 1.0,
        }
    }
}

impl Default for ScalarValue {
    fn default() -> Self {
        Self::Int(1)
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
        }
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(impl From<$ty> for ScalarValue {
            fn from(value: $ty) -> Self {
                Self::Int(value as i64)
            }
        })*
    };
}

macro_rules! impl_from_float {
    ($($ty:ty),*) => {
        $(impl From<$ty> for ScalarValue {
            fn from(value: $ty) -> Self {
                Self::Float(value as f64)
            }
        })*
    };
}

impl_from_int!(u8, i8, i16, i32, i64, u32);
impl_from_float!(f32, f64);

impl From<f16> for ScalarValue {
    fn from(value: f16) -> Self {
        Self::Float(value.to_f64())
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        Self::Int(i64::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert!(ScalarValue::from(3i32).is_integral());
        assert!(ScalarValue::from(0.5f32).is_floating());
        assert_eq!(ScalarValue::from(2u8).kind(), ScalarKind::Long);
        assert_eq!(ScalarValue::from(2.0f64).kind(), ScalarKind::Double);
        assert!(ScalarValue::default().is_one());
    }

    #[test]
    fn test_to_element() {
        assert_eq!(ScalarValue::Float(2.75).to_element::<i32>(), 2);
        assert_eq!(ScalarValue::Int(-3).to_element::<f32>(), -3.0);
        assert_eq!(ScalarValue::Int(257).to_element::<u8>(), 1);
    }
}
