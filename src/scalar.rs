//! Element types that tile matrices can hold.
//!
//! Four element types are supported, matching the four precisions of the reference LAPACK:
//! `f32`, `f64`, [`c32`] and [`c64`]. The complex types are the `num-complex` ones, which share
//! their layout with the types the `gemm` crate dispatches on.

use core::fmt::Debug;
use core::ops::{Add, Div, Mul, Neg, Sub};
use num_traits::{One, Zero};

/// Single precision complex number.
#[allow(non_camel_case_types)]
pub type c32 = num_complex::Complex32;
/// Double precision complex number.
#[allow(non_camel_case_types)]
pub type c64 = num_complex::Complex64;

/// Datatype tag carried by every tile descriptor.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Precision {
    /// `f32`.
    RealFloat,
    /// `f64`.
    RealDouble,
    /// [`c32`].
    ComplexFloat,
    /// [`c64`].
    ComplexDouble,
}

impl Precision {
    /// Size in bytes of one element.
    #[inline]
    pub const fn element_size(self) -> usize {
        match self {
            Precision::RealFloat => 4,
            Precision::RealDouble => 8,
            Precision::ComplexFloat => 8,
            Precision::ComplexDouble => 16,
        }
    }

    /// Whether the element type is complex.
    #[inline]
    pub const fn is_complex(self) -> bool {
        matches!(self, Precision::ComplexFloat | Precision::ComplexDouble)
    }
}

/// Operations that a tile element type needs to implement.
pub trait ComplexField:
    Copy
    + Debug
    + PartialEq
    + Send
    + Sync
    + bytemuck::Pod
    + Zero
    + One
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + 'static
{
    /// Real counterpart of the type.
    type Real: RealField;

    /// Datatype tag.
    const PRECISION: Precision;

    /// Returns `conjugate(self)`.
    fn conj(self) -> Self;
    /// Returns the real part.
    fn real(self) -> Self::Real;
    /// Returns the imaginary part.
    fn imag(self) -> Self::Real;
    /// Returns a number whose real part is equal to `real`, and a zero imaginary part.
    fn from_real(real: Self::Real) -> Self;
    /// Returns the input, scaled by `rhs`.
    fn scale_real(self, rhs: Self::Real) -> Self;

    /// Returns the squared absolute value of `self`.
    #[inline]
    fn abs2(self) -> Self::Real {
        let re = self.real();
        let im = self.imag();
        re * re + im * im
    }

    /// Returns the absolute value of `self`.
    #[inline]
    fn abs(self) -> Self::Real {
        self.real().hypot(self.imag())
    }

    /// Returns true if either component of `self` is NaN.
    #[inline]
    fn is_nan(self) -> bool {
        self.real().is_nan() || self.imag().is_nan()
    }
}

/// Real element types.
pub trait RealField: ComplexField<Real = Self> + PartialOrd {
    /// Converts `value` from `f64`. The conversion may be lossy.
    fn from_f64(value: f64) -> Self;
    /// Returns the square root of `self`.
    fn sqrt(self) -> Self;
    /// Returns `sqrt(self² + other²)` without undue overflow.
    fn hypot(self, other: Self) -> Self;
    /// Smallest positive normalized value, as LAPACK's `lamch('S')`.
    fn safe_min() -> Self;
    /// Relative machine precision, as LAPACK's `lamch('E')`.
    fn epsilon() -> Self;
}

macro_rules! impl_real {
    ($ty: ty, $prec: expr) => {
        impl ComplexField for $ty {
            type Real = $ty;
            const PRECISION: Precision = $prec;

            #[inline]
            fn conj(self) -> Self {
                self
            }
            #[inline]
            fn real(self) -> Self::Real {
                self
            }
            #[inline]
            fn imag(self) -> Self::Real {
                0.0
            }
            #[inline]
            fn from_real(real: Self::Real) -> Self {
                real
            }
            #[inline]
            fn scale_real(self, rhs: Self::Real) -> Self {
                self * rhs
            }
            #[inline]
            fn abs2(self) -> Self::Real {
                self * self
            }
            #[inline]
            fn abs(self) -> Self::Real {
                <$ty>::abs(self)
            }
            #[inline]
            fn is_nan(self) -> bool {
                <$ty>::is_nan(self)
            }
        }

        impl RealField for $ty {
            #[inline]
            fn from_f64(value: f64) -> Self {
                value as $ty
            }
            #[inline]
            fn sqrt(self) -> Self {
                <$ty>::sqrt(self)
            }
            #[inline]
            fn hypot(self, other: Self) -> Self {
                <$ty>::hypot(self, other)
            }
            #[inline]
            fn safe_min() -> Self {
                <$ty>::MIN_POSITIVE
            }
            #[inline]
            fn epsilon() -> Self {
                <$ty>::EPSILON * 0.5
            }
        }
    };
}

macro_rules! impl_complex {
    ($ty: ty, $real: ty, $prec: expr) => {
        impl ComplexField for $ty {
            type Real = $real;
            const PRECISION: Precision = $prec;

            #[inline]
            fn conj(self) -> Self {
                <$ty>::new(self.re, -self.im)
            }
            #[inline]
            fn real(self) -> Self::Real {
                self.re
            }
            #[inline]
            fn imag(self) -> Self::Real {
                self.im
            }
            #[inline]
            fn from_real(real: Self::Real) -> Self {
                <$ty>::new(real, 0.0)
            }
            #[inline]
            fn scale_real(self, rhs: Self::Real) -> Self {
                <$ty>::new(self.re * rhs, self.im * rhs)
            }
        }
    };
}

impl_real!(f32, Precision::RealFloat);
impl_real!(f64, Precision::RealDouble);
impl_complex!(c32, f32, Precision::ComplexFloat);
impl_complex!(c64, f64, Precision::ComplexDouble);
