use std::fmt::Debug;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use half::f16;

/// Scalar element type stored in dense and sparse matrices.
///
/// Kernels only need the ring operations plus an additive identity. The
/// `RESIZABLE` flag marks element types whose values carry a variable-size
/// payload; the loop-unrolled kernels are never selected for those.
pub trait Element:
    Copy
    + Debug
    + PartialEq
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + AddAssign
    + SubAssign
{
    /// Whether values of this type have a runtime-variable size.
    const RESIZABLE: bool = false;

    /// The additive identity.
    fn zero() -> Self;

    /// The multiplicative identity.
    fn one() -> Self;

    /// Returns true if this value equals the additive identity.
    fn is_zero(&self) -> bool {
        *self == Self::zero()
    }
}

macro_rules! impl_element {
    ($($ty:ty => $zero:expr, $one:expr);* $(;)?) => {
        $(
            impl Element for $ty {
                #[inline]
                fn zero() -> Self {
                    $zero
                }

                #[inline]
                fn one() -> Self {
                    $one
                }
            }
        )*
    };
}

impl_element! {
    f32 => 0.0, 1.0;
    f64 => 0.0, 1.0;
    i32 => 0, 1;
    i64 => 0, 1;
    f16 => f16::ZERO, f16::ONE;
}
