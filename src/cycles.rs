use core::num::NonZero;

use ufmt::{uDisplay, uWrite, Formatter};
use ufmt_macros::uDebug;

/// Underlying type representing a number of CPU cycles.
///
/// This matches the natural register width of the target: 16 bits on the
/// 8-bit AVR cores, 32 bits everywhere else.
#[cfg(target_arch = "avr")]
pub type CycleRepr = u16;

/// Underlying type representing a number of CPU cycles.
///
/// This matches the natural register width of the target: 16 bits on the
/// 8-bit AVR cores, 32 bits everywhere else.
#[cfg(not(target_arch = "avr"))]
pub type CycleRepr = u32;

/// Number of loop iterations that can never be zero.
///
/// Decrement-and-branch loops test after decrementing, so a zero count would
/// wrap around and spin for a whole register's worth of iterations. Kernels
/// only accept this type.
pub type NonZeroCycles = NonZero<CycleRepr>;

/// Number of CPU cycles.
#[derive(Debug, uDebug, PartialEq, PartialOrd, Eq, Ord, Copy, Clone)]
pub struct Cycles(CycleRepr);
impl Cycles {
    /// Creates a new `Cycles`.
    pub const fn new(value: CycleRepr) -> Self {
        Self(value)
    }

    /// Zero cycles.
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Returns the value as a `CycleRepr`.
    pub const fn get_value(&self) -> CycleRepr {
        self.0
    }

    /// Returns `true` if this is a zero-length delay.
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl uDisplay for Cycles {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        uDisplay::fmt(&self.0, f)?;
        f.write_str(" cy")
    }
}

/// Narrows a 64-bit count to `CycleRepr`, clamping instead of truncating.
pub(crate) const fn saturate(value: u64) -> CycleRepr {
    if value > CycleRepr::MAX as u64 {
        CycleRepr::MAX
    } else {
        value as CycleRepr
    }
}
