use crate::cycles::saturate;
use crate::CycleRepr;

/// CPU core clock frequency, fixed at build time.
///
/// Implemented by zero-sized marker types so that the frequency is a
/// constant everywhere it is used, including in `const` delay plans.
pub trait CpuClock {
    /// Core clock frequency in Hz.
    const HZ: u32;
}

macro_rules! cpu_clocks {
    ($($name:ident = $hz:expr;)*) => {
        $(
            #[doc = concat!("A ", stringify!($hz), " Hz core clock.")]
            #[derive(Debug, Clone, Copy)]
            pub struct $name;
            impl CpuClock for $name {
                const HZ: u32 = $hz;
            }
        )*
    };
}

cpu_clocks! {
    MHz8 = 8_000_000;
    MHz16 = 16_000_000;
    MHz20 = 20_000_000;
    MHz48 = 48_000_000;
    MHz72 = 72_000_000;
    MHz120 = 120_000_000;
    MHz168 = 168_000_000;
    MHz240 = 240_000_000;
}

/// Converts nanoseconds to CPU cycles.
///
/// The conversion goes through whole cycles-per-microsecond and truncates
/// twice: `ns * (hz / 1_000_000) / 1_000`. Requests shorter than one cycle
/// come out as zero and produce no delay. The product is taken in 64 bits so
/// it cannot overflow; only the final narrowing to [CycleRepr] saturates.
///
/// # Parameters
///
/// - `nanoseconds`: Requested delay.
/// - `hz`: Core clock frequency.
pub const fn ns_to_cycles(nanoseconds: u32, hz: u32) -> CycleRepr {
    saturate(nanoseconds as u64 * (hz / 1_000_000) as u64 / 1_000)
}

/// Converts microseconds to CPU cycles, saturating at `u32::MAX`.
///
/// # Parameters
///
/// - `microseconds`: Requested delay.
/// - `hz`: Core clock frequency.
pub const fn us_to_cycles(microseconds: u32, hz: u32) -> u32 {
    microseconds.saturating_mul(hz / 1_000_000)
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_clock_values() {
        assert_eq!(16_000_000, MHz16::HZ);
        assert_eq!(240_000_000, MHz240::HZ);
    }

    #[test]
    fn test_ns_to_cycles() {
        // 62.5 ns per cycle at 16 MHz.
        assert_eq!(0, ns_to_cycles(62, MHz16::HZ));
        assert_eq!(1, ns_to_cycles(63, MHz16::HZ));
        assert_eq!(16, ns_to_cycles(1_000, MHz16::HZ));
        assert_eq!(72, ns_to_cycles(1_000, MHz72::HZ));
    }

    #[test]
    fn test_ns_truncates_per_microsecond() {
        // A 12.5 MHz clock is 12 whole cycles per microsecond, not 12.5.
        assert_eq!(12, ns_to_cycles(1_000, 12_500_000));
        assert_eq!(0, ns_to_cycles(1_000, 999_999));
    }

    #[test]
    fn test_ns_product_does_not_overflow() {
        // 18 ms at 240 MHz: `ns * 240` is past `u32::MAX`, the result is not.
        assert_eq!(4_320_000, ns_to_cycles(18_000_000, MHz240::HZ));
        assert_eq!(1_030_792_150, ns_to_cycles(u32::MAX, MHz240::HZ));
    }

    #[test]
    fn test_ns_saturates() {
        // 4294 cycles per microsecond for ~4.3 s is past `u32::MAX` cycles.
        assert_eq!(CycleRepr::MAX, ns_to_cycles(u32::MAX, u32::MAX));
    }

    #[test]
    fn test_us_to_cycles() {
        assert_eq!(0, us_to_cycles(0, MHz16::HZ));
        assert_eq!(160, us_to_cycles(10, MHz16::HZ));
        assert_eq!(u32::MAX, us_to_cycles(u32::MAX, MHz16::HZ));
    }

    proptest! {
        #[test]
        fn test_ns_monotonic(a: u32, b: u32, mhz in 1..=4_294u32) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let hz = mhz * 1_000_000;
            assert!(ns_to_cycles(lo, hz) <= ns_to_cycles(hi, hz));
        }
    }

    proptest! {
        #[test]
        fn test_ns_never_rounds_up(ns in 0..10_000_000u32, mhz in 1..=240u32) {
            // Never more cycles than the exact conversion.
            let exact = ns as u64 * mhz as u64 / 1_000;
            assert!(ns_to_cycles(ns, mhz * 1_000_000) as u64 <= exact);
        }
    }
}
