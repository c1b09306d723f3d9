use core::arch::asm;

use crate::{
    CpuClock, Delay, LoopDelay, LoopKernel, NonZeroCycles, PlatformDelayUs,
    LOOP_CALIBRATION,
};

/// ARM / Thumb loop kernel.
///
/// `subs` and `nop` are one cycle each and a taken `bne` is two, giving four
/// cycles per pass. The register setup before the loop is the extra cycle.
pub struct ArmKernel;

impl LoopKernel for ArmKernel {
    #[inline(always)]
    fn nop(&mut self) {
        unsafe { asm!("nop", options(nomem, nostack, preserves_flags)) }
    }

    #[inline(always)]
    fn spin(&mut self, iterations: NonZeroCycles) {
        unsafe {
            asm!(
                "1:",
                "subs {cnt}, #1",
                "nop",
                "bne 1b",
                cnt = inout(reg) iterations.get() => _,
                options(nomem, nostack),
            )
        }
    }
}

/// Native backend for ARM targets.
pub type Native<P> = LoopDelay<ArmKernel, P>;

/// Creates the native delay for this target.
///
/// # Type Parameters
///
/// - `Clk`: core clock
/// - `P`: platform microsecond delay
pub fn delay<Clk: CpuClock, P: PlatformDelayUs>() -> Delay<Clk, Native<P>> {
    Delay::new(LoopDelay::new(ArmKernel))
}

/// Settles the loop calibration at its nominal value.
///
/// Call once before the first timed operation. Later calls have no effect.
/// With the `dwt` feature, [calibrate_delay_loop_with] measures the loop
/// instead.
pub fn calibrate_delay_loop() {
    let _ = LOOP_CALIBRATION.assume_nominal();
}

#[cfg(feature = "dwt")]
pub use dwt::{calibrate_delay_loop_with, DwtCounter};

#[cfg(feature = "dwt")]
mod dwt {
    use cortex_m::peripheral::{DCB, DWT};

    use super::ArmKernel;
    use crate::{calibration, CycleCounter, LOOP_CALIBRATION};

    /// The DWT cycle counter of ARMv7-M and later cores.
    pub struct DwtCounter {
        _private: (),
    }
    impl DwtCounter {
        /// Enables tracing and the cycle counter.
        ///
        /// # Parameters
        ///
        /// - `dcb`: Debug control block.
        /// - `dwt`: Data watchpoint and trace unit.
        pub fn enable(dcb: &mut DCB, dwt: &mut DWT) -> Self {
            dcb.enable_trace();
            dwt.enable_cycle_counter();
            Self { _private: () }
        }
    }

    impl CycleCounter for DwtCounter {
        #[inline(always)]
        fn now(&self) -> u32 {
            DWT::cycle_count()
        }
    }

    /// Measures the kernel loop against the DWT counter.
    ///
    /// Flash wait states can stretch a loop pass beyond four cycles; the
    /// measured value is what runtime delays divide by from then on.
    pub fn calibrate_delay_loop_with(
        counter: &DwtCounter,
    ) -> Result<u8, calibration::Error> {
        LOOP_CALIBRATION.measure(&mut ArmKernel, counter)
    }
}
