use core::arch::asm;

use crate::{
    CpuClock, Delay, LoopDelay, LoopKernel, NonZeroCycles, PlatformDelayUs,
    LOOP_CALIBRATION,
};

/// AVR loop kernel.
///
/// `sbiw` on a register pair is two cycles and a taken `brne` is two. The
/// last pass falls through in one cycle less, and loading the 16-bit count
/// takes two `ldi`s, which nets out to the one entry cycle.
pub struct AvrKernel;

impl LoopKernel for AvrKernel {
    #[inline(always)]
    fn nop(&mut self) {
        unsafe { asm!("nop", options(nomem, nostack, preserves_flags)) }
    }

    #[inline(always)]
    fn spin(&mut self, iterations: NonZeroCycles) {
        unsafe {
            asm!(
                "1:",
                "sbiw {cnt}, 1",
                "brne 1b",
                cnt = inout(reg_iw) iterations.get() => _,
                options(nomem, nostack),
            )
        }
    }
}

/// Native backend for AVR targets.
pub type Native<P> = LoopDelay<AvrKernel, P>;

/// Creates the native delay for this target.
///
/// # Type Parameters
///
/// - `Clk`: core clock
/// - `P`: platform microsecond delay
pub fn delay<Clk: CpuClock, P: PlatformDelayUs>() -> Delay<Clk, Native<P>> {
    Delay::new(LoopDelay::new(AvrKernel))
}

/// Settles the loop calibration at its nominal value.
///
/// AVR cores execute from flash without wait states, so there is nothing to
/// measure. Later calls have no effect.
pub fn calibrate_delay_loop() {
    let _ = LOOP_CALIBRATION.assume_nominal();
}
