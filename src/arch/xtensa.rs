use core::arch::asm;

use crate::{CounterDelay, CpuClock, CycleCounter, Delay};

/// The Xtensa `CCOUNT` special register.
pub struct Ccount;

impl CycleCounter for Ccount {
    #[inline(always)]
    fn now(&self) -> u32 {
        let ccount: u32;
        unsafe {
            asm!(
                "rsr {0}, ccount",
                out(reg) ccount,
                options(nomem, nostack, preserves_flags),
            )
        }
        ccount
    }
}

/// Native backend for Xtensa targets.
pub type Native = CounterDelay<Ccount>;

/// Creates the native delay for this target.
///
/// # Type Parameters
///
/// - `Clk`: core clock
pub fn delay<Clk: CpuClock>() -> Delay<Clk, Native> {
    Delay::new(CounterDelay::new(Ccount))
}

/// Does nothing: `CCOUNT` needs no calibration.
pub fn calibrate_delay_loop() {}
