#![cfg_attr(not(any(test, feature = "host")), no_std)]
#![cfg_attr(
    any(target_arch = "avr", target_arch = "xtensa"),
    feature(asm_experimental_arch)
)]

//! Cycle-accurate busy-wait delays.
//!
//! A delay is requested in cycles, nanoseconds or microseconds and consumed
//! by spinning on the instruction stream itself. Cycle counts known at
//! compile time are split into inline no-ops plus one call into a
//! four-cycle loop; runtime counts are shifted down to loop iterations.

pub mod arch;
pub mod calibration;
mod clock;
mod counter;
mod cycles;
mod delay;
mod dispatch;
pub mod kernel;
mod plan;
#[cfg(any(test, feature = "host"))]
pub mod sim;

pub use calibration::{Calibration, LOOP_CALIBRATION};
pub use clock::{
    ns_to_cycles, us_to_cycles, CpuClock, MHz120, MHz16, MHz168, MHz20, MHz240,
    MHz48, MHz72, MHz8,
};
pub use counter::{spin_cycles, CounterDelay, CycleCounter};
pub use cycles::{CycleRepr, Cycles, NonZeroCycles};
pub use delay::{CycleDelay, Delay, LoopDelay, PlatformDelayUs};
pub use dispatch::runtime_iterations;
pub use kernel::LoopKernel;
pub use plan::Plan;
