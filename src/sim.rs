//! Software stand-ins for the architecture kernels.
//!
//! Nothing here busy-waits. The simulated kernel and counter share a
//! notional cycle clock, so delays can be checked to the cycle on a host
//! machine.

use std::cell::Cell;
use std::rc::Rc;
use std::vec::Vec;

use crate::kernel::{ENTRY_CYCLES, ITERATION_CYCLES};
use crate::{CycleCounter, CycleRepr, LoopKernel, NonZeroCycles};

/// Notional cycle clock.
///
/// If the `SimClock` is cloned then the underlying count is shared. This is
/// how a [SimKernel] and a [SimCounter] see the same passage of time.
#[derive(Clone, Default)]
pub struct SimClock {
    cycles: Rc<Cell<u64>>,
}
impl SimClock {
    /// Creates a new clock at cycle zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of cycles elapsed so far.
    pub fn now(&self) -> u64 {
        self.cycles.get()
    }

    /// Advances the clock.
    pub fn advance(&self, cycles: u64) {
        self.cycles.set(self.cycles.get() + cycles);
    }
}

/// Loop kernel that only counts cycles.
pub struct SimKernel {
    clock: SimClock,
    cycles_per_iteration: u64,
    nops: usize,
    spins: Vec<NonZeroCycles>,
}
impl SimKernel {
    /// Creates a kernel with the nominal iteration cost.
    pub fn new(clock: SimClock) -> Self {
        Self::with_cycles_per_iteration(clock, ITERATION_CYCLES)
    }

    /// Creates a kernel whose loop is slower (or faster) than nominal, as on
    /// parts with flash wait states.
    pub fn with_cycles_per_iteration(
        clock: SimClock,
        cycles_per_iteration: u8,
    ) -> Self {
        Self {
            clock,
            cycles_per_iteration: cycles_per_iteration as u64,
            nops: 0,
            spins: Vec::new(),
        }
    }

    /// Returns the clock this kernel advances.
    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Number of no-ops executed.
    pub fn nop_count(&self) -> usize {
        self.nops
    }

    /// Every iteration count the loop was entered with, in order.
    pub fn spins(&self) -> &[NonZeroCycles] {
        &self.spins
    }

    /// Like [SimKernel::spins], as plain integers.
    pub fn spin_iterations(&self) -> Vec<CycleRepr> {
        self.spins.iter().map(|i| i.get()).collect()
    }
}
impl LoopKernel for SimKernel {
    fn nop(&mut self) {
        self.nops += 1;
        self.clock.advance(1);
    }

    fn spin(&mut self, iterations: NonZeroCycles) {
        self.spins.push(iterations);
        self.clock.advance(
            iterations.get() as u64 * self.cycles_per_iteration
                + ENTRY_CYCLES as u64,
        );
    }
}

/// Free-running 32-bit counter driven by a [SimClock].
///
/// Every read costs `read_cycles` cycles, which is what lets a spin loop on
/// this counter make progress.
#[derive(Clone)]
pub struct SimCounter {
    clock: SimClock,
    offset: u32,
    read_cycles: u64,
}
impl SimCounter {
    /// Creates a counter that reads the same as the clock.
    pub fn new(clock: SimClock) -> Self {
        Self {
            clock,
            offset: 0,
            read_cycles: 1,
        }
    }

    /// Starts the counter at `offset` instead of zero, for example just
    /// below `u32::MAX` to force a wraparound.
    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Sets the cost of a single read.
    pub fn with_read_cycles(mut self, read_cycles: u64) -> Self {
        self.read_cycles = read_cycles;
        self
    }
}
impl CycleCounter for SimCounter {
    fn now(&self) -> u32 {
        let value = (self.clock.now() as u32).wrapping_add(self.offset);
        self.clock.advance(self.read_cycles);
        value
    }
}
