use core::num::NonZero;

use ufmt_macros::uDebug;

use crate::kernel::{ENTRY_CYCLES, ITERATION_CYCLES, NOP_THRESHOLD};
use crate::{CycleRepr, LoopKernel};

/// Decomposition of a fixed cycle count into no-ops and loop iterations.
///
/// A `Plan` is meant to be built in a `const` context, so that
/// [Plan::execute] folds down to the bare instruction sequence: zero to four
/// `nop`s, and at most one call into the loop kernel.
#[derive(Debug, uDebug, PartialEq, Eq, Copy, Clone)]
pub struct Plan {
    nops: u8,
    iterations: CycleRepr,
}
impl Plan {
    /// Plans a delay of `count` cycles.
    ///
    /// Counts up to [NOP_THRESHOLD] become that many no-ops. Above it, one
    /// cycle is set aside for the kernel's entry cost, and the rest is split
    /// into `(count - 1) / 4` loop iterations and `(count - 1) % 4` no-ops.
    pub const fn new(count: CycleRepr) -> Self {
        if count <= NOP_THRESHOLD as CycleRepr {
            Self {
                nops: count as u8,
                iterations: 0,
            }
        } else {
            let budget = count - ENTRY_CYCLES as CycleRepr;
            Self {
                nops: (budget % ITERATION_CYCLES as CycleRepr) as u8,
                iterations: budget / ITERATION_CYCLES as CycleRepr,
            }
        }
    }

    /// A plan that does nothing.
    pub const fn empty() -> Self {
        Self::new(0)
    }

    /// Number of inline no-ops.
    pub const fn nops(&self) -> u8 {
        self.nops
    }

    /// Number of kernel loop iterations.
    pub const fn iterations(&self) -> CycleRepr {
        self.iterations
    }

    /// Total cycles this plan consumes, kernel entry cost included.
    pub const fn cycles(&self) -> CycleRepr {
        let mut total = self.nops as CycleRepr;
        if self.iterations != 0 {
            total += self.iterations * ITERATION_CYCLES as CycleRepr
                + ENTRY_CYCLES as CycleRepr;
        }
        total
    }

    /// Runs the plan on a kernel.
    #[inline(always)]
    pub fn execute<K: LoopKernel>(self, kernel: &mut K) {
        match self.nops {
            4 => {
                kernel.nop();
                kernel.nop();
                kernel.nop();
                kernel.nop();
            }
            3 => {
                kernel.nop();
                kernel.nop();
                kernel.nop();
            }
            2 => {
                kernel.nop();
                kernel.nop();
            }
            1 => kernel.nop(),
            _ => {}
        }
        if let Some(iterations) = NonZero::new(self.iterations) {
            kernel.spin(iterations);
        }
    }
}
