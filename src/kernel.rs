use crate::NonZeroCycles;

/// Cycles consumed by one pass of a kernel loop.
pub const ITERATION_CYCLES: u8 = 4;

/// `log2(ITERATION_CYCLES)`, so that dividing by the iteration cost is a
/// shift.
pub const ITERATION_SHIFT: u32 = 2;

/// Extra cycles charged once per call to [LoopKernel::spin].
///
/// On ARM this is the setup of the counter register. On AVR the 16-bit
/// immediate load costs two cycles and the final, untaken `brne` saves one.
pub const ENTRY_CYCLES: u8 = 1;

/// Delays at or below this many cycles are emitted as bare no-ops.
pub const NOP_THRESHOLD: u8 = 4;

const _: () = assert!(1 << ITERATION_SHIFT == ITERATION_CYCLES as u32);
const _: () = assert!(NOP_THRESHOLD == ITERATION_CYCLES);

/// Architecture cycle-delay kernel.
///
/// This is the only place that knows about real instructions. Everything
/// above it (constant-count planning, runtime dispatch, unit conversion)
/// only talks to this trait, which lets those layers be exercised against
/// a simulated kernel.
///
/// # Timing contract
///
/// - [LoopKernel::nop] costs exactly one cycle.
/// - [LoopKernel::spin] costs exactly
///   `ITERATION_CYCLES * iterations + ENTRY_CYCLES` cycles, independent
///   of the value of `iterations`.
pub trait LoopKernel {
    /// Executes a single one-cycle no-op.
    fn nop(&mut self);

    /// Runs the decrement-and-branch loop.
    ///
    /// # Parameters
    ///
    /// - `iterations`: Number of passes through the loop.
    fn spin(&mut self, iterations: NonZeroCycles);
}
