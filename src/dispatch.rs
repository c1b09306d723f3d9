use core::num::NonZero;

use crate::kernel::{ITERATION_CYCLES, ITERATION_SHIFT};
use crate::{CycleRepr, NonZeroCycles};

/// Converts a cycle count that is only known at runtime into kernel loop
/// iterations.
///
/// The remainder below one iteration is dropped, so this is less precise
/// than [crate::Plan]. Use a constant count when exact timing matters.
///
/// # Parameters
///
/// - `count`: Requested number of cycles.
/// - `cycles_per_iteration`: Measured cost of one loop pass. With the
///   nominal cost this is a shift; anything else is a division.
///
/// # Returns
///
/// - `Some(iterations)`: if at least one loop pass is needed.
/// - `None`: if the count is below one iteration, in which case the kernel
///   must not be entered at all.
#[inline(always)]
pub fn runtime_iterations(
    count: CycleRepr,
    cycles_per_iteration: u8,
) -> Option<NonZeroCycles> {
    let iterations = if cycles_per_iteration == ITERATION_CYCLES {
        count >> ITERATION_SHIFT
    } else {
        count / cycles_per_iteration.max(1) as CycleRepr
    };
    NonZero::new(iterations)
}
