use core::num::NonZero;
use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use ufmt_macros::uDebug;

use crate::kernel::ITERATION_CYCLES;
use crate::{CycleCounter, CycleRepr, LoopKernel};

/// Loop lengths used for measuring. Timing two lengths and taking the
/// difference cancels the fixed cost of sampling the counter and entering
/// the loop.
const SHORT_ITERATIONS: CycleRepr = 64;
const LONG_ITERATIONS: CycleRepr = 128;

/// Process-wide calibration of the kernel loop.
///
/// Runtime delays on loop-kernel targets read this. It must be settled once,
/// before the first timed operation, and is never changed afterwards.
pub static LOOP_CALIBRATION: Calibration = Calibration::new();

/// Measured cost of one kernel loop iteration.
///
/// Starts out at the nominal [ITERATION_CYCLES] and can be set exactly once.
pub struct Calibration {
    cycles_per_iteration: AtomicU8,
    calibrated: AtomicBool,
}
impl Calibration {
    /// Creates an uncalibrated `Calibration` holding the nominal cost.
    pub const fn new() -> Self {
        Self {
            cycles_per_iteration: AtomicU8::new(ITERATION_CYCLES),
            calibrated: AtomicBool::new(false),
        }
    }

    /// Cycles per loop iteration.
    #[inline(always)]
    pub fn cycles_per_iteration(&self) -> u8 {
        self.cycles_per_iteration.load(Ordering::Relaxed)
    }

    /// Returns `true` once a value has been recorded.
    pub fn is_calibrated(&self) -> bool {
        self.calibrated.load(Ordering::Acquire)
    }

    /// Records the nominal iteration cost without measuring anything.
    ///
    /// This is all that is needed where the loop runs at its documented speed.
    pub fn assume_nominal(&self) -> Result<u8, Error> {
        self.record(ITERATION_CYCLES)
    }

    /// Measures the iteration cost of `kernel` against `counter` and records
    /// it.
    ///
    /// # Parameters
    ///
    /// - `kernel`: Loop kernel to time.
    /// - `counter`: Free-running counter ticking once per CPU cycle.
    ///
    /// # Returns
    ///
    /// - `Ok(cycles)`: the recorded cycles per iteration.
    /// - `Err(error)`: if already calibrated, or the result does not fit.
    pub fn measure<K, C>(&self, kernel: &mut K, counter: &C) -> Result<u8, Error>
    where
        K: LoopKernel,
        C: CycleCounter,
    {
        if self.is_calibrated() {
            return Err(Error::AlreadyCalibrated);
        }

        let short = time_spin(kernel, counter, SHORT_ITERATIONS);
        let long = time_spin(kernel, counter, LONG_ITERATIONS);

        // Round to the nearest whole cycle.
        let span = (LONG_ITERATIONS - SHORT_ITERATIONS) as u32;
        let per_iteration = (long.wrapping_sub(short) + span / 2) / span;
        match u8::try_from(per_iteration) {
            Ok(0) | Err(_) => Err(Error::Unmeasurable),
            Ok(cycles) => self.record(cycles),
        }
    }

    fn record(&self, cycles_per_iteration: u8) -> Result<u8, Error> {
        if self.is_calibrated() {
            return Err(Error::AlreadyCalibrated);
        }
        self.cycles_per_iteration
            .store(cycles_per_iteration, Ordering::Relaxed);
        self.calibrated.store(true, Ordering::Release);
        Ok(cycles_per_iteration)
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::new()
    }
}

/// Counter ticks taken by one call to the kernel loop.
fn time_spin<K, C>(kernel: &mut K, counter: &C, iterations: CycleRepr) -> u32
where
    K: LoopKernel,
    C: CycleCounter,
{
    let Some(iterations) = NonZero::new(iterations) else {
        return 0;
    };
    let start = counter.now();
    kernel.spin(iterations);
    counter.now().wrapping_sub(start)
}

/// Errors that might occur when calibrating.
#[derive(Debug, uDebug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// A value was already recorded; calibration happens once.
    AlreadyCalibrated,
    /// The measured cost was zero or too large to be a loop iteration.
    Unmeasurable,
}
