use core::marker::PhantomData;

use crate::calibration::{Calibration, LOOP_CALIBRATION};
use crate::clock::ns_to_cycles;
use crate::dispatch::runtime_iterations;
use crate::{CpuClock, CycleRepr, Cycles, LoopKernel, Plan};

/// Platform-supplied microsecond delay.
///
/// Loop-kernel targets have no reliable way of counting long stretches of
/// cycles, so microsecond delays are handed to whatever the board support
/// crate provides.
pub trait PlatformDelayUs {
    /// Blocks for the specified number of microseconds before returning.
    ///
    /// # Parameters
    ///
    /// - `microseconds`: Number of microseconds to delay.
    fn delay_us(microseconds: u32);
}

/// Busy-wait backend for one kind of target.
///
/// Implemented by [LoopDelay] for targets that count cycles with a
/// decrement-and-branch loop, and by [crate::CounterDelay] for targets with a
/// free-running cycle counter.
pub trait CycleDelay {
    /// Runs a delay whose decomposition was worked out at compile time.
    fn delay_planned(&mut self, plan: Plan);

    /// Delays for a cycle count only known at runtime.
    fn delay_cycles(&mut self, cycles: CycleRepr);

    /// Delays for a number of microseconds.
    fn delay_us<Clk: CpuClock>(&mut self, microseconds: u32);
}

/// Delay backend built on a [LoopKernel].
///
/// # Type Parameters
///
/// - `K`: loop kernel
/// - `P`: platform microsecond delay
pub struct LoopDelay<K, P> {
    kernel: K,
    calibration: &'static Calibration,
    _platform: PhantomData<P>,
}
impl<K: LoopKernel, P: PlatformDelayUs> LoopDelay<K, P> {
    /// Creates a new `LoopDelay` that reads [LOOP_CALIBRATION].
    ///
    /// # Parameters
    ///
    /// - `kernel`: Loop kernel for the target.
    pub fn new(kernel: K) -> Self {
        Self::with_calibration(kernel, &LOOP_CALIBRATION)
    }

    /// Creates a new `LoopDelay` that reads a specific calibration.
    ///
    /// # Parameters
    ///
    /// - `kernel`: Loop kernel for the target.
    /// - `calibration`: Calibration used for runtime delays.
    pub const fn with_calibration(
        kernel: K,
        calibration: &'static Calibration,
    ) -> Self {
        Self {
            kernel,
            calibration,
            _platform: PhantomData,
        }
    }

    /// Returns the loop kernel.
    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// Cycles the loop will actually spend on a runtime request, not
    /// counting the entry cost.
    ///
    /// Returns `None` when the request is shorter than one loop iteration
    /// and would be dropped.
    ///
    /// # Parameters
    ///
    /// - `cycles`: Requested runtime delay.
    pub fn effective_cycles(&self, cycles: CycleRepr) -> Option<Cycles> {
        let per_iteration = self.calibration.cycles_per_iteration();
        runtime_iterations(cycles, per_iteration).map(|iterations| {
            Cycles::new(iterations.get() * per_iteration as CycleRepr)
        })
    }
}

impl<K: LoopKernel, P: PlatformDelayUs> CycleDelay for LoopDelay<K, P> {
    #[inline(always)]
    fn delay_planned(&mut self, plan: Plan) {
        plan.execute(&mut self.kernel);
    }

    #[inline(always)]
    fn delay_cycles(&mut self, cycles: CycleRepr) {
        let per_iteration = self.calibration.cycles_per_iteration();
        if let Some(iterations) = runtime_iterations(cycles, per_iteration) {
            self.kernel.spin(iterations);
        }
    }

    fn delay_us<Clk: CpuClock>(&mut self, microseconds: u32) {
        if microseconds != 0 {
            P::delay_us(microseconds);
        }
    }
}

/// Busy-wait delay for a CPU running at `Clk`.
///
/// Every delay is a lower bound: fixed call overhead and truncation only
/// ever make it longer, except that cycle and nanosecond requests saturate
/// at [CycleRepr::MAX] cycles.
///
/// # Type Parameters
///
/// - `Clk`: core clock
/// - `B`: backend for the target
pub struct Delay<Clk, B> {
    backend: B,
    _clock: PhantomData<Clk>,
}
impl<Clk: CpuClock, B: CycleDelay> Delay<Clk, B> {
    /// Creates a new `Delay`.
    ///
    /// # Parameters
    ///
    /// - `backend`: Busy-wait backend for the target.
    pub const fn new(backend: B) -> Self {
        Self {
            backend,
            _clock: PhantomData,
        }
    }

    /// Returns the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Delays for a runtime number of cycles.
    ///
    /// Precision is one loop iteration; the remainder is dropped. Zero is a
    /// no-op.
    #[inline(always)]
    pub fn delay_cycles(&mut self, cycles: CycleRepr) {
        self.backend.delay_cycles(cycles);
    }

    /// Delays for exactly `N` cycles, planned at compile time.
    #[inline(always)]
    pub fn delay_cycles_const<const N: CycleRepr>(&mut self) {
        self.backend.delay_planned(const { Plan::new(N) });
    }

    /// Delays for a runtime number of nanoseconds.
    ///
    /// Converted with [ns_to_cycles], so requests under one cycle are no-ops.
    #[inline(always)]
    pub fn delay_ns(&mut self, nanoseconds: u32) {
        self.backend.delay_cycles(ns_to_cycles(nanoseconds, Clk::HZ));
    }

    /// Delays for `NS` nanoseconds, converted and planned at compile time.
    #[inline(always)]
    pub fn delay_ns_const<const NS: u32>(&mut self) {
        self.backend
            .delay_planned(const { Plan::new(ns_to_cycles(NS, Clk::HZ)) });
    }

    /// Delays for a number of microseconds.
    pub fn delay_us(&mut self, microseconds: u32) {
        self.backend.delay_us::<Clk>(microseconds);
    }
}

/// Lets the delay drive any `embedded-hal` driver.
///
/// Long nanosecond requests are split into whole microseconds plus a
/// sub-microsecond remainder so that they never saturate to a shorter wait.
impl<Clk: CpuClock, B: CycleDelay> embedded_hal::delay::DelayNs
    for Delay<Clk, B>
{
    fn delay_ns(&mut self, ns: u32) {
        let microseconds = ns / 1_000;
        if microseconds != 0 {
            self.backend.delay_us::<Clk>(microseconds);
        }
        Delay::delay_ns(self, ns % 1_000);
    }

    fn delay_us(&mut self, us: u32) {
        Delay::delay_us(self, us);
    }
}

/// Delays for a number of cycles.
///
/// An integer literal takes the exact, compile-time planned path; any other
/// expression takes the runtime path.
///
/// ```ignore
/// busywait::delay_cycles!(delay, 10); // one nop and two loop passes
/// busywait::delay_cycles!(delay, width); // width >> 2 loop passes
/// ```
#[macro_export]
macro_rules! delay_cycles {
    ($delay:expr, $cycles:literal) => {
        $delay.delay_cycles_const::<$cycles>()
    };
    ($delay:expr, $cycles:expr) => {
        $delay.delay_cycles($cycles)
    };
}

/// Delays for a number of nanoseconds.
///
/// Like [delay_cycles!], a literal is converted and planned at compile time.
#[macro_export]
macro_rules! delay_ns {
    ($delay:expr, $nanoseconds:literal) => {
        $delay.delay_ns_const::<$nanoseconds>()
    };
    ($delay:expr, $nanoseconds:expr) => {
        $delay.delay_ns($nanoseconds)
    };
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::clock::{MHz16, MHz240, MHz72};
    use crate::sim::{SimClock, SimCounter, SimKernel};
    use crate::CounterDelay;
    use embedded_hal::delay::DelayNs;
    use std::cell::Cell;

    std::thread_local! {
        static PLATFORM_US: Cell<u32> = const { Cell::new(0) };
    }

    /// Platform delay that only records what it was asked for.
    struct TestDelayUs;
    impl PlatformDelayUs for TestDelayUs {
        fn delay_us(microseconds: u32) {
            PLATFORM_US.with(|us| us.set(us.get() + microseconds));
        }
    }

    fn platform_us() -> u32 {
        PLATFORM_US.with(|us| us.get())
    }

    fn leak_calibration() -> &'static Calibration {
        std::boxed::Box::leak(std::boxed::Box::new(Calibration::new()))
    }

    fn loop_delay<Clk: CpuClock>(
        clock: &SimClock,
    ) -> Delay<Clk, LoopDelay<SimKernel, TestDelayUs>> {
        let kernel = SimKernel::new(clock.clone());
        Delay::new(LoopDelay::with_calibration(kernel, leak_calibration()))
    }

    #[test]
    fn test_const_one_cycle() {
        let clock = SimClock::new();
        let mut delay = loop_delay::<MHz16>(&clock);
        delay.delay_cycles_const::<1>();
        let kernel = delay.backend().kernel();
        assert_eq!(1, kernel.nop_count());
        assert!(kernel.spins().is_empty());
        assert_eq!(1, clock.now());
    }

    #[test]
    fn test_const_ten_cycles() {
        let clock = SimClock::new();
        let mut delay = loop_delay::<MHz16>(&clock);
        delay.delay_cycles_const::<10>();
        let kernel = delay.backend().kernel();
        assert_eq!(1, kernel.nop_count());
        assert_eq!(&[2], kernel.spin_iterations().as_slice());
        assert_eq!(10, clock.now());
    }

    #[test]
    fn test_macro_picks_path() {
        let clock = SimClock::new();
        let mut delay = loop_delay::<MHz16>(&clock);

        // Literal: exact.
        delay_cycles!(delay, 10);
        assert_eq!(10, clock.now());

        // Expression: shifted, remainder dropped.
        let width: CycleRepr = 10;
        delay_cycles!(delay, width);
        assert_eq!(10 + 2 * 4 + 1, clock.now());
        assert_eq!(1, delay.backend().kernel().nop_count());
    }

    #[test]
    fn test_zero_everywhere_is_noop() {
        let clock = SimClock::new();
        let mut delay = loop_delay::<MHz16>(&clock);
        let before = platform_us();
        delay.delay_cycles(0);
        delay.delay_cycles_const::<0>();
        delay.delay_ns(0);
        delay.delay_ns_const::<0>();
        delay.delay_us(0);
        delay_cycles!(delay, 0);
        assert_eq!(0, clock.now());
        assert!(delay.backend().kernel().spins().is_empty());
        assert_eq!(before, platform_us());
    }

    #[test]
    fn test_runtime_below_granularity_is_noop() {
        let clock = SimClock::new();
        let mut delay = loop_delay::<MHz16>(&clock);
        for cycles in 1..4 {
            delay.delay_cycles(cycles);
        }
        assert_eq!(0, clock.now());
    }

    #[test]
    fn test_ns_const() {
        let clock = SimClock::new();
        let mut delay = loop_delay::<MHz72>(&clock);
        // 500 ns at 72 MHz is 36 cycles.
        delay_ns!(delay, 500);
        assert_eq!(36, clock.now());
    }

    #[test]
    fn test_ns_runtime() {
        let clock = SimClock::new();
        let mut delay = loop_delay::<MHz72>(&clock);
        delay.delay_ns(500);
        // 36 >> 2 loop passes plus entry.
        assert_eq!(9 * 4 + 1, clock.now());
    }

    #[test]
    fn test_ns_below_one_cycle() {
        let clock = SimClock::new();
        let mut delay = loop_delay::<MHz16>(&clock);
        delay_ns!(delay, 50);
        delay.delay_ns(50);
        assert_eq!(0, clock.now());
    }

    #[test]
    fn test_us_goes_to_platform() {
        let clock = SimClock::new();
        let mut delay = loop_delay::<MHz16>(&clock);
        let before = platform_us();
        delay.delay_us(25);
        assert_eq!(before + 25, platform_us());
        assert_eq!(0, clock.now());
    }

    #[test]
    fn test_runtime_uses_calibration() {
        let clock = SimClock::new();
        let calibration = leak_calibration();
        let mut kernel = SimKernel::with_cycles_per_iteration(clock.clone(), 6);
        let counter = SimCounter::new(clock.clone());
        assert_eq!(Ok(6), calibration.measure(&mut kernel, &counter));

        let mut delay: Delay<MHz16, LoopDelay<_, TestDelayUs>> =
            Delay::new(LoopDelay::with_calibration(kernel, calibration));
        let start = clock.now();
        delay.delay_cycles(600);
        assert_eq!(100 * 6 + 1, clock.now() - start);
    }

    #[test]
    fn test_long_ns_is_not_shortened() {
        let clock = SimClock::new();
        let mut delay = loop_delay::<MHz240>(&clock);
        // 18 ms at 240 MHz needs more than 32 bits before the divide by 1000.
        delay.delay_ns(18_000_000);
        assert_eq!(4_320_000 + 1, clock.now());

        let start = clock.now();
        delay.delay_ns(20_000_000);
        assert!(clock.now() - start >= 4_800_000);
    }

    #[test]
    fn test_effective_cycles() {
        let clock = SimClock::new();
        let delay = loop_delay::<MHz16>(&clock);
        let backend = delay.backend();
        for cycles in 0..4 {
            assert_eq!(None, backend.effective_cycles(cycles));
        }
        assert_eq!(Some(Cycles::new(4)), backend.effective_cycles(4));
        assert_eq!(Some(Cycles::new(8)), backend.effective_cycles(10));
    }

    #[test]
    fn test_effective_cycles_uses_calibration() {
        let clock = SimClock::new();
        let calibration = leak_calibration();
        let mut kernel = SimKernel::with_cycles_per_iteration(clock.clone(), 6);
        let counter = SimCounter::new(clock.clone());
        assert_eq!(Ok(6), calibration.measure(&mut kernel, &counter));

        let backend: LoopDelay<_, TestDelayUs> =
            LoopDelay::with_calibration(kernel, calibration);
        assert_eq!(None, backend.effective_cycles(5));
        assert_eq!(Some(Cycles::new(12)), backend.effective_cycles(17));
    }

    #[test]
    fn test_embedded_hal_splits_long_ns() {
        let clock = SimClock::new();
        let mut delay = loop_delay::<MHz16>(&clock);
        let before = platform_us();
        DelayNs::delay_ns(&mut delay, 3_500);
        assert_eq!(before + 3, platform_us());
        // 500 ns at 16 MHz is 8 cycles: two loop passes plus entry.
        assert_eq!(9, clock.now());
    }

    #[test]
    fn test_embedded_hal_on_counter() {
        let clock = SimClock::new();
        let mut delay: Delay<MHz72, _> =
            Delay::new(CounterDelay::new(SimCounter::new(clock.clone())));
        DelayNs::delay_us(&mut delay, 2);
        assert!(clock.now() >= 144);
        DelayNs::delay_ms(&mut delay, 1);
        assert!(clock.now() >= 144 + 72_000);
    }
}
