use crate::clock::us_to_cycles;
use crate::{CpuClock, CycleDelay, CycleRepr, Plan};

/// Free-running hardware cycle counter.
///
/// The counter counts up by one per CPU cycle and wraps at `u32::MAX`.
pub trait CycleCounter {
    /// Returns the current counter value.
    fn now(&self) -> u32;
}

/// Spins on a counter until `cycles` have elapsed.
///
/// Elapsed time is measured with a wrapping subtraction, so a delay that
/// straddles the counter wrapping past zero still waits its full length.
/// Delays must be shorter than one counter period.
///
/// # Parameters
///
/// - `counter`: Counter to sample.
/// - `cycles`: Number of counter ticks to wait.
#[inline(always)]
pub fn spin_cycles<C: CycleCounter>(counter: &C, cycles: u32) {
    let start = counter.now();
    while counter.now().wrapping_sub(start) < cycles {}
}

/// Delay backend for targets with a free-running cycle counter.
///
/// The counter is the timing source for every kind of request, so there is
/// nothing to plan and no loop to calibrate.
pub struct CounterDelay<C> {
    counter: C,
}
impl<C: CycleCounter> CounterDelay<C> {
    /// Creates a new `CounterDelay`.
    ///
    /// # Parameters
    ///
    /// - `counter`: Counter to spin on.
    pub const fn new(counter: C) -> Self {
        Self { counter }
    }
}

impl<C: CycleCounter> CycleDelay for CounterDelay<C> {
    #[inline(always)]
    fn delay_planned(&mut self, plan: Plan) {
        self.delay_cycles(plan.cycles());
    }

    #[inline(always)]
    fn delay_cycles(&mut self, cycles: CycleRepr) {
        if cycles != 0 {
            spin_cycles(&self.counter, cycles as u32);
        }
    }

    fn delay_us<Clk: CpuClock>(&mut self, microseconds: u32) {
        let cycles = us_to_cycles(microseconds, Clk::HZ);
        if cycles != 0 {
            spin_cycles(&self.counter, cycles);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::clock::MHz240;
    use crate::sim::{SimClock, SimCounter};
    use proptest::prelude::*;

    #[test]
    fn test_zero_does_not_read_counter() {
        let clock = SimClock::new();
        let mut delay = CounterDelay::new(SimCounter::new(clock.clone()));
        delay.delay_cycles(0);
        delay.delay_us::<MHz240>(0);
        assert_eq!(0, clock.now());
    }

    #[test]
    fn test_planned_uses_full_count() {
        let clock = SimClock::new();
        let mut delay = CounterDelay::new(SimCounter::new(clock.clone()));
        delay.delay_planned(Plan::new(10));
        assert!(clock.now() >= 10);
    }

    #[test]
    fn test_delay_us() {
        let clock = SimClock::new();
        let mut delay = CounterDelay::new(SimCounter::new(clock.clone()));
        delay.delay_us::<MHz240>(3);
        assert!(clock.now() >= 720);
        assert!(clock.now() <= 720 + 2);
    }

    #[test]
    fn test_crosses_zero() {
        let clock = SimClock::new();
        let counter = SimCounter::new(clock.clone()).with_offset(u32::MAX - 5);
        spin_cycles(&counter, 100);
        assert!(clock.now() >= 100);
    }

    proptest! {
        #[test]
        fn test_returns_once_target_reached(
            offset in 0..(u32::MAX / 2),
            cycles in 1..10_000u32,
            read_cycles in 1..8u64,
        ) {
            let clock = SimClock::new();
            let counter = SimCounter::new(clock.clone())
                .with_offset(offset)
                .with_read_cycles(read_cycles);
            // The start sample is taken at the current clock value.
            let target = offset as u64 + cycles as u64;
            spin_cycles(&counter, cycles);
            let last_read = offset as u64 + clock.now() - read_cycles;
            assert!(last_read >= target);
            assert!(last_read < target + read_cycles);
        }
    }

    proptest! {
        #[test]
        fn test_wraparound_is_never_short(
            below_max in 0..1_000u32,
            cycles in 1..10_000u32,
        ) {
            let clock = SimClock::new();
            let counter = SimCounter::new(clock.clone())
                .with_offset(u32::MAX - below_max);
            spin_cycles(&counter, cycles);
            assert!(clock.now() >= cycles as u64);
        }
    }
}
