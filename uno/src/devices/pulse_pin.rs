use core::convert::Infallible;

use arduino_hal::prelude::_unwrap_infallible_UnwrapInfallible;
use embedded_hal::digital::OutputPin;

/// Output pin that emits single high pulses.
///
/// # Type Parameters
///
/// - `P`: pulse pin
pub struct PulsePin<P> {
    pin: P,
}

impl<P: OutputPin<Error = Infallible>> PulsePin<P> {
    /// Creates a new `PulsePin`, driving it low.
    ///
    /// # Parameters
    ///
    /// - `pin`: Pin to pulse.
    pub fn new(mut pin: P) -> Self {
        pin.set_low().unwrap_infallible();
        Self { pin }
    }

    /// Drives the pin high, runs `hold`, then drives it low again.
    ///
    /// The pulse width is whatever `hold` takes plus the two pin writes.
    ///
    /// # Parameters
    ///
    /// - `hold`: Delay to run while the pin is high.
    #[inline(always)]
    pub fn pulse<F: FnOnce()>(&mut self, hold: F) {
        self.pin.set_high().unwrap_infallible();
        hold();
        self.pin.set_low().unwrap_infallible();
    }
}
