/// Microsecond delay from the Arduino Uno board support crate.
pub struct UnoDelayUs;

impl busywait::PlatformDelayUs for UnoDelayUs {
    fn delay_us(microseconds: u32) {
        arduino_hal::delay_us(microseconds);
    }
}
