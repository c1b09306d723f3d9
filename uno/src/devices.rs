pub mod delay;
pub mod pulse_pin;
pub mod read_uart;

pub use delay::UnoDelayUs;
pub use pulse_pin::PulsePin;
