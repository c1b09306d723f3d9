use crate::{
    commands::{command::Command, command_parser},
    devices::{read_uart, PulsePin, UnoDelayUs},
};
use arduino_hal::{
    default_serial, delay_ms,
    hal::port::{PD0, PD1},
    pac::USART0,
    pins,
    port::{
        mode::{Input, Output},
        Pin, D8,
    },
    prelude::_unwrap_infallible_UnwrapInfallible,
    Peripherals, Pins, Usart,
};
use busywait::{
    arch::{self, Native},
    delay_cycles, delay_ns, ns_to_cycles, CpuClock, CycleRepr, Delay, MHz16,
    Plan, LOOP_CALIBRATION,
};
use ufmt::uwriteln;

/// Pulse bench.
///
/// Emits pulses of a requested width on D8, for checking delays on a scope
/// or logic analyser.
pub struct Bench {
    pulse: PulsePin<Pin<Output, D8>>,
    delay: Delay<MHz16, Native<UnoDelayUs>>,
    serial: Usart<USART0, Pin<Input, PD0>, Pin<Output, PD1>>,
    uart_input_buffer: heapless::String<32>,
}

impl Bench {
    const BAUD_RATE: u32 = 57600;

    pub fn new() -> Self {
        let peripherals: Peripherals = unsafe { Peripherals::steal() };
        let pins: Pins = pins!(peripherals);
        let mut serial = default_serial!(peripherals, pins, Self::BAUD_RATE);

        // Settle the loop calibration before anything is timed.
        arch::calibrate_delay_loop();

        // Announce the bench!
        delay_ms(100);
        uwriteln!(&mut serial, "PULSEBENCH").unwrap_infallible();

        let pulse = PulsePin::new(pins.d8.into_output());
        let delay = arch::delay::<MHz16, UnoDelayUs>();

        // UART
        let uart_input_buffer = heapless::String::new();

        Self {
            pulse,
            delay,
            serial,
            uart_input_buffer,
        }
    }

    pub fn next_command(&mut self) {
        let result = match self.block_for_next_command() {
            Command::Cycles(cycles) => self.run_cycles(cycles),
            Command::Nanoseconds(ns) => self.run_nanoseconds(ns),
            Command::Microseconds(us) => self.run_microseconds(us),
            Command::Fixed => self.run_fixed(),
            Command::Status => self.run_status(),
        };
        match result {
            Ok(()) => uwriteln!(&mut self.serial, "Ok.").unwrap_infallible(),
            Err(err) => self.print_error(err),
        }
    }

    /// Block waiting for the next valid command.
    fn block_for_next_command(&mut self) -> Command {
        loop {
            match read_uart::readln(
                &mut self.serial,
                &mut self.uart_input_buffer,
            ) {
                Err(read_uart::Error::BufferOverflow) => {
                    uwriteln!(&mut self.serial, "ERROR: UART buffer overflow.")
                        .unwrap_infallible()
                }
                Ok(()) => match command_parser::parse(&self.uart_input_buffer) {
                    Err(command_parser::Error::ParseError) => uwriteln!(
                        &mut self.serial,
                        "ERROR: Could not parse input: \"{}\".",
                        &self.uart_input_buffer as &str
                    )
                    .unwrap_infallible(),
                    Ok(cmd) => return cmd,
                },
            }
        }
    }

    /// Pulse for a runtime number of cycles.
    fn run_cycles(&mut self, cycles: CycleRepr) -> Result<(), Error> {
        let width = self
            .delay
            .backend()
            .effective_cycles(cycles)
            .ok_or(Error::ZeroWidth)?;
        let delay = &mut self.delay;
        self.pulse.pulse(|| delay_cycles!(delay, cycles));
        uwriteln!(&mut self.serial, "Info. Pulse: {}", width)
            .unwrap_infallible();
        Ok(())
    }

    /// Pulse for a runtime number of nanoseconds.
    fn run_nanoseconds(&mut self, ns: u32) -> Result<(), Error> {
        let width = self
            .delay
            .backend()
            .effective_cycles(ns_to_cycles(ns, MHz16::HZ))
            .ok_or(Error::ZeroWidth)?;
        let delay = &mut self.delay;
        self.pulse.pulse(|| delay_ns!(delay, ns));
        uwriteln!(&mut self.serial, "Info. Pulse: {}", width)
            .unwrap_infallible();
        Ok(())
    }

    /// Pulse for a number of microseconds.
    fn run_microseconds(&mut self, us: u32) -> Result<(), Error> {
        if us == 0 {
            return Err(Error::ZeroWidth);
        }
        let delay = &mut self.delay;
        self.pulse.pulse(|| delay.delay_us(us));
        Ok(())
    }

    /// Emit the fixed pulse train. Every width here is planned at compile
    /// time, so each should come out exact.
    fn run_fixed(&mut self) -> Result<(), Error> {
        let delay = &mut self.delay;
        self.pulse.pulse(|| delay_cycles!(delay, 1));
        delay_cycles!(delay, 16);
        self.pulse.pulse(|| delay_cycles!(delay, 10));
        delay_cycles!(delay, 16);
        self.pulse.pulse(|| delay_ns!(delay, 250));
        delay_cycles!(delay, 16);
        self.pulse.pulse(|| delay_ns!(delay, 1000));

        for plan in [Plan::new(1), Plan::new(10), Plan::new(4), Plan::new(16)]
        {
            uwriteln!(&mut self.serial, "Info. {:?}", plan)
                .unwrap_infallible();
        }
        Ok(())
    }

    /// Report the loop calibration.
    fn run_status(&mut self) -> Result<(), Error> {
        uwriteln!(
            &mut self.serial,
            "Info. Calibrated: {}, cycles per iteration: {}",
            LOOP_CALIBRATION.is_calibrated(),
            LOOP_CALIBRATION.cycles_per_iteration()
        )
        .unwrap_infallible();
        Ok(())
    }

    /// Print one of the errors from this module.
    fn print_error(&mut self, error: Error) {
        use Error::*;
        match error {
            ZeroWidth => uwriteln!(
                &mut self.serial,
                "ERROR: Pulse is shorter than one delay step."
            )
            .unwrap_infallible(),
        }
    }
}

enum Error {
    ZeroWidth,
}
