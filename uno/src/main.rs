#![no_std]
#![no_main]

mod bench;
mod commands;
mod devices;

use bench::Bench;
use panic_halt as _;

#[arduino_hal::entry]
fn main() -> ! {
    let mut bench = Bench::new();
    loop {
        bench.next_command();
    }
}
