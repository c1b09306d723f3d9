//! Per-architecture kernels, selected at build time.
//!
//! Each architecture module exports the same names: a `Native` backend
//! type, a `delay` constructor and `calibrate_delay_loop`.

#[cfg(target_arch = "arm")]
mod arm;
#[cfg(target_arch = "arm")]
pub use arm::*;

#[cfg(target_arch = "avr")]
mod avr;
#[cfg(target_arch = "avr")]
pub use avr::*;

#[cfg(target_arch = "xtensa")]
mod xtensa;
#[cfg(target_arch = "xtensa")]
pub use xtensa::*;

#[cfg(not(any(
    target_arch = "arm",
    target_arch = "avr",
    target_arch = "xtensa",
    test,
    feature = "host"
)))]
compile_error!(
    "Unsupported MCU architecture: busywait has kernels for arm, avr and \
     xtensa only (enable the `host` feature for a simulated build)"
);
