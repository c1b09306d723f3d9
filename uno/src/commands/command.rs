use busywait::CycleRepr;
use ufmt_macros::uDebug;

/// Bench commands.
#[derive(Copy, Clone, uDebug)]
pub enum Command {
    /// `C<n>`: pulse for `n` cycles, dispatched at runtime.
    Cycles(CycleRepr),
    /// `N<n>`: pulse for `n` nanoseconds.
    Nanoseconds(u32),
    /// `U<n>`: pulse for `n` microseconds.
    Microseconds(u32),
    /// `F`: the fixed set of compile-time planned pulses.
    Fixed,
    /// `S`: report the loop calibration.
    Status,
}
