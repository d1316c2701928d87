//! Common constants used in the library.

pub const KHZ: u32 = 1_000;
pub const MHZ: u32 = 1_000_000;

/// Default main oscillator frequency when none is configured.
pub const DEFAULT_MAIN_OSC_HZ: u32 = 4 * MHZ;
/// Default sub oscillator frequency when none is configured.
pub const DEFAULT_SUB_OSC_HZ: u32 = 32_768;
