//! Emulation core for the FM3 family's control peripherals: the clock/reset
//! generator, the interrupt status monitor/router, and the dual watchdog
//! timer, exposed as memory-mapped register blocks behind a synchronous
//! dispatch.

pub mod clock;
pub mod common;
pub mod error;
pub mod fm3;
pub mod interrupts;
pub mod peripherals;

mod utils;

pub use clock::SystemClock;
pub use error::Error;
pub use fm3::Fm3;
pub use interrupts::{Interrupt, Interrupts, IrqSources};

pub type Result<T> = core::result::Result<T, Error>;
