//! Shared system clock-scale cell.
//!
//! Holds the base-clock frequency the CPU timing model runs from. The
//! clock/reset controller is the single writer; everything else only reads.

use std::cell::Cell;

pub struct SystemClock {
    scale: Cell<u32>,
}

impl SystemClock {
    pub fn new(hz: u32) -> Self {
        Self {
            scale: Cell::new(hz),
        }
    }

    /// Current base-clock frequency in Hz.
    pub fn scale(&self) -> u32 {
        self.scale.get()
    }

    pub fn set_scale(&self, hz: u32) {
        self.scale.set(hz);
    }
}
