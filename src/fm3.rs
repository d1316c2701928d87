//! Top-level FM3 machine: the control peripherals behind one synchronous
//! register dispatch, plus the shared interrupt and clock-scale state.

use crate::clock::SystemClock;
use crate::common::{DEFAULT_MAIN_OSC_HZ, DEFAULT_SUB_OSC_HZ};
use crate::error::Error;
use crate::interrupts::{Interrupt, Interrupts, IrqSources, NoPendingSources};
use crate::peripherals::{PeripheralAccessContext, Peripherals};
use crate::Result;
use std::cell::RefCell;
use std::rc::Rc;

pub struct Fm3 {
    pub peripherals: Peripherals,
    pub interrupts: Rc<RefCell<Interrupts>>,
    pub system_clock: Rc<SystemClock>,
    irq_sources: Rc<dyn IrqSources>,
}

impl Default for Fm3 {
    fn default() -> Self {
        Self::new(DEFAULT_MAIN_OSC_HZ, DEFAULT_SUB_OSC_HZ)
    }
}

impl Fm3 {
    pub fn new(main_osc_hz: u32, sub_osc_hz: u32) -> Self {
        let interrupts = Rc::new(RefCell::new(Interrupts::default()));
        let system_clock = Rc::new(SystemClock::new(main_osc_hz));
        let peripherals = Peripherals::new(
            main_osc_hz,
            sub_osc_hz,
            Rc::clone(&interrupts),
            Rc::clone(&system_clock),
        );

        Self {
            peripherals,
            interrupts,
            system_clock,
            irq_sources: Rc::new(NoPendingSources),
        }
    }

    /// Attach the pending-status queries of the observed peripherals. The
    /// default sources report nothing pending.
    pub fn set_irq_sources(&mut self, sources: Rc<dyn IrqSources>) {
        self.irq_sources = sources;
    }

    fn context(&self, address: u32) -> PeripheralAccessContext {
        PeripheralAccessContext {
            address,
            irq_sources: Rc::clone(&self.irq_sources),
        }
    }

    pub fn read(&self, address: u32) -> Result<u32> {
        let ctx = self.context(address);
        let (peripheral, offset) = self
            .peripherals
            .find(address)
            .ok_or(Error::InvalidAddress(address))?;

        Ok(peripheral.read(offset, &ctx))
    }

    pub fn write(&mut self, address: u32, value: u32) -> Result<()> {
        let ctx = self.context(address);
        let (peripheral, offset) = self
            .peripherals
            .find_mut(address)
            .ok_or(Error::InvalidAddress(address))?;

        peripheral.write(offset, value, &ctx);
        Ok(())
    }

    /// Assert or de-assert an interrupt input line.
    pub fn set_irq_line(&self, irq: Interrupt, level: bool) {
        self.peripherals.irqmon.set_line(irq, level);
    }

    pub fn reset(&mut self) {
        self.peripherals.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peripherals::{clock_reset, watchdog};

    const CR_BASE: u32 = 0x4001_0000;
    const WDT_BASE: u32 = 0x4001_1000;

    #[test]
    fn dispatch_routes_each_window() {
        let mut fm3 = Fm3::default();

        fm3.write(CR_BASE + clock_reset::SCM_CTL as u32, (1 << 5) | (1 << 3))
            .unwrap();
        assert_eq!(
            fm3.read(CR_BASE + clock_reset::SCM_STR as u32).unwrap(),
            (1 << 5) | (1 << 3)
        );
        assert_eq!(fm3.system_clock.scale(), 4_000_000);

        // The software watchdog lock register sits on the window's second
        // page.
        fm3.write(WDT_BASE + watchdog::SW_LCK as u32, watchdog::UNLOCK1)
            .unwrap();
        fm3.write(WDT_BASE + watchdog::SW_LCK as u32, watchdog::UNLOCK2)
            .unwrap();
        assert_eq!(fm3.read(WDT_BASE + watchdog::SW_LCK as u32).unwrap(), 0);
        assert_eq!(fm3.read(WDT_BASE + watchdog::HW_LCK as u32).unwrap(), 1);
    }

    #[test]
    fn unclaimed_addresses_are_an_error() {
        let mut fm3 = Fm3::default();

        assert!(matches!(
            fm3.read(0x4800_0000),
            Err(Error::InvalidAddress(0x4800_0000))
        ));
        assert!(fm3.write(0x4800_0000, 1).is_err());
    }

    #[test]
    fn machine_reset_does_not_relock_the_watchdog() {
        let mut fm3 = Fm3::default();
        let lck = WDT_BASE + watchdog::HW_LCK as u32;

        fm3.write(lck, watchdog::UNLOCK1).unwrap();
        fm3.write(lck, watchdog::UNLOCK2).unwrap();
        assert_eq!(fm3.read(lck).unwrap(), 0);

        // Park the master clock on the PLL so the reset visibly restores it.
        fm3.write(CR_BASE + clock_reset::PLL_CTL2 as u32, 19).unwrap();
        fm3.write(CR_BASE + clock_reset::SCM_CTL as u32, (2 << 5) | (1 << 4))
            .unwrap();
        assert_eq!(fm3.peripherals.clock_reset.master_clk_hz(), 80_000_000);

        fm3.reset();

        assert_eq!(fm3.read(lck).unwrap(), 0);
        assert_eq!(
            fm3.peripherals.clock_reset.master_clk_hz(),
            clock_reset::HIGH_CR_OSC_HZ
        );
    }

    #[test]
    fn interrupt_lines_pass_through_the_router() {
        let fm3 = Fm3::default();

        fm3.set_irq_line(Interrupts::MFS0_RX, true);

        let interrupts = fm3.interrupts.borrow();
        assert!(interrupts.is_pending(Interrupts::MFS0_RX));
        assert_eq!(interrupts.iter().count(), 1);
    }
}
