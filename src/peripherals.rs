//! Peripheral register blocks and their APB address dispatch.

use crate::clock::SystemClock;
use crate::interrupts::{Interrupts, IrqSources, NoPendingSources};
use std::cell::RefCell;
use std::rc::Rc;

pub mod clock_reset;
pub mod irqmon;
pub mod watchdog;

pub use clock_reset::ClockReset;
pub use irqmon::IrqMonitor;
pub use watchdog::WatchDog;

/// Collaborators a register handler may need at access time.
#[derive(Clone)]
pub struct PeripheralAccessContext {
    /// Full bus address of the access, for diagnostics.
    pub address: u32,
    pub irq_sources: Rc<dyn IrqSources>,
}

impl Default for PeripheralAccessContext {
    fn default() -> Self {
        Self {
            address: 0,
            irq_sources: Rc::new(NoPendingSources),
        }
    }
}

/// A memory-mapped register block. Offsets are relative to the block base.
///
/// Invalid inputs are absorbed by each block's own policy: unknown offsets
/// read 0 and ignore writes, so the handlers themselves never fail.
pub trait Peripheral {
    fn read(&self, offset: u16, ctx: &PeripheralAccessContext) -> u32;
    fn write(&mut self, offset: u16, value: u32, ctx: &PeripheralAccessContext);

    fn reset(&mut self) {}
}

#[derive(Default)]
pub struct UnimplementedPeripheral;

impl Peripheral for UnimplementedPeripheral {
    fn read(&self, _offset: u16, ctx: &PeripheralAccessContext) -> u32 {
        log::warn!(
            "Unimplemented peripheral read at address {:#010X}",
            ctx.address
        );
        0
    }

    fn write(&mut self, _offset: u16, value: u32, ctx: &PeripheralAccessContext) {
        log::warn!(
            "Unimplemented peripheral write at address {:#010X} with value {:#X}",
            ctx.address,
            value
        );
    }
}

pub struct Peripherals {
    pub flash_if: UnimplementedPeripheral,
    pub clock_reset: ClockReset,
    pub watchdog: WatchDog,
    pub dual_timer: UnimplementedPeripheral,
    pub mft: UnimplementedPeripheral,
    pub ppg: UnimplementedPeripheral,
    pub adc: UnimplementedPeripheral,
    pub exti: UnimplementedPeripheral,
    pub irqmon: IrqMonitor,
    pub gpio: UnimplementedPeripheral,
    pub mfs: UnimplementedPeripheral,
    pub dmac: UnimplementedPeripheral,
}

impl Peripherals {
    pub fn new(
        main_osc_hz: u32,
        sub_osc_hz: u32,
        interrupts: Rc<RefCell<Interrupts>>,
        system_clock: Rc<SystemClock>,
    ) -> Self {
        Self {
            flash_if: UnimplementedPeripheral,
            clock_reset: ClockReset::new(main_osc_hz, sub_osc_hz, system_clock),
            watchdog: WatchDog::default(),
            dual_timer: UnimplementedPeripheral,
            mft: UnimplementedPeripheral,
            ppg: UnimplementedPeripheral,
            adc: UnimplementedPeripheral,
            exti: UnimplementedPeripheral,
            irqmon: IrqMonitor::new(interrupts),
            gpio: UnimplementedPeripheral,
            mfs: UnimplementedPeripheral,
            dmac: UnimplementedPeripheral,
        }
    }

    pub fn reset(&mut self) {
        self.clock_reset.reset();
        self.irqmon.reset();
        self.watchdog.reset();
    }

    /// Resolve an address to the block claiming it and the block-relative
    /// offset. The watchdog window spans two pages (the software unit's
    /// registers live at +0x1000).
    pub fn find(&self, address: u32) -> Option<(&dyn Peripheral, u16)> {
        let (peripheral, base): (&dyn Peripheral, u32) = match address & 0xFFFF_F000 {
            0x4000_0000 => (&self.flash_if, 0x4000_0000),
            0x4001_0000 => (&self.clock_reset, 0x4001_0000),
            0x4001_1000 | 0x4001_2000 => (&self.watchdog, 0x4001_1000),
            0x4001_5000 => (&self.dual_timer, 0x4001_5000),
            0x4002_0000 => (&self.mft, 0x4002_0000),
            0x4002_4000 => (&self.ppg, 0x4002_4000),
            0x4002_7000 => (&self.adc, 0x4002_7000),
            0x4003_0000 => (&self.exti, 0x4003_0000),
            0x4003_1000 => (&self.irqmon, 0x4003_1000),
            0x4003_3000 => (&self.gpio, 0x4003_3000),
            0x4003_8000 => (&self.mfs, 0x4003_8000),
            0x4006_0000 => (&self.dmac, 0x4006_0000),
            _ => return None,
        };

        Some((peripheral, (address - base) as u16))
    }

    pub fn find_mut(&mut self, address: u32) -> Option<(&mut dyn Peripheral, u16)> {
        let (peripheral, base): (&mut dyn Peripheral, u32) = match address & 0xFFFF_F000 {
            0x4000_0000 => (&mut self.flash_if, 0x4000_0000),
            0x4001_0000 => (&mut self.clock_reset, 0x4001_0000),
            0x4001_1000 | 0x4001_2000 => (&mut self.watchdog, 0x4001_1000),
            0x4001_5000 => (&mut self.dual_timer, 0x4001_5000),
            0x4002_0000 => (&mut self.mft, 0x4002_0000),
            0x4002_4000 => (&mut self.ppg, 0x4002_4000),
            0x4002_7000 => (&mut self.adc, 0x4002_7000),
            0x4003_0000 => (&mut self.exti, 0x4003_0000),
            0x4003_1000 => (&mut self.irqmon, 0x4003_1000),
            0x4003_3000 => (&mut self.gpio, 0x4003_3000),
            0x4003_8000 => (&mut self.mfs, 0x4003_8000),
            0x4006_0000 => (&mut self.dmac, 0x4006_0000),
            _ => return None,
        };

        Some((peripheral, (address - base) as u16))
    }
}
