//! Interrupt status monitor and line router.
//!
//! Routing is a pure pass-through from input lines to the NVIC-facing
//! [`Interrupts`] consumer. The monitor registers hold no state of their own;
//! every read synthesizes its value live from the pending flags of the
//! observed peripherals.

use super::*;
use crate::interrupts::Interrupt;

pub const EXC02MON: u16 = 0x10; // NMI / hardware exception batch monitor
pub const IRQ00MON: u16 = 0x14;
pub const IRQ01MON: u16 = 0x18;
pub const IRQ02MON: u16 = 0x1C;
pub const IRQ03MON: u16 = 0x20;
pub const IRQ04MON: u16 = 0x24; // External interrupt channels 0-7
pub const IRQ05MON: u16 = 0x28; // External interrupt channels 8-31
pub const IRQ06MON: u16 = 0x2C;
pub const IRQ07MON: u16 = 0x30; // MFS0 rx
pub const IRQ08MON: u16 = 0x34; // MFS0 tx/status
pub const IRQ09MON: u16 = 0x38;
pub const IRQ10MON: u16 = 0x3C;
pub const IRQ11MON: u16 = 0x40;
pub const IRQ12MON: u16 = 0x44;
pub const IRQ13MON: u16 = 0x48;
pub const IRQ14MON: u16 = 0x4C;
pub const IRQ15MON: u16 = 0x50;
pub const IRQ16MON: u16 = 0x54;
pub const IRQ17MON: u16 = 0x58;
pub const IRQ18MON: u16 = 0x5C;
pub const IRQ19MON: u16 = 0x60;
pub const IRQ20MON: u16 = 0x64;
pub const IRQ21MON: u16 = 0x68; // MFS7 rx
pub const IRQ22MON: u16 = 0x6C; // MFS7 tx/status
pub const IRQ23MON: u16 = 0x70;
pub const IRQ24MON: u16 = 0x74;
pub const IRQ25MON: u16 = 0x78;
pub const IRQ26MON: u16 = 0x7C;
pub const IRQ27MON: u16 = 0x80;
pub const IRQ28MON: u16 = 0x84;
pub const IRQ29MON: u16 = 0x88;
pub const IRQ30MON: u16 = 0x8C;
pub const IRQ31MON: u16 = 0x90;

pub struct IrqMonitor {
    interrupts: Rc<RefCell<Interrupts>>,
}

impl IrqMonitor {
    pub fn new(interrupts: Rc<RefCell<Interrupts>>) -> Self {
        Self { interrupts }
    }

    /// Forward an interrupt line level unchanged to the consumer line with
    /// the same index.
    pub fn set_line(&self, irq: Interrupt, level: bool) {
        self.interrupts.borrow_mut().set_irq(irq, level);
    }
}

impl Peripheral for IrqMonitor {
    fn read(&self, offset: u16, ctx: &PeripheralAccessContext) -> u32 {
        let sources = &ctx.irq_sources;

        match offset & 0xFF {
            IRQ04MON => {
                let mut pending = 0;
                for channel in 0..8u8 {
                    pending |= (sources.external_irq_pending(channel) as u32) << channel;
                }
                pending
            }

            IRQ05MON => {
                let mut pending = 0;
                for channel in 8..32u8 {
                    pending |= (sources.external_irq_pending(channel) as u32) << (channel - 8);
                }
                pending
            }

            offset @ (IRQ07MON | IRQ09MON | IRQ11MON | IRQ13MON | IRQ15MON | IRQ17MON
            | IRQ19MON | IRQ21MON) => {
                // Each serial port occupies two consecutive monitor slots.
                let port = ((offset - IRQ07MON) >> 3) as u8;
                sources.serial_rx_pending(port) as u32
            }

            offset @ (IRQ08MON | IRQ10MON | IRQ12MON | IRQ14MON | IRQ16MON | IRQ18MON
            | IRQ20MON | IRQ22MON) => {
                let port = ((offset - IRQ08MON) >> 3) as u8;
                sources.serial_tx_pending(port) as u32
                    | (sources.serial_status_pending(port) as u32) << 1
            }

            _ => 0,
        }
    }

    fn write(&mut self, _offset: u16, _value: u32, _ctx: &PeripheralAccessContext) {
        log::debug!("Interrupt monitor registers are read-only");
    }
}
