//! Interrupt lines of the FM3 family and the pending-status query capability
//! used by the interrupt monitor registers.

pub type Interrupt = u8;

/// Total interrupt line count for the device family.
pub const FM3_IRQ_COUNT: usize = 48;

pub struct InterruptIter(u64);

impl Iterator for InterruptIter {
    type Item = Interrupt;

    fn next(&mut self) -> Option<Self::Item> {
        if self.0 == 0 {
            return None;
        }

        let trailing_zeros = self.0.trailing_zeros();
        self.0 &= !(1 << trailing_zeros);
        Some(trailing_zeros as u8)
    }
}

/// Pending state of the NVIC-facing interrupt lines.
#[derive(Default)]
pub struct Interrupts {
    pending: u64,
}

#[rustfmt::skip]
impl Interrupts {
    pub const CSV: Interrupt = 0;
    pub const SWDT: Interrupt = 1;
    pub const LVD: Interrupt = 2;
    pub const WFG: Interrupt = 3;
    pub const EXTI0_7: Interrupt = 4;
    pub const EXTI8_31: Interrupt = 5;
    pub const DTIM_QDU: Interrupt = 6;
    pub const MFS0_RX: Interrupt = 7;
    pub const MFS0_TX: Interrupt = 8;
    pub const MFS1_RX: Interrupt = 9;
    pub const MFS1_TX: Interrupt = 10;
    pub const MFS2_RX: Interrupt = 11;
    pub const MFS2_TX: Interrupt = 12;
    pub const MFS3_RX: Interrupt = 13;
    pub const MFS3_TX: Interrupt = 14;
    pub const MFS4_RX: Interrupt = 15;
    pub const MFS4_TX: Interrupt = 16;
    pub const MFS5_RX: Interrupt = 17;
    pub const MFS5_TX: Interrupt = 18;
    pub const MFS6_RX: Interrupt = 19;
    pub const MFS6_TX: Interrupt = 20;
    pub const MFS7_RX: Interrupt = 21;
    pub const MFS7_TX: Interrupt = 22;
    pub const PPG: Interrupt = 23;
    pub const OSC_PLL_RTC: Interrupt = 24;
    pub const ADC0: Interrupt = 25;
    pub const ADC1: Interrupt = 26;
    pub const ADC2: Interrupt = 27;
    pub const FRT: Interrupt = 28;
    pub const INCAP: Interrupt = 29;
    pub const OUTCOMP: Interrupt = 30;
    pub const BT: Interrupt = 31;
    pub const CAN0: Interrupt = 32;
    pub const CAN1: Interrupt = 33;
    pub const USBF: Interrupt = 34;
    pub const USBF_USBH: Interrupt = 35;
    pub const DMAC0: Interrupt = 38;
    pub const DMAC1: Interrupt = 39;
    pub const DMAC2: Interrupt = 40;
    pub const DMAC3: Interrupt = 41;
    pub const DMAC4: Interrupt = 42;
    pub const DMAC5: Interrupt = 43;
    pub const DMAC6: Interrupt = 44;
    pub const DMAC7: Interrupt = 45;
}

impl Interrupts {
    pub fn set_irq(&mut self, irq: Interrupt, level: bool) {
        debug_assert!((irq as usize) < FM3_IRQ_COUNT);

        if level {
            self.pending |= 1 << irq;
        } else {
            self.clear_irq(irq);
        }
    }

    pub fn clear_irq(&mut self, irq: Interrupt) {
        self.pending &= !(1 << irq);
    }

    pub fn is_pending(&self, irq: Interrupt) -> bool {
        self.pending & (1 << irq) != 0
    }

    pub fn iter(&self) -> InterruptIter {
        InterruptIter(self.pending)
    }
}

/// Live pending-status queries into the peripherals observed by the interrupt
/// monitor registers. Injected as a capability so the monitor can be driven
/// by fakes in tests.
pub trait IrqSources {
    /// Pending flag of one of the 32 external interrupt channels.
    fn external_irq_pending(&self, channel: u8) -> bool;
    /// Receive interrupt pending for one of the 8 serial (MFS) ports.
    fn serial_rx_pending(&self, port: u8) -> bool;
    /// Transmit interrupt pending for one of the 8 serial (MFS) ports.
    fn serial_tx_pending(&self, port: u8) -> bool;
    /// Status interrupt pending for one of the 8 serial (MFS) ports.
    fn serial_status_pending(&self, port: u8) -> bool;
}

/// Sources for a machine without the observed peripherals attached.
pub struct NoPendingSources;

impl IrqSources for NoPendingSources {
    fn external_irq_pending(&self, _channel: u8) -> bool {
        false
    }

    fn serial_rx_pending(&self, _port: u8) -> bool {
        false
    }

    fn serial_tx_pending(&self, _port: u8) -> bool {
        false
    }

    fn serial_status_pending(&self, _port: u8) -> bool {
        false
    }
}
