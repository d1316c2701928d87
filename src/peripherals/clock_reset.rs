//! Clock/reset generator (CRG).
//!
//! Holds the clock-source configuration and PLL parameters. Every validated
//! write to a wired register recomputes the master clock and republishes the
//! divided base clock through the shared [`SystemClock`] cell.

use super::*;
use crate::common::{KHZ, MHZ};
use crate::utils::{extract_bit, extract_bits};

pub const SCM_CTL: u16 = 0x0000; // System clock mode control
pub const SCM_STR: u16 = 0x0004; // System clock mode status, mirrors SCM_CTL
pub const STB_CTL: u16 = 0x0008; // Standby mode control
pub const RST_STR: u16 = 0x000C; // Reset cause status
pub const BSC_PSR: u16 = 0x0010; // Base clock prescaler
pub const APBC0_PSR: u16 = 0x0014; // APB0 prescaler
pub const APBC1_PSR: u16 = 0x0018; // APB1 prescaler
pub const APBC2_PSR: u16 = 0x001C; // APB2 prescaler
pub const SWC_PSR: u16 = 0x0020; // Software watchdog clock prescaler
pub const TTC_PSR: u16 = 0x0028; // Trace clock prescaler
pub const CSW_TMR: u16 = 0x0030; // Clock stabilization wait timer
pub const PSW_TMR: u16 = 0x0034; // PLL stabilization wait timer
pub const PLL_CTL1: u16 = 0x0038; // PLL control 1, divisor K
pub const PLL_CTL2: u16 = 0x003C; // PLL control 2, multiplier N
pub const CSV_CTL: u16 = 0x0040; // Clock supervisor control
pub const CSV_STR: u16 = 0x0044; // Clock supervisor status
pub const FCSWH_CTL: u16 = 0x0048; // Frequency detection window, upper
pub const FCSWL_CTL: u16 = 0x004C; // Frequency detection window, lower
pub const FCSWD_CTL: u16 = 0x0050; // Frequency detection counter
pub const DBWDT_CTL: u16 = 0x0054; // Debug-break watchdog control
pub const INT_ENR: u16 = 0x0060; // Anomaly interrupt enable
pub const INT_STR: u16 = 0x0064; // Anomaly interrupt status
pub const INT_CLR: u16 = 0x0068; // Anomaly interrupt clear

/// Fixed high-speed internal CR oscillator.
pub const HIGH_CR_OSC_HZ: u32 = 4 * MHZ;
/// Fixed low-speed internal CR oscillator.
pub const LOW_CR_OSC_HZ: u32 = 100 * KHZ;

pub struct ClockReset {
    scm: u32,
    bsc: u32,
    pll1: u32,
    pll2: u32,
    main_clk_hz: u32,
    sub_clk_hz: u32,
    master_clk_hz: u32,
    system_clock: Rc<SystemClock>,
}

impl ClockReset {
    pub fn new(main_clk_hz: u32, sub_clk_hz: u32, system_clock: Rc<SystemClock>) -> Self {
        Self {
            scm: 0,
            bsc: 0,
            pll1: 0,
            pll2: 0,
            main_clk_hz,
            sub_clk_hz,
            master_clk_hz: HIGH_CR_OSC_HZ,
            system_clock,
        }
    }

    /// Selected master clock before the base divisor, in Hz.
    pub fn master_clk_hz(&self) -> u32 {
        self.master_clk_hz
    }

    pub fn main_osc_hz(&self) -> u32 {
        self.main_clk_hz
    }

    pub fn sub_osc_hz(&self) -> u32 {
        self.sub_clk_hz
    }

    fn pll_out_hz(&self) -> u32 {
        let k = extract_bits(self.pll1, 4..=7) + 1;
        let n = extract_bits(self.pll2, 0..=5) + 1;
        self.main_clk_hz / k * n
    }

    /// Recompute the master clock and republish the base clock. Aborts
    /// without touching the published value on an invalid source selection
    /// or divisor setting.
    fn update_system_clock(&mut self) {
        self.master_clk_hz = match extract_bits(self.scm, 5..=7) {
            0 => HIGH_CR_OSC_HZ,
            1 | 5 => {
                if extract_bit(self.scm, 3) != 0 {
                    self.main_clk_hz
                } else {
                    0
                }
            }
            2 => {
                if extract_bit(self.scm, 4) != 0 {
                    self.pll_out_hz()
                } else {
                    0
                }
            }
            4 => LOW_CR_OSC_HZ,
            _ => {
                log::warn!(
                    "Invalid selection for the master clock: SCM_CTL={:#04X}",
                    self.scm
                );
                return;
            }
        };

        let scale = match self.bsc {
            0 => self.master_clk_hz,
            1 => self.master_clk_hz >> 1,
            2 => self.master_clk_hz / 3,
            3 => self.master_clk_hz >> 2,
            4 => self.master_clk_hz / 6,
            5 => self.master_clk_hz >> 3,
            6 => self.master_clk_hz >> 4,
            _ => {
                log::warn!(
                    "Invalid divisor setting for the base clock: BSC_PSR={:#X}",
                    self.bsc
                );
                return;
            }
        };

        let previous = self.system_clock.scale();
        self.system_clock.set_scale(scale);

        if scale != previous {
            log::info!("Base clock at {scale} Hz");
        }
    }
}

impl Peripheral for ClockReset {
    fn read(&self, offset: u16, _ctx: &PeripheralAccessContext) -> u32 {
        match offset {
            SCM_CTL | SCM_STR => self.scm,
            BSC_PSR => self.bsc,
            PLL_CTL1 => self.pll1,
            PLL_CTL2 => self.pll2,
            _ => 0,
        }
    }

    fn write(&mut self, offset: u16, value: u32, _ctx: &PeripheralAccessContext) {
        match offset {
            SCM_CTL => self.scm = value & 0xFF,
            BSC_PSR => self.bsc = value & 0x7,
            PLL_CTL1 => self.pll1 = value,
            PLL_CTL2 => {
                // The masked value is still stored, but an out-of-range
                // multiplier must not reach the derived clock.
                self.pll2 = value & 0x3F;
                if self.pll2 > 49 {
                    log::warn!("Invalid pll feedback divisor: PLLN={}", self.pll2);
                    return;
                }
            }
            _ => return,
        }

        self.update_system_clock();
    }

    /// Restores only the derived master clock. The configuration registers
    /// keep their values and the published base clock stays as it was until
    /// the next validated write recomputes it.
    fn reset(&mut self) {
        self.master_clk_hz = HIGH_CR_OSC_HZ;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAIN_OSC_ENABLE: u32 = 1 << 3;
    const PLL_ENABLE: u32 = 1 << 4;

    fn cr() -> (ClockReset, Rc<SystemClock>) {
        let system_clock = Rc::new(SystemClock::new(4 * MHZ));
        let cr = ClockReset::new(4 * MHZ, 32_768, Rc::clone(&system_clock));
        (cr, system_clock)
    }

    #[test]
    fn high_cr_oscillator_is_the_default_source() {
        let (mut cr, system_clock) = cr();
        let ctx = PeripheralAccessContext::default();

        cr.write(SCM_CTL, 0, &ctx);

        assert_eq!(cr.master_clk_hz(), HIGH_CR_OSC_HZ);
        assert_eq!(system_clock.scale(), HIGH_CR_OSC_HZ);
    }

    #[test]
    fn main_oscillator_gated_by_enable_bit() {
        let (mut cr, system_clock) = cr();
        let ctx = PeripheralAccessContext::default();

        cr.write(SCM_CTL, 1 << 5, &ctx);
        assert_eq!(cr.master_clk_hz(), 0);
        assert_eq!(system_clock.scale(), 0);

        cr.write(SCM_CTL, (1 << 5) | MAIN_OSC_ENABLE, &ctx);
        assert_eq!(cr.master_clk_hz(), 4 * MHZ);
        assert_eq!(system_clock.scale(), 4 * MHZ);

        // Selector 5 behaves like selector 1.
        cr.write(SCM_CTL, (5 << 5) | MAIN_OSC_ENABLE, &ctx);
        assert_eq!(cr.master_clk_hz(), 4 * MHZ);
    }

    #[test]
    fn low_cr_oscillator_selection() {
        let (mut cr, system_clock) = cr();
        let ctx = PeripheralAccessContext::default();

        cr.write(SCM_CTL, 4 << 5, &ctx);

        assert_eq!(cr.master_clk_hz(), LOW_CR_OSC_HZ);
        assert_eq!(system_clock.scale(), LOW_CR_OSC_HZ);
    }

    #[test]
    fn pll_output_with_multiplier_and_divisor() {
        let (mut cr, system_clock) = cr();
        let ctx = PeripheralAccessContext::default();

        cr.write(PLL_CTL1, 0x3 << 4, &ctx); // K = 4
        cr.write(PLL_CTL2, 19, &ctx); // N = 20
        cr.write(SCM_CTL, (2 << 5) | PLL_ENABLE, &ctx);

        // 4 MHz / 4 * 20
        assert_eq!(cr.master_clk_hz(), 20 * MHZ);
        assert_eq!(system_clock.scale(), 20 * MHZ);
    }

    #[test]
    fn pll_source_without_enable_bit_is_silent() {
        let (mut cr, system_clock) = cr();
        let ctx = PeripheralAccessContext::default();

        cr.write(PLL_CTL2, 19, &ctx);
        cr.write(SCM_CTL, 2 << 5, &ctx);

        assert_eq!(cr.master_clk_hz(), 0);
        assert_eq!(system_clock.scale(), 0);
    }

    #[test]
    fn out_of_range_multiplier_is_stored_but_not_applied() {
        let (mut cr, system_clock) = cr();
        let ctx = PeripheralAccessContext::default();

        cr.write(SCM_CTL, 0, &ctx);
        assert_eq!(system_clock.scale(), HIGH_CR_OSC_HZ);

        for plln in 50..=63 {
            cr.write(PLL_CTL2, plln, &ctx);

            // The register keeps the masked value, the derived clock does not
            // move.
            assert_eq!(cr.read(PLL_CTL2, &ctx), plln);
            assert_eq!(cr.master_clk_hz(), HIGH_CR_OSC_HZ);
            assert_eq!(system_clock.scale(), HIGH_CR_OSC_HZ);
        }
    }

    #[test]
    fn invalid_source_selection_preserves_master_clock() {
        let (mut cr, system_clock) = cr();
        let ctx = PeripheralAccessContext::default();

        cr.write(SCM_CTL, (1 << 5) | MAIN_OSC_ENABLE, &ctx);
        assert_eq!(system_clock.scale(), 4 * MHZ);

        for selector in [3u32, 6, 7] {
            cr.write(SCM_CTL, (selector << 5) | MAIN_OSC_ENABLE, &ctx);

            assert_eq!(cr.master_clk_hz(), 4 * MHZ);
            assert_eq!(system_clock.scale(), 4 * MHZ);
        }
    }

    #[test]
    fn base_clock_divisor_factors() {
        let (mut cr, system_clock) = cr();
        let ctx = PeripheralAccessContext::default();

        cr.write(SCM_CTL, (2 << 5) | PLL_ENABLE, &ctx);
        cr.write(PLL_CTL2, 11, &ctx); // 48 MHz

        let factors = [1, 2, 3, 4, 6, 8, 16];
        for (setting, factor) in factors.into_iter().enumerate() {
            cr.write(BSC_PSR, setting as u32, &ctx);

            assert_eq!(cr.read(BSC_PSR, &ctx), setting as u32);
            assert_eq!(system_clock.scale(), 48 * MHZ / factor);
        }
    }

    #[test]
    fn invalid_divisor_preserves_published_scale() {
        let (mut cr, system_clock) = cr();
        let ctx = PeripheralAccessContext::default();

        cr.write(SCM_CTL, (1 << 5) | MAIN_OSC_ENABLE, &ctx);
        cr.write(BSC_PSR, 1, &ctx);
        assert_eq!(system_clock.scale(), 2 * MHZ);

        cr.write(BSC_PSR, 7, &ctx);

        assert_eq!(cr.read(BSC_PSR, &ctx), 7);
        assert_eq!(system_clock.scale(), 2 * MHZ);
    }

    #[test]
    fn rewriting_the_same_configuration_is_stable() {
        let (mut cr, system_clock) = cr();
        let ctx = PeripheralAccessContext::default();

        cr.write(SCM_CTL, (1 << 5) | MAIN_OSC_ENABLE, &ctx);
        cr.write(BSC_PSR, 3, &ctx);
        let first = system_clock.scale();

        cr.write(BSC_PSR, 3, &ctx);

        assert_eq!(first, MHZ);
        assert_eq!(system_clock.scale(), first);
    }

    #[test]
    fn status_register_mirrors_mode_control() {
        let (mut cr, _) = cr();
        let ctx = PeripheralAccessContext::default();

        cr.write(SCM_CTL, 0xAB, &ctx);

        assert_eq!(cr.read(SCM_CTL, &ctx), 0xAB);
        assert_eq!(cr.read(SCM_STR, &ctx), 0xAB);
    }

    #[test]
    fn unhandled_offsets_read_zero_and_ignore_writes() {
        let (mut cr, system_clock) = cr();
        let ctx = PeripheralAccessContext::default();

        cr.write(SCM_CTL, (1 << 5) | MAIN_OSC_ENABLE, &ctx);
        let before = system_clock.scale();

        cr.write(STB_CTL, 0xFFFF_FFFF, &ctx);
        cr.write(CSV_CTL, 0x1234, &ctx);

        assert_eq!(cr.read(STB_CTL, &ctx), 0);
        assert_eq!(cr.read(RST_STR, &ctx), 0);
        assert_eq!(system_clock.scale(), before);
    }

    #[test]
    fn reset_restores_master_clock_but_not_published_scale() {
        let (mut cr, system_clock) = cr();
        let ctx = PeripheralAccessContext::default();

        cr.write(SCM_CTL, (1 << 5) | MAIN_OSC_ENABLE, &ctx);
        cr.write(BSC_PSR, 1, &ctx);
        assert_eq!(system_clock.scale(), 2 * MHZ);

        cr.reset();

        assert_eq!(cr.master_clk_hz(), HIGH_CR_OSC_HZ);
        // The published value stays stale until the next validated write.
        assert_eq!(system_clock.scale(), 2 * MHZ);

        cr.write(BSC_PSR, 1, &ctx);
        assert_eq!(system_clock.scale(), 2 * MHZ);
    }
}
