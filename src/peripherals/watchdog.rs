//! Dual watchdog timer (hardware and software triggered).
//!
//! Both units share one lock/control state machine. The control register is
//! only writable after the two unlock codes have been presented in order;
//! any other write to the lock register, including one made while already
//! unlocked, collapses the unit back to locked.

use super::*;

pub const HW_LDR: u16 = 0x0000; // Hardware watchdog load value
pub const HW_VLR: u16 = 0x0004; // Hardware watchdog current count
pub const HW_CTL: u16 = 0x0008; // Hardware watchdog control
pub const HW_ICL: u16 = 0x000C; // Hardware watchdog interrupt clear
pub const HW_RIS: u16 = 0x0010; // Hardware watchdog raw interrupt status
pub const HW_LCK: u16 = 0x0C00; // Hardware watchdog lock
// The software unit mirrors the hardware layout at +0x1000 and goes through
// the same handler path.
pub const SW_LDR: u16 = 0x1000; // Software watchdog load value
pub const SW_VLR: u16 = 0x1004; // Software watchdog current count
pub const SW_CTL: u16 = 0x1008; // Software watchdog control
pub const SW_ICL: u16 = 0x100C; // Software watchdog interrupt clear
pub const SW_RIS: u16 = 0x1010; // Software watchdog raw interrupt status
pub const SW_LCK: u16 = 0x1C00; // Software watchdog lock

/// First unlock code, accepted only while fully locked.
pub const UNLOCK1: u32 = 0x1ACCE551;
/// Second unlock code, accepted only after [`UNLOCK1`].
pub const UNLOCK2: u32 = 0xE5331AAE;

const CTL_RESET_ENABLE: u32 = 1 << 0;
const CTL_TIMER_ENABLE: u32 = 1 << 1;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    #[default]
    Locked,
    Stage1Unlocked,
    Unlocked,
}

/// Lock and control state of a single watchdog unit. Instantiated once for
/// the hardware-triggered and once for the software-triggered instance.
#[derive(Debug, Default)]
pub struct WatchdogUnit {
    lock_state: LockState,
    control: u32,
}

impl WatchdogUnit {
    fn next_state(state: LockState, code: u32) -> LockState {
        match (state, code) {
            (LockState::Locked, UNLOCK1) => LockState::Stage1Unlocked,
            (LockState::Stage1Unlocked, UNLOCK2) => LockState::Unlocked,
            _ => LockState::Locked,
        }
    }

    fn write_lock(&mut self, code: u32) {
        self.lock_state = Self::next_state(self.lock_state, code);
    }

    fn read_lock(&self) -> u32 {
        (self.lock_state != LockState::Unlocked) as u32
    }

    fn write_control(&mut self, value: u32, name: &str) {
        if self.lock_state != LockState::Unlocked {
            return;
        }

        self.control = value & (CTL_TIMER_ENABLE | CTL_RESET_ENABLE);
        log::info!(
            "{name} watchdog timer is {}",
            if self.control & CTL_TIMER_ENABLE != 0 {
                "enabled"
            } else {
                "disabled"
            }
        );
    }

    pub fn lock_state(&self) -> LockState {
        self.lock_state
    }

    pub fn control(&self) -> u32 {
        self.control
    }
}

/// Both watchdog instances behind one register window. Lock state is set up
/// at construction only; a machine reset does not relock an unlocked unit.
#[derive(Debug, Default)]
pub struct WatchDog {
    hw: WatchdogUnit,
    sw: WatchdogUnit,
}

impl WatchDog {
    pub fn hw(&self) -> &WatchdogUnit {
        &self.hw
    }

    pub fn sw(&self) -> &WatchdogUnit {
        &self.sw
    }
}

impl Peripheral for WatchDog {
    fn read(&self, offset: u16, _ctx: &PeripheralAccessContext) -> u32 {
        match offset {
            HW_CTL => self.hw.control & 3,
            HW_LCK => self.hw.read_lock(),
            SW_CTL => self.sw.control & 3,
            SW_LCK => self.sw.read_lock(),
            // Countdown timing is not modeled, so the counter and interrupt
            // registers read as empty.
            _ => 0,
        }
    }

    fn write(&mut self, offset: u16, value: u32, _ctx: &PeripheralAccessContext) {
        match offset {
            HW_CTL => self.hw.write_control(value, "Hardware"),
            HW_LCK => self.hw.write_lock(value),
            SW_CTL => self.sw.write_control(value, "Software"),
            SW_LCK => self.sw.write_lock(value),
            _ => {}
        }
    }
}
