//! TIMER alarm slots over the RP2040 PAC.
//!
//! embassy-rp's time driver owns alarm 0; alarms 1-3 are managed here by
//! index. INTE is read-modify-write shared with that driver, so every
//! touch of it happens inside a critical section.

use cortex_m::peripheral::NVIC;
use embassy_rp::pac;
use embassy_rp::pac::Interrupt;
use platform::AlarmSlot;

/// One claimed TIMER alarm (1-3).
pub struct RpAlarm {
    index: u8,
}

impl RpAlarm {
    /// Take control of alarm `index`: latch cleared, interrupt line
    /// unmasked. The caller guarantees exclusivity (the resource banks
    /// hand each index out at most once).
    pub fn claim(index: u8) -> Self {
        debug_assert!((1..4).contains(&index));
        let mut alarm = Self { index };
        alarm.cancel();
        // SAFETY: unmasking the TIMER alarm line; its handler is a fixed
        // vector in hw::mod that tolerates stray latches.
        unsafe { NVIC::unmask(alarm.irq()) };
        alarm
    }

    /// Alarm index within the TIMER block.
    pub fn index(&self) -> u8 {
        self.index
    }

    /// The interrupt line hard-wired to this alarm.
    pub fn irq(&self) -> Interrupt {
        match self.index {
            1 => Interrupt::TIMER_IRQ_1,
            2 => Interrupt::TIMER_IRQ_2,
            _ => Interrupt::TIMER_IRQ_3,
        }
    }

    /// Mask the interrupt line again. Called by the banks on release,
    /// after `cancel`, so a reclaimed slot starts from a known state.
    pub fn mask_irq(&mut self) {
        NVIC::mask(self.irq());
    }
}

impl AlarmSlot for RpAlarm {
    fn arm(&mut self, system_time_us: u32) {
        let n = usize::from(self.index);
        critical_section::with(|_| {
            pac::TIMER.inte().modify(|w| w.set_alarm(n, true));
        });
        // Writing the target arms the alarm.
        pac::TIMER.alarm(n).write_value(system_time_us);
    }

    fn clear_latched(&mut self) {
        pac::TIMER.intr().write(|w| w.set_alarm(usize::from(self.index), true));
    }

    fn cancel(&mut self) {
        let n = usize::from(self.index);
        // Disarm, drop any latched fire, mask at the timer.
        pac::TIMER.armed().write(|w| w.set_armed(1 << self.index));
        pac::TIMER.intr().write(|w| w.set_alarm(n, true));
        critical_section::with(|_| {
            pac::TIMER.inte().modify(|w| w.set_alarm(n, false));
        });
    }
}
