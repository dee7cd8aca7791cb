//! Hardware alarm abstraction.
//!
//! An [`AlarmSlot`] is one claimed compare slot of the free-running system
//! timer. Ownership of the value *is* the claim: whoever holds the slot may
//! arm it, and returning it to its resource bank releases the underlying
//! hardware for reuse by a different mode.

use thiserror_no_std::Error;

/// One claimed hardware alarm (timer compare slot).
///
/// Arming schedules a latched interrupt at an absolute system-timer
/// microsecond instant; the bound interrupt handler must clear the latch
/// via [`AlarmSlot::clear_latched`] before re-arming, or the line fires
/// again immediately.
pub trait AlarmSlot {
    /// Arm the alarm to fire at `system_time_us` (absolute, wrapping µs of
    /// the local hardware timer), enabling its interrupt.
    fn arm(&mut self, system_time_us: u32);

    /// Clear the latched interrupt flag for this alarm.
    fn clear_latched(&mut self);

    /// Disarm: cancel any pending fire, clear the latch, and mask the
    /// alarm's interrupt. Safe to call when not armed.
    fn cancel(&mut self);
}

/// Failure to claim a hardware resource for a dispatch channel.
///
/// Setup-time only: once a channel is armed its resources are held until
/// teardown, so these cannot occur mid-dispatch. Callers treat them as
/// fatal configuration errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClaimError {
    /// Every claimable alarm slot is already bound to a channel.
    #[error("no free hardware alarm slot")]
    NoFreeAlarm,
    /// Every claimable DMA channel is already bound to a channel.
    #[error("no free DMA channel")]
    NoFreeDma,
    /// The requested pin or serial port is bound to another function.
    #[error("output port already in use")]
    PortInUse,
}
