//! Synchronized time base seam.
//!
//! The clock hub never owns the authoritative time: an external
//! synchronizer derives it from the master clock signal and publishes it
//! through this trait. Everything in the dispatch engine reads time, and
//! converts deadlines back to local hardware-timer time, through
//! [`HarpClock`] so the engine can be driven by a mock on the host.

/// Synchronized ("Harp") time base.
///
/// Two time domains are in play:
///
/// - **Harp time**: seconds/microseconds since the Harp epoch, as agreed
///   with the external master clock.
/// - **System time**: the local free-running hardware timer.
///
/// Microsecond values wrap per 32-bit range (~71.6 minutes); all deadline
/// arithmetic on them must use wrapping operations and signed-difference
/// comparisons.
pub trait HarpClock {
    /// Current synchronized time in whole seconds.
    fn harp_time_s(&self) -> u32;

    /// Current synchronized time in microseconds (wrapping).
    fn harp_time_us32(&self) -> u32;

    /// Convert a synchronized-time instant (µs, wrapping) to the local
    /// hardware-timer instant that corresponds to it, for arming alarms.
    fn harp_to_system_us32(&self, harp_us: u32) -> u32;

    /// Whether external synchronization has ever been acquired.
    fn has_synced(&self) -> bool;
}

impl<C: HarpClock> HarpClock for &C {
    fn harp_time_s(&self) -> u32 {
        (**self).harp_time_s()
    }

    fn harp_time_us32(&self) -> u32 {
        (**self).harp_time_us32()
    }

    fn harp_to_system_us32(&self, harp_us: u32) -> u32 {
        (**self).harp_to_system_us32(harp_us)
    }

    fn has_synced(&self) -> bool {
        (**self).has_synced()
    }
}
