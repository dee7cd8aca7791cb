//! Synchronized time base over the RP2040 TIMER.
//!
//! The free-running 64-bit µs timer is the system clock. The external
//! synchronizer (outside this firmware) decodes master-clock frames from
//! the shared Harp UART and calls [`SyncTimebase::apply_sync`] with the
//! whole-seconds value carried by each frame; from then on Harp time is
//! the timer plus a fixed anchor. Until the first sync lands, Harp time
//! degenerates to raw timer time and [`SyncTimebase::has_synced`] reports
//! `false`.

use core::cell::Cell;

use critical_section::Mutex;
use embassy_rp::pac;
use platform::HarpClock;

#[derive(Debug, Clone, Copy)]
struct SyncPoint {
    /// Harp whole seconds at the anchor instant.
    harp_s: u32,
    /// System timer value (µs) at the anchor instant.
    system_us: u64,
    synced: bool,
}

/// Harp clock anchored to the local timer by the external synchronizer.
pub struct SyncTimebase {
    point: Mutex<Cell<SyncPoint>>,
}

/// Read the 64-bit timer without the latching side effects of
/// TIMELR/TIMEHR (which interrupt handlers must not disturb).
fn system_now_us64() -> u64 {
    loop {
        let hi = pac::TIMER.timerawh().read();
        let lo = pac::TIMER.timerawl().read();
        if pac::TIMER.timerawh().read() == hi {
            return (u64::from(hi) << 32) | u64::from(lo);
        }
    }
}

impl SyncTimebase {
    /// An unsynchronized time base (Harp time = raw timer time).
    pub const fn new() -> Self {
        Self {
            point: Mutex::new(Cell::new(SyncPoint {
                harp_s: 0,
                system_us: 0,
                synced: false,
            })),
        }
    }

    /// Anchor Harp time: the current instant is the start of whole second
    /// `harp_seconds`. Called by the synchronizer when the final byte of
    /// a master-clock frame lands.
    pub fn apply_sync(&self, harp_seconds: u32) {
        let now = system_now_us64();
        critical_section::with(|cs| {
            self.point.borrow(cs).set(SyncPoint {
                harp_s: harp_seconds,
                system_us: now,
                synced: true,
            });
        });
    }

    fn read_point(&self) -> SyncPoint {
        critical_section::with(|cs| self.point.borrow(cs).get())
    }
}

impl Default for SyncTimebase {
    fn default() -> Self {
        Self::new()
    }
}

impl HarpClock for SyncTimebase {
    fn harp_time_s(&self) -> u32 {
        let p = self.read_point();
        let elapsed_s = system_now_us64().wrapping_sub(p.system_us) / 1_000_000;
        p.harp_s.wrapping_add(elapsed_s as u32)
    }

    fn harp_time_us32(&self) -> u32 {
        let p = self.read_point();
        let elapsed = system_now_us64().wrapping_sub(p.system_us);
        (u64::from(p.harp_s) * 1_000_000).wrapping_add(elapsed) as u32
    }

    fn harp_to_system_us32(&self, harp_us: u32) -> u32 {
        let p = self.read_point();
        // harp_us32(t) = system_us32(t) + skew, with a constant skew fixed
        // at the anchor; invert it to arm alarms in system time.
        let skew = p
            .harp_s
            .wrapping_mul(1_000_000)
            .wrapping_sub(p.system_us as u32);
        harp_us.wrapping_sub(skew)
    }

    fn has_synced(&self) -> bool {
        self.read_point().synced
    }
}
