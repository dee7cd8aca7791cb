//! Recording mocks for host-side testing.
//!
//! Implement the platform seams without any hardware dependency and
//! record every call for assertion in tests. No interior mutability: the
//! engine borrows resources mutably while armed, and tests inspect them
//! through the owning channel (or after teardown hands them back).

use heapless::Vec;
use platform::uart::UartConfig;
use platform::{
    AlarmSlot, ClaimError, DeviceSense, HarpClock, HostLink, OutputPin, RegisterAddress, TxStream,
};

use crate::aux::AuxResourceBank;
use crate::message::MAX_FRAME_LEN;

/// Fixed harp-to-system skew used by [`MockClock`], so conversion bugs
/// cannot hide behind a zero offset.
pub const MOCK_HARP_SKEW_US: u32 = 0x0123_4567;

/// Settable synchronized clock.
#[derive(Debug, Clone, Copy)]
pub struct MockClock {
    /// Whole synchronized seconds.
    pub seconds: u32,
    /// Microseconds into the current second (0..1_000_000).
    pub subsec_us: u32,
    /// Reported synchronization state.
    pub synced: bool,
}

impl MockClock {
    /// A synchronized clock reading `seconds` + `subsec_us`.
    pub fn synced_at(seconds: u32, subsec_us: u32) -> Self {
        Self {
            seconds,
            subsec_us,
            synced: true,
        }
    }

    /// An unsynchronized clock (free-running local time).
    pub fn unsynced_at(seconds: u32, subsec_us: u32) -> Self {
        Self {
            seconds,
            subsec_us,
            synced: false,
        }
    }

    /// Move the clock to a new instant.
    pub fn set(&mut self, seconds: u32, subsec_us: u32) {
        debug_assert!(subsec_us < 1_000_000);
        self.seconds = seconds;
        self.subsec_us = subsec_us;
    }
}

impl HarpClock for MockClock {
    fn harp_time_s(&self) -> u32 {
        self.seconds
    }

    fn harp_time_us32(&self) -> u32 {
        self.seconds.wrapping_mul(1_000_000).wrapping_add(self.subsec_us)
    }

    fn harp_to_system_us32(&self, harp_us: u32) -> u32 {
        harp_us.wrapping_sub(MOCK_HARP_SKEW_US)
    }

    fn has_synced(&self) -> bool {
        self.synced
    }
}

/// Alarm slot that records arming and cancellation.
#[derive(Debug, Default)]
pub struct MockAlarm {
    /// Deadline of the most recent arm, in system µs.
    pub armed_at: Option<u32>,
    /// Every deadline ever armed, oldest first.
    pub history: Vec<u32, 16>,
    /// Number of latch clears.
    pub cleared: usize,
    /// Number of cancels.
    pub cancels: usize,
}

impl AlarmSlot for MockAlarm {
    fn arm(&mut self, system_time_us: u32) {
        self.armed_at = Some(system_time_us);
        let _ = self.history.push(system_time_us);
    }

    fn clear_latched(&mut self) {
        self.cleared = self.cleared.saturating_add(1);
    }

    fn cancel(&mut self) {
        self.armed_at = None;
        self.cancels = self.cancels.saturating_add(1);
    }
}

/// TX stream that copies out every dispatched frame.
#[derive(Debug, Default)]
pub struct MockTx {
    /// Dispatched frames, oldest first.
    pub frames: Vec<Vec<u8, MAX_FRAME_LEN>, 64>,
}

impl TxStream for MockTx {
    fn dispatch(&mut self, frame: &[u8]) {
        let mut copy = Vec::new();
        let _ = copy.extend_from_slice(frame);
        let _ = self.frames.push(copy);
    }
}

/// Output pin that records its level and toggle count.
#[derive(Debug, Default)]
pub struct MockPin {
    /// Current level.
    pub high: bool,
    /// Number of toggles.
    pub toggles: usize,
}

impl OutputPin for MockPin {
    fn set_high(&mut self) {
        self.high = true;
    }

    fn set_low(&mut self) {
        self.high = false;
    }

    fn toggle(&mut self) {
        self.high = !self.high;
        self.toggles = self.toggles.saturating_add(1);
    }
}

/// Input bank with a settable raw word.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockSense {
    /// Raw bank state returned to the poll.
    pub raw: u32,
}

impl DeviceSense for MockSense {
    fn port_state_raw(&self) -> u32 {
        self.raw
    }
}

/// Host link that records replies and events.
#[derive(Debug, Default)]
pub struct MockHost {
    /// EVENT addresses, oldest first.
    pub events: Vec<RegisterAddress, 16>,
    /// WRITE (ack) reply addresses.
    pub acks: Vec<RegisterAddress, 16>,
    /// WRITE_ERROR reply addresses.
    pub errors: Vec<RegisterAddress, 16>,
    /// Quiet-mode flag returned to callers.
    pub quiet: bool,
}

impl HostLink for MockHost {
    fn send_event(&mut self, address: RegisterAddress) {
        let _ = self.events.push(address);
    }

    fn reply_write_ack(&mut self, address: RegisterAddress) {
        let _ = self.acks.push(address);
    }

    fn reply_write_error(&mut self, address: RegisterAddress) {
        let _ = self.errors.push(address);
    }

    fn is_quiet(&self) -> bool {
        self.quiet
    }
}

/// Resource bank with claim/release counters and optional claim-failure
/// injection.
#[derive(Debug, Default)]
pub struct MockBank {
    /// Alarm claims handed out.
    pub alarm_claims: usize,
    /// Alarms handed back.
    pub alarm_releases: usize,
    /// TX streams handed out.
    pub tx_claims: usize,
    /// TX streams handed back.
    pub tx_releases: usize,
    /// Pulse pins handed out.
    pub pin_claims: usize,
    /// Pulse pins handed back.
    pub pin_releases: usize,
    /// UART configuration of the most recent TX claim.
    pub last_tx_config: Option<UartConfig>,
    /// Make alarm claims fail with [`ClaimError::NoFreeAlarm`].
    pub fail_alarm_claims: bool,
    /// Make TX claims fail with [`ClaimError::NoFreeDma`].
    pub fail_tx_claims: bool,
}

impl AuxResourceBank for MockBank {
    type Alarm = MockAlarm;
    type Tx = MockTx;
    type Pin = MockPin;

    fn claim_alarm(&mut self) -> Result<MockAlarm, ClaimError> {
        if self.fail_alarm_claims {
            return Err(ClaimError::NoFreeAlarm);
        }
        self.alarm_claims = self.alarm_claims.saturating_add(1);
        Ok(MockAlarm::default())
    }

    fn release_alarm(&mut self, _alarm: MockAlarm) {
        self.alarm_releases = self.alarm_releases.saturating_add(1);
    }

    fn claim_broadcast_tx(&mut self, config: UartConfig) -> Result<MockTx, ClaimError> {
        if self.fail_tx_claims {
            return Err(ClaimError::NoFreeDma);
        }
        self.tx_claims = self.tx_claims.saturating_add(1);
        self.last_tx_config = Some(config);
        Ok(MockTx::default())
    }

    fn release_broadcast_tx(&mut self, _tx: MockTx) {
        self.tx_releases = self.tx_releases.saturating_add(1);
    }

    fn claim_pulse_pin(&mut self) -> Result<MockPin, ClaimError> {
        self.pin_claims = self.pin_claims.saturating_add(1);
        Ok(MockPin::default())
    }

    fn release_pulse_pin(&mut self, _pin: MockPin) {
        self.pin_releases = self.pin_releases.saturating_add(1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    #[test]
    fn mock_clock_microseconds_track_the_second() {
        let clock = MockClock::synced_at(3, 250);
        assert_eq!(clock.harp_time_us32(), 3_000_250);
        assert_eq!(
            clock.harp_to_system_us32(3_000_250),
            3_000_250u32.wrapping_sub(MOCK_HARP_SKEW_US)
        );
    }

    #[test]
    fn mock_alarm_records_history() {
        let mut alarm = MockAlarm::default();
        alarm.arm(10);
        alarm.arm(20);
        assert_eq!(alarm.armed_at, Some(20));
        assert_eq!(alarm.history, [10, 20]);
        alarm.cancel();
        assert_eq!(alarm.armed_at, None);
    }

    #[test]
    fn mock_tx_copies_frames() {
        let mut tx = MockTx::default();
        tx.dispatch(&[1, 2, 3]);
        assert_eq!(tx.frames.len(), 1);
        assert_eq!(tx.frames[0], [1, 2, 3]);
    }
}
