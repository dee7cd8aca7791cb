//! Periodic channel dispatcher.
//!
//! One [`ClockOutChannel`] per output channel (primary Harp clock-out,
//! auxiliary clock-out). A channel is `UNARMED` until it is handed a
//! claimed alarm and TX stream; armed, its alarm fires once per
//! synchronized second and [`ClockOutChannel::service`] runs in interrupt
//! context: issue the in-flight frame, clear the latch, compute the next
//! deadline, load the next frame into the inactive slot, swap, re-arm.
//!
//! The service body is bounded and never blocks. It is not re-entrant;
//! instead the next deadline is always scheduled far enough ahead
//! (~one second, versus a service time of microseconds) that the alarm
//! cannot re-fire before the current invocation returns.

use platform::{AlarmSlot, HarpClock, TxStream};

use crate::message::{FrameKind, FramePair};
use crate::schedule;

struct Armed<A, T> {
    alarm: A,
    tx: T,
}

/// One periodic time-broadcast pipeline: frame pair + claimed resources.
pub struct ClockOutChannel<A: AlarmSlot, T: TxStream> {
    pair: FramePair,
    offset_us: i32,
    armed: Option<Armed<A, T>>,
}

impl<A: AlarmSlot, T: TxStream> ClockOutChannel<A, T> {
    /// A new, unarmed channel with the given wire format and per-channel
    /// start offset (µs relative to the second boundary, may be negative).
    pub fn new(kind: FrameKind, offset_us: i32) -> Self {
        Self {
            pair: FramePair::new(kind),
            offset_us,
            armed: None,
        }
    }

    /// Whether the channel currently holds resources and a scheduled
    /// deadline.
    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Borrow the claimed alarm and stream (diagnostics).
    pub fn resources(&self) -> Option<(&A, &T)> {
        self.armed.as_ref().map(|a| (&a.alarm, &a.tx))
    }

    /// Take ownership of a claimed alarm and TX stream and schedule the
    /// first broadcast: the dispatch slot is primed with the seconds value
    /// of the first transmission and the alarm armed at the next
    /// whole-second deadline (plus this channel's offset), converted to
    /// system time.
    ///
    /// The channel must be unarmed; tear down before reconfiguring.
    pub fn arm(&mut self, mut alarm: A, tx: T, clock: &impl HarpClock) {
        debug_assert!(self.armed.is_none());
        let first = schedule::next_broadcast(
            clock.harp_time_s(),
            clock.harp_time_us32(),
            self.offset_us,
        );
        self.pair = FramePair::new(self.pair.kind());
        self.pair.prime_seconds(first.seconds);
        alarm.arm(clock.harp_to_system_us32(first.deadline_harp_us));
        self.armed = Some(Armed { alarm, tx });
    }

    /// Dispatch-and-reschedule. Interrupt context only; bounded, no
    /// blocking, no allocation.
    ///
    /// A service call on an unarmed channel (a stale latched interrupt
    /// surviving a teardown race) is a no-op.
    pub fn service(&mut self, clock: &impl HarpClock) {
        let Some(armed) = self.armed.as_mut() else {
            return;
        };
        // 1. Issue the prepared frame; DMA drains it while we run.
        armed.tx.dispatch(self.pair.dispatch_frame());
        // 2. Drop the latched interrupt so the re-arm below can fire.
        armed.alarm.clear_latched();
        // 3-4. Next deadline + the seconds value that frame must carry,
        //      written into the slot the DMA is *not* reading.
        let next = schedule::next_broadcast(
            clock.harp_time_s(),
            clock.harp_time_us32(),
            self.offset_us,
        );
        self.pair.load_seconds(next.seconds);
        // 5. Swap roles only now that the dispatch for the old slot has
        //    been issued.
        self.pair.swap();
        // 6. Re-arm in system time.
        armed.alarm.arm(clock.harp_to_system_us32(next.deadline_harp_us));
    }

    /// Tear down: cancel the alarm, clear any latched interrupt, and
    /// return the claimed resources to the caller. Idempotent: a channel
    /// that was never armed returns `None` and touches no hardware.
    pub fn disarm(&mut self) -> Option<(A, T)> {
        let mut armed = self.armed.take()?;
        armed.alarm.cancel();
        Some((armed.alarm, armed.tx))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use crate::mock::{MockAlarm, MockClock, MockTx};

    fn primary() -> ClockOutChannel<MockAlarm, MockTx> {
        ClockOutChannel::new(FrameKind::TaggedBroadcast, -572)
    }

    #[test]
    fn arm_primes_the_first_frame_and_deadline() {
        // Boot with sync acquired at harp second 100: first frame reports
        // 100 and is scheduled to lead the 101 s boundary by the offset.
        let clock = MockClock::synced_at(100, 250_000);
        let mut chan = primary();
        chan.arm(MockAlarm::default(), MockTx::default(), &clock);

        let (alarm, tx) = chan.resources().unwrap();
        assert_eq!(tx.frames.len(), 0, "arming must not transmit");
        assert_eq!(
            alarm.armed_at,
            Some(clock.harp_to_system_us32(101_000_000 - 572))
        );
    }

    #[test]
    fn first_service_transmits_the_primed_seconds() {
        let mut clock = MockClock::synced_at(100, 250_000);
        let mut chan = primary();
        chan.arm(MockAlarm::default(), MockTx::default(), &clock);

        // The alarm fires 572 µs before the 101 s boundary.
        clock.set(100, 1_000_000 - 572);
        chan.service(&clock);

        let (alarm, tx) = chan.resources().unwrap();
        assert_eq!(tx.frames.len(), 1);
        assert_eq!(tx.frames[0], [0xAA, 0xAF, 0x64, 0x00, 0x00, 0x00]);
        assert_eq!(alarm.cleared, 1);
        // Rescheduled one boundary out: 102 s - 572 µs.
        assert_eq!(
            alarm.armed_at,
            Some(clock.harp_to_system_us32(102_000_000 - 572))
        );
    }

    #[test]
    fn consecutive_services_emit_consecutive_seconds() {
        let mut clock = MockClock::synced_at(100, 500_000);
        let mut chan = primary();
        chan.arm(MockAlarm::default(), MockTx::default(), &clock);

        for boundary in 101..105u32 {
            clock.set(boundary - 1, 1_000_000 - 572);
            chan.service(&clock);
        }

        let (_, tx) = chan.resources().unwrap();
        let seconds: Vec<u32> = tx
            .frames
            .iter()
            .map(|f| FrameKind::TaggedBroadcast.read_seconds(f).unwrap())
            .collect();
        assert_eq!(seconds, vec![100, 101, 102, 103]);
    }

    #[test]
    fn aux_channel_reports_the_boundary_it_fires_on() {
        let mut clock = MockClock::synced_at(200, 900_000);
        let mut chan: ClockOutChannel<MockAlarm, MockTx> =
            ClockOutChannel::new(FrameKind::BareSeconds, 0);
        chan.arm(MockAlarm::default(), MockTx::default(), &clock);

        // Fires at the 201 s boundary (plus interrupt latency).
        clock.set(201, 40);
        chan.service(&clock);

        let (alarm, tx) = chan.resources().unwrap();
        assert_eq!(tx.frames[0], 201u32.to_le_bytes());
        assert_eq!(alarm.armed_at, Some(clock.harp_to_system_us32(202_000_000)));
    }

    #[test]
    fn service_while_unarmed_is_a_no_op() {
        let clock = MockClock::synced_at(5, 0);
        let mut chan = primary();
        chan.service(&clock);
        assert!(!chan.is_armed());
    }

    #[test]
    fn disarm_cancels_and_returns_resources() {
        let clock = MockClock::synced_at(10, 0);
        let mut chan = primary();
        chan.arm(MockAlarm::default(), MockTx::default(), &clock);

        let (alarm, _tx) = chan.disarm().unwrap();
        assert_eq!(alarm.cancels, 1);
        assert!(!chan.is_armed());
    }

    #[test]
    fn disarm_is_idempotent() {
        let clock = MockClock::synced_at(10, 0);
        let mut chan = primary();
        assert!(chan.disarm().is_none());
        chan.arm(MockAlarm::default(), MockTx::default(), &clock);
        assert!(chan.disarm().is_some());
        // No resources left; no second cancel happens anywhere.
        assert!(chan.disarm().is_none());
    }

    #[test]
    fn transmitted_seconds_round_trip_to_the_boundary() {
        // Decoding the frame and mapping it back through the clock lands
        // within one offset of the true second boundary.
        let mut clock = MockClock::synced_at(300, 700_000);
        let mut chan = primary();
        chan.arm(MockAlarm::default(), MockTx::default(), &clock);
        clock.set(300, 1_000_000 - 572);
        chan.service(&clock);

        let (_, tx) = chan.resources().unwrap();
        let sent = FrameKind::TaggedBroadcast.read_seconds(&tx.frames[0]).unwrap();
        let boundary_sys = clock.harp_to_system_us32((sent + 1) * 1_000_000);
        let start_sys = clock.harp_to_system_us32(301_000_000 - 572);
        assert_eq!(boundary_sys.wrapping_sub(start_sys), 572);
    }
}
