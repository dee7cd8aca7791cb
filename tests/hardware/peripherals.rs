//! HIL peripheral presence tests.
//!
//! Validates the wire-level behavior of the two clock outputs against a
//! logic analyzer or a second Harp device.

#[cfg(test)]
mod hil_peripheral_tests {
    /// Primary clock output framing at the fixed Harp sync rate.
    const HARP_SYNC_BAUD: u32 = 100_000;
    /// Wire time of one 6-byte broadcast at that rate (10 bits/byte).
    const FRAME_TIME_US: u32 = 600;

    #[test]
    fn primary_channel_wire_timing_is_documented() {
        // Compile-time check — no hardware needed
        assert_eq!(6 * 10 * 1_000_000 / HARP_SYNC_BAUD, FRAME_TIME_US);
    }

    #[test]
    fn hil_wire_alignment_placeholder() {
        // On hardware, capture GPIO 4 with a logic analyzer and check:
        //   - one 6-byte burst per second, tag bytes 0xAA 0xAF
        //   - the start of the final byte within ±10 µs of the PPS edge
        //     (GPIO 0 with AuxPortFn = 2)
        //   - consecutive bursts carry consecutive LE seconds
        let _ = "HIL wire test placeholder";
    }
}
