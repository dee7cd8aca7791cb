//! Device configuration: pins, serial rates, timing offsets, and limits.
//!
//! # Serial configuration of the primary clock output
//!
//! The primary channel re-broadcasts Harp time at 100 kBaud, 8N1. Each
//! 6-byte broadcast therefore occupies 600 µs of wire time (10 bits per
//! byte). Transmission start is advanced by [`CLKOUT_START_OFFSET_US`] so
//! that the start of the final byte lands on the whole-second boundary,
//! the alignment receivers use to latch the second.
//!
//! # Minimum auxiliary baud rate
//!
//! The auxiliary broadcast is a bare 4-byte seconds value emitted once per
//! second. At 10 bits per byte the frame is 40 bits, so 40 baud is the
//! slowest rate that still fits a whole frame inside one second; anything
//! below it would still be transmitting the previous second when the next
//! one elapses. See `registers` for the validation that enforces this.

use platform::uart::UartConfig;

/// Baud rate of the primary Harp clock output (fixed by the Harp
/// synchronization-clock serial configuration).
pub const HARP_SYNC_BAUD: u32 = 100_000;

/// Microsecond offset applied to every primary-channel transmission start,
/// relative to the whole-second boundary the message reports. Negative:
/// transmission begins before the boundary so the final byte aligns to it.
pub const CLKOUT_START_OFFSET_US: i32 = -572;

/// Microsecond offset for the auxiliary clock broadcast. No alignment
/// requirement is imposed on the aux wire format, so no lead is applied.
pub const AUX_START_OFFSET_US: i32 = 0;

/// Fastest supported rate for periodic counter events.
///
/// The main-loop poll emits counter events; 1 kHz keeps the event stream
/// well inside what the host link and the poll cadence can sustain.
pub const MAX_COUNTER_FREQUENCY_HZ: u16 = 1_000;

/// Auxiliary clock broadcast rate applied at reset.
pub const AUX_DEFAULT_BAUD: u32 = 1_000;

/// Slowest accepted auxiliary baud rate: a 4-byte (40-bit) frame at this
/// rate takes exactly one second, the hard floor for a 1 Hz broadcast.
pub const MIN_AUX_BAUD: u32 = 40;

/// Fastest accepted auxiliary baud rate: clk_peri (125 MHz) / 16, the
/// upper limit of the RP2040 UART baud divisor.
pub const MAX_AUX_BAUD: u32 = 7_812_500;

/// UART configuration for the primary clock output (shared with the
/// inbound synchronizer; configured once at boot).
pub const fn harp_uart_config() -> UartConfig {
    UartConfig::eight_n_one(HARP_SYNC_BAUD)
}

/// UART configuration for the auxiliary clock broadcast at `baud`.
pub const fn aux_uart_config(baud: u32) -> UartConfig {
    UartConfig::eight_n_one(baud)
}

// ---------------------------------------------------------------------------
// Pin assignment
// ---------------------------------------------------------------------------

/// Primary clock output pin (UART1 TX).
pub const HARP_CLKOUT_PIN: u8 = 4;
/// Synchronizer input pin (UART1 RX).
pub const HARP_CLKIN_PIN: u8 = 5;
/// Auxiliary port pin: UART0 TX in broadcast mode, GPIO in pulse mode.
pub const AUX_PIN: u8 = 0;
/// Activity LED, toggled together with the aux pin in pulse mode.
pub const LED0_PIN: u8 = 24;
/// Status LED driven by the core framework.
pub const LED1_PIN: u8 = 25;

/// First GPIO of the 16 device-sense inputs. The bank occupies GPIO 8-23;
/// see `app::remap_connected_channels` for the channel-order mapping.
pub const DEVICE_SENSE_FIRST_PIN: u8 = 8;
/// Number of device-sense inputs (one per clock-output channel).
pub const DEVICE_SENSE_PIN_COUNT: u8 = 16;

// ---------------------------------------------------------------------------
// Device identity (reported by the Harp core framework)
// ---------------------------------------------------------------------------

/// Harp WhoAmI device identifier assigned to this timing hub.
pub const WHO_AM_I: u16 = 1404;
/// Hardware version.
pub const HW_VERSION: (u8, u8) = (1, 0);
/// Assembly version.
pub const ASSEMBLY_VERSION: u8 = 0;
/// Harp protocol version implemented by the core framework.
pub const HARP_VERSION: (u8, u8) = (1, 13);
/// Firmware version.
pub const FW_VERSION: (u8, u8) = (0, 1);
/// Device serial number.
pub const SERIAL_NUMBER: u16 = 0xCAFE;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    #[test]
    fn clkout_offset_is_less_than_one_frame_before_the_boundary() {
        // The 6-byte broadcast takes 600 µs at 100 kBaud; the lead must be
        // inside that window or the frame could not straddle the boundary.
        let frame_us = harp_uart_config().frame_time_us(6);
        assert_eq!(frame_us, Some(600));
        assert!(CLKOUT_START_OFFSET_US < 0);
        assert!(CLKOUT_START_OFFSET_US.unsigned_abs() < 600);
    }

    #[test]
    fn min_aux_baud_fits_one_frame_per_second() {
        let frame_us = aux_uart_config(MIN_AUX_BAUD).frame_time_us(4);
        assert_eq!(frame_us, Some(1_000_000));
    }

    #[test]
    fn below_min_aux_baud_overruns_the_second() {
        let frame_us = aux_uart_config(MIN_AUX_BAUD - 1).frame_time_us(4);
        assert!(frame_us.unwrap_or(u32::MAX) > 1_000_000);
    }

    #[test]
    fn channel_offsets_are_below_one_second() {
        // next_broadcast() assumes per-channel offsets never span a whole
        // second; both shipped offsets are far inside that.
        assert!(CLKOUT_START_OFFSET_US.unsigned_abs() < 1_000_000);
        assert!(AUX_START_OFFSET_US.unsigned_abs() < 1_000_000);
    }

    #[test]
    fn max_counter_frequency_has_whole_microsecond_interval() {
        assert_eq!(1_000_000 % u32::from(MAX_COUNTER_FREQUENCY_HZ), 0);
    }

    #[test]
    fn sense_bank_covers_sixteen_channels() {
        assert_eq!(DEVICE_SENSE_PIN_COUNT, 16);
        // GPIO 8..=23 stays clear of the aux pin (0), the clock pins (4, 5)
        // and the LEDs (24, 25).
        let last = DEVICE_SENSE_FIRST_PIN + DEVICE_SENSE_PIN_COUNT - 1;
        assert_eq!(last, 23);
    }
}
