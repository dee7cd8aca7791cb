//! Boot configuration data.
//!
//! Pure data — no hardware types, fully host-testable. The hardware boot
//! path (`hw` module + `main.rs`) consumes these values in order.

/// Ordered list of boot sequence steps for documentation and testing.
///
/// # Correctness invariants
///
/// - The shared Harp UART must be configured before either the
///   synchronizer or the primary clock output touches it; the clock
///   output never reinitializes it afterwards (re-running the divisor
///   write mid-reception corrupts inbound sync frames).
/// - The primary channel's alarm/DMA resources are claimed before the
///   executor starts so a register write can never race boot-time claims.
/// - `App::reset` runs last: it brings up the default aux behavior and
///   the primary broadcast against fully-initialized hardware.
pub const BOOT_SEQUENCE_STEPS: &[&str] = &[
    "1. clocks: embassy-rp init (clk_sys 125 MHz, clk_peri 125 MHz)",
    "2. shared Harp UART: 100 kBaud 8N1, TX pin 4, RX pin 5 (synchronizer)",
    "3. primary channel: claim alarm 1 + DMA 0, bind TIMER_IRQ_1",
    "4. aux resource bank: alarms 2-3, DMA 1, UART0, pin 0",
    "5. App::reset: arm primary broadcast + default aux broadcast",
    "6. executor: spawn the main-loop poll task",
];

/// TIMER alarm claimed for the primary clock output at boot.
pub const PRIMARY_ALARM: u8 = 1;

/// TIMER alarms claimable by the auxiliary behaviors.
///
/// Alarm 0 belongs to the embassy time driver and is never claimed here.
pub const AUX_CLAIMABLE_ALARMS: &[u8] = &[2, 3];

/// DMA channel reserved for the primary clock output.
pub const PRIMARY_DMA_CHANNEL: u8 = 0;

/// DMA channel reserved for the auxiliary clock broadcast.
pub const AUX_DMA_CHANNEL: u8 = 1;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use crate::config;

    #[test]
    fn alarm_zero_is_never_claimable() {
        assert_ne!(PRIMARY_ALARM, 0);
        assert!(!AUX_CLAIMABLE_ALARMS.contains(&0));
    }

    #[test]
    fn primary_and_aux_resources_are_disjoint() {
        assert!(!AUX_CLAIMABLE_ALARMS.contains(&PRIMARY_ALARM));
        assert_ne!(PRIMARY_DMA_CHANNEL, AUX_DMA_CHANNEL);
    }

    #[test]
    fn alarms_fit_the_rp2040_timer() {
        // The RP2040 TIMER exposes alarms 0-3.
        assert!(PRIMARY_ALARM < 4);
        assert!(AUX_CLAIMABLE_ALARMS.iter().all(|&a| a < 4));
    }

    #[test]
    fn boot_steps_configure_the_shared_uart_before_the_channels() {
        let uart_step = BOOT_SEQUENCE_STEPS
            .iter()
            .position(|s| s.contains("shared Harp UART"))
            .unwrap();
        let primary_step = BOOT_SEQUENCE_STEPS
            .iter()
            .position(|s| s.contains("primary channel"))
            .unwrap();
        assert!(uart_step < primary_step);
    }

    #[test]
    fn boot_steps_reset_the_app_before_starting_the_executor() {
        let reset_step = BOOT_SEQUENCE_STEPS
            .iter()
            .position(|s| s.contains("App::reset"))
            .unwrap();
        let executor_step = BOOT_SEQUENCE_STEPS
            .iter()
            .position(|s| s.contains("executor"))
            .unwrap();
        assert!(reset_step < executor_step);
    }

    #[test]
    fn default_aux_baud_is_inside_the_accepted_range() {
        assert!(config::AUX_DEFAULT_BAUD >= config::MIN_AUX_BAUD);
        assert!(config::AUX_DEFAULT_BAUD <= config::MAX_AUX_BAUD);
    }
}
