//! Application state: register write handling and the main-loop poll.
//!
//! Everything here runs on the main-loop thread. Interrupt handlers never
//! touch the register block; configuration they depend on (baud rate,
//! offsets) only changes through full teardown/rebuild of the affected
//! channel, so no value can change under an in-flight dispatch.

use platform::{ClaimError, DeviceSense, HarpClock, HostLink};

use crate::aux::{AuxController, AuxFunction, AuxResourceBank};
use crate::config;
use crate::registers::{parse_u16, parse_u32, parse_u8, AppRegister, AppRegisters};
use crate::schedule::CounterPacer;

/// Reorder the raw input bank into channel order.
///
/// Board routing: channels 7..0 sit on GPIO 23..16 and channels 15..8 on
/// GPIO 15..8, so the word is shifted down by the sense-bank base and its
/// two bytes swapped.
pub fn remap_connected_channels(raw: u32) -> u16 {
    let shifted = raw >> 8;
    (((shifted & 0x0000_00FF) << 8) | ((shifted & 0x0000_FF00) >> 8)) as u16
}

/// Application state machine: registers, counter pacing, and the
/// auxiliary port controller.
pub struct App<B: AuxResourceBank> {
    /// Host-visible register block.
    pub regs: AppRegisters,
    /// The auxiliary port state machine.
    pub aux: AuxController<B>,
    pacer: CounterPacer,
    was_synced: bool,
}

impl<B: AuxResourceBank> App<B> {
    /// A fresh application with boot-default registers and the aux port
    /// idle. Call [`App::reset`] to bring the configured behaviors up.
    pub fn new() -> Self {
        Self {
            regs: AppRegisters::boot_defaults(),
            aux: AuxController::new(),
            pacer: CounterPacer::new(),
            was_synced: false,
        }
    }

    /// Restore boot defaults and (re)build the default aux behavior.
    ///
    /// The primary clock output is armed separately by the boot path; its
    /// resources are fixed at boot and survive every register write.
    pub fn reset(&mut self, bank: &mut B, clock: &impl HarpClock) -> Result<(), ClaimError> {
        self.regs = AppRegisters::boot_defaults();
        self.pacer = CounterPacer::new();
        let function = AuxFunction::from_register(self.regs.aux_port_fn)
            .unwrap_or(AuxFunction::None);
        self.aux
            .apply(function, self.regs.aux_baud_rate, bank, clock)
    }

    /// Handle one host register write routed here by the core framework.
    ///
    /// Validation failures restore the previous value and answer with a
    /// write-error reply; acknowledgements are suppressed in quiet mode,
    /// error replies never are.
    pub fn handle_register_write(
        &mut self,
        address: u8,
        payload: &[u8],
        bank: &mut B,
        clock: &impl HarpClock,
        link: &mut impl HostLink,
    ) -> Result<(), ClaimError> {
        let Some(reg) = AppRegister::from_address(address) else {
            link.reply_write_error(address);
            return Ok(());
        };
        match reg {
            AppRegister::ConnectedDevices => {
                // Read-only: reflects the sense inputs, never the host.
                link.reply_write_error(address);
            }
            AppRegister::Counter => match parse_u32(payload) {
                Some(value) => {
                    self.regs.counter = value;
                    self.ack(address, link);
                }
                None => link.reply_write_error(address),
            },
            AppRegister::CounterFrequencyHz => match parse_u16(payload) {
                Some(hz) if hz > config::MAX_COUNTER_FREQUENCY_HZ => {
                    self.regs.counter_frequency_hz = config::MAX_COUNTER_FREQUENCY_HZ;
                    self.pacer.set_frequency(
                        config::MAX_COUNTER_FREQUENCY_HZ,
                        clock.harp_time_us32(),
                    );
                    link.reply_write_error(address);
                }
                Some(hz) => {
                    self.regs.counter_frequency_hz = hz;
                    self.pacer.set_frequency(hz, clock.harp_time_us32());
                    self.ack(address, link);
                }
                None => link.reply_write_error(address),
            },
            AppRegister::AuxPortFn => {
                match parse_u8(payload).and_then(AuxFunction::from_register) {
                    None => link.reply_write_error(address),
                    Some(function) if function.as_register() == self.regs.aux_port_fn => {
                        // Nothing new to do.
                        self.ack(address, link);
                    }
                    Some(function) => {
                        self.regs.aux_port_fn = function.as_register();
                        self.aux
                            .apply(function, self.regs.aux_baud_rate, bank, clock)?;
                        self.ack(address, link);
                    }
                }
            }
            AppRegister::AuxBaudRate => match parse_u32(payload) {
                Some(baud)
                    if (config::MIN_AUX_BAUD..=config::MAX_AUX_BAUD).contains(&baud) =>
                {
                    self.regs.aux_baud_rate = baud;
                    self.aux.set_broadcast_baud(baud, bank, clock)?;
                    self.ack(address, link);
                }
                _ => link.reply_write_error(address),
            },
        }
        Ok(())
    }

    /// Main-loop poll: sense-input change events and periodic counter
    /// events. Cooperative and non-blocking; called once per loop
    /// iteration.
    pub fn update(
        &mut self,
        clock: &impl HarpClock,
        sense: &impl DeviceSense,
        link: &mut impl HostLink,
    ) {
        let mapped = remap_connected_channels(sense.port_state_raw());
        if mapped != self.regs.connected_devices {
            self.regs.connected_devices = mapped;
            if !link.is_quiet() {
                link.send_event(AppRegister::ConnectedDevices.address());
            }
        }

        // Nothing further to do unless periodic counter events are on.
        if self.regs.counter_frequency_hz == 0 {
            return;
        }
        let mut now_us = clock.harp_time_us32();
        if clock.has_synced() && !self.was_synced {
            self.was_synced = true;
            // Re-read: the pre-sync value may be from a different epoch.
            now_us = clock.harp_time_us32();
            self.pacer.restart(now_us);
        }
        if self.pacer.poll(now_us) {
            self.regs.counter = self.regs.counter.wrapping_add(1);
            if !link.is_quiet() {
                link.send_event(AppRegister::Counter.address());
            }
        }
    }

    fn ack(&self, address: u8, link: &mut impl HostLink) {
        if !link.is_quiet() {
            link.reply_write_ack(address);
        }
    }
}

impl<B: AuxResourceBank> Default for App<B> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use crate::mock::{MockBank, MockClock, MockHost, MockSense};

    fn fixture() -> (MockClock, MockBank, MockHost, App<MockBank>) {
        (
            MockClock::synced_at(50, 0),
            MockBank::default(),
            MockHost::default(),
            App::new(),
        )
    }

    #[test]
    fn sense_bits_remap_to_channel_order() {
        // Channel 0 is GPIO 23; channel 15 is GPIO 8.
        assert_eq!(remap_connected_channels(1 << 23), 0x0001);
        assert_eq!(remap_connected_channels(1 << 16), 0x0080);
        assert_eq!(remap_connected_channels(1 << 15), 0x8000);
        assert_eq!(remap_connected_channels(1 << 8), 0x0100);
        // Bits outside the sense bank fall away.
        assert_eq!(remap_connected_channels(0xFF00_00FF), 0);
    }

    #[test]
    fn port_change_emits_one_event() {
        let (clock, _bank, mut link, mut app) = fixture();
        let mut sense = MockSense { raw: 1 << 23 };

        app.update(&clock, &sense, &mut link);
        assert_eq!(app.regs.connected_devices, 1);
        assert_eq!(link.events, [AppRegister::ConnectedDevices.address()]);

        // Unchanged state stays silent.
        app.update(&clock, &sense, &mut link);
        assert_eq!(link.events.len(), 1);

        sense.raw = 0;
        app.update(&clock, &sense, &mut link);
        assert_eq!(link.events.len(), 2);
    }

    #[test]
    fn counter_events_follow_the_configured_rate() {
        let (mut clock, mut bank, mut link, mut app) = fixture();
        let sense = MockSense::default();
        app.handle_register_write(34, &10u16.to_le_bytes(), &mut bank, &clock, &mut link)
            .unwrap();

        // First poll after enabling latches the sync state and restarts
        // the interval; the next two polls each complete one 100 ms
        // interval.
        clock.set(50, 100_000);
        app.update(&clock, &sense, &mut link);
        assert_eq!(app.regs.counter, 0);
        clock.set(50, 200_000);
        app.update(&clock, &sense, &mut link);
        clock.set(50, 300_000);
        app.update(&clock, &sense, &mut link);
        assert_eq!(app.regs.counter, 2);
        assert_eq!(
            link.events,
            [AppRegister::Counter.address(), AppRegister::Counter.address()]
        );
    }

    #[test]
    fn sync_acquisition_resets_the_pacer() {
        let mut clock = MockClock::unsynced_at(50, 0);
        let (_c, mut bank, mut link, mut app) = fixture();
        app.handle_register_write(34, &100u16.to_le_bytes(), &mut bank, &clock, &mut link)
            .unwrap();
        let sense = MockSense::default();

        // A long unsynchronized gap, then sync lands: no burst.
        clock.set(120, 0);
        clock.synced = true;
        app.update(&clock, &sense, &mut link);
        assert_eq!(app.regs.counter, 0);
        clock.set(120, 10_000);
        app.update(&clock, &sense, &mut link);
        assert_eq!(app.regs.counter, 1);
    }

    #[test]
    fn over_limit_frequency_clamps_and_reports_error() {
        let (clock, mut bank, mut link, mut app) = fixture();
        app.handle_register_write(34, &5_000u16.to_le_bytes(), &mut bank, &clock, &mut link)
            .unwrap();
        assert_eq!(app.regs.counter_frequency_hz, config::MAX_COUNTER_FREQUENCY_HZ);
        assert_eq!(link.errors, [34]);
        assert!(link.acks.is_empty());
    }

    #[test]
    fn aux_fn_write_builds_the_broadcast() {
        // Host selects the aux clock broadcast (register 35 = 1) while
        // the port is idle: built at the stored baud rate, then acked.
        let (clock, mut bank, mut link, mut app) = fixture();
        app.regs.aux_port_fn = 0;
        app.handle_register_write(35, &[1], &mut bank, &clock, &mut link)
            .unwrap();
        assert_eq!(app.aux.function(), AuxFunction::ClockBroadcast);
        assert_eq!(
            bank.last_tx_config.unwrap().baud_rate,
            app.regs.aux_baud_rate
        );
        assert_eq!(link.acks, [35]);
    }

    #[test]
    fn invalid_aux_fn_is_rejected_without_touching_resources() {
        let (clock, mut bank, mut link, mut app) = fixture();
        app.regs.aux_port_fn = 0;
        app.handle_register_write(35, &[5], &mut bank, &clock, &mut link)
            .unwrap();
        assert_eq!(app.regs.aux_port_fn, 0, "prior value restored");
        assert_eq!(link.errors, [35]);
        assert_eq!(bank.alarm_claims, 0);
        assert_eq!(bank.alarm_releases, 0);
    }

    #[test]
    fn unchanged_aux_fn_only_acks() {
        let (clock, mut bank, mut link, mut app) = fixture();
        app.regs.aux_port_fn = 0;
        app.handle_register_write(35, &[0], &mut bank, &clock, &mut link)
            .unwrap();
        assert_eq!(link.acks, [35]);
        assert_eq!(bank.alarm_claims, 0);
    }

    #[test]
    fn slow_baud_is_rejected_without_reconfiguration() {
        let (clock, mut bank, mut link, mut app) = fixture();
        app.reset(&mut bank, &clock).unwrap();
        let claims_after_reset = bank.tx_claims;

        app.handle_register_write(36, &39u32.to_le_bytes(), &mut bank, &clock, &mut link)
            .unwrap();
        assert_eq!(app.regs.aux_baud_rate, config::AUX_DEFAULT_BAUD, "unchanged");
        assert_eq!(link.errors, [36]);
        assert_eq!(bank.tx_claims, claims_after_reset, "no rebuild");
    }

    #[test]
    fn valid_baud_rebuilds_the_active_broadcast() {
        let (clock, mut bank, mut link, mut app) = fixture();
        app.reset(&mut bank, &clock).unwrap();

        app.handle_register_write(36, &115_200u32.to_le_bytes(), &mut bank, &clock, &mut link)
            .unwrap();
        assert_eq!(app.regs.aux_baud_rate, 115_200);
        assert_eq!(bank.last_tx_config.unwrap().baud_rate, 115_200);
        assert_eq!(link.acks, [36]);
    }

    #[test]
    fn counter_register_accepts_generic_writes() {
        let (clock, mut bank, mut link, mut app) = fixture();
        app.handle_register_write(33, &9u32.to_le_bytes(), &mut bank, &clock, &mut link)
            .unwrap();
        assert_eq!(app.regs.counter, 9);
        assert_eq!(link.acks, [33]);
    }

    #[test]
    fn connected_devices_register_is_read_only() {
        let (clock, mut bank, mut link, mut app) = fixture();
        app.handle_register_write(32, &0xFFFFu16.to_le_bytes(), &mut bank, &clock, &mut link)
            .unwrap();
        assert_eq!(app.regs.connected_devices, 0);
        assert_eq!(link.errors, [32]);
    }

    #[test]
    fn wrong_payload_width_is_rejected() {
        let (clock, mut bank, mut link, mut app) = fixture();
        app.handle_register_write(34, &[1], &mut bank, &clock, &mut link)
            .unwrap();
        assert_eq!(app.regs.counter_frequency_hz, 0);
        assert_eq!(link.errors, [34]);
    }

    #[test]
    fn quiet_mode_suppresses_acks_and_events_but_not_errors() {
        let (mut clock, mut bank, mut link, mut app) = fixture();
        link.quiet = true;
        let sense = MockSense { raw: 1 << 23 };

        app.handle_register_write(34, &10u16.to_le_bytes(), &mut bank, &clock, &mut link)
            .unwrap();
        clock.set(50, 200_000);
        app.update(&clock, &sense, &mut link);
        clock.set(50, 300_000);
        app.update(&clock, &sense, &mut link);
        assert_eq!(app.regs.counter, 1, "counter still advances");
        assert!(link.acks.is_empty());
        assert!(link.events.is_empty());

        app.handle_register_write(35, &[9], &mut bank, &clock, &mut link)
            .unwrap();
        assert_eq!(link.errors, [35]);
    }

    #[test]
    fn reset_restores_defaults_and_rebuilds_the_aux_port() {
        let (clock, mut bank, mut link, mut app) = fixture();
        app.handle_register_write(35, &[2], &mut bank, &clock, &mut link)
            .unwrap();
        app.handle_register_write(34, &50u16.to_le_bytes(), &mut bank, &clock, &mut link)
            .unwrap();

        app.reset(&mut bank, &clock).unwrap();
        assert_eq!(app.regs, AppRegisters::boot_defaults());
        assert_eq!(app.aux.function(), AuxFunction::ClockBroadcast);
        assert_eq!(bank.pin_releases, 1, "pulse output torn down");
    }
}
