//! Pin routing and SIO-driven outputs over the RP2040 PAC.

use embassy_rp::pac;
use platform::{DeviceSense, OutputPin};

use crate::config;

/// IO_BANK0 function selects used by this board.
const FUNCSEL_UART: u8 = 2;
const FUNCSEL_SIO: u8 = 5;
const FUNCSEL_NULL: u8 = 31;

/// Route `pin` to its UART function.
pub fn set_uart_function(pin: u8) {
    pac::IO_BANK0
        .gpio(usize::from(pin))
        .ctrl()
        .write(|w| w.set_funcsel(FUNCSEL_UART));
}

/// Route `pin` to software IO.
pub fn set_sio_function(pin: u8) {
    pac::IO_BANK0
        .gpio(usize::from(pin))
        .ctrl()
        .write(|w| w.set_funcsel(FUNCSEL_SIO));
}

/// Detach `pin` from every peripheral (teardown).
pub fn deinit_pin(pin: u8) {
    pac::IO_BANK0
        .gpio(usize::from(pin))
        .ctrl()
        .write(|w| w.set_funcsel(FUNCSEL_NULL));
}

/// Pulse output: aux pin + indicator LED toggled as one SIO mask, so
/// both edges land in the same cycle.
pub struct RpPulseOutput {
    mask: u32,
}

impl RpPulseOutput {
    /// Claim the aux pin and LED0 as SIO outputs, driven low.
    pub fn claim() -> Self {
        let mask = (1 << config::AUX_PIN) | (1 << config::LED0_PIN);
        set_sio_function(config::AUX_PIN);
        set_sio_function(config::LED0_PIN);
        pac::SIO.gpio_out(0).value_clr().write_value(mask);
        pac::SIO.gpio_oe(0).value_set().write_value(mask);
        Self { mask }
    }

    /// Release both pins back to their idle function.
    pub fn release(self) {
        pac::SIO.gpio_out(0).value_clr().write_value(self.mask);
        pac::SIO.gpio_oe(0).value_clr().write_value(self.mask);
        deinit_pin(config::AUX_PIN);
        deinit_pin(config::LED0_PIN);
    }
}

impl OutputPin for RpPulseOutput {
    fn set_high(&mut self) {
        pac::SIO.gpio_out(0).value_set().write_value(self.mask);
    }

    fn set_low(&mut self) {
        pac::SIO.gpio_out(0).value_clr().write_value(self.mask);
    }

    fn toggle(&mut self) {
        pac::SIO.gpio_out(0).value_xor().write_value(self.mask);
    }
}

/// The 16 device-sense inputs, read as one GPIO word.
pub struct RpSenseBank;

impl RpSenseBank {
    /// Route the sense pins to SIO input. RP2040 pad defaults (input
    /// enabled, pull-down) make a disconnected channel read 0.
    pub fn init() -> Self {
        let first = config::DEVICE_SENSE_FIRST_PIN;
        for pin in first..first + config::DEVICE_SENSE_PIN_COUNT {
            set_sio_function(pin);
        }
        Self
    }
}

impl DeviceSense for RpSenseBank {
    fn port_state_raw(&self) -> u32 {
        pac::SIO.gpio_in(0).read()
    }
}
