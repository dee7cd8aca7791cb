//! Auxiliary resource bank for the RP2040.

use heapless::Vec;
use platform::uart::UartConfig;
use platform::ClaimError;

use super::alarm::RpAlarm;
use super::pins::{self, RpPulseOutput};
use super::uart::{self, RpTxStream, UartId};
use crate::aux::AuxResourceBank;
use crate::boot;
use crate::config;

/// Claim/release bookkeeping for the hardware shared by the auxiliary
/// behaviors. Lives behind the hub mutex; only the main-loop thread
/// claims or releases.
pub struct RpAuxBank {
    free_alarms: Vec<u8, 4>,
    tx_claimed: bool,
    pin_claimed: bool,
}

impl RpAuxBank {
    /// A bank holding the boot-assigned claimable alarm pool.
    pub fn new() -> Self {
        let mut free_alarms = Vec::new();
        for &index in boot::AUX_CLAIMABLE_ALARMS {
            let _ = free_alarms.push(index);
        }
        Self {
            free_alarms,
            tx_claimed: false,
            pin_claimed: false,
        }
    }
}

impl Default for RpAuxBank {
    fn default() -> Self {
        Self::new()
    }
}

impl AuxResourceBank for RpAuxBank {
    type Alarm = RpAlarm;
    type Tx = RpTxStream;
    type Pin = RpPulseOutput;

    fn claim_alarm(&mut self) -> Result<RpAlarm, ClaimError> {
        let index = self.free_alarms.pop().ok_or(ClaimError::NoFreeAlarm)?;
        Ok(RpAlarm::claim(index))
    }

    fn release_alarm(&mut self, mut alarm: RpAlarm) {
        alarm.cancel();
        alarm.mask_irq();
        let _ = self.free_alarms.push(alarm.index());
    }

    fn claim_broadcast_tx(&mut self, config: UartConfig) -> Result<RpTxStream, ClaimError> {
        if self.tx_claimed {
            return Err(ClaimError::PortInUse);
        }
        uart::configure(UartId::Uart0, &config);
        pins::set_uart_function(config::AUX_PIN);
        self.tx_claimed = true;
        Ok(RpTxStream::new(boot::AUX_DMA_CHANNEL, UartId::Uart0))
    }

    fn release_broadcast_tx(&mut self, _tx: RpTxStream) {
        uart::deinit(UartId::Uart0);
        pins::deinit_pin(config::AUX_PIN);
        self.tx_claimed = false;
    }

    fn claim_pulse_pin(&mut self) -> Result<RpPulseOutput, ClaimError> {
        if self.pin_claimed {
            return Err(ClaimError::PortInUse);
        }
        self.pin_claimed = true;
        Ok(RpPulseOutput::claim())
    }

    fn release_pulse_pin(&mut self, pin: RpPulseOutput) {
        pin.release();
        self.pin_claimed = false;
    }
}
