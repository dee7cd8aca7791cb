//! Auxiliary port function controller.
//!
//! The auxiliary port shares one pin, one alarm slot, and one DMA/TX
//! channel between two host-selectable behaviors: a slow clock broadcast
//! and a pulse-per-second square wave. Switching behaviors always fully
//! tears down the current one (alarm cancelled, latch cleared, resources
//! returned to the bank) before the next one claims anything. Partial
//! overlays are never allowed: a stale alarm binding left behind by a
//! half-torn-down mode would fire against reassigned state.

use platform::uart::UartConfig;
use platform::{AlarmSlot, ClaimError, HarpClock, OutputPin, TxStream};

use crate::config;
use crate::dispatcher::ClockOutChannel;
use crate::message::FrameKind;
use crate::schedule;

/// Host-selectable auxiliary port behavior (`AuxPortFn` register).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AuxFunction {
    /// Port idle; no resources claimed.
    None,
    /// Re-broadcast whole seconds on the aux UART once per second.
    ClockBroadcast,
    /// 1 Hz square wave, rising edge on the whole second.
    PulsePerSecond,
}

impl AuxFunction {
    /// Decode the register encoding (0/1/2). Values above 2 are invalid.
    pub const fn from_register(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::None),
            1 => Some(Self::ClockBroadcast),
            2 => Some(Self::PulsePerSecond),
            _ => None,
        }
    }

    /// The register encoding of this function.
    pub const fn as_register(self) -> u8 {
        match self {
            Self::None => 0,
            Self::ClockBroadcast => 1,
            Self::PulsePerSecond => 2,
        }
    }
}

/// Claim/release of the hardware shared by the auxiliary behaviors.
///
/// Claiming transfers ownership of a configured resource; releasing hands
/// it back and deinitializes it (interrupt detached, pin returned to its
/// idle function). Claim and release only ever run on the main-loop
/// thread.
pub trait AuxResourceBank {
    /// Alarm slot type handed out by this bank.
    type Alarm: AlarmSlot;
    /// TX stream type handed out by this bank.
    type Tx: TxStream;
    /// Pulse output type handed out by this bank.
    type Pin: OutputPin;

    /// Claim a free hardware alarm slot.
    fn claim_alarm(&mut self) -> Result<Self::Alarm, ClaimError>;
    /// Release a previously claimed alarm slot.
    fn release_alarm(&mut self, alarm: Self::Alarm);
    /// Claim the aux TX stream with its UART configured per `config`.
    fn claim_broadcast_tx(&mut self, config: UartConfig) -> Result<Self::Tx, ClaimError>;
    /// Release the aux TX stream and deinitialize its UART and pin.
    fn release_broadcast_tx(&mut self, tx: Self::Tx);
    /// Claim the aux pin (plus indicator LED) as a pulse output.
    fn claim_pulse_pin(&mut self) -> Result<Self::Pin, ClaimError>;
    /// Release the pulse output and deinitialize its pins.
    fn release_pulse_pin(&mut self, pin: Self::Pin);
}

/// Pulse-per-second output: toggles its pin every half synchronized
/// second, rising edge aligned with the whole second.
pub struct PulsePerSecond<A: AlarmSlot, P: OutputPin> {
    armed: Option<(A, P)>,
}

impl<A: AlarmSlot, P: OutputPin> PulsePerSecond<A, P> {
    /// A new, unarmed pulse output.
    pub fn new() -> Self {
        Self { armed: None }
    }

    /// Drive the pin low and schedule the first toggle at the next whole
    /// second, so the first rising edge lands on a second boundary.
    pub fn arm(&mut self, mut alarm: A, mut pin: P, clock: &impl HarpClock) {
        debug_assert!(self.armed.is_none());
        pin.set_low();
        let first = schedule::next_broadcast(clock.harp_time_s(), clock.harp_time_us32(), 0);
        alarm.arm(clock.harp_to_system_us32(first.deadline_harp_us));
        self.armed = Some((alarm, pin));
    }

    /// Toggle-and-reschedule. Interrupt context only.
    pub fn service(&mut self, clock: &impl HarpClock) {
        let Some((alarm, pin)) = self.armed.as_mut() else {
            return;
        };
        pin.toggle();
        alarm.clear_latched();
        let next_harp_us = schedule::next_half_second_us(clock.harp_time_us32());
        alarm.arm(clock.harp_to_system_us32(next_harp_us));
    }

    /// Cancel the alarm and return the resources. Idempotent.
    pub fn disarm(&mut self) -> Option<(A, P)> {
        let (mut alarm, pin) = self.armed.take()?;
        alarm.cancel();
        Some((alarm, pin))
    }
}

impl<A: AlarmSlot, P: OutputPin> Default for PulsePerSecond<A, P> {
    fn default() -> Self {
        Self::new()
    }
}

enum AuxState<A: AlarmSlot, T: TxStream, P: OutputPin> {
    Idle,
    Broadcast(ClockOutChannel<A, T>),
    Pulse(PulsePerSecond<A, P>),
}

/// State machine binding the shared aux resources to one behavior at a
/// time.
pub struct AuxController<B: AuxResourceBank> {
    state: AuxState<B::Alarm, B::Tx, B::Pin>,
}

impl<B: AuxResourceBank> AuxController<B> {
    /// A controller with the port idle.
    pub fn new() -> Self {
        Self {
            state: AuxState::Idle,
        }
    }

    /// The currently active behavior.
    pub fn function(&self) -> AuxFunction {
        match self.state {
            AuxState::Idle => AuxFunction::None,
            AuxState::Broadcast(_) => AuxFunction::ClockBroadcast,
            AuxState::Pulse(_) => AuxFunction::PulsePerSecond,
        }
    }

    /// Borrow the alarm claimed by the active behavior, if any (used by
    /// the hardware layer to route alarm interrupts).
    pub fn claimed_alarm(&self) -> Option<&B::Alarm> {
        match &self.state {
            AuxState::Idle => None,
            AuxState::Broadcast(chan) => chan.resources().map(|(a, _)| a),
            AuxState::Pulse(pps) => pps.armed.as_ref().map(|(a, _)| a),
        }
    }

    /// Switch the port to `function`, tearing the current behavior down
    /// first. `baud` configures the broadcast UART when that behavior is
    /// selected.
    pub fn apply(
        &mut self,
        function: AuxFunction,
        baud: u32,
        bank: &mut B,
        clock: &impl HarpClock,
    ) -> Result<(), ClaimError> {
        self.teardown(bank);
        match function {
            AuxFunction::None => {}
            AuxFunction::ClockBroadcast => {
                let alarm = bank.claim_alarm()?;
                let tx = match bank.claim_broadcast_tx(config::aux_uart_config(baud)) {
                    Ok(tx) => tx,
                    Err(e) => {
                        bank.release_alarm(alarm);
                        return Err(e);
                    }
                };
                let mut chan = ClockOutChannel::new(FrameKind::BareSeconds, config::AUX_START_OFFSET_US);
                chan.arm(alarm, tx, clock);
                self.state = AuxState::Broadcast(chan);
            }
            AuxFunction::PulsePerSecond => {
                let alarm = bank.claim_alarm()?;
                let pin = match bank.claim_pulse_pin() {
                    Ok(pin) => pin,
                    Err(e) => {
                        bank.release_alarm(alarm);
                        return Err(e);
                    }
                };
                let mut pps = PulsePerSecond::new();
                pps.arm(alarm, pin, clock);
                self.state = AuxState::Pulse(pps);
            }
        }
        Ok(())
    }

    /// Rebuild the clock broadcast at a new baud rate. A no-op unless the
    /// broadcast is the active behavior.
    pub fn set_broadcast_baud(
        &mut self,
        baud: u32,
        bank: &mut B,
        clock: &impl HarpClock,
    ) -> Result<(), ClaimError> {
        if self.function() == AuxFunction::ClockBroadcast {
            self.apply(AuxFunction::ClockBroadcast, baud, bank, clock)?;
        }
        Ok(())
    }

    /// Tear down the active behavior and return its resources to the
    /// bank. Idempotent.
    pub fn teardown(&mut self, bank: &mut B) {
        match core::mem::replace(&mut self.state, AuxState::Idle) {
            AuxState::Idle => {}
            AuxState::Broadcast(mut chan) => {
                if let Some((alarm, tx)) = chan.disarm() {
                    bank.release_alarm(alarm);
                    bank.release_broadcast_tx(tx);
                }
            }
            AuxState::Pulse(mut pps) => {
                if let Some((alarm, pin)) = pps.disarm() {
                    bank.release_alarm(alarm);
                    bank.release_pulse_pin(pin);
                }
            }
        }
    }

    /// Interrupt entry for the broadcast behavior's alarm.
    pub fn service_broadcast(&mut self, clock: &impl HarpClock) {
        if let AuxState::Broadcast(chan) = &mut self.state {
            chan.service(clock);
        }
    }

    /// Interrupt entry for the pulse behavior's alarm.
    pub fn service_pulse(&mut self, clock: &impl HarpClock) {
        if let AuxState::Pulse(pps) = &mut self.state {
            pps.service(clock);
        }
    }
}

impl<B: AuxResourceBank> Default for AuxController<B> {
    fn default() -> Self {
        Self::new()
    }
}
