//! RP2040 hardware layer.
//!
//! Implements the platform seams over embassy-rp's PAC and glues the
//! dispatch engine to the TIMER interrupt lines. Interrupt routing is a
//! fixed table: each `TIMER_IRQ_n` vector looks up which engine currently
//! owns alarm `n` in [`Hub::roles`], refreshed by the main-loop thread
//! after every reconfiguration. A latched interrupt from an alarm that no
//! longer has an owner is cleared and dropped.
//!
//! The embassy `Peripherals` singletons for the resources driven here
//! (TIMER alarms 1-3, DMA channels 0-1, UART0/UART1, the routed pins) are
//! taken at boot and parked; everything below uses the PAC directly
//! because the transfers must be issued from interrupt context without
//! awaiting.

pub mod alarm;
pub mod bank;
pub mod link;
pub mod pins;
pub mod timebase;
pub mod uart;

use core::cell::RefCell;

use critical_section::Mutex;
use embassy_rp::pac;

pub use alarm::RpAlarm;
pub use bank::RpAuxBank;
pub use link::TraceHostLink;
pub use pins::{RpPulseOutput, RpSenseBank};
pub use timebase::SyncTimebase;
pub use uart::{RpTxStream, UartId};

use crate::app::App;
use crate::boot;
use crate::config;
use crate::dispatcher::ClockOutChannel;
use crate::message::FrameKind;

/// Current owner of one TIMER alarm slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AlarmRole {
    Idle,
    PrimaryClock,
    AuxBroadcast,
    AuxPulse,
}

/// Everything the main loop and the alarm handlers share.
pub struct Hub {
    /// Application state (registers + aux controller).
    pub app: App<RpAuxBank>,
    /// Aux claim/release bookkeeping.
    pub bank: RpAuxBank,
    /// The always-on primary clock output.
    pub primary: ClockOutChannel<RpAlarm, RpTxStream>,
    /// Host-protocol adapter.
    pub link: TraceHostLink,
    /// Device-sense input bank.
    pub sense: RpSenseBank,
    roles: [AlarmRole; 4],
}

impl Hub {
    /// Recompute the alarm-to-engine routing from the current claims.
    /// Must run after every arm/teardown on the main-loop thread.
    fn refresh_roles(&mut self) {
        self.roles = [AlarmRole::Idle; 4];
        if let Some((alarm, _)) = self.primary.resources() {
            self.set_role(alarm.index(), AlarmRole::PrimaryClock);
        }
        let aux_role = match self.app.aux.function() {
            crate::aux::AuxFunction::ClockBroadcast => AlarmRole::AuxBroadcast,
            crate::aux::AuxFunction::PulsePerSecond => AlarmRole::AuxPulse,
            crate::aux::AuxFunction::None => AlarmRole::Idle,
        };
        if let Some(alarm) = self.app.aux.claimed_alarm() {
            self.set_role(alarm.index(), aux_role);
        }
    }

    fn set_role(&mut self, index: u8, role: AlarmRole) {
        if let Some(slot) = self.roles.get_mut(usize::from(index)) {
            *slot = role;
        }
    }
}

static HUB: Mutex<RefCell<Option<Hub>>> = Mutex::new(RefCell::new(None));
static TIMEBASE: SyncTimebase = SyncTimebase::new();

/// The synchronized time base. The external synchronizer anchors it via
/// [`SyncTimebase::apply_sync`] as master-clock frames arrive.
pub fn timebase() -> &'static SyncTimebase {
    &TIMEBASE
}

/// Run `f` against the hub with interrupts masked. Returns `None` before
/// [`init`] has installed it.
pub fn with_hub<R>(f: impl FnOnce(&mut Hub) -> R) -> Option<R> {
    critical_section::with(|cs| HUB.borrow_ref_mut(cs).as_mut().map(f))
}

/// Bring the device up (see `boot::BOOT_SEQUENCE_STEPS`): shared UART,
/// pin routing, resource claims, boot-default behaviors.
pub fn init() {
    // Shared Harp UART: the synchronizer may already have brought it up.
    if !UartId::Uart1.is_enabled() {
        uart::configure(UartId::Uart1, &config::harp_uart_config());
    }
    pins::set_uart_function(config::HARP_CLKOUT_PIN);
    pins::set_uart_function(config::HARP_CLKIN_PIN);

    let hub = Hub {
        app: App::new(),
        bank: RpAuxBank::new(),
        primary: ClockOutChannel::new(FrameKind::TaggedBroadcast, config::CLKOUT_START_OFFSET_US),
        link: TraceHostLink::new(),
        sense: RpSenseBank::init(),
        roles: [AlarmRole::Idle; 4],
    };
    critical_section::with(|cs| *HUB.borrow_ref_mut(cs) = Some(hub));

    // Arm with the hub already installed: the first deadline is a second
    // out, but the vector must be routable the moment the alarm is live.
    let ok = with_hub(|hub| {
        if let Err(e) = hub.app.reset(&mut hub.bank, &TIMEBASE) {
            defmt::panic!("aux resource claim failed at boot: {}", e);
        }
        hub.primary.arm(
            RpAlarm::claim(boot::PRIMARY_ALARM),
            RpTxStream::new(boot::PRIMARY_DMA_CHANNEL, UartId::Uart1),
            &TIMEBASE,
        );
        hub.refresh_roles();
    });
    debug_assert!(ok.is_some());
    defmt::info!(
        "clock hub up: primary on alarm {=u8}, aux fn {=u8}",
        boot::PRIMARY_ALARM,
        with_hub(|hub| hub.app.regs.aux_port_fn).unwrap_or(0)
    );
}

/// One main-loop iteration of the application poll.
pub fn poll() {
    with_hub(|hub| hub.app.update(&TIMEBASE, &hub.sense, &mut hub.link));
}

/// Entry point for host register writes routed by the protocol framework.
pub fn handle_register_write(address: u8, payload: &[u8]) {
    with_hub(|hub| {
        if let Err(e) = hub
            .app
            .handle_register_write(address, payload, &mut hub.bank, &TIMEBASE, &mut hub.link)
        {
            defmt::panic!("aux resource claim failed: {}", e);
        }
        hub.refresh_roles();
    });
}

fn service_alarm(index: usize) {
    critical_section::with(|cs| {
        let mut hub = HUB.borrow_ref_mut(cs);
        let Some(hub) = hub.as_mut() else {
            // No owner installed: drop the stray latch.
            pac::TIMER.intr().write(|w| w.set_alarm(index, true));
            return;
        };
        let role = hub.roles.get(index).copied().unwrap_or(AlarmRole::Idle);
        match role {
            AlarmRole::PrimaryClock => hub.primary.service(&TIMEBASE),
            AlarmRole::AuxBroadcast => hub.app.aux.service_broadcast(&TIMEBASE),
            AlarmRole::AuxPulse => hub.app.aux.service_pulse(&TIMEBASE),
            AlarmRole::Idle => {
                pac::TIMER.intr().write(|w| w.set_alarm(index, true));
            }
        }
    });
}

#[no_mangle]
#[allow(non_snake_case)]
unsafe extern "C" fn TIMER_IRQ_1() {
    service_alarm(1);
}

#[no_mangle]
#[allow(non_snake_case)]
unsafe extern "C" fn TIMER_IRQ_2() {
    service_alarm(2);
}

#[no_mangle]
#[allow(non_snake_case)]
unsafe extern "C" fn TIMER_IRQ_3() {
    service_alarm(3);
}
