//! Harp Clock Hub Firmware - Main Entry Point
//!
//! Hardware-only entry point for the RP2040.

#![no_std]
#![no_main]

use embassy_executor::Spawner;

// Global logger + panic handler
use defmt_rtt as _;
use panic_probe as _;

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    // Step 1: clocks + embassy time driver (TIMER alarm 0).
    let _p = embassy_rp::init(Default::default());

    defmt::info!("Harp Clock Hub Firmware v{=str}", env!("CARGO_PKG_VERSION"));
    defmt::info!(
        "who-am-i {=u16}, serial {=u16:04x}",
        firmware::config::WHO_AM_I,
        firmware::config::SERIAL_NUMBER
    );

    // Steps 2-5: shared UART, pin routing, resource claims, boot-default
    // behaviors (primary broadcast + aux clock broadcast). From here the
    // TIMER alarm interrupts drive every transmission; the loop below
    // only runs the cooperative poll.
    firmware::hw::init();

    // The external synchronizer and the Harp protocol framework attach
    // through `firmware::hw::timebase().apply_sync(..)` and
    // `firmware::hw::handle_register_write(..)` respectively; both are
    // collaborators outside this firmware.

    // Poll well above the fastest counter-event rate (1 kHz) so event
    // timestamps stay inside one interval of their deadline.
    loop {
        firmware::hw::poll();
        embassy_time::Timer::after_micros(50).await;
    }
}
