//! Harp Clock Hub Firmware
//!
//! Firmware for a Harp-protocol timing peripheral on the RP2040: keeps a
//! shared time base synchronized to an external master clock, re-broadcasts
//! that time on outgoing serial channels at the top of every second, and
//! exposes a small block of host-visible registers that select auxiliary
//! timing behaviors (periodic counter events, auxiliary clock broadcast,
//! pulse-per-second output).
//!
//! # Architecture
//!
//! ```text
//! Application Layer (app, registers)
//!         ↓
//! Dispatch Engine (dispatcher, aux, schedule, message)
//!         ↓
//! Platform HAL (platform crate - trait abstractions)
//!         ↓
//! Hardware Layer (hw module: Embassy HAL + PAC, feature "hardware")
//! ```
//!
//! Every module above the hardware layer is exercised by host unit tests
//! against the recording mocks in [`mock`].
//!
//! # Features
//!
//! - `hardware` - Build for the RP2040 target (embassy-rp, defmt, ISR glue)
//! - `std` - Enable standard library (for testing)
//!
//! # Building
//!
//! ```bash
//! cargo build --release --target thumbv6m-none-eabi --features hardware
//! ```

#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
// Upgrade relevant warns to deny; keep pedantic as warn (too noisy for firmware)
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Critical correctness: deny these
#![deny(unsafe_op_in_unsafe_fn)]
// unsafe fn body is not implicitly unsafe block
// Logging discipline
#![warn(clippy::print_stdout)] // prefer defmt over println! in lib code
#![warn(clippy::dbg_macro)] // dbg! should not be left in committed code
// Intentional allows for this codebase:
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // most errors are self-explanatory
// Pedantic lints too noisy for firmware application code:
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::doc_markdown)]

pub mod app;
pub mod aux;
pub mod boot;
pub mod config;
pub mod dispatcher;
pub mod exception_handlers;
pub mod message;
pub mod mock;
pub mod registers;
pub mod schedule;

#[cfg(feature = "hardware")]
pub mod hw;

// Re-export key types
pub use app::App;
pub use aux::{AuxController, AuxFunction, AuxResourceBank};
pub use dispatcher::ClockOutChannel;
pub use registers::{AppRegister, AppRegisters};
