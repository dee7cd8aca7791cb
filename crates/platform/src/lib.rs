//! Hardware Abstraction Layer for the Harp clock hub
//!
//! This crate provides trait-based abstractions for every seam the
//! time-dispatch engine touches, enabling development and testing without
//! physical hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Application Layer (firmware crate: dispatcher, aux controller, registers)
//!         ↓
//! Platform HAL (this crate - trait abstractions)
//!         ↓
//! Hardware Layer (Embassy HAL + PAC)
//! ```
//!
//! # Abstraction Levels
//!
//! ## Collaborator seams
//! - [`HarpClock`] - synchronized time base (external master-clock sync)
//! - [`HostLink`] - Harp host-protocol replies and event notifications
//!
//! ## Mid-Level Peripherals
//! - [`AlarmSlot`] - one claimed hardware alarm (arm / cancel / clear)
//! - [`TxStream`] - fire-and-forget DMA transmission to a UART
//! - [`gpio`] - pin control
//! - [`uart`] - serial configuration value types
//!
//! # Features
//!
//! - `std`: Enable standard library support (for testing)
//! - `hardware`: Physical hardware implementations
//! - `defmt`: Enable defmt logging

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)] // unsafe fn body is not implicitly unsafe block
// Pedantic lints suppressed for this hardware HAL crate:
#![allow(clippy::doc_markdown)] // register names and hex addresses in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors — callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod alarm;
pub mod clock;
pub mod gpio;
pub mod host;
pub mod stream;
pub mod uart;

// Re-export main collaborator seams
pub use clock::HarpClock;
pub use host::{HostLink, RegisterAddress};

// Re-export peripheral seams
pub use alarm::{AlarmSlot, ClaimError};
pub use gpio::{DeviceSense, OutputPin, PinState};
pub use stream::TxStream;
pub use uart::{DataBits, Parity, StopBits, UartConfig};
