//! Host-link adapter.
//!
//! The Harp protocol framework (USB framing, checksums, register
//! dispatch) attaches here. Until it is wired in, replies and events are
//! traced over defmt so the register path stays observable on hardware.

use platform::{HostLink, RegisterAddress};

/// defmt-tracing host link.
pub struct TraceHostLink {
    /// Quiet-mode flag mirrored from the core framework.
    pub quiet: bool,
}

impl TraceHostLink {
    /// A link with replies enabled.
    pub const fn new() -> Self {
        Self { quiet: false }
    }
}

impl Default for TraceHostLink {
    fn default() -> Self {
        Self::new()
    }
}

impl HostLink for TraceHostLink {
    fn send_event(&mut self, address: RegisterAddress) {
        defmt::info!("EVENT from register {=u8}", address);
    }

    fn reply_write_ack(&mut self, address: RegisterAddress) {
        defmt::debug!("WRITE ack, register {=u8}", address);
    }

    fn reply_write_error(&mut self, address: RegisterAddress) {
        defmt::warn!("WRITE_ERROR, register {=u8}", address);
    }

    fn is_quiet(&self) -> bool {
        self.quiet
    }
}
