//! Host-protocol seam.
//!
//! The generic Harp register framework (message framing, checksums, the
//! register read/write dispatch loop) lives outside this firmware. The
//! application only needs three things from it: a way to acknowledge or
//! reject a register write, a way to emit asynchronous events referencing
//! a register, and the device-wide quiet flag. [`HostLink`] captures that
//! surface so register handlers can be exercised on the host against a
//! recording mock.

/// Absolute address of a Harp register (core + application space).
pub type RegisterAddress = u8;

/// Outbound surface of the Harp host-protocol framework.
///
/// Quiet mode suppresses write acknowledgements and events. Write-error
/// replies are *not* suppressed: a rejected configuration change must
/// always be visible to the host.
pub trait HostLink {
    /// Emit an asynchronous EVENT message referencing `address`.
    ///
    /// Callers gate this on [`HostLink::is_quiet`].
    fn send_event(&mut self, address: RegisterAddress);

    /// Reply to the in-flight register write with WRITE (acknowledged).
    /// Suppressed in quiet mode.
    fn reply_write_ack(&mut self, address: RegisterAddress);

    /// Reply to the in-flight register write with WRITE_ERROR.
    /// Never suppressed.
    fn reply_write_error(&mut self, address: RegisterAddress);

    /// Whether the device is in quiet (muted) mode.
    fn is_quiet(&self) -> bool;
}
